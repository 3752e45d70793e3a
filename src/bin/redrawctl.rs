use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use sdwebui_redraw::sdapi::types::{Img2ImgRequest, OverrideSettings, Txt2ImgRequest};
use sdwebui_redraw::utils::imaging;
use sdwebui_redraw::{Config, SdApiClient};

#[derive(Parser, Debug)]
#[command(name = "redrawctl", about = "CLI for the Stable Diffusion WebUI redraw client", version)]
struct Cli {
    /// Override SDAPI_URL
    #[arg(global = true, long)]
    sdapi_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Probe WebUI availability
    Status,
    /// Model listing utilities
    Models {
        #[command(subcommand)]
        cmd: ModelsCmd,
    },
    /// Print the generation metadata embedded in a WebUI PNG
    PngInfo {
        /// Path to a PNG produced by the server
        file: PathBuf,
        /// Output raw JSON instead of the info string
        #[arg(long)]
        json: bool,
    },
    /// Convert a single image via img2img
    Redraw {
        /// Path to the source image
        file: PathBuf,
        /// Positive prompt override
        #[arg(long, value_name = "TEXT")]
        prompt: Option<String>,
        /// Negative prompt override
        #[arg(long, value_name = "TEXT")]
        negative_prompt: Option<String>,
        /// Steps
        #[arg(long)]
        steps: Option<u32>,
        /// Seed
        #[arg(long)]
        seed: Option<i64>,
        /// CFG scale
        #[arg(long)]
        cfg: Option<f64>,
        /// Denoise strength (defaults to 0.5 as in the polling loop)
        #[arg(long)]
        denoise: Option<f64>,
        /// Sampler name
        #[arg(long)]
        sampler_name: Option<String>,
        /// Checkpoint name
        #[arg(long)]
        ckpt_name: Option<String>,
        /// Directory to save returned images (defaults to ./outputs)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Verbose: print request parameters before sending
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate images from text alone
    Txt2img {
        /// Positive prompt
        #[arg(long, value_name = "TEXT")]
        prompt: String,
        /// Negative prompt override
        #[arg(long, value_name = "TEXT")]
        negative_prompt: Option<String>,
        /// Width
        #[arg(long, default_value_t = 512)]
        width: u32,
        /// Height
        #[arg(long, default_value_t = 512)]
        height: u32,
        /// Steps
        #[arg(long)]
        steps: Option<u32>,
        /// Seed
        #[arg(long)]
        seed: Option<i64>,
        /// CFG scale
        #[arg(long)]
        cfg: Option<f64>,
        /// Sampler name
        #[arg(long)]
        sampler_name: Option<String>,
        /// Checkpoint name
        #[arg(long)]
        ckpt_name: Option<String>,
        /// Directory to save returned images (defaults to ./outputs)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ModelsCmd {
    /// List checkpoints from /sdapi/v1/sd-models
    List {
        /// Output raw JSON instead of pretty lines
        #[arg(long)]
        json: bool,
    },
    /// List LoRAs from /sdapi/v1/loras
    Loras {
        /// Output raw JSON instead of pretty lines
        #[arg(long)]
        json: bool,
    },
    /// Refresh the server-side checkpoint and LoRA caches
    Refresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    let cli = Cli::parse();

    let mut conf = Config::new().expect("Failed to load config");
    if let Some(url) = cli.sdapi_url {
        conf.sdapi_url = url;
    }
    let client = SdApiClient::new(conf.sdapi_url.clone());

    match cli.command {
        Commands::Status => {
            if client.check_availability().await {
                println!("WebUI reachable at {}", client.base_url());
                Ok(())
            } else {
                eprintln!("WebUI not reachable at {}", client.base_url());
                std::process::exit(1);
            }
        }
        Commands::Models { cmd } => match cmd {
            ModelsCmd::List { json } => {
                let models = client.list_models().await.map_err(|e| {
                    eprintln!("Error: {}", e);
                    e
                })?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&models.iter().map(|m| {
                        serde_json::json!({
                            "model_name": m.model_name,
                            "title": m.title,
                            "filename": m.filename,
                        })
                    }).collect::<Vec<_>>())?);
                } else {
                    for m in models {
                        println!("{}", m.model_name);
                    }
                }
                Ok(())
            }
            ModelsCmd::Loras { json } => {
                let loras = client.list_loras().await.map_err(|e| {
                    eprintln!("Error: {}", e);
                    e
                })?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&loras.iter().map(|l| {
                        serde_json::json!({
                            "name": l.name,
                            "alias": l.alias,
                            "path": l.path,
                        })
                    }).collect::<Vec<_>>())?);
                } else {
                    for l in loras {
                        println!("{}", l.path.as_deref().unwrap_or(l.name.as_str()));
                    }
                }
                Ok(())
            }
            ModelsCmd::Refresh => {
                client.reload_models().await;
                println!("Refresh requested");
                Ok(())
            }
        },
        Commands::PngInfo { file, json } => {
            let encoded = imaging::encode_file_base64(&file)?;
            let info = client.png_info(&encoded).await.map_err(|e| {
                eprintln!("Error: {}", e);
                e
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                    "info": info.info,
                    "items": info.items,
                }))?);
            } else {
                println!("{}", info.info);
            }
            Ok(())
        }
        Commands::Redraw {
            file, prompt, negative_prompt,
            steps, seed, cfg, denoise, sampler_name, ckpt_name,
            out, verbose,
        } => {
            let (width, height) = imaging::read_dimensions(&file)?;
            let (width, height) = imaging::fit_below_limit(width, height, imaging::DIMENSION_LIMIT);
            let init_image = imaging::encode_file_base64(&file)?;

            let request = Img2ImgRequest {
                init_images: vec![init_image],
                prompt: prompt.unwrap_or_else(|| conf.prompt.clone()),
                negative_prompt: negative_prompt.unwrap_or_else(|| conf.negative_prompt.clone()),
                override_settings: OverrideSettings {
                    sd_model_checkpoint: ckpt_name.unwrap_or_else(|| conf.sd_model_checkpoint.clone()),
                },
                steps: steps.unwrap_or(conf.steps),
                width,
                height,
                seed: seed.unwrap_or(conf.seed),
                sampler_name: sampler_name.unwrap_or_else(|| conf.sampler_name.clone()),
                cfg_scale: cfg.unwrap_or(conf.cfg_scale),
                denoising_strength: denoise.unwrap_or(0.5),
                restore_faces: false,
                save_images: conf.save_images,
            };

            if verbose {
                eprintln!(
                    "[verbose] {}x{} steps={} seed={} sampler={} cfg={} denoise={}",
                    request.width, request.height, request.steps, request.seed,
                    request.sampler_name, request.cfg_scale, request.denoising_strength,
                );
            }

            match client.img2img(&request).await {
                Ok(response) => {
                    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
                    save_images(&response.images, out.as_deref(), stem).await?;
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Txt2img {
            prompt, negative_prompt, width, height,
            steps, seed, cfg, sampler_name, ckpt_name, out,
        } => {
            let request = Txt2ImgRequest {
                prompt,
                negative_prompt: negative_prompt.unwrap_or_else(|| conf.negative_prompt.clone()),
                override_settings: OverrideSettings {
                    sd_model_checkpoint: ckpt_name.unwrap_or_else(|| conf.sd_model_checkpoint.clone()),
                },
                steps: steps.unwrap_or(conf.steps),
                width,
                height,
                seed: seed.unwrap_or(conf.seed),
                samples: conf.samples,
                batch_size: conf.batch_size,
                sampler_name: sampler_name.unwrap_or_else(|| conf.sampler_name.clone()),
                cfg_scale: cfg.unwrap_or(conf.cfg_scale),
                restore_faces: conf.restore_faces,
                save_images: conf.save_images,
            };

            match client.txt2img(&request).await {
                Ok(response) => {
                    save_images(&response.images, out.as_deref(), "txt2img").await?;
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn save_images(
    images: &[String],
    out: Option<&Path>,
    stem: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if images.is_empty() {
        println!("No images returned");
        return Ok(());
    }
    let dir = out.unwrap_or_else(|| Path::new("./outputs"));
    tokio::fs::create_dir_all(dir).await?;
    for (i, encoded) in images.iter().enumerate() {
        let path = dir.join(format!("{}_redraw_{}.png", stem, i));
        imaging::decode_base64_to_file(encoded, &path)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}
