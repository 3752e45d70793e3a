use sdwebui_redraw::{config, redraw, sdapi};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    config::Config::dotenv_load();
    let config = config::Config::new().expect("Failed to load configuration");
    config::Config::print_env_vars();

    let client = sdapi::client::SdApiClient::new(config.sdapi_url.clone());

    if !client.check_availability().await {
        tracing::error!("WebUI is not reachable at {}; exiting", config.sdapi_url);
        std::process::exit(1);
    }

    client.reload_models().await;

    match client.list_models().await {
        Ok(models) => {
            let names: Vec<&str> = models.iter().map(|m| m.model_name.as_str()).collect();
            tracing::info!("Checkpoints: {:?}", names);
        }
        Err(e) => tracing::error!("Failed to list checkpoints: {}", e),
    }
    match client.list_loras().await {
        Ok(loras) => {
            let names: Vec<&str> = loras
                .iter()
                .map(|l| l.path.as_deref().unwrap_or(l.name.as_str()))
                .collect();
            tracing::info!("LoRAs: {:?}", names);
        }
        Err(e) => tracing::error!("Failed to list LoRAs: {}", e),
    }

    tracing::info!(
        "Watching {} every {}s",
        config.watch_dir,
        config.poll_interval_secs
    );
    let redraw_loop = redraw::RedrawLoop::new(config, client);
    redraw_loop.run().await;
}
