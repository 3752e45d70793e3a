//! Integration tests for `SdApiClient` against a mock WebUI server.
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use sdwebui_redraw::error::AppError;
use sdwebui_redraw::sdapi::types::{Img2ImgRequest, OverrideSettings};
use sdwebui_redraw::SdApiClient;

/// Bind an ephemeral port and serve `app` in the background.
fn spawn_server(app: Router) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
    format!("http://{}", addr)
}

fn sample_request() -> Img2ImgRequest {
    Img2ImgRequest {
        init_images: vec!["aGk=".to_string()],
        prompt: "test prompt".to_string(),
        negative_prompt: "test negative".to_string(),
        override_settings: OverrideSettings {
            sd_model_checkpoint: "test_checkpoint".to_string(),
        },
        steps: 20,
        width: 512,
        height: 512,
        seed: -1,
        sampler_name: "Euler a".to_string(),
        cfg_scale: 7.0,
        denoising_strength: 0.5,
        restore_faces: false,
        save_images: true,
    }
}

#[tokio::test]
async fn availability_true_on_200() {
    let app = Router::new().route("/docs", get(|| async { "swagger" }));
    let client = SdApiClient::new(spawn_server(app));
    assert!(client.check_availability().await);
}

#[tokio::test]
async fn availability_false_on_non_success_status() {
    // No /docs route: the server answers 404.
    let app = Router::new().route("/", get(|| async { "root" }));
    let client = SdApiClient::new(spawn_server(app));
    assert!(!client.check_availability().await);
}

#[tokio::test]
async fn availability_false_on_connection_refused() {
    // Grab a free port, then close the listener before probing it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SdApiClient::new(format!("http://{}", addr));
    assert!(!client.check_availability().await);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_trimmed() {
    let app = Router::new().route("/docs", get(|| async { "swagger" }));
    let url = format!("{}/", spawn_server(app));
    let client = SdApiClient::new(url);
    assert!(client.check_availability().await);
}

#[tokio::test]
async fn img2img_parses_success_response() {
    let app = Router::new().route(
        "/sdapi/v1/img2img",
        post(|| async { Json(json!({"images": ["aGVsbG8="], "info": "{\"seed\": 42}"})) }),
    );
    let client = SdApiClient::new(spawn_server(app));

    let response = client.img2img(&sample_request()).await.unwrap();
    assert_eq!(response.images, vec!["aGVsbG8=".to_string()]);
    assert_eq!(response.info.as_deref(), Some("{\"seed\": 42}"));
}

#[tokio::test]
async fn img2img_failure_carries_response_body() {
    let app = Router::new().route(
        "/sdapi/v1/img2img",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "CUDA out of memory") }),
    );
    let client = SdApiClient::new(spawn_server(app));

    let err = client.img2img(&sample_request()).await.unwrap_err();
    match err {
        AppError::Api(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("CUDA out of memory"));
        }
        other => panic!("expected AppError::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn model_and_lora_catalogs_are_typed() {
    let app = Router::new()
        .route(
            "/sdapi/v1/sd-models",
            get(|| async {
                Json(json!([
                    {"title": "anime [abc123]", "model_name": "anime", "filename": "/models/anime.safetensors"},
                    {"title": "photo [def456]", "model_name": "photo"}
                ]))
            }),
        )
        .route(
            "/sdapi/v1/loras",
            get(|| async {
                Json(json!([
                    {"name": "inkstyle", "alias": "ink", "path": "/loras/inkstyle.safetensors"},
                    {"name": "bare"}
                ]))
            }),
        );
    let client = SdApiClient::new(spawn_server(app));

    let models = client.list_models().await.unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].model_name, "anime");
    assert_eq!(models[1].filename, None);

    let loras = client.list_loras().await.unwrap();
    assert_eq!(loras.len(), 2);
    assert_eq!(loras[0].path.as_deref(), Some("/loras/inkstyle.safetensors"));
    assert_eq!(loras[1].alias, None);
}

#[tokio::test]
async fn refresh_endpoints_succeed() {
    let app = Router::new()
        .route("/sdapi/v1/refresh-checkpoints", post(|| async { Json(json!(null)) }))
        .route("/sdapi/v1/refresh-loras", post(|| async { Json(json!(null)) }));
    let client = SdApiClient::new(spawn_server(app));

    client.refresh_checkpoints().await.unwrap();
    client.refresh_loras().await.unwrap();
}

#[tokio::test]
async fn reload_models_is_best_effort() {
    // Neither refresh route exists; reload_models must still return normally.
    let app = Router::new().route("/", get(|| async { "root" }));
    let client = SdApiClient::new(spawn_server(app));
    client.reload_models().await;
}

#[tokio::test]
async fn png_info_round_trip() {
    let app = Router::new().route(
        "/sdapi/v1/png-info",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["image"], "aGVsbG8=");
            Json(json!({"info": "Steps: 20, Sampler: Euler a", "items": {"parameters": "Steps: 20"}}))
        }),
    );
    let client = SdApiClient::new(spawn_server(app));

    let info = client.png_info("aGVsbG8=").await.unwrap();
    assert_eq!(info.info, "Steps: 20, Sampler: Euler a");
    assert_eq!(info.items["parameters"], "Steps: 20");
}
