use poem::{http::StatusCode, test::TestClient};
use qr_gateway::core::request::RenderDefaults;
use qr_gateway::settings::Config;
use qr_gateway::{AppState, default_dispatcher, init_openapi_route};
use std::sync::Arc;

/// App wired with remote providers pointing at an unreachable address, so
/// every test is deterministic: only the local encoder can succeed.
fn test_app() -> (
    Arc<AppState>,
    Config,
) {
    let config = Config {
        remote_timeout_ms: 500,
        qrserver_url: "http://127.0.0.1:1/".to_string(),
        quickchart_url: "http://127.0.0.1:1/".to_string(),
        ..Config::default()
    };

    let dispatcher = default_dispatcher(&config).expect("failed to build dispatcher");
    let app_state = Arc::new(AppState {
        dispatcher,
        defaults: RenderDefaults::default(),
    });
    (app_state, config)
}

fn client() -> TestClient<impl poem::Endpoint> {
    let (app_state, config) = test_app();
    TestClient::new(init_openapi_route(app_state, &config))
}

#[tokio::test]
async fn missing_content_returns_400_with_usage_hint() {
    let cli = client();

    let resp = cli.get("/qrcode").query("size", &"500").send().await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let body = resp.0.into_body().into_string().await.unwrap();
    assert!(body.contains("/qrcode?data="), "{body}");
}

#[tokio::test]
async fn unsupported_format_returns_500_without_rendering() {
    let cli = client();

    let resp = cli
        .get("/qrcode")
        .query("data", &"hello")
        .query("format", &"bmp")
        .send()
        .await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body = resp.0.into_body().into_string().await.unwrap();
    assert!(body.contains("bmp"), "{body}");
}

#[tokio::test]
async fn svg_request_is_served_locally() {
    let cli = client();

    let resp = cli
        .get("/qrcode")
        .query("data", &"https://example.com")
        .query("format", &"svg")
        .query("size", &"200")
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.assert_header("content-type", "image/svg+xml");
    resp.assert_header("cache-control", "public, max-age=3600");

    let body = resp.0.into_body().into_string().await.unwrap();
    assert!(body.contains("<svg xmlns=\"http://www.w3.org/2000/svg\""), "{body}");
    assert!(body.contains("<path d=\"M"), "{body}");
}

#[tokio::test]
async fn png_is_the_default_format() {
    let cli = client();

    let resp = cli.get("/qrcode").query("data", &"hello").send().await;
    resp.assert_status_is_ok();
    resp.assert_header("content-type", "image/png");
    resp.assert_header("cache-control", "public, max-age=3600");

    let body = resp.0.into_body().into_vec().await.unwrap();
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn caption_request_degrades_to_local_render_when_remotes_are_down() {
    let cli = client();

    // The only caption-capable backend is unreachable; the dispatcher must
    // drop the caption and fall back to the local encoder.
    let resp = cli
        .get("/qrcode")
        .query("data", &"hello")
        .query("label", &"Scan Me")
        .query("format", &"png")
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.assert_header("content-type", "image/png");

    let body = resp.0.into_body().into_vec().await.unwrap();
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn jpg_request_fails_when_the_only_capable_backend_is_down() {
    let cli = client();

    let resp = cli
        .get("/qrcode")
        .query("data", &"hello")
        .query("format", &"jpg")
        .send()
        .await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body = resp.0.into_body().into_string().await.unwrap();
    assert!(body.contains("qrserver"), "{body}");
}

#[tokio::test]
async fn health_lists_registered_backends() {
    let cli = client();

    let resp = cli.get("/health").send().await;
    resp.assert_status_is_ok();

    let body = resp.0.into_body().into_string().await.unwrap();
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"].as_str().unwrap(), "healthy");

    let ids: Vec<&str> = health["backends"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["local-encoder", "qrserver", "quickchart"]);
}
