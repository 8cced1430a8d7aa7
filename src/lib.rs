use std::sync::Arc;
use std::time::Duration;

use poem::{
    EndpointExt, Route,
    http::Method,
    middleware::{AddData, AddDataEndpoint, Cors, CorsEndpoint},
};
use poem_openapi::OpenApiService;

use crate::core::backend::Backend;
use crate::core::dispatcher::RenderDispatcher;
use crate::core::local::LocalEncoder;
use crate::core::remote::{QrServerBackend, QuickChartBackend};
use crate::core::request::RenderDefaults;
use crate::routes::qrcode::ApiQrcode;
use crate::settings::Config;

pub mod core;
pub mod routes;
pub mod schemas;
pub mod settings;

pub struct AppState {
    pub dispatcher: Arc<RenderDispatcher>,
    pub defaults: RenderDefaults,
}

/// Wires the production backend set: local encoder first (preferred whenever
/// eligible), then the two remote providers.
pub fn default_dispatcher(config: &Config) -> anyhow::Result<Arc<RenderDispatcher>> {
    let attempt_timeout = Duration::from_millis(config.remote_timeout_ms);
    let client = reqwest::Client::builder()
        .timeout(attempt_timeout)
        .build()?;

    let backends: Vec<Arc<dyn Backend>> = vec![
        Arc::new(LocalEncoder::new()),
        Arc::new(QrServerBackend::new(
            client.clone(),
            config.qrserver_url.clone(),
        )),
        Arc::new(QuickChartBackend::new(
            client,
            config.quickchart_url.clone(),
        )),
    ];

    Ok(Arc::new(RenderDispatcher::new(backends, attempt_timeout)))
}

pub fn init_openapi_route(
    app_state: Arc<AppState>,
    config: &Config,
) -> CorsEndpoint<AddDataEndpoint<Route, Arc<AppState>>> {
    let prefix = config.prefix.clone().unwrap_or("/".to_string());
    let openapi_route =
        OpenApiService::new(ApiQrcode, "QR Gateway API", "1.0").server(prefix.clone());

    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    Route::new()
        .nest(prefix, openapi_route)
        .nest("/docs", ui)
        .at("openapi.json", openapi_json_endpoint)
        .with(AddData::new(app_state))
        .with(
            Cors::new()
                .allow_method(Method::GET)
                .allow_header("Content-Type"),
        )
}
