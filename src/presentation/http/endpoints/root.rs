use std::sync::Arc;

use poem::Route;
use poem_openapi::{OpenApiService, Tags};

use crate::{
    application::handlers::update_handler::UpdateHandler,
    presentation::http::endpoints::{health::HealthEndpoints, webhook::WebhookEndpoints},
};

#[derive(Clone)]
pub struct ApiState {
    pub update_handler: Arc<UpdateHandler>,
    pub webhook_secret: Option<String>,
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Telegram,
}

pub fn routes(state: Arc<ApiState>, server_url: &str) -> Route {
    let api_service = OpenApiService::new(
        (HealthEndpoints, WebhookEndpoints::new(state)),
        "Broadcast Bot API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("{server_url}/api"));
    let ui = api_service.swagger_ui();

    Route::new().nest("/api", api_service).nest("/", ui)
}
