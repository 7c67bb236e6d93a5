//! API implementation for the BazaarLink HTTP server

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod admin;
pub mod dto;
pub mod events;
pub mod insights;
pub mod recommendations;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        recommendations::get_recommendations,
        events::track_event,
        insights::get_trending_products,
        insights::get_popular_shops,
        admin::retrain_model,
        admin::health_check,
    ),
    components(
        schemas(
            dto::RecommendationDto,
            dto::TrackEventRequest,
            dto::TrackEventResponse,
            dto::TrendingProductDto,
            dto::PopularShopDto,
            dto::MessageResponse,
            dto::ModelStatusDto,
            dto::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "recommendations", description = "Personalized product recommendations"),
        (name = "events", description = "User activity tracking"),
        (name = "insights", description = "Area trending products and popular shops"),
        (name = "admin", description = "Model retraining and health"),
    ),
    info(
        title = "BazaarLink Recommendation API",
        version = "1.0.0",
        description = "Hybrid product recommendations for hyperlocal marketplaces, blending collaborative, content, location and trending signals.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Create the main router with all API endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_request_size = state.config.max_request_size;

    let api_router = Router::new()
        .route(
            "/recommendations/{user_id}",
            get(recommendations::get_recommendations),
        )
        .route("/events", post(events::track_event))
        .route(
            "/trending/{latitude}/{longitude}",
            get(insights::get_trending_products),
        )
        .route(
            "/popular-shops/{latitude}/{longitude}",
            get(insights::get_popular_shops),
        );

    let swagger_router = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new()
        .nest("/api/v1", api_router)
        .route("/admin/retrain-model", post(admin::retrain_model))
        .route("/health", get(admin::health_check))
        .layer(DefaultBodyLimit::max(max_request_size))
        .with_state(state)
        .merge(swagger_router)
}
