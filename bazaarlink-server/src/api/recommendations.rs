//! Personalized recommendation endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use bazaarlink::core::RecommendationRequest;

use crate::{
    api::dto::{RecommendationDto, RecommendationParams},
    error::{ServerResult, validation_error},
    state::AppState,
};

/// Get personalized product recommendations for a user
#[utoipa::path(
    get,
    path = "/api/v1/recommendations/{user_id}",
    tag = "recommendations",
    params(
        ("user_id" = String, Path, description = "User ID"),
        RecommendationParams
    ),
    responses(
        (status = 200, description = "Ranked recommendations", body = Vec<RecommendationDto>),
        (status = 400, description = "Invalid parameters", body = crate::error::ErrorResponse),
        (status = 503, description = "Recommendations unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> ServerResult<Json<Vec<RecommendationDto>>> {
    if params.latitude.is_some() != params.longitude.is_some() {
        return Err(validation_error(
            "latitude and longitude must be given together",
        ));
    }

    let request = RecommendationRequest {
        user_id,
        latitude: params.latitude,
        longitude: params.longitude,
        limit: params.limit,
    };

    let recommendations = state.engine.recommend(request).await?;
    Ok(Json(
        recommendations
            .into_iter()
            .map(RecommendationDto::from)
            .collect(),
    ))
}
