//! User event tracking endpoint

use std::sync::Arc;

use axum::{Json as JsonExtractor, extract::State, response::Json};

use bazaarlink::models::EventType;

use crate::{
    api::dto::{TrackEventRequest, TrackEventResponse},
    error::ServerResult,
    state::AppState,
};

/// Track a user event and drop the user's cached recommendations
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "events",
    request_body = TrackEventRequest,
    responses(
        (status = 200, description = "Event recorded", body = TrackEventResponse),
        (status = 400, description = "Invalid event", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    )
)]
pub async fn track_event(
    State(state): State<Arc<AppState>>,
    JsonExtractor(request): JsonExtractor<TrackEventRequest>,
) -> ServerResult<Json<TrackEventResponse>> {
    let event_type = EventType::from_str(&request.event_type);
    let event = state
        .engine
        .track_event(&request.user_id, event_type, request.event_data)
        .await?;

    Ok(Json(TrackEventResponse::from(event)))
}
