//! Area activity endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use crate::{
    api::dto::{LimitParams, PopularShopDto, TrendingProductDto},
    error::{ServerResult, validation_error},
    state::AppState,
};

fn check_coordinates(latitude: f64, longitude: f64) -> ServerResult<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(validation_error("coordinates out of range"));
    }
    Ok(())
}

/// Get trending products in the user's area
#[utoipa::path(
    get,
    path = "/api/v1/trending/{latitude}/{longitude}",
    tag = "insights",
    params(
        ("latitude" = f64, Path, description = "Latitude"),
        ("longitude" = f64, Path, description = "Longitude"),
        LimitParams
    ),
    responses(
        (status = 200, description = "Trending products within 5 km", body = Vec<TrendingProductDto>),
        (status = 400, description = "Invalid parameters", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_trending_products(
    State(state): State<Arc<AppState>>,
    Path((latitude, longitude)): Path<(f64, f64)>,
    Query(params): Query<LimitParams>,
) -> ServerResult<Json<Vec<TrendingProductDto>>> {
    check_coordinates(latitude, longitude)?;
    let trending = state
        .engine
        .trending_products(latitude, longitude, params.limit)
        .await?;
    Ok(Json(trending.into_iter().map(Into::into).collect()))
}

/// Get popular shops in the user's area
#[utoipa::path(
    get,
    path = "/api/v1/popular-shops/{latitude}/{longitude}",
    tag = "insights",
    params(
        ("latitude" = f64, Path, description = "Latitude"),
        ("longitude" = f64, Path, description = "Longitude"),
        LimitParams
    ),
    responses(
        (status = 200, description = "Open shops within 5 km", body = Vec<PopularShopDto>),
        (status = 400, description = "Invalid parameters", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_popular_shops(
    State(state): State<Arc<AppState>>,
    Path((latitude, longitude)): Path<(f64, f64)>,
    Query(params): Query<LimitParams>,
) -> ServerResult<Json<Vec<PopularShopDto>>> {
    check_coordinates(latitude, longitude)?;
    let shops = state
        .engine
        .popular_shops(latitude, longitude, params.limit)
        .await?;
    Ok(Json(shops.into_iter().map(Into::into).collect()))
}
