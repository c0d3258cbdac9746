use axum::response::IntoResponse;
use utoipa_axum::router::OpenApiRouter;

use crate::app_error::StdResponse;
use crate::app_state::AppState;

pub mod admin;
pub mod carts;
pub mod orders;
pub mod products;
pub mod promos;
pub mod wishlists;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(utoipa_axum::routes!(health))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["Health"],
    responses(
        (status = 200, description = "Server OK")
    )
)]
async fn health() -> impl IntoResponse {
    StdResponse::<(), _> {
        data: None,
        message: Some("Server OK"),
    }
}
