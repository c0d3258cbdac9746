use anyhow::Context;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use diesel::result::DatabaseErrorKind;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::aliases::DieselError;
use crate::app_error::{AppError, StdResponse};
use crate::app_state::AppState;
use crate::auth::{self, Identity};
use crate::models::ProductEntity;
use crate::schema::{products, wishlist_items};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_wishlist))
        .routes(utoipa_axum::routes!(add_to_wishlist))
        .routes(utoipa_axum::routes!(remove_from_wishlist))
        .route_layer(axum::middleware::from_fn(auth::customers_authorization))
}

/// Fetch the caller's wishlisted products.
#[utoipa::path(
    get,
    path = "/wishlist",
    tags = ["Wishlists"],
    responses(
        (status = 200, description = "Get wishlist successfully", body = StdResponse<Vec<ProductEntity>, String>)
    )
)]
async fn get_wishlist(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let wishlist: Vec<ProductEntity> = wishlist_items::table
        .inner_join(products::table)
        .filter(wishlist_items::user_id.eq(identity.user_id))
        .order_by(products::id.desc())
        .select(ProductEntity::as_select())
        .get_results(conn)
        .await
        .context("Failed to get wishlist")?;

    Ok(StdResponse {
        data: Some(wishlist),
        message: Some("Get wishlist successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct WishlistProductReq {
    product_id: i32,
}

/// Add a product to the wishlist; adding twice is a no-op.
#[utoipa::path(
    post,
    path = "/wishlist/add",
    tags = ["Wishlists"],
    request_body = WishlistProductReq,
    responses(
        (status = 200, description = "Added to wishlist successfully")
    )
)]
async fn add_to_wishlist(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<WishlistProductReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.product_id <= 0 {
        return Err(AppError::BadRequest("Invalid product_id".into()));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    diesel::insert_into(wishlist_items::table)
        .values((
            wishlist_items::user_id.eq(identity.user_id),
            wishlist_items::product_id.eq(body.product_id),
        ))
        .on_conflict((wishlist_items::user_id, wishlist_items::product_id))
        .do_nothing()
        .execute(conn)
        .await
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                AppError::BadRequest("Invalid product_id".into())
            }
            err => AppError::Other(err.into()),
        })?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Added to wishlist successfully"),
    })
}

/// Remove a product from the wishlist.
#[utoipa::path(
    post,
    path = "/wishlist/remove",
    tags = ["Wishlists"],
    request_body = WishlistProductReq,
    responses(
        (status = 200, description = "Removed from wishlist successfully")
    )
)]
async fn remove_from_wishlist(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<WishlistProductReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.product_id <= 0 {
        return Err(AppError::BadRequest("Invalid product_id".into()));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    diesel::delete(
        wishlist_items::table
            .filter(wishlist_items::user_id.eq(identity.user_id))
            .filter(wishlist_items::product_id.eq(body.product_id)),
    )
    .execute(conn)
    .await
    .context("Failed to remove wishlist item")?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Removed from wishlist successfully"),
    })
}
