use anyhow::Context;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use diesel::result::DatabaseErrorKind;
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::aliases::DieselError;
use crate::app_error::{AppError, StdResponse};
use crate::app_state::AppState;
use crate::auth::{self, Identity};
use crate::models::{CartItemEntity, CreateCartItemEntity, ProductEntity};
use crate::schema::{cart_items, products};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_cart))
        .routes(utoipa_axum::routes!(add_to_cart))
        .routes(utoipa_axum::routes!(update_cart))
        .routes(utoipa_axum::routes!(clear_cart))
        .route_layer(axum::middleware::from_fn(auth::customers_authorization))
}

#[derive(Serialize, ToSchema)]
struct CartLineRes {
    pub product: ProductEntity,
    pub quantity: i32,
}

#[derive(Serialize, ToSchema)]
struct GetCartRes {
    pub items: Vec<CartLineRes>,
    pub total: f32,
}

/// Fetch the caller's cart joined with current product data.
#[utoipa::path(
    get,
    path = "/cart",
    tags = ["Carts"],
    responses(
        (status = 200, description = "Get cart successfully", body = StdResponse<GetCartRes, String>)
    )
)]
async fn get_cart(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let rows: Vec<(CartItemEntity, ProductEntity)> = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::user_id.eq(identity.user_id))
        .order_by(products::id.desc())
        .select((CartItemEntity::as_select(), ProductEntity::as_select()))
        .get_results(conn)
        .await
        .context("Failed to get cart items")?;

    let total: f32 = rows
        .iter()
        .map(|(item, product)| item.quantity as f32 * product.price)
        .sum();

    let items = rows
        .into_iter()
        .map(|(item, product)| CartLineRes {
            product,
            quantity: item.quantity,
        })
        .collect();

    Ok(StdResponse {
        data: Some(GetCartRes { items, total }),
        message: Some("Get cart successfully"),
    })
}

fn default_qty() -> i32 {
    1
}

#[derive(Deserialize, ToSchema)]
struct AddToCartReq {
    product_id: i32,
    #[serde(default = "default_qty")]
    qty: i32,
}

/// Add a product to the cart; an existing row has its quantity increased.
#[utoipa::path(
    post,
    path = "/cart/add",
    tags = ["Carts"],
    request_body = AddToCartReq,
    responses(
        (status = 200, description = "Added to cart successfully")
    )
)]
async fn add_to_cart(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<AddToCartReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.product_id <= 0 {
        return Err(AppError::BadRequest("Invalid product_id".into()));
    }
    if body.qty <= 0 {
        return Err(AppError::BadRequest("Invalid qty".into()));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    diesel::insert_into(cart_items::table)
        .values(CreateCartItemEntity {
            user_id: identity.user_id,
            product_id: body.product_id,
            quantity: body.qty,
        })
        .on_conflict((cart_items::user_id, cart_items::product_id))
        .do_update()
        .set((
            cart_items::quantity.eq(cart_items::quantity + body.qty),
            cart_items::updated_at.eq(diesel::dsl::now),
        ))
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
        message: Some("Added to cart successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct CartUpdateEntry {
    product_id: i32,
    qty: i32,
}

#[derive(Deserialize, ToSchema)]
struct UpdateCartReq {
    items: Vec<CartUpdateEntry>,
}

/// Overwrite quantities for cart rows. A qty of zero or less deletes the row.
/// Entries for products that are not in the cart are skipped without error;
/// this tolerates partial client state by policy.
#[utoipa::path(
    post,
    path = "/cart/update",
    tags = ["Carts"],
    request_body = UpdateCartReq,
    responses(
        (status = 200, description = "Updated cart successfully")
    )
)]
async fn update_cart(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<UpdateCartReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let user_id = identity.user_id;
    conn.transaction(move |conn| {
        Box::pin(async move {
            for entry in body.items {
                if entry.product_id <= 0 {
                    continue;
                }
                if entry.qty <= 0 {
                    diesel::delete(
                        cart_items::table
                            .filter(cart_items::user_id.eq(user_id))
                            .filter(cart_items::product_id.eq(entry.product_id)),
                    )
                    .execute(conn)
                    .await
                    .context("Failed to delete cart item")?;
                } else {
                    diesel::update(
                        cart_items::table
                            .filter(cart_items::user_id.eq(user_id))
                            .filter(cart_items::product_id.eq(entry.product_id)),
                    )
                    .set((
                        cart_items::quantity.eq(entry.qty),
                        cart_items::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .await
                    .context("Failed to update cart item")?;
                }
            }
            Ok::<(), anyhow::Error>(())
        })
    })
    .await
    .context("Transaction failed")?;

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Updated cart successfully"),
    })
}

#[derive(Serialize, ToSchema)]
struct ClearCartRes {
    removed: usize,
}

/// Remove every row in the caller's cart.
#[utoipa::path(
    post,
    path = "/cart/clear",
    tags = ["Carts"],
    responses(
        (status = 200, description = "Cleared cart successfully", body = StdResponse<ClearCartRes, String>)
    )
)]
async fn clear_cart(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let removed = diesel::delete(cart_items::table.filter(cart_items::user_id.eq(identity.user_id)))
        .execute(conn)
        .await
        .context("Failed to clear cart")?;

    Ok(StdResponse {
        data: Some(ClearCartRes { removed }),
        message: Some("Cleared cart successfully"),
    })
}
