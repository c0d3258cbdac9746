use anyhow::Context;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::app_error::{AppError, StdResponse};
use crate::app_state::AppState;
use crate::auth::{self, Identity};
use crate::domain::checkout::{self, CheckoutTotals, PricedCartLine, ShippingInfo};
use crate::domain::promo::{self, PromoKind};
use crate::domain::status::OrderStatus;
use crate::models::{
    CreateOrderEntity, CreateOrderItemEntity, CreateOrderTimelineEntity, OrderEntity,
    OrderTimelineEntity,
};
use crate::routes::promos::load_promo;
use crate::schema::{cart_items, order_items, order_timeline, orders, products};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(checkout))
        .routes(utoipa_axum::routes!(get_my_orders))
        .routes(utoipa_axum::routes!(get_order))
        .routes(utoipa_axum::routes!(get_order_items))
        .routes(utoipa_axum::routes!(get_order_timeline))
        .route_layer(axum::middleware::from_fn(auth::customers_authorization))
}

#[derive(Deserialize, ToSchema)]
struct CheckoutReq {
    promo_code: Option<String>,
    #[serde(default)]
    shipping_name: Option<String>,
    #[serde(default)]
    shipping_address: Option<String>,
    #[serde(default)]
    shipping_phone: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct CheckoutRes {
    order_id: i32,
    subtotal: f32,
    discount: f32,
    total: f32,
}

/// Convert the caller's cart into a PENDING order.
///
/// Prices are re-read from the catalog and the promo code is re-validated
/// against the freshly computed subtotal, so nothing from an earlier preview
/// is trusted. Order insert, item snapshot, cart clear and the initial
/// timeline row run in one transaction; any failure rolls the whole
/// checkout back.
#[utoipa::path(
    post,
    path = "/checkout",
    tags = ["Orders"],
    request_body = CheckoutReq,
    responses(
        (status = 200, description = "Checkout completed", body = StdResponse<CheckoutRes, String>),
        (status = 400, description = "Missing shipping info, empty cart or invalid promo")
    )
)]
async fn checkout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<CheckoutReq>,
) -> Result<impl IntoResponse, AppError> {
    let shipping = ShippingInfo {
        name: body.shipping_name.unwrap_or_default(),
        address: body.shipping_address.unwrap_or_default(),
        phone: body.shipping_phone.unwrap_or_default(),
    };
    if !shipping.is_complete() {
        return Err(AppError::BadRequest("Shipping info required".into()));
    }

    let promo_code = body
        .promo_code
        .map(|code| code.trim().to_ascii_uppercase())
        .filter(|code| !code.is_empty());
    let user_id = identity.user_id;

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let (order_id, totals) = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let rows: Vec<(i32, i32, f32)> = cart_items::table
                    .inner_join(products::table)
                    .filter(cart_items::user_id.eq(user_id))
                    .select((
                        cart_items::product_id,
                        cart_items::quantity,
                        products::price,
                    ))
                    .get_results(conn)
                    .await
                    .context("Failed to load cart")?;

                if rows.is_empty() {
                    return Err(AppError::BadRequest("Cart is empty".into()));
                }

                let lines: Vec<PricedCartLine> = rows
                    .into_iter()
                    .map(|(product_id, quantity, unit_price)| PricedCartLine {
                        product_id,
                        quantity,
                        unit_price,
                    })
                    .collect();
                let subtotal = checkout::subtotal(&lines);

                let mut discount = 0.0;
                let mut promo_snapshot = None;
                if let Some(code) = promo_code {
                    // A supplied but unusable promo aborts the checkout; there
                    // is no silent downgrade to zero discount.
                    let invalid = || AppError::BadRequest("Invalid promo".into());
                    let promo = load_promo(conn, &code).await?.ok_or_else(invalid)?;
                    promo::usable_at(promo.active, promo.starts_at, promo.ends_at, Utc::now())
                        .map_err(|_| invalid())?;
                    let kind = PromoKind::parse(&promo.kind).ok_or_else(invalid)?;
                    discount = promo::discount_amount(kind, promo.value, subtotal);
                    promo_snapshot = Some(promo.code);
                }
                let totals = CheckoutTotals::new(subtotal, discount);

                let order: OrderEntity = diesel::insert_into(orders::table)
                    .values(CreateOrderEntity {
                        user_id,
                        total: totals.total,
                        status: OrderStatus::Pending.as_str().to_string(),
                        promo_code: promo_snapshot,
                        discount: totals.discount,
                        shipping_name: shipping.name,
                        shipping_address: shipping.address,
                        shipping_phone: shipping.phone,
                    })
                    .returning(OrderEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to create order")?;

                let item_snapshots: Vec<CreateOrderItemEntity> = lines
                    .iter()
                    .map(|line| CreateOrderItemEntity {
                        order_id: order.id,
                        product_id: line.product_id,
                        qty: line.quantity,
                        price_each: line.unit_price,
                    })
                    .collect();
                diesel::insert_into(order_items::table)
                    .values(item_snapshots)
                    .execute(conn)
                    .await
                    .context("Failed to create order items")?;

                diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
                    .execute(conn)
                    .await
                    .context("Failed to clear cart")?;

                diesel::insert_into(order_timeline::table)
                    .values(CreateOrderTimelineEntity {
                        order_id: order.id,
                        status: OrderStatus::Pending.as_str().to_string(),
                        note: "Order placed".to_string(),
                        actor_id: user_id,
                    })
                    .execute(conn)
                    .await
                    .context("Failed to record order timeline")?;

                Ok::<(i32, CheckoutTotals), AppError>((order.id, totals))
            })
        })
        .await?;

    tracing::info!(
        order_id,
        user_id,
        total = totals.total,
        discount = totals.discount,
        "Checkout complete"
    );

    Ok(StdResponse {
        data: Some(CheckoutRes {
            order_id,
            subtotal: totals.subtotal,
            discount: totals.discount,
            total: totals.total,
        }),
        message: Some("Checkout completed"),
    })
}

/// Fetch all orders belonging to the caller, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    tags = ["Orders"],
    responses(
        (status = 200, description = "List my orders", body = StdResponse<Vec<OrderEntity>, String>)
    )
)]
async fn get_my_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let my_orders: Vec<OrderEntity> = orders::table
        .filter(orders::user_id.eq(identity.user_id))
        .order_by(orders::id.desc())
        .select(OrderEntity::as_select())
        .get_results(conn)
        .await
        .context("Failed to get my orders")?;

    Ok(StdResponse {
        data: Some(my_orders),
        message: Some("Get my orders successfully"),
    })
}

/// Fetch a specific order belonging to the caller.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tags = ["Orders"],
    params(
        ("id" = i32, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = StdResponse<OrderEntity, String>)
    )
)]
async fn get_order(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let order: OrderEntity = orders::table
        .find(id)
        .filter(orders::user_id.eq(identity.user_id))
        .select(OrderEntity::as_select())
        .get_result(conn)
        .await?;

    Ok(StdResponse {
        data: Some(order),
        message: Some("Get order successfully"),
    })
}

#[derive(Serialize, ToSchema)]
struct OrderItemRes {
    product_id: i32,
    name: String,
    qty: i32,
    price_each: f32,
}

async fn assert_order_ownership(
    conn: &mut diesel_async::AsyncPgConnection,
    order_id: i32,
    user_id: i32,
) -> Result<(), AppError> {
    let owned: Option<i32> = orders::table
        .find(order_id)
        .filter(orders::user_id.eq(user_id))
        .select(orders::id)
        .first(conn)
        .await
        .optional()
        .context("Failed to check order ownership")?;

    match owned {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound),
    }
}

/// Fetch the line items of one of the caller's orders. Prices are the
/// snapshots captured at purchase time.
#[utoipa::path(
    get,
    path = "/orders/{id}/items",
    tags = ["Orders"],
    params(
        ("id" = i32, Path, description = "Order ID to fetch items for")
    ),
    responses(
        (status = 200, description = "Get order items successfully", body = StdResponse<Vec<OrderItemRes>, String>)
    )
)]
async fn get_order_items(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    assert_order_ownership(conn, id, identity.user_id).await?;

    let items: Vec<(i32, String, i32, f32)> = order_items::table
        .inner_join(products::table)
        .filter(order_items::order_id.eq(id))
        .select((
            order_items::product_id,
            products::name,
            order_items::qty,
            order_items::price_each,
        ))
        .get_results(conn)
        .await
        .context("Failed to get order items")?;

    let items = items
        .into_iter()
        .map(|(product_id, name, qty, price_each)| OrderItemRes {
            product_id,
            name,
            qty,
            price_each,
        })
        .collect::<Vec<_>>();

    Ok(StdResponse {
        data: Some(items),
        message: Some("Get order items successfully"),
    })
}

/// Fetch the status history of one of the caller's orders, oldest first.
#[utoipa::path(
    get,
    path = "/orders/{id}/timeline",
    tags = ["Orders"],
    params(
        ("id" = i32, Path, description = "Order ID to fetch the timeline for")
    ),
    responses(
        (status = 200, description = "Get order timeline successfully", body = StdResponse<Vec<OrderTimelineEntity>, String>)
    )
)]
async fn get_order_timeline(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    assert_order_ownership(conn, id, identity.user_id).await?;

    let timeline: Vec<OrderTimelineEntity> = order_timeline::table
        .filter(order_timeline::order_id.eq(id))
        .order_by(order_timeline::id.asc())
        .select(OrderTimelineEntity::as_select())
        .get_results(conn)
        .await
        .context("Failed to get order timeline")?;

    Ok(StdResponse {
        data: Some(timeline),
        message: Some("Get order timeline successfully"),
    })
}
