use anyhow::Context;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::app_error::{AppError, StdResponse};
use crate::app_state::AppState;
use crate::auth::{self, Identity};
use crate::domain::status::{OrderStatus, TransitionMode};
use crate::models::{CreateOrderTimelineEntity, OrderEntity};
use crate::schema::{order_timeline, orders};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_all_orders))
        .routes(utoipa_axum::routes!(set_order_status))
        .routes(utoipa_axum::routes!(bulk_set_order_status))
        .route_layer(axum::middleware::from_fn(auth::admins_authorization))
}

/// Fetch every order in the system, newest first.
#[utoipa::path(
    get,
    path = "/admin/orders",
    tags = ["Admin"],
    responses(
        (status = 200, description = "List all orders", body = StdResponse<Vec<OrderEntity>, String>)
    )
)]
async fn get_all_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let all_orders: Vec<OrderEntity> = orders::table
        .order_by(orders::id.desc())
        .select(OrderEntity::as_select())
        .get_results(conn)
        .await
        .context("Failed to get orders")?;

    Ok(StdResponse {
        data: Some(all_orders),
        message: Some("Get orders successfully"),
    })
}

enum StatusChange {
    Applied,
    NotFound,
    EdgeRejected,
}

/// Applies one status change atomically: order row update plus timeline
/// append. Inventory is never touched.
async fn apply_status_change(
    conn: &mut AsyncPgConnection,
    order_id: i32,
    next: OrderStatus,
    note: String,
    actor_id: i32,
    mode: TransitionMode,
) -> Result<StatusChange, AppError> {
    conn.transaction(move |conn| {
        Box::pin(async move {
            let current: Option<String> = orders::table
                .find(order_id)
                .select(orders::status)
                .first(conn)
                .await
                .optional()
                .context("Failed to load order")?;

            let Some(current) = current else {
                return Ok(StatusChange::NotFound);
            };
            if let Some(current) = OrderStatus::parse(&current) {
                if !mode.allows(current, next) {
                    return Ok(StatusChange::EdgeRejected);
                }
            }

            diesel::update(orders::table.find(order_id))
                .set((
                    orders::status.eq(next.as_str()),
                    orders::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)
                .await
                .context("Failed to update order status")?;

            diesel::insert_into(order_timeline::table)
                .values(CreateOrderTimelineEntity {
                    order_id,
                    status: next.as_str().to_string(),
                    note,
                    actor_id,
                })
                .execute(conn)
                .await
                .context("Failed to append order timeline")?;

            Ok::<StatusChange, AppError>(StatusChange::Applied)
        })
    })
    .await
}

#[derive(Deserialize, ToSchema)]
struct SetStatusReq {
    status: String,
    note: Option<String>,
}

#[derive(Serialize, ToSchema)]
struct SetStatusRes {
    updated: usize,
}

/// Set an order's status. In lenient mode any status may be set from any
/// status; repeating a transition appends another timeline row, which is the
/// documented behavior rather than a bug. Strict mode enforces the
/// state-machine edges.
#[utoipa::path(
    post,
    path = "/orders/{id}/status",
    tags = ["Admin"],
    params(
        ("id" = i32, Path, description = "Order ID to update")
    ),
    request_body = SetStatusReq,
    responses(
        (status = 200, description = "Order status updated", body = StdResponse<SetStatusRes, String>),
        (status = 400, description = "Unknown status value or rejected transition"),
        (status = 404, description = "Order not found")
    )
)]
async fn set_order_status(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<SetStatusReq>,
) -> Result<impl IntoResponse, AppError> {
    let next = OrderStatus::parse(&body.status)
        .ok_or_else(|| AppError::BadRequest("Invalid status".into()))?;
    let note = body
        .note
        .unwrap_or_else(|| format!("Status set to {}", next.as_str()));

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    match apply_status_change(conn, id, next, note, identity.user_id, state.transition_mode)
        .await?
    {
        StatusChange::Applied => Ok(StdResponse {
            data: Some(SetStatusRes { updated: 1 }),
            message: Some("Order status updated"),
        }),
        StatusChange::NotFound => Err(AppError::NotFound),
        StatusChange::EdgeRejected => Err(AppError::BadRequest(format!(
            "Status change to {} is not allowed",
            next.as_str()
        ))),
    }
}

#[derive(Deserialize, ToSchema)]
struct BulkStatusReq {
    ids: Vec<i32>,
    status: String,
    note: Option<String>,
}

/// Apply one status to a set of orders. Each id is handled independently;
/// ids already updated are not rolled back when a later one fails, and the
/// response carries only the count.
#[utoipa::path(
    post,
    path = "/admin/orders/bulk-status",
    tags = ["Admin"],
    request_body = BulkStatusReq,
    responses(
        (status = 200, description = "Bulk status applied", body = StdResponse<SetStatusRes, String>),
        (status = 400, description = "Unknown status value")
    )
)]
async fn bulk_set_order_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<BulkStatusReq>,
) -> Result<impl IntoResponse, AppError> {
    let next = OrderStatus::parse(&body.status)
        .ok_or_else(|| AppError::BadRequest("Invalid status".into()))?;
    let note = body
        .note
        .unwrap_or_else(|| format!("Status set to {}", next.as_str()));

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let mut updated = 0;
    for id in body.ids {
        let change = apply_status_change(
            conn,
            id,
            next,
            note.clone(),
            identity.user_id,
            state.transition_mode,
        )
        .await?;
        if matches!(change, StatusChange::Applied) {
            updated += 1;
        }
    }

    Ok(StdResponse {
        data: Some(SetStatusRes { updated }),
        message: Some("Bulk status applied"),
    })
}
