use anyhow::{Context, Result, anyhow};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::app_error::{AppError, StdResponse};
use crate::app_state::AppState;
use crate::auth;
use crate::domain::promo::{self, PromoKind, PromoRejection};
use crate::models::{CreatePromoCodeEntity, PromoCodeEntity};
use crate::schema::promo_codes;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let customer = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(validate_promo))
        .route_layer(axum::middleware::from_fn(auth::customers_authorization));

    let admin = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_promos))
        .routes(utoipa_axum::routes!(upsert_promo, delete_promo))
        .route_layer(axum::middleware::from_fn(auth::admins_authorization));

    customer.merge(admin)
}

/// Case-insensitive promo lookup; codes are stored uppercase.
pub(crate) async fn load_promo(
    conn: &mut AsyncPgConnection,
    code: &str,
) -> Result<Option<PromoCodeEntity>> {
    let normalized = code.trim().to_ascii_uppercase();
    promo_codes::table
        .find(normalized)
        .select(PromoCodeEntity::as_select())
        .first(conn)
        .await
        .optional()
        .context("Failed to load promo code")
}

#[derive(Deserialize, ToSchema)]
struct ValidatePromoReq {
    code: String,
    #[serde(default)]
    subtotal: f32,
}

#[derive(Serialize, ToSchema)]
struct ValidatePromoRes {
    promo: String,
    #[serde(rename = "type")]
    kind: String,
    value: f32,
    discount: f32,
}

/// Preview the discount a promo code yields for a given subtotal. Checkout
/// re-validates against independently fetched state, so this result is never
/// trusted at commit time.
#[utoipa::path(
    post,
    path = "/promo/validate",
    tags = ["Promos"],
    request_body = ValidatePromoReq,
    responses(
        (status = 200, description = "Promo is valid", body = StdResponse<ValidatePromoRes, String>),
        (status = 400, description = "Promo is outside its validity window"),
        (status = 404, description = "Unknown or inactive promo code")
    )
)]
async fn validate_promo(
    State(state): State<AppState>,
    Json(body): Json<ValidatePromoReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.code.trim().is_empty() {
        return Err(AppError::BadRequest("code required".into()));
    }
    let subtotal = body.subtotal.max(0.0);

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let promo = load_promo(conn, &body.code)
        .await?
        .ok_or(AppError::NotFound)?;

    promo::usable_at(promo.active, promo.starts_at, promo.ends_at, Utc::now()).map_err(
        |rejection| match rejection {
            PromoRejection::Inactive => AppError::NotFound,
            rejection => AppError::BadRequest(rejection.to_string()),
        },
    )?;

    let kind = PromoKind::parse(&promo.kind)
        .ok_or_else(|| anyhow!("Promo code {} has unknown kind {}", promo.code, promo.kind))?;
    let discount = promo::discount_amount(kind, promo.value, subtotal);

    Ok(StdResponse {
        data: Some(ValidatePromoRes {
            promo: promo.code,
            kind: promo.kind,
            value: promo.value,
            discount,
        }),
        message: Some("Promo is valid"),
    })
}

/// List every promo code, active or not.
#[utoipa::path(
    get,
    path = "/admin/promos",
    tags = ["Promos"],
    responses(
        (status = 200, description = "List promo codes", body = StdResponse<Vec<PromoCodeEntity>, String>)
    )
)]
async fn get_promos(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let promos: Vec<PromoCodeEntity> = promo_codes::table
        .order_by(promo_codes::code.asc())
        .select(PromoCodeEntity::as_select())
        .get_results(conn)
        .await
        .context("Failed to get promo codes")?;

    Ok(StdResponse {
        data: Some(promos),
        message: Some("Get promo codes successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct UpsertPromoReq {
    #[serde(rename = "type")]
    kind: String,
    value: f32,
    #[serde(default = "default_active")]
    active: bool,
    /// Window start, epoch milliseconds.
    start_at: Option<i64>,
    /// Window end, epoch milliseconds.
    end_at: Option<i64>,
}

fn default_active() -> bool {
    true
}

fn window_bound(ms: Option<i64>, field: &str) -> Result<Option<DateTime<Utc>>, AppError> {
    match ms {
        None => Ok(None),
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid {field}"))),
    }
}

/// Create or replace a promo code. The code is normalised to uppercase.
#[utoipa::path(
    put,
    path = "/admin/promos/{code}",
    tags = ["Promos"],
    params(
        ("code" = String, Path, description = "Promo code to create or replace")
    ),
    request_body = UpsertPromoReq,
    responses(
        (status = 200, description = "Saved promo code successfully", body = StdResponse<PromoCodeEntity, String>)
    )
)]
async fn upsert_promo(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpsertPromoReq>,
) -> Result<impl IntoResponse, AppError> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(AppError::BadRequest("code required".into()));
    }
    let kind = PromoKind::parse(&body.kind)
        .ok_or_else(|| AppError::BadRequest("Invalid promo type".into()))?;
    if !body.value.is_finite() || body.value < 0.0 {
        return Err(AppError::BadRequest("Invalid value".into()));
    }
    let starts_at = window_bound(body.start_at, "start_at")?;
    let ends_at = window_bound(body.end_at, "end_at")?;
    if let (Some(starts_at), Some(ends_at)) = (starts_at, ends_at) {
        if ends_at < starts_at {
            return Err(AppError::BadRequest("end_at precedes start_at".into()));
        }
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let promo: PromoCodeEntity = diesel::insert_into(promo_codes::table)
        .values(CreatePromoCodeEntity {
            code: normalized,
            kind: kind.as_str().to_string(),
            value: body.value,
            active: body.active,
            starts_at,
            ends_at,
        })
        .on_conflict(promo_codes::code)
        .do_update()
        .set((
            promo_codes::kind.eq(kind.as_str()),
            promo_codes::value.eq(body.value),
            promo_codes::active.eq(body.active),
            promo_codes::starts_at.eq(starts_at),
            promo_codes::ends_at.eq(ends_at),
            promo_codes::updated_at.eq(diesel::dsl::now),
        ))
        .returning(PromoCodeEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to upsert promo code")?;

    Ok(StdResponse {
        data: Some(promo),
        message: Some("Saved promo code successfully"),
    })
}

/// Delete a promo code. Existing orders keep their snapshot of the code text.
#[utoipa::path(
    delete,
    path = "/admin/promos/{code}",
    tags = ["Promos"],
    params(
        ("code" = String, Path, description = "Promo code to delete")
    ),
    responses(
        (status = 200, description = "Deleted promo code successfully")
    )
)]
async fn delete_promo(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let normalized = code.trim().to_ascii_uppercase();

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let deleted = diesel::delete(promo_codes::table.find(normalized))
        .execute(conn)
        .await
        .context("Failed to delete promo code")?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StdResponse::<(), _> {
        data: None,
        message: Some("Deleted promo code successfully"),
    })
}
