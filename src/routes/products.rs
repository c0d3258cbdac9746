use anyhow::Context;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use diesel::{
    BoolExpressionMethods, ExpressionMethods, PgTextExpressionMethods, QueryDsl, SelectableHelper,
};
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;

use crate::app_error::{AppError, StdResponse};
use crate::app_state::AppState;
use crate::auth;
use crate::models::{CreateProductEntity, ProductEntity, UpdateProductEntity};
use crate::schema::products;

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    let public = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_products))
        .routes(utoipa_axum::routes!(get_product))
        .routes(utoipa_axum::routes!(get_categories));

    let admin = OpenApiRouter::new()
        .routes(utoipa_axum::routes!(create_product))
        .routes(utoipa_axum::routes!(update_product, delete_product))
        .route_layer(axum::middleware::from_fn(auth::admins_authorization));

    public.merge(admin)
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct ListProductsQuery {
    /// Substring match against name and description.
    q: Option<String>,
    min_price: Option<f32>,
    max_price: Option<f32>,
    category: Option<String>,
}

/// Browse the catalog with optional search and price/category filters.
#[utoipa::path(
    get,
    path = "/products",
    tags = ["Products"],
    params(ListProductsQuery),
    responses(
        (status = 200, description = "List products", body = StdResponse<Vec<ProductEntity>, String>)
    )
)]
async fn get_products(
    State(state): State<AppState>,
    Query(filter): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let mut query = products::table
        .select(ProductEntity::as_select())
        .into_boxed();

    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{q}%");
        query = query.filter(
            products::name
                .ilike(pattern.clone())
                .or(products::description.ilike(pattern)),
        );
    }
    if let Some(min_price) = filter.min_price {
        query = query.filter(products::price.ge(min_price));
    }
    if let Some(max_price) = filter.max_price {
        query = query.filter(products::price.le(max_price));
    }
    if let Some(category) = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        query = query.filter(products::category.eq(category.to_string()));
    }

    let product_list: Vec<ProductEntity> = query
        .order_by(products::id.desc())
        .get_results(conn)
        .await
        .context("Failed to get products")?;

    Ok(StdResponse {
        data: Some(product_list),
        message: Some("Get products successfully"),
    })
}

/// Fetch a single product.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tags = ["Products"],
    params(
        ("id" = i32, Path, description = "Product ID to fetch")
    ),
    responses(
        (status = 200, description = "Get product successfully", body = StdResponse<ProductEntity, String>)
    )
)]
async fn get_product(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let product: ProductEntity = products::table
        .find(id)
        .select(ProductEntity::as_select())
        .get_result(conn)
        .await?;

    Ok(StdResponse {
        data: Some(product),
        message: Some("Get product successfully"),
    })
}

/// Distinct non-empty categories, alphabetically.
#[utoipa::path(
    get,
    path = "/categories",
    tags = ["Products"],
    responses(
        (status = 200, description = "List categories", body = StdResponse<Vec<String>, String>)
    )
)]
async fn get_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let categories: Vec<String> = products::table
        .select(products::category)
        .distinct()
        .filter(products::category.ne(""))
        .order_by(products::category.asc())
        .get_results(conn)
        .await
        .context("Failed to get categories")?;

    Ok(StdResponse {
        data: Some(categories),
        message: Some("Get categories successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct CreateProductReq {
    name: String,
    price: f32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    stock: i32,
    #[serde(default)]
    category: String,
    #[serde(default)]
    best_seller: bool,
    #[serde(default)]
    is_new: bool,
    #[serde(default)]
    limited: bool,
}

/// Add a product to the catalog.
#[utoipa::path(
    post,
    path = "/products",
    tags = ["Products"],
    request_body = CreateProductReq,
    responses(
        (status = 200, description = "Created product successfully", body = StdResponse<ProductEntity, String>)
    )
)]
async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<CreateProductReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name and price required".into()));
    }
    if !body.price.is_finite() || body.price < 0.0 {
        return Err(AppError::BadRequest("Invalid price".into()));
    }
    if body.stock < 0 {
        return Err(AppError::BadRequest("Invalid stock".into()));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let product: ProductEntity = diesel::insert_into(products::table)
        .values(CreateProductEntity {
            name: body.name.trim().to_string(),
            price: body.price,
            description: body.description,
            image_url: body.image_url,
            stock: body.stock,
            category: body.category,
            best_seller: body.best_seller,
            is_new: body.is_new,
            limited: body.limited,
        })
        .returning(ProductEntity::as_returning())
        .get_result(conn)
        .await
        .context("Failed to create product")?;

    Ok(StdResponse {
        data: Some(product),
        message: Some("Created product successfully"),
    })
}

/// Partially update a product; omitted fields keep their value.
#[utoipa::path(
    put,
    path = "/products/{id}",
    tags = ["Products"],
    params(
        ("id" = i32, Path, description = "Product ID to update")
    ),
    request_body = UpdateProductEntity,
    responses(
        (status = 200, description = "Updated product successfully", body = StdResponse<ProductEntity, String>)
    )
)]
async fn update_product(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    Json(changes): Json<UpdateProductEntity>,
) -> Result<impl IntoResponse, AppError> {
    if changes.is_noop() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    if let Some(price) = changes.price {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::BadRequest("Invalid price".into()));
        }
    }
    if let Some(stock) = changes.stock {
        if stock < 0 {
            return Err(AppError::BadRequest("Invalid stock".into()));
        }
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let product: ProductEntity = diesel::update(products::table.find(id))
        .set((&changes, products::updated_at.eq(diesel::dsl::now)))
        .returning(ProductEntity::as_returning())
        .get_result(conn)
        .await?;

    Ok(StdResponse {
        data: Some(product),
        message: Some("Updated product successfully"),
    })
}

#[derive(Serialize, ToSchema)]
struct DeleteProductRes {
    deleted: usize,
}

/// Remove a product. Cart and wishlist rows referencing it are cascaded away.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tags = ["Products"],
    params(
        ("id" = i32, Path, description = "Product ID to delete")
    ),
    responses(
        (status = 200, description = "Deleted product successfully", body = StdResponse<DeleteProductRes, String>)
    )
)]
async fn delete_product(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let deleted = diesel::delete(products::table.find(id))
        .execute(conn)
        .await
        .context("Failed to delete product")?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }

    Ok(StdResponse {
        data: Some(DeleteProductRes { deleted }),
        message: Some("Deleted product successfully"),
    })
}
