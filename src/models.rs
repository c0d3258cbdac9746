use chrono::{DateTime, Utc};
use diesel::prelude::{AsChangeset, Identifiable, Insertable, Queryable};
use diesel::Selectable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Products

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductEntity {
    pub id: i32,
    pub name: String,
    pub price: f32,
    pub description: String,
    pub image_url: String,
    pub stock: i32,
    pub category: String,
    pub best_seller: bool,
    pub is_new: bool,
    pub limited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = crate::schema::products)]
pub struct CreateProductEntity {
    pub name: String,
    pub price: f32,
    pub description: String,
    pub image_url: String,
    pub stock: i32,
    pub category: String,
    pub best_seller: bool,
    pub is_new: bool,
    pub limited: bool,
}

/// Partial update; `None` fields are left untouched.
#[derive(AsChangeset, Deserialize, Debug, Default, ToSchema)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProductEntity {
    pub name: Option<String>,
    pub price: Option<f32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub best_seller: Option<bool>,
    pub is_new: Option<bool>,
    pub limited: Option<bool>,
}

impl UpdateProductEntity {
    pub fn is_noop(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.best_seller.is_none()
            && self.is_new.is_none()
            && self.limited.is_none()
    }
}

// Carts

#[derive(Queryable, Selectable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemEntity {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::cart_items)]
pub struct CreateCartItemEntity {
    pub user_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

// Wishlists

#[derive(Queryable, Selectable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::wishlist_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WishlistItemEntity {
    pub user_id: i32,
    pub product_id: i32,
    pub created_at: DateTime<Utc>,
}

// Promo codes

#[derive(Queryable, Selectable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::promo_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PromoCodeEntity {
    pub code: String,
    pub kind: String,
    pub value: f32,
    pub active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::promo_codes)]
pub struct CreatePromoCodeEntity {
    pub code: String,
    pub kind: String,
    pub value: f32,
    pub active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub user_id: i32,
    pub total: f32,
    pub status: String,
    pub promo_code: Option<String>,
    pub discount: f32,
    pub shipping_name: String,
    pub shipping_address: String,
    pub shipping_phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
pub struct CreateOrderEntity {
    pub user_id: i32,
    pub total: f32,
    pub status: String,
    pub promo_code: Option<String>,
    pub discount: f32,
    pub shipping_name: String,
    pub shipping_address: String,
    pub shipping_phone: String,
}

#[derive(Queryable, Selectable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub order_id: i32,
    pub product_id: i32,
    pub qty: i32,
    pub price_each: f32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::order_items)]
pub struct CreateOrderItemEntity {
    pub order_id: i32,
    pub product_id: i32,
    pub qty: i32,
    pub price_each: f32,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, ToSchema)]
#[diesel(table_name = crate::schema::order_timeline)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderTimelineEntity {
    pub id: i32,
    pub order_id: i32,
    pub status: String,
    pub note: String,
    pub actor_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::order_timeline)]
pub struct CreateOrderTimelineEntity {
    pub order_id: i32,
    pub status: String,
    pub note: String,
    pub actor_id: i32,
}
