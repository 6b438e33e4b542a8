use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use seitech_core::text::slugify;
use seitech_odoo::fields;

pub const ORDER_MODEL: &str = "sale.order";
pub const LINE_MODEL: &str = "sale.order.line";
pub const PRODUCT_MODEL: &str = "product.product";
pub const COURSE_MODEL: &str = "slide.channel";

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    #[validate(range(min = 1))]
    pub course_id: i64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SyncCartRequest {
    #[validate(nested)]
    pub items: Vec<SyncCartItem>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncCartItem {
    #[validate(range(min = 1))]
    pub course_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub course_id: i64,
    pub course_name: String,
    pub course_slug: String,
    pub course_image: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<f64>,
    pub quantity: i64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub item_count: i64,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_order(order: &Value, items: Vec<CartItem>) -> Self {
        Self {
            item_count: items.iter().map(|item| item.quantity).sum(),
            items,
            subtotal: fields::f64_field(order, "amount_untaxed"),
            tax: fields::f64_field(order, "amount_tax"),
            total: fields::f64_field(order, "amount_total"),
        }
    }
}

/// Build one cart item from an order line and the product and course
/// records it points at.
pub fn cart_item(line: &Value, product: Option<&Value>, course: Option<&Value>) -> CartItem {
    let course_id = product
        .and_then(|p| fields::many2one_id(p, "slide_channel_id"))
        .unwrap_or(0);

    let course_name = course
        .and_then(|c| fields::string(c, "name"))
        .or_else(|| product.and_then(|p| fields::string(p, "name")))
        .or_else(|| fields::many2one_name(line, "product_id"))
        .unwrap_or_default();

    let course_slug = course
        .and_then(|c| fields::string(c, "website_slug"))
        .or_else(|| course.and_then(|c| fields::string(c, "name")).map(|n| slugify(&n)))
        .unwrap_or_default();

    let course_image = course
        .and_then(|c| fields::image_data_url(c, "image_512"))
        .or_else(|| product.and_then(|p| fields::image_data_url(p, "image_128")))
        .unwrap_or_default();

    let discount_price = course
        .map(|c| fields::f64_field(c, "discount_price"))
        .filter(|price| *price > 0.0);

    let quantity = match fields::i64_field(line, "product_uom_qty") {
        0 => 1,
        qty => qty,
    };

    CartItem {
        id: fields::i64_field(line, "id"),
        course_id,
        course_name,
        course_slug,
        course_image,
        price: fields::f64_field(line, "price_unit"),
        discount_price,
        quantity,
        subtotal: fields::f64_field(line, "price_subtotal"),
    }
}

/// Result of adding to or syncing a cart.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdate {
    pub order_id: i64,
    pub item_count: usize,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced: Option<usize>,
}
