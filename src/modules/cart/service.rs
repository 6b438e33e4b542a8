use std::collections::HashMap;

use anyhow::Context;
use serde_json::{Value, json};
use tracing::{instrument, warn};

use seitech_odoo::{Domain, OdooClient, SearchRead, fields};

use crate::metrics::track_cart_operation;
use crate::modules::cart::model::{
    AddToCartRequest, COURSE_MODEL, Cart, CartUpdate, LINE_MODEL, ORDER_MODEL, PRODUCT_MODEL,
    SyncCartRequest, cart_item,
};
use crate::utils::errors::AppError;

pub struct CartService;

impl CartService {
    /// Latest draft order of the partner.
    async fn draft_order(
        odoo: &OdooClient,
        partner_id: i64,
        fields: &[&str],
    ) -> Result<Option<Value>, AppError> {
        let orders = odoo
            .search_read(
                ORDER_MODEL,
                SearchRead::new(
                    Domain::new()
                        .eq("partner_id", partner_id)
                        .eq("state", "draft"),
                )
                .fields(fields)
                .limit(1)
                .order("write_date desc"),
            )
            .await
            .context("Failed to fetch cart")?;
        Ok(orders.into_iter().next())
    }

    async fn draft_order_id(odoo: &OdooClient, partner_id: i64) -> Result<(i64, Vec<i64>), AppError> {
        match Self::draft_order(odoo, partner_id, &["id", "order_line"]).await? {
            Some(order) => Ok((fields::i64_field(&order, "id"), fields::ids(&order, "order_line"))),
            None => {
                let id = odoo
                    .create(
                        ORDER_MODEL,
                        json!({ "partner_id": partner_id, "state": "draft" }),
                    )
                    .await
                    .context("Failed to create cart")?;
                Ok((id, Vec::new()))
            }
        }
    }

    /// Product sold for a course; `Ok(None)` when the course has none,
    /// `Err` 404 when the course does not exist.
    async fn course_product(odoo: &OdooClient, course_id: i64) -> Result<Option<i64>, AppError> {
        let courses = odoo
            .read(COURSE_MODEL, &[course_id], &["id", "product_id"])
            .await
            .context("Failed to fetch course")?;
        let course = courses
            .first()
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))?;
        Ok(fields::many2one_id(course, "product_id"))
    }

    async fn summary(odoo: &OdooClient, order_id: i64, synced: Option<usize>) -> Result<CartUpdate, AppError> {
        let order = odoo
            .read(ORDER_MODEL, &[order_id], &["order_line", "amount_total"])
            .await
            .context("Failed to fetch cart")?
            .into_iter()
            .next()
            .unwrap_or(Value::Null);

        Ok(CartUpdate {
            order_id,
            item_count: fields::ids(&order, "order_line").len(),
            total: fields::f64_field(&order, "amount_total"),
            synced,
        })
    }

    #[instrument(skip(odoo))]
    pub async fn get_cart(odoo: &OdooClient, partner_id: i64) -> Result<Cart, AppError> {
        let Some(order) = Self::draft_order(
            odoo,
            partner_id,
            &["id", "order_line", "amount_untaxed", "amount_tax", "amount_total"],
        )
        .await?
        else {
            return Ok(Cart::empty());
        };

        let lines = odoo
            .read(
                LINE_MODEL,
                &fields::ids(&order, "order_line"),
                &["id", "product_id", "product_uom_qty", "price_unit", "price_subtotal"],
            )
            .await
            .context("Failed to fetch cart")?;

        let product_ids: Vec<i64> = lines
            .iter()
            .filter_map(|line| fields::many2one_id(line, "product_id"))
            .collect();
        let products = odoo
            .read(
                PRODUCT_MODEL,
                &product_ids,
                &["id", "name", "image_128", "list_price", "slide_channel_id"],
            )
            .await
            .context("Failed to fetch cart")?;

        let course_ids: Vec<i64> = products
            .iter()
            .filter_map(|product| fields::many2one_id(product, "slide_channel_id"))
            .collect();
        let courses = odoo
            .read(
                COURSE_MODEL,
                &course_ids,
                &["id", "name", "website_slug", "image_512", "list_price", "discount_price"],
            )
            .await
            .context("Failed to fetch cart")?;

        let products = index_by_id(products);
        let courses = index_by_id(courses);

        let items = lines
            .iter()
            .map(|line| {
                let product = fields::many2one_id(line, "product_id").and_then(|id| products.get(&id));
                let course = product
                    .and_then(|p| fields::many2one_id(p, "slide_channel_id"))
                    .and_then(|id| courses.get(&id));
                cart_item(line, product, course)
            })
            .collect();

        Ok(Cart::from_order(&order, items))
    }

    /// Add a course to the draft order, incrementing an existing line.
    #[instrument(skip(odoo))]
    pub async fn add_item(
        odoo: &OdooClient,
        partner_id: i64,
        dto: AddToCartRequest,
    ) -> Result<CartUpdate, AppError> {
        let (order_id, _) = Self::draft_order_id(odoo, partner_id).await?;

        let product_id = Self::course_product(odoo, dto.course_id)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Course product not configured")))?;

        let existing = odoo
            .search_read(
                LINE_MODEL,
                SearchRead::new(
                    Domain::new()
                        .eq("order_id", order_id)
                        .eq("product_id", product_id),
                )
                .fields(&["id", "product_uom_qty"]),
            )
            .await
            .context("Failed to add to cart")?;

        match existing.first() {
            Some(line) => {
                let quantity = fields::i64_field(line, "product_uom_qty") + dto.quantity;
                odoo.write(
                    LINE_MODEL,
                    &[fields::i64_field(line, "id")],
                    json!({ "product_uom_qty": quantity }),
                )
                .await
                .context("Failed to add to cart")?;
            }
            None => {
                odoo.create(
                    LINE_MODEL,
                    json!({
                        "order_id": order_id,
                        "product_id": product_id,
                        "product_uom_qty": dto.quantity,
                    }),
                )
                .await
                .context("Failed to add to cart")?;
            }
        }

        track_cart_operation("add");
        Self::summary(odoo, order_id, None).await
    }

    /// Replace the draft order's lines with `dto.items`. Courses that do not
    /// exist or have no product are skipped.
    #[instrument(skip(odoo))]
    pub async fn sync(
        odoo: &OdooClient,
        partner_id: i64,
        dto: SyncCartRequest,
    ) -> Result<CartUpdate, AppError> {
        let (order_id, existing_lines) = Self::draft_order_id(odoo, partner_id).await?;
        odoo.unlink(LINE_MODEL, &existing_lines)
            .await
            .context("Failed to sync cart")?;

        for item in &dto.items {
            let product_id = match Self::course_product(odoo, item.course_id).await {
                Ok(Some(product_id)) => product_id,
                Ok(None) => {
                    warn!(course_id = item.course_id, "Course has no product configured, skipping");
                    continue;
                }
                Err(e) if e.status.as_u16() == 404 => {
                    warn!(course_id = item.course_id, "Course not found, skipping");
                    continue;
                }
                Err(e) => return Err(e),
            };

            odoo.create(
                LINE_MODEL,
                json!({
                    "order_id": order_id,
                    "product_id": product_id,
                    "product_uom_qty": item.quantity,
                }),
            )
            .await
            .context("Failed to sync cart")?;
        }

        track_cart_operation("sync");
        Self::summary(odoo, order_id, Some(dto.items.len())).await
    }
}

fn index_by_id(records: Vec<Value>) -> HashMap<i64, Value> {
    records
        .into_iter()
        .map(|record| (fields::i64_field(&record, "id"), record))
        .collect()
}
