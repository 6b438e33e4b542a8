use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::{IntoParams, ToSchema};

use seitech_core::serde::deserialize_optional_string;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub course_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    pub slug: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer: Option<OrderCustomer>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl CreateOrderRequest {
    /// Checks the order can be placed, in the order the checkout reports them.
    pub fn validate(&self) -> Result<&OrderCustomer, &'static str> {
        let customer = self
            .customer
            .as_ref()
            .filter(|c| !c.email.trim().is_empty())
            .ok_or("Customer email is required")?;
        if self.items.is_empty() {
            return Err("No items in order");
        }
        Ok(customer)
    }

    /// Body for the ERP order controller: customer details and course ids
    /// with prices only.
    pub fn erp_payload(&self, customer: &OrderCustomer) -> Value {
        json!({
            "customer": {
                "email": customer.email,
                "firstName": customer.first_name,
                "lastName": customer.last_name,
                "companyName": customer.company_name.as_deref().unwrap_or_default(),
            },
            "items": self
                .items
                .iter()
                .map(|item| json!({ "courseId": item.course_id, "price": item.price }))
                .collect::<Vec<_>>(),
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderLookupQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(email: &str) -> OrderCustomer {
        OrderCustomer {
            email: email.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            company_name: None,
        }
    }

    fn item() -> OrderItem {
        OrderItem {
            course_id: 12,
            name: "IOSH Managing Safely".into(),
            price: 495.0,
            slug: Some("iosh-managing-safely".into()),
        }
    }

    #[test]
    fn test_validate_order() {
        assert_eq!(CreateOrderRequest::default().validate().err(), Some("Customer email is required"));

        let request = CreateOrderRequest { customer: Some(customer("  ")), items: vec![item()] };
        assert_eq!(request.validate().err(), Some("Customer email is required"));

        let request = CreateOrderRequest { customer: Some(customer("ada@example.com")), items: vec![] };
        assert_eq!(request.validate().err(), Some("No items in order"));

        let request = CreateOrderRequest { customer: Some(customer("ada@example.com")), items: vec![item()] };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_erp_payload_strips_display_fields() {
        let request = CreateOrderRequest { customer: Some(customer("ada@example.com")), items: vec![item()] };
        let payload = request.erp_payload(request.validate().unwrap());
        assert_eq!(payload["customer"]["companyName"], "");
        assert_eq!(payload["items"][0], json!({ "courseId": 12, "price": 495.0 }));
    }
}
