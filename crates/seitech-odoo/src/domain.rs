//! Search domain builder.
//!
//! Odoo domains are lists of `[field, operator, value]` leaves combined in
//! prefix notation: consecutive leaves are AND-ed, and `"|"` ORs the next two
//! terms.
//!
//! ```ignore
//! let domain = Domain::new()
//!     .eq("website_published", true)
//!     .any_of([("name", "ilike", json!("fire")), ("description", "ilike", json!("fire"))]);
//! // [["website_published","=",true],"|",["name","ilike","fire"],["description","ilike","fire"]]
//! ```

use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Domain(Vec<Value>);

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(mut self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.0.push(json!([field, operator, value.into()]));
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.leaf(field, "=", value)
    }

    pub fn ne(self, field: &str, value: impl Into<Value>) -> Self {
        self.leaf(field, "!=", value)
    }

    pub fn ilike(self, field: &str, value: impl Into<Value>) -> Self {
        self.leaf(field, "ilike", value)
    }

    pub fn in_<T: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.leaf(field, "in", values)
    }

    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.leaf(field, ">", value)
    }

    pub fn ge(self, field: &str, value: impl Into<Value>) -> Self {
        self.leaf(field, ">=", value)
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.leaf(field, "<", value)
    }

    pub fn le(self, field: &str, value: impl Into<Value>) -> Self {
        self.leaf(field, "<=", value)
    }

    /// OR together all given leaves. A single leaf is added as-is.
    pub fn any_of<'a>(mut self, leaves: impl IntoIterator<Item = (&'a str, &'a str, Value)>) -> Self {
        let leaves: Vec<Value> = leaves
            .into_iter()
            .map(|(field, op, value)| json!([field, op, value]))
            .collect();
        for _ in 1..leaves.len() {
            self.0.push(Value::String("|".into()));
        }
        self.0.extend(leaves);
        self
    }

    /// Apply `f` only when `value` is present.
    pub fn when_some<T>(self, value: Option<T>, f: impl FnOnce(Self, T) -> Self) -> Self {
        match value {
            Some(value) => f(self, value),
            None => self,
        }
    }

    pub fn when(self, condition: bool, f: impl FnOnce(Self) -> Self) -> Self {
        if condition { f(self) } else { self }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Array(self.0)
    }
}

impl From<Domain> for Value {
    fn from(domain: Domain) -> Self {
        domain.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_domain() {
        assert_eq!(Domain::new().into_value(), json!([]));
    }

    #[test]
    fn test_and_leaves() {
        let domain = Domain::new()
            .eq("website_published", true)
            .ilike("name", "fire");
        assert_eq!(
            domain.into_value(),
            json!([["website_published", "=", true], ["name", "ilike", "fire"]])
        );
    }

    #[test]
    fn test_any_of_prefixes_operators() {
        let domain = Domain::new().any_of([
            ("name", "ilike", json!("x")),
            ("content", "ilike", json!("x")),
            ("email", "ilike", json!("x")),
        ]);
        assert_eq!(
            domain.into_value(),
            json!([
                "|",
                "|",
                ["name", "ilike", "x"],
                ["content", "ilike", "x"],
                ["email", "ilike", "x"]
            ])
        );
    }

    #[test]
    fn test_any_of_single_leaf() {
        let domain = Domain::new().any_of([("state", "=", json!("done"))]);
        assert_eq!(domain.into_value(), json!([["state", "=", "done"]]));
    }

    #[test]
    fn test_in_and_conditionals() {
        let domain = Domain::new()
            .in_("state", ["published", "resolved"])
            .when_some(Some(5), |d, id| d.eq("course_id", id))
            .when_some(None::<i64>, |d, id| d.eq("author_id", id))
            .when(false, |d| d.eq("is_pinned", true));
        assert_eq!(
            domain.into_value(),
            json!([["state", "in", ["published", "resolved"]], ["course_id", "=", 5]])
        );
    }
}
