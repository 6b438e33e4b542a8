//! Catalogue served while the ERP is unreachable.

use serde_json::{Value, json};

pub fn demo_courses() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "IOSH Managing Safely",
            "slug": "iosh-managing-safely",
            "shortDescription": "Equip managers to handle safety and health in their teams.",
            "categoryName": "Health & Safety",
            "deliveryMethod": "e-learning",
            "duration": "3 days",
            "price": 595.0,
            "currency": "GBP",
            "rating": 4.8,
            "enrollmentCount": 1240,
            "isFeatured": true,
            "accreditation": "IOSH",
        }),
        json!({
            "id": 2,
            "name": "NEBOSH General Certificate",
            "slug": "nebosh-general-certificate",
            "shortDescription": "The most widely held health and safety qualification in the UK.",
            "categoryName": "Health & Safety",
            "deliveryMethod": "classroom",
            "duration": "10 days",
            "price": 1495.0,
            "currency": "GBP",
            "rating": 4.9,
            "enrollmentCount": 860,
            "isFeatured": true,
            "accreditation": "NEBOSH",
        }),
        json!({
            "id": 3,
            "name": "Fire Safety Awareness",
            "slug": "fire-safety-awareness",
            "shortDescription": "Prevent fires at work and respond safely when they happen.",
            "categoryName": "Fire Safety",
            "deliveryMethod": "e-learning",
            "duration": "2 hours",
            "price": 35.0,
            "currency": "GBP",
            "rating": 4.6,
            "enrollmentCount": 2310,
            "isFeatured": false,
            "accreditation": "CPD",
        }),
        json!({
            "id": 4,
            "name": "Emergency First Aid at Work",
            "slug": "emergency-first-aid-at-work",
            "shortDescription": "One-day course meeting HSE requirements for appointed first aiders.",
            "categoryName": "First Aid",
            "deliveryMethod": "face-to-face",
            "duration": "1 day",
            "price": 125.0,
            "currency": "GBP",
            "rating": 4.7,
            "enrollmentCount": 1575,
            "isFeatured": false,
            "accreditation": "Qualsafe",
        }),
    ]
}

pub fn demo_categories() -> Vec<Value> {
    vec![
        json!({ "id": 1, "name": "Health & Safety", "slug": "health-safety", "courseCount": 2 }),
        json!({ "id": 2, "name": "Fire Safety", "slug": "fire-safety", "courseCount": 1 }),
        json!({ "id": 3, "name": "First Aid", "slug": "first-aid", "courseCount": 1 }),
        json!({ "id": 4, "name": "Environmental", "slug": "environmental", "courseCount": 0 }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use seitech_core::text::slugify;

    #[test]
    fn test_demo_slugs_match_names() {
        for course in demo_courses() {
            assert_eq!(course["slug"], slugify(course["name"].as_str().unwrap()));
        }
    }
}
