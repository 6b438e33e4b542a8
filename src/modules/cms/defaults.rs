//! Marketing content served while the ERP is unreachable.

use chrono::{Datelike, Utc};
use serde_json::{Value, json};

pub fn site_settings() -> Value {
    json!({
        "siteName": "SEI Tech International",
        "logo": null,
        "logoDark": null,
        "favicon": null,
        "tagline": "Professional Health & Safety Training",
        "contact": {
            "companyName": "SEI Tech International Ltd",
            "email": "info@seitech.co.uk",
            "phone": "+44 (0) 123 456 7890",
            "address": {
                "street": "123 Training House",
                "city": "London",
                "postcode": "EC1A 1BB",
                "country": "United Kingdom",
            },
        },
        "social": {
            "facebook": "https://facebook.com/seitechuk",
            "twitter": "https://twitter.com/seitechuk",
            "linkedin": "https://linkedin.com/company/seitech-international",
        },
        "businessHours": "{}",
        "timezone": "Europe/London",
        "seo": {
            "defaultMetaTitle": "SEI Tech International | Health & Safety Training",
            "defaultMetaDescription": "Professional health and safety training courses. IOSH, NEBOSH, and Qualsafe accredited.",
        },
        "legal": {
            "privacyPolicyUrl": "/privacy",
            "termsUrl": "/terms",
            "cookiePolicyUrl": "/cookies",
        },
        "features": {
            "enableLiveChat": false,
            "enableNewsletter": true,
            "maintenanceMode": false,
        },
        "footer": {
            "copyright": format!("© {} SEI Tech International. All rights reserved.", Utc::now().year()),
        },
    })
}

fn nav_item(id: i64, name: &str, url: &str, description: &str, children: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": name,
        "url": url,
        "icon": "",
        "description": description,
        "openNewTab": false,
        "isHighlighted": false,
        "children": children,
    })
}

fn nav_link(id: i64, name: &str, url: &str) -> Value {
    nav_item(id, name, url, "", Vec::new())
}

/// Menu for a navigation slot. Unknown slots are empty.
pub fn navigation(kind: &str) -> Vec<Value> {
    match kind {
        "header" => {
            let mut contact = nav_item(5, "Contact", "/contact", "Get in touch", Vec::new());
            contact["isHighlighted"] = Value::Bool(true);
            vec![
                nav_item(
                    1,
                    "Training",
                    "/training",
                    "Browse our courses",
                    vec![
                        nav_link(11, "All Courses", "/courses"),
                        nav_link(12, "IOSH Courses", "/courses/iosh"),
                        nav_link(13, "NEBOSH Courses", "/courses/nebosh"),
                        nav_link(14, "First Aid", "/courses/first-aid"),
                    ],
                ),
                nav_item(2, "Consultancy", "/consultancy", "Expert consultancy services", Vec::new()),
                nav_item(3, "E-Learning", "/e-learning", "Online training platform", Vec::new()),
                nav_item(4, "About", "/about", "About SEI Tech", Vec::new()),
                contact,
            ]
        }
        "footer" => vec![
            nav_item(
                101,
                "Quick Links",
                "#",
                "",
                vec![
                    nav_link(111, "Home", "/"),
                    nav_link(112, "Courses", "/courses"),
                    nav_link(113, "About Us", "/about"),
                    nav_link(114, "Contact", "/contact"),
                ],
            ),
            nav_item(
                102,
                "Legal",
                "#",
                "",
                vec![
                    nav_link(121, "Privacy Policy", "/privacy"),
                    nav_link(122, "Terms of Service", "/terms"),
                    nav_link(123, "Cookie Policy", "/cookies"),
                ],
            ),
        ],
        _ => Vec::new(),
    }
}

fn testimonial(id: i64, name: &str, title: &str, company: &str, content: &str, service_type: &str, source: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "title": title,
        "company": company,
        "avatar": null,
        "content": content,
        "rating": 5,
        "courseId": null,
        "courseName": null,
        "serviceType": service_type,
        "isFeatured": true,
        "source": source,
        "sourceUrl": "",
        "date": null,
    })
}

pub fn testimonials() -> Vec<Value> {
    vec![
        testimonial(
            1,
            "Sarah Thompson",
            "Health & Safety Manager",
            "ABC Construction Ltd",
            "The IOSH Managing Safely course was excellent. The trainer was knowledgeable and made complex topics easy to understand. Highly recommend SEI Tech for anyone looking to improve their safety skills.",
            "training",
            "google",
        ),
        testimonial(
            2,
            "James Wilson",
            "Operations Director",
            "Wilson Manufacturing",
            "We've used SEI Tech for all our in-house training needs. Their flexible approach and professional trainers have made a real difference to our safety culture.",
            "training",
            "linkedin",
        ),
        testimonial(
            3,
            "Emma Roberts",
            "HR Director",
            "Metro Hotels Group",
            "The e-learning platform is fantastic. Our staff can complete training at their own pace, and the certificates are issued immediately. Great value for money.",
            "elearning",
            "trustpilot",
        ),
    ]
}

fn faq(id: i64, question: &str, answer: &str, short_answer: &str, category: (i64, &str, &str)) -> Value {
    let (category_id, category_name, category_slug) = category;
    json!({
        "id": id,
        "question": question,
        "answer": answer,
        "shortAnswer": short_answer,
        "categoryId": category_id,
        "categoryName": category_name,
        "categorySlug": category_slug,
        "isFeatured": true,
        "viewCount": 0,
        "helpfulCount": 0,
    })
}

pub fn faqs() -> Vec<Value> {
    vec![
        faq(
            1,
            "What qualifications do I need to take the IOSH Managing Safely course?",
            "<p>There are no formal entry requirements for the IOSH Managing Safely course. It's designed for managers and supervisors at all levels who need to understand workplace health and safety responsibilities. A basic understanding of English is required as the course materials and assessments are in English.</p>",
            "No formal qualifications required. The course is open to all managers and supervisors.",
            (1, "Courses & Training", "courses-training"),
        ),
        faq(
            2,
            "How long is the NEBOSH General Certificate valid for?",
            "<p>The NEBOSH National General Certificate in Occupational Health and Safety has no expiry date. Once achieved, the qualification is valid for life. However, many employers may require refresher training or CPD to ensure knowledge remains current.</p>",
            "The NEBOSH General Certificate is valid for life with no expiry date.",
            (2, "Certificates", "certificates"),
        ),
        faq(
            3,
            "Can I pay for courses in instalments?",
            "<p>Yes, we offer flexible payment options for many of our courses. For courses over £200, you can spread the cost with our interest-free payment plans. Contact our team to discuss payment options suitable for your needs.</p>",
            "Yes, interest-free payment plans are available for courses over £200.",
            (3, "Booking & Payment", "booking-payment"),
        ),
    ]
}

pub fn faq_categories() -> Vec<Value> {
    [
        (1, "General Questions", "general", "help-circle"),
        (2, "Courses & Training", "courses-training", "book-open"),
        (3, "Booking & Payment", "booking-payment", "credit-card"),
        (4, "Certificates", "certificates", "award"),
    ]
    .into_iter()
    .map(|(id, name, slug, icon)| {
        json!({
            "id": id,
            "name": name,
            "slug": slug,
            "description": "",
            "icon": icon,
            "faqCount": 0,
            "faqs": [],
        })
    })
    .collect()
}

fn service(
    id: i64,
    name: &str,
    short_description: &str,
    icon: &str,
    (features, benefits): (&[&str], &[&str]),
    price_from: u32,
    meta: (&str, &str),
) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": seitech_core::text::slugify(name),
        "shortDescription": short_description,
        "fullDescription": "",
        "iconName": icon,
        "image": null,
        "categoryId": 1,
        "categoryName": "Risk Assessment",
        "categorySlug": "risk-assessment",
        "features": features,
        "benefits": benefits,
        "pricingType": "quote",
        "priceFrom": price_from,
        "priceTo": 0,
        "priceCurrency": "GBP",
        "isFeatured": true,
        "metaTitle": meta.0,
        "metaDescription": meta.1,
    })
}

pub fn services() -> Vec<Value> {
    vec![
        service(
            1,
            "Fire Risk Assessment",
            "Comprehensive fire risk assessments to ensure compliance and protect your premises.",
            "Flame",
            (
                &[
                    "Full premises inspection",
                    "Fire hazard identification",
                    "Escape route assessment",
                    "Documentation review",
                ],
                &["Legal compliance", "Insurance requirements met", "Staff safety improved"],
            ),
            250,
            (
                "Fire Risk Assessment Services",
                "Professional fire risk assessment services for businesses across the UK.",
            ),
        ),
        service(
            2,
            "Health & Safety Audit",
            "Thorough workplace audits to identify hazards and ensure regulatory compliance.",
            "Shield",
            (
                &[
                    "Workplace inspection",
                    "Policy review",
                    "Compliance check",
                    "Recommendations report",
                ],
                &["Identify risks", "Improve safety culture", "Reduce incidents"],
            ),
            350,
            (
                "Health & Safety Audit Services",
                "Professional health and safety audit services for UK businesses.",
            ),
        ),
    ]
}

pub fn service_categories() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "name": "Risk Assessment",
            "slug": "risk-assessment",
            "description": "Comprehensive risk assessment services for workplace safety",
            "icon": "AlertTriangle",
            "serviceCount": 6,
        }),
        json!({
            "id": 2,
            "name": "Management Systems",
            "slug": "management-systems",
            "description": "ISO certification and management system consultancy",
            "icon": "Settings",
            "serviceCount": 3,
        }),
        json!({
            "id": 3,
            "name": "Compliance & Documentation",
            "slug": "compliance-documentation",
            "description": "Policy writing and compliance documentation services",
            "icon": "FileText",
            "serviceCount": 3,
        }),
    ]
}

pub fn partners() -> Vec<Value> {
    [
        (
            1,
            "IOSH",
            "https://www.iosh.com",
            "Institution of Occupational Safety and Health - the world's largest health and safety membership organization.",
        ),
        (
            2,
            "NEBOSH",
            "https://www.nebosh.org.uk",
            "National Examination Board in Occupational Safety and Health - a leading global organization providing health and safety qualifications.",
        ),
        (
            3,
            "Qualsafe Awards",
            "https://www.qualsafeawards.org",
            "Qualsafe Awards is a leading Awarding Organisation for First Aid and Health & Safety qualifications.",
        ),
    ]
    .into_iter()
    .map(|(id, name, website, description)| {
        json!({
            "id": id,
            "name": name,
            "logo": null,
            "logoDark": null,
            "websiteUrl": website,
            "description": description,
            "partnerType": "accreditation",
            "accreditationNumber": "",
            "accreditationExpiry": null,
            "certificateUrl": "",
            "isFeatured": true,
        })
    })
    .collect()
}

fn team_member(id: i64, name: &str, job_title: &str, department: &str, bio: &str, qualifications: &str, is_instructor: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": seitech_core::text::slugify(name),
        "image": null,
        "jobTitle": job_title,
        "department": department,
        "shortBio": bio,
        "fullBio": "",
        "qualifications": qualifications,
        "certifications": "",
        "specializations": "",
        "email": "",
        "linkedinUrl": "",
        "twitterUrl": "",
        "isInstructor": is_instructor,
        "isFeatured": true,
    })
}

pub fn team() -> Vec<Value> {
    vec![
        team_member(
            1,
            "David Mitchell",
            "Managing Director",
            "leadership",
            "David founded SEI Tech with a vision to make quality health and safety training accessible to all businesses.",
            "NEBOSH Diploma, CMIOSH, MBA",
            false,
        ),
        team_member(
            2,
            "Sarah Johnson",
            "Lead Training Consultant",
            "training",
            "Sarah is an experienced IOSH and NEBOSH trainer with over 15 years in health and safety education.",
            "NEBOSH Diploma, PTLLS, IOSH Certified Trainer",
            true,
        ),
    ]
}

/// Headline figures, narrowed to one display location when given.
pub fn statistics(location: Option<&str>) -> Vec<Value> {
    [
        (1, "Professionals Trained", "5,000+", 5000, "+", "Certified professionals across the UK", "Users", "counter"),
        (2, "Years Experience", "15+", 15, "+ years", "In health and safety training", "Calendar", "counter"),
        (3, "Pass Rate", "98%", 98, "%", "Industry-leading success rate", "TrendingUp", "percentage"),
        (4, "Accreditations", "12+", 12, "+", "Including IOSH, NEBOSH, Qualsafe", "Award", "counter"),
    ]
    .into_iter()
    .map(|(id, name, value, numeric, suffix, description, icon, stat_type)| {
        json!({
            "id": id,
            "name": name,
            "value": value,
            "numericValue": numeric,
            "suffix": suffix,
            "description": description,
            "icon": icon,
            "statType": stat_type,
            "displayLocation": "homepage",
        })
    })
    .filter(|stat| location.is_none_or(|location| stat["displayLocation"] == location))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_slots() {
        let header = navigation("header");
        assert_eq!(header.len(), 5);
        assert_eq!(header[0]["children"].as_array().unwrap().len(), 4);
        assert_eq!(header[4]["isHighlighted"], true);
        assert_eq!(navigation("footer").len(), 2);
        assert!(navigation("sidebar").is_empty());
    }

    #[test]
    fn test_statistics_filtered_by_location() {
        assert_eq!(statistics(None).len(), 4);
        assert_eq!(statistics(Some("homepage")).len(), 4);
        assert!(statistics(Some("about")).is_empty());
    }

    #[test]
    fn test_generated_slugs() {
        assert_eq!(services()[1]["slug"], "health-safety-audit");
        assert_eq!(team()[0]["slug"], "david-mitchell");
    }

    #[test]
    fn test_copyright_carries_current_year() {
        let settings = site_settings();
        let copyright = settings["footer"]["copyright"].as_str().unwrap();
        assert!(copyright.contains(&Utc::now().year().to_string()));
    }
}
