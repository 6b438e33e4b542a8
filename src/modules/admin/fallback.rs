//! Back-office data shown in demo mode or while the ERP admin API is down.

use chrono::{Duration, Utc};
use serde_json::{Value, json};

pub fn users() -> Vec<Value> {
    vec![
        json!({ "id": 1, "name": "John Doe", "email": "john.doe@example.com", "role": "student", "status": "active", "enrollments": 3, "joinDate": "2024-01-15", "lastLogin": "2025-12-23" }),
        json!({ "id": 2, "name": "Jane Smith", "email": "jane.smith@example.com", "role": "student", "status": "active", "enrollments": 5, "joinDate": "2024-02-03", "lastLogin": "2025-12-22" }),
        json!({ "id": 3, "name": "Sarah Mitchell", "email": "sarah.mitchell@seitech.co.uk", "role": "instructor", "status": "active", "enrollments": 0, "joinDate": "2023-11-20", "lastLogin": "2025-12-24" }),
        json!({ "id": 4, "name": "Tom Baker", "email": "tom.baker@example.com", "role": "student_admin", "status": "active", "enrollments": 12, "joinDate": "2024-04-18", "lastLogin": "2025-12-19" }),
        json!({ "id": 5, "name": "Priya Shah", "email": "priya.shah@example.com", "role": "student", "status": "inactive", "enrollments": 1, "joinDate": "2024-06-30", "lastLogin": null }),
    ]
}

pub fn user(id: i64) -> Value {
    json!({
        "id": id,
        "name": "John Doe",
        "email": "john.doe@example.com",
        "role": "student",
        "status": "active",
        "phone": "+44 7700 900123",
        "enrollments": [
            { "id": 1, "courseId": 1, "courseTitle": "IOSH Managing Safely", "progress": 75, "status": "in_progress", "enrolledDate": "2024-06-01" },
            { "id": 2, "courseId": 3, "courseTitle": "Fire Safety Awareness", "progress": 100, "status": "completed", "enrolledDate": "2024-03-15", "completedDate": "2024-03-20" },
        ],
        "certificates": [
            { "id": 1, "courseId": 3, "courseTitle": "Fire Safety Awareness", "issuedDate": "2024-03-22", "certificateNumber": "CERT-2024-001234" },
        ],
        "joinDate": "2024-01-15",
        "lastLogin": "2025-12-23T14:30:00Z",
        "totalCoursesCompleted": 1,
        "totalHoursLearned": 26,
    })
}

pub fn courses() -> Vec<Value> {
    vec![
        json!({ "id": 1, "title": "IOSH Managing Safely", "slug": "iosh-managing-safely", "instructor": { "id": 3, "name": "Sarah Mitchell" }, "category": "Health & Safety", "status": "published", "enrollments": 1240, "rating": 4.8, "totalReviews": 312, "duration": "24 hours", "lessons": 7 }),
        json!({ "id": 2, "title": "NEBOSH General Certificate", "slug": "nebosh-general-certificate", "instructor": { "id": 6, "name": "James Thompson" }, "category": "Health & Safety", "status": "published", "enrollments": 860, "rating": 4.9, "totalReviews": 201, "duration": "80 hours", "lessons": 11 }),
        json!({ "id": 3, "title": "Fire Safety Awareness", "slug": "fire-safety-awareness", "instructor": { "id": 3, "name": "Sarah Mitchell" }, "category": "Fire Safety", "status": "published", "enrollments": 2150, "rating": 4.7, "totalReviews": 540, "duration": "3 hours", "lessons": 5 }),
        json!({ "id": 4, "title": "Emergency First Aid at Work", "slug": "emergency-first-aid-at-work", "instructor": { "id": 7, "name": "Dr. Emily Roberts" }, "category": "First Aid", "status": "draft", "enrollments": 0, "rating": 0.0, "totalReviews": 0, "duration": "6 hours", "lessons": 6 }),
    ]
}

pub fn course(id: i64) -> Value {
    json!({
        "id": id,
        "title": "IOSH Managing Safely",
        "slug": "iosh-managing-safely",
        "description": "Equip managers to handle safety and health in their teams.",
        "instructor": { "id": 3, "name": "Sarah Mitchell", "email": "sarah.mitchell@seitech.co.uk" },
        "category": "Health & Safety",
        "level": "intermediate",
        "price": 595.0,
        "status": "published",
        "enrollments": 1240,
        "activeStudents": 187,
        "completedStudents": 1016,
        "rating": 4.8,
        "totalReviews": 312,
        "duration": "3 days",
        "lessons": 7,
        "modules": [
            { "id": 1, "title": "Introducing Managing Safely", "lessons": 1, "order": 1 },
            { "id": 2, "title": "Assessing Risks", "lessons": 1, "order": 2 },
            { "id": 3, "title": "Controlling Risks", "lessons": 1, "order": 3 },
        ],
        "certificateAvailable": true,
        "stats": { "averageProgress": 62, "completionRate": 82, "dropoutRate": 4 },
    })
}

pub fn instructors() -> Vec<Value> {
    vec![
        json!({ "id": 1, "name": "Sarah Mitchell", "email": "sarah.mitchell@seitech.co.uk", "status": "active", "expertise": ["Fire Safety", "Risk Assessment"], "bio": "Fire safety consultant with 15 years in the field.", "courses": 8, "students": 456, "rating": 4.9, "totalReviews": 234, "joinDate": "2024-01-10" }),
        json!({ "id": 2, "name": "James Thompson", "email": "james.thompson@seitech.co.uk", "status": "active", "expertise": ["IOSH", "NEBOSH", "Manual Handling"], "bio": "Chartered safety practitioner and IOSH tutor.", "courses": 6, "students": 389, "rating": 4.8, "totalReviews": 198, "joinDate": "2024-01-15" }),
        json!({ "id": 3, "name": "Dr. Emily Roberts", "email": "emily.roberts@seitech.co.uk", "status": "active", "expertise": ["Mental Health First Aid", "Wellbeing"], "bio": "Occupational psychologist and MHFA instructor.", "courses": 4, "students": 312, "rating": 4.7, "totalReviews": 167, "joinDate": "2024-02-01" }),
        json!({ "id": 4, "name": "Robert Kumar", "email": "robert.kumar@seitech.co.uk", "status": "inactive", "expertise": ["COSHH", "Environmental"], "bio": "Environmental compliance specialist.", "courses": 3, "students": 145, "rating": 4.5, "totalReviews": 89, "joinDate": "2024-02-15" }),
    ]
}

pub fn instructor(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Sarah Mitchell",
        "email": "sarah.mitchell@seitech.co.uk",
        "status": "active",
        "expertise": ["Fire Safety", "Risk Assessment", "Evacuation Planning"],
        "bio": "Fire safety consultant with 15 years in the field.",
        "courses": [
            { "id": 3, "title": "Fire Safety Awareness", "students": 2150, "rating": 4.7, "status": "published" },
            { "id": 1, "title": "IOSH Managing Safely", "students": 1240, "rating": 4.8, "status": "published" },
        ],
        "students": 456,
        "rating": 4.9,
        "totalReviews": 234,
        "joinDate": "2024-01-10",
    })
}

pub fn analytics_overview() -> Value {
    let now = Utc::now();
    json!({
        "overview": {
            "totalStudents": 1247,
            "totalCourses": 45,
            "totalInstructors": 23,
            "activeEnrollments": 892,
            "totalRevenue": 124500,
            "certificatesIssued": 634,
        },
        "recentActivity": [
            { "id": 1, "type": "enrollment", "user": "John Doe", "course": "IOSH Managing Safely", "timestamp": now.to_rfc3339() },
            { "id": 2, "type": "certificate", "user": "Jane Smith", "course": "Fire Safety Awareness", "timestamp": (now - Duration::hours(1)).to_rfc3339() },
            { "id": 3, "type": "course_created", "instructor": "Dr. Emily Roberts", "course": "Mental Health First Aid", "timestamp": (now - Duration::hours(2)).to_rfc3339() },
        ],
        "monthlyStats": [
            { "month": "Jan", "enrollments": 45, "revenue": 8500, "certificates": 32 },
            { "month": "Feb", "enrollments": 52, "revenue": 9800, "certificates": 38 },
            { "month": "Mar", "enrollments": 61, "revenue": 11200, "certificates": 45 },
            { "month": "Apr", "enrollments": 58, "revenue": 10500, "certificates": 41 },
            { "month": "May", "enrollments": 67, "revenue": 12300, "certificates": 48 },
            { "month": "Jun", "enrollments": 74, "revenue": 13600, "certificates": 55 },
        ],
        "topCourses": [
            { "id": 3, "title": "Fire Safety Awareness", "enrollments": 234, "revenue": 23400, "rating": 4.7 },
            { "id": 1, "title": "IOSH Managing Safely", "enrollments": 189, "revenue": 18900, "rating": 4.8 },
            { "id": 2, "title": "NEBOSH General Certificate", "enrollments": 156, "revenue": 15600, "rating": 4.9 },
        ],
        "topInstructors": [
            { "id": 1, "name": "Sarah Mitchell", "courses": 8, "students": 456, "rating": 4.9 },
            { "id": 2, "name": "James Thompson", "courses": 6, "students": 389, "rating": 4.8 },
            { "id": 3, "name": "Dr. Emily Roberts", "courses": 4, "students": 312, "rating": 4.7 },
        ],
    })
}

/// Case-insensitive match on any of the string fields, or any element of a
/// string array field.
pub fn matches_search(record: &Value, keys: &[&str], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    keys.iter().any(|key| match record.get(*key) {
        Some(Value::String(s)) => s.to_lowercase().contains(&needle),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains(&needle)),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_reaches_into_arrays() {
        let instructor = &instructors()[1];
        assert!(matches_search(instructor, &["name", "expertise"], "nebosh"));
        assert!(!matches_search(instructor, &["name"], "nebosh"));
    }

    #[test]
    fn test_detail_uses_requested_id() {
        assert_eq!(user(42)["id"], 42);
        assert_eq!(course(7)["id"], 7);
        assert_eq!(instructor(3)["id"], 3);
    }
}
