use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use seitech_core::pagination::{MAX_OFFSET, total_pages};
use seitech_core::serde::{
    deserialize_optional_bool, deserialize_optional_i64, deserialize_optional_string,
};
use seitech_core::text::slugify;
use seitech_odoo::fields;

pub const POST_MODEL: &str = "blog.post";
pub const BLOG_MODEL: &str = "blog.blog";

pub const POST_FIELDS: &[&str] = &[
    "name",
    "subtitle",
    "website_slug",
    "teaser",
    "content",
    "cover_properties",
    "blog_id",
    "author_id",
    "tag_ids",
    "published_date",
    "visits",
    "is_published",
    "is_featured",
    "website_meta_title",
    "website_meta_description",
];

pub const DEFAULT_AUTHOR: &str = "SEI Tech Team";
const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogQuery {
    /// Defaults to 1
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Defaults to 10, at most 50
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub featured: Option<bool>,
}

impl BlogQuery {
    /// `(page, limit)`; out-of-range values are rejected rather than clamped.
    pub fn window(&self) -> Option<(i64, i64)> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(10);
        let in_range = page >= 1
            && (1..=50).contains(&limit)
            && (page - 1).checked_mul(limit).is_some_and(|offset| offset <= MAX_OFFSET);
        in_range.then_some((page, limit))
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BlogAuthor {
    pub id: i64,
    pub name: String,
    pub avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image_url: String,
    pub author: BlogAuthor,
    pub category: String,
    pub category_slug: String,
    pub published_at: String,
    pub read_time: i64,
    pub tags: Vec<String>,
    pub meta_title: String,
    pub meta_description: String,
    pub is_featured: bool,
}

impl BlogPost {
    pub fn from_record(record: &Value) -> Self {
        let id = fields::i64_field(record, "id");
        let title = fields::string_or_empty(record, "name");
        let content = fields::string_or_empty(record, "content");
        let teaser = fields::string(record, "teaser");
        let category = fields::many2one_name(record, "blog_id").unwrap_or_else(|| "General".into());

        Self {
            id,
            slug: fields::string(record, "website_slug").unwrap_or_else(|| id.to_string()),
            excerpt: teaser
                .clone()
                .or_else(|| fields::string(record, "subtitle"))
                .unwrap_or_default(),
            read_time: read_time(&content),
            content,
            image_url: cover_image(record),
            author: BlogAuthor {
                id: fields::many2one_id(record, "author_id").unwrap_or(0),
                name: fields::many2one_name(record, "author_id").unwrap_or_else(|| DEFAULT_AUTHOR.into()),
                avatar: String::new(),
                role: None,
                bio: None,
            },
            category_slug: category_slug(&category),
            category,
            published_at: fields::string(record, "published_date")
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
            tags: Vec::new(),
            meta_title: fields::string(record, "website_meta_title").unwrap_or_else(|| title.clone()),
            meta_description: fields::string(record, "website_meta_description")
                .or(teaser)
                .unwrap_or_default(),
            is_featured: fields::bool_field(record, "is_featured"),
            title,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub post_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogPagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl BlogPagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self { page, limit, total, total_pages: total_pages(total, limit) }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogList {
    pub posts: Vec<BlogPost>,
    pub pagination: BlogPagination,
    pub categories: Vec<BlogCategory>,
    /// First featured post on the page, else the first post
    pub featured_post: Option<BlogPost>,
}

impl BlogList {
    pub fn new(posts: Vec<BlogPost>, pagination: BlogPagination, categories: Vec<BlogCategory>) -> Self {
        let featured_post = posts.iter().find(|p| p.is_featured).or(posts.first()).cloned();
        Self { posts, pagination, categories, featured_post }
    }
}

/// Minutes to read an HTML body at 200 words a minute, never less than one.
pub fn read_time(html: &str) -> i64 {
    let words = strip_tags(html).split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i64
}

fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

pub fn category_slug(name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() { "general".into() } else { slug }
}

/// `background_image` out of the JSON-encoded `cover_properties`.
fn cover_image(record: &Value) -> String {
    fields::string(record, "cover_properties")
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .and_then(|props| props.get("background_image")?.as_str().map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_time() {
        assert_eq!(read_time(""), 1);
        let words = vec!["word"; 401].join(" ");
        assert_eq!(read_time(&format!("<p>{words}</p>")), 3);
        assert_eq!(read_time(&vec!["word"; 200].join(" ")), 1);
    }

    #[test]
    fn test_strip_tags_separates_words() {
        assert_eq!(strip_tags("<h2>Fire</h2><p>Safety</p>").split_whitespace().count(), 2);
    }

    #[test]
    fn test_window_bounds() {
        assert_eq!(BlogQuery::default().window(), Some((1, 10)));
        let query = BlogQuery { limit: Some(51), ..Default::default() };
        assert_eq!(query.window(), None);
        let query = BlogQuery { page: Some(0), ..Default::default() };
        assert_eq!(query.window(), None);
        let query = BlogQuery { page: Some(i64::MAX), ..Default::default() };
        assert_eq!(query.window(), None);
    }

    #[test]
    fn test_post_from_record() {
        let record = json!({
            "id": 4,
            "name": "Working at Height",
            "website_slug": false,
            "teaser": "Ladders, scaffolds and the law.",
            "content": "<p>Falls remain a leading cause of fatal injury.</p>",
            "cover_properties": "{\"background_image\": \"url('/web/image/88')\"}",
            "blog_id": [2, "Health & Safety"],
            "author_id": false,
            "published_date": "2024-10-01 09:00:00",
            "is_featured": false,
            "website_meta_title": false,
            "website_meta_description": false,
        });
        let post = BlogPost::from_record(&record);
        assert_eq!(post.slug, "4");
        assert_eq!(post.image_url, "url('/web/image/88')");
        assert_eq!(post.author.name, DEFAULT_AUTHOR);
        assert_eq!(post.category_slug, "health-safety");
        assert_eq!(post.meta_title, "Working at Height");
        assert_eq!(post.meta_description, "Ladders, scaffolds and the law.");
        assert_eq!(post.read_time, 1);
    }

    #[test]
    fn test_featured_post_prefers_flagged() {
        let first = BlogPost::from_record(&json!({ "id": 1, "name": "A" }));
        let mut second = BlogPost::from_record(&json!({ "id": 2, "name": "B" }));
        second.is_featured = true;
        let list = BlogList::new(vec![first.clone(), second], BlogPagination::new(1, 10, 2), vec![]);
        assert_eq!(list.featured_post.map(|p| p.id), Some(2));

        let list = BlogList::new(vec![first], BlogPagination::new(1, 10, 1), vec![]);
        assert_eq!(list.featured_post.map(|p| p.id), Some(1));
    }
}
