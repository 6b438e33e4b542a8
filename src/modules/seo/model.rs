use chrono::{DateTime, Utc};
use serde_json::Value;

use seitech_core::text::slugify;
use seitech_odoo::fields;

pub const CATEGORY_MODEL: &str = "slide.channel.category";

/// Sitemap priority and change frequency for a page.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("", "daily", "1.0"),
    ("/courses", "daily", "0.9"),
    ("/consultancy", "weekly", "0.8"),
    ("/about", "monthly", "0.7"),
    ("/contact", "monthly", "0.7"),
    ("/blog", "weekly", "0.7"),
    ("/certificates/verify", "monthly", "0.6"),
];

pub fn static_urls(site_url: &str, now: DateTime<Utc>) -> Vec<SitemapUrl> {
    let lastmod = now.to_rfc3339();
    STATIC_PAGES
        .iter()
        .map(|&(path, changefreq, priority)| SitemapUrl {
            loc: format!("{site_url}{path}"),
            lastmod: lastmod.clone(),
            changefreq,
            priority,
        })
        .collect()
}

/// `write_date` as RFC 3339, or now when the record has none.
fn lastmod(record: &Value, now: DateTime<Utc>) -> String {
    fields::datetime_field(record, "write_date")
        .unwrap_or(now)
        .to_rfc3339()
}

pub fn category_url(site_url: &str, record: &Value, now: DateTime<Utc>) -> SitemapUrl {
    SitemapUrl {
        loc: format!(
            "{site_url}/courses?category={}",
            slugify(&fields::string_or_empty(record, "name"))
        ),
        lastmod: lastmod(record, now),
        changefreq: "weekly",
        priority: "0.8",
    }
}

pub fn course_url(site_url: &str, record: &Value, now: DateTime<Utc>) -> SitemapUrl {
    SitemapUrl {
        loc: format!(
            "{site_url}/courses/{}",
            slugify(&fields::string_or_empty(record, "name"))
        ),
        lastmod: lastmod(record, now),
        changefreq: "weekly",
        priority: "0.7",
    }
}

pub fn render_sitemap(urls: &[SitemapUrl]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for url in urls {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            escape_xml(&url.loc),
            url.lastmod,
            url.changefreq,
            url.priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_robots(site_url: &str) -> String {
    format!(
        "# robots.txt for SEI Tech\n\
         # {site_url}\n\
         \n\
         User-agent: *\n\
         Allow: /\n\
         \n\
         Disallow: /api/\n\
         Disallow: /admin/\n\
         Disallow: /_next/\n\
         Disallow: /dashboard/\n\
         Disallow: /login\n\
         Disallow: /register\n\
         Disallow: /forgot-password\n\
         Disallow: /cart\n\
         Disallow: /checkout\n\
         \n\
         Allow: /courses\n\
         Allow: /consultancy\n\
         Allow: /about\n\
         Allow: /contact\n\
         Allow: /certificates/verify\n\
         \n\
         Crawl-delay: 1\n\
         \n\
         Sitemap: {site_url}/api/sitemap\n\
         \n\
         User-agent: Googlebot\n\
         Allow: /\n\
         \n\
         User-agent: Bingbot\n\
         Allow: /\n\
         \n\
         User-agent: SemrushBot\n\
         Crawl-delay: 5\n\
         \n\
         User-agent: AhrefsBot\n\
         Crawl-delay: 5\n\
         \n\
         User-agent: DotBot\n\
         Crawl-delay: 5\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_static_urls_start_with_home() {
        let urls = static_urls("https://seitech.co.uk", now());
        assert_eq!(urls[0].loc, "https://seitech.co.uk");
        assert_eq!(urls[0].priority, "1.0");
        assert!(urls.iter().any(|u| u.loc.ends_with("/certificates/verify")));
    }

    #[test]
    fn test_course_and_category_urls() {
        let course = json!({ "id": 3, "name": "Fire Safety Awareness", "write_date": "2025-02-10 08:30:00" });
        let url = course_url("https://seitech.co.uk", &course, now());
        assert_eq!(url.loc, "https://seitech.co.uk/courses/fire-safety-awareness");
        assert!(url.lastmod.starts_with("2025-02-10T08:30:00"));

        let category = json!({ "id": 1, "name": "Health & Safety", "write_date": false });
        let url = category_url("https://seitech.co.uk", &category, now());
        assert_eq!(url.loc, "https://seitech.co.uk/courses?category=health-safety");
        assert_eq!(url.lastmod, now().to_rfc3339());
    }

    #[test]
    fn test_render_escapes_locations() {
        let xml = render_sitemap(&[category_url(
            "https://seitech.co.uk",
            &json!({ "name": "First Aid" }),
            now(),
        )]);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<loc>https://seitech.co.uk/courses?category=first-aid</loc>"));
        assert!(xml.trim_end().ends_with("</urlset>"));

        let xml = render_sitemap(&[SitemapUrl {
            loc: "https://seitech.co.uk/?a=1&b=2".into(),
            lastmod: now().to_rfc3339(),
            changefreq: "daily",
            priority: "1.0",
        }]);
        assert!(xml.contains("a=1&amp;b=2"));
    }

    #[test]
    fn test_robots_points_at_sitemap() {
        let robots = render_robots("https://staging.seitech.co.uk");
        assert!(robots.contains("Sitemap: https://staging.seitech.co.uk/api/sitemap\n"));
        assert!(robots.contains("Disallow: /api/\n"));
    }
}
