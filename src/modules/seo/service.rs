use chrono::Utc;
use tracing::instrument;

use seitech_odoo::{Domain, OdooClient, OdooError, SearchRead};

use crate::modules::courses::COURSE_MODEL;
use crate::modules::seo::model::{
    CATEGORY_MODEL, SitemapUrl, category_url, course_url, render_sitemap, static_urls,
};
use crate::utils::proxy::record_fallback;

pub struct SeoService;

/// A rendered sitemap and whether it came from live ERP data.
pub struct Sitemap {
    pub xml: String,
    pub complete: bool,
}

impl SeoService {
    /// Static pages plus every category and published course. Falls back to
    /// the static pages alone when the ERP cannot be read.
    #[instrument(skip(odoo))]
    pub async fn sitemap(odoo: &OdooClient, site_url: &str) -> Sitemap {
        let now = Utc::now();
        let mut urls = static_urls(site_url, now);

        match Self::catalogue_urls(odoo, site_url).await {
            Ok(catalogue) => {
                urls.extend(catalogue);
                Sitemap { xml: render_sitemap(&urls), complete: true }
            }
            Err(e) => {
                record_fallback("sitemap", &e);
                Sitemap { xml: render_sitemap(&urls), complete: false }
            }
        }
    }

    async fn catalogue_urls(odoo: &OdooClient, site_url: &str) -> Result<Vec<SitemapUrl>, OdooError> {
        let now = Utc::now();
        let (categories, courses) = tokio::try_join!(
            odoo.search_read(
                CATEGORY_MODEL,
                SearchRead::new(Domain::new())
                    .fields(&["name", "write_date"])
                    .order("write_date desc"),
            ),
            odoo.search_read(
                COURSE_MODEL,
                SearchRead::new(Domain::new().eq("is_published", true))
                    .fields(&["name", "write_date"])
                    .order("write_date desc"),
            ),
        )?;

        Ok(categories
            .iter()
            .map(|c| category_url(site_url, c, now))
            .chain(courses.iter().map(|c| course_url(site_url, c, now)))
            .collect())
    }
}
