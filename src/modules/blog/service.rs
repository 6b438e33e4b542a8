use anyhow::{Context, anyhow};
use tracing::{debug, instrument};

use seitech_odoo::{Domain, OdooClient, OdooError, SearchRead, fields};

use crate::modules::blog::mock;
use crate::modules::blog::model::{
    BLOG_MODEL, BlogCategory, BlogList, BlogPagination, BlogPost, BlogQuery, POST_FIELDS,
    POST_MODEL, category_slug,
};
use crate::utils::errors::AppError;
use crate::utils::proxy::record_fallback;

const RELATED_LIMIT: usize = 3;

pub struct BlogService;

impl BlogService {
    /// Published posts from the ERP blog, or the mock articles filtered the
    /// same way when the ERP cannot be reached.
    #[instrument(skip(odoo))]
    pub async fn list(odoo: &OdooClient, query: BlogQuery, page: i64, limit: i64) -> BlogList {
        match Self::list_from_erp(odoo, &query, page, limit).await {
            Ok(list) => list,
            Err(e) => {
                record_fallback("blog", &e);
                Self::list_from_mock(&query, page, limit)
            }
        }
    }

    async fn list_from_erp(
        odoo: &OdooClient,
        query: &BlogQuery,
        page: i64,
        limit: i64,
    ) -> Result<BlogList, OdooError> {
        let domain = Domain::new()
            .eq("is_published", true)
            .when_some(query.category.as_deref(), |d, c| d.ilike("blog_id.name", c))
            .when_some(query.tag.as_deref(), |d, t| d.ilike("tag_ids.name", t))
            .when_some(query.search.as_deref(), |d, s| d.ilike("name", s))
            .when(query.featured.unwrap_or(false), |d| d.eq("is_featured", true));

        let (total, records, blogs) = tokio::try_join!(
            odoo.search_count(POST_MODEL, domain.clone()),
            odoo.search_read(
                POST_MODEL,
                SearchRead::new(domain)
                    .fields(POST_FIELDS)
                    .offset((page - 1) * limit)
                    .limit(limit)
                    .order("published_date desc"),
            ),
            odoo.search_read(BLOG_MODEL, SearchRead::new(Domain::new()).fields(&["name", "subtitle"])),
        )?;

        let posts = records.iter().map(BlogPost::from_record).collect();
        let categories = blogs
            .iter()
            .map(|blog| {
                let name = fields::string_or_empty(blog, "name");
                BlogCategory {
                    id: fields::i64_field(blog, "id"),
                    slug: category_slug(&name),
                    name,
                    post_count: 0,
                }
            })
            .collect();

        Ok(BlogList::new(posts, BlogPagination::new(page, limit, total), categories))
    }

    fn list_from_mock(query: &BlogQuery, page: i64, limit: i64) -> BlogList {
        let contains = |haystack: &str, needle: &str| haystack.to_lowercase().contains(&needle.to_lowercase());
        let matching: Vec<BlogPost> = mock::posts()
            .into_iter()
            .filter(|p| query.category.as_deref().is_none_or(|c| contains(&p.category, c) || p.category_slug == c))
            .filter(|p| query.tag.as_deref().is_none_or(|t| p.tags.iter().any(|tag| contains(tag, t))))
            .filter(|p| query.search.as_deref().is_none_or(|s| contains(&p.title, s) || contains(&p.excerpt, s)))
            .filter(|p| !query.featured.unwrap_or(false) || p.is_featured)
            .collect();

        let total = matching.len() as i64;
        let posts = matching
            .into_iter()
            .skip(((page - 1) * limit) as usize)
            .take(limit as usize)
            .collect();
        BlogList::new(posts, BlogPagination::new(page, limit, total), mock::categories())
    }

    /// A post by slug and up to three related posts from the same blog.
    #[instrument(skip(odoo))]
    pub async fn get(odoo: &OdooClient, slug: &str) -> Result<(BlogPost, Vec<BlogPost>), AppError> {
        match Self::get_from_erp(odoo, slug).await {
            Ok(Some(found)) => return Ok(found),
            Ok(None) => debug!(slug, "Post not in ERP blog, trying mock articles"),
            Err(e) => record_fallback("blog", &e),
        }

        let post = mock::post(slug).ok_or_else(|| AppError::not_found(anyhow!("Post not found")))?;
        let related = mock::related(&post, RELATED_LIMIT);
        Ok((post, related))
    }

    async fn get_from_erp(odoo: &OdooClient, slug: &str) -> Result<Option<(BlogPost, Vec<BlogPost>)>, anyhow::Error> {
        let record = odoo
            .search_read(
                POST_MODEL,
                SearchRead::new(Domain::new().eq("website_slug", slug).eq("is_published", true))
                    .fields(POST_FIELDS)
                    .limit(1),
            )
            .await
            .context("Failed to fetch blog post")?
            .into_iter()
            .next();
        let Some(record) = record else {
            return Ok(None);
        };

        let post = BlogPost::from_record(&record);
        let related = match fields::many2one_id(&record, "blog_id") {
            Some(blog_id) => odoo
                .search_read(
                    POST_MODEL,
                    SearchRead::new(
                        Domain::new()
                            .eq("is_published", true)
                            .eq("blog_id", blog_id)
                            .ne("id", post.id),
                    )
                    .fields(POST_FIELDS)
                    .limit(RELATED_LIMIT as i64)
                    .order("published_date desc"),
                )
                .await
                .context("Failed to fetch related posts")?
                .iter()
                .map(BlogPost::from_record)
                .collect(),
            None => Vec::new(),
        };
        Ok(Some((post, related)))
    }
}
