//! Articles served while the ERP blog is unreachable or empty.

use super::model::{BlogAuthor, BlogCategory, BlogPost, category_slug, read_time};

struct Seed {
    id: i64,
    slug: &'static str,
    title: &'static str,
    excerpt: &'static str,
    content: &'static str,
    author: (i64, &'static str, &'static str),
    category: &'static str,
    published_at: &'static str,
    tags: &'static [&'static str],
    meta_title: &'static str,
    featured: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: 1,
        slug: "importance-of-fire-risk-assessments",
        title: "The Importance of Fire Risk Assessments for UK Businesses",
        excerpt: "Understanding why fire risk assessments are legally required and how they protect your workforce and premises.",
        content: "<h2>What is a Fire Risk Assessment?</h2>\
<p>The Regulatory Reform (Fire Safety) Order 2005 requires the responsible person for non-domestic premises to assess fire hazards and the people at risk from them.</p>\
<h2>The Five Steps</h2>\
<ol><li>Identify fire hazards</li><li>Identify people at risk</li><li>Evaluate, remove or reduce the risks</li><li>Record, plan and train</li><li>Review regularly</li></ol>\
<h2>Consequences of Non-Compliance</h2>\
<p>Enforcement notices, unlimited fines and prosecution are all possible outcomes for premises without a suitable assessment.</p>",
        author: (1, "Sarah Mitchell", "Fire Safety Consultant"),
        category: "Fire Safety",
        published_at: "2024-12-15T10:00:00Z",
        tags: &["fire safety", "compliance", "risk assessment", "UK regulations"],
        meta_title: "Fire Risk Assessments for UK Businesses | SEI Tech",
        featured: true,
    },
    Seed {
        id: 2,
        slug: "iosh-managing-safely-guide",
        title: "IOSH Managing Safely: A Complete Guide for 2024",
        excerpt: "Everything you need to know about the IOSH Managing Safely qualification and how it can benefit your career.",
        content: "<h2>What is IOSH Managing Safely?</h2>\
<p>A globally recognised qualification for managers and supervisors that covers assessing and controlling risks, legal responsibilities, common hazards, incident investigation and performance measurement.</p>\
<h2>Assessment</h2>\
<p>Delegates sit a multiple-choice test and complete a workplace risk assessment project. The certificate is valid for three years.</p>",
        author: (2, "James Thompson", "Health & Safety Trainer"),
        category: "IOSH Training",
        published_at: "2024-12-10T14:30:00Z",
        tags: &["IOSH", "management training", "health and safety", "certification"],
        meta_title: "IOSH Managing Safely Guide 2024 | SEI Tech International",
        featured: false,
    },
    Seed {
        id: 3,
        slug: "nebosh-vs-iosh-which-is-right",
        title: "NEBOSH vs IOSH: Which Qualification is Right for You?",
        excerpt: "A comprehensive comparison of NEBOSH and IOSH qualifications to help you choose the right path.",
        content: "<h2>Different Audiences</h2>\
<p>IOSH courses suit people who manage safety as part of a broader role. NEBOSH certificates are aimed at those pursuing a career as a safety professional.</p>\
<h2>Commitment</h2>\
<p>IOSH Managing Safely runs over a few days, while the NEBOSH General Certificate typically takes several weeks of study.</p>",
        author: (1, "Sarah Mitchell", "Fire Safety Consultant"),
        category: "Career Guidance",
        published_at: "2024-12-05T09:00:00Z",
        tags: &["NEBOSH", "IOSH", "career", "qualifications", "comparison"],
        meta_title: "NEBOSH vs IOSH Comparison | Which Qualification to Choose",
        featured: false,
    },
    Seed {
        id: 4,
        slug: "mental-health-first-aid-workplace",
        title: "Mental Health First Aid in the Workplace: Why It Matters",
        excerpt: "Learn how Mental Health First Aid training can transform your workplace culture.",
        content: "<h2>Why Mental Health First Aid?</h2>\
<p>Trained first aiders can spot early signs of mental ill health and guide colleagues towards support before a crisis develops.</p>\
<h2>Building a Supportive Culture</h2>\
<p>Organisations with mental health first aiders report better conversations about wellbeing and lower absence.</p>",
        author: (3, "Dr. Emily Roberts", "Mental Health Specialist"),
        category: "Workplace Wellbeing",
        published_at: "2024-11-28T11:00:00Z",
        tags: &["mental health", "first aid", "workplace", "wellbeing", "training"],
        meta_title: "Mental Health First Aid Training for Workplaces | SEI Tech",
        featured: true,
    },
    Seed {
        id: 5,
        slug: "manual-handling-training-reducing-injuries",
        title: "Manual Handling Training: Reducing Workplace Injuries",
        excerpt: "Discover how proper manual handling training can significantly reduce workplace injuries.",
        content: "<h2>The Scale of the Problem</h2>\
<p>Musculoskeletal disorders remain one of the most common causes of work-related ill health in the UK.</p>\
<h2>The TILE Approach</h2>\
<p>Task, Individual, Load and Environment give a simple structure for assessing every lift.</p>",
        author: (2, "James Thompson", "Health & Safety Trainer"),
        category: "Health & Safety",
        published_at: "2024-11-20T15:00:00Z",
        tags: &["manual handling", "workplace safety", "injuries", "training"],
        meta_title: "Manual Handling Training UK | Reduce Workplace Injuries",
        featured: false,
    },
    Seed {
        id: 6,
        slug: "understanding-coshh-regulations",
        title: "Understanding COSHH Regulations: A Practical Guide",
        excerpt: "A practical guide to understanding and implementing COSHH regulations.",
        content: "<h2>What COSHH Covers</h2>\
<p>The Control of Substances Hazardous to Health Regulations apply to chemicals, fumes, dusts, vapours and biological agents.</p>\
<h2>Eight Steps</h2>\
<p>Assess the risks, decide precautions, prevent or control exposure, maintain controls, monitor, carry out health surveillance, plan for emergencies and train employees.</p>",
        author: (1, "Sarah Mitchell", "Fire Safety Consultant"),
        category: "Compliance",
        published_at: "2024-11-15T10:00:00Z",
        tags: &["COSHH", "regulations", "compliance", "hazardous substances"],
        meta_title: "COSHH Regulations Guide | Control of Hazardous Substances",
        featured: false,
    },
];

fn to_post(seed: &Seed) -> BlogPost {
    let (author_id, author_name, role) = seed.author;
    BlogPost {
        id: seed.id,
        title: seed.title.into(),
        slug: seed.slug.into(),
        excerpt: seed.excerpt.into(),
        content: seed.content.into(),
        image_url: format!("/images/blog/{}.jpg", seed.slug),
        author: BlogAuthor {
            id: author_id,
            name: author_name.into(),
            avatar: format!("/images/team/{}.jpg", category_slug(author_name)),
            role: Some(role.into()),
            bio: None,
        },
        category: seed.category.into(),
        category_slug: category_slug(seed.category),
        published_at: seed.published_at.into(),
        read_time: read_time(seed.content),
        tags: seed.tags.iter().map(|t| t.to_string()).collect(),
        meta_title: seed.meta_title.into(),
        meta_description: seed.excerpt.into(),
        is_featured: seed.featured,
    }
}

/// All mock posts, newest first.
pub fn posts() -> Vec<BlogPost> {
    SEEDS.iter().map(to_post).collect()
}

pub fn post(slug: &str) -> Option<BlogPost> {
    SEEDS.iter().find(|s| s.slug == slug).map(to_post)
}

/// Other mock posts in `post`'s category.
pub fn related(post: &BlogPost, limit: usize) -> Vec<BlogPost> {
    same_category(posts(), post, limit)
}

fn same_category(candidates: Vec<BlogPost>, post: &BlogPost, limit: usize) -> Vec<BlogPost> {
    candidates
        .into_iter()
        .filter(|p| p.id != post.id && p.category == post.category)
        .take(limit)
        .collect()
}

pub fn categories() -> Vec<BlogCategory> {
    let mut categories: Vec<BlogCategory> = Vec::new();
    for seed in SEEDS {
        match categories.iter_mut().find(|c| c.name == seed.category) {
            Some(category) => category.post_count += 1,
            None => categories.push(BlogCategory {
                id: categories.len() as i64 + 1,
                name: seed.category.into(),
                slug: category_slug(seed.category),
                post_count: 1,
            }),
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_posts_are_unique() {
        let posts = posts();
        assert_eq!(posts.len(), 6);
        let mut slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), 6);
        assert!(posts.iter().all(|p| p.read_time >= 1));
    }

    #[test]
    fn test_lookup_by_slug() {
        let post = post("understanding-coshh-regulations").unwrap();
        assert_eq!(post.category_slug, "compliance");
        assert!(super::post("no-such-post").is_none());
    }

    #[test]
    fn test_related_posts_share_the_category() {
        let coshh = post("understanding-coshh-regulations").unwrap();
        assert!(related(&coshh, 3).is_empty());

        let mut candidates = posts();
        for p in candidates.iter_mut().take(4) {
            p.category = coshh.category.clone();
        }
        let found = same_category(candidates, &coshh, 3);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| p.category == "Compliance" && p.id != coshh.id));
    }

    #[test]
    fn test_categories_count_posts() {
        let categories = categories();
        assert_eq!(categories.len(), 6);
        assert!(categories.iter().all(|c| c.post_count == 1));
    }
}
