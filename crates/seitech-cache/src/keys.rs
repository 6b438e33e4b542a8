//! Cache key layout: `<prefix>:cms:<resource>:<digest>`.
//!
//! The digest covers the ERP path and the forwarded query pairs, so the
//! same request maps to the same key on every gateway instance.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// First 8 bytes of the SHA-256 of the JSON encoding, hex encoded.
pub fn digest<T: Serialize>(value: &T) -> String {
    let encoded = serde_json::to_vec(value).unwrap_or_default();
    hex::encode(&Sha256::digest(&encoded)[..8])
}

pub mod cms {
    use super::digest;
    use serde::Serialize;

    pub fn resource<T: Serialize>(prefix: &str, resource: &str, request: &T) -> String {
        format!("{prefix}:cms:{resource}:{}", digest(request))
    }

    /// Glob matching every CMS entry, for `RedisCache::purge`.
    pub fn invalidation_pattern(prefix: &str) -> String {
        format!("{prefix}:cms:*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_cms_key_layout() {
        let featured = pairs(&[("featured", "true")]);
        let key = cms::resource("seitech", "testimonials", &("/api/cms/testimonials", &featured));

        let digest_part = key.strip_prefix("seitech:cms:testimonials:").unwrap();
        assert_eq!(digest_part.len(), 16);
        assert_eq!(key, cms::resource("seitech", "testimonials", &("/api/cms/testimonials", &featured)));
        assert_ne!(
            key,
            cms::resource("seitech", "testimonials", &("/api/cms/testimonials", &pairs(&[])))
        );
    }

    #[test]
    fn test_digest_is_fixed() {
        // sha256("[]") begins 4f53cda18c2baa0c
        assert_eq!(digest(&Vec::<String>::new()), "4f53cda18c2baa0c");
    }

    #[test]
    fn test_invalidation_pattern() {
        assert_eq!(cms::invalidation_pattern("seitech"), "seitech:cms:*");
    }
}
