// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT + role allow-list) → Elevated (admin only)
pub mod public;    // Tier 1: /, /health, /api/v1/auth/*
pub mod protected; // Tier 2: users, repair requests, services, provider listings
pub mod elevated;  // Tier 3: /api/v1/admin/*

use serde::Deserialize;

use crate::config::AppConfig;
use crate::database::repository::Page;

/// `?skip=&limit=` on every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn page(&self, config: &AppConfig) -> Page {
        Page::new(self.skip.unwrap_or(0), config.page_limit(self.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let config = AppConfig::development();
        let page = ListQuery::default().page(&config);
        assert_eq!(page, Page::new(0, config.api.default_page_size));
    }

    #[test]
    fn negative_skip_and_oversized_limit_are_clamped() {
        let config = AppConfig::development();
        let page = ListQuery {
            skip: Some(-5),
            limit: Some(config.api.max_page_size + 1),
        }
        .page(&config);
        assert_eq!(page, Page::new(0, config.api.max_page_size));
    }
}
