use crate::domain::value_objects::{SortBy, SortOrder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// マウントされていないスロットをこの件数まで保持する
    pub max_entries: usize,
    pub page_size: u32,
    pub default_sort_by: SortBy,
    pub default_order: SortOrder,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            user_agent: concat!("threadboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 200,
            page_size: 10,
            default_sort_by: SortBy::Recent,
            default_order: SortOrder::Desc,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("THREADBOARD_API_URL") {
            let trimmed = v.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                cfg.api.base_url = trimmed.to_string();
            }
        }
        if let Some(value) = std::env::var("THREADBOARD_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| parse_u64(&v))
        {
            cfg.api.timeout_secs = value.max(1);
        }
        if let Ok(v) = std::env::var("THREADBOARD_USER_AGENT") {
            if !v.trim().is_empty() {
                cfg.api.user_agent = v.trim().to_string();
            }
        }

        if let Some(value) = std::env::var("THREADBOARD_CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|v| parse_usize(&v))
        {
            cfg.cache.max_entries = value;
        }
        if let Some(value) = std::env::var("THREADBOARD_PAGE_SIZE")
            .ok()
            .and_then(|v| parse_u32(&v))
        {
            cfg.cache.page_size = value;
        }
        if let Some(sort_by) = std::env::var("THREADBOARD_POSTS_SORT_BY")
            .ok()
            .and_then(|v| v.trim().parse::<SortBy>().ok())
        {
            cfg.cache.default_sort_by = sort_by;
        }
        if let Some(order) = std::env::var("THREADBOARD_POSTS_ORDER")
            .ok()
            .and_then(|v| v.trim().parse::<SortOrder>().ok())
        {
            cfg.cache.default_order = order;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api.base_url.trim().is_empty() {
            return Err("API base_url must not be empty".to_string());
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(format!(
                "API base_url must be an http(s) URL: {}",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err("API timeout_secs must be greater than 0".to_string());
        }
        if self.cache.max_entries == 0 {
            return Err("Cache max_entries must be greater than 0".to_string());
        }
        if self.cache.page_size == 0 || self.cache.page_size > 100 {
            return Err("Cache page_size must be between 1 and 100".to_string());
        }
        Ok(())
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.cache.default_sort_by, SortBy::Recent);
        assert_eq!(cfg.cache.default_order, SortOrder::Desc);
    }

    #[test]
    fn test_validate_rejects_non_http_url() {
        let mut cfg = AppConfig::default();
        cfg.api.base_url = "ftp://example.com".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_page() {
        let mut cfg = AppConfig::default();
        cfg.cache.page_size = 500;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_env_overrides_defaults() {
        std::env::set_var("THREADBOARD_API_URL", "https://board.example.com/");
        std::env::set_var("THREADBOARD_POSTS_SORT_BY", "points");
        std::env::set_var("THREADBOARD_PAGE_SIZE", "not-a-number");

        let cfg = AppConfig::from_env();

        std::env::remove_var("THREADBOARD_API_URL");
        std::env::remove_var("THREADBOARD_POSTS_SORT_BY");
        std::env::remove_var("THREADBOARD_PAGE_SIZE");

        assert_eq!(cfg.api.base_url, "https://board.example.com");
        assert_eq!(cfg.cache.default_sort_by, SortBy::Points);
        assert_eq!(cfg.cache.page_size, 10);
    }
}
