//! Site settings: reviews source, quote endpoint and contact details.
//!
//! Layered as defaults → `site.toml` (if present) → `SITE_*` environment
//! variables. A `.env` file in the working directory is loaded first.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ReviewsResult;

pub const ENV_PREFIX: &str = "SITE_";
pub const DEFAULT_CONFIG_FILE: &str = "site.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Published CSV export of the reviews sheet.
    pub reviews_csv_url: Option<String>,
    pub business_name: String,
    /// Third-party form endpoint the quote form posts to.
    pub form_endpoint: String,
    pub phone_display: String,
    /// E.164 number used for `tel:` and WhatsApp links.
    pub phone_tel: String,
    pub email: String,
    pub address: String,
    pub service_areas: Vec<String>,
    pub map_zoom: u8,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            reviews_csv_url: None,
            business_name: "Marina Cleans".into(),
            form_endpoint: "https://formspree.io/f/xvgbonek".into(),
            phone_display: "(415) 685-1462".into(),
            phone_tel: "+14156851462".into(),
            email: "info@marinacleans.com".into(),
            address: "San Francisco, CA".into(),
            service_areas: [
                "San Francisco, CA",
                "Daly City, CA",
                "South San Francisco, CA",
                "San Bruno, CA",
                "Pacifica, CA",
                "Millbrae, CA",
                "Burlingame, CA",
                "San Mateo, CA",
                "Foster City, CA",
                "Redwood City, CA",
                "Belmont, CA",
                "San Carlos, CA",
                "Menlo Park, CA",
                "Palo Alto, CA",
                "Los Altos, CA",
            ]
            .map(String::from)
            .to_vec(),
            map_zoom: 12,
        }
    }
}

impl SiteConfig {
    /// Load `.env`, then [`DEFAULT_CONFIG_FILE`] and the environment.
    pub fn load() -> ReviewsResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Same layering with an explicit TOML file; a missing file is skipped.
    pub fn load_from(path: &Path) -> ReviewsResult<Self> {
        let config = Self::figment(path).extract()?;
        Ok(config)
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(SiteConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = SiteConfig::load_from(Path::new("missing.toml")).unwrap();
            assert_eq!(config, SiteConfig::default());
            assert_eq!(config.reviews_csv_url, None);
            assert_eq!(config.service_areas.len(), 15);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "site.toml",
                r#"
                    reviews_csv_url = "https://example.com/file.csv"
                    email = "hello@example.com"
                    map_zoom = 10
                "#,
            )?;
            jail.set_env("SITE_REVIEWS_CSV_URL", "https://example.com/env.csv");

            let config = SiteConfig::load_from(Path::new("site.toml")).unwrap();
            assert_eq!(
                config.reviews_csv_url.as_deref(),
                Some("https://example.com/env.csv")
            );
            assert_eq!(config.email, "hello@example.com");
            assert_eq!(config.map_zoom, 10);
            assert_eq!(config.phone_tel, "+14156851462");
            Ok(())
        });
    }

    #[test]
    fn bad_value_is_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("SITE_MAP_ZOOM", "very close");
            let err = SiteConfig::load_from(Path::new("site.toml")).unwrap_err();
            assert!(matches!(err, crate::ReviewsError::Config(_)));
            Ok(())
        });
    }
}
