use crate::config::IconConfig;
use crate::constants::ICON_ASSET_PATH_PREFIX;
use crate::error::{AppError, Result};
use crate::map::MapSurface;
use moka::future::Cache;
use reqwest::Client;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Requested icon id -> canonical asset name. Ids not listed here are used
/// as the asset name unchanged.
pub const ICON_ALIASES: &[(&str, &str)] = &[
    ("marker", "map-pin"),
    ("pin", "map-pin"),
    ("location", "map-pin"),
    ("default", "map-pin"),
    ("me", "user"),
    ("person", "user"),
    ("staff", "user"),
    ("home", "house"),
    ("residence", "house"),
    ("office", "building"),
    ("site", "building"),
    ("warehouse", "building"),
    ("vehicle", "car"),
    ("truck", "car"),
    ("start", "flag"),
    ("destination", "flag-checkered"),
    ("end", "flag-checkered"),
    ("finish", "flag-checkered"),
    ("alert", "triangle-alert"),
    ("warning", "triangle-alert"),
    ("hazard", "triangle-alert"),
];

/// Canonical asset name for a requested icon id.
pub fn resolve_icon_name(requested: &str) -> &str {
    ICON_ALIASES
        .iter()
        .find(|(alias, _)| *alias == requested)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(requested)
}

/// Answers a surface's "image missing" signal by fetching the icon asset and
/// registering it under the id the engine asked for.
///
/// Fetches are keyed by canonical name in a short-lived cache, so a burst of
/// signals for aliases of the same icon results in a single request.
pub struct IconResolver {
    client: Client,
    base_url: String,
    images: Cache<String, Arc<Vec<u8>>>,
}

impl IconResolver {
    pub fn new(config: &IconConfig, timeout: Duration) -> Result<Self> {
        let images = Cache::builder()
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .max_capacity(config.cache_max_entries)
            .build();

        Ok(IconResolver {
            client: super::http_client(timeout)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            images,
        })
    }

    pub fn asset_url(&self, canonical: &str) -> String {
        format!(
            "{}{}/{}.svg",
            self.base_url,
            ICON_ASSET_PATH_PREFIX,
            urlencoding::encode(canonical)
        )
    }

    /// Fetch the image for `requested`, or `None` if the asset is unavailable.
    pub async fn fetch_icon(&self, requested: &str) -> Option<Arc<Vec<u8>>> {
        let canonical = resolve_icon_name(requested).to_string();
        let url = self.asset_url(&canonical);

        let result = self
            .images
            .try_get_with(canonical, self.download(url))
            .await;

        match result {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!("Icon '{}' unavailable: {}", requested, e);
                None
            }
        }
    }

    async fn download(&self, url: String) -> Result<Arc<Vec<u8>>> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::IconFetch(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::IconFetch(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::IconFetch(format!("{}: {}", url, e)))?;

        Ok(Arc::new(bytes.to_vec()))
    }

    /// Fetch and register `requested` on `surface`.
    ///
    /// Returns whether an image was registered. The surface may have been
    /// destroyed while the fetch was in flight; in that case nothing happens.
    pub async fn resolve_into(&self, surface: &Weak<dyn MapSurface>, requested: &str) -> bool {
        let Some(image) = self.fetch_icon(requested).await else {
            return false;
        };

        match surface.upgrade() {
            Some(surface) if !surface.is_destroyed() => {
                surface.add_image(requested, image.as_slice());
                tracing::debug!(
                    container = %surface.container_id(),
                    "Registered icon '{}'",
                    requested
                );
                true
            }
            _ => false,
        }
    }

    /// Entry point wired to the surface's missing-image signal.
    pub fn handle_missing_image(self: &Arc<Self>, surface: Weak<dyn MapSurface>, requested: String) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available, dropping icon request '{}'", requested);
            return;
        };

        let resolver = Arc::clone(self);
        runtime.spawn(async move {
            resolver.resolve_into(&surface, &requested).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_resolves_to_canonical() {
        assert_eq!(resolve_icon_name("marker"), "map-pin");
        assert_eq!(resolve_icon_name("pin"), "map-pin");
        assert_eq!(resolve_icon_name("truck"), "car");
    }

    #[test]
    fn test_unknown_resolves_to_itself() {
        assert_eq!(resolve_icon_name("fire-hydrant"), "fire-hydrant");
        assert_eq!(resolve_icon_name(""), "");
    }

    #[test]
    fn test_alias_table_has_unique_keys() {
        let mut keys: Vec<_> = ICON_ALIASES.iter().map(|(k, _)| *k).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ICON_ALIASES.len());
    }

    #[test]
    fn test_asset_url() {
        let config = IconConfig {
            base_url: "http://assets.local/".to_string(),
            ..IconConfig::default()
        };
        let resolver = IconResolver::new(&config, Duration::from_secs(1)).unwrap();

        assert_eq!(
            resolver.asset_url("map-pin"),
            "http://assets.local/assets/map-icons/map-pin.svg"
        );
        assert_eq!(
            resolver.asset_url("a b"),
            "http://assets.local/assets/map-icons/a%20b.svg"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_silent() {
        let config = IconConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..IconConfig::default()
        };
        let resolver = IconResolver::new(&config, Duration::from_secs(1)).unwrap();

        assert!(resolver.fetch_icon("marker").await.is_none());
    }
}
