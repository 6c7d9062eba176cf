//! Asset manifest: the fixed URL set a generation must cache before it is ready.

use shellcache_core::{AppConfig, Error};
use url::Url;

use crate::fetch::resolve;

/// Ordered, de-duplicated list of absolute URLs. The offline page is always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    offline_page: Url,
    urls: Vec<Url>,
}

impl AssetManifest {
    /// Build a manifest from an origin, the offline page path, and the dependent assets.
    pub fn new<I, S>(origin: &Url, offline_page: &str, assets: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let offline_page = resolve(origin, offline_page).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let mut urls = vec![offline_page.clone()];

        for entry in assets {
            let url = resolve(origin, entry.as_ref()).map_err(|e| Error::InvalidUrl(e.to_string()))?;
            if !urls.contains(&url) {
                urls.push(url);
            }
        }

        Ok(Self { offline_page, urls })
    }

    /// Manifest described by `origin`, `offline_page`, and `precache`.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {}", config.origin, e)))?;
        Self::new(&origin, &config.offline_page, &config.precache)
    }

    pub fn offline_page(&self) -> &Url {
        &self.offline_page
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
