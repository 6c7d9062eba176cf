//! Intercepted requests and their classification.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shellcache_core::{Error, RequestKey};
use url::Url;

use crate::fetch::canonicalize;

/// Request mode metadata as set by the platform that issued the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

impl RequestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMode::Navigate => "navigate",
            RequestMode::SameOrigin => "same-origin",
            RequestMode::NoCors => "no-cors",
            RequestMode::Cors => "cors",
        }
    }
}

impl FromStr for RequestMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "navigate" => Ok(RequestMode::Navigate),
            "same-origin" => Ok(RequestMode::SameOrigin),
            "no-cors" => Ok(RequestMode::NoCors),
            "cors" => Ok(RequestMode::Cors),
            other => Err(Error::InvalidInput(format!("unsupported request mode: {other}"))),
        }
    }
}

impl std::fmt::Display for RequestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch class of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Navigation,
    Asset,
}

/// A request passing through the shell. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: Vec<(String, String)>,
}

impl InterceptedRequest {
    /// Build a GET request for `url` with the given mode.
    pub fn get(url: &str, mode: RequestMode) -> Result<Self, Error> {
        let url = canonicalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self::from_url(url, mode))
    }

    /// GET request for an already canonical URL.
    pub fn from_url(url: Url, mode: RequestMode) -> Self {
        Self { method: "GET".into(), url, mode, headers: Vec::new() }
    }

    /// A top-level navigation to `url`.
    pub fn navigate(url: &str) -> Result<Self, Error> {
        Self::get(url, RequestMode::Navigate)
    }

    /// A sub-resource load of `url`.
    pub fn asset(url: &str) -> Result<Self, Error> {
        Self::get(url, RequestMode::NoCors)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn class(&self) -> RequestClass {
        match self.mode {
            RequestMode::Navigate => RequestClass::Navigation,
            _ => RequestClass::Asset,
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.class() == RequestClass::Navigation
    }

    /// Key this request is stored under in a cache version.
    pub fn cache_key(&self) -> RequestKey {
        RequestKey::new(&self.method, self.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_by_mode() {
        let nav = InterceptedRequest::navigate("http://localhost:8080/dashboard").unwrap();
        assert_eq!(nav.class(), RequestClass::Navigation);
        assert!(nav.is_navigation());

        for mode in [RequestMode::SameOrigin, RequestMode::NoCors, RequestMode::Cors] {
            let req = InterceptedRequest::get("http://localhost:8080/js/app.js", mode).unwrap();
            assert_eq!(req.class(), RequestClass::Asset);
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("navigate".parse::<RequestMode>().unwrap(), RequestMode::Navigate);
        assert_eq!(" Same-Origin ".parse::<RequestMode>().unwrap(), RequestMode::SameOrigin);
        assert!(matches!("websocket".parse::<RequestMode>(), Err(Error::InvalidInput(_))));
        assert_eq!(RequestMode::default(), RequestMode::NoCors);
    }

    #[test]
    fn test_cache_key_ignores_fragment() {
        let a = InterceptedRequest::asset("http://localhost:8080/css/style.css").unwrap();
        let b = InterceptedRequest::asset("http://LOCALHOST:8080/css/style.css#x").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_invalid_url() {
        let result = InterceptedRequest::asset("ftp://localhost/file");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
