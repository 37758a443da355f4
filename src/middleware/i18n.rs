// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

/// Primary language subtag of the caller's `Accept-Language`, e.g. "hi" for "hi-IN".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_header(value: &str) -> Self {
        accept_language::parse(value)
            .first()
            .and_then(|tag| tag.split('-').next())
            .filter(|lang| !lang.is_empty())
            .map(|lang| Locale(lang.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_is_dropped() {
        assert_eq!(Locale::from_header("hi-IN,en;q=0.8").0, "hi");
    }

    #[test]
    fn highest_quality_wins() {
        assert_eq!(Locale::from_header("en;q=0.5, hi;q=0.9").0, "hi");
    }

    #[test]
    fn garbage_falls_back_to_english() {
        assert_eq!(Locale::from_header("").0, "en");
    }
}
