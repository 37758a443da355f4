// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

pub const DEFAULT_LANG: &str = "en";

/// A message catalog compiled into the binary.
pub struct Catalog {
    pub lang: &'static str,
    pub source: &'static str,
}

inventory::collect!(Catalog);

inventory::submit! {
    Catalog { lang: "en", source: include_str!("../../locales/en.json") }
}

inventory::submit! {
    Catalog { lang: "hi", source: include_str!("../../locales/hi.json") }
}

static GLOBAL: LazyLock<I18nStore> = LazyLock::new(|| {
    I18nStore::load().unwrap_or_else(|e| {
        tracing::error!("Failed to load message catalogs: {:?}", e);
        I18nStore::default()
    })
});

#[derive(Clone, Debug, Default)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    /// Parses every registered catalog.
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for catalog in inventory::iter::<Catalog> {
            let messages: HashMap<String, String> = serde_json::from_str(catalog.source)
                .map_err(|e| anyhow::anyhow!("catalog '{}' is invalid: {}", catalog.lang, e))?;
            catalogs.insert(catalog.lang.to_string(), messages);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    pub fn global() -> &'static I18nStore {
        &GLOBAL
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.catalogs.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    /// Looks the key up in `lang`, then in English, and finally echoes the key.
    /// `{name}` placeholders are replaced from `args`.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|c| c.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .map(String::as_str)
            .unwrap_or(key);

        let mut message = template.to_string();
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_catalogs_are_registered() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.languages(), vec!["en", "hi"]);
    }

    #[test]
    fn catalogs_define_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let en = &store.catalogs["en"];
        let hi = &store.catalogs["hi"];
        for key in en.keys() {
            assert!(hi.contains_key(key), "hi catalog is missing '{}'", key);
        }
    }

    #[test]
    fn placeholders_are_interpolated() {
        let store = I18nStore::load().unwrap();
        let msg = store.translate("en", "error.item_name_exists", &[("name", "Brass")]);
        assert_eq!(msg, "An inventory item named 'Brass' already exists.");
    }

    #[test]
    fn missing_key_echoes_the_key() {
        let store = I18nStore::default();
        assert_eq!(store.translate("en", "error.nope", &[]), "error.nope");
    }
}
