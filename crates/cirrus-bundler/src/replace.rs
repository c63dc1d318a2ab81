//! Compile-time constant replacements.
//!
//! Keys are exact source expressions; values are literal expressions that can
//! be dropped in their place. The downstream replace stage does the actual
//! substitution.

use cirrus_config::ApplicationDescription;
use indexmap::IndexMap;
use serde::Serialize;

pub const NODE_ENV: &str = "process.env.NODE_ENV";
pub const TYPEOF_WINDOW: &str = "typeof window";
pub const ROUTER_BASE: &str = "process.env.ROUTER_BASE";
pub const PUBLIC_PATH: &str = "process.env.PUBLIC_PATH";
pub const STATIC_BASE: &str = "process.env.NUXT_STATIC_BASE";
pub const STATIC_VERSION: &str = "process.env.NUXT_STATIC_VERSION";
pub const FULL_STATIC: &str = "process.env.NUXT_FULL_STATIC";

/// Ordered `expression -> literal` mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReplacementTable {
    values: IndexMap<String, String>,
}

impl ReplacementTable {
    /// Build the table for one description
    pub fn for_description(desc: &ApplicationDescription) -> Self {
        let mut table = Self::default();
        table.insert(NODE_ENV, json_literal("production"));
        // server-only execution: browser branches fold away
        table.insert(TYPEOF_WINDOW, json_literal("undefined"));
        table.insert(ROUTER_BASE, json_literal(&desc.router_base));
        table.insert(PUBLIC_PATH, json_literal(&desc.public_path));
        table.insert(STATIC_BASE, json_literal(&desc.static_assets.base));
        table.insert(STATIC_VERSION, json_literal(&desc.static_assets.version));
        table.insert(FULL_STATIC, desc.full_static.to_string());
        table
    }

    pub fn insert(&mut self, expression: impl Into<String>, literal: impl Into<String>) {
        self.values.insert(expression.into(), literal.into());
    }

    pub fn get(&self, expression: &str) -> Option<&str> {
        self.values.get(expression).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn json_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_config::StaticAssets;

    #[test]
    fn fixed_entries_fold_environment_checks() {
        let table = ReplacementTable::for_description(&ApplicationDescription::default());
        assert_eq!(table.get(NODE_ENV), Some("\"production\""));
        assert_eq!(table.get(TYPEOF_WINDOW), Some("\"undefined\""));
        assert_eq!(table.get(FULL_STATIC), Some("false"));
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn description_values_are_json_literals() {
        let desc = ApplicationDescription {
            router_base: "/shop/".to_string(),
            public_path: "https://cdn.example.com/_nuxt/".to_string(),
            static_assets: StaticAssets {
                base: "/_nuxt/static".to_string(),
                version: "16\"99".to_string(),
            },
            full_static: true,
            ..Default::default()
        };
        let table = ReplacementTable::for_description(&desc);
        assert_eq!(table.get(ROUTER_BASE), Some("\"/shop/\""));
        assert_eq!(
            table.get(PUBLIC_PATH),
            Some("\"https://cdn.example.com/_nuxt/\"")
        );
        assert_eq!(table.get(STATIC_BASE), Some("\"/_nuxt/static\""));
        assert_eq!(table.get(STATIC_VERSION), Some(r#""16\"99""#));
        assert_eq!(table.get(FULL_STATIC), Some("true"));
    }

    #[test]
    fn keys_are_exact_expressions() {
        let table = ReplacementTable::for_description(&ApplicationDescription::default());
        assert!(table.get("process.env").is_none());
        assert!(table.get("window").is_none());
    }
}
