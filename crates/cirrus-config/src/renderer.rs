//! Supported server renderer implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Server renderer selector
///
/// Each variant names one implementation under `<runtime>/ssr/`. The set is
/// closed: anything else is rejected when the description is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Renderer {
    /// Vue 2 bundle renderer (default)
    #[default]
    Vue2,
    /// Vue 2 renderer without resource hints or preloading
    Vue2Basic,
    /// Vue 3 bundle renderer
    Vue3,
}

impl Renderer {
    /// All supported renderers, in declaration order
    pub const ALL: [Renderer; 3] = [Renderer::Vue2, Renderer::Vue2Basic, Renderer::Vue3];

    /// File stem of the implementation inside `<runtime>/ssr/`
    pub fn as_str(&self) -> &'static str {
        match self {
            Renderer::Vue2 => "vue2",
            Renderer::Vue2Basic => "vue2.basic",
            Renderer::Vue3 => "vue3",
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Renderer {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Renderer::ALL
            .into_iter()
            .find(|renderer| renderer.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRenderer {
                value: s.to_string(),
                expected: Renderer::ALL
                    .iter()
                    .map(Renderer::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl TryFrom<String> for Renderer {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Renderer> for String {
    fn from(renderer: Renderer) -> Self {
        renderer.as_str().to_string()
    }
}
