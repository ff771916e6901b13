use serde::{Deserialize, Serialize};

/// Session-wide parse settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Create unknown type labels directly under the top type instead of failing.
    pub create_types_on_demand: bool,
    /// Deepest nesting of graphs, lambdas and inline concepts accepted.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            create_types_on_demand: true,
            max_depth: 256,
        }
    }
}
