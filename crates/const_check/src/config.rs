// ==============================================================================
// Checker configuration
// ==============================================================================
//
// Loaded from a TOML table; every key is optional.
//
// ```toml
// prune-literal-candidates = true
// ambiguous-type-severity = "warning"
// max-resolution-depth = 64
// ```

use serde::Deserialize;

use crate::diagnostic::Severity;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CheckConfig {
    /// Restrict numeric literal candidates to the numeric kinds the expected
    /// type can actually hold.
    pub prune_literal_candidates: bool,

    /// Severity of `AmbiguousType` reports.
    pub ambiguous_type_severity: Severity,

    /// How deep on-demand resolution of one constant from another may nest.
    pub max_resolution_depth: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            prune_literal_candidates: true,
            ambiguous_type_severity: Severity::Error,
            max_resolution_depth: 256,
        }
    }
}

impl CheckConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(CheckConfig::from_toml_str("").unwrap(), CheckConfig::default());
    }

    #[test]
    fn kebab_case_keys() {
        let config = CheckConfig::from_toml_str(
            "ambiguous-type-severity = \"warning\"\nmax-resolution-depth = 8\n",
        )
        .unwrap();
        assert_eq!(config.ambiguous_type_severity, Severity::Warning);
        assert_eq!(config.max_resolution_depth, 8);
        assert!(config.prune_literal_candidates);
    }

    #[test]
    fn unknown_severity_is_rejected() {
        assert!(CheckConfig::from_toml_str("ambiguous-type-severity = \"fatal\"").is_err());
    }
}
