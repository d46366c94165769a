//! Feature-level enums shared between storage and split routing.

use serde::{Deserialize, Serialize};

// ============================================================================
// MissingType
// ============================================================================

/// How missing values are encoded for a feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingType {
    /// No special missing value handling.
    #[default]
    None,
    /// Missing values coincide with the zero-valued (default) bin.
    Zero,
    /// NaN values get a dedicated sentinel bin, the last bin of the range.
    #[serde(rename = "nan")]
    NaN,
}

// ============================================================================
// BinType
// ============================================================================

/// Whether bins are ordered thresholds or unordered categories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinType {
    /// Ordered bins; splits compare `bin <= threshold`.
    #[default]
    Numerical,
    /// Unordered bins; splits compare `bin == threshold`.
    Categorical,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(MissingType::default(), MissingType::None);
        assert_eq!(BinType::default(), BinType::Numerical);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&MissingType::NaN).unwrap(), "\"nan\"");
        assert_eq!(serde_json::to_string(&MissingType::Zero).unwrap(), "\"zero\"");
        let bin_type: BinType = serde_json::from_str("\"categorical\"").unwrap();
        assert_eq!(bin_type, BinType::Categorical);
    }
}
