//! Loading coverage-catalog features from GeoJSON layers.

use std::io::Read;

use coin_stats::record::well_known;
use coin_stats_engine::CatalogFeature;
use serde::Deserialize;
use tracing::debug;

use crate::error::ServiceResult;

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<CatalogFeature>,
}

/// Reads the features of a GeoJSON `FeatureCollection`, keeping only their properties.
///
/// # Example
///
/// ```rust
/// use coin_stats_service::load_features;
///
/// let layer = r#"{"type": "FeatureCollection", "features": [
///     {"type": "Feature", "geometry": null, "properties": {"MINT": "Dordrecht"}}
/// ]}"#;
/// let features = load_features(layer.as_bytes()).unwrap();
/// assert_eq!(features[0].text("MINT").as_deref(), Some("Dordrecht"));
/// ```
pub fn load_features(reader: impl Read) -> ServiceResult<Vec<CatalogFeature>> {
    let collection: FeatureCollection = serde_json::from_reader(reader)?;
    debug!(features = collection.features.len(), "GeoJSON layer loaded");
    Ok(collection.features)
}

/// Rules dropping features that should not take part in coverage.
///
/// A feature is dropped when `field` is missing, contains one of `contains`, or equals
/// one of `exact`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRules {
    /// Field the rules look at.
    pub field: String,
    /// Substrings that exclude a feature.
    pub contains: Vec<String>,
    /// Whole values that exclude a feature.
    pub exact: Vec<String>,
}

impl ExclusionRules {
    /// Rules that only require `field` to be present.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            contains: Vec::new(),
            exact: Vec::new(),
        }
    }

    /// The built-in rules for the authority layer: kingdoms and whole provinces.
    pub fn authorities() -> Self {
        Self {
            field: well_known::AUTHORITY.to_string(),
            contains: vec!["Kingdom".to_string()],
            exact: [
                "Utrecht (Province)",
                "Friesland (Province)",
                "Groningen",
                "Guelders (Province)",
                "Holland (Province)",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    /// Whether a feature passes the rules.
    pub fn allows(&self, feature: &CatalogFeature) -> bool {
        let Some(value) = feature.text(&self.field) else {
            return false;
        };
        !self.contains.iter().any(|needle| value.contains(needle.as_str()))
            && !self.exact.iter().any(|name| *name == value)
    }

    /// Keeps the features passing the rules, in order.
    pub fn filter(&self, features: Vec<CatalogFeature>) -> Vec<CatalogFeature> {
        let before = features.len();
        let kept: Vec<CatalogFeature> = features.into_iter().filter(|f| self.allows(f)).collect();
        debug!(
            field = %self.field,
            kept = kept.len(),
            dropped = before - kept.len(),
            "exclusion rules applied"
        );
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority(name: &str) -> CatalogFeature {
        CatalogFeature::new().with("AUTHORITY", name)
    }

    #[test]
    fn test_load_features_keeps_properties() {
        let layer = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [5.1, 52.1]},
                 "properties": {"AUTHORITY": "Utrecht", "DATEfrom": "1400/01/01"}},
                {"type": "Feature", "geometry": null, "properties": null}
            ]
        }"#;
        let features = load_features(layer.as_bytes()).unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].text("AUTHORITY").as_deref(), Some("Utrecht"));
        assert!(features[1].properties().is_empty());
    }

    #[test]
    fn test_load_features_tolerates_flag_properties() {
        let layer = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null,
                 "properties": {"MINT": "Dordrecht", "capital": true, "aliases": ["Dordt"]}}
            ]
        }"#;
        let features = load_features(layer.as_bytes()).unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].text("MINT").as_deref(), Some("Dordrecht"));
        assert!(features[0].get("capital").is_none());
    }

    #[test]
    fn test_load_features_rejects_malformed_json() {
        assert!(load_features("{\"features\": [".as_bytes()).is_err());
    }

    #[test]
    fn test_authority_rules() {
        let rules = ExclusionRules::authorities();

        assert!(rules.allows(&authority("Utrecht")));
        assert!(rules.allows(&authority("Holland")));
        assert!(!rules.allows(&authority("Holland (Province)")));
        assert!(!rules.allows(&authority("Kingdom of Holland")));
        assert!(!rules.allows(&CatalogFeature::new()));
    }

    #[test]
    fn test_filter_keeps_order() {
        let kept = ExclusionRules::authorities().filter(vec![
            authority("Gelre"),
            authority("Groningen"),
            authority("Brabant"),
        ]);
        let names: Vec<String> = kept.iter().filter_map(|f| f.text("AUTHORITY")).collect();
        assert_eq!(names, vec!["Gelre", "Brabant"]);
    }

    #[test]
    fn test_new_rules_only_require_field() {
        let rules = ExclusionRules::new("MINT");
        assert!(rules.allows(&CatalogFeature::new().with("MINT", "Kingdom mint")));
        assert!(!rules.allows(&authority("Holland")));
    }
}
