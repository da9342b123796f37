//! Vehicle selection model and lookup-key derivation.
//!
//! A selection is the query input: a mandatory series code plus any subset
//! of six optional attributes. The cache matches on exactly the attributes
//! that are present, so omitting a field widens the lookup rather than
//! constraining it to an empty value.

use serde::{Deserialize, Serialize};

/// A vehicle configuration as supplied by the caller.
///
/// Two selections with the same present-attribute subset and the same
/// values describe the same query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSelection {
    /// Series code (e.g. "F32N").
    pub series: String,

    /// Body type code (e.g. "Cou").
    #[serde(default)]
    pub body: Option<String>,

    /// Model (e.g. "440i").
    #[serde(default)]
    pub model: Option<String>,

    /// Steering side ("L" or "R").
    #[serde(default)]
    pub steering: Option<String>,

    /// Production date (e.g. "20181100").
    #[serde(default)]
    pub production: Option<String>,

    /// Market (e.g. "EUR", "USA").
    #[serde(default)]
    pub market: Option<String>,

    /// Engine code (e.g. "B58").
    #[serde(default)]
    pub engine: Option<String>,
}

impl VehicleSelection {
    /// Column/value constraint pairs for every present optional attribute.
    ///
    /// `series` is the mandatory leading constraint and is handled by the
    /// caller; the pairs returned here follow the column order of the
    /// lookup index. Column names come from this fixed list, never from
    /// caller input.
    pub fn constraints(&self) -> Vec<(&'static str, &str)> {
        [
            ("model", &self.model),
            ("market", &self.market),
            ("body", &self.body),
            ("steering", &self.steering),
            ("engine_code", &self.engine),
            ("production_month", &self.production),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_skip_absent_fields() {
        let selection = VehicleSelection {
            series: "F22N".into(),
            model: Some("M240i".into()),
            production: Some("20181100".into()),
            ..Default::default()
        };

        let constraints = selection.constraints();
        assert_eq!(
            constraints,
            vec![("model", "M240i"), ("production_month", "20181100")]
        );
    }

    #[test]
    fn test_constraints_empty_for_series_only() {
        let selection = VehicleSelection { series: "F22N".into(), ..Default::default() };
        assert!(selection.constraints().is_empty());
    }

    #[test]
    fn test_constraints_full_selection_order() {
        let selection = VehicleSelection {
            series: "F22N".into(),
            body: Some("Cou".into()),
            model: Some("M240i".into()),
            steering: Some("R".into()),
            production: Some("20181100".into()),
            market: Some("EUR".into()),
            engine: Some("B58".into()),
        };

        let columns: Vec<&str> = selection.constraints().into_iter().map(|(c, _)| c).collect();
        assert_eq!(
            columns,
            vec!["model", "market", "body", "steering", "engine_code", "production_month"]
        );
    }

    #[test]
    fn test_deserialize_partial_selection() {
        let selection: VehicleSelection =
            serde_json::from_str(r#"{"series": "F32N", "model": "440i", "market": "EUR"}"#).unwrap();

        assert_eq!(selection.series, "F32N");
        assert_eq!(selection.model.as_deref(), Some("440i"));
        assert_eq!(selection.market.as_deref(), Some("EUR"));
        assert!(selection.body.is_none());
        assert!(selection.production.is_none());
    }
}
