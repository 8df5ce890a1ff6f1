use crate::errors::WidgetError;
use serde::Deserialize;

fn default_refresh_rate() -> u64 {
    60
}

/// Per-tile configuration. In the original dashboard markup these lived in
/// the tile element's `params` data attribute and the
/// `data-threshold-critical-value` / `data-threshold-caution-value`
/// attributes; here they come from the widget's configuration blob.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WidgetParams {
    /// Seconds between polls. Errors back off to ten times this.
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u64,

    #[serde(default)]
    pub threshold_critical: Option<f64>,

    #[serde(default)]
    pub threshold_caution: Option<f64>,

    /// Comparator policy: when set, values at or past a threshold are bad.
    /// Default policy treats higher values as better.
    #[serde(default)]
    pub lower_is_better: bool,
}

impl Default for WidgetParams {
    fn default() -> Self {
        WidgetParams {
            refresh_rate: default_refresh_rate(),
            threshold_critical: None,
            threshold_caution: None,
            lower_is_better: false,
        }
    }
}

impl WidgetParams {
    pub fn from_json(blob: &str) -> Result<Self, WidgetError> {
        serde_json::from_str(blob).map_err(|e| WidgetError::InvalidPayload(e.to_string()))
    }
}
