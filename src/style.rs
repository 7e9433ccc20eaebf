use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Per-series style attributes, forwarded to the renderer
// ---------------------------------------------------------------------------

/// Which y-axis of a panel a series is read against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashPattern {
    Solid,
    Dashed,
    Dotted,
}

/// Passthrough style attributes for one line. Unset attributes fall back to
/// the next layer of defaults (see `Dashboard`'s precedence rules) and
/// finally to palette colors / toolkit defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineStyleParams {
    /// Hex string (`"#rrggbb"`) or one of a few common color names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<DashPattern>,
    /// Legend text; defaults to the series name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
    /// Explicit y-axis range override for the axis this series is read on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<(f64, f64)>,
}

impl LineStyleParams {
    /// Overlay `self` on top of `base`: attributes set here win.
    pub fn over(&self, base: &LineStyleParams) -> LineStyleParams {
        LineStyleParams {
            color: self.color.clone().or_else(|| base.color.clone()),
            width: self.width.or(base.width),
            dash: self.dash.or(base.dash),
            legend: self.legend.clone().or_else(|| base.legend.clone()),
            y_range: self.y_range.or(base.y_range),
        }
    }
}

// ---------------------------------------------------------------------------
// Panel-level style parameters
// ---------------------------------------------------------------------------

/// Style parameters for one panel: group-wide defaults plus per-series
/// overrides keyed by series name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelStyle {
    #[serde(default)]
    pub defaults: LineStyleParams,
    #[serde(default)]
    pub per_series: BTreeMap<String, LineStyleParams>,
}

impl PanelStyle {
    pub fn series_override(&self, name: &str) -> Option<&LineStyleParams> {
        self.per_series.get(name)
    }
}

/// Caller-supplied styling: keyed by panel name, or positional with exactly
/// one entry per panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleInput {
    ByPanel(BTreeMap<String, PanelStyle>),
    Positional(Vec<PanelStyle>),
}

impl Default for StyleInput {
    fn default() -> Self {
        StyleInput::ByPanel(BTreeMap::new())
    }
}
