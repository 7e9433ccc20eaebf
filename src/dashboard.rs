//! Thin orchestration over the formatter: resolves styles, alignment and
//! panel geometry into a [`DashboardSpec`] the ui layer renders with
//! `egui_plot`. No toolkit calls happen here.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::data::formatter::{self, FormatError};
use crate::data::model::{PanelsInput, SeriesGroup, XRange};
use crate::style::{Alignment, LineStyleParams, PanelStyle, StyleInput};

pub const WIDTH: f32 = 1024.0;
pub const HEIGHT: f32 = 648.0;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("'{name}' must be positive")]
    InvalidConfig { name: &'static str },

    #[error("number of heights should be equal to the number of plots: expected {expected}, found {found}")]
    HeightCount { expected: usize, found: usize },

    #[error("all heights should sum up to 1, found sum {sum}")]
    HeightSum { sum: f64 },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub width: f32,
    pub height: f32,
    pub ncols: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            ncols: 1,
        }
    }
}

/// Per-build options. `params` / `alignment` / `heights` mirror the
/// formatter entry points; `defaults` is the call-wide style layer.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub title: String,
    /// Column extracted from record inputs.
    pub value_field: String,
    pub params: StyleInput,
    /// Call-wide style defaults, the weakest layer of the precedence chain.
    pub defaults: LineStyleParams,
    /// Series name → axis side; unset series read against the left axis.
    pub alignment: BTreeMap<String, Alignment>,
    /// Vertical height fraction per panel; must match the panel count and
    /// sum to 1. Defaults to equal fractions.
    pub heights: Option<Vec<f64>>,
    pub ylabel: String,
    /// Right-axis label per panel title.
    pub ylabel_right: BTreeMap<String, String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            title: "stocks dashboard".to_string(),
            value_field: "adj_close".to_string(),
            params: StyleInput::default(),
            defaults: LineStyleParams::default(),
            alignment: BTreeMap::new(),
            heights: None,
            ylabel: "Price".to_string(),
            ylabel_right: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Build output
// ---------------------------------------------------------------------------

/// One panel, fully resolved: merged series, per-series style and alignment,
/// height fraction and axis labels.
#[derive(Debug, Clone)]
pub struct PanelLayout {
    pub title: String,
    pub group: SeriesGroup,
    pub names: Vec<String>,
    /// Resolved style per series, aligned with `names`.
    pub styles: Vec<LineStyleParams>,
    /// Axis side per series, aligned with `names`.
    pub alignment: Vec<(String, Alignment)>,
    pub height_frac: f32,
    pub ylabel: String,
    pub ylabel_right: Option<String>,
    /// Value span of the right axis, when any series is right-aligned.
    pub right_range: Option<(f64, f64)>,
}

/// The whole dashboard, ready for rendering.
#[derive(Debug, Clone)]
pub struct DashboardSpec {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub ncols: usize,
    pub x_range: Option<XRange>,
    pub panels: Vec<PanelLayout>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct Dashboard {
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Result<Self, DashboardError> {
        if config.width <= 0.0 {
            return Err(DashboardError::InvalidConfig { name: "width" });
        }
        if config.height <= 0.0 {
            return Err(DashboardError::InvalidConfig { name: "height" });
        }
        if config.ncols == 0 {
            return Err(DashboardError::InvalidConfig { name: "ncols" });
        }
        Ok(Self { config })
    }

    /// Run the full formatting pipeline and resolve one [`PanelLayout`] per
    /// named group. Fails fast on the first validation error; no partial
    /// dashboards are produced.
    pub fn build(
        &self,
        input: &PanelsInput,
        opts: &BuildOptions,
    ) -> Result<DashboardSpec, DashboardError> {
        let formatted = formatter::format_input_groups(input, &opts.value_field)?;
        let titles: Vec<String> = formatted
            .panels
            .iter()
            .map(|(title, _)| title.clone())
            .collect();

        let panel_styles = formatter::format_style_params(&titles, &opts.params)?;
        let alignment = formatter::format_axis_alignment(&opts.alignment, &formatted.names);
        let heights = resolve_heights(opts.heights.as_deref(), titles.len())?;

        let mut panels = Vec::with_capacity(titles.len());
        for (i, (title, group)) in formatted.panels.into_iter().enumerate() {
            let names = formatted.names[i].clone();
            let styles: Vec<LineStyleParams> = names
                .iter()
                .map(|name| resolve_series_style(name, &panel_styles[i], &opts.defaults))
                .collect();
            let right_range = right_axis_range(&group, &alignment[i], &styles);

            panels.push(PanelLayout {
                ylabel_right: opts.ylabel_right.get(&title).cloned(),
                title,
                group,
                names,
                styles,
                alignment: alignment[i].clone(),
                height_frac: heights[i] as f32,
                ylabel: opts.ylabel.clone(),
                right_range,
            });
        }

        Ok(DashboardSpec {
            title: opts.title.clone(),
            width: self.config.width,
            height: self.config.height,
            ncols: self.config.ncols,
            x_range: formatted.x_range,
            panels,
        })
    }
}

/// Style precedence: per-name overrides win over panel defaults, which win
/// over call-wide defaults.
fn resolve_series_style(
    name: &str,
    panel_style: &PanelStyle,
    call_defaults: &LineStyleParams,
) -> LineStyleParams {
    let per_name = panel_style
        .series_override(name)
        .cloned()
        .unwrap_or_default();
    per_name.over(&panel_style.defaults).over(call_defaults)
}

fn resolve_heights(heights: Option<&[f64]>, n_panels: usize) -> Result<Vec<f64>, DashboardError> {
    match heights {
        None => {
            if n_panels == 0 {
                return Ok(Vec::new());
            }
            Ok(vec![1.0 / n_panels as f64; n_panels])
        }
        Some(h) => {
            if h.len() != n_panels {
                return Err(DashboardError::HeightCount {
                    expected: n_panels,
                    found: h.len(),
                });
            }
            let sum: f64 = h.iter().sum();
            if (sum - 1.0).abs() > 1e-6 {
                return Err(DashboardError::HeightSum { sum });
            }
            Ok(h.to_vec())
        }
    }
}

/// Value span for the right y-axis: an explicit `y_range` override from a
/// right-aligned series wins, otherwise the NaN-aware min/max across all
/// right-aligned series.
fn right_axis_range(
    group: &SeriesGroup,
    alignment: &[(String, Alignment)],
    styles: &[LineStyleParams],
) -> Option<(f64, f64)> {
    let mut computed: Option<(f64, f64)> = None;
    let mut any_right = false;

    for (i, (name, side)) in alignment.iter().enumerate() {
        if *side != Alignment::Right {
            continue;
        }
        any_right = true;
        if let Some(range) = styles.get(i).and_then(|s| s.y_range) {
            return Some(range);
        }
        let series = group.series.iter().find(|s| &s.name == name)?;
        if let Some((lo, hi)) = series.value_limits() {
            computed = Some(match computed {
                Some((a, b)) => (a.min(lo), b.max(hi)),
                None => (lo, hi),
            });
        }
    }

    if any_right {
        computed
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawInput;
    use crate::style::DashPattern;

    fn two_panel_input() -> PanelsInput {
        let stocks = RawInput::ArrayMap(vec![
            ("AAPL".to_string(), vec![1.0, 2.0, 3.0]),
            ("GOOG".to_string(), vec![10.0, 20.0, 30.0]),
        ]);
        let avg = RawInput::ArrayMap(vec![("AAPL_avg".to_string(), vec![2.0, 2.0, 2.0])]);
        PanelsInput::Named(vec![
            ("stocks".to_string(), stocks),
            ("avg".to_string(), avg),
        ])
    }

    #[test]
    fn config_rejects_zero_dimensions() {
        let bad = DashboardConfig {
            ncols: 0,
            ..Default::default()
        };
        assert!(matches!(
            Dashboard::new(bad),
            Err(DashboardError::InvalidConfig { name: "ncols" })
        ));
    }

    #[test]
    fn heights_arity_and_sum_are_validated() {
        let dash = Dashboard::new(DashboardConfig::default()).unwrap();
        let opts = BuildOptions {
            heights: Some(vec![0.5]),
            ..Default::default()
        };
        assert!(matches!(
            dash.build(&two_panel_input(), &opts),
            Err(DashboardError::HeightCount {
                expected: 2,
                found: 1
            })
        ));

        let opts = BuildOptions {
            heights: Some(vec![0.5, 0.8]),
            ..Default::default()
        };
        assert!(matches!(
            dash.build(&two_panel_input(), &opts),
            Err(DashboardError::HeightSum { .. })
        ));
    }

    #[test]
    fn default_heights_are_equal_fractions() {
        let dash = Dashboard::new(DashboardConfig::default()).unwrap();
        let spec = dash
            .build(&two_panel_input(), &BuildOptions::default())
            .unwrap();
        assert_eq!(spec.panels.len(), 2);
        for panel in &spec.panels {
            assert!((panel.height_frac - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn style_precedence_per_name_over_panel_over_call() {
        let mut per_series = BTreeMap::new();
        per_series.insert(
            "GOOG".to_string(),
            LineStyleParams {
                dash: Some(DashPattern::Dashed),
                color: Some("blue".into()),
                ..Default::default()
            },
        );
        let mut by_panel = BTreeMap::new();
        by_panel.insert(
            "stocks".to_string(),
            PanelStyle {
                defaults: LineStyleParams {
                    color: Some("gray".into()),
                    ..Default::default()
                },
                per_series,
            },
        );

        let opts = BuildOptions {
            params: StyleInput::ByPanel(by_panel),
            defaults: LineStyleParams {
                width: Some(2.5),
                color: Some("black".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let dash = Dashboard::new(DashboardConfig::default()).unwrap();
        let spec = dash.build(&two_panel_input(), &opts).unwrap();

        let stocks = &spec.panels[0];
        let aapl = &stocks.styles[0];
        let goog = &stocks.styles[1];

        // AAPL: panel default color beats call-wide, call-wide width flows in.
        assert_eq!(aapl.color.as_deref(), Some("gray"));
        assert_eq!(aapl.width, Some(2.5));
        // GOOG: per-name color and dash win.
        assert_eq!(goog.color.as_deref(), Some("blue"));
        assert_eq!(goog.dash, Some(DashPattern::Dashed));
        assert_eq!(goog.width, Some(2.5));

        // avg panel has no panel style, only the call-wide layer.
        let avg = &spec.panels[1];
        assert_eq!(avg.styles[0].color.as_deref(), Some("black"));
    }

    #[test]
    fn right_axis_range_from_right_aligned_series() {
        let mut alignment = BTreeMap::new();
        alignment.insert("GOOG".to_string(), Alignment::Right);
        let opts = BuildOptions {
            alignment,
            ..Default::default()
        };

        let dash = Dashboard::new(DashboardConfig::default()).unwrap();
        let spec = dash.build(&two_panel_input(), &opts).unwrap();

        let stocks = &spec.panels[0];
        assert_eq!(stocks.right_range, Some((10.0, 30.0)));
        assert!(spec.panels[1].right_range.is_none());
    }

    #[test]
    fn shared_x_range_spans_both_panels() {
        let dash = Dashboard::new(DashboardConfig::default()).unwrap();
        let spec = dash
            .build(&two_panel_input(), &BuildOptions::default())
            .unwrap();
        let range = spec.x_range.unwrap();
        assert_eq!(range.min.as_f64(), 0.0);
        assert_eq!(range.max.as_f64(), 2.0);
    }
}
