use std::collections::BTreeSet;

use eframe::egui::{Id, Ui};
use egui_plot::{
    AxisHints, HPlacement, Legend, Line, LineStyle, Plot, PlotPoints,
};

use crate::color::{get_palette, series_color};
use crate::dashboard::{DashboardSpec, PanelLayout};
use crate::data::model::{IndexKind, IndexValue, Series, date_from_plot_coord};
use crate::style::{Alignment, DashPattern};

// ---------------------------------------------------------------------------
// Dashboard grid (central panel)
// ---------------------------------------------------------------------------

/// Render every panel of the built dashboard in an `ncols` grid. All panels
/// share one x-axis and one hover ruler via linked axes/cursors.
pub fn dashboard_grid(ui: &mut Ui, spec: &DashboardSpec) {
    let total_height = ui.available_height();
    for row in spec.panels.chunks(spec.ncols.max(1)) {
        ui.columns(row.len(), |columns| {
            for (slot, panel) in row.iter().enumerate() {
                panel_plot(&mut columns[slot], panel, spec, total_height);
            }
        });
    }
}

// ---------------------------------------------------------------------------
// One panel
// ---------------------------------------------------------------------------

fn panel_plot(ui: &mut Ui, panel: &PanelLayout, spec: &DashboardSpec, total_height: f32) {
    ui.strong(panel.title.as_str());

    let palette = get_palette(panel.group.len());
    let index_kind = panel.group.index_kind();
    let remap = right_axis_map(panel);

    // Legend labels of right-aligned series, for hover back-mapping.
    let right_labels: BTreeSet<String> = panel
        .alignment
        .iter()
        .enumerate()
        .filter(|(_, (_, side))| *side == Alignment::Right)
        .map(|(i, (name, _))| legend_label(panel, i, name))
        .collect();

    let mut plot = Plot::new(panel.title.clone())
        .legend(Legend::default())
        .height((total_height * panel.height_frac).max(120.0))
        .x_axis_label(match index_kind {
            Some(IndexKind::Date) => "Date",
            _ => "Index",
        })
        .link_axis(Id::new("dashboard_x"), [true, false])
        .link_cursor(Id::new("dashboard_x"), [true, false]);

    // Give every panel the same x-domain.
    if let Some(range) = spec.x_range {
        plot = plot
            .include_x(range.min.as_f64())
            .include_x(range.max.as_f64());
    }

    if index_kind == Some(IndexKind::Date) {
        plot = plot.x_axis_formatter(|mark, _range| {
            date_from_plot_coord(mark.value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        });
    }

    // Hover tooltip: series name, date (or index) and the true value, undoing
    // the right-axis remap where needed.
    let tooltip_kind = index_kind;
    let tooltip_remap = remap;
    plot = plot.label_formatter(move |name, value| {
        if name.is_empty() {
            return String::new();
        }
        let x_text = match tooltip_kind {
            Some(IndexKind::Date) => date_from_plot_coord(value.x)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            _ => format!("{:.0}", value.x),
        };
        let y = match tooltip_remap {
            Some(map) if right_labels.contains(name) => map.to_right(value.y),
            _ => value.y,
        };
        format!("{name}\ndate: {x_text}\nvalue: {y:.3}")
    });

    // Left axis label; a second, inverse-mapped axis when any series reads
    // against the right.
    let mut y_axes = vec![AxisHints::new_y().label(panel.ylabel.clone())];
    if let Some(map) = remap {
        y_axes.push(
            AxisHints::new_y()
                .label(panel.ylabel_right.clone().unwrap_or_default())
                .placement(HPlacement::Right)
                .formatter(move |mark, _range| format!("{:.2}", map.to_right(mark.value))),
        );
    }
    plot = plot.custom_y_axes(y_axes);

    plot.show(ui, |plot_ui| {
        for (i, series) in panel.group.series.iter().enumerate() {
            let style = &panel.styles[i];
            let color = series_color(style, &palette, i);
            let width = style.width.unwrap_or(1.5);
            let label = legend_label(panel, i, &series.name);
            let is_right = matches!(
                panel.alignment.get(i),
                Some((_, Alignment::Right))
            );

            for segment in gap_segments(series) {
                let points: Vec<[f64; 2]> = segment
                    .into_iter()
                    .map(|[x, y]| match remap {
                        Some(map) if is_right => [x, map.to_left(y)],
                        _ => [x, y],
                    })
                    .collect();
                let mut line = Line::new(PlotPoints::from(points))
                    .name(&label)
                    .color(color)
                    .width(width);
                line = match style.dash {
                    Some(DashPattern::Dashed) => line.style(LineStyle::dashed_loose()),
                    Some(DashPattern::Dotted) => line.style(LineStyle::dotted_dense()),
                    _ => line.style(LineStyle::Solid),
                };
                plot_ui.line(line);
            }
        }
    });
}

fn legend_label(panel: &PanelLayout, i: usize, name: &str) -> String {
    panel
        .styles
        .get(i)
        .and_then(|s| s.legend.clone())
        .unwrap_or_else(|| name.to_string())
}

// ---------------------------------------------------------------------------
// Gap handling
// ---------------------------------------------------------------------------

/// Split a series into contiguous finite runs so NaN points render as gaps
/// in the line instead of being interpolated across.
fn gap_segments(series: &Series) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for (iv, &v) in series.index.iter().zip(series.values.iter()) {
        if v.is_nan() {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        } else {
            current.push([IndexValue::as_f64(iv), v]);
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

// ---------------------------------------------------------------------------
// Right-axis value mapping
// ---------------------------------------------------------------------------

/// Linear map between the right-axis value range and the panel's left range,
/// so right-aligned series share the plot's coordinate space while axis
/// labels and tooltips keep showing true values.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RightAxisMap {
    left: (f64, f64),
    right: (f64, f64),
}

impl RightAxisMap {
    fn to_left(&self, y: f64) -> f64 {
        let (ll, lh) = self.left;
        let (rl, rh) = self.right;
        ll + (y - rl) * (lh - ll) / (rh - rl)
    }

    fn to_right(&self, y_left: f64) -> f64 {
        let (ll, lh) = self.left;
        let (rl, rh) = self.right;
        rl + (y_left - ll) * (rh - rl) / (lh - ll)
    }
}

fn right_axis_map(panel: &PanelLayout) -> Option<RightAxisMap> {
    let right = panel.right_range?;
    let left = left_value_range(panel)?;
    if right.1 - right.0 <= f64::EPSILON || left.1 - left.0 <= f64::EPSILON {
        return None;
    }
    Some(RightAxisMap { left, right })
}

/// Value span across the panel's left-aligned series.
fn left_value_range(panel: &PanelLayout) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for (i, series) in panel.group.series.iter().enumerate() {
        if matches!(panel.alignment.get(i), Some((_, Alignment::Right))) {
            continue;
        }
        if let Some((lo, hi)) = series.value_limits() {
            range = Some(match range {
                Some((a, b)) => (a.min(lo), b.max(hi)),
                None => (lo, hi),
            });
        }
    }
    range
}
