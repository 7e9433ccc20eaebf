//! Interactive controls: sliders that drive derived series (moving averages)
//! recomputed on every value change and re-attached to their target panel.

use thiserror::Error;

use crate::dashboard::DashboardSpec;
use crate::data::model::Series;
use crate::style::{Alignment, LineStyleParams};

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("control '{0}' not found")]
    UnknownControl(String),

    #[error("source series '{0}' not found in panel '{1}'")]
    UnknownSource(String, String),

    #[error("panel '{0}' not found")]
    UnknownPanel(String),

    #[error("control '{name}' has an empty range")]
    EmptyRange { name: String },
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// A slider-driven parameter, rendered as an `egui::Slider`.
#[derive(Debug, Clone)]
pub struct ControlSpec {
    pub name: String,
    pub title: String,
    pub value: f64,
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl ControlSpec {
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.end <= self.start || self.step <= 0.0 {
            return Err(SignalError::EmptyRange {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Derived signals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    MovingAverage,
    ExponentialMovingAverage,
}

/// A derived series: `kind` applied to `source` (in `source_panel`) with the
/// window taken from `control`, attached to `panel` under `name`.
#[derive(Debug, Clone)]
pub struct SignalSpec {
    pub name: String,
    pub panel: String,
    pub source_panel: String,
    pub source: String,
    pub control: String,
    pub kind: SignalKind,
}

/// Centered moving average over `window` points. A window touching a NaN gap
/// yields NaN, so gaps widen rather than get interpolated away.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    if window == 1 {
        return values.to_vec();
    }
    let n = values.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + window - half).min(n);
            let slice = &values[lo..hi];
            let sum: f64 = slice.iter().sum();
            sum / slice.len() as f64
        })
        .collect()
}

/// Exponential moving average with the given span (alpha = 2 / (span + 1)),
/// weighting all prior finite points; leading gaps stay NaN.
pub fn exponential_moving_average(values: &[f64], span: usize) -> Vec<f64> {
    let span = span.max(1);
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    values
        .iter()
        .map(|&v| {
            numerator *= decay;
            denominator *= decay;
            if !v.is_nan() {
                numerator += v;
                denominator += 1.0;
            }
            if denominator > 0.0 {
                numerator / denominator
            } else {
                f64::NAN
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the control values and the signal definitions; `apply` re-evaluates
/// every signal against a built dashboard spec.
#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    pub controls: Vec<ControlSpec>,
    pub signals: Vec<SignalSpec>,
}

impl SignalEngine {
    pub fn new(controls: Vec<ControlSpec>, signals: Vec<SignalSpec>) -> Result<Self, SignalError> {
        for control in &controls {
            control.validate()?;
        }
        for signal in &signals {
            if !controls.iter().any(|c| c.name == signal.control) {
                return Err(SignalError::UnknownControl(signal.control.clone()));
            }
        }
        Ok(Self { controls, signals })
    }

    pub fn control_value(&self, name: &str) -> Option<f64> {
        self.controls
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }

    /// Recompute every derived series and attach it to its target panel.
    /// Existing series with the same name are replaced in place; new ones are
    /// appended with a default style on the left axis.
    pub fn apply(&self, spec: &mut DashboardSpec) -> Result<(), SignalError> {
        for signal in &self.signals {
            let window = self
                .control_value(&signal.control)
                .ok_or_else(|| SignalError::UnknownControl(signal.control.clone()))?
                .round()
                .max(1.0) as usize;

            let source = spec
                .panels
                .iter()
                .find(|p| p.title == signal.source_panel)
                .ok_or_else(|| SignalError::UnknownPanel(signal.source_panel.clone()))?
                .group
                .series
                .iter()
                .find(|s| s.name == signal.source)
                .ok_or_else(|| {
                    SignalError::UnknownSource(signal.source.clone(), signal.source_panel.clone())
                })?
                .clone();

            let values = match signal.kind {
                SignalKind::MovingAverage => moving_average(&source.values, window),
                SignalKind::ExponentialMovingAverage => {
                    exponential_moving_average(&source.values, window)
                }
            };
            let derived = Series {
                name: signal.name.clone(),
                index: source.index,
                values,
            };

            let target = spec
                .panels
                .iter_mut()
                .find(|p| p.title == signal.panel)
                .ok_or_else(|| SignalError::UnknownPanel(signal.panel.clone()))?;

            match target.group.series.iter_mut().find(|s| s.name == derived.name) {
                Some(existing) => *existing = derived,
                None => {
                    target.names.push(derived.name.clone());
                    target.styles.push(LineStyleParams::default());
                    target
                        .alignment
                        .push((derived.name.clone(), Alignment::Left));
                    target.group.series.push(derived);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{BuildOptions, Dashboard, DashboardConfig};
    use crate::data::model::{PanelsInput, RawInput};

    #[test]
    fn moving_average_of_constant_is_constant() {
        let values = vec![5.0; 20];
        let avg = moving_average(&values, 7);
        assert_eq!(avg.len(), 20);
        for v in avg {
            assert!((v - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn moving_average_window_one_is_identity() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(moving_average(&values, 1), values);
        assert_eq!(moving_average(&values, 0), values);
    }

    #[test]
    fn moving_average_propagates_gaps() {
        let values = vec![1.0, 1.0, f64::NAN, 1.0, 1.0];
        let avg = moving_average(&values, 3);
        // Every window touching the gap is itself a gap.
        assert!(avg[1].is_nan());
        assert!(avg[2].is_nan());
        assert!(avg[3].is_nan());
        assert!(!avg[0].is_nan());
    }

    #[test]
    fn ema_of_constant_is_constant() {
        let values = vec![3.0; 10];
        for v in exponential_moving_average(&values, 5) {
            assert!((v - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_skips_leading_gaps() {
        let values = vec![f64::NAN, f64::NAN, 2.0, 4.0];
        let ema = exponential_moving_average(&values, 3);
        assert!(ema[0].is_nan());
        assert!(ema[1].is_nan());
        assert_eq!(ema[2], 2.0);
        assert!(ema[3] > 2.0 && ema[3] < 4.0);
    }

    #[test]
    fn control_range_is_validated() {
        let bad = ControlSpec {
            name: "window".into(),
            title: "Window".into(),
            value: 10.0,
            start: 30.0,
            end: 2.0,
            step: 1.0,
        };
        assert!(matches!(
            SignalEngine::new(vec![bad], Vec::new()),
            Err(SignalError::EmptyRange { .. })
        ));
    }

    fn built_spec() -> DashboardSpec {
        let stocks = RawInput::ArrayMap(vec![(
            "AAPL".to_string(),
            (0..30).map(|i| i as f64).collect(),
        )]);
        let avg = RawInput::ArrayMap(vec![("AAPL_avg".to_string(), vec![0.0; 30])]);
        let input = PanelsInput::Named(vec![
            ("stocks".to_string(), stocks),
            ("avg".to_string(), avg),
        ]);
        Dashboard::new(DashboardConfig::default())
            .unwrap()
            .build(&input, &BuildOptions::default())
            .unwrap()
    }

    #[test]
    fn apply_replaces_derived_series_in_target_panel() {
        let engine = SignalEngine::new(
            vec![ControlSpec {
                name: "window".into(),
                title: "Window".into(),
                value: 1.0,
                start: 1.0,
                end: 30.0,
                step: 1.0,
            }],
            vec![SignalSpec {
                name: "AAPL_avg".into(),
                panel: "avg".into(),
                source_panel: "stocks".into(),
                source: "AAPL".into(),
                control: "window".into(),
                kind: SignalKind::MovingAverage,
            }],
        )
        .unwrap();

        let mut spec = built_spec();
        engine.apply(&mut spec).unwrap();

        let avg_panel = &spec.panels[1];
        assert_eq!(avg_panel.group.len(), 1);
        // Window of 1: the derived series now mirrors its source.
        assert_eq!(avg_panel.group.series[0].values[7], 7.0);
    }

    #[test]
    fn apply_rejects_unknown_sources() {
        let engine = SignalEngine {
            controls: vec![ControlSpec {
                name: "window".into(),
                title: "Window".into(),
                value: 5.0,
                start: 1.0,
                end: 30.0,
                step: 1.0,
            }],
            signals: vec![SignalSpec {
                name: "x".into(),
                panel: "avg".into(),
                source_panel: "stocks".into(),
                source: "MSFT".into(),
                control: "window".into(),
                kind: SignalKind::MovingAverage,
            }],
        };
        let mut spec = built_spec();
        assert!(matches!(
            engine.apply(&mut spec),
            Err(SignalError::UnknownSource(..))
        ));
    }
}
