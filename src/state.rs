use crate::dashboard::{BuildOptions, Dashboard, DashboardConfig, DashboardSpec};
use crate::data::model::PanelsInput;
use crate::signals::{ControlSpec, SignalEngine, SignalKind, SignalSpec};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded raw input (None until the user loads a file).
    pub input: Option<PanelsInput>,

    /// Build options applied on every rebuild.
    pub options: BuildOptions,

    /// Layout configuration (columns come from the UI).
    pub config: DashboardConfig,

    /// Built dashboard, rebuilt after input/option changes (cached).
    pub spec: Option<DashboardSpec>,

    /// Sliders and the derived series they drive.
    pub engine: SignalEngine,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,

    /// Pending value-field text being edited in the top bar.
    pub value_field_edit: String,
}

impl Default for AppState {
    fn default() -> Self {
        let options = BuildOptions::default();
        Self {
            value_field_edit: options.value_field.clone(),
            input: None,
            options,
            config: DashboardConfig::default(),
            spec: None,
            engine: SignalEngine::default(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest newly loaded input and build the dashboard from it.
    pub fn set_input(&mut self, input: PanelsInput) {
        self.input = Some(input);
        self.status_message = None;
        self.loading = false;
        self.rebuild();
    }

    /// Re-run the whole pipeline: format, resolve, wire signals, apply them.
    pub fn rebuild(&mut self) {
        let Some(input) = &self.input else {
            self.spec = None;
            return;
        };

        let dashboard = match Dashboard::new(self.config.clone()) {
            Ok(d) => d,
            Err(e) => {
                self.fail(e.to_string());
                return;
            }
        };
        match dashboard.build(input, &self.options) {
            Ok(mut spec) => {
                if self.engine.signals.is_empty() {
                    self.engine = wire_average_signals(&spec);
                }
                if let Err(e) = self.engine.apply(&mut spec) {
                    self.fail(e.to_string());
                    return;
                }
                self.spec = Some(spec);
                self.status_message = None;
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    /// Cheap path after a slider change: re-evaluate derived series against
    /// the cached spec without re-normalizing the input.
    pub fn on_control_changed(&mut self) {
        if let Some(spec) = &mut self.spec {
            if let Err(e) = self.engine.apply(spec) {
                self.status_message = Some(format!("Error: {e}"));
                log::error!("signal recompute failed: {e}");
            }
        }
    }

    pub fn apply_value_field(&mut self) {
        if self.value_field_edit != self.options.value_field {
            self.options.value_field = self.value_field_edit.clone();
            self.rebuild();
        }
    }

    pub fn set_ncols(&mut self, ncols: usize) {
        if self.config.ncols != ncols {
            self.config.ncols = ncols;
            self.rebuild();
        }
    }

    fn fail(&mut self, message: String) {
        log::error!("dashboard build failed: {message}");
        self.status_message = Some(format!("Error: {message}"));
        self.spec = None;
    }
}

// ---------------------------------------------------------------------------
// Default signal wiring
// ---------------------------------------------------------------------------

/// Wire a moving-average signal for every series named `<source>_avg` whose
/// source exists in some panel, all sharing one `window` slider. Inputs
/// without such series simply get no controls.
fn wire_average_signals(spec: &DashboardSpec) -> SignalEngine {
    let mut signals = Vec::new();

    for panel in &spec.panels {
        for name in &panel.names {
            let Some(stem) = name.strip_suffix("_avg") else {
                continue;
            };
            let source_panel = spec
                .panels
                .iter()
                .find(|p| p.names.iter().any(|n| n == stem));
            if let Some(source_panel) = source_panel {
                signals.push(SignalSpec {
                    name: name.clone(),
                    panel: panel.title.clone(),
                    source_panel: source_panel.title.clone(),
                    source: stem.to_string(),
                    control: "window".to_string(),
                    kind: SignalKind::MovingAverage,
                });
            }
        }
    }

    if signals.is_empty() {
        return SignalEngine::default();
    }

    let controls = vec![ControlSpec {
        name: "window".to_string(),
        title: "Average window".to_string(),
        value: 30.0,
        start: 2.0,
        end: 252.0,
        step: 5.0,
    }];
    match SignalEngine::new(controls, signals) {
        Ok(engine) => engine,
        Err(e) => {
            log::warn!("skipping signal wiring: {e}");
            SignalEngine::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawInput;

    fn sample_input() -> PanelsInput {
        let stocks = RawInput::ArrayMap(vec![(
            "AAPL".to_string(),
            (0..60).map(|i| 100.0 + i as f64).collect(),
        )]);
        let avg = RawInput::ArrayMap(vec![("AAPL_avg".to_string(), vec![0.0; 60])]);
        PanelsInput::Named(vec![
            ("stocks".to_string(), stocks),
            ("avg".to_string(), avg),
        ])
    }

    #[test]
    fn set_input_builds_and_wires_signals() {
        let mut state = AppState::default();
        state.set_input(sample_input());

        let spec = state.spec.as_ref().expect("spec built");
        assert_eq!(spec.panels.len(), 2);
        assert_eq!(state.engine.signals.len(), 1);
        assert_eq!(state.engine.signals[0].source, "AAPL");

        // The derived series was recomputed away from its placeholder zeros.
        let avg = &spec.panels[1].group.series[0];
        assert!(avg.values.iter().any(|v| *v > 0.0));
    }

    #[test]
    fn control_change_updates_cached_spec() {
        let mut state = AppState::default();
        state.set_input(sample_input());

        state.engine.controls[0].value = 2.0;
        state.on_control_changed();
        let narrow: Vec<f64> = state.spec.as_ref().unwrap().panels[1].group.series[0]
            .values
            .clone();

        state.engine.controls[0].value = 100.0;
        state.on_control_changed();
        let wide: Vec<f64> = state.spec.as_ref().unwrap().panels[1].group.series[0]
            .values
            .clone();

        assert_ne!(narrow, wide);
    }

    #[test]
    fn bad_value_field_surfaces_error() {
        let mut state = AppState::default();
        let input = PanelsInput::Named(vec![(
            "stocks".to_string(),
            RawInput::RecordMap(vec![(
                "AAPL".to_string(),
                crate::data::model::Record {
                    columns: vec![("adj_close".to_string(), vec![1.0, 2.0])],
                    dates: None,
                },
            )]),
        )]);
        state.set_input(input);
        assert!(state.spec.is_some());

        state.value_field_edit = "volume".to_string();
        state.apply_value_field();
        assert!(state.spec.is_none());
        assert!(state
            .status_message
            .as_deref()
            .unwrap_or_default()
            .contains("volume"));
    }
}
