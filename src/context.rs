//! The explicit, non-global configuration and diagnostics context threaded
//! into every engine constructor (§7, §9 "Global state").

use serde::{Deserialize, Serialize};
use std::io::Write;

/// Tunable constants for the PLN engine. Defaults match the fixed values in
/// §4.3. Can be loaded from a YAML document (`CoreConfig::from_yaml`) for
/// experiments that vary them without recompiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlnConfig {
    /// Discount applied to Deduction and ModusPonens confidence.
    pub discount: f64,
    /// Discount applied to Inversion confidence.
    pub inversion_discount: f64,
    /// Discount applied to Abduction confidence. Fixed at 0.6 per Open
    /// Question (a); kept as a field rather than a literal so a caller can
    /// still override it for experimentation.
    pub abduction_discount: f64,
    /// The background probability ModusPonens blends in when a premise node
    /// has partial confidence. Previously hard-coded at 0.2 (REDESIGN FLAG
    /// / Open Question (c)); now a configuration parameter.
    pub modus_ponens_background: f64,
}

impl Default for PlnConfig {
    fn default() -> Self {
        Self {
            discount: 0.9,
            inversion_discount: 0.8,
            abduction_discount: 0.6,
            modus_ponens_background: 0.2,
        }
    }
}

/// Tunable constants for the URE engine's backward chainer (BIT).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UreConfig {
    /// Decay applied to a BIT node's fitness per unit of depth.
    pub bit_lambda: f64,
    /// Default step budget for the forward chainer when the caller doesn't
    /// specify one.
    pub default_max_steps: usize,
    /// Default `max_iterations` for the backward chainer.
    pub default_max_iterations: usize,
    /// Weight `alpha` in the adaptive-mixed efficiency score.
    pub efficiency_alpha: f64,
    /// Weight `beta` in the adaptive-mixed efficiency score.
    pub efficiency_beta: f64,
}

impl Default for UreConfig {
    fn default() -> Self {
        Self {
            bit_lambda: 0.2,
            default_max_steps: 100,
            default_max_iterations: 100,
            efficiency_alpha: 0.5,
            efficiency_beta: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    pub pln: PlnConfig,
    pub ure: UreConfig,
}

impl CoreConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// A structured diagnostic event emitted by the reasoning engines. Kept as a
/// flat enum rather than a formatted string so a `Tracer` implementation can
/// filter or aggregate without re-parsing text.
#[derive(Debug, Clone)]
pub enum TraceEvent<'a> {
    PassStarted { engine: &'a str, iteration: usize },
    RuleApplied { rule: &'a str, conclusion: crate::atom::Handle },
    RuleSkipped { rule: &'a str, reason: &'a str },
    PassFinished { engine: &'a str, iteration: usize, inserted: usize },
    BudgetExhausted { engine: &'a str },
}

/// Injectable sink for `TraceEvent`s, standing in for the process-wide
/// logging the original system initialized at module scope (§9). There is no
/// default global tracer; callers that want diagnostics wire one in through
/// `CoreContext`.
pub trait Tracer: Send + Sync {
    fn trace(&self, event: TraceEvent<'_>);
}

/// Discards every event. The default for `CoreContext` when the caller
/// doesn't care about diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTracer;

impl Tracer for NullTracer {
    fn trace(&self, _event: TraceEvent<'_>) {}
}

/// Writes a one-line rendering of every event to a writer (typically
/// `stderr`), for the inspection CLI and for debugging test failures.
pub struct WriterTracer<W> {
    out: std::sync::Mutex<W>,
}

impl<W: Write> WriterTracer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: std::sync::Mutex::new(out),
        }
    }
}

impl<W: Write + Send> Tracer for WriterTracer<W> {
    fn trace(&self, event: TraceEvent<'_>) {
        let mut out = self.out.lock().expect("tracer lock poisoned");
        let _ = match event {
            TraceEvent::PassStarted { engine, iteration } => {
                writeln!(out, "[{engine}] pass {iteration} started")
            }
            TraceEvent::RuleApplied { rule, conclusion } => {
                writeln!(out, "  rule `{rule}` applied -> {conclusion}")
            }
            TraceEvent::RuleSkipped { rule, reason } => {
                writeln!(out, "  rule `{rule}` skipped: {reason}")
            }
            TraceEvent::PassFinished {
                engine,
                iteration,
                inserted,
            } => writeln!(out, "[{engine}] pass {iteration} inserted {inserted} atoms"),
            TraceEvent::BudgetExhausted { engine } => {
                writeln!(out, "[{engine}] budget exhausted")
            }
        };
    }
}

/// The context passed into every engine constructor: configuration plus
/// diagnostics, explicit rather than a process-wide singleton.
#[derive(Clone)]
pub struct CoreContext {
    pub config: CoreConfig,
    tracer: std::sync::Arc<dyn Tracer>,
}

impl CoreContext {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            tracer: std::sync::Arc::new(NullTracer),
        }
    }

    pub fn with_tracer(config: CoreConfig, tracer: std::sync::Arc<dyn Tracer>) -> Self {
        Self { config, tracer }
    }

    pub fn trace(&self, event: TraceEvent<'_>) {
        self.tracer.trace(event);
    }
}

impl Default for CoreContext {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_constants() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.pln.discount, 0.9);
        assert_eq!(cfg.pln.inversion_discount, 0.8);
        assert_eq!(cfg.pln.abduction_discount, 0.6);
        assert_eq!(cfg.pln.modus_ponens_background, 0.2);
        assert_eq!(cfg.ure.bit_lambda, 0.2);
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let cfg = CoreConfig::default();
        let yaml = cfg.to_yaml().unwrap();
        let back = CoreConfig::from_yaml(&yaml).unwrap();
        assert_eq!(back.pln.discount, cfg.pln.discount);
    }
}
