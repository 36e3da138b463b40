//! Configuration and circuit description files.
//!
//! Circuits and simulation parameters can be described declaratively in JSON:
//!
//! ```json
//! {
//!   "inputs": { "A": "DATA1", "B": "DATA0" },
//!   "gates": [
//!     { "name": "G1", "kind": "TH12", "inputs": ["A", "B"], "delay": 1.0 },
//!     { "name": "G2", "kind": "TH22", "inputs": ["A", "B"], "delay": 1.2 }
//!   ],
//!   "outputs": { "OUT": "G2" },
//!   "simulation": { "step": 0.5, "max_time": 20.0, "strict": false }
//! }
//! ```
//!
//! Gates are a list so that the file order is the evaluation order.
//! Every section and field other than a gate's `name` and `kind` is optional.

use crate::data_structures::Signal;
use crate::error::{NclResult, ValidationError};
use crate::graph::{Circuit, DEFAULT_GATE_DELAY};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default simulation step, in simulated time units.
pub const DEFAULT_STEP: f64 = 0.5;
/// Default time at which a simulation that hasn't settled is stopped.
pub const DEFAULT_MAX_TIME: f64 = 20.0;

/// Parameters of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Simulated time between two snapshots.
    #[serde(default = "default_step")]
    pub step: f64,

    /// No pass starts at or after this time.
    #[serde(default = "default_max_time")]
    pub max_time: f64,

    /// Reject circuits with unresolved references instead of reading them as NULL.
    #[serde(default)]
    pub strict: bool,
}

fn default_step() -> f64 {
    DEFAULT_STEP
}

fn default_max_time() -> f64 {
    DEFAULT_MAX_TIME
}

fn default_delay() -> f64 {
    DEFAULT_GATE_DELAY
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            step: DEFAULT_STEP,
            max_time: DEFAULT_MAX_TIME,
            strict: false,
        }
    }
}

impl SimConfig {
    /// Returns a copy of `self` with `strict` set.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Returns a copy of `self` with `max_time` set.
    pub fn max_time(mut self, max_time: f64) -> Self {
        self.max_time = max_time;
        self
    }

    /// Returns a copy of `self` with `step` set.
    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Checks that the run is bounded: a positive step and a finite time bound.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.step.is_finite() || self.step <= 0. {
            return Err(ValidationError::InvalidStep { step: self.step });
        }
        if !self.max_time.is_finite() || self.max_time < 0. {
            return Err(ValidationError::InvalidTimeBound {
                max_time: self.max_time,
            });
        }
        Ok(())
    }

    /// Returns the maximum number of evaluation passes a run can make.
    pub fn max_passes(&self) -> usize {
        (self.max_time / self.step).ceil() as usize
    }
}

/// One gate of a [CircuitFile].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateSpec {
    pub name: String,
    /// Textual gate kind, kept as a string so a bad kind is reported with the gate name.
    pub kind: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default = "default_delay")]
    pub delay: f64,
}

/// Serializable description of a [Circuit] and the parameters to simulate it with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitFile {
    #[serde(default)]
    pub inputs: IndexMap<String, Signal>,
    #[serde(default)]
    pub gates: Vec<GateSpec>,
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
    #[serde(default)]
    pub simulation: SimConfig,
}

impl CircuitFile {
    /// Parses a [CircuitFile] from a JSON string.
    pub fn from_json(json: &str) -> NclResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the JSON file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> NclResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        clilog::debug!("Loaded circuit description {}", path.as_ref().display());
        Self::from_json(&content)
    }

    /// Returns the description of `circuit`.
    pub fn from_circuit(circuit: &Circuit, simulation: SimConfig) -> Self {
        CircuitFile {
            inputs: circuit.inputs().clone(),
            gates: circuit
                .gates()
                .values()
                .map(|g| GateSpec {
                    name: g.name().to_owned(),
                    kind: g.kind().to_string(),
                    inputs: g.inputs().to_vec(),
                    delay: g.delay(),
                })
                .collect(),
            outputs: circuit.outputs().clone(),
            simulation,
        }
    }

    /// Builds the described [Circuit] by replaying the construction calls in file order,
    /// so the same validation rules apply as when building by hand.
    pub fn build(&self) -> NclResult<Circuit> {
        self.simulation.validate()?;
        let mut circuit = Circuit::new();
        for (name, value) in &self.inputs {
            circuit.add_input(name.as_str()).set_input_value(name, *value)?;
        }
        for gate in &self.gates {
            circuit.add_gate(
                gate.name.as_str(),
                gate.kind.as_str(),
                gate.inputs.iter().map(String::as_str),
                gate.delay,
            )?;
        }
        for (name, source) in &self.outputs {
            circuit.add_output(name.as_str(), source.as_str());
        }
        Ok(circuit)
    }

    /// Returns `self` as pretty printed JSON.
    pub fn to_json_pretty(&self) -> NclResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
