use crate::config::SimConfig;
use crate::data_structures::Signal;
use crate::error::{NclResult, ValidationError};
use crate::graph::*;
use serde::{Deserialize, Serialize};

/// Name of the pipeline input node.
pub const PIPELINE_INPUT: &str = "IN";

fn default_latency() -> f64 {
    DEFAULT_GATE_DELAY
}

/// One stage of a [Pipeline]: a single threshold gate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub kind: GateKind,
    /// Simulated latency, becomes the delay of the stage gate.
    #[serde(default = "default_latency")]
    pub latency: f64,
}

/// Final signal of one stage after a pipeline simulation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageResult {
    pub label: String,
    pub signal: Signal,
}

/// Result of [Pipeline::simulate].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageResult>,
    /// Number of stages whose output ended NULL.
    pub null_cycles: usize,
    pub settled: bool,
}

impl PipelineReport {
    /// Returns true if a wavefront got stuck somewhere in the pipeline, a hint that
    /// completion signals or early-completion gates are needed between stages.
    pub fn needs_completion(&self) -> bool {
        self.null_cycles > 0
    }
}

/// Linear chain of threshold gates fed by a single input.
///
/// Every stage gate reads the previous stage on all of its inputs: fixed kinds get the
/// previous node repeated as many times as they have inputs, generic `THm<m>` stages
/// read it once, so a generic stage with `m > 1` never fires.
///
/// # Example
/// ```
/// # use nclsim::{FixedKind, GateKind, Pipeline, Signal};
/// let mut p = Pipeline::new();
/// p.push(FixedKind::Th12, 1.0).push(FixedKind::Th22, 1.0).push(GateKind::Generic(2), 0.5);
///
/// let report = p.simulate(Signal::Data0).unwrap();
/// let signals: Vec<_> = report.stages.iter().map(|s| s.signal).collect();
/// assert_eq!(signals, [Signal::Data1, Signal::Data1, Signal::Null]);
/// assert_eq!(report.stages[2].label, "Stage3_THm2");
/// assert!(report.needs_completion());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Returns a new [Pipeline] without stages.
    pub fn new() -> Pipeline {
        Default::default()
    }

    /// Parses a pipeline from JSON: `{"stages":[{"kind":"TH22","latency":1.0}]}`.
    pub fn from_json(json: &str) -> NclResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Appends a stage.
    pub fn push<K: Into<GateKind>>(&mut self, kind: K, latency: f64) -> &mut Self {
        self.stages.push(Stage {
            kind: kind.into(),
            latency,
        });
        self
    }

    /// Returns the gate name of stage `i`, counting from 0.
    pub fn stage_label(&self, i: usize) -> Option<String> {
        self.stages
            .get(i)
            .map(|stage| format!("Stage{}_{}", i + 1, stage.kind))
    }

    /// Builds the circuit of the pipeline, with [PIPELINE_INPUT] as its only input and
    /// the last stage as output `OUT`.
    pub fn build(&self) -> Result<Circuit, ValidationError> {
        let mut c = Circuit::new();
        c.add_input(PIPELINE_INPUT);

        let mut previous = PIPELINE_INPUT.to_string();
        for (i, stage) in self.stages.iter().enumerate() {
            let label = format!("Stage{}_{}", i + 1, stage.kind);
            let fan_in = stage.kind.arity().unwrap_or(1);
            let inputs = std::iter::repeat(previous.as_str()).take(fan_in);
            c.add_gate(label.as_str(), stage.kind, inputs, stage.latency)?;
            previous = label;
        }
        c.add_output("OUT", previous);
        Ok(c)
    }

    /// Feeds `input` into the pipeline and reports the signal every stage settles on.
    pub fn simulate(&self, input: Signal) -> NclResult<PipelineReport> {
        self.simulate_with_config(input, SimConfig::default())
    }

    /// Same as [Pipeline::simulate] with a custom [SimConfig].
    pub fn simulate_with_config(&self, input: Signal, config: SimConfig) -> NclResult<PipelineReport> {
        let circuit = self.build()?;
        let report = Simulator::with_config(&circuit, config)
            .run_with_inputs(std::iter::once((PIPELINE_INPUT, input)))?;

        let stages: Vec<_> = circuit
            .gates()
            .keys()
            .map(|label| StageResult {
                label: label.clone(),
                signal: report.value(label),
            })
            .collect();
        let null_cycles = stages.iter().filter(|s| s.signal.is_null()).count();
        if null_cycles > 0 {
            clilog::info!(
                "{} of {} pipeline stages ended NULL",
                null_cycles,
                stages.len()
            );
        }

        Ok(PipelineReport {
            stages,
            null_cycles,
            settled: report.settled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FixedKind::*;
    use Signal::*;

    fn all_kinds() -> Pipeline {
        let mut p = Pipeline::new();
        p.push(Th12, 1.0)
            .push(Th22, 1.0)
            .push(Th23, 1.0)
            .push(GateKind::Generic(2), 1.0);
        p
    }

    #[test]
    fn test_data_flows_until_generic_stage() {
        let report = all_kinds().simulate(Data1).unwrap();
        let signals: Vec<_> = report.stages.iter().map(|s| s.signal).collect();
        assert_eq!(signals, [Data1, Data1, Data1, Null]);
        assert_eq!(report.null_cycles, 1);
        assert!(report.settled);
    }

    #[test]
    fn test_null_input_gives_null_everywhere() {
        let report = all_kinds().simulate(Null).unwrap();
        assert_eq!(report.null_cycles, 4);
        assert!(report.needs_completion());
    }

    #[test]
    fn test_stage_wiring() {
        let p = all_kinds();
        let c = p.build().unwrap();
        assert_eq!(c.gate("Stage3_TH23").unwrap().inputs(), ["Stage2_TH22"; 3]);
        assert_eq!(c.gate("Stage4_THm2").unwrap().inputs(), ["Stage3_TH23"]);
        assert_eq!(c.outputs()["OUT"], "Stage4_THm2");
        assert_eq!(p.stage_label(0).as_deref(), Some("Stage1_TH12"));
        assert_eq!(p.stage_label(4), None);
    }

    #[test]
    fn test_empty_pipeline_passes_input_through() {
        let c = Pipeline::new().build().unwrap();
        assert_eq!(c.outputs()["OUT"], PIPELINE_INPUT);
        assert_eq!(Pipeline::new().simulate(Data0).unwrap().null_cycles, 0);
    }

    #[test]
    fn test_from_json() {
        let p = Pipeline::from_json(r#"{"stages":[{"kind":"TH22"},{"kind":"THm1","latency":2.5}]}"#)
            .unwrap();
        assert_eq!(p.stages[0].latency, DEFAULT_GATE_DELAY);
        assert_eq!(p.stages[1].kind, GateKind::Generic(1));

        let report = p.simulate(Quad).unwrap();
        assert_eq!(report.null_cycles, 0);

        assert!(Pipeline::from_json(r#"{"stages":[{"kind":"TH44"}]}"#).is_err());
        let bad_latency = Pipeline::from_json(r#"{"stages":[{"kind":"TH12","latency":-1}]}"#).unwrap();
        assert!(bad_latency.simulate(Data1).is_err());
    }
}
