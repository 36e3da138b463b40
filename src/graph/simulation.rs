use super::{Circuit, UnresolvedReference};
use crate::config::SimConfig;
use crate::data_structures::{Signal, Snapshot, State, Timeline};
use crate::error::{NclResult, UnknownInputError, ValidationError};
use indexmap::IndexMap;
use serde::Serialize;

/// Result of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// One snapshot per pass, taken before the pass.
    pub timeline: Timeline,
    /// Final value of every output, in output order.
    pub outputs: IndexMap<String, Signal>,
    /// State after the last pass.
    pub final_state: State,
    /// False if the run was stopped by the time bound while gates were still changing.
    pub settled: bool,
    /// Number of evaluation passes over the gates.
    pub passes: usize,
    /// References that named no input or gate and were read as NULL.
    pub unresolved: Vec<UnresolvedReference>,
}

impl SimulationReport {
    /// Returns the final value of output `name`.
    pub fn output(&self, name: &str) -> Option<Signal> {
        self.outputs.get(name).copied()
    }

    /// Returns the final value of input or gate `node`, NULL if it doesn't exist.
    pub fn value(&self, node: &str) -> Signal {
        self.final_state.resolve(node)
    }
}

/// Simulates `circuit` from its own input values with the default [SimConfig].
///
/// Never fails: unresolved references read as NULL and are listed in
/// [SimulationReport::unresolved], and a circuit that doesn't settle before the time
/// bound comes back with `settled == false`.
///
/// # Example
/// ```
/// # use nclsim::{Circuit, Signal, simulate};
/// let mut c = Circuit::new();
/// c.add_input("A");
/// c.set_input_value("A", Signal::Data0).unwrap();
/// c.th12("G1", ["A", "not_wired_yet"]).unwrap();
///
/// let report = simulate(&c);
/// assert!(report.settled);
/// assert_eq!(report.passes, 2);
/// assert_eq!(report.timeline.len(), 2);
/// assert_eq!(report.value("G1"), Signal::Data1);
/// ```
pub fn simulate(circuit: &Circuit) -> SimulationReport {
    Simulator::new(circuit).propagate(State::from_inputs(circuit.inputs()))
}

/// Runs wavefront simulations of a [Circuit].
///
/// Every run starts from its own copy of the input values, the circuit is never
/// modified, so the same [Simulator] can be run any number of times.
///
/// Each pass evaluates all gates in the order they were added to the circuit, and a
/// gate sees the outputs already updated by the gates before it in the same pass.
/// The run stops after a pass that changes nothing, or when the next pass would
/// start at or after [SimConfig::max_time].
#[derive(Debug, Clone)]
pub struct Simulator<'a> {
    circuit: &'a Circuit,
    config: SimConfig,
}

impl<'a> Simulator<'a> {
    /// Returns a new [Simulator] of `circuit` with the default [SimConfig].
    pub fn new(circuit: &'a Circuit) -> Self {
        Simulator {
            circuit,
            config: Default::default(),
        }
    }

    /// Returns a new [Simulator] of `circuit` with `config`.
    pub fn with_config(circuit: &'a Circuit, config: SimConfig) -> Self {
        Simulator { circuit, config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Simulates the circuit from its own input values.
    ///
    /// Fails if the configuration is unbounded, or in strict mode if the circuit has
    /// unresolved references.
    pub fn run(&self) -> NclResult<SimulationReport> {
        self.check()?;
        Ok(self.propagate(State::from_inputs(self.circuit.inputs())))
    }

    /// Simulates the circuit after overriding some of its input values with `initial`.
    ///
    /// Inputs not named in `initial` keep their value from the circuit.
    pub fn run_with_inputs<'b, I>(&self, initial: I) -> NclResult<SimulationReport>
    where
        I: IntoIterator<Item = (&'b str, Signal)>,
    {
        self.check()?;
        let mut state = State::from_inputs(self.circuit.inputs());
        for (name, value) in initial {
            if !self.circuit.inputs().contains_key(name) {
                return Err(UnknownInputError { name: name.into() }.into());
            }
            state.set(name, value);
        }
        Ok(self.propagate(state))
    }

    /// Checks the configuration, and the references in strict mode.
    fn check(&self) -> Result<(), ValidationError> {
        self.config.validate()?;
        if self.config.strict {
            if let Some(first) = self.circuit.unresolved_references().into_iter().next() {
                return Err(first.into());
            }
        }
        Ok(())
    }

    /// Runs passes over the gates starting from `state` until nothing changes or
    /// the time bound is reached.
    fn propagate(&self, mut state: State) -> SimulationReport {
        clilog::debug!(
            "Simulating {} inputs, {} gates, step {}, bound {} (at most {} passes)",
            self.circuit.inputs().len(),
            self.circuit.len(),
            self.config.step,
            self.config.max_time,
            self.config.max_passes()
        );
        let unresolved = self.circuit.unresolved_references();
        if let Some(first) = unresolved.first() {
            clilog::warn!(
                "{} unresolved reference(s) will read as NULL, first: `{}` in `{}`",
                unresolved.len(),
                first.missing,
                first.referrer
            );
        }
        let mut timeline = Timeline::new();
        let mut passes = 0;
        let mut changed = true;
        loop {
            // Multiplying instead of accumulating keeps snapshot times exact.
            let time = passes as f64 * self.config.step;
            if !changed || time >= self.config.max_time {
                break;
            }
            timeline.push(Snapshot::of(time, &state));
            changed = self.pass(&mut state, time);
            passes += 1;
        }

        let settled = !changed;
        if settled {
            clilog::debug!("Circuit settled after {} passes", passes);
        } else {
            clilog::warn!(
                "Circuit didn't settle within {} time units ({} passes)",
                self.config.max_time,
                passes
            );
        }

        let outputs = self
            .circuit
            .outputs()
            .iter()
            .map(|(name, source)| (name.clone(), state.resolve(source)))
            .collect();

        SimulationReport {
            timeline,
            outputs,
            final_state: state,
            settled,
            passes,
            unresolved,
        }
    }

    /// Evaluates every gate once in circuit order, writing results into `state` as it goes.
    /// Returns true if any gate output changed.
    fn pass(&self, state: &mut State, time: f64) -> bool {
        let mut changed = false;
        for (name, gate) in self.circuit.gates() {
            let new_state = gate.evaluate(state);
            #[cfg(feature = "debug_gates")]
            let old_state = state.get(name);
            if state.update(name, new_state) {
                changed = true;
                #[cfg(feature = "debug_gates")]
                self.log_probe(name, time, old_state, new_state);
            }
        }
        #[cfg(not(feature = "debug_gates"))]
        let _ = time;
        changed
    }

    #[cfg(feature = "debug_gates")]
    fn log_probe(&self, name: &str, time: f64, old: Option<Signal>, new: Signal) {
        if !self.circuit.is_probed(name) {
            return;
        }
        match old {
            Some(old) => {
                clilog::info!("{} @{}: {} -> {}", name, time, old, new);
            }
            None => {
                clilog::info!("{} @{}: {}", name, time, new);
            }
        }
    }
}

/// Asserts that a [SimulationReport] settled after exactly `expected` passes.
#[macro_export]
macro_rules! assert_settles {
    ($report:expr, $expected:expr) => {
        let report = &$report;
        assert!(
            report.settled,
            "Circuit didn't settle after {} passes",
            report.passes
        );
        assert!(
            report.passes == $expected,
            "Circuit settled after {} passes, expected: {}",
            report.passes,
            $expected
        );
    };
}
