use crate::data_structures::Signal;
use crate::error::{FsmError, NclResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Whether outputs belong to states or to transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsmKind {
    /// Outputs depend on the current state only.
    #[default]
    Moore,
    /// Outputs depend on the transition taken.
    Mealy,
}

/// A state of an [Fsm], with its output for Moore machines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSpec {
    #[serde(default)]
    pub output: Option<Signal>,
}

/// An edge `from --input/out--> to` of an [Fsm].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    #[serde(rename = "in")]
    pub input: String,
    pub to: String,
    /// Output of Mealy machines when the transition is taken.
    #[serde(default)]
    pub out: Option<Signal>,
}

/// One consumed input symbol of an [Fsm] run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FsmStep {
    pub index: usize,
    pub input: String,
    /// State after the step.
    pub state: String,
    pub output: Signal,
}

fn default_start() -> String {
    "S0".into()
}

/// Moore or Mealy finite state machine with dual-rail outputs.
///
/// Machines are described in JSON the same way they are serialized:
/// ```json
/// {
///   "type": "Mealy",
///   "start": "S0",
///   "states": { "S0": {}, "S1": {} },
///   "transitions": [
///     { "from": "S0", "in": "1", "to": "S1", "out": "DATA1" },
///     { "from": "S1", "in": "1", "to": "S0", "out": "DATA0" }
///   ]
/// }
/// ```
///
/// # Example
/// ```
/// # use nclsim::{Fsm, FsmKind, Signal};
/// let mut fsm = Fsm::new(FsmKind::Moore);
/// fsm.add_state("S0", Signal::Data0).add_state("S1", Signal::Data1);
/// fsm.add_transition("S0", "1", "S1", None).add_transition("S1", "1", "S0", None);
///
/// let steps = fsm.simulate(&["1", "1", "0"], 10);
/// let outputs: Vec<_> = steps.iter().map(|s| s.output).collect();
/// assert_eq!(outputs, [Signal::Data0, Signal::Data1, Signal::Null]);
/// assert_eq!(steps[2].state, "S0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fsm {
    #[serde(rename = "type", default)]
    pub kind: FsmKind,
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default)]
    pub states: IndexMap<String, StateSpec>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl Fsm {
    /// Returns a new [Fsm] of `kind` without states, starting in `S0`.
    pub fn new(kind: FsmKind) -> Fsm {
        Fsm {
            kind,
            start: default_start(),
            states: Default::default(),
            transitions: Default::default(),
        }
    }

    /// Parses an [Fsm] from JSON and [validates](Fsm::validate) it.
    pub fn from_json(json: &str) -> NclResult<Self> {
        let fsm: Fsm = serde_json::from_str(json)?;
        fsm.validate()?;
        Ok(fsm)
    }

    /// Adds or replaces state `name` with `output`, which only matters for Moore machines.
    pub fn add_state<S: Into<String>>(&mut self, name: S, output: Signal) -> &mut Self {
        self.states.insert(
            name.into(),
            StateSpec {
                output: Some(output),
            },
        );
        self
    }

    /// Appends a transition, earlier transitions win when several match.
    pub fn add_transition<F, I, T>(&mut self, from: F, input: I, to: T, out: Option<Signal>) -> &mut Self
    where
        F: Into<String>,
        I: Into<String>,
        T: Into<String>,
    {
        self.transitions.push(Transition {
            from: from.into(),
            input: input.into(),
            to: to.into(),
            out,
        });
        self
    }

    /// Checks that the start state and every transition endpoint are defined states.
    ///
    /// A machine without any states is accepted, it never matches a transition.
    pub fn validate(&self) -> Result<(), FsmError> {
        if self.states.is_empty() {
            return Ok(());
        }
        if !self.states.contains_key(&self.start) {
            return Err(FsmError::UnknownStart {
                start: self.start.clone(),
            });
        }
        for (index, t) in self.transitions.iter().enumerate() {
            for state in [&t.from, &t.to] {
                if !self.states.contains_key(state) {
                    return Err(FsmError::UnknownState {
                        index,
                        state: state.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns the first transition leaving `state` on `input`.
    pub fn transition(&self, state: &str, input: &str) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == state && t.input == input)
    }

    /// Feeds at most `max_steps` symbols of `inputs` to the machine, starting from
    /// [Fsm::start].
    ///
    /// When no transition matches, the step outputs NULL and the state doesn't change.
    pub fn simulate<S: AsRef<str>>(&self, inputs: &[S], max_steps: usize) -> Vec<FsmStep> {
        let mut state = self.start.as_str();
        let mut steps = Vec::with_capacity(inputs.len().min(max_steps));
        for (index, input) in inputs.iter().take(max_steps).enumerate() {
            let input = input.as_ref();
            let output = match self.transition(state, input) {
                Some(t) => {
                    let output = match self.kind {
                        FsmKind::Mealy => t.out.unwrap_or_default(),
                        FsmKind::Moore => self
                            .states
                            .get(state)
                            .and_then(|s| s.output)
                            .unwrap_or_default(),
                    };
                    state = &t.to;
                    output
                }
                None => {
                    clilog::debug!("No transition from {} on `{}`", state, input);
                    Signal::Null
                }
            };
            steps.push(FsmStep {
                index,
                input: input.to_owned(),
                state: state.to_owned(),
                output,
            });
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::*;

    const MEALY: &str = r#"{
        "type": "Mealy",
        "states": { "S0": {}, "S1": {} },
        "transitions": [
            { "from": "S0", "in": "1", "to": "S1", "out": "DATA1" },
            { "from": "S1", "in": "1", "to": "S0", "out": "DATA0" },
            { "from": "S1", "in": "0", "to": "S1" }
        ]
    }"#;

    #[test]
    fn test_mealy_outputs_follow_transitions() {
        let fsm = Fsm::from_json(MEALY).unwrap();
        assert_eq!(fsm.start, "S0");

        let steps = fsm.simulate(&["1", "0", "1", "0"], 6);
        let got: Vec<_> = steps
            .iter()
            .map(|s| (s.state.as_str(), s.output))
            .collect();
        assert_eq!(
            got,
            [("S1", Data1), ("S1", Null), ("S0", Data0), ("S0", Null)]
        );
    }

    #[test]
    fn test_max_steps_truncates() {
        let fsm = Fsm::from_json(MEALY).unwrap();
        let steps = fsm.simulate(&["1", "1", "1", "1"], 2);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].index, 1);
        assert!(fsm.simulate(&["1"], 0).is_empty());
    }

    #[test]
    fn test_moore_state_without_output_is_null() {
        let mut fsm = Fsm::new(FsmKind::Moore);
        fsm.states.insert("S0".into(), StateSpec::default());
        fsm.add_state("S1", Quad);
        fsm.add_transition("S0", "a", "S1", Some(Data1))
            .add_transition("S1", "a", "S0", None);

        let outputs: Vec<_> = fsm
            .simulate(&["a", "a"], 5)
            .into_iter()
            .map(|s| s.output)
            .collect();
        assert_eq!(outputs, [Null, Quad]);
    }

    #[test]
    fn test_validate() {
        let mut fsm = Fsm::new(FsmKind::Mealy);
        assert!(fsm.validate().is_ok());

        fsm.add_state("A", Null);
        assert_eq!(
            fsm.validate(),
            Err(FsmError::UnknownStart { start: "S0".into() })
        );

        fsm.start = "A".into();
        fsm.add_transition("A", "x", "B", None);
        assert_eq!(
            fsm.validate(),
            Err(FsmError::UnknownState {
                index: 0,
                state: "B".into()
            })
        );
    }

    #[test]
    fn test_bad_output_label_is_rejected() {
        let json = r#"{ "transitions": [ { "from": "S0", "in": "1", "to": "S0", "out": "HIGH" } ] }"#;
        assert!(Fsm::from_json(json).is_err());
    }
}
