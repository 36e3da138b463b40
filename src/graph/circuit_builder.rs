use super::gate::*;
use crate::data_structures::Signal;
use crate::error::{ParseGateKindError, UnknownInputError, ValidationError};
use concat_idents::concat_idents;
#[cfg(feature = "debug_gates")]
use indexmap::IndexSet;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

use FixedKind::*;

/// Creates `name` and `name_with_delay` constructors for every fixed threshold gate kind.
macro_rules! gate_constructors {
    ($name:ident => $kind:ident, $($rest:ident => $rest_kind:ident),*) => {
        gate_constructors!($name => $kind);
        gate_constructors!($($rest => $rest_kind),*);
    };
    ($name:ident => $kind:ident) => {
        /// Adds a gate of the matching fixed kind with [DEFAULT_GATE_DELAY].
        ///
        /// See [Circuit::add_gate] for the validation rules.
        pub fn $name<N, I, R>(&mut self, name: N, inputs: I) -> Result<&mut Self, ValidationError>
        where
            N: Into<String>,
            I: IntoIterator<Item = R>,
            R: Into<String>,
        {
            self.add_gate(name, GateKind::Fixed($kind), inputs, DEFAULT_GATE_DELAY)
        }

        concat_idents!(with_delay = $name, _, with, _, delay {
            /// Adds a gate of the matching fixed kind with a custom simulated delay.
            pub fn with_delay<N, I, R>(
                &mut self,
                name: N,
                inputs: I,
                delay: f64,
            ) -> Result<&mut Self, ValidationError>
            where
                N: Into<String>,
                I: IntoIterator<Item = R>,
                R: Into<String>,
            {
                self.add_gate(name, GateKind::Fixed($kind), inputs, delay)
            }
        });
    };
}

/// A reference from a gate input or an output mapping to a node the circuit doesn't have.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnresolvedReference {
    /// Name of the gate or output holding the reference.
    pub referrer: String,
    /// The name that doesn't resolve.
    pub missing: String,
}

impl From<UnresolvedReference> for ValidationError {
    fn from(r: UnresolvedReference) -> Self {
        ValidationError::UnresolvedReference {
            referrer: r.referrer,
            missing: r.missing,
        }
    }
}

/// NCL netlist made of named dual-rail inputs, named threshold gates and named outputs.
///
/// Gates reference their inputs by name, and the references are only resolved when the
/// circuit is [simulated](crate::simulate): names that don't exist read as NULL.
/// This lets circuits be wired in any order and keeps half-built circuits simulatable,
/// [Circuit::unresolved_references] lists the dangling names.
///
/// Gates are evaluated in the order they were first added, not in dependency order.
///
/// # Examples
/// ```
/// # use nclsim::{Circuit, Signal, simulate};
/// let mut c = Circuit::new();
/// c.add_input("A").add_input("B");
/// c.set_input_value("A", Signal::Data1).unwrap();
/// c.set_input_value("B", Signal::Data0).unwrap();
///
/// c.th12("G1", ["A", "B"]).unwrap();
/// c.add_gate("G2", "TH22", ["A", "B"], 1.2).unwrap();
/// c.add_output("OUT", "G2");
///
/// let report = simulate(&c);
/// assert!(report.settled);
/// assert_eq!(report.output("OUT"), Some(Signal::Data1));
/// ```
///
/// Construction errors name the offending gate.
/// ```
/// # use nclsim::{Circuit, ValidationError};
/// let mut c = Circuit::new();
/// let err = c.add_gate("G1", "TH23", ["A", "B"], 1.0).unwrap_err();
/// assert_eq!(
///     err,
///     ValidationError::ArityMismatch { gate: "G1".into(), kind: "TH23".into(), expected: 3, found: 2 }
/// );
/// assert!(c.add_gate("G1", "XOR", ["A"], 1.0).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circuit {
    inputs: IndexMap<String, Signal>,
    gates: IndexMap<String, Gate>,
    outputs: IndexMap<String, String>,
    #[cfg(feature = "debug_gates")]
    probes: IndexSet<String>,
}

impl Circuit {
    /// Returns a new empty [Circuit].
    pub fn new() -> Circuit {
        Default::default()
    }

    /// Adds a NULL input called `name`.
    ///
    /// Adding an input that already exists resets it to NULL and keeps its position.
    pub fn add_input<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.inputs.insert(name.into(), Signal::Null);
        self
    }

    /// Sets the value of input `name`.
    pub fn set_input_value(
        &mut self,
        name: &str,
        value: Signal,
    ) -> Result<&mut Self, UnknownInputError> {
        match self.inputs.get_mut(name) {
            Some(v) => {
                *v = value;
                Ok(self)
            }
            None => Err(UnknownInputError { name: name.into() }),
        }
    }

    /// Adds a gate called `name` reading `inputs` in order.
    ///
    /// `kind` is either a [GateKind] or its textual encoding (`TH12`, `TH22`, `TH23`,
    /// `THm<m>`). Fixed kinds must be given exactly as many inputs as they take.
    /// `delay` must be finite and non-negative.
    ///
    /// Input names are stored as given, they don't need to exist yet.
    /// Adding a gate with the name of an existing one replaces it in place.
    pub fn add_gate<N, K, I, R>(
        &mut self,
        name: N,
        kind: K,
        inputs: I,
        delay: f64,
    ) -> Result<&mut Self, ValidationError>
    where
        N: Into<String>,
        K: TryInto<GateKind>,
        ParseGateKindError: From<K::Error>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let name = name.into();
        let kind = kind
            .try_into()
            .map_err(|e| ValidationError::MalformedGateKind {
                gate: name.clone(),
                kind: ParseGateKindError::from(e).kind,
            })?;
        let inputs: smallvec::SmallVec<[String; GATE_INPUTS_TINYVEC_SIZE]> =
            inputs.into_iter().map(Into::into).collect();

        if let Some(expected) = kind.arity() {
            if inputs.len() != expected {
                return Err(ValidationError::ArityMismatch {
                    gate: name,
                    kind: kind.to_string(),
                    expected,
                    found: inputs.len(),
                });
            }
        }
        if !delay.is_finite() || delay < 0. {
            return Err(ValidationError::InvalidDelay { gate: name, delay });
        }

        self.gates.insert(
            name.clone(),
            Gate {
                name,
                kind,
                inputs,
                delay,
            },
        );
        Ok(self)
    }

    /// Adds a generic `THm<m>` gate with [DEFAULT_GATE_DELAY].
    pub fn thm<N, I, R>(&mut self, m: usize, name: N, inputs: I) -> Result<&mut Self, ValidationError>
    where
        N: Into<String>,
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let name = name.into();
        if m == 0 {
            return Err(ValidationError::MalformedGateKind {
                gate: name,
                kind: "THm0".into(),
            });
        }
        self.add_gate(name, GateKind::Generic(m), inputs, DEFAULT_GATE_DELAY)
    }

    // Create th12, th22, th23 and their _with_delay variants.
    gate_constructors!(th12 => Th12, th22 => Th22, th23 => Th23);

    /// Exposes node `source` under the output name `name`.
    ///
    /// `source` is stored as given and doesn't need to exist yet.
    pub fn add_output<N: Into<String>, S: Into<String>>(&mut self, name: N, source: S) -> &mut Self {
        self.outputs.insert(name.into(), source.into());
        self
    }

    /// Marks node `name` so that every change of its signal during simulation is logged.
    #[cfg(feature = "debug_gates")]
    pub fn probe<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.probes.insert(name.into());
        self
    }

    /// Returns true if `name` has been [probed](Circuit::probe).
    #[cfg(feature = "debug_gates")]
    pub(crate) fn is_probed(&self, name: &str) -> bool {
        self.probes.contains(name)
    }

    pub fn inputs(&self) -> &IndexMap<String, Signal> {
        &self.inputs
    }

    pub fn gates(&self) -> &IndexMap<String, Gate> {
        &self.gates
    }

    pub fn outputs(&self) -> &IndexMap<String, String> {
        &self.outputs
    }

    pub fn input(&self, name: &str) -> Option<Signal> {
        self.inputs.get(name).copied()
    }

    pub fn gate(&self, name: &str) -> Option<&Gate> {
        self.gates.get(name)
    }

    /// Returns true if `name` is an input or a gate.
    pub fn contains_node(&self, name: &str) -> bool {
        self.inputs.contains_key(name) || self.gates.contains_key(name)
    }

    /// Returns the names of all inputs followed by the names of all gates.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .keys()
            .chain(self.gates.keys())
            .map(String::as_str)
    }

    /// Returns the number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Returns true if the circuit has no inputs, gates or outputs.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.gates.is_empty() && self.outputs.is_empty()
    }

    /// Returns every gate input and output source that names no input or gate,
    /// gates first in evaluation order, then outputs.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let gate_refs = self
            .gates
            .values()
            .flat_map(|g| g.inputs.iter().map(move |i| (g.name.as_str(), i.as_str())));
        let output_refs = self.outputs.iter().map(|(o, s)| (o.as_str(), s.as_str()));

        gate_refs
            .chain(output_refs)
            .filter(|(_, target)| !self.contains_node(target))
            .map(|(referrer, missing)| UnresolvedReference {
                referrer: referrer.into(),
                missing: missing.into(),
            })
            .collect()
    }

    /// Returns a label of `node` in format "KIND:NAME", "IN:NAME" or "OUT:NAME".
    fn full_name(&self, node: &str) -> String {
        if self.inputs.contains_key(node) {
            format!("IN:{}", node)
        } else if let Some(gate) = self.gates.get(node) {
            format!("{}:{}", gate.kind, node)
        } else {
            format!("?:{}", node)
        }
    }

    /// Dumps the circuit in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language)) format
    /// to `w`. Unresolved references show up as nodes labeled "?:NAME".
    pub fn dump_dot<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
        use petgraph::dot::{Config, Dot};
        let mut graph = petgraph::Graph::<String, ()>::new();
        let mut index = HashMap::new();
        for name in self.node_names() {
            index.insert(name.to_owned(), graph.add_node(self.full_name(name)));
        }

        let mut node = |graph: &mut petgraph::Graph<String, ()>, name: &str| {
            *index
                .entry(name.to_owned())
                .or_insert_with(|| graph.add_node(self.full_name(name)))
        };
        for gate in self.gates.values() {
            let target = node(&mut graph, &gate.name);
            for input in &gate.inputs {
                let source = node(&mut graph, input);
                graph.add_edge(source, target, ());
            }
        }
        for (output, source) in &self.outputs {
            let target = graph.add_node(format!("OUT:{}", output));
            let source = node(&mut graph, source);
            graph.add_edge(source, target, ());
        }
        write!(w, "{:?}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::*;

    #[test]
    fn test_add_input_resets_to_null() {
        let mut c = Circuit::new();
        c.add_input("A").add_input("B");
        c.set_input_value("A", Data1).unwrap();
        c.add_input("A");

        assert_eq!(c.input("A"), Some(Null));
        let names: Vec<_> = c.inputs().keys().collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_set_unknown_input() {
        let mut c = Circuit::new();
        assert_eq!(
            c.set_input_value("A", Data1).unwrap_err(),
            UnknownInputError { name: "A".into() }
        );
    }

    #[test]
    fn test_gate_constructors() {
        let mut c = Circuit::new();
        c.th12("a", ["x", "y"])
            .unwrap()
            .th22_with_delay("b", ["x", "y"], 2.5)
            .unwrap()
            .th23("c", ["x", "y", "z"])
            .unwrap()
            .thm(3, "d", ["x", "y", "z", "w"])
            .unwrap();

        let kinds: Vec<_> = c.gates().values().map(|g| g.kind().to_string()).collect();
        assert_eq!(kinds, ["TH12", "TH22", "TH23", "THm3"]);
        assert_eq!(c.gate("a").unwrap().delay(), DEFAULT_GATE_DELAY);
        assert_eq!(c.gate("b").unwrap().delay(), 2.5);
        assert_eq!(c.gate("d").unwrap().inputs(), ["x", "y", "z", "w"]);
    }

    #[test]
    fn test_constructors_map_to_their_kind() {
        let mut c = Circuit::new();
        c.th12_with_delay("a", ["x", "y"], 0.5).unwrap();
        c.th22("b", ["x", "y"]).unwrap();
        c.th23_with_delay("c", ["x", "y", "z"], 3.0).unwrap();

        let kinds: Vec<_> = c.gates().values().map(|g| g.kind()).collect();
        assert_eq!(
            kinds,
            [GateKind::Fixed(Th12), GateKind::Fixed(Th22), GateKind::Fixed(Th23)]
        );
        let thresholds: Vec<_> = kinds.iter().map(GateKind::threshold).collect();
        assert_eq!(thresholds, [1, 2, 2]);
        assert_eq!(c.gate("c").unwrap().delay(), 3.0);
    }

    #[test]
    fn test_add_gate_validation() {
        let mut c = Circuit::new();
        assert_eq!(
            c.add_gate("g", "THmx", ["a"], 1.0).unwrap_err(),
            ValidationError::MalformedGateKind {
                gate: "g".into(),
                kind: "THmx".into()
            }
        );
        assert!(matches!(
            c.th22("g", ["a"]).unwrap_err(),
            ValidationError::ArityMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
        assert!(matches!(
            c.add_gate("g", "TH12", ["a", "b"], -1.0).unwrap_err(),
            ValidationError::InvalidDelay { .. }
        ));
        assert!(c.thm(0, "g", ["a"]).is_err());
        assert!(c.gates().is_empty());

        // Generic gates take any number of inputs, none included.
        c.add_gate("g", GateKind::Generic(1), Vec::<String>::new(), 0.0)
            .unwrap();
    }

    #[test]
    fn test_replacing_gate_keeps_order() {
        let mut c = Circuit::new();
        c.th12("G1", ["A", "B"]).unwrap();
        c.th12("G2", ["A", "B"]).unwrap();
        c.add_gate("G1", Th22, ["A", "B"], 0.5).unwrap();

        let names: Vec<_> = c.gates().keys().collect();
        assert_eq!(names, ["G1", "G2"]);
        assert_eq!(c.gate("G1").unwrap().kind(), GateKind::Fixed(Th22));
    }

    #[test]
    fn test_unresolved_references() {
        let mut c = Circuit::new();
        c.add_input("A");
        c.th12("G1", ["A", "G2"]).unwrap();
        c.th12("G2", ["A", "nope"]).unwrap();
        c.add_output("OUT", "G1").add_output("BAD", "missing");

        assert_eq!(
            c.unresolved_references(),
            [
                UnresolvedReference {
                    referrer: "G2".into(),
                    missing: "nope".into()
                },
                UnresolvedReference {
                    referrer: "BAD".into(),
                    missing: "missing".into()
                },
            ]
        );
    }

    #[test]
    fn test_dump_dot() {
        let mut c = Circuit::new();
        c.add_input("A");
        c.th12("G1", ["A", "X"]).unwrap();
        c.add_output("OUT", "G1");

        let mut out = Vec::new();
        c.dump_dot(&mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();

        assert!(dot.starts_with("digraph"));
        for label in ["IN:A", "TH12:G1", "?:X", "OUT:OUT"] {
            assert!(dot.contains(label), "missing {} in {}", label, dot);
        }
        assert_eq!(dot.matches("->").count(), 3);
    }
}
