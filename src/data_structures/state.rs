use super::Signal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Transient mapping from node name to its current [Signal] during one simulation run.
///
/// Names are kept in the order they were first written: inputs first, then gates in
/// the order they first produced an output.
///
/// A node that was never written is *absent*, which is different from holding
/// [Signal::Null]: [State::update] reports the first write of a node as a change even
/// when the value written is NULL.
///
/// # Example
/// ```
/// # use nclsim::data_structures::State;
/// # use nclsim::Signal;
/// let mut s = State::new();
///
/// assert_eq!(s.get("G1"), None);
/// assert_eq!(s.resolve("G1"), Signal::Null);
///
/// assert!(s.update("G1", Signal::Null));
/// assert!(!s.update("G1", Signal::Null));
/// assert!(s.update("G1", Signal::Data1));
/// assert_eq!(s.get("G1"), Some(Signal::Data1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    signals: IndexMap<String, Signal>,
}

impl State {
    /// Returns a new empty [State].
    pub fn new() -> State {
        Default::default()
    }

    /// Returns a new [State] holding a copy of `inputs`.
    pub fn from_inputs<'a, I: IntoIterator<Item = (&'a String, &'a Signal)>>(inputs: I) -> State {
        State {
            signals: inputs
                .into_iter()
                .map(|(name, sig)| (name.clone(), *sig))
                .collect(),
        }
    }

    /// Returns the signal stored under `name`, None if it was never written.
    pub fn get(&self, name: &str) -> Option<Signal> {
        self.signals.get(name).copied()
    }

    /// Returns the signal stored under `name`, unknown names read as NULL.
    #[inline(always)]
    pub fn resolve(&self, name: &str) -> Signal {
        self.get(name).unwrap_or_default()
    }

    /// Stores `value` under `name`.
    pub fn set<S: Into<String>>(&mut self, name: S, value: Signal) {
        self.signals.insert(name.into(), value);
    }

    /// Stores `value` under `name` and returns true if that changed the state.
    pub fn update(&mut self, name: &str, value: Signal) -> bool {
        match self.signals.get_mut(name) {
            Some(old) if *old == value => false,
            Some(old) => {
                *old = value;
                true
            }
            None => {
                self.signals.insert(name.to_owned(), value);
                true
            }
        }
    }

    /// Returns true if `name` has been written.
    pub fn contains(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    /// Returns the number of nodes written so far.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Returns true if no node has been written.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Iterates `(name, signal)` pairs in first-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Signal)> {
        self.signals.iter().map(|(name, sig)| (name.as_str(), *sig))
    }

    /// Returns the underlying ordered map.
    pub fn signals(&self) -> &IndexMap<String, Signal> {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Signal::*;

    #[test]
    fn test_from_inputs_keeps_order() {
        let mut inputs = IndexMap::new();
        inputs.insert("B".to_string(), Data0);
        inputs.insert("A".to_string(), Data1);

        let s = State::from_inputs(&inputs);
        let names: Vec<_> = s.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["B", "A"]);
        assert_eq!(s.resolve("A"), Data1);
    }

    #[test]
    fn test_update_existing_keeps_position() {
        let mut s = State::new();
        s.set("A", Null);
        s.set("B", Null);
        assert!(s.update("A", Quad));

        let order: Vec<_> = s.iter().collect();
        assert_eq!(order, [("A", Quad), ("B", Null)]);
    }
}
