use super::{Signal, State};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Copy of every node's [Signal] at one simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: f64,
    pub signals: IndexMap<String, Signal>,
}

impl Snapshot {
    /// Returns a new [Snapshot] of `state` taken at `time`.
    pub fn of(time: f64, state: &State) -> Snapshot {
        Snapshot {
            time,
            signals: state.signals().clone(),
        }
    }

    /// Returns the signal of `node`, nodes missing from the snapshot read as NULL.
    pub fn value(&self, node: &str) -> Signal {
        self.signals.get(node).copied().unwrap_or_default()
    }
}

/// Ordered list of [Snapshots](Snapshot), one per simulation step, in increasing time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    snapshots: Vec<Snapshot>,
}

impl Timeline {
    /// Returns a new empty [Timeline].
    pub fn new() -> Timeline {
        Default::default()
    }

    /// Appends `snapshot`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `snapshot` is not later than the last one.
    pub fn push(&mut self, snapshot: Snapshot) {
        debug_assert!(
            self.last().map_or(true, |last| last.time < snapshot.time),
            "Timeline snapshots must be in increasing time order"
        );
        self.snapshots.push(snapshot)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn get(&self, step: usize) -> Option<&Snapshot> {
        self.snapshots.get(step)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    /// Returns the time of every snapshot.
    pub fn times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.time).collect()
    }

    /// Returns the names of the nodes whose value differs between `step - 1` and `step`,
    /// nodes appearing for the first time included.
    ///
    /// Returns an empty list for step 0 or steps out of range.
    pub fn changes_at(&self, step: usize) -> Vec<&str> {
        let (prev, cur) = match (step.checked_sub(1), self.get(step)) {
            (Some(prev), Some(cur)) => (&self.snapshots[prev], cur),
            _ => return vec![],
        };
        cur.signals
            .iter()
            .filter(|(name, sig)| prev.signals.get(name.as_str()) != Some(*sig))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Returns the signal history of `node`, one value per snapshot.
    pub fn history(&self, node: &str) -> Vec<Signal> {
        self.snapshots.iter().map(|s| s.value(node)).collect()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
