use crate::data_structures::{Signal, State};
use crate::error::ParseGateKindError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use strum_macros::{EnumIter, EnumString};

/// Returns [Signal::Data1] if at least `m` of `inputs` are DATA, [Signal::Null] otherwise.
///
/// This is the only evaluation rule in the simulator, every gate kind is a `thmn`
/// with a fixed or user supplied threshold. It is memoryless: the result only
/// depends on `inputs`, there is no hysteresis holding a DATA output until the
/// inputs return to NULL.
///
/// # Example
/// ```
/// # use nclsim::{thmn, Signal::*};
/// assert_eq!(thmn(&[Data1, Data0, Null], 2), Data1);
/// assert_eq!(thmn(&[Data1, Null, Null], 2), Null);
/// assert_eq!(thmn(&[], 1), Null);
/// ```
pub fn thmn(inputs: &[Signal], m: usize) -> Signal {
    let count = inputs.iter().filter(|s| s.is_data()).count();
    if count >= m {
        Signal::Data1
    } else {
        Signal::Null
    }
}

/// 2-input gate asserting DATA once both inputs are DATA.
pub fn th22(a: Signal, b: Signal) -> Signal {
    thmn(&[a, b], 2)
}

/// 2-input gate asserting DATA once any input is DATA.
pub fn th12(a: Signal, b: Signal) -> Signal {
    thmn(&[a, b], 1)
}

/// 3-input gate asserting DATA once 2 inputs are DATA.
pub fn th23(a: Signal, b: Signal, c: Signal) -> Signal {
    thmn(&[a, b, c], 2)
}

/// Threshold gates with a fixed threshold and input count.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter, EnumString)]
pub enum FixedKind {
    #[strum(serialize = "TH12")]
    Th12,
    #[strum(serialize = "TH22")]
    Th22,
    #[strum(serialize = "TH23")]
    Th23,
}
use FixedKind::*;

impl FixedKind {
    /// Returns m, the number of DATA inputs needed to fire.
    pub const fn threshold(self) -> usize {
        match self {
            Th12 => 1,
            Th22 | Th23 => 2,
        }
    }

    /// Returns n, the number of inputs.
    pub const fn arity(self) -> usize {
        match self {
            Th12 | Th22 => 2,
            Th23 => 3,
        }
    }
}

impl Display for FixedKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "TH{}{}", self.threshold(), self.arity())
    }
}

/// Kind of a threshold gate, parsed once when the gate is added to a circuit.
///
/// The textual encodings are `TH12`, `TH22`, `TH23` and `THm<m>` where `<m>` is a
/// positive threshold and the input count is whatever the caller wires up.
///
/// # Example
/// ```
/// # use nclsim::{GateKind, FixedKind};
/// assert_eq!("TH23".parse::<GateKind>().unwrap(), GateKind::Fixed(FixedKind::Th23));
/// assert_eq!("THm3".parse::<GateKind>().unwrap(), GateKind::Generic(3));
/// assert!("THm0".parse::<GateKind>().is_err());
/// assert!("TH33".parse::<GateKind>().is_err());
///
/// assert_eq!(GateKind::Generic(4).to_string(), "THm4");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GateKind {
    Fixed(FixedKind),
    Generic(usize),
}

impl GateKind {
    /// Returns m, the number of DATA inputs needed to fire.
    pub fn threshold(&self) -> usize {
        match self {
            GateKind::Fixed(kind) => kind.threshold(),
            GateKind::Generic(m) => *m,
        }
    }

    /// Returns the required number of inputs, None if any number is accepted.
    pub fn arity(&self) -> Option<usize> {
        match self {
            GateKind::Fixed(kind) => Some(kind.arity()),
            GateKind::Generic(_) => None,
        }
    }

    /// Calculates the output of a gate of this kind from the state of its inputs.
    #[inline(always)]
    pub fn evaluate(&self, inputs: &[Signal]) -> Signal {
        thmn(inputs, self.threshold())
    }
}

impl Display for GateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::Fixed(kind) => write!(f, "{}", kind),
            GateKind::Generic(m) => write!(f, "THm{}", m),
        }
    }
}

impl FromStr for GateKind {
    type Err = ParseGateKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGateKindError { kind: s.to_owned() };
        if let Some(m) = s.strip_prefix("THm") {
            if m.is_empty() || !m.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            return match m.parse::<usize>() {
                Ok(m) if m >= 1 => Ok(GateKind::Generic(m)),
                _ => Err(err()),
            };
        }
        FixedKind::from_str(s)
            .map(GateKind::Fixed)
            .map_err(|_| err())
    }
}

impl TryFrom<&str> for GateKind {
    type Error = ParseGateKindError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for GateKind {
    type Error = ParseGateKindError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GateKind> for String {
    fn from(kind: GateKind) -> Self {
        kind.to_string()
    }
}

impl From<FixedKind> for GateKind {
    fn from(kind: FixedKind) -> Self {
        GateKind::Fixed(kind)
    }
}

/// Amount of input references kept in the stack for a gate.
/// Gates with more than GATE_INPUTS_TINYVEC_SIZE inputs spill into the heap.
pub(crate) const GATE_INPUTS_TINYVEC_SIZE: usize = 3;

/// Delay given to gates created by the shorthand constructors.
pub const DEFAULT_GATE_DELAY: f64 = 1.0;

/// A named threshold gate.
///
/// Inputs are names of circuit inputs or other gates, resolved only when the gate is
/// evaluated so that circuits can be wired in any order.
/// The delay is informational, it never affects the order gates are evaluated in.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub(super) name: String,
    pub(super) kind: GateKind,
    pub(super) inputs: SmallVec<[String; GATE_INPUTS_TINYVEC_SIZE]>,
    pub(super) delay: f64,
}

impl Gate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Returns the input references in wiring order.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    /// Calculates the output of the gate against `state`, inputs missing from `state`
    /// read as NULL.
    pub fn evaluate(&self, state: &State) -> Signal {
        let signals: SmallVec<[Signal; GATE_INPUTS_TINYVEC_SIZE]> =
            self.inputs.iter().map(|input| state.resolve(input)).collect();
        self.kind.evaluate(&signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::Signal::*;
    use smallvec::smallvec;
    use strum::IntoEnumIterator;

    #[test]
    fn test_thmn_vacuous() {
        for m in 1..5 {
            assert_eq!(thmn(&[], m), Null);
        }
        // A threshold of 0 is always met.
        assert_eq!(thmn(&[], 0), Data1);
    }

    #[test]
    fn test_thmn_counts_data() {
        let all = [Null, Data0, Data1, Quad];
        for m in 0..=5 {
            let expected = if 3 >= m { Data1 } else { Null };
            assert_eq!(thmn(&all, m), expected, "m = {}", m);
        }
    }

    #[test]
    fn test_thmn_monotonic() {
        let inputs = [Data1, Null, Quad, Null, Data0];
        for m in 1..6 {
            // Raising the threshold never turns a NULL output into DATA.
            if thmn(&inputs, m + 1).is_data() {
                assert!(thmn(&inputs, m).is_data());
            }
            // Turning a NULL input into DATA never turns a DATA output into NULL.
            let mut more = inputs;
            more[1] = Data0;
            if thmn(&inputs, m).is_data() {
                assert!(thmn(&more, m).is_data());
            }
        }
    }

    #[test]
    fn test_named_gates() {
        for a in Signal::iter() {
            for b in Signal::iter() {
                let both = a.is_data() && b.is_data();
                let any = a.is_data() || b.is_data();
                assert_eq!(th22(a, b).is_data(), both);
                assert_eq!(th12(a, b).is_data(), any);
                assert_eq!(th23(a, b, Null).is_data(), both);
                assert_eq!(th23(a, Null, b), th22(a, b));
            }
        }
    }

    #[test]
    fn test_kind_parse() {
        for kind in FixedKind::iter() {
            let text = kind.to_string();
            assert_eq!(text.parse::<GateKind>().unwrap(), GateKind::Fixed(kind));
        }
        assert_eq!("THm12".parse::<GateKind>().unwrap(), GateKind::Generic(12));
        for bad in ["", "TH", "THm", "THm-1", "THm+2", "th22", "TH22 ", "THmx", "TH24"] {
            assert_eq!(
                bad.parse::<GateKind>(),
                Err(ParseGateKindError { kind: bad.into() })
            );
        }
    }

    #[test]
    fn test_kind_serde() {
        let kinds: Vec<GateKind> = serde_json::from_str(r#"["TH12","THm3"]"#).unwrap();
        assert_eq!(kinds, [GateKind::Fixed(Th12), GateKind::Generic(3)]);
        assert!(serde_json::from_str::<GateKind>(r#""XOR""#).is_err());
    }

    #[test]
    fn test_gate_evaluate_unresolved_is_null() {
        let g = Gate {
            name: "G".into(),
            kind: GateKind::Fixed(Th12),
            inputs: smallvec!["missing".to_string(), "A".to_string()],
            delay: 1.0,
        };
        let mut state = State::new();
        assert_eq!(g.evaluate(&state), Null);
        state.set("A", Data0);
        assert_eq!(g.evaluate(&state), Data1);
    }
}
