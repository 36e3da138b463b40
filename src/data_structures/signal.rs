use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use strum_macros::{EnumIter, EnumString};

/// Value carried by a dual-rail wire.
///
/// The discriminant is the rail pair packed as `rail_hi << 1 | rail_lo`, so every
/// [Signal] is exactly one of the four legal pairs:
///
/// | rails | signal |
/// |-------|--------|
/// | (0,0) | [Signal::Null] |
/// | (1,0) | [Signal::Data1] |
/// | (0,1) | [Signal::Data0] |
/// | (1,1) | [Signal::Quad] |
///
/// [Signal::Quad] is not a legal dual-rail code in strict NCL, it is accepted as a
/// fourth symbol for quad-rail visualization and counts as DATA.
///
/// # Example
/// ```
/// # use nclsim::Signal;
/// let s: Signal = "DATA1".parse().unwrap();
/// assert_eq!(s.rails(), (1, 0));
/// assert_eq!(format!("{}", s), "DATA1");
/// assert_eq!(format!("{:#}", s), "DATA1(10)");
/// assert_eq!(u8::from(s), 0b10);
/// ```
#[repr(u8)]
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    IntoPrimitive,
    TryFromPrimitive,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Signal {
    #[strum(serialize = "NULL", serialize = "NULL(00)", serialize = "00")]
    Null = 0b00,
    #[strum(serialize = "DATA0", serialize = "DATA0(01)", serialize = "01")]
    Data0 = 0b01,
    #[strum(serialize = "DATA1", serialize = "DATA1(10)", serialize = "10")]
    Data1 = 0b10,
    #[strum(
        serialize = "QUAD",
        serialize = "QUAD(11)",
        serialize = "11",
        serialize = "11(quads)"
    )]
    Quad = 0b11,
}
use Signal::*;

impl Signal {
    /// Returns the [Signal] encoded by the rail pair `(hi, lo)`.
    pub const fn from_rails(hi: bool, lo: bool) -> Signal {
        match (hi, lo) {
            (false, false) => Null,
            (true, false) => Data1,
            (false, true) => Data0,
            (true, true) => Quad,
        }
    }

    /// Returns the [Signal] for a raw rail pair, None if either rail isn't 0 or 1.
    pub fn try_from_rails(hi: u8, lo: u8) -> Option<Signal> {
        match (hi, lo) {
            (0, 0) => Some(Null),
            (1, 0) => Some(Data1),
            (0, 1) => Some(Data0),
            (1, 1) => Some(Quad),
            _ => None,
        }
    }

    /// Returns the rail pair `(rail_hi, rail_lo)`.
    pub fn rails(self) -> (u8, u8) {
        let code = u8::from(self);
        (code >> 1, code & 1)
    }

    /// Returns true if both rails are low.
    #[inline(always)]
    pub fn is_null(self) -> bool {
        self == Null
    }

    /// Returns true if any rail is high, [Quad] included.
    #[inline(always)]
    pub fn is_data(self) -> bool {
        self != Null
    }

    /// Returns the canonical label: `NULL`, `DATA1`, `DATA0` or `QUAD`.
    pub fn label(self) -> &'static str {
        match self {
            Null => "NULL",
            Data1 => "DATA1",
            Data0 => "DATA0",
            Quad => "QUAD",
        }
    }
}

/// Returns true if `sig` is NULL.
pub fn is_null(sig: Signal) -> bool {
    sig.is_null()
}

/// Returns true if `sig` is not NULL.
pub fn is_data(sig: Signal) -> bool {
    sig.is_data()
}

/// Returns the human readable label of `sig`.
pub fn signal_repr(sig: Signal) -> &'static str {
    sig.label()
}

/// Returns the label of a raw rail pair.
///
/// Pairs that aren't a [Signal] render as the tuple itself, e.g. `(2, 0)`.
pub fn rails_repr(hi: u8, lo: u8) -> String {
    match Signal::try_from_rails(hi, lo) {
        Some(sig) => sig.label().to_owned(),
        None => format!("({}, {})", hi, lo),
    }
}

impl Default for Signal {
    fn default() -> Self {
        Null
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            let (hi, lo) = self.rails();
            write!(f, "{}({}{})", self.label(), hi, lo)
        } else {
            f.write_str(self.label())
        }
    }
}

impl From<Signal> for &'static str {
    fn from(sig: Signal) -> Self {
        sig.label()
    }
}

impl TryFrom<String> for Signal {
    type Error = strum::ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Signal::from_str(s.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_predicates() {
        for sig in Signal::iter() {
            assert_eq!(is_null(sig), sig.rails() == (0, 0));
            assert_eq!(is_data(sig), !is_null(sig));
        }
        assert!(is_data(Quad));
    }

    #[test]
    fn test_labels() {
        let labels: Vec<_> = Signal::iter().map(signal_repr).collect();
        assert_eq!(labels, ["NULL", "DATA0", "DATA1", "QUAD"]);

        assert_eq!(rails_repr(1, 1), "QUAD");
        assert_eq!(rails_repr(2, 0), "(2, 0)");
    }

    #[test]
    fn test_rails() {
        for sig in Signal::iter() {
            let (hi, lo) = sig.rails();
            assert_eq!(Signal::from_rails(hi == 1, lo == 1), sig);
            assert_eq!(Signal::try_from_rails(hi, lo), Some(sig));
            assert_eq!(Signal::try_from(u8::from(sig)).unwrap(), sig);
        }
        assert!(Signal::try_from(4u8).is_err());
    }

    #[test]
    fn test_parse_alternative_spellings() {
        assert_eq!("NULL(00)".parse::<Signal>().unwrap(), Null);
        assert_eq!("10".parse::<Signal>().unwrap(), Data1);
        assert_eq!("DATA0(01)".parse::<Signal>().unwrap(), Data0);
        assert_eq!("11(quads)".parse::<Signal>().unwrap(), Quad);
        assert!("DATA2".parse::<Signal>().is_err());
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&vec![Null, Data1, Quad]).unwrap();
        assert_eq!(json, r#"["NULL","DATA1","QUAD"]"#);

        let back: Vec<Signal> = serde_json::from_str(r#"["NULL"," 01 ","DATA1(10)"]"#).unwrap();
        assert_eq!(back, vec![Null, Data0, Data1]);
    }
}
