use crate::data_structures::Signal;
use crate::error::NclResult;
use crate::graph::*;

/// Returns a small ready-made circuit to experiment with.
///
/// Inputs `A = DATA1` and `B = DATA0` feed `G1 = TH12(A, B)` and `G2 = TH22(A, B)`,
/// `G2` is exposed as output `OUT`.
///
/// # Example
/// ```
/// # use nclsim::{dual_rail_demo, simulate, Signal};
/// let report = simulate(&dual_rail_demo()?);
/// assert_eq!(report.output("OUT"), Some(Signal::Data1));
/// # Ok::<(), nclsim::NclError>(())
/// ```
pub fn dual_rail_demo() -> NclResult<Circuit> {
    let mut c = Circuit::new();
    c.add_input("A").add_input("B");
    c.set_input_value("A", Signal::Data1)?
        .set_input_value("B", Signal::Data0)?;
    c.th12_with_delay("G1", ["A", "B"], 1.0)?
        .th22_with_delay("G2", ["A", "B"], 1.2)?
        .add_output("OUT", "G2");
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_settles;

    #[test]
    fn test_demo() {
        let c = dual_rail_demo().unwrap();
        assert_eq!(c.node_names().collect::<Vec<_>>(), ["A", "B", "G1", "G2"]);
        assert_eq!(c.gate("G2").unwrap().delay(), 1.2);
        assert_eq!(c.outputs()["OUT"], "G2");

        let report = simulate(&c);
        assert_settles!(report, 2);
        assert_eq!(report.value("G1"), Signal::Data1);
        assert_eq!(report.output("OUT"), Some(Signal::Data1));

        // Every step after the first pass is stable.
        assert!(report.timeline.changes_at(1).contains(&"G2"));
        assert!((2..report.timeline.len()).all(|s| report.timeline.changes_at(s).is_empty()));
    }
}
