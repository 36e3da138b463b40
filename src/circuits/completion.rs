use crate::error::ValidationError;
use crate::graph::*;

fn mkname(name: &str, level: usize, i: usize) -> String {
    format!("COMPLETION:{}:L{}_{}", name, level, i)
}

/// Adds a completion detector over `refs` to `c` and returns the name of its root.
///
/// The detector is a tree of TH22 gates pairing references left to right, a leftover
/// odd reference moves up a level untouched. The root is DATA only once every
/// reference is DATA, and goes back to NULL as soon as any of them is NULL.
///
/// A single reference is its own completion signal, no gate is added.
///
/// # Example
/// ```
/// # use nclsim::{Circuit, Signal, completion_detector, simulate};
/// let mut c = Circuit::new();
/// for name in ["X", "Y", "Z"] {
///     c.add_input(name);
///     c.set_input_value(name, Signal::Data0).unwrap();
/// }
/// let done = completion_detector(&mut c, &["X", "Y", "Z"], "xyz").unwrap();
/// c.add_output("DONE", done);
///
/// assert_eq!(simulate(&c).output("DONE"), Some(Signal::Data1));
/// ```
pub fn completion_detector<S: AsRef<str>>(
    c: &mut Circuit,
    refs: &[S],
    name: &str,
) -> Result<String, ValidationError> {
    let mut level: Vec<String> = refs.iter().map(|r| r.as_ref().to_owned()).collect();
    if level.is_empty() {
        return Err(ValidationError::NoInputs {
            gate: mkname(name, 0, 0),
        });
    }

    let mut depth = 0;
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for (i, pair) in level.chunks(2).enumerate() {
            match pair {
                [a, b] => {
                    let gate = mkname(name, depth, i);
                    c.th22(gate.as_str(), [a.as_str(), b.as_str()])?;
                    next.push(gate);
                }
                [a] => next.push(a.clone()),
                _ => unreachable!("chunks(2) yields 1 or 2 items"),
            }
        }
        level = next;
        depth += 1;
    }
    Ok(level.swap_remove(0))
}
