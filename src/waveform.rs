//! Step-function traces of a simulation [Timeline] for plotting.
//!
//! Signals are mapped to four discrete levels so a plot can be drawn without knowing
//! anything about threshold gates: NULL = 0, DATA0 = 0.5, DATA1 = 1.0, QUAD = 1.5.

use crate::data_structures::{Signal, Timeline};
use crate::graph::Circuit;
use indexmap::IndexMap;
use serde::Serialize;

/// Returns the plot level of `sig`.
pub fn level(sig: Signal) -> f64 {
    match sig {
        Signal::Null => 0.0,
        Signal::Data0 => 0.5,
        Signal::Data1 => 1.0,
        Signal::Quad => 1.5,
    }
}

/// Plot levels and their labels, lowest first.
pub const LEVELS: [(f64, &str); 4] = [(0.0, "NULL"), (0.5, "DATA0"), (1.0, "DATA1"), (1.5, "QUAD")];

/// Values of one node over time, to be drawn as a step function held until the next point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub node: String,
    /// `(time, level)` points, one per snapshot.
    pub points: Vec<(f64, f64)>,
}

/// Returns the node labels to plot mapped to the node they read:
/// every input, every gate, then every output not shadowing one of those.
fn plotted_nodes(circuit: &Circuit) -> IndexMap<&str, &str> {
    let mut nodes: IndexMap<&str, &str> = circuit.node_names().map(|n| (n, n)).collect();
    for (output, source) in circuit.outputs() {
        nodes.entry(output.as_str()).or_insert(source.as_str());
    }
    nodes
}

/// Returns one [Trace] per input, gate and output of `circuit` over `timeline`.
///
/// Outputs are read through the node they expose, nodes not yet written read as NULL.
pub fn traces(circuit: &Circuit, timeline: &Timeline) -> Vec<Trace> {
    plotted_nodes(circuit)
        .into_iter()
        .map(|(label, source)| Trace {
            node: label.to_owned(),
            points: timeline
                .iter()
                .map(|snapshot| (snapshot.time, level(snapshot.value(source))))
                .collect(),
        })
        .collect()
}

/// Renders `timeline` as a text table with a row per snapshot and a column per node.
///
/// # Example
/// ```
/// # use nclsim::{dual_rail_demo, simulate, waveform::render_table};
/// let c = dual_rail_demo().unwrap();
/// let table = render_table(&c, &simulate(&c).timeline);
/// let lines: Vec<_> = table.lines().collect();
/// assert_eq!(lines[0].split_whitespace().collect::<Vec<_>>(), ["time", "A", "B", "G1", "G2", "OUT"]);
/// assert_eq!(lines[2].split_whitespace().collect::<Vec<_>>(), ["0.5", "DATA1", "DATA0", "DATA1", "DATA1", "DATA1"]);
/// ```
pub fn render_table(circuit: &Circuit, timeline: &Timeline) -> String {
    let nodes = plotted_nodes(circuit);
    let width = nodes
        .keys()
        .map(|n| n.len())
        .chain(std::iter::once(5))
        .max()
        .unwrap_or(5);

    let mut out = format!("{:>8}", "time");
    for node in nodes.keys() {
        out.push_str(&format!(" {:>w$}", node, w = width));
    }
    out.push('\n');
    for snapshot in timeline {
        out.push_str(&format!("{:>8}", snapshot.time));
        for source in nodes.values() {
            out.push_str(&format!(" {:>w$}", snapshot.value(source).label(), w = width));
        }
        out.push('\n');
    }
    out
}
