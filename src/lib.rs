//! Design and wavefront simulation of NULL Convention Logic circuits.
//!
//! NCL circuits carry dual-rail [Signals](Signal) that alternate between NULL and DATA
//! wavefronts instead of following a clock. A [Circuit] is a netlist of named inputs,
//! threshold gates and outputs; [simulate] and [Simulator] evaluate it pass after pass
//! until no gate changes, recording a [Timeline] of every step.
pub mod circuits;
pub mod config;
pub mod data_structures;
pub mod error;
pub mod graph;
pub mod waveform;
pub use circuits::*;
pub use config::SimConfig;
pub use data_structures::{Signal, Snapshot, State, Timeline};
pub use error::*;
pub use graph::*;
