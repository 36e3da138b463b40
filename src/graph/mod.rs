mod circuit_builder;
mod gate;
mod simulation;
pub use circuit_builder::*;
pub use gate::*;
pub use simulation::*;
