mod completion;
mod demo;
mod fsm;
mod pipeline;
pub use completion::*;
pub use demo::*;
pub use fsm::*;
pub use pipeline::*;
