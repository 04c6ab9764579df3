//! Rule application in both directions

pub mod forward;
pub mod reverse;

pub use forward::{apply, apply_rule, ForwardEngine, TraceStep};
pub use reverse::{reverse, Reverser};
