//! Edge detection for mechanical buttons.
mod edge;

pub use edge::*;
