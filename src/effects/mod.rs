//! Post-processing effects applied after synthesis.

pub mod echo;

pub use echo::{echo, EchoParams};
