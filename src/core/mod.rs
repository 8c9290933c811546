//! Core types, window functions, and resampling utilities.

pub mod resample;
pub mod types;
pub mod window;

pub use types::*;
pub use window::{apply_window, hann_edges, Window};
