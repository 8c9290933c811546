//! Duration-restoring synthesizers: fixed-hop, windowed overlap-add and WSOLA.

pub mod fixed;
pub mod ola;
pub mod params;
pub mod wsola;

pub use fixed::stretch_fixed;
pub use ola::stretch_windowed;
pub use params::{FrameLayout, SynthesisConfig};
pub use wsola::{stretch_aligned, AlignmentCandidate, Wsola};
