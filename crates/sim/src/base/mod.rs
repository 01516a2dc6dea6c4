//! Base value types shared by the model and simulation layers.
//!
//! This module provides the character alphabets and the alignment type that
//! the simulator produces.

mod alignment;
mod alphabet;

pub use alignment::{AlignedSequence, Alignment, State};
pub use alphabet::Alphabet;
