//! # Utilities Module
//!
//! Small geometry helpers shared by visibility, ranged attacks and monster AI.

pub mod line;
pub mod math;

pub use line::*;
pub use math::*;
