//! # Rendering Module
//!
//! Read-only consumers of a [`Snapshot`](crate::Snapshot). Only a plain text
//! dump lives here; pixel front ends read the same snapshot on their own.

pub mod ascii;

pub use ascii::*;
