//! Core utilities shared by every subsystem: clock, rng, errors, page cursor state.

pub mod cursor;
pub mod error;
pub mod random;
pub mod scheduler;
