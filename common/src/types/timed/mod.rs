pub mod sample;

pub use crate::types::timed::sample::Sample;
