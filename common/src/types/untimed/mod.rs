pub mod xyz;

pub use crate::types::untimed::xyz::XYZ;
