mod base;
pub mod dense;

pub use base::*;
