mod mat;
mod snf;
pub mod lattice;
pub mod sym;

pub use mat::*;
pub use snf::*;
