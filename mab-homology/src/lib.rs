mod error;
mod marked;
mod hom;
mod grid;
mod form;
mod linking;

pub use error::*;
pub use marked::*;
pub use hom::*;
pub use grid::*;
pub use form::*;
pub use linking::*;
