mod abst;
mod misc;
mod types;

pub use abst::*;
pub use misc::*;
pub use types::*;

pub mod util;
