mod int_ext;
mod primes;

pub use int_ext::*;
pub use primes::*;
