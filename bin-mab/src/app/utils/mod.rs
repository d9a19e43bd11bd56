mod helper;

pub use helper::*;

cfg_if::cfg_if! {
    if #[cfg(feature = "i64")] {
        pub type Int = i64;
    } else {
        pub type Int = num_bigint::BigInt;
    }
}
