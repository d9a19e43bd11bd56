use crate::app::err::*;
use std::str::FromStr;
use itertools::Itertools;
use serde::Deserialize;
use mab_matrix::dense::Mat;
use mab::{Ring, RingOps};

pub fn measure<F, Res>(proc: F) -> (Res, std::time::Duration)
where F: FnOnce() -> Res {
    let start = std::time::Instant::now();
    let res = proc();
    let time = start.elapsed();
    (res, time)
}

pub fn guard_panic<F, R>(f: F) -> Result<R, Box<dyn std::error::Error>>
where F: FnOnce() -> Result<R, Box<dyn std::error::Error>> + std::panic::UnwindSafe {
    std::panic::catch_unwind(|| {
        f()
    }).unwrap_or_else(|e| {
        let info = match e.downcast::<String>() {
            Ok(v) => *v,
            Err(e) => match e.downcast::<&str>() {
                Ok(v) => v.to_string(),
                _ => "Unknown Source of Error".to_owned()
            }
        };
        err!("panic: {info}")
    })
}

// JSON integers may be given as numbers or, beyond 64 bits, as strings.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum Entry {
    Num(i64),
    Str(String)
}

impl Entry {
    fn parse<I: FromStr>(&self) -> Result<I, Box<dyn std::error::Error>> {
        let s = match self {
            Entry::Num(a) => a.to_string(),
            Entry::Str(s) => s.trim().to_string()
        };
        I::from_str(&s).or_else(|_|
            err!("cannot parse '{}' as {}.", s, std::any::type_name::<I>())
        )
    }
}

pub fn parse_int<I: FromStr>(s: &str) -> Result<I, Box<dyn std::error::Error>> {
    Entry::Str(s.to_string()).parse()
}

/// Parses `[a, b, ...]`.
pub fn parse_vec<I: FromStr>(input: &str) -> Result<Vec<I>, Box<dyn std::error::Error>> {
    let Ok(entries) = serde_json::from_str::<Vec<Entry>>(input) else {
        return err!("invalid input vector: '{}'", input);
    };
    entries.iter().map(|e| e.parse()).collect()
}

/// Parses a row-major matrix `[[a, b], [c, d]]`.
/// A matrix with no columns is written as a list of empty rows.
pub fn parse_mat<R>(input: &str) -> Result<Mat<R>, Box<dyn std::error::Error>>
where R: Ring + FromStr, for<'x> &'x R: RingOps<R> {
    let Ok(rows) = serde_json::from_str::<Vec<Vec<Entry>>>(input) else {
        return err!("invalid input matrix: '{}'", input);
    };

    ensure!(!rows.is_empty(), "matrix must have at least one row: '{}'", input);

    let m = rows.len();
    let n = rows[0].len();
    ensure!(rows.iter().all(|r| r.len() == n), "rows of different lengths: '{}'", input);

    let data: Vec<R> = rows.iter().flatten().map(|e| e.parse()).try_collect()?;
    Ok(Mat::from_data((m, n), data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use mab_matrix::MatTrait;

    #[test]
    fn parse_matrix() {
        let a: Mat<i64> = parse_mat("[[1, -2], [3, \"4\"]]").unwrap();
        assert_eq!(a, Mat::from_data((2, 2), [1, -2, 3, 4]));

        let b: Mat<i64> = parse_mat("[[], []]").unwrap();
        assert_eq!(b.shape(), (2, 0));
    }

    #[test]
    fn parse_matrix_err() {
        assert!(parse_mat::<i64>("[]").is_err());
        assert!(parse_mat::<i64>("[[1, 2], [3]]").is_err());
        assert!(parse_mat::<i64>("[[1, \"x\"]]").is_err());
        assert!(parse_mat::<i64>("1, 2").is_err());
    }

    #[test]
    fn parse_big() {
        let v: Vec<BigInt> = parse_vec("[1, \"100000000000000000000000\"]").unwrap();
        assert_eq!(v[1], BigInt::from(10).pow(23));
        assert_eq!(parse_int::<BigInt>(" 7 ").unwrap(), BigInt::from(7));
    }
}
