use mab::{Integer, IntOps, Ratio};
use num_traits::Zero;
use crate::MatTrait;
use super::Mat;

pub fn is_symmetric<R>(a: &Mat<R>) -> bool
where R: PartialEq {
    let n = a.nrows();
    a.is_square() && (0..n).all(|i| (0..i).all(|j| a[(i, j)] == a[(j, i)]))
}

/// Signature (positive minus negative eigenvalue count) of a symmetric
/// integer matrix, computed by congruence diagonalization over `Q`.
/// Returns `None` if `a` is not symmetric.
pub fn signature<I>(a: &Mat<I>) -> Option<isize>
where I: Integer, for<'x> &'x I: IntOps<I> {
    if !is_symmetric(a) {
        return None
    }

    let n = a.nrows();
    let mut b: Mat<Ratio<I>> = Mat::from_fn((n, n), |i, j| Ratio::from_numer(a[(i, j)].clone()));

    for k in 0..n {
        if !prepare_pivot(&mut b, k) {
            continue
        }

        for i in k + 1 .. n {
            if b[(i, k)].is_zero() { continue }

            let f = &b[(i, k)] / &b[(k, k)];
            sym_add(&mut b, k, i, &-f);
        }
    }

    let sig = (0..n).map(|i| {
        let d = &b[(i, i)];
        if d.is_positive() { 1 } else if d.is_negative() { -1 } else { 0 }
    }).sum();

    Some(sig)
}

// Makes b[k, k] nonzero by a congruence, if row k has any nonzero entry
// at or beyond k.
fn prepare_pivot<I>(b: &mut Mat<Ratio<I>>, k: usize) -> bool
where I: Integer, for<'x> &'x I: IntOps<I> {
    let n = b.nrows();

    if !b[(k, k)].is_zero() {
        return true
    }

    if let Some(j) = (k + 1 .. n).find(|&j| !b[(j, j)].is_zero()) {
        b.swap_rows(k, j);
        b.swap_cols(k, j);
        return true
    }

    if let Some(j) = (k + 1 .. n).find(|&j| !b[(k, j)].is_zero()) {
        // b[k, k] becomes 2 b[k, j].
        sym_add(b, j, k, &Ratio::from(1));
        return true
    }

    false
}

// row_j += r row_i, col_j += r col_i.
fn sym_add<I>(b: &mut Mat<Ratio<I>>, i: usize, j: usize, r: &Ratio<I>)
where I: Integer, for<'x> &'x I: IntOps<I> {
    b.add_row_to(i, j, r);
    b.add_col_to(i, j, r);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric() {
        assert!(is_symmetric(&Mat::from_data((2, 2), [1, 2, 2, 3])));
        assert!(!is_symmetric(&Mat::from_data((2, 2), [1, 2, 0, 3])));
        assert!(!is_symmetric(&Mat::from_data((1, 2), [1, 2])));
    }

    #[test]
    fn signature_diag() {
        let a = Mat::diag((3, 3), [2i64, -5, 0]);
        assert_eq!(signature(&a), Some(0));

        let a = Mat::diag((3, 3), [2i64, 5, -1]);
        assert_eq!(signature(&a), Some(1));
    }

    #[test]
    fn signature_hyperbolic() {
        let a = Mat::from_data((2, 2), [0i64, 1, 1, 0]);
        assert_eq!(signature(&a), Some(0));
    }

    #[test]
    fn signature_e8() {
        let a: Mat<i64> = Mat::from_data((8, 8), [
             2, -1,  0,  0,  0,  0,  0,  0,
            -1,  2, -1,  0,  0,  0,  0,  0,
             0, -1,  2, -1,  0,  0,  0, -1,
             0,  0, -1,  2, -1,  0,  0,  0,
             0,  0,  0, -1,  2, -1,  0,  0,
             0,  0,  0,  0, -1,  2, -1,  0,
             0,  0,  0,  0,  0, -1,  2,  0,
             0,  0, -1,  0,  0,  0,  0,  2,
        ]);
        assert_eq!(signature(&a), Some(8));
        assert_eq!(signature(&-a), Some(-8));
    }

    #[test]
    fn signature_not_symmetric() {
        let a = Mat::from_data((2, 2), [0i64, 1, 0, 0]);
        assert_eq!(signature(&a), None);
    }
}
