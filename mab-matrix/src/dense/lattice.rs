//! Integer lattice computations built on the Smith normal form.
//!
//! All routines take the SNF `d = p a q` of some matrix and read the
//! answer off the transforms: solutions of `a x = b` are `q y` with
//! `d y = p b`, the kernel is spanned by the columns of `q` past the
//! rank, and so on.

use log::trace;
use mab::{EucRing, EucRingOps};
use crate::MatTrait;
use super::{Mat, SnfStrategy, SnfTrans, snf_trans};

/// An integral solution of `a x = b`, if one exists.
pub fn solve<R>(a: &Mat<R>, b: &[R]) -> Option<Vec<R>>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    let s = snf_trans(a, SnfStrategy::default());
    solve_with(&s, b)
}

/// Same as [`solve`] with a precomputed SNF of `a`.
pub fn solve_with<R>(s: &SnfTrans<R>, b: &[R]) -> Option<Vec<R>>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    let (m, n) = s.result().shape();
    assert_eq!(m, b.len());

    let pb = s.p().mul_vec(b);
    let r = s.rank();

    if pb[r..].iter().any(|a| !a.is_zero()) {
        return None
    }

    let mut y = vec![R::zero(); n];
    for i in 0..r {
        let d = s.diag(i);
        if !d.divides(&pb[i]) {
            return None
        }
        y[i] = &pb[i] / &d;
    }

    Some(s.q().mul_vec(&y))
}

/// A solution of `a x ≡ b`, where the `i`-th row is read modulo
/// `moduli[i]` (a zero modulus means exact equality).
pub fn solve_mod<R>(a: &Mat<R>, b: &[R], moduli: &[R]) -> Option<Vec<R>>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    let (m, n) = a.shape();
    assert_eq!(m, moduli.len());

    let aug = a.concat(&Mat::diag((m, m), moduli.iter().cloned()));
    let x = solve(&aug, b)?;

    Some(x[..n].to_vec())
}

/// Columns spanning `ker a`, as an `n × (n - rank)` matrix.
pub fn kernel_basis<R>(a: &Mat<R>) -> Mat<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    let s = snf_trans(a, SnfStrategy::default());
    let n = a.ncols();
    s.q().submat_cols(s.rank() .. n)
}

/// A basis of the column span of `g`, as an `m × rank` matrix.
pub fn image_basis<R>(g: &Mat<R>) -> Mat<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    let s = snf_trans(g, SnfStrategy::default());
    let r = s.rank();

    // g q = p⁻¹ d, whose first r columns are independent.
    let mut b = s.pinv().submat_cols(0 .. r);
    for j in 0..r {
        b.mul_col(j, &s.diag(j));
    }
    b
}

/// A basis of `{ v : a v ∈ ⊕ lattice[i] Z }`, as columns.
pub fn preimage_of_lattice<R>(a: &Mat<R>, lattice: &[R]) -> Mat<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    let (m, n) = a.shape();
    assert_eq!(m, lattice.len());

    let neg_l = Mat::diag((m, m), lattice.iter().map(|l| -l));
    let k = kernel_basis(&a.concat(&neg_l));
    let proj = k.submat_rows(0 .. n);

    trace!("preimage generators:\n{proj}");

    image_basis(&proj)
}

/// Coordinates of the columns of `vecs` with respect to the columns of
/// `basis`, which must be linearly independent and span a lattice
/// containing every column of `vecs`.
pub fn coords_in<R>(basis: &Mat<R>, vecs: &Mat<R>) -> Mat<R>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    assert_eq!(basis.nrows(), vecs.nrows());

    let s = snf_trans(basis, SnfStrategy::default());
    let k = basis.ncols();
    let r = s.rank();
    debug_assert_eq!(r, k);

    let cols = (0..vecs.ncols()).map(|j| {
        let pb = s.p().mul_vec(&vecs.col_vec(j));
        let y = (0..k).map(|i|
            if i < r { &pb[i] / &s.diag(i) } else { R::zero() }
        ).collect::<Vec<_>>();
        s.q().mul_vec(&y)
    }).collect::<Vec<_>>();

    Mat::from_col_vecs(k, &cols)
}

/// The inverse of a unimodular matrix.
pub fn inv_unimodular<R>(a: &Mat<R>) -> Option<Mat<R>>
where R: EucRing, for<'x> &'x R: EucRingOps<R> {
    if !a.is_square() {
        return None
    }

    let s = snf_trans(a, SnfStrategy::default());
    if s.result().is_id() {
        Some(s.q() * s.p())
    } else {
        None
    }
}

/// Given `a` representing an automorphism of `⊕ Z/factors[i]`, returns
/// a matrix `x` with `a x ≡ id`, entries reduced into each row's modulus.
pub fn torsion_aut_inverse<R, F>(a: &Mat<R>, factors: &[R], reduce: F) -> Option<Mat<R>>
where R: EucRing, for<'x> &'x R: EucRingOps<R>, F: Fn(&R, &R) -> R {
    let t = factors.len();
    assert_eq!(a.shape(), (t, t));

    let mut cols = Vec::with_capacity(t);
    for j in 0..t {
        let e = (0..t).map(|i| if i == j { R::one() } else { R::zero() }).collect::<Vec<_>>();
        let x = solve_mod(a, &e, factors)?;
        let x = x.iter().zip(factors).map(|(x, d)| reduce(x, d)).collect();
        cols.push(x);
    }

    Some(Mat::from_col_vecs(t, &cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_exact() {
        let a = Mat::from_data((2, 2), [2, 1, 4, 3]);
        let x = solve(&a, &[5, 13]).unwrap();
        assert_eq!(a.mul_vec(&x), vec![5, 13]);

        let a = Mat::from_data((2, 2), [2, 0, 0, 2]);
        assert_eq!(solve(&a, &[1, 0]), None);
    }

    #[test]
    fn solve_underdetermined() {
        let a = Mat::from_data((1, 3), [6, 10, 15]);
        let x = solve(&a, &[1]).unwrap();
        assert_eq!(a.mul_vec(&x), vec![1]);
    }

    #[test]
    fn solve_inconsistent() {
        let a = Mat::from_data((2, 1), [1, 1]);
        assert_eq!(solve(&a, &[1, 2]), None);
    }

    #[test]
    fn solve_mod_() {
        let a = Mat::from_data((1, 1), [3]);
        let x = solve_mod(&a, &[1], &[5]).unwrap();
        assert_eq!((3 * x[0] - 1) % 5, 0);

        let a = Mat::from_data((1, 1), [2]);
        assert_eq!(solve_mod(&a, &[1], &[4]), None);
    }

    #[test]
    fn kernel() {
        let a = Mat::from_data((1, 3), [1, 1, 1]);
        let k = kernel_basis(&a);
        assert_eq!(k.shape(), (3, 2));
        assert!((&a * &k).is_zero());
    }

    #[test]
    fn image() {
        let g = Mat::from_data((2, 3), [2, 4, 0, 0, 0, 0]);
        let b = image_basis(&g);
        assert_eq!(b.shape(), (2, 1));
        assert_eq!(b.col_vec(0).iter().map(|a: &i64| a.abs()).collect::<Vec<_>>(), vec![2, 0]);
    }

    #[test]
    fn preimage() {
        // { v : v_0 + v_1 ∈ 3Z }
        let a = Mat::from_data((1, 2), [1, 1]);
        let p = preimage_of_lattice(&a, &[3]);
        assert_eq!(p.shape(), (2, 2));

        let det: i64 = p[(0, 0)] * p[(1, 1)] - p[(0, 1)] * p[(1, 0)];
        assert_eq!(det.abs(), 3);
        for j in 0..2 {
            assert_eq!((p[(0, j)] + p[(1, j)]) % 3, 0);
        }
    }

    #[test]
    fn coords() {
        let basis = Mat::from_data((2, 2), [2, 0, 1, 3]);
        let vecs = Mat::from_data((2, 1), [4, 5]);
        let c = coords_in(&basis, &vecs);
        assert_eq!(&basis * &c, vecs);
    }

    #[test]
    fn inv() {
        let a = Mat::from_data((2, 2), [2, 1, 1, 1]);
        let b = inv_unimodular(&a).unwrap();
        assert!((&a * &b).is_id());

        let a = Mat::from_data((2, 2), [2, 0, 0, 1]);
        assert_eq!(inv_unimodular(&a), None);
    }

    #[test]
    fn torsion_inverse() {
        // multiplication by 2 on Z/5 ⊕ Z/5
        let a = Mat::from_data((2, 2), [2, 0, 0, 2]);
        let x = torsion_aut_inverse(&a, &[5, 5], |x: &i64, d: &i64| x.rem_euclid(*d)).unwrap();
        assert_eq!(x, Mat::from_data((2, 2), [3, 0, 0, 3]));

        let a = Mat::from_data((1, 1), [2]);
        assert_eq!(torsion_aut_inverse(&a, &[4], |x: &i64, d: &i64| x.rem_euclid(*d)), None);
    }
}
