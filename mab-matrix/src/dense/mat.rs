use std::ops::{Add, Neg, Sub, Mul, Index, IndexMut, AddAssign, SubAssign, MulAssign, Range};
use std::fmt::Display;
use nalgebra::{DMatrix, Scalar};
use delegate::delegate;
use auto_impl_ops::auto_ops;
use cfg_if::cfg_if;
use itertools::Itertools;
use mab::{Ring, RingOps};
use crate::MatTrait;

/// A dense matrix of fixed shape, stored by `nalgebra`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mat<R> {
    inner: DMatrix<R>
}

impl<R> MatTrait for Mat<R> {
    fn shape(&self) -> (usize, usize) {
        (self.inner.nrows(), self.inner.ncols())
    }
}

impl<R> Mat<R> {
    // column-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &R)> {
        let m = self.nrows().max(1);
        self.inner.iter().enumerate().map(move |(k, a)|
            (k % m, k / m, a)
        )
    }
}

impl<R> Mat<R>
where R: Scalar {
    pub fn from_data<I>(shape: (usize, usize), data: I) -> Self
    where I: IntoIterator<Item = R> {
        DMatrix::from_row_iterator(shape.0, shape.1, data).into()
    }

    pub fn from_fn<F>(shape: (usize, usize), f: F) -> Self
    where F: FnMut(usize, usize) -> R {
        DMatrix::from_fn(shape.0, shape.1, f).into()
    }

    /// Builds an `nrows × cols.len()` matrix from its columns.
    pub fn from_col_vecs(nrows: usize, cols: &[Vec<R>]) -> Self {
        debug_assert!(cols.iter().all(|c| c.len() == nrows));
        Self::from_fn((nrows, cols.len()), |i, j| cols[j][i].clone())
    }

    pub fn row_vec(&self, i: usize) -> Vec<R> {
        (0..self.ncols()).map(|j| self[(i, j)].clone()).collect()
    }

    pub fn col_vec(&self, j: usize) -> Vec<R> {
        (0..self.nrows()).map(|i| self[(i, j)].clone()).collect()
    }

    pub fn transpose(&self) -> Self {
        Self::from(self.inner.transpose())
    }

    pub fn submat(&self, rows: Range<usize>, cols: Range<usize>) -> Self {
        let (i0, i1) = (rows.start, rows.end);
        let (j0, j1) = (cols.start, cols.end);

        assert!(i0 <= i1 && i1 <= self.nrows());
        assert!(j0 <= j1 && j1 <= self.ncols());

        Self::from_fn((i1 - i0, j1 - j0), |i, j| self[(i0 + i, j0 + j)].clone())
    }

    pub fn submat_rows(&self, rows: Range<usize>) -> Self {
        let n = self.ncols();
        self.submat(rows, 0 .. n)
    }

    pub fn submat_cols(&self, cols: Range<usize>) -> Self {
        let m = self.nrows();
        self.submat(0 .. m, cols)
    }

    /// `[self | other]`
    pub fn concat(&self, other: &Self) -> Self {
        assert_eq!(self.nrows(), other.nrows());
        let n = self.ncols();
        Self::from_fn((self.nrows(), n + other.ncols()), |i, j|
            if j < n { self[(i, j)].clone() } else { other[(i, j - n)].clone() }
        )
    }

    /// `[self; other]`
    pub fn stack(&self, other: &Self) -> Self {
        assert_eq!(self.ncols(), other.ncols());
        let m = self.nrows();
        Self::from_fn((m + other.nrows(), self.ncols()), |i, j|
            if i < m { self[(i, j)].clone() } else { other[(i - m, j)].clone() }
        )
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.inner.swap_rows(i, j);
    }

    pub fn swap_cols(&mut self, i: usize, j: usize) {
        self.inner.swap_columns(i, j);
    }
}

impl<R> Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    pub fn zero(shape: (usize, usize)) -> Self {
        Self::from_fn(shape, |_, _| R::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.inner.iter().all(|a| a.is_zero())
    }

    pub fn id(size: usize) -> Self {
        Self::from_fn((size, size), |i, j| if i == j { R::one() } else { R::zero() })
    }

    pub fn is_id(&self) -> bool {
        self.is_square() && self.iter().all(|(i, j, a)|
            i == j && a.is_one() ||
            i != j && a.is_zero()
        )
    }

    pub fn diag<I>(shape: (usize, usize), entries: I) -> Self
    where I: IntoIterator<Item = R> {
        let mut mat = Self::zero(shape);
        for (i, a) in entries.into_iter().enumerate() {
            mat[(i, i)] = a;
        }
        mat
    }

    pub fn is_diag(&self) -> bool {
        self.iter().all(|(i, j, a)|
            i == j || a.is_zero()
        )
    }

    pub fn mul_vec(&self, v: &[R]) -> Vec<R> {
        assert_eq!(self.ncols(), v.len());
        (0..self.nrows()).map(|i|
            v.iter().enumerate().filter(|(_, a)| !a.is_zero()).map(|(j, a)|
                &self[(i, j)] * a
            ).sum()
        ).collect()
    }

    pub fn mul_row(&mut self, i: usize, r: &R) {
        for j in 0 .. self.ncols() {
            self[(i, j)] *= r;
        }
    }

    pub fn mul_col(&mut self, j: usize, r: &R) {
        for i in 0 .. self.nrows() {
            self[(i, j)] *= r;
        }
    }

    // row_j += r * row_i
    pub fn add_row_to(&mut self, i: usize, j: usize, r: &R) {
        for k in 0 .. self.ncols() {
            let a = &self[(i, k)] * r;
            self[(j, k)] += a;
        }
    }

    // col_j += r * col_i
    pub fn add_col_to(&mut self, i: usize, j: usize, r: &R) {
        for k in 0 .. self.nrows() {
            let a = &self[(k, i)] * r;
            self[(k, j)] += a;
        }
    }

    // Multiply [a, b; c, d] from left.
    pub fn left_elementary(&mut self, comps: [&R; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;
        for k in 0 .. self.ncols() {
            let (x, y) = (&self[(i, k)], &self[(j, k)]);
            let s = a * x + b * y;
            let t = c * x + d * y;
            self[(i, k)] = s;
            self[(j, k)] = t;
        }
    }

    // Multiply [a, c; b, d] from right.
    pub fn right_elementary(&mut self, comps: [&R; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;
        for k in 0 .. self.nrows() {
            let (x, y) = (&self[(k, i)], &self[(k, j)]);
            let s = a * x + b * y;
            let t = c * x + d * y;
            self[(k, i)] = s;
            self[(k, j)] = t;
        }
    }
}

impl<R> From<DMatrix<R>> for Mat<R> {
    fn from(inner: DMatrix<R>) -> Self {
        Self { inner }
    }
}

impl<R> Index<(usize, usize)> for Mat<R> {
    type Output = R;
    delegate! {
        to self.inner {
            fn index(&self, index: (usize, usize)) -> &R;
        }
    }
}

impl<R> IndexMut<(usize, usize)> for Mat<R> {
    delegate! {
        to self.inner {
            fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output;
        }
    }
}

impl<R> Default for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn default() -> Self {
        Self::zero((0, 0))
    }
}

impl<R> Display for Mat<R>
where R: Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (m, n) = self.shape();
        if m == 0 || n == 0 {
            return write!(f, "[]({m}×{n})")
        }

        let strs = (0..m).map(|i|
            (0..n).map(|j| self[(i, j)].to_string()).collect_vec()
        ).collect_vec();
        let width = strs.iter().flatten().map(|s| s.chars().count()).max().unwrap_or(0);

        let lines = strs.iter().map(|row|
            format!("[ {} ]", row.iter().map(|s| format!("{s:>width$}")).join(" "))
        ).join("\n");

        write!(f, "{lines}")
    }
}

impl<R> Neg for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl<R> Neg for &Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = Mat<R>;
    fn neg(self) -> Self::Output {
        Mat::from_fn(self.shape(), |i, j| -&self[(i, j)])
    }
}

#[auto_ops]
impl<R> AddAssign<&Mat<R>> for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn add_assign(&mut self, rhs: &Self) {
        assert_eq!(self.shape(), rhs.shape());
        self.inner.iter_mut().zip(rhs.inner.iter()).for_each(|(a, b)| *a += b);
    }
}

#[auto_ops]
impl<R> SubAssign<&Mat<R>> for Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn sub_assign(&mut self, rhs: &Self) {
        assert_eq!(self.shape(), rhs.shape());
        self.inner.iter_mut().zip(rhs.inner.iter()).for_each(|(a, b)| *a -= b);
    }
}

#[auto_ops]
impl<'a, 'b, R> Mul<&'b Mat<R>> for &'a Mat<R>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = Mat<R>;
    fn mul(self, rhs: &'b Mat<R>) -> Self::Output {
        assert_eq!(self.ncols(), rhs.nrows());

        let (l, m, n) = (self.nrows(), self.ncols(), rhs.ncols());
        let row = |i: usize| -> Vec<R> {
            (0..n).map(|j|
                (0..m).filter(|&k| !self[(i, k)].is_zero()).map(|k|
                    &self[(i, k)] * &rhs[(k, j)]
                ).sum()
            ).collect()
        };

        cfg_if! {
            if #[cfg(feature = "multithread")] {
                use rayon::prelude::*;
                let rows: Vec<Vec<R>> = (0..l).into_par_iter().map(row).collect();
            } else {
                let rows: Vec<Vec<R>> = (0..l).map(row).collect();
            }
        }

        Mat::from_data((l, n), rows.into_iter().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);

        assert_eq!(a.nrows(), 2);
        assert_eq!(a.ncols(), 3);
        assert_eq!(a[(1, 0)], 4);
        assert_eq!(a.row_vec(1), vec![4,5,6]);
    }

    #[test]
    fn eq() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);
        let b = Mat::from_data((2, 3), [1,2,0,4,5,6]);
        let c = Mat::from_data((3, 2), [1,2,3,4,5,6]);

        assert_eq!(a, a);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_id_diag() {
        let a: Mat<i64> = Mat::zero((3, 2));
        assert!(a.is_zero());
        assert!(a.is_diag());

        let e: Mat<i64> = Mat::id(3);
        assert!(e.is_id());

        let d: Mat<i64> = Mat::diag((2, 3), [2, 5]);
        assert!(d.is_diag());
        assert!(!d.is_id());
        assert_eq!(d, Mat::from_data((2, 3), [2,0,0,0,5,0]));
    }

    #[test]
    fn iter() {
        let a = Mat::from_data((2, 2), [1,2,3,4]);
        let v: Vec<_> = a.iter().map(|(i, j, a)| (i, j, *a)).collect();
        assert_eq!(v, vec![(0,0,1), (1,0,3), (0,1,2), (1,1,4)]);
    }

    #[test]
    fn submat() {
        let a = Mat::from_data((3, 3), [1,2,3,4,5,6,7,8,9]);
        assert_eq!(a.submat(1..3, 0..2), Mat::from_data((2, 2), [4,5,7,8]));
        assert_eq!(a.submat_rows(2..3), Mat::from_data((1, 3), [7,8,9]));
        assert_eq!(a.submat_cols(1..1).shape(), (3, 0));
    }

    #[test]
    fn concat_stack() {
        let a = Mat::from_data((2, 1), [1,2]);
        let b = Mat::from_data((2, 2), [3,4,5,6]);
        assert_eq!(a.concat(&b), Mat::from_data((2, 3), [1,3,4,2,5,6]));

        let c = Mat::from_data((1, 2), [7,8]);
        assert_eq!(b.stack(&c), Mat::from_data((3, 2), [3,4,5,6,7,8]));
    }

    #[test]
    fn col_vecs() {
        let a = Mat::from_col_vecs(2, &[vec![1,2], vec![3,4], vec![5,6]]);
        assert_eq!(a, Mat::from_data((2, 3), [1,3,5,2,4,6]));
        assert_eq!(a.col_vec(1), vec![3,4]);
        assert_eq!(a.row_vec(1), vec![2,4,6]);
        assert_eq!(a.transpose().shape(), (3, 2));
    }

    #[test]
    fn ops() {
        let a = Mat::from_data((2, 2), [1,2,3,4]);
        let b = Mat::from_data((2, 2), [0,1,1,0]);

        assert_eq!(&a + &b, Mat::from_data((2, 2), [1,3,4,4]));
        assert_eq!(&a - &b, Mat::from_data((2, 2), [1,1,2,4]));
        assert_eq!(-&a, Mat::from_data((2, 2), [-1,-2,-3,-4]));
        assert_eq!(&a * &b, Mat::from_data((2, 2), [2,1,4,3]));
        assert_eq!(&b * &a, Mat::from_data((2, 2), [3,4,1,2]));
    }

    #[test]
    fn mul_rect() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);
        let b = Mat::from_data((3, 1), [1,0,-1]);
        assert_eq!(a * b, Mat::from_data((2, 1), [-2,-2]));

        let z: Mat<i64> = Mat::zero((2, 0));
        let w: Mat<i64> = Mat::zero((0, 3));
        assert_eq!(&z * &w, Mat::zero((2, 3)));
    }

    #[test]
    fn mul_vec() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);
        assert_eq!(a.mul_vec(&[1, 1, 1]), vec![6, 15]);
    }

    #[test]
    fn elementary() {
        let mut a = Mat::from_data((2, 2), [1,2,3,4]);
        a.add_row_to(0, 1, &-3);
        assert_eq!(a, Mat::from_data((2, 2), [1,2,0,-2]));

        a.add_col_to(0, 1, &-2);
        assert_eq!(a, Mat::from_data((2, 2), [1,0,0,-2]));

        a.mul_row(1, &-1);
        assert_eq!(a, Mat::from_data((2, 2), [1,0,0,2]));

        let mut b = Mat::from_data((2, 2), [1,2,3,4]);
        b.left_elementary([&3, &2, &4, &3], 0, 1);
        assert_eq!(b, Mat::from_data((2, 2), [9,14,13,20]));

        let mut c = Mat::from_data((2, 2), [1,2,3,4]);
        c.right_elementary([&3, &2, &4, &3], 0, 1);
        assert_eq!(c, Mat::from_data((2, 2), [7,10,17,24]));
    }

    #[test]
    fn display() {
        let a = Mat::from_data((2, 2), [1,-2,30,4]);
        assert_eq!(a.to_string(), "[  1 -2 ]\n[ 30  4 ]");
    }
}
