use std::cmp::min;
use log::{debug, trace};
use mab::{EucRing, EucRingOps};
use crate::MatTrait;
use crate::dense::*;

/// How pivots are chosen and eliminated.
///
/// `Standard` takes the sparsest row in the current column and clears
/// it with 2×2 unimodular gcd transforms. `Controlled` takes the entry
/// of smallest weight in the remaining block and clears by Euclidean
/// division, which keeps intermediate entries small for dense input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SnfStrategy {
    #[default]
    Standard,
    Controlled,
}

/// Computes the Smith normal form `d = p a q` together with
/// all four transforms `p, p⁻¹, q, q⁻¹`.
pub fn snf_trans<R>(target: &Mat<R>, strategy: SnfStrategy) -> SnfTrans<R>
where R: EucRing, for<'a> &'a R: EucRingOps<R> {
    debug!("start snf: {:?}, strategy: {:?}.", target.shape(), strategy);
    trace!("\n{}", target);

    let mut calc = SnfCalc::new(target.clone(), strategy);
    calc.process();

    debug!("snf done, rank: {}.", diag_rank(&calc.target));
    trace!("\n{}", calc.target);

    calc.finish()
}

/// A Smith normal form `result = p · a · q` with its transforms.
#[derive(Clone, Debug)]
pub struct SnfTrans<R> {
    result: Mat<R>,
    p:    Mat<R>,
    pinv: Mat<R>,
    q:    Mat<R>,
    qinv: Mat<R>
}

impl<R> SnfTrans<R>
where R: EucRing, for<'a> &'a R: EucRingOps<R> {
    pub fn result(&self) -> &Mat<R> { &self.result }
    pub fn p(&self) -> &Mat<R> { &self.p }
    pub fn pinv(&self) -> &Mat<R> { &self.pinv }
    pub fn q(&self) -> &Mat<R> { &self.q }
    pub fn qinv(&self) -> &Mat<R> { &self.qinv }

    pub fn rank(&self) -> usize {
        diag_rank(&self.result)
    }

    pub fn factors(&self) -> Vec<&R> {
        diag_factors(&self.result)
    }

    /// The `i`-th diagonal entry, zero beyond the diagonal.
    pub fn diag(&self, i: usize) -> R {
        let (m, n) = self.result.shape();
        if i < min(m, n) {
            self.result[(i, i)].clone()
        } else {
            R::zero()
        }
    }
}

fn diag_rank<R>(d: &Mat<R>) -> usize
where R: EucRing, for<'a> &'a R: EucRingOps<R> {
    let n = min(d.nrows(), d.ncols());
    (0..n).find(|&i| d[(i, i)].is_zero()).unwrap_or(n)
}

fn diag_factors<R>(d: &Mat<R>) -> Vec<&R>
where R: EucRing, for<'a> &'a R: EucRingOps<R> {
    let n = min(d.nrows(), d.ncols());
    (0..n).map(|i| &d[(i, i)]).filter(|a| !a.is_zero()).collect()
}

// Reduces `target` in place, recording every row operation in `p`
// (and its inverse in `pinv`), every column operation in `q` and `qinv`.
#[derive(Debug)]
struct SnfCalc<R>
where R: EucRing, for<'a> &'a R: EucRingOps<R> {
    target: Mat<R>,
    p:    Mat<R>,
    pinv: Mat<R>,
    q:    Mat<R>,
    qinv: Mat<R>,
    strategy: SnfStrategy
}

impl<R> SnfCalc<R>
where R: EucRing, for<'a> &'a R: EucRingOps<R> {
    fn new(target: Mat<R>, strategy: SnfStrategy) -> Self {
        let (m, n) = target.shape();
        SnfCalc {
            target,
            p:    Mat::id(m),
            pinv: Mat::id(m),
            q:    Mat::id(n),
            qinv: Mat::id(n),
            strategy
        }
    }

    fn finish(self) -> SnfTrans<R> {
        SnfTrans {
            result: self.target,
            p: self.p,
            pinv: self.pinv,
            q: self.q,
            qinv: self.qinv
        }
    }

    fn process(&mut self) {
        if self.target.is_zero() {
            return
        }

        match self.strategy {
            SnfStrategy::Standard   => self.eliminate_all(),
            SnfStrategy::Controlled => self.eliminate_all_controlled(),
        }
        self.diag_normalize();
    }

    fn eliminate_all(&mut self) {
        let (m, n) = self.target.shape();
        let mut i = 0;

        for j in 0..n {
            if i >= m { break }
            if self.eliminate_step(i, j) {
                i += 1;
            }
        }
    }

    fn eliminate_step(&mut self, i: usize, j: usize) -> bool {
        let Some(i_p) = self.select_pivot(i, j) else {
            return false
        };

        trace!("select-pivot: ({i_p}, {j})");

        if i_p > i {
            self.swap_rows(i, i_p);
        }

        if j > i {
            self.swap_cols(i, j);
        }

        let u = self.target[(i, i)].normalizing_unit();
        if !u.is_one() {
            self.mul_col(i, &u);
        }

        self.eliminate_at(i, i);

        true
    }

    fn eliminate_all_controlled(&mut self) {
        let (m, n) = self.target.shape();

        for i in 0..min(m, n) {
            let Some((i_p, j_p)) = self.select_min_pivot(i) else {
                break
            };

            trace!("select-min-pivot: ({i_p}, {j_p})");

            if i_p > i {
                self.swap_rows(i, i_p);
            }
            if j_p > i {
                self.swap_cols(i, j_p);
            }

            self.eliminate_at_controlled(i);
        }
    }

    fn row_nz(&self, i: usize) -> usize {
        (0..self.target.ncols()).filter(|&j| !self.target[(i, j)].is_zero()).count()
    }

    fn col_nz(&self, j: usize) -> usize {
        (0..self.target.nrows()).filter(|&i| !self.target[(i, j)].is_zero()).count()
    }

    fn swap_rows(&mut self, i: usize, j: usize) {
        self.target.swap_rows(i, j);
        self.p.swap_rows(i, j);
        self.pinv.swap_cols(i, j);

        trace!("swap-rows: ({i}, {j})\n{}", self.target);
    }

    fn swap_cols(&mut self, i: usize, j: usize) {
        self.target.swap_cols(i, j);
        self.q.swap_cols(i, j);
        self.qinv.swap_rows(i, j);

        trace!("swap-cols: ({i}, {j})\n{}", self.target);
    }

    // `u` must be a unit.
    fn mul_row(&mut self, i: usize, u: &R) {
        let uinv = u.inv().unwrap_or_else(R::one);

        self.target.mul_row(i, u);
        self.p.mul_row(i, u);
        self.pinv.mul_col(i, &uinv);

        trace!("mul-row: {i} by {u}\n{}", self.target);
    }

    // `u` must be a unit.
    fn mul_col(&mut self, i: usize, u: &R) {
        let uinv = u.inv().unwrap_or_else(R::one);

        self.target.mul_col(i, u);
        self.q.mul_col(i, u);
        self.qinv.mul_row(i, &uinv);

        trace!("mul-col: {i} by {u}\n{}", self.target);
    }

    // row_j += r * row_i
    fn add_row_to(&mut self, i: usize, j: usize, r: &R) {
        self.target.add_row_to(i, j, r);
        self.p.add_row_to(i, j, r);
        self.pinv.add_col_to(j, i, &-r);

        trace!("add-row: {i} to {j} by {r}\n{}", self.target);
    }

    // col_j += r * col_i
    fn add_col_to(&mut self, i: usize, j: usize, r: &R) {
        self.target.add_col_to(i, j, r);
        self.q.add_col_to(i, j, r);
        self.qinv.add_row_to(j, i, &-r);

        trace!("add-col: {i} to {j} by {r}\n{}", self.target);
    }

    // Multiply [a, b; c, d] from left, assuming det = 1.
    fn left_elementary(&mut self, comps: [&R; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;
        debug_assert!((a * d - b * c).is_one());

        self.target.left_elementary(comps, i, j);
        self.p.left_elementary(comps, i, j);
        self.pinv.right_elementary([d, &-c, &-b, a], i, j);

        trace!("left-elem: [{a}, {b}; {c}, {d}] for rows ({i}, {j}).\n{}", self.target);
    }

    // Multiply [a, c; b, d] from right, assuming det = 1.
    fn right_elementary(&mut self, comps: [&R; 4], i: usize, j: usize) {
        let [a, b, c, d] = comps;
        debug_assert!((a * d - b * c).is_one());

        self.target.right_elementary(comps, i, j);
        self.q.right_elementary(comps, i, j);
        self.qinv.left_elementary([d, &-c, &-b, a], i, j);

        trace!("right-elem: [{a}, {b}; {c}, {d}] for cols ({i}, {j}).\n{}", self.target);
    }

    fn select_pivot(&self, below_i: usize, j: usize) -> Option<usize> {
        // find row `i` below `below_i` with minimum nnz.
        (below_i..self.target.nrows())
            .filter( |i| !self.target[(*i, j)].is_zero() )
            .map( |i| (i, self.row_nz(i)) )
            .min_by( |e1, e2| e1.1.cmp(&e2.1) )
            .map( |(i, _)| i )
    }

    fn select_min_pivot(&self, from: usize) -> Option<(usize, usize)> {
        // find the entry of minimum weight in the lower-right block.
        let (m, n) = self.target.shape();
        (from..m).flat_map(|i| (from..n).map(move |j| (i, j)))
            .filter( |&(i, j)| !self.target[(i, j)].is_zero() )
            .map( |(i, j)| ((i, j), self.target[(i, j)].c_weight()) )
            .min_by( |e1, e2| e1.1.total_cmp(&e2.1) )
            .map( |(ij, _)| ij )
    }

    fn eliminate_at(&mut self, i: usize, j: usize) {
        debug_assert!(!self.target[(i, j)].is_zero());

        while self.row_nz(i) > 1 || self.col_nz(j) > 1 {
            let modified = self.eliminate_col(i, j)
                         | self.eliminate_row(i, j);
            if !modified {
                break
            }
        }
    }

    fn eliminate_row(&mut self, i: usize, j: usize) -> bool {
        let mut modified = false;

        for j1 in 0..self.target.ncols() {
            if j == j1 || self.target[(i, j1)].is_zero() { continue }

            // d = sx + ty,
            // a = x/d,
            // b = y/d.

            // [x y][s -b] = [d 0]
            //      [t  a]

            let x = &self.target[(i, j )];
            let y = &self.target[(i, j1)];

            let (d, s, t) = Self::gcdx(x, y);
            let (a, b) = (x / &d, y / &d);

            self.right_elementary(
                [&s, &t, &-b, &a],
                j, j1
            );
            modified = true
        }

        modified
    }

    fn eliminate_col(&mut self, i: usize, j: usize) -> bool {
        let mut modified = false;

        for i1 in 0..self.target.nrows() {
            if i == i1 || self.target[(i1, j)].is_zero() { continue }

            // [ s t][x] < i  = [d]
            // [-b a][y] < i1   [0]

            let x = &self.target[(i , j)];
            let y = &self.target[(i1, j)];

            let (d, s, t) = Self::gcdx(x, y);
            let (a, b) = (x / &d, y / &d);

            self.left_elementary(
                [&s, &t, &-b, &a],
                i, i1
            );
            modified = true
        }

        modified
    }

    // Clears row `i` and column `i` by division with remainder,
    // moving the smallest remainder to the pivot until it divides all.
    fn eliminate_at_controlled(&mut self, i: usize) {
        let (m, n) = self.target.shape();

        loop {
            for k in i + 1 .. m {
                if self.target[(k, i)].is_zero() { continue }
                let q = &self.target[(k, i)] / &self.target[(i, i)];
                if !q.is_zero() {
                    self.add_row_to(i, k, &-q);
                }
            }

            for k in i + 1 .. n {
                if self.target[(i, k)].is_zero() { continue }
                let q = &self.target[(i, k)] / &self.target[(i, i)];
                if !q.is_zero() {
                    self.add_col_to(i, k, &-q);
                }
            }

            let rem_row = (i + 1 .. m)
                .filter(|&k| !self.target[(k, i)].is_zero())
                .map(|k| (k, true));
            let rem_col = (i + 1 .. n)
                .filter(|&k| !self.target[(i, k)].is_zero())
                .map(|k| (k, false));

            let next = rem_row.chain(rem_col).min_by(|&(k1, r1), &(k2, r2)| {
                let w = |k, is_row| if is_row {
                    self.target[(k, i)].c_weight()
                } else {
                    self.target[(i, k)].c_weight()
                };
                w(k1, r1).total_cmp(&w(k2, r2))
            });

            match next {
                None => break,
                Some((k, true))  => self.swap_rows(i, k),
                Some((k, false)) => self.swap_cols(i, k),
            }
        }
    }

    fn diag_normalize(&mut self) {
        debug_assert!(self.target.is_diag());

        let r = diag_rank(&self.target);

        if r == 0 {
            return
        }

        'outer: loop {
            for i in 0..r-1 {
                if !self.diag_normalize_step(i) {
                    continue 'outer
                }
            }
            break
        }

        for i in 0..r {
            let u = self.target[(i, i)].normalizing_unit();
            if !u.is_one() {
                self.mul_row(i, &u);
            }
        }
    }

    fn diag_normalize_step(&mut self, i: usize) -> bool {
        let x = &self.target[(i, i)];
        let y = &self.target[(i + 1, i + 1)];

        if x.divides(y) {
            return true
        }

        if y.divides(x) {
            self.swap_rows(i, i + 1);
            self.swap_cols(i, i + 1);
            return false
        }

        // sx + ty = d, a = x/d, b = y/d.
        //
        // [1   1 ][x   ][s  -b] = [d      ]
        // [-tb sa][   y][t   a]   [   xy/d]

        let (d, s, t) = Self::gcdx(x, y);
        let (a, b) = (x / &d, y / &d);
        let (tb, sa) = (&t * &b, &s * &a);

        self.left_elementary(
            [&R::one(), &R::one(), &-tb, &sa],
            i, i + 1
        );
        self.right_elementary(
            [&s, &t, &-b, &a],
            i, i + 1
        );

        false
    }

    fn gcdx(x: &R, y: &R) -> (R, R, R) {
        let (d, s, t) = EucRing::gcdx(x, y);

        let a = x / &d;
        if a.is_unit() {
            (d, a, R::zero())
        } else {
            (d, s, t)
        }
    }
}
