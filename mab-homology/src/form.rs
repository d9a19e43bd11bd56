use std::fmt::Display;
use std::sync::OnceLock;
use itertools::Itertools;
use log::info;
use num_bigint::BigInt;
use mab::{Integer, IntOps, EucRing, Ratio};
use mab_matrix::MatTrait;
use mab_matrix::dense::{Mat, SnfStrategy, snf_trans};
use mab_matrix::dense::sym;
use crate::{Error, Result, MarkedAbelianGroup, HomMarkedAbelianGroup, SparseGrid, LinkingFormInvariants};
use crate::error::ensure_len;

/// A bilinear map `l_domain × r_domain → range`, given on chains by a
/// 3-index grid: `(i, j, k) ↦ a` means `eᵢ ⊗ eⱼ ↦ a·eₖ`.
#[derive(Clone, derive_more::Debug)]
#[debug(bound(I: std::fmt::Debug + std::fmt::Display + num_traits::One + PartialEq))]
pub struct BilinearForm<I = BigInt> {
    l_domain: MarkedAbelianGroup<I>,
    r_domain: MarkedAbelianGroup<I>,
    range: MarkedAbelianGroup<I>,
    unreduced: SparseGrid<I, 3>,
    reduced: SparseGrid<I, 3>,
    linking: OnceLock<Result<LinkingFormInvariants<I>>>,
}

impl<I> BilinearForm<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    pub fn new(l_domain: MarkedAbelianGroup<I>, r_domain: MarkedAbelianGroup<I>, range: MarkedAbelianGroup<I>, pairing: SparseGrid<I, 3>) -> Result<Self> {
        if let Some([i, j, k]) = pairing.bounds() {
            for (b, n) in [(i, l_domain.rank_cc()), (j, r_domain.rank_cc()), (k, range.rank_cc())] {
                if b >= n {
                    return Err(Error::DimensionMismatch { expected: n, actual: b + 1 })
                }
            }
        }

        let mut reduced = SparseGrid::new();
        for i in 0 .. l_domain.min_num_gens() {
            let x = l_domain.gen_rep(i);
            for j in 0 .. r_domain.min_num_gens() {
                let y = r_domain.gen_rep(j);
                let v = Self::eval_grid(&pairing, &x, &y, range.rank_cc());
                let w = range.snf_rep(&v).map_err(|_| Error::NotACycleMap)?;
                for (k, a) in w.into_iter().enumerate() {
                    reduced.set_entry([i, j, k], a);
                }
            }
        }

        info!("bilinear form: {l_domain} × {r_domain} -> {range}");

        Ok(Self {
            l_domain, r_domain, range,
            unreduced: pairing,
            reduced,
            linking: OnceLock::new()
        })
    }

    fn eval_grid(grid: &SparseGrid<I, 3>, x: &[I], y: &[I], n: usize) -> Vec<I> {
        let mut out = vec![I::zero(); n];
        for ([i, j, k], a) in grid.iter() {
            if x[*i].is_zero() || y[*j].is_zero() { continue }
            out[*k] += &(a * &x[*i]) * &y[*j];
        }
        out
    }

    pub fn l_domain(&self) -> &MarkedAbelianGroup<I> {
        &self.l_domain
    }

    pub fn r_domain(&self) -> &MarkedAbelianGroup<I> {
        &self.r_domain
    }

    pub fn range(&self) -> &MarkedAbelianGroup<I> {
        &self.range
    }

    pub fn unreduced_pairing(&self) -> &SparseGrid<I, 3> {
        &self.unreduced
    }

    /// The pairing on SNF generators, with values in SNF coordinates.
    pub fn reduced_pairing(&self) -> &SparseGrid<I, 3> {
        &self.reduced
    }

    pub fn eval_cc(&self, x: &[I], y: &[I]) -> Result<Vec<I>> {
        ensure_len(x.len(), self.l_domain.rank_cc())?;
        ensure_len(y.len(), self.r_domain.rank_cc())?;

        let c = self.range.coeff();
        let v = Self::eval_grid(&self.unreduced, x, y, self.range.rank_cc());
        Ok(v.into_iter().map(|a| a.rem_norm(c)).collect())
    }

    pub fn eval_snf(&self, x: &[I], y: &[I]) -> Result<Vec<I>> {
        ensure_len(x.len(), self.l_domain.min_num_gens())?;
        ensure_len(y.len(), self.r_domain.min_num_gens())?;

        let v = Self::eval_grid(&self.reduced, x, y, self.range.min_num_gens());
        Ok(self.range.reduce_snf(v))
    }

    pub fn is_symmetric(&self) -> bool {
        self.l_domain == self.r_domain && self.reduced.iter().all(|([i, j, k], a)|
            self.reduced.get(&[*j, *i, *k]) == a
        )
    }

    pub fn is_anti_symmetric(&self) -> bool {
        self.l_domain == self.r_domain && self.reduced.iter().all(|([i, j, k], a)| {
            let b = a + self.reduced.get(&[*j, *i, *k]);
            match self.range.inv_fac(*k) {
                Some(d) => b.rem_norm(d).is_zero(),
                None    => b.is_zero()
            }
        })
    }

    // the pairing matrix into the single summand of Z.
    fn integral_matrix(&self) -> Option<Mat<I>> {
        if !self.range.is_z() {
            return None
        }
        let (m, n) = (self.l_domain.min_num_gens(), self.r_domain.min_num_gens());
        Some(Mat::from_fn((m, n), |i, j| self.reduced[[i, j, 0]].clone()))
    }

    /// Rank of the pairing, when the range is `Z`.
    pub fn rank(&self) -> Option<usize> {
        let a = self.integral_matrix()?;
        Some(snf_trans(&a, SnfStrategy::default()).rank())
    }

    /// Signature of a symmetric pairing into `Z`.
    pub fn signature(&self) -> Option<isize> {
        if !self.is_symmetric() {
            return None
        }
        let a = self.integral_matrix()?;
        sym::signature(&a)
    }

    /// The subgroup of the range generated by the values of the pairing.
    pub fn image(&self) -> Result<MarkedAbelianGroup<I>> {
        let (m, n) = (self.l_domain.min_num_gens(), self.r_domain.min_num_gens());
        let r = self.range.min_num_gens();
        let cols = (0..m).cartesian_product(0..n).map(|(i, j)|
            (0..r).map(|k| self.reduced[[i, j, k]].clone()).collect_vec()
        ).collect_vec();

        let values = Mat::from_col_vecs(r, &cols);
        let f = HomMarkedAbelianGroup::from_reduced(MarkedAbelianGroup::free(m * n, I::zero()), self.range.clone(), &values)?;
        Ok(f.image().clone())
    }

    /// The form `(x, y) ↦ self(f x, y)`.
    pub fn l_compose(&self, f: &HomMarkedAbelianGroup<I>) -> Result<Self> {
        Self::ensure_same(f.range(), &self.l_domain)?;
        let a = f.matrix();
        let grid = SparseGrid::from_entries(self.unreduced.iter().flat_map(|([i, j, k], v)|
            (0 .. a.ncols()).filter(move |&l| !a[(*i, l)].is_zero()).map(move |l|
                ([l, *j, *k], v * &a[(*i, l)])
            )
        ));
        Self::new(f.domain().clone(), self.r_domain.clone(), self.range.clone(), grid)
    }

    /// The form `(x, y) ↦ self(x, f y)`.
    pub fn r_compose(&self, f: &HomMarkedAbelianGroup<I>) -> Result<Self> {
        Self::ensure_same(f.range(), &self.r_domain)?;
        let a = f.matrix();
        let grid = SparseGrid::from_entries(self.unreduced.iter().flat_map(|([i, j, k], v)|
            (0 .. a.ncols()).filter(move |&l| !a[(*j, l)].is_zero()).map(move |l|
                ([*i, l, *k], v * &a[(*j, l)])
            )
        ));
        Self::new(self.l_domain.clone(), f.domain().clone(), self.range.clone(), grid)
    }

    /// The form `(x, y) ↦ f(self(x, y))`.
    pub fn post_compose(&self, f: &HomMarkedAbelianGroup<I>) -> Result<Self> {
        Self::ensure_same(f.domain(), &self.range)?;
        let a = f.matrix();
        let grid = SparseGrid::from_entries(self.unreduced.iter().flat_map(|([i, j, k], v)|
            (0 .. a.nrows()).filter(move |&l| !a[(l, *k)].is_zero()).map(move |l|
                ([*i, *j, l], v * &a[(l, *k)])
            )
        ));
        Self::new(self.l_domain.clone(), self.r_domain.clone(), f.range().clone(), grid)
    }

    fn ensure_same(a: &MarkedAbelianGroup<I>, b: &MarkedAbelianGroup<I>) -> Result<()> {
        if a == b {
            Ok(())
        } else {
            Err(Error::IncompatibleGroups(format!("{a} is not presented as {b}")))
        }
    }

    /// `l_domain → Hom(r_domain, range)`, with the domain re-presented in
    /// its SNF coordinates.
    pub fn left_adjoint(&self) -> Result<HomMarkedAbelianGroup<I>> {
        self.adjoint(&self.l_domain, &self.r_domain, |a, b, k| [a, b, k])
    }

    /// `r_domain → Hom(l_domain, range)`, with the domain re-presented in
    /// its SNF coordinates.
    pub fn right_adjoint(&self) -> Result<HomMarkedAbelianGroup<I>> {
        self.adjoint(&self.r_domain, &self.l_domain, |a, b, k| [b, a, k])
    }

    // Hom(Z/b, Z/c) ≅ Z/gcd(b, c) is generated by x ↦ (c / gcd(b, c))·x.
    fn adjoint<F>(&self, src: &MarkedAbelianGroup<I>, other: &MarkedAbelianGroup<I>, idx: F) -> Result<HomMarkedAbelianGroup<I>>
    where F: Fn(usize, usize, usize) -> [usize; 3] {
        let order = |g: &MarkedAbelianGroup<I>, i: usize| g.inv_fac(i).cloned().unwrap_or_else(I::zero);

        let (s, t, u) = (src.min_num_gens(), other.min_num_gens(), self.range.min_num_gens());

        // (order of the summand, multiplier of its generator), indexed by (j, k).
        let summands = (0..t).cartesian_product(0..u).map(|(j, k)| {
            let (b, c) = (order(other, j), order(&self.range, k));
            match (b.is_zero(), c.is_zero()) {
                (true,  true ) => (I::zero(), I::one()),
                (false, true ) => (I::one(), I::one()),
                (true,  false) => (c, I::one()),
                (false, false) => {
                    let h = I::gcd(&b, &c);
                    let m = &c / &h;
                    (h, m)
                }
            }
        }).collect_vec();

        let hom_group = MarkedAbelianGroup::compute(
            Mat::zero((1, t * u)),
            Mat::diag((t * u, t * u), summands.iter().map(|(h, _)| h.clone())),
            I::zero(),
            self.range.strategy()
        );

        let domain = MarkedAbelianGroup::from_invariant_factors(src.inv_facs(), src.rank());
        let matrix = Mat::from_fn((t * u, s), |r, i| {
            let (j, k) = (r / u, r % u);
            let (h, m) = &summands[r];
            if h.is_one() {
                I::zero()
            } else {
                &self.reduced[idx(i, j, k)] / m
            }
        });

        HomMarkedAbelianGroup::new(domain, hom_group, matrix)
    }

    /// Kawauchi–Kojima invariants, when `self` is a symmetric pairing of a
    /// finite group into `Z/n`, read as a linking form with values in `Q/Z`.
    pub fn linking_form_invariants(&self) -> Result<&LinkingFormInvariants<I>> {
        self.linking.get_or_init(|| self.compute_linking_form()).as_ref().map_err(|e| e.clone())
    }

    fn compute_linking_form(&self) -> Result<LinkingFormInvariants<I>> {
        let reason = if self.l_domain != self.r_domain {
            Some("left and right domains differ")
        } else if self.l_domain.rank() > 0 {
            Some("domain is not finite")
        } else if self.range.rank() > 0 || self.range.num_inv_facs() != 1 {
            Some("range is not cyclic of finite order")
        } else if !self.is_symmetric() {
            Some("form is not symmetric")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(Error::NotALinkingForm(reason.into()))
        }

        let n = self.range.inv_facs()[0].clone();
        let s = self.l_domain.min_num_gens();
        let lk = Mat::from_fn((s, s), |i, j|
            Ratio::new(self.reduced[[i, j, 0]].clone(), n.clone())
        );

        LinkingFormInvariants::compute(self.l_domain.inv_facs(), &lk)
    }
}

impl<I> Display for BilinearForm<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bilinear form: {} × {} -> {}", self.l_domain, self.r_domain, self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type G = MarkedAbelianGroup<i64>;
    type Form = BilinearForm<i64>;

    fn z_n(n: usize) -> G {
        G::free(n, 0)
    }

    // The form on Z^n given by the symmetric matrix a, valued in Z.
    fn matrix_form(n: usize, a: &[i64]) -> Form {
        let grid = SparseGrid::from_entries(
            (0..n).cartesian_product(0..n).map(|(i, j)| ([i, j, 0], a[i * n + j]))
        );
        Form::new(z_n(n), z_n(n), z_n(1), grid).unwrap()
    }

    fn torsion_form(orders: &[i64], n: i64, values: &[i64]) -> Form {
        let g = G::from_invariant_factors(orders, 0);
        let s = orders.len();
        let grid = SparseGrid::from_entries(
            (0..s).cartesian_product(0..s).map(|(i, j)| ([i, j, 0], values[i * s + j]))
        );
        Form::new(g.clone(), g, G::from_invariant_factors(&[n], 0), grid).unwrap()
    }

    #[test]
    fn eval() {
        let f = matrix_form(2, &[1, 2, 2, -3]);
        assert_eq!(f.eval_cc(&[1, 0], &[0, 1]), Ok(vec![2]));
        assert_eq!(f.eval_cc(&[1, 1], &[1, 1]), Ok(vec![2]));
        assert_eq!(f.eval_snf(&[0, 1], &[0, 1]), Ok(vec![-3]));
        assert!(matches!(f.eval_cc(&[1], &[1, 1]), Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn out_of_bounds() {
        let grid = SparseGrid::from_entries([([0, 2, 0], 1i64)]);
        let res = Form::new(z_n(2), z_n(2), z_n(1), grid);
        assert!(matches!(res, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn symmetry() {
        let f = matrix_form(2, &[1, 2, 2, -3]);
        assert!(f.is_symmetric());
        assert!(!f.is_anti_symmetric());

        let f = matrix_form(2, &[0, 1, -1, 0]);
        assert!(!f.is_symmetric());
        assert!(f.is_anti_symmetric());
    }

    #[test]
    fn rank_and_signature() {
        let f = matrix_form(3, &[1, 0, 0, 0, -1, 0, 0, 0, 0]);
        assert_eq!(f.rank(), Some(2));
        assert_eq!(f.signature(), Some(0));

        let f = matrix_form(2, &[2, 1, 1, 2]);
        assert_eq!(f.rank(), Some(2));
        assert_eq!(f.signature(), Some(2));

        let f = matrix_form(2, &[0, 1, 0, 0]);
        assert_eq!(f.signature(), None);

        let f = torsion_form(&[3], 3, &[1]);
        assert_eq!(f.rank(), None);
        assert_eq!(f.signature(), None);
    }

    #[test]
    fn torsion_anti_symmetry() {
        let f = torsion_form(&[2], 2, &[1]);
        assert!(f.is_symmetric());
        assert!(f.is_anti_symmetric());
    }

    #[test]
    fn image() {
        let f = matrix_form(2, &[2, 4, 4, 6]);
        let im = f.image().unwrap();
        assert!(im.is_z());

        let g = torsion_form(&[6], 6, &[2]);
        let im = g.image().unwrap();
        assert_eq!(im.inv_facs(), &[3]);
    }

    #[test]
    fn compositions() {
        let f = matrix_form(2, &[1, 0, 0, 1]);
        let g = HomMarkedAbelianGroup::new(z_n(2), z_n(2), Mat::from_data((2, 2), [1, 1, 0, 1])).unwrap();

        // (x, y) ↦ (gx)·y
        let fl = f.l_compose(&g).unwrap();
        assert_eq!(fl.eval_cc(&[0, 1], &[1, 0]), Ok(vec![1]));
        assert_eq!(fl.eval_cc(&[1, 0], &[0, 1]), Ok(vec![0]));

        let fr = f.r_compose(&g).unwrap();
        assert_eq!(fr.eval_cc(&[1, 0], &[0, 1]), Ok(vec![1]));

        let h = HomMarkedAbelianGroup::new(z_n(1), z_n(1), Mat::from_data((1, 1), [3])).unwrap();
        let fp = f.post_compose(&h).unwrap();
        assert_eq!(fp.eval_cc(&[1, 0], &[1, 0]), Ok(vec![3]));

        assert!(matches!(f.post_compose(&g), Err(Error::IncompatibleGroups(_))));
    }

    #[test]
    fn adjoint_free() {
        let f = matrix_form(2, &[1, 2, 2, -3]);
        let a = f.left_adjoint().unwrap();
        assert_eq!(a.range().rank(), 2);
        assert_eq!(a.reduced_matrix().shape(), (2, 2));
        assert!(a.is_monic());
        assert_eq!(a.cokernel().inv_facs(), &[7]);
    }

    #[test]
    fn adjoint_torsion() {
        // Z/3 × Z/3 → Z/3, (x, y) ↦ xy: the adjoint Z/3 → Hom(Z/3, Z/3) is an isomorphism.
        let f = torsion_form(&[3], 3, &[1]);
        let a = f.left_adjoint().unwrap();
        assert_eq!(a.range().inv_facs(), &[3]);
        assert!(a.is_iso());

        let b = f.right_adjoint().unwrap();
        assert!(b.is_iso());
    }

    #[test]
    fn adjoint_mixed_orders() {
        // Z/2 × Z/4 → Z/4, (x, y) ↦ 2xy: Hom(Z/4, Z/4) = Z/4, generated by the identity.
        let l = G::from_invariant_factors(&[2], 0);
        let r = G::from_invariant_factors(&[4], 0);
        let grid = SparseGrid::from_entries([([0, 0, 0], 2)]);
        let f = Form::new(l, r, G::from_invariant_factors(&[4], 0), grid).unwrap();

        let a = f.left_adjoint().unwrap();
        assert_eq!(a.range().inv_facs(), &[4]);
        assert!(a.is_monic());
        assert_eq!(a.cokernel().inv_facs(), &[2]);
    }

    #[test]
    fn linking_form() {
        let f = torsion_form(&[3], 3, &[1]);
        let kk = f.linking_form_invariants().unwrap();
        assert_eq!(kk.legendre_string(), "3(1)");

        let g = torsion_form(&[3], 3, &[2]);
        let kk = g.linking_form_invariants().unwrap();
        assert_eq!(kk.legendre_string(), "3(-1)");
    }

    #[test]
    fn not_a_linking_form() {
        let f = matrix_form(1, &[1]);
        assert!(matches!(f.linking_form_invariants(), Err(Error::NotALinkingForm(_))));
    }

    #[test]
    fn display() {
        let f = torsion_form(&[3], 3, &[1]);
        assert_eq!(f.to_string(), "bilinear form: (Z/3) × (Z/3) -> (Z/3)");
    }
}
