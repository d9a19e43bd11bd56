use std::fmt::Display;
use std::sync::OnceLock;
use itertools::Itertools;
use log::{info, debug};
use num_bigint::BigInt;
use num_traits::Zero;
use mab::{Integer, IntOps};
use mab_matrix::MatTrait;
use mab_matrix::dense::Mat;
use mab_matrix::dense::lattice;
use crate::{Error, Result, MarkedAbelianGroup};
use crate::error::ensure_len;

/// A homomorphism `domain → range` induced by a chain-level matrix
/// (rows indexed by the chains of `range`, columns by those of `domain`).
///
/// The action on SNF coordinates (the reduced matrix) is computed at
/// construction. Kernel, cokernel and image are computed on first access
/// and cached.
#[derive(Clone, Debug)]
pub struct HomMarkedAbelianGroup<I = BigInt> {
    domain: MarkedAbelianGroup<I>,
    range: MarkedAbelianGroup<I>,
    matrix: Mat<I>,
    reduced: Mat<I>,
    kernel_lattice: OnceLock<Mat<I>>,
    kernel: OnceLock<MarkedAbelianGroup<I>>,
    cokernel: OnceLock<MarkedAbelianGroup<I>>,
    image: OnceLock<MarkedAbelianGroup<I>>,
}

impl<I> HomMarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    pub fn new(domain: MarkedAbelianGroup<I>, range: MarkedAbelianGroup<I>, matrix: Mat<I>) -> Result<Self> {
        ensure_len(matrix.nrows(), range.rank_cc())?;
        ensure_len(matrix.ncols(), domain.rank_cc())?;

        let cols = (0 .. domain.min_num_gens()).map(|j| {
            let v = matrix.mul_vec(&domain.gen_rep(j));
            range.snf_rep(&v).map_err(|_| Error::NotACycleMap)
        }).collect::<Result<Vec<_>>>()?;

        let reduced = Mat::from_col_vecs(range.min_num_gens(), &cols);

        info!("hom: {domain} -> {range}");
        debug!("reduced matrix:\n{reduced}");

        Ok(Self {
            domain, range, matrix, reduced,
            kernel_lattice: OnceLock::new(),
            kernel: OnceLock::new(),
            cokernel: OnceLock::new(),
            image: OnceLock::new()
        })
    }

    /// The homomorphism acting by `reduced` on SNF coordinates, with a
    /// chain-level matrix synthesized through representatives.
    pub fn from_reduced(domain: MarkedAbelianGroup<I>, range: MarkedAbelianGroup<I>, reduced: &Mat<I>) -> Result<Self> {
        ensure_len(reduced.nrows(), range.min_num_gens())?;
        ensure_len(reduced.ncols(), domain.min_num_gens())?;

        // d·e_j = 0 must map to zero.
        for (j, d) in domain.inv_facs().iter().enumerate() {
            let col = reduced.col_vec(j).into_iter().map(|a| a * d).collect_vec();
            if range.reduce_snf(col).iter().any(|a| !a.is_zero()) {
                return Err(Error::NotRealizable)
            }
        }

        let lift = |v: &[I]| -> Result<Vec<I>> {
            let w = domain.snf_rep(v)?;
            range.cc_rep(&reduced.mul_vec(&w))
        };

        let k = domain.rank_cc();
        let p = domain.coeff();
        let q = domain.m_snf().q();
        let tor_loc = domain.tor_loc();

        // columns in the basis q of the domain chains.
        let mut cols = vec![vec![I::zero(); range.rank_cc()]; k];

        for (t, s) in domain.tor().iter().enumerate() {
            let i = tor_loc + t;
            let e = p / I::gcd(s, p);
            let v = q.col_vec(i).into_iter().map(|a| a * &e).collect_vec();
            let c = lift(&v)?;

            if c.iter().any(|a| !e.divides(a)) {
                return Err(Error::NotRealizable)
            }
            cols[i] = c.into_iter().map(|a| a / &e).collect();
        }

        for i in domain.rank_m() .. k {
            cols[i] = lift(&q.col_vec(i))?;
        }

        let matrix = &Mat::from_col_vecs(range.rank_cc(), &cols) * domain.m_snf().qinv();
        Self::new(domain, range, matrix)
    }

    /// The inclusion of the torsion subgroup into `group`.
    pub fn torsion_inclusion(group: &MarkedAbelianGroup<I>) -> Result<Self> {
        let t = group.num_inv_facs();
        let n = group.min_num_gens();
        let reduced = Mat::from_fn((n, t), |i, j| if i == j { I::one() } else { I::zero() });
        Self::from_reduced(group.torsion_subgroup(), group.clone(), &reduced)
    }

    pub fn domain(&self) -> &MarkedAbelianGroup<I> {
        &self.domain
    }

    pub fn range(&self) -> &MarkedAbelianGroup<I> {
        &self.range
    }

    pub fn matrix(&self) -> &Mat<I> {
        &self.matrix
    }

    pub fn reduced_matrix(&self) -> &Mat<I> {
        &self.reduced
    }

    /// Vectors in domain SNF coordinates mapped into the relation
    /// lattice of the range, as columns.
    pub fn reduced_kernel_lattice(&self) -> &Mat<I> {
        self.kernel_lattice.get_or_init(|| {
            let l = self.range.inv_facs().iter().cloned()
                .chain((0 .. self.range.rank()).map(|_| I::zero()))
                .collect_vec();
            lattice::preimage_of_lattice(&self.reduced, &l)
        })
    }

    pub fn kernel(&self) -> &MarkedAbelianGroup<I> {
        self.kernel.get_or_init(|| {
            let p = self.reduced_kernel_lattice();
            let s = p.ncols();
            let rels = self.domain_relations();
            let n = lattice::coords_in(p, &rels);
            MarkedAbelianGroup::compute(Mat::zero((1, s)), n, I::zero(), self.domain.strategy())
        })
    }

    pub fn cokernel(&self) -> &MarkedAbelianGroup<I> {
        self.cokernel.get_or_init(|| {
            let r = self.range.min_num_gens();
            let facs = self.range.inv_facs();
            let t = facs.len();
            let rels = Mat::from_fn((r, t), |i, j| if i == j { facs[j].clone() } else { I::zero() });
            let n = self.reduced.concat(&rels);
            MarkedAbelianGroup::compute(Mat::zero((1, r)), n, I::zero(), self.range.strategy())
        })
    }

    pub fn image(&self) -> &MarkedAbelianGroup<I> {
        self.image.get_or_init(|| {
            let d = self.domain.min_num_gens();
            let n = self.reduced_kernel_lattice().clone();
            MarkedAbelianGroup::compute(Mat::zero((1, d)), n, I::zero(), self.domain.strategy())
        })
    }

    // d_j e_j for the torsion generators of the domain.
    fn domain_relations(&self) -> Mat<I> {
        let d = self.domain.min_num_gens();
        let facs = self.domain.inv_facs();
        Mat::from_fn((d, facs.len()), |i, j| if i == j { facs[j].clone() } else { I::zero() })
    }

    pub fn is_monic(&self) -> bool {
        self.kernel().is_trivial()
    }

    pub fn is_epic(&self) -> bool {
        self.cokernel().is_trivial()
    }

    pub fn is_iso(&self) -> bool {
        self.is_monic() && self.is_epic()
    }

    pub fn is_zero(&self) -> bool {
        self.image().is_trivial()
    }

    pub fn is_identity(&self) -> bool {
        self.domain == self.range && self.reduced.is_id()
    }

    /// Whether every cycle of the domain is sent to a cycle of the range.
    pub fn is_cycle_map(&self) -> bool {
        self.domain.cycle_basis().iter().all(|v|
            self.range.is_cycle(&self.matrix.mul_vec(v))
        )
    }

    /// Given the square
    ///
    /// ```text
    ///   C_n   --M₁-->  C_{n-1}
    ///    ^               ^
    ///    | self          | other
    ///   D_n   --M₂-->  D_{n-1}
    /// ```
    ///
    /// where `M₁, M₂` are the `M` of the range and domain of `self`, checks
    /// that they are the `N` of the range and domain of `other` and that
    /// the square commutes.
    pub fn is_chain_map(&self, other: &Self) -> bool {
        self.range.m() == other.range.n()
            && self.domain.m() == other.domain.n()
            && self.range.m() * &self.matrix == &other.matrix * self.domain.m()
    }

    /// Image of the cycle `v` at the chain level.
    pub fn eval_cc(&self, v: &[I]) -> Result<Vec<I>> {
        ensure_len(v.len(), self.domain.rank_cc())?;

        if !self.domain.is_cycle(v) {
            return Err(Error::NotACycle)
        }

        let c = self.range.coeff();
        Ok(self.matrix.mul_vec(v).into_iter().map(|a| a.rem_norm(c)).collect())
    }

    /// Image of an element given in SNF coordinates.
    pub fn eval_snf(&self, w: &[I]) -> Result<Vec<I>> {
        ensure_len(w.len(), self.domain.min_num_gens())?;
        Ok(self.range.reduce_snf(self.reduced.mul_vec(w)))
    }

    /// The composition `self ∘ other`.
    pub fn compose(&self, other: &Self) -> Result<Self> {
        if other.range != self.domain {
            return Err(Error::IncompatibleGroups(
                format!("range {} is not the domain {}", other.range, self.domain)
            ))
        }

        let matrix = &self.matrix * &other.matrix;
        Self::new(other.domain.clone(), self.range.clone(), matrix)
    }

    /// The inverse of an isomorphism.
    ///
    /// The reduced matrix of an isomorphism has the block form
    ///
    /// ```text
    ///   [ A | B ]    A: torsion automorphism, D: free automorphism
    ///   [ 0 | D ]
    /// ```
    ///
    /// and its inverse is `[ A⁻¹ | -A⁻¹ B D⁻¹ ; 0 | D⁻¹ ]`.
    pub fn inverse_hom(&self) -> Result<Self> {
        if !self.is_iso() {
            return Err(Error::NotInvertible)
        }

        let facs = self.domain.inv_facs();
        let t = facs.len();
        let n = self.domain.min_num_gens();

        let a = self.reduced.submat(0..t, 0..t);
        let b = self.reduced.submat(0..t, t..n);
        let d = self.reduced.submat(t..n, t..n);

        let d_inv = lattice::inv_unimodular(&d).ok_or(Error::NotInvertible)?;
        let a_inv = lattice::torsion_aut_inverse(&a, facs, |x, m| x.rem_norm(m))
            .ok_or(Error::NotInvertible)?;

        let mut b_inv = -(&(&a_inv * &b) * &d_inv);
        for i in 0..t {
            for j in 0 .. n - t {
                b_inv[(i, j)] = b_inv[(i, j)].rem_norm(&facs[i]);
            }
        }

        let inv = Mat::from_fn((n, n), |i, j|
            match (i < t, j < t) {
                (true, true)   => a_inv[(i, j)].clone(),
                (true, false)  => b_inv[(i, j - t)].clone(),
                (false, true)  => I::zero(),
                (false, false) => d_inv[(i - t, j - t)].clone(),
            }
        );

        Self::from_reduced(self.range.clone(), self.domain.clone(), &inv)
    }

    /// The reduced matrix with its domain and range.
    pub fn reduced_matrix_text(&self) -> String {
        let (m, n) = self.reduced.shape();
        let rows = (0..m).map(|i|
            format!("[{}]", (0..n).map(|j| &self.reduced[(i, j)]).join(" "))
        ).join("\n");

        format!(
            "reduced matrix is {m} by {n} corresponding to domain {} and range {}\n{rows}",
            self.domain, self.range
        )
    }
}

impl<I> Display for HomMarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_iso() {
            write!(f, "isomorphism")
        } else if self.is_zero() {
            write!(f, "zero map")
        } else if self.is_monic() {
            write!(f, "monic, with cokernel {}", self.cokernel())
        } else if self.is_epic() {
            write!(f, "epic, with kernel {}", self.kernel())
        } else {
            write!(f, "kernel {} | cokernel {} | image {}", self.kernel(), self.cokernel(), self.image())
        }
    }
}
