use std::cmp::min;
use std::fmt::Display;
use std::iter::repeat;
use itertools::Itertools;
use log::info;
use num_bigint::BigInt;
use num_traits::{One, Signed};
use mab::{Integer, IntOps, EucRing};
use mab::util::format::{superscript, direct_sum};
use mab_matrix::MatTrait;
use mab_matrix::dense::{Mat, SnfStrategy, SnfTrans, snf_trans};
use mab_matrix::dense::lattice;
use crate::{Error, Result};
use crate::error::ensure_len;

/// A finitely generated abelian group `ker M / im N`, presented by a
/// chain complex `Z^l --N--> Z^k --M--> Z^j` (optionally with
/// coefficients in `Z/p`), together with the change-of-basis data
/// relating chains to the Smith normal form coordinates of the group.
///
/// ```text
///            N                M
///   Z^l  -------->  Z^k  -------->  Z^j
///                    |
///                   q⁻¹     (first r = rank M coordinates vanish on cycles)
///                    v
///             [ 0 | ORN ]   (ORN = rows r.. of q⁻¹ N)
/// ```
///
/// SNF coordinates list the torsion summands `Z/d₀, Z/d₁, …`
/// (`d₀ | d₁ | …`, each `dᵢ > 1`) first, then the free summands.
#[derive(Clone, Debug)]
pub struct MarkedAbelianGroup<I = BigInt> {
    m: Mat<I>,
    n: Mat<I>,
    coeff: I,
    strategy: SnfStrategy,

    m_snf: SnfTrans<I>,
    rank_m: usize,
    reduction: Reduction<I>,

    // SNF of ORN (integral case) or of the diagonal presentation (mod p).
    orn: SnfTrans<I>,
    inv_facs: Vec<I>,
    if_loc: usize,
    snf_rank: usize,
    snf_free_index: usize,
}

#[derive(Clone, Debug)]
enum Reduction<I> {
    Integral,
    ModP {
        // diagonal entries of SNF(M) not coprime to p, a suffix of the nonzero ones.
        tor: Vec<I>,
        tor_loc: usize,
        // SNF of [ORN | pI].
        tensor: SnfTrans<I>,
        tensor_if_loc: usize,
    }
}

impl<I> MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    pub fn new(m: Mat<I>, n: Mat<I>) -> Result<Self> {
        Self::new_with_coeff(m, n, I::zero())
    }

    pub fn new_with_coeff(m: Mat<I>, n: Mat<I>, coeff: I) -> Result<Self> {
        Self::new_with_strategy(m, n, coeff, SnfStrategy::default())
    }

    pub fn new_with_strategy(m: Mat<I>, n: Mat<I>, coeff: I, strategy: SnfStrategy) -> Result<Self> {
        ensure_len(n.nrows(), m.ncols())?;

        // M·N = 0 over Z, also for p > 0.
        if !(&m * &n).is_zero() {
            return Err(Error::NotAChainComplex)
        }

        Ok(Self::compute(m, n, coeff.abs(), strategy))
    }

    /// `Z^rank` for `p = 0`, `(Z/p)^rank` otherwise.
    pub fn free(rank: usize, p: I) -> Self {
        let p = p.abs();
        let n = Mat::diag((rank, rank), repeat(p).take(rank));
        Self::compute(Mat::zero((rank, rank)), n, I::zero(), SnfStrategy::default())
    }

    /// The group `Z^rank ⊕ ⊕ Z/tors[i]`, presented in its own SNF coordinates.
    pub fn from_invariant_factors(tors: &[I], rank: usize) -> Self {
        let k = tors.len() + rank;
        let n = Mat::diag((k, k), tors.iter().cloned());
        Self::compute(Mat::zero((1, k)), n, I::zero(), SnfStrategy::default())
    }

    pub(crate) fn compute(m: Mat<I>, n: Mat<I>, coeff: I, strategy: SnfStrategy) -> Self {
        let cc = m.ncols();
        let m_snf = snf_trans(&m, strategy);
        let rank_m = m_snf.rank();

        let orn_mat = (m_snf.qinv() * &n).submat_rows(rank_m .. cc);
        let k = orn_mat.nrows();

        let (reduction, orn, if_loc, inv_facs, snf_rank) = if coeff.is_zero() {
            let orn = snf_trans(&orn_mat, strategy);
            let diag = (0 .. min(k, orn_mat.ncols())).map(|i| orn.diag(i)).collect_vec();

            let if_loc = diag.iter().filter(|d| d.is_one()).count();
            let inv_facs = diag.into_iter().filter(|d| !d.is_zero() && !d.is_one()).collect_vec();
            let snf_rank = k - if_loc - inv_facs.len();

            (Reduction::Integral, orn, if_loc, inv_facs, snf_rank)
        } else {
            let p = &coeff;
            let tor = (0..rank_m).map(|i| m_snf.diag(i)).filter(|s| !I::gcd(s, p).is_one()).collect_vec();
            let tor_loc = rank_m - tor.len();

            let tensor_mat = orn_mat.concat(&Mat::diag((k, k), repeat(p.clone()).take(k)));
            let tensor = snf_trans(&tensor_mat, strategy);
            let tensor_diag = (0..k).map(|i| tensor.diag(i)).collect_vec();
            let tensor_if_loc = tensor_diag.iter().filter(|d| d.is_one()).count();

            let pres = tor.iter().map(|s| I::gcd(s, p))
                .chain(tensor_diag[tensor_if_loc..].iter().cloned())
                .collect_vec();
            let l = pres.len();
            let orn = snf_trans(&Mat::diag((l, l), pres), strategy);
            let diag = (0..l).map(|i| orn.diag(i)).collect_vec();

            let if_loc = diag.iter().filter(|d| d.is_one()).count();
            let inv_facs = diag[if_loc..].to_vec();

            let reduction = Reduction::ModP { tor, tor_loc, tensor, tensor_if_loc };
            (reduction, orn, if_loc, inv_facs, 0)
        };

        let snf_free_index = if_loc + inv_facs.len();
        let res = Self {
            m, n, coeff, strategy,
            m_snf, rank_m, reduction,
            orn, inv_facs, if_loc, snf_rank, snf_free_index
        };

        info!("marked group: {res}, chains: {}, coeff: {}", cc, res.coeff);

        res
    }

    pub fn m(&self) -> &Mat<I> {
        &self.m
    }

    pub fn n(&self) -> &Mat<I> {
        &self.n
    }

    pub fn coeff(&self) -> &I {
        &self.coeff
    }

    pub fn strategy(&self) -> SnfStrategy {
        self.strategy
    }

    /// Rank of the free part.
    pub fn rank(&self) -> usize {
        self.snf_rank
    }

    pub fn inv_facs(&self) -> &[I] {
        &self.inv_facs
    }

    pub fn num_inv_facs(&self) -> usize {
        self.inv_facs.len()
    }

    pub fn inv_fac(&self, i: usize) -> Option<&I> {
        self.inv_facs.get(i)
    }

    pub fn min_num_gens(&self) -> usize {
        self.inv_facs.len() + self.snf_rank
    }

    /// Rank of the chain group `Z^k`.
    pub fn rank_cc(&self) -> usize {
        self.m.ncols()
    }

    pub fn rank_m(&self) -> usize {
        self.rank_m
    }

    pub(crate) fn m_snf(&self) -> &SnfTrans<I> {
        &self.m_snf
    }

    /// Diagonal entries of SNF(M) sharing a factor with the coefficient.
    /// Empty for integral coefficients.
    pub fn tor(&self) -> &[I] {
        match &self.reduction {
            Reduction::Integral => &[],
            Reduction::ModP { tor, .. } => tor
        }
    }

    /// Index of the first entry of [`Self::tor`] on the diagonal of SNF(M).
    pub fn tor_loc(&self) -> usize {
        match &self.reduction {
            Reduction::Integral => self.rank_m,
            Reduction::ModP { tor_loc, .. } => *tor_loc
        }
    }

    /// Chains spanning the cycles of the presentation, modulo
    /// `p`-multiples when the coefficient is `p > 0`.
    pub fn cycle_basis(&self) -> Vec<Vec<I>> {
        let q = self.m_snf.q();
        let p = &self.coeff;
        let tor_loc = self.tor_loc();

        let tors = self.tor().iter().enumerate().map(|(t, s)| {
            let e = p / I::gcd(s, p);
            q.col_vec(tor_loc + t).into_iter().map(|a| a * &e).collect_vec()
        });
        let frees = (self.rank_m .. self.rank_cc()).map(|j| q.col_vec(j));

        tors.chain(frees).collect()
    }

    /// Number of invariant factors divisible by `d`.
    pub fn torsion_rank(&self, d: &I) -> usize {
        self.inv_facs.iter().filter(|f| d.divides(f)).count()
    }

    pub fn is_trivial(&self) -> bool {
        self.snf_rank == 0 && self.inv_facs.is_empty()
    }

    pub fn is_z(&self) -> bool {
        self.snf_rank == 1 && self.inv_facs.is_empty()
    }

    pub fn is_free(&self) -> bool {
        self.inv_facs.is_empty()
    }

    pub fn is_isomorphic_to(&self, other: &Self) -> bool {
        self.snf_rank == other.snf_rank && self.inv_facs == other.inv_facs
    }

    pub fn torsion_subgroup(&self) -> Self {
        Self::from_invariant_factors(&self.inv_facs, 0)
    }

    /// A chain representing the `i`-th free generator.
    pub fn free_rep(&self, i: usize) -> Option<Vec<I>> {
        (i < self.snf_rank).then(|| self.gen_rep(self.inv_facs.len() + i))
    }

    /// A chain representing the `i`-th torsion generator.
    pub fn torsion_rep(&self, i: usize) -> Option<Vec<I>> {
        (i < self.inv_facs.len()).then(|| self.gen_rep(i))
    }

    // representative of the i-th SNF generator, torsion ones first.
    pub(crate) fn gen_rep(&self, i: usize) -> Vec<I> {
        let w = (0 .. self.min_num_gens()).map(|j| if i == j { I::one() } else { I::zero() }).collect_vec();
        self.cc_rep_unchecked(&w)
    }

    pub fn is_cycle(&self, v: &[I]) -> bool {
        v.len() == self.rank_cc() && self.m.mul_vec(v).iter().all(|a| self.reduce_coeff(a).is_zero())
    }

    /// `M v`, reduced modulo the coefficient.
    pub fn bdry_map(&self, v: &[I]) -> Result<Vec<I>> {
        ensure_len(v.len(), self.rank_cc())?;
        Ok(self.m.mul_vec(v).iter().map(|a| self.reduce_coeff(a)).collect())
    }

    pub fn is_boundary(&self, v: &[I]) -> bool {
        self.snf_rep(v).is_ok_and(|w| w.iter().all(|a| a.is_zero()))
    }

    /// SNF coordinates of the class of the cycle `v`,
    /// torsion coordinates reduced into `[0, dᵢ)`.
    pub fn snf_rep(&self, v: &[I]) -> Result<Vec<I>> {
        ensure_len(v.len(), self.rank_cc())?;

        let temp = self.m_snf.qinv().mul_vec(v);
        let r = self.rank_m;

        let res = match &self.reduction {
            Reduction::Integral => {
                if temp[..r].iter().any(|a| !a.is_zero()) {
                    return Err(Error::NotACycle)
                }

                let tail = &temp[r..];
                (self.if_loc .. self.snf_free_index + self.snf_rank).map(|i|
                    row_dot(self.orn.p(), i, tail)
                ).collect_vec()
            },

            Reduction::ModP { tor, tor_loc, tensor, tensor_if_loc } => {
                let p = &self.coeff;
                if temp[..*tor_loc].iter().any(|a| !a.rem_norm(p).is_zero()) {
                    return Err(Error::NotACycle)
                }

                let mut pres_v = Vec::with_capacity(self.orn.result().nrows());

                for (t, s) in tor.iter().enumerate() {
                    let a = &temp[tor_loc + t];
                    if !(a * s).rem_norm(p).is_zero() {
                        return Err(Error::NotACycle)
                    }
                    let e = p / I::gcd(s, p);
                    pres_v.push(a / e);
                }

                let tail = tensor.p().mul_vec(&temp[r..]);
                pres_v.extend(tail[*tensor_if_loc..].iter().cloned());

                (self.if_loc .. self.snf_free_index).map(|i|
                    row_dot(self.orn.p(), i, &pres_v)
                ).collect_vec()
            }
        };

        Ok(self.reduce_snf(res))
    }

    /// A cycle representing the class with SNF coordinates `w`.
    pub fn cc_rep(&self, w: &[I]) -> Result<Vec<I>> {
        ensure_len(w.len(), self.min_num_gens())?;
        Ok(self.cc_rep_unchecked(w))
    }

    fn cc_rep_unchecked(&self, w: &[I]) -> Vec<I> {
        let r = self.rank_m;
        let cc = self.rank_cc();
        let mut temp = vec![I::zero(); cc];

        // x = P⁻¹ (0, w)
        let pinv = self.orn.pinv();
        let x = (0 .. pinv.nrows()).map(|j|
            w.iter().enumerate().map(|(i, a)| &pinv[(j, self.if_loc + i)] * a).sum::<I>()
        ).collect_vec();

        match &self.reduction {
            Reduction::Integral => {
                for (j, a) in x.into_iter().enumerate() {
                    temp[r + j] = a;
                }
                self.m_snf.q().mul_vec(&temp)
            },

            Reduction::ModP { tor, tor_loc, tensor, tensor_if_loc } => {
                let p = &self.coeff;
                let t = tor.len();

                for (i, s) in tor.iter().enumerate() {
                    let e = p / I::gcd(s, p);
                    temp[tor_loc + i] = &x[i] * e;
                }

                let y = &x[t..];
                let tpinv = tensor.pinv();
                for j in 0 .. cc - r {
                    temp[r + j] = y.iter().enumerate().map(|(i, a)|
                        &tpinv[(j, tensor_if_loc + i)] * a
                    ).sum();
                }

                self.m_snf.q().mul_vec(&temp).iter().map(|a| a.rem_norm(p)).collect()
            }
        }
    }

    /// A vector `u` with `N u = v` (modulo the coefficient).
    pub fn write_as_boundary(&self, v: &[I]) -> Result<Vec<I>> {
        ensure_len(v.len(), self.rank_cc())?;

        if let Reduction::ModP { .. } = self.reduction {
            let cc = self.rank_cc();
            let p = &self.coeff;
            let aug = self.n.concat(&Mat::diag((cc, cc), repeat(p.clone()).take(cc)));
            let x = lattice::solve(&aug, v).ok_or(Error::NotABoundary)?;
            return Ok(x[.. self.n.ncols()].to_vec())
        }

        let temp = self.m_snf.qinv().mul_vec(v);
        let r = self.rank_m;

        if temp[..r].iter().any(|a| !a.is_zero()) {
            return Err(Error::NotABoundary)
        }

        let c = self.orn.p().mul_vec(&temp[r..]);
        let mut y = vec![I::zero(); self.n.ncols()];

        for (i, c) in c.into_iter().enumerate() {
            let d = self.orn.diag(i);
            if d.is_zero() {
                if !c.is_zero() {
                    return Err(Error::NotABoundary)
                }
            } else if d.divides(&c) {
                y[i] = c / d;
            } else {
                return Err(Error::NotABoundary)
            }
        }

        Ok(self.orn.q().mul_vec(&y))
    }

    fn reduce_coeff(&self, a: &I) -> I {
        a.rem_norm(&self.coeff)
    }

    pub(crate) fn reduce_snf(&self, mut w: Vec<I>) -> Vec<I> {
        for (a, d) in w.iter_mut().zip(self.inv_facs.iter()) {
            *a = a.rem_norm(d);
        }
        w
    }
}

fn row_dot<I>(a: &Mat<I>, i: usize, v: &[I]) -> I
where I: Integer, for<'x> &'x I: IntOps<I> {
    v.iter().enumerate().map(|(j, x)| &a[(i, j)] * x).sum()
}

impl<I> PartialEq for MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m && self.n == other.n && self.coeff == other.coeff
    }
}

impl<I> Eq for MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {}

impl<I> Display for MarkedAbelianGroup<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", group_symbol(self.snf_rank, &self.inv_facs))
    }
}

/// `Z³ ⊕ (Z/2)² ⊕ (Z/6)`, or `0` for the trivial group.
pub fn group_symbol<I>(rank: usize, tors: &[I]) -> String
where I: Display + PartialEq {
    let free = match rank {
        0 => None,
        1 => Some("Z".to_string()),
        r => Some(format!("Z{}", superscript(r as isize)))
    };

    let tors = tors.iter().dedup_with_count().map(|(r, t)|
        if r > 1 {
            format!("(Z/{t}){}", superscript(r as isize))
        } else {
            format!("(Z/{t})")
        }
    );

    direct_sum(free.into_iter().chain(tors), "0")
}
