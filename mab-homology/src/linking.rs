//! Kawauchi–Kojima invariants of torsion linking forms.
//!
//! A linking form `A × A → Q/Z` on a finite abelian group splits
//! orthogonally into its `p`-primary parts. The form is classified by
//!
//! - the ranks `r_k` of the `Z/p^k` summands, for each prime `p`,
//! - for `p = 2`, the angles of the Gauss sums
//!   `Σₓ exp(2πi·2^{k-1}·lk(x, x))` in multiples of `π/4`
//!   (`8` when the sum vanishes),
//! - for odd `p`, the Legendre symbol of the determinant of the form
//!   induced on the `Z/p^k` summands, read modulo `p`.
//!
//! Reversing the orientation negates the angles modulo 8 (fixing 8),
//! and flips a Legendre symbol exactly when `r_k` is odd and `p ≡ 3 mod 4`.
//!
//! The Gauss sums enumerate the whole 2-primary part, so its order is
//! limited to `2^MAX_TWO_EXPONENT`.

use std::f64::consts::PI;
use itertools::Itertools;
use log::debug;
use num_bigint::BigInt;
use num_traits::{One, Zero};
use mab::{Integer, IntOps, Ratio, factorize, valuation, pow, pow_mod, legendre};
use mab_matrix::MatTrait;
use mab_matrix::dense::Mat;
use crate::{Error, Result};

/// Upper bound on `log₂` of the order of the 2-primary part.
pub const MAX_TWO_EXPONENT: usize = 20;

/// The restriction of a linking form to its `p`-primary part, on
/// generators of order `p^{e}` sorted by exponent.
#[derive(Clone, derive_more::Debug)]
#[debug(bound(I: std::fmt::Debug + std::fmt::Display + One + PartialEq))]
pub struct PrimaryPart<I = BigInt> {
    prime: I,
    exponents: Vec<usize>,
    form: Mat<Ratio<I>>,
}

impl<I> PrimaryPart<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    pub fn prime(&self) -> &I {
        &self.prime
    }

    pub fn exponents(&self) -> &[usize] {
        &self.exponents
    }

    /// Values in `[0, 1)`.
    pub fn form(&self) -> &Mat<Ratio<I>> {
        &self.form
    }

    pub fn max_exponent(&self) -> usize {
        self.exponents.iter().max().copied().unwrap_or(0)
    }

    /// `r_k`, the number of `Z/p^k` summands, for `k = 1 ..= max`.
    pub fn ranks(&self) -> Vec<usize> {
        (1 ..= self.max_exponent()).map(|k|
            self.exponents.iter().filter(|&&e| e == k).count()
        ).collect()
    }

    fn q(&self, x: &[I]) -> Ratio<I> {
        let n = x.len();
        (0..n).flat_map(|a| (0..n).map(move |b| (a, b))).map(|(a, b)|
            &self.form[(a, b)] * &Ratio::from_numer(&x[a] * &x[b])
        ).sum()
    }
}

#[derive(Clone, derive_more::Debug)]
#[debug(bound(I: std::fmt::Debug + std::fmt::Display + One + PartialEq))]
pub struct LinkingFormInvariants<I = BigInt> {
    primary: Vec<PrimaryPart<I>>,
    sigma: Vec<u8>,
    legendre: Vec<(I, Vec<i8>)>,
    split: bool,
    hyperbolic: bool,
    two_torsion: bool,
}

impl<I> LinkingFormInvariants<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    /// Invariants of the form with `lk[(i, j)]` pairing generators of
    /// `⊕ Z/orders[i]`.
    pub fn compute(orders: &[I], lk: &Mat<Ratio<I>>) -> Result<Self> {
        let n = orders.len();

        if lk.shape() != (n, n) {
            return Err(Error::NotALinkingForm(format!("form is {:?}, expected {n} by {n}", lk.shape())))
        }
        if orders.iter().any(|d| !d.is_positive()) {
            return Err(Error::NotALinkingForm("group is not finite".into()))
        }
        for i in 0..n {
            for j in 0..n {
                if !(&lk[(i, j)] - &lk[(j, i)]).is_integral() {
                    return Err(Error::NotALinkingForm("form is not symmetric".into()))
                }
                if !(&lk[(i, j)] * &Ratio::from_numer(orders[i].clone())).is_integral() {
                    return Err(Error::NotALinkingForm(format!("value at ({i}, {j}) is not annihilated by {}", orders[i])))
                }
            }
        }

        let primes = orders.iter()
            .flat_map(|d| factorize(d).into_iter().map(|(p, _)| p))
            .sorted()
            .dedup()
            .collect_vec();

        let primary = primes.into_iter().map(|p| Self::primary_part(orders, lk, p)).collect_vec();

        let two = I::from(2);
        let sigma = primary.iter().find(|pp| pp.prime == two).map(Self::sigma_vector).transpose()?.unwrap_or_default();
        let legendre = primary.iter().filter(|pp| pp.prime != two).map(|pp|
            (pp.prime.clone(), Self::legendre_vector(pp))
        ).collect_vec();

        let split = primary.iter().all(|pp| pp.ranks().iter().all(|r| r % 2 == 0))
            && sigma.iter().all(|&s| s == 0 || s == 8)
            && primary.iter().zip_eq(Self::legendre_slots(&primary, &legendre)).all(|(pp, l)|
                l.map(|l| Self::is_split_legendre(pp, l)).unwrap_or(true)
            );
        let hyperbolic = split && sigma.iter().all(|&s| s == 0);
        let two_torsion = primary.iter().find(|pp| pp.prime == two).map(Self::two_torsion_condition).unwrap_or(true);

        let res = Self { primary, sigma, legendre, split, hyperbolic, two_torsion };

        debug!("linking form: ranks {}, sigma {}, legendre {}", res.rank_string(), res.sigma_string(), res.legendre_string());

        Ok(res)
    }

    fn primary_part(orders: &[I], lk: &Mat<Ratio<I>>, p: I) -> PrimaryPart<I> {
        // (exponent, index, cofactor)
        let gens = orders.iter().enumerate().filter_map(|(i, d)| {
            let v = valuation(d, &p);
            (v > 0).then(|| (v, i, d / pow(&p, v)))
        }).sorted_by_key(|(v, i, _)| (*v, *i)).collect_vec();

        let m = gens.len();
        let form = Mat::from_fn((m, m), |a, b| {
            let (_, i, ci) = &gens[a];
            let (_, j, cj) = &gens[b];
            (&lk[(*i, *j)] * &Ratio::from_numer(ci * cj)).fract()
        });
        let exponents = gens.into_iter().map(|(v, _, _)| v).collect();

        PrimaryPart { prime: p, exponents, form }
    }

    fn sigma_vector(pp: &PrimaryPart<I>) -> Result<Vec<u8>> {
        let total: usize = pp.exponents.iter().sum();
        if total > MAX_TWO_EXPONENT {
            return Err(Error::NotALinkingForm(format!("2-primary part of order 2^{total} exceeds 2^{MAX_TWO_EXPONENT}")))
        }

        let elems = pp.exponents.iter().map(|&e| 0 .. (1usize << e)).multi_cartesian_product().map(|x|
            x.into_iter().map(I::from_usize_).collect_vec()
        ).collect_vec();

        let qs = elems.iter().map(|x| pp.q(x)).collect_vec();

        let sigma = (1 ..= pp.max_exponent()).map(|k| {
            let c = Ratio::from_numer(pow(&I::from(2), k - 1));
            let (re, im) = qs.iter().fold((0f64, 0f64), |(re, im), q| {
                let t = 2.0 * PI * (&c * q).fract().to_f64();
                (re + t.cos(), im + t.sin())
            });

            if re.hypot(im) < 0.5 {
                8
            } else {
                let a = (im.atan2(re) / (PI / 4.0)).round() as i64;
                a.rem_euclid(8) as u8
            }
        }).collect();

        Ok(sigma)
    }

    fn legendre_vector(pp: &PrimaryPart<I>) -> Vec<i8> {
        let p = &pp.prime;
        (1 ..= pp.max_exponent()).map(|k| {
            let block = pp.exponents.iter().positions(|&e| e == k).collect_vec();
            if block.is_empty() {
                return 1
            }

            let pk = Ratio::from_numer(pow(p, k));
            let m = block.iter().map(|&a|
                block.iter().map(|&b|
                    (&pp.form[(a, b)] * &pk).numer().rem_norm(p)
                ).collect_vec()
            ).collect_vec();

            legendre(&det_mod(m, p), p)
        }).collect()
    }

    // Aligns the odd Legendre vectors with the primary parts.
    fn legendre_slots<'a>(primary: &[PrimaryPart<I>], legendre: &'a [(I, Vec<i8>)]) -> Vec<Option<&'a Vec<i8>>> {
        primary.iter().map(|pp|
            legendre.iter().find(|(p, _)| p == &pp.prime).map(|(_, l)| l)
        ).collect()
    }

    // the Legendre symbol of a hyperbolic form of rank r is (-1 | p)^{r/2}.
    fn is_split_legendre(pp: &PrimaryPart<I>, l: &[i8]) -> bool {
        let four = I::from(4);
        let minus_one_is_square = pp.prime.rem_norm(&four).is_one();

        pp.ranks().iter().zip(l).all(|(&r, &l)| {
            let expected = if !minus_one_is_square && (r / 2) % 2 == 1 { -1 } else { 1 };
            r == 0 || l == expected
        })
    }

    // 2^{k-1}·lk(x, x) ∈ Z for every x of order dividing 2^k.
    fn two_torsion_condition(pp: &PrimaryPart<I>) -> bool {
        let two = I::from(2);
        (1 ..= pp.max_exponent()).all(|k| {
            let c = Ratio::from_numer(pow(&two, k - 1));
            pp.exponents.iter().enumerate().all(|(a, &e)| {
                let y = Ratio::from_numer(pow(&two, e.saturating_sub(k)));
                (&(&(&y * &y) * &pp.form[(a, a)]) * &c).is_integral()
            })
        })
    }

    pub fn primary_parts(&self) -> &[PrimaryPart<I>] {
        &self.primary
    }

    /// Angles in multiples of `π/4` for `k = 1 ..= max 2-exponent`,
    /// `8` for a vanishing sum.
    pub fn sigma(&self) -> &[u8] {
        &self.sigma
    }

    /// Legendre symbols for `k = 1 ..= max exponent`, per odd prime.
    pub fn legendre(&self) -> &[(I, Vec<i8>)] {
        &self.legendre
    }

    pub fn is_split(&self) -> bool {
        self.split
    }

    pub fn is_hyperbolic(&self) -> bool {
        self.hyperbolic
    }

    pub fn two_torsion_condition_holds(&self) -> bool {
        self.two_torsion
    }

    /// e.g. `2(0 1) 3(1)`.
    pub fn rank_string(&self) -> String {
        if self.primary.is_empty() {
            return "no torsion".into()
        }
        self.primary.iter().map(|pp|
            format!("{}({})", pp.prime, pp.ranks().iter().join(" "))
        ).join(" ")
    }

    /// e.g. `1 inf`.
    pub fn sigma_string(&self) -> String {
        if self.sigma.is_empty() {
            return "no 2-torsion".into()
        }
        self.sigma.iter().map(|&s|
            if s == 8 { "inf".to_string() } else { s.to_string() }
        ).join(" ")
    }

    /// e.g. `3(1) 5(-1 1)`.
    pub fn legendre_string(&self) -> String {
        if self.legendre.is_empty() {
            return "no odd p-torsion".into()
        }
        self.legendre.iter().map(|(p, l)|
            format!("{p}({})", l.iter().join(" "))
        ).join(" ")
    }
}

// Determinant over Z/p, p prime.
fn det_mod<I>(mut m: Vec<Vec<I>>, p: &I) -> I
where I: Integer, for<'x> &'x I: IntOps<I> {
    let n = m.len();
    let e = p - I::from(2);
    let mut det = I::one();

    for k in 0..n {
        let Some(i) = (k..n).find(|&i| !m[i][k].is_zero()) else {
            return I::zero()
        };
        if i != k {
            m.swap(i, k);
            det = -det;
        }

        let u = m[k][k].clone();
        let u_inv = pow_mod(&u, &e, p);
        det = (det * &u).rem_norm(p);

        for i in k + 1 .. n {
            if m[i][k].is_zero() { continue }
            let f = (&m[i][k] * &u_inv).rem_norm(p);
            for j in k..n {
                let a = &m[i][j] - &(&f * &m[k][j]);
                m[i][j] = a.rem_norm(p);
            }
        }
    }

    det.rem_norm(p)
}
