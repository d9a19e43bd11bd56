use std::fmt::{Display, Debug};
use std::iter::{Sum, Product};
use std::ops::{Mul, Add, Sub, Neg, AddAssign, SubAssign, MulAssign, Div, DivAssign, Rem, RemAssign};
use num_traits::{Zero, One, ToPrimitive};
use auto_impl_ops::auto_ops;
use crate::{EucRing, EucRingOps, Elem, Mon, AddMon, AddGrp, AddMonOps, AddGrpOps, MonOps, RingOps, Ring, FieldOps, Field, Integer, IntOps};

/// A fraction `numer / denom` over an integer type.
/// Always reduced, with `denom > 0`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ratio<T> {
    numer: T,
    denom: T,
}

impl<T> Ratio<T> {
    pub fn numer(&self) -> &T {
        &self.numer
    }

    pub fn denom(&self) -> &T {
        &self.denom
    }
}

impl<T> Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    /// Panics if `denom` is zero.
    pub fn new(numer: T, denom: T) -> Self {
        assert!(!denom.is_zero(), "zero denominator");
        Self::reduced(numer, denom)
    }

    pub fn from_numer(numer: T) -> Self {
        Self { numer, denom: T::one() }
    }

    pub fn is_integral(&self) -> bool {
        self.denom.is_one()
    }

    pub fn is_positive(&self) -> bool {
        self.numer.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.numer.is_negative()
    }

    /// The representative in `[0, 1)` of the class in `Q/Z`.
    pub fn fract(&self) -> Self {
        let numer = self.numer.rem_norm(&self.denom);
        Self { numer, denom: self.denom.clone() }
    }

    pub fn to_f64(&self) -> f64 {
        match (self.numer.to_f64(), self.denom.to_f64()) {
            (Some(p), Some(q)) => p / q,
            _ => f64::NAN
        }
    }

    fn reduced(numer: T, denom: T) -> Self {
        if numer.is_zero() {
            return Self::zero()
        }

        let g = EucRing::gcd(&numer, &denom);
        let g = if denom.is_negative() { -g } else { g };

        Self { numer: &numer / &g, denom: &denom / &g }
    }
}

impl<T> From<i32> for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn from(i: i32) -> Self {
        Self::from_numer(T::from(i))
    }
}

impl<T> Default for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T> Display for Ratio<T>
where T: Display + One + PartialEq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom.is_one() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

impl<T> Debug for Ratio<T>
where T: Display + One + PartialEq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl<T> Zero for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn zero() -> Self {
        Self::from_numer(T::zero())
    }

    fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }
}

impl<T> One for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn one() -> Self {
        Self::from_numer(T::one())
    }

    fn is_one(&self) -> bool {
        self.numer.is_one() && self.denom.is_one()
    }
}

#[auto_ops]
impl<T> AddAssign<&Ratio<T>> for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn add_assign(&mut self, rhs: &Ratio<T>) {
        let numer = &self.numer * &rhs.denom + &rhs.numer * &self.denom;
        let denom = &self.denom * &rhs.denom;
        *self = Self::reduced(numer, denom)
    }
}

#[auto_ops]
impl<T> SubAssign<&Ratio<T>> for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn sub_assign(&mut self, rhs: &Ratio<T>) {
        let numer = &self.numer * &rhs.denom - &rhs.numer * &self.denom;
        let denom = &self.denom * &rhs.denom;
        *self = Self::reduced(numer, denom)
    }
}

impl<T> Neg for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Ratio { numer: -self.numer, denom: self.denom }
    }
}

impl<T> Neg for &Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    type Output = Ratio<T>;
    fn neg(self) -> Self::Output {
        Ratio { numer: -&self.numer, denom: self.denom.clone() }
    }
}

#[auto_ops]
impl<T> MulAssign<&Ratio<T>> for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn mul_assign(&mut self, rhs: &Ratio<T>) {
        let numer = &self.numer * &rhs.numer;
        let denom = &self.denom * &rhs.denom;
        *self = Self::reduced(numer, denom)
    }
}

#[auto_ops]
impl<T> DivAssign<&Ratio<T>> for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn div_assign(&mut self, rhs: &Ratio<T>) {
        assert!(!rhs.is_zero(), "division by zero");
        let numer = &self.numer * &rhs.denom;
        let denom = &self.denom * &rhs.numer;
        *self = Self::reduced(numer, denom)
    }
}

// Q is a field: every division is exact.
#[auto_ops]
impl<T> RemAssign<&Ratio<T>> for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn rem_assign(&mut self, rhs: &Ratio<T>) {
        assert!(!rhs.is_zero(), "division by zero");
        self.set_zero()
    }
}

impl<T> Sum for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn sum<It: Iterator<Item = Self>>(iter: It) -> Self {
        iter.fold(Self::zero(), |acc, r| acc + r)
    }
}

impl<'a, T> Sum<&'a Ratio<T>> for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn sum<It: Iterator<Item = &'a Self>>(iter: It) -> Self {
        iter.fold(Self::zero(), |acc, r| acc + r)
    }
}

impl<T> Product for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn product<It: Iterator<Item = Self>>(iter: It) -> Self {
        iter.fold(Self::one(), |acc, r| acc * r)
    }
}

impl<'a, T> Product<&'a Ratio<T>> for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn product<It: Iterator<Item = &'a Self>>(iter: It) -> Self {
        iter.fold(Self::one(), |acc, r| acc * r)
    }
}

macro_rules! impl_ops {
    ($($trait:ident),*) => {$(
        impl<T> $trait for Ratio<T>
        where T: Integer, for<'x> &'x T: IntOps<T> {}

        impl<T> $trait<Ratio<T>> for &Ratio<T>
        where T: Integer, for<'x> &'x T: IntOps<T> {}
    )*};
}

impl_ops!(AddMonOps, AddGrpOps, MonOps, RingOps, EucRingOps, FieldOps);

impl<T> Elem for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn math_symbol() -> String {
        String::from("Q")
    }
}

impl<T> Mon for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {}

impl<T> AddMon for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {}

impl<T> AddGrp for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {}

impl<T> Ring for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {
    fn inv(&self) -> Option<Self> {
        (!self.is_zero()).then(|| Self::reduced(self.denom.clone(), self.numer.clone()))
    }

    fn is_unit(&self) -> bool {
        !self.is_zero()
    }

    fn normalizing_unit(&self) -> Self {
        self.inv().unwrap_or_else(Self::one)
    }

    fn c_weight(&self) -> f64 {
        self.to_f64().abs()
    }
}

impl<T> EucRing for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {}

impl<T> Field for Ratio<T>
where T: Integer, for<'x> &'x T: IntOps<T> {}
