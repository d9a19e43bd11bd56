use std::hash::Hash;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, FromPrimitive};
use crate::*;

pub trait IntOps<T = Self>: EucRingOps<T> {}

pub trait Integer: EucRing + IntOps + Signed + Ord + Hash + FromPrimitive + ToPrimitive
where for<'a> &'a Self: EucRingOps<Self> {
    /// Remainder of `self` modulo `m`, normalized into `[0, |m|)`. 
    /// For `m = 0` the value is returned as is.
    fn rem_norm(&self, m: &Self) -> Self { 
        if m.is_zero() { 
            return self.clone()
        }
        let r = self % m;
        if r.is_negative() { 
            r + m.abs()
        } else { 
            r
        }
    }

    fn from_usize_(n: usize) -> Self { 
        Self::from_usize(n).unwrap_or_else(Self::zero)
    }
}

macro_rules! impl_ops {
    ($trait:ident, $type:ty) => {
        impl $trait for $type {}
        impl<'a> $trait<$type> for &'a $type {}
    };
}

macro_rules! impl_integer {
    ($type:ident) => {
        impl_ops!(AddMonOps, $type);
        impl_ops!(AddGrpOps, $type);
        impl_ops!(MonOps, $type);
        impl_ops!(RingOps, $type);
        impl_ops!(EucRingOps, $type);
        impl_ops!(IntOps, $type);

        impl Elem for $type {
            fn math_symbol() -> String { 
                String::from("Z")
            }
        }
        
        impl AddMon for $type {}
        impl AddGrp for $type {}
        impl Mon for $type {}
        impl Ring for $type {
            fn inv(&self) -> Option<Self> {
                if self.is_unit() { 
                    Some(self.clone())
                } else { 
                    None
                }
            }
        
            fn is_unit(&self) -> bool {
                self.is_one() || (-self).is_one()
            }
        
            fn normalizing_unit(&self) -> Self {
                if !self.is_negative() { 
                    Self::one() 
                } else { 
                    -Self::one() 
                }
            }

            fn c_weight(&self) -> f64 {
                self.abs().to_f64().unwrap_or(f64::MAX)
            }
        }

        impl EucRing for $type {
            fn gcd(x: &Self, y: &Self) -> Self {
                num_integer::Integer::gcd(x, y)
            }

            fn lcm(x: &Self, y: &Self) -> Self {
                num_integer::Integer::lcm(x, y)
            }
        }

        impl Integer for $type {}
    }
}

impl_integer!(i32);
impl_integer!(i64);
impl_integer!(i128);
impl_integer!(BigInt);

#[cfg(test)]
mod tests { 
    use super::*;

    #[test]
    fn check_type() {
        fn check<T>() where T: Integer, for<'a> &'a T: IntOps<T> {}
        check::<i32>();
        check::<i64>();
        check::<i128>();
        check::<BigInt>();
    }

    #[test]
    fn int_is_unit() { 
        assert!(1.is_unit());
        assert!((-1).is_unit());
        assert!(!2.is_unit());
    }

    #[test]
    fn int_inv() { 
        assert_eq!(1.inv(), Some(1));
        assert_eq!((-1).inv(), Some(-1));
        assert_eq!(2.inv(), None);
    }

    #[test]
    fn int_divides() {
        assert!(2.divides(&4));
        assert!(!3.divides(&4));
        assert!(!0.divides(&1));
    }

    #[test]
    fn gcd() {
        assert_eq!(i64::gcd(&240, &46), 2);
        assert_eq!(i64::gcd(&24, &0), 24);
        assert_eq!(i64::gcd(&0, &-24), 24);
        assert_eq!(i64::gcd(&0, &0), 0);
    }

    #[test]
    fn gcdx() {
        let (a, b) = (240, 46);
        let (d, s, t) = i64::gcdx(&a, &b);
        assert_eq!(d, 2);
        assert_eq!(s * a + t * b, d);

        let (a, b) = (-24, 0);
        let (d, s, t) = i64::gcdx(&a, &b);
        assert_eq!(d, 24);
        assert_eq!(s * a + t * b, d);

        let (a, b) = (-6, -4);
        let (d, s, t) = i64::gcdx(&a, &b);
        assert_eq!(d, 2);
        assert_eq!(s * a + t * b, d);

        let (d, s, t) = i64::gcdx(&0, &0);
        assert_eq!((d, s, t), (0, 0, 0));
    }

    #[test]
    fn gcdx_bigint() {
        let a = BigInt::from(2).pow(70) * 3;
        let b = BigInt::from(2).pow(65) * 9;
        let (d, s, t) = BigInt::gcdx(&a, &b);
        assert_eq!(d, BigInt::from(2).pow(65) * 3);
        assert_eq!(s * &a + t * &b, d);
    }

    #[test]
    fn lcm() { 
        assert_eq!(i64::lcm(&4, &6), 12);
        assert_eq!(i64::lcm(&-4, &6), 12);
        assert_eq!(i64::lcm(&0, &6), 0);
    }

    #[test]
    fn rem_norm() { 
        assert_eq!(7.rem_norm(&5), 2);
        assert_eq!((-7).rem_norm(&5), 3);
        assert_eq!((-10).rem_norm(&5), 0);
        assert_eq!((-7).rem_norm(&0), -7);
    }
}
