use crate::{Integer, IntOps};

/// Prime factorization of `|n|` by trial division, 
/// as pairs `(p, e)` in increasing order of `p`.
pub fn factorize<I>(n: &I) -> Vec<(I, usize)>
where I: Integer, for<'x> &'x I: IntOps<I> {
    let mut n = n.abs();
    let mut res = vec![];

    if n.is_zero() { 
        return res
    }

    let mut p = I::from(2);
    while &p * &p <= n { 
        let mut e = 0;
        while (&n % &p).is_zero() { 
            n /= &p;
            e += 1;
        }
        if e > 0 { 
            res.push((p.clone(), e));
        }
        p += I::one();
    }

    if !n.is_one() { 
        res.push((n, 1));
    }

    res
}

/// The largest `e` with `p^e | n`. Zero for `n = 0`.
pub fn valuation<I>(n: &I, p: &I) -> usize
where I: Integer, for<'x> &'x I: IntOps<I> {
    if n.is_zero() || p.is_unit() { 
        return 0
    }

    let mut n = n.clone();
    let mut e = 0;
    while (&n % p).is_zero() { 
        n /= p;
        e += 1;
    }
    e
}

pub fn pow<I>(a: &I, e: usize) -> I
where I: Integer, for<'x> &'x I: IntOps<I> {
    (0..e).fold(I::one(), |res, _| res * a)
}

pub fn pow_mod<I>(a: &I, e: &I, m: &I) -> I
where I: Integer, for<'x> &'x I: IntOps<I> {
    let two = I::from(2);
    let mut base = a.rem_norm(m);
    let mut e = e.clone();
    let mut res = I::one().rem_norm(m);

    while e.is_positive() { 
        if !(&e % &two).is_zero() { 
            res = (res * &base).rem_norm(m);
        }
        base = (&base * &base).rem_norm(m);
        e /= &two;
    }
    res
}

/// The Legendre symbol `(a | p)` for an odd prime `p`.
pub fn legendre<I>(a: &I, p: &I) -> i8
where I: Integer, for<'x> &'x I: IntOps<I> {
    let a = a.rem_norm(p);
    if a.is_zero() { 
        return 0
    }

    let e = (p - I::one()) / I::from(2);
    if pow_mod(&a, &e, p).is_one() { 
        1
    } else { 
        -1
    }
}

#[cfg(test)]
mod tests { 
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn factorize_small() { 
        assert!(factorize(&1i64).is_empty());
        assert!(factorize(&0i64).is_empty());
        assert_eq!(factorize(&12i64), vec![(2, 2), (3, 1)]);
        assert_eq!(factorize(&-90i64), vec![(2, 1), (3, 2), (5, 1)]);
        assert_eq!(factorize(&97i64), vec![(97, 1)]);
    }

    #[test]
    fn factorize_bigint() { 
        let n = BigInt::from(1024 * 7);
        assert_eq!(factorize(&n), vec![(BigInt::from(2), 10), (BigInt::from(7), 1)]);
    }

    #[test]
    fn valuation_() { 
        assert_eq!(valuation(&48i64, &2), 4);
        assert_eq!(valuation(&48i64, &3), 1);
        assert_eq!(valuation(&48i64, &5), 0);
        assert_eq!(valuation(&0i64, &5), 0);
    }

    #[test]
    fn pow_mod_() { 
        assert_eq!(pow(&3i64, 4), 81);
        assert_eq!(pow_mod(&3i64, &4, &5), 1);
        assert_eq!(pow_mod(&-2i64, &3, &7), 6);
    }

    #[test]
    fn legendre_() { 
        assert_eq!(legendre(&1i64, &3), 1);
        assert_eq!(legendre(&2i64, &3), -1);
        assert_eq!(legendre(&-1i64, &5), 1);
        assert_eq!(legendre(&-1i64, &7), -1);
        assert_eq!(legendre(&14i64, &7), 0);
        assert_eq!(legendre(&2i64, &7), 1);
    }
}
