use itertools::Itertools;
use num_bigint::BigInt;
use mab_matrix::dense::{Mat, SnfStrategy};
use mab_homology::{MarkedAbelianGroup, HomMarkedAbelianGroup, BilinearForm, SparseGrid, Error};

type G = MarkedAbelianGroup<i64>;
type Hom = HomMarkedAbelianGroup<i64>;

// Z³ --N--> Z⁴ --M--> Z², homology Z/6.
fn complex() -> (Mat<i64>, Mat<i64>) {
    let m = Mat::from_data((2, 4), [
        1, -1, 0,  0,
        0,  0, 1, -1,
    ]);
    let n = Mat::from_data((4, 3), [
        2, 3, 0,
        2, 3, 0,
        4, 0, 6,
        4, 0, 6,
    ]);
    (m, n)
}

fn groups() -> Vec<G> {
    let (m, n) = complex();
    let klein_m = Mat::zero((1, 2));
    let klein_n = Mat::from_data((2, 1), [0, 2]);

    let mut res = vec![];
    for p in [0, 2, 3, 4] {
        for s in [SnfStrategy::Standard, SnfStrategy::Controlled] {
            res.push(G::new_with_strategy(m.clone(), n.clone(), p, s).unwrap());
            res.push(G::new_with_strategy(klein_m.clone(), klein_n.clone(), p, s).unwrap());
        }
    }
    res
}

fn order(g: &G) -> i64 {
    g.inv_facs().iter().product()
}

#[test]
fn invariants() {
    let (m, n) = complex();
    let g = G::new(m.clone(), n.clone()).unwrap();
    assert_eq!(g.inv_facs(), &[6]);
    assert_eq!(g.rank(), 0);

    let g2 = G::new_with_coeff(m.clone(), n.clone(), 2).unwrap();
    let g4 = G::new_with_coeff(m.clone(), n.clone(), 4).unwrap();
    let g5 = G::new_with_coeff(m, n, 5).unwrap();

    // Z/6 ⊗ Z/p ⊕ Tor(H₀, Z/p), with H₀ = Z² / im M = 0.
    assert_eq!(g2.inv_facs(), &[2]);
    assert_eq!(g4.inv_facs(), &[2]);
    assert!(g5.is_trivial());
}

#[test]
fn snf_round_trip() {
    for g in groups() {
        let k = g.min_num_gens();
        let ws = (0..k).map(|_| -3i64 ..= 3).multi_cartesian_product();

        for w in ws {
            let v = g.cc_rep(&w).unwrap();
            assert!(g.is_cycle(&v), "{g}: {v:?}");

            let expected = w.iter().enumerate().map(|(i, a)|
                match g.inv_fac(i) {
                    Some(d) => a.rem_euclid(*d),
                    None    => *a
                }
            ).collect_vec();
            assert_eq!(g.snf_rep(&v), Ok(expected), "{g}: {w:?}");
        }
    }
}

#[test]
fn cc_round_trip_is_homologous() {
    for g in groups() {
        let basis = g.cycle_basis();
        let combos = basis.iter().map(|_| -2i64 ..= 2).multi_cartesian_product();

        for c in combos {
            let v = (0 .. g.rank_cc()).map(|i|
                basis.iter().zip(&c).map(|(b, a)| b[i] * a).sum::<i64>()
            ).collect_vec();

            assert!(g.is_cycle(&v));

            let w = g.snf_rep(&v).unwrap();
            let u = g.cc_rep(&w).unwrap();
            let diff = v.iter().zip(&u).map(|(a, b)| a - b).collect_vec();
            assert!(g.is_boundary(&diff), "{g}: {v:?} vs {u:?}");
        }
    }
}

#[test]
fn presentation_invariance() {
    let (m, n) = complex();
    let g = G::new(m.clone(), n.clone()).unwrap();

    // swap chains 0 and 2
    let mut m2 = m.clone();
    m2.swap_cols(0, 2);
    let mut n2 = n.clone();
    n2.swap_rows(0, 2);
    let h = G::new(m2, n2).unwrap();

    assert_ne!(g, h);
    assert!(g.is_isomorphic_to(&h));
    assert_eq!(g.min_num_gens(), h.min_num_gens());
}

#[test]
fn boundaries() {
    let (m, n) = complex();
    let g = G::new(m, n.clone()).unwrap();

    for j in 0..3 {
        let b = n.col_vec(j);
        assert!(g.is_boundary(&b));
        let u = g.write_as_boundary(&b).unwrap();
        assert_eq!(n.mul_vec(&u), b);
    }

    let t = g.torsion_rep(0).unwrap();
    assert_eq!(g.write_as_boundary(&t), Err(Error::NotABoundary));

    let t6 = t.iter().map(|a| a * 6).collect_vec();
    let u = g.write_as_boundary(&t6).unwrap();
    assert_eq!(n.mul_vec(&u), t6);
}

#[test]
fn concrete_scenarios() {
    let g = G::new(Mat::from_data((1, 1), [2]), Mat::zero((1, 1))).unwrap();
    assert_eq!(g.rank(), 0);
    assert!(g.inv_facs().is_empty());

    let g = G::new(Mat::zero((1, 1)), Mat::zero((1, 1))).unwrap();
    assert!(g.is_z());
    assert_eq!(g.free_rep(0), Some(vec![1]));

    let g = G::new(Mat::zero((1, 1)), Mat::from_data((1, 1), [2])).unwrap();
    assert_eq!(g.inv_facs(), &[2]);
    assert_eq!(g.snf_rep(&[1]), Ok(vec![1]));
    assert_eq!(g.snf_rep(&[2]), Ok(vec![0]));
}

#[test]
fn composition() {
    let (m, n) = complex();
    let g = G::new(m, n).unwrap();

    let f = Hom::new(g.clone(), g.clone(), Mat::diag((4, 4), [5; 4])).unwrap();
    let h = Hom::new(g.clone(), g.clone(), Mat::diag((4, 4), [2; 4])).unwrap();
    let hf = h.compose(&f).unwrap();

    for v in g.cycle_basis() {
        let lhs = hf.eval_cc(&v).unwrap();
        let rhs = h.eval_cc(&f.eval_cc(&v).unwrap()).unwrap();
        assert_eq!(lhs, rhs);
    }

    assert!(f.is_iso());
    assert!(!hf.is_iso());
    assert_eq!(hf.image().inv_facs(), &[3]);
    assert_eq!(hf.kernel().inv_facs(), &[2]);
}

#[test]
fn inverse() {
    let (m, n) = complex();
    let g = G::new(m, n).unwrap();
    let f = Hom::new(g.clone(), g.clone(), Mat::diag((4, 4), [5; 4])).unwrap();

    let fi = f.inverse_hom().unwrap();
    assert!(fi.compose(&f).unwrap().is_identity());
    assert!(f.compose(&fi).unwrap().is_identity());
}

#[test]
fn kernel_and_image_orders() {
    let (m, n) = complex();
    let g = G::new(m, n).unwrap();

    for a in 0..6 {
        let f = Hom::new(g.clone(), g.clone(), Mat::diag((4, 4), [a; 4])).unwrap();
        assert_eq!(order(f.kernel()) * order(f.image()), order(&g));
        assert!(f.image().min_num_gens() <= g.min_num_gens());
        assert_eq!(f.is_monic(), f.kernel().is_trivial());
    }
}

#[test]
fn signature() {
    // intersection form of CP² # -CP² # (S² × S²)
    let a = [
        1,  0, 0, 0,
        0, -1, 0, 0,
        0,  0, 0, 1,
        0,  0, 1, 0,
    ];
    let z4 = G::free(4, 0);
    let grid = SparseGrid::from_entries(
        (0..4).cartesian_product(0..4).map(|(i, j)| ([i, j, 0], a[i * 4 + j]))
    );
    let f = BilinearForm::new(z4.clone(), z4, G::free(1, 0), grid).unwrap();

    assert!(f.is_symmetric());
    assert_eq!(f.rank(), Some(4));
    assert_eq!(f.signature(), Some(0));
}

#[test]
fn linking_form_orientation() {
    let z3 = G::from_invariant_factors(&[3], 0);
    let form = |v: i64| {
        let grid = SparseGrid::from_entries([([0, 0, 0], v)]);
        BilinearForm::new(z3.clone(), z3.clone(), z3.clone(), grid).unwrap()
    };

    let f = form(1);
    let g = form(-1);
    let kf = f.linking_form_invariants().unwrap();
    let kg = g.linking_form_invariants().unwrap();

    assert_eq!(kf.rank_string(), "3(1)");
    assert_eq!(kf.legendre_string(), "3(1)");
    assert_eq!(kg.legendre_string(), "3(-1)");

    // -1 is a square mod 5, so reversing keeps the symbol.
    let z5 = G::from_invariant_factors(&[5], 0);
    let form5 = |v: i64| {
        let grid = SparseGrid::from_entries([([0, 0, 0], v)]);
        BilinearForm::new(z5.clone(), z5.clone(), z5.clone(), grid).unwrap()
    };
    let (f1, f4) = (form5(1), form5(4));
    let k1 = f1.linking_form_invariants().unwrap();
    let k4 = f4.linking_form_invariants().unwrap();
    assert_eq!(k1.legendre_string(), "5(1)");
    assert_eq!(k4.legendre_string(), "5(1)");
}

#[test]
fn mod_p_needs_integral_complex() {
    // Z --1--> Z --2--> Z vanishes only mod 2.
    let m = Mat::from_data((1, 1), [2]);
    let n = Mat::from_data((1, 1), [1]);
    assert_eq!(G::new_with_coeff(m, n, 2), Err(Error::NotAChainComplex));
}

#[test]
fn bigint_group() {
    let big = BigInt::from(3).pow(50);
    let m: Mat<BigInt> = Mat::zero((1, 2));
    let n = Mat::from_data((2, 2), [big.clone(), BigInt::from(0), BigInt::from(0), &big * BigInt::from(2)]);
    let g = MarkedAbelianGroup::new(m, n).unwrap();

    assert_eq!(g.inv_facs(), &[big.clone(), &big * BigInt::from(2)]);

    let w = vec![BigInt::from(1), BigInt::from(-1)];
    let v = g.cc_rep(&w).unwrap();
    let expected = vec![BigInt::from(1), &big * BigInt::from(2) - BigInt::from(1)];
    assert_eq!(g.snf_rep(&v), Ok(expected));
}
