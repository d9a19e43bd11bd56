use crate::app::utils::*;
use crate::app::err::*;
use itertools::Itertools;
use num_traits::One;
use mab_matrix::MatTrait;
use mab_homology::{MarkedAbelianGroup, BilinearForm, SparseGrid};

#[derive(Clone, Default, Debug, clap::Args)]
pub struct Args {
    /// Orders dᵢ of the cyclic summands, as a JSON list.
    pub orders: String,

    /// Values lk(eᵢ, eⱼ)·n, as a JSON matrix.
    pub pairing: String,

    #[arg(short, long, required = true)]
    pub n: String,

    #[arg(long, default_value = "0")]
    pub log: u8,
}

pub fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let orders: Vec<Int> = parse_vec(&args.orders)?;
    let pairing = parse_mat::<Int>(&args.pairing)?;
    let n: Int = parse_int(&args.n)?;

    let k = orders.len();
    ensure!(orders.iter().all(|d| d > &Int::one()), "orders must be > 1: {}", args.orders);
    ensure!(n > Int::one(), "n must be > 1: {}", args.n);
    ensure!(pairing.shape() == (k, k), "pairing must be {k} × {k}, got {:?}.", pairing.shape());

    let group = MarkedAbelianGroup::from_invariant_factors(&orders, 0);
    let range = MarkedAbelianGroup::from_invariant_factors(&[n], 0);
    let grid = SparseGrid::from_entries(
        pairing.iter().map(|(i, j, a)| ([i, j, 0], a.clone()))
    );

    let form = BilinearForm::new(group.clone(), group, range, grid)?;
    let kk = form.linking_form_invariants()?;

    let yn = |b: bool| if b { "yes" } else { "no" };
    let out = [
        format!("{form}"),
        format!("ranks: {}", kk.rank_string()),
        format!("sigma: {}", kk.sigma_string()),
        format!("legendre: {}", kk.legendre_string()),
        format!("split: {}", yn(kk.is_split())),
        format!("hyperbolic: {}", yn(kk.is_hyperbolic())),
        format!("two-torsion condition: {}", yn(kk.two_torsion_condition_holds())),
    ];
    Ok(out.into_iter().join("\n"))
}
