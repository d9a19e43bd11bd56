use crate::app::utils::*;
use mab::util::format::vec_str;
use mab_matrix::dense::SnfStrategy;
use mab_homology::MarkedAbelianGroup;

#[derive(Clone, Default, Debug, clap::Args)]
pub struct Args {
    /// Outgoing differential, as a JSON matrix.
    pub m: String,

    /// Incoming differential, as a JSON matrix.
    pub n: String,

    #[arg(short, long, default_value = "0")]
    pub p: String,

    #[arg(short, long)]
    pub gens: bool,

    #[arg(long)]
    pub controlled: bool,

    #[arg(long, default_value = "0")]
    pub log: u8,
}

pub fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let g = load_group(&args.m, &args.n, &args.p, args.controlled)?;
    let mut out = vec![g.to_string()];

    if args.gens {
        for (i, d) in g.inv_facs().iter().enumerate() {
            if let Some(z) = g.torsion_rep(i) {
                out.push(format!("  t{i} (Z/{d}): {}", vec_str(&z)));
            }
        }
        for i in 0 .. g.rank() {
            if let Some(z) = g.free_rep(i) {
                out.push(format!("  f{i} (Z): {}", vec_str(&z)));
            }
        }
    }

    Ok(out.join("\n"))
}

pub(crate) fn load_group(m: &str, n: &str, p: &str, controlled: bool) -> Result<MarkedAbelianGroup<Int>, Box<dyn std::error::Error>> {
    let m = parse_mat(m)?;
    let n = parse_mat(n)?;
    let p = parse_int(p)?;
    let s = if controlled { SnfStrategy::Controlled } else { SnfStrategy::Standard };

    let g = MarkedAbelianGroup::new_with_strategy(m, n, p, s)?;
    Ok(g)
}
