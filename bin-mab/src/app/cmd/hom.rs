use super::group::load_group;
use crate::app::utils::*;
use mab_homology::HomMarkedAbelianGroup;

#[derive(Clone, Default, Debug, clap::Args)]
pub struct Args {
    pub domain_m: String,
    pub domain_n: String,
    pub range_m: String,
    pub range_n: String,

    /// Chain-level map from the domain chains to the range chains.
    pub f: String,

    #[arg(short, long, default_value = "0")]
    pub p: String,

    #[arg(long)]
    pub controlled: bool,

    #[arg(long, default_value = "0")]
    pub log: u8,
}

pub fn run(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let c = args.controlled;
    let domain = load_group(&args.domain_m, &args.domain_n, &args.p, c)?;
    let range  = load_group(&args.range_m,  &args.range_n,  &args.p, c)?;
    let f = parse_mat(&args.f)?;

    let h = HomMarkedAbelianGroup::new(domain, range, f)?;

    let out = [
        format!("{}", h),
        format!("kernel: {}", h.kernel()),
        format!("cokernel: {}", h.cokernel()),
        format!("image: {}", h.image()),
        h.reduced_matrix_text(),
    ];
    Ok(out.join("\n"))
}
