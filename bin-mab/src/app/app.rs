use log::info;
use clap::{Parser, Subcommand};

use super::cmd::{group, hom, tlf};
use super::utils::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Cmd
}

#[derive(Subcommand, Debug)]
#[clap(rename_all="lower")]
pub enum Cmd {
    /// Homology of a chain complex Z^l <-M- Z^k <-N- Z^m.
    Group(group::Args),
    /// Map induced on homology by a chain-level matrix.
    Hom(hom::Args),
    /// Kawauchi-Kojima invariants of a torsion linking form.
    Tlf(tlf::Args),
}

impl CliArgs { 
    fn log_level(&self) -> log::LevelFilter { 
        let v = match &self.command { 
            Cmd::Group(args) => args.log,
            Cmd::Hom(args)   => args.log,
            Cmd::Tlf(args)   => args.log,
        };
        mab::util::log::level_from_verbosity(v)
    }
}

pub struct App {
    pub args: CliArgs
}

impl App { 
    pub fn new() -> Self { 
        let args = CliArgs::parse();
        App { args }
    }

    pub fn run(&self) -> Result<String, Box<dyn std::error::Error>> { 
        self.init_logger()?;

        info!("args: {:?}", self.args);
        info!("int-type: {}", std::any::type_name::<Int>());

        let (res, time) = measure(||
            self.dispatch()
        );

        info!("time: {:?}", time);

        res
    }

    fn init_logger(&self) -> Result<(), Box<dyn std::error::Error>> {
        let l = self.args.log_level();
        mab::util::log::init_simple_logger(l)?;
        Ok(())
    }

    fn dispatch(&self) -> Result<String, Box<dyn std::error::Error>> { 
        guard_panic(||
            match &self.args.command { 
                Cmd::Group(args) => group::run(args),
                Cmd::Hom(args)   => hom::run(args),
                Cmd::Tlf(args)   => tlf::run(args),
            }
        )
    }
}
