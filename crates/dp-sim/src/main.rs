use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    filter::{self, FilterArgs},
    nested::{self, NestedArgs},
    odometer::{self, OdometerArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "dp-sim", about = "Interactive privacy-accounting walkthroughs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Spend a fixed budget through a concurrent filter until it refuses.
    Filter(FilterArgs),
    /// Nest filters with shrinking budgets and show independent enforcement.
    Nested(NestedArgs),
    /// Track spending through an odometer, optionally capped by the adapter.
    Odometer(OdometerArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Filter(args) => filter::run(&args),
        Command::Nested(args) => nested::run(&args),
        Command::Odometer(args) => odometer::run(&args),
    }
}
