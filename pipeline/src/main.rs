#![forbid(unsafe_code)]
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::Verbosity;
use dispatch::reducer::Heuristic;
use log::{debug, error};

mod commands;

#[derive(Debug, Parser)]
/// Order dispatch pipeline: reduce the problem space, merge solver results
struct App {
    #[clap(flatten)]
    verbose: Verbosity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reduce the problem space by some heuristic
    Reduce(Reduce),
    /// Merge the partial result with the external solver results
    Merge(Merge),
}

#[derive(Args, Debug)]
pub struct Reduce {
    /// The complete list of model input
    #[clap(long)]
    pub model_input: PathBuf,
    /// The distance file
    #[clap(long)]
    pub distance: PathBuf,
    /// Directory receiving the partial result of the reduction
    #[clap(long)]
    pub model_result_partial: PathBuf,
    /// Directory receiving the reduced model input
    #[clap(long)]
    pub model_input_reduced: PathBuf,
    /// Reduction strategy
    #[clap(long, value_enum, default_value = "anchor-radius")]
    pub heuristic: HeuristicArg,
    /// Resolve orders within this distance of the resolution frontier
    #[clap(long, default_value_t = 10.0)]
    pub distance_threshold: f64,
    /// Upper bound on directly resolved orders
    #[clap(long)]
    pub max_resolved: Option<usize>,
}

#[derive(Args, Debug)]
pub struct Merge {
    /// The complete model input
    #[clap(long)]
    pub model_input: PathBuf,
    /// The distance file
    #[clap(long)]
    pub distance: PathBuf,
    /// Directory holding the partial result from the reduce step
    #[clap(long)]
    pub model_result_partial: PathBuf,
    /// Directory holding the intermediate solver results
    #[clap(long)]
    pub model_result_list: PathBuf,
    /// Final model result directory
    #[clap(long)]
    pub model_result_final: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HeuristicArg {
    AnchorRadius,
    NearestChain,
}

impl From<HeuristicArg> for Heuristic {
    fn from(arg: HeuristicArg) -> Self {
        match arg {
            HeuristicArg::AnchorRadius => Heuristic::AnchorRadius,
            HeuristicArg::NearestChain => Heuristic::NearestChain,
        }
    }
}

fn main() {
    let args: App = App::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    debug!("{args:?}");

    if let Err(err) = match args.command {
        Commands::Reduce(reduce) => commands::reduce(reduce),
        Commands::Merge(merge) => commands::merge(merge),
    } {
        error!("An error occurred: {err}");
        std::process::exit(1);
    }
}
