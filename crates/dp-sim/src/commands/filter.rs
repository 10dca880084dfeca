use std::error::Error;
use std::path::PathBuf;

use clap::Args as ClapArgs;
use dp_core::{derive_substream_seed, PrivacyLoss};
use dp_interactive::make_concurrent_filter;
use dp_mech::make_epsilon_laplace;
use serde_json::json;

use super::emit_report;

#[derive(ClapArgs, Debug)]
pub struct FilterArgs {
    /// Total privacy budget enforced by the filter.
    #[arg(long, default_value_t = 1.0)]
    budget: f64,
    /// Privacy loss spent by each individual query.
    #[arg(long, default_value_t = 0.5)]
    epsilon: f64,
    /// Number of queries to attempt; later ones may be refused.
    #[arg(long, default_value_t = 3)]
    queries: usize,
    /// Scalar the protected dataset reduces to.
    #[arg(long, default_value_t = 100.0)]
    data: f64,
    /// Master seed; each query draws noise from its own substream.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Optional path for the JSON report.
    #[arg(long)]
    out: Option<PathBuf>,
}

pub fn run(args: &FilterArgs) -> Result<(), Box<dyn Error>> {
    let budget = PrivacyLoss::new(args.budget)?;
    let session = make_concurrent_filter::<f64>(budget).invoke(&args.data)?;

    let mut attempts = Vec::new();
    for index in 0..args.queries {
        let seed = derive_substream_seed(args.seed, index as u64);
        let laplace = make_epsilon_laplace(args.epsilon, seed)?;
        match session.query(laplace.into()).and_then(|a| a.into_value()) {
            Ok(release) => attempts.push(json!({
                "query": index,
                "epsilon": args.epsilon,
                "release": release,
            })),
            Err(err) => attempts.push(json!({
                "query": index,
                "epsilon": args.epsilon,
                "refused": err.to_string(),
            })),
        }
    }

    let report = json!({
        "budget": args.budget,
        "epsilon": args.epsilon,
        "attempts": attempts,
    });
    emit_report(args.out.as_deref(), &report)
}
