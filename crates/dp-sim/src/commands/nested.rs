use std::error::Error;
use std::path::PathBuf;

use clap::Args as ClapArgs;
use dp_core::{derive_substream_seed, PrivacyLoss};
use dp_interactive::{make_concurrent_filter, Query, Queryable, Spec};
use dp_mech::make_epsilon_laplace;
use serde_json::json;

use super::emit_report;

#[derive(ClapArgs, Debug)]
pub struct NestedArgs {
    /// Budget of the outermost filter; each nesting level halves it.
    #[arg(long, default_value_t = 1.0)]
    budget: f64,
    /// Number of nested filters under the outer one.
    #[arg(long, default_value_t = 2)]
    depth: usize,
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

pub fn run(args: &NestedArgs) -> Result<(), Box<dyn Error>> {
    let outer_budget = PrivacyLoss::new(args.budget)?;
    let outer = make_concurrent_filter::<f64>(outer_budget).invoke(&args.data)?;

    // Descend: each level spawns a filter with half its parent's budget.
    let mut sessions: Vec<(f64, Queryable<f64>)> = vec![(args.budget, outer)];
    for level in 0..args.depth {
        let (parent_budget, parent) = {
            let (budget, session) = &sessions[level];
            (*budget, session.clone())
        };
        let child_budget = PrivacyLoss::new(parent_budget / 2.0)?;
        let child = parent
            .query(Query::Spawn(Spec::Interactive(make_concurrent_filter(
                child_budget,
            ))))?
            .into_queryable()?;
        sessions.push((parent_budget / 2.0, child));
    }

    // Spend at the innermost level until its own cap refuses, then show the
    // outer levels still accept spending against their remaining budgets.
    let mut attempts = Vec::new();
    let mut query_index = 0u64;
    for (level, (budget, session)) in sessions.iter().enumerate().rev() {
        let epsilon = budget / 2.0;
        for _ in 0..2 {
            let seed = derive_substream_seed(args.seed, query_index);
            query_index += 1;
            let laplace = make_epsilon_laplace(epsilon, seed)?;
            let outcome = session.query(laplace.into()).and_then(|a| a.into_value());
            attempts.push(match outcome {
                Ok(release) => json!({
                    "level": level,
                    "budget": budget,
                    "epsilon": epsilon,
                    "release": release,
                }),
                Err(err) => json!({
                    "level": level,
                    "budget": budget,
                    "epsilon": epsilon,
                    "refused": err.to_string(),
                }),
            });
        }
    }

    let report = json!({
        "outer_budget": args.budget,
        "depth": args.depth,
        "attempts": attempts,
    });
    emit_report(args.out.as_deref(), &report)
}
