use std::error::Error;
use std::path::PathBuf;

use clap::Args as ClapArgs;
use dp_core::{derive_substream_seed, PrivacyLoss};
use dp_interactive::{make_concurrent_odometer, make_odometer_to_filter, Query};
use dp_mech::make_epsilon_laplace;
use serde_json::json;

use super::emit_report;

#[derive(ClapArgs, Debug)]
pub struct OdometerArgs {
    /// Privacy loss spent by each individual query.
    #[arg(long, default_value_t = 0.25)]
    epsilon: f64,
    /// Number of queries to run.
    #[arg(long, default_value_t = 4)]
    queries: usize,
    /// Optional cap; when set the odometer runs behind the filter adapter.
    #[arg(long)]
    cap: Option<f64>,
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

pub fn run(args: &OdometerArgs) -> Result<(), Box<dyn Error>> {
    let odometer = make_concurrent_odometer::<f64>();
    let session = match args.cap {
        Some(cap) => {
            make_odometer_to_filter(odometer, PrivacyLoss::new(cap)?).invoke(&args.data)?
        }
        None => odometer.invoke(&args.data)?,
    };

    let mut attempts = Vec::new();
    for index in 0..args.queries {
        let seed = derive_substream_seed(args.seed, index as u64);
        let laplace = make_epsilon_laplace(args.epsilon, seed)?;
        let outcome = session.query(laplace.into()).and_then(|a| a.into_value());
        let spent = session
            .query(Query::GetPrivacyLoss)?
            .into_privacy_loss()?
            .value();
        attempts.push(match outcome {
            Ok(release) => json!({
                "query": index,
                "epsilon": args.epsilon,
                "release": release,
                "spent": spent,
            }),
            Err(err) => json!({
                "query": index,
                "epsilon": args.epsilon,
                "refused": err.to_string(),
                "spent": spent,
            }),
        });
    }

    let report = json!({
        "epsilon": args.epsilon,
        "cap": args.cap,
        "attempts": attempts,
    });
    emit_report(args.out.as_deref(), &report)
}
