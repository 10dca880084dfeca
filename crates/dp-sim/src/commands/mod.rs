pub mod filter;
pub mod nested;
pub mod odometer;

use std::error::Error;
use std::fs;
use std::path::Path;

use serde_json::Value;

/// Pretty-prints the report to stdout, and to `out` when given.
pub fn emit_report(out: Option<&Path>, report: &Value) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    if let Some(path) = out {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
    }
    Ok(())
}
