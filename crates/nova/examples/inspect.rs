//! Load a snapshot and summarize one field.
//!
//! ```text
//! RUST_LOG=nova_loader=info cargo run --example inspect -- run/chkpt.0004.nova temperature
//! ```
//!
//! A checkpoint path is converted once and cached next to it; a products
//! path is read directly.

use std::process::ExitCode;

use nova::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: inspect <snapshot> [field]");
        return ExitCode::FAILURE;
    };
    let field = args.next().unwrap_or_else(|| "rho".to_string());

    match run(&path, &field) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("inspect: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str, field: &str) -> Result<(), Box<dyn std::error::Error>> {
    let products = load(path)?;
    let field: Field = field.parse()?;

    println!("model:          {}", products.model_name());
    println!("time:           {:.6e} s", products.time());
    println!("version:        {}", products.version());
    println!("blocks:         {}", products.len());
    println!("dimensionality: {:?}", products.dimensionality());

    let plot = PlotData::assemble(&products, field, FieldTransform::Identity)?;
    match plot.range {
        Some((lo, hi)) => println!("{}: [{lo:.6e}, {hi:.6e}]", plot.variable_label()),
        None => println!("{}: no finite values", plot.variable_label()),
    }
    Ok(())
}
