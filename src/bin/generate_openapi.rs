//! Dumps the OpenAPI document of the telemetry API.
//!
//!   cargo run --bin generate_openapi                      # to stdout
//!   cargo run --bin generate_openapi -- --output api.json

use std::{fs, io::Write, path::PathBuf};

use anyhow::{bail, Context, Result};
use irrigation_telemetry::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let output = parse_output(std::env::args().skip(1))?;
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("failed to serialise OpenAPI document")?;

    match output {
        Some(path) => {
            fs::write(&path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("OpenAPI document written to {}", path.display());
        }
        None => std::io::stdout()
            .write_all(json.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(())
}

fn parse_output(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>> {
    match args.next().as_deref() {
        None => Ok(None),
        Some("--output") => match args.next() {
            Some(path) => Ok(Some(PathBuf::from(path))),
            None => bail!("--output needs a path"),
        },
        Some(other) => bail!("unknown argument: {other}"),
    }
}
