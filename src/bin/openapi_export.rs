//! Print the OpenAPI document generated from the handlers as YAML.
//!
//! `cargo run --bin openapi_export > openapi.yaml`

use anyhow::{Context, Result};
use utoipa::OpenApi;

use socialapp::api::openapi::ApiDoc;

fn main() -> Result<()> {
    let yaml = ApiDoc::openapi()
        .to_yaml()
        .context("Failed to serialize OpenAPI document")?;
    print!("{yaml}");
    Ok(())
}
