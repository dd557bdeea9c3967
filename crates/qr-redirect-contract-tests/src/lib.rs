//! Helpers for validating documents against the frozen JSON schemas in
//! `contracts/`.

use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;

/// Absolute path of a file under the workspace `contracts/` directory.
pub fn contract_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../contracts")
        .join(relative)
}

/// Reads and parses a JSON file under `contracts/`.
///
/// # Errors
/// Returns [`ContractError`] when the file is missing or not valid JSON.
pub fn load_contract_json(relative: &str) -> Result<Value, ContractError> {
    let path = contract_path(relative);
    let raw = std::fs::read_to_string(&path).map_err(|source| ContractError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Compiles the schema at `contracts/<schema>`.
///
/// # Errors
/// Returns [`ContractError`] when the schema cannot be loaded or compiled.
pub fn compile_validator(schema: &str) -> Result<JSONSchema, ContractError> {
    let schema = load_contract_json(schema)?;
    JSONSchema::compile(&schema).map_err(|error| ContractError::Schema(error.to_string()))
}

/// Contract loading errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Contract file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Contract file is not valid JSON.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// Schema failed to compile.
    #[error("schema does not compile: {0}")]
    Schema(String),
}
