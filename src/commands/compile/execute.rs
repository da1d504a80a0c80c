use std::error::Error;
use std::fs;

use thiserror::Error;
use tracing::debug;

use super::CompileCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::query::QueryRequest;
use crate::types::CompileResult;

#[derive(Error, Debug)]
enum RequestError {
    #[error("Failed to read request file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Invalid request in {path}: {message}")]
    ParseFailed { path: String, message: String },
}

impl Execute for CompileCmd {
    type Output = CompileResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let path = self.file.display().to_string();
        let content = fs::read_to_string(&self.file).map_err(|e| RequestError::ReadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let request: QueryRequest =
            serde_json::from_str(&content).map_err(|e| RequestError::ParseFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        debug!(path = %path, "loaded compile request");

        CompileResult::compile(&request, config, self.count)
    }
}
