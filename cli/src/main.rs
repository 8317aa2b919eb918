//! lastbyte command-line front end.
//!
//! Reads a raw request from a file or stdin, then races it over `-g`
//! connections against `-h`:`-p`.
//!
//! Environment variables:
//! - LASTBYTE_LOG: log filter (same syntax as RUST_LOG), default `info`

mod args;
mod logging;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use lastbyte::{ConfigError, RequestTemplate};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::error;

use crate::args::Args;

/// Failures that abort the run before any connection is attempted.
#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("could not read request from {path}: {source}")]
    Read { path: String, source: io::Error },
}

async fn load_template(path: &Path) -> Result<RequestTemplate, CliError> {
    let bytes = if path == Path::new("-") {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .map_err(|source| CliError::Read {
                path: "stdin".into(),
                source,
            })?;
        buf
    } else {
        tokio::fs::read(path).await.map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?
    };
    Ok(RequestTemplate::new(bytes)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&args.log_level);

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let template = match load_template(&args.file).await {
        Ok(template) => template,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match lastbyte::run(template, config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lastbyte-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_template_from_file() {
        let path = temp_file("req", b"GET / HTTP/1.1\r\nHost: x\r\n\r\n");
        let template = load_template(&path).await.unwrap();
        assert_eq!(template.trigger(), b"\n");
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let path = temp_file("empty", b"");
        let err = load_template(&path).await.unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::EmptyTemplate)));
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = load_template(Path::new("/nonexistent/lastbyte/request"))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }
}
