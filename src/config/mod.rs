use std::fs;
use std::path::PathBuf;

pub mod app;
pub mod cli;
pub mod file;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Unable to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

pub fn load(cli: &cli::Cli) -> Result<app::Config, Error> {
    let content = match &cli.config {
        Some(path) => fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?,
        None => xdg::BaseDirectories::with_prefix("lumadim")
            .ok()
            .and_then(|dirs| dirs.find_config_file("config.toml"))
            .and_then(|path| fs::read_to_string(path).ok())
            .unwrap_or_else(|| include_str!("../../config.toml").to_string()),
    };

    parse(cli, &content)
}

fn parse(cli: &cli::Cli, content: &str) -> Result<app::Config, Error> {
    app::Config::resolve(cli, toml::from_str(content)?)
}
