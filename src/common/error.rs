use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid {field}: {message}"))]
    Validation { field: String, message: String },
    #[snafu(display("{method} {url} failed: {source}"))]
    Network {
        method: String,
        url: String,
        source: ureq::Transport,
    },
    #[snafu(display("{method} {url} returned {status}: {message}"))]
    Backend {
        method: String,
        url: String,
        status: u16,
        message: String,
    },
    #[snafu(display("{method} {url} found nothing to act on: {message}"))]
    NotFound {
        method: String,
        url: String,
        message: String,
    },
    #[snafu(display("{message}: {source}"))]
    Response {
        message: String,
        source: Box<dyn std::error::Error>,
    },
    #[snafu(display("{prefix}: {message}"))]
    Config { message: String, prefix: String },
    #[snafu(display("{message} {}: {source}", path.display()))]
    Preference {
        message: String,
        path: std::path::PathBuf,
        source: Box<dyn std::error::Error>,
    },
}

impl Error {
    /// True when the backend no longer knows the addressed rewrite.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
