//! Error types for AlKetab search

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlKetabError {
    #[error("Search query is empty")]
    EmptyQuery,

    /// Pagination was requested without the server-issued continuation token.
    #[error("No continuation token available for pagination")]
    MissingContinuationToken,

    #[error("Invalid search URL: {0}")]
    InvalidUrl(String),

    /// A client setting other than the URL is unusable.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Network(String),

    #[error("No data received from server")]
    NoData,

    #[error("Data parsing error: {0}")]
    Parsing(String),

    #[error("Error {code}: {message}")]
    Api { code: u16, message: String },

    #[error("No results found")]
    NoResults,

    #[error("Service currently unavailable, please try again later")]
    InsufficientCredits,

    #[error("Unauthorized: please configure a valid AlKetab API key")]
    Unauthorized,
}

impl AlKetabError {
    /// Billing and credential failures. These are not transient and
    /// should be rendered apart from connection problems.
    pub fn is_terminal_configuration(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::InsufficientCredits)
    }

    pub fn bad_request() -> Self {
        Self::Api {
            code: 400,
            message: "Bad Request".to_string(),
        }
    }
}

impl From<reqwest::Error> for AlKetabError {
    fn from(e: reqwest::Error) -> Self {
        AlKetabError::Network(e.to_string())
    }
}

impl serde::Serialize for AlKetabError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
