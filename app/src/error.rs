use thiserror::Error;

/// Transport-level failure (DNS, connection, timeout, body read).
///
/// A non-success HTTP status is not an error: the fetcher reports it as an
/// absent body instead.
#[derive(Debug, Error)]
#[error("Error during requests to {url} : {source}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: reqwest::Error,
}

/// An element the extractor relies on is missing from a fetched page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("malformed document: missing {0}")]
    MissingElement(&'static str),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Company with code {code} was not found")]
    NotFound { code: String },

    #[error(transparent)]
    Malformed(#[from] ExtractError),
}
