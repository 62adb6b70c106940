use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Failed to build geocode URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Geocode request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocode service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}
