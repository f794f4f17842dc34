use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("Request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("URL {0} cannot be used as an API root")]
    BaseUrl(String),
    #[error("bad {field} timestamp {value:?}: {source}")]
    Timestamp {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::HttpStatus(status, _) => Some(*status),
            ApiError::Reqwest(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
