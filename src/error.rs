use crate::store::StoreError;
use warp::http::StatusCode;

/// Failures surfaced to API callers. Every variant carries the message that
/// ends up in the `error` field of the response envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Ownership or role violation. Reported with a 401 status, which is what
    /// existing clients of this API expect.
    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bootcamp_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("Bootcamp not found with id of {}", id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller. Internal causes are only logged.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

impl warp::reject::Reject for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(id) => ApiError::bootcamp_not_found(&id),
            StoreError::DuplicateOwner(owner) => ApiError::BadRequest(format!(
                "The user with ID {} has already published a bootcamp",
                owner
            )),
            StoreError::DuplicateField(_) => {
                ApiError::BadRequest("Duplicate field value entered".to_string())
            }
            other => ApiError::Internal(other.into()),
        }
    }
}
