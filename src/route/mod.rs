mod bootcamp;
pub mod gate;
mod results;

use crate::auth::Authenticator;
use crate::error::ApiError;
use crate::service::BootcampService;
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// All endpoints: the versioned API plus the health probe. Every rejection is
/// rendered into the error envelope.
pub fn routes(
    service: BootcampService,
    auth: Authenticator,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    warp::path!("api" / "v1" / ..)
        .and(bootcamp::routes(service, auth))
        .or(health())
        .recover(handle_rejection)
}

fn health() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("health")
        .and(warp::get())
        .map(|| StatusCode::OK)
        .with(warp::cors().allow_any_origin())
}

fn with_service(
    service: BootcampService,
) -> impl Filter<Extract = (BootcampService,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// Success envelope.
#[derive(Debug, Clone, Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    fn reply(data: T, status: StatusCode) -> impl Reply {
        let envelope = Envelope {
            success: true,
            data,
        };
        warp::reply::with_status(warp::reply::json(&envelope), status)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ErrorMessage {
    success: bool,
    error: String,
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(api_error) = err.find::<ApiError>() {
        if let ApiError::Internal(cause) = api_error {
            log::error!("request failed: {:?}", cause);
        }
        (api_error.status(), api_error.public_message())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Route not found".to_string())
    } else if let Some(invalid) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, invalid.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large".to_string(),
        )
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            "Content-Length header is required".to_string(),
        )
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Request body must be JSON".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        log::error!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server Error".to_string(),
        )
    };

    let json = warp::reply::json(&ErrorMessage {
        success: false,
        error: message,
    });
    Ok(warp::reply::with_status(json, status))
}
