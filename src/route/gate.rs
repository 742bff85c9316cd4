//! Authentication and role checks in front of the mutating routes.

use crate::auth::{not_authorized, Authenticator};
use crate::error::ApiError;
use crate::model::{Caller, Role};
use warp::{Filter, Rejection};

/// Roles allowed to publish and manage bootcamps.
pub const PUBLISHING_ROLES: &[Role] = &[Role::Publisher, Role::Admin];

/// Extracts the caller from `Authorization: Bearer <token>` or, failing that,
/// from the `token` cookie.
pub fn protect(auth: Authenticator) -> impl Filter<Extract = (Caller,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::cookie::optional("token"))
        .and_then(move |header: Option<String>, cookie: Option<String>| {
            let auth = auth.clone();
            async move {
                let token = header
                    .as_deref()
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(String::from)
                    .or(cookie)
                    .ok_or_else(|| warp::reject::custom(not_authorized()))?;
                auth.verify(&token).map_err(warp::reject::custom)
            }
        })
}

/// [`protect`] plus a check that the caller holds one of `roles`.
pub fn authorize(
    auth: Authenticator,
    roles: &'static [Role],
) -> impl Filter<Extract = (Caller,), Error = Rejection> + Clone {
    protect(auth).and_then(move |caller: Caller| async move {
        if roles.contains(&caller.role) {
            Ok(caller)
        } else {
            Err(warp::reject::custom(ApiError::Forbidden(format!(
                "User role {} is not authorized to access this route",
                caller.role
            ))))
        }
    })
}
