use crate::route::with_service;
use crate::service::query::{ListQuery, ListResults};
use crate::service::BootcampService;
use std::collections::HashMap;
use warp::{Filter, Rejection};

/// Runs the listing described by the query string and hands the finished
/// result object to the next handler.
pub fn advanced_results(
    service: BootcampService,
) -> impl Filter<Extract = (ListResults,), Error = Rejection> + Clone {
    warp::query::<HashMap<String, String>>()
        .and(with_service(service))
        .and_then(compute)
}

async fn compute(
    params: HashMap<String, String>,
    service: BootcampService,
) -> Result<ListResults, Rejection> {
    let query = ListQuery::from_params(params).map_err(warp::reject::custom)?;
    log::debug!("listing bootcamps with {:?}", query);
    service.list(&query).await.map_err(warp::reject::custom)
}
