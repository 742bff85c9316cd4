use crate::auth::Authenticator;
use crate::model::BootcampInput;
use crate::route::gate::{authorize, PUBLISHING_ROLES};
use crate::route::results::advanced_results;
use crate::route::with_service;
use crate::service::BootcampService;
use warp::{Filter, Rejection, Reply};

pub fn routes(
    service: BootcampService,
    auth: Authenticator,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    // Registered ahead of `/bootcamps/:id` so "stat" is not taken for an id.
    let get_stats = warp::path!("bootcamps" / "stat")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::get_stats);

    let get_bootcamps = warp::path!("bootcamps")
        .and(warp::get())
        .and(advanced_results(service.clone()))
        .and_then(handlers::get_bootcamps);

    let create_bootcamp = warp::path!("bootcamps")
        .and(warp::post())
        .and(authorize(auth.clone(), PUBLISHING_ROLES))
        .and(json_body())
        .and(with_service(service.clone()))
        .and_then(handlers::create_bootcamp);

    let get_bootcamp = warp::path!("bootcamps" / String)
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(handlers::get_bootcamp);

    let update_bootcamp = warp::path!("bootcamps" / String)
        .and(warp::put())
        .and(authorize(auth.clone(), PUBLISHING_ROLES))
        .and(json_body())
        .and(with_service(service.clone()))
        .and_then(handlers::update_bootcamp);

    let delete_bootcamp = warp::path!("bootcamps" / String)
        .and(warp::delete())
        .and(authorize(auth, PUBLISHING_ROLES))
        .and(with_service(service))
        .and_then(handlers::delete_bootcamp);

    get_stats
        .or(get_bootcamps)
        .or(create_bootcamp)
        .or(get_bootcamp)
        .or(update_bootcamp)
        .or(delete_bootcamp)
}

fn json_body() -> impl Filter<Extract = (BootcampInput,), Error = Rejection> + Clone {
    warp::body::content_length_limit(1024 * 16).and(warp::body::json())
}

mod handlers {
    use crate::model::{BootcampInput, Caller};
    use crate::route::Envelope;
    use crate::service::query::ListResults;
    use crate::service::BootcampService;
    use warp::http::StatusCode;

    pub async fn get_bootcamps(results: ListResults) -> Result<impl warp::Reply, warp::Rejection> {
        Ok(warp::reply::json(&results))
    }

    pub async fn get_bootcamp(
        id: String,
        service: BootcampService,
    ) -> Result<impl warp::Reply, warp::Rejection> {
        let bootcamp = service.get(&id).await.map_err(warp::reject::custom)?;
        Ok(Envelope::reply(bootcamp, StatusCode::OK))
    }

    pub async fn create_bootcamp(
        caller: Caller,
        input: BootcampInput,
        service: BootcampService,
    ) -> Result<impl warp::Reply, warp::Rejection> {
        log::info!("request body: {:?}", input);
        let bootcamp = service
            .create(&caller, input)
            .await
            .map_err(warp::reject::custom)?;
        Ok(Envelope::reply(bootcamp, StatusCode::CREATED))
    }

    pub async fn update_bootcamp(
        id: String,
        caller: Caller,
        input: BootcampInput,
        service: BootcampService,
    ) -> Result<impl warp::Reply, warp::Rejection> {
        log::info!("request body: {:?}", input);
        let bootcamp = service
            .update(&caller, &id, input)
            .await
            .map_err(warp::reject::custom)?;
        Ok(Envelope::reply(bootcamp, StatusCode::OK))
    }

    pub async fn delete_bootcamp(
        id: String,
        caller: Caller,
        service: BootcampService,
    ) -> Result<impl warp::Reply, warp::Rejection> {
        service
            .delete(&caller, &id)
            .await
            .map_err(warp::reject::custom)?;
        Ok(Envelope::reply(serde_json::json!({}), StatusCode::OK))
    }

    pub async fn get_stats(service: BootcampService) -> Result<impl warp::Reply, warp::Rejection> {
        let stats = service.stats().await.map_err(warp::reject::custom)?;
        Ok(Envelope::reply(stats, StatusCode::OK))
    }
}
