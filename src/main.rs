extern crate pretty_env_logger;

use devcamper::auth::Authenticator;
use devcamper::config::Config;
use devcamper::route::routes;
use devcamper::service::BootcampService;
use devcamper::store::BootcampStoreMongoAdapter;
use std::sync::Arc;
use warp::Filter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;
    pretty_env_logger::init();
    log::info!("Starting server on {}", config.server);

    let client = mongodb::Client::with_uri_str(&config.mongo_url).await?;
    let store = BootcampStoreMongoAdapter::new(client.database(&config.database));
    store.ensure_indexes().await?;

    let service = BootcampService::new(Arc::new(store));
    let auth = Authenticator::new(
        &config.jwt_secret,
        chrono::Duration::days(config.jwt_expire_days),
    );
    let api = routes(service, auth).with(warp::log("devcamper::api"));
    warp::serve(api).run(config.server).await;
    Ok(())
}
