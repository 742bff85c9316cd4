use devcamper::auth::Authenticator;
use devcamper::model::{BootcampInput, Caller, Career, Role};
use devcamper::service::BootcampService;
use devcamper::store::InMemoryBootcampStore;
use std::sync::Arc;

pub const SECRET: &str = "integration-secret";

pub fn service() -> (BootcampService, InMemoryBootcampStore) {
    let store = InMemoryBootcampStore::new();
    (BootcampService::new(Arc::new(store.clone())), store)
}

pub fn authenticator() -> Authenticator {
    Authenticator::new(SECRET, chrono::Duration::days(1))
}

pub fn publisher(id: &str) -> Caller {
    Caller::new(id, Role::Publisher)
}

pub fn admin(id: &str) -> Caller {
    Caller::new(id, Role::Admin)
}

pub fn bootcamp_input(name: &str) -> BootcampInput {
    BootcampInput {
        name: Some(name.to_string()),
        description: Some(format!("{} trains full stack developers", name)),
        careers: Some(vec![Career::WebDevelopment]),
        ..BootcampInput::default()
    }
}
