use crate::support::{admin, authenticator, bootcamp_input, publisher, service};
use devcamper::model::{Caller, Role};
use devcamper::route::routes;
use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::test::request;

fn bearer(caller: &Caller) -> String {
    format!("Bearer {}", authenticator().issue(caller).unwrap())
}

fn body(res: &warp::http::Response<impl AsRef<[u8]>>) -> Value {
    serde_json::from_slice(res.body().as_ref()).expect("response is json")
}

#[tokio::test]
async fn create_requires_a_token() {
    let (service, store) = service();
    let api = routes(service, authenticator());

    let res = request()
        .method("POST")
        .path("/api/v1/bootcamps")
        .json(&bootcamp_input("Devworks"))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body(&res),
        json!({"success": false, "error": "Not authorized to access this route"})
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn plain_users_cannot_publish() {
    let (service, _) = service();
    let api = routes(service, authenticator());

    let res = request()
        .method("POST")
        .path("/api/v1/bootcamps")
        .header("authorization", bearer(&Caller::new("u3", Role::User)))
        .json(&bootcamp_input("Devworks"))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body(&res)["error"],
        "User role user is not authorized to access this route"
    );
}

#[tokio::test]
async fn token_cookie_is_accepted() {
    let (service, _) = service();
    let api = routes(service, authenticator());
    let token = authenticator().issue(&publisher("u1")).unwrap();

    let res = request()
        .method("POST")
        .path("/api/v1/bootcamps")
        .header("cookie", format!("token={}", token))
        .json(&bootcamp_input("Devworks"))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn crud_round_trip() {
    let (service, _) = service();
    let api = routes(service, authenticator());
    let owner = publisher("u1");

    let res = request()
        .method("POST")
        .path("/api/v1/bootcamps")
        .header("authorization", bearer(&owner))
        .json(&json!({
            "name": "Devworks Bootcamp",
            "description": "Devworks is a full stack JavaScript Bootcamp",
            "careers": ["Web Development", "UI/UX", "Business"],
            "user": "someone-else",
            "jobAssistance": true
        }))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = body(&res);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["user"], "u1");
    assert_eq!(created["data"]["slug"], "devworks-bootcamp");
    let id = created["data"]["_id"].as_str().unwrap().to_string();

    let res = request()
        .path(&format!("/api/v1/bootcamps/{}", id))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(&res)["data"]["name"], "Devworks Bootcamp");

    let res = request()
        .method("PUT")
        .path(&format!("/api/v1/bootcamps/{}", id))
        .header("authorization", bearer(&owner))
        .json(&json!({ "housing": true }))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = body(&res);
    assert_eq!(updated["data"]["housing"], true);
    assert_eq!(updated["data"]["jobAssistance"], true);

    let res = request()
        .method("DELETE")
        .path(&format!("/api/v1/bootcamps/{}", id))
        .header("authorization", bearer(&publisher("u2")))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body(&res)["error"],
        "User u2 is not authorized to delete this bootcamp"
    );

    let res = request()
        .method("DELETE")
        .path(&format!("/api/v1/bootcamps/{}", id))
        .header("authorization", bearer(&owner))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body(&res), json!({"success": true, "data": {}}));

    let res = request()
        .path(&format!("/api/v1/bootcamps/{}", id))
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body(&res),
        json!({
            "success": false,
            "error": format!("Bootcamp not found with id of {}", id)
        })
    );
}

#[tokio::test]
async fn second_bootcamp_is_a_bad_request() {
    let (service, _) = service();
    let api = routes(service, authenticator());
    let owner = publisher("u1");

    for (name, status) in [
        ("Devworks", StatusCode::CREATED),
        ("ModernTech", StatusCode::BAD_REQUEST),
    ] {
        let res = request()
            .method("POST")
            .path("/api/v1/bootcamps")
            .header("authorization", bearer(&owner))
            .json(&bootcamp_input(name))
            .reply(&api)
            .await;
        assert_eq!(res.status(), status);
    }
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (service, _) = service();
    let api = routes(service, authenticator());

    let res = request()
        .method("POST")
        .path("/api/v1/bootcamps")
        .header("authorization", bearer(&admin("a1")))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(&res)["success"], false);
}

#[tokio::test]
async fn stat_is_not_read_as_an_id() {
    let (service, _) = service();
    let api = routes(service, authenticator());

    let res = request().path("/api/v1/bootcamps/stat").reply(&api).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body(&res),
        json!({
            "success": true,
            "data": { "jobAssistance": [], "jobGuarantee": [], "housing": [] }
        })
    );
}

#[tokio::test]
async fn list_applies_query_parameters() {
    let (service, _) = service();
    let root = admin("a1");
    for (name, cost, housing) in [
        ("Alpha", 5000.0, true),
        ("Bravo", 9000.0, false),
        ("Charlie", 12000.0, true),
    ] {
        let input = devcamper::model::BootcampInput {
            average_cost: Some(cost),
            housing: Some(housing),
            ..bootcamp_input(name)
        };
        let _ = service.create(&root, input).await.unwrap();
    }
    let api = routes(service, authenticator());

    let res = request()
        .path("/api/v1/bootcamps?averageCost%5Blte%5D=10000&select=name,averageCost&sort=-averageCost")
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let listing = body(&res);
    assert_eq!(listing["success"], true);
    assert_eq!(listing["count"], 2);
    assert_eq!(listing["pagination"], json!({}));
    assert_eq!(listing["data"][0]["name"], "Bravo");
    assert_eq!(listing["data"][1]["name"], "Alpha");
    assert!(listing["data"][0].get("housing").is_none());
    assert!(listing["data"][0].get("_id").is_some());

    let res = request()
        .path("/api/v1/bootcamps?housing=true&sort=name&limit=1&page=2")
        .reply(&api)
        .await;
    let listing = body(&res);
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["data"][0]["name"], "Charlie");
    assert_eq!(listing["pagination"], json!({ "prev": { "page": 1, "limit": 1 } }));

    let res = request()
        .path("/api/v1/bootcamps?page=zero")
        .reply(&api)
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let (service, _) = service();
    let api = routes(service, authenticator());

    let res = request().path("/api/v1/courses").reply(&api).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(&res)["success"], false);

    let res = request().path("/health").reply(&api).await;
    assert_eq!(res.status(), StatusCode::OK);
}
