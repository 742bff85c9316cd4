use crate::support::{admin, bootcamp_input, publisher, service};
use devcamper::error::ApiError;
use devcamper::model::{BootcampInput, Career, StatField};
use devcamper::service::query::ListQuery;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let (service, _) = service();
    let caller = admin("a1");
    let id = ObjectId::new().to_hex();

    for id in [id.as_str(), "not-an-object-id"] {
        let expected = format!("Bootcamp not found with id of {}", id);
        let err = service.get(id).await.unwrap_err();
        assert!(matches!(&err, ApiError::NotFound(message) if *message == expected));
        let err = service
            .update(&caller, id, BootcampInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = service.delete(&caller, id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}

#[tokio::test]
async fn publishers_own_a_single_bootcamp() {
    let (service, store) = service();
    let owner = publisher("u1");

    let mut input = bootcamp_input("Devworks");
    let _ = input
        .extra
        .insert("user".to_string(), Value::String("u9".to_string()));
    let created = service.create(&owner, input).await.unwrap();
    assert_eq!(created.user, "u1");
    assert_eq!(created.slug.as_deref(), Some("devworks"));

    let err = service
        .create(&owner, bootcamp_input("ModernTech"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(
        err.to_string(),
        "The user with ID u1 has already published a bootcamp"
    );
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn admins_are_not_limited() {
    let (service, store) = service();
    let owner = admin("a1");
    for name in ["Codemasters", "Devcentral", "ModernTech"] {
        let created = service.create(&owner, bootcamp_input(name)).await.unwrap();
        assert_eq!(created.user, "a1");
    }
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let (service, _) = service();
    let _ = service
        .create(&publisher("u1"), bootcamp_input("Devworks"))
        .await
        .unwrap();
    let err = service
        .create(&publisher("u2"), bootcamp_input("Devworks"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Duplicate field value entered");
}

#[tokio::test]
async fn strangers_cannot_modify() {
    let (service, _) = service();
    let created = service
        .create(&publisher("u1"), bootcamp_input("Devworks"))
        .await
        .unwrap();
    let id = created.id.clone().unwrap();
    let stranger = publisher("u2");

    let err = service
        .update(
            &stranger,
            &id,
            BootcampInput {
                housing: Some(true),
                ..BootcampInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert_eq!(
        err.to_string(),
        "User u2 is not authorized to update this bootcamp"
    );

    let err = service.delete(&stranger, &id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "User u2 is not authorized to delete this bootcamp"
    );

    assert_eq!(service.get(&id).await.unwrap(), created);
}

#[tokio::test]
async fn publisher_admin_scenario() {
    let (service, _) = service();
    let a = publisher("u1");
    let b = publisher("u2");
    let root = admin("a1");

    let b1 = service.create(&a, bootcamp_input("B1")).await.unwrap();
    let b1_id = b1.id.clone().unwrap();

    let err = service.create(&a, bootcamp_input("B2")).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let b3 = service.create(&root, bootcamp_input("B3")).await.unwrap();
    assert_eq!(b3.user, "a1");

    let updated = service
        .update(
            &a,
            &b1_id,
            BootcampInput {
                housing: Some(true),
                ..BootcampInput::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.housing);
    assert!(service.get(&b1_id).await.unwrap().housing);

    let err = service.delete(&b, &b1_id).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert!(service.get(&b1_id).await.is_ok());
}

#[tokio::test]
async fn admins_may_modify_any_bootcamp() {
    let (service, _) = service();
    let created = service
        .create(&publisher("u1"), bootcamp_input("Devworks"))
        .await
        .unwrap();
    let id = created.id.unwrap();
    let root = admin("a1");

    let updated = service
        .update(
            &root,
            &id,
            BootcampInput {
                average_cost: Some(10000.0),
                ..BootcampInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.average_cost, Some(10000.0));
    assert_eq!(updated.user, "u1");

    service.delete(&root, &id).await.unwrap();
    assert!(matches!(
        service.get(&id).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn stats_on_empty_store() {
    let (service, _) = service();
    let stats = service.stats().await.unwrap();
    assert!(stats.job_assistance.is_empty());
    assert!(stats.job_guarantee.is_empty());
    assert!(stats.housing.is_empty());
}

#[tokio::test]
async fn stats_counts_add_up() {
    let (service, _) = service();
    let root = admin("a1");
    let careers = [Career::Business, Career::DataScience, Career::Business, Career::Other];
    for (i, career) in careers.iter().enumerate() {
        let input = BootcampInput {
            careers: Some(vec![*career]),
            job_assistance: Some(i % 2 == 0),
            housing: Some(i == 0),
            ..bootcamp_input(&format!("Bootcamp {}", i))
        };
        let _ = service.create(&root, input).await.unwrap();
    }

    let stats = service.stats().await.unwrap();
    let total: i64 = stats.job_assistance.iter().map(|group| group.sum).sum();
    assert_eq!(total, careers.len() as i64);

    assert_eq!(stats.job_guarantee.len(), 1);
    assert_eq!(stats.job_guarantee[0].sum, 4);
    assert_eq!(
        stats.job_guarantee[0].key.get(StatField::JobGuarantee.as_str()),
        Some(&Value::Bool(false))
    );

    let housed = stats
        .housing
        .iter()
        .find(|group| group.key.get("housing") == Some(&Value::Bool(true)))
        .unwrap();
    assert_eq!(housed.sum, 1);
    assert_eq!(housed.all_careers, vec![Career::Business]);
}

#[tokio::test]
async fn list_forwards_store_page() {
    let (service, _) = service();
    let root = admin("a1");
    for i in 0..3 {
        let _ = service
            .create(&root, bootcamp_input(&format!("Bootcamp {}", i)))
            .await
            .unwrap();
    }
    let query = ListQuery {
        limit: 2,
        ..ListQuery::default()
    };
    let results = service.list(&query).await.unwrap();
    assert!(results.success);
    assert_eq!(results.count, 2);
    assert!(results.pagination.next.is_some());
    assert!(results.pagination.prev.is_none());
}
