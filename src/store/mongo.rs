use super::{BootcampStore, StoreError};
use crate::model::{Bootcamp, BootcampInput, CareerStat, StatField};
use crate::service::query::{FieldFilter, ListPage, ListQuery};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};

/// Set only on bootcamps of non-admin owners; a unique partial index on it
/// limits those owners to one bootcamp.
const OWNER_LOCK: &str = "ownerLock";
const OWNER_LOCK_INDEX: &str = "one_bootcamp_per_publisher";
const NAME_INDEX: &str = "unique_bootcamp_name";

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone)]
pub struct BootcampStoreMongoAdapter {
    db: Database,
}

impl BootcampStoreMongoAdapter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn bootcamps(&self) -> Collection<Document> {
        self.db.collection::<Document>("bootcamps")
    }

    /// Creates the indexes the store relies on. Safe to call on every start.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let owner_lock = IndexModel::builder()
            .keys(doc! { "ownerLock": 1 })
            .options(
                IndexOptions::builder()
                    .name(OWNER_LOCK_INDEX.to_string())
                    .unique(true)
                    .partial_filter_expression(doc! { "ownerLock": { "$exists": true } })
                    .build(),
            )
            .build();
        let name = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .name(NAME_INDEX.to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        let created = self
            .bootcamps()
            .create_indexes(vec![owner_lock, name], None)
            .await?;
        log::debug!("bootcamp indexes ready: {:?}", created.index_names);
        Ok(())
    }
}

#[async_trait]
impl BootcampStore for BootcampStoreMongoAdapter {
    async fn find_by_id(&self, id: &str) -> Result<Option<Bootcamp>, StoreError> {
        let filter = doc! { "_id": object_id(id)? };
        self.bootcamps()
            .find_one(filter, None)
            .await?
            .map(from_stored)
            .transpose()
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Option<Bootcamp>, StoreError> {
        self.bootcamps()
            .find_one(doc! { "user": owner }, None)
            .await?
            .map(from_stored)
            .transpose()
    }

    async fn insert(
        &self,
        bootcamp: Bootcamp,
        exclusive_owner: bool,
    ) -> Result<Bootcamp, StoreError> {
        let mut document = bson::to_document(&bootcamp)?;
        let _ = document.remove("_id");
        let _ = document.remove(OWNER_LOCK);
        if exclusive_owner {
            let _ = document.insert(OWNER_LOCK, bootcamp.user.clone());
        }
        let inserted = self
            .bootcamps()
            .insert_one(document, None)
            .await
            .map_err(|err| match classify_write(err) {
                StoreError::DuplicateField(index) if index.contains(OWNER_LOCK_INDEX) => {
                    StoreError::DuplicateOwner(bootcamp.user.clone())
                }
                other => other,
            })?;
        let id = inserted
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingId)?;
        Ok(Bootcamp {
            id: Some(id.to_hex()),
            ..bootcamp
        })
    }

    async fn update(
        &self,
        id: &str,
        changes: &BootcampInput,
    ) -> Result<Option<Bootcamp>, StoreError> {
        let filter = doc! { "_id": object_id(id)? };
        let changes = set_document(changes)?;
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.bootcamps()
            .find_one_and_update(filter, doc! { "$set": changes }, options)
            .await
            .map_err(classify_write)?
            .map(from_stored)
            .transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let oid = object_id(id)?;
        let deleted = self
            .bootcamps()
            .delete_one(doc! { "_id": oid }, None)
            .await?;
        if deleted.deleted_count == 0 {
            return Ok(false);
        }
        let courses = self
            .db
            .collection::<Document>("courses")
            .delete_many(doc! { "bootcamp": oid }, None)
            .await?;
        log::debug!(
            "removed {} courses of bootcamp {}",
            courses.deleted_count,
            id
        );
        Ok(true)
    }

    async fn list(&self, query: &ListQuery) -> Result<ListPage, StoreError> {
        let filter = filter_document(&query.filters)?;
        let total = self
            .bootcamps()
            .count_documents(filter.clone(), None)
            .await?;
        let cursor = self
            .bootcamps()
            .aggregate(list_pipeline(query, filter), None)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        let items = documents
            .into_iter()
            .map(|mut document| {
                normalize(&mut document);
                Bson::Document(document).into_relaxed_extjson()
            })
            .collect();
        Ok(ListPage { total, items })
    }

    async fn career_stats(&self, field: StatField) -> Result<Vec<CareerStat>, StoreError> {
        let cursor = self
            .bootcamps()
            .aggregate(career_stats_pipeline(field), None)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        documents
            .into_iter()
            .map(|document| bson::from_document::<CareerStat>(document).map_err(StoreError::from))
            .collect()
    }
}

/// Unwind `careers`, then count rows and collect distinct careers per value
/// of `field`.
pub fn career_stats_pipeline(field: StatField) -> Vec<Document> {
    let mut key = Document::new();
    let _ = key.insert(field.as_str(), format!("${}", field.as_str()));
    vec![
        doc! { "$unwind": "$careers" },
        doc! {
            "$group": {
                "_id": key,
                "sum": { "$sum": 1 },
                "allCarreers": { "$addToSet": "$careers" },
            }
        },
        doc! { "$sort": { "_id": 1 } },
    ]
}

/// `$set` body for a partial update. The owner lock is never client-writable.
fn set_document(changes: &BootcampInput) -> Result<Document, StoreError> {
    let mut document = bson::to_document(changes)?;
    let _ = document.remove(OWNER_LOCK);
    let _ = document.remove("user");
    Ok(document)
}

fn object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Stored shape to API shape: hex string ids, no internal fields.
fn normalize(document: &mut Document) {
    if let Ok(oid) = document.get_object_id("_id") {
        let _ = document.insert("_id", oid.to_hex());
    }
    let _ = document.remove(OWNER_LOCK);
}

fn from_stored(mut document: Document) -> Result<Bootcamp, StoreError> {
    normalize(&mut document);
    Ok(bson::from_document(document)?)
}

/// Duplicate key failures become [`StoreError::DuplicateField`] carrying the
/// server message, which names the violated index.
fn classify_write(err: mongodb::error::Error) -> StoreError {
    let duplicate = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(failure)) if failure.code == DUPLICATE_KEY => {
            Some(failure.message.clone())
        }
        ErrorKind::Command(failure) if failure.code == DUPLICATE_KEY => {
            Some(failure.message.clone())
        }
        _ => None,
    };
    match duplicate {
        Some(message) => StoreError::DuplicateField(message),
        None => StoreError::Database(err),
    }
}

fn filter_document(filters: &[FieldFilter]) -> Result<Document, StoreError> {
    let mut filter = Document::new();
    for condition in filters {
        let value = bson::to_bson(&condition.value)?;
        if !filter.contains_key(&condition.field) {
            let _ = filter.insert(condition.field.clone(), Document::new());
        }
        if let Some(Bson::Document(operators)) = filter.get_mut(&condition.field) {
            let _ = operators.insert(condition.op.operator(), value);
        }
    }
    Ok(filter)
}

fn list_pipeline(query: &ListQuery, filter: Document) -> Vec<Document> {
    let mut pipeline = vec![doc! { "$match": filter }];
    if !query.sort.is_empty() {
        let mut sort = Document::new();
        for key in &query.sort {
            let _ = sort.insert(key.field.clone(), if key.descending { -1 } else { 1 });
        }
        pipeline.push(doc! { "$sort": sort });
    }
    pipeline.push(doc! { "$skip": query.skip() as i64 });
    pipeline.push(doc! { "$limit": query.limit as i64 });
    if !query.select.is_empty() {
        let mut projection = Document::new();
        for field in &query.select {
            let _ = projection.insert(field.clone(), 1);
        }
        pipeline.push(doc! { "$project": projection });
    }
    if query.selects("user") {
        pipeline.extend(owner_population());
    }
    pipeline
}

/// Replaces `user` with the owner's account summary when the account exists.
fn owner_population() -> Vec<Document> {
    vec![
        doc! {
            "$lookup": {
                "from": "users",
                "let": { "owner": "$user" },
                "pipeline": [
                    { "$match": { "$expr": { "$eq": [{ "$toString": "$_id" }, "$$owner"] } } },
                    { "$project": { "_id": { "$toString": "$_id" }, "name": 1, "email": 1, "role": 1 } },
                ],
                "as": "populatedUser",
            }
        },
        doc! {
            "$addFields": {
                "user": { "$ifNull": [{ "$arrayElemAt": ["$populatedUser", 0] }, "$user"] },
            }
        },
        doc! { "$project": { "populatedUser": 0 } },
    ]
}
