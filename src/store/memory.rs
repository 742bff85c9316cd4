use super::{BootcampStore, StoreError};
use crate::model::{Bootcamp, BootcampInput, CareerStat, StatField};
use crate::service::query::{FieldFilter, FilterOp, ListPage, ListQuery};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process local store with the same observable behavior as the MongoDB
/// adapter, minus owner population on listings.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBootcampStore {
    records: Arc<RwLock<Vec<Stored>>>,
}

#[derive(Debug, Clone)]
struct Stored {
    bootcamp: Bootcamp,
    exclusive_owner: bool,
}

impl InMemoryBootcampStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn check_id(id: &str) -> Result<(), StoreError> {
    ObjectId::parse_str(id)
        .map(|_| ())
        .map_err(|_| StoreError::InvalidId(id.to_string()))
}

#[async_trait]
impl BootcampStore for InMemoryBootcampStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Bootcamp>, StoreError> {
        check_id(id)?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|stored| stored.bootcamp.id.as_deref() == Some(id))
            .map(|stored| stored.bootcamp.clone()))
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Option<Bootcamp>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|stored| stored.bootcamp.user == owner)
            .map(|stored| stored.bootcamp.clone()))
    }

    async fn insert(
        &self,
        bootcamp: Bootcamp,
        exclusive_owner: bool,
    ) -> Result<Bootcamp, StoreError> {
        let mut records = self.records.write().await;
        if exclusive_owner
            && records
                .iter()
                .any(|stored| stored.exclusive_owner && stored.bootcamp.user == bootcamp.user)
        {
            return Err(StoreError::DuplicateOwner(bootcamp.user));
        }
        if bootcamp.name.is_some()
            && records
                .iter()
                .any(|stored| stored.bootcamp.name == bootcamp.name)
        {
            return Err(StoreError::DuplicateField("name".to_string()));
        }
        let bootcamp = Bootcamp {
            id: Some(ObjectId::new().to_hex()),
            ..bootcamp
        };
        records.push(Stored {
            bootcamp: bootcamp.clone(),
            exclusive_owner,
        });
        Ok(bootcamp)
    }

    async fn update(
        &self,
        id: &str,
        changes: &BootcampInput,
    ) -> Result<Option<Bootcamp>, StoreError> {
        check_id(id)?;
        let mut records = self.records.write().await;
        let taken = |name: &String| {
            records.iter().any(|stored| {
                stored.bootcamp.id.as_deref() != Some(id)
                    && stored.bootcamp.name.as_ref() == Some(name)
            })
        };
        if changes.name.as_ref().map_or(false, taken) {
            return Err(StoreError::DuplicateField("name".to_string()));
        }
        let stored = match records
            .iter_mut()
            .find(|stored| stored.bootcamp.id.as_deref() == Some(id))
        {
            Some(stored) => stored,
            None => return Ok(None),
        };
        let mut current = serde_json::to_value(&stored.bootcamp)?;
        if let (Value::Object(fields), Value::Object(updates)) =
            (&mut current, serde_json::to_value(changes)?)
        {
            fields.extend(updates);
        }
        stored.bootcamp = serde_json::from_value(current)?;
        Ok(Some(stored.bootcamp.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        check_id(id)?;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|stored| stored.bootcamp.id.as_deref() != Some(id));
        Ok(records.len() != before)
    }

    async fn list(&self, query: &ListQuery) -> Result<ListPage, StoreError> {
        let records = self.records.read().await;
        let mut matching = Vec::new();
        for stored in records.iter() {
            let value = serde_json::to_value(&stored.bootcamp)?;
            if query.filters.iter().all(|filter| matches(&value, filter)) {
                matching.push(value);
            }
        }
        matching.sort_by(|a, b| {
            query
                .sort
                .iter()
                .map(|key| {
                    let ordering = compare(a.get(&key.field), b.get(&key.field));
                    if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit as usize)
            .map(|value| project(value, query))
            .collect();
        Ok(ListPage { total, items })
    }

    async fn career_stats(&self, field: StatField) -> Result<Vec<CareerStat>, StoreError> {
        let records = self.records.read().await;
        let mut groups: BTreeMap<bool, (i64, BTreeSet<_>)> = BTreeMap::new();
        for stored in records.iter() {
            let bootcamp = &stored.bootcamp;
            for career in &bootcamp.careers {
                let group = groups.entry(field.value_of(bootcamp)).or_default();
                group.0 += 1;
                let _ = group.1.insert(*career);
            }
        }
        Ok(groups
            .into_iter()
            .map(|(flag, (sum, careers))| {
                let mut key = Map::new();
                let _ = key.insert(field.as_str().to_string(), Value::Bool(flag));
                CareerStat {
                    key,
                    sum,
                    all_careers: careers.into_iter().collect(),
                }
            })
            .collect())
    }
}

fn matches(record: &Value, filter: &FieldFilter) -> bool {
    let missing = Value::Null;
    let candidates: Vec<&Value> = match record.get(&filter.field) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(value) => vec![value],
        None => vec![&missing],
    };
    candidates.into_iter().any(|candidate| match filter.op {
        FilterOp::Eq => equals(candidate, &filter.value),
        FilterOp::In => filter
            .value
            .as_array()
            .map_or(false, |options| options.iter().any(|option| equals(candidate, option))),
        FilterOp::Gt => ordered(candidate, &filter.value) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(
            ordered(candidate, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lt => ordered(candidate, &filter.value) == Some(Ordering::Less),
        FilterOp::Lte => matches!(
            ordered(candidate, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    })
}

fn equals(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Comparison between values of the same kind; `None` across kinds.
fn ordered(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sort order; missing and null values come first.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|value| !value.is_null());
    let b = b.filter(|value| !value.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => ordered(a, b).unwrap_or(Ordering::Equal),
    }
}

fn project(value: Value, query: &ListQuery) -> Value {
    match value {
        Value::Object(fields) if !query.select.is_empty() => Value::Object(
            fields
                .into_iter()
                .filter(|(field, _)| query.selects(field))
                .collect(),
        ),
        other => other,
    }
}
