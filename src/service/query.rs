use crate::error::ApiError;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_LIMIT: u64 = 25;
pub const MAX_LIMIT: u64 = 100;
pub const DEFAULT_SORT: &str = "-createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    /// Operator name understood by the document database.
    pub fn operator(&self) -> &'static str {
        match self {
            FilterOp::Eq => "$eq",
            FilterOp::Gt => "$gt",
            FilterOp::Gte => "$gte",
            FilterOp::Lt => "$lt",
            FilterOp::Lte => "$lte",
            FilterOp::In => "$in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    /// For `In` always an array.
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Listing parameters taken from the query string:
/// `?housing=true&averageCost[lte]=10000&select=name,careers&sort=-name&page=2&limit=10`
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<FieldFilter>,
    /// Empty means all fields.
    pub select: Vec<String>,
    pub sort: Vec<SortKey>,
    pub page: u64,
    pub limit: u64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            select: Vec::new(),
            sort: parse_sort(DEFAULT_SORT),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    pub fn from_params(params: HashMap<String, String>) -> Result<Self, ApiError> {
        let mut query = ListQuery::default();
        let mut filters = Vec::new();
        for (key, value) in params {
            match key.as_str() {
                "select" => query.select = split_list(&value),
                "sort" => query.sort = parse_sort(&value),
                "page" => query.page = parse_positive("page", &value)?,
                "limit" => query.limit = parse_positive("limit", &value)?.min(MAX_LIMIT),
                _ => filters.push(parse_filter(&key, &value)?),
            }
        }
        let in_range = (query.page - 1)
            .checked_mul(query.limit)
            .map_or(false, |skip| i64::try_from(skip).is_ok());
        if !in_range {
            return Err(ApiError::BadRequest(
                "Query parameter page is out of range".to_string(),
            ));
        }
        // Parameter order from the query map is arbitrary.
        filters.sort_by(|a, b| a.field.cmp(&b.field));
        query.filters = filters;
        Ok(query)
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Whether `field` survives the projection.
    pub fn selects(&self, field: &str) -> bool {
        self.select.is_empty() || field == "_id" || self.select.iter().any(|f| f == field)
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        let next = (self.page.saturating_mul(self.limit) < total).then(|| PageRef {
            page: self.page + 1,
            limit: self.limit,
        });
        let prev = (self.page > 1).then(|| PageRef {
            page: self.page - 1,
            limit: self.limit,
        });
        Pagination { next, prev }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

/// One page of a listing as produced by a store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListPage {
    /// Matching records across all pages.
    pub total: u64,
    pub items: Vec<Value>,
}

/// Ready to serialize listing handed to the list handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResults {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

impl ListResults {
    pub fn new(query: &ListQuery, page: ListPage) -> Self {
        Self {
            success: true,
            count: page.items.len(),
            pagination: query.pagination(page.total),
            data: page.items,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

fn parse_sort(value: &str) -> Vec<SortKey> {
    split_list(value)
        .into_iter()
        .map(|field| match field.strip_prefix('-') {
            Some(field) => SortKey {
                field: field.to_string(),
                descending: true,
            },
            None => SortKey {
                field,
                descending: false,
            },
        })
        .collect()
}

fn parse_positive(name: &str, value: &str) -> Result<u64, ApiError> {
    match value.parse::<u64>() {
        Ok(number) if number > 0 => Ok(number),
        _ => Err(ApiError::BadRequest(format!(
            "Query parameter {} must be a positive integer",
            name
        ))),
    }
}

fn parse_filter(key: &str, value: &str) -> Result<FieldFilter, ApiError> {
    let (field, op) = match key.split_once('[') {
        Some((field, rest)) => {
            let op = rest
                .strip_suffix(']')
                .and_then(FilterOp::parse)
                .ok_or_else(|| ApiError::BadRequest(format!("Unsupported filter {}", key)))?;
            (field, op)
        }
        None => (key, FilterOp::Eq),
    };
    if field.is_empty() || field.starts_with('$') {
        return Err(ApiError::BadRequest(format!("Unsupported filter {}", key)));
    }
    let value = match op {
        FilterOp::In => Value::Array(split_list(value).iter().map(|v| scalar(v)).collect()),
        _ => scalar(value),
    };
    Ok(FieldFilter {
        field: field.to_string(),
        op,
        value,
    })
}

/// Query strings are untyped: read booleans and numbers where they parse.
fn scalar(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(int) = value.parse::<i64>() {
                Value::from(int)
            } else if let Some(float) = value.parse::<f64>().ok().filter(|f| f.is_finite()) {
                Value::from(float)
            } else {
                Value::String(value.to_string())
            }
        }
    }
}
