use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use validator::Validate;

/// Keys a request body may not set directly.
const RESERVED_FIELDS: [&str; 6] = ["_id", "id", "user", "slug", "createdAt", "ownerLock"];

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Publisher,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// The authenticated account a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    pub role: Role,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owners and admins may change a bootcamp.
    pub fn may_modify(&self, bootcamp: &Bootcamp) -> bool {
        bootcamp.user == self.id || self.is_admin()
    }
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Id of the owning account. Assigned at creation, never changed.
    pub user: String,

    pub name: Option<String>,

    /// URL friendly form of the name.
    pub slug: Option<String>,

    pub description: Option<String>,

    pub website: Option<String>,

    pub phone: Option<String>,

    pub email: Option<String>,

    pub address: Option<String>,

    #[serde(default)]
    pub careers: Vec<Career>,

    pub average_rating: Option<f64>,

    pub average_cost: Option<f64>,

    pub photo: Option<String>,

    #[serde(default)]
    pub housing: bool,

    #[serde(default)]
    pub job_assistance: bool,

    #[serde(default)]
    pub job_guarantee: bool,

    #[serde(default)]
    pub accept_gi: bool,

    pub created_at: Option<DateTime<Utc>>,

    /// Attributes without a dedicated field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bootcamp {
    /// Builds a new record owned by `owner` from a create body.
    pub fn from_input(input: BootcampInput, owner: &Caller, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            user: owner.id.clone(),
            slug: input.name.as_deref().map(slugify),
            name: input.name,
            description: input.description,
            website: input.website,
            phone: input.phone,
            email: input.email,
            address: input.address,
            careers: input.careers.unwrap_or_default(),
            average_rating: input.average_rating,
            average_cost: input.average_cost,
            photo: Some(input.photo.unwrap_or_else(|| DEFAULT_PHOTO.to_string())),
            housing: input.housing.unwrap_or_default(),
            job_assistance: input.job_assistance.unwrap_or_default(),
            job_guarantee: input.job_guarantee.unwrap_or_default(),
            accept_gi: input.accept_gi.unwrap_or_default(),
            created_at: Some(created_at),
            extra: input.extra,
        }
    }
}

/// Request body of create and update. Every field is optional so the same
/// type doubles as a partial update.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BootcampInput {
    #[validate(length(max = 50, message = "Name can not be more than 50 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description can not be more than 500 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[validate(email(message = "Please add a valid email"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub careers: Option<Vec<Career>>,

    #[validate(range(min = 1.0, max = 10.0, message = "Rating must be between 1 and 10"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_assistance: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_guarantee: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_gi: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BootcampInput {
    /// Drops reserved keys from the extension map. Keys that would be read as
    /// database operators are refused.
    pub fn sanitize(mut self) -> Result<Self, String> {
        for field in RESERVED_FIELDS {
            let _ = self.extra.remove(field);
        }
        if let Some(key) = self
            .extra
            .keys()
            .find(|key| key.starts_with('$') || key.contains('.'))
        {
            return Err(format!("Field name {} is not allowed", key));
        }
        Ok(self)
    }

    /// True when applying this input would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == BootcampInput::default()
    }
}

/// Flag a career report is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    JobAssistance,
    JobGuarantee,
    Housing,
}

impl StatField {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatField::JobAssistance => "jobAssistance",
            StatField::JobGuarantee => "jobGuarantee",
            StatField::Housing => "housing",
        }
    }

    pub fn value_of(&self, bootcamp: &Bootcamp) -> bool {
        match self {
            StatField::JobAssistance => bootcamp.job_assistance,
            StatField::JobGuarantee => bootcamp.job_guarantee,
            StatField::Housing => bootcamp.housing,
        }
    }
}

/// One group of the career report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerStat {
    /// `{<grouped field>: <value>}`
    #[serde(rename = "_id")]
    pub key: Map<String, Value>,

    /// Number of unwound (bootcamp, career) rows in the group.
    pub sum: i64,

    #[serde(rename = "allCarreers")]
    pub all_careers: Vec<Career>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootcampStats {
    pub job_assistance: Vec<CareerStat>,
    pub job_guarantee: Vec<CareerStat>,
    pub housing: Vec<CareerStat>,
}

/// Lowercase the name and join its alphanumeric runs with `-`.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
