use crate::error::ApiError;
use crate::model::{Bootcamp, BootcampInput, BootcampStats, Caller, StatField};
use crate::service::query::{ListQuery, ListResults};
use crate::store::BootcampStore;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use validator::Validate;

/// Business rules of the bootcamp resource. Stateless apart from the store
/// handle, so clones are cheap and can be handed to every request.
#[derive(Clone)]
pub struct BootcampService {
    store: Arc<dyn BootcampStore>,
}

impl fmt::Debug for BootcampService {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("BootcampService").finish_non_exhaustive()
    }
}

impl BootcampService {
    pub fn new(store: Arc<dyn BootcampStore>) -> Self {
        Self { store }
    }

    /// Filtered, sorted and paginated listing.
    pub async fn list(&self, query: &ListQuery) -> Result<ListResults, ApiError> {
        let page = self.store.list(query).await?;
        Ok(ListResults::new(query, page))
    }

    pub async fn get(&self, id: &str) -> Result<Bootcamp, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::bootcamp_not_found(id))
    }

    /// Creates a bootcamp owned by `caller`. Publishers may own one bootcamp,
    /// admins any number.
    pub async fn create(&self, caller: &Caller, input: BootcampInput) -> Result<Bootcamp, ApiError> {
        let input = checked(input)?;
        if input.name.is_none() {
            return Err(ApiError::BadRequest("Please add a name".to_string()));
        }
        if input.description.is_none() {
            return Err(ApiError::BadRequest("Please add a description".to_string()));
        }

        let published = self.store.find_by_owner(&caller.id).await?;
        if published.is_some() && !caller.is_admin() {
            return Err(already_published(caller));
        }

        let bootcamp = Bootcamp::from_input(input, caller, Utc::now());
        let created = self.store.insert(bootcamp, !caller.is_admin()).await?;
        log::info!(
            "user {} created bootcamp {}",
            caller.id,
            created.id.as_deref().unwrap_or_default()
        );
        Ok(created)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: &str,
        input: BootcampInput,
    ) -> Result<Bootcamp, ApiError> {
        let bootcamp = self.get(id).await?;
        if !caller.may_modify(&bootcamp) {
            return Err(ApiError::Forbidden(format!(
                "User {} is not authorized to update this bootcamp",
                caller.id
            )));
        }
        let input = checked(input)?;
        self.store
            .update(id, &input)
            .await?
            .ok_or_else(|| ApiError::bootcamp_not_found(id))
    }

    pub async fn delete(&self, caller: &Caller, id: &str) -> Result<(), ApiError> {
        let bootcamp = self.get(id).await?;
        if !caller.may_modify(&bootcamp) {
            return Err(ApiError::Forbidden(format!(
                "User {} is not authorized to delete this bootcamp",
                caller.id
            )));
        }
        if !self.store.delete(id).await? {
            return Err(ApiError::bootcamp_not_found(id));
        }
        log::info!("user {} deleted bootcamp {}", caller.id, id);
        Ok(())
    }

    /// Career counts grouped by each program flag.
    pub async fn stats(&self) -> Result<BootcampStats, ApiError> {
        let (job_assistance, job_guarantee, housing) = tokio::try_join!(
            self.store.career_stats(StatField::JobAssistance),
            self.store.career_stats(StatField::JobGuarantee),
            self.store.career_stats(StatField::Housing),
        )?;
        Ok(BootcampStats {
            job_assistance,
            job_guarantee,
            housing,
        })
    }
}

fn already_published(caller: &Caller) -> ApiError {
    ApiError::BadRequest(format!(
        "The user with ID {} has already published a bootcamp",
        caller.id
    ))
}

fn checked(input: BootcampInput) -> Result<BootcampInput, ApiError> {
    let input = input.sanitize().map_err(ApiError::BadRequest)?;
    input.validate().map_err(|errors| {
        let mut messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .map(|error| match &error.message {
                Some(message) => message.to_string(),
                None => error.code.to_string(),
            })
            .collect();
        messages.sort();
        ApiError::BadRequest(messages.join(", "))
    })?;
    if is_blank(input.name.as_deref()) {
        return Err(ApiError::BadRequest("Please add a name".to_string()));
    }
    if is_blank(input.description.as_deref()) {
        return Err(ApiError::BadRequest("Please add a description".to_string()));
    }
    Ok(input)
}

/// Present but empty after trimming.
fn is_blank(value: Option<&str>) -> bool {
    value.map_or(false, |text| text.trim().is_empty())
}
