//! # API Route Modules
//!
//! - `steps`: the step plan for a will type and stateless per-step
//!   validation.
//! - `drafts`: draft load and save, full-draft validation, and outline
//!   assembly, addressed by `(owner, will)`.

pub mod drafts;
pub mod steps;

use chrono::NaiveDate;
use serde::Deserialize;
use testament_core::parse_date;
use testament_schema::ValidationContext;
use utoipa::IntoParams;

use crate::error::AppError;

/// Reference date override shared by the validation endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TodayQuery {
    /// `YYYY-MM-DD`. Defaults to the current UTC date.
    pub today: Option<String>,
}

impl TodayQuery {
    pub fn context(&self) -> Result<ValidationContext, AppError> {
        match self.today.as_deref() {
            Some(raw) => {
                let today: NaiveDate = parse_date(raw)?;
                Ok(ValidationContext::new(today))
            }
            None => Ok(ValidationContext::current()),
        }
    }
}
