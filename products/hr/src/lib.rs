//! HR vertical slice: employee create and list.
//!
//! Handlers take an explicit [`EmployeeStore`] handle and a typed
//! [`EmployeeInput`]; they keep no state between calls.

use entity::employees;
use platform_api::ApiError;
use platform_db::{DbError, EmployeeStore, NewEmployee};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

mod memory;

pub use memory::MemoryEmployeeStore;

/// Persisted employee as returned to callers.
pub type Employee = employees::Model;

pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_RATE: i32 = 0;
/// Fallback for `emp_field`.
pub const DEFAULT_FIELD: &str = "Unassigned";

/// Longest accepted name or field, matching the `varchar(255)` columns.
pub const MAX_TEXT_LEN: usize = 255;

/// `0.00`
pub fn default_salary() -> Decimal {
    Decimal::new(0, 2)
}

/// Largest salary that fits `numeric(12, 2)`.
pub fn max_salary() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

#[derive(Debug, Error)]
pub enum HrError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Persistence(#[from] DbError),
}

pub type HrResult<T> = Result<T, HrError>;

impl From<HrError> for ApiError {
    fn from(value: HrError) -> Self {
        match value {
            HrError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            HrError::Persistence(err) => ApiError::internal(err.into()),
        }
    }
}

/// The four recognised request keys. Every key is optional; `null` counts as
/// absent.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EmployeeInput {
    #[serde(default)]
    pub emp_name: Option<String>,
    #[serde(default)]
    pub emp_salary: Option<Decimal>,
    #[serde(default)]
    pub emp_rate: Option<i32>,
    #[serde(default)]
    pub emp_field: Option<String>,
}

impl EmployeeInput {
    /// Field-wise overlay: values present in `other` replace ours.
    pub fn overlay(self, other: EmployeeInput) -> EmployeeInput {
        EmployeeInput {
            emp_name: other.emp_name.or(self.emp_name),
            emp_salary: other.emp_salary.or(self.emp_salary),
            emp_rate: other.emp_rate.or(self.emp_rate),
            emp_field: other.emp_field.or(self.emp_field),
        }
    }

    /// Substitute defaults for absent fields. Strings are trimmed and blank
    /// strings count as absent.
    pub fn resolve(self) -> NewEmployee {
        NewEmployee {
            name: non_blank(self.emp_name).unwrap_or_else(|| DEFAULT_NAME.to_string()),
            salary: self
                .emp_salary
                .map(to_cents)
                .unwrap_or_else(default_salary),
            rate: self.emp_rate.unwrap_or(DEFAULT_RATE),
            field: non_blank(self.emp_field).unwrap_or_else(|| DEFAULT_FIELD.to_string()),
        }
    }
}

/// Round half away from zero, then pad to exactly two decimal places.
fn to_cents(salary: Decimal) -> Decimal {
    let mut cents = salary.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(2);
    cents
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Range checks on a resolved payload.
pub fn validate(employee: &NewEmployee) -> HrResult<()> {
    if employee.salary < Decimal::ZERO {
        return Err(HrError::InvalidInput("emp_salary must not be negative".into()));
    }
    if employee.salary > max_salary() {
        return Err(HrError::InvalidInput(format!(
            "emp_salary must not exceed {}",
            max_salary()
        )));
    }
    if employee.rate < 0 {
        return Err(HrError::InvalidInput("emp_rate must not be negative".into()));
    }
    if employee.name.chars().count() > MAX_TEXT_LEN {
        return Err(HrError::InvalidInput(format!(
            "emp_name must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    if employee.field.chars().count() > MAX_TEXT_LEN {
        return Err(HrError::InvalidInput(format!(
            "emp_field must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

/// Resolve defaults, validate, and insert one employee.
///
/// Store failures are returned unchanged inside [`HrError::Persistence`].
#[instrument(name = "hr.create_employee", skip_all)]
pub async fn create_employee(
    store: &dyn EmployeeStore,
    input: EmployeeInput,
) -> HrResult<Employee> {
    let employee = input.resolve();
    validate(&employee)?;
    let saved = store.insert(employee).await?;
    info!(id = saved.id, "employee created");
    Ok(saved)
}

/// Every employee in store order.
#[instrument(name = "hr.list_employees", skip_all)]
pub async fn list_employees(store: &dyn EmployeeStore) -> HrResult<Vec<Employee>> {
    Ok(store.list_all().await?)
}

/// Fixture rows used by the `seed` command.
pub fn demo_employees() -> Vec<EmployeeInput> {
    vec![
        EmployeeInput {
            emp_name: Some("Alice Martin".into()),
            emp_salary: Some(Decimal::new(500_000, 2)),
            emp_rate: Some(4),
            emp_field: Some("Engineering".into()),
        },
        EmployeeInput {
            emp_name: Some("Bruno Costa".into()),
            emp_salary: Some(Decimal::new(425_050, 2)),
            emp_rate: Some(3),
            emp_field: Some("Finance".into()),
        },
        EmployeeInput::default(),
    ]
}
