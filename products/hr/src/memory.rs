use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use platform_db::{DbResult, EmployeeStore, NewEmployee};

use crate::Employee;

/// In-process store. Ids are sequential starting at 1.
#[derive(Debug, Default)]
pub struct MemoryEmployeeStore {
    rows: Mutex<Vec<Employee>>,
}

impl MemoryEmployeeStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn insert(&self, employee: NewEmployee) -> DbResult<Employee> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Utc::now().fixed_offset();
        let id = rows.last().map_or(1, |last| last.id + 1);
        let row = Employee {
            id,
            employee_name: employee.name,
            employee_salary: employee.salary,
            employee_rate: employee.rate,
            employee_field: employee.field,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> DbResult<Vec<Employee>> {
        Ok(self.rows.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
