//! Record store for employees.

use async_trait::async_trait;
use chrono::Utc;
use entity::employees;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, EntityTrait, QueryOrder, Set,
    Statement,
};
use tracing::debug;

use crate::{DbPool, DbResult};

/// Fully resolved employee payload, ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub salary: Decimal,
    pub rate: i32,
    pub field: String,
}

/// Persistence boundary consumed by the request handlers.
///
/// Implementations own the rows; callers hold no state between calls.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Insert one row and return it with the store-assigned id and timestamps.
    async fn insert(&self, employee: NewEmployee) -> DbResult<employees::Model>;

    /// Every row in ascending id order.
    async fn list_all(&self) -> DbResult<Vec<employees::Model>>;

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// sea-orm backed store.
#[derive(Clone, Debug)]
pub struct DbEmployeeStore {
    pool: DbPool,
}

impl DbEmployeeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl EmployeeStore for DbEmployeeStore {
    async fn insert(&self, employee: NewEmployee) -> DbResult<employees::Model> {
        let now = Utc::now().fixed_offset();
        let model = employees::ActiveModel {
            id: NotSet,
            employee_name: Set(employee.name),
            employee_salary: Set(employee.salary),
            employee_rate: Set(employee.rate),
            employee_field: Set(employee.field),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let saved = with_cents(model.insert(&self.pool).await?);
        debug!(id = saved.id, "employee row inserted");
        Ok(saved)
    }

    async fn list_all(&self) -> DbResult<Vec<employees::Model>> {
        let rows = employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(with_cents).collect())
    }

    async fn ping(&self) -> DbResult<()> {
        let backend = self.pool.get_database_backend();
        self.pool
            .execute(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }
}

/// SQLite hands decimals back through `f64`, dropping the column scale.
fn with_cents(mut row: employees::Model) -> employees::Model {
    row.employee_salary.rescale(2);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbError;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn migrated_store() -> DbEmployeeStore {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&pool, None).await.unwrap();
        DbEmployeeStore::new(pool)
    }

    fn payload(name: &str, salary: Decimal, rate: i32) -> NewEmployee {
        NewEmployee {
            name: name.to_string(),
            salary,
            rate,
            field: "Engineering".to_string(),
        }
    }

    #[tokio::test]
    async fn list_on_empty_table_is_empty() {
        let store = migrated_store().await;
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_lists_in_id_order() {
        let store = migrated_store().await;

        let first = store
            .insert(payload("Alice", Decimal::new(500_050, 2), 3))
            .await
            .unwrap();
        let second = store
            .insert(payload("Bob", Decimal::ZERO, 0))
            .await
            .unwrap();
        assert!(second.id > first.id);
        assert_eq!(first.employee_name, "Alice");
        assert_eq!(first.employee_salary, Decimal::new(500_050, 2));
        assert_eq!(first.created_at, first.updated_at);

        let rows = store.list_all().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, first.id);
        assert_eq!(rows[1].employee_name, "Bob");
        assert_eq!(rows[1].employee_salary, Decimal::ZERO);
        assert_eq!(rows[1].employee_salary.to_string(), "0.00");
        assert_eq!(rows[0].employee_salary.to_string(), "5000.50");
        assert_eq!(rows[1].employee_rate, 0);
        assert_eq!(rows[0].employee_field, "Engineering");
    }

    #[tokio::test]
    async fn missing_table_surfaces_as_persistence_error() {
        let pool = Database::connect("sqlite::memory:").await.unwrap();
        let store = DbEmployeeStore::new(pool);

        let err = store.list_all().await.unwrap_err();
        assert!(matches!(err, DbError::Persistence(_)));

        let err = store
            .insert(payload("Carol", Decimal::ONE, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Persistence(_)));
    }

    #[tokio::test]
    async fn ping_succeeds_on_live_connection() {
        let store = migrated_store().await;
        store.ping().await.unwrap();
    }
}
