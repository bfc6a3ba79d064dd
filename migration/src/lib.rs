pub use sea_orm_migration::prelude::*;

mod m20240101_000001_employees;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_employees::Migration)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm_migration::sea_orm::Database;

    #[tokio::test]
    async fn up_then_down_leaves_no_pending_migrations_behind() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        assert_eq!(Migrator::get_pending_migrations(&db).await.unwrap().len(), 1);
        Migrator::up(&db, None).await.unwrap();
        assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());
        assert!(db_has_table(&db).await);

        Migrator::down(&db, Some(1)).await.unwrap();
        assert!(!db_has_table(&db).await);
    }

    async fn db_has_table(db: &sea_orm_migration::sea_orm::DatabaseConnection) -> bool {
        let manager = SchemaManager::new(db);
        manager.has_table("employees").await.unwrap()
    }
}
