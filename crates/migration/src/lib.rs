pub use sea_orm_migration::prelude::*;

mod m20261019_000001_ledger;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261019_000001_ledger::Migration)]
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

    use super::*;

    async fn ledger_tables(db: &DatabaseConnection) -> i64 {
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM sqlite_master \
                 WHERE type = 'table' AND name IN ('accounts', 'entries', 'transfers')",
            ))
            .await
            .unwrap()
            .unwrap();
        row.try_get::<i64>("", "n").unwrap()
    }

    #[tokio::test]
    async fn ledger_migration_applies_and_reverts() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        Migrator::up(&db, None).await.unwrap();
        assert_eq!(ledger_tables(&db).await, 3);

        Migrator::down(&db, None).await.unwrap();
        assert_eq!(ledger_tables(&db).await, 0);

        Migrator::up(&db, None).await.unwrap();
        assert_eq!(ledger_tables(&db).await, 3);
    }
}
