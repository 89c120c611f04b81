pub use sea_orm_migration::prelude::*;

mod m20260315_090000_clients;
mod m20260315_090100_accounts;
mod m20260315_090200_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260315_090000_clients::Migration),
            Box::new(m20260315_090100_accounts::Migration),
            Box::new(m20260315_090200_transactions::Migration),
        ]
    }
}
