pub use sea_orm_migration::prelude::*;

mod m20240112_083045_create_status_tables;
mod m20240112_091500_create_gatherings_table;
mod m20240119_104200_create_tournament_tables;
mod m20240119_111000_create_ranking_tables;
mod m20240126_140900_create_datastore_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240112_083045_create_status_tables::Migration),
            Box::new(m20240112_091500_create_gatherings_table::Migration),
            Box::new(m20240119_104200_create_tournament_tables::Migration),
            Box::new(m20240119_111000_create_ranking_tables::Migration),
            Box::new(m20240126_140900_create_datastore_table::Migration),
        ]
    }
}
