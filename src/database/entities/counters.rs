//! Named id counters. Allocation returns the prior value so every
//! caller observes a unique id; the tournament counter wraps back to
//! zero after reaching the 32-bit ceiling.

use crate::database::DbResult;
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection, TransactionTrait};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "counters")]
pub struct Model {
    /// Counter name
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Next value is `seq + 1`; allocation hands out `seq`
    pub seq: u32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Counter for gathering ids
pub const GATHERING_ID: &str = "gathering_id";
/// Counter for tournament ids
pub const TOURNAMENT_ID: &str = "tournament_id";
/// Counter for datastore object ids
pub const DATASTORE_OBJECT_ID: &str = "datastore_object_id";

/// Counters seeded at boot with their initial values
const SEEDS: [(&str, u32); 3] = [
    (GATHERING_ID, 1000),
    (TOURNAMENT_ID, 20000),
    (DATASTORE_OBJECT_ID, 20000),
];

impl Model {
    /// Seeds the boot counters, leaving existing rows untouched
    pub async fn seed_defaults(db: &DatabaseConnection) -> DbResult<()> {
        for (id, initial) in SEEDS {
            Entity::insert(ActiveModel {
                id: Set(id.to_string()),
                seq: Set(initial),
            })
            .on_conflict(OnConflict::column(Column::Id).do_nothing().to_owned())
            .do_nothing()
            .exec(db)
            .await?;
        }
        Ok(())
    }

    /// Allocates the next value from the named counter. The read and
    /// increment happen in one transaction so concurrent callers each
    /// observe a distinct value.
    pub async fn next(db: &DatabaseConnection, id: &str) -> DbResult<u32> {
        let txn = db.begin().await?;

        let counter = Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("missing counter {id}")))?;

        let current = counter.seq;
        let next = if current == u32::MAX { 0 } else { current + 1 };

        let mut counter: ActiveModel = counter.into();
        counter.seq = Set(next);
        counter.update(&txn).await?;

        txn.commit().await?;
        Ok(current)
    }
}

#[cfg(test)]
mod test {
    use super::{Model, GATHERING_ID, TOURNAMENT_ID};
    use crate::database::connect_memory;
    use sea_orm::{ActiveValue::Set, EntityTrait};

    #[tokio::test]
    async fn test_allocation_is_unique_and_increasing() {
        let db = connect_memory().await;

        let mut seen = Vec::new();
        for _ in 0..32 {
            seen.push(Model::next(&db, GATHERING_ID).await.unwrap());
        }

        // Strictly increasing from the seeded initial value
        assert_eq!(seen[0], 1000);
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn test_parallel_allocation_is_distinct() {
        let db = connect_memory().await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                let mut values = Vec::new();
                for _ in 0..4 {
                    values.push(Model::next(&db, GATHERING_ID).await.unwrap());
                }
                values
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            let values = handle.await.unwrap();
            // Each worker observes its own values strictly increasing
            assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
            all.extend(values);
        }

        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 32);
        assert!(all.iter().all(|value| *value >= 1000));
    }

    #[tokio::test]
    async fn test_wrap_at_ceiling() {
        let db = connect_memory().await;

        super::Entity::update(super::ActiveModel {
            id: Set(TOURNAMENT_ID.to_string()),
            seq: Set(u32::MAX),
        })
        .exec(&db)
        .await
        .unwrap();

        assert_eq!(Model::next(&db, TOURNAMENT_ID).await.unwrap(), u32::MAX);
        assert_eq!(Model::next(&db, TOURNAMENT_ID).await.unwrap(), 0);
    }
}
