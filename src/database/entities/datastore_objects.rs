//! Datastore object metadata rows. Blob bytes live in the external
//! object store; the blob key is derived, never stored.

use super::{StringList, U32List};
use crate::database::DbResult;
use crate::session::models::datastore::ChangeMetaParam;
use crate::utils::types::{DataID, PlayerID};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};
use serde::Serialize;

/// Persistence slot values below this derive player-scoped blob keys
pub const PERSISTENCE_SLOT_LIMIT: u16 = 1024;

#[derive(Serialize, Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "datastore_objects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub data_id: DataID,
    pub owner: PlayerID,
    pub name: String,
    pub permission: u32,
    pub permission_recipients: U32List,
    pub delete_permission: u32,
    pub delete_permission_recipients: U32List,
    pub period: u32,
    pub meta_binary: Vec<u8>,
    pub tags: StringList,
    pub update_password: i64,
    pub referred_count: u32,
    pub data_type: u32,
    pub status: u32,
    pub flag: u32,
    pub persistence_id: u32,
    pub size: u32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Values used to create a new object row
pub struct CreateObject {
    pub data_id: DataID,
    pub owner: PlayerID,
    pub name: String,
    pub permission: u32,
    pub permission_recipients: Vec<u32>,
    pub delete_permission: u32,
    pub delete_permission_recipients: Vec<u32>,
    pub period: u32,
    pub meta_binary: Vec<u8>,
    pub tags: Vec<String>,
    pub data_type: u32,
    pub persistence_id: u32,
    pub size: u32,
}

impl Model {
    /// The object-store key for this object's blob
    pub fn object_key(&self) -> String {
        object_key(self.owner, self.persistence_id, self.data_id)
    }

    /// Wire metadata representation
    pub fn into_meta(self) -> crate::session::models::datastore::MetaInfo {
        use crate::session::models::datastore::{DataStorePermission, MetaInfo};
        use crate::session::models::to_wire_datetime;

        MetaInfo {
            data_id: self.data_id as u64,
            owner: self.owner,
            size: self.size,
            name: self.name,
            data_type: self.data_type as u16,
            meta_binary: self.meta_binary,
            permission: DataStorePermission {
                permission: self.permission as u8,
                recipient_ids: self.permission_recipients.0,
            },
            delete_permission: DataStorePermission {
                permission: self.delete_permission as u8,
                recipient_ids: self.delete_permission_recipients.0,
            },
            created_time: to_wire_datetime(self.created_at),
            updated_time: to_wire_datetime(self.updated_at),
            period: self.period as u16,
            status: self.status as u8,
            referred_count: self.referred_count,
            refer_data_id: 0,
            flag: self.flag,
            referred_time: to_wire_datetime(self.created_at),
            expire_time: to_wire_datetime(self.updated_at),
            tags: self.tags.0,
        }
    }

    pub async fn create<C: ConnectionTrait>(db: &C, create: CreateObject) -> DbResult<Model> {
        let now = Utc::now();
        ActiveModel {
            data_id: Set(create.data_id),
            owner: Set(create.owner),
            name: Set(create.name),
            permission: Set(create.permission),
            permission_recipients: Set(U32List(create.permission_recipients)),
            delete_permission: Set(create.delete_permission),
            delete_permission_recipients: Set(U32List(create.delete_permission_recipients)),
            period: Set(create.period),
            meta_binary: Set(create.meta_binary),
            tags: Set(StringList(create.tags)),
            update_password: Set(0),
            referred_count: Set(0),
            data_type: Set(create.data_type),
            status: Set(0),
            flag: Set(0),
            persistence_id: Set(create.persistence_id),
            size: Set(create.size),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    pub async fn by_id<C: ConnectionTrait>(db: &C, data_id: DataID) -> DbResult<Option<Model>> {
        Entity::find_by_id(data_id).one(db).await
    }

    pub async fn by_ids<C: ConnectionTrait>(db: &C, ids: Vec<DataID>) -> DbResult<Vec<Model>> {
        Entity::find()
            .filter(Column::DataId.is_in(ids))
            .order_by_asc(Column::DataId)
            .all(db)
            .await
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, data_id: DataID) -> DbResult<()> {
        Entity::delete_many()
            .filter(Column::DataId.eq(data_id))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Applies a metadata change request over the stored row
    pub async fn apply_change_meta<C: ConnectionTrait>(
        db: &C,
        data_id: DataID,
        param: &ChangeMetaParam,
    ) -> DbResult<()> {
        Entity::update_many()
            .col_expr(Column::Name, Expr::value(param.name.clone()))
            .col_expr(
                Column::Permission,
                Expr::value(param.permission.permission as u32),
            )
            .col_expr(
                Column::PermissionRecipients,
                Expr::value(U32List(param.permission.recipient_ids.clone())),
            )
            .col_expr(
                Column::DeletePermission,
                Expr::value(param.delete_permission.permission as u32),
            )
            .col_expr(
                Column::DeletePermissionRecipients,
                Expr::value(U32List(param.delete_permission.recipient_ids.clone())),
            )
            .col_expr(Column::Period, Expr::value(param.period as u32))
            .col_expr(Column::MetaBinary, Expr::value(param.meta_binary.clone()))
            .col_expr(Column::Tags, Expr::value(StringList(param.tags.clone())))
            .col_expr(
                Column::UpdatePassword,
                Expr::value(param.update_password as i64),
            )
            .col_expr(Column::ReferredCount, Expr::value(param.referred_count))
            .col_expr(Column::DataType, Expr::value(param.data_type as u32))
            .col_expr(Column::Status, Expr::value(param.status as u32))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::DataId.eq(data_id))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn all<C: ConnectionTrait>(db: &C) -> DbResult<Vec<Model>> {
        Entity::find().order_by_asc(Column::DataId).all(db).await
    }
}

/// Derives the object-store key for a blob. Low persistence slots are
/// player-scoped ghost data; everything else is keyed by object id.
pub fn object_key(pid: PlayerID, persistence_id: u32, data_id: DataID) -> String {
    if persistence_id < PERSISTENCE_SLOT_LIMIT as u32 {
        format!("ghosts/{pid}/{persistence_id}.bin")
    } else {
        format!("mktv/{data_id}.bin")
    }
}

#[cfg(test)]
mod test {
    use super::object_key;

    #[test]
    fn test_object_key_derivation() {
        assert_eq!(object_key(7, 0, 1), "ghosts/7/0.bin");
        assert_eq!(object_key(7, 1023, 1), "ghosts/7/1023.bin");
        assert_eq!(object_key(7, 1024, 5000), "mktv/5000.bin");
        assert_eq!(object_key(7, 65535, 20000), "mktv/20000.bin");
    }
}
