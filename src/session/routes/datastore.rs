//! Datastore calls: metadata CRUD, object search and the batched
//! metadata + blob presence lookup

use crate::database::entities::{
    counters, datastore_objects::CreateObject, Counter, DataStoreObject,
};
use crate::session::models::datastore::{
    ChangeMetaParam, DataIdRequest, DeleteObjectParam, GetObjectInfosParam, MetaInfo, ObjectInfo,
    PreparePostParam, PreparePostResponse, SearchParam, SearchResult,
};
use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::packet::Rmc;
use crate::session::SessionLink;
use crate::utils::types::DataID;
use log::debug;

/// Upper bound on search pages
const MAX_SEARCH_SIZE: u32 = 100;
/// Data type value meaning "any" in search filters
const DATA_TYPE_ANY: u16 = 0xFFFF;
/// Wire datetime sentinel meaning "no bound"
const DATETIME_UNBOUNDED: u64 = 671_076_024_059;

/// Interprets a wire datetime filter bound; zero and the sentinel
/// mean unbounded
fn wire_bound(value: u64) -> Option<chrono::DateTime<chrono::Utc>> {
    if value == 0 || value == DATETIME_UNBOUNDED {
        return None;
    }
    Some(crate::session::models::from_wire_datetime(value))
}

pub async fn handle_get_meta(
    session: SessionLink,
    DataIdRequest { data_id }: DataIdRequest,
) -> ServerResult<Rmc<MetaInfo>> {
    session.require_pid()?;
    let object = DataStoreObject::by_id(&session.app.db, data_id as DataID)
        .await?
        .ok_or(RendezvousError::InvalidIndex)?;
    Ok(Rmc(object.into_meta()))
}

pub async fn handle_prepare_post_object(
    session: SessionLink,
    param: PreparePostParam,
) -> ServerResult<Rmc<PreparePostResponse>> {
    let pid = session.require_pid()?;
    let app = &session.app;

    let data_id = Counter::next(&app.db, counters::DATASTORE_OBJECT_ID).await?;
    let object = DataStoreObject::create(
        &app.db,
        CreateObject {
            data_id,
            owner: pid,
            name: param.name,
            permission: param.permission.permission as u32,
            permission_recipients: param.permission.recipient_ids,
            delete_permission: param.delete_permission.permission as u32,
            delete_permission_recipients: param.delete_permission.recipient_ids,
            period: param.period as u32,
            meta_binary: param.meta_binary,
            tags: param.tags,
            data_type: param.data_type as u32,
            persistence_id: param.persistence_id as u32,
            size: param.size,
        },
    )
    .await?;

    let upload_url = app.object_store.object_url(&object.object_key());
    debug!("Prepared object post (ID: {data_id}, owner: {pid})");

    Ok(Rmc(PreparePostResponse {
        data_id: data_id as u64,
        upload_url,
    }))
}

pub async fn handle_change_meta(
    session: SessionLink,
    param: ChangeMetaParam,
) -> ServerResult<()> {
    let pid = session.require_pid()?;
    let app = &session.app;

    let object = DataStoreObject::by_id(&app.db, param.data_id as DataID)
        .await?
        .ok_or(RendezvousError::InvalidIndex)?;

    if object.owner != pid && object.update_password != param.update_password as i64 {
        return Err(RendezvousError::AccessDenied);
    }

    DataStoreObject::apply_change_meta(&app.db, object.data_id, &param).await?;
    debug!(
        "Changed object metadata (ID: {}, flags: {:#x})",
        object.data_id, param.modifies_flag
    );
    Ok(())
}

pub async fn handle_delete_object(
    session: SessionLink,
    param: DeleteObjectParam,
) -> ServerResult<()> {
    let pid = session.require_pid()?;
    let app = &session.app;

    let object = DataStoreObject::by_id(&app.db, param.data_id as DataID)
        .await?
        .ok_or(RendezvousError::InvalidIndex)?;

    if object.owner != pid && object.update_password != param.update_password as i64 {
        return Err(RendezvousError::AccessDenied);
    }

    DataStoreObject::delete_by_id(&app.db, object.data_id).await?;
    debug!("Deleted object (ID: {})", object.data_id);
    Ok(())
}

pub async fn handle_search_object(
    session: SessionLink,
    param: SearchParam,
) -> ServerResult<Rmc<SearchResult>> {
    session.require_pid()?;
    let app = &session.app;

    if param.result_range.size > MAX_SEARCH_SIZE {
        return Err(RendezvousError::InvalidArgument);
    }

    debug!(
        "Object search (target: {}, owner_type: {}, destinations: {}, refer: {}, option: {}, min_rating_freq: {})",
        param.search_target,
        param.owner_type,
        param.destination_ids.len(),
        param.refer_data_id,
        param.result_option,
        param.minimal_rating_frequency,
    );

    let created_after = wire_bound(param.created_after);
    let created_before = wire_bound(param.created_before);
    let updated_after = wire_bound(param.updated_after);
    let updated_before = wire_bound(param.updated_before);

    // Conjunction of the provided column filters
    let mut matches: Vec<DataStoreObject> = DataStoreObject::all(&app.db)
        .await?
        .into_iter()
        .filter(|row| param.owner_ids.is_empty() || param.owner_ids.contains(&row.owner))
        .filter(|row| {
            param.data_type == DATA_TYPE_ANY || row.data_type == param.data_type as u32
        })
        .filter(|row| {
            param
                .tags
                .iter()
                .all(|tag| row.tags.0.iter().any(|value| value == tag))
        })
        .filter(|row| created_after.map_or(true, |bound| row.created_at >= bound))
        .filter(|row| created_before.map_or(true, |bound| row.created_at <= bound))
        .filter(|row| updated_after.map_or(true, |bound| row.updated_at >= bound))
        .filter(|row| updated_before.map_or(true, |bound| row.updated_at <= bound))
        .collect();

    // Order by the requested column; non-zero result_order flips to
    // descending
    match param.result_order_column {
        1 => matches.sort_by_key(|row| row.created_at),
        2 => matches.sort_by_key(|row| row.updated_at),
        _ => matches.sort_by_key(|row| row.data_id),
    }
    if param.result_order != 0 {
        matches.reverse();
    }

    let total_count = matches.len() as u32;
    let result: Vec<MetaInfo> = matches
        .into_iter()
        .skip(param.result_range.offset as usize)
        .take(param.result_range.size as usize)
        .map(|row| row.into_meta())
        .collect();

    Ok(Rmc(SearchResult {
        total_count,
        result,
        total_count_type: 0,
    }))
}

pub async fn handle_get_object_infos(
    session: SessionLink,
    GetObjectInfosParam { data_ids }: GetObjectInfosParam,
) -> ServerResult<Rmc<Vec<ObjectInfo>>> {
    session.require_pid()?;
    let app = &session.app;

    let ids: Vec<DataID> = data_ids.into_iter().map(|id| id as DataID).collect();
    let objects = DataStoreObject::by_ids(&app.db, ids).await?;

    // Unknown ids are silently dropped; each surviving object gets a
    // blob presence probe against the CDN
    let mut infos = Vec::with_capacity(objects.len());
    for object in objects {
        let presence = app.object_store.probe(&object.object_key()).await?;
        infos.push(ObjectInfo {
            meta: object.into_meta(),
            present: presence.present,
            size: presence.content_length,
            url: presence.url,
        });
    }

    Ok(Rmc(infos))
}
