//! Models for the datastore protocol

use super::ResultRange;
use crate::utils::stream::{DecodeResult, FromStream, StreamReader, StreamWriter, ToStream};

/// Access descriptor attached to stored objects
#[derive(Debug, Clone, Default)]
pub struct DataStorePermission {
    pub permission: u8,
    pub recipient_ids: Vec<u32>,
}

impl FromStream for DataStorePermission {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            permission: r.read_u8()?,
            recipient_ids: r.read_list()?,
        })
    }
}

impl ToStream for DataStorePermission {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u8(self.permission);
        w.write_list(&self.recipient_ids);
    }
}

/// Metadata update parameter. Every field is required; a request that
/// ends before all fields are read is rejected as invalid.
pub struct ChangeMetaParam {
    pub data_id: u64,
    pub modifies_flag: u32,
    pub name: String,
    pub permission: DataStorePermission,
    pub delete_permission: DataStorePermission,
    pub period: u16,
    pub meta_binary: Vec<u8>,
    pub tags: Vec<String>,
    pub update_password: u64,
    pub referred_count: u32,
    pub data_type: u16,
    pub status: u8,
}

impl FromStream for ChangeMetaParam {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            data_id: r.read_u64()?,
            modifies_flag: r.read_u32()?,
            name: r.read_string()?,
            permission: DataStorePermission::from_stream(r)?,
            delete_permission: DataStorePermission::from_stream(r)?,
            period: r.read_u16()?,
            meta_binary: r.read_qbuffer()?,
            tags: r.read_list()?,
            update_password: r.read_u64()?,
            referred_count: r.read_u32()?,
            data_type: r.read_u16()?,
            status: r.read_u8()?,
        })
    }
}

pub struct PreparePostParam {
    pub name: String,
    pub permission: DataStorePermission,
    pub delete_permission: DataStorePermission,
    pub period: u16,
    pub meta_binary: Vec<u8>,
    pub tags: Vec<String>,
    pub data_type: u16,
    pub persistence_id: u16,
    pub size: u32,
}

impl FromStream for PreparePostParam {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            name: r.read_string()?,
            permission: DataStorePermission::from_stream(r)?,
            delete_permission: DataStorePermission::from_stream(r)?,
            period: r.read_u16()?,
            meta_binary: r.read_qbuffer()?,
            tags: r.read_list()?,
            data_type: r.read_u16()?,
            persistence_id: r.read_u16()?,
            size: r.read_u32()?,
        })
    }
}

pub struct PreparePostResponse {
    pub data_id: u64,
    pub upload_url: String,
}

impl ToStream for PreparePostResponse {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u64(self.data_id);
        w.write_string(&self.upload_url);
    }
}

pub struct DataIdRequest {
    pub data_id: u64,
}

impl FromStream for DataIdRequest {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            data_id: r.read_u64()?,
        })
    }
}

pub struct DeleteObjectParam {
    pub data_id: u64,
    pub update_password: u64,
}

impl FromStream for DeleteObjectParam {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            data_id: r.read_u64()?,
            update_password: r.read_u64()?,
        })
    }
}

/// Column filter set for object searches
pub struct SearchParam {
    pub search_target: u8,
    pub owner_ids: Vec<u32>,
    pub owner_type: u8,
    pub destination_ids: Vec<u64>,
    pub data_type: u16,
    pub created_after: u64,
    pub created_before: u64,
    pub updated_after: u64,
    pub updated_before: u64,
    pub refer_data_id: u32,
    pub tags: Vec<String>,
    pub result_order_column: u8,
    pub result_order: u8,
    pub result_range: ResultRange,
    pub result_option: u8,
    pub minimal_rating_frequency: u32,
}

impl FromStream for SearchParam {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            search_target: r.read_u8()?,
            owner_ids: r.read_list()?,
            owner_type: r.read_u8()?,
            destination_ids: r.read_list()?,
            data_type: r.read_u16()?,
            created_after: r.read_u64()?,
            created_before: r.read_u64()?,
            updated_after: r.read_u64()?,
            updated_before: r.read_u64()?,
            refer_data_id: r.read_u32()?,
            tags: r.read_list()?,
            result_order_column: r.read_u8()?,
            result_order: r.read_u8()?,
            result_range: ResultRange::from_stream(r)?,
            result_option: r.read_u8()?,
            minimal_rating_frequency: r.read_u32()?,
        })
    }
}

/// Object metadata returned by lookups and searches
#[derive(Debug, Clone, Default)]
pub struct MetaInfo {
    pub data_id: u64,
    pub owner: u32,
    pub size: u32,
    pub name: String,
    pub data_type: u16,
    pub meta_binary: Vec<u8>,
    pub permission: DataStorePermission,
    pub delete_permission: DataStorePermission,
    pub created_time: u64,
    pub updated_time: u64,
    pub period: u16,
    pub status: u8,
    pub referred_count: u32,
    pub refer_data_id: u32,
    pub flag: u32,
    pub referred_time: u64,
    pub expire_time: u64,
    pub tags: Vec<String>,
}

impl ToStream for MetaInfo {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u64(self.data_id);
        w.write_u32(self.owner);
        w.write_u32(self.size);
        w.write_string(&self.name);
        w.write_u16(self.data_type);
        w.write_qbuffer(&self.meta_binary);
        self.permission.to_stream(w);
        self.delete_permission.to_stream(w);
        w.write_u64(self.created_time);
        w.write_u64(self.updated_time);
        w.write_u16(self.period);
        w.write_u8(self.status);
        w.write_u32(self.referred_count);
        w.write_u32(self.refer_data_id);
        w.write_u32(self.flag);
        w.write_u64(self.referred_time);
        w.write_u64(self.expire_time);
        w.write_list(&self.tags);
    }
}

pub struct SearchResult {
    pub total_count: u32,
    pub result: Vec<MetaInfo>,
    pub total_count_type: u8,
}

impl ToStream for SearchResult {
    fn to_stream(&self, w: &mut StreamWriter) {
        w.write_u32(self.total_count);
        w.write_list(&self.result);
        w.write_u8(self.total_count_type);
    }
}

pub struct GetObjectInfosParam {
    pub data_ids: Vec<u64>,
}

impl FromStream for GetObjectInfosParam {
    fn from_stream(r: &mut StreamReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            data_ids: r.read_list()?,
        })
    }
}

/// Metadata plus blob presence for a single object
pub struct ObjectInfo {
    pub meta: MetaInfo,
    pub present: bool,
    pub size: u32,
    pub url: String,
}

impl ToStream for ObjectInfo {
    fn to_stream(&self, w: &mut StreamWriter) {
        self.meta.to_stream(w);
        w.write_bool(self.present);
        w.write_u32(self.size);
        w.write_string(&self.url);
    }
}
