// ==========================================
// 车间排程系统 - 资源目录接口
// ==========================================
// 职责: 资源目录的只读查询（目录本身由外部模块维护）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::resource::Resource;
use crate::repository::resource_repo::ResourceRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ResourceApi - 资源查询接口
// ==========================================
pub struct ResourceApi {
    conn: Arc<Mutex<Connection>>,
}

impl ResourceApi {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))
    }

    /// 资源列表（机组 + 工位；默认过滤已归档）
    pub fn list_resources(&self, include_archived: bool) -> ApiResult<Vec<Resource>> {
        let conn = self.get_conn()?;
        Ok(ResourceRepository::list_resources(&conn, include_archived)?)
    }
}
