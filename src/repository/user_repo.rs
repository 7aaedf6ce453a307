// ==========================================
// 车间排程系统 - 用户目录仓储
// ==========================================
// 用户目录只读，仅用于展示用户名
// ==========================================

use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection};

// ==========================================
// UserRepository - 用户名查询
// ==========================================
pub struct UserRepository;

impl UserRepository {
    /// 按 user_id 查询用户名
    pub fn find_username(conn: &Connection, user_id: &str) -> RepositoryResult<Option<String>> {
        match conn.query_row(
            "SELECT username FROM app_user WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        ) {
            Ok(username) => Ok(Some(username)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
