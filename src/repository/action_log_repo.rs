// ==========================================
// 车间排程系统 - 操作日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 红线: record 在调用方提供的事务连接上执行，
//       审计失败与业务写入一起回滚
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::error::RepositoryResult;
use crate::repository::event_repo::{fmt_ts, parse_ts};
use rusqlite::{params, Connection, Row};

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================
pub struct ActionLogRepository;

impl ActionLogRepository {
    /// 插入操作日志
    ///
    /// # 参数
    /// - `conn`: 调用方事务的连接句柄（Transaction 解引用即为 Connection）
    /// - `log`: 操作日志实体
    pub fn record(conn: &Connection, log: &ActionLog) -> RepositoryResult<String> {
        conn.execute(
            r#"INSERT INTO action_log (
                action_id, actor, action_type, entity_type, entity_id,
                payload_json, action_ts
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &log.action_id,
                &log.actor,
                log.action_type.as_str(),
                &log.entity_type,
                &log.entity_id,
                log.payload_json.as_ref().map(|v| v.to_string()),
                fmt_ts(&log.action_ts),
            ],
        )?;

        Ok(log.action_id.clone())
    }

    /// 查询实体的最近操作记录（按时间倒序）
    pub fn list_by_entity(
        conn: &Connection,
        entity_type: &str,
        entity_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<ActionLog>> {
        let mut stmt = conn.prepare(
            r#"SELECT action_id, actor, action_type, entity_type, entity_id,
                      payload_json, action_ts
               FROM action_log
               WHERE entity_type = ? AND entity_id = ?
               ORDER BY action_ts DESC, action_id DESC
               LIMIT ?"#,
        )?;

        let logs = stmt
            .query_map(params![entity_type, entity_id, limit as i64], Self::map_row)?
            .collect::<Result<Vec<ActionLog>, _>>()?;

        Ok(logs)
    }

    fn map_row(row: &Row) -> rusqlite::Result<ActionLog> {
        let action_type_str: String = row.get(2)?;
        let payload_str: Option<String> = row.get(5)?;
        Ok(ActionLog {
            action_id: row.get(0)?,
            actor: row.get(1)?,
            // 未知类型按 PatchEvent 归并展示，不让历史行拖垮整页查询
            action_type: ActionType::from_str(&action_type_str).unwrap_or(ActionType::PatchEvent),
            entity_type: row.get(3)?,
            entity_id: row.get(4)?,
            payload_json: payload_str.and_then(|s| serde_json::from_str(&s).ok()),
            action_ts: parse_ts(6, row.get::<_, String>(6)?)?,
        })
    }
}
