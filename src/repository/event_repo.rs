// ==========================================
// 车间排程系统 - 排程事件仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

use crate::domain::event::PlanningEvent;
use crate::domain::types::{EventKind, EventPriority, EventStatus, ResourceKind};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};

/// 时间戳统一存储格式（定宽，字典序即时间序）
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 格式化时间戳为数据库文本
pub fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// 解析数据库文本时间戳（携带列号用于错误定位）
pub fn parse_ts(idx: usize, s: String) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&s, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 事件行的统一列清单（与 map_row 的列号对齐）
const EVENT_COLUMNS: &str = r#"e.event_id, e.kind, e.status, e.priority,
       e.order_id, e.operation_id, e.machine_id, e.workstation_id,
       e.start_at, e.end_at, e.allow_overlap, e.title, e.description,
       e.created_at, e.created_by, e.updated_at, e.updated_by,
       e.archived_at, e.archived_by, e.revision"#;

// ==========================================
// EventListFilter - 时间窗查询过滤条件
// ==========================================
// 窗口 [from, to) 按区间重叠判定取事件
#[derive(Debug, Clone)]
pub struct EventListFilter {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub machine_id: Option<String>,
    pub workstation_id: Option<String>,
    pub order_id: Option<String>,
    pub operation_id: Option<String>,
    pub kind: Option<EventKind>,
    pub status: Option<EventStatus>,
    pub priority: Option<EventPriority>,
    pub include_archived: bool,
}

impl EventListFilter {
    /// 仅时间窗的基础过滤
    pub fn window(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self {
            from,
            to,
            machine_id: None,
            workstation_id: None,
            order_id: None,
            operation_id: None,
            kind: None,
            status: None,
            priority: None,
            include_archived: false,
        }
    }
}

// ==========================================
// ConflictingEvent - 冲突事件摘要
// ==========================================
// 冲突错误响应携带的展示字段（id/区间/标题/订单号）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictingEvent {
    pub event_id: String,
    pub title: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub order_no: Option<String>,
}

// ==========================================
// PlanningEventView - 反范式展示视图
// ==========================================
// 关联订单/工件/客户/资源/用户名，供前端直接渲染
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningEventView {
    pub event: PlanningEvent,
    pub order_no: Option<String>,
    pub piece_ref: Option<String>,
    pub client_name: Option<String>,
    pub operation_designation: Option<String>,
    pub operation_phase_no: Option<i32>,
    pub resource_kind: ResourceKind,
    pub resource_code: String,
    pub resource_label: String,
    pub created_by_name: Option<String>,
    pub updated_by_name: Option<String>,
}

// ==========================================
// PlanningEventRepository - 排程事件仓储
// ==========================================
pub struct PlanningEventRepository;

impl PlanningEventRepository {
    /// 插入事件行
    ///
    /// 说明：资源指派/冲突校验由上层在同一事务内完成；
    /// 表上的 CHECK 与触发器仅作最后兜底。
    pub fn insert(conn: &Connection, event: &PlanningEvent) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO planning_event (
                event_id, kind, status, priority,
                order_id, operation_id, machine_id, workstation_id,
                start_at, end_at, allow_overlap, title, description,
                created_at, created_by, updated_at, updated_by,
                archived_at, archived_by, revision
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &event.event_id,
                event.kind.to_db_str(),
                event.status.to_db_str(),
                event.priority.to_db_str(),
                &event.order_id,
                &event.operation_id,
                &event.machine_id,
                &event.workstation_id,
                fmt_ts(&event.start_at),
                fmt_ts(&event.end_at),
                event.allow_overlap as i64,
                &event.title,
                &event.description,
                fmt_ts(&event.created_at),
                &event.created_by,
                fmt_ts(&event.updated_at),
                &event.updated_by,
                event.archived_at.as_ref().map(fmt_ts),
                &event.archived_by,
                event.revision,
            ],
        )?;
        Ok(())
    }

    /// 按 event_id 查询事件行
    pub fn find_by_id(conn: &Connection, event_id: &str) -> RepositoryResult<Option<PlanningEvent>> {
        let sql = format!("SELECT {} FROM planning_event e WHERE e.event_id = ?", EVENT_COLUMNS);
        match conn.query_row(&sql, params![event_id], Self::map_row) {
            Ok(event) => Ok(Some(event)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 时间窗查询（反范式视图，动态过滤）
    pub fn list_views(
        conn: &Connection,
        filter: &EventListFilter,
    ) -> RepositoryResult<Vec<PlanningEventView>> {
        // 窗口 [from, to)：e.start_at < to AND from < e.end_at
        let mut sql = format!(
            "{} WHERE e.start_at < ?1 AND ?2 < e.end_at",
            Self::view_base_sql()
        );

        let mut values: Vec<Value> = vec![
            Value::from(fmt_ts(&filter.to)),
            Value::from(fmt_ts(&filter.from)),
        ];
        let mut idx: i32 = 3;

        if let Some(machine_id) = filter.machine_id.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(&format!(" AND e.machine_id = ?{}", idx));
            values.push(Value::from(machine_id.to_string()));
            idx += 1;
        }
        if let Some(workstation_id) = filter.workstation_id.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(&format!(" AND e.workstation_id = ?{}", idx));
            values.push(Value::from(workstation_id.to_string()));
            idx += 1;
        }
        if let Some(order_id) = filter.order_id.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(&format!(" AND e.order_id = ?{}", idx));
            values.push(Value::from(order_id.to_string()));
            idx += 1;
        }
        if let Some(operation_id) = filter.operation_id.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(&format!(" AND e.operation_id = ?{}", idx));
            values.push(Value::from(operation_id.to_string()));
            idx += 1;
        }
        if let Some(kind) = filter.kind {
            sql.push_str(&format!(" AND e.kind = ?{}", idx));
            values.push(Value::from(kind.to_db_str().to_string()));
            idx += 1;
        }
        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND e.status = ?{}", idx));
            values.push(Value::from(status.to_db_str().to_string()));
            idx += 1;
        }
        if let Some(priority) = filter.priority {
            sql.push_str(&format!(" AND e.priority = ?{}", idx));
            values.push(Value::from(priority.to_db_str().to_string()));
        }
        if !filter.include_archived {
            sql.push_str(" AND e.archived_at IS NULL");
        }

        sql.push_str(" ORDER BY e.start_at, e.event_id");

        let mut stmt = conn.prepare(&sql)?;
        let views = stmt
            .query_map(params_from_iter(values), Self::map_view_row)?
            .collect::<Result<Vec<PlanningEventView>, _>>()?;

        Ok(views)
    }

    /// 按 event_id 查询反范式视图（变更提交后的回读路径）
    pub fn find_view_by_id(
        conn: &Connection,
        event_id: &str,
    ) -> RepositoryResult<Option<PlanningEventView>> {
        let sql = format!("{} WHERE e.event_id = ?", Self::view_base_sql());
        match conn.query_row(&sql, params![event_id], Self::map_view_row) {
            Ok(view) => Ok(Some(view)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 冲突候选查询
    ///
    /// 约束（与触发器的兜底条件一致）：
    /// - 仅统计未归档、且自身 allow_overlap = false 的事件
    /// - 半开区间重叠判定: e.start_at < end AND start < e.end_at
    /// - 按 start_at, event_id 排序，封顶 `limit` 条
    /// - `excluding` 用于补丁场景排除事件自身
    pub fn find_overlapping(
        conn: &Connection,
        machine_id: Option<&str>,
        workstation_id: Option<&str>,
        start_at: &NaiveDateTime,
        end_at: &NaiveDateTime,
        excluding: Option<&str>,
        limit: usize,
    ) -> RepositoryResult<Vec<ConflictingEvent>> {
        let mut sql = String::from(
            r#"SELECT e.event_id, e.title, e.start_at, e.end_at, o.order_no
               FROM planning_event e
               LEFT JOIN manufacturing_order o ON o.order_id = e.order_id
               WHERE e.archived_at IS NULL
                 AND e.allow_overlap = 0
                 AND e.start_at < ?1
                 AND ?2 < e.end_at"#,
        );

        let mut values: Vec<Value> = vec![
            Value::from(fmt_ts(end_at)),
            Value::from(fmt_ts(start_at)),
        ];
        let mut idx: i32 = 3;

        // 资源维度二选一（调用方已保证恰好一个）
        if let Some(machine_id) = machine_id {
            sql.push_str(&format!(" AND e.machine_id = ?{}", idx));
            values.push(Value::from(machine_id.to_string()));
            idx += 1;
        } else if let Some(workstation_id) = workstation_id {
            sql.push_str(&format!(" AND e.workstation_id = ?{}", idx));
            values.push(Value::from(workstation_id.to_string()));
            idx += 1;
        }

        if let Some(excluding) = excluding {
            sql.push_str(&format!(" AND e.event_id <> ?{}", idx));
            values.push(Value::from(excluding.to_string()));
            idx += 1;
        }

        sql.push_str(&format!(" ORDER BY e.start_at, e.event_id LIMIT ?{}", idx));
        values.push(Value::from(limit as i64));

        let mut stmt = conn.prepare(&sql)?;
        let conflicts = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(ConflictingEvent {
                    event_id: row.get(0)?,
                    title: row.get(1)?,
                    start_at: parse_ts(2, row.get::<_, String>(2)?)?,
                    end_at: parse_ts(3, row.get::<_, String>(3)?)?,
                    order_no: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<ConflictingEvent>, _>>()?;

        Ok(conflicts)
    }

    fn view_base_sql() -> String {
        format!(
            r#"SELECT {},
       o.order_no, o.piece_ref, o.client_name,
       op.designation, op.phase_no,
       m.machine_code, m.machine_name,
       w.workstation_code, w.label,
       cu.username, uu.username
FROM planning_event e
LEFT JOIN manufacturing_order o ON o.order_id = e.order_id
LEFT JOIN manufacturing_operation op ON op.operation_id = e.operation_id
LEFT JOIN machine m ON m.machine_id = e.machine_id
LEFT JOIN workstation w ON w.workstation_id = e.workstation_id
LEFT JOIN app_user cu ON cu.user_id = e.created_by
LEFT JOIN app_user uu ON uu.user_id = e.updated_by"#,
            EVENT_COLUMNS
        )
    }

    /// 映射数据库行到 PlanningEvent（列号对齐 EVENT_COLUMNS）
    pub fn map_row(row: &Row) -> rusqlite::Result<PlanningEvent> {
        let kind_str: String = row.get(1)?;
        let status_str: String = row.get(2)?;
        let priority_str: String = row.get(3)?;
        Ok(PlanningEvent {
            event_id: row.get(0)?,
            kind: EventKind::from_str(&kind_str),
            status: EventStatus::from_str(&status_str),
            priority: EventPriority::from_str(&priority_str),
            order_id: row.get(4)?,
            operation_id: row.get(5)?,
            machine_id: row.get(6)?,
            workstation_id: row.get(7)?,
            start_at: parse_ts(8, row.get::<_, String>(8)?)?,
            end_at: parse_ts(9, row.get::<_, String>(9)?)?,
            allow_overlap: row.get::<_, i64>(10)? != 0,
            title: row.get(11)?,
            description: row.get(12)?,
            created_at: parse_ts(13, row.get::<_, String>(13)?)?,
            created_by: row.get(14)?,
            updated_at: parse_ts(15, row.get::<_, String>(15)?)?,
            updated_by: row.get(16)?,
            archived_at: row
                .get::<_, Option<String>>(17)?
                .map(|s| parse_ts(17, s))
                .transpose()?,
            archived_by: row.get(18)?,
            revision: row.get(19)?,
        })
    }

    /// 映射反范式视图行（前 20 列与 map_row 一致）
    fn map_view_row(row: &Row) -> rusqlite::Result<PlanningEventView> {
        let event = Self::map_row(row)?;

        let machine_code: Option<String> = row.get(25)?;
        let machine_name: Option<String> = row.get(26)?;
        let workstation_code: Option<String> = row.get(27)?;
        let workstation_label: Option<String> = row.get(28)?;

        // 资源标签：目录行缺失时回退到 id，避免视图整行失败
        let (resource_kind, resource_code, resource_label) = if event.machine_id.is_some() {
            (
                ResourceKind::Machine,
                machine_code.unwrap_or_else(|| event.machine_id.clone().unwrap_or_default()),
                machine_name.unwrap_or_default(),
            )
        } else {
            (
                ResourceKind::Workstation,
                workstation_code
                    .unwrap_or_else(|| event.workstation_id.clone().unwrap_or_default()),
                workstation_label.unwrap_or_default(),
            )
        };

        Ok(PlanningEventView {
            order_no: row.get(20)?,
            piece_ref: row.get(21)?,
            client_name: row.get(22)?,
            operation_designation: row.get(23)?,
            operation_phase_no: row.get(24)?,
            resource_kind,
            resource_code,
            resource_label,
            created_by_name: row.get(29)?,
            updated_by_name: row.get(30)?,
            event,
        })
    }
}
