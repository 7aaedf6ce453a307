// ==========================================
// 车间排程系统 - 排程事件业务接口
// ==========================================
// 职责: 创建/补丁/归档/查询排程事件
// 红线: 每个变更操作恰好一个数据库事务；
//       审计写入与业务写入同事务，任一失败整体回滚
// 红线: 提交后回读反范式视图再返回
// ==========================================

use crate::api::dto::{
    ArchiveOutcome, CreateEventRequest, EventDetailView, PatchEventRequest, DEFAULT_EVENT_TITLE,
};
use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::event::PlanningEvent;
use crate::domain::resource::ResourceRef;
use crate::domain::types::{EventPriority, EventStatus};
use crate::engine::conflict_detector::ConflictDetector;
use crate::engine::resource_resolver::{ResourceResolutionError, ResourceResolver};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::comment_repo::EventCommentRepository;
use crate::repository::document_repo::EventDocumentRepository;
use crate::repository::event_repo::{
    fmt_ts, EventListFilter, PlanningEventRepository, PlanningEventView,
};
use crate::repository::operation_repo::OperationRepository;
use crate::repository::resource_repo::ResourceRepository;
use crate::repository::update_builder::EventUpdateBuilder;
use chrono::NaiveDateTime;
use rusqlite::{Connection, TransactionBehavior};
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

/// 审计日志中的事件实体类型
pub const ENTITY_PLANNING_EVENT: &str = "planning_event";

// ==========================================
// PlanningApi - 排程事件接口
// ==========================================
pub struct PlanningApi {
    conn: Arc<Mutex<Connection>>,
}

impl PlanningApi {
    /// 创建新的排程接口实例（连接句柄注入，按操作获取）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))
    }

    /// 当前时刻（存储精度为秒）
    fn now() -> NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }

    // ==========================================
    // 创建
    // ==========================================

    /// 创建排程事件
    ///
    /// # 流程（单事务）
    /// 1. 纯校验（区间、资源对），任何 I/O 之前拒绝
    /// 2. 工序关联取数与订单归属校验
    /// 3. 资源解析 + 存在性校验
    /// 4. 冲突预检（candidate 自身 allow_overlap 时跳过）
    /// 5. 落库 + 审计 + 提交
    /// 6. 提交后回读反范式视图
    pub fn create_event(
        &self,
        req: &CreateEventRequest,
        actor: &str,
    ) -> ApiResult<PlanningEventView> {
        // 参数验证
        if actor.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }
        if req.start_at >= req.end_at {
            return Err(ApiError::InvalidInterval {
                start: req.start_at,
                end: req.end_at,
            });
        }
        if req.machine_id.is_some() && req.workstation_id.is_some() {
            return Err(ResourceResolutionError::BothProvided.into());
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        // 1. 工序关联：取数 + 订单归属校验
        let operation = match req.operation_id.as_deref() {
            Some(operation_id) => {
                let operation = OperationRepository::find_operation(&tx, operation_id)?
                    .ok_or_else(|| {
                        ApiError::NotFound(format!(
                            "ManufacturingOperation(id={})不存在",
                            operation_id
                        ))
                    })?;
                if let Some(order_id) = req.order_id.as_deref() {
                    if order_id != operation.order_id {
                        return Err(ApiError::OperationOrderMismatch {
                            operation_id: operation_id.to_string(),
                            expected_order_id: order_id.to_string(),
                            actual_order_id: operation.order_id.clone(),
                        });
                    }
                }
                Some(operation)
            }
            None => None,
        };

        // 订单关联：显式给出且无工序时校验存在性；有工序时从工序回填
        let order_id = match (&req.order_id, &operation) {
            (Some(order_id), None) => {
                OperationRepository::find_order(&tx, order_id)?.ok_or_else(|| {
                    ApiError::NotFound(format!("ManufacturingOrder(id={})不存在", order_id))
                })?;
                Some(order_id.clone())
            }
            (Some(order_id), Some(_)) => Some(order_id.clone()),
            (None, Some(operation)) => Some(operation.order_id.clone()),
            (None, None) => None,
        };

        // 2. 资源解析 + 存在性校验
        let resource = ResourceResolver::resolve(
            req.machine_id.as_deref(),
            req.workstation_id.as_deref(),
            operation.as_ref(),
        )?;
        Self::ensure_resource_exists(&tx, &resource)?;

        // 3. 标题推导
        let title = match req.title.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(title) => title.to_string(),
            None => operation
                .as_ref()
                .map(|op| op.default_title())
                .unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_string()),
        };

        // 4. 冲突预检
        let conflicts = ConflictDetector::check(
            &tx,
            req.allow_overlap,
            &resource,
            &req.start_at,
            &req.end_at,
            None,
        )?;
        if !conflicts.is_empty() {
            warn!(
                resource_id = resource.id(),
                conflict_count = conflicts.len(),
                "创建排程事件被冲突预检拒绝"
            );
            return Err(ApiError::PlanningConflict { conflicts });
        }

        // 5. 组装并落库
        let now = Self::now();
        let (machine_id, workstation_id) = resource.as_columns();
        let event = PlanningEvent {
            event_id: Uuid::new_v4().to_string(),
            kind: req.kind,
            status: req.status.unwrap_or(EventStatus::Planned),
            priority: req.priority.unwrap_or(EventPriority::Normal),
            order_id,
            operation_id: req.operation_id.clone(),
            machine_id: machine_id.map(str::to_string),
            workstation_id: workstation_id.map(str::to_string),
            start_at: req.start_at,
            end_at: req.end_at,
            allow_overlap: req.allow_overlap,
            title,
            description: req.description.clone(),
            created_at: now,
            created_by: actor.to_string(),
            updated_at: now,
            updated_by: None,
            archived_at: None,
            archived_by: None,
            revision: 0,
        };
        PlanningEventRepository::insert(&tx, &event)?;

        // 6. 审计：记录解析后的最终状态
        Self::record_action(
            &tx,
            actor,
            ActionType::CreateEvent,
            &event.event_id,
            serde_json::to_value(&event).ok(),
        )?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id = %event.event_id, "排程事件已创建");

        // 7. 提交后回读
        PlanningEventRepository::find_view_by_id(&conn, &event.event_id)?.ok_or_else(|| {
            ApiError::InternalError(format!("事件{}提交后回读失败", event.event_id))
        })
    }

    // ==========================================
    // 补丁
    // ==========================================

    /// 局部修改排程事件
    ///
    /// # 并发控制
    /// - 立即事务自始持有写锁，同事件的并发补丁串行化
    /// - `expected_revision` 存在时附加到 UPDATE 匹配条件；
    ///   受影响行数为 0（此前行已读到）即判定令牌过期 PLANNING_STALE
    pub fn patch_event(
        &self,
        event_id: &str,
        patch: &PatchEventRequest,
        actor: &str,
    ) -> ApiResult<PlanningEventView> {
        // 参数验证
        if actor.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }
        if patch.machine_id.is_some() && patch.workstation_id.is_some() {
            return Err(ResourceResolutionError::BothProvided.into());
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        // 1. 行读取与可变性校验
        let current = PlanningEventRepository::find_by_id(&tx, event_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("PlanningEvent(id={})不存在", event_id))
        })?;
        if current.is_archived() {
            return Err(ApiError::ArchivedImmutable {
                event_id: event_id.to_string(),
            });
        }

        // 2. 合并出生效后状态
        let next_start = patch.start_at.unwrap_or(current.start_at);
        let next_end = patch.end_at.unwrap_or(current.end_at);
        if next_start >= next_end {
            return Err(ApiError::InvalidInterval {
                start: next_start,
                end: next_end,
            });
        }

        // 资源字段按"对"重组：任一出现即重跑解析
        let next_resource = if patch.touches_resource() {
            let operation = match current.operation_id.as_deref() {
                Some(operation_id) => OperationRepository::find_operation(&tx, operation_id)?,
                None => None,
            };
            let resolved = ResourceResolver::resolve(
                patch.machine_id.as_deref(),
                patch.workstation_id.as_deref(),
                operation.as_ref(),
            )?;
            Self::ensure_resource_exists(&tx, &resolved)?;
            resolved
        } else {
            current.resource_ref().ok_or_else(|| {
                ApiError::InternalError(format!("事件{}缺少资源指派", event_id))
            })?
        };

        let next_allow_overlap = patch.allow_overlap.unwrap_or(current.allow_overlap);

        // 3. 冲突重检（排除自身）
        let conflicts = ConflictDetector::check(
            &tx,
            next_allow_overlap,
            &next_resource,
            &next_start,
            &next_end,
            Some(event_id),
        )?;
        if !conflicts.is_empty() {
            warn!(
                event_id,
                conflict_count = conflicts.len(),
                "补丁被冲突重检拒绝"
            );
            return Err(ApiError::PlanningConflict { conflicts });
        }

        // 4. 仅更新补丁中出现的字段
        let now = Self::now();
        let mut builder = EventUpdateBuilder::new();
        if let Some(status) = patch.status {
            builder.set_text("status", status.to_db_str());
        }
        if let Some(priority) = patch.priority {
            builder.set_text("priority", priority.to_db_str());
        }
        if patch.touches_resource() {
            let (machine_id, workstation_id) = next_resource.as_columns();
            builder.set_opt_text("machine_id", machine_id);
            builder.set_opt_text("workstation_id", workstation_id);
        }
        if patch.start_at.is_some() {
            builder.set_text("start_at", &fmt_ts(&next_start));
        }
        if patch.end_at.is_some() {
            builder.set_text("end_at", &fmt_ts(&next_end));
        }
        if let Some(allow_overlap) = patch.allow_overlap {
            builder.set_bool("allow_overlap", allow_overlap);
        }
        if let Some(title) = patch.title.as_deref() {
            builder.set_text("title", title);
        }
        if let Some(description) = patch.description.as_deref() {
            builder.set_text("description", description);
        }
        builder.set_text("updated_at", &fmt_ts(&now));
        builder.set_text("updated_by", actor);

        let rows = builder.apply(&tx, event_id, patch.expected_revision)?;
        if rows == 0 {
            // 行存在（本事务内已读到），零行更新只能是令牌不匹配
            match patch.expected_revision {
                Some(expected) => {
                    warn!(
                        event_id,
                        expected, actual = current.revision, "补丁令牌过期"
                    );
                    return Err(ApiError::StaleRevision {
                        event_id: event_id.to_string(),
                        expected,
                        actual: current.revision,
                    });
                }
                None => {
                    return Err(ApiError::InternalError(format!(
                        "事件{}更新零行且无期望令牌",
                        event_id
                    )));
                }
            }
        }

        // 5. 审计：原始补丁 + 解析后的生效值
        let (machine_id, workstation_id) = next_resource.as_columns();
        let payload = serde_json::json!({
            "patch": patch,
            "next": {
                "start_at": fmt_ts(&next_start),
                "end_at": fmt_ts(&next_end),
                "machine_id": machine_id,
                "workstation_id": workstation_id,
                "allow_overlap": next_allow_overlap,
            },
        });
        Self::record_action(&tx, actor, ActionType::PatchEvent, event_id, Some(payload))?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, "排程事件已更新");

        PlanningEventRepository::find_view_by_id(&conn, event_id)?
            .ok_or_else(|| ApiError::InternalError(format!("事件{}提交后回读失败", event_id)))
    }

    // ==========================================
    // 归档
    // ==========================================

    /// 归档排程事件（软删除，幂等）
    ///
    /// # 返回
    /// - `Archived`: 本次完成归档
    /// - `AlreadyArchived`: 早已归档（无事可做，区别于 NOT_FOUND）
    ///
    /// # 红线
    /// - 归档不可逆，状态强制 CANCELLED
    pub fn archive_event(&self, event_id: &str, actor: &str) -> ApiResult<ArchiveOutcome> {
        if actor.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        let current = PlanningEventRepository::find_by_id(&tx, event_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("PlanningEvent(id={})不存在", event_id))
        })?;
        if current.is_archived() {
            return Ok(ArchiveOutcome::AlreadyArchived);
        }

        let now = Self::now();
        let mut builder = EventUpdateBuilder::new();
        builder.set_text("status", EventStatus::Cancelled.to_db_str());
        builder.set_text("archived_at", &fmt_ts(&now));
        builder.set_text("archived_by", actor);
        builder.set_text("updated_at", &fmt_ts(&now));
        builder.set_text("updated_by", actor);
        let rows = builder.apply(&tx, event_id, None)?;
        if rows == 0 {
            return Err(ApiError::InternalError(format!("事件{}归档更新零行", event_id)));
        }

        Self::record_action(
            &tx,
            actor,
            ActionType::ArchiveEvent,
            event_id,
            Some(serde_json::json!({
                "archived_at": fmt_ts(&now),
                "status": EventStatus::Cancelled.to_db_str(),
            })),
        )?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, "排程事件已归档");
        Ok(ArchiveOutcome::Archived)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 时间窗查询事件（反范式视图）
    pub fn list_events(&self, filter: &EventListFilter) -> ApiResult<Vec<PlanningEventView>> {
        if filter.from >= filter.to {
            return Err(ApiError::InvalidInterval {
                start: filter.from,
                end: filter.to,
            });
        }
        let conn = self.get_conn()?;
        Ok(PlanningEventRepository::list_views(&conn, filter)?)
    }

    /// 单事件明细（视图 + 评论 + 文档）
    pub fn get_event_detail(&self, event_id: &str) -> ApiResult<EventDetailView> {
        let conn = self.get_conn()?;
        let event = PlanningEventRepository::find_view_by_id(&conn, event_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("PlanningEvent(id={})不存在", event_id))
        })?;
        let comments = EventCommentRepository::list_by_event(&conn, event_id)?;
        let documents = EventDocumentRepository::list_by_event(&conn, event_id)?;
        Ok(EventDetailView {
            event,
            comments,
            documents,
        })
    }

    /// 事件的最近操作记录
    pub fn list_event_actions(
        &self,
        event_id: &str,
        limit: usize,
    ) -> ApiResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        Ok(ActionLogRepository::list_by_entity(
            &conn,
            ENTITY_PLANNING_EVENT,
            event_id,
            limit,
        )?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 校验解析出的资源在目录中存在
    fn ensure_resource_exists(conn: &Connection, resource: &ResourceRef) -> ApiResult<()> {
        match resource {
            ResourceRef::Machine(machine_id) => {
                ResourceRepository::find_machine(conn, machine_id)?.ok_or_else(|| {
                    ApiError::NotFound(format!("Machine(id={})不存在", machine_id))
                })?;
            }
            ResourceRef::Workstation(workstation_id) => {
                ResourceRepository::find_workstation(conn, workstation_id)?.ok_or_else(|| {
                    ApiError::NotFound(format!("Workstation(id={})不存在", workstation_id))
                })?;
            }
        }
        Ok(())
    }

    /// 在调用方事务上写入审计行
    pub(crate) fn record_action(
        conn: &Connection,
        actor: &str,
        action_type: ActionType,
        event_id: &str,
        payload_json: Option<JsonValue>,
    ) -> ApiResult<String> {
        let log = ActionLog {
            action_id: Uuid::new_v4().to_string(),
            actor: actor.to_string(),
            action_type,
            entity_type: ENTITY_PLANNING_EVENT.to_string(),
            entity_id: event_id.to_string(),
            payload_json,
            action_ts: Self::now(),
        };
        Ok(ActionLogRepository::record(conn, &log)?)
    }
}
