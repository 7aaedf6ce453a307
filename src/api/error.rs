// ==========================================
// 车间排程系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 约束: 每个错误携带稳定机器码 (code)，冲突错误携带结构化冲突列表
// ==========================================

use crate::engine::resource_resolver::ResourceResolutionError;
use crate::repository::error::RepositoryError;
use crate::repository::event_repo::ConflictingEvent;
use chrono::NaiveDateTime;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 校验错误（任何 I/O 之前拒绝）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效时间区间: start={start} end={end} (要求 start < end)")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// 机组与工位同时指定
    #[error("无效资源指派: {0}")]
    InvalidResource(String),

    /// 无显式指派且无法从工序推导
    #[error("缺少资源指派: {0}")]
    MissingResource(String),

    /// 工序不属于显式指定的制造订单
    #[error("工序与订单不匹配: operation_id={operation_id}, 工序归属订单={actual_order_id}, 请求订单={expected_order_id}")]
    OperationOrderMismatch {
        operation_id: String,
        expected_order_id: String,
        actual_order_id: String,
    },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 归档事件不可再变更
    #[error("事件已归档，不可变更: event_id={event_id}")]
    ArchivedImmutable { event_id: String },

    // ==========================================
    // 冲突类错误（调用方可重试）
    // ==========================================
    /// 区间重叠冲突，携带冲突事件列表供前端渲染
    #[error("排程冲突: 同资源存在 {} 个重叠事件", .conflicts.len())]
    PlanningConflict { conflicts: Vec<ConflictingEvent> },

    /// 乐观并发令牌过期
    #[error("排程数据已过期: event_id={event_id}, expected_revision={expected}, actual_revision={actual}")]
    StaleRevision {
        event_id: String,
        expected: i64,
        actual: i64,
    },

    #[error("唯一约束违反: {0}")]
    UniqueViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定机器码（跨版本不变，供调用方分支）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) | ApiError::InvalidInterval { .. } => "VALIDATION_ERROR",
            ApiError::InvalidResource(_) => "INVALID_RESOURCE",
            ApiError::MissingResource(_) => "MISSING_RESOURCE",
            ApiError::OperationOrderMismatch { .. } => "OF_OPERATION_MISMATCH",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ArchivedImmutable { .. } => "ARCHIVED_IMMUTABLE",
            ApiError::PlanningConflict { .. } => "PLANNING_CONFLICT",
            ApiError::StaleRevision { .. } => "PLANNING_STALE",
            ApiError::UniqueViolation(_) => "UNIQUE_VIOLATION",
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// 调用方是否应在重新取数后重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::PlanningConflict { .. } | ApiError::StaleRevision { .. }
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户可见的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误
            RepositoryError::OptimisticLockFailure {
                event_id,
                expected,
                actual,
            } => ApiError::StaleRevision {
                event_id,
                expected,
                actual,
            },

            // 触发器兜底的重叠冲突：事务已中止，无法一致地回读冲突行，
            // 冲突列表为空，调用方重试后由预检给出完整列表
            RepositoryError::OverlapGuardViolation(_) => {
                ApiError::PlanningConflict { conflicts: Vec::new() }
            }

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::UniqueViolation(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }

            // 数据质量错误
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从资源解析错误转换
// ==========================================
impl From<ResourceResolutionError> for ApiError {
    fn from(err: ResourceResolutionError) -> Self {
        match err {
            ResourceResolutionError::BothProvided => {
                ApiError::InvalidResource("机组与工位不可同时指定".to_string())
            }
            ResourceResolutionError::NotDerivable => {
                ApiError::MissingResource("未指定机组/工位，且关联工序无默认指派".to_string())
            }
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
