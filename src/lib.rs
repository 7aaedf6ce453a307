// ==========================================
// 车间排程系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 生产后台的排程核心（资源占用与冲突控制）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 文件存储层 - 文档内容寻址
pub mod storage;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EventKind, EventPriority, EventStatus, ResourceKind};

// 领域实体
pub use domain::{
    ActionLog, ActionType, DocumentMeta, Machine, ManufacturingOperation, ManufacturingOrder,
    PlanningEvent, PlanningEventComment, PlanningEventDocument, Resource, ResourceRef, Workstation,
};

// 引擎
pub use engine::{ConflictDetector, ResourceResolver};

// API
pub use api::{
    ApiError, ApiResult, ArchiveOutcome, AttachmentApi, CreateEventRequest, EventDetailView,
    PatchEventRequest, PlanningApi, ResourceApi, UploadedDocument,
};

// 仓储视图
pub use repository::{ConflictingEvent, EventListFilter, PlanningEventView};

// 文件存储
pub use storage::DocumentStore;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车间排程系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
