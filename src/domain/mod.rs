// ==========================================
// 车间排程系统 - 领域层
// ==========================================
// 职责: 实体与类型定义，不含数据访问与业务编排
// ==========================================

pub mod action_log;
pub mod event;
pub mod operation;
pub mod resource;
pub mod types;

// 重导出核心实体
pub use action_log::{ActionLog, ActionType};
pub use event::{DocumentMeta, PlanningEvent, PlanningEventComment, PlanningEventDocument};
pub use operation::{ManufacturingOperation, ManufacturingOrder};
pub use resource::{Machine, Resource, ResourceRef, Workstation};
pub use types::{EventKind, EventPriority, EventStatus, ResourceKind};
