// ==========================================
// 车间排程系统 - API 层
// ==========================================
// 职责: 对外业务操作；外围传输层自行映射协议
// 红线: 变更操作恰好一个事务，审计同事务，提交后回读
// ==========================================

pub mod attachment_api;
pub mod dto;
pub mod error;
pub mod planning_api;
pub mod resource_api;

// 重导出核心接口
pub use attachment_api::AttachmentApi;
pub use dto::{
    ArchiveOutcome, CreateEventRequest, DocumentContent, EventDetailView, PatchEventRequest,
    UploadedDocument, DEFAULT_EVENT_TITLE,
};
pub use error::{ApiError, ApiResult};
pub use planning_api::{PlanningApi, ENTITY_PLANNING_EVENT};
pub use resource_api::ResourceApi;
