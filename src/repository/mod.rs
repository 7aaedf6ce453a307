// ==========================================
// 车间排程系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 仓储函数接受调用方的连接句柄（Transaction 解引用即为
//       Connection），事务边界由上层业务操作统一控制
// ==========================================

pub mod action_log_repo;
pub mod comment_repo;
pub mod document_repo;
pub mod error;
pub mod event_repo;
pub mod operation_repo;
pub mod resource_repo;
pub mod update_builder;
pub mod user_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use comment_repo::{CommentView, EventCommentRepository};
pub use document_repo::{DocumentView, EventDocumentRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use event_repo::{
    ConflictingEvent, EventListFilter, PlanningEventRepository, PlanningEventView,
};
pub use operation_repo::OperationRepository;
pub use resource_repo::ResourceRepository;
pub use update_builder::EventUpdateBuilder;
pub use user_repo::UserRepository;
