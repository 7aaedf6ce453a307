// ==========================================
// 车间排程系统 - API层数据传输对象
// ==========================================
// 职责: 业务操作的请求/响应结构
// ==========================================

use crate::domain::event::DocumentMeta;
use crate::domain::types::{EventKind, EventPriority, EventStatus};
use crate::repository::comment_repo::CommentView;
use crate::repository::document_repo::DocumentView;
use crate::repository::event_repo::PlanningEventView;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 无工序关联且未给标题时的占位标题
pub const DEFAULT_EVENT_TITLE: &str = "未命名排程事件";

// ==========================================
// CreateEventRequest - 创建事件请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub kind: EventKind,
    #[serde(default)]
    pub status: Option<EventStatus>,   // 缺省 PLANNED
    #[serde(default)]
    pub priority: Option<EventPriority>, // 缺省 NORMAL

    // ===== 制造关联 (可选) =====
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub operation_id: Option<String>,

    // ===== 资源指派 (至多一个显式指定) =====
    #[serde(default)]
    pub machine_id: Option<String>,
    #[serde(default)]
    pub workstation_id: Option<String>,

    // ===== 时间区间 [start, end) =====
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,

    #[serde(default)]
    pub allow_overlap: bool,

    // ===== 展示字段 =====
    #[serde(default)]
    pub title: Option<String>,       // 缺省时由关联工序推导
    #[serde(default)]
    pub description: Option<String>,
}

// ==========================================
// PatchEventRequest - 局部修改请求
// ==========================================
// 红线: 未出现的字段一律不触碰
// 资源字段按"对"重组：任一出现即视为新的显式指派对
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchEventRequest {
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub priority: Option<EventPriority>,
    #[serde(default)]
    pub machine_id: Option<String>,
    #[serde(default)]
    pub workstation_id: Option<String>,
    #[serde(default)]
    pub start_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub allow_overlap: Option<bool>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    // ===== 并发控制 (可选期望令牌) =====
    #[serde(default)]
    pub expected_revision: Option<i64>,
}

impl PatchEventRequest {
    /// 是否触碰资源指派
    pub fn touches_resource(&self) -> bool {
        self.machine_id.is_some() || self.workstation_id.is_some()
    }
}

// ==========================================
// ArchiveOutcome - 归档结果
// ==========================================
// 幂等归档: "本次归档" 与 "早已归档" 必须可区分，
// 且都区别于 NOT_FOUND 错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArchiveOutcome {
    Archived,
    AlreadyArchived,
}

// ==========================================
// EventDetailView - 单事件明细
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetailView {
    pub event: PlanningEventView,
    pub comments: Vec<CommentView>,
    pub documents: Vec<DocumentView>,
}

// ==========================================
// UploadedDocument - 待挂接的上传文件
// ==========================================
// 上传机制在外部传输层；这里只接收落盘后的临时路径与元数据
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: Option<String>,
    pub doc_type: Option<String>,
}

// ==========================================
// DocumentContent - 文档字节与元数据
// ==========================================
#[derive(Debug, Clone)]
pub struct DocumentContent {
    pub meta: DocumentMeta,
    pub bytes: Vec<u8>,
}
