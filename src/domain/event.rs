// ==========================================
// 车间排程系统 - 排程事件领域模型
// ==========================================
// 红线: 资源指派恰好一个（机组 XOR 工位）
// 红线: 区间按 [start, end) 解释，start < end
// 红线: 归档后不可再变更，状态强制 CANCELLED
// ==========================================

use crate::domain::resource::ResourceRef;
use crate::domain::types::{EventKind, EventPriority, EventStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// PlanningEvent - 排程事件
// ==========================================
// 对齐: migrations/v1_init.sql planning_event 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningEvent {
    // ===== 主键 =====
    pub event_id: String,

    // ===== 分类 =====
    pub kind: EventKind,
    pub status: EventStatus,
    pub priority: EventPriority,

    // ===== 制造关联 (可选，创建时固定) =====
    pub order_id: Option<String>,     // 制造订单
    pub operation_id: Option<String>, // 制造工序

    // ===== 资源指派 (恰好一个) =====
    pub machine_id: Option<String>,
    pub workstation_id: Option<String>,

    // ===== 时间区间 [start, end) =====
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,

    // ===== 冲突豁免 =====
    pub allow_overlap: bool,

    // ===== 展示字段 =====
    pub title: String,                // 缺省时由关联工序推导
    pub description: Option<String>,

    // ===== 簿记 =====
    pub created_at: NaiveDateTime,
    pub created_by: String,
    pub updated_at: NaiveDateTime,
    pub updated_by: Option<String>,
    pub archived_at: Option<NaiveDateTime>,
    pub archived_by: Option<String>,

    // ===== 并发控制 =====
    pub revision: i64,                // 单调递增，补丁的期望令牌
}

impl PlanningEvent {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// 当前资源指派（已解析事件恒为 Some）
    pub fn resource_ref(&self) -> Option<ResourceRef> {
        match (&self.machine_id, &self.workstation_id) {
            (Some(m), None) => Some(ResourceRef::Machine(m.clone())),
            (None, Some(w)) => Some(ResourceRef::Workstation(w.clone())),
            _ => None,
        }
    }
}

// ==========================================
// PlanningEventComment - 事件评论
// ==========================================
// 仅追加；事件归档后拒绝新增
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningEventComment {
    pub comment_id: String,
    pub event_id: String,
    pub body: String,
    pub author_id: String,
    pub created_at: NaiveDateTime,
}

// ==========================================
// DocumentMeta - 文档元数据
// ==========================================
// checksum 为内容 SHA-256，同时充当文件存储键
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub document_id: String,
    pub file_name: String,
    pub media_type: Option<String>,
    pub size_bytes: i64,
    pub checksum: String,
    pub uploaded_by: Option<String>,
    pub uploaded_at: NaiveDateTime,
}

// ==========================================
// PlanningEventDocument - 事件-文档关联行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningEventDocument {
    pub event_id: String,
    pub document_id: String,
    pub doc_type: Option<String>,
}
