// ==========================================
// 车间排程系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录，且与业务写入同事务
// 用途: 审计追踪
// 对齐: migrations/v1_init.sql action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub actor: String,                   // 操作人 id
    pub action_type: ActionType,
    pub entity_type: String,             // 实体类型 (planning_event / ...)
    pub entity_id: String,
    pub payload_json: Option<JsonValue>, // 结构化操作详情
    pub action_ts: NaiveDateTime,
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateEvent,     // 创建排程事件
    PatchEvent,      // 局部修改
    ArchiveEvent,    // 归档 (软删除)
    AddComment,      // 新增评论
    AttachDocuments, // 批量挂接文档
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateEvent => "CreateEvent",
            ActionType::PatchEvent => "PatchEvent",
            ActionType::ArchiveEvent => "ArchiveEvent",
            ActionType::AddComment => "AddComment",
            ActionType::AttachDocuments => "AttachDocuments",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CreateEvent" => Some(ActionType::CreateEvent),
            "PatchEvent" => Some(ActionType::PatchEvent),
            "ArchiveEvent" => Some(ActionType::ArchiveEvent),
            "AddComment" => Some(ActionType::AddComment),
            "AttachDocuments" => Some(ActionType::AttachDocuments),
            _ => None,
        }
    }
}
