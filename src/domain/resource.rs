// ==========================================
// 车间排程系统 - 资源领域模型
// ==========================================
// 资源目录为外部只读主数据，本核心仅按 id 引用
// ==========================================

use crate::domain::types::ResourceKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Machine - 机组
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub machine_id: String,
    pub machine_code: String,       // 机组代码 (唯一)
    pub machine_name: String,
    pub machine_type: Option<String>,
    pub status: String,             // 外部目录维护的状态标记
    pub is_available: bool,         // 可用性标记
    pub archived_at: Option<NaiveDateTime>,
}

// ==========================================
// Workstation - 工位
// ==========================================
// 比机组更细的排程粒度，可选归属某个机组
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workstation {
    pub workstation_id: String,
    pub workstation_code: String,   // 工位代码 (唯一)
    pub label: String,
    pub machine_id: Option<String>, // 归属机组 (可选)
    pub is_active: bool,
    pub archived_at: Option<NaiveDateTime>,
}

// ==========================================
// Resource - 资源标签联合
// ==========================================
// 调用方按 kind 分支处理，两个变体携带各自的完整行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "resource_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    Machine(Machine),
    Workstation(Workstation),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Machine(_) => ResourceKind::Machine,
            Resource::Workstation(_) => ResourceKind::Workstation,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Resource::Machine(m) => &m.machine_id,
            Resource::Workstation(w) => &w.workstation_id,
        }
    }
}

// ==========================================
// ResourceRef - 资源指派引用
// ==========================================
// 事件的资源指派结果：恰好一个机组或工位 id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resource_kind", content = "resource_id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceRef {
    Machine(String),
    Workstation(String),
}

impl ResourceRef {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRef::Machine(_) => ResourceKind::Machine,
            ResourceRef::Workstation(_) => ResourceKind::Workstation,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ResourceRef::Machine(id) => id,
            ResourceRef::Workstation(id) => id,
        }
    }

    /// 拆解为 (machine_id, workstation_id) 列值对
    pub fn as_columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            ResourceRef::Machine(id) => (Some(id.as_str()), None),
            ResourceRef::Workstation(id) => (None, Some(id.as_str())),
        }
    }
}
