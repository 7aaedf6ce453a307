// ==========================================
// 车间排程系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 事件类别 (Event Kind)
// ==========================================
// OPERATION: 关联制造工序的排程
// MAINTENANCE: 维护窗口
// CUSTOM: 自定义事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Operation,
    Maintenance,
    Custom,
}

impl EventKind {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "OPERATION" => EventKind::Operation,
            "MAINTENANCE" => EventKind::Maintenance,
            _ => EventKind::Custom,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventKind::Operation => "OPERATION",
            EventKind::Maintenance => "MAINTENANCE",
            EventKind::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 事件状态 (Event Status)
// ==========================================
// 红线: 归档时强制置为 CANCELLED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Planned,
    InProgress,
    Done,
    Cancelled,
    Blocked,
}

impl EventStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PLANNED" => EventStatus::Planned,
            "IN_PROGRESS" => EventStatus::InProgress,
            "DONE" => EventStatus::Done,
            "CANCELLED" => EventStatus::Cancelled,
            "BLOCKED" => EventStatus::Blocked,
            _ => EventStatus::Planned, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventStatus::Planned => "PLANNED",
            EventStatus::InProgress => "IN_PROGRESS",
            EventStatus::Done => "DONE",
            EventStatus::Cancelled => "CANCELLED",
            EventStatus::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 事件优先级 (Event Priority)
// ==========================================
// 等级制，仅用于展示与排序，不参与冲突判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPriority {
    Low,
    Normal,
    High,
    Critical,
}

impl EventPriority {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LOW" => EventPriority::Low,
            "NORMAL" => EventPriority::Normal,
            "HIGH" => EventPriority::High,
            "CRITICAL" => EventPriority::Critical,
            _ => EventPriority::Normal, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventPriority::Low => "LOW",
            EventPriority::Normal => "NORMAL",
            EventPriority::High => "HIGH",
            EventPriority::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for EventPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 资源类别 (Resource Kind)
// ==========================================
// 调用方按 kind 分支，禁止运行时类型探测
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Machine,
    Workstation,
}

impl ResourceKind {
    /// 转换为数据库/接口字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ResourceKind::Machine => "MACHINE",
            ResourceKind::Workstation => "WORKSTATION",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_status_db_round_trip() {
        for s in [
            EventStatus::Planned,
            EventStatus::InProgress,
            EventStatus::Done,
            EventStatus::Cancelled,
            EventStatus::Blocked,
        ] {
            assert_eq!(EventStatus::from_str(s.to_db_str()), s);
        }
    }

    #[test]
    fn test_unknown_strings_fall_back_to_defaults() {
        assert_eq!(EventStatus::from_str("???"), EventStatus::Planned);
        assert_eq!(EventPriority::from_str(""), EventPriority::Normal);
        assert_eq!(EventKind::from_str("legacy"), EventKind::Custom);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(EventPriority::Critical > EventPriority::High);
        assert!(EventPriority::High > EventPriority::Normal);
        assert!(EventPriority::Normal > EventPriority::Low);
    }
}
