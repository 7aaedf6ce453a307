// ==========================================
// 车间排程系统 - 冲突检测器
// ==========================================
// 职责: 同资源半开区间重叠判定与冲突候选收集
// 红线: 不对称豁免规则 —— 候选自身 allow_overlap 时不做检测；
//       存量事件自身 allow_overlap 时永不上报为冲突
// ==========================================

use crate::domain::resource::ResourceRef;
use crate::repository::error::RepositoryResult;
use crate::repository::event_repo::{ConflictingEvent, PlanningEventRepository};
use chrono::NaiveDateTime;
use rusqlite::Connection;

/// 单次检测上报的冲突事件数量上限
pub const MAX_REPORTED_CONFLICTS: usize = 25;

/// 半开区间重叠判定
///
/// `[s1, e1)` 与 `[s2, e2)` 重叠当且仅当 `s1 < e2 && s2 < e1`；
/// 首尾相接（e1 == s2）不算重叠。
pub fn overlaps(
    s1: &NaiveDateTime,
    e1: &NaiveDateTime,
    s2: &NaiveDateTime,
    e2: &NaiveDateTime,
) -> bool {
    s1 < e2 && s2 < e1
}

// ==========================================
// ConflictDetector - 冲突检测
// ==========================================
pub struct ConflictDetector;

impl ConflictDetector {
    /// 收集与候选区间冲突的存量事件（有序、封顶 25 条）
    ///
    /// # 参数
    /// - `resource`: 已解析的资源指派
    /// - `excluding`: 补丁场景下排除事件自身
    pub fn find_conflicts(
        conn: &Connection,
        resource: &ResourceRef,
        start_at: &NaiveDateTime,
        end_at: &NaiveDateTime,
        excluding: Option<&str>,
    ) -> RepositoryResult<Vec<ConflictingEvent>> {
        let (machine_id, workstation_id) = resource.as_columns();
        PlanningEventRepository::find_overlapping(
            conn,
            machine_id,
            workstation_id,
            start_at,
            end_at,
            excluding,
            MAX_REPORTED_CONFLICTS,
        )
    }

    /// 按不对称豁免规则执行检测
    ///
    /// 候选 `allow_overlap = true` 时直接放行（不查询）；
    /// 否则返回冲突候选列表，由调用方决定是否中止事务。
    pub fn check(
        conn: &Connection,
        allow_overlap: bool,
        resource: &ResourceRef,
        start_at: &NaiveDateTime,
        end_at: &NaiveDateTime,
        excluding: Option<&str>,
    ) -> RepositoryResult<Vec<ConflictingEvent>> {
        if allow_overlap {
            return Ok(Vec::new());
        }
        Self::find_conflicts(conn, resource, start_at, end_at, excluding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_overlapping_intervals() {
        // [08:00, 10:00) vs [09:00, 11:00)
        assert!(overlaps(&ts(8, 0), &ts(10, 0), &ts(9, 0), &ts(11, 0)));
        // 包含关系
        assert!(overlaps(&ts(8, 0), &ts(12, 0), &ts(9, 0), &ts(10, 0)));
        // 相同区间
        assert!(overlaps(&ts(8, 0), &ts(10, 0), &ts(8, 0), &ts(10, 0)));
    }

    #[test]
    fn test_adjacent_intervals_do_not_overlap() {
        // 半开区间: [08:00, 10:00) 与 [10:00, 12:00) 首尾相接
        assert!(!overlaps(&ts(8, 0), &ts(10, 0), &ts(10, 0), &ts(12, 0)));
        assert!(!overlaps(&ts(10, 0), &ts(12, 0), &ts(8, 0), &ts(10, 0)));
    }

    #[test]
    fn test_disjoint_intervals_do_not_overlap() {
        assert!(!overlaps(&ts(8, 0), &ts(9, 0), &ts(10, 0), &ts(11, 0)));
    }
}
