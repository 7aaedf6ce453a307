// ==========================================
// 车间排程系统 - 制造关联领域模型
// ==========================================
// 订单/工序为制造模块维护的外部主数据，本核心只读
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ManufacturingOrder - 制造订单（展示关联用）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturingOrder {
    pub order_id: String,
    pub order_no: String,           // 订单号 (展示用)
    pub piece_ref: Option<String>,  // 工件编号
    pub client_name: Option<String>,
}

// ==========================================
// ManufacturingOperation - 制造工序
// ==========================================
// 工序携带默认资源指派，事件创建时据此推导
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturingOperation {
    pub operation_id: String,
    pub order_id: String,
    pub phase_no: i32,              // 阶段号，0 表示无阶段
    pub designation: String,        // 工序名称
    pub default_machine_id: Option<String>,
    pub default_workstation_id: Option<String>,
}

impl ManufacturingOperation {
    /// 推导默认事件标题
    ///
    /// - phase_no > 0: "P{phase} - {designation}"
    /// - phase_no = 0: 仅 designation
    pub fn default_title(&self) -> String {
        if self.phase_no > 0 {
            format!("P{} - {}", self.phase_no, self.designation)
        } else {
            self.designation.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(phase_no: i32) -> ManufacturingOperation {
        ManufacturingOperation {
            operation_id: "op-1".to_string(),
            order_id: "of-1".to_string(),
            phase_no,
            designation: "铣削".to_string(),
            default_machine_id: None,
            default_workstation_id: None,
        }
    }

    #[test]
    fn test_default_title_with_phase() {
        assert_eq!(op(3).default_title(), "P3 - 铣削");
    }

    #[test]
    fn test_default_title_without_phase() {
        assert_eq!(op(0).default_title(), "铣削");
    }
}
