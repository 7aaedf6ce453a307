// ==========================================
// 车间排程系统 - 资源解析器
// ==========================================
// 职责: 从显式指定与工序默认指派中解析出恰好一个资源
// 约束: 纯函数，只处理已取回的数据，无副作用
// 优先级: 显式指定 -> 工序默认工位 -> 工序默认机组
// ==========================================

use crate::domain::operation::ManufacturingOperation;
use crate::domain::resource::ResourceRef;
use thiserror::Error;

/// 资源解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceResolutionError {
    /// 机组与工位同时显式指定
    #[error("机组与工位不可同时指定")]
    BothProvided,

    /// 无显式指定且无法从工序默认指派推导
    #[error("缺少资源指派且无法从关联工序推导")]
    NotDerivable,
}

// ==========================================
// ResourceResolver - 资源解析
// ==========================================
pub struct ResourceResolver;

impl ResourceResolver {
    /// 解析资源指派
    ///
    /// # 规则（按序）
    /// 1. 两个显式指定同时出现 -> BothProvided
    /// 2. 恰好一个显式指定 -> 原样采用
    /// 3. 均未指定 -> 必须有工序默认指派，否则 NotDerivable
    /// 4. 工序推导优先工位（粒度更细），缺工位回退机组，两者皆无 -> NotDerivable
    pub fn resolve(
        explicit_machine: Option<&str>,
        explicit_workstation: Option<&str>,
        operation: Option<&ManufacturingOperation>,
    ) -> Result<ResourceRef, ResourceResolutionError> {
        match (explicit_machine, explicit_workstation) {
            (Some(_), Some(_)) => Err(ResourceResolutionError::BothProvided),
            (Some(machine_id), None) => Ok(ResourceRef::Machine(machine_id.to_string())),
            (None, Some(workstation_id)) => {
                Ok(ResourceRef::Workstation(workstation_id.to_string()))
            }
            (None, None) => {
                let operation = operation.ok_or(ResourceResolutionError::NotDerivable)?;
                if let Some(workstation_id) = operation.default_workstation_id.as_deref() {
                    Ok(ResourceRef::Workstation(workstation_id.to_string()))
                } else if let Some(machine_id) = operation.default_machine_id.as_deref() {
                    Ok(ResourceRef::Machine(machine_id.to_string()))
                } else {
                    Err(ResourceResolutionError::NotDerivable)
                }
            }
        }
    }
}
