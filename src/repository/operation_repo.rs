// ==========================================
// 车间排程系统 - 制造关联仓储
// ==========================================
// 订单/工序为外部主数据，本核心只读
// ==========================================

use crate::domain::operation::{ManufacturingOperation, ManufacturingOrder};
use crate::repository::error::RepositoryResult;
use rusqlite::{params, Connection, Row};

// ==========================================
// OperationRepository - 工序/订单只读查询
// ==========================================
pub struct OperationRepository;

impl OperationRepository {
    /// 按 id 查询制造工序
    pub fn find_operation(
        conn: &Connection,
        operation_id: &str,
    ) -> RepositoryResult<Option<ManufacturingOperation>> {
        match conn.query_row(
            r#"SELECT operation_id, order_id, phase_no, designation,
                      default_machine_id, default_workstation_id
               FROM manufacturing_operation
               WHERE operation_id = ?"#,
            params![operation_id],
            Self::map_operation_row,
        ) {
            Ok(operation) => Ok(Some(operation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按 id 查询制造订单
    pub fn find_order(
        conn: &Connection,
        order_id: &str,
    ) -> RepositoryResult<Option<ManufacturingOrder>> {
        match conn.query_row(
            r#"SELECT order_id, order_no, piece_ref, client_name
               FROM manufacturing_order
               WHERE order_id = ?"#,
            params![order_id],
            Self::map_order_row,
        ) {
            Ok(order) => Ok(Some(order)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn map_operation_row(row: &Row) -> rusqlite::Result<ManufacturingOperation> {
        Ok(ManufacturingOperation {
            operation_id: row.get(0)?,
            order_id: row.get(1)?,
            phase_no: row.get(2)?,
            designation: row.get(3)?,
            default_machine_id: row.get(4)?,
            default_workstation_id: row.get(5)?,
        })
    }

    fn map_order_row(row: &Row) -> rusqlite::Result<ManufacturingOrder> {
        Ok(ManufacturingOrder {
            order_id: row.get(0)?,
            order_no: row.get(1)?,
            piece_ref: row.get(2)?,
            client_name: row.get(3)?,
        })
    }
}
