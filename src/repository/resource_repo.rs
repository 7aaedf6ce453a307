// ==========================================
// 车间排程系统 - 资源目录仓储
// ==========================================
// 资源目录由外部模块维护，本核心只读
// ==========================================

use crate::domain::resource::{Machine, Resource, Workstation};
use crate::repository::error::RepositoryResult;
use crate::repository::event_repo::parse_ts;
use rusqlite::{params, Connection, Row};

// ==========================================
// ResourceRepository - 机组/工位只读查询
// ==========================================
pub struct ResourceRepository;

impl ResourceRepository {
    /// 按 id 查询机组
    pub fn find_machine(conn: &Connection, machine_id: &str) -> RepositoryResult<Option<Machine>> {
        match conn.query_row(
            r#"SELECT machine_id, machine_code, machine_name, machine_type,
                      status, is_available, archived_at
               FROM machine
               WHERE machine_id = ?"#,
            params![machine_id],
            Self::map_machine_row,
        ) {
            Ok(machine) => Ok(Some(machine)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按 id 查询工位
    pub fn find_workstation(
        conn: &Connection,
        workstation_id: &str,
    ) -> RepositoryResult<Option<Workstation>> {
        match conn.query_row(
            r#"SELECT workstation_id, workstation_code, label, machine_id,
                      is_active, archived_at
               FROM workstation
               WHERE workstation_id = ?"#,
            params![workstation_id],
            Self::map_workstation_row,
        ) {
            Ok(workstation) => Ok(Some(workstation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 机组列表（默认过滤已归档）
    pub fn list_machines(conn: &Connection, include_archived: bool) -> RepositoryResult<Vec<Machine>> {
        let mut sql = String::from(
            r#"SELECT machine_id, machine_code, machine_name, machine_type,
                      status, is_available, archived_at
               FROM machine"#,
        );
        if !include_archived {
            sql.push_str(" WHERE archived_at IS NULL");
        }
        sql.push_str(" ORDER BY machine_code");

        let mut stmt = conn.prepare(&sql)?;
        let machines = stmt
            .query_map([], Self::map_machine_row)?
            .collect::<Result<Vec<Machine>, _>>()?;
        Ok(machines)
    }

    /// 工位列表（默认过滤已归档）
    pub fn list_workstations(
        conn: &Connection,
        include_archived: bool,
    ) -> RepositoryResult<Vec<Workstation>> {
        let mut sql = String::from(
            r#"SELECT workstation_id, workstation_code, label, machine_id,
                      is_active, archived_at
               FROM workstation"#,
        );
        if !include_archived {
            sql.push_str(" WHERE archived_at IS NULL");
        }
        sql.push_str(" ORDER BY workstation_code");

        let mut stmt = conn.prepare(&sql)?;
        let workstations = stmt
            .query_map([], Self::map_workstation_row)?
            .collect::<Result<Vec<Workstation>, _>>()?;
        Ok(workstations)
    }

    /// 合并资源列表（机组在前，工位在后）
    pub fn list_resources(
        conn: &Connection,
        include_archived: bool,
    ) -> RepositoryResult<Vec<Resource>> {
        let mut resources: Vec<Resource> = Self::list_machines(conn, include_archived)?
            .into_iter()
            .map(Resource::Machine)
            .collect();
        resources.extend(
            Self::list_workstations(conn, include_archived)?
                .into_iter()
                .map(Resource::Workstation),
        );
        Ok(resources)
    }

    fn map_machine_row(row: &Row) -> rusqlite::Result<Machine> {
        Ok(Machine {
            machine_id: row.get(0)?,
            machine_code: row.get(1)?,
            machine_name: row.get(2)?,
            machine_type: row.get(3)?,
            status: row.get(4)?,
            is_available: row.get::<_, i64>(5)? != 0,
            archived_at: row
                .get::<_, Option<String>>(6)?
                .map(|s| parse_ts(6, s))
                .transpose()?,
        })
    }

    fn map_workstation_row(row: &Row) -> rusqlite::Result<Workstation> {
        Ok(Workstation {
            workstation_id: row.get(0)?,
            workstation_code: row.get(1)?,
            label: row.get(2)?,
            machine_id: row.get(3)?,
            is_active: row.get::<_, i64>(4)? != 0,
            archived_at: row
                .get::<_, Option<String>>(5)?
                .map(|s| parse_ts(5, s))
                .transpose()?,
        })
    }
}
