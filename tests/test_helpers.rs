// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、基础主数据种子等功能
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use workshop_planning::db;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接句柄（API 层注入用）
pub fn open_shared_conn(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(db::open_sqlite_connection(db_path).unwrap()))
}

/// 写入基础主数据种子
///
/// - 机组: m1(M1)/m2(M2)，m9 已归档
/// - 工位: w1(W1, 归属 m1)/w2(W2, 独立)
/// - 用户: u1(张三)/u2(李四)
/// - 订单: of-1(OF-2024-001, 工件 PC-001, 客户A)/of-2(OF-2024-002)
/// - 工序: op-10(of-1, P2 铣削, 默认 w1+m1)
///         op-20(of-1, P0 抛光, 默认 m1)
///         op-30(of-1, P1 检验, 无默认指派)
pub fn seed_base_fixtures(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        r#"
        INSERT INTO machine (machine_id, machine_code, machine_name, machine_type, status, is_available)
        VALUES ('m1', 'M1', '一号机组', 'CNC', 'NORMAL', 1),
               ('m2', 'M2', '二号机组', 'CNC', 'NORMAL', 1);
        INSERT INTO machine (machine_id, machine_code, machine_name, status, is_available, archived_at)
        VALUES ('m9', 'M9', '报废机组', 'RETIRED', 0, '2023-06-01 00:00:00');

        INSERT INTO workstation (workstation_id, workstation_code, label, machine_id, is_active)
        VALUES ('w1', 'W1', '一号工位', 'm1', 1),
               ('w2', 'W2', '独立工位', NULL, 1);

        INSERT INTO app_user (user_id, username)
        VALUES ('u1', '张三'), ('u2', '李四');

        INSERT INTO manufacturing_order (order_id, order_no, piece_ref, client_name)
        VALUES ('of-1', 'OF-2024-001', 'PC-001', '客户A'),
               ('of-2', 'OF-2024-002', NULL, '客户B');

        INSERT INTO manufacturing_operation
            (operation_id, order_id, phase_no, designation, default_machine_id, default_workstation_id)
        VALUES ('op-10', 'of-1', 2, '铣削', 'm1', 'w1'),
               ('op-20', 'of-1', 0, '抛光', 'm1', NULL),
               ('op-30', 'of-1', 1, '检验', NULL, NULL);
        "#,
    )?;
    Ok(())
}

/// 组装测试时间戳（秒精度）
pub fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}
