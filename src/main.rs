// ==========================================
// 车间排程系统 - 运维入口
// ==========================================
// 职责: 初始化日志与数据库（建库/PRAGMA/版本检查）
// 说明: 传输层在外部部署单元中；此入口仅负责库初始化
// ==========================================

use std::path::PathBuf;
use workshop_planning::{db, logging, DocumentStore};

/// 默认数据库路径: <平台数据目录>/workshop-planning/planning.db
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("workshop-planning")
        .join("planning.db")
}

fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", workshop_planning::APP_NAME, workshop_planning::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!("使用数据库: {}", db_path.display());

    let conn = db::open_sqlite_connection(&db_path.to_string_lossy())?;
    db::init_schema(&conn)?;

    match db::read_schema_version(&conn)? {
        Some(version) if version == db::CURRENT_SCHEMA_VERSION => {
            tracing::info!("schema_version = {}", version);
        }
        Some(version) => {
            tracing::warn!(
                "schema_version 不匹配: 库为 {}, 代码期望 {}",
                version,
                db::CURRENT_SCHEMA_VERSION
            );
        }
        None => {
            tracing::warn!("schema_version 表缺失，数据库可能未初始化完成");
        }
    }

    let store_root = DocumentStore::default_root();
    DocumentStore::new(store_root.clone())?;
    tracing::info!("文档存储目录: {}", store_root.display());

    tracing::info!("数据库初始化完成");
    Ok(())
}
