// ==========================================
// 车间排程系统 - 文档元数据仓储
// ==========================================
// 红线: 仅追加；文件内容由 storage::DocumentStore 管理
// ==========================================

use crate::domain::event::{DocumentMeta, PlanningEventDocument};
use crate::repository::error::RepositoryResult;
use crate::repository::event_repo::{fmt_ts, parse_ts};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

// ==========================================
// DocumentView - 文档展示视图（元数据 + 关联类型）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentView {
    pub meta: DocumentMeta,
    pub doc_type: Option<String>,
}

// ==========================================
// EventDocumentRepository - 文档仓储
// ==========================================
pub struct EventDocumentRepository;

impl EventDocumentRepository {
    /// 插入文档元数据行
    pub fn insert_meta(conn: &Connection, meta: &DocumentMeta) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO document (
                document_id, file_name, media_type, size_bytes,
                checksum, uploaded_by, uploaded_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &meta.document_id,
                &meta.file_name,
                &meta.media_type,
                meta.size_bytes,
                &meta.checksum,
                &meta.uploaded_by,
                fmt_ts(&meta.uploaded_at),
            ],
        )?;
        Ok(())
    }

    /// 插入事件-文档关联行
    pub fn insert_link(conn: &Connection, link: &PlanningEventDocument) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO planning_event_document (event_id, document_id, doc_type)
               VALUES (?, ?, ?)"#,
            params![&link.event_id, &link.document_id, &link.doc_type],
        )?;
        Ok(())
    }

    /// 查询事件挂接的全部文档
    pub fn list_by_event(conn: &Connection, event_id: &str) -> RepositoryResult<Vec<DocumentView>> {
        let mut stmt = conn.prepare(
            r#"SELECT d.document_id, d.file_name, d.media_type, d.size_bytes,
                      d.checksum, d.uploaded_by, d.uploaded_at, l.doc_type
               FROM planning_event_document l
               JOIN document d ON d.document_id = l.document_id
               WHERE l.event_id = ?
               ORDER BY d.uploaded_at, d.document_id"#,
        )?;

        let documents = stmt
            .query_map(params![event_id], Self::map_view_row)?
            .collect::<Result<Vec<DocumentView>, _>>()?;

        Ok(documents)
    }

    /// 按 document_id 查询元数据
    pub fn find_meta(conn: &Connection, document_id: &str) -> RepositoryResult<Option<DocumentMeta>> {
        match conn.query_row(
            r#"SELECT document_id, file_name, media_type, size_bytes,
                      checksum, uploaded_by, uploaded_at
               FROM document
               WHERE document_id = ?"#,
            params![document_id],
            Self::map_meta_row,
        ) {
            Ok(meta) => Ok(Some(meta)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn map_meta_row(row: &Row) -> rusqlite::Result<DocumentMeta> {
        Ok(DocumentMeta {
            document_id: row.get(0)?,
            file_name: row.get(1)?,
            media_type: row.get(2)?,
            size_bytes: row.get(3)?,
            checksum: row.get(4)?,
            uploaded_by: row.get(5)?,
            uploaded_at: parse_ts(6, row.get::<_, String>(6)?)?,
        })
    }

    fn map_view_row(row: &Row) -> rusqlite::Result<DocumentView> {
        Ok(DocumentView {
            meta: Self::map_meta_row(row)?,
            doc_type: row.get(7)?,
        })
    }
}
