// ==========================================
// 车间排程系统 - 评论与文档挂接接口
// ==========================================
// 职责: 事件评论追加、文档批量挂接与取回
// 红线: 目标事件必须存在且未归档（在各自事务内校验）
// 红线: 审计写入与元数据写入同事务
// ==========================================

use crate::api::dto::{DocumentContent, UploadedDocument};
use crate::api::error::{ApiError, ApiResult};
use crate::api::planning_api::PlanningApi;
use crate::domain::action_log::ActionType;
use crate::domain::event::{DocumentMeta, PlanningEvent, PlanningEventComment, PlanningEventDocument};
use crate::repository::comment_repo::{CommentView, EventCommentRepository};
use crate::repository::document_repo::{DocumentView, EventDocumentRepository};
use crate::repository::event_repo::PlanningEventRepository;
use crate::repository::user_repo::UserRepository;
use crate::storage::document_store::DocumentStore;
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

// ==========================================
// AttachmentApi - 评论/文档接口
// ==========================================
pub struct AttachmentApi {
    conn: Arc<Mutex<Connection>>,
    store: DocumentStore,
}

impl AttachmentApi {
    pub fn new(conn: Arc<Mutex<Connection>>, store: DocumentStore) -> Self {
        Self { conn, store }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> ApiResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))
    }

    /// 事务内校验目标事件可追加（存在且未归档）
    fn require_mutable_event(conn: &Connection, event_id: &str) -> ApiResult<PlanningEvent> {
        let event = PlanningEventRepository::find_by_id(conn, event_id)?.ok_or_else(|| {
            ApiError::NotFound(format!("PlanningEvent(id={})不存在", event_id))
        })?;
        if event.is_archived() {
            return Err(ApiError::ArchivedImmutable {
                event_id: event_id.to_string(),
            });
        }
        Ok(event)
    }

    // ==========================================
    // 评论
    // ==========================================

    /// 追加评论
    pub fn add_comment(&self, event_id: &str, body: &str, author: &str) -> ApiResult<CommentView> {
        if body.trim().is_empty() {
            return Err(ApiError::InvalidInput("评论内容不能为空".to_string()));
        }
        if author.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        Self::require_mutable_event(&tx, event_id)?;

        let comment = PlanningEventComment {
            comment_id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            body: body.to_string(),
            author_id: author.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        EventCommentRepository::insert(&tx, &comment)?;

        PlanningApi::record_action(
            &tx,
            author,
            ActionType::AddComment,
            event_id,
            Some(serde_json::json!({ "comment_id": comment.comment_id })),
        )?;

        let author_name = UserRepository::find_username(&tx, author)?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, comment_id = %comment.comment_id, "评论已追加");
        Ok(CommentView {
            comment,
            author_name,
        })
    }

    // ==========================================
    // 文档
    // ==========================================

    /// 批量挂接文档
    ///
    /// # 流程（单事务）
    /// - 逐个将上传文件按内容寻址移入受管目录
    /// - 每个文档写一行元数据 + 一行事件关联
    /// - 整批只写一条审计（记录挂接数量）
    ///
    /// 说明：事务失败时已入库的文件字节按内容寻址保留，
    /// 不产生脏元数据，重传同内容自然去重。
    pub fn attach_documents(
        &self,
        event_id: &str,
        uploads: Vec<UploadedDocument>,
        actor: &str,
    ) -> ApiResult<Vec<DocumentView>> {
        if uploads.is_empty() {
            return Err(ApiError::InvalidInput("文档列表不能为空".to_string()));
        }
        if actor.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        Self::require_mutable_event(&tx, event_id)?;

        let now = chrono::Utc::now().naive_utc();
        let mut attached = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let blob = self.store.ingest(&upload.path)?;

            let meta = DocumentMeta {
                document_id: Uuid::new_v4().to_string(),
                file_name: upload.file_name,
                media_type: upload.media_type,
                size_bytes: blob.size_bytes,
                checksum: blob.checksum,
                uploaded_by: Some(actor.to_string()),
                uploaded_at: now,
            };
            EventDocumentRepository::insert_meta(&tx, &meta)?;
            EventDocumentRepository::insert_link(
                &tx,
                &PlanningEventDocument {
                    event_id: event_id.to_string(),
                    document_id: meta.document_id.clone(),
                    doc_type: upload.doc_type.clone(),
                },
            )?;
            attached.push(DocumentView {
                meta,
                doc_type: upload.doc_type,
            });
        }

        PlanningApi::record_action(
            &tx,
            actor,
            ActionType::AttachDocuments,
            event_id,
            Some(serde_json::json!({ "attached_count": attached.len() })),
        )?;

        tx.commit()
            .map_err(|e| ApiError::DatabaseTransactionError(e.to_string()))?;

        info!(event_id, count = attached.len(), "文档已挂接");
        Ok(attached)
    }

    /// 取回文档字节与记录的文件名/媒体类型
    pub fn get_document(&self, document_id: &str) -> ApiResult<DocumentContent> {
        let meta = {
            let conn = self.get_conn()?;
            EventDocumentRepository::find_meta(&conn, document_id)?.ok_or_else(|| {
                ApiError::NotFound(format!("Document(id={})不存在", document_id))
            })?
        };
        // 文件读取在连接锁之外进行
        let bytes = self.store.read(&meta.checksum)?;
        Ok(DocumentContent { meta, bytes })
    }
}
