// ==========================================
// 评论与文档挂接测试
// ==========================================
// 职责: 验证追加语义、归档拒绝、内容寻址存储与取回
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod attachment_test {
    use crate::test_helpers::{create_test_db, open_shared_conn, seed_base_fixtures, ts};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{NamedTempFile, TempDir};
    use workshop_planning::api::{
        AttachmentApi, CreateEventRequest, PlanningApi, UploadedDocument,
    };
    use workshop_planning::domain::types::EventKind;
    use workshop_planning::storage::DocumentStore;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    struct TestEnv {
        _db_file: NamedTempFile,
        upload_dir: TempDir,
        planning: PlanningApi,
        attachments: AttachmentApi,
    }

    fn setup() -> TestEnv {
        let (db_file, db_path) = create_test_db().unwrap();
        let conn = open_shared_conn(&db_path);
        {
            let guard = conn.lock().unwrap();
            seed_base_fixtures(&guard).unwrap();
        }
        let upload_dir = TempDir::new().unwrap();
        let store = DocumentStore::new(upload_dir.path().join("store")).unwrap();
        TestEnv {
            _db_file: db_file,
            planning: PlanningApi::new(conn.clone()),
            attachments: AttachmentApi::new(conn, store),
            upload_dir,
        }
    }

    fn seed_event(planning: &PlanningApi) -> String {
        let req = CreateEventRequest {
            kind: EventKind::Custom,
            status: None,
            priority: None,
            order_id: None,
            operation_id: None,
            machine_id: Some("m1".to_string()),
            workstation_id: None,
            start_at: ts(2024, 1, 10, 8, 0),
            end_at: ts(2024, 1, 10, 10, 0),
            allow_overlap: false,
            title: Some("挂接目标".to_string()),
            description: None,
        };
        planning.create_event(&req, "u1").unwrap().event.event_id
    }

    fn write_upload(env: &TestEnv, name: &str, content: &[u8]) -> PathBuf {
        let path = env.upload_dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn upload(path: PathBuf, file_name: &str, media_type: &str) -> UploadedDocument {
        UploadedDocument {
            path,
            file_name: file_name.to_string(),
            media_type: Some(media_type.to_string()),
            doc_type: Some("DRAWING".to_string()),
        }
    }

    // ==========================================
    // 评论
    // ==========================================

    #[test]
    fn test_add_comment_and_read_back_in_detail() {
        let env = setup();
        let event_id = seed_event(&env.planning);

        let view = env
            .attachments
            .add_comment(&event_id, "首件确认通过", "u2")
            .unwrap();
        assert_eq!(view.comment.body, "首件确认通过");
        assert_eq!(view.author_name.as_deref(), Some("李四"));

        let detail = env.planning.get_event_detail(&event_id).unwrap();
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].comment.author_id, "u2");
    }

    #[test]
    fn test_comment_validation_and_missing_event() {
        let env = setup();
        let event_id = seed_event(&env.planning);

        let err = env.attachments.add_comment(&event_id, "   ", "u1").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = env
            .attachments
            .add_comment("no-such-event", "内容", "u1")
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_archived_event_rejects_comments() {
        let env = setup();
        let event_id = seed_event(&env.planning);
        env.planning.archive_event(&event_id, "u1").unwrap();

        let err = env
            .attachments
            .add_comment(&event_id, "迟到的评论", "u1")
            .unwrap_err();
        assert_eq!(err.code(), "ARCHIVED_IMMUTABLE");
    }

    // ==========================================
    // 文档挂接
    // ==========================================

    #[test]
    fn test_attach_batch_and_fetch_bytes() {
        let env = setup();
        let event_id = seed_event(&env.planning);

        let uploads = vec![
            upload(
                write_upload(&env, "a.pdf", b"drawing-a"),
                "a.pdf",
                "application/pdf",
            ),
            upload(
                write_upload(&env, "b.png", b"photo-b"),
                "b.png",
                "image/png",
            ),
        ];
        let attached = env
            .attachments
            .attach_documents(&event_id, uploads, "u1")
            .unwrap();
        assert_eq!(attached.len(), 2);
        assert_ne!(attached[0].meta.checksum, attached[1].meta.checksum);

        // 取回: 字节与记录的文件名/媒体类型一致
        let content = env
            .attachments
            .get_document(&attached[0].meta.document_id)
            .unwrap();
        assert_eq!(content.bytes, b"drawing-a");
        assert_eq!(content.meta.file_name, "a.pdf");
        assert_eq!(content.meta.media_type.as_deref(), Some("application/pdf"));

        let detail = env.planning.get_event_detail(&event_id).unwrap();
        assert_eq!(detail.documents.len(), 2);
    }

    #[test]
    fn test_attach_same_content_twice_dedups_bytes_not_rows() {
        let env = setup();
        let event_id = seed_event(&env.planning);

        let uploads = vec![
            upload(
                write_upload(&env, "v1.pdf", b"same-bytes"),
                "v1.pdf",
                "application/pdf",
            ),
            upload(
                write_upload(&env, "v2.pdf", b"same-bytes"),
                "v2.pdf",
                "application/pdf",
            ),
        ];
        let attached = env
            .attachments
            .attach_documents(&event_id, uploads, "u1")
            .unwrap();

        // 元数据两行，各自 id；字节按内容寻址只存一份
        assert_eq!(attached.len(), 2);
        assert_ne!(attached[0].meta.document_id, attached[1].meta.document_id);
        assert_eq!(attached[0].meta.checksum, attached[1].meta.checksum);
    }

    #[test]
    fn test_attach_batch_writes_single_audit_entry() {
        let env = setup();
        let event_id = seed_event(&env.planning);

        let uploads = vec![
            upload(
                write_upload(&env, "a.bin", b"aaa"),
                "a.bin",
                "application/octet-stream",
            ),
            upload(
                write_upload(&env, "b.bin", b"bbb"),
                "b.bin",
                "application/octet-stream",
            ),
            upload(
                write_upload(&env, "c.bin", b"ccc"),
                "c.bin",
                "application/octet-stream",
            ),
        ];
        env.attachments
            .attach_documents(&event_id, uploads, "u1")
            .unwrap();

        // 创建 1 条 + 整批挂接 1 条
        let actions = env.planning.list_event_actions(&event_id, 10).unwrap();
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn test_attach_validation_and_archived_rejection() {
        let env = setup();
        let event_id = seed_event(&env.planning);

        let err = env
            .attachments
            .attach_documents(&event_id, Vec::new(), "u1")
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        env.planning.archive_event(&event_id, "u1").unwrap();
        let uploads = vec![upload(
            write_upload(&env, "late.bin", b"late"),
            "late.bin",
            "application/octet-stream",
        )];
        let err = env
            .attachments
            .attach_documents(&event_id, uploads, "u1")
            .unwrap_err();
        assert_eq!(err.code(), "ARCHIVED_IMMUTABLE");
    }

    #[test]
    fn test_get_document_missing_id() {
        let env = setup();
        let err = env.attachments.get_document("no-such-document").unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
