// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证补丁的乐观并发令牌与数据库兜底约束
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod concurrent_control_test {
    use crate::test_helpers::{create_test_db, open_shared_conn, seed_base_fixtures, ts};
    use std::thread;
    use tempfile::NamedTempFile;
    use workshop_planning::api::{ApiError, CreateEventRequest, PatchEventRequest, PlanningApi};
    use workshop_planning::domain::types::EventKind;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn setup() -> (NamedTempFile, String, PlanningApi) {
        let (temp_file, db_path) = create_test_db().unwrap();
        let conn = open_shared_conn(&db_path);
        {
            let guard = conn.lock().unwrap();
            seed_base_fixtures(&guard).unwrap();
        }
        (temp_file, db_path.clone(), PlanningApi::new(conn))
    }

    fn seed_event(api: &PlanningApi) -> String {
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
            title: Some("并发测试事件".to_string()),
            description: None,
        };
        api.create_event(&req, "u1").unwrap().event.event_id
    }

    // ==========================================
    // 乐观令牌
    // ==========================================

    #[test]
    fn test_patch_without_token_always_applies() {
        let (_tmp, _path, api) = setup();
        let event_id = seed_event(&api);

        // 无令牌补丁不做过期判断，revision 随每次成功推进
        let patch = PatchEventRequest {
            end_at: Some(ts(2024, 1, 10, 9, 30)),
            ..Default::default()
        };
        let view = api.patch_event(&event_id, &patch, "u2").unwrap();
        assert_eq!(view.event.revision, 1);

        let view = api.patch_event(&event_id, &patch, "u2").unwrap();
        assert_eq!(view.event.revision, 2);
    }

    #[test]
    fn test_stale_token_rejected_after_intervening_patch() {
        let (_tmp, _path, api) = setup();
        let event_id = seed_event(&api);

        // 观察到 revision=0 后，另一补丁先行提交
        let first = PatchEventRequest {
            end_at: Some(ts(2024, 1, 10, 9, 30)),
            ..Default::default()
        };
        api.patch_event(&event_id, &first, "u1").unwrap();

        // 用最初观察到的令牌提交: 即使自身字段不冲突也必须失败
        let stale = PatchEventRequest {
            title: Some("基于过期观察的修改".to_string()),
            expected_revision: Some(0),
            ..Default::default()
        };
        match api.patch_event(&event_id, &stale, "u2") {
            Err(ApiError::StaleRevision {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!(
                "Expected StaleRevision, got {:?}",
                other.map(|v| v.event.revision)
            ),
        }
    }

    #[test]
    fn test_current_token_accepted() {
        let (_tmp, _path, api) = setup();
        let event_id = seed_event(&api);

        let patch = PatchEventRequest {
            title: Some("带令牌修改".to_string()),
            expected_revision: Some(0),
            ..Default::default()
        };
        let view = api.patch_event(&event_id, &patch, "u1").unwrap();
        assert_eq!(view.event.revision, 1);
        assert_eq!(view.event.title, "带令牌修改");
    }

    #[test]
    fn test_stale_error_is_retryable_and_distinct_from_not_found() {
        let (_tmp, _path, api) = setup();
        let event_id = seed_event(&api);

        api.patch_event(
            &event_id,
            &PatchEventRequest {
                title: Some("x".to_string()),
                ..Default::default()
            },
            "u1",
        )
        .unwrap();

        let stale = PatchEventRequest {
            title: Some("y".to_string()),
            expected_revision: Some(0),
            ..Default::default()
        };
        let err = api.patch_event(&event_id, &stale, "u1").unwrap_err();
        assert_eq!(err.code(), "PLANNING_STALE");
        assert!(err.is_retryable());

        let err = api
            .patch_event("no-such-event", &stale, "u1")
            .unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(!err.is_retryable());
    }

    // ==========================================
    // 双写竞态
    // ==========================================

    #[test]
    fn test_two_writers_same_token_exactly_one_wins() {
        let (_tmp, db_path, api) = setup();
        let event_id = seed_event(&api);

        // 两个独立连接（各自事务）用同一令牌竞争
        let mut handles = Vec::new();
        for i in 0..2 {
            let db_path = db_path.clone();
            let event_id = event_id.clone();
            handles.push(thread::spawn(move || {
                let api = PlanningApi::new(open_shared_conn(&db_path));
                let patch = PatchEventRequest {
                    title: Some(format!("写入者{}", i)),
                    expected_revision: Some(0),
                    ..Default::default()
                };
                api.patch_event(&event_id, &patch, "u1")
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok_count = results.iter().filter(|r| r.is_ok()).count();
        let stale_count = results
            .iter()
            .filter(|r| matches!(r, Err(ApiError::StaleRevision { .. })))
            .count();

        assert_eq!(ok_count, 1);
        assert_eq!(stale_count, 1);

        let detail = api.get_event_detail(&event_id).unwrap();
        assert_eq!(detail.event.event.revision, 1);
    }

    // ==========================================
    // 数据库兜底约束
    // ==========================================

    #[test]
    fn test_overlap_guard_trigger_rejects_raw_insert() {
        let (_tmp, db_path, api) = setup();
        seed_event(&api); // m1 上 [08:00, 10:00)

        // 绕过应用层预检，直接写入重叠行 -> 触发器中止
        let conn = workshop_planning::db::open_sqlite_connection(&db_path).unwrap();
        let result = conn.execute(
            r#"INSERT INTO planning_event (
                event_id, kind, status, priority, machine_id,
                start_at, end_at, allow_overlap, title,
                created_at, created_by, updated_at, revision
            ) VALUES ('raw-1', 'CUSTOM', 'PLANNED', 'NORMAL', 'm1',
                '2024-01-10 09:00:00', '2024-01-10 11:00:00', 0, '竞态写入',
                '2024-01-10 00:00:00', 'u1', '2024-01-10 00:00:00', 0)"#,
            [],
        );

        let err = result.unwrap_err();
        assert!(err.to_string().contains("PLANNING_CONFLICT"));
    }

    #[test]
    fn test_overlap_guard_trigger_allows_overlap_flagged_rows() {
        let (_tmp, db_path, api) = setup();
        seed_event(&api);

        // allow_overlap=1 的行不触发兜底约束
        let conn = workshop_planning::db::open_sqlite_connection(&db_path).unwrap();
        let result = conn.execute(
            r#"INSERT INTO planning_event (
                event_id, kind, status, priority, machine_id,
                start_at, end_at, allow_overlap, title,
                created_at, created_by, updated_at, revision
            ) VALUES ('raw-2', 'CUSTOM', 'PLANNED', 'NORMAL', 'm1',
                '2024-01-10 09:00:00', '2024-01-10 11:00:00', 1, '豁免写入',
                '2024-01-10 00:00:00', 'u1', '2024-01-10 00:00:00', 0)"#,
            [],
        );
        assert!(result.is_ok());
    }
}
