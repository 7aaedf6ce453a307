// ==========================================
// 事件查询与资源目录测试
// ==========================================
// 职责: 验证时间窗过滤、反范式视图、资源列表
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod event_query_test {
    use crate::test_helpers::{create_test_db, open_shared_conn, seed_base_fixtures, ts};
    use tempfile::NamedTempFile;
    use workshop_planning::api::{CreateEventRequest, PlanningApi, ResourceApi};
    use workshop_planning::domain::resource::Resource;
    use workshop_planning::domain::types::{EventKind, EventStatus, ResourceKind};
    use workshop_planning::EventListFilter;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn setup() -> (NamedTempFile, PlanningApi, ResourceApi) {
        let (temp_file, db_path) = create_test_db().unwrap();
        let conn = open_shared_conn(&db_path);
        {
            let guard = conn.lock().unwrap();
            seed_base_fixtures(&guard).unwrap();
        }
        (
            temp_file,
            PlanningApi::new(conn.clone()),
            ResourceApi::new(conn),
        )
    }

    fn machine_event(
        machine_id: &str,
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
        title: &str,
    ) -> CreateEventRequest {
        CreateEventRequest {
            kind: EventKind::Custom,
            status: None,
            priority: None,
            order_id: None,
            operation_id: None,
            machine_id: Some(machine_id.to_string()),
            workstation_id: None,
            start_at: start,
            end_at: end,
            allow_overlap: false,
            title: Some(title.to_string()),
            description: None,
        }
    }

    // ==========================================
    // 时间窗语义
    // ==========================================

    #[test]
    fn test_window_uses_half_open_overlap() {
        let (_tmp, api, _res) = setup();

        // 窗口 [08:00, 18:00)
        api.create_event(
            &machine_event("m1", ts(2024, 1, 10, 6, 0), ts(2024, 1, 10, 7, 0), "窗前结束"),
            "u1",
        )
        .unwrap();
        api.create_event(
            &machine_event("m1", ts(2024, 1, 10, 7, 0), ts(2024, 1, 10, 9, 0), "跨窗口起点"),
            "u1",
        )
        .unwrap();
        api.create_event(
            &machine_event("m1", ts(2024, 1, 10, 12, 0), ts(2024, 1, 10, 13, 0), "窗内"),
            "u1",
        )
        .unwrap();
        api.create_event(
            &machine_event("m1", ts(2024, 1, 10, 18, 0), ts(2024, 1, 10, 20, 0), "窗后开始"),
            "u1",
        )
        .unwrap();

        let views = api
            .list_events(&EventListFilter::window(
                ts(2024, 1, 10, 8, 0),
                ts(2024, 1, 10, 18, 0),
            ))
            .unwrap();

        let titles: Vec<&str> = views.iter().map(|v| v.event.title.as_str()).collect();
        // 在 08:00 恰好结束、在 18:00 恰好开始的事件均不入窗
        assert_eq!(titles, vec!["跨窗口起点", "窗内"]);
    }

    #[test]
    fn test_list_ordering_by_start_then_id() {
        let (_tmp, api, _res) = setup();

        api.create_event(
            &machine_event("m1", ts(2024, 1, 10, 14, 0), ts(2024, 1, 10, 15, 0), "下午"),
            "u1",
        )
        .unwrap();
        api.create_event(
            &machine_event("m2", ts(2024, 1, 10, 8, 0), ts(2024, 1, 10, 9, 0), "早上"),
            "u1",
        )
        .unwrap();

        let views = api
            .list_events(&EventListFilter::window(
                ts(2024, 1, 10, 0, 0),
                ts(2024, 1, 11, 0, 0),
            ))
            .unwrap();
        assert_eq!(views[0].event.title, "早上");
        assert_eq!(views[1].event.title, "下午");
    }

    // ==========================================
    // 过滤条件
    // ==========================================

    #[test]
    fn test_filter_by_resource_and_kind() {
        let (_tmp, api, _res) = setup();

        api.create_event(
            &machine_event("m1", ts(2024, 1, 10, 8, 0), ts(2024, 1, 10, 9, 0), "M1事件"),
            "u1",
        )
        .unwrap();
        api.create_event(
            &machine_event("m2", ts(2024, 1, 10, 8, 0), ts(2024, 1, 10, 9, 0), "M2事件"),
            "u1",
        )
        .unwrap();
        let mut maintenance =
            machine_event("m1", ts(2024, 1, 10, 10, 0), ts(2024, 1, 10, 11, 0), "维护窗口");
        maintenance.kind = EventKind::Maintenance;
        api.create_event(&maintenance, "u1").unwrap();

        let mut filter =
            EventListFilter::window(ts(2024, 1, 10, 0, 0), ts(2024, 1, 11, 0, 0));
        filter.machine_id = Some("m1".to_string());
        let views = api.list_events(&filter).unwrap();
        assert_eq!(views.len(), 2);

        filter.kind = Some(EventKind::Maintenance);
        let views = api.list_events(&filter).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].event.title, "维护窗口");
    }

    #[test]
    fn test_filter_by_order_and_status() {
        let (_tmp, api, _res) = setup();

        let mut linked =
            machine_event("m1", ts(2024, 1, 10, 8, 0), ts(2024, 1, 10, 9, 0), "工序事件");
        linked.kind = EventKind::Operation;
        linked.operation_id = Some("op-20".to_string());
        linked.machine_id = None;
        linked.title = None; // 标题从工序推导
        api.create_event(&linked, "u1").unwrap();
        api.create_event(
            &machine_event("m2", ts(2024, 1, 10, 8, 0), ts(2024, 1, 10, 9, 0), "独立事件"),
            "u1",
        )
        .unwrap();

        let mut filter =
            EventListFilter::window(ts(2024, 1, 10, 0, 0), ts(2024, 1, 11, 0, 0));
        filter.order_id = Some("of-1".to_string());
        let views = api.list_events(&filter).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].event.title, "抛光");

        filter.status = Some(EventStatus::Done);
        assert!(api.list_events(&filter).unwrap().is_empty());
    }

    #[test]
    fn test_archived_events_hidden_unless_requested() {
        let (_tmp, api, _res) = setup();

        let a = api
            .create_event(
                &machine_event("m1", ts(2024, 1, 10, 8, 0), ts(2024, 1, 10, 9, 0), "将归档"),
                "u1",
            )
            .unwrap();
        api.archive_event(&a.event.event_id, "u1").unwrap();

        let mut filter =
            EventListFilter::window(ts(2024, 1, 10, 0, 0), ts(2024, 1, 11, 0, 0));
        assert!(api.list_events(&filter).unwrap().is_empty());

        filter.include_archived = true;
        let views = api.list_events(&filter).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].event.status, EventStatus::Cancelled);
    }

    // ==========================================
    // 反范式视图
    // ==========================================

    #[test]
    fn test_view_enriched_with_order_and_user_labels() {
        let (_tmp, api, _res) = setup();

        let req = CreateEventRequest {
            kind: EventKind::Operation,
            status: None,
            priority: None,
            order_id: None,
            operation_id: Some("op-10".to_string()),
            machine_id: None,
            workstation_id: None,
            start_at: ts(2024, 1, 10, 8, 0),
            end_at: ts(2024, 1, 10, 10, 0),
            allow_overlap: false,
            title: None,
            description: None,
        };
        let view = api.create_event(&req, "u1").unwrap();

        assert_eq!(view.order_no.as_deref(), Some("OF-2024-001"));
        assert_eq!(view.piece_ref.as_deref(), Some("PC-001"));
        assert_eq!(view.client_name.as_deref(), Some("客户A"));
        assert_eq!(view.operation_designation.as_deref(), Some("铣削"));
        assert_eq!(view.operation_phase_no, Some(2));
        assert_eq!(view.resource_code, "W1");
        assert_eq!(view.resource_label, "一号工位");
        assert_eq!(view.created_by_name.as_deref(), Some("张三"));
    }

    #[test]
    fn test_get_event_detail_missing_id() {
        let (_tmp, api, _res) = setup();
        let err = api.get_event_detail("no-such-event").unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    // ==========================================
    // 资源目录
    // ==========================================

    #[test]
    fn test_list_resources_excludes_archived_by_default() {
        let (_tmp, _api, res) = setup();

        let resources = res.list_resources(false).unwrap();
        // m1/m2 + w1/w2（m9 已归档）
        assert_eq!(resources.len(), 4);
        assert!(resources
            .iter()
            .all(|r| !matches!(r, Resource::Machine(m) if m.machine_id == "m9")));

        let machine_count = resources
            .iter()
            .filter(|r| r.kind() == ResourceKind::Machine)
            .count();
        assert_eq!(machine_count, 2);
    }

    #[test]
    fn test_list_resources_with_archived() {
        let (_tmp, _api, res) = setup();

        let resources = res.list_resources(true).unwrap();
        assert_eq!(resources.len(), 5);
        let archived = resources
            .iter()
            .find_map(|r| match r {
                Resource::Machine(m) if m.machine_id == "m9" => Some(m),
                _ => None,
            })
            .expect("m9 应在含归档列表中");
        assert!(archived.archived_at.is_some());
        assert!(!archived.is_available);
    }
}
