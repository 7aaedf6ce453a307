// ==========================================
// 车间排程系统 - 事件评论仓储
// ==========================================
// 红线: 仅追加，不提供更新/删除
// ==========================================

use crate::domain::event::PlanningEventComment;
use crate::repository::error::RepositoryResult;
use crate::repository::event_repo::{fmt_ts, parse_ts};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

// ==========================================
// CommentView - 评论展示视图（含作者用户名）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: PlanningEventComment,
    pub author_name: Option<String>,
}

// ==========================================
// EventCommentRepository - 评论仓储
// ==========================================
pub struct EventCommentRepository;

impl EventCommentRepository {
    /// 插入评论（归档校验由上层在同一事务内完成）
    pub fn insert(conn: &Connection, comment: &PlanningEventComment) -> RepositoryResult<()> {
        conn.execute(
            r#"INSERT INTO planning_event_comment (
                comment_id, event_id, body, author_id, created_at
            ) VALUES (?, ?, ?, ?, ?)"#,
            params![
                &comment.comment_id,
                &comment.event_id,
                &comment.body,
                &comment.author_id,
                fmt_ts(&comment.created_at),
            ],
        )?;
        Ok(())
    }

    /// 查询事件的全部评论（按创建时间正序，含作者用户名）
    pub fn list_by_event(conn: &Connection, event_id: &str) -> RepositoryResult<Vec<CommentView>> {
        let mut stmt = conn.prepare(
            r#"SELECT c.comment_id, c.event_id, c.body, c.author_id, c.created_at,
                      u.username
               FROM planning_event_comment c
               LEFT JOIN app_user u ON u.user_id = c.author_id
               WHERE c.event_id = ?
               ORDER BY c.created_at, c.comment_id"#,
        )?;

        let comments = stmt
            .query_map(params![event_id], Self::map_view_row)?
            .collect::<Result<Vec<CommentView>, _>>()?;

        Ok(comments)
    }

    fn map_view_row(row: &Row) -> rusqlite::Result<CommentView> {
        Ok(CommentView {
            comment: PlanningEventComment {
                comment_id: row.get(0)?,
                event_id: row.get(1)?,
                body: row.get(2)?,
                author_id: row.get(3)?,
                created_at: parse_ts(4, row.get::<_, String>(4)?)?,
            },
            author_name: row.get(5)?,
        })
    }
}
