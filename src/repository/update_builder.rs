// ==========================================
// 车间排程系统 - 事件字段更新构建器
// ==========================================
// 职责: 显式构建"只更新补丁中出现的字段"的 UPDATE 语句
// 约束: 未指定字段一律不触碰；revision 恒自增
// ==========================================

use crate::repository::error::RepositoryResult;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

// ==========================================
// EventUpdateBuilder - SET 子句构建器
// ==========================================
// 每个 setter 对应一个可补丁字段；numbered placeholder 与值一一对应
#[derive(Debug, Default)]
pub struct EventUpdateBuilder {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl EventUpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, column: &str, value: Value) -> &mut Self {
        // placeholder 编号在 build 时统一分配
        self.clauses.push(column.to_string());
        self.values.push(value);
        self
    }

    pub fn set_text(&mut self, column: &str, value: &str) -> &mut Self {
        self.push(column, Value::from(value.to_string()))
    }

    pub fn set_opt_text(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => self.push(column, Value::from(v.to_string())),
            None => self.push(column, Value::Null),
        }
    }

    pub fn set_bool(&mut self, column: &str, value: bool) -> &mut Self {
        self.push(column, Value::from(value as i64))
    }

    /// 执行 UPDATE，返回受影响行数
    ///
    /// # 并发控制
    /// - revision 恒自增，作为补丁的乐观锁令牌
    /// - `expected_revision` 存在时附加 `AND revision = ?` 匹配条件；
    ///   此时受影响行数为 0 即为令牌过期（由调用方区分 NotFound）
    pub fn apply(
        self,
        conn: &Connection,
        event_id: &str,
        expected_revision: Option<i64>,
    ) -> RepositoryResult<usize> {
        let mut set_parts: Vec<String> = Vec::with_capacity(self.clauses.len() + 1);
        let mut values = self.values;
        for (i, column) in self.clauses.iter().enumerate() {
            set_parts.push(format!("{} = ?{}", column, i + 1));
        }
        set_parts.push("revision = revision + 1".to_string());

        let mut idx = values.len() + 1;
        let mut sql = format!(
            "UPDATE planning_event SET {} WHERE event_id = ?{}",
            set_parts.join(", "),
            idx
        );
        values.push(Value::from(event_id.to_string()));
        idx += 1;

        if let Some(revision) = expected_revision {
            sql.push_str(&format!(" AND revision = ?{}", idx));
            values.push(Value::from(revision));
        }

        let rows = conn.execute(&sql, params_from_iter(values))?;
        Ok(rows)
    }
}
