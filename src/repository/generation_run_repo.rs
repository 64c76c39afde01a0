use crate::domain::generation_run::GenerationRun;
use crate::repository::db_utils::{format_date, get_date, get_datetime, DATETIME_FORMAT};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// GenerationRunRepository - 排课运行记录仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct GenerationRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GenerationRunRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入运行记录
    ///
    /// # 返回
    /// - `Ok(run_id)`: 成功插入
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, run: &GenerationRun) -> RepositoryResult<String> {
        let group_ids_json = serde_json::to_string(&run.group_ids).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "group_ids".to_string(),
                message: e.to_string(),
            }
        })?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO generation_run (
                run_id, semester, start_date, end_date, group_ids_json, strategy,
                created_count, skipped_count, deleted_count, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                run.run_id,
                run.semester,
                format_date(run.start_date),
                format_date(run.end_date),
                group_ids_json,
                run.strategy,
                run.created_count as i64,
                run.skipped_count as i64,
                run.deleted_count as i64,
                run.created_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;

        Ok(run.run_id.clone())
    }

    /// 查询最近的运行记录（按创建时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<GenerationRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, semester, start_date, end_date, group_ids_json, strategy,
                   created_count, skipped_count, deleted_count, created_at
            FROM generation_run
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let group_ids_json: String = row.get(4)?;
            let group_ids = serde_json::from_str(&group_ids_json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            Ok(GenerationRun {
                run_id: row.get(0)?,
                semester: row.get(1)?,
                start_date: get_date(row, 2)?,
                end_date: get_date(row, 3)?,
                group_ids,
                strategy: row.get(5)?,
                created_count: row.get::<_, i64>(6)? as usize,
                skipped_count: row.get::<_, i64>(7)? as usize,
                deleted_count: row.get::<_, i64>(8)? as usize,
                created_at: get_datetime(row, 9)?,
            })
        })?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?);
        }
        Ok(runs)
    }
}
