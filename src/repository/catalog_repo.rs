// ==========================================
// 高校排课系统 - 基础目录数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 排课引擎所需的只读目录查询 (教学任务/时段/教室)
//       以及测试、演示数据初始化所需的写入
// ==========================================

use crate::domain::catalog::{
    Classroom, ClassroomId, DisciplineId, GroupId, LoadId, SpecialtyId, TeacherId, TeachingLoad,
    TimeSlot, TimeSlotId,
};
use crate::domain::types::{ClassroomType, Semester};
use crate::repository::db_utils::{format_time, get_parsed, get_time, ids_json};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// CatalogRepository - 基础目录仓储
// ==========================================
pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 引擎读取接口
    // ==========================================

    /// 查询指定班级、指定学期的教学任务（扁平预关联）
    ///
    /// # 参数
    /// - group_ids: 班级ID列表
    /// - semester: 学期
    ///
    /// # 返回
    /// - Ok(Vec<TeachingLoad>): 学期课时 > 0 的教学任务，按 id 排序
    /// - Err: 数据库错误
    pub fn list_teaching_loads(
        &self,
        group_ids: &[GroupId],
        semester: Semester,
    ) -> RepositoryResult<Vec<TeachingLoad>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                tl.id, tl.discipline_id, d.name, s.name,
                tl.group_id, tl.teacher_id, tl.semester1_hours, tl.semester2_hours
            FROM teaching_loads tl
            INNER JOIN disciplines d ON d.id = tl.discipline_id
            INNER JOIN specialties s ON s.id = d.specialty_id
            WHERE tl.group_id IN (SELECT value FROM json_each(?1))
              AND COALESCE(
                    CASE ?2 WHEN 1 THEN tl.semester1_hours ELSE tl.semester2_hours END,
                    0
                  ) > 0
            ORDER BY tl.id
            "#,
        )?;

        let loads = stmt
            .query_map(params![ids_json(group_ids), semester.number()], |row| {
                Ok(TeachingLoad {
                    id: row.get(0)?,
                    discipline_id: row.get(1)?,
                    discipline_name: row.get(2)?,
                    specialty_name: row.get(3)?,
                    group_id: row.get(4)?,
                    teacher_id: row.get(5)?,
                    semester1_hours: row.get(6)?,
                    semester2_hours: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<TeachingLoad>>>()?;

        Ok(loads)
    }

    /// 查询全部时段，按 (星期, 开始时间, id) 排序
    pub fn list_time_slots(&self) -> RepositoryResult<Vec<TimeSlot>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, day_of_week, start_time, end_time
            FROM time_slots
            ORDER BY day_of_week, start_time, id
            "#,
        )?;

        let slots = stmt
            .query_map([], |row| {
                Ok(TimeSlot {
                    id: row.get(0)?,
                    day_of_week: row.get(1)?,
                    start_time: get_time(row, 2)?,
                    end_time: get_time(row, 3)?,
                })
            })?
            .collect::<SqliteResult<Vec<TimeSlot>>>()?;

        Ok(slots)
    }

    /// 查询全部教室，按 id 排序（目录顺序）
    pub fn list_classrooms(&self) -> RepositoryResult<Vec<Classroom>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, number, capacity, type
            FROM classrooms
            ORDER BY id
            "#,
        )?;

        let classrooms = stmt
            .query_map([], |row| {
                Ok(Classroom {
                    id: row.get(0)?,
                    number: row.get(1)?,
                    capacity: row.get(2)?,
                    classroom_type: get_parsed::<ClassroomType>(row, 3)?,
                })
            })?
            .collect::<SqliteResult<Vec<Classroom>>>()?;

        Ok(classrooms)
    }

    // ==========================================
    // 目录写入 (测试/演示数据)
    // ==========================================

    pub fn insert_specialty(&self, name: &str, code: Option<&str>) -> RepositoryResult<SpecialtyId> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO specialties (name, code) VALUES (?1, ?2)",
            params![name, code],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_group(
        &self,
        name: &str,
        specialty_id: SpecialtyId,
        course: i32,
        study_form: &str,
        subgroup: Option<i32>,
    ) -> RepositoryResult<GroupId> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO student_groups (name, specialty_id, course, study_form, subgroup)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![name, specialty_id, course, study_form, subgroup],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_discipline(
        &self,
        name: &str,
        specialty_id: SpecialtyId,
    ) -> RepositoryResult<DisciplineId> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO disciplines (name, specialty_id) VALUES (?1, ?2)",
            params![name, specialty_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_teacher(
        &self,
        last_name: &str,
        first_name: &str,
        middle_name: Option<&str>,
    ) -> RepositoryResult<TeacherId> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO teachers (last_name, first_name, middle_name) VALUES (?1, ?2, ?3)",
            params![last_name, first_name, middle_name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_teaching_load(
        &self,
        discipline_id: DisciplineId,
        group_id: GroupId,
        teacher_id: TeacherId,
        semester1_hours: Option<i32>,
        semester2_hours: Option<i32>,
    ) -> RepositoryResult<LoadId> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO teaching_loads (
                discipline_id, group_id, teacher_id, semester1_hours, semester2_hours
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![discipline_id, group_id, teacher_id, semester1_hours, semester2_hours],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_classroom(
        &self,
        number: &str,
        capacity: Option<i32>,
        classroom_type: ClassroomType,
    ) -> RepositoryResult<ClassroomId> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO classrooms (number, capacity, type) VALUES (?1, ?2, ?3)",
            params![number, capacity, classroom_type.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 插入时段（start_time 必须早于 end_time，由表 CHECK 约束保证）
    pub fn insert_time_slot(
        &self,
        day_of_week: u32,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> RepositoryResult<TimeSlotId> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO time_slots (day_of_week, start_time, end_time) VALUES (?1, ?2, ?3)",
            params![day_of_week, format_time(start_time), format_time(end_time)],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
