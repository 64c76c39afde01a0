// ==========================================
// 高校排课系统 - 课表数据仓储 (Schedule Store)
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 排课写入必须是“限定范围删除 + 批量插入”的单一事务，
//       只删除指定班级、指定日期区间内的课表，禁止全表清空
// ==========================================

use crate::domain::booking::{Booking, BookingDetail, BookingFilter, BookingId, DateRange, NewBooking};
use crate::domain::catalog::{ClassroomId, GroupId, LoadId, TimeSlotId};
use crate::domain::types::WeekType;
use crate::repository::db_utils::{format_date, get_date, get_parsed, get_time, ids_json};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// 课表查询公共 SELECT (teacher_id / group_id 经 teaching_loads 关联得到)
macro_rules! booking_select {
    () => {
        r#"
        SELECT
            sc.id, sc.teaching_load_id, tl.teacher_id, tl.group_id,
            sc.time_slot_id, sc.classroom_id, sc.week_type, sc.date
        FROM schedule sc
        INNER JOIN teaching_loads tl ON tl.id = sc.teaching_load_id
        INNER JOIN time_slots ts ON ts.id = sc.time_slot_id
        "#
    };
}

// 过滤条件: ?1 teacher_id, ?2 group_id, ?3 起始日期, ?4 结束日期 (NULL 表示不过滤)
macro_rules! booking_filter_where {
    () => {
        r#"
        WHERE (?1 IS NULL OR tl.teacher_id = ?1)
          AND (?2 IS NULL OR tl.group_id = ?2)
          AND (?3 IS NULL OR sc.date >= ?3)
          AND (?4 IS NULL OR sc.date <= ?4)
        ORDER BY sc.date, ts.start_time, sc.id
        "#
    };
}

/// 限定范围替换结果
#[derive(Debug, Clone)]
pub struct ReplaceOutcome {
    pub deleted_count: usize,
    pub inserted: Vec<Booking>,
}

// ==========================================
// BookingRepository - 课表仓储
// ==========================================
pub struct BookingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BookingRepository {
    /// 创建新的课表仓储实例
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
    // 批量写入
    // ==========================================

    /// 限定范围替换：删除指定班级在日期区间内的课表，再批量插入新课表
    ///
    /// # 参数
    /// - group_ids: 删除范围内的班级
    /// - range: 删除范围内的日期区间（闭区间）
    /// - bookings: 新课表
    ///
    /// # 返回
    /// - Ok(ReplaceOutcome): 删除条数 + 带主键的新课表
    /// - Err: 任一语句失败，整个事务回滚（删除也不生效）
    ///
    /// # 红线
    /// - 删除与插入必须在同一事务中完成
    pub fn replace_scoped(
        &self,
        group_ids: &[GroupId],
        range: DateRange,
        bookings: &[NewBooking],
    ) -> RepositoryResult<ReplaceOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let deleted_count = tx.execute(
            r#"
            DELETE FROM schedule
            WHERE date BETWEEN ?2 AND ?3
              AND teaching_load_id IN (
                    SELECT id FROM teaching_loads
                    WHERE group_id IN (SELECT value FROM json_each(?1))
                  )
            "#,
            params![
                ids_json(group_ids),
                format_date(range.start),
                format_date(range.end),
            ],
        )?;

        let mut inserted = Vec::with_capacity(bookings.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO schedule (teaching_load_id, time_slot_id, classroom_id, week_type, date)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;

            for booking in bookings {
                let id = stmt.insert(params![
                    booking.teaching_load_id,
                    booking.time_slot_id,
                    booking.classroom_id,
                    booking.week_type.as_str(),
                    format_date(booking.date),
                ])?;
                inserted.push(booking.clone().into_booking(id));
            }
        }

        tx.commit()?;

        Ok(ReplaceOutcome {
            deleted_count,
            inserted,
        })
    }

    // ==========================================
    // 单条维护 (人工录入/调整)
    // ==========================================

    /// 插入单条课表
    ///
    /// 教师/班级以数据库中教学任务为准，返回值从库中回读
    pub fn insert(
        &self,
        teaching_load_id: LoadId,
        time_slot_id: TimeSlotId,
        classroom_id: ClassroomId,
        date: NaiveDate,
        week_type: WeekType,
    ) -> RepositoryResult<Booking> {
        let id = {
            let conn = self.get_conn()?;
            conn.execute(
                r#"
                INSERT INTO schedule (teaching_load_id, time_slot_id, classroom_id, week_type, date)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    teaching_load_id,
                    time_slot_id,
                    classroom_id,
                    week_type.as_str(),
                    format_date(date),
                ],
            )?;
            conn.last_insert_rowid()
        };

        self.find_by_id(id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Booking".to_string(),
            id: id.to_string(),
        })
    }

    /// 调整单条课表的时段/教室/日期
    pub fn update_placement(
        &self,
        id: BookingId,
        time_slot_id: TimeSlotId,
        classroom_id: ClassroomId,
        date: NaiveDate,
        week_type: WeekType,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE schedule
            SET time_slot_id = ?2, classroom_id = ?3, date = ?4, week_type = ?5
            WHERE id = ?1
            "#,
            params![id, time_slot_id, classroom_id, format_date(date), week_type.as_str()],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Booking".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除单条课表，返回是否存在
    pub fn delete_by_id(&self, id: BookingId) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM schedule WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按主键查询
    pub fn find_by_id(&self, id: BookingId) -> RepositoryResult<Option<Booking>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(concat!(booking_select!(), " WHERE sc.id = ?1"))?;
        let booking = stmt.query_row(params![id], map_booking_row).optional()?;
        Ok(booking)
    }

    /// 按过滤条件查询，按 (日期, 开始时间) 排序
    pub fn query(&self, filter: &BookingFilter) -> RepositoryResult<Vec<Booking>> {
        let conn = self.get_conn()?;
        query_with(&conn, filter)
    }

    /// 一致性快照读取：在单一读事务内完成查询
    ///
    /// 用于冲突检测，保证不会读到排课“已删除未插入”的中间状态
    pub fn snapshot(&self, filter: &BookingFilter) -> RepositoryResult<Vec<Booking>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let bookings = query_with(&tx, filter)?;
        tx.commit()?;
        Ok(bookings)
    }

    /// 查询日期区间内、不属于删除范围（班级不在 group_ids 中）的课表
    ///
    /// 用途: 作为可用性索引的种子数据
    pub fn find_outside_scope(
        &self,
        group_ids: &[GroupId],
        range: DateRange,
    ) -> RepositoryResult<Vec<Booking>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(concat!(
            booking_select!(),
            r#"
            WHERE sc.date BETWEEN ?2 AND ?3
              AND tl.group_id NOT IN (SELECT value FROM json_each(?1))
            ORDER BY sc.date, ts.start_time, sc.id
            "#
        ))?;

        let bookings = stmt
            .query_map(
                params![
                    ids_json(group_ids),
                    format_date(range.start),
                    format_date(range.end),
                ],
                map_booking_row,
            )?
            .collect::<Result<Vec<Booking>, _>>()?;

        Ok(bookings)
    }

    /// 统计删除范围内的课表数量
    pub fn count_in_scope(&self, group_ids: &[GroupId], range: DateRange) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*)
            FROM schedule sc
            INNER JOIN teaching_loads tl ON tl.id = sc.teaching_load_id
            WHERE sc.date BETWEEN ?2 AND ?3
              AND tl.group_id IN (SELECT value FROM json_each(?1))
            "#,
            params![
                ids_json(group_ids),
                format_date(range.start),
                format_date(range.end),
            ],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// 课表展示视图（关联课程、班级、教师、教室、时段）
    pub fn query_details(&self, filter: &BookingFilter) -> RepositoryResult<Vec<BookingDetail>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(concat!(
            r#"
            SELECT
                sc.id, sc.teaching_load_id, tl.teacher_id, tl.group_id,
                sc.time_slot_id, sc.classroom_id, sc.week_type, sc.date,
                d.name, g.name, t.last_name, t.first_name, t.middle_name,
                c.number, ts.day_of_week, ts.start_time, ts.end_time
            FROM schedule sc
            INNER JOIN teaching_loads tl ON tl.id = sc.teaching_load_id
            INNER JOIN time_slots ts ON ts.id = sc.time_slot_id
            INNER JOIN disciplines d ON d.id = tl.discipline_id
            INNER JOIN student_groups g ON g.id = tl.group_id
            INNER JOIN teachers t ON t.id = tl.teacher_id
            INNER JOIN classrooms c ON c.id = sc.classroom_id
            "#,
            booking_filter_where!()
        ))?;

        let (teacher_id, group_id, start, end) = filter_params(filter);
        let details = stmt
            .query_map(params![teacher_id, group_id, start, end], |row| {
                let teacher = crate::domain::catalog::Teacher {
                    id: row.get(2)?,
                    last_name: row.get(10)?,
                    first_name: row.get(11)?,
                    middle_name: row.get(12)?,
                };
                Ok(BookingDetail {
                    booking: map_booking_row(row)?,
                    discipline_name: row.get(8)?,
                    group_name: row.get(9)?,
                    teacher_name: teacher.short_name(),
                    classroom_number: row.get(13)?,
                    day_of_week: row.get(14)?,
                    start_time: get_time(row, 15)?,
                    end_time: get_time(row, 16)?,
                })
            })?
            .collect::<Result<Vec<BookingDetail>, _>>()?;

        Ok(details)
    }
}

fn filter_params(
    filter: &BookingFilter,
) -> (Option<i64>, Option<i64>, Option<String>, Option<String>) {
    (
        filter.teacher_id,
        filter.group_id,
        filter.date_range.map(|r| format_date(r.start)),
        filter.date_range.map(|r| format_date(r.end)),
    )
}

fn query_with(conn: &Connection, filter: &BookingFilter) -> RepositoryResult<Vec<Booking>> {
    let mut stmt = conn.prepare(concat!(booking_select!(), booking_filter_where!()))?;
    let (teacher_id, group_id, start, end) = filter_params(filter);
    let bookings = stmt
        .query_map(params![teacher_id, group_id, start, end], map_booking_row)?
        .collect::<Result<Vec<Booking>, _>>()?;
    Ok(bookings)
}

/// 映射数据库行到 Booking 对象（列顺序见 booking_select!）
fn map_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        teaching_load_id: row.get(1)?,
        teacher_id: row.get(2)?,
        group_id: row.get(3)?,
        time_slot_id: row.get(4)?,
        classroom_id: row.get(5)?,
        week_type: get_parsed::<WeekType>(row, 6)?,
        date: get_date(row, 7)?,
    })
}
