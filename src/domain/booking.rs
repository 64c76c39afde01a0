// ==========================================
// 高校排课系统 - 课表条目领域模型
// ==========================================
// 职责: Booking (课表条目)、日期区间、查询过滤条件
// 红线: 同一 (教室, 时段, 日期) 与同一 (教师, 时段, 日期) 只允许一条
// ==========================================

use crate::domain::catalog::{ClassroomId, GroupId, LoadId, TeacherId, TimeSlotId};
use crate::domain::types::WeekType;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub type BookingId = i64;

// ==========================================
// DateRange - 闭区间日期范围
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 构造日期区间, start > end 时返回 None
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start > end {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// 区间包含的天数
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

// ==========================================
// Booking - 已落库的课表条目
// ==========================================
// teacher_id / group_id 读取时由 teaching_loads 关联得到
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub teaching_load_id: LoadId,
    pub teacher_id: TeacherId,
    pub group_id: GroupId,
    pub time_slot_id: TimeSlotId,
    pub classroom_id: ClassroomId,
    pub week_type: WeekType,
    pub date: NaiveDate,
}

// ==========================================
// NewBooking - 待写入的课表条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub teaching_load_id: LoadId,
    pub teacher_id: TeacherId,
    pub group_id: GroupId,
    pub time_slot_id: TimeSlotId,
    pub classroom_id: ClassroomId,
    pub week_type: WeekType,
    pub date: NaiveDate,
}

impl NewBooking {
    /// 写入成功后补全主键
    pub fn into_booking(self, id: BookingId) -> Booking {
        Booking {
            id,
            teaching_load_id: self.teaching_load_id,
            teacher_id: self.teacher_id,
            group_id: self.group_id,
            time_slot_id: self.time_slot_id,
            classroom_id: self.classroom_id,
            week_type: self.week_type,
            date: self.date,
        }
    }
}

// ==========================================
// BookingFilter - 查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    pub teacher_id: Option<TeacherId>,
    pub group_id: Option<GroupId>,
    pub date_range: Option<DateRange>,
}

impl BookingFilter {
    pub fn for_teacher(teacher_id: TeacherId) -> Self {
        Self {
            teacher_id: Some(teacher_id),
            ..Default::default()
        }
    }

    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Default::default()
        }
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }
}

// ==========================================
// BookingDetail - 课表展示视图 (关联名称)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDetail {
    pub booking: Booking,
    pub discipline_name: String,
    pub group_name: String,
    pub teacher_name: String,     // 教师简称
    pub classroom_number: String,
    pub day_of_week: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
