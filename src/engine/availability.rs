// ==========================================
// 高校排课系统 - 可用性索引 (Availability Index)
// ==========================================
// 职责: 记录 (教师, 时段, 日期) 与 (教室, 时段, 日期) 的占用状态
// 红线: 每次运行只构建一次（以删除范围外的既有课表为种子），
//       之后增量更新，禁止按候选位回查存储
// ==========================================

use crate::domain::booking::Booking;
use crate::domain::catalog::{ClassroomId, TeacherId, TimeSlotId};
use chrono::NaiveDate;
use std::collections::HashSet;

type OccupancyKey<T> = (T, TimeSlotId, NaiveDate);

#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    teachers: HashSet<OccupancyKey<TeacherId>>,
    classrooms: HashSet<OccupancyKey<ClassroomId>>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以既有课表为种子构建索引
    pub fn seeded<'a, I>(bookings: I) -> Self
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        let mut index = Self::new();
        for booking in bookings {
            index.occupy(
                booking.teacher_id,
                booking.classroom_id,
                booking.time_slot_id,
                booking.date,
            );
        }
        index
    }

    pub fn is_teacher_busy(&self, teacher_id: TeacherId, slot_id: TimeSlotId, date: NaiveDate) -> bool {
        self.teachers.contains(&(teacher_id, slot_id, date))
    }

    pub fn is_classroom_busy(
        &self,
        classroom_id: ClassroomId,
        slot_id: TimeSlotId,
        date: NaiveDate,
    ) -> bool {
        self.classrooms.contains(&(classroom_id, slot_id, date))
    }

    /// 同时标记教师与教室占用
    pub fn occupy(
        &mut self,
        teacher_id: TeacherId,
        classroom_id: ClassroomId,
        slot_id: TimeSlotId,
        date: NaiveDate,
    ) {
        self.teachers.insert((teacher_id, slot_id, date));
        self.classrooms.insert((classroom_id, slot_id, date));
    }

    pub fn occupied_count(&self) -> (usize, usize) {
        (self.teachers.len(), self.classrooms.len())
    }
}
