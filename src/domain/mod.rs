// ==========================================
// 高校排课系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod booking;
pub mod catalog;
pub mod conflict;
pub mod generation_run;
pub mod types;

// 重导出核心类型
pub use booking::{Booking, BookingDetail, BookingFilter, BookingId, DateRange, NewBooking};
pub use catalog::{
    Classroom, ClassroomId, Discipline, DisciplineId, GroupId, LoadId, Specialty, SpecialtyId,
    StudentGroup, Teacher, TeacherId, TeachingLoad, TimeSlot, TimeSlotId,
};
pub use conflict::{ConflictReport, ConflictReportEntry};
pub use generation_run::GenerationRun;
pub use types::{ClassroomType, ConflictType, Semester, WeekType};
