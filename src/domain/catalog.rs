// ==========================================
// 高校排课系统 - 基础目录领域模型
// ==========================================
// 职责: 专业、班级、课程、教师、教学任务、时段、教室
// 说明: 目录数据由外部维护,排课引擎只读
// ==========================================

use crate::domain::types::{ClassroomType, Semester};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub type SpecialtyId = i64;
pub type GroupId = i64;
pub type DisciplineId = i64;
pub type TeacherId = i64;
pub type LoadId = i64;
pub type TimeSlotId = i64;
pub type ClassroomId = i64;

// ==========================================
// Specialty - 专业
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: SpecialtyId,
    pub name: String,
    pub code: Option<String>,
}

// ==========================================
// StudentGroup - 学生班级
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentGroup {
    pub id: GroupId,
    pub name: String,
    pub specialty_id: SpecialtyId,
    pub course: i32,               // 年级
    pub study_form: String,        // б / п / в
    pub subgroup: Option<i32>,     // 子班号
}

// ==========================================
// Discipline - 课程
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    pub id: DisciplineId,
    pub name: String,
    pub specialty_id: SpecialtyId,
}

// ==========================================
// Teacher - 教师
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
}

impl Teacher {
    /// 姓 + 名首字母 + 父称首字母, 例如 "Иванов И.П."
    pub fn short_name(&self) -> String {
        let initial = |s: &str| s.chars().next().map(|c| format!("{}.", c)).unwrap_or_default();
        let middle = self
            .middle_name
            .as_deref()
            .map(initial)
            .unwrap_or_default();
        format!("{} {}{}", self.last_name, initial(&self.first_name), middle)
    }
}

// ==========================================
// TeachingLoad - 教学任务 (扁平预关联记录)
// ==========================================
// 红线: 生成过程中只读
// 用途: 一次性关联 课程→专业,引擎内部不再回查
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingLoad {
    pub id: LoadId,
    pub discipline_id: DisciplineId,
    pub discipline_name: String,
    pub specialty_name: String,    // 课程所属专业名 (教室类型规则匹配用)
    pub group_id: GroupId,
    pub teacher_id: TeacherId,
    pub semester1_hours: Option<i32>,
    pub semester2_hours: Option<i32>,
}

impl TeachingLoad {
    /// 指定学期的课时
    pub fn hours_for(&self, semester: Semester) -> Option<i32> {
        match semester {
            Semester::First => self.semester1_hours,
            Semester::Second => self.semester2_hours,
        }
    }

    /// 学期课时存在且 > 0 才参与排课
    pub fn is_eligible(&self, semester: Semester) -> bool {
        self.hours_for(semester).map(|h| h > 0).unwrap_or(false)
    }
}

// ==========================================
// TimeSlot - 每周循环时段
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub day_of_week: u32, // 1=周一 .. 7=周日
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

// ==========================================
// Classroom - 教室
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: ClassroomId,
    pub number: String,
    pub capacity: Option<i32>,
    pub classroom_type: ClassroomType,
}
