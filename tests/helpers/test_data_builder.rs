// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveTime;
use std::sync::Arc;
use timetable_engine::domain::types::ClassroomType;
use timetable_engine::repository::CatalogRepository;

// ==========================================
// CatalogBuilder - 基础目录构建器
// ==========================================

pub struct CatalogBuilder {
    repo: Arc<CatalogRepository>,
}

impl CatalogBuilder {
    pub fn new(repo: Arc<CatalogRepository>) -> Self {
        Self { repo }
    }

    pub fn specialty(&self, name: &str) -> i64 {
        self.repo.insert_specialty(name, None).unwrap()
    }

    pub fn group(&self, name: &str, specialty_id: i64) -> i64 {
        self.repo
            .insert_group(name, specialty_id, 1, "б", None)
            .unwrap()
    }

    pub fn teacher(&self, last_name: &str) -> i64 {
        self.repo
            .insert_teacher(last_name, "Иван", Some("Петрович"))
            .unwrap()
    }

    pub fn discipline(&self, name: &str, specialty_id: i64) -> i64 {
        self.repo.insert_discipline(name, specialty_id).unwrap()
    }

    pub fn load(
        &self,
        discipline_id: i64,
        group_id: i64,
        teacher_id: i64,
        semester1_hours: Option<i32>,
        semester2_hours: Option<i32>,
    ) -> i64 {
        self.repo
            .insert_teaching_load(discipline_id, group_id, teacher_id, semester1_hours, semester2_hours)
            .unwrap()
    }

    pub fn classroom(&self, number: &str, classroom_type: ClassroomType) -> i64 {
        self.repo
            .insert_classroom(number, Some(30), classroom_type)
            .unwrap()
    }

    /// 时段，时间格式 HH:MM
    pub fn slot(&self, day_of_week: u32, start: &str, end: &str) -> i64 {
        let parse = |s: &str| NaiveTime::parse_from_str(s, "%H:%M").unwrap();
        self.repo
            .insert_time_slot(day_of_week, parse(start), parse(end))
            .unwrap()
    }

    /// 一个专业 + 一个班级 + 一门课 + 一个教师 + 一条教学任务
    pub fn single_load(&self, specialty: &str, group: &str, teacher: &str, hours: i32) -> SingleLoad {
        let specialty_id = self.specialty(specialty);
        let group_id = self.group(group, specialty_id);
        let teacher_id = self.teacher(teacher);
        let discipline_id = self.discipline(&format!("{} - дисциплина", specialty), specialty_id);
        let load_id = self.load(discipline_id, group_id, teacher_id, Some(hours), None);
        SingleLoad {
            specialty_id,
            group_id,
            teacher_id,
            load_id,
        }
    }

    /// 周一至周五，每天 3 个时段
    pub fn weekday_slots(&self) -> Vec<i64> {
        let pairs = [("08:30", "10:00"), ("10:10", "11:40"), ("12:10", "13:40")];
        (1..=5)
            .flat_map(|day| pairs.iter().map(move |(s, e)| (day, *s, *e)))
            .map(|(day, s, e)| self.slot(day, s, e))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SingleLoad {
    pub specialty_id: i64,
    pub group_id: i64,
    pub teacher_id: i64,
    pub load_id: i64,
}
