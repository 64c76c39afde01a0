// ==========================================
// 高校排课系统 - 领域类型定义
// ==========================================
// 职责: 周次奇偶、教室类型、学期、冲突类型等枚举
// 序列化格式: snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 周次类型 (Week Type)
// ==========================================
// 由 ISO 周序号奇偶决定: 偶数周 → Even, 奇数周 → Odd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekType {
    Even, // 偶数周 (ч)
    Odd,  // 奇数周 (з)
    None, // 不区分周次
}

impl WeekType {
    /// 根据 ISO 周序号计算周次类型
    pub fn from_iso_week(week: u32) -> Self {
        if week % 2 == 0 {
            WeekType::Even
        } else {
            WeekType::Odd
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekType::Even => "even",
            WeekType::Odd => "odd",
            WeekType::None => "none",
        }
    }
}

impl fmt::Display for WeekType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "even" | "ч" => Ok(WeekType::Even),
            "odd" | "з" => Ok(WeekType::Odd),
            "none" | "" => Ok(WeekType::None),
            other => Err(format!("未知周次类型: {}", other)),
        }
    }
}

// ==========================================
// 教室类型 (Classroom Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassroomType {
    Lecture,  // 讲堂
    Lab,      // 实验室
    Practice, // 实训室
}

impl ClassroomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassroomType::Lecture => "lecture",
            ClassroomType::Lab => "lab",
            ClassroomType::Practice => "practice",
        }
    }
}

impl fmt::Display for ClassroomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassroomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lecture" => Ok(ClassroomType::Lecture),
            "lab" => Ok(ClassroomType::Lab),
            "practice" => Ok(ClassroomType::Practice),
            other => Err(format!("未知教室类型: {}", other)),
        }
    }
}

// ==========================================
// 学期 (Semester)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semester {
    First,
    Second,
}

impl Semester {
    /// 从请求中的学期序号解析 (仅接受 1 / 2)
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Semester::First),
            2 => Some(Semester::Second),
            _ => None,
        }
    }

    pub fn number(&self) -> i64 {
        match self {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ==========================================
// 冲突类型 (Conflict Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Classroom, // 同一教室同一时段同一日期
    Teacher,   // 同一教师同一时段同一日期
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::Classroom => write!(f, "classroom"),
            ConflictType::Teacher => write!(f, "teacher"),
        }
    }
}
