// ==========================================
// 高校排课系统 - 教室适配规则
// ==========================================
// 规则: 课程所属专业名（不区分大小写）命中规则时，教室类型必须匹配；
//       未命中任何规则时，任意类型教室均可
// 存储: config_kv.classroom_type_rules (JSON 数组)
// ==========================================

use crate::domain::types::ClassroomType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomRule {
    pub specialty: String,
    pub classroom_type: ClassroomType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassroomRules {
    rules: Vec<ClassroomRule>,
}

impl ClassroomRules {
    pub fn new(rules: Vec<ClassroomRule>) -> Self {
        Self { rules }
    }

    /// 无约束
    pub fn none() -> Self {
        Self::default()
    }

    /// 旧系统预设: 数学/物理专业必须使用讲堂
    pub fn legacy_defaults() -> Self {
        Self::new(vec![
            ClassroomRule {
                specialty: "математика".to_string(),
                classroom_type: ClassroomType::Lecture,
            },
            ClassroomRule {
                specialty: "физика".to_string(),
                classroom_type: ClassroomType::Lecture,
            },
        ])
    }

    /// 专业要求的教室类型（None 表示不限）
    pub fn required_type(&self, specialty_name: &str) -> Option<ClassroomType> {
        let name = specialty_name.trim().to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.specialty.trim().to_lowercase() == name)
            .map(|rule| rule.classroom_type)
    }

    pub fn allows(&self, specialty_name: &str, classroom_type: ClassroomType) -> bool {
        self.required_type(specialty_name)
            .map(|required| required == classroom_type)
            .unwrap_or(true)
    }

    pub fn rules(&self) -> &[ClassroomRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
