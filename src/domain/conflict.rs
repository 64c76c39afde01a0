// ==========================================
// 高校排课系统 - 冲突报告领域模型
// ==========================================

use crate::domain::booking::Booking;
use crate::domain::types::ConflictType;
use serde::{Deserialize, Serialize};

/// 冲突条目: 被标记的课表条目 + 冲突类型集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReportEntry {
    pub booking: Booking,
    pub conflict_types: Vec<ConflictType>,
}

impl ConflictReportEntry {
    pub fn has(&self, conflict_type: ConflictType) -> bool {
        self.conflict_types.contains(&conflict_type)
    }
}

/// 冲突报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub count: usize,
    pub conflicts: Vec<ConflictReportEntry>,
}

impl ConflictReport {
    pub fn is_clean(&self) -> bool {
        self.count == 0
    }
}
