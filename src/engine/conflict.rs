// ==========================================
// 高校排课系统 - 冲突检测器 (Conflict Detector)
// ==========================================
// 职责: 审计任意来源的课表集合，标记重复占用
// 规则: 按 (教室, 时段, 日期) 与 (教师, 时段, 日期) 分组，
//       组内条目数 > 1 时组内全部条目被标记
// 红线: 只读；单次线性分组，不做逐条存在性查询
// ==========================================

use crate::domain::booking::Booking;
use crate::domain::conflict::{ConflictReport, ConflictReportEntry};
use crate::domain::types::ConflictType;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Default, Clone, Copy)]
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn new() -> Self {
        Self
    }

    /// 检测冲突
    ///
    /// # 返回
    /// 被标记的课表（保持输入顺序）及冲突类型
    pub fn detect(&self, bookings: &[Booking]) -> ConflictReport {
        let mut by_classroom: HashMap<_, Vec<usize>> = HashMap::new();
        let mut by_teacher: HashMap<_, Vec<usize>> = HashMap::new();

        for (pos, b) in bookings.iter().enumerate() {
            by_classroom
                .entry((b.classroom_id, b.time_slot_id, b.date))
                .or_default()
                .push(pos);
            by_teacher
                .entry((b.teacher_id, b.time_slot_id, b.date))
                .or_default()
                .push(pos);
        }

        let mut flags: HashMap<usize, BTreeSet<ConflictType>> = HashMap::new();
        for (groups, conflict_type) in [
            (by_classroom.into_values().collect::<Vec<_>>(), ConflictType::Classroom),
            (by_teacher.into_values().collect::<Vec<_>>(), ConflictType::Teacher),
        ] {
            for members in groups.into_iter().filter(|m| m.len() > 1) {
                for pos in members {
                    flags.entry(pos).or_default().insert(conflict_type);
                }
            }
        }

        let mut flagged: Vec<usize> = flags.keys().copied().collect();
        flagged.sort_unstable();

        let conflicts: Vec<ConflictReportEntry> = flagged
            .into_iter()
            .map(|pos| ConflictReportEntry {
                booking: bookings[pos].clone(),
                conflict_types: flags
                    .remove(&pos)
                    .map(|types| types.into_iter().collect())
                    .unwrap_or_default(),
            })
            .collect();

        ConflictReport {
            count: conflicts.len(),
            conflicts,
        }
    }
}
