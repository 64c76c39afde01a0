// ==========================================
// 高校排课系统 - 排课分配引擎 (Assignment Engine)
// ==========================================
// 职责: 贪心分配 教学任务 → (日期, 时段, 教室)
// 输入: 日历 + 教学任务 + 时段目录 + 教室目录 + 可用性索引
// 输出: 待写入课表 + 跳过的任务实例
// 红线: 单线程顺序执行；同一次运行内不产生教师/教室重复占用
// 红线: 每个教学任务每天至多一条课表
// ==========================================

use crate::domain::booking::NewBooking;
use crate::domain::catalog::{Classroom, ClassroomId, LoadId, TeachingLoad, TimeSlot, TimeSlotId};
use crate::engine::availability::AvailabilityIndex;
use crate::engine::calendar::{Calendar, CalendarDay};
use crate::engine::strategy::AssignmentStrategy;
use crate::engine::suitability::ClassroomRules;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// 某日未能安排的教学任务实例
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLoad {
    pub load_id: LoadId,
    pub date: NaiveDate,
}

/// 分配结果
#[derive(Debug, Clone, Default)]
pub struct AssignmentOutcome {
    pub bookings: Vec<NewBooking>,
    pub skipped: Vec<SkippedLoad>,
}

impl AssignmentOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

// 选位器：按策略从候选中取一个 (时段, 教室)
enum Picker {
    FirstFit,
    RandomFit(StdRng),
}

// ==========================================
// AssignmentEngine - 排课分配引擎
// ==========================================
pub struct AssignmentEngine {
    strategy: AssignmentStrategy,
    rules: ClassroomRules,
    seed: Option<u64>,
}

impl AssignmentEngine {
    pub fn new(strategy: AssignmentStrategy, rules: ClassroomRules) -> Self {
        Self {
            strategy,
            rules,
            seed: None,
        }
    }

    /// 默认策略 (first_fit) + 无教室类型约束
    pub fn first_fit() -> Self {
        Self::new(AssignmentStrategy::FirstFit, ClassroomRules::none())
    }

    /// 指定 random_fit 的随机种子（用于复现）
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn strategy(&self) -> AssignmentStrategy {
        self.strategy
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行分配
    ///
    /// # 参数
    /// - `calendar`: 展开后的日期序列
    /// - `loads`: 合格教学任务（按目录顺序）
    /// - `slots`: 全部时段
    /// - `classrooms`: 全部教室（按目录顺序）
    /// - `index`: 已用删除范围外课表初始化的可用性索引（会被更新）
    ///
    /// # 返回
    /// 新课表 + 跳过的 (任务, 日期)
    #[instrument(skip_all, fields(
        strategy = %self.strategy,
        days = calendar.day_count(),
        loads = loads.len(),
        slots = slots.len(),
        classrooms = classrooms.len()
    ))]
    pub fn assign(
        &self,
        calendar: &Calendar,
        loads: &[TeachingLoad],
        slots: &[TimeSlot],
        classrooms: &[Classroom],
        index: &mut AvailabilityIndex,
    ) -> AssignmentOutcome {
        let mut picker = match self.strategy {
            AssignmentStrategy::FirstFit => Picker::FirstFit,
            AssignmentStrategy::RandomFit => {
                let seed = self.seed.unwrap_or_else(rand::random);
                debug!(seed, "random_fit 随机种子");
                Picker::RandomFit(StdRng::seed_from_u64(seed))
            }
        };

        let slots_by_day = group_slots_by_day(slots);
        let mut outcome = AssignmentOutcome::default();

        for day in calendar.iter() {
            let day_slots = match slots_by_day.get(&day.day_of_week) {
                Some(s) => s.as_slice(),
                None => &[],
            };

            for load in loads {
                let placement = match &mut picker {
                    Picker::FirstFit => self.pick_first_fit(load, &day, day_slots, classrooms, index),
                    Picker::RandomFit(rng) => {
                        self.pick_random_fit(load, &day, day_slots, classrooms, index, rng)
                    }
                };

                match placement {
                    Some((slot_id, classroom_id)) => {
                        index.occupy(load.teacher_id, classroom_id, slot_id, day.date);
                        outcome.bookings.push(NewBooking {
                            teaching_load_id: load.id,
                            teacher_id: load.teacher_id,
                            group_id: load.group_id,
                            time_slot_id: slot_id,
                            classroom_id,
                            week_type: day.week_type,
                            date: day.date,
                        });
                    }
                    None => outcome.skipped.push(SkippedLoad {
                        load_id: load.id,
                        date: day.date,
                    }),
                }
            }
        }

        debug!(
            created = outcome.bookings.len(),
            skipped = outcome.skipped.len(),
            "分配完成"
        );
        outcome
    }

    // 按时段时间顺序，取第一个教师空闲且有合适空教室的组合
    fn pick_first_fit(
        &self,
        load: &TeachingLoad,
        day: &CalendarDay,
        day_slots: &[&TimeSlot],
        classrooms: &[Classroom],
        index: &AvailabilityIndex,
    ) -> Option<(TimeSlotId, ClassroomId)> {
        day_slots.iter().find_map(|slot| {
            if index.is_teacher_busy(load.teacher_id, slot.id, day.date) {
                return None;
            }
            classrooms
                .iter()
                .find(|room| self.fits(load, room, slot.id, day.date, index))
                .map(|room| (slot.id, room.id))
        })
    }

    // 收集全部可用组合后等概率抽取
    fn pick_random_fit(
        &self,
        load: &TeachingLoad,
        day: &CalendarDay,
        day_slots: &[&TimeSlot],
        classrooms: &[Classroom],
        index: &AvailabilityIndex,
        rng: &mut StdRng,
    ) -> Option<(TimeSlotId, ClassroomId)> {
        let candidates: Vec<(TimeSlotId, ClassroomId)> = day_slots
            .iter()
            .filter(|slot| !index.is_teacher_busy(load.teacher_id, slot.id, day.date))
            .flat_map(|slot| {
                classrooms
                    .iter()
                    .filter(move |room| self.fits(load, room, slot.id, day.date, index))
                    .map(move |room| (slot.id, room.id))
            })
            .collect();

        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.random_range(0..candidates.len())])
    }

    fn fits(
        &self,
        load: &TeachingLoad,
        room: &Classroom,
        slot_id: TimeSlotId,
        date: NaiveDate,
        index: &AvailabilityIndex,
    ) -> bool {
        !index.is_classroom_busy(room.id, slot_id, date)
            && self.rules.allows(&load.specialty_name, room.classroom_type)
    }
}

/// 时段按星期分组，组内按 (开始时间, id) 排序
fn group_slots_by_day(slots: &[TimeSlot]) -> HashMap<u32, Vec<&TimeSlot>> {
    let mut by_day: HashMap<u32, Vec<&TimeSlot>> = HashMap::new();
    for slot in slots {
        by_day.entry(slot.day_of_week).or_default().push(slot);
    }
    for day_slots in by_day.values_mut() {
        day_slots.sort_by_key(|s| (s.start_time, s.id));
    }
    by_day
}
