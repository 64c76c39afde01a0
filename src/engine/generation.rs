// ==========================================
// 高校排课系统 - 排课生成服务
// ==========================================
// 流程:
// 1. 展开日历            (InvalidRange → 零写入)
// 2. 读取合格教学任务     (EmptyResult → 零写入)
// 3. 获取排课锁
// 4. 读取时段/教室/删除范围外课表 (读取失败 → StoreUnavailable, 零写入)
// 5. 分配
// 6. 限定范围替换         (失败 → GenerationFailed, 整体回滚)
// 7. 写运行记录（失败仅告警）, 释放锁
// ==========================================

use crate::config::ScheduleConfigReader;
use crate::domain::booking::{Booking, DateRange};
use crate::domain::catalog::GroupId;
use crate::domain::generation_run::GenerationRun;
use crate::domain::types::Semester;
use crate::engine::assignment::{AssignmentEngine, SkippedLoad};
use crate::engine::availability::AvailabilityIndex;
use crate::engine::calendar::Calendar;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::lock::GroupLockRegistry;
use crate::engine::strategy::AssignmentStrategy;
use crate::perf::PerfGuard;
use crate::repository::{BookingRepository, CatalogRepository, GenerationRunRepository};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 排课请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub semester: Semester,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub group_ids: Vec<GroupId>,
    /// 覆盖配置中的选位策略
    pub strategy: Option<AssignmentStrategy>,
}

/// 排课结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub run_id: String,
    pub strategy: AssignmentStrategy,
    pub created_count: usize,
    pub skipped_count: usize,
    pub deleted_count: usize,
    pub bookings: Vec<Booking>,
    pub skipped: Vec<SkippedLoad>,
}

// ==========================================
// GenerationService - 排课生成服务
// ==========================================
pub struct GenerationService {
    catalog: Arc<CatalogRepository>,
    bookings: Arc<BookingRepository>,
    runs: Arc<GenerationRunRepository>,
    config: Arc<dyn ScheduleConfigReader>,
    locks: Arc<GroupLockRegistry>,
}

impl GenerationService {
    pub fn new(
        catalog: Arc<CatalogRepository>,
        bookings: Arc<BookingRepository>,
        runs: Arc<GenerationRunRepository>,
        config: Arc<dyn ScheduleConfigReader>,
        locks: Arc<GroupLockRegistry>,
    ) -> Self {
        Self {
            catalog,
            bookings,
            runs,
            config,
            locks,
        }
    }

    /// 生成课表
    ///
    /// # 返回
    /// - Ok(GenerationResult): 新课表 + 跳过明细 + 删除条数
    /// - Err(InvalidRange | EmptyResult | StoreUnavailable | Config): 未写入任何数据
    /// - Err(GenerationFailed): 写入事务已回滚
    #[instrument(skip(self, request), fields(
        semester = %request.semester,
        start_date = %request.start_date,
        end_date = %request.end_date,
        group_count = request.group_ids.len()
    ))]
    pub fn generate(&self, request: &GenerationRequest) -> EngineResult<GenerationResult> {
        let _perf = PerfGuard::new("generate");

        // 1. 日历
        let calendar = Calendar::expand(request.start_date, request.end_date)?;
        let range = calendar.range();

        let mut group_ids = request.group_ids.clone();
        group_ids.sort_unstable();
        group_ids.dedup();

        // 2. 教学任务
        let mut loads = self
            .catalog
            .list_teaching_loads(&group_ids, request.semester)
            .map_err(EngineError::StoreUnavailable)?;
        loads.retain(|load| load.is_eligible(request.semester));
        if loads.is_empty() {
            return Err(EngineError::EmptyResult(format!(
                "班级 {:?} 在第 {} 学期没有课时 > 0 的教学任务",
                group_ids, request.semester
            )));
        }

        let engine = self.build_engine(request.strategy)?;

        // 3. 排课锁（至函数返回释放）
        let _guard = self.locks.acquire(&group_ids);

        // 4. 目录 + 删除范围外的既有课表
        let slots = self
            .catalog
            .list_time_slots()
            .map_err(EngineError::StoreUnavailable)?;
        let classrooms = self
            .catalog
            .list_classrooms()
            .map_err(EngineError::StoreUnavailable)?;
        let existing = self
            .bookings
            .find_outside_scope(&group_ids, range)
            .map_err(EngineError::StoreUnavailable)?;

        let scoped_before = self
            .bookings
            .count_in_scope(&group_ids, range)
            .map_err(EngineError::StoreUnavailable)?;

        // 5. 分配
        let mut index = AvailabilityIndex::seeded(&existing);
        let (busy_teachers, busy_classrooms) = index.occupied_count();
        debug!(
            seed_bookings = existing.len(),
            busy_teachers,
            busy_classrooms,
            scoped_before,
            "可用性索引已初始化"
        );
        let outcome = engine.assign(&calendar, &loads, &slots, &classrooms, &mut index);
        debug_assert!(outcome.bookings.iter().all(|b| range.contains(b.date)));

        // 6. 限定范围替换
        let replaced = self
            .bookings
            .replace_scoped(&group_ids, range, &outcome.bookings)
            .map_err(EngineError::GenerationFailed)?;
        if replaced.deleted_count != scoped_before {
            warn!(
                scoped_before,
                deleted = replaced.deleted_count,
                "替换删除条数与锁内统计不一致"
            );
        }

        let result = GenerationResult {
            run_id: Uuid::new_v4().to_string(),
            strategy: engine.strategy(),
            created_count: replaced.inserted.len(),
            skipped_count: outcome.skipped.len(),
            deleted_count: replaced.deleted_count,
            bookings: replaced.inserted,
            skipped: outcome.skipped,
        };

        // 7. 运行记录
        self.record_run(request.semester, range, &group_ids, &result);

        info!(
            run_id = %result.run_id,
            strategy = %result.strategy,
            strategy_cn = result.strategy.title_cn(),
            created = result.created_count,
            skipped = result.skipped_count,
            deleted = result.deleted_count,
            seed_bookings = existing.len(),
            "排课完成"
        );

        Ok(result)
    }

    fn build_engine(&self, strategy: Option<AssignmentStrategy>) -> EngineResult<AssignmentEngine> {
        let config_err = |e: Box<dyn std::error::Error>| EngineError::Config(e.to_string());

        let strategy = match strategy {
            Some(s) => s,
            None => self.config.get_assignment_strategy().map_err(config_err)?,
        };
        let rules = self.config.get_classroom_rules().map_err(config_err)?;
        let seed = match strategy {
            AssignmentStrategy::RandomFit => self.config.get_random_fit_seed().map_err(config_err)?,
            AssignmentStrategy::FirstFit => None,
        };

        Ok(AssignmentEngine::new(strategy, rules).with_seed(seed))
    }

    fn record_run(
        &self,
        semester: Semester,
        range: DateRange,
        group_ids: &[GroupId],
        result: &GenerationResult,
    ) {
        let run = GenerationRun {
            run_id: result.run_id.clone(),
            semester: semester.number(),
            start_date: range.start,
            end_date: range.end,
            group_ids: group_ids.to_vec(),
            strategy: result.strategy.as_str().to_string(),
            created_count: result.created_count,
            skipped_count: result.skipped_count,
            deleted_count: result.deleted_count,
            created_at: Utc::now().naive_utc(),
        };

        if let Err(e) = self.runs.insert(&run) {
            warn!(run_id = %run.run_id, error = %e, "排课运行记录写入失败");
        }
    }
}
