// ==========================================
// 高校排课系统 - 课表 API
// ==========================================
// 职责: 排课生成、冲突检测、课表查询与单条维护
// 说明: 入参校验在本层完成，错误统一转换为 ApiError
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::booking::{Booking, BookingDetail, BookingFilter, BookingId, DateRange};
use crate::domain::catalog::{ClassroomId, GroupId, LoadId, TeacherId, TimeSlotId};
use crate::domain::conflict::ConflictReportEntry;
use crate::domain::generation_run::GenerationRun;
use crate::domain::types::{Semester, WeekType};
use crate::engine::assignment::SkippedLoad;
use crate::engine::calendar::{parse_date, CalendarDay};
use crate::engine::conflict::ConflictDetector;
use crate::engine::generation::{GenerationRequest, GenerationService};
use crate::engine::strategy::AssignmentStrategy;
use crate::engine::EngineError;
use crate::perf::PerfGuard;
use crate::repository::{BookingRepository, GenerationRunRepository};

// ==========================================
// DTO
// ==========================================

/// 排课请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub semester: i64,
    pub start_date: String,
    pub end_date: String,
    pub group_ids: Vec<GroupId>,
    #[serde(default)]
    pub strategy: Option<String>,
}

/// 排课响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub run_id: String,
    pub strategy: AssignmentStrategy,
    pub created_count: usize,
    pub skipped_count: usize,
    pub deleted_count: usize,
    pub bookings: Vec<Booking>,
    pub skipped: Vec<SkippedLoad>,
}

/// 课表查询/冲突检测范围（均可选）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// 冲突检测响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictsResponse {
    pub count: usize,
    pub conflicts: Vec<ConflictReportEntry>,
}

/// 单条课表录入/调整
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub teaching_load_id: LoadId,
    pub time_slot_id: TimeSlotId,
    pub classroom_id: ClassroomId,
    pub date: String,
    /// 缺省时按日期所在 ISO 周奇偶推导
    #[serde(default)]
    pub week_type: Option<String>,
}

// ==========================================
// ScheduleApi - 课表 API
// ==========================================
pub struct ScheduleApi {
    generation: Arc<GenerationService>,
    booking_repo: Arc<BookingRepository>,
    run_repo: Arc<GenerationRunRepository>,
    detector: ConflictDetector,
}

impl ScheduleApi {
    pub fn new(
        generation: Arc<GenerationService>,
        booking_repo: Arc<BookingRepository>,
        run_repo: Arc<GenerationRunRepository>,
    ) -> Self {
        Self {
            generation,
            booking_repo,
            run_repo,
            detector: ConflictDetector::new(),
        }
    }

    // ==========================================
    // 排课生成
    // ==========================================

    /// 生成课表（限定班级 + 日期区间的替换）
    ///
    /// # 返回
    /// - Err(InvalidInput): 学期不是 1/2、班级为空、策略未知
    /// - Err(InvalidRange): 日期无法解析或起始晚于结束
    /// - Err(EmptyResult): 没有课时 > 0 的教学任务
    pub fn generate(&self, request: &GenerateRequest) -> ApiResult<GenerateResponse> {
        let semester = Semester::from_number(request.semester).ok_or_else(|| {
            ApiError::InvalidInput(format!("学期只能是 1 或 2, 实际: {}", request.semester))
        })?;

        if request.group_ids.is_empty() {
            return Err(ApiError::InvalidInput("班级列表不能为空".to_string()));
        }

        let strategy = match request.strategy.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<AssignmentStrategy>()
                    .map_err(ApiError::InvalidInput)?,
            ),
        };

        let result = self.generation.generate(&GenerationRequest {
            semester,
            start_date: parse_date(&request.start_date)?,
            end_date: parse_date(&request.end_date)?,
            group_ids: request.group_ids.clone(),
            strategy,
        })?;

        Ok(GenerateResponse {
            run_id: result.run_id,
            strategy: result.strategy,
            created_count: result.created_count,
            skipped_count: result.skipped_count,
            deleted_count: result.deleted_count,
            bookings: result.bookings,
            skipped: result.skipped,
        })
    }

    /// 最近的排课运行记录
    pub fn list_runs(&self, limit: usize) -> ApiResult<Vec<GenerationRun>> {
        Ok(self.run_repo.list_recent(limit)?)
    }

    // ==========================================
    // 冲突检测
    // ==========================================

    /// 冲突检测（一致性快照读取，只读）
    pub fn conflicts(&self, scope: &BookingQuery) -> ApiResult<ConflictsResponse> {
        let _perf = PerfGuard::new("conflicts");

        let filter = to_filter(scope)?;
        let bookings = self.booking_repo.snapshot(&filter)?;
        let report = self.detector.detect(&bookings);

        info!(
            scanned = bookings.len(),
            flagged = report.count,
            "冲突检测完成"
        );

        Ok(ConflictsResponse {
            count: report.count,
            conflicts: report.conflicts,
        })
    }

    // ==========================================
    // 课表查询
    // ==========================================

    /// 课表列表，按 (日期, 开始时间) 排序
    pub fn list_bookings(&self, query: &BookingQuery) -> ApiResult<Vec<Booking>> {
        Ok(self.booking_repo.query(&to_filter(query)?)?)
    }

    /// 课表展示视图
    pub fn list_booking_details(&self, query: &BookingQuery) -> ApiResult<Vec<BookingDetail>> {
        Ok(self.booking_repo.query_details(&to_filter(query)?)?)
    }

    // ==========================================
    // 单条维护
    // ==========================================

    /// 录入单条课表（不做占用校验，冲突由冲突检测发现）
    pub fn create_booking(&self, input: &BookingInput) -> ApiResult<Booking> {
        let (date, week_type) = parse_placement(input)?;

        let booking = self.booking_repo.insert(
            input.teaching_load_id,
            input.time_slot_id,
            input.classroom_id,
            date,
            week_type,
        )?;

        info!(booking_id = booking.id, "录入课表");
        Ok(booking)
    }

    /// 调整单条课表的时段/教室/日期
    pub fn update_booking(&self, id: BookingId, input: &BookingInput) -> ApiResult<Booking> {
        let (date, week_type) = parse_placement(input)?;

        let existing = self.get_booking(id)?;
        if existing.teaching_load_id != input.teaching_load_id {
            return Err(ApiError::BusinessRuleViolation(format!(
                "课表 {} 属于教学任务 {}, 不能改为 {}",
                id, existing.teaching_load_id, input.teaching_load_id
            )));
        }

        self.booking_repo.update_placement(
            id,
            input.time_slot_id,
            input.classroom_id,
            date,
            week_type,
        )?;
        self.get_booking(id)
    }

    /// 删除单条课表
    pub fn delete_booking(&self, id: BookingId) -> ApiResult<()> {
        if !self.booking_repo.delete_by_id(id)? {
            return Err(ApiError::NotFound(format!("Booking(id={})不存在", id)));
        }
        info!(booking_id = id, "删除课表");
        Ok(())
    }

    pub fn get_booking(&self, id: BookingId) -> ApiResult<Booking> {
        self.booking_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Booking(id={})不存在", id)))
    }
}

// ==========================================
// 入参转换
// ==========================================

fn to_filter(query: &BookingQuery) -> ApiResult<BookingFilter> {
    let date_range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (None, None) => None,
        (Some(start), Some(end)) => {
            let (start, end) = (parse_date(start)?, parse_date(end)?);
            Some(DateRange::new(start, end).ok_or_else(|| {
                ApiError::InvalidRange(format!("起始日期 {} 晚于结束日期 {}", start, end))
            })?)
        }
        _ => {
            return Err(ApiError::InvalidInput(
                "startDate 与 endDate 必须同时提供".to_string(),
            ))
        }
    };

    Ok(BookingFilter {
        teacher_id: query.teacher_id,
        group_id: query.group_id,
        date_range,
    })
}

fn parse_placement(input: &BookingInput) -> ApiResult<(chrono::NaiveDate, WeekType)> {
    let date = parse_date(&input.date).map_err(|e| match e {
        EngineError::InvalidRange(msg) => ApiError::InvalidInput(msg),
        other => other.into(),
    })?;

    let week_type = match input.week_type.as_deref() {
        Some(raw) if !raw.trim().is_empty() => {
            raw.parse::<WeekType>().map_err(ApiError::InvalidInput)?
        }
        _ => CalendarDay::from_date(date).week_type,
    };

    Ok((date, week_type))
}
