// ==========================================
// 高校排课系统 - 日历展开器 (Calendar Expander)
// ==========================================
// 职责: 将闭区间日期展开为逐日序列，附带 ISO 星期与周次奇偶
// 红线: 纯函数，无副作用
// ==========================================

use crate::domain::booking::DateRange;
use crate::domain::types::WeekType;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::db_utils::DATE_FORMAT;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// 展开后的单日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_of_week: u32, // 1=周一 .. 7=周日
    pub week_type: WeekType,
}

impl CalendarDay {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date,
            day_of_week: date.weekday().number_from_monday(),
            week_type: WeekType::from_iso_week(date.iso_week().week()),
        }
    }
}

/// 可重复遍历的日历序列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    range: DateRange,
}

impl Calendar {
    /// 展开日期区间
    ///
    /// # 返回
    /// - Err(InvalidRange): start > end
    pub fn expand(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        let range = DateRange::new(start, end).ok_or_else(|| {
            EngineError::InvalidRange(format!("起始日期 {} 晚于结束日期 {}", start, end))
        })?;
        Ok(Self { range })
    }

    /// 从 YYYY-MM-DD 文本展开
    pub fn parse(start: &str, end: &str) -> EngineResult<Self> {
        Self::expand(parse_date(start)?, parse_date(end)?)
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// 区间天数（至少 1 天）
    pub fn day_count(&self) -> usize {
        self.range.days() as usize
    }

    /// 按日期顺序遍历（每次调用重新开始）
    pub fn iter(&self) -> impl Iterator<Item = CalendarDay> {
        self.range
            .start
            .iter_days()
            .take(self.day_count())
            .map(CalendarDay::from_date)
    }
}

impl IntoIterator for &Calendar {
    type Item = CalendarDay;
    type IntoIter = Box<dyn Iterator<Item = CalendarDay>>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// 解析 YYYY-MM-DD 日期，失败映射为 InvalidRange
pub fn parse_date(raw: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| EngineError::InvalidRange(format!("无法解析日期 '{}': {}", raw, e)))
}
