// ==========================================
// 高校排课系统 - 数据库工具模块
// ==========================================
// 职责: 日期/时间文本编解码、ID 列表参数绑定
// 说明: ID 列表以 JSON 数组绑定为单个参数，SQL 侧使用 json_each 展开，
//       所有语句保持静态文本，不做运行时拼接
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::Type;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// 将 ID 列表编码为 JSON 数组文本（供 json_each 展开）
pub fn ids_json(ids: &[i64]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

fn conversion_error(idx: usize, err: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// 读取 YYYY-MM-DD 文本列
pub fn get_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

/// 读取 HH:MM（兼容 HH:MM:SS）文本列
pub fn get_time(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| conversion_error(idx, e))
}

/// 读取 YYYY-MM-DD HH:MM:SS 文本列
pub fn get_datetime(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FORMAT).map_err(|e| conversion_error(idx, e))
}

/// 读取可解析为 FromStr 的文本枚举列
pub fn get_parsed<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        conversion_error(idx, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
