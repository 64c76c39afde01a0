// ==========================================
// 高校排课系统 - 排课运行记录领域模型
// ==========================================
// 用途: 审计追踪, 每次成功生成写入一条
// 对齐: generation_run 表
// ==========================================

use crate::domain::catalog::GroupId;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRun {
    pub run_id: String,            // uuid v4
    pub semester: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub group_ids: Vec<GroupId>,   // 存储为 JSON 数组
    pub strategy: String,          // first_fit / random_fit
    pub created_count: usize,
    pub skipped_count: usize,
    pub deleted_count: usize,
    pub created_at: NaiveDateTime,
}
