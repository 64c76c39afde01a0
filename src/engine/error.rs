// ==========================================
// 高校排课系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 除 GenerationFailed 外，其余错误均发生在写入之前（零写入）
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// 日期区间无法解析，或起始日期晚于结束日期
    #[error("日期区间无效: {0}")]
    InvalidRange(String),

    /// 所选班级/学期下没有可排的教学任务
    #[error("没有可排的教学任务: {0}")]
    EmptyResult(String),

    /// 读取目录或既有课表失败
    #[error("课表存储不可用: {0}")]
    StoreUnavailable(#[source] RepositoryError),

    /// 删除/插入事务失败（已整体回滚）
    #[error("排课写入失败, 已回滚: {0}")]
    GenerationFailed(#[source] RepositoryError),

    #[error("配置错误: {0}")]
    Config(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
