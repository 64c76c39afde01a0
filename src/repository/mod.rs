// ==========================================
// 高校排课系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化静态 SQL,防止 SQL 注入
// ==========================================

pub mod booking_repo;
pub mod catalog_repo;
pub mod db_utils;
pub mod error;
pub mod generation_run_repo;

// 重导出核心仓储
pub use booking_repo::{BookingRepository, ReplaceOutcome};
pub use catalog_repo::CatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use generation_run_repo::GenerationRunRepository;
