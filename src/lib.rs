// ==========================================
// 高校排课系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 排课生成与冲突检测引擎
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排课规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// SQL 计数与慢查询日志
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ClassroomType, ConflictType, Semester, WeekType};

// 领域实体
pub use domain::{
    Booking, BookingDetail, BookingFilter, Classroom, ConflictReport, ConflictReportEntry,
    DateRange, GenerationRun, NewBooking, TeachingLoad, TimeSlot,
};

// 引擎
pub use engine::{
    AssignmentEngine, AssignmentStrategy, AvailabilityIndex, Calendar, ClassroomRules,
    ConflictDetector, EngineError, GenerationService, GroupLockRegistry, LockGranularity,
};

// API
pub use api::{ApiError, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "高校排课系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";
