// ==========================================
// 高校排课系统 - 引擎层
// ==========================================
// 职责: 日历展开、可用性索引、分配、冲突检测、排课生成
// 红线: Engine 不拼 SQL
// ==========================================

pub mod assignment;
pub mod availability;
pub mod calendar;
pub mod conflict;
pub mod error;
pub mod generation;
pub mod lock;
pub mod strategy;
pub mod suitability;

// 重导出核心引擎
pub use assignment::{AssignmentEngine, AssignmentOutcome, SkippedLoad};
pub use availability::AvailabilityIndex;
pub use calendar::{Calendar, CalendarDay};
pub use conflict::ConflictDetector;
pub use error::{EngineError, EngineResult};
pub use generation::{GenerationRequest, GenerationResult, GenerationService};
pub use lock::{GroupLockGuard, GroupLockRegistry, LockGranularity};
pub use strategy::AssignmentStrategy;
pub use suitability::{ClassroomRule, ClassroomRules};
