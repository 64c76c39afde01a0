// ==========================================
// 高校排课系统 - 配置层
// ==========================================
// 职责: 排课配置读取与覆写
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

pub mod config_manager;
pub mod schedule_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use schedule_config_trait::ScheduleConfigReader;
