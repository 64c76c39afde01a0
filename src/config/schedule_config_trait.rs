// ==========================================
// 高校排课系统 - 排课配置读取 Trait
// ==========================================
// 职责: 定义排课引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::engine::lock::LockGranularity;
use crate::engine::strategy::AssignmentStrategy;
use crate::engine::suitability::ClassroomRules;
use std::error::Error;

// ==========================================
// ScheduleConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ScheduleConfigReader: Send + Sync {
    /// 获取教室类型规则
    ///
    /// # 默认值
    /// - 空规则（不限制教室类型）
    fn get_classroom_rules(&self) -> Result<ClassroomRules, Box<dyn Error>>;

    /// 获取选位策略
    ///
    /// # 默认值
    /// - first_fit
    fn get_assignment_strategy(&self) -> Result<AssignmentStrategy, Box<dyn Error>>;

    /// 获取 random_fit 随机种子
    ///
    /// # 默认值
    /// - None（每次运行随机）
    fn get_random_fit_seed(&self) -> Result<Option<u64>, Box<dyn Error>>;

    /// 获取排课锁粒度
    ///
    /// # 默认值
    /// - global
    fn get_lock_granularity(&self) -> Result<LockGranularity, Box<dyn Error>>;
}
