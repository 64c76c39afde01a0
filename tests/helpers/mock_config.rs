// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use std::error::Error;
use timetable_engine::config::ScheduleConfigReader;
use timetable_engine::engine::{AssignmentStrategy, ClassroomRules, LockGranularity};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub classroom_rules: ClassroomRules,
    pub strategy: AssignmentStrategy,
    pub seed: Option<u64>,
    pub granularity: LockGranularity,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            classroom_rules: ClassroomRules::none(),
            strategy: AssignmentStrategy::FirstFit,
            seed: None,
            granularity: LockGranularity::Global,
        }
    }
}

impl MockConfig {
    /// 数学/物理专业使用讲堂
    pub fn legacy_rules() -> Self {
        Self {
            classroom_rules: ClassroomRules::legacy_defaults(),
            ..Self::default()
        }
    }

    /// 固定种子的 random_fit
    pub fn random_fit(seed: u64) -> Self {
        Self {
            strategy: AssignmentStrategy::RandomFit,
            seed: Some(seed),
            ..Self::default()
        }
    }
}

impl ScheduleConfigReader for MockConfig {
    fn get_classroom_rules(&self) -> Result<ClassroomRules, Box<dyn Error>> {
        Ok(self.classroom_rules.clone())
    }

    fn get_assignment_strategy(&self) -> Result<AssignmentStrategy, Box<dyn Error>> {
        Ok(self.strategy)
    }

    fn get_random_fit_seed(&self) -> Result<Option<u64>, Box<dyn Error>> {
        Ok(self.seed)
    }

    fn get_lock_granularity(&self) -> Result<LockGranularity, Box<dyn Error>> {
        Ok(self.granularity)
    }
}
