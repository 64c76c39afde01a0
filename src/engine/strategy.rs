// ==========================================
// 高校排课系统 - 选位策略定义
// ==========================================
// 用途：
// - first_fit: 按时段时间顺序、教室目录顺序取第一个可用组合（确定性，默认）
// - random_fit: 在当日全部可用 (时段, 教室) 组合中等概率抽取一个

use serde::{Deserialize, Serialize};

/// 选位策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    FirstFit,
    RandomFit,
}

impl AssignmentStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStrategy::FirstFit => "first_fit",
            AssignmentStrategy::RandomFit => "random_fit",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            AssignmentStrategy::FirstFit => "首个可用",
            AssignmentStrategy::RandomFit => "随机可用",
        }
    }

    /// 相同输入下结果是否可复现（random_fit 仅在指定种子时可复现）
    pub fn is_deterministic(&self) -> bool {
        matches!(self, AssignmentStrategy::FirstFit)
    }
}

impl Default for AssignmentStrategy {
    fn default() -> Self {
        AssignmentStrategy::FirstFit
    }
}

impl std::fmt::Display for AssignmentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first_fit" | "first-fit" => Ok(AssignmentStrategy::FirstFit),
            "random_fit" | "random-fit" => Ok(AssignmentStrategy::RandomFit),
            other => Err(format!("未知选位策略: {}", other)),
        }
    }
}
