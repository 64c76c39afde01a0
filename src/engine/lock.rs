// ==========================================
// 高校排课系统 - 排课互斥锁
// ==========================================
// 职责: 串行化班级集合有交集的排课请求，保证“删除 + 插入”期间
//       其他运行不会读到中间状态
// 粒度:
// - global: 任意两次排课互斥（默认）
// - group_set: 仅班级集合有交集时互斥
//   注意: 教室与教师跨班级共享，group_set 下并发运行的可用性索引
//   互相不可见，可能产生教室/教师冲突，需由冲突检测兜底
// ==========================================

use crate::domain::catalog::GroupId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockGranularity {
    Global,
    GroupSet,
}

impl LockGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockGranularity::Global => "global",
            LockGranularity::GroupSet => "group_set",
        }
    }

    /// 任意两次排课是否互斥（只有此时生成结果保证无重复占用）
    pub fn serializes_all_runs(&self) -> bool {
        matches!(self, LockGranularity::Global)
    }
}

impl Default for LockGranularity {
    fn default() -> Self {
        LockGranularity::Global
    }
}

impl std::str::FromStr for LockGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global" => Ok(LockGranularity::Global),
            "group_set" | "group-set" => Ok(LockGranularity::GroupSet),
            other => Err(format!("未知锁粒度: {}", other)),
        }
    }
}

#[derive(Debug, Default)]
struct LockState {
    held: HashSet<GroupId>,
    active: usize,
}

// ==========================================
// GroupLockRegistry - 班级集合锁
// ==========================================
#[derive(Debug, Default)]
pub struct GroupLockRegistry {
    granularity: LockGranularity,
    state: Mutex<LockState>,
    released: Condvar,
}

impl GroupLockRegistry {
    pub fn new(granularity: LockGranularity) -> Self {
        if !granularity.serializes_all_runs() {
            warn!(
                granularity = granularity.as_str(),
                "排课锁按班级集合互斥: 并发运行可能重复占用教室/教师，需依赖冲突检测"
            );
        }
        Self {
            granularity,
            state: Mutex::new(LockState::default()),
            released: Condvar::new(),
        }
    }

    pub fn granularity(&self) -> LockGranularity {
        self.granularity
    }

    // 持锁线程 panic 不会破坏 held 集合（Guard drop 仍会执行），直接恢复
    fn lock_state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn conflicts(&self, state: &LockState, group_ids: &[GroupId]) -> bool {
        match self.granularity {
            LockGranularity::Global => state.active > 0,
            LockGranularity::GroupSet => group_ids.iter().any(|g| state.held.contains(g)),
        }
    }

    /// 阻塞直到与已持有的锁无交集
    pub fn acquire(&self, group_ids: &[GroupId]) -> GroupLockGuard<'_> {
        let mut state = self.lock_state();
        while self.conflicts(&state, group_ids) {
            debug!(?group_ids, granularity = self.granularity.as_str(), "等待排课锁");
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        state.active += 1;
        state.held.extend(group_ids.iter().copied());

        GroupLockGuard {
            registry: self,
            group_ids: group_ids.to_vec(),
        }
    }

    /// 当前持有的锁数量
    pub fn active_count(&self) -> usize {
        self.lock_state().active
    }
}

/// 排课锁 Guard，drop 时释放
#[derive(Debug)]
pub struct GroupLockGuard<'a> {
    registry: &'a GroupLockRegistry,
    group_ids: Vec<GroupId>,
}

impl Drop for GroupLockGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.registry.lock_state();
        state.active = state.active.saturating_sub(1);
        for g in &self.group_ids {
            state.held.remove(g);
        }
        drop(state);
        self.registry.released.notify_all();
    }
}
