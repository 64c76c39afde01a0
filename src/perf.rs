// ==========================================
// 高校排课系统 - SQL 计数与慢查询日志
// ==========================================
// 用途: 统计一次排课/冲突检测过程中的 SQL 语句数，
//       确认存储访问保持批量化（而非逐候选位查询）
// 开关: TIMETABLE_PERF_SQL=1 强制开启 (Debug 默认开启)
//       TIMETABLE_SLOW_SQL_MS 慢 SQL 阈值（毫秒）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const SLOW_SQL_LOG_LEN: usize = 420;

static ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

/// 当前线程的计数器（仅在 PerfGuard 作用域内累加）
#[derive(Default)]
struct ThreadCounters {
    depth: Cell<u32>,
    statements: Cell<u64>,
    slow_statements: Cell<u64>,
}

impl ThreadCounters {
    fn in_scope(&self) -> bool {
        self.depth.get() > 0
    }

    fn bump(cell: &Cell<u64>) {
        cell.set(cell.get().saturating_add(1));
    }
}

thread_local! {
    static COUNTERS: ThreadCounters = ThreadCounters::default();
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

// 单行化并按字符边界截断
fn one_line(sql: &str, max_len: usize) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= max_len {
        return flat;
    }
    let cut = (0..=max_len)
        .rev()
        .find(|&i| flat.is_char_boundary(i))
        .unwrap_or(0);
    format!("{}…", &flat[..cut])
}

/// 在连接上安装语句 profile 回调
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = env_flag("TIMETABLE_PERF_SQL").unwrap_or(cfg!(debug_assertions));
    ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.profile(None);
        return;
    }

    let default_ms = if cfg!(debug_assertions) { 50 } else { 200 };
    let slow_ms = std::env::var("TIMETABLE_SLOW_SQL_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_ms);
    SLOW_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    // 不安装 legacy trace: sqlite3_profile 会清除其 trace mask
    conn.profile(Some(on_profile));
}

// 每条语句执行完成回调一次：计数 + 慢 SQL 告警
fn on_profile(sql: &str, duration: Duration) {
    if !ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let ms = duration.as_millis() as u64;
    let threshold = SLOW_THRESHOLD_MS.load(Ordering::Relaxed);
    let slow = threshold > 0 && ms >= threshold;

    if slow {
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %one_line(sql, SLOW_SQL_LOG_LEN),
            "慢 SQL"
        );
    }

    COUNTERS.with(|c| {
        if !c.in_scope() {
            return;
        }
        ThreadCounters::bump(&c.statements);
        if slow {
            ThreadCounters::bump(&c.slow_statements);
        }
    });
}

// ==========================================
// PerfGuard - 作用域耗时与 SQL 统计
// ==========================================
// 离开作用域时输出 elapsed_ms / sql_count / slow_sql_count
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    statements_at_start: u64,
    slow_at_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let (statements_at_start, slow_at_start) = COUNTERS.with(|c| {
            c.depth.set(c.depth.get().saturating_add(1));
            (c.statements.get(), c.slow_statements.get())
        });
        Self {
            op,
            start: Instant::now(),
            statements_at_start,
            slow_at_start,
        }
    }

    pub fn sql_count(&self) -> u64 {
        COUNTERS.with(|c| c.statements.get().saturating_sub(self.statements_at_start))
    }

    pub fn slow_sql_count(&self) -> u64 {
        COUNTERS.with(|c| c.slow_statements.get().saturating_sub(self.slow_at_start))
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            sql_count = self.sql_count(),
            slow_sql_count = self.slow_sql_count(),
            "完成"
        );
        COUNTERS.with(|c| c.depth.set(c.depth.get().saturating_sub(1)));
    }
}
