// ==========================================
// 高校排课系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 约定: 配置缺失时使用默认值；配置格式错误时告警并回退默认值
// ==========================================

use crate::config::schedule_config_trait::ScheduleConfigReader;
use crate::db::open_sqlite_connection;
use crate::engine::lock::LockGranularity;
use crate::engine::strategy::AssignmentStrategy;
use crate::engine::suitability::{ClassroomRule, ClassroomRules};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 删除 global scope 配置，返回是否存在
    pub fn remove_global_config_value(&self, key: &str) -> Result<bool, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;
        Ok(affected > 0)
    }

    /// 获取全部 global 配置（按 key 排序）
    pub fn list_global_config(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

// ==========================================
// ScheduleConfigReader 实现
// ==========================================
impl ScheduleConfigReader for ConfigManager {
    fn get_classroom_rules(&self) -> Result<ClassroomRules, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::CLASSROOM_TYPE_RULES, "[]")?;
        let rules: Vec<ClassroomRule> = serde_json::from_str(&value).unwrap_or_else(|_| {
            tracing::warn!(
                config_key = config_keys::CLASSROOM_TYPE_RULES,
                raw_value = %value,
                "教室类型规则配置格式错误，不限制教室类型"
            );
            Vec::new()
        });
        Ok(ClassroomRules::new(rules))
    }

    fn get_assignment_strategy(&self) -> Result<AssignmentStrategy, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::ASSIGNMENT_STRATEGY, "first_fit")?;
        Ok(value.parse::<AssignmentStrategy>().unwrap_or_else(|e| {
            tracing::warn!(
                config_key = config_keys::ASSIGNMENT_STRATEGY,
                raw_value = %value,
                error = %e,
                "选位策略配置无效，使用 first_fit"
            );
            AssignmentStrategy::default()
        }))
    }

    fn get_random_fit_seed(&self) -> Result<Option<u64>, Box<dyn Error>> {
        let value = match self.get_global_config_value(config_keys::RANDOM_FIT_SEED)? {
            Some(v) if !v.trim().is_empty() => v,
            _ => return Ok(None),
        };
        match value.trim().parse::<u64>() {
            Ok(seed) => Ok(Some(seed)),
            Err(_) => {
                tracing::warn!(
                    config_key = config_keys::RANDOM_FIT_SEED,
                    raw_value = %value,
                    "随机种子配置无效，忽略"
                );
                Ok(None)
            }
        }
    }

    fn get_lock_granularity(&self) -> Result<LockGranularity, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::LOCK_GRANULARITY, "global")?;
        Ok(value.parse::<LockGranularity>().unwrap_or_else(|e| {
            tracing::warn!(
                config_key = config_keys::LOCK_GRANULARITY,
                raw_value = %value,
                error = %e,
                "锁粒度配置无效，使用 global"
            );
            LockGranularity::default()
        }))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 教室类型规则 (JSON 数组)
    pub const CLASSROOM_TYPE_RULES: &str = "classroom_type_rules";

    // 选位策略
    pub const ASSIGNMENT_STRATEGY: &str = "assignment_strategy";
    pub const RANDOM_FIT_SEED: &str = "random_fit_seed";

    // 并发
    pub const LOCK_GRANULARITY: &str = "lock_granularity";
}
