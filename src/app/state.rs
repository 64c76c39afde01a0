// ==========================================
// 高校排课系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::ScheduleApi;
use crate::config::{ConfigManager, ScheduleConfigReader};
use crate::engine::{GenerationService, GroupLockRegistry};
use crate::repository::{BookingRepository, CatalogRepository, GenerationRunRepository};

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 课表API
    pub schedule_api: Arc<ScheduleApi>,

    /// 基础目录仓储（演示数据初始化）
    pub catalog_repo: Arc<CatalogRepository>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 1. 打开连接并确保 schema 就绪
    /// 2. 初始化 Repository / 配置
    /// 3. 按配置的锁粒度创建排课锁
    /// 4. 创建 API 实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let mut conn = crate::db::open_and_migrate(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::perf::install_sqlite_tracing(&mut conn);
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let catalog_repo = Arc::new(CatalogRepository::new(conn.clone()));
        let booking_repo = Arc::new(BookingRepository::new(conn.clone()));
        let run_repo = Arc::new(GenerationRunRepository::new(conn.clone()));

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let granularity = config_manager
            .get_lock_granularity()
            .map_err(|e| format!("读取锁粒度配置失败: {}", e))?;
        let locks = Arc::new(GroupLockRegistry::new(granularity));

        let generation = Arc::new(GenerationService::new(
            catalog_repo.clone(),
            booking_repo.clone(),
            run_repo.clone(),
            config_manager.clone(),
            locks,
        ));

        // ==========================================
        // 初始化API层
        // ==========================================
        let schedule_api = Arc::new(ScheduleApi::new(generation, booking_repo, run_repo));

        tracing::info!(lock_granularity = granularity.as_str(), "AppState初始化完成");

        Ok(Self {
            db_path,
            schedule_api,
            catalog_repo,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级:
/// 1. 环境变量 TIMETABLE_DB_PATH
/// 2. 用户数据目录/timetable-engine/timetable.db
/// 3. ./timetable.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("TIMETABLE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./timetable.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("timetable-engine");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("timetable.db");
        }
    }

    path.to_string_lossy().to_string()
}
