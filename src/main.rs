// ==========================================
// 高校排课系统 - 命令行入口
// ==========================================
// 输出: 命令结果以 JSON 写入 stdout，日志写入 stderr
// ==========================================

use anyhow::{Context, Result};
use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use serde::Serialize;

use timetable_engine::api::{BookingQuery, GenerateRequest};
use timetable_engine::app::{get_default_db_path, AppState};
use timetable_engine::config::config_keys;
use timetable_engine::domain::types::ClassroomType;
use timetable_engine::engine::ClassroomRules;
use timetable_engine::repository::CatalogRepository;

#[derive(Parser)]
#[command(name = "timetable-engine")]
#[command(version, about = "高校排课系统 - 排课生成与冲突检测", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 数据库文件路径（默认: TIMETABLE_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化数据库 schema
    Init,

    /// 写入演示用目录数据
    SeedDemo,

    /// 生成课表（替换指定班级在日期区间内的课表）
    Generate {
        /// 学期 (1 或 2)
        #[arg(long)]
        semester: i64,

        /// 起始日期 YYYY-MM-DD
        #[arg(long)]
        start: String,

        /// 结束日期 YYYY-MM-DD（含）
        #[arg(long)]
        end: String,

        /// 班级ID，逗号分隔
        #[arg(long, value_delimiter = ',', required = true)]
        groups: Vec<i64>,

        /// 选位策略 (first_fit / random_fit)，缺省读取配置
        #[arg(long)]
        strategy: Option<String>,
    },

    /// 冲突检测
    Conflicts {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// 课表查询
    Bookings {
        #[command(flatten)]
        scope: ScopeArgs,

        /// 输出课程/班级/教师/教室名称
        #[arg(long)]
        details: bool,
    },

    /// 最近的排课运行记录
    Runs {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// 查看或修改配置（无参数时列出全部）
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

#[derive(clap::Args)]
struct ScopeArgs {
    #[arg(long)]
    teacher: Option<i64>,

    #[arg(long)]
    group: Option<i64>,

    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,
}

impl From<ScopeArgs> for BookingQuery {
    fn from(args: ScopeArgs) -> Self {
        BookingQuery {
            teacher_id: args.teacher,
            group_id: args.group,
            start_date: args.start,
            end_date: args.end,
        }
    }
}

fn main() -> Result<()> {
    timetable_engine::logging::init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(get_default_db_path);

    let state = AppState::new(db_path.clone())
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("无法初始化数据库: {}", db_path))?;

    match cli.command {
        Commands::Init => print_json(&serde_json::json!({
            "dbPath": state.db_path,
            "schemaVersion": timetable_engine::db::CURRENT_SCHEMA_VERSION,
        })),
        Commands::SeedDemo => cmd_seed_demo(&state),
        Commands::Generate {
            semester,
            start,
            end,
            groups,
            strategy,
        } => {
            let response = state.schedule_api.generate(&GenerateRequest {
                semester,
                start_date: start,
                end_date: end,
                group_ids: groups,
                strategy,
            })?;
            print_json(&response)
        }
        Commands::Conflicts { scope } => {
            print_json(&state.schedule_api.conflicts(&scope.into())?)
        }
        Commands::Bookings { scope, details } => {
            let query: BookingQuery = scope.into();
            if details {
                print_json(&state.schedule_api.list_booking_details(&query)?)
            } else {
                print_json(&state.schedule_api.list_bookings(&query)?)
            }
        }
        Commands::Runs { limit } => print_json(&state.schedule_api.list_runs(limit)?),
        Commands::Config { key, value } => cmd_config(&state, key, value),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_config(state: &AppState, key: Option<String>, value: Option<String>) -> Result<()> {
    let config = &state.config_manager;
    let to_anyhow = |e: Box<dyn std::error::Error>| anyhow::anyhow!(e.to_string());

    match (key, value) {
        (None, _) => print_json(&config.list_global_config().map_err(to_anyhow)?),
        (Some(key), None) => {
            print_json(&config.get_global_config_value(&key).map_err(to_anyhow)?)
        }
        (Some(key), Some(value)) => {
            config
                .set_global_config_value(&key, &value)
                .map_err(to_anyhow)?;
            print_json(&std::collections::BTreeMap::from([(key, value)]))
        }
    }
}

// ==========================================
// 演示数据
// ==========================================

fn cmd_seed_demo(state: &AppState) -> Result<()> {
    let catalog = &state.catalog_repo;
    seed_catalog(catalog)?;

    // 旧系统预设: 数学/物理专业使用讲堂
    let rules = serde_json::to_string(ClassroomRules::legacy_defaults().rules())?;
    state
        .config_manager
        .set_global_config_value(config_keys::CLASSROOM_TYPE_RULES, &rules)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    tracing::info!("演示数据写入完成");
    print_json(&serde_json::json!({ "seeded": true, "classroomTypeRules": rules }))
}

fn seed_catalog(catalog: &CatalogRepository) -> Result<()> {
    let math = catalog.insert_specialty("Математика", Some("01.03.01"))?;
    let history = catalog.insert_specialty("История", Some("46.03.01"))?;

    let m101 = catalog.insert_group("М-101", math, 1, "б", None)?;
    let m102 = catalog.insert_group("М-102", math, 1, "б", None)?;
    let h101 = catalog.insert_group("И-101", history, 1, "б", None)?;

    let algebra = catalog.insert_discipline("Алгебра", math)?;
    let analysis = catalog.insert_discipline("Математический анализ", math)?;
    let world_history = catalog.insert_discipline("Всеобщая история", history)?;

    let ivanov = catalog.insert_teacher("Иванов", "Иван", Some("Петрович"))?;
    let petrova = catalog.insert_teacher("Петрова", "Анна", Some("Сергеевна"))?;
    let sidorov = catalog.insert_teacher("Сидоров", "Олег", None)?;

    catalog.insert_teaching_load(algebra, m101, ivanov, Some(72), Some(36))?;
    catalog.insert_teaching_load(algebra, m102, ivanov, Some(72), None)?;
    catalog.insert_teaching_load(analysis, m101, petrova, Some(54), Some(54))?;
    catalog.insert_teaching_load(world_history, h101, sidorov, Some(36), Some(36))?;

    catalog.insert_classroom("101", Some(120), ClassroomType::Lecture)?;
    catalog.insert_classroom("205", Some(30), ClassroomType::Lab)?;
    catalog.insert_classroom("310", Some(25), ClassroomType::Practice)?;

    let pairs = [((8, 30), (10, 0)), ((10, 10), (11, 40)), ((12, 10), (13, 40))];
    for day_of_week in 1..=5u32 {
        for ((sh, sm), (eh, em)) in pairs {
            let start = NaiveTime::from_hms_opt(sh, sm, 0).context("非法时段开始时间")?;
            let end = NaiveTime::from_hms_opt(eh, em, 0).context("非法时段结束时间")?;
            catalog.insert_time_slot(day_of_week, start, end)?;
        }
    }

    Ok(())
}
