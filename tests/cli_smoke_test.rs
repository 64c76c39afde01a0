// ==========================================
// 命令行冒烟测试
// ==========================================
// 覆盖: init → seed-demo → generate → conflicts → runs 全链路，
//       stdout 为 JSON，失败时进程退出码非零
// ==========================================


#[cfg(test)]
mod cli_smoke_test {
    use crate::test_helpers::create_test_db;
    use serde_json::Value;
    use std::process::{Command, Output};

    fn run_cli(db_path: &str, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_timetable-engine"))
            .arg("--db")
            .arg(db_path)
            .args(args)
            .env("RUST_LOG", "warn")
            .output()
            .expect("无法启动命令行进程")
    }

    fn run_json(db_path: &str, args: &[&str]) -> Value {
        let output = run_cli(db_path, args);
        assert!(
            output.status.success(),
            "{:?} 执行失败: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout 不是 JSON")
    }

    const GENERATE_WEEK: [&str; 9] = [
        "generate",
        "--semester",
        "1",
        "--start",
        "2024-09-02",
        "--end",
        "2024-09-08",
        "--groups",
        "1,2,3",
    ];

    #[test]
    fn test_seed_generate_and_audit() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let init = run_json(&db_path, &["init"]);
        assert_eq!(init["schemaVersion"], 1);

        let seeded = run_json(&db_path, &["seed-demo"]);
        assert_eq!(seeded["seeded"], true);

        // 4 个教学任务 × 5 个工作日，每日 3 个时段足以放下
        let generated = run_json(&db_path, &GENERATE_WEEK);
        assert_eq!(generated["createdCount"], 20);
        assert_eq!(generated["skippedCount"], 0);
        assert_eq!(generated["deletedCount"], 0);
        assert_eq!(generated["strategy"], "first_fit");

        let conflicts = run_json(&db_path, &["conflicts"]);
        assert_eq!(conflicts["count"], 0);
        assert_eq!(conflicts["conflicts"].as_array().map(Vec::len), Some(0));

        // 再次生成替换本周课表
        let regenerated = run_json(&db_path, &GENERATE_WEEK);
        assert_eq!(regenerated["deletedCount"], 20);
        assert_eq!(regenerated["createdCount"], 20);

        let bookings = run_json(&db_path, &["bookings", "--group", "3"]);
        assert_eq!(bookings.as_array().map(Vec::len), Some(5));

        let runs = run_json(&db_path, &["runs", "--limit", "5"]);
        assert_eq!(runs.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_inverted_range_exits_with_error() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        run_json(&db_path, &["seed-demo"]);

        let output = run_cli(
            &db_path,
            &[
                "generate",
                "--semester",
                "1",
                "--start",
                "2024-09-08",
                "--end",
                "2024-09-02",
                "--groups",
                "1",
            ],
        );
        assert!(!output.status.success());
        assert!(output.stdout.is_empty());

        let bookings = run_json(&db_path, &["bookings"]);
        assert_eq!(bookings.as_array().map(Vec::len), Some(0));
    }
}
