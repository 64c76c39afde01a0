// ==========================================
// 排课生成端到端测试
// ==========================================
// 覆盖: 教室类型规则、教师共享、幂等、限定范围替换、
//       零写入失败路径、事务回滚、random_fit 不变量、运行记录
// ==========================================


mod helpers;

#[cfg(test)]
mod generation_e2e_test {
    use crate::helpers::mock_config::MockConfig;
    use crate::helpers::test_data_builder::CatalogBuilder;
    use crate::test_helpers::{d, setup_env, setup_env_with, TestEnv};
    use std::collections::HashSet;
    use std::sync::Arc;
    use timetable_engine::api::{ApiError, BookingQuery, GenerateRequest};
    use timetable_engine::domain::types::{ClassroomType, WeekType};
    use timetable_engine::domain::{Booking, BookingFilter, DateRange};
    use timetable_engine::engine::{AssignmentStrategy, LockGranularity};
    use timetable_engine::perf::PerfGuard;

    fn week_request(group_ids: Vec<i64>) -> GenerateRequest {
        GenerateRequest {
            semester: 1,
            start_date: "2024-09-02".to_string(),
            end_date: "2024-09-08".to_string(),
            group_ids,
            strategy: None,
        }
    }

    fn all_bookings(env: &TestEnv) -> Vec<Booking> {
        env.bookings.query(&BookingFilter::default()).unwrap()
    }

    // 去掉主键后的课表内容（主键自增，重复生成后会变化）
    fn placements(bookings: &[Booking]) -> Vec<(i64, i64, i64, String, WeekType)> {
        bookings
            .iter()
            .map(|b| {
                (
                    b.teaching_load_id,
                    b.time_slot_id,
                    b.classroom_id,
                    b.date.to_string(),
                    b.week_type,
                )
            })
            .collect()
    }

    fn assert_no_double_booking(bookings: &[Booking]) {
        let mut rooms = HashSet::new();
        let mut teachers = HashSet::new();
        for b in bookings {
            assert!(
                rooms.insert((b.classroom_id, b.time_slot_id, b.date)),
                "教室重复占用: {:?}",
                b
            );
            assert!(
                teachers.insert((b.teacher_id, b.time_slot_id, b.date)),
                "教师重复占用: {:?}",
                b
            );
        }
    }

    // ==========================================
    // 教室类型规则
    // ==========================================

    #[test]
    fn test_math_group_gets_lecture_room_on_monday() {
        let env = setup_env_with(Some(Arc::new(MockConfig::legacy_rules())), LockGranularity::Global);
        let builder = CatalogBuilder::new(env.catalog.clone());

        let fixture = builder.single_load("Математика", "М-101", "Иванов", 72);
        builder.classroom("205", ClassroomType::Lab);
        let lecture = builder.classroom("101", ClassroomType::Lecture);
        let monday_slot = builder.slot(1, "08:30", "10:00");

        let response = env.api.generate(&week_request(vec![fixture.group_id])).unwrap();

        assert_eq!(response.created_count, 1);
        assert_eq!(response.deleted_count, 0);
        // 周二至周日无时段
        assert_eq!(response.skipped_count, 6);
        assert_eq!(response.strategy, AssignmentStrategy::FirstFit);

        let booking = &response.bookings[0];
        assert_eq!(booking.date, d(2024, 9, 2));
        assert_eq!(booking.time_slot_id, monday_slot);
        assert_eq!(booking.classroom_id, lecture);
        assert_eq!(booking.teacher_id, fixture.teacher_id);
        assert_eq!(booking.group_id, fixture.group_id);
        // 2024-09-02 属于 ISO 第 36 周
        assert_eq!(booking.week_type, WeekType::Even);

        assert_eq!(all_bookings(&env), response.bookings);
    }

    #[test]
    fn test_math_group_skipped_without_lecture_room() {
        let env = setup_env_with(Some(Arc::new(MockConfig::legacy_rules())), LockGranularity::Global);
        let builder = CatalogBuilder::new(env.catalog.clone());

        let fixture = builder.single_load("Математика", "М-101", "Иванов", 72);
        builder.classroom("205", ClassroomType::Lab);
        builder.slot(1, "08:30", "10:00");

        let response = env.api.generate(&week_request(vec![fixture.group_id])).unwrap();

        assert_eq!(response.created_count, 0);
        assert_eq!(response.skipped_count, 7);
        assert_eq!(env.schedule_count(), 0);
    }

    #[test]
    fn test_unruled_specialty_uses_any_room() {
        let env = setup_env_with(Some(Arc::new(MockConfig::legacy_rules())), LockGranularity::Global);
        let builder = CatalogBuilder::new(env.catalog.clone());

        let fixture = builder.single_load("История", "И-101", "Сидоров", 36);
        let lab = builder.classroom("205", ClassroomType::Lab);
        builder.slot(1, "08:30", "10:00");

        let response = env.api.generate(&week_request(vec![fixture.group_id])).unwrap();

        assert_eq!(response.created_count, 1);
        assert_eq!(response.bookings[0].classroom_id, lab);
    }

    // ==========================================
    // 教师共享
    // ==========================================

    #[test]
    fn test_shared_teacher_single_slot_books_once() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());

        let specialty = builder.specialty("История");
        let g1 = builder.group("И-101", specialty);
        let g2 = builder.group("И-102", specialty);
        let teacher = builder.teacher("Сидоров");
        let discipline = builder.discipline("Всеобщая история", specialty);
        let first_load = builder.load(discipline, g1, teacher, Some(36), None);
        let second_load = builder.load(discipline, g2, teacher, Some(36), None);
        builder.classroom("101", ClassroomType::Lecture);
        builder.classroom("102", ClassroomType::Lecture);
        builder.slot(1, "08:30", "10:00");

        let response = env.api.generate(&week_request(vec![g1, g2])).unwrap();

        assert_eq!(response.created_count, 1);
        assert_eq!(response.bookings[0].teaching_load_id, first_load);
        assert!(response
            .skipped
            .iter()
            .any(|s| s.load_id == second_load && s.date == d(2024, 9, 2)));
        assert_no_double_booking(&all_bookings(&env));
    }

    #[test]
    fn test_one_booking_per_load_per_day() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());

        let fixture = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();

        let response = env.api.generate(&week_request(vec![fixture.group_id])).unwrap();

        // 周一至周五各一条
        assert_eq!(response.created_count, 5);
        let days: HashSet<_> = response.bookings.iter().map(|b| b.date).collect();
        assert_eq!(days.len(), 5);
    }

    // ==========================================
    // 幂等与限定范围替换
    // ==========================================

    #[test]
    fn test_regeneration_is_idempotent() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());

        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        let b = builder.single_load("Математика", "М-101", "Иванов", 72);
        builder.classroom("101", ClassroomType::Lecture);
        builder.classroom("205", ClassroomType::Lab);
        builder.weekday_slots();

        let groups = vec![a.group_id, b.group_id];
        let first = env.api.generate(&week_request(groups.clone())).unwrap();
        let before = placements(&all_bookings(&env));
        let week = DateRange::new(d(2024, 9, 2), d(2024, 9, 8)).unwrap();
        let scoped = env.bookings.count_in_scope(&groups, week).unwrap();

        let second = env.api.generate(&week_request(groups)).unwrap();
        let after = placements(&all_bookings(&env));

        assert_eq!(before, after);
        assert_eq!(second.deleted_count, first.created_count);
        assert_eq!(second.deleted_count, scoped);
        assert_eq!(second.created_count, first.created_count);
    }

    #[test]
    fn test_scoped_replace_keeps_other_groups() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());

        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        let b = builder.single_load("Математика", "М-101", "Иванов", 72);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();

        let a_run = env.api.generate(&week_request(vec![a.group_id])).unwrap();
        let b_before = env
            .bookings
            .query(&BookingFilter::for_group(b.group_id))
            .unwrap();
        assert!(b_before.is_empty());

        env.api.generate(&week_request(vec![b.group_id])).unwrap();
        let b_bookings = env
            .bookings
            .query(&BookingFilter::for_group(b.group_id))
            .unwrap();

        // A 的课表未被 B 的生成改动
        let a_after = env
            .bookings
            .query(&BookingFilter::for_group(a.group_id))
            .unwrap();
        assert_eq!(a_after, a_run.bookings);

        // B 避开了 A 已占用的教室
        assert_eq!(b_bookings.len(), 5);
        assert_no_double_booking(&all_bookings(&env));

        // 再次生成 A，只删除 A 的课表
        let rerun = env.api.generate(&week_request(vec![a.group_id])).unwrap();
        assert_eq!(rerun.deleted_count, a_run.created_count);
        let b_after = env
            .bookings
            .query(&BookingFilter::for_group(b.group_id))
            .unwrap();
        assert_eq!(b_after, b_bookings);
    }

    #[test]
    fn test_replace_limited_to_date_range() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());

        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();

        env.api.generate(&week_request(vec![a.group_id])).unwrap();

        let next_week = GenerateRequest {
            start_date: "2024-09-09".to_string(),
            end_date: "2024-09-15".to_string(),
            ..week_request(vec![a.group_id])
        };
        let response = env.api.generate(&next_week).unwrap();

        assert_eq!(response.deleted_count, 0);
        let second_week = DateRange::new(d(2024, 9, 9), d(2024, 9, 15)).unwrap();
        assert!(response.bookings.iter().all(|b| second_week.contains(b.date)));
        assert!(response.bookings.iter().all(|b| b.week_type == WeekType::Odd));
        assert_eq!(all_bookings(&env).len(), 10);
    }

    // ==========================================
    // 失败路径: 零写入
    // ==========================================

    #[test]
    fn test_inverted_range_writes_nothing() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());
        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();
        env.api.generate(&week_request(vec![a.group_id])).unwrap();

        let request = GenerateRequest {
            start_date: "2024-09-08".to_string(),
            end_date: "2024-09-02".to_string(),
            ..week_request(vec![a.group_id])
        };
        let result = env.api.generate(&request);

        assert!(matches!(result, Err(ApiError::InvalidRange(_))));
        assert_eq!(env.schedule_count(), 5);
        assert_eq!(env.api.list_runs(10).unwrap().len(), 1);
    }

    #[test]
    fn test_unparsable_date_is_invalid_range() {
        let env = setup_env();
        let request = GenerateRequest {
            start_date: "2024-13-01".to_string(),
            ..week_request(vec![1])
        };
        assert!(matches!(env.api.generate(&request), Err(ApiError::InvalidRange(_))));
    }

    #[test]
    fn test_no_eligible_loads_is_empty_result() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());

        let specialty = builder.specialty("История");
        let group = builder.group("И-101", specialty);
        let teacher = builder.teacher("Сидоров");
        let discipline = builder.discipline("Всеобщая история", specialty);
        // 只有第二学期课时, 第一学期为 0
        builder.load(discipline, group, teacher, Some(0), Some(36));
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();

        let result = env.api.generate(&week_request(vec![group]));

        assert!(matches!(result, Err(ApiError::EmptyResult(_))));
        assert_eq!(env.schedule_count(), 0);
        assert!(env.api.list_runs(10).unwrap().is_empty());

        let second = GenerateRequest {
            semester: 2,
            ..week_request(vec![group])
        };
        assert_eq!(env.api.generate(&second).unwrap().created_count, 5);
    }

    #[test]
    fn test_invalid_request_parameters() {
        let env = setup_env();

        let bad_semester = GenerateRequest {
            semester: 3,
            ..week_request(vec![1])
        };
        assert!(matches!(
            env.api.generate(&bad_semester),
            Err(ApiError::InvalidInput(_))
        ));

        assert!(matches!(
            env.api.generate(&week_request(vec![])),
            Err(ApiError::InvalidInput(_))
        ));

        let bad_strategy = GenerateRequest {
            strategy: Some("best_fit".to_string()),
            ..week_request(vec![1])
        };
        assert!(matches!(
            env.api.generate(&bad_strategy),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_store_read_failure_is_store_unavailable() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());
        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();

        env.exec("DROP TABLE time_slots;");

        let result = env.api.generate(&week_request(vec![a.group_id]));
        assert!(matches!(result, Err(ApiError::StoreUnavailable(_))));
        assert_eq!(env.schedule_count(), 0);
    }

    #[test]
    fn test_insert_failure_rolls_back_delete() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());
        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();

        let first = env.api.generate(&week_request(vec![a.group_id])).unwrap();

        env.exec(
            r#"
            CREATE TRIGGER fail_schedule_insert BEFORE INSERT ON schedule
            BEGIN
                SELECT RAISE(ABORT, 'injected insert failure');
            END;
            "#,
        );

        let result = env.api.generate(&week_request(vec![a.group_id]));
        assert!(matches!(result, Err(ApiError::GenerationFailed(_))));

        // 删除与插入同一事务，删除也被回滚
        assert_eq!(all_bookings(&env), first.bookings);
        assert_eq!(env.api.list_runs(10).unwrap().len(), 1);
    }

    // ==========================================
    // random_fit
    // ==========================================

    #[test]
    fn test_random_fit_respects_invariants() {
        for seed in 0..10 {
            let env = setup_env_with(
                Some(Arc::new(MockConfig::random_fit(seed))),
                LockGranularity::Global,
            );
            let builder = CatalogBuilder::new(env.catalog.clone());

            let specialty = builder.specialty("История");
            let teacher = builder.teacher("Сидоров");
            let other_teacher = builder.teacher("Петрова");
            let discipline = builder.discipline("Всеобщая история", specialty);
            let mut groups = Vec::new();
            for (i, name) in ["И-101", "И-102", "И-103"].iter().enumerate() {
                let group = builder.group(name, specialty);
                let t = if i == 2 { other_teacher } else { teacher };
                builder.load(discipline, group, t, Some(36), None);
                groups.push(group);
            }
            builder.classroom("101", ClassroomType::Lecture);
            builder.classroom("102", ClassroomType::Lab);
            builder.weekday_slots();

            let response = env.api.generate(&week_request(groups)).unwrap();

            assert_eq!(response.strategy, AssignmentStrategy::RandomFit);
            // 每天 3 个时段、2 间教室，3 条任务全部可排
            assert_eq!(response.created_count, 15, "seed={}", seed);
            assert_no_double_booking(&all_bookings(&env));
        }
    }

    #[test]
    fn test_random_fit_same_seed_reproduces() {
        let run = || {
            let env = setup_env_with(
                Some(Arc::new(MockConfig::random_fit(42))),
                LockGranularity::Global,
            );
            let builder = CatalogBuilder::new(env.catalog.clone());
            let a = builder.single_load("История", "И-101", "Сидоров", 36);
            builder.classroom("101", ClassroomType::Lecture);
            builder.classroom("102", ClassroomType::Lecture);
            builder.weekday_slots();
            let response = env.api.generate(&week_request(vec![a.group_id])).unwrap();
            placements(&response.bookings)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_strategy_override_in_request() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());
        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();

        let request = GenerateRequest {
            strategy: Some("random_fit".to_string()),
            ..week_request(vec![a.group_id])
        };
        let response = env.api.generate(&request).unwrap();

        assert_eq!(response.strategy, AssignmentStrategy::RandomFit);
        assert_eq!(response.created_count, 5);
    }

    // ==========================================
    // 运行记录与查询
    // ==========================================

    #[test]
    fn test_generation_sql_count_is_batched() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());
        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.classroom("102", ClassroomType::Lecture);
        builder.weekday_slots();

        std::env::set_var("TIMETABLE_PERF_SQL", "1");
        {
            let mut conn = env.conn.lock().unwrap();
            timetable_engine::perf::install_sqlite_tracing(&mut conn);
        }

        let count_for = |end: &str| {
            let guard = PerfGuard::new("generate_test");
            let response = env
                .api
                .generate(&GenerateRequest {
                    end_date: end.to_string(),
                    ..week_request(vec![a.group_id])
                })
                .unwrap();
            (guard.sql_count(), response.created_count as u64)
        };

        let (one_week, created_one) = count_for("2024-09-08");
        let (two_weeks, created_two) = count_for("2024-09-15");

        assert_eq!(created_one, 5);
        assert_eq!(created_two, 10);
        assert!(one_week > created_one, "sql_count={}", one_week);
        // 除逐条插入外，语句数与日期区间长度无关
        assert_eq!(two_weeks - created_two, one_week - created_one);
    }

    #[test]
    fn test_run_log_written() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());
        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();

        let first = env.api.generate(&week_request(vec![a.group_id, a.group_id])).unwrap();
        let second = env.api.generate(&week_request(vec![a.group_id])).unwrap();

        let runs = env.api.list_runs(10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].run_id, second.run_id);
        assert_eq!(runs[1].run_id, first.run_id);

        let run = &runs[1];
        assert_eq!(run.semester, 1);
        assert_eq!(run.start_date, d(2024, 9, 2));
        assert_eq!(run.end_date, d(2024, 9, 8));
        // 重复的班级ID已去重
        assert_eq!(run.group_ids, vec![a.group_id]);
        assert_eq!(run.strategy, "first_fit");
        assert_eq!(run.created_count, 5);
        assert_eq!(run.skipped_count, 2);
        assert_eq!(run.deleted_count, 0);

        assert_eq!(env.api.list_runs(1).unwrap().len(), 1);
    }

    #[test]
    fn test_bookings_sorted_and_detailed() {
        let env = setup_env();
        let builder = CatalogBuilder::new(env.catalog.clone());
        let a = builder.single_load("История", "И-101", "Сидоров", 36);
        builder.classroom("101", ClassroomType::Lecture);
        builder.weekday_slots();
        env.api.generate(&week_request(vec![a.group_id])).unwrap();

        let query = BookingQuery {
            teacher_id: Some(a.teacher_id),
            start_date: Some("2024-09-03".to_string()),
            end_date: Some("2024-09-04".to_string()),
            ..Default::default()
        };
        let bookings = env.api.list_bookings(&query).unwrap();
        assert_eq!(bookings.len(), 2);
        assert!(bookings[0].date < bookings[1].date);

        let details = env.api.list_booking_details(&query).unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].teacher_name, "Сидоров И.П.");
        assert_eq!(details[0].group_name, "И-101");
        assert_eq!(details[0].classroom_number, "101");
        assert_eq!(details[0].day_of_week, 2);

        let half_open = BookingQuery {
            start_date: Some("2024-09-03".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            env.api.list_bookings(&half_open),
            Err(ApiError::InvalidInput(_))
        ));
    }
}
