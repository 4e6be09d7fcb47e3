use chrono::{Days, NaiveDate};
use memobot_core::{
    Rating, SchedulerConfig, SqliteTaskStore, TaskService, TaskServiceError, TaskValidationError,
};
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 8).unwrap()
}

fn plus(day: NaiveDate, days: u64) -> NaiveDate {
    day.checked_add_days(Days::new(days)).unwrap()
}

fn service() -> TaskService<SqliteTaskStore> {
    TaskService::new(SqliteTaskStore::open_in_memory().unwrap())
}

#[test]
fn create_task_is_due_immediately_with_floor_state() {
    let service = service();
    let task = service
        .create_task("Read paper", Some("https://example.com/paper"), start())
        .unwrap();

    assert_eq!(task.due_date, start());
    assert_eq!(task.interval_days, service.config().min_interval_days());
    assert_eq!(task.streak, 0);
    assert_eq!(task.url.as_deref(), Some("https://example.com/paper"));
    assert_eq!(service.list_due_tasks(start()).unwrap(), vec![task]);
}

#[test]
fn create_task_rejects_blank_name() {
    let service = service();
    let err = service.create_task("  ", None, start()).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::InvalidInput(TaskValidationError::EmptyName)
    ));
    assert!(service.list_tasks().unwrap().is_empty());
}

#[test]
fn review_scenario_moves_task_out_and_grows_interval() {
    let service = service();
    let task = service.create_task("Read paper", None, start()).unwrap();

    let again = service.rate_task(task.id, Rating::Again, start()).unwrap();
    assert_eq!(again.due_date, start());
    assert_eq!(again.interval_days, 1);
    assert_eq!(again.streak, 0);
    assert_eq!(service.list_due_tasks(start()).unwrap().len(), 1);

    let first_easy = service.rate_task(task.id, Rating::Easy, start()).unwrap();
    assert!(first_easy.interval_days > 1);
    assert_eq!(first_easy.streak, 1);
    assert_eq!(
        first_easy.due_date,
        plus(start(), u64::from(first_easy.interval_days))
    );
    assert!(service.list_due_tasks(start()).unwrap().is_empty());

    let review_day = first_easy.due_date;
    assert_eq!(service.list_due_tasks(review_day).unwrap().len(), 1);
    let second_easy = service.rate_task(task.id, Rating::Easy, review_day).unwrap();
    assert_eq!(second_easy.streak, 2);
    assert!(second_easy.interval_days > first_easy.interval_days);
    assert!(second_easy.due_date > first_easy.due_date);
    assert!(
        second_easy.due_date.signed_duration_since(review_day)
            > first_easy.due_date.signed_duration_since(start())
    );
}

#[test]
fn rate_then_list_excludes_hard_and_includes_again() {
    let service = service();
    let hard = service.create_task("hard one", None, start()).unwrap();
    let again = service.create_task("again one", None, start()).unwrap();

    service.rate_task(hard.id, Rating::Hard, start()).unwrap();
    service.rate_task(again.id, Rating::Again, start()).unwrap();

    let due_ids: Vec<_> = service
        .list_due_tasks(start())
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(due_ids, vec![again.id]);
}

#[test]
fn again_resets_a_long_streak() {
    let service = service();
    let task = service.create_task("streaky", None, start()).unwrap();
    let mut today = start();
    for _ in 0..5 {
        let rated = service.rate_task(task.id, Rating::Easy, today).unwrap();
        today = rated.due_date;
    }
    let before = service.get_task(task.id).unwrap();
    assert_eq!(before.streak, 5);

    let reset = service.rate_task(task.id, Rating::Again, today).unwrap();
    assert_eq!(reset.streak, 0);
    assert_eq!(reset.interval_days, service.config().min_interval_days());
    assert_eq!(reset.due_date, today);
}

#[test]
fn list_due_is_exact_sorted_and_idempotent() {
    let service = service();
    let mut expected = Vec::new();
    for offset in [3_u64, 0, 5, 0, 9] {
        let task = service
            .create_task(&format!("task +{offset}"), None, plus(start(), offset))
            .unwrap();
        if offset <= 3 {
            expected.push(task);
        }
    }
    expected.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));

    let today = plus(start(), 3);
    let first = service.list_due_tasks(today).unwrap();
    let second = service.list_due_tasks(today).unwrap();
    assert_eq!(first, expected);
    assert_eq!(first, second);
    assert_eq!(service.list_tasks().unwrap().len(), 5);
}

#[test]
fn deleted_task_is_not_found_everywhere() {
    let service = service();
    let task = service.create_task("short lived", None, start()).unwrap();

    service.delete_task(task.id).unwrap();

    assert!(matches!(
        service.delete_task(task.id),
        Err(TaskServiceError::NotFound(id)) if id == task.id
    ));
    assert!(matches!(
        service.rate_task(task.id, Rating::Easy, start()),
        Err(TaskServiceError::NotFound(id)) if id == task.id
    ));
    assert!(matches!(
        service.get_task(task.id),
        Err(TaskServiceError::NotFound(_))
    ));
    assert!(service.list_due_tasks(start()).unwrap().is_empty());
}

#[test]
fn rate_unknown_id_is_not_found() {
    let service = service();
    let missing = Uuid::new_v4();
    assert!(matches!(
        service.rate_task(missing, Rating::Hard, start()),
        Err(TaskServiceError::NotFound(id)) if id == missing
    ));
}

#[test]
fn raw_ratings_accept_labels_and_codes() {
    let service = service();
    let task = service.create_task("raw", None, start()).unwrap();

    let rated = service.rate_task_raw(task.id, "HARD", start()).unwrap();
    assert_eq!(rated.streak, 1);
    let rated = service.rate_task_raw(task.id, "3", start()).unwrap();
    assert_eq!(rated.streak, 0);
    assert!(matches!(
        service.rate_task_raw(task.id, "4", start()),
        Err(TaskServiceError::InvalidRating(raw)) if raw == "4"
    ));
}

#[test]
fn custom_scheduler_config_is_honored() {
    let config = SchedulerConfig::new(2, 1.5, 3.0, 1000).unwrap();
    let service =
        TaskService::with_config(SqliteTaskStore::open_in_memory().unwrap(), config);
    let task = service.create_task("tuned", None, start()).unwrap();
    assert_eq!(task.interval_days, 2);

    let easy = service.rate_task(task.id, Rating::Easy, start()).unwrap();
    assert_eq!(easy.interval_days, 6);
    let again = service.rate_task(task.id, Rating::Again, start()).unwrap();
    assert_eq!(again.interval_days, 2);
}

#[test]
fn state_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite");

    let rated = {
        let service = TaskService::new(SqliteTaskStore::open(&path).unwrap());
        let task = service.create_task("persist me", None, start()).unwrap();
        service.rate_task(task.id, Rating::Easy, start()).unwrap()
    };

    let reopened = TaskService::new(SqliteTaskStore::open(&path).unwrap());
    assert_eq!(reopened.get_task(rated.id).unwrap(), rated);
    assert!(reopened.list_due_tasks(start()).unwrap().is_empty());
}

#[test]
fn concurrent_ratings_on_one_task_do_not_lose_updates() {
    const RATERS: u32 = 16;
    let service = Arc::new(service());
    let task = service.create_task("contended", None, start()).unwrap();

    let handles: Vec<_> = (0..RATERS)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service.rate_task(task.id, Rating::Hard, start()).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(service.get_task(task.id).unwrap().streak, RATERS);
}

#[test]
fn concurrent_ratings_on_different_tasks_all_apply() {
    let service = Arc::new(service());
    let ids: Vec<_> = (0..8)
        .map(|i| {
            service
                .create_task(&format!("parallel {i}"), None, start())
                .unwrap()
                .id
        })
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .copied()
        .map(|id| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..4 {
                    service.rate_task(id, Rating::Easy, start()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for id in ids {
        assert_eq!(service.get_task(id).unwrap().streak, 4);
    }
}
