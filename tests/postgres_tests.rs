// tests/postgres_tests.rs
//
// Exercises PgRepository against a real database. Skipped unless
// DATABASE_URL points at a PostgreSQL instance.

use sqlx::postgres::PgPoolOptions;
use study_planner::{
    error::AppError,
    models::{
        quiz::QuizAttempt,
        schedule::{CreateScheduleRequest, ScheduleStatus},
        user::NewUser,
    },
    repository::{PgRepository, Repository},
    services::progression::{self, Advance},
};

async fn repository() -> Option<PgRepository> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    let repo = PgRepository::new(pool);
    repo.migrate().await.expect("Failed to migrate database");
    Some(repo)
}

fn new_user() -> NewUser {
    NewUser {
        username: "Pg Tester".to_string(),
        email: format!("pg_{}@example.com", uuid::Uuid::new_v4()),
        password_hash: "hash".to_string(),
    }
}

#[tokio::test]
async fn pg_duplicate_email_is_conflict() {
    let Some(repo) = repository().await else {
        return;
    };

    let user = new_user();
    repo.create_user(user.clone()).await.unwrap();
    let err = repo.create_user(user).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn pg_schedule_lifecycle() {
    let Some(repo) = repository().await else {
        return;
    };

    let user = repo.create_user(new_user()).await.unwrap();
    let (schedule, topics) = progression::create_schedule(
        &repo,
        user.user_id,
        CreateScheduleRequest {
            title: "Algebra".to_string(),
            topics: vec!["Linear Equations".to_string(), "Quadratics".to_string()],
        },
    )
    .await
    .unwrap();

    assert_eq!(schedule.seq_number, 1);
    assert_eq!(schedule.utid, format!("{}-1", user.user_id));
    assert_eq!(
        topics.iter().map(|t| t.seq_number).collect::<Vec<_>>(),
        vec![1, 2]
    );

    let (second, _) = progression::create_schedule(
        &repo,
        user.user_id,
        CreateScheduleRequest {
            title: "Geometry".to_string(),
            topics: vec!["Angles".to_string()],
        },
    )
    .await
    .unwrap();
    assert_eq!(second.seq_number, 2);

    let utid = schedule.utid.as_str();
    assert!(repo.set_topic_content(utid, 1, "explained").await.unwrap());
    progression::mark_topic_complete(&repo, utid, 1).await.unwrap();
    progression::record_quiz_score(&repo, utid, 2, 3).await.unwrap();

    match progression::advance_schedule(&repo, utid).await.unwrap() {
        Advance::Next(topic) => assert_eq!(topic.title, "Quadratics"),
        other => panic!("unexpected {:?}", other),
    }

    progression::mark_topic_complete(&repo, utid, 2).await.unwrap();
    assert!(matches!(
        progression::advance_schedule(&repo, utid).await.unwrap(),
        Advance::AllCovered { result: 3 }
    ));

    let stored = repo.find_schedule(utid).await.unwrap().unwrap();
    assert_eq!(stored.status, ScheduleStatus::Completed);
    assert_eq!(stored.result, Some(3));

    let topic = repo.find_topic(utid, 1).await.unwrap().unwrap();
    assert_eq!(topic.content.as_deref(), Some("explained"));
    assert!(!repo.set_topic_score(utid, 99, 1).await.unwrap());
}

#[tokio::test]
async fn pg_failed_topic_insert_rolls_back_schedule() {
    let Some(repo) = repository().await else {
        return;
    };

    let user = repo.create_user(new_user()).await.unwrap();
    let too_long = "x".repeat(501);
    let result = repo
        .create_schedule(user.user_id, "Broken", &["fine".to_string(), too_long])
        .await;
    assert!(result.is_err());
    assert!(repo.list_schedules(user.user_id).await.unwrap().is_empty());

    let (schedule, topics) = repo
        .create_schedule(user.user_id, "Working", &["fine".to_string()])
        .await
        .unwrap();
    assert_eq!(schedule.seq_number, 1);
    assert_eq!(topics.len(), 1);
}

#[tokio::test]
async fn pg_concurrent_creates_get_distinct_numbers() {
    let Some(repo) = repository().await else {
        return;
    };

    let user = repo.create_user(new_user()).await.unwrap();
    let topics = vec!["a".to_string()];
    let (first, second) = tokio::join!(
        repo.create_schedule(user.user_id, "One", &topics),
        repo.create_schedule(user.user_id, "Two", &topics),
    );

    let mut seqs = vec![first.unwrap().0.seq_number, second.unwrap().0.seq_number];
    seqs.sort_unstable();
    assert_eq!(seqs, vec![1, 2]);
}

#[tokio::test]
async fn pg_quiz_attempt_is_taken_once() {
    let Some(repo) = repository().await else {
        return;
    };

    let user = repo.create_user(new_user()).await.unwrap();
    let (schedule, _) = repo
        .create_schedule(user.user_id, "Quiz", &["Water".to_string()])
        .await
        .unwrap();

    let attempt = QuizAttempt {
        id: uuid::Uuid::new_v4(),
        utid: schedule.utid.clone(),
        seq_number: 1,
        questions: vec!["Ice floats.".to_string()],
        answers: vec!["True".to_string()],
    };
    repo.save_quiz_attempt(&attempt).await.unwrap();

    assert_eq!(repo.take_quiz_attempt(attempt.id).await.unwrap(), Some(attempt.clone()));
    assert_eq!(repo.take_quiz_attempt(attempt.id).await.unwrap(), None);
}
