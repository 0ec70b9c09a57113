//! Service-level properties: uniqueness, average bookkeeping, ordering and round trips.

use teacher_reviews::domain::model::{today_review_date, ReviewSummary};
use teacher_reviews::{NewReview, NewTeacher, ReviewService, ServiceError, Store};

async fn service() -> ReviewService {
    let store = Store::in_memory().await.expect("open in-memory store");
    store.init_schema().await.expect("init schema");
    ReviewService::new(store)
}

fn teacher(name: &str, rating: i64) -> NewTeacher {
    NewTeacher::new(name, "Some subject", rating, "First impression").unwrap()
}

#[tokio::test]
async fn schema_init_twice_is_harmless() {
    let svc = service().await;
    svc.store().init_schema().await.unwrap();
    svc.create_teacher(teacher("Ms. Alpha", 5)).await.unwrap();
    svc.store().init_schema().await.unwrap();
    assert_eq!(svc.list_teachers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let svc = service().await;
    assert!(svc.list_teachers().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_names_are_rejected_in_any_case() {
    let svc = service().await;
    let created = svc.create_teacher(teacher("Ms. Alpha", 5)).await.unwrap();

    for variant in ["Ms. Alpha", "ms. alpha", "MS. ALPHA", "mS. aLpHa"] {
        let err = svc.create_teacher(teacher(variant, 1)).await.unwrap_err();
        match err {
            ServiceError::DuplicateTeacher { teacher_id } => assert_eq!(teacher_id, created.id),
            other => panic!("expected DuplicateTeacher for {variant:?}, got {other:?}"),
        }
    }

    assert_eq!(svc.store().count_teachers().await.unwrap(), 1);
    let listed = svc.list_teachers().await.unwrap();
    assert_eq!(listed[0].avg_rating, 5.0);
    assert_eq!(listed[0].review_count, 1);
}

#[tokio::test]
async fn average_tracks_every_review() {
    let svc = service().await;
    let ratings = [4_i64, 1, 5, 5, 2, 3];

    let created = svc.create_teacher(teacher("Mr. Beta", ratings[0])).await.unwrap();
    assert_eq!(created.avg_rating, ratings[0] as f64);

    for n in 2..=ratings.len() {
        let added = svc
            .add_review(created.id, NewReview::new(ratings[n - 1], "another").unwrap())
            .await
            .unwrap();
        let expected = ratings[..n].iter().sum::<i64>() as f64 / n as f64;
        assert!(added.success);
        assert!((added.new_avg - expected).abs() < 1e-9, "after {n} reviews");

        let listed = svc.list_teachers().await.unwrap();
        assert!((listed[0].avg_rating - expected).abs() < 1e-9);
        assert_eq!(listed[0].review_count, n);
    }
}

#[tokio::test]
async fn listing_is_ordered_by_average_descending() {
    let svc = service().await;
    svc.create_teacher(teacher("Two", 2)).await.unwrap();
    let four_and_half = svc.create_teacher(teacher("FourAndHalf", 5)).await.unwrap();
    svc.add_review(four_and_half.id, NewReview::new(4, "solid").unwrap())
        .await
        .unwrap();
    svc.create_teacher(teacher("Three", 3)).await.unwrap();

    let averages: Vec<f64> = svc
        .list_teachers()
        .await
        .unwrap()
        .iter()
        .map(|t| t.avg_rating)
        .collect();
    assert_eq!(averages, vec![4.5, 3.0, 2.0]);
}

#[tokio::test]
async fn create_then_list_round_trip() {
    let svc = service().await;
    let created = svc
        .create_teacher(NewTeacher::new("Ms. Alpha", "Math", 5, "Great teacher").unwrap())
        .await
        .unwrap();

    let listed = svc.list_teachers().await.unwrap();
    assert_eq!(listed.len(), 1);
    let t = &listed[0];
    assert_eq!(t.id, created.id);
    assert_eq!(t.name, "Ms. Alpha");
    assert_eq!(t.description, "Math");
    assert_eq!(t.avg_rating, 5.0);
    assert_eq!(t.review_count, 1);
    assert_eq!(
        t.reviews,
        vec![ReviewSummary {
            rating: 5,
            reason: "Great teacher".to_string(),
            date: today_review_date(),
        }]
    );
    assert_eq!(created.reviews, t.reviews);
}

#[tokio::test]
async fn add_review_end_to_end() {
    let svc = service().await;
    let created = svc
        .create_teacher(NewTeacher::new("Ms. Alpha", "Math", 5, "Great teacher").unwrap())
        .await
        .unwrap();

    let added = svc
        .add_review(created.id, NewReview::new(3, "So-so").unwrap())
        .await
        .unwrap();
    assert!(added.success);
    assert_eq!(added.new_avg, 4.0);

    let listed = svc.list_teachers().await.unwrap();
    assert_eq!(listed[0].avg_rating, 4.0);
    assert_eq!(listed[0].review_count, 2);
    assert_eq!(listed[0].reviews[1].reason, "So-so");
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reopen.db");
    let url = format!("sqlite://{}", path.display());

    {
        let store = Store::connect(&url).await.unwrap();
        store.init_schema().await.unwrap();
        let svc = ReviewService::new(store.clone());
        svc.create_teacher(teacher("Dr. Persist", 4)).await.unwrap();
        store.close().await;
    }

    let store = Store::connect(&url).await.unwrap();
    store.init_schema().await.unwrap();
    let svc = ReviewService::new(store.clone());
    let listed = svc.list_teachers().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Dr. Persist");
    store.close().await;
}

async fn file_service(dir: &tempfile::TempDir) -> ReviewService {
    let url = format!("sqlite://{}", dir.path().join("concurrent.db").display());
    let store = Store::connect(&url).await.expect("open file store");
    store.init_schema().await.expect("init schema");
    ReviewService::new(store)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reviews_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let svc = file_service(&dir).await;
    let created = svc.create_teacher(teacher("Ms. Busy", 5)).await.unwrap();

    let n = 20;
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let svc = svc.clone();
            tokio::spawn(async move {
                svc.add_review(created.id, NewReview::new(3, "queued").unwrap())
                    .await
            })
        })
        .collect();
    for handle in handles {
        let added = handle.await.unwrap().expect("every concurrent review succeeds");
        assert!(added.success);
    }

    let listed = svc.list_teachers().await.unwrap();
    assert_eq!(listed[0].review_count, n + 1);
    let expected = (5.0 + 3.0 * n as f64) / (n + 1) as f64;
    assert!((listed[0].avg_rating - expected).abs() < 1e-9);
    svc.store().close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_with_distinct_names_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let svc = file_service(&dir).await;

    let n = 20;
    let handles: Vec<_> = (0..n)
        .map(|i| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.create_teacher(teacher(&format!("T{i}"), 4)).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().expect("every concurrent create succeeds");
    }

    assert_eq!(svc.store().count_teachers().await.unwrap(), n);
    assert_eq!(svc.store().count_reviews().await.unwrap(), n);
    svc.store().close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_case_variants_create_exactly_one_teacher() {
    let dir = tempfile::tempdir().unwrap();
    let svc = file_service(&dir).await;

    let variants = ["Mr. Race", "mr. race", "MR. RACE", "Mr. RACE", "mR. rAcE", "mr. Race"];
    let handles: Vec<_> = variants
        .iter()
        .map(|name| {
            let svc = svc.clone();
            let name = name.to_string();
            tokio::spawn(async move { svc.create_teacher(teacher(&name, 3)).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut duplicate_ids = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(created) => winners.push(created.id),
            Err(ServiceError::DuplicateTeacher { teacher_id }) => duplicate_ids.push(teacher_id),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(duplicate_ids.len(), variants.len() - 1);
    assert!(duplicate_ids.iter().all(|id| *id == winners[0]));
    assert_eq!(svc.store().count_teachers().await.unwrap(), 1);
    assert_eq!(svc.store().count_reviews().await.unwrap(), 1);
    svc.store().close().await;
}
