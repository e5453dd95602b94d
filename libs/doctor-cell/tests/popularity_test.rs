use std::sync::Arc;

use assert_matches::assert_matches;

use doctor_cell::{DoctorError, PopularityService};
use shared_database::{ClinicStore, InMemoryStore};
use shared_models::{AppointmentStatus, Doctor};
use shared_utils::test_utils::{test_appointment, test_doctor, utc, RecordingStore};

async fn seed_appointments(store: &InMemoryStore, doctor_id: i64, count: i64, first_id: i64) {
    for offset in 0..count {
        store
            .put_appointment(test_appointment(
                first_id + offset,
                100 + offset,
                doctor_id,
                utc(2024, 2, 1, 9, 0, 0),
                AppointmentStatus::Pending,
            ))
            .await;
    }
}

fn popularity_of(doctors: &[Doctor], id: i64) -> i32 {
    doctors
        .iter()
        .find(|doctor| doctor.id == id)
        .map(|doctor| doctor.popularity)
        .expect("doctor present")
}

#[tokio::test]
async fn test_recompute_single_doctor_experience_only() {
    let inner = Arc::new(InMemoryStore::new());
    inner.put_doctor(test_doctor(1, 10, Some(1), Some(10))).await;

    let service = PopularityService::new(inner.clone());
    let doctors = service.recompute_all().await.unwrap();

    assert_eq!(popularity_of(&doctors, 1), 60);
    assert_eq!(inner.find_doctor(1).await.unwrap().unwrap().popularity, 60);
}

#[tokio::test]
async fn test_recompute_single_doctor_consultations_only() {
    let inner = Arc::new(InMemoryStore::new());
    inner.put_doctor(test_doctor(1, 10, Some(1), None)).await;
    seed_appointments(&inner, 1, 5, 1).await;

    let service = PopularityService::new(inner.clone());
    let doctors = service.recompute_all().await.unwrap();

    assert_eq!(popularity_of(&doctors, 1), 40);
}

#[tokio::test]
async fn test_recompute_two_doctors_relative_scores() {
    let inner = Arc::new(InMemoryStore::new());
    inner.put_doctor(test_doctor(1, 10, Some(1), Some(10))).await;
    inner.put_doctor(test_doctor(2, 11, Some(1), Some(5))).await;
    seed_appointments(&inner, 1, 10, 1).await;
    seed_appointments(&inner, 2, 5, 100).await;

    let service = PopularityService::new(inner.clone());
    let doctors = service.recompute_all().await.unwrap();

    assert_eq!(popularity_of(&doctors, 1), 100);
    assert_eq!(popularity_of(&doctors, 2), 50);
}

#[tokio::test]
async fn test_recompute_empty_directory_writes_nothing() {
    let store = Arc::new(RecordingStore::new(Arc::new(InMemoryStore::new())));

    let service = PopularityService::new(store.clone());
    let doctors = service.recompute_all().await.unwrap();

    assert!(doctors.is_empty());
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_recompute_counts_each_doctor_once_and_writes_one_batch() {
    let inner = Arc::new(InMemoryStore::new());
    for id in 1..=4 {
        inner.put_doctor(test_doctor(id, id + 10, None, Some(id as u32))).await;
    }
    let store = Arc::new(RecordingStore::new(inner));

    let service = PopularityService::new(store.clone());
    service.recompute_all().await.unwrap();

    assert_eq!(store.count_calls(), 4);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_recompute_overwrites_unclamped_increment() {
    let inner = Arc::new(InMemoryStore::new());
    let mut doctor = test_doctor(1, 10, None, Some(10));
    doctor.popularity = 100;
    inner.put_doctor(doctor).await;

    let service = PopularityService::new(inner.clone());
    let bumped = service.increment_popularity(1).await.unwrap();
    assert_eq!(bumped.popularity, 101);

    let doctors = service.recompute_all().await.unwrap();
    assert_eq!(popularity_of(&doctors, 1), 60);
}

#[tokio::test]
async fn test_increment_adds_exactly_one() {
    let inner = Arc::new(InMemoryStore::new());
    let mut doctor = test_doctor(3, 10, None, None);
    doctor.popularity = 10;
    inner.put_doctor(doctor).await;

    let service = PopularityService::new(inner.clone());
    let updated = service.increment_popularity(3).await.unwrap();

    assert_eq!(updated.popularity, 11);
    assert_eq!(inner.find_doctor(3).await.unwrap().unwrap().popularity, 11);
}

#[tokio::test]
async fn test_increment_saturates_at_max() {
    let inner = Arc::new(InMemoryStore::new());
    let mut doctor = test_doctor(4, 10, None, None);
    doctor.popularity = i32::MAX;
    inner.put_doctor(doctor).await;

    let service = PopularityService::new(inner.clone());
    let updated = service.increment_popularity(4).await.unwrap();

    assert_eq!(updated.popularity, i32::MAX);
    assert_eq!(inner.find_doctor(4).await.unwrap().unwrap().popularity, i32::MAX);
}

#[tokio::test]
async fn test_increment_unknown_doctor_is_not_found() {
    let store = Arc::new(RecordingStore::new(Arc::new(InMemoryStore::new())));

    let service = PopularityService::new(store.clone());
    let result = service.increment_popularity(77).await;

    assert_matches!(result, Err(DoctorError::NotFound(77)));
    assert_eq!(store.writes(), 0);
}
