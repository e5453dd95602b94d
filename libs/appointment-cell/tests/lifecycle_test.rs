use std::sync::Arc;

use assert_matches::assert_matches;

use appointment_cell::{
    AppointmentDetails, AppointmentError, AppointmentLifecycleService, BookAppointmentRequest,
    TracingNotifier,
};
use doctor_cell::PopularityService;
use shared_database::{ClinicStore, InMemoryStore};
use shared_models::AppointmentStatus;
use shared_utils::test_utils::{test_doctor, test_user, utc, RecordingStore};

fn lifecycle(store: Arc<dyn ClinicStore>) -> AppointmentLifecycleService {
    let popularity = Arc::new(PopularityService::new(store.clone()));
    AppointmentLifecycleService::new(store, popularity, Arc::new(TracingNotifier))
}

async fn store_with_doctors() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.put_doctor(test_doctor(1, 10, Some(1), Some(12))).await;
    store.put_doctor(test_doctor(2, 11, Some(1), Some(3))).await;
    store.insert_user(test_user(40, "Grace", "Hopper", Some("grace@example.com"))).await;
    store
}

fn booking(patient_id: i64, doctor_id: i64) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id,
        doctor_id,
        appointment_date: utc(2024, 6, 3, 14, 0, 0),
        notes: None,
        cost: None,
    }
}

#[tokio::test]
async fn test_full_lifecycle_walk() {
    let store = store_with_doctors().await;
    let service = lifecycle(store.clone());

    let created = service.create(booking(40, 1)).await.unwrap();
    assert_eq!(created.status, AppointmentStatus::Pending);

    let confirmed = service.confirm(created.id).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let completed = service.complete(created.id).await.unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);
    assert_eq!(completed.created_at, created.created_at);
    assert!(completed.updated_at.unwrap() >= completed.created_at);

    let stored = store.find_appointment(created.id).await.unwrap().unwrap();
    assert_eq!(stored, completed);
}

#[tokio::test]
async fn test_reject_and_cancel_are_unconditional() {
    let store = store_with_doctors().await;
    let service = lifecycle(store.clone());

    let created = service.create(booking(40, 1)).await.unwrap();
    service.cancel(created.id).await.unwrap();
    let rejected = service.reject(created.id).await.unwrap();
    assert_eq!(rejected.status, AppointmentStatus::Rejected);

    let confirmed = service.confirm(created.id).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn test_each_booking_bumps_popularity_once() {
    let store = store_with_doctors().await;
    let service = lifecycle(store.clone());

    service.create(booking(40, 2)).await.unwrap();
    service.create(booking(41, 2)).await.unwrap();

    assert_eq!(store.find_doctor(2).await.unwrap().unwrap().popularity, 2);
    assert_eq!(store.find_doctor(1).await.unwrap().unwrap().popularity, 0);
}

#[tokio::test]
async fn test_booking_for_patient_without_profile_still_succeeds() {
    let store = store_with_doctors().await;
    let service = lifecycle(store.clone());

    let created = service.create(booking(999, 1)).await.unwrap();
    let cancelled = service.cancel(created.id).await.unwrap();

    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_update_replaces_every_field_including_cost() {
    let store = store_with_doctors().await;
    let service = lifecycle(store.clone());
    let mut request = booking(40, 1);
    request.notes = Some("Initial".to_string());
    request.cost = Some(80.0);
    let created = service.create(request).await.unwrap();

    let updated = service
        .update(
            created.id,
            AppointmentDetails {
                doctor_id: 2,
                appointment_date: utc(2024, 6, 4, 9, 0, 0),
                notes: None,
                status: AppointmentStatus::Confirmed,
                cost: Some(95.5),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.doctor_id, 2);
    assert_eq!(updated.appointment_date, utc(2024, 6, 4, 9, 0, 0));
    assert_eq!(updated.notes, None);
    assert_eq!(updated.status, AppointmentStatus::Confirmed);
    assert_eq!(updated.cost, Some(95.5));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn test_update_to_unknown_doctor_is_rejected() {
    let store = store_with_doctors().await;
    let service = lifecycle(store.clone());
    let created = service.create(booking(40, 1)).await.unwrap();

    let result = service
        .update(
            created.id,
            AppointmentDetails {
                doctor_id: 77,
                appointment_date: created.appointment_date,
                notes: None,
                status: AppointmentStatus::Pending,
                cost: None,
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::DoctorNotFound(77)));
    let stored = store.find_appointment(created.id).await.unwrap().unwrap();
    assert_eq!(stored.doctor_id, 1);
}

#[tokio::test]
async fn test_update_unknown_appointment_writes_nothing() {
    let recording = Arc::new(RecordingStore::new(store_with_doctors().await));
    let service = lifecycle(recording.clone());

    let result = service
        .update(
            55,
            AppointmentDetails {
                doctor_id: 1,
                appointment_date: utc(2024, 6, 4, 9, 0, 0),
                notes: None,
                status: AppointmentStatus::Pending,
                cost: None,
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::NotFound(55)));
    assert_eq!(recording.writes(), 0);
}

#[tokio::test]
async fn test_delete_is_idempotent_in_memory() {
    let store = store_with_doctors().await;
    let service = lifecycle(store.clone());
    let created = service.create(booking(40, 1)).await.unwrap();

    service.delete(created.id).await.unwrap();
    service.delete(created.id).await.unwrap();

    assert_matches!(
        service.confirm(created.id).await,
        Err(AppointmentError::NotFound(_))
    );
}
