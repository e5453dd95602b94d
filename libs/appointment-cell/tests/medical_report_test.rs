use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;

use appointment_cell::{
    CreateMedicalReportRequest, MedicalReportError, MedicalReportService,
    UpdateMedicalReportRequest,
};
use shared_database::{ClinicStore, InMemoryStore};
use shared_models::error::AppError;
use shared_models::{AppointmentStatus, NewMedicalReport, Prescription};
use shared_utils::test_utils::{test_appointment, utc};

async fn service_with_appointments() -> MedicalReportService {
    let store = Arc::new(InMemoryStore::new());
    store
        .put_appointment(test_appointment(1, 100, 10, utc(2024, 4, 1, 9, 0, 0), AppointmentStatus::Completed))
        .await;
    store
        .put_appointment(test_appointment(2, 100, 11, utc(2024, 4, 2, 9, 0, 0), AppointmentStatus::Completed))
        .await;
    store
        .put_appointment(test_appointment(3, 200, 10, utc(2024, 4, 3, 9, 0, 0), AppointmentStatus::Completed))
        .await;
    MedicalReportService::new(store)
}

fn report_for(appointment_id: i64, diagnosis: &str) -> CreateMedicalReportRequest {
    CreateMedicalReportRequest {
        appointment_id,
        diagnosis: diagnosis.to_string(),
        symptoms: Some("Cough".to_string()),
        physical_examination: None,
        investigations: None,
        prescriptions: vec![Prescription {
            medication: "Amoxicillin".to_string(),
            dosage: Some("500mg".to_string()),
            frequency: Some("3x daily".to_string()),
            duration: Some("7 days".to_string()),
        }],
        recommendations: None,
        follow_up_date: NaiveDate::from_ymd_opt(2024, 4, 15),
        additional_notes: None,
    }
}

#[tokio::test]
async fn test_create_and_fetch_by_appointment() {
    let service = service_with_appointments().await;

    let created = service.create(report_for(1, "Bronchitis")).await.unwrap();
    assert_eq!(created.prescriptions.len(), 1);

    let found = service.get_by_appointment(1).await.unwrap();
    assert_eq!(found, Some(created));
    assert_eq!(service.get_by_appointment(2).await.unwrap(), None);
}

#[tokio::test]
async fn test_one_report_per_appointment() {
    let service = service_with_appointments().await;
    service.create(report_for(1, "Bronchitis")).await.unwrap();

    let second = service.create(report_for(1, "Asthma")).await;

    assert_matches!(second, Err(MedicalReportError::AlreadyExists(1)));
    let err = AppError::from(MedicalReportError::AlreadyExists(1));
    assert_matches!(err, AppError::Conflict(_));
}

#[tokio::test]
async fn test_duplicate_reports_resolve_to_latest() {
    let store = Arc::new(InMemoryStore::new());
    store
        .put_appointment(test_appointment(1, 100, 10, utc(2024, 4, 1, 9, 0, 0), AppointmentStatus::Completed))
        .await;

    // two creates that both passed the uniqueness lookup before either inserted
    for diagnosis in ["Bronchitis", "Asthma"] {
        store
            .insert_medical_report(NewMedicalReport {
                appointment_id: 1,
                diagnosis: diagnosis.to_string(),
                symptoms: None,
                physical_examination: None,
                investigations: None,
                prescriptions: Vec::new(),
                recommendations: None,
                follow_up_date: None,
                additional_notes: None,
                created_date: utc(2024, 4, 1, 10, 0, 0),
            })
            .await
            .unwrap();
    }

    let service = MedicalReportService::new(store);
    let found = service.get_by_appointment(1).await.unwrap().unwrap();

    assert_eq!(found.diagnosis, "Asthma");
    assert_matches!(
        service.create(report_for(1, "Pneumonia")).await,
        Err(MedicalReportError::AlreadyExists(1))
    );
}

#[tokio::test]
async fn test_missing_appointment_and_blank_diagnosis() {
    let service = service_with_appointments().await;

    assert_matches!(
        service.create(report_for(9, "Flu")).await,
        Err(MedicalReportError::AppointmentNotFound(9))
    );
    assert_matches!(
        service.create(report_for(1, "   ")).await,
        Err(MedicalReportError::ValidationError(_))
    );
    assert_matches!(
        service.get_by_appointment(9).await,
        Err(MedicalReportError::AppointmentNotFound(9))
    );
}

#[tokio::test]
async fn test_patient_and_doctor_listings_join_through_appointments() {
    let service = service_with_appointments().await;
    let first = service.create(report_for(1, "Bronchitis")).await.unwrap();
    let second = service.create(report_for(2, "Migraine")).await.unwrap();
    let third = service.create(report_for(3, "Sprain")).await.unwrap();

    let for_patient: Vec<i64> = service
        .list_by_patient(100)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(for_patient.len(), 2);
    assert!(for_patient.contains(&first.id) && for_patient.contains(&second.id));

    let for_doctor: Vec<i64> = service
        .list_by_doctor(10)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(for_doctor.len(), 2);
    assert!(for_doctor.contains(&first.id) && for_doctor.contains(&third.id));

    assert!(service.list_by_patient(999).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_keeps_prescriptions_unless_given() {
    let service = service_with_appointments().await;
    let created = service.create(report_for(1, "Bronchitis")).await.unwrap();

    let mut request = UpdateMedicalReportRequest {
        diagnosis: "Acute bronchitis".to_string(),
        symptoms: None,
        physical_examination: Some("Wheezing".to_string()),
        investigations: None,
        prescriptions: None,
        recommendations: Some("Rest".to_string()),
        follow_up_date: None,
        additional_notes: None,
    };
    let updated = service.update(created.id, request.clone()).await.unwrap();
    assert_eq!(updated.diagnosis, "Acute bronchitis");
    assert_eq!(updated.symptoms, None);
    assert_eq!(updated.prescriptions, created.prescriptions);
    assert_eq!(updated.created_date, created.created_date);

    request.prescriptions = Some(Vec::new());
    let cleared = service.update(created.id, request).await.unwrap();
    assert!(cleared.prescriptions.is_empty());
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let service = service_with_appointments().await;
    let created = service.create(report_for(1, "Bronchitis")).await.unwrap();

    service.delete(created.id).await.unwrap();

    assert_matches!(service.get(created.id).await, Err(MedicalReportError::NotFound(_)));
    assert!(service.list_all().await.unwrap().is_empty());
}
