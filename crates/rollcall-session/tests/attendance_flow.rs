//! End-to-end attendance flow over the full pipeline: mock capture source,
//! enrollment and verification coordinators, in-memory template store, and
//! the SQLite-backed session service.

use chrono::{NaiveDate, Utc};
use rollcall_biometric::enroll::{EnrollmentConfig, EnrollmentCoordinator};
use rollcall_biometric::memory::MemoryTemplateStore;
use rollcall_biometric::store::TemplateStore;
use rollcall_biometric::verify::{VerificationCoordinator, VerificationError};
use rollcall_capture::adapter::{CaptureAdapter, CaptureConfig};
use rollcall_capture::mock::{MockModality, MockModalityHandle};
use rollcall_core::{CourseId, SessionStatus, StudentId, VerificationMethod};
use rollcall_session::{SessionError, SessionSchedule, SessionService};
use rollcall_storage::Database;
use rollcall_storage::repositories::{SqliteAttendanceRepository, SqliteSessionRepository};
use std::time::Duration;

struct Harness {
    adapter: CaptureAdapter<MockModality>,
    scanner: MockModalityHandle,
    templates: MemoryTemplateStore,
    service: SessionService<SqliteSessionRepository, SqliteAttendanceRepository>,
}

async fn harness() -> Harness {
    let (modality, scanner) = MockModality::new();
    let adapter = CaptureAdapter::new(modality, CaptureConfig::default());
    let templates = MemoryTemplateStore::new();
    let db = Database::in_memory().await.expect("in-memory database");
    let service = SessionService::sqlite(&db);

    Harness {
        adapter,
        scanner,
        templates,
        service,
    }
}

async fn enroll(harness: &Harness, student: &StudentId, template: &str) {
    // One-sample run keeps the test fast; best-of-N is covered in unit tests
    harness.scanner.queue_sample(template, 90).await.unwrap();
    EnrollmentCoordinator::new(
        EnrollmentConfig::default()
            .required_samples(1)
            .settle_delay(Duration::ZERO),
    )
    .enroll(&harness.adapter, &harness.templates, student)
    .await
    .expect("enrollment");
}

#[tokio::test]
async fn full_session_scenario() {
    let h = harness().await;
    let course = CourseId::new("CS-101").unwrap();
    let student_a = StudentId::new("S-A").unwrap();
    let student_b = StudentId::new("S-B").unwrap();
    let student_c = StudentId::new("S-C").unwrap();

    // Teacher opens session S for course C
    let session = h
        .service
        .open(
            &course,
            "Scenario session",
            SessionSchedule::starting(
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                Utc::now(),
            ),
            false,
        )
        .await
        .unwrap();
    assert_eq!(session.status(), Some(SessionStatus::Open));

    // Student A is enrolled and verifies at confidence 82
    enroll(&h, &student_a, "template-a").await;
    h.templates.set_match_confidence(82.0);
    h.scanner.queue_sample("template-a", 85).await.unwrap();

    let outcome = VerificationCoordinator::default()
        .verify(&h.adapter, &h.templates, &student_a)
        .await
        .unwrap();
    assert!(outcome.matched);

    let record = h
        .service
        .mark_present(
            &session.id,
            &student_a,
            VerificationMethod::Biometric,
            Some(outcome.confidence.value()),
        )
        .await
        .unwrap();
    assert_eq!(record.method, "BIOMETRIC");
    assert_eq!(record.status, "PRESENT");
    assert_eq!(record.confidence, Some(82.0));

    // Student B is not enrolled: verification is refused, manual path used
    let error = VerificationCoordinator::default()
        .verify(&h.adapter, &h.templates, &student_b)
        .await
        .unwrap_err();
    assert!(matches!(error, VerificationError::NotEnrolled { .. }));

    let record = h
        .service
        .mark_present(&session.id, &student_b, VerificationMethod::Manual, None)
        .await
        .unwrap();
    assert_eq!(record.method, "MANUAL");
    assert!(record.confidence.is_none());

    // Closing S, then marking student C, fails with the session gate
    h.service.close(&session.id).await.unwrap();
    let error = h
        .service
        .mark_present(&session.id, &student_c, VerificationMethod::Manual, None)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        SessionError::NotOpen {
            status: SessionStatus::Closed
        }
    ));

    // Exactly two records: A and B, once each
    let records = h.service.records_of(&session.id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(h.service.present_count(&session.id).await.unwrap(), 2);
}

#[tokio::test]
async fn biometric_mark_survives_duplicate_submission() {
    let h = harness().await;
    let course = CourseId::new("CS-101").unwrap();
    let student = StudentId::new("S-A").unwrap();

    let session = h
        .service
        .open(
            &course,
            "Duplicate submission",
            SessionSchedule::starting(
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
                Utc::now(),
            ),
            false,
        )
        .await
        .unwrap();

    enroll(&h, &student, "template-a").await;
    h.templates.set_match_confidence(91.5);
    h.scanner.queue_sample("template-a", 85).await.unwrap();

    let outcome = VerificationCoordinator::default()
        .verify(&h.adapter, &h.templates, &student)
        .await
        .unwrap();
    assert!(outcome.matched);

    // The UI submits the same successful verification twice (retried request)
    let confidence = Some(outcome.confidence.value());
    h.service
        .mark_present(&session.id, &student, VerificationMethod::Biometric, confidence)
        .await
        .unwrap();
    let error = h
        .service
        .mark_present(&session.id, &student, VerificationMethod::Biometric, confidence)
        .await
        .unwrap_err();

    assert!(matches!(error, SessionError::AlreadyMarked { .. }));
    assert_eq!(h.service.records_of(&session.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unenrolled_student_can_reenroll_after_removal() {
    let h = harness().await;
    let student = StudentId::new("S-A").unwrap();

    enroll(&h, &student, "template-old").await;
    assert!(h.templates.enrollment(&student).await.unwrap().enrolled);

    h.templates.remove(&student).await.unwrap();
    assert!(!h.templates.enrollment(&student).await.unwrap().enrolled);

    enroll(&h, &student, "template-new").await;
    let stored = h.templates.template_for(&student).unwrap();
    assert_eq!(stored.envelope.template, "template-new");
}
