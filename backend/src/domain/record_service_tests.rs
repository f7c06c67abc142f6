//! Tests for the record service and its create workflow.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::test_support::{FailurePlan, GatewayCall, InMemoryRecordGateway};

fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn request(name: &str) -> CreateRecordRequest {
    CreateRecordRequest::new(name, timestamp(), timestamp())
}

#[fixture]
fn gateway() -> Arc<InMemoryRecordGateway> {
    Arc::new(InMemoryRecordGateway::new())
}

fn service(
    kind: RecordKind,
    gateway: &Arc<InMemoryRecordGateway>,
) -> RecordService<InMemoryRecordGateway> {
    RecordService::new(kind, Arc::clone(gateway), Duration::from_secs(5))
}

#[rstest]
#[tokio::test]
async fn pupkin_is_created_once_then_rejected(gateway: Arc<InMemoryRecordGateway>) {
    let service = service(RecordKind::Employee, &gateway);

    let id = service
        .create_unique(request("Pupkin"))
        .await
        .expect("first create succeeds");
    let err = service
        .create_unique(request("Pupkin"))
        .await
        .expect_err("second create is rejected");

    assert_eq!(
        err,
        CreateRecordError::already_exists("employee with name Pupkin already exists")
    );
    let records = gateway.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].created_at, timestamp());
    assert_eq!(gateway.calls().last(), Some(&GatewayCall::Rollback));
}

#[rstest]
#[tokio::test]
async fn workflow_checks_before_inserting(gateway: Arc<InMemoryRecordGateway>) {
    service(RecordKind::Role, &gateway)
        .create_unique(request("admin"))
        .await
        .expect("create succeeds");

    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::Begin,
            GatewayCall::ExistsByName("admin".to_owned()),
            GatewayCall::Insert("admin".to_owned()),
            GatewayCall::Commit,
        ]
    );
}

#[rstest]
#[case(CreateRecordRequest::default())]
#[case(request("P"))]
#[case(CreateRecordRequest { created_at: None, ..request("Pupkin") })]
#[tokio::test]
async fn invalid_requests_touch_nothing(
    gateway: Arc<InMemoryRecordGateway>,
    #[case] invalid: CreateRecordRequest,
) {
    let err = service(RecordKind::Employee, &gateway)
        .create_unique(invalid)
        .await
        .expect_err("validation fails");

    assert!(matches!(err, CreateRecordError::RequestValidation { .. }));
    assert!(gateway.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn begin_failure_makes_no_statement_calls(gateway: Arc<InMemoryRecordGateway>) {
    gateway.set_failures(FailurePlan {
        begin: Some(RecordGatewayError::connection("pool timed out")),
        ..FailurePlan::default()
    });

    let err = service(RecordKind::Employee, &gateway)
        .create_unique(request("Pupkin"))
        .await
        .expect_err("begin fails");

    assert!(matches!(err, CreateRecordError::Transaction { .. }));
    assert_eq!(gateway.calls(), vec![GatewayCall::Begin]);
}

#[rstest]
#[tokio::test]
async fn existence_check_failure_is_a_db_operation_error(gateway: Arc<InMemoryRecordGateway>) {
    gateway.set_failures(FailurePlan {
        exists: Some(RecordGatewayError::query("timeout")),
        ..FailurePlan::default()
    });

    let err = service(RecordKind::Role, &gateway)
        .create_unique(request("admin"))
        .await
        .expect_err("check fails");

    assert_eq!(
        err,
        CreateRecordError::db_operation(
            "error finding role by name: admin, record gateway query failed: timeout"
        )
    );
    assert_eq!(gateway.calls().last(), Some(&GatewayCall::Rollback));
}

#[rstest]
#[tokio::test]
async fn insert_failure_leaves_no_row(gateway: Arc<InMemoryRecordGateway>) {
    gateway.set_failures(FailurePlan {
        insert: Some(RecordGatewayError::query("disk full")),
        ..FailurePlan::default()
    });

    let err = service(RecordKind::Employee, &gateway)
        .create_unique(request("Pupkin"))
        .await
        .expect_err("insert fails");

    assert!(matches!(err, CreateRecordError::DbOperation { .. }));
    assert!(err.to_string().starts_with("error creating employee Pupkin: "));
    assert!(gateway.records().is_empty());
    assert!(!gateway.calls().contains(&GatewayCall::Commit));
}

#[rstest]
#[tokio::test]
async fn unique_violation_on_insert_reports_already_exists(gateway: Arc<InMemoryRecordGateway>) {
    gateway.set_failures(FailurePlan {
        insert: Some(RecordGatewayError::unique_violation("employee_name_key")),
        ..FailurePlan::default()
    });

    let err = service(RecordKind::Employee, &gateway)
        .create_unique(request("Pupkin"))
        .await
        .expect_err("lost race");

    assert_eq!(
        err,
        CreateRecordError::already_exists("employee with name Pupkin already exists")
    );
}

#[rstest]
#[tokio::test]
async fn commit_failure_withholds_id(gateway: Arc<InMemoryRecordGateway>) {
    gateway.set_failures(FailurePlan {
        commit: Some(RecordGatewayError::transaction("connection lost")),
        ..FailurePlan::default()
    });

    let err = service(RecordKind::Employee, &gateway)
        .create_unique(request("Pupkin"))
        .await
        .expect_err("commit fails");

    assert!(matches!(err, CreateRecordError::Transaction { .. }));
    assert!(gateway.records().is_empty());
}

#[rstest]
#[tokio::test]
async fn delete_by_ids_then_list_all_is_empty(gateway: Arc<InMemoryRecordGateway>) {
    let first = gateway.seed("Pupkin", timestamp(), timestamp());
    let second = gateway.seed("Vasechkin", timestamp(), timestamp());
    let service = service(RecordKind::Employee, &gateway);

    service
        .delete_by_ids(vec![first, second])
        .await
        .expect("delete succeeds");

    assert!(service.list_all().await.expect("list succeeds").is_empty());
    assert!(
        gateway
            .calls()
            .contains(&GatewayCall::DeleteByIds(vec![first.get(), second.get()]))
    );
}

#[rstest]
#[case(vec![])]
#[case(vec![1])]
#[case(vec![1, 2, 3])]
#[case(vec![7, 8])]
#[tokio::test]
async fn find_by_ids_matches_individual_lookups(
    gateway: Arc<InMemoryRecordGateway>,
    #[case] raw_ids: Vec<i64>,
) {
    gateway.seed("Pupkin", timestamp(), timestamp());
    gateway.seed("Vasechkin", timestamp(), timestamp());
    gateway.seed("Ivanov", timestamp(), timestamp());
    let service = service(RecordKind::Employee, &gateway);
    let ids: Vec<RecordId> = raw_ids.into_iter().map(RecordId::new).collect();

    let batch = service
        .find_by_ids(ids.clone())
        .await
        .expect("batch lookup succeeds");

    let mut individual = Vec::new();
    for id in ids {
        if let Ok(record) = service.find_by_id(id).await {
            individual.push(record);
        }
    }
    assert_eq!(batch, individual);
}

#[rstest]
#[tokio::test]
async fn empty_batches_skip_the_gateway(gateway: Arc<InMemoryRecordGateway>) {
    let service = service(RecordKind::Role, &gateway);

    assert!(service.find_by_ids(Vec::new()).await.expect("lookup").is_empty());
    service.delete_by_ids(Vec::new()).await.expect("delete");

    assert!(gateway.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn unknown_id_is_not_found(gateway: Arc<InMemoryRecordGateway>) {
    let err = service(RecordKind::Role, &gateway)
        .find_by_id(RecordId::new(99))
        .await
        .expect_err("missing record");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "role with id 99 not found");
}

#[rstest]
#[tokio::test]
async fn deleting_unknown_id_succeeds(gateway: Arc<InMemoryRecordGateway>) {
    service(RecordKind::Employee, &gateway)
        .delete_by_id(RecordId::new(42))
        .await
        .expect("delete is a no-op");
}

#[rstest]
#[tokio::test]
async fn read_failures_are_internal_with_context(gateway: Arc<InMemoryRecordGateway>) {
    gateway.set_failures(FailurePlan {
        reads: Some(RecordGatewayError::query("database error")),
        ..FailurePlan::default()
    });
    let service = service(RecordKind::Employee, &gateway);

    let err = service.list_all().await.expect_err("list fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(
        err.message(),
        "error listing employees: record gateway query failed: database error"
    );

    let err = service
        .find_by_ids(vec![RecordId::new(1), RecordId::new(2)])
        .await
        .expect_err("batch fails");
    assert!(err.message().starts_with("error finding employees with ids 1,2: "));
}
