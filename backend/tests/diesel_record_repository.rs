//! Integration tests for `DieselRecordRepository` against embedded PostgreSQL.
//!
//! Covers the transactional create workflow end to end: uniqueness under
//! concurrent creates, rollback visibility and batch read/delete behaviour.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use idm::domain::ports::{
    ConnectionProbe, CreateRecordError, RecordCommand, RecordGateway, RecordQuery,
};
use idm::domain::{CreateRecordRequest, NewRecord, RecordId, RecordKind, RecordName, RecordService};
use idm::outbound::persistence::{
    DbPool, DieselConnectionProbe, DieselRecordRepository, PoolConfig,
};
use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::pg_embed::test_cluster;
use support::{SKIP_MARKER, handle_cluster_setup_failure, migrate_schema, reset_database};

const TEST_DB: &str = "diesel_record_repository_test";

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    pool: DbPool,
}

impl TestContext {
    fn repository(&self, kind: RecordKind) -> Arc<DieselRecordRepository> {
        Arc::new(DieselRecordRepository::new(self.pool.clone(), kind))
    }

    fn service(&self, kind: RecordKind) -> RecordService<DieselRecordRepository> {
        RecordService::new(kind, self.repository(kind), Duration::from_secs(5))
    }
}

fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn request(name: &str) -> CreateRecordRequest {
    CreateRecordRequest::new(name, timestamp(), timestamp())
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    reset_database(&cluster, TEST_DB)?;
    let database_url = cluster.connection().database_url(TEST_DB);
    migrate_schema(&database_url)?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        pool,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn created_record_round_trips(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("{SKIP_MARKER}: created_record_round_trips skipped");
        return;
    };
    let service = context.service(RecordKind::Employee);

    let id = context
        .runtime
        .block_on(service.create(request("Pupkin")))
        .expect("create employee");
    let record = context
        .runtime
        .block_on(service.find_by_id(id))
        .expect("find employee");

    assert_eq!(record.id, id);
    assert_eq!(record.name, "Pupkin");
    assert_eq!(record.created_at, timestamp());
    assert_eq!(record.updated_at, timestamp());
}

#[rstest]
fn duplicate_name_is_rejected(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("{SKIP_MARKER}: duplicate_name_is_rejected skipped");
        return;
    };
    let service = context.service(RecordKind::Employee);

    context
        .runtime
        .block_on(service.create(request("Pupkin")))
        .expect("first create");
    let err = context
        .runtime
        .block_on(service.create(request("Pupkin")))
        .expect_err("second create");

    assert_eq!(
        err,
        CreateRecordError::already_exists("employee with name Pupkin already exists")
    );
    let all = context
        .runtime
        .block_on(service.list_all())
        .expect("list employees");
    assert_eq!(all.len(), 1);
}

#[rstest]
fn concurrent_creates_leave_one_row(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("{SKIP_MARKER}: concurrent_creates_leave_one_row skipped");
        return;
    };
    let service = context.service(RecordKind::Employee);
    let (left, right) = (service.clone(), service.clone());

    let (first, second) = context.runtime.block_on(async move {
        let first = tokio::spawn(async move { left.create(request("Pupkin")).await });
        let second = tokio::spawn(async move { right.create(request("Pupkin")).await });
        (
            first.await.expect("join first"),
            second.await.expect("join second"),
        )
    });

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|outcome| matches!(
        outcome,
        Err(CreateRecordError::AlreadyExists { .. })
    )));

    let all = context
        .runtime
        .block_on(service.list_all())
        .expect("list employees");
    assert_eq!(all.len(), 1);
}

#[rstest]
fn rolled_back_insert_is_invisible(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("{SKIP_MARKER}: rolled_back_insert_is_invisible skipped");
        return;
    };
    let repository = context.repository(RecordKind::Role);
    let record = NewRecord {
        name: RecordName::parse("auditor").expect("valid name"),
        created_at: timestamp(),
        updated_at: timestamp(),
    };

    let id = context.runtime.block_on(async {
        let mut tx = repository.begin_transaction().await.expect("begin");
        let id = tx.insert(&record).await.expect("insert");
        tx.rollback().await.expect("rollback");
        id
    });

    let found = context
        .runtime
        .block_on(repository.find_by_id(id))
        .expect("find role");
    assert!(found.is_none());
    let exists = context.runtime.block_on(async {
        let mut tx = repository.begin_transaction().await.expect("begin");
        let exists = tx.exists_by_name(&record.name).await.expect("exists");
        tx.rollback().await.expect("rollback");
        exists
    });
    assert!(!exists);
}

#[rstest]
fn batch_operations_match_single_operations(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("{SKIP_MARKER}: batch_operations_match_single_operations skipped");
        return;
    };
    let service = context.service(RecordKind::Employee);
    let ids: Vec<RecordId> = ["Pupkin", "Ivanov", "Petrov"]
        .into_iter()
        .map(|name| {
            context
                .runtime
                .block_on(service.create(request(name)))
                .expect("create employee")
        })
        .collect();

    let batch = context
        .runtime
        .block_on(service.find_by_ids(ids.clone()))
        .expect("find batch");
    let singles: Vec<_> = ids
        .iter()
        .map(|id| {
            context
                .runtime
                .block_on(service.find_by_id(*id))
                .expect("find single")
        })
        .collect();
    assert_eq!(batch, singles);

    context
        .runtime
        .block_on(service.delete_by_ids(ids[..2].to_vec()))
        .expect("delete batch");
    let remaining = context
        .runtime
        .block_on(service.list_all())
        .expect("list employees");
    assert_eq!(
        remaining.iter().map(|record| record.id).collect::<Vec<_>>(),
        vec![ids[2]]
    );
}

#[rstest]
fn empty_batches_touch_nothing(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("{SKIP_MARKER}: empty_batches_touch_nothing skipped");
        return;
    };
    let repository = context.repository(RecordKind::Employee);

    let found = context
        .runtime
        .block_on(repository.find_by_ids(&[]))
        .expect("empty find");
    let deleted = context
        .runtime
        .block_on(repository.delete_by_ids(&[]))
        .expect("empty delete");

    assert!(found.is_empty());
    assert_eq!(deleted, 0);
}

#[rstest]
fn kinds_use_separate_tables(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("{SKIP_MARKER}: kinds_use_separate_tables skipped");
        return;
    };
    let employees = context.service(RecordKind::Employee);
    let roles = context.service(RecordKind::Role);

    context
        .runtime
        .block_on(employees.create(request("admin")))
        .expect("create employee");
    context
        .runtime
        .block_on(roles.create(request("admin")))
        .expect("create role with the same name");

    let role_names: Vec<String> = context
        .runtime
        .block_on(roles.list_all())
        .expect("list roles")
        .into_iter()
        .map(|record| record.name)
        .collect();
    assert_eq!(role_names, vec!["admin".to_owned()]);
}

#[rstest]
fn connection_probe_reaches_database(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("{SKIP_MARKER}: connection_probe_reaches_database skipped");
        return;
    };
    let probe = DieselConnectionProbe::new(context.pool.clone());

    context.runtime.block_on(probe.ping()).expect("ping");
}
