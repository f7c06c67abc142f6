//! In-memory record gateway for workflow and HTTP tests.
//!
//! The gateway records every call it receives and can be told to fail or
//! panic at any step, which lets tests observe exactly which statements a
//! workflow issued and how the transaction was finalized.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{RecordGateway, RecordGatewayError, RecordTransaction};
use crate::domain::{NewRecord, Record, RecordId, RecordName};

/// One call observed by [`InMemoryRecordGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Begin,
    ExistsByName(String),
    Insert(String),
    Commit,
    Rollback,
    FindById(i64),
    FindByIds(Vec<i64>),
    ListAll,
    DeleteById(i64),
    DeleteByIds(Vec<i64>),
}

/// Failures to inject, by step.
#[derive(Debug, Clone, Default)]
pub struct FailurePlan {
    pub begin: Option<RecordGatewayError>,
    pub exists: Option<RecordGatewayError>,
    pub insert: Option<RecordGatewayError>,
    pub commit: Option<RecordGatewayError>,
    pub rollback: Option<RecordGatewayError>,
    /// Applies to every non-transactional call.
    pub reads: Option<RecordGatewayError>,
    pub panic_on_insert: bool,
    /// Sleep before inserting, to exceed a transaction deadline.
    pub insert_delay: Option<Duration>,
    /// Sleep before committing, with the staged rows still unapplied.
    pub commit_delay: Option<Duration>,
    pub rollback_delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct State {
    rows: BTreeMap<i64, Record>,
    next_id: i64,
    calls: Vec<GatewayCall>,
    failures: FailurePlan,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared in-memory store implementing [`RecordGateway`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordGateway {
    state: Arc<Mutex<State>>,
}

impl InMemoryRecordGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failures(failures: FailurePlan) -> Self {
        let gateway = Self::new();
        gateway.set_failures(failures);
        gateway
    }

    pub fn set_failures(&self, failures: FailurePlan) {
        lock(&self.state).failures = failures;
    }

    /// Store a committed record directly, bypassing call recording.
    pub fn seed(
        &self,
        name: &str,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> RecordId {
        let mut state = lock(&self.state);
        state.next_id += 1;
        let id = state.next_id;
        state.rows.insert(
            id,
            Record {
                id: RecordId::new(id),
                name: name.to_owned(),
                created_at,
                updated_at,
            },
        );
        RecordId::new(id)
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    /// Committed records ordered by id.
    pub fn records(&self) -> Vec<Record> {
        lock(&self.state).rows.values().cloned().collect()
    }

    fn record_call(&self, call: GatewayCall) -> Option<RecordGatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(call);
        state.failures.reads.clone()
    }
}

#[async_trait]
impl RecordGateway for InMemoryRecordGateway {
    async fn begin_transaction(&self) -> Result<Box<dyn RecordTransaction>, RecordGatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(GatewayCall::Begin);
        if let Some(err) = state.failures.begin.clone() {
            return Err(err);
        }
        Ok(Box::new(InMemoryTransaction {
            state: Arc::clone(&self.state),
            staged: Vec::new(),
        }))
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, RecordGatewayError> {
        if let Some(err) = self.record_call(GatewayCall::FindById(id.get())) {
            return Err(err);
        }
        Ok(lock(&self.state).rows.get(&id.get()).cloned())
    }

    async fn find_by_ids(&self, ids: &[RecordId]) -> Result<Vec<Record>, RecordGatewayError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        if let Some(err) = self.record_call(GatewayCall::FindByIds(raw.clone())) {
            return Err(err);
        }
        let state = lock(&self.state);
        Ok(state
            .rows
            .values()
            .filter(|record| raw.contains(&record.id.get()))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Record>, RecordGatewayError> {
        if let Some(err) = self.record_call(GatewayCall::ListAll) {
            return Err(err);
        }
        Ok(self.records())
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<u64, RecordGatewayError> {
        if let Some(err) = self.record_call(GatewayCall::DeleteById(id.get())) {
            return Err(err);
        }
        Ok(u64::from(lock(&self.state).rows.remove(&id.get()).is_some()))
    }

    async fn delete_by_ids(&self, ids: &[RecordId]) -> Result<u64, RecordGatewayError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        if let Some(err) = self.record_call(GatewayCall::DeleteByIds(raw.clone())) {
            return Err(err);
        }
        let mut state = lock(&self.state);
        let before = state.rows.len();
        state.rows.retain(|id, _| !raw.contains(id));
        Ok((before - state.rows.len()) as u64)
    }
}

/// Transaction over [`InMemoryRecordGateway`]; inserts become visible to
/// other callers only on commit.
struct InMemoryTransaction {
    state: Arc<Mutex<State>>,
    staged: Vec<Record>,
}

impl InMemoryTransaction {
    fn name_taken(&self, state: &State, name: &str) -> bool {
        state.rows.values().any(|record| record.name == name)
            || self.staged.iter().any(|record| record.name == name)
    }
}

#[async_trait]
impl RecordTransaction for InMemoryTransaction {
    async fn exists_by_name(&mut self, name: &RecordName) -> Result<bool, RecordGatewayError> {
        let mut state = lock(&self.state);
        state.calls.push(GatewayCall::ExistsByName(name.to_string()));
        if let Some(err) = state.failures.exists.clone() {
            return Err(err);
        }
        Ok(self.name_taken(&state, name.as_str()))
    }

    async fn insert(&mut self, record: &NewRecord) -> Result<RecordId, RecordGatewayError> {
        let (failure, panic_on_insert, delay) = {
            let mut state = lock(&self.state);
            state.calls.push(GatewayCall::Insert(record.name.to_string()));
            (
                state.failures.insert.clone(),
                state.failures.panic_on_insert,
                state.failures.insert_delay,
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if panic_on_insert {
            panic!("insert exploded");
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let mut state = lock(&self.state);
        if self.name_taken(&state, record.name.as_str()) {
            return Err(RecordGatewayError::unique_violation(format!(
                "duplicate name {}",
                record.name
            )));
        }
        state.next_id += 1;
        let id = state.next_id;
        self.staged.push(Record {
            id: RecordId::new(id),
            name: record.name.to_string(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        });
        Ok(RecordId::new(id))
    }

    async fn commit(self: Box<Self>) -> Result<(), RecordGatewayError> {
        let Self { state, staged } = *self;
        let delay = {
            let mut state = lock(&state);
            state.calls.push(GatewayCall::Commit);
            state.failures.commit_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = lock(&state);
        if let Some(err) = state.failures.commit.clone() {
            return Err(err);
        }
        for record in staged {
            state.rows.insert(record.id.get(), record);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RecordGatewayError> {
        let (failure, delay) = {
            let mut state = lock(&self.state);
            state.calls.push(GatewayCall::Rollback);
            (
                state.failures.rollback.clone(),
                state.failures.rollback_delay,
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
