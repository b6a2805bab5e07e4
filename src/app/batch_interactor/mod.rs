// Batch interactor - Sequences ordered tasks and runs batch groups
//
// Parallel groups fan out to a bounded worker pool. Each worker owns exactly
// one result slot and handles are awaited in declaration order, so slot order
// never depends on completion order.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::Semaphore;
use tracing::{error, info, info_span, Instrument};

use crate::app::task_interactor::TaskInteractor;
use crate::domain::errors::OrchestratorError;
use crate::domain::model::*;
use crate::domain::rules::OutcomePolicy;

const SKIP_REASON: &str = "an earlier task failed and fail-fast is enabled";

/// Shared state of one run, possibly spanning several stages
#[derive(Clone, Default)]
struct RunContext {
    aborted: Arc<AtomicBool>,
}

impl RunContext {
    fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Record a finished slot; under fail-fast a failure aborts the run
    fn observe(&self, result: &ProcessResult, policy: OutcomePolicy) {
        if !result.success && policy.stops_on_failure() {
            self.aborted.store(true, Ordering::SeqCst);
        }
    }

    fn final_state(&self) -> RunState {
        if self.is_aborted() {
            RunState::Aborted
        } else {
            RunState::Completed
        }
    }
}

/// Runs task lists and batch groups, aggregating one result per task
pub struct TaskOrchestrator {
    interactor: Arc<TaskInteractor>,
    workers: usize,
    policy: OutcomePolicy,
    state: Mutex<RunState>,
}

impl TaskOrchestrator {
    /// Create an orchestrator with a worker pool of `workers` slots
    pub fn new(
        interactor: Arc<TaskInteractor>,
        workers: usize,
        policy: OutcomePolicy,
    ) -> Result<Self, OrchestratorError> {
        if workers == 0 {
            return Err(OrchestratorError::InvalidPoolSize(workers));
        }
        Ok(Self {
            interactor,
            workers,
            policy,
            state: Mutex::new(RunState::Idle),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn policy(&self) -> OutcomePolicy {
        self.policy
    }

    /// State of the most recent run
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = state;
    }

    /// Run ordered tasks sequentially in ascending `order`; ties keep
    /// declaration order. Slots follow execution order.
    pub async fn run_ordered(
        &self,
        tasks: &[OrderedTask],
    ) -> Result<BatchResult, OrchestratorError> {
        self.run_stages(|ctx| async move {
            Ok::<_, OrchestratorError>(self.ordered_stage(tasks, &ctx).await)
        })
        .await
    }

    /// Run one batch group, in parallel or in list order
    pub async fn run_group(&self, group: &BatchGroup) -> Result<BatchResult, OrchestratorError> {
        self.run_stages(|ctx| async move { self.group_stage(0, group, &ctx).await })
            .await
    }

    /// Run a whole document: ordered tasks first, then each group in
    /// declaration order
    pub async fn run_document(
        &self,
        document: &TaskDocument,
    ) -> Result<BatchResult, OrchestratorError> {
        self.run_stages(|ctx| async move {
            let mut per_task = self.ordered_stage(&document.ordered, &ctx).await;
            for (index, group) in document.groups.iter().enumerate() {
                per_task.extend(self.group_stage(index + 1, group, &ctx).await?);
            }
            Ok::<_, OrchestratorError>(per_task)
        })
        .await
    }

    async fn run_stages<F, Fut>(&self, body: F) -> Result<BatchResult, OrchestratorError>
    where
        F: FnOnce(RunContext) -> Fut,
        Fut: Future<Output = Result<Vec<ProcessResult>, OrchestratorError>>,
    {
        let started_at = Utc::now();
        let ctx = RunContext::default();
        self.set_state(RunState::Running);

        let per_task = match body(ctx.clone()).await {
            Ok(per_task) => per_task,
            Err(e) => {
                error!(error = %e, "Run failed");
                self.set_state(RunState::Aborted);
                return Err(e);
            }
        };

        let state = ctx.final_state();
        self.set_state(state);
        let result = BatchResult::new(per_task, state, started_at);
        info!(
            tasks = result.per_task.len(),
            failed = result.failed_count(),
            state = ?result.state,
            "Run finished"
        );
        Ok(result)
    }

    async fn ordered_stage(&self, tasks: &[OrderedTask], ctx: &RunContext) -> Vec<ProcessResult> {
        let mut sorted: Vec<&OrderedTask> = tasks.iter().collect();
        sorted.sort_by_key(|t| t.order);

        let mut per_task = Vec::with_capacity(sorted.len());
        for (index, ordered) in sorted.into_iter().enumerate() {
            let span = info_span!(
                "task",
                index,
                order = ordered.order,
                kind = %ordered.task.kind()
            );
            per_task.push(self.run_one(&ordered.task, ctx).instrument(span).await);
        }
        per_task
    }

    async fn group_stage(
        &self,
        position: usize,
        group: &BatchGroup,
        ctx: &RunContext,
    ) -> Result<Vec<ProcessResult>, OrchestratorError> {
        info!(
            group = position,
            kind = %group.kind(),
            parallel = group.is_parallel(),
            tasks = group.len(),
            "Running batch group"
        );

        if !group.is_parallel() {
            let mut per_task = Vec::with_capacity(group.len());
            for (index, task) in group.tasks().iter().enumerate() {
                let span = info_span!("task", group = position, index, kind = %task.kind());
                per_task.push(self.run_one(task, ctx).instrument(span).await);
            }
            return Ok(per_task);
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(group.len());

        for (index, task) in group.tasks().iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let interactor = Arc::clone(&self.interactor);
            let ctx = ctx.clone();
            let policy = self.policy;
            let span = info_span!("task", group = position, index, kind = %task.kind());

            handles.push(tokio::spawn(
                async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| OrchestratorError::PoolUnavailable(e.to_string()))?;
                    if ctx.is_aborted() {
                        return Ok(ProcessResult::skipped(SKIP_REASON));
                    }
                    let result = interactor.run_task(&task).await;
                    ctx.observe(&result, policy);
                    Ok::<_, OrchestratorError>(result)
                }
                .instrument(span),
            ));
        }

        let mut per_task = Vec::with_capacity(handles.len());
        let mut handles = handles.into_iter();
        while let Some(handle) = handles.next() {
            match handle.await {
                Ok(Ok(result)) => per_task.push(result),
                Ok(Err(e)) => {
                    for rest in handles {
                        rest.abort();
                    }
                    return Err(e);
                }
                Err(join_error) => {
                    error!(
                        group = position,
                        slot = per_task.len(),
                        error = %join_error,
                        "Worker did not finish"
                    );
                    let result = ProcessResult::failed(format!("Worker failed: {}", join_error));
                    ctx.observe(&result, self.policy);
                    per_task.push(result);
                }
            }
        }
        Ok(per_task)
    }

    async fn run_one(&self, task: &Task, ctx: &RunContext) -> ProcessResult {
        if ctx.is_aborted() {
            return ProcessResult::skipped(SKIP_REASON);
        }
        let result = self.interactor.run_task(task).await;
        ctx.observe(&result, self.policy);
        result
    }
}
