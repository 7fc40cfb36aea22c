//! Year-end promotion job.
//!
//! Executes [`promotion_plan`] strictly in order: archive the terminal grade,
//! then move each lower grade up by one. Each step reads its source branch
//! in full, writes every record to its destination one path at a time, and
//! only then deletes the source branch. The first store failure aborts the
//! run; writes already made are not undone and the failing step's source
//! branch is left in place.
//!
//! Progress is recorded in a saga log at `promociones/<year>` so an
//! interrupted run can be inspected and resumed with
//! [`PromotionJob::resume_from`].

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, Utc};
use ipa_core::grade::GradeLevel;
use ipa_core::paths::{email_account_key, graduate_key, rebase_student_key};
use ipa_core::promotion::{
    archive_record, promote_record, promotion_plan, PromotionStep, PromotionSummary, RunStatus,
    StepLog, StepOutcome,
};
use ipa_core::types::Year;
use ipa_db::repositories::{GraduateRepo, PromotionRepo, StudentRepo, UserRepo};
use ipa_db::{RecordStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    #[error("The promotion for {year} has already completed")]
    AlreadyCompleted { year: Year },

    #[error(
        "A previous promotion for {year} did not finish (next step {next_step}); \
         inspect the log and resume it"
    )]
    Interrupted { year: Year, next_step: usize },

    #[error("Step {step} does not exist, the plan has {total} steps")]
    InvalidStep { step: usize, total: usize },

    #[error("Promotion failed at step {step}: {source}")]
    Store {
        step: usize,
        #[source]
        source: StoreError,
    },
}

/// Calendar inputs of a run, taken from the wall clock at invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionContext {
    pub year: Year,
    /// Stamped on graduate records as `fecha_egreso`.
    pub date: NaiveDate,
}

impl PromotionContext {
    pub fn now() -> Self {
        Self::on(Local::now().date_naive())
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            date,
        }
    }

    /// Archival stamp, `YYYY-MM-DD`.
    pub fn date_stamp(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Skip the per-year guard. Running twice in one year shifts every
    /// student up two grades.
    pub force: bool,
}

/// The promotion job, bound to one record store.
pub struct PromotionJob {
    store: Arc<dyn RecordStore>,
}

impl PromotionJob {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Run the whole plan for `ctx.year`.
    ///
    /// Refuses when the year already has a completed or unfinished run,
    /// unless `options.force` is set.
    pub async fn run(
        &self,
        ctx: &PromotionContext,
        options: RunOptions,
    ) -> Result<PromotionSummary, PromotionError> {
        let store = self.store.as_ref();

        if !options.force {
            let previous = PromotionRepo::find(store, ctx.year)
                .await
                .map_err(|source| PromotionError::Store { step: 0, source })?;
            match previous {
                Some(run) if run.status == RunStatus::Completada => {
                    return Err(PromotionError::AlreadyCompleted { year: ctx.year });
                }
                Some(run) => {
                    return Err(PromotionError::Interrupted {
                        year: ctx.year,
                        next_step: run.next_step(),
                    });
                }
                None => {}
            }
        } else {
            tracing::warn!(year = ctx.year, "Promotion guard bypassed");
        }

        PromotionRepo::start(store, ctx.year, Utc::now())
            .await
            .map_err(|source| PromotionError::Store { step: 0, source })?;
        tracing::info!(year = ctx.year, "Promotion started");

        self.execute_from(ctx, 0).await
    }

    /// Re-run the plan from `step` onward for an operator recovering an
    /// interrupted run.
    pub async fn resume_from(
        &self,
        ctx: &PromotionContext,
        step: usize,
    ) -> Result<PromotionSummary, PromotionError> {
        let total = promotion_plan().len();
        if step >= total {
            return Err(PromotionError::InvalidStep { step, total });
        }

        let store = self.store.as_ref();
        let log_error = |source| PromotionError::Store { step, source };
        match PromotionRepo::find(store, ctx.year).await.map_err(log_error)? {
            Some(run) if run.status == RunStatus::Completada => {
                return Err(PromotionError::AlreadyCompleted { year: ctx.year });
            }
            Some(_) => PromotionRepo::reopen(store, ctx.year)
                .await
                .map_err(log_error)?,
            None => {
                PromotionRepo::start(store, ctx.year, Utc::now())
                    .await
                    .map_err(log_error)?;
            }
        }
        tracing::info!(year = ctx.year, step, "Promotion resumed");

        self.execute_from(ctx, step).await
    }

    async fn execute_from(
        &self,
        ctx: &PromotionContext,
        start: usize,
    ) -> Result<PromotionSummary, PromotionError> {
        let store = self.store.as_ref();
        let mut summary = PromotionSummary {
            year: ctx.year,
            steps: Vec::new(),
        };

        for (index, step) in promotion_plan().into_iter().enumerate().skip(start) {
            let committed = match self.execute_step(ctx, step).await {
                Ok(records) => {
                    let log = StepLog {
                        step: step.name(),
                        records,
                        committed_at: Utc::now(),
                    };
                    PromotionRepo::record_step(store, ctx.year, index, &log)
                        .await
                        .map(|()| records)
                }
                Err(e) => Err(e),
            };

            let records = match committed {
                Ok(records) => records,
                Err(source) => {
                    tracing::error!(
                        year = ctx.year,
                        step = %step,
                        index,
                        error = %source,
                        "Promotion step failed",
                    );
                    let message = source.to_string();
                    if let Err(e) =
                        PromotionRepo::fail(store, ctx.year, index, &message, Utc::now()).await
                    {
                        tracing::warn!(year = ctx.year, error = %e, "Failed to record promotion failure");
                    }
                    return Err(PromotionError::Store {
                        step: index,
                        source,
                    });
                }
            };

            tracing::info!(year = ctx.year, step = %step, index, records, "Promotion step committed");
            summary.steps.push(StepOutcome {
                index,
                step: step.name(),
                records,
            });
        }

        PromotionRepo::complete(store, ctx.year, Utc::now())
            .await
            .map_err(|source| PromotionError::Store {
                step: summary.steps.last().map_or(start, |s| s.index),
                source,
            })?;
        tracing::info!(
            year = ctx.year,
            records = summary.total_records(),
            "Promotion completed",
        );
        Ok(summary)
    }

    /// Execute one step, returning how many records it moved.
    async fn execute_step(
        &self,
        ctx: &PromotionContext,
        step: PromotionStep,
    ) -> Result<usize, StoreError> {
        match step {
            PromotionStep::ArchiveTerminal => self.archive_terminal(ctx).await,
            PromotionStep::Promote { from, to } => self.promote_branch(ctx, from, to).await,
        }
    }

    async fn archive_terminal(&self, ctx: &PromotionContext) -> Result<usize, StoreError> {
        let store = self.store.as_ref();
        let level = GradeLevel::Fourth;
        let records = StudentRepo::list_branch(store, level).await?;
        let count = records.len();
        let date = ctx.date_stamp();

        for (key, record) in records {
            let email = record.email.clone();
            let graduate = archive_record(record, ctx.year, &date);
            GraduateRepo::archive(store, &graduate_key(&key, ctx.year), &graduate).await?;

            match email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
                Some(email) => match email_account_key(email) {
                    Some(account) => {
                        let removed = UserRepo::delete(store, &account).await?;
                        tracing::debug!(key = %key, removed, "Graduate account revoked");
                    }
                    None => {
                        tracing::warn!(key = %key, email, "Graduate email is not a usable account key, no account removed");
                    }
                },
                None => {
                    tracing::warn!(key = %key, "Graduate has no account email, no account removed");
                }
            }
        }

        StudentRepo::delete_branch(store, level).await?;
        Ok(count)
    }

    async fn promote_branch(
        &self,
        ctx: &PromotionContext,
        from: GradeLevel,
        to: GradeLevel,
    ) -> Result<usize, StoreError> {
        let store = self.store.as_ref();
        let records = StudentRepo::list_branch(store, from).await?;
        let count = records.len();

        for (key, record) in records {
            let new_key = rebase_student_key(&key, from, to);
            let promoted = promote_record(record, to, ctx.year);
            StudentRepo::put(store, to, &new_key, &promoted).await?;
        }

        StudentRepo::delete_branch(store, from).await?;
        Ok(count)
    }
}
