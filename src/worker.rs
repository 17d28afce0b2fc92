//! Runs backend calls off the UI thread.
//!
//! One thread owns the backend and handles jobs in submission order. Each
//! answer goes back over a channel and asks the UI for a repaint; the app
//! drains answers once per frame and commits them to the [`PlanStore`].
//!
//! [`PlanStore`]: crate::store::PlanStore

use chrono::NaiveDate;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use crate::io::{PlanBackend, TransportError};
use crate::model::{PlanId, PlanItem};
use crate::store::LoadTicket;

#[derive(Debug, Clone)]
pub enum Job {
    Load(LoadTicket),
    Create(PlanItem),
    Update(PlanItem),
    Delete { date: NaiveDate, id: PlanId },
}

#[derive(Debug)]
pub enum JobResult {
    Loaded(LoadTicket, Result<Vec<PlanItem>, TransportError>),
    Created(Result<PlanItem, TransportError>),
    Updated(Result<PlanItem, TransportError>),
    Deleted {
        date: NaiveDate,
        id: PlanId,
        result: Result<(), TransportError>,
    },
}

pub struct BackendWorker {
    jobs: Option<Sender<Job>>,
    results: Receiver<JobResult>,
    handle: Option<JoinHandle<()>>,
}

impl BackendWorker {
    /// Start the worker thread. `notify` runs after every answer.
    pub fn spawn<B, F>(backend: B, notify: F) -> std::io::Result<Self>
    where
        B: PlanBackend + 'static,
        F: Fn() + Send + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel::<JobResult>();
        let handle = std::thread::Builder::new()
            .name("plan-backend".into())
            .spawn(move || {
                tracing::debug!("backend worker started");
                for job in job_rx {
                    let result = run_job(&backend, job);
                    if result_tx.send(result).is_err() {
                        break;
                    }
                    notify();
                }
                tracing::debug!("backend worker stopped");
            })?;
        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a job. Fails only if the worker thread has died.
    pub fn submit(&self, job: Job) -> Result<(), TransportError> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| TransportError::Unavailable("worker stopped".into()))?;
        jobs.send(job)
            .map_err(|_| TransportError::Unavailable("worker thread exited".into()))
    }

    /// Answers received since the last call, oldest first.
    pub fn drain(&self) -> Vec<JobResult> {
        self.results.try_iter().collect()
    }
}

impl Drop for BackendWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the thread's loop.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_job(backend: &dyn PlanBackend, job: Job) -> JobResult {
    match job {
        Job::Load(ticket) => JobResult::Loaded(ticket, backend.fetch_day(ticket.date)),
        Job::Create(item) => JobResult::Created(backend.create(&item)),
        Job::Update(item) => JobResult::Updated(backend.update(&item)),
        Job::Delete { date, id } => {
            let result = backend.delete(&id);
            JobResult::Deleted { date, id, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryBackend;
    use crate::model::{PlanDraft, TimeOfDay};
    use crate::store::{LoadOutcome, PlanStore};
    use std::time::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn wait_for(worker: &BackendWorker) -> JobResult {
        for _ in 0..200 {
            if let Some(result) = worker.drain().into_iter().next() {
                return result;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("worker did not answer");
    }

    #[test]
    fn create_then_reload_through_the_worker() {
        let backend = MemoryBackend::new();
        let worker = BackendWorker::spawn(backend.clone(), || {}).unwrap();
        let mut store = PlanStore::new(day());

        let mut draft = PlanDraft::new(
            day(),
            TimeOfDay::from_hm(7, 0).unwrap(),
            TimeOfDay::from_hm(8, 0).unwrap(),
        );
        draft.title = "Run".into();
        let item = store.begin_create(&draft).unwrap();
        worker.submit(Job::Create(item)).unwrap();

        match wait_for(&worker) {
            JobResult::Created(result) => {
                store.finish_create(result).unwrap();
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(store.needs_refresh());

        worker.submit(Job::Load(store.begin_load())).unwrap();
        match wait_for(&worker) {
            JobResult::Loaded(ticket, result) => {
                assert_eq!(store.finish_load(ticket, result), Ok(LoadOutcome::Applied(1)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(backend.stored(day()).len(), 1);
    }

    #[test]
    fn notify_runs_after_each_answer() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let worker = BackendWorker::spawn(MemoryBackend::new(), move || {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        let mut store = PlanStore::new(day());
        worker.submit(Job::Load(store.begin_load())).unwrap();
        wait_for(&worker);
        drop(worker);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
