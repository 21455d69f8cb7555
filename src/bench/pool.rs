//! Named worker threads reporting over a channel
//!
//! Each worker runs on its own scoped thread (`{prefix}-{id}`) and owns
//! everything it opens. Workers send [`WorkerEvent`]s as they make progress;
//! the calling thread drains them until every worker has dropped its sender,
//! then joins all handles. The first failure (error, panic or spawn failure)
//! is returned after every spawned worker has been joined.

use crate::error::{BenchError, ConfigError, Result, WorkerError};
use crossbeam_channel::{unbounded, Sender};
use std::any::Any;
use std::thread;
use tracing::{debug, warn};

/// Progress reported by a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    /// A chunk was inserted and committed
    Inserted {
        worker: usize,
        chunk: usize,
        rows: usize,
    },

    /// A previously inserted chunk read back correctly
    Verified {
        worker: usize,
        chunk: usize,
        rows: usize,
    },

    /// A full-table read completed and validated
    Read { worker: usize, rows: usize },
}

/// Running totals over all workers' events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTotals {
    pub rows_inserted: usize,
    pub chunks_inserted: usize,
    pub chunks_verified: usize,
    pub rows_read: usize,
}

impl WorkerTotals {
    pub fn record(&mut self, event: &WorkerEvent) {
        match *event {
            WorkerEvent::Inserted { rows, .. } => {
                self.rows_inserted += rows;
                self.chunks_inserted += 1;
            }
            WorkerEvent::Verified { .. } => self.chunks_verified += 1,
            WorkerEvent::Read { rows, .. } => self.rows_read += rows,
        }
    }
}

/// Run `work(id, events)` on `count` named threads and wait for all of them
///
/// `on_event` runs on the calling thread for every event, in arrival order.
pub fn run_workers<F, E>(prefix: &str, count: usize, work: F, mut on_event: E) -> Result<()>
where
    F: Fn(usize, &Sender<WorkerEvent>) -> Result<()> + Sync,
    E: FnMut(WorkerEvent),
{
    if count == 0 {
        return Err(ConfigError::InvalidWorkerCount { count }.into());
    }

    thread::scope(|scope| {
        let (tx, rx) = unbounded();
        let work = &work;
        let mut handles = Vec::with_capacity(count);
        let mut failure: Option<BenchError> = None;

        for id in 0..count {
            let events = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", prefix, id))
                .spawn_scoped(scope, move || work(id, &events));

            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(e) => {
                    failure = Some(
                        WorkerError::SpawnFailed {
                            id,
                            reason: e.to_string(),
                        }
                        .into(),
                    );
                    break;
                }
            }
        }
        drop(tx);

        debug!(prefix, count = handles.len(), "Workers spawned");

        // Ends once every worker has returned (or unwound) and dropped its sender
        for event in rx.iter() {
            on_event(event);
        }

        for (id, handle) in handles {
            let error = match handle.join() {
                Ok(Ok(())) => continue,
                Ok(Err(source)) => WorkerError::Failed {
                    id,
                    source: Box::new(source),
                },
                Err(payload) => WorkerError::Panicked {
                    id,
                    message: panic_message(payload.as_ref()),
                },
            };
            warn!(worker = id, error = %error, "Worker failed");
            failure.get_or_insert(error.into());
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ValidationError};

    #[test]
    fn test_events_drained_before_join() {
        let mut totals = WorkerTotals::default();
        run_workers(
            "test",
            4,
            |id, events| {
                for chunk in 0..3 {
                    events
                        .send(WorkerEvent::Inserted {
                            worker: id,
                            chunk,
                            rows: 10,
                        })
                        .ok();
                }
                events.send(WorkerEvent::Read { worker: id, rows: 5 }).ok();
                Ok(())
            },
            |event| totals.record(&event),
        )
        .unwrap();

        assert_eq!(totals.rows_inserted, 4 * 3 * 10);
        assert_eq!(totals.chunks_inserted, 12);
        assert_eq!(totals.rows_read, 20);
    }

    #[test]
    fn test_threads_are_named() {
        run_workers(
            "named",
            2,
            |id, _| {
                let name = thread::current().name().map(str::to_string);
                assert_eq!(name, Some(format!("named-{}", id)));
                Ok(())
            },
            |_| {},
        )
        .unwrap();
    }

    #[test]
    fn test_worker_error_fails_run() {
        let err = run_workers(
            "test",
            3,
            |id, _| {
                if id == 1 {
                    return Err(ValidationError::CountMismatch {
                        what: "users",
                        expected: 2,
                        actual: 1,
                    }
                    .into());
                }
                Ok(())
            },
            |_| {},
        )
        .unwrap_err();

        assert!(matches!(err, BenchError::Worker(WorkerError::Failed { id: 1, .. })));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_worker_panic_fails_run() {
        let err = run_workers(
            "test",
            2,
            |id, _| {
                if id == 0 {
                    panic!("boom");
                }
                Ok(())
            },
            |_| {},
        )
        .unwrap_err();

        match err {
            BenchError::Worker(WorkerError::Panicked { id, ref message }) => {
                assert_eq!(id, 0);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), ErrorKind::Worker);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = run_workers("test", 0, |_, _| Ok(()), |_| {}).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
    }
}
