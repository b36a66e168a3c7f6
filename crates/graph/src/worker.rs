//! A fixed pool of worker threads that help the audio thread run a block.
use std::{
    cell::UnsafeCell,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
};

use crossbeam::utils::Backoff;
use util::{sync::Semaphore, thread::ThreadConfig};

use crate::{Error, Result};

/// Work shared between the audio thread and the pool for one block.
pub(crate) trait Job: Sync {
    /// Participate in the block as worker `worker`. Returns when the block is done.
    fn work(&self, worker: usize);
}

/// Worker threads, started once and shared by every executor compiled against the pool.
///
/// Dropping the pool stops and joins the threads.
pub struct WorkerPool {
    workers: Box<[Worker]>,
}

struct Worker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

struct Shared {
    wake: Semaphore,
    stop: AtomicBool,
    busy: AtomicBool,
    job: UnsafeCell<Option<RawJob>>,
}

#[derive(Clone, Copy)]
struct RawJob {
    data: *const (),
    work: unsafe fn(*const (), usize),
}

// The job cell is written by the waking thread before the semaphore is released and read by the
// worker after acquiring it.
unsafe impl Send for Shared {}
unsafe impl Sync for Shared {}

impl WorkerPool {
    /// Spawn one worker per config.
    pub fn new(configs: &[ThreadConfig]) -> Result<Self> {
        let mut workers = Vec::with_capacity(configs.len());
        for (index, config) in configs.iter().enumerate() {
            // On failure the workers spawned so far are stopped as `workers` drops.
            workers.push(Worker::spawn(index + 1, config).map_err(Error::SpawnWorker)?);
        }
        log::debug!("started {} audio workers", workers.len());
        Ok(Self {
            workers: workers.into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wake every worker to call `job.work`.
    ///
    /// # Safety
    /// `job` must stay alive until [WorkerPool::wait] returns, and the pool must not be woken
    /// again before then.
    pub(crate) unsafe fn wake<J: Job>(&self, job: &J) {
        unsafe fn work<J: Job>(data: *const (), worker: usize) {
            unsafe { (*data.cast::<J>()).work(worker) }
        }

        let job = RawJob {
            data: (job as *const J).cast(),
            work: work::<J>,
        };
        for worker in self.workers.iter() {
            worker.shared.busy.store(true, Ordering::Relaxed);
            unsafe {
                *worker.shared.job.get() = Some(job);
            }
            worker.shared.wake.release();
        }
    }

    /// Wait until every woken worker has returned from its job.
    pub(crate) fn wait(&self) {
        let backoff = Backoff::new();
        for worker in self.workers.iter() {
            while worker.shared.busy.load(Ordering::Acquire) {
                backoff.snooze();
            }
        }
    }
}

impl Shared {
    fn run(&self, index: usize) {
        log::debug!("audio worker {index} started");
        loop {
            self.wake.acquire();
            if self.stop.load(Ordering::Acquire) {
                break;
            }
            if let Some(job) = unsafe { (*self.job.get()).take() } {
                unsafe { (job.work)(job.data, index) };
            }
            self.busy.store(false, Ordering::Release);
        }
        log::debug!("audio worker {index} stopped");
    }
}

impl Worker {
    fn spawn(index: usize, config: &ThreadConfig) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            wake: Semaphore::new(),
            stop: AtomicBool::new(false),
            busy: AtomicBool::new(false),
            job: UnsafeCell::new(None),
        });
        let handle = config.spawn({
            let shared = shared.clone();
            move || shared.run(index)
        })?;
        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        self.shared.wake.release();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("audio worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Job, Worker, WorkerPool};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use util::thread::ThreadConfig;

    struct Count(AtomicUsize, AtomicUsize);

    impl Job for Count {
        fn work(&self, worker: usize) {
            assert!(worker > 0);
            self.0.fetch_add(1, Ordering::Relaxed);
            self.1.fetch_add(worker, Ordering::Relaxed);
        }
    }

    #[test]
    fn wakes_every_worker() {
        let pool = WorkerPool::new(&[ThreadConfig::default(), ThreadConfig::default()]).unwrap();
        assert_eq!(pool.len(), 2);
        let job = Count(AtomicUsize::new(0), AtomicUsize::new(0));
        for round in 1..=5 {
            unsafe { pool.wake(&job) };
            pool.wait();
            assert_eq!(job.0.load(Ordering::Relaxed), round * 2);
            assert_eq!(job.1.load(Ordering::Relaxed), round * 3);
        }
    }

    #[test]
    fn drop_joins_idle_workers() {
        let pool = WorkerPool::new(&vec![ThreadConfig::default(); 3]).unwrap();
        drop(pool);
    }

    #[test]
    fn dropping_a_worker_stops_its_thread() {
        let workers = vec![
            Worker::spawn(1, &ThreadConfig::default()).unwrap(),
            Worker::spawn(2, &ThreadConfig::default()).unwrap(),
        ];
        let shared: Vec<_> = workers.iter().map(|worker| worker.shared.clone()).collect();
        drop(workers);
        for shared in &shared {
            assert_eq!(Arc::strong_count(shared), 1);
        }
    }
}
