use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        OnceLock,
    },
    thread::Thread,
};

/// A binary semaphore with a single waiting thread.
///
/// [Semaphore::release] never blocks or allocates and may be called from the audio thread. The
/// first thread to call [Semaphore::acquire] becomes the only thread allowed to wait on it.
#[derive(Default)]
pub struct Semaphore {
    permit: AtomicBool,
    waiter: OnceLock<Thread>,
}

impl Semaphore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the permit available, waking the waiter if it is parked.
    pub fn release(&self) {
        self.permit.store(true, Ordering::Release);
        if let Some(waiter) = self.waiter.get() {
            waiter.unpark();
        }
    }

    /// Wait for the permit and take it.
    pub fn acquire(&self) {
        let waiter = self.waiter.get_or_init(std::thread::current);
        debug_assert_eq!(
            waiter.id(),
            std::thread::current().id(),
            "a semaphore may only be acquired by one thread"
        );
        while !self.permit.swap(false, Ordering::Acquire) {
            std::thread::park();
        }
    }

    /// Take the permit if it is available.
    pub fn try_acquire(&self) -> bool {
        self.permit.swap(false, Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::Semaphore;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn release_before_acquire() {
        let semaphore = Semaphore::new();
        semaphore.release();
        semaphore.acquire();
        assert!(!semaphore.try_acquire());
    }

    #[test]
    fn wakes_waiting_thread() {
        let semaphore = Arc::new(Semaphore::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let thread = std::thread::spawn({
            let semaphore = semaphore.clone();
            let counter = counter.clone();
            move || {
                for _ in 0..3 {
                    semaphore.acquire();
                    counter.fetch_add(1, Ordering::AcqRel);
                }
            }
        });
        for expected in 1..=3 {
            semaphore.release();
            while counter.load(Ordering::Acquire) < expected {
                std::thread::yield_now();
            }
        }
        thread.join().unwrap();
        assert_eq!(counter.load(Ordering::Acquire), 3);
    }
}
