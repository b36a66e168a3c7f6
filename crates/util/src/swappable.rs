//! Hand a value from a control thread to a real-time thread and get the previous one back.
//!
//! The [Writer] publishes a pending value through an atomic pointer. The [Reader] claims it
//! without blocking or allocating, installs it, and hands the previous value back through a
//! second atomic pointer so it can be dropped off the real-time thread. The writer waits for the
//! handback with a timeout; if the reader never claims the pending value in time the writer takes
//! it back itself.
use std::{
    ptr::null_mut,
    sync::{
        atomic::{AtomicPtr, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crossbeam::utils::Backoff;

pub fn swappable<T: Send>() -> (Reader<T>, Writer<T>) {
    let inner = Arc::new(Inner {
        pending: AtomicPtr::new(null_mut()),
        retired: AtomicPtr::new(null_mut()),
    });
    let reader = Reader {
        inner: inner.clone(),
    };
    let writer = Writer { inner };
    (reader, writer)
}

struct Inner<T> {
    pending: AtomicPtr<T>,
    retired: AtomicPtr<T>,
}

/// The real-time end.
pub struct Reader<T> {
    inner: Arc<Inner<T>>,
}

/// The control end.
pub struct Writer<T> {
    inner: Arc<Inner<T>>,
}

/// The outcome of [Writer::write].
#[derive(Debug)]
pub enum Swap<T> {
    /// The reader installed the new value and handed back the one it replaced.
    Retired(T),
    /// The reader did not claim the new value before the timeout. It is returned unused.
    TimedOut(T),
}

impl<T> Reader<T> {
    /// Install a pending value into `current`, if there is one. Returns true if `current` changed.
    pub fn read(&mut self, current: &mut T) -> bool {
        let pointer = self.inner.pending.swap(null_mut(), Ordering::AcqRel);
        if pointer.is_null() {
            return false;
        }

        // Reuse the pending allocation to carry the previous value back.
        unsafe {
            std::mem::swap(current, &mut *pointer);
        }
        let stale = self.inner.retired.swap(pointer, Ordering::AcqRel);
        debug_assert!(stale.is_null(), "previous handback was never collected");
        true
    }
}

impl<T> Writer<T> {
    /// Publish `value` and wait up to `timeout` for the reader to hand back the value it replaces.
    pub fn write(&mut self, value: T, timeout: Duration) -> Swap<T> {
        let pointer = Box::into_raw(Box::new(value));
        let stale = self.inner.pending.swap(pointer, Ordering::AcqRel);
        if !stale.is_null() {
            drop(unsafe { Box::from_raw(stale) });
        }

        let deadline = Instant::now() + timeout;
        let backoff = Backoff::new();
        loop {
            if let Some(retired) = self.take_retired() {
                return Swap::Retired(retired);
            }
            if Instant::now() >= deadline {
                break;
            }
            if backoff.is_completed() {
                std::thread::sleep(Duration::from_micros(250));
            } else {
                backoff.snooze();
            }
        }

        // Take the pending value back. If it is gone the reader claimed it while we were
        // timing out and the handback is imminent.
        let pointer = self.inner.pending.swap(null_mut(), Ordering::AcqRel);
        if !pointer.is_null() {
            return Swap::TimedOut(*unsafe { Box::from_raw(pointer) });
        }
        loop {
            if let Some(retired) = self.take_retired() {
                return Swap::Retired(retired);
            }
            std::thread::yield_now();
        }
    }

    fn take_retired(&self) -> Option<T> {
        let pointer = self.inner.retired.swap(null_mut(), Ordering::AcqRel);
        (!pointer.is_null()).then(|| *unsafe { Box::from_raw(pointer) })
    }
}

unsafe impl<T: Send> Send for Reader<T> {}
unsafe impl<T: Send> Send for Writer<T> {}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        for pointer in [*self.pending.get_mut(), *self.retired.get_mut()] {
            if !pointer.is_null() {
                drop(unsafe { Box::from_raw(pointer) });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{swappable, Swap};
    use std::time::Duration;

    #[test]
    fn times_out_without_reader_activity() {
        let (_reader, mut writer) = swappable::<String>();
        match writer.write("next".into(), Duration::from_millis(5)) {
            Swap::TimedOut(value) => assert_eq!(value, "next"),
            Swap::Retired(_) => panic!("nothing was running"),
        }
    }

    #[test]
    fn reader_hands_back_previous() {
        let (mut reader, mut writer) = swappable::<String>();
        let thread = std::thread::spawn(move || {
            let mut current = String::from("first");
            while !reader.read(&mut current) {
                std::thread::yield_now();
            }
            current
        });
        match writer.write("second".into(), Duration::from_secs(10)) {
            Swap::Retired(previous) => assert_eq!(previous, "first"),
            Swap::TimedOut(_) => panic!("reader was running"),
        }
        assert_eq!(thread.join().unwrap(), "second");
    }

    #[test]
    fn read_without_pending() {
        let (mut reader, _writer) = swappable::<u32>();
        let mut current = 1;
        assert!(!reader.read(&mut current));
        assert_eq!(current, 1);
    }

    #[test]
    fn unclaimed_values_are_dropped() {
        let value = std::sync::Arc::new(());
        let (reader, mut writer) = swappable();
        let _ = writer.write(value.clone(), Duration::ZERO);
        drop(reader);
        drop(writer);
        assert_eq!(std::sync::Arc::strong_count(&value), 1);
    }
}
