//! Worker thread configuration.
use std::{io, thread::JoinHandle};

/// How a dedicated thread should be set up before it starts running jobs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreadConfig {
    /// Thread name, visible in debuggers and `top -H`.
    pub name: Option<String>,

    /// Pin the thread to this CPU.
    pub affinity: Option<usize>,

    /// Run the thread with `SCHED_FIFO` at this priority.
    pub priority: Option<i32>,
}

impl ThreadConfig {
    /// Apply affinity and priority to the calling thread. Failures are logged, not fatal.
    pub fn apply(&self) {
        if let Some(cpu) = self.affinity {
            if let Err(error) = set_affinity(cpu) {
                log::warn!("failed to pin thread to cpu {cpu}: {error}");
            }
        }
        if let Some(priority) = self.priority {
            if let Err(error) = set_priority(priority) {
                log::warn!("failed to set thread priority to {priority}: {error}");
            }
        }
    }

    /// Spawn a thread configured by `self`.
    pub fn spawn<F>(&self, f: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut builder = std::thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        let config = self.clone();
        builder.spawn(move || {
            config.apply();
            f();
        })
    }
}

#[cfg(target_os = "linux")]
fn set_affinity(cpu: usize) -> io::Result<()> {
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);
        if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn set_priority(priority: i32) -> io::Result<()> {
    unsafe {
        let mut param: libc::sched_param = std::mem::zeroed();
        param.sched_priority = priority;
        let result = libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &param);
        if result != 0 {
            return Err(io::Error::from_raw_os_error(result));
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_affinity(_cpu: usize) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "thread affinity"))
}

#[cfg(not(target_os = "linux"))]
fn set_priority(_priority: i32) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Unsupported, "thread priority"))
}
