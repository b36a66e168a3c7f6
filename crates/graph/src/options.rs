use std::time::Duration;

use util::thread::ThreadConfig;

use crate::{Error, Result};

/// Engine configuration, fixed when the engine is created.
#[derive(Clone, Debug)]
pub struct Options {
    /// Largest block the audio thread may request, in frames.
    pub max_period_size: usize,

    /// Capacity of every event buffer.
    pub max_events_per_buffer: usize,

    /// How long a rebuild waits for the audio thread to hand back the previous executor.
    pub swap_timeout: Duration,

    /// One entry per worker thread. Empty runs every block on the audio thread alone.
    pub workers: Vec<ThreadConfig>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_period_size: 1024,
            max_events_per_buffer: 64,
            swap_timeout: Duration::from_secs(1),
            workers: vec![],
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<()> {
        if self.max_period_size == 0 {
            return Err(Error::InvalidOptions("max_period_size must be positive"));
        }
        if self.max_events_per_buffer == 0 {
            return Err(Error::InvalidOptions("max_events_per_buffer must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Options;
    use crate::Error;

    #[test]
    fn defaults_are_valid() {
        let options = Options::default();
        assert!(options.validate().is_ok());
        assert!(options.workers.is_empty());
    }

    #[test]
    fn rejects_empty_periods() {
        let options = Options {
            max_period_size: 0,
            ..Options::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));
    }
}
