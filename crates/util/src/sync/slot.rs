//! Single-producer single-consumer "latest value" mailbox.
//!
//! A thin layer over a triple buffer. Pushing twice before the reader looks discards the first
//! value, and each pushed value is seen by the reader at most once.
use std::sync::Arc;

use triple_buffer::{Input, Output};

/// The write end of a slot. Never blocks and never allocates.
pub struct Producer<T: Send> {
    input: Input<T>,
    link: Arc<()>,
}

/// The read end of a slot. Never blocks and never allocates.
pub struct Consumer<T: Send> {
    output: Output<T>,
    link: Arc<()>,
}

/// Create a slot whose cells start out as `T::default()`. Nothing is pending initially.
pub fn slot<T: Clone + Default + Send>() -> (Producer<T>, Consumer<T>) {
    let (input, output) = triple_buffer::triple_buffer(&T::default());
    let link = Arc::new(());
    let producer = Producer {
        input,
        link: link.clone(),
    };
    (producer, Consumer { output, link })
}

impl<T: Send> Producer<T> {
    /// Publish a value, replacing any value the consumer has not picked up yet.
    pub fn push(&mut self, value: T) {
        self.input.write(value);
    }

    /// Returns true if the consumer has been dropped.
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.link) == 1
    }
}

impl<T: Send> Consumer<T> {
    /// Call `f` with the latest value pushed since the last successful consume, if any.
    pub fn consume(&mut self, f: impl FnOnce(&T)) {
        if self.output.updated() {
            f(self.output.read());
        }
    }

    /// Copy the latest value into `value`. Returns whether there was a new value.
    pub fn pull(&mut self, value: &mut T) -> bool
    where
        T: Clone,
    {
        let mut pulled = false;
        self.consume(|latest| {
            value.clone_from(latest);
            pulled = true;
        });
        pulled
    }

    /// Returns true if the producer has been dropped.
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.link) == 1
    }
}

#[cfg(test)]
mod tests {
    use super::slot;

    #[test]
    fn push_then_consume() {
        let (mut producer, mut consumer) = slot::<i32>();
        producer.push(5);

        let mut seen = vec![];
        consumer.consume(|v| seen.push(*v));
        assert_eq!(seen, vec![5]);
    }

    #[test]
    fn consume_without_push() {
        let (_producer, mut consumer) = slot::<i32>();
        let mut calls = 0;
        consumer.consume(|_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn value_is_consumed_once() {
        let (mut producer, mut consumer) = slot::<i32>();
        producer.push(3);

        let mut calls = 0;
        consumer.consume(|_| calls += 1);
        consumer.consume(|_| calls += 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn latest_value_wins() {
        let (mut producer, mut consumer) = slot::<i32>();
        producer.push(1);
        producer.push(2);

        let mut seen = vec![];
        consumer.consume(|v| seen.push(*v));
        consumer.consume(|v| seen.push(*v));
        assert_eq!(seen, vec![2]);
    }

    #[test]
    fn pull() {
        let (mut producer, mut consumer) = slot::<f32>();
        let mut value = 0.0;
        assert!(!consumer.pull(&mut value));
        producer.push(0.5);
        assert!(consumer.pull(&mut value));
        assert_eq!(value, 0.5);
        assert!(!consumer.pull(&mut value));
    }

    #[test]
    fn orphaned() {
        let (producer, consumer) = slot::<u8>();
        assert!(!producer.is_orphaned());
        drop(consumer);
        assert!(producer.is_orphaned());
    }

    #[test]
    fn concurrent_values_are_monotonic() {
        let (mut producer, mut consumer) = slot::<u64>();
        let writer = std::thread::spawn(move || {
            for n in 1..=10_000u64 {
                producer.push(n);
            }
        });

        let mut last = 0;
        let mut done = false;
        while !done {
            done = writer.is_finished();
            consumer.consume(|v| {
                assert!(*v > last, "{v} after {last}");
                last = *v;
            });
        }
        writer.join().unwrap();
        consumer.consume(|v| last = *v);
        assert_eq!(last, 10_000);
    }
}
