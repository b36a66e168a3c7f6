//! A single-producer single-consumer ring buffer of multichannel audio.
//!
//! The [Writer] lives on the audio thread and never blocks or allocates; frames that do not fit
//! are dropped. The [Reader] collects whatever was written since its last call.
use std::sync::{Arc, atomic::Ordering};

mod state;
use state::State;

/// The write end of a stream.
pub struct Writer {
    state: Arc<State>,
}

/// A write transaction. See [Writer::write].
pub struct WriteTxn<'a> {
    writer: &'a mut Writer,
    start: usize,
    length: usize,
}

/// The read end of a stream.
pub struct Reader {
    state: Arc<State>,
}

/// A read transaction. See [Reader::read].
pub struct ReadTxn<'a> {
    reader: &'a mut Reader,
    start: usize,
    length: usize,
}

/// Create a stream of `num_channels` channels holding up to `capacity` frames. The capacity is
/// rounded up to a power of two.
pub fn stream(num_channels: usize, capacity: usize) -> (Writer, Reader) {
    let state = Arc::new(State::new(num_channels, capacity.max(1).next_power_of_two()));
    let writer = Writer {
        state: state.clone(),
    };
    let reader = Reader { state };
    (writer, reader)
}

impl Writer {
    pub fn num_channels(&self) -> usize {
        self.state.num_channels
    }

    /// Acquire a write transaction over the next contiguous free region, at most `count` frames.
    pub fn write(&mut self, count: usize) -> WriteTxn<'_> {
        // Load the data.
        let cap = self.state.capacity;
        let head = self.state.head.load(Ordering::Relaxed);
        let tail = self.state.tail.load(Ordering::Acquire);

        // Compute the write region.
        let used = head.wrapping_sub(tail);
        let free = cap - used;
        let start = head & (cap - 1);
        let length = free.min(cap - start).min(count);

        WriteTxn {
            writer: self,
            start,
            length,
        }
    }

    /// Write one span per channel, wrapping around the ring as needed. Returns the number of
    /// frames written, which is less than requested when the reader has fallen behind.
    pub fn write_from(&mut self, channels: &[&[f32]]) -> usize {
        debug_assert_eq!(channels.len(), self.num_channels());
        let total = channels.first().map_or(0, |channel| channel.len());
        debug_assert!(channels.iter().all(|channel| channel.len() == total));

        let mut written = 0;
        while written < total {
            let mut txn = self.write(total - written);
            if txn.is_empty() {
                break;
            }
            let len = txn.len();
            for (index, channel) in channels.iter().enumerate() {
                txn.channel_mut(index)
                    .copy_from_slice(&channel[written..written + len]);
            }
            txn.commit();
            written += len;
        }
        written
    }

    /// Returns true if the reader has been dropped.
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.state) == 1
    }
}

impl Reader {
    pub fn num_channels(&self) -> usize {
        self.state.num_channels
    }

    /// Number of frames waiting to be read.
    pub fn available(&self) -> usize {
        let head = self.state.head.load(Ordering::Acquire);
        let tail = self.state.tail.load(Ordering::Relaxed);
        head.wrapping_sub(tail)
    }

    /// Acquire a read transaction over the next contiguous region of written frames.
    pub fn read(&mut self) -> ReadTxn<'_> {
        // Load the data.
        let cap = self.state.capacity;
        let head = self.state.head.load(Ordering::Acquire);
        let tail = self.state.tail.load(Ordering::Relaxed);

        // Compute the read region.
        let used = head.wrapping_sub(tail);
        let start = tail & (cap - 1);
        let length = used.min(cap - start);

        ReadTxn {
            reader: self,
            start,
            length,
        }
    }

    /// Take every frame written since the last call, one vector per channel.
    pub fn consume(&mut self) -> Vec<Vec<f32>> {
        let available = self.available();
        let mut channels = vec![Vec::with_capacity(available); self.num_channels()];
        loop {
            let txn = self.read();
            if txn.is_empty() {
                break;
            }
            for (index, channel) in channels.iter_mut().enumerate() {
                channel.extend_from_slice(txn.channel(index));
            }
            txn.commit();
        }
        channels
    }

    /// Returns true if the writer has been dropped.
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.state) == 1
    }
}

impl WriteTxn<'_> {
    /// Number of frames in this transaction.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        unsafe {
            let data = self.writer.state.channel(channel, self.start);
            std::slice::from_raw_parts_mut(data, self.length)
        }
    }

    /// Commit the write transaction. This _must_ be called or the frames will not reach the
    /// reader.
    pub fn commit(self) {
        self.writer
            .state
            .head
            .fetch_add(self.length, Ordering::Release);
    }
}

impl ReadTxn<'_> {
    /// Number of frames in this transaction.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn channel(&self, channel: usize) -> &[f32] {
        unsafe {
            let data = self.reader.state.channel(channel, self.start);
            std::slice::from_raw_parts(data, self.length)
        }
    }

    pub fn commit(self) {
        self.reader
            .state
            .tail
            .fetch_add(self.length, Ordering::Release);
    }
}
