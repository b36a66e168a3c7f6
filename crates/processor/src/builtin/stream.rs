use buffer::{Produced, Slice};

use crate::{Context, Processor};

/// Captures its inputs into a ring buffer and forwards them unchanged.
///
/// Frames that do not fit into the ring are dropped.
pub struct StreamProcessor {
    writer: fifo::Writer,
}

/// The control thread side of a [StreamProcessor].
pub struct StreamReader {
    reader: fifo::Reader,
}

impl StreamProcessor {
    /// Create a capture of `num_channels` with room for `capacity` frames.
    pub fn new(num_channels: usize, capacity: usize) -> (Self, StreamReader) {
        let (writer, reader) = fifo::stream(num_channels, capacity);
        (Self { writer }, StreamReader { reader })
    }
}

impl Processor for StreamProcessor {
    fn type_name(&self) -> &str {
        "stream"
    }

    fn num_inputs(&self) -> usize {
        self.writer.num_channels()
    }

    fn num_outputs(&self) -> usize {
        self.writer.num_channels()
    }

    fn process(&mut self, mut context: Context<'_>) {
        let mut written = 0;
        while written < context.buffer_size {
            let mut txn = self.writer.write(context.buffer_size - written);
            if txn.is_empty() {
                break;
            }
            let len = txn.len();
            for (channel, input) in context.inputs.iter().enumerate() {
                match input {
                    Slice::Constant(value) => txn.channel_mut(channel).fill(value),
                    Slice::Span(span) => txn
                        .channel_mut(channel)
                        .copy_from_slice(&span[written..written + len]),
                }
            }
            txn.commit();
            written += len;
        }

        for (index, input) in context.inputs.iter().enumerate() {
            context.results.set(index, Produced::Slice(input));
        }
    }
}

impl StreamReader {
    pub fn num_channels(&self) -> usize {
        self.reader.num_channels()
    }

    /// All frames captured since the last call, one vector per channel.
    pub fn consume(&mut self) -> Vec<Vec<f32>> {
        self.reader.consume()
    }

    /// Returns true once the processor has been dropped.
    pub fn is_orphaned(&self) -> bool {
        self.reader.is_orphaned()
    }
}
