//! One block of one audio signal.

/// Either a constant for the whole block or a view of the block's samples.
///
/// Constants are the silence/DC fast path: processors receiving one may skip per-sample work.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Slice<'a> {
    Constant(f32),
    Span(&'a [f32]),
}

/// What a processor produced on one of its outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Produced<'a> {
    /// The samples were written to the output buffer.
    #[default]
    Buffer,
    /// The output is this slice, e.g. a constant or one of the processor's inputs.
    Slice(Slice<'a>),
}

/// A lifetime-erased [Slice]. Used to bind results of one processor to inputs of another across
/// blocks; only valid while the storage it points to is not written.
///
/// A null pointer marks a constant, so every `f32` (NaN included) is a valid constant.
#[derive(Clone, Copy, Debug)]
pub struct RawSlice {
    ptr: *const f32,
    len: usize,
    value: f32,
}

impl Default for Slice<'_> {
    fn default() -> Self {
        Self::SILENCE
    }
}

impl<'a> Slice<'a> {
    pub const SILENCE: Self = Self::Constant(0.0);

    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// True if this is the constant zero.
    pub fn is_silence(&self) -> bool {
        matches!(self, Self::Constant(value) if *value == 0.0)
    }

    pub fn constant(&self) -> Option<f32> {
        match self {
            Self::Constant(value) => Some(*value),
            Self::Span(_) => None,
        }
    }

    pub fn span(&self) -> Option<&'a [f32]> {
        match self {
            Self::Constant(_) => None,
            Self::Span(span) => Some(span),
        }
    }

    /// The sample at `index`. Constants repeat forever.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        match self {
            Self::Constant(value) => *value,
            Self::Span(span) => span[index],
        }
    }

    /// Write this slice's samples into `out`, filling it if the slice is a constant.
    pub fn copy_to(&self, out: &mut [f32]) {
        match self {
            Self::Constant(value) => out.fill(*value),
            Self::Span(span) => {
                debug_assert!(span.len() >= out.len());
                out.copy_from_slice(&span[..out.len()]);
            }
        }
    }
}

impl From<f32> for Slice<'_> {
    fn from(value: f32) -> Self {
        Self::Constant(value)
    }
}

impl<'a> From<&'a [f32]> for Slice<'a> {
    fn from(value: &'a [f32]) -> Self {
        Self::Span(value)
    }
}

impl RawSlice {
    pub const SILENCE: Self = Self::constant(0.0);

    pub const fn constant(value: f32) -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
            value,
        }
    }

    pub fn span(span: &[f32]) -> Self {
        Self {
            ptr: span.as_ptr(),
            len: span.len(),
            value: 0.0,
        }
    }

    /// Create a span from a raw buffer.
    pub fn from_raw_parts(ptr: *const f32, len: usize) -> Self {
        debug_assert!(!ptr.is_null());
        Self {
            ptr,
            len,
            value: 0.0,
        }
    }

    /// Recover the slice.
    ///
    /// # Safety
    /// The samples this points to must be live and not mutated for `'a`.
    pub unsafe fn get<'a>(&self) -> Slice<'a> {
        if !self.ptr.is_null() {
            Slice::Span(unsafe { std::slice::from_raw_parts(self.ptr, self.len) })
        } else {
            Slice::Constant(self.value)
        }
    }
}

impl From<Slice<'_>> for RawSlice {
    fn from(value: Slice<'_>) -> Self {
        match value {
            Slice::Constant(value) => Self::constant(value),
            Slice::Span(span) => Self::span(span),
        }
    }
}

/// Sum two slices. Constants fold and silence forwards the other operand.
pub fn add<'a>(lhs: Slice<'a>, rhs: Slice<'a>, out: &mut [f32]) -> Produced<'a> {
    match (lhs, rhs) {
        (Slice::Constant(a), Slice::Constant(b)) => Produced::Slice(Slice::Constant(a + b)),
        (Slice::Constant(c), other) | (other, Slice::Constant(c)) if c == 0.0 => {
            Produced::Slice(other)
        }
        (Slice::Constant(c), Slice::Span(span)) | (Slice::Span(span), Slice::Constant(c)) => {
            for (out, x) in out.iter_mut().zip(span) {
                *out = x + c;
            }
            Produced::Buffer
        }
        (Slice::Span(a), Slice::Span(b)) => {
            for ((out, a), b) in out.iter_mut().zip(a).zip(b) {
                *out = a + b;
            }
            Produced::Buffer
        }
    }
}

/// Multiply two slices. Zero and unity constants short circuit.
pub fn multiply<'a>(lhs: Slice<'a>, rhs: Slice<'a>, out: &mut [f32]) -> Produced<'a> {
    match (lhs, rhs) {
        (Slice::Constant(a), Slice::Constant(b)) => Produced::Slice(Slice::Constant(a * b)),
        (Slice::Constant(c), _) | (_, Slice::Constant(c)) if c == 0.0 => {
            Produced::Slice(Slice::SILENCE)
        }
        (Slice::Constant(c), other) | (other, Slice::Constant(c)) if c == 1.0 => {
            Produced::Slice(other)
        }
        (Slice::Constant(c), Slice::Span(span)) | (Slice::Span(span), Slice::Constant(c)) => {
            for (out, x) in out.iter_mut().zip(span) {
                *out = x * c;
            }
            Produced::Buffer
        }
        (Slice::Span(a), Slice::Span(b)) => {
            for ((out, a), b) in out.iter_mut().zip(a).zip(b) {
                *out = a * b;
            }
            Produced::Buffer
        }
    }
}

/// Clamp every sample to `[min, max]`.
pub fn clip<'a>(input: Slice<'a>, min: f32, max: f32, out: &mut [f32]) -> Produced<'a> {
    debug_assert!(min <= max);
    match input {
        Slice::Constant(value) => Produced::Slice(Slice::Constant(value.clamp(min, max))),
        Slice::Span(span) => {
            for (out, x) in out.iter_mut().zip(span) {
                *out = x.clamp(min, max);
            }
            Produced::Buffer
        }
    }
}
