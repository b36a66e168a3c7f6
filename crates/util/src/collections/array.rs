use std::ops::{Deref, DerefMut, Index, IndexMut};

/// A fixed length, heap allocated array. Indexing is only bounds checked in debug builds.
#[repr(transparent)]
pub struct Array<T> {
    inner: Box<[T]>,
}

impl<T> Array<T> {
    /// Create an array of `len` elements by calling `f` with each index.
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> T) -> Self {
        Self {
            inner: (0..len).map(f).collect(),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        self
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone> Array<T> {
    pub fn filled(len: usize, value: T) -> Self {
        Self {
            inner: vec![value; len].into_boxed_slice(),
        }
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self {
            inner: Box::new([]),
        }
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(value: Vec<T>) -> Self {
        Self {
            inner: value.into_boxed_slice(),
        }
    }
}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<T> Deref for Array<T> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> DerefMut for Array<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<Idx, T> Index<Idx> for Array<T>
where
    Idx: TryInto<usize>,
{
    type Output = T;
    fn index(&self, index: Idx) -> &Self::Output {
        let index = crate::cast_usize!(index);
        debug_assert!(index < self.len(), "index {index} out of bounds");
        unsafe { self.get_unchecked(index) }
    }
}

impl<Idx, T> IndexMut<Idx> for Array<T>
where
    Idx: TryInto<usize>,
{
    fn index_mut(&mut self, index: Idx) -> &mut Self::Output {
        let index = crate::cast_usize!(index);
        debug_assert!(index < self.len(), "index {index} out of bounds");
        unsafe { self.get_unchecked_mut(index) }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
