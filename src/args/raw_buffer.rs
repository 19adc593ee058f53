use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use crate::error::{HarnessError, Result};

/// A pointer argument, the Rust counterpart of a `T*` parameter.
///
/// Before every call the harness copies `count` elements behind the pointer into a fresh
/// [RawBuffer] and passes that copy, so the memory behind the pointer is only ever read.
/// `count` comes from the [BufferDescriptor](crate::BufferDescriptor) of the argument
/// position: the value of an integer argument directly following the pointer, or 1 for
/// a lone pointer.
///
/// # Limitations
/// A lone pointer to a larger buffer only has its first element copied. Prefer
/// [RawPtr::from_slice], which remembers the real extent and rejects descriptors that
/// would read past it.
#[derive(Debug)]
pub struct RawPtr<'a, T> {
    ptr: *const T,
    extent: Option<usize>,
    _marker: PhantomData<&'a [T]>,
}

impl<'a, T> Clone for RawPtr<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, T> Copy for RawPtr<'a, T> {}

impl<'a, T: Copy> RawPtr<'a, T> {
    /// Pointer to the first element of `slice`. The slice length is kept as upper bound
    /// for the number of elements copied.
    pub fn from_slice(slice: &'a [T]) -> Self {
        Self {
            ptr: slice.as_ptr(),
            extent: Some(slice.len()),
            _marker: PhantomData,
        }
    }

    /// Wraps a raw pointer with unknown extent.
    ///
    /// # Safety
    /// `ptr` must be valid for reads of as many elements as the descriptor of its argument
    /// position says, and stay valid and unmodified for as long as the benchmark holding it
    /// is alive.
    pub unsafe fn new(ptr: *const T) -> Self {
        Self {
            ptr,
            extent: None,
            _marker: PhantomData,
        }
    }

    /// Number of readable elements, if known.
    pub fn extent(&self) -> Option<usize> {
        self.extent
    }

    /// The wrapped pointer.
    pub fn as_ptr(&self) -> *const T {
        self.ptr
    }

    pub(crate) fn check(&self, count: usize) -> Result<()> {
        if self.ptr.is_null() {
            return Err(HarnessError::invalid("raw buffer argument is a null pointer"));
        }
        match self.extent {
            Some(extent) if count > extent => Err(HarnessError::invalid(format!(
                "raw buffer descriptor wants {count} elements but the buffer holds {extent}"
            ))),
            _ => Ok(()),
        }
    }

    /// Copies `count` elements into freshly allocated storage.
    pub(crate) fn copy_out(&self, count: usize) -> Result<RawBuffer<T>> {
        self.check(count)?;
        let bytes = count.checked_mul(std::mem::size_of::<T>()).ok_or(
            HarnessError::AllocationFailure {
                count,
                bytes: usize::MAX,
            },
        )?;
        let mut storage: Vec<T> = Vec::new();
        storage
            .try_reserve_exact(count)
            .map_err(|_| HarnessError::AllocationFailure { count, bytes })?;
        // SAFETY: the pointer is non-null, `count` is within the known extent (or guaranteed
        // by the caller of `RawPtr::new`), and the reservation above proved that
        // `count * size_of::<T>()` fits into `isize`.
        let source = unsafe { std::slice::from_raw_parts(self.ptr, count) };
        storage.extend_from_slice(source);
        Ok(RawBuffer {
            storage: storage.into_boxed_slice(),
        })
    }

}

/// Owned copy of a raw buffer, handed to the benchmarked functions in place of the pointer.
///
/// It dereferences to a slice and also exposes the pointer/length pair for functions
/// written against raw pointers. The storage is freed when the working set it belongs to
/// is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawBuffer<T> {
    storage: Box<[T]>,
}

impl<T> RawBuffer<T> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Pointer to the first element.
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Mutable pointer to the first element.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage.as_mut_ptr()
    }

    /// The elements as slice.
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    /// The elements as mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage
    }

    /// Converts into a `Vec` without copying.
    pub fn into_vec(self) -> Vec<T> {
        self.storage.into_vec()
    }
}

impl<T> Deref for RawBuffer<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.storage
    }
}

impl<T> DerefMut for RawBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.storage
    }
}
