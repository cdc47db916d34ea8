use core::{alloc::Layout, fmt};

/// Returned by [`Deque::try_push_back`](crate::Deque::try_push_back) and
/// [`Deque::try_push_front`](crate::Deque::try_push_front) when the allocator
/// could not provide a block or a larger directory.
///
/// The rejected value is handed back untouched and the deque is left exactly
/// as it was before the call.
#[derive(Clone, PartialEq, Eq)]
pub struct TryPushError<T> {
    value: T,
    layout: Layout,
}

impl<T> TryPushError<T> {
    #[inline]
    pub(crate) fn new(value: T, layout: Layout) -> Self {
        Self { value, layout }
    }

    /// The layout of the allocation that failed.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Takes back the value that could not be inserted.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }
}

// don't require T: Debug, the value is not interesting here
impl<T> fmt::Debug for TryPushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryPushError").field("layout", &self.layout).finish_non_exhaustive()
    }
}

impl<T> fmt::Display for TryPushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "memory allocation of {} bytes failed while inserting into a deque",
            self.layout.size()
        )
    }
}

#[cfg(feature = "std")]
impl<T> std::error::Error for TryPushError<T> {}
