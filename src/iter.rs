use core::{fmt, iter::FusedIterator, marker::PhantomData, ptr::NonNull};

use allocator_api2::alloc::{Allocator, Global};

use crate::Deque;

/// Borrowing iterator over a [`Deque`], front to back.
///
/// Holds the deque and a window `[front, back)` of logical indices; every
/// step goes through the deque's index translation.
pub struct Iter<'a, T, A: Allocator = Global> {
    deque: &'a Deque<T, A>,
    front: usize,
    back: usize,
}

/// Mutable counterpart of [`Iter`].
pub struct IterMut<'a, T, A: Allocator = Global> {
    // a raw pointer rather than `&'a mut`, since the yielded `&'a mut T`s
    // must outlive each call to next(). the directory is only ever read.
    deque: NonNull<Deque<T, A>>,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut Deque<T, A>>,
}

/// Owning iterator, created by [`Deque::into_iter`](IntoIterator::into_iter).
pub struct IntoIter<T, A: Allocator = Global>(Deque<T, A>);

impl<'a, T, A: Allocator> Iter<'a, T, A> {
    #[inline]
    pub(crate) fn new(deque: &'a Deque<T, A>) -> Self {
        Self { deque, front: 0, back: deque.len() }
    }
}

impl<'a, T, A: Allocator> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: front < back <= len
        let t = unsafe { self.deque.get_unchecked(self.front) };
        self.front += 1;
        Some(t)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<'a, T, A: Allocator> DoubleEndedIterator for Iter<'a, T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { self.deque.get_unchecked(self.back) })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<'a, T, A: Allocator> ExactSizeIterator for Iter<'a, T, A> {
    #[inline]
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<'a, T, A: Allocator> FusedIterator for Iter<'a, T, A> {}

impl<'a, T, A: Allocator> Clone for Iter<'a, T, A> {
    #[inline]
    fn clone(&self) -> Self {
        Self { deque: self.deque, front: self.front, back: self.back }
    }
}

impl<'a, T: fmt::Debug, A: Allocator> fmt::Debug for Iter<'a, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct IterFormatter<'a, 'b, T, A: Allocator>(&'b Iter<'a, T, A>);

        impl<'a, 'b, T: fmt::Debug, A: Allocator> fmt::Debug for IterFormatter<'a, 'b, T, A> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list().entries(self.0.clone()).finish()
            }
        }

        f.debug_tuple("Iter").field(&IterFormatter(self)).finish()
    }
}

impl<'a, T, A: Allocator> IterMut<'a, T, A> {
    #[inline]
    pub(crate) fn new(deque: &'a mut Deque<T, A>) -> Self {
        let back = deque.len();
        Self { deque: NonNull::from(deque), front: 0, back, _marker: PhantomData }
    }

    /// Shared view of the elements not yet yielded.
    #[inline]
    pub fn as_iter(&self) -> Iter<'_, T, A> {
        Iter { deque: unsafe { self.deque.as_ref() }, front: self.front, back: self.back }
    }
}

impl<'a, T, A: Allocator> Iterator for IterMut<'a, T, A> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: every index in [front, back) is live and yielded at most once,
        // and the elements live outside the `Deque` struct itself.
        let t = unsafe { &mut *self.deque.as_ref().ptr_at_id(self.front) };
        self.front += 1;
        Some(t)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<'a, T, A: Allocator> DoubleEndedIterator for IterMut<'a, T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { &mut *self.deque.as_ref().ptr_at_id(self.back) })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<'a, T, A: Allocator> ExactSizeIterator for IterMut<'a, T, A> {
    #[inline]
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<'a, T, A: Allocator> FusedIterator for IterMut<'a, T, A> {}

unsafe impl<'a, T: Send, A: Allocator + Sync> Send for IterMut<'a, T, A> {}

unsafe impl<'a, T: Sync, A: Allocator + Sync> Sync for IterMut<'a, T, A> {}

impl<'a, T: fmt::Debug, A: Allocator> fmt::Debug for IterMut<'a, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct IterMutFormatter<'a, 'b, T, A: Allocator>(&'b IterMut<'a, T, A>);

        impl<'a, 'b, T: fmt::Debug, A: Allocator> fmt::Debug for IterMutFormatter<'a, 'b, T, A> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list().entries(self.0.as_iter()).finish()
            }
        }

        f.debug_tuple("IterMut").field(&IterMutFormatter(self)).finish()
    }
}

impl<T, A: Allocator> IntoIter<T, A> {
    #[inline]
    pub(crate) fn new(deque: Deque<T, A>) -> Self {
        Self(deque)
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.pop_back()
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {
    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T: Clone, A: Allocator + Clone> Clone for IntoIter<T, A> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.0).finish()
    }
}
