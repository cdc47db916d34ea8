use core::{
    fmt,
    ops::{Add, AddAssign, Sub, SubAssign},
    ptr,
};

use allocator_api2::alloc::{Allocator, Global};

use crate::Deque;

/// A random-access position in a [`Deque`].
///
/// A cursor names a logical index in `0..=len`; `len` is the end position,
/// which has no element. Cursors are cheap to copy, can be moved by any
/// signed offset and subtracted from each other. The borrow on the deque
/// keeps it from being modified while a cursor is alive.
///
/// ```
/// use segdeque::Deque;
///
/// let d: Deque<_> = [31, 49, 55, 67].into();
/// let mut c = d.cursor_front();
/// c += 3;
/// assert_eq!(c.get(), Some(&67));
/// assert_eq!(d.cursor_end() - d.cursor_front(), 4);
/// ```
pub struct Cursor<'a, T, A: Allocator = Global> {
    deque: &'a Deque<T, A>,
    index: usize,
}

/// A position in a [`Deque`] that can update the element under it.
pub struct CursorMut<'a, T, A: Allocator = Global> {
    deque: &'a mut Deque<T, A>,
    index: usize,
}

#[track_caller]
fn offset_index(index: usize, offset: isize, len: usize) -> usize {
    match index.checked_add_signed(offset) {
        Some(i) if i <= len => i,
        _ => panic!("cursor moved by {offset} from {index}, outside of a deque of length {len}"),
    }
}

impl<'a, T, A: Allocator> Cursor<'a, T, A> {
    #[inline]
    #[track_caller]
    pub(crate) fn new(deque: &'a Deque<T, A>, index: usize) -> Self {
        assert!(
            index <= deque.len(),
            "cursor index {index} out of range for a deque of length {}",
            deque.len()
        );
        Self { deque, index }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.index == self.deque.len()
    }

    /// The element under the cursor, `None` at the end position.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.deque.get(self.index)
    }

    /// # Panics
    /// Panics when already at the end position.
    #[inline]
    #[track_caller]
    pub fn move_next(&mut self) {
        self.seek(1)
    }

    /// # Panics
    /// Panics when already at the front.
    #[inline]
    #[track_caller]
    pub fn move_prev(&mut self) {
        self.seek(-1)
    }

    /// # Panics
    /// Panics if the new position would fall outside `0..=len`.
    #[inline]
    #[track_caller]
    pub fn seek(&mut self, offset: isize) {
        self.index = offset_index(self.index, offset, self.deque.len());
    }
}

impl<'a, T, A: Allocator> Clone for Cursor<'a, T, A> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, A: Allocator> Copy for Cursor<'a, T, A> {}

/// Two cursors are equal when they sit at the same index of the same deque.
impl<'a, T, A: Allocator> PartialEq for Cursor<'a, T, A> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.deque, other.deque) && self.index == other.index
    }
}

impl<'a, T, A: Allocator> Eq for Cursor<'a, T, A> {}

impl<'a, T, A: Allocator> AddAssign<isize> for Cursor<'a, T, A> {
    #[inline]
    #[track_caller]
    fn add_assign(&mut self, offset: isize) {
        self.seek(offset)
    }
}

impl<'a, T, A: Allocator> SubAssign<isize> for Cursor<'a, T, A> {
    #[inline]
    #[track_caller]
    fn sub_assign(&mut self, offset: isize) {
        self.seek(offset.checked_neg().expect("cursor offset overflow"))
    }
}

impl<'a, T, A: Allocator> Add<isize> for Cursor<'a, T, A> {
    type Output = Self;

    #[inline]
    #[track_caller]
    fn add(mut self, offset: isize) -> Self {
        self += offset;
        self
    }
}

impl<'a, T, A: Allocator> Sub<isize> for Cursor<'a, T, A> {
    type Output = Self;

    #[inline]
    #[track_caller]
    fn sub(mut self, offset: isize) -> Self {
        self -= offset;
        self
    }
}

/// Signed distance between two cursors of the same deque.
impl<'a, T, A: Allocator> Sub for Cursor<'a, T, A> {
    type Output = isize;

    #[inline]
    fn sub(self, other: Self) -> isize {
        debug_assert!(ptr::eq(self.deque, other.deque), "cursors belong to different deques");
        self.index as isize - other.index as isize
    }
}

impl<'a, T: fmt::Debug, A: Allocator> fmt::Debug for Cursor<'a, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("index", &self.index).field("current", &self.get()).finish()
    }
}

impl<'a, T, A: Allocator> CursorMut<'a, T, A> {
    #[inline]
    #[track_caller]
    pub(crate) fn new(deque: &'a mut Deque<T, A>, index: usize) -> Self {
        assert!(
            index <= deque.len(),
            "cursor index {index} out of range for a deque of length {}",
            deque.len()
        );
        Self { deque, index }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.index == self.deque.len()
    }

    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.deque.get(self.index)
    }

    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.deque.get_mut(self.index)
    }

    /// Consumes the cursor, keeping the element under it borrowed for `'a`.
    #[inline]
    pub fn into_mut(self) -> Option<&'a mut T> {
        self.deque.get_mut(self.index)
    }

    #[inline]
    pub fn as_cursor(&self) -> Cursor<'_, T, A> {
        Cursor { deque: &*self.deque, index: self.index }
    }

    #[inline]
    #[track_caller]
    pub fn move_next(&mut self) {
        self.seek(1)
    }

    #[inline]
    #[track_caller]
    pub fn move_prev(&mut self) {
        self.seek(-1)
    }

    #[inline]
    #[track_caller]
    pub fn seek(&mut self, offset: isize) {
        self.index = offset_index(self.index, offset, self.deque.len());
    }
}

impl<'a, T, A: Allocator> AddAssign<isize> for CursorMut<'a, T, A> {
    #[inline]
    #[track_caller]
    fn add_assign(&mut self, offset: isize) {
        self.seek(offset)
    }
}

impl<'a, T, A: Allocator> SubAssign<isize> for CursorMut<'a, T, A> {
    #[inline]
    #[track_caller]
    fn sub_assign(&mut self, offset: isize) {
        self.seek(offset.checked_neg().expect("cursor offset overflow"))
    }
}

impl<'a, T: fmt::Debug, A: Allocator> fmt::Debug for CursorMut<'a, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut").field("index", &self.index).field("current", &self.get()).finish()
    }
}
