//! A double-ended queue stored as a directory of fixed-size blocks.
//!
//! Elements live in blocks of `cells` slots each. The directory holds one
//! (possibly null) pointer per block and is logically rotated: the front of
//! the deque sits at absolute slot `head` of the flattened `blocks * cells`
//! space and the sequence wraps around its end. Pushing at either end never
//! moves an element; when the directory runs out of room only the block
//! pointers are copied into a larger directory, in logical order.
//!
//! ```
//! use segdeque::Deque;
//!
//! let mut d = Deque::with_cells(4);
//! d.push_back(11);
//! d.push_back(28);
//! d.push_front(99);
//! assert_eq!(d, [99, 11, 28]);
//! assert_eq!(d.pop_front(), Some(99));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod cursor;
mod error;
mod iter;

pub use cursor::{Cursor, CursorMut};
pub use error::TryPushError;
pub use iter::{IntoIter, Iter, IterMut};

pub use allocator_api2::alloc::{AllocError, Allocator, Global};

use alloc::{alloc::handle_alloc_error, vec::Vec};

#[cfg(feature = "std")]
use std::io;

use core::{
    alloc::Layout,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Index, IndexMut},
    ptr::{self, NonNull},
    slice,
};

/// Number of cells per block used by [`Deque::new`] and by every constructor
/// that doesn't take an explicit block size.
pub const DEFAULT_CELLS: usize = 16;

/// A directory entry: either a block of `cells` uninitialized slots or null.
type Block<T> = Option<NonNull<T>>;

pub struct Deque<T, A: Allocator = Global> {
    data: NonNull<Block<T>>,
    blocks: usize,
    cells: usize,
    len: usize,
    head: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T> Deque<T> {
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty deque whose blocks hold `cells` elements each.
    ///
    /// # Panics
    /// Panics if `cells` is zero.
    #[inline]
    pub fn with_cells(cells: usize) -> Self {
        Self::with_cells_in(cells, Global)
    }
}

impl<T, A: Allocator> Deque<T, A> {
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            data: NonNull::dangling(),
            blocks: 0,
            cells: DEFAULT_CELLS,
            len: 0,
            head: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn with_cells_in(cells: usize, alloc: A) -> Self {
        assert!(cells != 0, "a deque block must hold at least one cell");
        let mut this = Self::new_in(alloc);
        this.cells = cells;
        this
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of cells the current directory can address.
    ///
    /// Blocks are allocated lazily, so this is not the amount of element
    /// storage actually held.
    #[inline]
    pub const fn capacity(&self) -> usize {
        // reallocate() refuses directories whose cell count would overflow
        self.blocks * self.cells
    }

    #[inline]
    pub const fn cells_per_block(&self) -> usize {
        self.cells
    }

    #[inline]
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    fn directory(&self) -> &[Block<T>] {
        // a zero-length slice over the dangling pointer is fine
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.blocks) }
    }

    #[inline]
    fn directory_mut(&mut self) -> &mut [Block<T>] {
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.blocks) }
    }

    /// Absolute slot of logical index `id`.
    ///
    /// `id` may equal `self.len()` (the slot a new back element goes to) but
    /// must not exceed the capacity, which must be non-zero.
    #[inline]
    fn ia_from_id(&self, id: usize) -> usize {
        debug_assert!(self.blocks != 0 && id <= self.capacity());
        // computed this way so that `head + id` never has to be formed
        let cap = self.capacity();
        if id < cap - self.head {
            self.head + id
        } else {
            id - (cap - self.head)
        }
    }

    #[inline]
    fn ib_from_id(&self, id: usize) -> usize {
        self.ia_from_id(id) / self.cells
    }

    #[inline]
    fn ic_from_id(&self, id: usize) -> usize {
        self.ia_from_id(id) % self.cells
    }

    /// `(block, cell)` of logical index `id`.
    #[inline]
    fn locate(&self, id: usize) -> (usize, usize) {
        let ia = self.ia_from_id(id);
        (ia / self.cells, ia % self.cells)
    }

    /// # Safety
    /// Block `ib` must be allocated, which is the case for every block that
    /// hosts a live element.
    #[inline]
    unsafe fn block_ptr(&self, ib: usize) -> NonNull<T> {
        debug_assert!(self.directory()[ib].is_some());
        (*self.data.as_ptr().add(ib)).unwrap_unchecked()
    }

    /// # Safety
    /// `id` must be smaller than `self.len()`.
    /// If acquired through a const ref, the returned pointer
    /// may not be used to mutate the element
    #[inline]
    pub(crate) unsafe fn ptr_at_id(&self, id: usize) -> *mut T {
        let (ib, ic) = self.locate(id);
        self.block_ptr(ib).as_ptr().add(ic)
    }

    #[inline]
    pub fn get(&self, id: usize) -> Option<&T> {
        if id >= self.len {
            None
        } else {
            Some(unsafe { self.get_unchecked(id) })
        }
    }

    /// # Safety
    /// Callers must ensure that `id < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, id: usize) -> &T {
        &*self.ptr_at_id(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: usize) -> Option<&mut T> {
        if id >= self.len {
            None
        } else {
            Some(unsafe { self.get_unchecked_mut(id) })
        }
    }

    /// # Safety
    /// Callers must ensure that `id < self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, id: usize) -> &mut T {
        &mut *self.ptr_at_id(id)
    }

    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|id| self.get(id))
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        match self.len.checked_sub(1) {
            Some(id) => self.get_mut(id),
            None => None,
        }
    }

    #[inline]
    fn block_layout(&self) -> Layout {
        Self::array_layout::<T>(self.cells)
    }

    #[inline]
    fn array_layout<U>(len: usize) -> Layout {
        match Layout::array::<U>(len) {
            Ok(l) if l.size() <= isize::MAX as _ => l,
            _ => capacity_overflow(),
        }
    }

    /// Returns block `ib`, allocating it first if its directory slot is null.
    /// On failure the slot stays null and the failed layout is returned.
    fn block_or_allocate(&mut self, ib: usize) -> Result<NonNull<T>, Layout> {
        if let Some(block) = self.directory()[ib] {
            return Ok(block);
        }
        let layout = self.block_layout();
        let block = self.alloc.allocate(layout).map_err(|_| layout)?.cast::<T>();
        self.directory_mut()[ib] = Some(block);
        Ok(block)
    }

    /// # Safety
    /// No live element may remain in block `ib`.
    unsafe fn release_block(&mut self, ib: usize) {
        if let Some(block) = self.directory_mut()[ib].take() {
            self.alloc.deallocate(block.cast(), self.block_layout());
        }
    }

    /// Frees every remaining block and the directory without dropping any
    /// element. Leaves the deque in the freshly constructed state.
    ///
    /// # Safety
    /// Any element still counted in `self.len` is leaked, never dropped.
    unsafe fn free_storage(&mut self) {
        for ib in 0..self.blocks {
            self.release_block(ib);
        }
        if self.blocks != 0 {
            let layout = Self::array_layout::<Block<T>>(self.blocks);
            self.alloc.deallocate(self.data.cast(), layout);
        }
        self.data = NonNull::dangling();
        self.blocks = 0;
        self.len = 0;
        self.head = 0;
    }

    /// Whether a push at the back needs a bigger directory first: either
    /// every cell is taken, or the next slot opens a block that already
    /// holds the front of the deque.
    #[inline]
    fn back_is_blocked(&self) -> bool {
        self.len == self.capacity()
            || (self.len != 0
                && self.ic_from_id(self.len) == 0
                && self.ib_from_id(self.len) == self.ib_from_id(0))
    }

    /// Mirror image of `back_is_blocked()`: the slot before the front would
    /// land in the block that holds the back.
    #[inline]
    fn front_is_blocked(&self) -> bool {
        self.len == self.capacity()
            || (self.len != 0
                && self.head % self.cells == 0
                && self.head_before() / self.cells == self.ib_from_id(self.len - 1))
    }

    /// Absolute slot just before the front. The capacity must be non-zero.
    #[inline]
    fn head_before(&self) -> usize {
        self.head.checked_sub(1).unwrap_or(self.capacity() - 1)
    }

    #[cold]
    fn grow(&mut self) -> Result<(), Layout> {
        let new_blocks = match self.blocks {
            0 => 1,
            blocks => blocks.checked_mul(2).unwrap_or_else(|| capacity_overflow()),
        };
        self.reallocate(new_blocks)
    }

    /// Moves the block pointers into a directory of `new_blocks` entries,
    /// laid out in logical order starting at entry 0, so only the offset of
    /// the front within its block survives as rotation. No element is
    /// touched unless the front block also holds the back of the deque, in
    /// which case the cells in front of the head are moved to a fresh block.
    ///
    /// On failure nothing has changed and the failed layout is returned.
    fn reallocate(&mut self, new_blocks: usize) -> Result<(), Layout> {
        debug_assert!(new_blocks > self.blocks);
        if new_blocks.checked_mul(self.cells).is_none() {
            capacity_overflow();
        }

        let dir_layout = Self::array_layout::<Block<T>>(new_blocks);
        let new_data: NonNull<Block<T>> =
            self.alloc.allocate(dir_layout).map_err(|_| dir_layout)?.cast();

        let (first, offset) = match self.blocks {
            0 => (0, 0),
            _ => (self.head / self.cells, self.head % self.cells),
        };
        // number of blocks the elements occupy once the rotation is undone
        let span = match self.len {
            0 => 0,
            len => (offset + len - 1) / self.cells + 1,
        };
        let kept = span.min(self.blocks);

        // span == blocks + 1 means the front block wraps around onto itself
        let split = if span > self.blocks {
            let layout = self.block_layout();
            match self.alloc.allocate(layout) {
                Ok(block) => Some(block.cast::<T>()),
                Err(_) => {
                    unsafe { self.alloc.deallocate(new_data.cast(), dir_layout) };
                    return Err(layout);
                }
            }
        } else {
            None
        };

        unsafe {
            let old = self.data.as_ptr();
            let new = new_data.as_ptr();

            for k in 0..kept {
                new.add(k).write(*old.add((first + k) % self.blocks));
            }

            let mut next = kept;
            if let Some(tail) = split {
                let (_, back_cell) = self.locate(self.len - 1);
                let front = self.block_ptr(first);
                ptr::copy_nonoverlapping(front.as_ptr(), tail.as_ptr(), back_cell + 1);
                new.add(next).write(Some(tail));
                next += 1;
            }

            for k in next..new_blocks {
                new.add(k).write(None);
            }

            if self.blocks != 0 {
                let old_layout = Self::array_layout::<Block<T>>(self.blocks);
                self.alloc.deallocate(self.data.cast(), old_layout);
            }
        }

        self.data = new_data;
        self.blocks = new_blocks;
        self.head = offset;
        Ok(())
    }

    #[inline]
    pub fn push_back(&mut self, value: T) {
        if let Err(err) = self.try_push_back(value) {
            handle_alloc_error(err.layout())
        }
    }

    #[inline]
    pub fn push_front(&mut self, value: T) {
        if let Err(err) = self.try_push_front(value) {
            handle_alloc_error(err.layout())
        }
    }

    /// Appends `value` at the back, handing it back if the allocator fails.
    ///
    /// The deque is unchanged when an error is returned.
    pub fn try_push_back(&mut self, value: T) -> Result<(), TryPushError<T>> {
        if self.back_is_blocked() {
            if let Err(layout) = self.grow() {
                return Err(TryPushError::new(value, layout));
            }
        }

        let (ib, ic) = self.locate(self.len);
        let block = match self.block_or_allocate(ib) {
            Ok(block) => block,
            Err(layout) => return Err(TryPushError::new(value, layout)),
        };

        // SAFETY: the slot behind the back is inside an allocated block and holds no element
        unsafe { block.as_ptr().add(ic).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Prepends `value` at the front, handing it back if the allocator fails.
    ///
    /// The deque is unchanged when an error is returned.
    pub fn try_push_front(&mut self, value: T) -> Result<(), TryPushError<T>> {
        if self.front_is_blocked() {
            if let Err(layout) = self.grow() {
                return Err(TryPushError::new(value, layout));
            }
        }

        let new_head = self.head_before();
        let (ib, ic) = (new_head / self.cells, new_head % self.cells);
        let block = match self.block_or_allocate(ib) {
            Ok(block) => block,
            Err(layout) => return Err(TryPushError::new(value, layout)),
        };

        // SAFETY: the slot before the front is inside an allocated block and holds no element
        unsafe { block.as_ptr().add(ic).write(value) };
        self.head = new_head;
        self.len += 1;
        Ok(())
    }

    /// Removes the front element. Its block is freed once no other element
    /// lives in it.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let (ib, ic) = self.locate(0);
        let val = unsafe { self.block_ptr(ib).as_ptr().add(ic).read() };
        let vacated = self.len == 1
            || (self.ib_from_id(1) != ib && self.ib_from_id(self.len - 1) != ib);

        // the head stays put when the deque runs empty
        if self.len > 1 {
            self.head = self.ia_from_id(1);
        }
        self.len -= 1;

        if vacated {
            unsafe { self.release_block(ib) };
        }
        Some(val)
    }

    /// Removes the back element. Its block is freed once no other element
    /// lives in it.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let (ib, ic) = self.locate(self.len - 1);
        let val = unsafe { self.block_ptr(ib).as_ptr().add(ic).read() };
        let vacated = self.len == 1
            || (self.ib_from_id(self.len - 2) != ib && self.ib_from_id(0) != ib);

        self.len -= 1;

        if vacated {
            unsafe { self.release_block(ib) };
        }
        Some(val)
    }

    /// Drops every element front to back and frees their blocks. The
    /// directory is kept for later pushes.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
        self.head = 0;
    }

    /// Drops elements from the back until at most `len` remain.
    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            self.pop_back();
        }
    }

    /// Moves every element of `other` to the back of `self`, leaving `other`
    /// empty.
    pub fn append(&mut self, other: &mut Self) {
        while let Some(val) = other.pop_front() {
            self.push_back(val);
        }
    }

    #[inline]
    pub fn contains(&self, t: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|e| e == t)
    }

    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        if i >= self.len || j >= self.len {
            panic!(
                "swap indices out of bounds: tried to swap {i} and {j} on a Deque of length {}",
                self.len
            );
        }
        unsafe { ptr::swap(self.ptr_at_id(i), self.ptr_at_id(j)) }
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter::new(self)
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, A> {
        IterMut::new(self)
    }

    /// Cursor on the front element; equal to `cursor_end()` when empty.
    #[inline]
    pub fn cursor_front(&self) -> Cursor<'_, T, A> {
        Cursor::new(self, 0)
    }

    /// Cursor one past the back element.
    #[inline]
    pub fn cursor_end(&self) -> Cursor<'_, T, A> {
        Cursor::new(self, self.len)
    }

    /// # Panics
    /// Panics if `id > self.len()`.
    #[inline]
    pub fn cursor_at(&self, id: usize) -> Cursor<'_, T, A> {
        Cursor::new(self, id)
    }

    #[inline]
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, A> {
        CursorMut::new(self, 0)
    }

    #[inline]
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, T, A> {
        let len = self.len;
        CursorMut::new(self, len)
    }

    #[inline]
    pub fn cursor_at_mut(&mut self, id: usize) -> CursorMut<'_, T, A> {
        CursorMut::new(self, id)
    }
}

#[cold]
#[track_caller]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

impl<T, A: Allocator> Drop for Deque<T, A> {
    fn drop(&mut self) {
        struct DeallocGuard<'a, T, A: Allocator>(&'a mut Deque<T, A>);

        impl<'a, T, A: Allocator> Drop for DeallocGuard<'a, T, A> {
            fn drop(&mut self) {
                // if an element destructor unwound, the elements behind it are leaked
                unsafe { self.0.free_storage() }
            }
        }

        let mut guard = DeallocGuard(self);
        guard.0.clear();
    }
}

impl<T, A: Allocator> Extend<T> for Deque<T, A> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|val| self.push_back(val));
    }
}

impl<'a, T: 'a + Copy, A: Allocator> Extend<&'a T> for Deque<T, A> {
    #[inline]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl<T> FromIterator<T> for Deque<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut this = Self::new();
        this.extend(iter);
        this
    }
}

impl<T> From<Vec<T>> for Deque<T> {
    #[inline]
    fn from(v: Vec<T>) -> Self {
        v.into_iter().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    #[inline]
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T, A: Allocator> From<Deque<T, A>> for Vec<T> {
    #[inline]
    fn from(d: Deque<T, A>) -> Self {
        let mut v = Vec::with_capacity(d.len());
        v.extend(d);
        v
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Deque<T, A> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// The copy is laid out from scratch: default block size, front at slot 0,
/// regardless of how `self` is rotated.
impl<T: Clone, A: Allocator + Clone> Clone for Deque<T, A> {
    #[inline]
    fn clone(&self) -> Self {
        let mut this = Self::new_in(self.alloc.clone());
        this.extend(self.iter().cloned());
        this
    }

    /// Assigns into the overlapping prefix in place, then drops or appends
    /// the rest. `self` keeps its allocator and block size, since the
    /// allocator owns the blocks already in place.
    fn clone_from(&mut self, source: &Self) {
        let shared = self.len.min(source.len);
        self.iter_mut().zip(source.iter()).for_each(|(dst, src)| dst.clone_from(src));
        self.truncate(source.len);
        self.extend(source.iter().skip(shared).cloned());
    }
}

impl<T> Default for Deque<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq<U>, U, A: Allocator, B: Allocator> PartialEq<Deque<U, B>> for Deque<T, A> {
    #[inline]
    fn eq(&self, other: &Deque<U, B>) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: PartialEq<U>, U, A: Allocator> PartialEq<[U]> for Deque<T, A> {
    #[inline]
    fn eq(&self, other: &[U]) -> bool {
        self.len == other.len() && self.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<T: PartialEq<U>, U, A: Allocator, const N: usize> PartialEq<[U; N]> for Deque<T, A> {
    #[inline]
    fn eq(&self, other: &[U; N]) -> bool {
        self == other.as_slice()
    }
}

impl<T: PartialOrd, A: Allocator> PartialOrd for Deque<T, A> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T: Ord, A: Allocator> Ord for Deque<T, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other)
    }
}

impl<T: Eq, A: Allocator> Eq for Deque<T, A> {}

impl<T: Hash, A: Allocator> Hash for Deque<T, A> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        self.iter().for_each(|t| t.hash(state));
    }
}

impl<T, A: Allocator> Index<usize> for Deque<T, A> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).expect("Out of bounds access")
    }
}

impl<T, A: Allocator> IndexMut<usize> for Deque<T, A> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.get_mut(index).expect("Out of bounds access")
    }
}

unsafe impl<T: Send, A: Allocator + Send> Send for Deque<T, A> {}

unsafe impl<T: Sync, A: Allocator + Sync> Sync for Deque<T, A> {}

#[cfg(feature = "std")]
impl<A: Allocator> io::Write for Deque<u8, A> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend(buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<A: Allocator> io::Read for Deque<u8, A> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut read = 0;
        for slot in buf.iter_mut() {
            match self.pop_front() {
                Some(byte) => *slot = byte,
                None => break,
            }
            read += 1;
        }
        Ok(read)
    }

    fn read_to_end(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let len = self.len;
        buf.reserve(len);
        buf.extend(self.iter());
        self.clear();
        Ok(len)
    }
}

impl<T, A: Allocator> IntoIterator for Deque<T, A> {
    type Item = T;

    type IntoIter = IntoIter<T, A>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Deque<T, A> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T, A>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Deque<T, A> {
    type Item = &'a mut T;

    type IntoIter = IterMut<'a, T, A>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
