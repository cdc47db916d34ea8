#![no_main]
use std::collections::VecDeque;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use segdeque::Deque;

#[derive(Arbitrary, Debug)]
struct Input {
    cells: u8,
    ops: Vec<(Side, Op)>,
}

/// Which of the two deque/model pairs an op applies to.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

#[derive(Arbitrary, Debug)]
enum Op {
    Append,
    Clear,
    Clone,
    CloneFrom,
    Contains(i32),
    Cursor(usize, isize),
    CursorWrite(usize, i32),
    Get(usize),
    IndexWrite(usize, i32),
    Iter,
    IterMut(i32),
    PopBack,
    PopFront,
    PushBack(i32),
    PushFront(i32),
    Swap(usize, usize),
    Truncate(usize),
}

const MAX_LEN: usize = 1000000;

/// A deque under test next to the `VecDeque` it must agree with.
struct Pair {
    d: Deque<i32>,
    v: VecDeque<i32>,
}

impl Pair {
    fn new(cells: usize) -> Self {
        Self { d: Deque::with_cells(cells), v: VecDeque::new() }
    }

    fn check(&self) {
        assert_eq!(self.d.len(), self.v.len());
        assert_eq!(self.d.is_empty(), self.v.is_empty());
        assert_eq!(self.d.front(), self.v.front());
        assert_eq!(self.d.back(), self.v.back());
        assert!(self.d.iter().eq(self.v.iter()));
    }

    /// Maps an arbitrary index onto a live one, if there is any.
    fn live(&self, i: usize) -> Option<usize> {
        (!self.v.is_empty()).then(|| i % self.v.len())
    }
}

fuzz_target!(|input: Input| { fuzz(input.cells, &input.ops) });

fn fuzz(cells: u8, ops: &[(Side, Op)]) {
    let cells = usize::from(cells % 8) + 1;
    let mut pairs = [Pair::new(cells), Pair::new(cells)];

    for &(side, ref op) in ops {
        let [left, right] = &mut pairs;
        let (this, other) = match side {
            Side::Left => (left, right),
            Side::Right => (right, left),
        };

        match *op {
            Op::Append => {
                this.d.append(&mut other.d);
                this.v.append(&mut other.v);
                other.check();
            }
            Op::Clear => {
                this.d.clear();
                this.v.clear();
            }
            Op::Clone => {
                this.d = other.d.clone();
                this.v = other.v.clone();
            }
            Op::CloneFrom => {
                this.d.clone_from(&other.d);
                this.v.clone_from(&other.v);
            }
            Op::Contains(x) => assert_eq!(this.d.contains(&x), this.v.contains(&x)),
            Op::Cursor(start, offset) => {
                let len = this.v.len();
                let start = start % (len + 1);
                let target = start as isize + offset % (len as isize + 1);
                if (0..=len as isize).contains(&target) {
                    let mut c = this.d.cursor_at(start);
                    c += target - start as isize;
                    assert_eq!(c.index(), target as usize);
                    assert_eq!(c.get(), this.v.get(target as usize));
                    assert_eq!(c - this.d.cursor_front(), target);
                    assert_eq!(this.d.cursor_end() - c, len as isize - target);
                }
            }
            Op::CursorWrite(i, x) => {
                if let Some(i) = this.live(i) {
                    *this.d.cursor_at_mut(i).get_mut().unwrap() = x;
                    this.v[i] = x;
                }
            }
            Op::Get(i) => {
                assert_eq!(this.d.get(i), this.v.get(i));
                if let Some(i) = this.live(i) {
                    assert_eq!(this.d.get(i), this.v.get(i));
                }
            }
            Op::IndexWrite(i, x) => {
                if let Some(i) = this.live(i) {
                    this.d[i] = x;
                    this.v[i] = x;
                }
            }
            Op::Iter => {
                let mut di = this.d.iter();
                let mut vi = this.v.iter();
                while vi.len() > 0 {
                    assert_eq!(di.len(), vi.len());
                    if fastrand::bool() {
                        assert_eq!(di.next(), vi.next());
                    } else {
                        assert_eq!(di.next_back(), vi.next_back());
                    }
                }
                assert_eq!(di.next(), None);
            }
            Op::IterMut(x) => {
                this.d.iter_mut().for_each(|e| *e = e.wrapping_add(x));
                this.v.iter_mut().for_each(|e| *e = e.wrapping_add(x));
            }
            Op::PopBack => assert_eq!(this.d.pop_back(), this.v.pop_back()),
            Op::PopFront => assert_eq!(this.d.pop_front(), this.v.pop_front()),
            Op::PushBack(x) => {
                if this.v.len() < MAX_LEN {
                    this.d.push_back(x);
                    this.v.push_back(x);
                }
            }
            Op::PushFront(x) => {
                if this.v.len() < MAX_LEN {
                    this.d.push_front(x);
                    this.v.push_front(x);
                }
            }
            Op::Swap(i, j) => {
                if let (Some(i), Some(j)) = (this.live(i), this.live(j)) {
                    this.d.swap(i, j);
                    this.v.swap(i, j);
                }
            }
            Op::Truncate(n) => {
                this.d.truncate(n);
                this.v.truncate(n);
            }
        }
        this.check();
    }
}
