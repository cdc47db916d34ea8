// profiling driver: steady push/pop churn at both ends plus a refill after
// each clear, so the block allocator and directory growth both show up.

use segdeque::Deque;
use std::hint::black_box;

fn main() {
    let mut d = Deque::new();
    for round in 0..100_000 {
        d.clear();
        d.extend(black_box((0..256).chain(768..1024)));
        for i in 0..256 {
            if (round + i) % 2 == 0 {
                d.push_front(i);
                black_box(d.pop_back());
            } else {
                d.push_back(i);
                black_box(d.pop_front());
            }
        }
    }
    black_box(d.len());
}
