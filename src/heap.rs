use core::fmt;
use std::cmp::Ordering;

/// A binary min-heap, with a custom comparator.
///
/// `std::collections::BinaryHeap` requires `Ord` on the element, but events are ordered by
/// floating point keys, so the ordering is given as a closure instead.
pub struct Heap<T, F> {
    data: Vec<T>,
    cmp: F,
}
impl<T, F: Fn(&T, &T) -> Ordering> Heap<T, F> {
    pub fn with_capacity(capacity: usize, cmp: F) -> Self {
        Heap {
            data: Vec::with_capacity(capacity),
            cmp,
        }
    }

    pub fn push(&mut self, value: T) {
        self.data.push(value);
        self.sift_up(self.data.len() - 1);
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let ret = self.data.swap_remove(0);
        self.sift_down(0);
        Some(ret)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    fn less(&self, a: usize, b: usize) -> bool {
        (self.cmp)(&self.data[a], &self.data[b]) == Ordering::Less
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = (i - 1) / 2;
            if !self.less(i, p) {
                break;
            }
            self.data.swap(i, p);
            i = p;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        while 2 * i + 1 < self.data.len() {
            let l = 2 * i + 1;
            let r = l + 1;
            let j = if r < self.data.len() && self.less(r, l) {
                r
            } else {
                l
            };
            if !self.less(j, i) {
                break;
            }
            self.data.swap(i, j);
            i = j;
        }
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Heap<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.data)
    }
}
