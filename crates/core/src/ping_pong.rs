//! Double buffering by index swap.
//!
//! `PingPong` owns two buffers and tracks which one is current (read) and
//! which is next (write). Calling `swap()` flips the index; buffer contents
//! are never copied. The invariant `src_index() + dst_index() == 1` always
//! holds.

/// A pair of owned buffers with a "which is current" index.
#[derive(Debug, Clone)]
pub struct PingPong<T> {
    buffers: [T; 2],
    current: usize,
}

impl<T> PingPong<T> {
    /// Creates a pair with `front` as the current buffer and `back` as the next.
    pub fn new(front: T, back: T) -> Self {
        Self {
            buffers: [front, back],
            current: 0,
        }
    }

    /// Index of the current (read) buffer.
    pub fn src_index(&self) -> usize {
        self.current
    }

    /// Index of the next (write) buffer.
    pub fn dst_index(&self) -> usize {
        1 - self.current
    }

    /// The current buffer.
    pub fn current(&self) -> &T {
        &self.buffers[self.current]
    }

    /// Mutable access to the current buffer, for additive writes that must be
    /// visible to the next read (impulses).
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.buffers[self.current]
    }

    /// The next buffer.
    pub fn next(&self) -> &T {
        &self.buffers[1 - self.current]
    }

    /// Mutable access to the next buffer.
    pub fn next_mut(&mut self) -> &mut T {
        &mut self.buffers[1 - self.current]
    }

    /// Borrows the current buffer for reading and the next for writing at
    /// the same time.
    pub fn split_mut(&mut self) -> (&T, &mut T) {
        let current = self.current;
        let [a, b] = &mut self.buffers;
        if current == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    /// Both buffers, in storage order.
    pub fn buffers_mut(&mut self) -> &mut [T; 2] {
        &mut self.buffers
    }

    /// Flips which buffer is read from and which is written to.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }
}

impl<T: Clone> PingPong<T> {
    /// Creates a pair of two copies of `initial`.
    pub fn from_initial(initial: T) -> Self {
        Self::new(initial.clone(), initial)
    }
}
