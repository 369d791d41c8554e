/// A fixed-size ringbuffer
///
/// Grows until it reaches `capacity`, then overwrites its oldest element on every push.
#[derive(Debug, Default, Clone)]
pub struct RingBuffer<T> {
    buffer: Vec<T>,
    ix: usize,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// **Panics** if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "RingBuffer capacity must be nonzero.");
        Self {
            buffer: Vec::<T>::with_capacity(capacity),
            ix: 0,
            capacity,
        }
    }

    /// Returns the buffer length
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an element into the buffer, overwriting the oldest element, and return the write index
    pub fn push(&mut self, item: T) -> usize {
        let ix = self.ix;
        if ix >= self.len() {
            self.buffer.push(item);
        } else {
            self.buffer[ix] = item;
        }
        self.ix = (ix + 1) % self.capacity;
        ix
    }

    /// Get a slice view of the internal buffer in storage order
    pub fn view(&self) -> &[T] {
        &self.buffer
    }

    /// Iterate over the stored elements from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        // Until the buffer is full `ix == len`, so the first half is empty
        let (newer, older) = self.buffer.split_at(self.ix.min(self.len()));
        older.iter().chain(newer.iter())
    }

    /// The most recently pushed element
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let ix = (self.ix + self.capacity - 1) % self.capacity;
        self.buffer.get(ix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ringbuffer_functional() {
        let mut buf = RingBuffer::new(4);
        assert_eq!(buf.len(), 0, "initialized empty");
        assert!(buf.last().is_none(), "no last element when empty");

        for i in 0..4 {
            buf.push(i * 2);
        }

        assert_eq!(buf.len(), 4, "length correct");
        assert_eq!(buf.view(), [0, 2, 4, 6], "contents correct");
        assert_eq!(buf.last(), Some(&6), "last element correct");

        buf.push(1);
        let ix = buf.push(3);
        assert_eq!(ix, 1, "write index is correct");
        assert_eq!(buf.len(), 4, "length unchanged");
        assert_eq!(buf.view(), [1, 3, 4, 6], "contents overwritten correctly");
        assert_eq!(buf.last(), Some(&3), "last element follows the write index");
    }

    #[test]
    fn ringbuffer_iter_is_fifo() {
        let mut buf = RingBuffer::new(3);
        buf.push(1);
        buf.push(2);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), [1, 2], "partial fill");

        for i in 3..=5 {
            buf.push(i);
        }
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), [3, 4, 5], "oldest first");
        assert_eq!(buf.capacity(), 3, "capacity unchanged");
    }

    #[test]
    #[should_panic(expected = "capacity must be nonzero")]
    fn ringbuffer_zero_capacity() {
        RingBuffer::<u8>::new(0);
    }
}
