//! Fixed-capacity blocking channel.
//!
//! Classic bounded buffer: `put` waits while the buffer is full, `get` waits
//! while it is empty, and each side wakes the other. Items are never dropped;
//! capacity pressure always shows up as a blocked producer.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// Thread-safe FIFO with a fixed capacity.
#[derive(Debug)]
pub struct BoundedChannel<T> {
    buffer: Mutex<VecDeque<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedChannel<T> {
    /// Creates a channel holding at most `capacity` items (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Maximum number of buffered items.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Returns true if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Appends `item`, blocking while the channel is full.
    pub fn put(&self, item: T) {
        let mut buffer = self.buffer.lock();
        while buffer.len() >= self.capacity {
            self.not_full.wait(&mut buffer);
        }
        buffer.push_back(item);
        drop(buffer);
        self.not_empty.notify_one();
    }

    /// Removes the oldest item, blocking while the channel is empty.
    pub fn get(&self) -> T {
        let mut buffer = self.buffer.lock();
        loop {
            if let Some(item) = buffer.pop_front() {
                drop(buffer);
                self.not_full.notify_one();
                return item;
            }
            self.not_empty.wait(&mut buffer);
        }
    }

    /// Takes exactly `n` items, blocking until each arrives.
    pub fn take(&self, n: usize) -> Vec<T> {
        (0..n).map(|_| self.get()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let channel = BoundedChannel::new(3);
        channel.put(1);
        channel.put(2);
        channel.put(3);
        assert_eq!(channel.len(), 3);
        assert_eq!(channel.take(3), vec![1, 2, 3]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let channel = BoundedChannel::<u8>::new(0);
        assert_eq!(channel.capacity(), 1);
    }

    #[test]
    fn test_put_blocks_until_get() {
        let channel = Arc::new(BoundedChannel::new(1));
        channel.put(0);

        let producer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.put(1))
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(channel.len(), 1);
        assert_eq!(channel.get(), 0);
        producer.join().unwrap();
        assert_eq!(channel.get(), 1);
    }

    #[test]
    fn test_get_blocks_until_put() {
        let channel = Arc::new(BoundedChannel::new(2));
        let consumer = {
            let channel = Arc::clone(&channel);
            thread::spawn(move || channel.get())
        };
        thread::sleep(Duration::from_millis(20));
        channel.put(42);
        assert_eq!(consumer.join().unwrap(), 42);
    }
}
