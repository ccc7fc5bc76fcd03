use std::collections::VecDeque;

/// Free-list of detached objects. Past `capacity` the oldest entry is
/// dropped, `take` hands out the most recently parked one.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    free: VecDeque<T>,
    capacity: usize,
}

impl<T> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Parks `item`, returns `true` when an older entry had to go.
    pub fn put(&mut self, item: T) -> bool {
        if self.capacity == 0 {
            return true;
        }
        let overflow = self.free.len() >= self.capacity;
        if overflow {
            self.free.pop_front();
        }
        self.free.push_back(item);
        overflow
    }

    pub fn take(&mut self) -> Option<T> {
        self.free.pop_back()
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_past_capacity() {
        let mut pool = Pool::new(2);
        assert!(!pool.put(1));
        assert!(!pool.put(2));
        assert!(pool.put(3));
        assert_eq!(pool.take(), Some(3));
        assert_eq!(pool.take(), Some(2));
        assert_eq!(pool.take(), None);
    }
}
