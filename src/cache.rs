// src/cache.rs
//! Two-state read-through cache slot used by every entity.
//!
//! A slot is either `Unset` or `Populated`; mutating operations on the
//! owning entity call `invalidate` so the next access re-fetches. There
//! is no time-based expiry.

#[derive(Debug, Clone)]
pub(crate) enum Cache<T> {
    Unset,
    Populated(T),
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Cache::Unset
    }
}

impl<T> Cache<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Cache::Populated(value) => Some(value),
            Cache::Unset => None,
        }
    }

    pub fn populate(&mut self, value: T) {
        *self = Cache::Populated(value);
    }

    pub fn invalidate(&mut self) {
        *self = Cache::Unset;
    }
}
