//! Paging types shared by the list operations of every service.

use crate::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

/// Limit/offset paging, normalised on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    limit: u32,
    offset: u32,
}

impl ListOptions {
    /// A zero limit means "use the default"; larger limits are capped.
    pub fn new(limit: u32, offset: u32) -> Self {
        let limit = match limit {
            0 => DEFAULT_LIST_LIMIT,
            n => n.min(MAX_LIST_LIMIT),
        };
        Self { limit, offset }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// One page of results plus the number of rows matching the query.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_uses_default() {
        assert_eq!(ListOptions::new(0, 3).limit(), DEFAULT_LIST_LIMIT);
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(ListOptions::new(10_000, 0).limit(), MAX_LIST_LIMIT);
        assert_eq!(ListOptions::new(7, 0).limit(), 7);
    }
}
