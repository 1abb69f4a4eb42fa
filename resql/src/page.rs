//! Windows over a sorted, filtered result set.

use crate::resource::Resource;
use std::ops::Range;

/// Where a page is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartingPoint {
    Beginning,
    End,
    /// The page starts at this index
    OffsetStart(usize),
    /// The page ends at this index, inclusive
    OffsetEnd(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start: StartingPoint,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(start: StartingPoint, page_size: usize) -> Self { Self { start, page_size } }

    /// Indices of the page within `total` results, clamped to the results that exist
    pub fn range(&self, total: usize) -> Range<usize> {
        let size = self.page_size;
        let (start, end) = match self.start {
            StartingPoint::Beginning => (0, size),
            StartingPoint::End => (total.saturating_sub(size), total),
            StartingPoint::OffsetStart(offset) => (offset, offset.saturating_add(size)),
            StartingPoint::OffsetEnd(offset) => {
                let end = offset.saturating_add(1).min(total);
                (end.saturating_sub(size), end)
            }
        };
        let end = end.min(total);
        start.min(end)..end
    }

    /// Cut the page out of `resources`
    pub fn apply(&self, mut resources: Vec<Resource>) -> PageResponse {
        let total_count = resources.len();
        let range = self.range(total_count);
        let previous = range.start.checked_sub(1).and_then(|i| resources.get(i)).cloned();
        let next = resources.get(range.end).cloned();
        let offset = range.start;
        resources.truncate(range.end);
        resources.drain(..range.start);
        PageResponse { resources, offset, previous, next, total_count }
    }
}

/// One page of results and its neighbours
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub resources: Vec<Resource>,
    /// Index of the first resource of the page
    pub offset: usize,
    /// The resource just before the page
    pub previous: Option<Resource>,
    /// The resource just after the page
    pub next: Option<Resource>,
    /// Number of matching resources before paging
    pub total_count: usize,
}

impl PageResponse {
    /// Every resource as a single page
    pub fn whole(resources: Vec<Resource>) -> Self {
        let total_count = resources.len();
        PageResponse { resources, offset: 0, previous: None, next: None, total_count }
    }
}
