//! Page arithmetic and cyclic page traversal
//!
//! An address's outputs are visited in fixed-size pages of the key-ordered
//! index. The search starts at some page and walks forward, wrapping at the
//! end, until every page has been visited exactly once.

/// Number of pages needed to cover `count` outputs
pub fn page_count(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Position of one page inside the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    /// Number of outputs before the page
    pub offset: usize,
    /// Number of outputs on the page
    pub limit: usize,
}

/// Bounds of page `page` when `count` outputs are split into `page_size` pages
///
/// Every page holds `page_size` outputs except the last, which holds the
/// remainder.
pub fn page_bounds(page: usize, count: usize, page_size: usize) -> PageBounds {
    let offset = page.saturating_mul(page_size).min(count);
    let limit = page_size.min(count - offset);
    PageBounds { offset, limit }
}

/// Visits every page index once, starting at `start` and wrapping around
#[derive(Debug, Clone)]
pub struct PageRing {
    pages: usize,
    start: usize,
    visited: usize,
}

impl PageRing {
    /// Create a ring over `pages` pages
    ///
    /// `start` is reduced modulo `pages`.
    pub fn new(pages: usize, start: usize) -> Self {
        let start = if pages == 0 { 0 } else { start % pages };
        Self {
            pages,
            start,
            visited: 0,
        }
    }

    /// Total number of pages
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Number of pages handed out so far
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Whether every page has been handed out
    pub fn is_complete(&self) -> bool {
        self.visited >= self.pages
    }
}

impl Iterator for PageRing {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.is_complete() {
            return None;
        }

        let page = (self.start + self.visited) % self.pages;
        self.visited += 1;
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.pages - self.visited;
        (remaining, Some(remaining))
    }
}
