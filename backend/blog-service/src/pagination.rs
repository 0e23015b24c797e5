//! Page slicing for feeds.
//!
//! Page requests come from untyped query strings. [`PageNumber::parse`] is the
//! only place that interprets them; everything downstream works with a
//! validated [`PageNumber`] and never fails on a bad request. Resolution
//! follows these rules:
//!
//! - absent, non-numeric, zero or negative input resolves to page 1
//! - a page past the end resolves to the last page
//! - an empty sequence resolves to page 1 with no items and `total_pages == 0`

use serde::Serialize;

/// Posts shown on every feed page.
pub const POSTS_PER_PAGE: usize = 10;

/// A page request after lenient parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageNumber {
    /// Missing or unusable input; resolves to the first page.
    #[default]
    First,
    /// A positive page number, not yet checked against the page count.
    Exact(u64),
    /// A positive number too large to represent; resolves to the last page.
    PastEnd,
}

impl PageNumber {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return PageNumber::First;
        };

        let (negative, digits) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return PageNumber::First;
        }

        if negative {
            return PageNumber::First;
        }

        match digits.parse::<u64>() {
            Ok(0) => PageNumber::First,
            Ok(n) => PageNumber::Exact(n),
            // all digits but overflowing u64
            Err(_) => PageNumber::PastEnd,
        }
    }
}

/// Position of a resolved page inside a sequence of `total_count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// 1-based page number
    pub number: usize,
    pub total_pages: usize,
    pub total_count: usize,
    /// Index of the first item on this page
    pub offset: usize,
    /// Maximum items on this page
    pub limit: usize,
}

impl PageWindow {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Number of items that actually fall on this page.
    pub fn item_count(&self) -> usize {
        self.total_count
            .saturating_sub(self.offset)
            .min(self.limit)
    }
}

/// Fixed-size page slicer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

impl Paginator {
    /// A zero page size is treated as one item per page.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, total_count: usize) -> usize {
        total_count.div_ceil(self.page_size)
    }

    /// Resolve a request against `total_count` items. Never fails.
    pub fn window(&self, total_count: usize, requested: PageNumber) -> PageWindow {
        let total_pages = self.total_pages(total_count);
        let last = total_pages.max(1);

        let number = match requested {
            PageNumber::First => 1,
            PageNumber::Exact(n) => usize::try_from(n).unwrap_or(usize::MAX).min(last),
            PageNumber::PastEnd => last,
        };

        PageWindow {
            number,
            total_pages,
            total_count,
            offset: (number - 1) * self.page_size,
            limit: self.page_size,
        }
    }

    /// Every page of a `total_count`-item sequence in order. An empty
    /// sequence still yields its single empty page.
    pub fn windows(&self, total_count: usize) -> impl Iterator<Item = PageWindow> + '_ {
        let pages = self.total_pages(total_count).max(1) as u64;
        (1..=pages).map(move |n| self.window(total_count, PageNumber::Exact(n)))
    }

    /// Slice an in-memory sequence.
    pub fn paginate<T: Clone>(&self, items: &[T], requested: PageNumber) -> Page<T> {
        let window = self.window(items.len(), requested);
        let end = window.offset + window.item_count();
        Page::from_window(window, items[window.offset..end].to_vec())
    }
}

/// One resolved page of a feed together with its navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn from_window(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            items,
            page_number: window.number,
            total_pages: window.total_pages,
            total_count: window.total_count,
            has_previous: window.has_previous(),
            has_next: window.has_next(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous.then(|| self.page_number - 1)
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next.then(|| self.page_number + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_number() {
        assert_eq!(PageNumber::parse(None), PageNumber::First);
        assert_eq!(PageNumber::parse(Some("")), PageNumber::First);
        assert_eq!(PageNumber::parse(Some("abc")), PageNumber::First);
        assert_eq!(PageNumber::parse(Some("2.0")), PageNumber::First);
        assert_eq!(PageNumber::parse(Some("0")), PageNumber::First);
        assert_eq!(PageNumber::parse(Some("-3")), PageNumber::First);
        assert_eq!(PageNumber::parse(Some("-")), PageNumber::First);
        assert_eq!(PageNumber::parse(Some("2")), PageNumber::Exact(2));
        assert_eq!(PageNumber::parse(Some(" 7 ")), PageNumber::Exact(7));
        assert_eq!(PageNumber::parse(Some("+4")), PageNumber::Exact(4));
        assert_eq!(
            PageNumber::parse(Some("99999999999999999999999")),
            PageNumber::PastEnd
        );
        assert_eq!(
            PageNumber::parse(Some("-99999999999999999999999")),
            PageNumber::First
        );
    }

    #[test]
    fn test_thirteen_items_split_ten_and_three() {
        let items: Vec<u32> = (0..13).collect();
        let paginator = Paginator::default();

        let first = paginator.paginate(&items, PageNumber::Exact(1));
        assert_eq!(first.len(), 10);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.total_pages, 2);

        let second = paginator.paginate(&items, PageNumber::Exact(2));
        assert_eq!(second.len(), 3);
        assert!(!second.has_next);
        assert!(second.has_previous);
        assert_eq!(second.items, vec![10, 11, 12]);
    }

    #[test]
    fn test_page_count_matches_ceiling() {
        let paginator = Paginator::default();
        for n in 0..=55usize {
            let expected = if n == 0 { 0 } else { (n + 9) / 10 };
            assert_eq!(paginator.total_pages(n), expected, "n={}", n);
            assert_eq!(paginator.windows(n).count(), expected.max(1), "n={}", n);
        }
    }

    #[test]
    fn test_pages_concatenate_to_the_whole_sequence() {
        let paginator = Paginator::new(10);
        for n in 0..=45usize {
            let items: Vec<usize> = (0..n).collect();
            let mut rebuilt = Vec::new();
            for window in paginator.windows(n) {
                let page = paginator.paginate(&items, PageNumber::Exact(window.number as u64));
                assert_eq!(page.page_number, window.number);
                rebuilt.extend(page.items);
            }
            assert_eq!(rebuilt, items, "n={}", n);
        }
    }

    #[test]
    fn test_out_of_range_requests_are_clamped() {
        let items: Vec<u32> = (0..25).collect();
        let paginator = Paginator::default();

        assert_eq!(paginator.paginate(&items, PageNumber::First).page_number, 1);
        assert_eq!(paginator.paginate(&items, PageNumber::Exact(3)).page_number, 3);
        assert_eq!(paginator.paginate(&items, PageNumber::Exact(4)).page_number, 3);
        assert_eq!(paginator.paginate(&items, PageNumber::Exact(u64::MAX)).page_number, 3);
        assert_eq!(paginator.paginate(&items, PageNumber::PastEnd).page_number, 3);

        let clamped = paginator.paginate(&items, PageNumber::parse(Some("40")));
        assert_eq!(clamped.items, vec![20, 21, 22, 23, 24]);

        let lenient = paginator.paginate(&items, PageNumber::parse(Some("-1")));
        assert_eq!(lenient.page_number, 1);
    }

    #[test]
    fn test_empty_sequence_yields_single_empty_page() {
        let items: Vec<u32> = Vec::new();
        let paginator = Paginator::default();

        for requested in [PageNumber::First, PageNumber::Exact(5), PageNumber::PastEnd] {
            let page = paginator.paginate(&items, requested);
            assert!(page.is_empty());
            assert_eq!(page.page_number, 1);
            assert_eq!(page.total_pages, 0);
            assert_eq!(page.total_count, 0);
            assert!(!page.has_next);
            assert!(!page.has_previous);
        }
    }

    #[test]
    fn test_window_offsets() {
        let paginator = Paginator::new(10);
        let window = paginator.window(13, PageNumber::Exact(2));
        assert_eq!(window.offset, 10);
        assert_eq!(window.limit, 10);
        assert_eq!(window.item_count(), 3);
    }

    #[test]
    fn test_neighbour_page_numbers() {
        let items: Vec<u32> = (0..30).collect();
        let page = Paginator::default().paginate(&items, PageNumber::Exact(2));
        assert_eq!(page.previous_page_number(), Some(1));
        assert_eq!(page.next_page_number(), Some(3));
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(Paginator::new(0).page_size(), 1);
    }
}
