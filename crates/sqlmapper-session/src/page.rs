//! Page requests and results.

use serde::{Deserialize, Serialize};

/// Page size used when none (or a non-positive one) is given.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// What the pagination rewriter needs from a page.
///
/// Object safe, so the rewriter can work on any page without knowing its
/// record type.
pub trait Pageable {
    /// Current page, 1-based.
    fn current(&self) -> i64;

    /// Rows per page.
    fn size(&self) -> i64;

    /// Matching rows across all pages.
    fn total(&self) -> u64;

    fn set_total(&mut self, total: u64);

    /// Drop whatever records the page holds.
    fn clear_records(&mut self);

    /// Whether to run the COUNT query.
    fn search_count(&self) -> bool {
        true
    }

    /// Sort ascending when [`orders`](Self::orders) is set.
    fn asc(&self) -> bool {
        true
    }

    /// Comma separated ORDER BY columns.
    fn orders(&self) -> Option<&str> {
        None
    }

    /// Number of pages, 0 when the size is not positive.
    fn pages(&self) -> u64 {
        match u64::try_from(self.size()) {
            Ok(size) if size > 0 => self.total().div_ceil(size),
            _ => 0,
        }
    }

    /// Rows skipped before this page.
    fn offset(&self) -> u64 {
        let current = u64::try_from(self.current()).unwrap_or(0);
        let size = u64::try_from(self.size()).unwrap_or(0);
        current.saturating_sub(1).saturating_mul(size)
    }
}

/// A page request that also carries the result once the query ran.
///
/// The caller builds it, the rewriter fills in `total`, the mapper fills in
/// `records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    current: i64,
    size: i64,
    total: u64,
    records: Vec<T>,
    hit_count: bool,
    search_count: bool,
    asc: bool,
    orders: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            current: 1,
            size: DEFAULT_PAGE_SIZE,
            total: 0,
            records: Vec::new(),
            hit_count: false,
            search_count: true,
            asc: true,
            orders: None,
        }
    }
}

impl<T> Page<T> {
    /// Page `current` of `size` rows. Non-positive values fall back to page 1
    /// and [`DEFAULT_PAGE_SIZE`].
    pub fn new(current: i64, size: i64) -> Self {
        Self::default().set_current(current).set_size(size)
    }

    pub fn set_current(mut self, current: i64) -> Self {
        self.current = if current > 0 { current } else { 1 };
        self
    }

    pub fn set_size(mut self, size: i64) -> Self {
        self.size = if size > 0 { size } else { DEFAULT_PAGE_SIZE };
        self
    }

    /// Sort the page by `orders` (a comma separated column list).
    pub fn order_by(mut self, orders: impl Into<String>, asc: bool) -> Self {
        self.orders = Some(orders.into());
        self.asc = asc;
        self
    }

    /// Skip the COUNT query.
    pub fn without_count(mut self) -> Self {
        self.search_count = false;
        self
    }

    pub fn hit_count(&self) -> bool {
        self.hit_count
    }

    pub fn set_hit_count(&mut self, hit: bool) {
        self.hit_count = hit;
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn set_records(&mut self, records: Vec<T>) {
        self.records = records;
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    /// Same page geometry and counters, different records.
    pub fn map_records<U>(self, records: Vec<U>) -> Page<U> {
        Page {
            current: self.current,
            size: self.size,
            total: self.total,
            records,
            hit_count: self.hit_count,
            search_count: self.search_count,
            asc: self.asc,
            orders: self.orders,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        u64::try_from(self.current).is_ok_and(|c| c < self.pages())
    }
}

impl<T> Pageable for Page<T> {
    fn current(&self) -> i64 {
        self.current
    }

    fn size(&self) -> i64 {
        self.size
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn set_total(&mut self, total: u64) {
        self.total = total;
    }

    fn clear_records(&mut self) {
        self.records.clear();
    }

    fn search_count(&self) -> bool {
        self.search_count
    }

    fn asc(&self) -> bool {
        self.asc
    }

    fn orders(&self) -> Option<&str> {
        self.orders.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_non_positive_input() {
        let page: Page<()> = Page::new(0, -5);
        assert_eq!(page.current(), 1);
        assert_eq!(page.size(), DEFAULT_PAGE_SIZE);
        assert!(page.search_count());
    }

    #[test]
    fn derived_counters() {
        let mut page: Page<()> = Page::new(3, 10);
        page.set_total(23);
        assert_eq!(page.pages(), 3);
        assert_eq!(page.offset(), 20);
        assert!(page.has_previous());
        assert!(!page.has_next());

        page.set_total(0);
        assert_eq!(page.pages(), 0);
    }

    #[test]
    fn serializes_records() {
        let mut page = Page::new(2, 5).order_by("name", false);
        page.set_records(vec!["a", "b"]);
        page.set_total(7);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["current"], 2);
        assert_eq!(json["records"], serde_json::json!(["a", "b"]));
        assert_eq!(json["orders"], "name");
        assert_eq!(json["asc"], false);

        let back: Page<String> = serde_json::from_str(r#"{"current":4}"#).unwrap();
        assert_eq!(back.current(), 4);
        assert_eq!(back.size(), DEFAULT_PAGE_SIZE);
    }
}
