//! Id-range pagination
//!
//! Pages over `servers` and `requests` are addressed by an inclusive
//! `[min_id, max_id]` window of surrogate keys instead of OFFSET/LIMIT, so a
//! page keeps showing the same rows while new requests are appended.

/// Largest page a caller may request
pub const MAX_PAGE_COUNT: i64 = 100;

/// Default first id when the query string does not carry one
pub const DEFAULT_PAGE_START: i64 = 1;

/// Default page size when the query string does not carry one
pub const DEFAULT_PAGE_COUNT: i64 = 10;

/// Clamp a requested page size into `1..=MAX_PAGE_COUNT`
pub fn clamp_page_count(page_count: i64) -> i64 {
    page_count.clamp(1, MAX_PAGE_COUNT)
}

/// Resolve a requested page into an inclusive id window
///
/// Out-of-range starts snap back to the last full page ending at `total`
/// rather than producing an empty page. When the table holds fewer rows than
/// one page the window starts at 1.
///
/// # Example
///
/// ```
/// use hoststats::ledger::resolve_window;
///
/// assert_eq!(resolve_window(21, 10, 25), (16, 25));
/// assert_eq!(resolve_window(1, 10, 0), (1, 10));
/// ```
pub fn resolve_window(page_start: i64, page_count: i64, total: i64) -> (i64, i64) {
    let page_count = clamp_page_count(page_count);
    let mut start = page_start.max(1);

    let max_possible_start = total.saturating_sub(page_count - 1);
    if start > max_possible_start {
        start = max_possible_start;
    }
    let start = start.max(1);

    (start, start + page_count - 1)
}

/// Row offset for conventional page-number pagination
///
/// Used where ids are sparse (a single server's requests), so an id window
/// cannot guarantee full pages.
pub fn page_offset(page: i64, page_count: i64) -> (i64, i64) {
    let page_count = clamp_page_count(page_count);
    let page = page.max(1);
    ((page - 1).saturating_mul(page_count), page_count)
}
