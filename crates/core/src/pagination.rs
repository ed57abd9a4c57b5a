//! Client-side pagination.

/// Return the 1-based `page` window of `per_page` items.
///
/// `paginate(items, 2, 10)` over 25 items yields items 11 through 20. A page
/// of zero, a zero page size, or a window past the end yields an empty slice.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }

    let start = (page - 1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(items.len());
    items.get(start..end).unwrap_or(&[])
}

/// Whether items remain after the given page.
#[must_use]
pub const fn has_next_page(total: usize, page: usize, per_page: usize) -> bool {
    total > page.saturating_mul(per_page)
}
