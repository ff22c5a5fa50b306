//! Document-granularity pagination over the ranked document order.

use crate::error::SearchError;
use crate::types::PageRequest;
use std::num::NonZeroUsize;

/// A validated page: zero-indexed page number and positive page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub size: NonZeroUsize,
}

impl Page {
    /// Validates raw pagination arguments.
    ///
    /// Returns `Ok(None)` when either argument is absent (pagination disabled).
    pub fn from_request(request: PageRequest) -> Result<Option<Self>, SearchError> {
        let (Some(page), Some(page_size)) = (request.page, request.page_size) else {
            return Ok(None);
        };

        if page_size <= 0 {
            return Err(SearchError::InvalidPaginationArgument(format!(
                "page_size must be positive, got {}",
                page_size
            )));
        }
        if page < 0 {
            return Err(SearchError::InvalidPaginationArgument(format!(
                "page must not be negative, got {}",
                page
            )));
        }

        let invalid = |what: &str| {
            SearchError::InvalidPaginationArgument(format!("{} is too large", what))
        };
        let index = usize::try_from(page).map_err(|_| invalid("page"))?;
        let size = usize::try_from(page_size)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| invalid("page_size"))?;

        Ok(Some(Self { index, size }))
    }

    /// Offset of the first document on this page, saturating on overflow.
    pub fn offset(&self) -> usize {
        self.index.saturating_mul(self.size.get())
    }
}

/// Selects the ranked documents at offsets `[k*n, k*n + n)`, or all of them without a page.
///
/// A page past the end yields an empty slice rather than an error.
pub fn window<T>(ranked: &[T], page: Option<Page>) -> &[T] {
    let Some(page) = page else {
        return ranked;
    };
    let start = page.offset().min(ranked.len());
    let end = start.saturating_add(page.size.get()).min(ranked.len());
    &ranked[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    fn page(k: i64, n: i64) -> Option<Page> {
        Page::from_request(PageRequest::page(k, n)).unwrap()
    }

    #[rstest]
    #[case(PageRequest::all())]
    #[case(PageRequest { page: Some(2), page_size: None })]
    #[case(PageRequest { page: None, page_size: Some(0) })]
    fn test_missing_argument_disables_pagination(#[case] request: PageRequest) {
        check!(Page::from_request(request).unwrap().is_none());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(0, -3)]
    #[case(-1, 10)]
    fn test_invalid_arguments_rejected(#[case] k: i64, #[case] n: i64) {
        let_assert!(
            Err(SearchError::InvalidPaginationArgument(_)) =
                Page::from_request(PageRequest::page(k, n))
        );
    }

    #[rstest]
    #[case(0, 2, vec![0, 1])]
    #[case(1, 2, vec![2, 3])]
    #[case(2, 2, vec![4])]
    #[case(3, 2, vec![])]
    #[case(100, 2, vec![])]
    #[case(0, 10, vec![0, 1, 2, 3, 4])]
    fn test_window(#[case] k: i64, #[case] n: i64, #[case] expected: Vec<i32>) {
        let ranked = [0, 1, 2, 3, 4];
        check!(window(&ranked, page(k, n)) == expected.as_slice());
    }

    #[test]
    fn test_window_without_page_is_everything() {
        let ranked = [7, 8, 9];
        check!(window(&ranked, None) == &ranked[..]);
    }

    #[test]
    fn test_huge_offset_saturates() {
        let ranked = [1, 2, 3];
        check!(window(&ranked, page(i64::MAX, i64::MAX)).is_empty());
    }

    #[test]
    fn test_consecutive_pages_partition_the_ranking() {
        let ranked: Vec<u32> = (0..23).collect();
        let mut seen = vec![];
        for k in 0..5 {
            seen.extend_from_slice(window(&ranked, page(k, 5)));
        }
        check!(seen == ranked);
    }
}
