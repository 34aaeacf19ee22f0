use super::types::{PagedResult, QueryParams};

/// Window a sequence and project the page.
///
/// `total_count` is the length of the whole sequence; the echoed `page` is the
/// requested one, `page_size` the effective (clamped) one.
pub fn paginate<I, B, R, F>(records: I, params: &QueryParams, project: F) -> PagedResult<R>
where
    I: IntoIterator<Item = B>,
    I::IntoIter: ExactSizeIterator,
    F: FnMut(B) -> R,
{
    let iter = records.into_iter();
    let total_count = iter.len();
    let page_size = params.effective_page_size();
    let items = iter.skip(params.skip()).take(page_size).map(project).collect();
    PagedResult { items, total_count, page: params.page, page_size }
}
