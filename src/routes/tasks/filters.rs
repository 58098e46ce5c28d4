//! Turns raw list parameters into [`TaskFilters`] and derives page metadata.

use super::dto::TaskListQuery;
use super::model::{Pagination, TaskFilters};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Never fails: anything out of range falls back to a default.
pub fn normalize(query: TaskListQuery) -> TaskFilters {
    let page = query
        .page
        .filter(|p| *p >= 1)
        .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
        .unwrap_or(DEFAULT_PAGE);

    let limit = query
        .limit
        .filter(|l| (1..=i64::from(MAX_LIMIT)).contains(l))
        .and_then(|l| u32::try_from(l).ok())
        .unwrap_or(DEFAULT_LIMIT);

    TaskFilters {
        completed: query.completed,
        search: query.search,
        page,
        limit,
    }
}

pub fn compute_pagination(total_items: u64, filters: &TaskFilters) -> Pagination {
    // limit >= 1 is guaranteed by `normalize`
    let per_page = u64::from(filters.limit);

    Pagination {
        current_page: filters.page,
        per_page: filters.limit,
        total_pages: total_items.div_ceil(per_page),
        total_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, limit: Option<i64>) -> TaskListQuery {
        TaskListQuery {
            page,
            limit,
            ..Default::default()
        }
    }

    #[test]
    fn defaults_when_absent() {
        let filters = normalize(TaskListQuery::default());
        assert_eq!(filters.page, 1);
        assert_eq!(filters.limit, 10);
        assert_eq!(filters.completed, None);
        assert_eq!(filters.search, None);
    }

    #[test]
    fn out_of_range_limit_falls_back_to_default() {
        assert_eq!(normalize(query(None, Some(0))).limit, 10);
        assert_eq!(normalize(query(None, Some(500))).limit, 10);
        assert_eq!(normalize(query(None, Some(-3))).limit, 10);
        assert_eq!(normalize(query(None, Some(1))).limit, 1);
        assert_eq!(normalize(query(None, Some(100))).limit, 100);
    }

    #[test]
    fn page_below_one_becomes_one() {
        assert_eq!(normalize(query(Some(0), None)).page, 1);
        assert_eq!(normalize(query(Some(-7), None)).page, 1);
        assert_eq!(normalize(query(Some(4), None)).page, 4);
    }

    #[test]
    fn completed_and_search_pass_through() {
        let filters = normalize(TaskListQuery {
            completed: Some(false),
            search: Some("Buy".into()),
            ..Default::default()
        });
        assert_eq!(filters.completed, Some(false));
        assert_eq!(filters.search.as_deref(), Some("Buy"));
    }

    #[test]
    fn pagination_rounds_pages_up() {
        let filters = normalize(query(Some(3), Some(10)));
        let p = compute_pagination(25, &filters);

        assert_eq!(p.current_page, 3);
        assert_eq!(p.per_page, 10);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total_items, 25);
        assert_eq!(filters.offset(), 20);
    }

    #[test]
    fn pagination_of_empty_set_has_zero_pages() {
        let p = compute_pagination(0, &normalize(TaskListQuery::default()));
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.total_items, 0);
    }
}
