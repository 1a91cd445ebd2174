//! Page link planning
//!
//! Combines window selection, option handling and URL construction into a
//! [`PagePlan`]: the ordered entries of a pagination control plus the URLs of
//! its first/previous/next/last arrows. Rendering the plan is left to the
//! caller.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::PaginateOptions;
use crate::pagination::{compute_window, PaginationError, WindowSlot};
use crate::query::QueryParams;
use crate::url::{build_url, NamespaceFallback, NoReverseMatch, RouteResolver, UrlContext};

/// Error type for planning
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error(transparent)]
    Route(#[from] NoReverseMatch),
}

/// The page being displayed, as reported by the paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-indexed page number
    pub number: usize,
    pub num_pages: usize,
    /// Items per page, needed for index ranges
    pub per_page: Option<usize>,
    /// Total number of items, needed for index ranges
    pub count: Option<usize>,
}

impl PageInfo {
    pub fn new(number: usize, num_pages: usize) -> Self {
        Self {
            number,
            num_pages,
            per_page: None,
            count: None,
        }
    }

    #[must_use]
    pub fn with_counts(mut self, per_page: usize, count: usize) -> Self {
        self.per_page = Some(per_page);
        self.count = Some(count);
        self
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page(&self) -> Option<usize> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn next_page(&self) -> Option<usize> {
        self.has_next().then(|| self.number + 1)
    }

    /// Check that `count` items at `per_page` per page fill `num_pages`
    ///
    /// An empty result still has one page. Without both counts there is
    /// nothing to check.
    pub fn validate_counts(&self) -> Result<(), PaginationError> {
        let (Some(per_page), Some(count)) = (self.per_page, self.count) else {
            return Ok(());
        };

        if per_page == 0 {
            return Err(PaginationError::InvalidPerPage);
        }

        let expected = count.div_ceil(per_page).max(1);
        if expected != self.num_pages {
            return Err(PaginationError::CountMismatch {
                count,
                per_page,
                expected,
                total: self.num_pages,
            });
        }

        Ok(())
    }

    /// 1-based indexes of the first and last item on `page`
    ///
    /// `None` without counts, or when `page` holds no items.
    pub fn index_range(&self, page: usize) -> Option<IndexRange> {
        let per_page = self.per_page.filter(|n| *n > 0)?;
        let count = self.count?;

        if count == 0 {
            return (page == 1).then_some(IndexRange { start: 0, end: 0 });
        }

        let start = page.checked_sub(1)?.checked_mul(per_page)?.checked_add(1)?;
        if start > count {
            return None;
        }

        Some(IndexRange {
            start,
            end: page.saturating_mul(per_page).min(count),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

/// One entry of a pagination control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEntry {
    Number {
        page: usize,
        is_current: bool,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        index_range: Option<IndexRange>,
    },
    Ellipsis,
}

impl PageEntry {
    pub fn page(&self) -> Option<usize> {
        match self {
            PageEntry::Number { page, .. } => Some(*page),
            PageEntry::Ellipsis => None,
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, PageEntry::Number { is_current: true, .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            PageEntry::Number { url, .. } => Some(url),
            PageEntry::Ellipsis => None,
        }
    }
}

/// Everything a presentation layer needs to draw the control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePlan {
    pub current_page: usize,
    pub total_pages: usize,
    pub entries: Vec<PageEntry>,
    pub first_url: Option<String>,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub last_url: Option<String>,
}

/// Plans the links of a pagination control
///
/// Named routes go through a [`NamespaceFallback`] so a bare route name is
/// retried once with the project namespace.
#[derive(Debug, Clone)]
pub struct PageLinkPlanner<R> {
    options: PaginateOptions,
    resolver: NamespaceFallback<R>,
    path: String,
}

impl<R: RouteResolver> PageLinkPlanner<R> {
    pub fn new(options: PaginateOptions, resolver: R) -> Self {
        Self {
            options,
            resolver: NamespaceFallback::new(resolver, None),
            path: String::new(),
        }
    }

    /// Namespace used when a route name doesn't resolve as given
    #[must_use]
    pub fn with_namespace(self, namespace: Option<String>) -> Self {
        Self {
            resolver: NamespaceFallback::new(self.resolver.into_inner(), namespace),
            ..self
        }
    }

    /// Path that rewritten query strings are appended to
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn options(&self) -> &PaginateOptions {
        &self.options
    }

    /// Build the plan for `page`
    ///
    /// # Arguments
    /// * `page` - Current page and page count
    /// * `request_query` - Query parameters of the current request
    pub fn plan(
        &self,
        page: &PageInfo,
        request_query: &QueryParams,
    ) -> Result<PagePlan, PlanError> {
        page.validate_counts()?;
        let slots = compute_window(page.number, page.num_pages, self.options.range)?;
        let context = self.options.url_context(&self.path, request_query);

        debug!(
            "Planning page {} of {} with {} slots",
            page.number,
            page.num_pages,
            slots.len()
        );

        let entries = slots
            .into_iter()
            .map(|slot| self.entry(slot, page, &context))
            .collect::<Result<Vec<_>, _>>()?;

        let url_for = |n: usize| build_url(n, &context, &self.resolver);

        let (previous_url, next_url) = if self.options.show_prev_next {
            (
                page.previous_page().map(url_for).transpose()?,
                page.next_page().map(url_for).transpose()?,
            )
        } else {
            (None, None)
        };

        let (first_url, last_url) = if self.options.show_first_last {
            (
                page.has_previous().then(|| url_for(1)).transpose()?,
                page.has_next().then(|| url_for(page.num_pages)).transpose()?,
            )
        } else {
            (None, None)
        };

        Ok(PagePlan {
            current_page: page.number,
            total_pages: page.num_pages,
            entries,
            first_url,
            previous_url,
            next_url,
            last_url,
        })
    }

    fn entry(
        &self,
        slot: WindowSlot,
        page: &PageInfo,
        context: &UrlContext,
    ) -> Result<PageEntry, NoReverseMatch> {
        let number = match slot {
            WindowSlot::Ellipsis => return Ok(PageEntry::Ellipsis),
            WindowSlot::Page(number) => number,
        };

        let index_range = if self.options.show_index_range {
            page.index_range(number)
        } else {
            None
        };

        Ok(PageEntry::Number {
            page: number,
            is_current: number == page.number,
            url: build_url(number, context, &self.resolver)?,
            index_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{Route, RouteTable};

    fn planner(args: &[&str]) -> PageLinkPlanner<RouteTable> {
        PageLinkPlanner::new(PaginateOptions::parse(args).unwrap(), RouteTable::default())
    }

    fn numbers(plan: &PagePlan) -> Vec<Option<usize>> {
        plan.entries.iter().map(PageEntry::page).collect()
    }

    // ============================================================================
    // Entry tests
    // ============================================================================

    #[test]
    fn test_plan_second_of_thirty_pages() {
        let plan = planner(&["range=10"])
            .plan(&PageInfo::new(2, 30), &QueryParams::new())
            .unwrap();

        let mut expected: Vec<Option<usize>> = (1..=10).map(Some).collect();
        expected.push(None);
        expected.push(Some(30));
        assert_eq!(numbers(&plan), expected);

        let current: Vec<usize> = plan
            .entries
            .iter()
            .filter(|e| e.is_current())
            .filter_map(PageEntry::page)
            .collect();
        assert_eq!(current, vec![2]);
        assert_eq!(plan.entries[2].url(), Some("?page=3"));
    }

    #[test]
    fn test_plan_three_pages_in_large_window() {
        let plan = planner(&["range=10"])
            .plan(&PageInfo::new(2, 3), &QueryParams::new())
            .unwrap();

        assert_eq!(numbers(&plan), vec![Some(1), Some(2), Some(3)]);
        assert!(plan.entries[1].is_current());
    }

    #[test]
    fn test_plan_without_range_shows_everything() {
        let plan = planner(&[])
            .plan(&PageInfo::new(1, 12), &QueryParams::new())
            .unwrap();

        assert_eq!(plan.entries.len(), 12);
        assert!(plan.entries.iter().all(|e| e.page().is_some()));
    }

    #[test]
    fn test_plan_keeps_request_query_and_anchor() {
        let plan = planner(&["url_anchor=derp"])
            .with_path("/search")
            .plan(&PageInfo::new(1, 2), &QueryParams::parse("arg2=val"))
            .unwrap();

        assert_eq!(plan.entries[1].url(), Some("/search?arg2=val&page=2#derp"));
    }

    // ============================================================================
    // Arrow tests
    // ============================================================================

    #[test]
    fn test_prev_next_shown_by_default() {
        let plan = planner(&[])
            .plan(&PageInfo::new(3, 5), &QueryParams::new())
            .unwrap();

        assert_eq!(plan.previous_url.as_deref(), Some("?page=2"));
        assert_eq!(plan.next_url.as_deref(), Some("?page=4"));
        assert_eq!(plan.first_url, None);
        assert_eq!(plan.last_url, None);
    }

    #[test]
    fn test_prev_next_absent_at_edges() {
        let first = planner(&[])
            .plan(&PageInfo::new(1, 5), &QueryParams::new())
            .unwrap();
        let last = planner(&[])
            .plan(&PageInfo::new(5, 5), &QueryParams::new())
            .unwrap();

        assert_eq!(first.previous_url, None);
        assert_eq!(first.next_url.as_deref(), Some("?page=2"));
        assert_eq!(last.previous_url.as_deref(), Some("?page=4"));
        assert_eq!(last.next_url, None);
    }

    #[test]
    fn test_prev_next_can_be_hidden() {
        let plan = planner(&["show_prev_next=false"])
            .plan(&PageInfo::new(3, 5), &QueryParams::new())
            .unwrap();

        assert_eq!(plan.previous_url, None);
        assert_eq!(plan.next_url, None);
    }

    #[test]
    fn test_first_last_when_enabled() {
        let plan = planner(&["show_first_last=true"])
            .plan(&PageInfo::new(3, 5), &QueryParams::new())
            .unwrap();

        assert_eq!(plan.first_url.as_deref(), Some("?page=1"));
        assert_eq!(plan.last_url.as_deref(), Some("?page=5"));

        let on_first = planner(&["show_first_last=true"])
            .plan(&PageInfo::new(1, 5), &QueryParams::new())
            .unwrap();
        assert_eq!(on_first.first_url, None);
        assert_eq!(on_first.last_url.as_deref(), Some("?page=5"));
    }

    // ============================================================================
    // Index range tests
    // ============================================================================

    #[test]
    fn test_index_ranges_when_enabled() {
        let plan = planner(&["show_index_range=true"])
            .plan(&PageInfo::new(1, 3).with_counts(10, 25), &QueryParams::new())
            .unwrap();

        let ranges: Vec<Option<IndexRange>> = plan
            .entries
            .iter()
            .map(|e| match e {
                PageEntry::Number { index_range, .. } => *index_range,
                PageEntry::Ellipsis => None,
            })
            .collect();

        assert_eq!(
            ranges,
            vec![
                Some(IndexRange { start: 1, end: 10 }),
                Some(IndexRange { start: 11, end: 20 }),
                Some(IndexRange { start: 21, end: 25 }),
            ]
        );
    }

    #[test]
    fn test_index_ranges_need_counts() {
        let plan = planner(&["show_index_range=true"])
            .plan(&PageInfo::new(1, 3), &QueryParams::new())
            .unwrap();

        assert!(plan.entries.iter().all(|e| matches!(
            e,
            PageEntry::Number {
                index_range: None,
                ..
            }
        )));
    }

    #[test]
    fn test_index_range_of_empty_result() {
        let page = PageInfo::new(1, 1).with_counts(10, 0);
        assert_eq!(page.index_range(1), Some(IndexRange { start: 0, end: 0 }));
        assert_eq!(page.index_range(2), None);
    }

    #[test]
    fn test_index_range_with_huge_page_size() {
        let page = PageInfo::new(3, 3).with_counts(usize::MAX, 5);
        assert_eq!(page.index_range(1), Some(IndexRange { start: 1, end: 5 }));
        assert_eq!(page.index_range(3), None);
    }

    #[test]
    fn test_index_range_past_last_item() {
        let page = PageInfo::new(1, 30).with_counts(10, 5);
        assert_eq!(page.index_range(1), Some(IndexRange { start: 1, end: 5 }));
        assert_eq!(page.index_range(3), None);
        assert_eq!(page.index_range(0), None);
    }

    #[test]
    fn test_plan_rejects_counts_that_disagree_with_page_count() {
        let result = planner(&["show_index_range=true"])
            .plan(&PageInfo::new(1, 30).with_counts(10, 5), &QueryParams::new());

        assert_eq!(
            result,
            Err(PlanError::Pagination(PaginationError::CountMismatch {
                count: 5,
                per_page: 10,
                expected: 1,
                total: 30,
            }))
        );
    }

    #[test]
    fn test_plan_rejects_huge_page_size_with_many_pages() {
        let result = planner(&["show_index_range=true"])
            .plan(&PageInfo::new(3, 3).with_counts(usize::MAX, 5), &QueryParams::new());

        assert!(matches!(
            result,
            Err(PlanError::Pagination(PaginationError::CountMismatch {
                expected: 1,
                total: 3,
                ..
            }))
        ));
    }

    #[test]
    fn test_plan_rejects_zero_page_size() {
        let result = planner(&[])
            .plan(&PageInfo::new(1, 1).with_counts(0, 5), &QueryParams::new());
        assert_eq!(
            result,
            Err(PlanError::Pagination(PaginationError::InvalidPerPage))
        );
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let page = PageInfo::new(1, 1).with_counts(10, 0);
        assert_eq!(page.validate_counts(), Ok(()));
    }

    // ============================================================================
    // Named route tests
    // ============================================================================

    #[test]
    fn test_named_route_with_namespace_fallback() {
        let routes = RouteTable::new(vec![Route::new(
            "tests:the_view",
            "/view/<str:kind>/<int:page>/",
        )])
        .unwrap();
        let options = PaginateOptions::parse([
            "url_view_name=the_view",
            "url_extra_args=arg1",
            "url_anchor=derp",
            "range=3",
        ])
        .unwrap();

        let plan = PageLinkPlanner::new(options, &routes)
            .with_namespace(Some("tests".to_string()))
            .plan(&PageInfo::new(5, 10), &QueryParams::new())
            .unwrap();

        assert_eq!(plan.entries[0].url(), Some("/view/arg1/1/#derp"));
        assert_eq!(plan.previous_url.as_deref(), Some("/view/arg1/4/#derp"));
    }

    #[test]
    fn test_named_route_failure_propagates() {
        let options = PaginateOptions::parse(["url_view_name=missing"]).unwrap();

        let err = PageLinkPlanner::new(options, RouteTable::default())
            .with_namespace(Some("tests".to_string()))
            .plan(&PageInfo::new(1, 2), &QueryParams::new())
            .unwrap_err();

        assert!(matches!(err, PlanError::Route(ref e) if e.name == "missing"));
    }

    // ============================================================================
    // Error and serialization tests
    // ============================================================================

    #[test]
    fn test_out_of_range_page_is_an_error() {
        let err = planner(&[])
            .plan(&PageInfo::new(4, 3), &QueryParams::new())
            .unwrap_err();

        assert_eq!(
            err,
            PlanError::Pagination(PaginationError::PageOutOfRange { page: 4, total: 3 })
        );
    }

    #[test]
    fn test_plan_serializes_tagged_entries() {
        let plan = planner(&["range=1"])
            .plan(&PageInfo::new(2, 3), &QueryParams::new())
            .unwrap();

        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["entries"][1]["kind"], "number");
        assert_eq!(json["entries"][1]["is_current"], true);
        assert_eq!(json["entries"][1]["url"], "?page=2");
        assert!(json["entries"][1].get("index_range").is_none());
        assert_eq!(json["current_page"], 2);
    }

    #[test]
    fn test_plan_serializes_ellipsis() {
        let plan = planner(&["range=1"])
            .plan(&PageInfo::new(5, 10), &QueryParams::new())
            .unwrap();

        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["entries"][1], serde_json::json!({ "kind": "ellipsis" }));
    }
}
