//! # List Aggregator
//!
//! Turns a bulk or paged remote listing into a `key -> value` map.
//!
//! Failures come in two strengths. A failed fetch or a failed mapping is fatal
//! and yields no map at all. Hitting `max_items`, crossing `warn_threshold` or
//! noticing cancellation is soft: the partial map is returned together with a
//! warning, so truncation is never silent.
//!
//! Duplicate keys resolve to the item seen last.

use crate::context::OpContext;
use crate::diagnostics::Diagnostics;
use crate::error::ApiError;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Page size requested from paged listings unless `max_items` is smaller.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Cancellation is polled once per this many processed items.
pub const CANCEL_CHECK_INTERVAL: usize = 1000;

/// One page of a paged listing.
#[derive(Debug)]
pub struct Page<I> {
    pub items: Vec<I>,
    pub is_last: bool,
    pub diags: Diagnostics,
}

impl<I> Page<I> {
    pub fn new(items: Vec<I>, is_last: bool) -> Self {
        Self {
            items,
            is_last,
            diags: Diagnostics::new(),
        }
    }

    /// A page that could not be fetched.
    pub fn failed(diags: Diagnostics) -> Self {
        Self {
            items: Vec::new(),
            is_last: true,
            diags,
        }
    }
}

type ListFn<I> = Arc<dyn Fn(OpContext) -> BoxFuture<'static, (Vec<I>, Diagnostics)> + Send + Sync>;
type PageFn<I> = Arc<dyn Fn(OpContext, usize, usize) -> BoxFuture<'static, Page<I>> + Send + Sync>;
type FilterFn<I> = Arc<dyn Fn(&I) -> bool + Send + Sync>;
type KeyFn<I> = Arc<dyn Fn(&I) -> String + Send + Sync>;
type MapOutFn<I, O> = Arc<dyn Fn(I, &mut Diagnostics) -> Option<O> + Send + Sync>;

enum Source<I> {
    All(ListFn<I>),
    Paged(PageFn<I>),
}

/// Fetch, filter, key and map functions for one listing.
///
/// A listing is either bulk or paged, never both; the constructor decides.
pub struct ListHooks<I, O> {
    source: Source<I>,
    filter: Option<FilterFn<I>>,
    key_of: Option<KeyFn<I>>,
    map_to_out: Option<MapOutFn<I, O>>,
}

impl<I: Send + 'static, O> ListHooks<I, O> {
    /// A listing fetched in one call.
    pub fn unpaged<F, Fut>(list: F) -> Self
    where
        F: Fn(OpContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = (Vec<I>, Diagnostics)> + Send + 'static,
    {
        Self::with_source(Source::All(Arc::new(move |ctx| list(ctx).boxed())))
    }

    /// A listing fetched page by page; the function receives `(ctx, start_at, page_size)`.
    pub fn paged<F, Fut>(page: F) -> Self
    where
        F: Fn(OpContext, usize, usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Page<I>> + Send + 'static,
    {
        Self::with_source(Source::Paged(Arc::new(move |ctx, start_at, size| {
            page(ctx, start_at, size).boxed()
        })))
    }

    fn with_source(source: Source<I>) -> Self {
        Self {
            source,
            filter: None,
            key_of: None,
            map_to_out: None,
        }
    }

    /// Items for which `f` returns false are skipped without a diagnostic.
    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&I) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(f));
        self
    }

    pub fn key_of<F>(mut self, f: F) -> Self
    where
        F: Fn(&I) -> String + Send + Sync + 'static,
    {
        self.key_of = Some(Arc::new(f));
        self
    }

    /// An error diagnostic aborts the whole listing. `None` without an error skips the item.
    pub fn map_to_out<F>(mut self, f: F) -> Self
    where
        F: Fn(I, &mut Diagnostics) -> Option<O> + Send + Sync + 'static,
    {
        self.map_to_out = Some(Arc::new(f));
        self
    }

    pub fn is_paged(&self) -> bool {
        matches!(self.source, Source::Paged(_))
    }
}

impl<I, O> fmt::Debug for ListHooks<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListHooks")
            .field("paged", &matches!(self.source, Source::Paged(_)))
            .field("filter", &self.filter.is_some())
            .field("key_of", &self.key_of.is_some())
            .field("map_to_out", &self.map_to_out.is_some())
            .finish()
    }
}

/// Guardrails for one list invocation. Zero means "not set".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub max_items: usize,
    pub warn_threshold: usize,
    pub prealloc_cap: usize,
    pub respect_context: bool,
}

impl ListOptions {
    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = n;
        self
    }

    pub fn warn_threshold(mut self, n: usize) -> Self {
        self.warn_threshold = n;
        self
    }

    pub fn prealloc_cap(mut self, n: usize) -> Self {
        self.prealloc_cap = n;
        self
    }

    pub fn respect_context(mut self, yes: bool) -> Self {
        self.respect_context = yes;
        self
    }

    fn page_size(&self) -> usize {
        match self.max_items {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(DEFAULT_PAGE_SIZE),
        }
    }
}

enum Flow {
    Continue,
    Stop,
    Abort,
}

struct Aggregator<'a, I, O> {
    opts: ListOptions,
    filter: Option<&'a FilterFn<I>>,
    key_of: &'a KeyFn<I>,
    map_to_out: &'a MapOutFn<I, O>,
    out: HashMap<String, O>,
    sized: bool,
    processed: usize,
    kept: usize,
    threshold_warned: bool,
}

impl<'a, I, O> Aggregator<'a, I, O> {
    fn presize(&mut self, batch_len: usize) {
        if self.sized {
            return;
        }
        self.sized = true;
        let hint = if self.opts.prealloc_cap > 0 {
            self.opts.prealloc_cap
        } else if self.opts.max_items > 0 {
            self.opts.max_items
        } else {
            batch_len
        };
        // Caller hints are clamped to what one batch can fill.
        self.out.reserve(hint.min(batch_len.max(DEFAULT_PAGE_SIZE)));
    }

    fn capped(&self) -> bool {
        self.opts.max_items > 0 && self.kept >= self.opts.max_items
    }

    fn consume(&mut self, ctx: &OpContext, items: Vec<I>, diags: &mut Diagnostics) -> Flow {
        for item in items {
            self.processed += 1;
            if self.opts.respect_context && self.processed % CANCEL_CHECK_INTERVAL == 0 {
                if let Some(err) = ctx.err() {
                    warn_stopped(&err, self.out.len(), diags);
                    return Flow::Stop;
                }
            }

            if let Some(filter) = self.filter {
                if !filter(&item) {
                    continue;
                }
            }

            if self.capped() {
                warn_capped(self.opts.max_items, diags);
                return Flow::Stop;
            }

            let key = (self.key_of)(&item);
            let mut item_diags = Diagnostics::new();
            let value = (self.map_to_out)(item, &mut item_diags);
            let failed = item_diags.has_error();
            diags.extend(item_diags);
            if failed {
                return Flow::Abort;
            }
            let Some(value) = value else {
                continue;
            };

            self.out.insert(key, value);
            self.kept += 1;

            let threshold = self.opts.warn_threshold;
            if threshold > 0 && self.kept > threshold && !self.threshold_warned {
                self.threshold_warned = true;
                diags.add_warning(
                    "Large result set",
                    format!("The listing returned more than {threshold} items; consider narrowing it."),
                );
            }
        }
        Flow::Continue
    }
}

fn warn_capped(max_items: usize, diags: &mut Diagnostics) {
    diags.add_warning(
        "Result truncated",
        format!("Only the first {max_items} items were kept; raise max_items to see more."),
    );
}

fn warn_stopped(err: &ApiError, collected: usize, diags: &mut Diagnostics) {
    let (summary, reason) = match err {
        ApiError::DeadlineExceeded => ("Listing deadline exceeded", "ran past its deadline"),
        _ => ("Listing canceled", "was canceled"),
    };
    diags.add_warning(
        summary,
        format!("The listing {reason}; returning the {collected} items collected so far."),
    );
}

/// Runs a listing to completion or to the first guardrail it hits.
///
/// Returns `None` when any fatal diagnostic was produced.
pub async fn do_list<I, O>(
    ctx: &OpContext,
    hooks: &ListHooks<I, O>,
    opts: &ListOptions,
) -> (Option<HashMap<String, O>>, Diagnostics)
where
    I: Send + 'static,
    O: Send,
{
    let mut diags = Diagnostics::new();
    let (Some(key_of), Some(map_to_out)) = (hooks.key_of.as_ref(), hooks.map_to_out.as_ref())
    else {
        diags.add_error(
            "List is not supported",
            "The listing is missing its key_of or map_to_out function. This is a provider configuration error.",
        );
        return (None, diags);
    };

    let mut agg = Aggregator {
        opts: *opts,
        filter: hooks.filter.as_ref(),
        key_of,
        map_to_out,
        out: HashMap::new(),
        sized: false,
        processed: 0,
        kept: 0,
        threshold_warned: false,
    };

    match &hooks.source {
        Source::All(list) => {
            let (items, fetch_diags) = list(ctx.clone()).await;
            let failed = fetch_diags.has_error();
            diags.extend(fetch_diags);
            if failed {
                return (None, diags);
            }
            debug!(items = items.len(), "fetched listing");
            agg.presize(items.len());
            if let Flow::Abort = agg.consume(ctx, items, &mut diags) {
                return (None, diags);
            }
        }
        Source::Paged(fetch_page) => {
            let page_size = opts.page_size();
            let mut start_at = 0;
            loop {
                if opts.respect_context {
                    if let Some(err) = ctx.err() {
                        warn_stopped(&err, agg.out.len(), &mut diags);
                        break;
                    }
                }

                let page = fetch_page(ctx.clone(), start_at, page_size).await;
                let failed = page.diags.has_error();
                diags.extend(page.diags);
                if failed {
                    return (None, diags);
                }
                let fetched = page.items.len();
                debug!(start_at, fetched, is_last = page.is_last, "fetched page");
                if fetched == 0 {
                    break;
                }

                agg.presize(fetched);
                match agg.consume(ctx, page.items, &mut diags) {
                    Flow::Abort => return (None, diags),
                    Flow::Stop => break,
                    Flow::Continue => {}
                }
                if page.is_last {
                    break;
                }
                if agg.capped() {
                    warn_capped(opts.max_items, &mut diags);
                    break;
                }
                start_at += fetched;
            }
        }
    }

    (Some(agg.out), diags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_shrinks_to_max_items() {
        assert_eq!(ListOptions::default().page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(ListOptions::default().max_items(12).page_size(), 12);
        assert_eq!(ListOptions::default().max_items(5000).page_size(), DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_missing_key_function_is_a_configuration_error() {
        let hooks: ListHooks<u32, u32> =
            ListHooks::unpaged(|_ctx| async { (vec![1, 2, 3], Diagnostics::new()) })
                .map_to_out(|n, _| Some(n));
        let (out, diags) = do_list(&OpContext::new(), &hooks, &ListOptions::default()).await;
        assert!(out.is_none());
        assert!(diags.has_error());
    }
}
