//! Continuation-driven pagination exposed as [`Stream`]s.
//!
//! A pager turns a one-page fetch function `continuation -> Page` into a lazy stream of
//! pages ([`PagesPager`]) or of the items they contain ([`ItemsPager`]).
//!
//! Pagers are pull-based: nothing is fetched before the stream is first polled, and page
//! N+1 is only requested once page N has been handed out and the consumer polls again.
//! Fetches are strictly sequential since the continuation for the next page is only
//! known from the previous response. Dropping a pager drops any in-flight fetch.
//!
//! Iteration is not a snapshot: entities inserted or deleted while a listing is in
//! progress may or may not be observed. A pager is not restartable; build a new one to
//! start over from the first page.

use crate::{common::continuation::Continuation, error::Result};

use futures_core::Stream;
use pin_project_lite::pin_project;
use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    task::{Context, Poll, ready},
};

/// One page of results and the continuation that followed it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page<T, C> {
    /// Items in service order.
    pub items: Vec<T>,
    /// Where the listing continues; exhausted on the last page.
    pub continuation: C,
}

pin_project! {
    #[project = FetchStateProj]
    enum FetchState<C, Fut> {
        Idle {
            continuation: C,
        },
        Fetching {
            #[pin]
            future: Fut,
        },
        Exhausted,
    }
}

pin_project! {
    /// A stream of pages, fetched on demand.
    ///
    /// Ends after the first page whose continuation is exhausted, or right after yielding
    /// an error.
    pub struct PagesPager<C, F, Fut> {
        fetcher: F,
        #[pin]
        state: FetchState<C, Fut>,
    }
}

impl<C: Continuation, F, Fut> PagesPager<C, F, Fut> {
    /// Create a pager starting with a fresh query.
    pub fn new(fetcher: F) -> Self {
        Self::with_continuation(C::default(), fetcher)
    }

    /// Create a pager resuming from a continuation obtained from an earlier page.
    pub fn with_continuation(continuation: C, fetcher: F) -> Self {
        Self {
            fetcher,
            state: FetchState::Idle { continuation },
        }
    }
}

impl<T, C, F, Fut> Stream for PagesPager<C, F, Fut>
where
    C: Continuation,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<Page<T, C>>>,
{
    type Item = Result<Page<T, C>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            match this.state.as_mut().project() {
                FetchStateProj::Exhausted => return Poll::Ready(None),
                FetchStateProj::Idle { continuation } => {
                    let continuation = std::mem::take(continuation);
                    let future = (this.fetcher)(continuation);
                    this.state.set(FetchState::Fetching { future });
                }
                FetchStateProj::Fetching { future } => match ready!(future.poll(cx)) {
                    Ok(page) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            items = page.items.len(),
                            exhausted = page.continuation.is_exhausted(),
                            "received page"
                        );
                        if page.continuation.is_exhausted() {
                            this.state.set(FetchState::Exhausted);
                        } else {
                            this.state.set(FetchState::Idle {
                                continuation: page.continuation.clone(),
                            });
                        }
                        return Poll::Ready(Some(Ok(page)));
                    }
                    Err(error) => {
                        this.state.set(FetchState::Exhausted);
                        return Poll::Ready(Some(Err(error)));
                    }
                },
            }
        }
    }
}

pin_project! {
    /// A stream of items flattened from a [`PagesPager`].
    ///
    /// Every item of a page is yielded before the next page is requested.
    pub struct ItemsPager<T, C, F, Fut> {
        buffer: VecDeque<T>,
        #[pin]
        pages: PagesPager<C, F, Fut>,
    }
}

impl<T, C: Continuation, F, Fut> ItemsPager<T, C, F, Fut> {
    /// Create a pager starting with a fresh query.
    pub fn new(fetcher: F) -> Self {
        Self::from_pages(PagesPager::new(fetcher))
    }

    /// Flatten an existing pages stream.
    pub fn from_pages(pages: PagesPager<C, F, Fut>) -> Self {
        Self {
            buffer: VecDeque::new(),
            pages,
        }
    }
}

impl<T, C, F, Fut> Stream for ItemsPager<T, C, F, Fut>
where
    C: Continuation,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<Page<T, C>>>,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(item) = this.buffer.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            match ready!(this.pages.as_mut().poll_next(cx)) {
                Some(Ok(page)) => this.buffer.extend(page.items),
                Some(Err(error)) => return Poll::Ready(Some(Err(error))),
                None => return Poll::Ready(None),
            }
        }
    }
}
