//! Listing page traversal.

use async_stream::try_stream;
use futures_util::stream::{Stream, TryStreamExt};

use crate::models::Page;
use crate::sources::{BookSource, SourceError};

/// Lazily walk the listing chain starting at `first_url`.
///
/// Each page is fetched once, yielded, and its `next` link followed until the
/// API reports no further page or `max_pages` pages have been produced. A
/// fetch or parse failure is yielded as the final item and ends the stream.
pub fn pages<'a, S>(
    source: &'a S,
    first_url: String,
    max_pages: Option<usize>,
) -> impl Stream<Item = Result<Page, SourceError>> + 'a
where
    S: BookSource + ?Sized,
{
    try_stream! {
        let mut next = Some(first_url);
        let mut number = 0usize;

        while let Some(url) = next.take() {
            if max_pages.is_some_and(|limit| number >= limit) {
                tracing::info!("Page limit of {} reached, not following {}", number, url);
                break;
            }

            let listing = source.fetch_listing(&url).await?;
            number += 1;
            next = listing.next.clone();

            yield Page { url, number, listing };
        }
    }
}

/// Walk the whole chain and return the page URLs in chain order.
///
/// Any failure aborts the walk; no partial list is returned.
pub async fn collect_page_urls<S>(
    source: &S,
    first_url: String,
    max_pages: Option<usize>,
) -> Result<Vec<String>, SourceError>
where
    S: BookSource + ?Sized,
{
    let urls: Vec<String> = pages(source, first_url, max_pages)
        .map_ok(|page| {
            tracing::debug!("Discovered page {}: {}", page.number, page.url);
            page.url
        })
        .try_collect()
        .await?;

    tracing::info!("Total pages = {}", urls.len());
    Ok(urls)
}
