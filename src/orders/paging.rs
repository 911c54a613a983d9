//! Pagination walkers and date windowing.
//!
//! Both walkers call a page-fetching closure sequentially and stop on the marketplace's
//! end-of-listing signal. A hard page cap turns a listing that never ends into
//! [`Error::PaginationLimit`] instead of an endless loop.

// self
use crate::_prelude::*;

/// Page size used by both marketplaces.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Upper bound on pages fetched for one listing.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Walks `offset`/`limit` listings until a page comes back short.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetWalker {
	page_size: u32,
	max_pages: usize,
}
impl OffsetWalker {
	/// Walker with the default page size and cap.
	pub fn new() -> Self {
		Self { page_size: DEFAULT_PAGE_SIZE, max_pages: DEFAULT_MAX_PAGES }
	}

	/// Overrides the page size (minimum 1).
	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size.max(1);

		self
	}

	/// Overrides the page cap (minimum 1).
	pub fn with_max_pages(mut self, max_pages: usize) -> Self {
		self.max_pages = max_pages.max(1);

		self
	}

	/// Configured page size.
	pub fn page_size(&self) -> u32 {
		self.page_size
	}

	/// Calls `fetch(offset, limit)` from offset zero until a page holds fewer than `limit`
	/// items, concatenating every page in order.
	pub async fn collect<T, F, Fut>(&self, endpoint: &str, mut fetch: F) -> Result<Vec<T>>
	where
		F: FnMut(u64, u32) -> Fut,
		Fut: Future<Output = Result<Vec<T>>>,
	{
		let mut items = Vec::new();
		let mut offset = 0_u64;

		for page in 0..self.max_pages {
			let batch = fetch(offset, self.page_size).await?;
			let len = batch.len();

			tracing::debug!(endpoint, page, offset, len, "offset page fetched");

			items.extend(batch);

			if len < self.page_size as usize {
				return Ok(items);
			}

			offset += u64::from(self.page_size);
		}

		Err(Error::PaginationLimit { endpoint: endpoint.to_owned(), max_pages: self.max_pages })
	}
}
impl Default for OffsetWalker {
	fn default() -> Self {
		Self::new()
	}
}

/// One page of a cursor listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CursorPage<T> {
	/// Items on this page.
	pub items: Vec<T>,
	/// Cursor for the following page; empty when there is none.
	pub next_cursor: String,
	/// Whether the marketplace reports more pages.
	pub more: bool,
}
impl<T> CursorPage<T> {
	/// `true` when this is the final page.
	pub fn is_last(&self) -> bool {
		!self.more || self.next_cursor.is_empty()
	}
}

/// Walks cursor listings from the empty cursor until `more` is false or the cursor runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorWalker {
	page_size: u32,
	max_pages: usize,
}
impl CursorWalker {
	/// Walker with the default page size and cap.
	pub fn new() -> Self {
		Self { page_size: DEFAULT_PAGE_SIZE, max_pages: DEFAULT_MAX_PAGES }
	}

	/// Overrides the page size (minimum 1).
	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size.max(1);

		self
	}

	/// Overrides the page cap (minimum 1).
	pub fn with_max_pages(mut self, max_pages: usize) -> Self {
		self.max_pages = max_pages.max(1);

		self
	}

	/// Calls `fetch(cursor, page_size)` until the last page, concatenating every page in order.
	pub async fn collect<T, F, Fut>(&self, endpoint: &str, mut fetch: F) -> Result<Vec<T>>
	where
		F: FnMut(String, u32) -> Fut,
		Fut: Future<Output = Result<CursorPage<T>>>,
	{
		let mut items = Vec::new();
		let mut cursor = String::new();

		for page in 0..self.max_pages {
			let batch = fetch(cursor, self.page_size).await?;
			let last = batch.is_last();

			tracing::debug!(endpoint, page, len = batch.items.len(), more = !last, "cursor page fetched");

			items.extend(batch.items);

			if last {
				return Ok(items);
			}

			cursor = batch.next_cursor;
		}

		Err(Error::PaginationLimit { endpoint: endpoint.to_owned(), max_pages: self.max_pages })
	}
}
impl Default for CursorWalker {
	fn default() -> Self {
		Self::new()
	}
}

/// Splits `[from, to]` into consecutive windows no longer than the span.
///
/// Each window starts one second after the previous one ends, matching listings that filter on
/// whole-second timestamps with inclusive bounds.
#[derive(Clone, Debug)]
pub struct DateWindows {
	next: OffsetDateTime,
	end: OffsetDateTime,
	span: Duration,
}
impl DateWindows {
	/// Longest window Shopee accepts for order listings.
	pub const DEFAULT_SPAN: Duration = Duration::days(15);

	/// Windows covering `[from, to]`; empty when `from > to`.
	pub fn new(from: OffsetDateTime, to: OffsetDateTime) -> Self {
		Self { next: from, end: to, span: Self::DEFAULT_SPAN }
	}

	/// Overrides the window span (minimum one second).
	pub fn with_span(mut self, span: Duration) -> Self {
		self.span = span.max(Duration::SECOND);

		self
	}
}
impl Iterator for DateWindows {
	type Item = (OffsetDateTime, OffsetDateTime);

	fn next(&mut self) -> Option<Self::Item> {
		if self.next > self.end {
			return None;
		}

		let start = self.next;
		let end = (start + self.span).min(self.end);

		self.next = end + Duration::SECOND;

		Some((start, end))
	}
}
