//! Period validation and the order-totals use case shared by the HTTP and RPC facades.
//!
//! A reporting period runs from day 21 of the first month through the end of day 21 of the
//! second month, matching the marketplace payout cycle.

pub mod rpc;

// crates.io
use time::{Date, Month, Time};
// self
use crate::{
	_prelude::*,
	error::ValidationError,
	obs::{self, FlowKind},
	orders::{AggregateTotals, Order, aggregate},
};

const PERIOD_START_DAY: u8 = 21;

/// Future returned by [`OrdersBackend::fetch_orders`].
pub type OrdersFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Order>>> + 'a + Send>>;

/// Source of every order created within a range.
pub trait OrdersBackend
where
	Self: Send + Sync,
{
	/// Marketplace the orders come from, used to label observability data.
	fn marketplace(&self) -> &str;

	/// Fetches all orders created within `range`, walking every page.
	fn fetch_orders<'a>(&'a self, range: &'a DateRange) -> OrdersFuture<'a>;
}

/// Inclusive creation-time range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
	/// First instant included.
	pub from: OffsetDateTime,
	/// Last instant included.
	pub to: OffsetDateTime,
}

/// `year1/month1` through `year2/month2` as supplied by a caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRequest {
	/// Year of the first month.
	pub year1: i32,
	/// First month, `1..=12`.
	pub month1: u8,
	/// Year of the last month.
	pub year2: i32,
	/// Last month, `1..=12`.
	pub month2: u8,
}
impl PeriodRequest {
	/// Parses the four query parameters, reporting the first offending one.
	pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ValidationError> {
		let field = |name: &'static str| {
			query.get(name).map(|value| value.trim()).filter(|value| !value.is_empty())
		};
		let (Some(year1), Some(month1), Some(year2), Some(month2)) =
			(field("year1"), field("month1"), field("year2"), field("month2"))
		else {
			return Err(ValidationError::MissingParameters);
		};
		let period = Self {
			year1: parse_year("year1", year1)?,
			month1: parse_month("month1", month1)?,
			year2: parse_year("year2", year2)?,
			month2: parse_month("month2", month2)?,
		};

		period.date_range()?;

		Ok(period)
	}

	/// Resolves the period into `[day 21 00:00 UTC of month1, day 22 00:00 UTC of month2)`.
	pub fn date_range(&self) -> Result<DateRange, ValidationError> {
		let from = period_start(self.year1, self.month1, "year1", "month1")?;
		let end = period_start(self.year2, self.month2, "year2", "month2")? + Duration::DAY;
		let to = end - Duration::NANOSECOND;

		if from > to {
			return Err(ValidationError::InvalidRange);
		}

		Ok(DateRange { from, to })
	}
}

/// Computes order totals for a period.
#[derive(Clone)]
pub struct OrderService {
	backend: Arc<dyn OrdersBackend>,
}
impl OrderService {
	/// Creates a service over `backend`.
	pub fn new(backend: Arc<dyn OrdersBackend>) -> Self {
		Self { backend }
	}

	/// Validates `period`, fetches every order in it, and aggregates the result.
	///
	/// Validation failures never reach the backend.
	pub async fn totals(&self, period: &PeriodRequest) -> Result<AggregateTotals> {
		let range = period.date_range()?;

		tracing::info!(from = %range.from, to = %range.to, "fetching orders");

		let orders = obs::observe(
			FlowKind::OrderFetch,
			self.backend.marketplace(),
			"order_totals",
			self.backend.fetch_orders(&range),
		)
		.await?;
		let totals = aggregate(&orders);

		tracing::info!(
			orders = orders.len(),
			gross = totals.gross_total,
			fees = totals.fee_total,
			"orders aggregated"
		);

		Ok(totals)
	}
}
impl Debug for OrderService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OrderService").finish_non_exhaustive()
	}
}

fn parse_year(name: &'static str, raw: &str) -> Result<i32, ValidationError> {
	raw.parse::<i32>()
		.ok()
		.filter(|year| Date::from_calendar_date(*year, Month::January, 1).is_ok())
		.ok_or(ValidationError::InvalidParameter { name })
}

fn parse_month(name: &'static str, raw: &str) -> Result<u8, ValidationError> {
	raw.parse::<u8>()
		.ok()
		.filter(|month| (1..=12).contains(month))
		.ok_or(ValidationError::InvalidParameter { name })
}

fn period_start(
	year: i32,
	month: u8,
	year_name: &'static str,
	month_name: &'static str,
) -> Result<OffsetDateTime, ValidationError> {
	let month =
		Month::try_from(month).map_err(|_| ValidationError::InvalidParameter { name: month_name })?;
	let date = Date::from_calendar_date(year, month, PERIOD_START_DAY)
		.map_err(|_| ValidationError::InvalidParameter { name: year_name })?;

	Ok(date.with_time(Time::MIDNIGHT).assume_utc())
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn range_runs_from_day_21_to_one_nanosecond_before_day_22() {
		let period = PeriodRequest { year1: 2025, month1: 2, year2: 2025, month2: 3 };
		let range = period.date_range().expect("Period should be valid.");

		assert_eq!(range.from, macros::datetime!(2025-02-21 00:00 UTC));
		assert_eq!(range.to, macros::datetime!(2025-03-22 00:00 UTC) - Duration::NANOSECOND);

		let single = PeriodRequest { year1: 2024, month1: 12, year2: 2024, month2: 12 }
			.date_range()
			.expect("Single-month period should be valid.");

		assert_eq!(single.to - single.from, Duration::DAY - Duration::NANOSECOND);
	}

	#[test]
	fn inverted_periods_are_rejected() {
		let period = PeriodRequest { year1: 2025, month1: 4, year2: 2025, month2: 3 };

		assert_eq!(period.date_range(), Err(ValidationError::InvalidRange));

		let period = PeriodRequest { year1: 2026, month1: 1, year2: 2025, month2: 12 };

		assert_eq!(period.date_range(), Err(ValidationError::InvalidRange));
	}

	#[test]
	fn query_validation_reports_the_first_offending_parameter() {
		assert_eq!(
			PeriodRequest::from_query(&query(&[("year1", "2025"), ("month1", "2")])),
			Err(ValidationError::MissingParameters)
		);
		assert_eq!(
			PeriodRequest::from_query(&query(&[
				("year1", "twenty"),
				("month1", "2"),
				("year2", "2025"),
				("month2", "3"),
			])),
			Err(ValidationError::InvalidParameter { name: "year1" })
		);
		assert_eq!(
			PeriodRequest::from_query(&query(&[
				("year1", "2025"),
				("month1", "13"),
				("year2", "2025"),
				("month2", "3"),
			])),
			Err(ValidationError::InvalidParameter { name: "month1" })
		);
		assert_eq!(
			PeriodRequest::from_query(&query(&[
				("year1", "2025"),
				("month1", "2"),
				("year2", "2025"),
				("month2", "0"),
			])),
			Err(ValidationError::InvalidParameter { name: "month2" })
		);
		assert_eq!(
			PeriodRequest::from_query(&query(&[
				("year1", "2025"),
				("month1", "2"),
				("year2", "2025"),
				("month2", "3"),
			])),
			Ok(PeriodRequest { year1: 2025, month1: 2, year2: 2025, month2: 3 })
		);
	}
}
