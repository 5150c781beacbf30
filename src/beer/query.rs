//! Optional filters and paging for the beer listing.

// self
use crate::{_prelude::*, beer::BeerStyle};

/// Filters and paging parameters for [`BeerClient::list_beers`](crate::beer::BeerClient::list_beers).
///
/// Every field is optional; unset fields are left out of the query string entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListBeersQuery {
	/// Matches beers whose name contains this value.
	pub beer_name: Option<String>,
	/// Restricts the listing to one style.
	pub beer_style: Option<BeerStyle>,
	/// Asks the server to include `quantityOnHand`.
	pub show_inventory: Option<bool>,
	/// Zero-based page to return.
	pub page_number: Option<u32>,
	/// Entries per page.
	pub page_size: Option<u32>,
}
impl ListBeersQuery {
	/// Creates an empty query that lists the first page with server defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Filters by beer name.
	pub fn beer_name(mut self, name: impl Into<String>) -> Self {
		self.beer_name = Some(name.into());

		self
	}

	/// Filters by beer style.
	pub fn beer_style(mut self, style: BeerStyle) -> Self {
		self.beer_style = Some(style);

		self
	}

	/// Toggles inventory in the response.
	pub fn show_inventory(mut self, show: bool) -> Self {
		self.show_inventory = Some(show);

		self
	}

	/// Selects the page number.
	pub fn page_number(mut self, number: u32) -> Self {
		self.page_number = Some(number);

		self
	}

	/// Selects the page size.
	pub fn page_size(mut self, size: u32) -> Self {
		self.page_size = Some(size);

		self
	}

	/// Returns `true` when no parameter is set.
	pub fn is_empty(&self) -> bool {
		self.pairs().is_empty()
	}

	/// Query parameters in wire order, skipping unset fields.
	pub fn pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::with_capacity(5);

		if let Some(name) = &self.beer_name {
			pairs.push(("beerName", name.clone()));
		}
		if let Some(style) = self.beer_style {
			pairs.push(("beerStyle", style.as_str().to_owned()));
		}
		if let Some(number) = self.page_number {
			pairs.push(("pageNumber", number.to_string()));
		}
		if let Some(size) = self.page_size {
			pairs.push(("pageSize", size.to_string()));
		}
		if let Some(show) = self.show_inventory {
			pairs.push(("showInventory", show.to_string()));
		}

		pairs
	}

	/// Appends the set parameters to `url`, leaving it untouched when none are set.
	pub fn apply_to(&self, url: &mut Url) {
		let pairs = self.pairs();

		if pairs.is_empty() {
			return;
		}

		url.query_pairs_mut().extend_pairs(pairs);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("http://localhost:8080/api/v1/beer").expect("Base URL fixture should parse.")
	}

	#[test]
	fn empty_query_leaves_url_untouched() {
		let mut url = base();

		ListBeersQuery::new().apply_to(&mut url);

		assert!(ListBeersQuery::new().is_empty());
		assert_eq!(url.as_str(), "http://localhost:8080/api/v1/beer");
		assert_eq!(url.query(), None);
	}

	#[test]
	fn parameters_follow_wire_order() {
		let mut url = base();

		ListBeersQuery::new()
			.show_inventory(true)
			.page_size(25)
			.page_number(2)
			.beer_style(BeerStyle::PaleAle)
			.beer_name("Galaxy Cat")
			.apply_to(&mut url);

		assert_eq!(
			url.query(),
			Some("beerName=Galaxy+Cat&beerStyle=PALE_ALE&pageNumber=2&pageSize=25&showInventory=true")
		);
	}

	#[test]
	fn only_set_filters_appear() {
		let mut url = base();

		ListBeersQuery::new().beer_name("ALE").apply_to(&mut url);

		assert_eq!(url.query(), Some("beerName=ALE"));
	}
}
