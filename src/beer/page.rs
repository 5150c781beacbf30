//! One page of a beer listing.

// self
use crate::{_prelude::*, beer::Beer};

/// Violated page invariant, reported as a decode failure.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PageError {
	/// More entries than the page size allows.
	#[error("Page holds {len} entries but its size is {size}.")]
	ContentExceedsSize {
		/// Entries on the page.
		len: usize,
		/// Declared page size.
		size: u32,
	},
	/// Fewer total elements than entries on this page.
	#[error("Page holds {len} entries but reports only {total} in total.")]
	TotalBelowContent {
		/// Entries on the page.
		len: usize,
		/// Declared total element count.
		total: u64,
	},
}

/// Page of beers plus paging metadata, read-only once decoded.
///
/// Decoding ignores any other envelope fields (`pageable`, `sort`, `first`, ...). A `size` of
/// zero marks an unpaged response and does not bound the content length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBeerPage", rename_all = "camelCase")]
pub struct BeerPage {
	content: Vec<Beer>,
	number: u32,
	size: u32,
	total_elements: u64,
}
impl BeerPage {
	/// Beers on this page.
	pub fn content(&self) -> &[Beer] {
		&self.content
	}

	/// Zero-based page number.
	pub fn number(&self) -> u32 {
		self.number
	}

	/// Requested page size.
	pub fn size(&self) -> u32 {
		self.size
	}

	/// Total number of beers matching the query across all pages.
	pub fn total_elements(&self) -> u64 {
		self.total_elements
	}

	/// Number of beers on this page.
	pub fn len(&self) -> usize {
		self.content.len()
	}

	/// Returns `true` when the page holds no beers.
	pub fn is_empty(&self) -> bool {
		self.content.is_empty()
	}

	/// Number of pages implied by `size` and `total_elements`.
	pub fn total_pages(&self) -> u64 {
		match self.size {
			0 => 1,
			size => self.total_elements.div_ceil(u64::from(size)),
		}
	}

	/// Returns `true` when no page follows this one.
	pub fn is_last(&self) -> bool {
		u64::from(self.number) + 1 >= self.total_pages()
	}

	/// Iterates over the beers on this page.
	pub fn iter(&self) -> std::slice::Iter<'_, Beer> {
		self.content.iter()
	}

	/// Consumes the page, returning its beers.
	pub fn into_content(self) -> Vec<Beer> {
		self.content
	}
}
impl IntoIterator for BeerPage {
	type IntoIter = std::vec::IntoIter<Beer>;
	type Item = Beer;

	fn into_iter(self) -> Self::IntoIter {
		self.content.into_iter()
	}
}
impl<'a> IntoIterator for &'a BeerPage {
	type IntoIter = std::slice::Iter<'a, Beer>;
	type Item = &'a Beer;

	fn into_iter(self) -> Self::IntoIter {
		self.content.iter()
	}
}
impl TryFrom<RawBeerPage> for BeerPage {
	type Error = PageError;

	fn try_from(raw: RawBeerPage) -> Result<Self, Self::Error> {
		let len = raw.content.len();

		if raw.size != 0 && len > raw.size as usize {
			return Err(PageError::ContentExceedsSize { len, size: raw.size });
		}
		if raw.total_elements < len as u64 {
			return Err(PageError::TotalBelowContent { len, total: raw.total_elements });
		}

		Ok(Self {
			content: raw.content,
			number: raw.number,
			size: raw.size,
			total_elements: raw.total_elements,
		})
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBeerPage {
	#[serde(default)]
	content: Vec<Beer>,
	number: u32,
	size: u32,
	total_elements: u64,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const BEER: &str = r#"{
		"id": "5f2b8f7e-3f44-4c59-9a52-8f0d5d1a7b11",
		"beerName": "Mango Bobs",
		"beerStyle": "IPA",
		"upc": "123245",
		"quantityOnHand": 500,
		"price": 10.99
	}"#;

	fn page_json(size: u32, total: u64) -> String {
		format!(
			r#"{{
				"content": [{BEER}],
				"pageable": {{"pageNumber": 1, "pageSize": {size}, "sort": {{"sorted": false}}}},
				"number": 1,
				"size": {size},
				"totalElements": {total},
				"last": true,
				"first": false
			}}"#
		)
	}

	#[test]
	fn decodes_envelope_ignoring_pageable() {
		let page: BeerPage =
			serde_json::from_str(&page_json(25, 26)).expect("Page envelope should decode.");

		assert_eq!(page.len(), 1);
		assert_eq!(page.number(), 1);
		assert_eq!(page.size(), 25);
		assert_eq!(page.total_elements(), 26);
		assert_eq!(page.total_pages(), 2);
		assert!(page.is_last());
		assert_eq!(page.iter().next().map(|beer| beer.beer_name.as_str()), Some("Mango Bobs"));
	}

	#[test]
	fn rejects_broken_invariants() {
		let too_small = serde_json::from_str::<BeerPage>(&page_json(25, 0))
			.expect_err("Total below content must fail.");

		assert!(too_small.to_string().contains("reports only 0"));

		let raw = format!(
			r#"{{"content": [{BEER}, {BEER}], "number": 0, "size": 1, "totalElements": 2}}"#
		);

		assert!(serde_json::from_str::<BeerPage>(&raw).is_err());
	}

	#[test]
	fn unpaged_size_zero_is_unbounded() {
		let raw = format!(r#"{{"content": [{BEER}], "number": 0, "size": 0, "totalElements": 1}}"#);
		let page: BeerPage = serde_json::from_str(&raw).expect("Unpaged response should decode.");

		assert_eq!(page.total_pages(), 1);
		assert_eq!(page.into_iter().count(), 1);
	}
}
