//! Beer records as exchanged with the REST API.

// crates.io
use rust_decimal::Decimal;
// self
use crate::_prelude::*;

/// Beer style category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeerStyle {
	/// Lager.
	Lager,
	/// Pilsner.
	Pilsner,
	/// Stout.
	Stout,
	/// Gose.
	Gose,
	/// Porter.
	Porter,
	/// Ale.
	Ale,
	/// Wheat beer.
	Wheat,
	/// India pale ale.
	Ipa,
	/// Pale ale.
	PaleAle,
	/// Saison.
	Saison,
}
impl BeerStyle {
	/// Every style, in declaration order.
	pub const ALL: [Self; 10] = [
		Self::Lager,
		Self::Pilsner,
		Self::Stout,
		Self::Gose,
		Self::Porter,
		Self::Ale,
		Self::Wheat,
		Self::Ipa,
		Self::PaleAle,
		Self::Saison,
	];

	/// Wire label, identical in JSON bodies and the `beerStyle` query parameter.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Lager => "LAGER",
			Self::Pilsner => "PILSNER",
			Self::Stout => "STOUT",
			Self::Gose => "GOSE",
			Self::Porter => "PORTER",
			Self::Ale => "ALE",
			Self::Wheat => "WHEAT",
			Self::Ipa => "IPA",
			Self::PaleAle => "PALE_ALE",
			Self::Saison => "SAISON",
		}
	}
}
impl Display for BeerStyle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for BeerStyle {
	type Err = UnknownBeerStyle;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|style| style.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownBeerStyle(s.to_owned()))
	}
}

/// Returned when a string names no [`BeerStyle`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown beer style `{0}`.")]
pub struct UnknownBeerStyle(pub String);

/// A beer as sent to and returned by the API.
///
/// `id` and `version` are assigned by the server and omitted from request bodies while unset.
/// Fields the client does not model (audit timestamps and the like) are ignored on decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beer {
	/// Server-assigned identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<Uuid>,
	/// Server-maintained optimistic-locking version.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<i32>,
	/// Display name.
	pub beer_name: String,
	/// Style category.
	pub beer_style: BeerStyle,
	/// External product code.
	pub upc: String,
	/// Units on hand, when the server reports inventory.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quantity_on_hand: Option<i32>,
	/// Unit price, exchanged as a JSON number without binary rounding.
	#[serde(with = "rust_decimal::serde::arbitrary_precision")]
	pub price: Decimal,
}
impl Beer {
	/// Creates an unsaved beer without id or inventory.
	pub fn new(
		beer_name: impl Into<String>,
		beer_style: BeerStyle,
		upc: impl Into<String>,
		price: Decimal,
	) -> Self {
		Self {
			id: None,
			version: None,
			beer_name: beer_name.into(),
			beer_style,
			upc: upc.into(),
			quantity_on_hand: None,
			price,
		}
	}

	/// Sets the identifier.
	pub fn with_id(mut self, id: Uuid) -> Self {
		self.id = Some(id);

		self
	}

	/// Sets the quantity on hand.
	pub fn with_quantity_on_hand(mut self, quantity: i32) -> Self {
		self.quantity_on_hand = Some(quantity);

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn mango_bobs() -> Beer {
		Beer::new(
			"Mango Bobs",
			BeerStyle::Ipa,
			"123245",
			Decimal::from_str("10.99").expect("Price fixture should parse."),
		)
		.with_quantity_on_hand(500)
	}

	#[test]
	fn serializes_camel_case_without_unset_ids() {
		let value = serde_json::to_value(mango_bobs()).expect("Beer should serialize.");

		assert_eq!(
			value,
			serde_json::json!({
				"beerName": "Mango Bobs",
				"beerStyle": "IPA",
				"upc": "123245",
				"quantityOnHand": 500,
				"price": 10.99
			})
		);
	}

	#[test]
	fn decodes_server_payload_and_ignores_audit_fields() {
		let beer: Beer = serde_json::from_str(
			r#"{
				"id": "1c1d0f0e-7c1f-4a8e-9e1a-1f8f3f7a2b10",
				"version": 2,
				"beerName": "Galaxy Cat",
				"beerStyle": "PALE_ALE",
				"upc": "9122089364369",
				"quantityOnHand": 122,
				"price": 12.99,
				"createdDate": "2024-05-01T10:15:30",
				"updateDate": "2024-05-02T08:00:00"
			}"#,
		)
		.expect("Server payload should decode.");

		assert_eq!(beer.beer_style, BeerStyle::PaleAle);
		assert_eq!(beer.version, Some(2));
		assert_eq!(beer.price, Decimal::from_str("12.99").expect("Price should parse."));
		assert!(beer.id.is_some());
	}

	#[test]
	fn price_keeps_every_digit() {
		let price =
			Decimal::from_str("12345678901234.123456789").expect("Price fixture should parse.");
		let beer = Beer::new("Galaxy Cat", BeerStyle::PaleAle, "9122089364369", price);
		let json = serde_json::to_string(&beer).expect("Beer should serialize.");

		assert!(json.contains("\"price\":12345678901234.123456789"), "{json}");

		let back: Beer = serde_json::from_str(&json).expect("Beer should decode.");

		assert_eq!(back.price, price);
		assert_eq!(back.price.scale(), 9);
	}

	#[test]
	fn style_labels_parse_case_insensitively() {
		for style in BeerStyle::ALL {
			assert_eq!(style.as_str().parse::<BeerStyle>(), Ok(style));
		}

		assert_eq!("pale_ale".parse::<BeerStyle>(), Ok(BeerStyle::PaleAle));
		assert!("lambic".parse::<BeerStyle>().is_err());
	}
}
