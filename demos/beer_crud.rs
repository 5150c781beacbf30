//! Walks the Beer API lifecycle (create, read, update, list, delete) against a mock server,
//! letting the client fetch and cache one client-credentials token for every call.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use url::Url;
// self
use beer_client::{
	beer::{Beer, BeerClient, BeerStyle, ListBeersQuery},
	config::ClientConfig,
	registration::{ClientAuthMethod, ClientRegistration, RegistrationId, RegistrationRepository},
	uuid::Uuid,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let id = Uuid::new_v4();
	let item = format!("/api/v1/beer/{id}");
	let stored = |name: &str| {
		json!({
			"id": id,
			"version": 1,
			"beerName": name,
			"beerStyle": "PALE_ALE",
			"upc": "9122089364369",
			"quantityOnHand": 122,
			"price": 12.99
		})
	};
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let _create = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/beer");
			then.status(201).header("location", item.as_str());
		})
		.await;
	let _read = server
		.mock_async(|when, then| {
			when.method(GET).path(item.as_str());
			then.status(200).json_body(stored("Galaxy Cat"));
		})
		.await;
	let _update = server
		.mock_async(|when, then| {
			when.method(PUT).path(item.as_str());
			then.status(204);
		})
		.await;
	let _list = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/beer").query_param("beerStyle", "PALE_ALE");
			then.status(200).json_body(json!({
				"content": [stored("Galaxy Cat")],
				"number": 0,
				"size": 25,
				"totalElements": 1
			}));
		})
		.await;
	let _delete = server
		.mock_async(|when, then| {
			when.method(DELETE).path(item.as_str());
			then.status(204);
		})
		.await;
	let registration = ClientRegistration::builder(RegistrationId::default())
		.client_id("demo-client")
		.client_secret("demo-secret")
		.token_endpoint(Url::parse(&server.url("/oauth2/token"))?)
		.client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()?;
	let config = ClientConfig::parse(&server.base_url())?;
	let client = BeerClient::new(&config, RegistrationRepository::from_iter([registration]))?;
	let created = client
		.create_beer(&Beer::new(
			"Galaxy Cat",
			BeerStyle::PaleAle,
			"9122089364369",
			Decimal::new(1299, 2),
		))
		.await?;

	println!("Created {} with id {id}.", created.beer_name);

	let updated = client.update_beer(&created.clone().with_quantity_on_hand(144)).await?;

	println!("Stored state after update: {updated:?}.");

	let page = client
		.list_beers(&ListBeersQuery::new().beer_style(BeerStyle::PaleAle).show_inventory(true))
		.await?;

	println!("Pale ales on page {}: {}.", page.number(), page.len());

	client.delete_beer(id).await?;

	println!("Deleted {id}.");

	token_mock.assert_async().await;

	Ok(())
}
