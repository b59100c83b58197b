//! Lists livestreams and resolves their stream URLs against a local mock of the catalog API,
//! persisting the access token to a file-backed store between runs.

// std
use std::{collections::HashMap, env, sync::Arc};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use catalog_client::{
	authenticator::ReqwestAuthenticator,
	catalog::{BusinessUnit, Catalog},
	config::TokenConfig,
	executor::RequestExecutor,
	http::ReqwestTransport,
	reqwest::{Client, redirect::Policy},
	store::{FileBlobStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/v1/accesstoken");
			then.status(200).header("content-type", "application/json").body(
				r#"{"access_token":"demo-access","token_type":"BearerToken","expires_in":"3599"}"#,
			);
		})
		.await;
	let _livestreams_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/audiometadata/v2/livestreams").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(
				r#"{"mediaList":[{"id":"dd0fa1ba","title":"Radio SRF 3","imageUrl":"https://ws.srf.ch/asset/image/audio/srf3/EPISODE_IMAGE","vendor":"SRF"}]}"#,
			);
		})
		.await;
	let _composition_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/audiometadata/v2/mediaComposition/audios/dd0fa1ba");
			then.status(200).header("content-type", "application/json").body(
				r#"{"chapterList":[{"resourceList":[{"url":"https://lsaplus.swisstxt.ch/audio/drs3_96.stream/playlist.m3u8","quality":"HD","streaming":"HLS"}]}]}"#,
			);
		})
		.await;
	let properties = HashMap::from([
		("SRG_AUTH_URL", server.url("/oauth/v1/accesstoken?grant_type=client_credentials")),
		("SRG_AUTH_KEY", "demo-client".to_owned()),
		("SRG_AUTH_SECRET", "demo-secret".to_owned()),
		("SRG_AUTH_DEFAULTS_KEY", "MyRadio.authResponse".to_owned()),
	]);
	let config = TokenConfig::from_properties(&properties, "SRG_")?;
	let backend = Arc::new(FileBlobStore::open(env::temp_dir().join("catalog_client_demo"))?);
	let store = TokenStore::new(backend, &config);
	// The mock server presents a self-signed certificate; production code uses `ReqwestTransport::new`.
	let client = Client::builder().danger_accept_invalid_certs(true).redirect(Policy::none()).build()?;
	let transport = Arc::new(ReqwestTransport::with_client(client));
	let authenticator = ReqwestAuthenticator::new(config, store, transport.clone()).await?;
	let mut states = authenticator.subscribe();

	tokio::spawn(async move {
		while let Some(state) = states.next().await {
			println!("Token state: {state}.");
		}
	});

	let catalog = Catalog::new(RequestExecutor::new(authenticator, transport), &server.base_url())?;

	for livestream in catalog.livestreams(BusinessUnit::Srf).await? {
		let urls = catalog.media_urls(&livestream.id, livestream.business_unit).await?;

		println!("{} ({}): {} stream(s).", livestream.name, livestream.business_unit, urls.len());

		for url in urls {
			println!("  {url}");
		}
	}

	Ok(())
}
