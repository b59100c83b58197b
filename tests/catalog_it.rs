#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use catalog_client::{
	auth::TokenState,
	authenticator::ReqwestAuthenticator,
	catalog::{BusinessUnit, Catalog},
	config::TokenConfig,
	executor::RequestExecutor,
	http::ReqwestTransport,
	reqwest::{Client, redirect::Policy},
	store::{MemoryBlobStore, TokenStore},
};
use httpmock::prelude::*;

const CLIENT_ID: &str = "ABC123DEF567";
const CLIENT_SECRET: &str = "kQ4Mr5A9JD";
const BASIC: &str = "Basic QUJDMTIzREVGNTY3OmtRNE1yNUE5SkQ=";

// The mock server presents a self-signed certificate.
fn mock_server_transport() -> ReqwestTransport {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.redirect(Policy::none())
		.build()
		.expect("Insecure reqwest client should build for the mock server.");

	ReqwestTransport::with_client(client)
}

async fn catalog(server: &MockServer) -> Catalog<ReqwestTransport> {
	let config = TokenConfig::builder()
		.authorization_url(server.url("/oauth/v1/accesstoken?grant_type=client_credentials"))
		.client_id(CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.persistence_key("MyRadio.authResponse")
		.build()
		.expect("Mock server configuration should build.");
	let transport = Arc::new(mock_server_transport());
	let store = TokenStore::new(Arc::new(MemoryBlobStore::default()), &config);
	let authenticator: ReqwestAuthenticator = ReqwestAuthenticator::new(config, store, transport.clone())
		.await
		.expect("Authenticator should initialize.");

	Catalog::new(RequestExecutor::new(authenticator, transport), &server.base_url())
		.expect("Mock server base URL should parse.")
}

async fn mock_token_endpoint(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/v1/accesstoken")
				.query_param("grant_type", "client_credentials")
				.header("authorization", BASIC)
				.header("accept", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"T1","token_type":"BearerToken","expires_in":"3599"}"#);
		})
		.await
}

#[tokio::test]
async fn livestreams_are_fetched_with_basic_then_bearer_credentials() {
	let server = MockServer::start_async().await;
	let token = mock_token_endpoint(&server).await;
	let listing = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/audiometadata/v2/livestreams")
				.query_param("bu", "srf")
				.header("authorization", "Bearer T1")
				.header("accept", "application/json")
				.header("accept-charset", "utf-8");
			then.status(200).header("content-type", "application/json").body(
				r#"{
					"mediaList": [
						{
							"id": "69e8ac16-4327-4af4-b873-fd5cd6e895a7",
							"title": "Radio SRF 1",
							"imageUrl": "https://ws.srf.ch/asset/image/audio/srf1/EPISODE_IMAGE",
							"vendor": "SRF",
							"mediaType": "AUDIO"
						},
						{
							"id": "dd0fa1ba-4ff6-4e1a-ab74-d7e49057d96f",
							"title": "Radio SRF 3",
							"imageUrl": "https://ws.srf.ch/asset/image/audio/srf3/EPISODE_IMAGE",
							"vendor": "SRF",
							"mediaType": "AUDIO"
						}
					]
				}"#,
			);
		})
		.await;
	let catalog = catalog(&server).await;

	for _ in 0..2 {
		let livestreams =
			catalog.livestreams(BusinessUnit::Srf).await.expect("Livestream listing should succeed.");

		assert_eq!(livestreams.len(), 2);
		assert_eq!(livestreams[1].name, "Radio SRF 3");
		assert_eq!(livestreams[1].sort_order, 1);
		assert_eq!(livestreams[0].business_unit, BusinessUnit::Srf);
	}

	token.assert_calls_async(1).await;
	listing.assert_calls_async(2).await;

	assert!(matches!(
		catalog.executor().authenticator().current_state(),
		TokenState::Valid { response, .. } if response.expires_in == Some(3599)
	));
}

#[tokio::test]
async fn media_urls_prefer_higher_quality_hls_streams() {
	let server = MockServer::start_async().await;
	let token = mock_token_endpoint(&server).await;
	let composition = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/audiometadata/v2/mediaComposition/audios/dd0fa1ba")
				.query_param("bu", "srf")
				.header("authorization", "Bearer T1");
			then.status(200).header("content-type", "application/json").body(
				r#"{
					"chapterUrn": "urn:srf:audio:dd0fa1ba",
					"chapterList": [
						{
							"resourceList": [
								{ "url": "https://lsaplus.swisstxt.ch/audio/drs3_32.stream/playlist.m3u8", "quality": "SD", "streaming": "HLS" },
								{ "url": "https://stream.srg-ssr.ch/m/drs3/mp3_128", "quality": "HQ", "streaming": "PROGRESSIVE" },
								{ "url": "https://lsaplus.swisstxt.ch/audio/drs3_96.stream/playlist.m3u8", "quality": "HD", "streaming": "HLS" }
							]
						}
					]
				}"#,
			);
		})
		.await;
	let catalog = catalog(&server).await;
	let urls = catalog
		.media_urls("dd0fa1ba", BusinessUnit::Srf)
		.await
		.expect("Media composition should resolve.");

	assert_eq!(
		urls.iter().map(|url| url.as_str()).collect::<Vec<_>>(),
		[
			"https://lsaplus.swisstxt.ch/audio/drs3_96.stream/playlist.m3u8",
			"https://lsaplus.swisstxt.ch/audio/drs3_32.stream/playlist.m3u8",
		]
	);

	token.assert_calls_async(1).await;
	composition.assert_calls_async(1).await;
}

#[tokio::test]
async fn unknown_media_surfaces_the_http_status() {
	let server = MockServer::start_async().await;
	let _token = mock_token_endpoint(&server).await;
	let missing = server
		.mock_async(|when, then| {
			when.method(GET).path("/audiometadata/v2/mediaComposition/audios/unknown");
			then.status(404).body(r#"{"status":{"code":404,"msg":"Media not found"}}"#);
		})
		.await;
	let catalog = catalog(&server).await;
	let err = catalog
		.media_urls("unknown", BusinessUnit::Rts)
		.await
		.expect_err("Unknown media should fail.");

	assert!(matches!(
		err,
		catalog_client::error::Error::Request(ref request) if request.status() == Some(404)
	));

	missing.assert_calls_async(1).await;
}
