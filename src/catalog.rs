//! Livestream catalog client built on [`RequestExecutor`].

mod business_unit;
mod model;

pub use business_unit::BusinessUnit;
pub use model::Livestream;

// self
use crate::{
	_prelude::*,
	catalog::model::{LivestreamsResponse, MediaCompositionResponse},
	config::builder,
	error::ConfigError,
	executor::RequestExecutor,
	http::{ApiRequest, HttpTransport},
};

const LIVESTREAMS_PATH: [&str; 3] = ["audiometadata", "v2", "livestreams"];
const MEDIA_COMPOSITION_PATH: [&str; 4] = ["audiometadata", "v2", "mediaComposition", "audios"];

/// Read-only view of the audio metadata catalog.
pub struct Catalog<T>
where
	T: ?Sized + HttpTransport,
{
	executor: RequestExecutor<T>,
	base_url: Url,
}
impl<T> Catalog<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a catalog rooted at `base_url`; a missing scheme defaults to `https://`.
	pub fn new(executor: RequestExecutor<T>, base_url: &str) -> Result<Self, ConfigError> {
		Ok(Self { executor, base_url: builder::parse_endpoint(base_url)? })
	}

	/// Base URL all endpoints are resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Executor used for every catalog call.
	pub fn executor(&self) -> &RequestExecutor<T> {
		&self.executor
	}

	/// Lists the livestreams of `business_unit` in catalog order.
	pub async fn livestreams(&self, business_unit: BusinessUnit) -> Result<Vec<Livestream>> {
		let url = self.endpoint(LIVESTREAMS_PATH, business_unit)?;
		let response: LivestreamsResponse = self
			.executor
			.execute_json(&ApiRequest::get(url))
			.await
			.inspect_err(|e| tracing::error!(%business_unit, error = %e, "livestream listing failed"))?;

		Ok(response
			.media_list
			.into_iter()
			.enumerate()
			.map(|(sort_order, media)| Livestream::from_media(sort_order, media))
			.collect())
	}

	/// Resolves the HLS stream URLs of `media_id`, higher qualities first.
	pub async fn media_urls(&self, media_id: &str, business_unit: BusinessUnit) -> Result<Vec<Url>> {
		let url = self
			.endpoint(MEDIA_COMPOSITION_PATH.into_iter().chain([media_id]), business_unit)?;
		let response: MediaCompositionResponse = self
			.executor
			.execute_json(&ApiRequest::get(url))
			.await
			.inspect_err(|e| {
				tracing::error!(media_id, %business_unit, error = %e, "media composition failed")
			})?;

		Ok(response.stream_urls())
	}

	fn endpoint<'a>(
		&self,
		segments: impl IntoIterator<Item = &'a str>,
		business_unit: BusinessUnit,
	) -> Result<Url, ConfigError> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::UnsupportedScheme { url: self.base_url.to_string() })?
			.pop_if_empty()
			.extend(segments);
		url.query_pairs_mut().clear().append_pair("bu", business_unit.parameter_value());

		Ok(url)
	}
}
impl<T> Debug for Catalog<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Catalog").field("base_url", &self.base_url.as_str()).finish()
	}
}
