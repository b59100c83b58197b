//! Catalog entities and the subset of the metadata wire format they are decoded from.

// self
use crate::{_prelude::*, catalog::BusinessUnit};

/// Live radio stream listed by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Livestream {
	/// Catalog identifier; also the media id for [`crate::catalog::Catalog::media_urls`].
	pub id: String,
	/// Display name.
	pub name: String,
	/// Artwork URL.
	pub image_url: Url,
	/// Owning broadcaster.
	pub business_unit: BusinessUnit,
	/// Position within the catalog response.
	pub sort_order: usize,
}
impl Livestream {
	/// Artwork URL scaled to `width` pixels.
	pub fn image_url_for_width(&self, width: u32) -> Url {
		let mut url = self.image_url.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().extend(["scale", "width", &width.to_string()]);
		}

		url
	}

	pub(crate) fn from_media(sort_order: usize, media: Media) -> Self {
		Self {
			image_url: normalize_image_url(media.vendor, media.image_url),
			id: media.id,
			name: media.title,
			business_unit: media.vendor,
			sort_order,
		}
	}
}

// RTS artwork URLs sometimes carry a trailing aspect-ratio segment that the image service rejects.
fn normalize_image_url(vendor: BusinessUnit, mut url: Url) -> Url {
	let has_ratio_suffix =
		url.path_segments().and_then(|mut segments| segments.next_back()) == Some("16x9");

	if vendor != BusinessUnit::Rts || !has_ratio_suffix {
		return url;
	}
	if let Ok(mut segments) = url.path_segments_mut() {
		segments.pop();
	}

	url
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LivestreamsResponse {
	pub media_list: Vec<Media>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Media {
	pub id: String,
	pub title: String,
	pub image_url: Url,
	pub vendor: BusinessUnit,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MediaCompositionResponse {
	#[serde(default)]
	pub chapter_list: Vec<Chapter>,
}
impl MediaCompositionResponse {
	/// HLS stream URLs of the first chapter, higher qualities first.
	pub(crate) fn stream_urls(self) -> Vec<Url> {
		let Some(chapter) = self.chapter_list.into_iter().next() else { return Vec::new() };
		let mut resources = chapter
			.resource_list
			.into_iter()
			.filter(|resource| resource.streaming == Streaming::Hls)
			.collect::<Vec<_>>();

		resources.sort_by_key(|resource| resource.quality == Quality::Sd);

		resources.into_iter().map(|resource| resource.url).collect()
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Chapter {
	#[serde(default)]
	pub resource_list: Vec<Resource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Resource {
	pub url: Url,
	pub quality: Quality,
	pub streaming: Streaming,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum Quality {
	Sd,
	Hd,
	Hq,
	#[serde(other)]
	Other,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum Streaming {
	Hls,
	#[serde(other)]
	Other,
}
