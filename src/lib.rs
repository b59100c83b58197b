//! Authenticated client for OAuth 2.0 protected media-catalog APIs: single-flight
//! client-credentials tokens, rejection-aware retries, and pluggable token persistence.
//!
//! The crate is organized around one pipeline:
//!
//! - [`config::TokenConfig`] describes the authorization endpoint and client credentials.
//! - [`store::TokenStore`] persists the last successful token response in a [`store::BlobStore`].
//! - [`authenticator::Authenticator`] owns the token state and guarantees at most one refresh
//!   call is in flight.
//! - [`executor::RequestExecutor`] attaches bearer tokens, detects rejections, and retries
//!   according to [`retry::RetryPolicy`].
//! - [`catalog::Catalog`] is a thin consumer of the pipeline for the livestream catalog.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authenticator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod obs;
pub mod retry;
pub mod store;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::Result;
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
