//! Scripted in-process transport shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use catalog_client::{
	config::TokenConfig,
	error::TransportError,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	http_types::{StatusCode, header::AUTHORIZATION},
};
use parking_lot::Mutex;
use tokio::time::Instant;

pub const TOKEN_PATH: &str = "/oauth/v1/accesstoken";

/// One canned reply.
#[derive(Clone, Debug)]
pub enum Reply {
	Status(u16, Vec<u8>),
	Fail,
	Panic,
}
impl Reply {
	pub fn token(access_token: &str) -> Self {
		Self::Status(
			200,
			format!(r#"{{"access_token":"{access_token}","token_type":"Bearer","expires_in":"3600"}}"#)
				.into_bytes(),
		)
	}

	pub fn json(status: u16, body: &str) -> Self {
		Self::Status(status, body.as_bytes().to_vec())
	}
}

#[derive(Debug)]
struct Script {
	queue: VecDeque<Reply>,
	fallback: Reply,
}
impl Script {
	fn next(&mut self) -> Reply {
		self.queue.pop_front().unwrap_or_else(|| self.fallback.clone())
	}
}

/// Request observed by the transport.
#[derive(Clone, Debug)]
pub struct Recorded {
	pub path: String,
	pub authorization: Option<String>,
}

/// Answers token requests (path [`TOKEN_PATH`]) and resource requests from separate scripts.
#[derive(Debug)]
pub struct ScriptedTransport {
	token: Mutex<Script>,
	resource: Mutex<Script>,
	token_delay: Duration,
	token_calls: AtomicUsize,
	token_call_times: Mutex<Vec<Instant>>,
	resource_calls: AtomicUsize,
	log: Mutex<Vec<Recorded>>,
}
impl ScriptedTransport {
	pub fn new() -> Self {
		Self {
			token: Mutex::new(Script { queue: VecDeque::new(), fallback: Reply::token("T1") }),
			resource: Mutex::new(Script { queue: VecDeque::new(), fallback: Reply::json(200, "{}") }),
			token_delay: Duration::ZERO,
			token_calls: AtomicUsize::new(0),
			token_call_times: Mutex::new(Vec::new()),
			resource_calls: AtomicUsize::new(0),
			log: Mutex::new(Vec::new()),
		}
	}

	pub fn token_replies(self, replies: impl IntoIterator<Item = Reply>) -> Self {
		self.token.lock().queue.extend(replies);

		self
	}

	pub fn token_fallback(self, reply: Reply) -> Self {
		self.token.lock().fallback = reply;

		self
	}

	pub fn resource_replies(self, replies: impl IntoIterator<Item = Reply>) -> Self {
		self.resource.lock().queue.extend(replies);

		self
	}

	pub fn resource_fallback(self, reply: Reply) -> Self {
		self.resource.lock().fallback = reply;

		self
	}

	pub fn with_token_delay(mut self, delay: Duration) -> Self {
		self.token_delay = delay;

		self
	}

	pub fn shared(self) -> Arc<Self> {
		Arc::new(self)
	}

	pub fn token_calls(&self) -> usize {
		self.token_calls.load(Ordering::SeqCst)
	}

	/// Instants at which token requests arrived, in order.
	pub fn token_call_times(&self) -> Vec<Instant> {
		self.token_call_times.lock().clone()
	}

	pub fn resource_calls(&self) -> usize {
		self.resource_calls.load(Ordering::SeqCst)
	}

	/// Authorization headers sent to resource endpoints, in order.
	pub fn resource_authorizations(&self) -> Vec<Option<String>> {
		self.log
			.lock()
			.iter()
			.filter(|recorded| recorded.path != TOKEN_PATH)
			.map(|recorded| recorded.authorization.clone())
			.collect()
	}
}
impl HttpTransport for ScriptedTransport {
	fn execute(&self, request: HttpRequest, timeout: Duration) -> TransportFuture<'_> {
		Box::pin(async move {
			let path = request.uri().path().to_owned();
			let authorization = request
				.headers()
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);

			self.log.lock().push(Recorded { path: path.clone(), authorization });

			let reply = if path == TOKEN_PATH {
				self.token_calls.fetch_add(1, Ordering::SeqCst);
				self.token_call_times.lock().push(Instant::now());

				let reply = self.token.lock().next();

				if !self.token_delay.is_zero() {
					tokio::time::sleep(self.token_delay).await;
				}

				reply
			} else {
				self.resource_calls.fetch_add(1, Ordering::SeqCst);

				self.resource.lock().next()
			};

			match reply {
				Reply::Status(status, body) => {
					let mut response = HttpResponse::new(body);

					*response.status_mut() = StatusCode::from_u16(status)
						.map_err(|e| TransportError::network(path.clone(), e))?;

					Ok(response)
				},
				Reply::Fail => Err(TransportError::Timeout { target: path, timeout }),
				Reply::Panic => panic!("scripted transport panicked on {path}"),
			}
		})
	}
}

pub fn config() -> TokenConfig {
	TokenConfig::builder()
		.authorization_url(format!("https://api.example.com{TOKEN_PATH}?grant_type=client_credentials"))
		.client_id("ABC123DEF567")
		.client_secret("kQ4Mr5A9JD")
		.persistence_key("MyRadio.authResponse")
		.build()
		.expect("Shared test configuration should build.")
}
