//! Outbound requests to the operating-system shell.
//!
//! Requests are best-effort: the platform gives no completion guarantee
//! beyond accepting or rejecting the request.

use async_trait::async_trait;
use parking_lot::Mutex;
use url::Url;

use crate::error::PlatformError;

/// Bridge to the host platform's URL and settings openers.
#[async_trait]
pub trait PlatformBridge: Send + Sync + 'static {
	async fn open_external_url(&self, url: &Url) -> Result<(), PlatformError>;

	async fn open_app_store_listing(&self) -> Result<(), PlatformError>;

	async fn open_system_settings(&self) -> Result<(), PlatformError>;
}

/// One request observed by [`RecordingPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformRequest {
	ExternalUrl(Url),
	StoreListing,
	SystemSettings,
}

impl PlatformRequest {
	pub fn name(&self) -> &'static str {
		match self {
			Self::ExternalUrl(_) => "open_external_url",
			Self::StoreListing => "open_app_store_listing",
			Self::SystemSettings => "open_system_settings",
		}
	}
}

/// Platform bridge that records requests instead of leaving the process.
///
/// Used by the command-line driver and by tests; it can be told to reject
/// every request to exercise failure paths.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
	requests: Mutex<Vec<PlatformRequest>>,
	reject: Mutex<Option<String>>,
}

impl RecordingPlatform {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rejects all subsequent requests with `message`.
	pub fn fail_with(&self, message: impl Into<String>) {
		*self.reject.lock() = Some(message.into());
	}

	/// Requests accepted so far, in arrival order.
	pub fn requests(&self) -> Vec<PlatformRequest> {
		self.requests.lock().clone()
	}

	fn record(&self, request: PlatformRequest) -> Result<(), PlatformError> {
		if let Some(message) = self.reject.lock().as_ref() {
			return Err(PlatformError::new(request.name(), message.clone()));
		}
		tracing::info!(request = request.name(), "platform.request");
		self.requests.lock().push(request);
		Ok(())
	}
}

#[async_trait]
impl PlatformBridge for RecordingPlatform {
	async fn open_external_url(&self, url: &Url) -> Result<(), PlatformError> {
		self.record(PlatformRequest::ExternalUrl(url.clone()))
	}

	async fn open_app_store_listing(&self) -> Result<(), PlatformError> {
		self.record(PlatformRequest::StoreListing)
	}

	async fn open_system_settings(&self) -> Result<(), PlatformError> {
		self.record(PlatformRequest::SystemSettings)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn records_in_arrival_order() {
		let platform = RecordingPlatform::new();
		platform.open_system_settings().await.expect("settings");
		platform.open_app_store_listing().await.expect("store");
		assert_eq!(platform.requests(), vec![PlatformRequest::SystemSettings, PlatformRequest::StoreListing]);
	}

	#[tokio::test]
	async fn rejected_requests_are_not_recorded() {
		let platform = RecordingPlatform::new();
		platform.fail_with("sandboxed");
		let err = platform.open_app_store_listing().await.expect_err("must reject");
		assert_eq!(err, PlatformError::new("open_app_store_listing", "sandboxed"));
		assert!(platform.requests().is_empty());
	}
}
