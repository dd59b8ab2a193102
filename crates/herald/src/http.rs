// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic JSON-over-HTTP backend.

use std::time::Duration;

use herald_core::Report;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::backend::Backend;
use crate::convert;
use crate::error::NotifierError;

/// Wire schema family spoken by an [`HttpBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
	Airbrake,
	Rollbar,
	Sentry,
}

/// Backend delivering reports as JSON POSTs with a bearer token.
///
/// Requests run on the dispatch worker with a short timeout; failures
/// are logged and swallowed, never retried or surfaced.
pub struct HttpBackend {
	name: String,
	endpoint: String,
	token: String,
	format: WireFormat,
	client: reqwest::blocking::Client,
}

impl HttpBackend {
	pub fn new(
		name: impl Into<String>,
		endpoint: impl Into<String>,
		token: impl Into<String>,
		format: WireFormat,
	) -> Result<Self, NotifierError> {
		let endpoint = endpoint.into();
		if endpoint.is_empty() {
			return Err(NotifierError::InvalidEndpoint(endpoint));
		}

		let client = reqwest::blocking::Client::builder()
			.timeout(Duration::from_secs(5))
			.build()?;

		Ok(Self {
			name: name.into(),
			endpoint: endpoint.trim_end_matches('/').to_string(),
			token: token.into(),
			format,
			client,
		})
	}

	fn payload(&self, report: &Report) -> serde_json::Value {
		match self.format {
			WireFormat::Airbrake => {
				// Absent context fields are omitted, not serialized as null.
				let mut context = serde_json::Map::new();
				context.insert("severity".into(), Value::from(report.severity.to_string()));
				let optional = [
					("environment", &report.environment),
					("hostname", &report.hostname),
					("rootDirectory", &report.server_root),
					("version", &report.release),
					("traceId", &report.trace_id),
				];
				for (key, value) in optional {
					if let Some(value) = value {
						context.insert(key.into(), Value::from(value.clone()));
					}
				}

				json!({
					"errors": [{
						"type": "error",
						"message": &report.message,
						"backtrace": convert::to_airbrake_frames(&report.frames),
					}],
					"context": context,
					"params": &report.extra,
				})
			}
			WireFormat::Rollbar => json!({
				"level": convert::rollbar_severity(report.severity),
				"title": &report.message,
				"environment": &report.environment,
				"timestamp": report.timestamp.to_rfc3339(),
				"body": {
					"trace": {
						"frames": convert::to_rollbar_frames(&report.frames),
						"exception": {
							"class": "error",
							"message": &report.message,
						},
					},
				},
				"custom": {
					"extra": &report.extra,
					"tags": report.merged_tags(),
					"traceId": &report.trace_id,
					"server": {
						"host": &report.hostname,
						"root": &report.server_root,
					},
				},
			}),
			WireFormat::Sentry => json!({
				"message": &report.message,
				"level": convert::sentry_severity(report.severity),
				"platform": "rust",
				"timestamp": report.timestamp.to_rfc3339(),
				"server_name": &report.hostname,
				"release": &report.release,
				"environment": &report.environment,
				"stacktrace": {
					"frames": convert::to_sentry_frames(&report.frames),
				},
				"extra": &report.extra,
				"tags": report.merged_tags(),
			}),
		}
	}
}

impl Backend for HttpBackend {
	fn name(&self) -> &str {
		&self.name
	}

	fn submit(&self, report: Report) {
		let payload = self.payload(&report);
		let result = self
			.client
			.post(&self.endpoint)
			.bearer_auth(&self.token)
			.json(&payload)
			.send();

		match result {
			Ok(response) if response.status().is_success() => {
				debug!(backend = %self.name, "report delivered");
			}
			Ok(response) => {
				error!(
					backend = %self.name,
					status = response.status().as_u16(),
					"backend rejected report"
				);
			}
			Err(e) => {
				error!(backend = %self.name, error = %e, "failed to deliver report");
			}
		}
	}
}
