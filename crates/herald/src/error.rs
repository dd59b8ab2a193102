// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the notification SDK.
//!
//! These cover configuration seams only. The `notify` family never
//! returns an error about its own operation: it always hands back the
//! original error being reported.

use thiserror::Error;

/// Errors that can occur while configuring the SDK.
#[derive(Debug, Error)]
pub enum NotifierError {
	/// Backend endpoint is missing or malformed.
	#[error("invalid backend endpoint: {0:?}")]
	InvalidEndpoint(String),

	/// HTTP client construction or request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),
}

/// Result type alias for SDK configuration.
pub type Result<T> = std::result::Result<T, NotifierError>;
