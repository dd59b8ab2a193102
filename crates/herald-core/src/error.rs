// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the core data model.

use thiserror::Error;

/// Errors that can occur while handling core notification types.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("invalid severity level: {0}")]
	InvalidSeverity(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
