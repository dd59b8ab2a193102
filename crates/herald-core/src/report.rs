// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The backend-agnostic report payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frame::StackFrame;
use crate::severity::Severity;
use crate::tags::Tags;

/// A single error occurrence as handed to every enabled backend.
///
/// Built once per dispatch and cloned per backend; the backend's format
/// adapter converts `frames` into its own wire schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
	/// Error message.
	pub message: String,
	/// Generic severity token.
	pub severity: Severity,
	/// Captured stack, innermost frame first.
	pub frames: Vec<StackFrame>,
	/// Extra context panel entries, keyed by type name + position for
	/// explicit values and by field name for carrier ride-along fields.
	#[serde(default)]
	pub extra: serde_json::Map<String, serde_json::Value>,
	/// Tag groups in the order they were supplied.
	#[serde(default)]
	pub tag_groups: Vec<Tags>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub trace_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub environment: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub release: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hostname: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub server_root: Option<String>,
	pub timestamp: DateTime<Utc>,
}

impl Report {
	/// Creates a minimal report with the given message and severity.
	pub fn new(message: impl Into<String>, severity: Severity) -> Self {
		Self {
			message: message.into(),
			severity,
			frames: Vec::new(),
			extra: serde_json::Map::new(),
			tag_groups: Vec::new(),
			trace_id: None,
			environment: None,
			release: None,
			hostname: None,
			server_root: None,
			timestamp: Utc::now(),
		}
	}

	/// Returns all tag groups merged into one map, later groups losing
	/// on key collisions.
	pub fn merged_tags(&self) -> Tags {
		let mut merged = std::collections::BTreeMap::new();
		for group in &self.tag_groups {
			for (k, v) in group.iter() {
				merged.entry(k.to_string()).or_insert_with(|| v.to_string());
			}
		}
		merged.into_iter().collect()
	}
}
