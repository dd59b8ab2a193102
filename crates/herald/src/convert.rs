// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack-format adapters converting captured frames into each backend's
//! wire schema, plus the severity mappings that go with them.

use herald_core::{Severity, StackFrame};
use serde::Serialize;

/// Airbrake-style backtrace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirbrakeFrame {
	pub file: String,
	pub function: String,
	pub line: u32,
}

/// Rollbar-style frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbarFrame {
	pub filename: String,
	pub method: String,
	pub lineno: u32,
}

/// Sentry-style frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentryFrame {
	pub function: String,
	pub filename: String,
	pub lineno: u32,
	pub in_app: bool,
}

/// Converts frames to the Airbrake schema, order preserved.
pub fn to_airbrake_frames(frames: &[StackFrame]) -> Vec<AirbrakeFrame> {
	frames
		.iter()
		.map(|f| AirbrakeFrame {
			file: f.file.clone(),
			function: f.func.clone(),
			line: f.line,
		})
		.collect()
}

/// Converts frames to the Rollbar schema, order preserved.
pub fn to_rollbar_frames(frames: &[StackFrame]) -> Vec<RollbarFrame> {
	frames
		.iter()
		.map(|f| RollbarFrame {
			filename: f.file.clone(),
			method: f.func.clone(),
			lineno: f.line,
		})
		.collect()
}

/// Converts frames to the Sentry schema. Sentry expects outermost frame
/// first, so the captured innermost-first order is reversed.
pub fn to_sentry_frames(frames: &[StackFrame]) -> Vec<SentryFrame> {
	frames
		.iter()
		.rev()
		.map(|f| SentryFrame {
			function: f.func.clone(),
			filename: f.file.clone(),
			lineno: f.line,
			in_app: true,
		})
		.collect()
}

/// Rollbar has a native level for every severity token.
pub fn rollbar_severity(severity: Severity) -> &'static str {
	match severity {
		Severity::Debug => "debug",
		Severity::Info => "info",
		Severity::Warning => "warning",
		Severity::Error => "error",
		Severity::Critical => "critical",
	}
}

/// Sentry maps critical to fatal; everything without a mapping reports
/// at its error level.
pub fn sentry_severity(severity: Severity) -> &'static str {
	match severity {
		Severity::Critical => "fatal",
		Severity::Warning => "warning",
		_ => "error",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_frames() -> Vec<StackFrame> {
		vec![
			StackFrame::new("src/inner.rs", "app::inner", 10),
			StackFrame::new("src/mid.rs", "app::mid", 20),
			StackFrame::new("src/main.rs", "app::main", 30),
		]
	}

	#[test]
	fn test_airbrake_preserves_order_and_values() {
		let frames = sample_frames();
		let out = to_airbrake_frames(&frames);

		assert_eq!(out.len(), frames.len());
		assert_eq!(out[0].function, "app::inner");
		assert_eq!(out[0].file, "src/inner.rs");
		assert_eq!(out[0].line, 10);
	}

	#[test]
	fn test_rollbar_preserves_order_and_values() {
		let frames = sample_frames();
		let out = to_rollbar_frames(&frames);

		assert_eq!(out.len(), frames.len());
		assert_eq!(out[2].method, "app::main");
		assert_eq!(out[2].filename, "src/main.rs");
		assert_eq!(out[2].lineno, 30);
	}

	#[test]
	fn test_sentry_reverses_order() {
		let frames = sample_frames();
		let out = to_sentry_frames(&frames);

		assert_eq!(out.len(), frames.len());
		assert_eq!(out[0].function, frames[frames.len() - 1].func);
		assert_eq!(out[out.len() - 1].function, frames[0].func);
		assert!(out.iter().all(|f| f.in_app));
	}

	#[test]
	fn test_sentry_empty_input() {
		assert!(to_sentry_frames(&[]).is_empty());
	}

	#[test]
	fn test_severity_mappings() {
		assert_eq!(sentry_severity(Severity::Critical), "fatal");
		assert_eq!(sentry_severity(Severity::Warning), "warning");
		assert_eq!(sentry_severity(Severity::Info), "error");
		assert_eq!(rollbar_severity(Severity::Critical), "critical");
		assert_eq!(rollbar_severity(Severity::Debug), "debug");
	}
}
