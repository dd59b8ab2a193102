// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Panic recovery: report an in-flight panic, then re-raise it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;
use herald_core::{Report, Severity};
use tracing::error;

use crate::extract::{parse_raw_data, Datum};
use crate::notifier::Notifier;
use crate::traced::TracedError;

impl Notifier {
	/// Runs `f`, reporting any panic at critical severity before
	/// re-raising it.
	///
	/// The panic payload is wrapped in a stack-captured [`TracedError`]
	/// and re-raised with that error as the new payload, so panic
	/// propagation and any outer recovery still observe a panic. This
	/// adapter never converts a panic into a normal return.
	pub fn notify_on_panic<F, R>(&self, data: &[Datum], f: F) -> R
	where
		F: FnOnce() -> R,
	{
		match panic::catch_unwind(AssertUnwindSafe(f)) {
			Ok(value) => {
				self.panic_flush();
				value
			}
			Err(payload) => {
				let err = classify_panic(payload);
				self.report_panic(&err, data);
				self.panic_flush();
				panic::resume_unwind(Box::new(err))
			}
		}
	}

	fn panic_flush(&self) {
		for backend in self.enabled_backends() {
			backend.panic_flush();
		}
	}

	/// Reports directly to every enabled backend, bypassing the dispatch
	/// engine's dedup logic: a panic payload is never the same object as
	/// a previously dispatched error.
	fn report_panic(&self, err: &TracedError, data: &[Datum]) {
		let carrier = data
			.iter()
			.find_map(Datum::as_carrier)
			.cloned()
			.unwrap_or_default();
		let (extra, tag_groups) = parse_raw_data(&carrier, data);

		let environment = self.environment();
		let release = self.release();
		let report = Report {
			message: err.message().to_string(),
			severity: Severity::Critical,
			frames: err.stack_frames().to_vec(),
			extra,
			tag_groups,
			trace_id: None,
			environment: (!environment.is_empty()).then_some(environment),
			release: (!release.is_empty()).then_some(release),
			hostname: Some(self.hostname()),
			server_root: Some(self.server_root()),
			timestamp: Utc::now(),
		};

		if !self.is_closed() {
			for backend in self.enabled_backends() {
				let report = report.clone();
				self.inner.worker.spawn(move || backend.submit(report));
			}
		}

		error!(error = %err, "panic reported");
	}
}

/// Turns a panic payload into a stack-captured error. Unrecognized
/// payload types produce the generic `"Panic"` error; classification
/// itself can never fail.
fn classify_panic(payload: Box<dyn Any + Send>) -> TracedError {
	let payload = match payload.downcast::<TracedError>() {
		Ok(err) => return TracedError::wrap_traced(&err, "PANIC"),
		Err(payload) => payload,
	};
	let payload = match payload.downcast::<String>() {
		Ok(message) => return TracedError::with_skip(format!("PANIC: {message}"), 1),
		Err(payload) => payload,
	};
	match payload.downcast::<&'static str>() {
		Ok(message) => TracedError::with_skip(format!("PANIC: {message}"), 1),
		Err(_) => TracedError::with_skip("Panic", 1),
	}
}
