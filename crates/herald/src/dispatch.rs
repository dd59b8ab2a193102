// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The dispatch engine: decides whether an error is reported and fans
//! the report out to every enabled backend.

use chrono::Utc;
use herald_core::{Report, Severity};
use tracing::error;

use crate::extract::{parse_raw_data, Datum};
use crate::notifier::Notifier;
use crate::trace::TRACE_FIELD;
use crate::traced::TracedError;

/// Caller frames above the public notify entry points, dropped when a
/// stack has to be synthesized at report time.
const DEFAULT_SKIP: usize = 2;

impl Notifier {
	/// Reports an error to every enabled backend at error severity.
	///
	/// Always returns the original error handle so call sites compose:
	/// `return Err(notifier.notify(&err, &[]))`. Suppressed errors,
	/// self-referential data and backend failures all leave the return
	/// value untouched.
	pub fn notify(&self, err: &TracedError, data: &[Datum]) -> TracedError {
		self.notify_with_level_and_skip(err, DEFAULT_SKIP, Severity::Error, data)
	}

	/// Reports an error at the given severity.
	pub fn notify_with_level(&self, err: &TracedError, level: Severity, data: &[Datum]) -> TracedError {
		self.notify_with_level_and_skip(err, DEFAULT_SKIP, level, data)
	}

	/// Reports an error at the given severity, dropping `skip` caller
	/// frames if a stack has to be captured at report time.
	pub fn notify_with_level_and_skip(
		&self,
		err: &TracedError,
		skip: usize,
		level: Severity,
		data: &[Datum],
	) -> TracedError {
		if !err.should_notify() {
			return err.clone();
		}
		err.set_notified(true);
		self.dispatch(err, skip, level, data)
	}

	/// Reports an error entirely off the calling thread: extraction and
	/// submission both run on the dispatch worker.
	pub fn notify_with_exclude(&self, err: &TracedError, data: &[Datum]) -> TracedError {
		if is_self_referential(err, data) {
			return err.clone();
		}

		let notifier = self.clone();
		let err_job = err.clone();
		let data_job = data.to_vec();
		self.inner.worker.spawn(move || {
			notifier.notify(&err_job, &data_job);
		});
		err.clone()
	}

	fn dispatch(&self, err: &TracedError, skip: usize, level: Severity, data: &[Datum]) -> TracedError {
		// Ensure the reported error carries a stack; the caller keeps the
		// original handle either way.
		let reported = if err.has_stack() {
			err.clone()
		} else {
			err.with_captured_stack(skip + 1)
		};

		if is_self_referential(err, data) {
			return err.clone();
		}

		// The first carrier in the list is both the trace source and the
		// extraction context; additional carriers are ignored.
		let carrier = data
			.iter()
			.find_map(Datum::as_carrier)
			.cloned()
			.unwrap_or_default();

		let mut trace_id = carrier
			.span()
			.and_then(|s| s.baggage_item(TRACE_FIELD))
			.unwrap_or_default()
			.to_string();
		if trace_id.trim().is_empty() {
			trace_id = self.get_trace_id(&carrier);
		}

		let (extra, tag_groups) = parse_raw_data(&carrier, data);

		let environment = self.environment();
		let release = self.release();
		let report = Report {
			message: reported.message().to_string(),
			severity: level,
			frames: reported.stack_frames().to_vec(),
			extra,
			tag_groups,
			trace_id: (!trace_id.is_empty()).then_some(trace_id),
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

		// Observability floor: the occurrence is logged even with zero
		// backends configured.
		error!(
			error = %reported,
			frames = reported.stack_frames().len(),
			severity = %level,
			"error reported"
		);

		err.clone()
	}
}

/// True when the error being reported also appears in the auxiliary
/// list, directly or as the terminal cause of a wrapped error.
fn is_self_referential(err: &TracedError, data: &[Datum]) -> bool {
	data.iter().any(|datum| match datum {
		Datum::Error(other) => other.ptr_eq(err) || other.causes(err),
		_ => false,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_self_reference_direct() {
		let err = TracedError::new("boom");
		let data = vec![Datum::from(err.clone())];
		assert!(is_self_referential(&err, &data));
	}

	#[test]
	fn test_self_reference_via_cause_chain() {
		let err = TracedError::new("boom");
		let wrapped = TracedError::wrap_traced(&err, "outer");
		let data = vec![Datum::from(wrapped)];
		assert!(is_self_referential(&err, &data));
	}

	#[test]
	fn test_unrelated_error_is_not_self_reference() {
		let err = TracedError::new("boom");
		let other = TracedError::new("different");
		let data = vec![Datum::from(other)];
		assert!(!is_self_referential(&err, &data));
	}
}
