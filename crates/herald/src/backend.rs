// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The backend abstraction and the in-memory recording backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use herald_core::Report;

/// A diagnostic backend receiving error reports.
///
/// `submit` runs on the dispatch worker, never on the caller's thread.
/// Delivery failures must be absorbed by the implementation; the
/// dispatch engine neither retries nor surfaces them.
pub trait Backend: Send + Sync {
	/// Stable name used to enable or disable this backend.
	fn name(&self) -> &str;

	/// Deliver one report.
	fn submit(&self, report: Report);

	/// Hook invoked when a panic-guarded scope exits, panicking or not.
	fn panic_flush(&self) {}

	/// Explicit shutdown for backends holding queues or connections.
	fn close(&self) {}
}

/// One registry slot: a backend plus its enabled flag.
pub(crate) struct BackendEntry {
	pub(crate) enabled: AtomicBool,
	pub(crate) backend: std::sync::Arc<dyn Backend>,
}

/// Backend that records every submitted report in memory.
///
/// Useful in tests and as a local sink when no external service is
/// configured.
#[derive(Default)]
pub struct MemoryBackend {
	reports: Mutex<Vec<Report>>,
	panic_flushes: AtomicUsize,
	closed: AtomicBool,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// All reports submitted so far.
	pub fn reports(&self) -> Vec<Report> {
		self.reports
			.lock()
			.map(|reports| reports.clone())
			.unwrap_or_default()
	}

	pub fn report_count(&self) -> usize {
		self.reports.lock().map(|reports| reports.len()).unwrap_or(0)
	}

	pub fn panic_flushes(&self) -> usize {
		self.panic_flushes.load(Ordering::SeqCst)
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}
}

impl Backend for MemoryBackend {
	fn name(&self) -> &str {
		"memory"
	}

	fn submit(&self, report: Report) {
		if let Ok(mut reports) = self.reports.lock() {
			reports.push(report);
		}
	}

	fn panic_flush(&self) {
		self.panic_flushes.fetch_add(1, Ordering::SeqCst);
	}

	fn close(&self) {
		self.closed.store(true, Ordering::SeqCst);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use herald_core::Severity;

	#[test]
	fn test_memory_backend_records() {
		let backend = MemoryBackend::new();
		backend.submit(Report::new("boom", Severity::Error));

		assert_eq!(backend.report_count(), 1);
		assert_eq!(backend.reports()[0].message, "boom");
	}

	#[test]
	fn test_memory_backend_counts_panic_flushes() {
		let backend = MemoryBackend::new();
		backend.panic_flush();
		backend.panic_flush();
		assert_eq!(backend.panic_flushes(), 2);
	}
}
