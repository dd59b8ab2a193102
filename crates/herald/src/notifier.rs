// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The notifier: backend registry, process configuration and lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::backend::{Backend, BackendEntry};
use crate::trace::DEFAULT_TRACE_HEADER;
use crate::worker::DispatchWorker;

/// Report-stamping configuration. Written by explicit setup calls at
/// process start, read on every dispatch.
#[derive(Debug, Clone, Default)]
pub(crate) struct Settings {
	pub(crate) environment: String,
	pub(crate) release: String,
	pub(crate) hostname: String,
	pub(crate) server_root: String,
	pub(crate) trace_header: String,
}

/// Builder for constructing a [`Notifier`].
pub struct NotifierBuilder {
	settings: Settings,
	backends: Vec<BackendEntry>,
}

impl NotifierBuilder {
	pub fn new() -> Self {
		Self {
			settings: Settings {
				trace_header: DEFAULT_TRACE_HEADER.to_string(),
				..Settings::default()
			},
			backends: Vec::new(),
		}
	}

	/// Sets the environment name, e.g. `production` or `staging`.
	pub fn environment(mut self, env: impl Into<String>) -> Self {
		self.settings.environment = env.into();
		self
	}

	/// Sets the release tag used to group errors by release.
	pub fn release(mut self, release: impl Into<String>) -> Self {
		self.settings.release = release.into();
		self
	}

	/// Sets the reporting hostname. Discovered from the OS when unset.
	pub fn hostname(mut self, name: impl Into<String>) -> Self {
		self.settings.hostname = name.into();
		self
	}

	/// Sets the project root trimmed from stack trace paths by backends.
	/// Defaults to the working directory at first read.
	pub fn server_root(mut self, path: impl Into<String>) -> Self {
		self.settings.server_root = path.into();
		self
	}

	/// Sets the inbound header consulted for trace identifiers.
	pub fn trace_header(mut self, name: impl Into<String>) -> Self {
		self.settings.trace_header = name.into();
		self
	}

	/// Registers a backend, enabled by default. Backends are notified in
	/// registration order.
	pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
		self.backends.push(BackendEntry {
			enabled: AtomicBool::new(true),
			backend,
		});
		self
	}

	pub fn build(self) -> Notifier {
		info!(backends = self.backends.len(), "notifier initialized");
		Notifier {
			inner: Arc::new(NotifierInner {
				settings: RwLock::new(self.settings),
				backends: self.backends,
				worker: DispatchWorker::new(),
				closed: AtomicBool::new(false),
			}),
		}
	}
}

impl Default for NotifierBuilder {
	fn default() -> Self {
		Self::new()
	}
}

pub(crate) struct NotifierInner {
	pub(crate) settings: RwLock<Settings>,
	pub(crate) backends: Vec<BackendEntry>,
	pub(crate) worker: DispatchWorker,
	pub(crate) closed: AtomicBool,
}

/// Dispatches error occurrences to every enabled backend.
///
/// Cheap to clone; clones share the backend registry, configuration and
/// dispatch worker. Construct once at startup via [`Notifier::builder`],
/// then pass by clone wherever errors are reported.
#[derive(Clone)]
pub struct Notifier {
	pub(crate) inner: Arc<NotifierInner>,
}

impl Notifier {
	pub fn builder() -> NotifierBuilder {
		NotifierBuilder::new()
	}

	/// Sets the environment stamped onto all future reports.
	pub fn set_environment(&self, env: impl Into<String>) {
		self.settings_write().environment = env.into();
	}

	/// Sets the release tag stamped onto all future reports.
	pub fn set_release(&self, release: impl Into<String>) {
		self.settings_write().release = release.into();
	}

	/// Sets the hostname identifying the reporting server.
	pub fn set_hostname(&self, name: impl Into<String>) {
		self.settings_write().hostname = name.into();
	}

	/// Sets the project root directory.
	pub fn set_server_root(&self, path: impl Into<String>) {
		self.settings_write().server_root = path.into();
	}

	/// Enables or disables a registered backend by name.
	pub fn set_backend_enabled(&self, name: &str, enabled: bool) {
		for entry in &self.inner.backends {
			if entry.backend.name() == name {
				entry.enabled.store(enabled, Ordering::SeqCst);
			}
		}
	}

	pub(crate) fn environment(&self) -> String {
		self.settings_read().environment.clone()
	}

	pub(crate) fn release(&self) -> String {
		self.settings_read().release.clone()
	}

	/// Configured hostname, falling back to OS discovery on first read.
	/// Concurrent first-time population is a benign last-write-wins race.
	pub(crate) fn hostname(&self) -> String {
		let cached = self.settings_read().hostname.clone();
		if !cached.is_empty() {
			return cached;
		}
		let name = hostname::get()
			.ok()
			.and_then(|n| n.into_string().ok())
			.unwrap_or_default();
		if !name.is_empty() {
			self.settings_write().hostname = name.clone();
		}
		name
	}

	/// Configured server root, falling back to the working directory.
	pub(crate) fn server_root(&self) -> String {
		let cached = self.settings_read().server_root.clone();
		if !cached.is_empty() {
			return cached;
		}
		let cwd = std::env::current_dir()
			.map(|p| p.to_string_lossy().into_owned())
			.unwrap_or_default();
		if !cwd.is_empty() {
			self.settings_write().server_root = cwd.clone();
		}
		cwd
	}

	/// Backends currently enabled, in registration order.
	pub(crate) fn enabled_backends(&self) -> Vec<Arc<dyn Backend>> {
		self.inner
			.backends
			.iter()
			.filter(|entry| entry.enabled.load(Ordering::SeqCst))
			.map(|entry| Arc::clone(&entry.backend))
			.collect()
	}

	/// Blocks until every queued dispatch and submission has run.
	pub fn flush(&self) {
		self.inner.worker.flush();
	}

	/// Drains queued submissions, closes every backend and stops the
	/// dispatch worker. Call once during process shutdown; idempotent.
	pub fn close(&self) {
		if self.inner.closed.swap(true, Ordering::SeqCst) {
			return;
		}
		self.inner.worker.flush();
		for entry in &self.inner.backends {
			entry.backend.close();
		}
		self.inner.worker.close();
		info!("notifier closed");
	}

	pub fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::SeqCst)
	}

	pub(crate) fn settings_read(&self) -> RwLockReadGuard<'_, Settings> {
		self.inner.settings.read().unwrap_or_else(|e| e.into_inner())
	}

	pub(crate) fn settings_write(&self) -> RwLockWriteGuard<'_, Settings> {
		self.inner
			.settings
			.write()
			.unwrap_or_else(|e| e.into_inner())
	}
}
