// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The stack-carrying error type consumed by the dispatch engine.

use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use herald_core::StackFrame;

use crate::capture;

/// Upper bound on cause-chain walks. A cyclic chain is a bug elsewhere
/// and must not hang the dispatcher.
const MAX_CAUSE_DEPTH: usize = 32;

struct Inner {
	message: String,
	frames: Vec<StackFrame>,
	has_stack: bool,
	cause: Option<TracedError>,
	source: Option<Arc<dyn StdError + Send + Sync + 'static>>,
	should_notify: AtomicBool,
	notified: AtomicBool,
}

/// An error with a captured call stack and notification markers.
///
/// `TracedError` is a cheap-clone handle: clones share the same
/// underlying error, so reference identity (`ptr_eq`) is meaningful and
/// the notified marker is visible through every clone. Like
/// `anyhow::Error` it deliberately does not implement
/// `std::error::Error`, so any foreign error converts in via [`wrap`].
///
/// [`wrap`]: TracedError::wrap
#[derive(Clone)]
pub struct TracedError {
	inner: Arc<Inner>,
}

impl TracedError {
	/// Creates a new error with a freshly captured stack.
	pub fn new(message: impl Into<String>) -> Self {
		Self::with_skip(message, 1)
	}

	/// Creates a new error, dropping `skip` additional caller frames
	/// from the captured stack.
	pub fn with_skip(message: impl Into<String>, skip: usize) -> Self {
		Self::build(message.into(), capture::capture(skip + 1), true, None, None)
	}

	/// Wraps a foreign error, capturing the stack at the wrap point.
	pub fn wrap<E>(err: E) -> Self
	where
		E: StdError + Send + Sync + 'static,
	{
		Self::wrap_with_skip(err, "", 1)
	}

	/// Wraps a foreign error with an optional message prefix and extra
	/// skip depth.
	pub fn wrap_with_skip<E>(err: E, message: &str, skip: usize) -> Self
	where
		E: StdError + Send + Sync + 'static,
	{
		let message = if message.is_empty() {
			err.to_string()
		} else {
			format!("{message}: {err}")
		};
		Self::build(
			message,
			capture::capture(skip + 1),
			true,
			None,
			Some(Arc::new(err)),
		)
	}

	/// Wraps an already-traced error, keeping it reachable on the cause
	/// chain. A fresh stack is captured at the wrap point.
	pub fn wrap_traced(cause: &TracedError, message: impl Into<String>) -> Self {
		let message = message.into();
		let message = if message.is_empty() {
			cause.message().to_string()
		} else {
			format!("{message}: {cause}")
		};
		Self::build(
			message,
			capture::capture(1),
			true,
			Some(cause.clone()),
			None,
		)
	}

	/// Wraps a foreign error without capturing a stack. The dispatch
	/// engine synthesizes one at first report.
	pub fn opaque<E>(err: E) -> Self
	where
		E: StdError + Send + Sync + 'static,
	{
		Self::build(err.to_string(), Vec::new(), false, None, Some(Arc::new(err)))
	}

	fn build(
		message: String,
		frames: Vec<StackFrame>,
		has_stack: bool,
		cause: Option<TracedError>,
		source: Option<Arc<dyn StdError + Send + Sync + 'static>>,
	) -> Self {
		Self {
			inner: Arc::new(Inner {
				message,
				frames,
				has_stack,
				cause,
				source,
				should_notify: AtomicBool::new(true),
				notified: AtomicBool::new(false),
			}),
		}
	}

	/// Clone of this error with a stack captured now, reachable from the
	/// original via the cause chain. Used when a report is requested for
	/// an error that was created without capture.
	pub(crate) fn with_captured_stack(&self, skip: usize) -> TracedError {
		Self::build(
			self.message().to_string(),
			capture::capture(skip + 1),
			true,
			Some(self.clone()),
			None,
		)
	}

	pub fn message(&self) -> &str {
		&self.inner.message
	}

	/// Captured stack, innermost frame first. Empty when `has_stack` is
	/// false.
	pub fn stack_frames(&self) -> &[StackFrame] {
		&self.inner.frames
	}

	pub fn has_stack(&self) -> bool {
		self.inner.has_stack
	}

	/// Next traced error on the cause chain, if any.
	pub fn cause(&self) -> Option<&TracedError> {
		self.inner.cause.as_ref()
	}

	/// Terminal foreign error this handle wraps, if any.
	pub fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self.inner.source.as_deref().map(|e| e as _)
	}

	/// Whether this error wants to be reported at all. Defaults to true.
	pub fn should_notify(&self) -> bool {
		self.inner.should_notify.load(Ordering::SeqCst)
	}

	pub fn set_should_notify(&self, notify: bool) {
		self.inner.should_notify.store(notify, Ordering::SeqCst);
	}

	/// Whether a notify call has already run for this error.
	pub fn notified(&self) -> bool {
		self.inner.notified.load(Ordering::SeqCst)
	}

	pub fn set_notified(&self, notified: bool) {
		self.inner.notified.store(notified, Ordering::SeqCst);
	}

	/// True when both handles refer to the same underlying error.
	pub fn ptr_eq(&self, other: &TracedError) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// True when `target` is reachable on this error's cause chain.
	/// The walk is depth-capped so a cyclic chain cannot loop forever.
	pub fn causes(&self, target: &TracedError) -> bool {
		let mut current = self.cause();
		for _ in 0..MAX_CAUSE_DEPTH {
			match current {
				Some(c) if c.ptr_eq(target) => return true,
				Some(c) => current = c.cause(),
				None => return false,
			}
		}
		false
	}
}

impl fmt::Display for TracedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.inner.message)
	}
}

impl fmt::Debug for TracedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TracedError")
			.field("message", &self.inner.message)
			.field("frames", &self.inner.frames.len())
			.field("has_stack", &self.inner.has_stack)
			.finish()
	}
}
