// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background worker running detached dispatch jobs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Command {
	Run(Job),
	Ping(Sender<()>),
	Shutdown,
}

/// Single background thread draining a FIFO queue of jobs.
///
/// Backend submissions and `notify_with_exclude` dispatches run here so
/// the calling thread never blocks on delivery. `flush` lets shutdown
/// paths and tests wait for everything queued so far.
pub(crate) struct DispatchWorker {
	tx: Mutex<Option<Sender<Command>>>,
	handle: Mutex<Option<JoinHandle<()>>>,
	pending: Arc<AtomicUsize>,
}

impl DispatchWorker {
	pub(crate) fn new() -> Self {
		let (tx, rx) = mpsc::channel::<Command>();
		let pending = Arc::new(AtomicUsize::new(0));
		let worker_pending = Arc::clone(&pending);

		let handle = thread::Builder::new()
			.name("herald-dispatch".into())
			.spawn(move || {
				while let Ok(command) = rx.recv() {
					match command {
						Command::Run(job) => {
							job();
							worker_pending.fetch_sub(1, Ordering::SeqCst);
						}
						Command::Ping(ack) => {
							let _ = ack.send(());
						}
						Command::Shutdown => break,
					}
				}
			})
			.ok();

		Self {
			tx: Mutex::new(Some(tx)),
			handle: Mutex::new(handle),
			pending,
		}
	}

	/// Queues a job. Jobs submitted after close are dropped.
	pub(crate) fn spawn(&self, job: impl FnOnce() + Send + 'static) {
		self.pending.fetch_add(1, Ordering::SeqCst);
		if !self.send(Command::Run(Box::new(job))) {
			self.pending.fetch_sub(1, Ordering::SeqCst);
			debug!("dispatch worker unavailable, job dropped");
		}
	}

	/// Blocks until the queue is empty, including jobs queued by jobs.
	pub(crate) fn flush(&self) {
		loop {
			let (ack_tx, ack_rx) = mpsc::channel();
			if !self.send(Command::Ping(ack_tx)) {
				return;
			}
			if ack_rx.recv().is_err() {
				return;
			}
			if self.pending.load(Ordering::SeqCst) == 0 {
				return;
			}
		}
	}

	/// Drains pending jobs, stops the thread and joins it. Idempotent.
	pub(crate) fn close(&self) {
		let tx = self.tx.lock().ok().and_then(|mut guard| guard.take());
		if let Some(tx) = tx {
			let _ = tx.send(Command::Shutdown);
		}
		let handle = self.handle.lock().ok().and_then(|mut guard| guard.take());
		if let Some(handle) = handle {
			let _ = handle.join();
		}
	}

	fn send(&self, command: Command) -> bool {
		match self.tx.lock() {
			Ok(guard) => guard
				.as_ref()
				.map(|tx| tx.send(command).is_ok())
				.unwrap_or(false),
			Err(_) => false,
		}
	}
}

impl Drop for DispatchWorker {
	fn drop(&mut self) {
		self.close();
	}
}
