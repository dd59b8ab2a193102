// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request ambient data: fields, options, inbound metadata and the
//! active span.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// The consumed slice of a distributed-tracing span: its baggage items.
#[derive(Debug, Clone, Default)]
pub struct Span {
	baggage: HashMap<String, String>,
}

impl Span {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_baggage(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.baggage.insert(name.into(), value.into());
		self
	}

	pub fn baggage_item(&self, name: &str) -> Option<&str> {
		self.baggage.get(name).map(String::as_str)
	}
}

/// Propagation vehicle for per-request ambient data.
///
/// The field store is copied on write, so `add_field` returns a new
/// carrier and earlier clones are unaffected. The option store is shared
/// across clones: it caches out-of-band values (like a resolved trace
/// identifier) that every clone of the request context should see.
#[derive(Debug, Clone, Default)]
pub struct Carrier {
	fields: BTreeMap<String, Value>,
	options: Arc<RwLock<HashMap<String, String>>>,
	metadata: HashMap<String, Vec<String>>,
	span: Option<Span>,
}

impl Carrier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a new carrier with the field added. Existing clones keep
	/// their old field store.
	pub fn add_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Carrier {
		let mut next = self.clone();
		next.fields.insert(key.into(), value.into());
		next
	}

	pub fn load(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	/// Iterates every field in key order.
	pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.fields.iter()
	}

	pub fn option(&self, key: &str) -> Option<String> {
		self.options.read().ok().and_then(|o| o.get(key).cloned())
	}

	/// Writes to the shared option store, visible through every clone of
	/// this carrier.
	pub fn set_option(&self, key: impl Into<String>, value: impl Into<String>) {
		if let Ok(mut options) = self.options.write() {
			options.insert(key.into(), value.into());
		}
	}

	/// Returns a new carrier with an inbound transport metadata entry.
	/// Keys are normalized to lowercase.
	pub fn with_metadata(&self, key: &str, values: Vec<String>) -> Carrier {
		let mut next = self.clone();
		next.metadata.insert(key.to_ascii_lowercase(), values);
		next
	}

	/// Looks up inbound metadata by normalized key.
	pub fn metadata(&self, key: &str) -> Option<&[String]> {
		self.metadata
			.get(&key.to_ascii_lowercase())
			.map(Vec::as_slice)
	}

	/// Returns a new carrier with the active span attached.
	pub fn with_span(&self, span: Span) -> Carrier {
		let mut next = self.clone();
		next.span = Some(span);
		next
	}

	pub fn span(&self) -> Option<&Span> {
		self.span.as_ref()
	}
}
