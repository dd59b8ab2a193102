// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-request trace identifier resolution and minting.

use serde_json::Value;
use uuid::Uuid;

use crate::carrier::Carrier;
use crate::notifier::Notifier;

/// Default inbound header consulted for trace identifiers.
pub const DEFAULT_TRACE_HEADER: &str = "x-trace-id";

/// Field-store key carrying the trace identifier.
pub(crate) const TRACE_FIELD: &str = "trace";

/// Option-store key caching a resolved trace identifier.
pub(crate) const TRACER_ID_OPTION: &str = "tracerId";

/// Transport prefix tried before the bare header name when reading
/// inbound metadata.
pub(crate) const METADATA_PREFIX: &str = "grpcmetadata-";

impl Notifier {
	/// The header name consulted for inbound trace identifiers.
	pub fn trace_header_name(&self) -> String {
		self.settings_read().trace_header.clone()
	}

	pub fn set_trace_header_name(&self, name: impl Into<String>) {
		self.settings_write().trace_header = name.into();
	}

	/// Fetches the trace identifier from a carrier, or empty when none
	/// is present. Pure lookup; never mints.
	///
	/// A hit in the field store is written through to the option-store
	/// cache so the next lookup is a cache hit.
	pub fn get_trace_id(&self, carrier: &Carrier) -> String {
		if let Some(id) = carrier.option(TRACER_ID_OPTION) {
			return id;
		}
		if let Some(Value::String(id)) = carrier.load(TRACE_FIELD) {
			carrier.set_option(TRACER_ID_OPTION, id.clone());
			return id.clone();
		}
		String::new()
	}

	/// Resolves or mints a trace identifier and threads it through the
	/// returned carrier. Use the returned carrier from here on.
	///
	/// Sources, first match wins: existing identifier, inbound metadata
	/// (transport-prefixed variant before the bare header name), active
	/// span baggage, freshly minted random identifier.
	pub fn set_trace_id(&self, carrier: &Carrier) -> Carrier {
		if !self.get_trace_id(carrier).is_empty() {
			return carrier.clone();
		}

		let header = self.trace_header_name();
		let mut trace_id = carrier
			.metadata(&format!("{METADATA_PREFIX}{header}"))
			.or_else(|| carrier.metadata(&header))
			.map(|values| values.join(","))
			.unwrap_or_default();

		if trace_id.trim().is_empty() {
			if let Some(id) = carrier.span().and_then(|s| s.baggage_item(TRACE_FIELD)) {
				trace_id = id.to_string();
			}
		}

		if trace_id.trim().is_empty() {
			trace_id = Uuid::new_v4().to_string();
		}

		self.store_trace_id(carrier, &trace_id)
	}

	/// Force-sets the trace identifier. An empty identifier falls back
	/// to [`set_trace_id`] resolution.
	///
	/// [`set_trace_id`]: Notifier::set_trace_id
	pub fn update_trace_id(&self, carrier: &Carrier, trace_id: &str) -> Carrier {
		if trace_id.is_empty() {
			return self.set_trace_id(carrier);
		}
		self.store_trace_id(carrier, trace_id)
	}

	fn store_trace_id(&self, carrier: &Carrier, trace_id: &str) -> Carrier {
		let next = carrier.add_field(TRACE_FIELD, trace_id.to_string());
		next.set_option(TRACER_ID_OPTION, trace_id.to_string());
		next
	}
}
