// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Report an error through the herald dispatch engine.
//!
//! Run with:
//!   cargo run --example notify -p herald

use std::sync::Arc;

use herald::{Carrier, Datum, HttpBackend, Notifier, Severity, Tags, TracedError, WireFormat};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Configure from environment or use defaults for testing
	let endpoint = std::env::var("HERALD_ENDPOINT")
		.unwrap_or_else(|_| "https://errors.example.com/api".to_string());
	let token = std::env::var("HERALD_TOKEN").unwrap_or_else(|_| "dev-token".to_string());

	println!("Initializing notifier...");
	println!("  Endpoint: {}", endpoint);

	let backend = HttpBackend::new("rollbar", &endpoint, &token, WireFormat::Rollbar)?;
	let notifier = Notifier::builder()
		.environment("development")
		.release("0.1.0-example")
		.backend(Arc::new(backend))
		.build();

	// Stamp a trace id so every report from this request correlates.
	let carrier = notifier.set_trace_id(&Carrier::new());
	println!("  Trace id: {}", notifier.get_trace_id(&carrier));

	// A stack-captured error, reported with a tag group and a carrier.
	let err = TracedError::new("payment gateway timed out");
	notifier.notify_with_level(
		&err,
		Severity::Warning,
		&[
			Datum::from(carrier.clone()),
			Datum::from(Tags::from([("component", "billing")])),
		],
	);

	// Wrapping a plain error captures a stack at the wrap site.
	let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
	let wrapped = TracedError::wrap(io);
	notifier.notify(&wrapped, &[Datum::from(carrier)]);

	// Panics inside this scope are reported at critical severity and
	// re-raised. Comment the panic back in to see it.
	notifier.notify_on_panic(&[], || {
		// panic!("demo panic");
	});

	notifier.close();
	println!("Done.");
	Ok(())
}
