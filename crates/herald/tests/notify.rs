// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end dispatch tests against the in-memory backend.

use std::sync::Arc;

use herald::{Carrier, Datum, MemoryBackend, Notifier, Severity, Span, Tags, TracedError};
use serde::Serialize;

#[derive(Serialize)]
struct OrderContext {
	x: i32,
}

fn notifier_with_backend() -> (Notifier, Arc<MemoryBackend>) {
	let backend = Arc::new(MemoryBackend::new());
	let notifier = Notifier::builder()
		.environment("test")
		.release("0.0.1")
		.hostname("test-host")
		.server_root("/srv/test")
		.backend(Arc::clone(&backend) as _)
		.build();
	(notifier, backend)
}

#[test]
fn notify_returns_the_same_error_handle() {
	let (notifier, _backend) = notifier_with_backend();
	let err = TracedError::new("boom");

	let returned = notifier.notify(&err, &[]);
	assert!(returned.ptr_eq(&err));
}

#[test]
fn notify_records_one_report() {
	let (notifier, backend) = notifier_with_backend();
	let err = TracedError::new("boom");

	notifier.notify(
		&err,
		&[
			Datum::from(Tags::from([("k", "v")])),
			Datum::value(&OrderContext { x: 1 }),
		],
	);
	notifier.flush();

	let reports = backend.reports();
	assert_eq!(reports.len(), 1);

	let report = &reports[0];
	assert_eq!(report.message, "boom");
	assert_eq!(report.severity, Severity::Error);
	assert_eq!(report.environment.as_deref(), Some("test"));
	assert_eq!(report.hostname.as_deref(), Some("test-host"));
	assert!(!report.frames.is_empty());
	// The capture machinery's own frames are trimmed, so the top of the
	// stack is the function that constructed the error.
	assert!(
		report.frames[0].func.contains("notify_records_one_report"),
		"unexpected top frame: {}",
		report.frames[0].func
	);

	assert_eq!(report.tag_groups.len(), 1);
	assert_eq!(report.tag_groups[0].get("k"), Some("v"));

	let key = format!("{}1", std::any::type_name::<OrderContext>());
	assert_eq!(report.extra.get(&key), Some(&serde_json::json!({"x": 1})));
}

#[test]
fn suppressed_error_triggers_no_submission() {
	let (notifier, backend) = notifier_with_backend();
	let err = TracedError::new("boom");
	err.set_should_notify(false);

	let returned = notifier.notify(&err, &[]);
	notifier.flush();

	assert!(returned.ptr_eq(&err));
	assert_eq!(backend.report_count(), 0);
	assert!(!err.notified());
}

#[test]
fn notify_marks_the_error_notified() {
	let (notifier, _backend) = notifier_with_backend();
	let err = TracedError::new("boom");

	notifier.notify(&err, &[]);
	assert!(err.notified());
}

#[test]
fn self_reference_direct_is_not_reported() {
	let (notifier, backend) = notifier_with_backend();
	let err = TracedError::new("boom");

	let returned = notifier.notify(&err, &[Datum::from(err.clone())]);
	notifier.flush();

	assert!(returned.ptr_eq(&err));
	assert_eq!(backend.report_count(), 0);
}

#[test]
fn self_reference_via_wrapper_is_not_reported() {
	let (notifier, backend) = notifier_with_backend();
	let err = TracedError::new("boom");
	let wrapped = TracedError::wrap_traced(&err, "while shutting down");

	let returned = notifier.notify(&err, &[Datum::from(wrapped)]);
	notifier.flush();

	assert!(returned.ptr_eq(&err));
	assert_eq!(backend.report_count(), 0);
}

#[test]
fn unrelated_error_in_data_becomes_extra_context() {
	let (notifier, backend) = notifier_with_backend();
	let err = TracedError::new("boom");
	let other = TracedError::new("unrelated");

	notifier.notify(&err, &[Datum::from(other)]);
	notifier.flush();

	let reports = backend.reports();
	assert_eq!(reports.len(), 1);
	let key = format!("{}0", std::any::type_name::<TracedError>());
	assert_eq!(
		reports[0].extra.get(&key),
		Some(&serde_json::Value::String("unrelated".into()))
	);
}

#[test]
fn opaque_error_gets_a_synthesized_stack() {
	let (notifier, backend) = notifier_with_backend();
	let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
	let err = TracedError::opaque(io);
	assert!(!err.has_stack());

	notifier.notify(&err, &[]);
	notifier.flush();

	let reports = backend.reports();
	assert_eq!(reports.len(), 1);
	assert_eq!(reports[0].message, "disk gone");
	// The handle the caller keeps is still the stackless original.
	assert!(!err.has_stack());
}

#[test]
fn carrier_supplies_trace_id_and_fields() {
	let (notifier, backend) = notifier_with_backend();
	let carrier = notifier
		.update_trace_id(&Carrier::new(), "trace-42")
		.add_field("request_id", "r-1");
	let err = TracedError::new("boom");

	notifier.notify(&err, &[Datum::from(carrier)]);
	notifier.flush();

	let reports = backend.reports();
	assert_eq!(reports.len(), 1);
	assert_eq!(reports[0].trace_id.as_deref(), Some("trace-42"));
	assert_eq!(
		reports[0].extra.get("request_id"),
		Some(&serde_json::Value::String("r-1".into()))
	);
}

#[test]
fn span_baggage_beats_carrier_lookup_during_dispatch() {
	let (notifier, backend) = notifier_with_backend();
	let carrier = notifier
		.update_trace_id(&Carrier::new(), "from-carrier")
		.with_span(Span::new().with_baggage("trace", "from-span"));
	let err = TracedError::new("boom");

	notifier.notify(&err, &[Datum::from(carrier)]);
	notifier.flush();

	assert_eq!(backend.reports()[0].trace_id.as_deref(), Some("from-span"));
}

#[test]
fn disabled_backend_is_skipped() {
	let (notifier, backend) = notifier_with_backend();
	notifier.set_backend_enabled("memory", false);

	notifier.notify(&TracedError::new("boom"), &[]);
	notifier.flush();

	assert_eq!(backend.report_count(), 0);
}

#[test]
fn notify_with_exclude_reports_off_thread() {
	let (notifier, backend) = notifier_with_backend();
	let err = TracedError::new("boom");

	let returned = notifier.notify_with_exclude(&err, &[]);
	assert!(returned.ptr_eq(&err));

	notifier.flush();
	assert_eq!(backend.report_count(), 1);
}

#[test]
fn notify_with_exclude_self_reference_is_not_reported() {
	let (notifier, backend) = notifier_with_backend();
	let err = TracedError::new("boom");

	notifier.notify_with_exclude(&err, &[Datum::from(err.clone())]);
	notifier.flush();

	assert_eq!(backend.report_count(), 0);
}

#[test]
fn notify_after_close_submits_nothing() {
	let (notifier, backend) = notifier_with_backend();
	notifier.close();

	let err = TracedError::new("boom");
	let returned = notifier.notify(&err, &[]);

	assert!(returned.ptr_eq(&err));
	assert_eq!(backend.report_count(), 0);
}

#[test]
fn panic_is_reported_and_reraised() {
	let (notifier, backend) = notifier_with_backend();

	let previous = std::panic::take_hook();
	std::panic::set_hook(Box::new(|_| {}));
	let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
		notifier.notify_on_panic(&[Datum::from(Tags::from([("stage", "checkout")]))], || {
			panic!("kaboom");
		})
	}));
	std::panic::set_hook(previous);

	let payload = result.unwrap_err();
	let err = payload.downcast::<TracedError>().unwrap();
	assert_eq!(err.message(), "PANIC: kaboom");
	assert!(err.has_stack());

	notifier.flush();
	let reports = backend.reports();
	assert_eq!(reports.len(), 1);
	assert_eq!(reports[0].severity, Severity::Critical);
	assert_eq!(reports[0].tag_groups[0].get("stage"), Some("checkout"));
	assert_eq!(backend.panic_flushes(), 1);
}

#[test]
fn panic_free_scope_returns_value_and_flushes() {
	let (notifier, backend) = notifier_with_backend();

	let value = notifier.notify_on_panic(&[], || 41 + 1);

	assert_eq!(value, 42);
	assert_eq!(backend.report_count(), 0);
	assert_eq!(backend.panic_flushes(), 1);
}

#[test]
fn two_backends_both_receive_the_report() {
	let first = Arc::new(MemoryBackend::new());
	let second = Arc::new(MemoryBackend::new());
	let notifier = Notifier::builder()
		.backend(Arc::clone(&first) as _)
		.backend(Arc::clone(&second) as _)
		.build();

	notifier.notify(&TracedError::new("boom"), &[]);
	notifier.flush();

	assert_eq!(first.report_count(), 1);
	assert_eq!(second.report_count(), 1);
}
