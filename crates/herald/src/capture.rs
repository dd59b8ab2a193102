// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backtrace capture and parsing into stack frames.

use std::backtrace::Backtrace;

use herald_core::StackFrame;
use rustc_demangle::demangle;

/// Captures the current call stack, dropping `skip` caller frames after
/// the capture machinery's own frames have been trimmed.
pub fn capture(skip: usize) -> Vec<StackFrame> {
	let backtrace = Backtrace::force_capture();
	let mut frames = parse_backtrace(&format!("{backtrace:#}"));

	let internal = frames
		.iter()
		.take_while(|f| is_internal_frame(&f.func))
		.count();
	let drop = internal.saturating_add(skip).min(frames.len());
	frames.drain(..drop);
	frames
}

/// Parse pretty-printed backtrace output into frames.
///
/// The format alternates symbol lines (`N: function_name`) with location
/// lines (`at /path/file.rs:line:col`) that belong to the preceding
/// symbol.
fn parse_backtrace(bt_string: &str) -> Vec<StackFrame> {
	let mut frames: Vec<StackFrame> = Vec::new();

	for line in bt_string.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if let Some(location) = line.strip_prefix("at ") {
			if let Some(last) = frames.last_mut() {
				if last.file.is_empty() {
					let (file, lineno) = parse_location(location);
					last.file = file;
					last.line = lineno;
				}
			}
			continue;
		}

		if let Some(func) = parse_frame_line(line) {
			frames.push(StackFrame::new(String::new(), func, 0));
		}
	}

	frames
}

/// Parse a single symbol line, stripping any `N:` frame-number prefix and
/// demangling the remainder.
fn parse_frame_line(line: &str) -> Option<String> {
	let name = match line.split_once(':') {
		Some((prefix, rest)) if prefix.trim().parse::<u32>().is_ok() => rest.trim(),
		_ => line,
	};

	if name.is_empty() {
		return None;
	}

	Some(demangle(name).to_string())
}

/// Parse `"/path/file.rs:line:col"` into a file path and line number.
fn parse_location(location: &str) -> (String, u32) {
	let mut parts = location.rsplitn(3, ':');
	let _col = parts.next();
	let line = parts.next().and_then(|s| s.parse().ok());
	match (parts.next(), line) {
		(Some(file), Some(line)) => (file.to_string(), line),
		_ => (location.to_string(), 0),
	}
}

/// Frames produced by the capture machinery itself, trimmed from the
/// front of every parsed trace.
fn is_internal_frame(func: &str) -> bool {
	const INTERNAL_PREFIXES: &[&str] = &[
		"herald::capture",
		"std::backtrace",
		"std::backtrace_rs",
		"backtrace::",
		"<std::backtrace",
	];

	INTERNAL_PREFIXES.iter().any(|p| func.starts_with(p))
		|| func.contains("Backtrace::force_capture")
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const SAMPLE: &str = "\
   0: std::backtrace::Backtrace::force_capture
             at /rustc/lib/std/src/backtrace.rs:312:5
   1: herald::capture::capture
             at /work/crates/herald/src/capture.rs:14:18
   2: my_app::handlers::process
             at /app/src/handlers.rs:42:9
   3: my_app::main
             at /app/src/main.rs:7:1
";

	#[test]
	fn test_parse_attaches_locations() {
		let frames = parse_backtrace(SAMPLE);
		assert_eq!(frames.len(), 4);
		assert_eq!(frames[2].func, "my_app::handlers::process");
		assert_eq!(frames[2].file, "/app/src/handlers.rs");
		assert_eq!(frames[2].line, 42);
	}

	#[test]
	fn test_parse_frame_line_with_number() {
		assert_eq!(
			parse_frame_line("  5: my_app::main").as_deref(),
			Some("my_app::main")
		);
	}

	#[test]
	fn test_parse_frame_line_bare() {
		assert_eq!(
			parse_frame_line("my_app::main").as_deref(),
			Some("my_app::main")
		);
	}

	#[test]
	fn test_parse_location_malformed() {
		let (file, line) = parse_location("no-line-info");
		assert_eq!(file, "no-line-info");
		assert_eq!(line, 0);
	}

	#[test]
	fn test_internal_frames_trimmed() {
		let frames = parse_backtrace(SAMPLE);
		let internal = frames
			.iter()
			.take_while(|f| is_internal_frame(&f.func))
			.count();
		assert_eq!(internal, 2);
	}

	proptest! {
		#[test]
		fn location_roundtrip(
			file in "[a-zA-Z0-9/_.-]{1,40}",
			line in 1u32..100_000u32,
			col in 1u32..500u32,
		) {
			let (parsed_file, parsed_line) = parse_location(&format!("{file}:{line}:{col}"));
			prop_assert_eq!(parsed_file, file);
			prop_assert_eq!(parsed_line, line);
		}
	}

	#[test]
	fn test_capture_does_not_panic() {
		// The exact frames depend on compilation mode and debug info
		// availability, only verify the call succeeds.
		let _frames = capture(0);
	}
}
