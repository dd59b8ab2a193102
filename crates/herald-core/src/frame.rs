// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack frame types shared by the capture machinery and the backend
//! format adapters.

use serde::{Deserialize, Serialize};

/// A single captured stack frame.
///
/// Traces are ordered innermost frame first, as produced at the error's
/// capture point. Backend adapters that need a different ordering reverse
/// the sequence themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
	/// Source file path.
	pub file: String,
	/// Demangled function name.
	pub func: String,
	/// Line number, or 0 when unresolved.
	pub line: u32,
}

impl StackFrame {
	pub fn new(file: impl Into<String>, func: impl Into<String>, line: u32) -> Self {
		Self {
			file: file.into(),
			func: func.into(),
			line,
		}
	}
}
