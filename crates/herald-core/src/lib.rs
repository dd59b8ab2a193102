// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Herald error notification system.
//!
//! This crate provides the backend-agnostic data model shared between the
//! dispatch engine (`herald`) and anything that needs to understand its
//! reports: stack frames, severity tokens, tag groups, and the generic
//! report payload submitted to diagnostic backends.

pub mod error;
pub mod frame;
pub mod report;
pub mod severity;
pub mod tags;

pub use error::{CoreError, Result};
pub use frame::StackFrame;
pub use report::Report;
pub use severity::Severity;
pub use tags::Tags;
