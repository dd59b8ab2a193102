// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Herald: stack-captured errors dispatched to diagnostic backends.
//!
//! The [`Notifier`] decides whether an error occurrence is reported,
//! extracts request-scoped context (trace identifiers, tag groups,
//! structured fields) from a mixed list of auxiliary values,
//! deduplicates overlapping error references, converts captured stacks
//! into each backend's wire schema and fans the report out to every
//! enabled backend without blocking the caller.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use herald::{Datum, MemoryBackend, Notifier, Tags, TracedError};
//!
//! let notifier = Notifier::builder()
//!     .environment("production")
//!     .backend(Arc::new(MemoryBackend::new()))
//!     .build();
//!
//! let err = TracedError::new("payment declined");
//! notifier.notify(&err, &[Datum::from(Tags::from([("tier", "gold")]))]);
//!
//! // Panic-guarded scope: the panic is reported, then re-raised.
//! notifier.notify_on_panic(&[], || do_risky_work());
//!
//! notifier.close();
//! ```

pub mod backend;
pub mod capture;
pub mod carrier;
pub mod convert;
mod dispatch;
pub mod error;
pub mod extract;
pub mod http;
mod notifier;
mod panic;
mod trace;
pub mod traced;
mod worker;

pub use backend::{Backend, MemoryBackend};
pub use carrier::{Carrier, Span};
pub use error::{NotifierError, Result};
pub use extract::{parse_raw_data, Datum};
pub use http::{HttpBackend, WireFormat};
pub use notifier::{Notifier, NotifierBuilder};
pub use trace::DEFAULT_TRACE_HEADER;
pub use traced::TracedError;

pub use herald_core::{Report, Severity, StackFrame, Tags};
