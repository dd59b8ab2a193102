// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Categorical tags attached to reports for backend-level filtering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A group of string key/value tags, e.g. `{"environment": "prod"}`.
///
/// Several groups may accompany a single report. They are forwarded as
/// distinct groups to backends that support grouping and merged for
/// backends that do not; a later group never overwrites an earlier key
/// implicitly. Keys iterate in sorted order so output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insertion.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<const N: usize> From<[(&str, &str); N]> for Tags {
	fn from(pairs: [(&str, &str); N]) -> Self {
		Self(
			pairs
				.into_iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
		)
	}
}

impl FromIterator<(String, String)> for Tags {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_and_lookup() {
		let tags = Tags::new().with("environment", "prod").with("service", "api");
		assert_eq!(tags.get("environment"), Some("prod"));
		assert_eq!(tags.get("service"), Some("api"));
		assert_eq!(tags.len(), 2);
	}

	#[test]
	fn test_from_array() {
		let tags = Tags::from([("k", "v")]);
		assert_eq!(tags.get("k"), Some("v"));
	}

	#[test]
	fn test_iteration_is_sorted() {
		let tags = Tags::new().with("b", "2").with("a", "1");
		let keys: Vec<&str> = tags.iter().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["a", "b"]);
	}
}
