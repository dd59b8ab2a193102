// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Context extraction: partitioning auxiliary values into tag groups and
//! extra-data entries.

use std::any::type_name;

use herald_core::Tags;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::carrier::Carrier;
use crate::traced::TracedError;

/// One auxiliary value passed alongside an error being reported.
#[derive(Debug, Clone)]
pub enum Datum {
	/// A request carrier; consumed for trace lookup, never stored as
	/// data.
	Carrier(Carrier),
	/// A tag group.
	Tags(Tags),
	/// Another error. Checked against the primary error for
	/// self-reference; kept as extra data otherwise.
	Error(TracedError),
	/// Any serializable value, stored under its type name.
	Value {
		type_name: &'static str,
		value: Value,
	},
}

impl Datum {
	/// Wraps a serializable value, recording its Rust type name for the
	/// extra-data key. Unserializable values degrade to `null`.
	pub fn value<T: Serialize>(value: &T) -> Self {
		Self::Value {
			type_name: type_name::<T>(),
			value: serde_json::to_value(value).unwrap_or(Value::Null),
		}
	}

	pub(crate) fn as_carrier(&self) -> Option<&Carrier> {
		match self {
			Self::Carrier(carrier) => Some(carrier),
			_ => None,
		}
	}
}

impl From<Carrier> for Datum {
	fn from(carrier: Carrier) -> Self {
		Self::Carrier(carrier)
	}
}

impl From<Tags> for Datum {
	fn from(tags: Tags) -> Self {
		Self::Tags(tags)
	}
}

impl From<TracedError> for Datum {
	fn from(err: TracedError) -> Self {
		Self::Error(err)
	}
}

/// Partitions auxiliary values into extra data and tag groups, then
/// copies the carrier's own fields into the extra data so ambient
/// logging fields ride along automatically.
///
/// Extra-data keys combine the value's type name with its position in
/// the input list, which makes them collision-free even when several
/// values share a type. Pure; tag group order follows input order.
pub fn parse_raw_data(carrier: &Carrier, data: &[Datum]) -> (Map<String, Value>, Vec<Tags>) {
	let mut extra = Map::new();
	let mut tag_groups = Vec::new();

	for (pos, datum) in data.iter().enumerate() {
		match datum {
			Datum::Carrier(_) => continue,
			Datum::Tags(tags) => tag_groups.push(tags.clone()),
			Datum::Error(err) => {
				extra.insert(
					format!("{}{}", type_name::<TracedError>(), pos),
					Value::String(err.to_string()),
				);
			}
			Datum::Value { type_name, value } => {
				extra.insert(format!("{type_name}{pos}"), value.clone());
			}
		}
	}

	for (key, value) in carrier.fields() {
		extra.insert(key.clone(), value.clone());
	}

	(extra, tag_groups)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Serialize)]
	struct Payload {
		x: i32,
	}

	#[test]
	fn test_tags_preserve_input_order() {
		let first = Tags::from([("a", "1")]);
		let second = Tags::from([("b", "2")]);
		let data = vec![Datum::from(second.clone()), Datum::from(first.clone())];

		let (_, groups) = parse_raw_data(&Carrier::new(), &data);
		assert_eq!(groups, vec![second, first]);
	}

	#[test]
	fn test_value_keyed_by_type_and_position() {
		let data = vec![
			Datum::value(&Payload { x: 1 }),
			Datum::value(&Payload { x: 2 }),
		];

		let (extra, _) = parse_raw_data(&Carrier::new(), &data);
		let name = std::any::type_name::<Payload>();
		assert_eq!(extra.get(&format!("{name}0")), Some(&serde_json::json!({"x": 1})));
		assert_eq!(extra.get(&format!("{name}1")), Some(&serde_json::json!({"x": 2})));
	}

	#[test]
	fn test_carrier_skipped_but_position_counted() {
		let data = vec![
			Datum::from(Carrier::new()),
			Datum::value(&Payload { x: 7 }),
		];

		let (extra, _) = parse_raw_data(&Carrier::new(), &data);
		let name = std::any::type_name::<Payload>();
		assert!(extra.contains_key(&format!("{name}1")));
		assert_eq!(extra.len(), 1);
	}

	#[test]
	fn test_carrier_fields_ride_along() {
		let carrier = Carrier::new().add_field("request_id", "r-1");
		let (extra, _) = parse_raw_data(&carrier, &[]);
		assert_eq!(extra.get("request_id"), Some(&Value::from("r-1")));
	}

	#[test]
	fn test_error_datum_stored_as_message() {
		let err = TracedError::new("inner failure");
		let data = vec![Datum::from(err)];

		let (extra, _) = parse_raw_data(&Carrier::new(), &data);
		let name = std::any::type_name::<TracedError>();
		assert_eq!(
			extra.get(&format!("{name}0")),
			Some(&Value::String("inner failure".into()))
		);
	}
}
