// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation of a record's translations container.
//!
//! A container is a JSON object keyed by locale, each entry an object keyed
//! by attribute name. Sparse containers simply omit locales that have no
//! translation. Fixed containers carry one slot per configured locale and
//! mark "no translation" with `null` or `{}` instead.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::locale::{normalize_key, Locale};

/// Physical layout of a translations container, fixed at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "slots")]
pub enum ContainerShape {
	/// Locale keys may be missing entirely.
	#[default]
	Sparse,
	/// One slot per listed locale, always present, possibly `null`.
	Fixed(Vec<Locale>),
}

impl ContainerShape {
	pub fn fixed<I, L>(slots: I) -> Self
	where
		I: IntoIterator<Item = L>,
		L: Into<Locale>,
	{
		Self::Fixed(slots.into_iter().map(Into::into).collect())
	}

	pub fn is_fixed(&self) -> bool {
		matches!(self, Self::Fixed(_))
	}

	/// Whether `locale` is a configured slot. Sparse containers have no slots.
	pub fn has_slot(&self, locale: &Locale) -> bool {
		match self {
			Self::Sparse => false,
			Self::Fixed(slots) => slots.contains(locale),
		}
	}
}

/// Outcome of looking up one locale in a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
	/// The locale holds a non-empty attribute map.
	Found(&'a Map<String, Value>),
	/// The locale is present (or is a fixed slot) but holds nothing usable.
	EmptyAtLocale,
	/// The locale is not present at all.
	Absent,
}

impl<'a> Lookup<'a> {
	pub fn submap(&self) -> Option<&'a Map<String, Value>> {
		match self {
			Lookup::Found(map) => Some(map),
			_ => None,
		}
	}
}

/// Find `key` in `map`, matching string and symbol spellings alike.
fn get_normalized<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
	if let Some(value) = map.get(key) {
		return Some(value);
	}
	map.iter()
		.find(|(k, _)| normalize_key(k) == key)
		.map(|(_, v)| v)
}

/// Look up `locale` in `container`.
pub fn lookup<'a>(container: &'a Value, shape: &ContainerShape, locale: &Locale) -> Lookup<'a> {
	let Some(map) = container.as_object() else {
		return Lookup::Absent;
	};

	if shape.is_fixed() && !shape.has_slot(locale) {
		return Lookup::Absent;
	}

	match get_normalized(map, locale.as_str()) {
		Some(Value::Object(submap)) if !submap.is_empty() => Lookup::Found(submap),
		Some(_) => Lookup::EmptyAtLocale,
		None if shape.is_fixed() => Lookup::EmptyAtLocale,
		None => Lookup::Absent,
	}
}

/// Value of `attribute` inside a per-locale submap. Explicit `null` counts as
/// missing.
pub fn field_lookup<'a>(submap: &'a Map<String, Value>, attribute: &str) -> Option<&'a Value> {
	get_normalized(submap, normalize_key(attribute)).filter(|v| !v.is_null())
}
