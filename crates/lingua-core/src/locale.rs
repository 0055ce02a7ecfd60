// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locales and ordered locale chains.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical form of a locale or attribute key.
///
/// Surrounding whitespace is dropped and leading `:` (symbol notation) is
/// stripped, so `":es"` and `"es"` name the same key.
pub fn normalize_key(raw: &str) -> &str {
	raw.trim().trim_start_matches(':').trim_start()
}

/// An opaque locale identifier, stored in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
	pub fn new(raw: impl AsRef<str>) -> Self {
		Self(normalize_key(raw.as_ref()).to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Locale {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Locale {
	fn from(raw: &str) -> Self {
		Self::new(raw)
	}
}

impl From<String> for Locale {
	fn from(raw: String) -> Self {
		Self::new(raw)
	}
}

impl From<&Locale> for Locale {
	fn from(locale: &Locale) -> Self {
		locale.clone()
	}
}

impl From<Locale> for String {
	fn from(locale: Locale) -> Self {
		locale.0
	}
}

impl PartialEq<str> for Locale {
	fn eq(&self, other: &str) -> bool {
		self.0 == normalize_key(other)
	}
}

impl PartialEq<&str> for Locale {
	fn eq(&self, other: &&str) -> bool {
		self == *other
	}
}

/// Ordered candidate locales, first match wins. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleChain(Vec<Locale>);

impl LocaleChain {
	pub fn new<I, L>(locales: I) -> Self
	where
		I: IntoIterator<Item = L>,
		L: Into<Locale>,
	{
		Self(locales.into_iter().map(Into::into).collect())
	}

	pub fn empty() -> Self {
		Self(Vec::new())
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Locale> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn as_slice(&self) -> &[Locale] {
		&self.0
	}

	pub fn contains(&self, locale: &Locale) -> bool {
		self.0.contains(locale)
	}

	/// Locale strings, in chain order.
	pub fn to_strings(&self) -> Vec<String> {
		self.0.iter().map(|l| l.as_str().to_string()).collect()
	}
}

impl fmt::Display for LocaleChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[")?;
		for (i, locale) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			f.write_str(locale.as_str())?;
		}
		f.write_str("]")
	}
}

impl<'a> IntoIterator for &'a LocaleChain {
	type Item = &'a Locale;
	type IntoIter = std::slice::Iter<'a, Locale>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl FromIterator<Locale> for LocaleChain {
	fn from_iter<I: IntoIterator<Item = Locale>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl From<Locale> for LocaleChain {
	fn from(locale: Locale) -> Self {
		Self(vec![locale])
	}
}

impl From<&Locale> for LocaleChain {
	fn from(locale: &Locale) -> Self {
		Self(vec![locale.clone()])
	}
}

impl From<&LocaleChain> for LocaleChain {
	fn from(chain: &LocaleChain) -> Self {
		chain.clone()
	}
}

impl From<&str> for LocaleChain {
	fn from(locale: &str) -> Self {
		Self(vec![Locale::new(locale)])
	}
}

impl From<String> for LocaleChain {
	fn from(locale: String) -> Self {
		Self(vec![Locale::new(locale)])
	}
}

impl From<Vec<Locale>> for LocaleChain {
	fn from(locales: Vec<Locale>) -> Self {
		Self(locales)
	}
}

impl From<Vec<&str>> for LocaleChain {
	fn from(locales: Vec<&str>) -> Self {
		Self::new(locales)
	}
}

impl From<Vec<String>> for LocaleChain {
	fn from(locales: Vec<String>) -> Self {
		Self::new(locales)
	}
}

impl From<&[&str]> for LocaleChain {
	fn from(locales: &[&str]) -> Self {
		Self::new(locales.iter().copied())
	}
}

impl<const N: usize> From<[&str; N]> for LocaleChain {
	fn from(locales: [&str; N]) -> Self {
		Self::new(locales)
	}
}
