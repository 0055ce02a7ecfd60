// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Defaults applied when a record type is registered.

use serde::{Deserialize, Serialize};

/// Name of the container attribute when nothing else is configured.
pub const DEFAULT_CONTAINER: &str = "translations";

/// Registration defaults (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationsConfig {
	/// Container attribute used by schemas that do not name one.
	pub container: String,
	/// Default locale used by schemas that do not declare one.
	pub default_locale: Option<String>,
}

impl Default for TranslationsConfig {
	fn default() -> Self {
		Self {
			container: DEFAULT_CONTAINER.to_string(),
			default_locale: None,
		}
	}
}

/// Registration defaults layer (partial, for merging).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationsConfigLayer {
	#[serde(default)]
	pub container: Option<String>,
	#[serde(default)]
	pub default_locale: Option<String>,
}

impl TranslationsConfigLayer {
	pub fn merge(&mut self, other: TranslationsConfigLayer) {
		if other.container.is_some() {
			self.container = other.container;
		}
		if other.default_locale.is_some() {
			self.default_locale = other.default_locale;
		}
	}

	pub fn finalize(self) -> TranslationsConfig {
		TranslationsConfig {
			container: self
				.container
				.unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
			default_locale: self.default_locale.filter(|l| !l.trim().is_empty()),
		}
	}
}
