// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{ResolverConfigLayer, TranslationsConfigLayer};

/// Configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinguaConfigLayer {
	#[serde(default)]
	pub translations: Option<TranslationsConfigLayer>,
	#[serde(default)]
	pub resolver: Option<ResolverConfigLayer>,
}

impl LinguaConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: LinguaConfigLayer) {
		merge_option(
			&mut self.translations,
			other.translations,
			TranslationsConfigLayer::merge,
		);
		merge_option(&mut self.resolver, other.resolver, ResolverConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = LinguaConfigLayer::default();
		base.merge(LinguaConfigLayer::default());
		assert!(base.translations.is_none());
		assert!(base.resolver.is_none());
	}

	#[test]
	fn test_merge_fills_missing_section() {
		let mut base = LinguaConfigLayer::default();
		base.merge(LinguaConfigLayer {
			resolver: Some(ResolverConfigLayer {
				function: Some("tr".to_string()),
				..Default::default()
			}),
			..Default::default()
		});
		assert_eq!(
			base.resolver.and_then(|r| r.function).as_deref(),
			Some("tr")
		);
	}

	#[test]
	fn test_deserialize_full_layer() {
		let toml_str = r#"
[translations]
container = "i18n"
default_locale = "en"

[resolver]
schema = "public"
"#;
		let layer: LinguaConfigLayer = toml::from_str(toml_str).unwrap();
		let translations = layer.translations.unwrap();
		assert_eq!(translations.container.as_deref(), Some("i18n"));
		assert_eq!(translations.default_locale.as_deref(), Some("en"));
		let resolver = layer.resolver.unwrap();
		assert_eq!(resolver.schema.as_deref(), Some("public"));
		assert!(resolver.function.is_none());
	}
}
