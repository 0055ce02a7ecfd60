// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side resolver procedure naming.

use serde::{Deserialize, Serialize};

/// Procedure name used by both resolver overloads unless configured.
pub const DEFAULT_RESOLVER_FUNCTION: &str = "translate_field";

/// Resolver procedure configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
	/// Schema the procedures live in. `None` relies on the search path.
	pub schema: Option<String>,
	/// Shared name of the field and submap overloads.
	pub function: String,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			schema: None,
			function: DEFAULT_RESOLVER_FUNCTION.to_string(),
		}
	}
}

impl ResolverConfig {
	/// Schema-qualified procedure name, unquoted.
	pub fn qualified_name(&self) -> String {
		match &self.schema {
			Some(schema) => format!("{schema}.{}", self.function),
			None => self.function.clone(),
		}
	}
}

/// Resolver configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfigLayer {
	#[serde(default)]
	pub schema: Option<String>,
	#[serde(default)]
	pub function: Option<String>,
}

impl ResolverConfigLayer {
	pub fn merge(&mut self, other: ResolverConfigLayer) {
		if other.schema.is_some() {
			self.schema = other.schema;
		}
		if other.function.is_some() {
			self.function = other.function;
		}
	}

	pub fn finalize(self) -> ResolverConfig {
		ResolverConfig {
			schema: self.schema.filter(|s| !s.is_empty()),
			function: self
				.function
				.unwrap_or_else(|| DEFAULT_RESOLVER_FUNCTION.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_function() {
		let config = ResolverConfigLayer::default().finalize();
		assert_eq!(config.function, "translate_field");
		assert!(config.schema.is_none());
		assert_eq!(config.qualified_name(), "translate_field");
	}

	#[test]
	fn test_qualified_name_with_schema() {
		let config = ResolverConfigLayer {
			schema: Some("i18n".to_string()),
			function: Some("resolve_translation".to_string()),
		}
		.finalize();
		assert_eq!(config.qualified_name(), "i18n.resolve_translation");
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = ResolverConfigLayer {
			schema: Some("public".to_string()),
			function: None,
		};
		base.merge(ResolverConfigLayer {
			schema: None,
			function: Some("tr".to_string()),
		});
		assert_eq!(base.schema.as_deref(), Some("public"));
		assert_eq!(base.function.as_deref(), Some("tr"));
	}
}
