// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for Lingua.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Registration defaults (container attribute name, default locale)
//! - Resolver procedure naming for the dynamic query path
//!
//! # Usage
//!
//! ```ignore
//! use lingua_config::load_config_with_file;
//!
//! let config = load_config_with_file("lingua.toml")?;
//! println!("container attribute: {}", config.translations.container);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::LinguaConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Postgres truncates identifiers beyond this many bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinguaConfig {
	pub translations: TranslationsConfig,
	pub resolver: ResolverConfig,
}

/// Load configuration from defaults and environment (`LINGUA_*`).
pub fn load_config() -> Result<LinguaConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}

/// Load configuration with a TOML file between defaults and environment.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LINGUA_*`)
/// 2. Config file
/// 3. Built-in defaults
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<LinguaConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<LinguaConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = LinguaConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: LinguaConfigLayer) -> Result<LinguaConfig, ConfigError> {
	let translations = layer.translations.unwrap_or_default().finalize();
	let resolver = layer.resolver.unwrap_or_default().finalize();

	validate_config(&translations, &resolver)?;

	info!(
		container = %translations.container,
		default_locale = translations.default_locale.as_deref().unwrap_or("-"),
		resolver = %resolver.qualified_name(),
		"Lingua configuration loaded"
	);

	Ok(LinguaConfig {
		translations,
		resolver,
	})
}

/// Whether `name` can be used unquoted as a Postgres identifier.
pub fn is_valid_identifier(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
		_ => return false,
	}
	name.len() <= MAX_IDENTIFIER_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_config(
	translations: &TranslationsConfig,
	resolver: &ResolverConfig,
) -> Result<(), ConfigError> {
	let identifiers = [
		("translations.container", Some(translations.container.as_str())),
		("resolver.schema", resolver.schema.as_deref()),
		("resolver.function", Some(resolver.function.as_str())),
	];

	for (key, value) in identifiers {
		if let Some(value) = value {
			if !is_valid_identifier(value) {
				return Err(ConfigError::InvalidValue {
					key: key.to_string(),
					message: format!("'{value}' is not a valid SQL identifier"),
				});
			}
		}
	}

	Ok(())
}
