// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::LinguaConfigLayer;
use crate::sections::{ResolverConfigLayer, TranslationsConfigLayer};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<LinguaConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<LinguaConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(LinguaConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<LinguaConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(LinguaConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: LinguaConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LINGUA_<SETTING>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<LinguaConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(layer_from_lookup(|name| std::env::var(name).ok()))
	}
}

/// Build a layer from an environment-like lookup. Empty values count as unset.
pub(crate) fn layer_from_lookup<F>(lookup: F) -> LinguaConfigLayer
where
	F: Fn(&str) -> Option<String>,
{
	let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

	LinguaConfigLayer {
		translations: Some(TranslationsConfigLayer {
			container: var("LINGUA_CONTAINER"),
			default_locale: var("LINGUA_DEFAULT_LOCALE"),
		}),
		resolver: Some(ResolverConfigLayer {
			schema: var("LINGUA_RESOLVER_SCHEMA"),
			function: var("LINGUA_RESOLVER_FUNCTION"),
		}),
	}
}
