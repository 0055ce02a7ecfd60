// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query helpers scoped to one registered type and table alias.

use lingua_config::ResolverConfig;
use lingua_core::{normalize_key, Locale, Registry, TranslationMetadata};

use crate::builder::{field_read, translated_as_with, translated_with, Target};
use crate::error::{QueryError, Result};
use crate::expr::{escape_like, Direction, Expr, LocaleArg, OrderBy};

/// Translation predicates and expressions for one table alias.
///
/// ```ignore
/// let posts = Translations::for_type::<Post>(&registry, "p")?.locale(["es", "fr"]);
/// let filter = posts.field_icontains("title", "hola")?;
/// let order = posts.order_by("title", Direction::Asc)?;
/// ```
#[derive(Debug, Clone)]
pub struct Translations<'a> {
	metadata: &'a TranslationMetadata,
	alias: String,
	locales: Option<LocaleArg>,
	resolver: ResolverConfig,
}

impl<'a> Translations<'a> {
	pub fn for_type<T: 'static>(registry: &'a Registry, alias: &str) -> Result<Self> {
		Ok(Self::new(registry.metadata::<T>()?, alias))
	}

	pub fn for_name(registry: &'a Registry, type_name: &str, alias: &str) -> Result<Self> {
		Ok(Self::new(registry.metadata_by_name(type_name)?, alias))
	}

	pub fn new(metadata: &'a TranslationMetadata, alias: &str) -> Self {
		Self {
			metadata,
			alias: alias.to_string(),
			locales: None,
			resolver: ResolverConfig::default(),
		}
	}

	/// Locale or chain used by the value helpers.
	pub fn locale(mut self, locales: impl Into<LocaleArg>) -> Self {
		self.locales = Some(locales.into());
		self
	}

	pub fn resolver(mut self, resolver: &ResolverConfig) -> Self {
		self.resolver = resolver.clone();
		self
	}

	pub fn metadata(&self) -> &'a TranslationMetadata {
		self.metadata
	}

	fn locales(&self) -> Result<&LocaleArg> {
		self.locales.as_ref().ok_or_else(|| QueryError::MissingLocale {
			type_name: self.metadata.type_name().to_string(),
		})
	}

	fn check_attribute(&self, attribute: &str) -> Result<String> {
		let attribute = normalize_key(attribute);
		if !self.metadata.is_translatable(attribute) {
			return Err(QueryError::UntranslatableAttribute {
				type_name: self.metadata.type_name().to_string(),
				field: attribute.to_string(),
			});
		}
		Ok(attribute.to_string())
	}

	/// Translated value of `attribute`.
	pub fn translated(&self, attribute: &str) -> Result<Expr> {
		let target = Target::field(&self.alias, attribute);
		translated_with(self.metadata, &target, self.locales()?, &self.resolver)
	}

	/// Translated value of `attribute`, labeled with its name.
	pub fn translated_as(&self, attribute: &str) -> Result<Expr> {
		let target = Target::field(&self.alias, attribute);
		translated_as_with(self.metadata, &target, self.locales()?, &self.resolver)
	}

	/// The translated per-locale submap.
	pub fn record(&self) -> Result<Expr> {
		let target = Target::record(&self.alias);
		translated_with(self.metadata, &target, self.locales()?, &self.resolver)
	}

	/// Whether the container holds a translation entry for `locale`.
	///
	/// Sparse containers omit missing locales, so presence of the key is
	/// enough. Fixed containers always carry the slot and mark absence with
	/// jsonb `null`.
	pub fn has_translation(&self, locale: impl Into<Locale>) -> Expr {
		let locale = locale.into();
		let read = Expr::column(&self.alias, self.metadata.container())
			.json_get(Expr::text(locale.as_str()));
		if self.metadata.shape().is_fixed() {
			read.not_equals(Expr::JsonNull)
		} else {
			read.is_not_null()
		}
	}

	/// Whether `attribute` has a non-null translation stored under `locale`.
	pub fn has_field_translation(&self, attribute: &str, locale: impl Into<Locale>) -> Result<Expr> {
		let attribute = self.check_attribute(attribute)?;
		let locale = locale.into();
		Ok(field_read(self.metadata, &self.alias, locale.as_str(), &attribute).is_not_null())
	}

	pub fn field_eq(&self, attribute: &str, value: impl Into<String>) -> Result<Expr> {
		Ok(self.translated(attribute)?.equals(Expr::text(value)))
	}

	pub fn field_like(&self, attribute: &str, pattern: impl Into<String>) -> Result<Expr> {
		Ok(self.translated(attribute)?.like(Expr::text(pattern)))
	}

	pub fn field_ilike(&self, attribute: &str, pattern: impl Into<String>) -> Result<Expr> {
		Ok(self.translated(attribute)?.ilike(Expr::text(pattern)))
	}

	/// Case-sensitive substring match; `needle` is matched literally.
	pub fn field_contains(&self, attribute: &str, needle: &str) -> Result<Expr> {
		self.field_like(attribute, format!("%{}%", escape_like(needle)))
	}

	/// Case-insensitive substring match; `needle` is matched literally.
	pub fn field_icontains(&self, attribute: &str, needle: &str) -> Result<Expr> {
		self.field_ilike(attribute, format!("%{}%", escape_like(needle)))
	}

	pub fn field_is_null(&self, attribute: &str) -> Result<Expr> {
		Ok(self.translated(attribute)?.is_null())
	}

	pub fn field_is_not_null(&self, attribute: &str) -> Result<Expr> {
		Ok(self.translated(attribute)?.is_not_null())
	}

	pub fn order_by(&self, attribute: &str, direction: Direction) -> Result<OrderBy> {
		Ok(OrderBy {
			expr: self.translated(attribute)?,
			direction,
		})
	}
}
