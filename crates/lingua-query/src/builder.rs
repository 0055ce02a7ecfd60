// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translated value expressions.
//!
//! A static locale argument is unrolled into `COALESCE` over the same
//! fallback plan the in-memory translator walks. A dynamic argument becomes
//! a call to the server-side resolver procedure, which runs that loop when
//! the query executes.

use lingua_config::ResolverConfig;
use lingua_core::{ends_with_own, plan, Registry, Step, TranslationMetadata};
use tracing::{debug, instrument};

use crate::error::{QueryError, Result};
use crate::expr::{Expr, LocaleArg, SqlType};

/// What a translated expression resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
	/// The whole per-locale submap of the container.
	Record { alias: String },
	/// One translatable attribute.
	Field { alias: String, attribute: String },
}

impl Target {
	pub fn record(alias: &str) -> Self {
		Target::Record {
			alias: alias.to_string(),
		}
	}

	pub fn field(alias: &str, attribute: &str) -> Self {
		Target::Field {
			alias: alias.to_string(),
			attribute: lingua_core::normalize_key(attribute).to_string(),
		}
	}

	pub fn alias(&self) -> &str {
		match self {
			Target::Record { alias } | Target::Field { alias, .. } => alias,
		}
	}
}

/// Translated expression for type `T`, using the default resolver names.
pub fn translated<T: 'static>(
	registry: &Registry,
	target: &Target,
	locales: impl Into<LocaleArg>,
) -> Result<Expr> {
	let metadata = registry.metadata::<T>()?;
	translated_with(metadata, target, &locales.into(), &ResolverConfig::default())
}

/// [`translated`] labeled for direct hydration into the attribute.
pub fn translated_as<T: 'static>(
	registry: &Registry,
	target: &Target,
	locales: impl Into<LocaleArg>,
) -> Result<Expr> {
	let metadata = registry.metadata::<T>()?;
	translated_as_with(metadata, target, &locales.into(), &ResolverConfig::default())
}

/// Build a translated expression from explicit metadata and resolver names.
///
/// Fails with [`QueryError::UntranslatableAttribute`] when a field target
/// names an attribute that is not declared translatable.
#[instrument(skip_all, fields(type_name = metadata.type_name(), dynamic = locales.is_dynamic()))]
pub fn translated_with(
	metadata: &TranslationMetadata,
	target: &Target,
	locales: &LocaleArg,
	resolver: &ResolverConfig,
) -> Result<Expr> {
	if let Target::Field { attribute, .. } = target {
		if !metadata.is_translatable(attribute) {
			return Err(QueryError::UntranslatableAttribute {
				type_name: metadata.type_name().to_string(),
				field: attribute.clone(),
			});
		}
	}

	let expr = match locales.static_chain() {
		Some(chain) => {
			let steps = plan(&chain, metadata.default_locale());
			debug!(steps = steps.len(), "unrolling static translation");
			unroll(metadata, target, &steps)
		}
		None => {
			debug!(function = %resolver.qualified_name(), "deferring translation to resolver");
			resolver_call(metadata, target, locales, resolver)
		}
	};

	Ok(expr)
}

/// [`translated_with`] labeled with the attribute name (or the container
/// name for record targets).
pub fn translated_as_with(
	metadata: &TranslationMetadata,
	target: &Target,
	locales: &LocaleArg,
	resolver: &ResolverConfig,
) -> Result<Expr> {
	let label = match target {
		Target::Field { attribute, .. } => attribute.clone(),
		Target::Record { .. } => metadata.container().to_string(),
	};
	Ok(translated_with(metadata, target, locales, resolver)?.alias(label))
}

fn container_column(metadata: &TranslationMetadata, alias: &str) -> Expr {
	Expr::column(alias, metadata.container())
}

/// Per-locale submap read, with stored jsonb `null` mapped to SQL `NULL`.
pub(crate) fn submap_read(metadata: &TranslationMetadata, alias: &str, locale: &str) -> Expr {
	container_column(metadata, alias)
		.json_get(Expr::text(locale))
		.null_if(Expr::JsonNull)
}

pub(crate) fn field_read(
	metadata: &TranslationMetadata,
	alias: &str,
	locale: &str,
	attribute: &str,
) -> Expr {
	container_column(metadata, alias)
		.json_get(Expr::text(locale))
		.json_get_text(Expr::text(attribute))
}

fn unroll(metadata: &TranslationMetadata, target: &Target, steps: &[Step]) -> Expr {
	let mut fragments: Vec<Expr> = steps
		.iter()
		.map(|step| match (step, target) {
			(Step::Own, Target::Field { alias, attribute }) => Expr::column(alias, attribute),
			(Step::Own, Target::Record { alias }) => container_column(metadata, alias),
			(Step::Container(locale), Target::Field { alias, attribute }) => {
				field_read(metadata, alias, locale.as_str(), attribute)
			}
			(Step::Container(locale), Target::Record { alias }) => {
				submap_read(metadata, alias, locale.as_str())
			}
		})
		.collect();

	if let Target::Field { alias, attribute } = target {
		if !ends_with_own(steps) {
			fragments.push(Expr::column(alias, attribute));
		}
	}

	match fragments.len() {
		0 => Expr::Null(SqlType::Jsonb),
		1 => fragments.remove(0),
		_ => Expr::Coalesce(fragments),
	}
}

fn resolver_call(
	metadata: &TranslationMetadata,
	target: &Target,
	locales: &LocaleArg,
	resolver: &ResolverConfig,
) -> Expr {
	let mut args = vec![
		Expr::Row(target.alias().to_string()),
		Expr::text(metadata.container()),
	];
	if let Target::Field { attribute, .. } = target {
		args.push(Expr::text(attribute.as_str()));
	}
	args.push(match metadata.default_locale() {
		Some(locale) => Expr::text(locale.as_str()),
		None => Expr::Null(SqlType::Varchar),
	});
	args.push(Expr::Array(locales.elements()).cast(SqlType::VarcharArray));

	Expr::call(resolver.qualified_name(), args)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::render::to_sql;
	use lingua_core::{accessor, ContainerShape, Schema, TransError};
	use serde_json::Value;

	#[derive(Debug, Clone, Default)]
	struct Post {
		title: String,
		translations: Value,
	}

	fn post_translations(post: &Post) -> &Value {
		&post.translations
	}

	fn registry(default_locale: Option<&str>) -> Registry {
		let mut schema = Schema::<Post>::builder("Post", post_translations)
			.accessor(accessor!(Post, title))
			.fields(["title"])
			.shape(ContainerShape::Sparse);
		if let Some(locale) = default_locale {
			schema = schema.default_locale(locale);
		}
		Registry::new().with(schema.build().unwrap()).unwrap()
	}

	#[test]
	fn test_static_field_unrolls_to_coalesce() {
		let registry = registry(None);
		let expr = translated::<Post>(&registry, &Target::field("p", "title"), ["de", "es"]).unwrap();
		assert_eq!(
			to_sql(&expr),
			"COALESCE(((\"p\".\"translations\" -> $1) ->> $2), ((\"p\".\"translations\" -> $3) ->> $4), \"p\".\"title\")"
		);
	}

	#[test]
	fn test_default_locale_becomes_own_column() {
		let registry = registry(Some("en"));
		let expr =
			translated::<Post>(&registry, &Target::field("p", "title"), ["fr", "en", "es"]).unwrap();
		assert_eq!(
			to_sql(&expr),
			"COALESCE(((\"p\".\"translations\" -> $1) ->> $2), \"p\".\"title\")"
		);

		let only_default = translated::<Post>(&registry, &Target::field("p", "title"), "en").unwrap();
		assert_eq!(only_default, Expr::column("p", "title"));
	}

	#[test]
	fn test_static_record_target_reads_submaps() {
		let registry = registry(Some("en"));
		let expr = translated::<Post>(&registry, &Target::record("p"), ["fr", "en"]).unwrap();
		assert_eq!(
			to_sql(&expr),
			"COALESCE(NULLIF((\"p\".\"translations\" -> $1), 'null'::jsonb), \"p\".\"translations\")"
		);

		let empty = translated::<Post>(&registry, &Target::record("p"), Vec::<&str>::new()).unwrap();
		assert_eq!(empty, Expr::Null(SqlType::Jsonb));
	}

	#[test]
	fn test_dynamic_field_calls_resolver() {
		let registry = registry(Some("en"));
		let locales = LocaleArg::List(vec!["es".into(), Expr::column("u", "locale").into()]);
		let expr = translated_as::<Post>(&registry, &Target::field("p", "title"), locales).unwrap();
		assert_eq!(
			to_sql(&expr),
			"\"translate_field\"(\"p\", $1, $2, $3, CAST(ARRAY[$4, \"u\".\"locale\"] AS varchar[])) AS \"title\""
		);
	}

	#[test]
	fn test_dynamic_record_without_default_passes_typed_null() {
		let registry = registry(None);
		let resolver = ResolverConfig {
			schema: Some("i18n".to_string()),
			function: "resolve".to_string(),
		};
		let metadata = registry.metadata::<Post>().unwrap();
		let expr = translated_with(
			metadata,
			&Target::record("p"),
			&LocaleArg::runtime(Expr::column("u", "locale")),
			&resolver,
		)
		.unwrap();
		assert_eq!(
			to_sql(&expr),
			"\"i18n\".\"resolve\"(\"p\", $1, NULL::varchar, CAST(ARRAY[\"u\".\"locale\"] AS varchar[]))"
		);
	}

	#[test]
	fn test_untranslatable_attribute_fails_at_build_time() {
		let registry = registry(None);
		for locales in [LocaleArg::from("es"), LocaleArg::runtime(Expr::text("es"))] {
			let err = translated::<Post>(&registry, &Target::field("p", "translations"), locales)
				.unwrap_err();
			match err {
				QueryError::UntranslatableAttribute { type_name, field } => {
					assert_eq!(type_name, "Post");
					assert_eq!(field, "translations");
				}
				other => panic!("unexpected error: {other}"),
			}
		}
	}

	#[test]
	fn test_unregistered_type_fails() {
		let registry = Registry::new();
		let err = translated::<Post>(&registry, &Target::record("p"), "es").unwrap_err();
		assert!(matches!(
			err,
			QueryError::Core(TransError::NotRegistered { .. })
		));
	}
}
