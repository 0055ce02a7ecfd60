// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory translation of hydrated records.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::container::{field_lookup, lookup};
use crate::error::{Result, TransError};
use crate::fallback::{plan, Step};
use crate::locale::{normalize_key, Locale, LocaleChain};
use crate::registry::Registry;
use crate::schema::Schema;

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
	/// Translated value stored under a chain locale.
	Translated { locale: Locale, value: Value },
	/// The chain reached the default locale.
	Default,
	/// No chain locale had a translation.
	Exhausted,
}

/// Resolves translated attributes against a [`Registry`].
#[derive(Debug, Clone, Copy)]
pub struct Translator<'r> {
	registry: &'r Registry,
}

impl<'r> Translator<'r> {
	pub fn new(registry: &'r Registry) -> Self {
		Self { registry }
	}

	pub fn registry(&self) -> &'r Registry {
		self.registry
	}

	/// Translated value of `attribute`, falling back to the record's own value.
	pub fn translate_field<R: 'static>(
		&self,
		record: &R,
		attribute: &str,
		locales: impl Into<LocaleChain>,
	) -> Result<Value> {
		let schema = self.registry.require_schema::<R>()?;
		let chain = locales.into();
		match self.resolve(schema, record, attribute, &chain)? {
			Resolution::Translated { value, .. } => Ok(value),
			Resolution::Default | Resolution::Exhausted => own_value(schema, record, attribute),
		}
	}

	/// Like [`Translator::translate_field`] but fails with
	/// [`TransError::NoTranslation`] instead of falling back silently.
	/// Reaching the default locale counts as a match.
	pub fn translate_field_strict<R: 'static>(
		&self,
		record: &R,
		attribute: &str,
		locales: impl Into<LocaleChain>,
	) -> Result<Value> {
		let schema = self.registry.require_schema::<R>()?;
		let chain = locales.into();
		match self.resolve(schema, record, attribute, &chain)? {
			Resolution::Translated { value, .. } => Ok(value),
			Resolution::Default => own_value(schema, record, attribute),
			Resolution::Exhausted => Err(TransError::NoTranslation {
				field: normalize_key(attribute).to_string(),
				locales: chain,
			}),
		}
	}

	/// [`Translator::translate_field`] deserialized into `T`.
	pub fn translate_field_as<R: 'static, T: DeserializeOwned>(
		&self,
		record: &R,
		attribute: &str,
		locales: impl Into<LocaleChain>,
	) -> Result<T> {
		let value = self.translate_field(record, attribute, locales)?;
		Ok(serde_json::from_value(value)?)
	}

	/// Where `attribute` would be resolved from, without touching the own value.
	pub fn resolution<R: 'static>(
		&self,
		record: &R,
		attribute: &str,
		locales: impl Into<LocaleChain>,
	) -> Result<Resolution> {
		let schema = self.registry.require_schema::<R>()?;
		self.resolve(schema, record, attribute, &locales.into())
	}

	/// A copy of `record` with every translatable attribute translated,
	/// recursing into loaded associations of registered types.
	pub fn translate<R: Clone + 'static>(
		&self,
		record: &R,
		locales: impl Into<LocaleChain>,
	) -> Result<R> {
		self.registry.require_schema::<R>()?;
		let chain = locales.into();
		let mut copy = record.clone();
		self.translate_in_place(&mut copy, &chain)?;
		Ok(copy)
	}

	/// Translate `record` in place. Unregistered types are left untouched.
	pub(crate) fn translate_in_place<R: 'static>(
		&self,
		record: &mut R,
		chain: &LocaleChain,
	) -> Result<()> {
		let Some(schema) = self.registry.schema::<R>() else {
			trace!(
				type_name = std::any::type_name::<R>(),
				"type not registered, leaving as is"
			);
			return Ok(());
		};

		for field in schema.metadata().fields() {
			if let Resolution::Translated { value, .. } =
				self.resolve(schema, record, field, chain)?
			{
				let accessor = schema.accessor(field).ok_or_else(|| unknown_field(schema, field))?;
				accessor.set(record, value)?;
			}
		}

		for association in schema.associations() {
			trace!(
				type_name = schema.metadata().type_name(),
				association = %association.name,
				"translating association"
			);
			(association.walk)(record, self, chain)?;
		}

		Ok(())
	}

	fn resolve<R: 'static>(
		&self,
		schema: &Schema<R>,
		record: &R,
		attribute: &str,
		chain: &LocaleChain,
	) -> Result<Resolution> {
		let meta = schema.metadata();
		if !meta.is_translatable(attribute) {
			return Err(TransError::NotTranslatable {
				type_name: meta.type_name().to_string(),
				field: normalize_key(attribute).to_string(),
			});
		}

		let container = schema.container_of(record);
		for step in plan(chain, meta.default_locale()) {
			match step {
				Step::Own => {
					trace!(field = attribute, "default locale reached");
					return Ok(Resolution::Default);
				}
				Step::Container(locale) => {
					let found = lookup(container, meta.shape(), &locale)
						.submap()
						.and_then(|submap| field_lookup(submap, attribute));
					if let Some(value) = found {
						trace!(field = attribute, locale = %locale, "translation found");
						return Ok(Resolution::Translated {
							value: value.clone(),
							locale,
						});
					}
				}
			}
		}

		trace!(field = attribute, locales = %chain, "no translation in chain");
		Ok(Resolution::Exhausted)
	}
}

fn own_value<R: 'static>(schema: &Schema<R>, record: &R, attribute: &str) -> Result<Value> {
	schema
		.accessor(attribute)
		.ok_or_else(|| unknown_field(schema, attribute))?
		.get(record)
}

fn unknown_field<R: 'static>(schema: &Schema<R>, attribute: &str) -> TransError {
	TransError::UnknownField {
		type_name: schema.metadata().type_name().to_string(),
		field: normalize_key(attribute).to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::container::ContainerShape;
	use crate::schema::Association;
	use proptest::prelude::*;
	use serde::Deserialize;
	use serde_json::json;

	#[derive(Debug, Clone, PartialEq, Default)]
	struct Post {
		title: String,
		body: String,
		translations: Value,
		comments: Association<Vec<Comment>>,
		category: Association<Category>,
		author: Association<Author>,
	}

	#[derive(Debug, Clone, PartialEq, Default)]
	struct Comment {
		text: String,
		translations: Value,
	}

	#[derive(Debug, Clone, PartialEq, Default)]
	struct Category {
		name: String,
		translations: Value,
	}

	#[derive(Debug, Clone, PartialEq, Default)]
	struct Author {
		name: String,
	}

	#[derive(Debug, Deserialize, PartialEq)]
	struct Tagline(String);

	fn post_container(post: &Post) -> &Value {
		&post.translations
	}

	fn comment_container(comment: &Comment) -> &Value {
		&comment.translations
	}

	fn category_container(category: &Category) -> &Value {
		&category.translations
	}

	fn registry(default_locale: Option<&str>) -> Registry {
		let mut post = Schema::<Post>::builder("Post", post_container)
			.accessor(crate::accessor!(Post, title))
			.accessor(crate::accessor!(Post, body))
			.fields(["title", "body"])
			.has_many("comments", |p: &mut Post| p.comments.loaded_mut())
			.has_one("category", |p: &mut Post| p.category.loaded_mut())
			.has_one("author", |p: &mut Post| p.author.loaded_mut());
		if let Some(locale) = default_locale {
			post = post.default_locale(locale);
		}

		let comment = Schema::<Comment>::builder("Comment", comment_container)
			.accessor(crate::accessor!(Comment, text))
			.fields(["text"])
			.build()
			.unwrap();

		let category = Schema::<Category>::builder("Category", category_container)
			.accessor(crate::accessor!(Category, name))
			.fields(["name"])
			.shape(ContainerShape::fixed(["es", "fr"]))
			.build()
			.unwrap();

		Registry::new()
			.with(post.build().unwrap())
			.and_then(|r| r.with(comment))
			.and_then(|r| r.with(category))
			.unwrap()
	}

	fn post() -> Post {
		Post {
			title: "Hello".to_string(),
			body: "Body".to_string(),
			translations: json!({
				"es": {"title": "Hola", "body": "Cuerpo"},
				"fr": {"title": "Bonjour"},
				"de": null,
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_translates_single_locale() {
		let registry = registry(Some("en"));
		let t = registry.translator();
		assert_eq!(t.translate_field(&post(), "title", "es").unwrap(), json!("Hola"));
		assert_eq!(t.translate_field(&post(), ":title", ":fr").unwrap(), json!("Bonjour"));
	}

	#[test]
	fn test_falls_back_to_own_value() {
		let registry = registry(Some("en"));
		let t = registry.translator();
		assert_eq!(t.translate_field(&post(), "body", "fr").unwrap(), json!("Body"));
		assert_eq!(t.translate_field(&post(), "title", "de").unwrap(), json!("Hello"));
		assert_eq!(
			t.translate_field(&post(), "title", LocaleChain::empty()).unwrap(),
			json!("Hello")
		);
	}

	#[derive(Debug, Default, Deserialize)]
	struct Opaque;

	impl serde::Serialize for Opaque {
		fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
			Err(serde::ser::Error::custom("opaque value"))
		}
	}

	#[derive(Debug, Default)]
	struct Sealed {
		label: Opaque,
		translations: Value,
	}

	fn sealed_container(sealed: &Sealed) -> &Value {
		&sealed.translations
	}

	#[test]
	fn test_own_value_serialization_error_propagates() {
		let registry = Registry::new()
			.with(
				Schema::<Sealed>::builder("Sealed", sealed_container)
					.accessor(crate::accessor!(Sealed, label))
					.fields(["label"])
					.build()
					.unwrap(),
			)
			.unwrap();
		let sealed = Sealed {
			translations: json!({"es": {"label": "etiqueta"}}),
			..Default::default()
		};
		let t = registry.translator();

		assert_eq!(t.translate_field(&sealed, "label", "es").unwrap(), json!("etiqueta"));
		let err = t.translate_field(&sealed, "label", "fr").unwrap_err();
		assert!(matches!(err, TransError::Serialization(_)));
	}

	#[test]
	fn test_chain_first_match_wins() {
		let registry = registry(None);
		let t = registry.translator();
		assert_eq!(
			t.translate_field(&post(), "body", ["de", "fr", "es"]).unwrap(),
			json!("Cuerpo")
		);
		assert_eq!(
			t.translate_field(&post(), "title", ["fr", "es"]).unwrap(),
			json!("Bonjour")
		);
	}

	#[test]
	fn test_default_locale_short_circuits() {
		let registry = registry(Some("es"));
		let t = registry.translator();
		// "es" has a stored translation but the default locale wins.
		assert_eq!(t.translate_field(&post(), "title", "es").unwrap(), json!("Hello"));
		assert_eq!(
			t.translate_field(&post(), "title", ["de", "es", "fr"]).unwrap(),
			json!("Hello")
		);
		assert_eq!(
			t.translate_field(&post(), "title", ["fr", "es"]).unwrap(),
			json!("Bonjour")
		);
	}

	#[test]
	fn test_strict_fails_when_exhausted() {
		let registry = registry(Some("en"));
		let t = registry.translator();
		let err = t
			.translate_field_strict(&post(), "body", ["fr", "de"])
			.unwrap_err();
		match err {
			TransError::NoTranslation { field, locales } => {
				assert_eq!(field, "body");
				assert_eq!(locales, LocaleChain::from(["fr", "de"]));
			}
			other => panic!("unexpected error: {other}"),
		}
		assert!(t
			.translate_field_strict(&post(), "title", LocaleChain::empty())
			.is_err());
	}

	#[test]
	fn test_strict_accepts_default_locale() {
		let registry = registry(Some("en"));
		let t = registry.translator();
		assert_eq!(
			t.translate_field_strict(&post(), "body", ["fr", "en"]).unwrap(),
			json!("Body")
		);
	}

	#[test]
	fn test_non_translatable_attribute_rejected_before_lookup() {
		let registry = registry(Some("en"));
		let t = registry.translator();
		for locales in [LocaleChain::from("es"), LocaleChain::empty()] {
			let err = t
				.translate_field(&post(), "translations", locales.clone())
				.unwrap_err();
			assert!(matches!(err, TransError::NotTranslatable { .. }));
			let err = t
				.translate_field_strict(&post(), "translations", locales)
				.unwrap_err();
			assert!(matches!(err, TransError::NotTranslatable { .. }));
		}
	}

	#[test]
	fn test_unregistered_record_rejected() {
		let registry = registry(None);
		let t = registry.translator();
		let author = Author::default();
		let err = t.translate_field(&author, "name", "es").unwrap_err();
		assert!(matches!(err, TransError::NotRegistered { .. }));
		assert!(t.translate(&author, "es").is_err());
	}

	#[test]
	fn test_typed_translation() {
		let registry = registry(None);
		let t = registry.translator();
		let tagline: Tagline = t.translate_field_as(&post(), "title", "es").unwrap();
		assert_eq!(tagline, Tagline("Hola".to_string()));
	}

	#[test]
	fn test_resolution_reports_source() {
		let registry = registry(Some("en"));
		let t = registry.translator();
		assert_eq!(
			t.resolution(&post(), "title", ["de", "fr"]).unwrap(),
			Resolution::Translated {
				locale: Locale::new("fr"),
				value: json!("Bonjour"),
			}
		);
		assert_eq!(
			t.resolution(&post(), "title", ["de", "en"]).unwrap(),
			Resolution::Default
		);
		assert_eq!(
			t.resolution(&post(), "title", "de").unwrap(),
			Resolution::Exhausted
		);
	}

	#[test]
	fn test_translate_whole_record_and_associations() {
		let registry = registry(Some("en"));
		let t = registry.translator();

		let mut source = post();
		source.comments = Association::Loaded(vec![
			Comment {
				text: "Nice".to_string(),
				translations: json!({"fr": {"text": "Sympa"}}),
			},
			Comment {
				text: "Meh".to_string(),
				translations: Value::Null,
			},
		]);
		source.category = Association::Loaded(Category {
			name: "News".to_string(),
			translations: json!({"es": null, "fr": {"name": "Nouvelles"}}),
		});
		source.author = Association::Loaded(Author {
			name: "Ana".to_string(),
		});

		let translated = t.translate(&source, ["fr", "es"]).unwrap();
		assert_eq!(translated.title, "Bonjour");
		assert_eq!(translated.body, "Cuerpo");

		let comments = translated.comments.loaded().unwrap();
		assert_eq!(comments[0].text, "Sympa");
		assert_eq!(comments[1].text, "Meh");
		assert_eq!(translated.category.loaded().unwrap().name, "Nouvelles");
		assert_eq!(translated.author, source.author);

		// The source record is not modified.
		assert_eq!(source.title, "Hello");
	}

	#[test]
	fn test_not_loaded_associations_pass_through() {
		let registry = registry(None);
		let translated = registry.translator().translate(&post(), "es").unwrap();
		assert_eq!(translated.comments, Association::NotLoaded);
		assert_eq!(translated.category, Association::NotLoaded);
	}

	proptest! {
		#[test]
		fn default_locale_is_identity(
			title in "[A-Za-z ]{0,12}",
			es in proptest::option::of("[a-z]{1,8}"),
		) {
			let registry = registry(Some("en"));
			let t = registry.translator();
			let mut record = post();
			record.title = title.clone();
			record.translations = json!({"en": {"title": "stored"}, "es": {"title": es}});

			prop_assert_eq!(t.translate_field(&record, "title", "en").unwrap(), json!(title));
			let whole = t.translate(&record, "en").unwrap();
			prop_assert_eq!(whole, record);
		}

		#[test]
		fn strict_and_lenient_agree_when_found(
			chain in prop::collection::vec(prop::sample::select(vec!["de", "fr", "es", "it"]), 0..5),
		) {
			let registry = registry(None);
			let t = registry.translator();
			let lenient = t.translate_field(&post(), "title", chain.clone()).unwrap();
			match t.translate_field_strict(&post(), "title", chain.clone()) {
				Ok(strict) => prop_assert_eq!(strict, lenient),
				Err(TransError::NoTranslation { .. }) => {
					prop_assert_eq!(lenient, json!("Hello"));
					prop_assert!(!chain.iter().any(|l| *l == "es" || *l == "fr"));
				}
				Err(other) => prop_assert!(false, "unexpected error: {}", other),
			}
		}

		#[test]
		fn first_translated_locale_wins(
			chain in prop::collection::vec(prop::sample::select(vec!["de", "fr", "es", "it"]), 1..5),
		) {
			let registry = registry(None);
			let t = registry.translator();
			let expected = chain
				.iter()
				.find_map(|l| match *l {
					"es" => Some(json!("Hola")),
					"fr" => Some(json!("Bonjour")),
					_ => None,
				})
				.unwrap_or(json!("Hello"));
			prop_assert_eq!(t.translate_field(&post(), "title", chain).unwrap(), expected);
		}
	}
}
