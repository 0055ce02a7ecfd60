// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-type translation schemas.
//!
//! A [`Schema`] is declared once per record type and describes which
//! attributes are translatable, where the translations container lives and
//! how associated records are reached. Attribute access goes through plain
//! function pointers, usually produced with [`accessor!`](crate::accessor).

use std::fmt;

use lingua_config::TranslationsConfig;
use serde::Serialize;
use serde_json::Value;

use crate::container::ContainerShape;
use crate::error::{Result, TransError};
use crate::locale::{normalize_key, Locale, LocaleChain};
use crate::translator::Translator;

/// Reads an attribute as JSON.
pub type Getter<R> = fn(&R) -> std::result::Result<Value, serde_json::Error>;

/// Writes a JSON value back into an attribute.
pub type Setter<R> = fn(&mut R, Value) -> std::result::Result<(), serde_json::Error>;

/// Reads a record's translations container.
pub type ContainerGetter<R> = fn(&R) -> &Value;

type Walk<R> =
	Box<dyn Fn(&mut R, &Translator<'_>, &LocaleChain) -> Result<()> + Send + Sync + 'static>;

/// Getter/setter pair for one attribute of `R`.
pub struct FieldAccessor<R> {
	name: String,
	get: Getter<R>,
	set: Setter<R>,
}

impl<R> FieldAccessor<R> {
	pub fn new(name: &str, get: Getter<R>, set: Setter<R>) -> Self {
		Self {
			name: normalize_key(name).to_string(),
			get,
			set,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn get(&self, record: &R) -> Result<Value> {
		Ok((self.get)(record)?)
	}

	pub fn set(&self, record: &mut R, value: Value) -> Result<()> {
		(self.set)(record, value)?;
		Ok(())
	}
}

impl<R> fmt::Debug for FieldAccessor<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldAccessor")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// Build a [`FieldAccessor`] for a struct field through serde.
///
/// ```ignore
/// let title = accessor!(Post, title);
/// ```
#[macro_export]
macro_rules! accessor {
	($ty:ty, $field:ident) => {
		$crate::FieldAccessor::<$ty>::new(
			stringify!($field),
			|record: &$ty| $crate::__private::serde_json::to_value(&record.$field),
			|record: &mut $ty, value: $crate::__private::serde_json::Value| {
				record.$field = $crate::__private::serde_json::from_value(value)?;
				Ok(())
			},
		)
	};
}

/// An association that may or may not have been loaded by the ORM.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Association<T> {
	#[default]
	NotLoaded,
	Loaded(T),
}

impl<T> Association<T> {
	pub fn is_loaded(&self) -> bool {
		matches!(self, Self::Loaded(_))
	}

	pub fn loaded(&self) -> Option<&T> {
		match self {
			Self::Loaded(value) => Some(value),
			Self::NotLoaded => None,
		}
	}

	pub fn loaded_mut(&mut self) -> Option<&mut T> {
		match self {
			Self::Loaded(value) => Some(value),
			Self::NotLoaded => None,
		}
	}
}

/// Immutable translation metadata of a registered type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationMetadata {
	type_name: String,
	fields: Vec<String>,
	container: String,
	default_locale: Option<Locale>,
	shape: ContainerShape,
}

impl TranslationMetadata {
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Translatable attribute names, in declaration order.
	pub fn fields(&self) -> &[String] {
		&self.fields
	}

	pub fn container(&self) -> &str {
		&self.container
	}

	pub fn default_locale(&self) -> Option<&Locale> {
		self.default_locale.as_ref()
	}

	pub fn shape(&self) -> &ContainerShape {
		&self.shape
	}

	pub fn is_translatable(&self, attribute: &str) -> bool {
		let attribute = normalize_key(attribute);
		self.fields.iter().any(|f| f == attribute)
	}
}

pub(crate) struct AssociationWalker<R> {
	pub(crate) name: String,
	pub(crate) walk: Walk<R>,
}

/// Registered translation schema of `R`.
pub struct Schema<R> {
	metadata: TranslationMetadata,
	accessors: Vec<FieldAccessor<R>>,
	container: ContainerGetter<R>,
	associations: Vec<AssociationWalker<R>>,
}

impl<R: 'static> Schema<R> {
	pub fn builder(type_name: &str, container: ContainerGetter<R>) -> SchemaBuilder<R> {
		SchemaBuilder {
			type_name: type_name.to_string(),
			container,
			accessors: Vec::new(),
			fields: Vec::new(),
			container_name: None,
			default_locale: None,
			shape: ContainerShape::default(),
			associations: Vec::new(),
		}
	}

	pub fn metadata(&self) -> &TranslationMetadata {
		&self.metadata
	}

	pub fn accessor(&self, attribute: &str) -> Option<&FieldAccessor<R>> {
		let attribute = normalize_key(attribute);
		self.accessors.iter().find(|a| a.name == attribute)
	}

	pub fn container_of<'a>(&self, record: &'a R) -> &'a Value {
		(self.container)(record)
	}

	/// Names of the declared associations.
	pub fn association_names(&self) -> impl Iterator<Item = &str> {
		self.associations.iter().map(|a| a.name.as_str())
	}

	pub(crate) fn associations(&self) -> &[AssociationWalker<R>] {
		&self.associations
	}
}

impl<R> fmt::Debug for Schema<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Schema")
			.field("metadata", &self.metadata)
			.field("accessors", &self.accessors)
			.field(
				"associations",
				&self.associations.iter().map(|a| &a.name).collect::<Vec<_>>(),
			)
			.finish()
	}
}

/// Builder for [`Schema`].
pub struct SchemaBuilder<R> {
	type_name: String,
	container: ContainerGetter<R>,
	accessors: Vec<FieldAccessor<R>>,
	fields: Vec<String>,
	container_name: Option<String>,
	default_locale: Option<Locale>,
	shape: ContainerShape,
	associations: Vec<AssociationWalker<R>>,
}

impl<R: 'static> SchemaBuilder<R> {
	/// Register an attribute accessor. Later accessors replace earlier ones
	/// with the same name.
	pub fn accessor(mut self, accessor: FieldAccessor<R>) -> Self {
		self.accessors.retain(|a| a.name != accessor.name);
		self.accessors.push(accessor);
		self
	}

	/// Declare the translatable attributes.
	pub fn fields<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for field in fields {
			let field = normalize_key(field.as_ref()).to_string();
			if !self.fields.contains(&field) {
				self.fields.push(field);
			}
		}
		self
	}

	pub fn container_name(mut self, name: &str) -> Self {
		self.container_name = Some(normalize_key(name).to_string());
		self
	}

	pub fn default_locale(mut self, locale: impl Into<Locale>) -> Self {
		self.default_locale = Some(locale.into());
		self
	}

	pub fn shape(mut self, shape: ContainerShape) -> Self {
		self.shape = shape;
		self
	}

	/// Declare a to-one association translated along with the record.
	pub fn has_one<C: 'static>(mut self, name: &str, get: fn(&mut R) -> Option<&mut C>) -> Self {
		let walk: Walk<R> = Box::new(
			move |record: &mut R, translator: &Translator<'_>, chain: &LocaleChain| match get(record) {
				Some(child) => translator.translate_in_place(child, chain),
				None => Ok(()),
			},
		);
		self.associations.push(AssociationWalker {
			name: name.to_string(),
			walk,
		});
		self
	}

	/// Declare a to-many association translated element-wise.
	pub fn has_many<C: 'static>(
		mut self,
		name: &str,
		get: fn(&mut R) -> Option<&mut Vec<C>>,
	) -> Self {
		let walk: Walk<R> = Box::new(
			move |record: &mut R, translator: &Translator<'_>, chain: &LocaleChain| {
				if let Some(children) = get(record) {
					for child in children.iter_mut() {
						translator.translate_in_place(child, chain)?;
					}
				}
				Ok(())
			},
		);
		self.associations.push(AssociationWalker {
			name: name.to_string(),
			walk,
		});
		self
	}

	/// Build with the built-in registration defaults.
	pub fn build(self) -> Result<Schema<R>> {
		self.build_with(&TranslationsConfig::default())
	}

	/// Build, filling unset options from `config`.
	pub fn build_with(self, config: &TranslationsConfig) -> Result<Schema<R>> {
		if self.fields.is_empty() {
			return Err(TransError::NoTranslatableFields {
				type_name: self.type_name,
			});
		}

		if let Some(missing) = self
			.fields
			.iter()
			.find(|f| !self.accessors.iter().any(|a| &a.name == *f))
		{
			return Err(TransError::UnknownField {
				type_name: self.type_name.clone(),
				field: missing.clone(),
			});
		}

		let container = self
			.container_name
			.unwrap_or_else(|| config.container.clone());
		let default_locale = self
			.default_locale
			.or_else(|| config.default_locale.as_deref().map(Locale::new));

		Ok(Schema {
			metadata: TranslationMetadata {
				type_name: self.type_name,
				fields: self.fields,
				container,
				default_locale,
				shape: self.shape,
			},
			accessors: self.accessors,
			container: self.container,
			associations: self.associations,
		})
	}
}
