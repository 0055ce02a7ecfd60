// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Registry of translatable types.
//!
//! Built once at startup and read-only afterwards, so it can be shared
//! behind an `Arc` without locking.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use tracing::debug;

use crate::container::ContainerShape;
use crate::error::{Result, TransError};
use crate::locale::Locale;
use crate::schema::{Schema, TranslationMetadata};
use crate::translator::Translator;

trait ErasedSchema: Send + Sync {
	fn metadata(&self) -> &TranslationMetadata;
	fn as_any(&self) -> &dyn Any;
}

impl<R: 'static> ErasedSchema for Schema<R> {
	fn metadata(&self) -> &TranslationMetadata {
		Schema::metadata(self)
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Translation metadata for every registered record type.
#[derive(Default)]
pub struct Registry {
	schemas: HashMap<TypeId, Box<dyn ErasedSchema>>,
	names: HashMap<String, TypeId>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register the schema of `R`. Each type and type name may be registered
	/// only once.
	pub fn register<R: 'static>(&mut self, schema: Schema<R>) -> Result<()> {
		let type_id = TypeId::of::<R>();
		let type_name = schema.metadata().type_name().to_string();

		if self.schemas.contains_key(&type_id) || self.names.contains_key(&type_name) {
			return Err(TransError::AlreadyRegistered { type_name });
		}

		debug!(
			type_name = %type_name,
			fields = ?schema.metadata().fields(),
			container = schema.metadata().container(),
			"registered translatable type"
		);

		self.names.insert(type_name, type_id);
		self.schemas.insert(type_id, Box::new(schema));
		Ok(())
	}

	/// Builder-style [`Registry::register`].
	pub fn with<R: 'static>(mut self, schema: Schema<R>) -> Result<Self> {
		self.register(schema)?;
		Ok(self)
	}

	pub fn len(&self) -> usize {
		self.schemas.len()
	}

	pub fn is_empty(&self) -> bool {
		self.schemas.is_empty()
	}

	pub fn contains<R: 'static>(&self) -> bool {
		self.schemas.contains_key(&TypeId::of::<R>())
	}

	pub fn schema<R: 'static>(&self) -> Option<&Schema<R>> {
		self.schemas
			.get(&TypeId::of::<R>())
			.and_then(|s| s.as_any().downcast_ref::<Schema<R>>())
	}

	pub(crate) fn require_schema<R: 'static>(&self) -> Result<&Schema<R>> {
		self.schema::<R>().ok_or_else(|| TransError::NotRegistered {
			type_name: std::any::type_name::<R>().to_string(),
		})
	}

	pub fn metadata<R: 'static>(&self) -> Result<&TranslationMetadata> {
		self.require_schema::<R>().map(Schema::metadata)
	}

	pub fn metadata_of<R: 'static>(&self, _record: &R) -> Result<&TranslationMetadata> {
		self.metadata::<R>()
	}

	/// Metadata by the name given at registration.
	pub fn metadata_by_name(&self, type_name: &str) -> Result<&TranslationMetadata> {
		self.names
			.get(type_name)
			.and_then(|id| self.schemas.get(id))
			.map(|s| s.metadata())
			.ok_or_else(|| TransError::NotRegistered {
				type_name: type_name.to_string(),
			})
	}

	pub fn is_translatable<R: 'static>(&self, attribute: &str) -> Result<bool> {
		Ok(self.metadata::<R>()?.is_translatable(attribute))
	}

	pub fn is_translatable_record<R: 'static>(&self, record: &R, attribute: &str) -> Result<bool> {
		Ok(self.metadata_of(record)?.is_translatable(attribute))
	}

	pub fn fields<R: 'static>(&self) -> Result<&[String]> {
		Ok(self.metadata::<R>()?.fields())
	}

	pub fn container<R: 'static>(&self) -> Result<&str> {
		Ok(self.metadata::<R>()?.container())
	}

	pub fn default_locale<R: 'static>(&self) -> Result<Option<&Locale>> {
		Ok(self.metadata::<R>()?.default_locale())
	}

	pub fn shape<R: 'static>(&self) -> Result<&ContainerShape> {
		Ok(self.metadata::<R>()?.shape())
	}

	pub fn translator(&self) -> Translator<'_> {
		Translator::new(self)
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut names: Vec<&str> = self.names.keys().map(String::as_str).collect();
		names.sort_unstable();
		f.debug_struct("Registry").field("types", &names).finish()
	}
}
