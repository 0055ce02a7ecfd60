// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Embedded translations for ORM records.
//!
//! Records carry a *translations container*: a JSON attribute keyed by locale
//! whose entries hold translated copies of selected attributes. This crate
//! provides:
//!
//! - [`Schema`] / [`Registry`]: per-type translation metadata
//! - [`lookup`] / [`field_lookup`]: container navigation for sparse and fixed
//!   layouts
//! - [`plan`]: the locale fallback plan shared with the query builder
//! - [`Translator`]: in-memory resolution with fallback to the record's own
//!   value
//!
//! # Example
//!
//! ```ignore
//! let schema = Schema::<Post>::builder("Post", |p| &p.translations)
//!     .accessor(accessor!(Post, title))
//!     .fields(["title"])
//!     .default_locale("en")
//!     .build()?;
//! let registry = Registry::new().with(schema)?;
//!
//! let title = registry.translator().translate_field(&post, "title", ["de", "es"])?;
//! ```

pub mod container;
pub mod error;
pub mod fallback;
pub mod locale;
pub mod registry;
pub mod schema;
pub mod translator;

pub use container::{field_lookup, lookup, ContainerShape, Lookup};
pub use error::{Result, TransError};
pub use fallback::{ends_with_own, plan, Step};
pub use locale::{normalize_key, Locale, LocaleChain};
pub use registry::Registry;
pub use schema::{
	Association, ContainerGetter, FieldAccessor, Getter, Schema, SchemaBuilder, Setter,
	TranslationMetadata,
};
pub use translator::{Resolution, Translator};

#[doc(hidden)]
pub mod __private {
	pub use serde_json;
}
