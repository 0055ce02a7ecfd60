// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query-side translation for Lingua.
//!
//! Builds expressions that resolve embedded translations inside PostgreSQL,
//! so filtering and sorting on translated attributes happen in the database.
//!
//! - [`translated`] / [`translated_as`]: translated value of a field or the
//!   whole per-locale submap
//! - [`Translations`]: helpers scoped to one type and table alias
//! - [`render`]: PostgreSQL rendering through `sqlx::QueryBuilder`
//! - [`procedures`]: the server-side resolvers used for runtime locales
//! - [`memory`]: an in-memory evaluator for tests
//!
//! # Example
//!
//! ```ignore
//! let posts = Translations::for_type::<Post>(&registry, "p")?.locale(["es", "fr"]);
//!
//! let mut query = QueryBuilder::<Postgres>::new("SELECT p.id, ");
//! render::push_expr(&mut query, &posts.translated_as("title")?);
//! query.push(" FROM posts p WHERE ");
//! render::push_expr(&mut query, &posts.field_icontains("title", "hola")?);
//! ```

pub mod builder;
pub mod error;
pub mod expr;
pub mod memory;
pub mod procedures;
pub mod render;
pub mod scope;

pub use builder::{translated, translated_as, translated_as_with, translated_with, Target};
pub use error::{QueryError, Result};
pub use expr::{and, escape_like, not, or, Direction, Expr, LocaleArg, OrderBy, SqlType};
pub use procedures::{install_resolvers, uninstall_resolvers};
pub use scope::Translations;
