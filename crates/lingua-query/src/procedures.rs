// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side resolver procedures used by dynamic translated expressions.
//!
//! Two overloads share the configured name:
//!
//! - `(row, container, field, default_locale, locales[]) -> text` walks the
//!   chain, returns the row's own field at the default locale, otherwise the
//!   first non-null translation, otherwise the own field.
//! - `(row, container, default_locale, locales[]) -> jsonb` returns the first
//!   non-null per-locale submap, or `NULL`. It does not special-case the
//!   default locale.
//!
//! Both are `IMMUTABLE` so the planner may cache and inline them.

use lingua_config::ResolverConfig;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::render::{quote_ident, quote_qualified};

const FIELD_SIGNATURE: &str = "anyelement, varchar, varchar, varchar, varchar[]";
const SUBMAP_SIGNATURE: &str = "anyelement, varchar, varchar, varchar[]";

fn field_function(name: &str) -> String {
	format!(
		r#"CREATE OR REPLACE FUNCTION {name}(
	source_row anyelement,
	container varchar,
	field varchar,
	default_locale varchar,
	locales varchar[]
) RETURNS text
LANGUAGE plpgsql IMMUTABLE
AS $$
DECLARE
	row_data jsonb := to_jsonb(source_row);
	candidate varchar;
	translated text;
BEGIN
	FOREACH candidate IN ARRAY COALESCE(locales, ARRAY[]::varchar[]) LOOP
		IF candidate = default_locale THEN
			RETURN row_data ->> field;
		END IF;
		translated := row_data -> container -> candidate ->> field;
		IF translated IS NOT NULL THEN
			RETURN translated;
		END IF;
	END LOOP;
	RETURN row_data ->> field;
END;
$$"#
	)
}

fn submap_function(name: &str) -> String {
	format!(
		r#"CREATE OR REPLACE FUNCTION {name}(
	source_row anyelement,
	container varchar,
	default_locale varchar,
	locales varchar[]
) RETURNS jsonb
LANGUAGE plpgsql IMMUTABLE
AS $$
DECLARE
	translations jsonb := to_jsonb(source_row) -> container;
	candidate varchar;
	submap jsonb;
BEGIN
	FOREACH candidate IN ARRAY COALESCE(locales, ARRAY[]::varchar[]) LOOP
		submap := NULLIF(translations -> candidate, 'null'::jsonb);
		IF submap IS NOT NULL THEN
			RETURN submap;
		END IF;
	END LOOP;
	RETURN NULL;
END;
$$"#
	)
}

/// Statements creating both resolver overloads (and the schema, if set).
pub fn install_statements(config: &ResolverConfig) -> Vec<String> {
	let name = quote_qualified(&config.qualified_name());
	let mut statements = Vec::with_capacity(3);
	if let Some(schema) = &config.schema {
		statements.push(format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)));
	}
	statements.push(field_function(&name));
	statements.push(submap_function(&name));
	statements
}

/// Statements dropping both resolver overloads. The schema is left alone.
pub fn uninstall_statements(config: &ResolverConfig) -> Vec<String> {
	let name = quote_qualified(&config.qualified_name());
	vec![
		format!("DROP FUNCTION IF EXISTS {name}({FIELD_SIGNATURE})"),
		format!("DROP FUNCTION IF EXISTS {name}({SUBMAP_SIGNATURE})"),
	]
}

/// Install SQL as one script, for migration tooling.
pub fn install_sql(config: &ResolverConfig) -> String {
	join_script(install_statements(config))
}

/// Uninstall SQL as one script, for migration tooling.
pub fn uninstall_sql(config: &ResolverConfig) -> String {
	join_script(uninstall_statements(config))
}

fn join_script(statements: Vec<String>) -> String {
	let mut script = statements.join(";\n\n");
	script.push_str(";\n");
	script
}

/// Create or replace the resolver procedures in one transaction.
#[instrument(skip(pool, config), fields(function = %config.qualified_name()))]
pub async fn install_resolvers(pool: &PgPool, config: &ResolverConfig) -> Result<()> {
	run_in_transaction(pool, install_statements(config)).await?;
	info!("translation resolvers installed");
	Ok(())
}

/// Drop the resolver procedures in one transaction.
#[instrument(skip(pool, config), fields(function = %config.qualified_name()))]
pub async fn uninstall_resolvers(pool: &PgPool, config: &ResolverConfig) -> Result<()> {
	run_in_transaction(pool, uninstall_statements(config)).await?;
	info!("translation resolvers removed");
	Ok(())
}

async fn run_in_transaction(pool: &PgPool, statements: Vec<String>) -> Result<()> {
	let mut tx = pool.begin().await?;
	for statement in &statements {
		debug!(statement = %first_line(statement), "executing");
		sqlx::query(statement).execute(&mut *tx).await?;
	}
	tx.commit().await?;
	Ok(())
}

fn first_line(statement: &str) -> &str {
	statement.lines().next().unwrap_or_default()
}
