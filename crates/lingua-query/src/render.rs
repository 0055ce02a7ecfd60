// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! PostgreSQL rendering of expression trees.
//!
//! Identifiers are double-quoted, text values are always bind parameters.

use sqlx::{Postgres, QueryBuilder};

use crate::expr::{Direction, Expr, OrderBy};

/// Quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
	format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified name (`schema.name`).
pub fn quote_qualified(name: &str) -> String {
	name.split('.').map(quote_ident).collect::<Vec<_>>().join(".")
}

/// Append `expr` to `builder`.
pub fn push_expr(builder: &mut QueryBuilder<'_, Postgres>, expr: &Expr) {
	match expr {
		Expr::Column { table, name } => {
			if let Some(table) = table {
				builder.push(quote_ident(table));
				builder.push(".");
			}
			builder.push(quote_ident(name));
		}
		Expr::Row(alias) => {
			builder.push(quote_ident(alias));
		}
		Expr::Text(value) => {
			builder.push_bind(value.clone());
		}
		Expr::TextArray(values) => {
			builder.push_bind(values.clone());
		}
		Expr::Null(ty) => {
			builder.push("NULL::");
			builder.push(ty.as_sql());
		}
		Expr::JsonNull => {
			builder.push("'null'::jsonb");
		}
		Expr::Array(items) => {
			builder.push("ARRAY[");
			push_list(builder, items);
			builder.push("]");
		}
		Expr::JsonGet(lhs, key) => push_binary(builder, lhs, " -> ", key),
		Expr::JsonGetText(lhs, key) => push_binary(builder, lhs, " ->> ", key),
		Expr::NullIf(lhs, rhs) => {
			builder.push("NULLIF(");
			push_expr(builder, lhs);
			builder.push(", ");
			push_expr(builder, rhs);
			builder.push(")");
		}
		Expr::Coalesce(items) => {
			builder.push("COALESCE(");
			push_list(builder, items);
			builder.push(")");
		}
		Expr::Call { function, args } => {
			builder.push(quote_qualified(function));
			builder.push("(");
			push_list(builder, args);
			builder.push(")");
		}
		Expr::Cast(inner, ty) => {
			builder.push("CAST(");
			push_expr(builder, inner);
			builder.push(" AS ");
			builder.push(ty.as_sql());
			builder.push(")");
		}
		Expr::As(inner, label) => {
			push_expr(builder, inner);
			builder.push(" AS ");
			builder.push(quote_ident(label));
		}
		Expr::Eq(lhs, rhs) => push_binary(builder, lhs, " = ", rhs),
		Expr::NotEq(lhs, rhs) => push_binary(builder, lhs, " <> ", rhs),
		Expr::Like(lhs, rhs) => push_binary(builder, lhs, " LIKE ", rhs),
		Expr::ILike(lhs, rhs) => push_binary(builder, lhs, " ILIKE ", rhs),
		Expr::IsNull(inner) => {
			builder.push("(");
			push_expr(builder, inner);
			builder.push(" IS NULL)");
		}
		Expr::IsNotNull(inner) => {
			builder.push("(");
			push_expr(builder, inner);
			builder.push(" IS NOT NULL)");
		}
		Expr::And(items) => push_junction(builder, items, " AND ", "TRUE"),
		Expr::Or(items) => push_junction(builder, items, " OR ", "FALSE"),
		Expr::Not(inner) => {
			builder.push("(NOT ");
			push_expr(builder, inner);
			builder.push(")");
		}
	}
}

/// Append a comma-separated `ORDER BY` list (without the keyword).
pub fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, terms: &[OrderBy]) {
	for (i, term) in terms.iter().enumerate() {
		if i > 0 {
			builder.push(", ");
		}
		push_expr(builder, term.expr.unlabeled());
		builder.push(match term.direction {
			Direction::Asc => " ASC",
			Direction::Desc => " DESC",
		});
	}
}

/// Render `expr` on its own, mostly for logging and tests.
pub fn to_sql(expr: &Expr) -> String {
	let mut builder = QueryBuilder::<Postgres>::new("");
	push_expr(&mut builder, expr);
	builder.sql().to_string()
}

fn push_binary(builder: &mut QueryBuilder<'_, Postgres>, lhs: &Expr, op: &str, rhs: &Expr) {
	builder.push("(");
	push_expr(builder, lhs);
	builder.push(op);
	push_expr(builder, rhs);
	builder.push(")");
}

fn push_list(builder: &mut QueryBuilder<'_, Postgres>, items: &[Expr]) {
	for (i, item) in items.iter().enumerate() {
		if i > 0 {
			builder.push(", ");
		}
		push_expr(builder, item);
	}
}

fn push_junction(builder: &mut QueryBuilder<'_, Postgres>, items: &[Expr], op: &str, empty: &str) {
	if items.is_empty() {
		builder.push(empty);
		return;
	}
	builder.push("(");
	for (i, item) in items.iter().enumerate() {
		if i > 0 {
			builder.push(op);
		}
		push_expr(builder, item);
	}
	builder.push(")");
}
