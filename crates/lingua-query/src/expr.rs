// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expression trees produced by the translation query builder.
//!
//! Trees are immutable values. They are turned into SQL by
//! [`render`](crate::render) and can be evaluated without a database by
//! [`memory`](crate::memory).

use lingua_core::{Locale, LocaleChain};

/// SQL types that appear in casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
	Varchar,
	VarcharArray,
	Text,
	Jsonb,
}

impl SqlType {
	pub fn as_sql(&self) -> &'static str {
		match self {
			SqlType::Varchar => "varchar",
			SqlType::VarcharArray => "varchar[]",
			SqlType::Text => "text",
			SqlType::Jsonb => "jsonb",
		}
	}
}

/// A SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	/// `"table"."name"`, or `"name"` without a table.
	Column { table: Option<String>, name: String },
	/// A whole row of a table alias, passed to resolver procedures.
	Row(String),
	/// Text bind parameter.
	Text(String),
	/// Text array bind parameter.
	TextArray(Vec<String>),
	/// Typed SQL `NULL`.
	Null(SqlType),
	/// The jsonb literal `'null'`.
	JsonNull,
	/// `ARRAY[...]`.
	Array(Vec<Expr>),
	/// `lhs -> key`
	JsonGet(Box<Expr>, Box<Expr>),
	/// `lhs ->> key`
	JsonGetText(Box<Expr>, Box<Expr>),
	NullIf(Box<Expr>, Box<Expr>),
	Coalesce(Vec<Expr>),
	/// Function call; `function` may be schema-qualified (`schema.name`).
	Call { function: String, args: Vec<Expr> },
	Cast(Box<Expr>, SqlType),
	/// `expr AS "label"`
	As(Box<Expr>, String),
	Eq(Box<Expr>, Box<Expr>),
	NotEq(Box<Expr>, Box<Expr>),
	Like(Box<Expr>, Box<Expr>),
	ILike(Box<Expr>, Box<Expr>),
	IsNull(Box<Expr>),
	IsNotNull(Box<Expr>),
	And(Vec<Expr>),
	Or(Vec<Expr>),
	Not(Box<Expr>),
}

impl Expr {
	pub fn column(table: &str, name: &str) -> Self {
		Expr::Column {
			table: Some(table.to_string()),
			name: name.to_string(),
		}
	}

	pub fn bare_column(name: &str) -> Self {
		Expr::Column {
			table: None,
			name: name.to_string(),
		}
	}

	pub fn text(value: impl Into<String>) -> Self {
		Expr::Text(value.into())
	}

	pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Self {
		Expr::Call {
			function: function.into(),
			args,
		}
	}

	pub fn json_get(self, key: Expr) -> Self {
		Expr::JsonGet(Box::new(self), Box::new(key))
	}

	pub fn json_get_text(self, key: Expr) -> Self {
		Expr::JsonGetText(Box::new(self), Box::new(key))
	}

	pub fn null_if(self, other: Expr) -> Self {
		Expr::NullIf(Box::new(self), Box::new(other))
	}

	pub fn cast(self, ty: SqlType) -> Self {
		Expr::Cast(Box::new(self), ty)
	}

	pub fn alias(self, label: impl Into<String>) -> Self {
		Expr::As(Box::new(self), label.into())
	}

	pub fn equals(self, other: Expr) -> Self {
		Expr::Eq(Box::new(self), Box::new(other))
	}

	pub fn not_equals(self, other: Expr) -> Self {
		Expr::NotEq(Box::new(self), Box::new(other))
	}

	pub fn like(self, pattern: Expr) -> Self {
		Expr::Like(Box::new(self), Box::new(pattern))
	}

	pub fn ilike(self, pattern: Expr) -> Self {
		Expr::ILike(Box::new(self), Box::new(pattern))
	}

	pub fn is_null(self) -> Self {
		Expr::IsNull(Box::new(self))
	}

	pub fn is_not_null(self) -> Self {
		Expr::IsNotNull(Box::new(self))
	}

	pub fn and(self, other: Expr) -> Self {
		match self {
			Expr::And(mut items) => {
				items.push(other);
				Expr::And(items)
			}
			this => Expr::And(vec![this, other]),
		}
	}

	pub fn or(self, other: Expr) -> Self {
		match self {
			Expr::Or(mut items) => {
				items.push(other);
				Expr::Or(items)
			}
			this => Expr::Or(vec![this, other]),
		}
	}

	#[allow(clippy::should_implement_trait)]
	pub fn not(self) -> Self {
		Expr::Not(Box::new(self))
	}

	pub fn asc(self) -> OrderBy {
		OrderBy {
			expr: self,
			direction: Direction::Asc,
		}
	}

	pub fn desc(self) -> OrderBy {
		OrderBy {
			expr: self,
			direction: Direction::Desc,
		}
	}

	/// Strip an `AS` label, if any.
	pub fn unlabeled(&self) -> &Expr {
		match self {
			Expr::As(inner, _) => inner.unlabeled(),
			other => other,
		}
	}
}

/// Conjunction of `items`. Empty input yields an always-true predicate.
pub fn and(items: impl IntoIterator<Item = Expr>) -> Expr {
	Expr::And(items.into_iter().collect())
}

/// Disjunction of `items`. Empty input yields an always-false predicate.
pub fn or(items: impl IntoIterator<Item = Expr>) -> Expr {
	Expr::Or(items.into_iter().collect())
}

pub fn not(item: Expr) -> Expr {
	item.not()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
	#[default]
	Asc,
	Desc,
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
	pub expr: Expr,
	pub direction: Direction,
}

/// Escape `%`, `_` and `\` so `raw` matches literally inside a LIKE pattern.
pub fn escape_like(raw: &str) -> String {
	let mut escaped = String::with_capacity(raw.len());
	for c in raw.chars() {
		if matches!(c, '%' | '_' | '\\') {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}

/// Locale argument of a translated expression.
///
/// Static arguments are known while the query is built and get unrolled.
/// Anything containing [`LocaleArg::Runtime`] is only known when the query
/// executes and is resolved by the server-side procedure instead.
#[derive(Debug, Clone, PartialEq)]
pub enum LocaleArg {
	Locale(Locale),
	List(Vec<LocaleArg>),
	/// A SQL expression yielding one locale.
	Runtime(Expr),
}

impl LocaleArg {
	pub fn runtime(expr: Expr) -> Self {
		LocaleArg::Runtime(expr)
	}

	pub fn is_static(&self) -> bool {
		match self {
			LocaleArg::Locale(_) => true,
			LocaleArg::List(items) => items.iter().all(LocaleArg::is_static),
			LocaleArg::Runtime(_) => false,
		}
	}

	pub fn is_dynamic(&self) -> bool {
		!self.is_static()
	}

	/// The flattened chain, when every element is static.
	pub fn static_chain(&self) -> Option<LocaleChain> {
		let mut locales = Vec::new();
		self.collect_static(&mut locales)?;
		Some(LocaleChain::from(locales))
	}

	fn collect_static(&self, out: &mut Vec<Locale>) -> Option<()> {
		match self {
			LocaleArg::Locale(locale) => out.push(locale.clone()),
			LocaleArg::List(items) => {
				for item in items {
					item.collect_static(out)?;
				}
			}
			LocaleArg::Runtime(_) => return None,
		}
		Some(())
	}

	/// Every element as a SQL expression, in chain order.
	pub(crate) fn elements(&self) -> Vec<Expr> {
		let mut out = Vec::new();
		self.collect_elements(&mut out);
		out
	}

	fn collect_elements(&self, out: &mut Vec<Expr>) {
		match self {
			LocaleArg::Locale(locale) => out.push(Expr::text(locale.as_str())),
			LocaleArg::List(items) => items.iter().for_each(|i| i.collect_elements(out)),
			LocaleArg::Runtime(expr) => out.push(expr.clone()),
		}
	}
}

impl From<Locale> for LocaleArg {
	fn from(locale: Locale) -> Self {
		LocaleArg::Locale(locale)
	}
}

impl From<&str> for LocaleArg {
	fn from(locale: &str) -> Self {
		LocaleArg::Locale(Locale::new(locale))
	}
}

impl From<String> for LocaleArg {
	fn from(locale: String) -> Self {
		LocaleArg::Locale(Locale::new(locale))
	}
}

impl From<LocaleChain> for LocaleArg {
	fn from(chain: LocaleChain) -> Self {
		LocaleArg::List(chain.iter().cloned().map(LocaleArg::Locale).collect())
	}
}

impl From<Vec<&str>> for LocaleArg {
	fn from(locales: Vec<&str>) -> Self {
		LocaleChain::from(locales).into()
	}
}

impl<const N: usize> From<[&str; N]> for LocaleArg {
	fn from(locales: [&str; N]) -> Self {
		LocaleChain::from(locales).into()
	}
}

impl From<Vec<LocaleArg>> for LocaleArg {
	fn from(items: Vec<LocaleArg>) -> Self {
		LocaleArg::List(items)
	}
}

impl From<Expr> for LocaleArg {
	fn from(expr: Expr) -> Self {
		LocaleArg::Runtime(expr)
	}
}
