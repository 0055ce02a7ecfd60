// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory evaluation of translation expressions.
//!
//! Follows PostgreSQL semantics for the operators the builder emits and
//! mirrors the resolver procedures, so predicates can be checked without a
//! database. SQL `NULL` and jsonb `null` are distinct here, as they are on
//! the server.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use lingua_config::ResolverConfig;
use serde_json::{Map, Value};

use crate::error::{QueryError, Result};
use crate::expr::{Direction, Expr, OrderBy};

/// A SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
	Null,
	Bool(bool),
	Text(String),
	TextArray(Vec<Option<String>>),
	Json(Value),
}

impl Datum {
	pub fn is_null(&self) -> bool {
		matches!(self, Datum::Null)
	}

	pub fn as_text(&self) -> Option<&str> {
		match self {
			Datum::Text(s) => Some(s),
			_ => None,
		}
	}

	/// `to_jsonb` of the value.
	fn to_json(&self) -> Value {
		match self {
			Datum::Null => Value::Null,
			Datum::Bool(b) => Value::Bool(*b),
			Datum::Text(s) => Value::String(s.clone()),
			Datum::TextArray(items) => Value::Array(
				items
					.iter()
					.map(|i| i.clone().map(Value::String).unwrap_or(Value::Null))
					.collect(),
			),
			Datum::Json(v) => v.clone(),
		}
	}

	/// Text rendering used by `->>` and casts to text.
	fn to_text(&self) -> Option<String> {
		match self {
			Datum::Null => None,
			Datum::Bool(b) => Some(b.to_string()),
			Datum::Text(s) => Some(s.clone()),
			Datum::TextArray(_) => Some(self.to_json().to_string()),
			Datum::Json(v) => json_text(v),
		}
	}
}

impl From<&str> for Datum {
	fn from(value: &str) -> Self {
		Datum::Text(value.to_string())
	}
}

impl From<String> for Datum {
	fn from(value: String) -> Self {
		Datum::Text(value)
	}
}

impl From<bool> for Datum {
	fn from(value: bool) -> Self {
		Datum::Bool(value)
	}
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Datum::Null)
	}
}

/// `->>` conversion: strings unquoted, JSON `null` becomes SQL `NULL`.
fn json_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

/// One table row visible under an alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
	alias: String,
	columns: BTreeMap<String, Datum>,
}

impl Row {
	pub fn new(alias: &str) -> Self {
		Self {
			alias: alias.to_string(),
			columns: BTreeMap::new(),
		}
	}

	pub fn alias(&self) -> &str {
		&self.alias
	}

	pub fn column(mut self, name: &str, value: impl Into<Datum>) -> Self {
		self.columns.insert(name.to_string(), value.into());
		self
	}

	/// A `jsonb` column. JSON `null` is stored as jsonb `null`, not SQL `NULL`.
	pub fn json(self, name: &str, value: Value) -> Self {
		self.column(name, Datum::Json(value))
	}

	pub fn get(&self, name: &str) -> Option<&Datum> {
		self.columns.get(name)
	}

	fn to_json(&self) -> Value {
		Value::Object(
			self.columns
				.iter()
				.map(|(k, v)| (k.clone(), v.to_json()))
				.collect::<Map<String, Value>>(),
		)
	}
}

/// Evaluates [`Expr`] trees against in-memory rows.
#[derive(Debug, Clone)]
pub struct Engine {
	resolver: String,
}

impl Default for Engine {
	fn default() -> Self {
		Self::new(&ResolverConfig::default())
	}
}

impl Engine {
	pub fn new(resolver: &ResolverConfig) -> Self {
		Self {
			resolver: resolver.qualified_name(),
		}
	}

	/// Evaluate `expr` with `rows` in scope.
	pub fn eval(&self, expr: &Expr, rows: &[Row]) -> Result<Datum> {
		Ok(match expr {
			Expr::Column { table, name } => find_row(rows, table.as_deref())?
				.get(name)
				.cloned()
				.ok_or_else(|| QueryError::Evaluation(format!("unknown column {name}")))?,
			Expr::Row(alias) => Datum::Json(find_row(rows, Some(alias))?.to_json()),
			Expr::Text(value) => Datum::Text(value.clone()),
			Expr::TextArray(values) => {
				Datum::TextArray(values.iter().cloned().map(Some).collect())
			}
			Expr::Null(_) => Datum::Null,
			Expr::JsonNull => Datum::Json(Value::Null),
			Expr::Array(items) => Datum::TextArray(
				items
					.iter()
					.map(|item| self.eval(item, rows).map(|d| d.to_text()))
					.collect::<Result<Vec<_>>>()?,
			),
			Expr::JsonGet(lhs, key) => {
				let lhs = self.eval(lhs, rows)?;
				let key = self.eval(key, rows)?;
				json_get(&lhs, &key).map(Datum::Json).unwrap_or(Datum::Null)
			}
			Expr::JsonGetText(lhs, key) => {
				let lhs = self.eval(lhs, rows)?;
				let key = self.eval(key, rows)?;
				json_get(&lhs, &key)
					.and_then(|v| json_text(&v))
					.map(Datum::Text)
					.unwrap_or(Datum::Null)
			}
			Expr::NullIf(lhs, rhs) => {
				let lhs = self.eval(lhs, rows)?;
				let rhs = self.eval(rhs, rows)?;
				if !lhs.is_null() && lhs == rhs {
					Datum::Null
				} else {
					lhs
				}
			}
			Expr::Coalesce(items) => {
				for item in items {
					let value = self.eval(item, rows)?;
					if !value.is_null() {
						return Ok(value);
					}
				}
				Datum::Null
			}
			Expr::Call { function, args } => self.call(function, args, rows)?,
			Expr::Cast(inner, _) => self.eval(inner, rows)?,
			Expr::As(inner, _) => self.eval(inner, rows)?,
			Expr::Eq(lhs, rhs) => self.compare(lhs, rhs, rows, |o| o == Ordering::Equal)?,
			Expr::NotEq(lhs, rhs) => self.compare(lhs, rhs, rows, |o| o != Ordering::Equal)?,
			Expr::Like(lhs, pattern) => self.like(lhs, pattern, rows, false)?,
			Expr::ILike(lhs, pattern) => self.like(lhs, pattern, rows, true)?,
			Expr::IsNull(inner) => Datum::Bool(self.eval(inner, rows)?.is_null()),
			Expr::IsNotNull(inner) => Datum::Bool(!self.eval(inner, rows)?.is_null()),
			Expr::And(items) => {
				let mut unknown = false;
				for item in items {
					match self.truth(item, rows)? {
						Some(false) => return Ok(Datum::Bool(false)),
						Some(true) => {}
						None => unknown = true,
					}
				}
				if unknown {
					Datum::Null
				} else {
					Datum::Bool(true)
				}
			}
			Expr::Or(items) => {
				let mut unknown = false;
				for item in items {
					match self.truth(item, rows)? {
						Some(true) => return Ok(Datum::Bool(true)),
						Some(false) => {}
						None => unknown = true,
					}
				}
				if unknown {
					Datum::Null
				} else {
					Datum::Bool(false)
				}
			}
			Expr::Not(inner) => match self.truth(inner, rows)? {
				Some(value) => Datum::Bool(!value),
				None => Datum::Null,
			},
		})
	}

	/// `WHERE` semantics: only a true predicate keeps the row.
	pub fn matches(&self, predicate: &Expr, rows: &[Row]) -> Result<bool> {
		Ok(self.truth(predicate, rows)? == Some(true))
	}

	/// Rows of one alias that satisfy `predicate`.
	pub fn filter<'a>(&self, rows: &'a [Row], predicate: &Expr) -> Result<Vec<&'a Row>> {
		let mut kept = Vec::new();
		for row in rows {
			if self.matches(predicate, std::slice::from_ref(row))? {
				kept.push(row);
			}
		}
		Ok(kept)
	}

	/// Sort rows of one alias. `NULL`s sort last ascending and first
	/// descending, text compares bytewise.
	pub fn sort(&self, rows: &mut [Row], order: &[OrderBy]) -> Result<()> {
		let mut keyed = Vec::with_capacity(rows.len());
		for row in rows.iter() {
			let keys = order
				.iter()
				.map(|term| self.eval(&term.expr, std::slice::from_ref(row)))
				.collect::<Result<Vec<_>>>()?;
			keyed.push((keys, row.clone()));
		}

		keyed.sort_by(|(a, _), (b, _)| {
			for (term, (x, y)) in order.iter().zip(a.iter().zip(b.iter())) {
				let ordering = match (x.is_null(), y.is_null()) {
					(true, true) => Ordering::Equal,
					(true, false) => Ordering::Greater,
					(false, true) => Ordering::Less,
					(false, false) => compare_values(x, y).unwrap_or(Ordering::Equal),
				};
				let ordering = match term.direction {
					Direction::Asc => ordering,
					Direction::Desc => ordering.reverse(),
				};
				if ordering != Ordering::Equal {
					return ordering;
				}
			}
			Ordering::Equal
		});

		for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
			*slot = row;
		}
		Ok(())
	}

	fn truth(&self, expr: &Expr, rows: &[Row]) -> Result<Option<bool>> {
		match self.eval(expr, rows)? {
			Datum::Bool(value) => Ok(Some(value)),
			Datum::Null => Ok(None),
			other => Err(QueryError::Evaluation(format!(
				"expected a boolean, got {other:?}"
			))),
		}
	}

	fn compare(
		&self,
		lhs: &Expr,
		rhs: &Expr,
		rows: &[Row],
		test: fn(Ordering) -> bool,
	) -> Result<Datum> {
		let lhs = self.eval(lhs, rows)?;
		let rhs = self.eval(rhs, rows)?;
		if lhs.is_null() || rhs.is_null() {
			return Ok(Datum::Null);
		}
		match compare_values(&lhs, &rhs) {
			Some(ordering) => Ok(Datum::Bool(test(ordering))),
			None => Err(QueryError::Evaluation(format!(
				"cannot compare {lhs:?} with {rhs:?}"
			))),
		}
	}

	fn like(&self, lhs: &Expr, pattern: &Expr, rows: &[Row], fold_case: bool) -> Result<Datum> {
		let value = self.eval(lhs, rows)?.to_text();
		let pattern = self.eval(pattern, rows)?.to_text();
		Ok(match (value, pattern) {
			(Some(value), Some(pattern)) if fold_case => Datum::Bool(like_match(
				&value.to_lowercase(),
				&pattern.to_lowercase(),
			)?),
			(Some(value), Some(pattern)) => Datum::Bool(like_match(&value, &pattern)?),
			_ => Datum::Null,
		})
	}

	fn call(&self, function: &str, args: &[Expr], rows: &[Row]) -> Result<Datum> {
		if function != self.resolver {
			return Err(QueryError::Evaluation(format!("unknown function {function}")));
		}

		let values = args
			.iter()
			.map(|arg| self.eval(arg, rows))
			.collect::<Result<Vec<_>>>()?;

		match values.as_slice() {
			[row, container, field, default_locale, locales] => Ok(resolve_field(
				&row.to_json(),
				&container.to_text().unwrap_or_default(),
				&field.to_text().unwrap_or_default(),
				default_locale.to_text().as_deref(),
				&array_items(locales),
			)
			.map(Datum::Text)
			.unwrap_or(Datum::Null)),
			[row, container, default_locale, locales] => Ok(resolve_submap(
				&row.to_json(),
				&container.to_text().unwrap_or_default(),
				default_locale.to_text().as_deref(),
				&array_items(locales),
			)
			.map(Datum::Json)
			.unwrap_or(Datum::Null)),
			_ => Err(QueryError::Evaluation(format!(
				"{function} takes 4 or 5 arguments, got {}",
				values.len()
			))),
		}
	}
}

fn find_row<'a>(rows: &'a [Row], alias: Option<&str>) -> Result<&'a Row> {
	let found = match alias {
		Some(alias) => rows.iter().find(|r| r.alias == alias),
		None if rows.len() == 1 => rows.first(),
		None => None,
	};
	found.ok_or_else(|| {
		QueryError::Evaluation(format!("no row for alias {}", alias.unwrap_or("<none>")))
	})
}

/// `lhs -> key` for jsonb objects. `None` is SQL `NULL`.
fn json_get(lhs: &Datum, key: &Datum) -> Option<Value> {
	let Datum::Json(Value::Object(map)) = lhs else {
		return None;
	};
	map.get(key.to_text()?.as_str()).cloned()
}

fn array_items(value: &Datum) -> Vec<Option<String>> {
	match value {
		Datum::TextArray(items) => items.clone(),
		_ => Vec::new(),
	}
}

fn compare_values(lhs: &Datum, rhs: &Datum) -> Option<Ordering> {
	match (lhs, rhs) {
		(Datum::Text(a), Datum::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
		(Datum::Bool(a), Datum::Bool(b)) => Some(a.cmp(b)),
		(Datum::Json(a), Datum::Json(b)) if a == b => Some(Ordering::Equal),
		(Datum::Json(a), Datum::Json(b)) => Some(a.to_string().cmp(&b.to_string())),
		_ => None,
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
	AnyRun,
	AnyChar,
	Literal(char),
}

fn like_tokens(pattern: &str) -> Result<Vec<LikeToken>> {
	let mut tokens = Vec::new();
	let mut chars = pattern.chars();
	while let Some(c) = chars.next() {
		tokens.push(match c {
			'%' => LikeToken::AnyRun,
			'_' => LikeToken::AnyChar,
			'\\' => match chars.next() {
				Some(escaped) => LikeToken::Literal(escaped),
				None => {
					return Err(QueryError::Evaluation(
						"LIKE pattern must not end with escape character".to_string(),
					))
				}
			},
			c => LikeToken::Literal(c),
		});
	}
	Ok(tokens)
}

/// SQL `LIKE` with `%`, `_` and backslash escapes.
///
/// Runs in `O(value * pattern)`. A pattern ending in a lone backslash is an
/// error, as it is in PostgreSQL.
pub fn like_match(value: &str, pattern: &str) -> Result<bool> {
	let tokens = like_tokens(pattern)?;
	// reachable[j]: the first j tokens match the value consumed so far
	let mut reachable = vec![false; tokens.len() + 1];
	reachable[0] = true;
	close_any_runs(&tokens, &mut reachable);

	for c in value.chars() {
		let mut next = vec![false; tokens.len() + 1];
		for (j, token) in tokens.iter().enumerate() {
			if !reachable[j] {
				continue;
			}
			match token {
				LikeToken::AnyRun => next[j] = true,
				LikeToken::AnyChar => next[j + 1] = true,
				LikeToken::Literal(expected) if *expected == c => next[j + 1] = true,
				LikeToken::Literal(_) => {}
			}
		}
		close_any_runs(&tokens, &mut next);
		if !next.contains(&true) {
			return Ok(false);
		}
		reachable = next;
	}

	Ok(reachable[tokens.len()])
}

/// `%` also matches the empty string.
fn close_any_runs(tokens: &[LikeToken], reachable: &mut [bool]) {
	for (j, token) in tokens.iter().enumerate() {
		if reachable[j] && *token == LikeToken::AnyRun {
			reachable[j + 1] = true;
		}
	}
}

/// Mirror of the field resolver procedure.
pub fn resolve_field(
	row: &Value,
	container: &str,
	field: &str,
	default_locale: Option<&str>,
	locales: &[Option<String>],
) -> Option<String> {
	let own = || row.get(field).and_then(json_text);
	for candidate in locales {
		let Some(candidate) = candidate.as_deref() else {
			continue;
		};
		if Some(candidate) == default_locale {
			return own();
		}
		let translated = row
			.get(container)
			.and_then(|c| c.get(candidate))
			.and_then(|submap| submap.as_object())
			.and_then(|submap| submap.get(field))
			.and_then(json_text);
		if translated.is_some() {
			return translated;
		}
	}
	own()
}

/// Mirror of the submap resolver procedure.
pub fn resolve_submap(
	row: &Value,
	container: &str,
	_default_locale: Option<&str>,
	locales: &[Option<String>],
) -> Option<Value> {
	let translations = row.get(container)?.as_object()?;
	locales
		.iter()
		.flatten()
		.filter_map(|candidate| translations.get(candidate.as_str()))
		.find(|submap| !submap.is_null())
		.cloned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::expr::{and, or};
	use serde_json::json;

	fn engine() -> Engine {
		Engine::new(&ResolverConfig::default())
	}

	fn post() -> Row {
		Row::new("p")
			.column("title", "T-en")
			.json("translations", json!({"es": {"title": "T-es"}, "fr": null}))
	}

	#[test]
	fn test_json_operators_follow_postgres() {
		let e = engine();
		let rows = [post()];
		let fr = Expr::column("p", "translations").json_get(Expr::text("fr"));
		assert_eq!(e.eval(&fr, &rows).unwrap(), Datum::Json(Value::Null));
		assert_eq!(
			e.eval(&fr.clone().null_if(Expr::JsonNull), &rows).unwrap(),
			Datum::Null
		);
		assert_eq!(
			e.eval(&fr.json_get_text(Expr::text("title")), &rows).unwrap(),
			Datum::Null
		);
		let de = Expr::column("p", "translations").json_get(Expr::text("de"));
		assert_eq!(e.eval(&de, &rows).unwrap(), Datum::Null);
	}

	#[test]
	fn test_three_valued_logic() {
		let e = engine();
		let rows = [post()];
		let unknown = Expr::column("p", "title").equals(Expr::Null(crate::expr::SqlType::Text));
		let yes = Expr::column("p", "title").equals(Expr::text("T-en"));
		let no = Expr::column("p", "title").equals(Expr::text("x"));

		assert_eq!(e.eval(&unknown, &rows).unwrap(), Datum::Null);
		assert!(!e.matches(&unknown, &rows).unwrap());
		assert!(!e.matches(&unknown.clone().not(), &rows).unwrap());
		assert!(e.matches(&or([unknown.clone(), yes.clone()]), &rows).unwrap());
		assert!(!e.matches(&and([unknown, yes]), &rows).unwrap());
		assert!(e.matches(&no.not(), &rows).unwrap());
		assert!(e.matches(&and([]), &rows).unwrap());
	}

	#[test]
	fn test_like_patterns() {
		assert!(like_match("Hola mundo", "%mundo").unwrap());
		assert!(like_match("Hola", "H_la").unwrap());
		assert!(!like_match("Hola", "h%").unwrap());
		assert!(like_match("100%", "100\\%").unwrap());
		assert!(!like_match("1000", "100\\%").unwrap());
		assert!(like_match("a_b", "a\\_b").unwrap());
		assert!(!like_match("axb", "a\\_b").unwrap());
		assert!(like_match("", "%%").unwrap());
		assert!(!like_match("", "_").unwrap());
		assert!(like_match("a\\b", "a\\\\b").unwrap());

		let e = engine();
		let rows = [post()];
		let ilike = Expr::column("p", "title").ilike(Expr::text("t-%"));
		assert!(e.matches(&ilike, &rows).unwrap());
	}

	#[test]
	fn test_like_many_wildcards_stays_linear() {
		let value = "a".repeat(400);
		let started = std::time::Instant::now();
		assert!(!like_match(&value, "%a%a%a%a%a%a%a%a%b").unwrap());
		assert!(like_match(&value, "%a%a%a%a%a%a%a%a%").unwrap());
		assert!(started.elapsed() < std::time::Duration::from_secs(1));
	}

	#[test]
	fn test_like_trailing_escape_is_an_error() {
		let err = like_match("\\", "\\").unwrap_err();
		assert!(matches!(err, QueryError::Evaluation(_)));

		let e = engine();
		let rows = [post()];
		let like = Expr::column("p", "title").like(Expr::text("T-\\"));
		assert!(matches!(e.matches(&like, &rows), Err(QueryError::Evaluation(_))));
	}

	#[test]
	fn test_field_resolver_mirror() {
		let row = json!({"title": "T-en", "translations": {"es": {"title": "T-es"}, "fr": null}});
		let chain = |items: &[&str]| items.iter().map(|s| Some(s.to_string())).collect::<Vec<_>>();

		assert_eq!(
			resolve_field(&row, "translations", "title", Some("en"), &chain(&["de", "fr", "es"])),
			Some("T-es".to_string())
		);
		assert_eq!(
			resolve_field(&row, "translations", "title", Some("en"), &chain(&["fr", "en", "es"])),
			Some("T-en".to_string())
		);
		assert_eq!(
			resolve_field(&row, "translations", "title", None, &[None]),
			Some("T-en".to_string())
		);
	}

	#[test]
	fn test_submap_resolver_ignores_default_locale() {
		let row = json!({"translations": {"en": {"title": "stored"}, "fr": null}});
		let locales = vec![Some("fr".to_string()), Some("en".to_string())];
		assert_eq!(
			resolve_submap(&row, "translations", Some("en"), &locales),
			Some(json!({"title": "stored"}))
		);
		assert_eq!(resolve_submap(&row, "translations", Some("en"), &[]), None);
	}

	#[test]
	fn test_filter_and_sort() {
		let e = engine();
		let mut rows = vec![
			Row::new("p").column("title", "b"),
			Row::new("p").column("title", Option::<String>::None),
			Row::new("p").column("title", "a"),
		];
		let kept = e
			.filter(&rows, &Expr::column("p", "title").is_not_null())
			.unwrap();
		assert_eq!(kept.len(), 2);

		e.sort(&mut rows, &[Expr::column("p", "title").asc()]).unwrap();
		let titles: Vec<_> = rows
			.iter()
			.map(|r| r.get("title").and_then(Datum::as_text).map(str::to_string))
			.collect();
		assert_eq!(titles, vec![Some("a".into()), Some("b".into()), None]);

		e.sort(&mut rows, &[Expr::column("p", "title").desc()]).unwrap();
		assert!(rows[0].get("title").unwrap().is_null());
	}

	#[test]
	fn test_unknown_function_is_an_error() {
		let e = engine();
		let err = e
			.eval(&Expr::call("lower", vec![Expr::text("A")]), &[post()])
			.unwrap_err();
		assert!(matches!(err, QueryError::Evaluation(_)));
	}
}
