// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale fallback planning.
//!
//! A plan is the ordered list of places to look for a translated value. The
//! in-memory translator walks it against a record and the query builder
//! unrolls it into `COALESCE` arguments, so both agree on ordering and on
//! where the default locale short-circuits.

use crate::locale::{Locale, LocaleChain};

/// One place to look for a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
	/// The record's own attribute value (the default locale).
	Own,
	/// The container entry for a locale.
	Container(Locale),
}

/// Build the fallback plan for `chain`.
///
/// Each chain locale becomes a container step except the default locale,
/// which becomes [`Step::Own`] and ends the plan. Repeated locales are only
/// looked up once. The plan is empty for an empty chain.
pub fn plan(chain: &LocaleChain, default_locale: Option<&Locale>) -> Vec<Step> {
	let mut steps: Vec<Step> = Vec::with_capacity(chain.len());

	for locale in chain {
		if Some(locale) == default_locale {
			steps.push(Step::Own);
			break;
		}
		let step = Step::Container(locale.clone());
		if !steps.contains(&step) {
			steps.push(step);
		}
	}

	steps
}

/// Whether the plan ends on the record's own value.
pub fn ends_with_own(steps: &[Step]) -> bool {
	matches!(steps.last(), Some(Step::Own))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn container(code: &str) -> Step {
		Step::Container(Locale::new(code))
	}

	#[test]
	fn test_no_default_keeps_every_locale() {
		let chain = LocaleChain::from(["de", "fr", "es"]);
		assert_eq!(
			plan(&chain, None),
			vec![container("de"), container("fr"), container("es")]
		);
	}

	#[test]
	fn test_default_short_circuits_at_its_position() {
		let chain = LocaleChain::from(["fr", "en", "es"]);
		let en = Locale::new("en");
		let steps = plan(&chain, Some(&en));
		assert_eq!(steps, vec![container("fr"), Step::Own]);
		assert!(ends_with_own(&steps));
	}

	#[test]
	fn test_default_first_is_own_only() {
		let en = Locale::new("en");
		assert_eq!(plan(&LocaleChain::from("en"), Some(&en)), vec![Step::Own]);
	}

	#[test]
	fn test_empty_chain_is_empty_plan() {
		assert!(plan(&LocaleChain::empty(), None).is_empty());
	}

	#[test]
	fn test_duplicates_collapse() {
		let chain = LocaleChain::from(["es", ":es", "fr", "es"]);
		assert_eq!(plan(&chain, None), vec![container("es"), container("fr")]);
	}

	proptest! {
		#[test]
		fn plan_never_longer_than_chain(codes in prop::collection::vec("[a-c]{1}", 0..6)) {
			let chain = LocaleChain::new(codes.iter().map(String::as_str));
			let default = Locale::new("b");
			let steps = plan(&chain, Some(&default));
			prop_assert!(steps.len() <= chain.len());
			prop_assert!(steps.iter().filter(|s| **s == Step::Own).count() <= 1);
			if steps.contains(&Step::Own) {
				prop_assert!(ends_with_own(&steps));
			}
		}
	}
}
