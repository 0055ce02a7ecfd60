// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod resolver;
mod translations;

pub use resolver::{ResolverConfig, ResolverConfigLayer, DEFAULT_RESOLVER_FUNCTION};
pub use translations::{TranslationsConfig, TranslationsConfigLayer, DEFAULT_CONTAINER};
