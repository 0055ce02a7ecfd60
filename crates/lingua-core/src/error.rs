// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for translation metadata and resolution.

use thiserror::Error;

use crate::locale::LocaleChain;

/// Errors raised while registering schemas or translating records.
#[derive(Debug, Error)]
pub enum TransError {
	#[error("type {type_name} has no translation metadata")]
	NotRegistered { type_name: String },

	#[error("field '{field}' of {type_name} is not translatable")]
	NotTranslatable { type_name: String, field: String },

	#[error("no translation of field '{field}' for locales {locales}")]
	NoTranslation { field: String, locales: LocaleChain },

	#[error("{type_name} declares no translatable fields")]
	NoTranslatableFields { type_name: String },

	#[error("{type_name} declares translatable field '{field}' but has no such attribute")]
	UnknownField { type_name: String, field: String },

	#[error("type {type_name} is already registered")]
	AlreadyRegistered { type_name: String },

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for translation operations.
pub type Result<T> = std::result::Result<T, TransError>;
