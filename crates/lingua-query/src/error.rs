// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use lingua_core::TransError;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
	#[error("attribute '{field}' of {type_name} is not translatable")]
	UntranslatableAttribute { type_name: String, field: String },

	#[error("no locale given for translated query on {type_name}")]
	MissingLocale { type_name: String },

	#[error(transparent)]
	Core(#[from] TransError),

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("cannot evaluate expression: {0}")]
	Evaluation(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
