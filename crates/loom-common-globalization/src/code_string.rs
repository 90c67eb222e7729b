// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The untranslated source-of-truth message: a captured [`FormattedString`]
//! bound to the resource name translations are filed under.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::culture::Culture;
use crate::formatted_string::{resource_name_from_hash, FormattedString};

/// A captured message plus its resource name.
///
/// The resource name is either supplied explicitly or derived from the
/// message shape (`"SHA."`-prefixed hash), so two messages with the same
/// shape but different placeholder contents share one name. Equality and
/// hashing follow the shape hash, not the rendered text.
#[derive(Debug, Clone)]
pub struct CodeString {
	formatted: FormattedString,
	resource_name: String,
	content_hash: [u8; 20],
}

impl CodeString {
	/// Wraps a message under its shape-derived resource name.
	pub fn new(formatted: FormattedString) -> Self {
		let content_hash = formatted.content_hash();
		Self {
			resource_name: resource_name_from_hash(&content_hash),
			formatted,
			content_hash,
		}
	}

	/// Wraps a message under an explicit resource name.
	pub fn with_resource_name(formatted: FormattedString, resource_name: impl Into<String>) -> Self {
		Self {
			content_hash: formatted.content_hash(),
			resource_name: resource_name.into(),
			formatted,
		}
	}

	/// A placeholder-free message under its shape-derived name.
	pub fn plain(culture: Culture, text: impl Into<String>) -> Self {
		Self::new(FormattedString::plain(culture, text))
	}

	pub fn formatted(&self) -> &FormattedString {
		&self.formatted
	}

	/// The rendered source text.
	pub fn text(&self) -> &str {
		self.formatted.text()
	}

	/// The culture this message targets (the one it was rendered with).
	pub fn culture(&self) -> &Culture {
		self.formatted.culture()
	}

	pub fn resource_name(&self) -> &str {
		&self.resource_name
	}

	/// The 20-byte shape hash, the deduplication identity.
	pub fn content_hash(&self) -> &[u8; 20] {
		&self.content_hash
	}

	/// True for the empty message; empty messages are not translatable.
	pub fn is_empty(&self) -> bool {
		self.formatted.is_empty()
	}
}

impl PartialEq for CodeString {
	fn eq(&self, other: &Self) -> bool {
		self.content_hash == other.content_hash
	}
}

impl Eq for CodeString {}

impl Hash for CodeString {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.content_hash.hash(state);
	}
}

impl fmt::Display for CodeString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.text())
	}
}
