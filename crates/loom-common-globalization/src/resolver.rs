// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Platform locale resolution.
//!
//! The registry only understands culture *identity*; what counts as a valid
//! tag and what its ancestor chain looks like is delegated to a
//! [`LocaleResolver`]. The default resolver parses BCP-47 tags with
//! `unic-langid` and derives the single-inheritance parent chain by
//! dropping subtags: variants, then region, then script, down to the
//! language-only neutral culture (the `und` root is never part of a chain).

use unic_langid::LanguageIdentifier;

use crate::error::CultureError;

/// Resolves raw tags into canonical platform locales.
pub trait LocaleResolver: Send + Sync {
	/// Returns the canonical locale for a tag, or
	/// [`CultureError::CultureNotFound`] when the tag cannot denote a
	/// culture at all.
	fn resolve(&self, tag: &str) -> Result<LanguageIdentifier, CultureError>;
}

/// Default resolver: strict BCP-47 parsing via `unic-langid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bcp47Resolver;

impl LocaleResolver for Bcp47Resolver {
	fn resolve(&self, tag: &str) -> Result<LanguageIdentifier, CultureError> {
		tag.parse::<LanguageIdentifier>()
			.map_err(|error| CultureError::CultureNotFound {
				name: tag.to_string(),
				reason: error.to_string(),
			})
	}
}

/// The locale's parent, or `None` once only the language subtag remains.
pub(crate) fn parent_locale(locale: &LanguageIdentifier) -> Option<LanguageIdentifier> {
	let mut parent = locale.clone();
	if parent.variants().next().is_some() {
		parent.clear_variants();
		return Some(parent);
	}
	if parent.region.is_some() {
		parent.region = None;
		return Some(parent);
	}
	if parent.script.is_some() {
		parent.script = None;
		return Some(parent);
	}
	None
}
