// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Culture identities: normalized (single canonical locale) and extended
//! (ordered multi-culture preference list).
//!
//! Identities are interned by the registry and compared by their stable
//! numeric id; the registry guarantees one allocation per name, so
//! [`NormalizedCulture::ptr_eq`] holds whenever ids are equal.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unic_langid::LanguageIdentifier;

use crate::composite_format::PositionalCompositeFormat;
use crate::issues::{GlobalizationIssue, IssueReporter};

/// Canonical name of the source-code default culture.
pub(crate) const CODE_DEFAULT_NAME: &str = "en";

/// Stable 32-bit culture identifier, derived from the culture name hash
/// (collision-resolved at registration).
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CultureId(pub u32);

impl fmt::Display for CultureId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

struct NormalizedInner {
	name: String,
	id: CultureId,
	locale: LanguageIdentifier,
	/// Ancestors from most specific to most general; never contains the
	/// invariant culture or `self`.
	fallbacks: Vec<NormalizedCulture>,
	/// Most general non-invariant ancestor; `None` when `self` is its own
	/// neutral culture.
	neutral: Option<NormalizedCulture>,
	translations: ArcSwap<HashMap<String, PositionalCompositeFormat>>,
	issues: IssueReporter,
}

/// A single canonical culture ("fr-fr"), interned for the registry's
/// lifetime. Cloning shares the interned allocation.
#[derive(Clone)]
pub struct NormalizedCulture {
	inner: Arc<NormalizedInner>,
}

impl NormalizedCulture {
	pub(crate) fn new(
		name: String,
		id: CultureId,
		locale: LanguageIdentifier,
		fallbacks: Vec<NormalizedCulture>,
		neutral: Option<NormalizedCulture>,
		issues: IssueReporter,
	) -> Self {
		Self {
			inner: Arc::new(NormalizedInner {
				name,
				id,
				locale,
				fallbacks,
				neutral,
				translations: ArcSwap::from_pointee(HashMap::new()),
				issues,
			}),
		}
	}

	/// Lower-invariant canonical name; empty for the invariant culture.
	pub fn name(&self) -> &str {
		&self.inner.name
	}

	pub fn id(&self) -> CultureId {
		self.inner.id
	}

	/// The platform locale object behind this identity.
	pub fn locale(&self) -> &LanguageIdentifier {
		&self.inner.locale
	}

	/// Ancestors from most specific to most general, root excluded.
	pub fn fallbacks(&self) -> &[NormalizedCulture] {
		&self.inner.fallbacks
	}

	/// The most general non-invariant ancestor, or `self`.
	pub fn neutral(&self) -> &NormalizedCulture {
		self.inner.neutral.as_ref().unwrap_or(self)
	}

	pub fn is_invariant(&self) -> bool {
		self.inner.name.is_empty()
	}

	pub fn is_code_default(&self) -> bool {
		self.inner.name == CODE_DEFAULT_NAME
	}

	/// True when both handles share the interned allocation.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	/// Looks up a cached translation template for a resource name.
	pub fn cached_translation(&self, resource_name: &str) -> Option<PositionalCompositeFormat> {
		self.inner.translations.load().get(resource_name).cloned()
	}

	/// Replaces this culture's translation table in one atomic swap.
	///
	/// Entries whose template fails to parse are excluded and reported;
	/// duplicate resource names keep the first entry and report the rest.
	/// Returns the number of accepted entries. Readers see either the old
	/// table or the new one in full, never a mix.
	pub fn set_cached_translations<I>(&self, entries: I) -> usize
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut table = HashMap::new();
		for (resource_name, template) in entries {
			match PositionalCompositeFormat::parse(&template) {
				Ok(format) => {
					if table.contains_key(&resource_name) {
						self.inner
							.issues
							.report(GlobalizationIssue::TranslationDuplicateResource {
								culture: self.inner.name.clone(),
								resource_name,
								skipped: template,
							});
					} else {
						table.insert(resource_name, format);
					}
				}
				Err(error) => {
					self.inner
						.issues
						.report(GlobalizationIssue::TranslationFormatError {
							culture: self.inner.name.clone(),
							resource_name,
							format: template,
							error: error.to_string(),
						});
				}
			}
		}
		let accepted = table.len();
		self.inner.translations.store(Arc::new(table));
		debug!(culture = %self.inner.name, accepted, "translation table replaced");
		accepted
	}
}

impl PartialEq for NormalizedCulture {
	fn eq(&self, other: &Self) -> bool {
		self.inner.id == other.inner.id
	}
}

impl Eq for NormalizedCulture {}

impl Hash for NormalizedCulture {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.inner.id.hash(state);
	}
}

impl fmt::Debug for NormalizedCulture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "NormalizedCulture({:?} #{})", self.inner.name, self.inner.id)
	}
}

impl fmt::Display for NormalizedCulture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.inner.name)
	}
}

struct ExtendedInner {
	name: String,
	full_name: String,
	id: CultureId,
	/// The resolved preference list, primary first. Never empty, never
	/// contains the invariant culture or a duplicate.
	fallbacks: Vec<NormalizedCulture>,
}

/// An ordered multi-culture preference list ("fr-ch,fr-ca,de"), interned
/// like [`NormalizedCulture`]. A list that resolves to a single culture's
/// own chain is never allocated as an `ExtendedCulture`; the registry
/// returns the [`NormalizedCulture`] itself.
#[derive(Clone)]
pub struct ExtendedCulture {
	inner: Arc<ExtendedInner>,
}

impl ExtendedCulture {
	pub(crate) fn new(
		name: String,
		full_name: String,
		id: CultureId,
		fallbacks: Vec<NormalizedCulture>,
	) -> Self {
		Self {
			inner: Arc::new(ExtendedInner {
				name,
				full_name,
				id,
				fallbacks,
			}),
		}
	}

	/// Compacted display name: specializations subsume their directly
	/// trailing generalizations ("fr-fr,fr,en" reads "fr-fr,en").
	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Every resolved entry, comma-joined; the hash source for the id.
	pub fn full_name(&self) -> &str {
		&self.inner.full_name
	}

	pub fn id(&self) -> CultureId {
		self.inner.id
	}

	/// The most preferred culture of the list.
	pub fn primary(&self) -> &NormalizedCulture {
		&self.inner.fallbacks[0]
	}

	/// The full resolved preference list, primary first.
	pub fn fallbacks(&self) -> &[NormalizedCulture] {
		&self.inner.fallbacks
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl PartialEq for ExtendedCulture {
	fn eq(&self, other: &Self) -> bool {
		self.inner.id == other.inner.id
	}
}

impl Eq for ExtendedCulture {}

impl Hash for ExtendedCulture {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.inner.id.hash(state);
	}
}

impl fmt::Debug for ExtendedCulture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ExtendedCulture({:?} #{})", self.inner.name, self.inner.id)
	}
}

impl fmt::Display for ExtendedCulture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.inner.name)
	}
}

/// Either culture identity. Messages and translation targets carry this;
/// most call sites only care about [`primary`](Culture::primary) and the
/// [`lookup_order`](Culture::lookup_order) walk.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Culture {
	Normalized(NormalizedCulture),
	Extended(ExtendedCulture),
}

impl Culture {
	pub fn name(&self) -> &str {
		match self {
			Self::Normalized(c) => c.name(),
			Self::Extended(c) => c.name(),
		}
	}

	pub fn id(&self) -> CultureId {
		match self {
			Self::Normalized(c) => c.id(),
			Self::Extended(c) => c.id(),
		}
	}

	/// The culture translations are primarily resolved against.
	pub fn primary(&self) -> &NormalizedCulture {
		match self {
			Self::Normalized(c) => c,
			Self::Extended(c) => c.primary(),
		}
	}

	pub fn is_extended(&self) -> bool {
		matches!(self, Self::Extended(_))
	}

	pub fn as_normalized(&self) -> Option<&NormalizedCulture> {
		match self {
			Self::Normalized(c) => Some(c),
			Self::Extended(_) => None,
		}
	}

	/// Resolution walk: the primary culture first, then every remaining
	/// fallback from most preferred to most general.
	pub fn lookup_order(&self) -> impl Iterator<Item = &NormalizedCulture> {
		let (head, rest) = match self {
			Self::Normalized(c) => (c, c.fallbacks()),
			Self::Extended(c) => (c.primary(), &c.fallbacks()[1..]),
		};
		std::iter::once(head).chain(rest.iter())
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Normalized(a), Self::Normalized(b)) => a.ptr_eq(b),
			(Self::Extended(a), Self::Extended(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl From<NormalizedCulture> for Culture {
	fn from(culture: NormalizedCulture) -> Self {
		Self::Normalized(culture)
	}
}

impl From<ExtendedCulture> for Culture {
	fn from(culture: ExtendedCulture) -> Self {
		Self::Extended(culture)
	}
}

impl fmt::Debug for Culture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Normalized(c) => c.fmt(f),
			Self::Extended(c) => c.fmt(f),
		}
	}
}

impl fmt::Display for Culture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
