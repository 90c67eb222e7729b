// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The culture registry: interned identities, lazy registration, and the
//! extended-culture merge algorithm.
//!
//! Reads go through a lock-free [`arc_swap`] snapshot and never block.
//! Registration serializes behind one mutex, clones the snapshot, mutates
//! the clone, and publishes it atomically, so a reader either sees a
//! culture completely or not at all.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use tracing::{debug, warn};
use unic_langid::{langid, LanguageIdentifier};

use crate::culture::{Culture, CultureId, ExtendedCulture, NormalizedCulture, CODE_DEFAULT_NAME};
use crate::error::CultureError;
use crate::issues::{GlobalizationIssue, IssueReporter};
use crate::resolver::{parent_locale, Bcp47Resolver, LocaleResolver};

#[derive(Clone, Default)]
struct RegistrySnapshot {
	by_name: HashMap<String, Culture>,
	by_id: HashMap<CultureId, Culture>,
}

struct RegistryInner {
	snapshot: ArcSwap<RegistrySnapshot>,
	write_lock: Mutex<()>,
	resolver: Box<dyn LocaleResolver>,
	issues: IssueReporter,
	invariant: NormalizedCulture,
	code_default: NormalizedCulture,
}

/// Interning registry for culture identities.
///
/// Cheap to clone (shared inner); a fresh registry knows the invariant
/// culture (empty name, also reachable as "und") and the "en" code
/// default. Everything else registers lazily on first lookup.
#[derive(Clone)]
pub struct CultureRegistry {
	inner: Arc<RegistryInner>,
}

impl CultureRegistry {
	/// A registry using the default BCP-47 resolver.
	pub fn new(issues: IssueReporter) -> Self {
		Self::with_resolver(issues, Box::new(Bcp47Resolver))
	}

	/// A registry with a custom platform locale resolver.
	pub fn with_resolver(issues: IssueReporter, resolver: Box<dyn LocaleResolver>) -> Self {
		let invariant = NormalizedCulture::new(
			String::new(),
			CultureId(djb2("")),
			LanguageIdentifier::default(),
			Vec::new(),
			None,
			issues.clone(),
		);
		let code_default = NormalizedCulture::new(
			CODE_DEFAULT_NAME.to_string(),
			CultureId(djb2(CODE_DEFAULT_NAME)),
			langid!("en"),
			Vec::new(),
			None,
			issues.clone(),
		);
		let snapshot = Self::base_snapshot(&invariant, &code_default);
		Self {
			inner: Arc::new(RegistryInner {
				snapshot: ArcSwap::from_pointee(snapshot),
				write_lock: Mutex::new(()),
				resolver,
				issues,
				invariant,
				code_default,
			}),
		}
	}

	fn base_snapshot(
		invariant: &NormalizedCulture,
		code_default: &NormalizedCulture,
	) -> RegistrySnapshot {
		let mut snapshot = RegistrySnapshot::default();
		let invariant_entry = Culture::Normalized(invariant.clone());
		snapshot.by_name.insert(String::new(), invariant_entry.clone());
		snapshot
			.by_name
			.insert("und".to_string(), invariant_entry.clone());
		snapshot.by_id.insert(invariant.id(), invariant_entry);
		let default_entry = Culture::Normalized(code_default.clone());
		snapshot
			.by_name
			.insert(CODE_DEFAULT_NAME.to_string(), default_entry.clone());
		snapshot.by_id.insert(code_default.id(), default_entry);
		snapshot
	}

	/// The culture with the empty name.
	pub fn invariant(&self) -> &NormalizedCulture {
		&self.inner.invariant
	}

	/// The source-code default culture, "en".
	pub fn code_default(&self) -> &NormalizedCulture {
		&self.inner.code_default
	}

	pub(crate) fn issue_reporter(&self) -> &IssueReporter {
		&self.inner.issues
	}

	/// Number of registered identities.
	pub fn culture_count(&self) -> usize {
		self.inner.snapshot.load().by_id.len()
	}

	/// Lock-free exact lookup by any registered name or alias.
	pub fn lookup(&self, name: &str) -> Option<Culture> {
		self.inner.snapshot.load().by_name.get(name).cloned()
	}

	/// Lock-free lookup by numeric id.
	pub fn lookup_id(&self, id: CultureId) -> Option<Culture> {
		self.inner.snapshot.load().by_id.get(&id).cloned()
	}

	/// Returns the interned singleton for a single culture name,
	/// registering it (and its whole ancestor chain) on first sight.
	///
	/// Lookup tries the raw spelling, then the lowercased
	/// whitespace-stripped one. An exact hit on an extended identity
	/// yields its primary culture. Malformed tags propagate the
	/// resolver's [`CultureError::CultureNotFound`].
	pub fn ensure_normalized(&self, name: &str) -> Result<NormalizedCulture, CultureError> {
		if let Some(culture) = self.lookup(name) {
			return Ok(culture.primary().clone());
		}
		let normalized = normalize_name(name);
		if let Some(culture) = self.lookup(&normalized) {
			return Ok(culture.primary().clone());
		}
		let locale = self.inner.resolver.resolve(&normalized)?;

		let _guard = self.write_guard();
		if let Some(culture) = self.lookup(&normalized) {
			return Ok(culture.primary().clone());
		}
		let mut snapshot = (**self.inner.snapshot.load()).clone();
		let culture = self.register_locked(&mut snapshot, locale);
		if normalized != culture.name() {
			snapshot
				.by_name
				.entry(normalized)
				.or_insert_with(|| Culture::Normalized(culture.clone()));
		}
		self.inner.snapshot.store(Arc::new(snapshot));
		Ok(culture)
	}

	/// Returns the identity for a comma-separated preference list,
	/// registering it on first sight.
	///
	/// The list is resolved by the merge-and-reorder algorithm: most
	/// preferred first, every specialization immediately followed by its
	/// not-yet-represented generalizations, no culture repeated. A list
	/// that collapses to one culture's own chain returns that
	/// [`NormalizedCulture`]; an empty list yields the invariant culture.
	pub fn ensure_extended(&self, names: &str) -> Result<Culture, CultureError> {
		if let Some(culture) = self.lookup(names) {
			return Ok(culture);
		}
		let normalized = normalize_name(names);
		if let Some(culture) = self.lookup(&normalized) {
			return Ok(culture);
		}

		let mut inputs = Vec::new();
		for tag in normalized.split(',').filter(|t| !t.is_empty()) {
			let culture = self.ensure_normalized(tag)?;
			if !culture.is_invariant() {
				inputs.push(culture);
			}
		}
		if inputs.is_empty() {
			return Ok(Culture::Normalized(self.inner.invariant.clone()));
		}

		let resolved = merge_fallbacks(&inputs);
		let full_name = join_names(resolved.iter());
		let compact = compact_name(&resolved);

		let _guard = self.write_guard();
		if let Some(culture) = self.lookup(&full_name) {
			return Ok(culture);
		}
		let mut snapshot = (**self.inner.snapshot.load()).clone();
		let culture = if resolved[0].fallbacks() == &resolved[1..] {
			Culture::Normalized(resolved[0].clone())
		} else {
			let id = self.allocate_id(&snapshot, &full_name);
			let extended = ExtendedCulture::new(compact.clone(), full_name.clone(), id, resolved);
			debug!(culture = %extended.full_name(), id = %extended.id(), "registered extended culture");
			Culture::Extended(extended)
		};
		for key in [normalized, compact, full_name] {
			snapshot
				.by_name
				.entry(key)
				.or_insert_with(|| culture.clone());
		}
		if let Culture::Extended(extended) = &culture {
			snapshot.by_id.insert(extended.id(), culture.clone());
		}
		self.inner.snapshot.store(Arc::new(snapshot));
		Ok(culture)
	}

	/// Best-effort lookup for a preference list: exact hit first, then
	/// each candidate left to right with progressively shorter
	/// dash-truncated prefixes. Never registers anything; returns
	/// `fallback_default` when nothing matches.
	pub fn find_best(&self, names: &str, fallback_default: &Culture) -> Culture {
		if let Some(culture) = self.lookup(names) {
			return culture;
		}
		let normalized = normalize_name(names);
		if let Some(culture) = self.lookup(&normalized) {
			return culture;
		}
		for candidate in normalized.split(',').filter(|t| !t.is_empty()) {
			let mut current = candidate;
			loop {
				if let Some(culture) = self.lookup(current) {
					return culture;
				}
				match current.rfind('-') {
					Some(pos) if pos > 0 => current = &current[..pos],
					_ => break,
				}
			}
		}
		fallback_default.clone()
	}

	/// The culture of the current process locale, or the code default
	/// when the platform reports none or an unresolvable one.
	pub fn current(&self) -> Culture {
		let Some(tag) = sys_locale::get_locale() else {
			return Culture::Normalized(self.inner.code_default.clone());
		};
		match self.ensure_extended(&tag) {
			Ok(culture) => culture,
			Err(error) => {
				debug!(tag = %tag, error = %error, "process locale is not resolvable, using the code default");
				Culture::Normalized(self.inner.code_default.clone())
			}
		}
	}

	/// Drops every lazily registered identity, returning the registry to
	/// its freshly constructed state. Test-facing; the invariant and
	/// code-default singletons survive (with cleared translation tables).
	pub fn reset(&self) {
		let _guard = self.write_guard();
		self.inner
			.invariant
			.set_cached_translations(std::iter::empty::<(String, String)>());
		self.inner
			.code_default
			.set_cached_translations(std::iter::empty::<(String, String)>());
		self.inner.snapshot.store(Arc::new(Self::base_snapshot(
			&self.inner.invariant,
			&self.inner.code_default,
		)));
	}

	/// Registers `locale` and recursively its whole parent chain. Caller
	/// holds the write lock and publishes the snapshot afterwards.
	fn register_locked(
		&self,
		snapshot: &mut RegistrySnapshot,
		locale: LanguageIdentifier,
	) -> NormalizedCulture {
		let name = locale.to_string().to_lowercase();
		if let Some(Culture::Normalized(existing)) = snapshot.by_name.get(&name) {
			return existing.clone();
		}

		let fallbacks = match parent_locale(&locale) {
			Some(parent) => {
				let parent_culture = self.register_locked(snapshot, parent);
				if parent_culture.is_invariant() {
					Vec::new()
				} else {
					let mut chain = Vec::with_capacity(parent_culture.fallbacks().len() + 1);
					chain.push(parent_culture.clone());
					chain.extend_from_slice(parent_culture.fallbacks());
					chain
				}
			}
			None => Vec::new(),
		};

		let id = self.allocate_id(snapshot, &name);
		let neutral = fallbacks.last().cloned();
		let culture = NormalizedCulture::new(
			name.clone(),
			id,
			locale.clone(),
			fallbacks,
			neutral,
			self.inner.issues.clone(),
		);

		let entry = Culture::Normalized(culture.clone());
		snapshot.by_name.insert(name.clone(), entry.clone());
		let platform_name = locale.to_string();
		if platform_name != name {
			snapshot.by_name.insert(platform_name, entry.clone());
		}
		if !culture.fallbacks().is_empty() {
			let chain_name =
				join_names(std::iter::once(&culture).chain(culture.fallbacks().iter()));
			snapshot
				.by_name
				.entry(chain_name)
				.or_insert_with(|| entry.clone());
		}
		snapshot.by_id.insert(id, entry);
		debug!(culture = %culture.name(), id = %culture.id(), "registered normalized culture");
		culture
	}

	/// Allocates the id for `name`: its hash, linearly probed past any
	/// occupied ids. A probe is rare; when it happens the skipped
	/// occupants are reported as an identifier-clash issue.
	fn allocate_id(&self, snapshot: &RegistrySnapshot, name: &str) -> CultureId {
		let mut id = djb2(name);
		let mut clashes = Vec::new();
		while let Some(occupant) = snapshot.by_id.get(&CultureId(id)) {
			clashes.push(occupant.name().to_string());
			id = id.wrapping_add(1);
		}
		let id = CultureId(id);
		if !clashes.is_empty() {
			warn!(culture = %name, id = %id, occupants = ?clashes, "culture identifier clash");
			self.inner
				.issues
				.report(GlobalizationIssue::CultureIdentifierClash {
					name: name.to_string(),
					id,
					clashes,
				});
		}
		id
	}

	/// Registration can only publish complete snapshots, so a writer
	/// panic cannot leave inconsistent state behind a poisoned lock.
	fn write_guard(&self) -> MutexGuard<'_, ()> {
		match self.inner.write_lock.lock() {
			Ok(guard) => guard,
			Err(poisoned) => poisoned.into_inner(),
		}
	}
}

/// Lookup-normalization: lowercase, whitespace stripped.
fn normalize_name(name: &str) -> String {
	name.chars()
		.filter(|c| !c.is_whitespace())
		.flat_map(char::to_lowercase)
		.collect()
}

/// Djb2 (xor variant) over the UTF-8 bytes of the name.
pub(crate) fn djb2(name: &str) -> u32 {
	let mut hash: u32 = 5381;
	for byte in name.bytes() {
		hash = (hash << 5).wrapping_add(hash) ^ u32::from(byte);
	}
	hash
}

fn join_names<'a>(cultures: impl Iterator<Item = &'a NormalizedCulture>) -> String {
	let mut out = String::new();
	for culture in cultures {
		if !out.is_empty() {
			out.push(',');
		}
		out.push_str(culture.name());
	}
	out
}

/// The merge-and-reorder algorithm for preference lists.
///
/// Walks the requested cultures in order and keeps the output sorted so
/// that a culture always precedes its generalizations:
///   (a) an entry already present (or subsumed by a more specific entry)
///       is skipped;
///   (b) a culture generalized by an existing entry is inserted, with the
///       not-yet-represented prefix of its own chain, right before that
///       entry;
///   (c) anything else is appended with its full chain.
fn merge_fallbacks(inputs: &[NormalizedCulture]) -> Vec<NormalizedCulture> {
	let mut resolved: Vec<NormalizedCulture> = Vec::new();
	for culture in inputs {
		if resolved
			.iter()
			.any(|r| r == culture || r.fallbacks().contains(culture))
		{
			continue;
		}
		if let Some(pos) = resolved.iter().position(|r| culture.fallbacks().contains(r)) {
			let mut insertion = vec![culture.clone()];
			for fallback in culture.fallbacks() {
				if resolved.contains(fallback) {
					break;
				}
				insertion.push(fallback.clone());
			}
			resolved.splice(pos..pos, insertion);
		} else {
			resolved.push(culture.clone());
			for fallback in culture.fallbacks() {
				if !resolved.contains(fallback) {
					resolved.push(fallback.clone());
				}
			}
		}
	}
	resolved
}

/// Compacted display name: an entry directly preceded by one of its own
/// specializations is implied by it and omitted.
fn compact_name(resolved: &[NormalizedCulture]) -> String {
	let mut out = String::new();
	for (index, culture) in resolved.iter().enumerate() {
		if index > 0 && resolved[index - 1].fallbacks().contains(culture) {
			continue;
		}
		if !out.is_empty() {
			out.push(',');
		}
		out.push_str(culture.name());
	}
	out
}
