// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Translation resolution: walk a target culture's fallback chain for the
//! best cached template, apply it, and classify how good the match was.
//!
//! Resolution never fails. When nothing matches, the caller gets the
//! original source text under the code-default culture and the miss is
//! reported through the issue channel.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::code_string::CodeString;
use crate::culture::{Culture, NormalizedCulture};
use crate::issues::{GlobalizationIssue, IssueReporter};
use crate::registry::CultureRegistry;

/// How well a resolved translation's culture matches the intended target.
///
/// Ordered worst to best, so `quality < Good` reads as "a better
/// translation is welcome".
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TranslationQuality {
	/// No relation between the format culture and the target.
	Awful,
	/// The format culture only appears among the unrelated entries of a
	/// multi-culture preference list.
	Bad,
	/// Same neutral language family as the target's primary culture.
	Good,
	/// Exactly the target's primary culture (or both sides are the
	/// default/invariant culture).
	Perfect,
}

impl fmt::Display for TranslationQuality {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Awful => "awful",
			Self::Bad => "bad",
			Self::Good => "good",
			Self::Perfect => "perfect",
		};
		f.write_str(label)
	}
}

/// A rendered, possibly translated string: the final text, the source
/// [`CodeString`], and the culture whose template actually produced the
/// text. Quality is derived, never stored.
#[derive(Debug, Clone)]
pub struct MCString {
	text: String,
	code: CodeString,
	format_culture: NormalizedCulture,
}

impl MCString {
	pub fn new(text: String, code: CodeString, format_culture: NormalizedCulture) -> Self {
		Self {
			text,
			code,
			format_culture,
		}
	}

	/// The final, user-facing text.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// The untranslated source message.
	pub fn code_string(&self) -> &CodeString {
		&self.code
	}

	/// The culture whose template produced [`text`](Self::text).
	pub fn format_culture(&self) -> &NormalizedCulture {
		&self.format_culture
	}

	/// Classifies the match between the target culture and the culture
	/// that actually formatted the text. Pure and synchronous.
	pub fn quality(&self) -> TranslationQuality {
		classify(self.code.culture(), &self.format_culture)
	}

	/// True when a better translation should be authored: the quality is
	/// below [`TranslationQuality::Good`] and the message is translatable.
	pub fn is_translation_welcome(&self) -> bool {
		self.quality() < TranslationQuality::Good && !self.code.is_empty()
	}
}

impl fmt::Display for MCString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

fn classify(target: &Culture, format_culture: &NormalizedCulture) -> TranslationQuality {
	let primary = target.primary();
	if format_culture == primary {
		return TranslationQuality::Perfect;
	}
	let default_like =
		|culture: &NormalizedCulture| culture.is_invariant() || culture.is_code_default();
	if default_like(format_culture) && default_like(primary) {
		return TranslationQuality::Perfect;
	}
	if format_culture.neutral() == primary.neutral() {
		return TranslationQuality::Good;
	}
	if let Culture::Extended(extended) = target {
		if extended.fallbacks().contains(format_culture) {
			return TranslationQuality::Bad;
		}
	}
	TranslationQuality::Awful
}

/// Resolves messages against the per-culture translation tables of a
/// [`CultureRegistry`]. Cheap to clone.
#[derive(Clone)]
pub struct TranslationService {
	registry: CultureRegistry,
	issues: IssueReporter,
}

impl TranslationService {
	pub fn new(registry: CultureRegistry) -> Self {
		let issues = registry.issue_reporter().clone();
		Self { registry, issues }
	}

	/// Translates a message for its own target culture.
	pub fn translate(&self, code: &CodeString) -> MCString {
		self.translate_to(code, code.culture())
	}

	/// Translates a message for an explicit target culture.
	///
	/// Walks the target's resolution order and applies the first cached
	/// template for the message's resource name. Templates whose argument
	/// count does not match the message are reported and skipped. With no
	/// hit at all, the original source text is returned under the
	/// code-default culture; the caller never sees an error.
	pub fn translate_to(&self, code: &CodeString, target: &Culture) -> MCString {
		let result = self
			.resolve(code, target)
			.unwrap_or_else(|| self.untranslated(code, target));
		if result.is_translation_welcome() {
			self.issues
				.report(GlobalizationIssue::MissingTranslationResource {
					culture: target.primary().name().to_string(),
					resource_name: code.resource_name().to_string(),
					format: code.formatted().format_string(),
				});
		}
		result
	}

	fn resolve(&self, code: &CodeString, target: &Culture) -> Option<MCString> {
		let resource_name = code.resource_name();
		let placeholder_count = code.formatted().placeholders().len();
		for culture in target.lookup_order() {
			let Some(format) = culture.cached_translation(resource_name) else {
				continue;
			};
			if format.expected_argument_count() != placeholder_count {
				self.issues
					.report(GlobalizationIssue::FormatArgumentCountMismatch {
						culture: culture.name().to_string(),
						resource_name: resource_name.to_string(),
						expected: placeholder_count,
						actual: format.expected_argument_count(),
					});
				continue;
			}
			let contents: Vec<&str> = code.formatted().placeholder_contents().collect();
			let text = format.format(&contents);
			return Some(MCString::new(text, code.clone(), culture.clone()));
		}
		None
	}

	fn untranslated(&self, code: &CodeString, target: &Culture) -> MCString {
		debug!(
			resource = code.resource_name(),
			target = target.name(),
			"no translation found, falling back to the code default"
		);
		MCString::new(
			code.text().to_string(),
			code.clone(),
			self.registry.code_default().clone(),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::formatted_string::FormattedString;
	use crate::issues::GlobalizationIssues;
	use tokio::time::{sleep, Duration};

	fn setup() -> (CultureRegistry, TranslationService) {
		let registry = CultureRegistry::new(crate::issues::IssueReporter::disabled());
		let service = TranslationService::new(registry.clone());
		(registry, service)
	}

	fn progress_message(culture: Culture) -> CodeString {
		CodeString::with_resource_name(
			FormattedString::builder(culture)
				.push_text("Transfer progress is ")
				.push_arg(54)
				.push_text("%")
				.build()
				.unwrap(),
			"transfer.progress",
		)
	}

	#[test]
	fn test_quality_progression_awful_good_perfect() {
		let (registry, service) = setup();
		let target = registry.ensure_normalized("fr-FR").unwrap();
		let code = progress_message(Culture::Normalized(target.clone()));

		let awful = service.translate(&code);
		assert_eq!(awful.quality(), TranslationQuality::Awful);
		assert_eq!(awful.format_culture().name(), "en");
		assert_eq!(awful.text(), "Transfer progress is 54%");
		assert!(awful.is_translation_welcome());

		let neutral = registry.ensure_normalized("fr").unwrap();
		neutral.set_cached_translations([(
			"transfer.progress".to_string(),
			"Le transfert en est à {0}%".to_string(),
		)]);
		let good = service.translate(&code);
		assert_eq!(good.quality(), TranslationQuality::Good);
		assert_eq!(good.format_culture().name(), "fr");
		assert_eq!(good.text(), "Le transfert en est à 54%");
		assert!(!good.is_translation_welcome());

		target.set_cached_translations([(
			"transfer.progress".to_string(),
			"Progression du transfert : {0}%".to_string(),
		)]);
		let perfect = service.translate(&code);
		assert_eq!(perfect.quality(), TranslationQuality::Perfect);
		assert_eq!(perfect.format_culture().name(), "fr-fr");
		assert_eq!(perfect.text(), "Progression du transfert : 54%");
	}

	#[test]
	fn test_unrelated_entry_of_preference_list_is_bad() {
		let (registry, service) = setup();
		let target = registry.ensure_extended("fr,es").unwrap();
		let code = progress_message(target.clone());

		registry
			.ensure_normalized("es")
			.unwrap()
			.set_cached_translations([(
				"transfer.progress".to_string(),
				"La transferencia va al {0}%".to_string(),
			)]);

		let translated = service.translate(&code);
		assert_eq!(translated.format_culture().name(), "es");
		assert_eq!(translated.quality(), TranslationQuality::Bad);
		assert!(translated.is_translation_welcome());
	}

	#[test]
	fn test_sibling_in_preference_list_is_good() {
		let (registry, service) = setup();
		let target = registry.ensure_extended("fr-fr,fr-ca").unwrap();
		let code = progress_message(target.clone());

		registry
			.ensure_normalized("fr-ca")
			.unwrap()
			.set_cached_translations([(
				"transfer.progress".to_string(),
				"Le transfert en est à {0}%".to_string(),
			)]);

		let translated = service.translate(&code);
		assert_eq!(translated.format_culture().name(), "fr-ca");
		assert_eq!(translated.quality(), TranslationQuality::Good);
	}

	#[test]
	fn test_first_match_wins_along_the_walk() {
		let (registry, service) = setup();
		let target = registry.ensure_normalized("fr-FR").unwrap();
		let code = progress_message(Culture::Normalized(target.clone()));

		target.set_cached_translations([(
			"transfer.progress".to_string(),
			"fr-fr: {0}".to_string(),
		)]);
		registry
			.ensure_normalized("fr")
			.unwrap()
			.set_cached_translations([(
				"transfer.progress".to_string(),
				"fr: {0}".to_string(),
			)]);

		let translated = service.translate(&code);
		assert_eq!(translated.text(), "fr-fr: 54");
	}

	#[test]
	fn test_untranslated_english_target_is_perfect() {
		let (registry, service) = setup();
		let target = registry.code_default().clone();
		let code = CodeString::plain(Culture::Normalized(target), "plain english");

		let result = service.translate(&code);
		assert_eq!(result.quality(), TranslationQuality::Perfect);
		assert_eq!(result.text(), "plain english");
	}

	#[test]
	fn test_untranslated_english_regional_target_is_good() {
		let (registry, service) = setup();
		let target = registry.ensure_normalized("en-GB").unwrap();
		let code = CodeString::plain(Culture::Normalized(target), "colour");

		let result = service.translate(&code);
		assert_eq!(result.format_culture().name(), "en");
		assert_eq!(result.quality(), TranslationQuality::Good);
	}

	#[test]
	fn test_invariant_target_with_default_text_is_perfect() {
		let (registry, service) = setup();
		let code = CodeString::plain(
			Culture::Normalized(registry.invariant().clone()),
			"whatever",
		);
		let result = service.translate(&code);
		assert_eq!(result.quality(), TranslationQuality::Perfect);
	}

	#[test]
	fn test_empty_message_never_welcomes_translation() {
		let (registry, service) = setup();
		let target = registry.ensure_normalized("fr").unwrap();
		let code = CodeString::plain(Culture::Normalized(target), "");
		let result = service.translate(&code);
		assert_eq!(result.quality(), TranslationQuality::Awful);
		assert!(!result.is_translation_welcome());
	}

	#[test]
	fn test_argument_count_mismatch_skips_the_template() {
		let (registry, service) = setup();
		let target = registry.ensure_normalized("fr-FR").unwrap();
		let code = progress_message(Culture::Normalized(target.clone()));

		// fr-fr template expects two arguments, the message has one.
		target.set_cached_translations([(
			"transfer.progress".to_string(),
			"{0} / {1}".to_string(),
		)]);
		registry
			.ensure_normalized("fr")
			.unwrap()
			.set_cached_translations([(
				"transfer.progress".to_string(),
				"Le transfert en est à {0}%".to_string(),
			)]);

		let translated = service.translate(&code);
		assert_eq!(translated.format_culture().name(), "fr");
		assert_eq!(translated.text(), "Le transfert en est à 54%");
	}

	#[tokio::test]
	async fn test_misses_and_mismatches_are_reported_once() {
		let issues = GlobalizationIssues::new();
		let registry = CultureRegistry::new(issues.reporter());
		let service = TranslationService::new(registry.clone());
		let mut rx = issues.subscribe();

		let target = registry.ensure_normalized("fr-FR").unwrap();
		target.set_cached_translations([(
			"transfer.progress".to_string(),
			"{0} / {1}".to_string(),
		)]);
		let code = progress_message(Culture::Normalized(target));

		// Same resolution twice: the mismatch and the miss must each be
		// observed exactly once.
		service.translate(&code);
		service.translate(&code);

		sleep(Duration::from_millis(50)).await;
		let mut kinds = Vec::new();
		while let Ok(issue) = rx.try_recv() {
			kinds.push(issue.kind());
		}
		kinds.sort_unstable();
		assert_eq!(
			kinds,
			["format_argument_count_mismatch", "missing_translation_resource"]
		);
	}
}
