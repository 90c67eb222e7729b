// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Property-based invariant tests for the globalization core.
//!
//! Verifies the structural guarantees the rest of the system leans on:
//!
//! 1. Composite formats round-trip exactly: parse → format_string is identity
//! 2. Expected argument count is one past the highest referenced index
//! 3. Formatting never fails, whatever arguments are supplied
//! 4. The shape hash ignores placeholder contents
//! 5. Extended-culture resolution never repeats a culture and never puts a
//!    culture before one of its own specializations
//! 6. Extended-culture names are idempotent: resolving a resolved name
//!    yields the identical interned instance

use loom_common_globalization::{
	Culture, CultureRegistry, FormattedString, IssueReporter, NormalizedCulture,
	PositionalCompositeFormat,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Piece {
	Literal(String),
	Placeholder(u8),
}

fn piece_strategy() -> impl Strategy<Value = Piece> {
	prop_oneof![
		// Printable ASCII, braces included: they exercise the escaping.
		"[ -~]{0,12}".prop_map(Piece::Literal),
		(0u8..100).prop_map(Piece::Placeholder),
	]
}

/// Renders pieces into canonical template text: literal braces doubled,
/// placeholders as `{N}`.
fn template_from(pieces: &[Piece]) -> String {
	let mut out = String::new();
	for piece in pieces {
		match piece {
			Piece::Literal(text) => {
				for c in text.chars() {
					match c {
						'{' => out.push_str("{{"),
						'}' => out.push_str("}}"),
						c => out.push(c),
					}
				}
			}
			Piece::Placeholder(index) => {
				out.push('{');
				out.push_str(&index.to_string());
				out.push('}');
			}
		}
	}
	out
}

proptest! {
	#[test]
	fn parse_format_string_round_trips(pieces in prop::collection::vec(piece_strategy(), 0..16)) {
		let template = template_from(&pieces);
		let format = PositionalCompositeFormat::parse(&template).unwrap();
		prop_assert_eq!(format.format_string(), template);
	}

	#[test]
	fn expected_count_is_one_past_highest_index(pieces in prop::collection::vec(piece_strategy(), 0..16)) {
		let template = template_from(&pieces);
		let format = PositionalCompositeFormat::parse(&template).unwrap();
		let expected = pieces
			.iter()
			.filter_map(|p| match p {
				Piece::Placeholder(index) => Some(*index as usize + 1),
				Piece::Literal(_) => None,
			})
			.max()
			.unwrap_or(0);
		prop_assert_eq!(format.expected_argument_count(), expected);
	}

	#[test]
	fn formatting_never_fails(
		index in 0u8..100,
		args in prop::collection::vec("[a-z]{0,4}", 0..4),
	) {
		let template = format!("x{{{index}}}y");
		let format = PositionalCompositeFormat::parse(&template).unwrap();
		let out = format.format(&args);
		prop_assert!(out.starts_with('x'));
		prop_assert!(out.ends_with('y'));
	}

	#[test]
	fn shape_hash_ignores_placeholder_contents(
		segments in prop::collection::vec(("[a-zA-Z ]{0,8}", "[a-z0-9]{0,6}", "[A-Z]{0,9}"), 0..5),
		tail in "[a-zA-Z ]{0,8}",
	) {
		let registry = CultureRegistry::new(IssueReporter::disabled());
		let culture = Culture::Normalized(registry.code_default().clone());

		let mut first = FormattedString::builder(culture.clone());
		let mut second = FormattedString::builder(culture);
		for (literal, content_a, content_b) in &segments {
			first = first.push_text(literal).push_arg(content_a);
			second = second.push_text(literal).push_arg(content_b);
		}
		let first = first.push_text(&tail).build().unwrap();
		let second = second.push_text(&tail).build().unwrap();

		prop_assert_eq!(first.format_string(), second.format_string());
		prop_assert_eq!(first.sha1_resource_name(), second.sha1_resource_name());
	}
}

const TAG_POOL: &[&str] = &[
	"en",
	"en-us",
	"en-gb",
	"fr",
	"fr-fr",
	"fr-ca",
	"de",
	"de-at",
	"es",
	"pt-br",
	"zh",
	"zh-hant-tw",
];

proptest! {
	#[test]
	fn extended_resolution_is_ordered_and_idempotent(
		indices in prop::collection::vec(0..TAG_POOL.len(), 1..6),
	) {
		let registry = CultureRegistry::new(IssueReporter::disabled());
		let names: Vec<&str> = indices.iter().map(|i| TAG_POOL[*i]).collect();
		let culture = registry.ensure_extended(&names.join(",")).unwrap();

		let order: Vec<NormalizedCulture> = culture.lookup_order().cloned().collect();
		for (position, entry) in order.iter().enumerate() {
			for later in &order[position + 1..] {
				prop_assert_ne!(entry.id(), later.id(), "duplicate culture in resolution order");
				prop_assert!(
					!later.fallbacks().contains(entry),
					"{} precedes its specialization {}",
					entry.name(),
					later.name()
				);
			}
		}

		let again = registry.ensure_extended(culture.name()).unwrap();
		prop_assert_eq!(culture.id(), again.id());
		prop_assert!(culture.ptr_eq(&again));
	}
}
