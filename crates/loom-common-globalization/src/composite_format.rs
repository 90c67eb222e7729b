// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Positional composite format: the `{0}..{99}` template grammar used for
//! translated resources.
//!
//! The grammar is deliberately tiny: literal runs, `{{` / `}}` for literal
//! braces, and `{N}` placeholder references where `N` is one or two decimal
//! digits with no leading zero. Alignment and format specifiers
//! (`{0,8}`, `{0:x}`) are rejected with an offset-annotated error.
//!
//! A parsed format round-trips exactly: [`PositionalCompositeFormat::format_string`]
//! reproduces the input byte for byte.

use crate::error::FormatError;

/// Upper bound on distinct argument positions: placeholders are `{0}`..`{99}`.
pub const MAX_ARGUMENTS: usize = 100;

/// A placeholder slot: which argument it references and where in the
/// unescaped literal text it is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSlot {
	/// Referenced argument position, `0..=99`.
	pub arg_index: u8,
	/// Byte offset into the unescaped literal text where the argument is
	/// inserted. Several slots may share one offset (adjacent placeholders).
	pub offset: usize,
}

/// An immutable, parsed positional template.
///
/// Only the unescaped literal text and the slot list are stored; everything
/// else ([`expected_argument_count`](Self::expected_argument_count), the
/// re-escaped [`format_string`](Self::format_string)) is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionalCompositeFormat {
	literal: String,
	slots: Vec<FormatSlot>,
}

impl PositionalCompositeFormat {
	/// Parses a composite-format template.
	///
	/// Single pass; any grammar violation yields a [`FormatError`] naming
	/// the offending construct and its byte offset.
	pub fn parse(text: &str) -> Result<Self, FormatError> {
		let mut literal = String::with_capacity(text.len());
		let mut slots = Vec::new();
		let mut chars = text.char_indices().peekable();

		while let Some((offset, c)) = chars.next() {
			match c {
				'{' => {
					if matches!(chars.peek(), Some((_, '{'))) {
						chars.next();
						literal.push('{');
						continue;
					}
					let digits_start = offset + 1;
					let mut digits = String::new();
					while let Some(&(_, d)) = chars.peek() {
						if d.is_ascii_digit() {
							digits.push(d);
							chars.next();
						} else {
							break;
						}
					}
					match chars.peek().copied() {
						None => {
							return Err(FormatError::UnterminatedPlaceholder { offset });
						}
						Some((_, '}')) if !digits.is_empty() => {
							if digits.len() > 2 || (digits.len() == 2 && digits.starts_with('0')) {
								return Err(FormatError::InvalidArgumentIndex {
									index: digits,
									offset: digits_start,
								});
							}
							chars.next();
							let arg_index = digits.bytes().fold(0u8, |acc, d| acc * 10 + (d - b'0'));
							slots.push(FormatSlot {
								arg_index,
								offset: literal.len(),
							});
						}
						Some((close_offset, found)) => {
							if digits.is_empty() {
								return Err(FormatError::ExpectedIndexDigit {
									found,
									offset: close_offset,
								});
							}
							if found == ',' || found == ':' {
								return Err(FormatError::SpecifierNotSupported {
									found,
									offset: close_offset,
								});
							}
							return Err(FormatError::ExpectedCloseBrace {
								found,
								offset: close_offset,
							});
						}
					}
				}
				'}' => {
					if matches!(chars.peek(), Some((_, '}'))) {
						chars.next();
						literal.push('}');
					} else {
						return Err(FormatError::UnexpectedCloseBrace { offset });
					}
				}
				c => literal.push(c),
			}
		}

		Ok(Self { literal, slots })
	}

	/// Number of arguments the template expects: one past the highest
	/// referenced index, `0` when no placeholder is referenced.
	pub fn expected_argument_count(&self) -> usize {
		self.slots
			.iter()
			.map(|s| s.arg_index as usize + 1)
			.max()
			.unwrap_or(0)
	}

	/// The unescaped literal text between placeholders.
	pub fn literal(&self) -> &str {
		&self.literal
	}

	/// The placeholder slots in template order.
	pub fn slots(&self) -> &[FormatSlot] {
		&self.slots
	}

	/// Applies the template to the given arguments.
	///
	/// An index with no corresponding argument substitutes the empty
	/// string; surplus arguments are ignored. Never fails.
	pub fn format<S: AsRef<str>>(&self, args: &[S]) -> String {
		let args_len: usize = args.iter().map(|a| a.as_ref().len()).sum();
		let mut out = String::with_capacity(self.literal.len() + args_len);
		let mut pos = 0;
		for slot in &self.slots {
			out.push_str(&self.literal[pos..slot.offset]);
			if let Some(arg) = args.get(slot.arg_index as usize) {
				out.push_str(arg.as_ref());
			}
			pos = slot.offset;
		}
		out.push_str(&self.literal[pos..]);
		out
	}

	/// Reproduces the template exactly as it was parsed: literal braces
	/// re-doubled, placeholders re-emitted as `{N}`.
	pub fn format_string(&self) -> String {
		let mut out = String::with_capacity(2 * self.literal.len() + 4 * self.slots.len());
		let mut pos = 0;
		for slot in &self.slots {
			push_escaped(&mut out, &self.literal[pos..slot.offset]);
			out.push('{');
			out.push_str(&slot.arg_index.to_string());
			out.push('}');
			pos = slot.offset;
		}
		push_escaped(&mut out, &self.literal[pos..]);
		out
	}
}

/// Appends `s` with every literal brace doubled.
pub(crate) fn push_escaped(out: &mut String, s: &str) {
	for c in s.chars() {
		match c {
			'{' => out.push_str("{{"),
			'}' => out.push_str("}}"),
			c => out.push(c),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_plain_literal() {
		let format = PositionalCompositeFormat::parse("no placeholders here").unwrap();
		assert_eq!(format.expected_argument_count(), 0);
		assert_eq!(format.format::<&str>(&[]), "no placeholders here");
		assert_eq!(format.format_string(), "no placeholders here");
	}

	#[test]
	fn test_parse_empty() {
		let format = PositionalCompositeFormat::parse("").unwrap();
		assert_eq!(format, PositionalCompositeFormat::default());
		assert_eq!(format.format_string(), "");
	}

	#[test]
	fn test_parse_single_placeholder() {
		let format = PositionalCompositeFormat::parse("Hello {0}!").unwrap();
		assert_eq!(format.expected_argument_count(), 1);
		assert_eq!(format.format(&["World"]), "Hello World!");
	}

	#[test]
	fn test_parse_reordered_placeholders() {
		let format = PositionalCompositeFormat::parse("{1} before {0}").unwrap();
		assert_eq!(format.expected_argument_count(), 2);
		assert_eq!(format.format(&["a", "b"]), "b before a");
	}

	#[test]
	fn test_parse_adjacent_placeholders() {
		let format = PositionalCompositeFormat::parse("{0}{1}{0}").unwrap();
		assert_eq!(format.format(&["x", "y"]), "xyx");
	}

	#[test]
	fn test_parse_two_digit_index() {
		let format = PositionalCompositeFormat::parse("{99}").unwrap();
		assert_eq!(format.expected_argument_count(), 100);
	}

	#[test]
	fn test_escaped_braces() {
		let format = PositionalCompositeFormat::parse("{{literal}} {0}").unwrap();
		assert_eq!(format.literal(), "{literal} ");
		assert_eq!(format.format(&["v"]), "{literal} v");
		assert_eq!(format.format_string(), "{{literal}} {0}");
	}

	#[test]
	fn test_brace_soup_scenario() {
		let format =
			PositionalCompositeFormat::parse("{3}{{{2}}}{{{1}}}-{{{{{0}}}}}={0}{1}{2}{3}").unwrap();
		assert_eq!(format.expected_argument_count(), 4);
		assert_eq!(format.format(&["A", "B", "C"]), "{C}{B}-{{A}}=ABC");
	}

	#[test]
	fn test_missing_arguments_substitute_empty() {
		let format = PositionalCompositeFormat::parse("[{0}|{1}]").unwrap();
		assert_eq!(format.expected_argument_count(), 2);
		assert_eq!(format.format(&["a"]), "[a|]");
		assert_eq!(format.format::<&str>(&[]), "[|]");
	}

	#[test]
	fn test_surplus_arguments_ignored() {
		let format = PositionalCompositeFormat::parse("{0}").unwrap();
		assert_eq!(format.format(&["a", "b", "c"]), "a");
	}

	#[test]
	fn test_empty_index_is_an_error() {
		let err = PositionalCompositeFormat::parse("ok {}.not").unwrap_err();
		assert_eq!(
			err,
			FormatError::ExpectedIndexDigit {
				found: '}',
				offset: 4
			}
		);
		assert_eq!(
			err.to_string(),
			"expected argument index digit, found '}' at offset 4"
		);
	}

	#[test]
	fn test_alignment_specifier_rejected() {
		let err = PositionalCompositeFormat::parse("{0,8}").unwrap_err();
		assert_eq!(
			err,
			FormatError::SpecifierNotSupported {
				found: ',',
				offset: 2
			}
		);
	}

	#[test]
	fn test_format_specifier_rejected() {
		let err = PositionalCompositeFormat::parse("x{12:x}").unwrap_err();
		assert_eq!(
			err,
			FormatError::SpecifierNotSupported {
				found: ':',
				offset: 4
			}
		);
	}

	#[test]
	fn test_unclosed_index_rejected() {
		let err = PositionalCompositeFormat::parse("{1x}").unwrap_err();
		assert_eq!(
			err,
			FormatError::ExpectedCloseBrace {
				found: 'x',
				offset: 2
			}
		);
	}

	#[test]
	fn test_leading_zero_rejected() {
		let err = PositionalCompositeFormat::parse("{01}").unwrap_err();
		assert_eq!(
			err,
			FormatError::InvalidArgumentIndex {
				index: "01".to_string(),
				offset: 1
			}
		);
	}

	#[test]
	fn test_three_digit_index_rejected() {
		let err = PositionalCompositeFormat::parse("{100}").unwrap_err();
		assert_eq!(
			err,
			FormatError::InvalidArgumentIndex {
				index: "100".to_string(),
				offset: 1
			}
		);
	}

	#[test]
	fn test_unterminated_placeholder_rejected() {
		assert_eq!(
			PositionalCompositeFormat::parse("tail {").unwrap_err(),
			FormatError::UnterminatedPlaceholder { offset: 5 }
		);
		assert_eq!(
			PositionalCompositeFormat::parse("tail {4").unwrap_err(),
			FormatError::UnterminatedPlaceholder { offset: 5 }
		);
	}

	#[test]
	fn test_stray_close_brace_rejected() {
		assert_eq!(
			PositionalCompositeFormat::parse("a}b").unwrap_err(),
			FormatError::UnexpectedCloseBrace { offset: 1 }
		);
	}

	#[test]
	fn test_round_trip_is_exact() {
		for template in [
			"",
			"plain",
			"{0}",
			"{{}}",
			"a{{b}}c{0}d{10}",
			"{3}{{{2}}}{{{1}}}-{{{{{0}}}}}={0}{1}{2}{3}",
			"unicode é{0}漢",
		] {
			let format = PositionalCompositeFormat::parse(template).unwrap();
			assert_eq!(format.format_string(), template, "template {template:?}");
		}
	}

	#[test]
	fn test_unicode_literals_preserved() {
		let format = PositionalCompositeFormat::parse("café {0} über").unwrap();
		assert_eq!(format.format(&["x"]), "café x über");
	}
}
