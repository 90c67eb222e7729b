// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Captured messages: literal text, placeholder spans, and the culture the
//! placeholder contents were rendered with.
//!
//! A `FormattedString` carries two deliverables. The *content* is the
//! rendered text itself. The *shape* is the language-agnostic template
//! derived from it ([`format_string`](FormattedString::format_string)),
//! where each placeholder becomes `{N}`; translators work against the
//! shape, never the content. The SHA-1 of the shape names the resource
//! when no explicit name is given.

use std::fmt::{self, Write as _};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha1::{Digest, Sha1};

use crate::composite_format::{push_escaped, MAX_ARGUMENTS};
use crate::culture::Culture;
use crate::error::FormatError;

/// Byte fed to the shape hash in place of each placeholder's content.
const PLACEHOLDER_SENTINEL: u8 = 0;

/// A placeholder's byte span inside the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSpan {
	pub start: usize,
	pub len: usize,
}

impl PlaceholderSpan {
	pub fn end(&self) -> usize {
		self.start + self.len
	}
}

/// An immutable captured message: rendered text plus the spans that were
/// produced by arguments rather than literal source text.
#[derive(Debug, Clone)]
pub struct FormattedString {
	text: String,
	placeholders: Vec<PlaceholderSpan>,
	culture: Culture,
}

impl FormattedString {
	/// A message with no placeholders.
	pub fn plain(culture: Culture, text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			placeholders: Vec::new(),
			culture,
		}
	}

	/// Builds a message from explicit parts.
	///
	/// Spans must be sorted, non-overlapping, inside the text, on char
	/// boundaries, and at most [`MAX_ARGUMENTS`] of them.
	pub fn from_parts(
		culture: Culture,
		text: impl Into<String>,
		placeholders: Vec<PlaceholderSpan>,
	) -> Result<Self, FormatError> {
		let text = text.into();
		if placeholders.len() > MAX_ARGUMENTS {
			return Err(FormatError::TooManyPlaceholders {
				max: MAX_ARGUMENTS,
				count: placeholders.len(),
			});
		}
		let mut previous_end = 0;
		for (index, span) in placeholders.iter().enumerate() {
			let end = span
				.start
				.checked_add(span.len)
				.filter(|end| *end <= text.len())
				.ok_or(FormatError::InvalidPlaceholderSpan {
					start: span.start,
					len: span.len,
					text_len: text.len(),
				})?;
			if index > 0 && span.start < previous_end {
				return Err(FormatError::OverlappingPlaceholderSpans {
					index,
					start: span.start,
					previous_end,
				});
			}
			for edge in [span.start, end] {
				if !text.is_char_boundary(edge) {
					return Err(FormatError::SpanNotOnCharBoundary { offset: edge });
				}
			}
			previous_end = end;
		}
		Ok(Self {
			text,
			placeholders,
			culture,
		})
	}

	/// Starts capturing a message the way an interpolated call site would:
	/// literal text pieces interleaved with rendered arguments.
	pub fn builder(culture: Culture) -> FormattedStringBuilder {
		FormattedStringBuilder {
			text: String::new(),
			placeholders: Vec::new(),
			culture,
		}
	}

	/// The rendered text.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// The spans produced by arguments, sorted and non-overlapping.
	pub fn placeholders(&self) -> &[PlaceholderSpan] {
		&self.placeholders
	}

	/// The culture the placeholder contents were rendered with.
	pub fn culture(&self) -> &Culture {
		&self.culture
	}

	/// True for the empty message: no text, no placeholders.
	pub fn is_empty(&self) -> bool {
		self.text.is_empty() && self.placeholders.is_empty()
	}

	/// The rendered slice of each placeholder, for introspection and
	/// logging. Formatting never depends on these values.
	pub fn placeholder_contents(&self) -> impl Iterator<Item = &str> {
		self.placeholders
			.iter()
			.map(|span| &self.text[span.start..span.end()])
	}

	/// The message's shape: placeholder spans become `{N}`, literal braces
	/// are doubled. The result is a valid composite format, the text
	/// translators work from.
	pub fn format_string(&self) -> String {
		// 2 bytes per literal char worst case, "{NN}" per placeholder.
		let mut out = String::with_capacity(2 * self.text.len() + 4 * self.placeholders.len());
		let mut pos = 0;
		for (index, span) in self.placeholders.iter().enumerate() {
			push_escaped(&mut out, &self.text[pos..span.start]);
			out.push('{');
			let _ = write!(out, "{index}");
			out.push('}');
			pos = span.end();
		}
		push_escaped(&mut out, &self.text[pos..]);
		out
	}

	/// Feeds the shape hash: literal segment bytes with one sentinel byte
	/// per placeholder. Placeholder contents are excluded, so the hash
	/// identifies the shape, not the values.
	pub fn write_content_hash(&self, hasher: &mut Sha1) {
		let mut pos = 0;
		for span in &self.placeholders {
			hasher.update(self.text[pos..span.start].as_bytes());
			hasher.update([PLACEHOLDER_SENTINEL]);
			pos = span.end();
		}
		hasher.update(self.text[pos..].as_bytes());
	}

	/// The 20-byte shape hash.
	pub fn content_hash(&self) -> [u8; 20] {
		let mut hasher = Sha1::new();
		self.write_content_hash(&mut hasher);
		hasher.finalize().into()
	}

	/// The default resource name for this shape: `"SHA."` followed by the
	/// base64url (unpadded) shape hash.
	pub fn sha1_resource_name(&self) -> String {
		resource_name_from_hash(&self.content_hash())
	}
}

pub(crate) fn resource_name_from_hash(hash: &[u8; 20]) -> String {
	format!("SHA.{}", URL_SAFE_NO_PAD.encode(hash))
}

impl fmt::Display for FormattedString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// Capture surface for [`FormattedString`]: push literal text and rendered
/// arguments in call-site order.
pub struct FormattedStringBuilder {
	text: String,
	placeholders: Vec<PlaceholderSpan>,
	culture: Culture,
}

impl FormattedStringBuilder {
	/// Appends literal source text.
	pub fn push_text(mut self, text: &str) -> Self {
		self.text.push_str(text);
		self
	}

	/// Renders an argument and records its span as a placeholder.
	pub fn push_arg(mut self, value: impl fmt::Display) -> Self {
		let start = self.text.len();
		let _ = write!(self.text, "{value}");
		self.placeholders.push(PlaceholderSpan {
			start,
			len: self.text.len() - start,
		});
		self
	}

	/// Finishes the capture. Fails only when more than [`MAX_ARGUMENTS`]
	/// arguments were pushed.
	pub fn build(self) -> Result<FormattedString, FormatError> {
		if self.placeholders.len() > MAX_ARGUMENTS {
			return Err(FormatError::TooManyPlaceholders {
				max: MAX_ARGUMENTS,
				count: self.placeholders.len(),
			});
		}
		Ok(FormattedString {
			text: self.text,
			placeholders: self.placeholders,
			culture: self.culture,
		})
	}
}
