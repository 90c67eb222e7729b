// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors raised while constructing or parsing positional formats and
/// placeholder-bearing messages. These are fail-fast construction errors;
/// translation-time problems never surface here (see the issue channel).
///
/// Offsets are byte offsets into the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
	#[error("expected argument index digit, found {found:?} at offset {offset}")]
	ExpectedIndexDigit { found: char, offset: usize },

	#[error("expected '}}' to close placeholder, found {found:?} at offset {offset}")]
	ExpectedCloseBrace { found: char, offset: usize },

	#[error("unexpected end of input in placeholder opened at offset {offset}")]
	UnterminatedPlaceholder { offset: usize },

	#[error("alignment and format specifiers are not supported, found {found:?} at offset {offset}")]
	SpecifierNotSupported { found: char, offset: usize },

	#[error("argument index must be 0-99 without a leading zero, found \"{index}\" at offset {offset}")]
	InvalidArgumentIndex { index: String, offset: usize },

	#[error("unexpected '}}' at offset {offset}, literal braces must be doubled")]
	UnexpectedCloseBrace { offset: usize },

	#[error("placeholder span ({start},{len}) does not fit a text of {text_len} bytes")]
	InvalidPlaceholderSpan {
		start: usize,
		len: usize,
		text_len: usize,
	},

	#[error("placeholder spans must be sorted and non-overlapping, span {index} starts at {start} but the previous span ends at {previous_end}")]
	OverlappingPlaceholderSpans {
		index: usize,
		start: usize,
		previous_end: usize,
	},

	#[error("placeholder span edge at byte {offset} is not a character boundary")]
	SpanNotOnCharBoundary { offset: usize },

	#[error("a message supports at most {max} placeholders, got {count}")]
	TooManyPlaceholders { max: usize, count: usize },
}

/// Errors raised by culture lookup and registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CultureError {
	/// The platform locale resolver rejected the tag. Resolution *misses*
	/// for well-formed but unregistered names never error; this is only
	/// raised for names that cannot denote a culture at all.
	#[error("culture not found: {name:?}: {reason}")]
	CultureNotFound { name: String, reason: String },
}
