// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Culture-aware message formatting and translation resolution for Loom
//! user-facing strings.
//!
//! This crate owns culture *identity*, *fallback order*, and *template
//! substitution* — it is not an ICU replacement and delegates actual
//! locale-aware value rendering to the platform locale stack.
//!
//! # Overview
//!
//! - [`CultureRegistry`]: interned [`NormalizedCulture`] /
//!   [`ExtendedCulture`] identities with hierarchical fallback chains,
//!   stable numeric ids, and thread-safe lazy registration.
//! - [`FormattedString`] / [`CodeString`]: captured messages (text +
//!   placeholder spans + culture) with a shape-derived resource name.
//! - [`PositionalCompositeFormat`]: the `{0}..{99}` template grammar used
//!   by translated resources; round-trips exactly.
//! - [`TranslationService`] / [`MCString`]: fallback-chain resolution with
//!   a [`TranslationQuality`] verdict per message.
//! - [`GlobalizationIssues`]: fire-and-forget observation channel for
//!   identifier clashes, broken or duplicate templates, and missing
//!   translations.
//!
//! # Example
//!
//! ```
//! use loom_common_globalization::{
//!     CodeString, Culture, CultureRegistry, FormattedString, IssueReporter,
//!     TranslationQuality, TranslationService,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = CultureRegistry::new(IssueReporter::disabled());
//! let target = registry.ensure_normalized("fr-FR")?;
//!
//! let message = FormattedString::builder(Culture::Normalized(target))
//!     .push_text("Transfer progress is ")
//!     .push_arg(54.5)
//!     .push_text("%")
//!     .build()?;
//! let code = CodeString::with_resource_name(message, "transfer.progress");
//!
//! // A neutral-culture translation is good enough for any French target.
//! registry.ensure_normalized("fr")?.set_cached_translations([(
//!     "transfer.progress".to_string(),
//!     "Le transfert en est à {0}%".to_string(),
//! )]);
//!
//! let service = TranslationService::new(registry);
//! let translated = service.translate(&code);
//! assert_eq!(translated.text(), "Le transfert en est à 54.5%");
//! assert_eq!(translated.quality(), TranslationQuality::Good);
//! # Ok(())
//! # }
//! ```

pub mod code_string;
pub mod composite_format;
pub mod culture;
pub mod error;
pub mod formatted_string;
pub mod issues;
pub mod registry;
pub mod resolver;
pub mod translation;

pub use code_string::CodeString;
pub use composite_format::{FormatSlot, PositionalCompositeFormat, MAX_ARGUMENTS};
pub use culture::{Culture, CultureId, ExtendedCulture, NormalizedCulture};
pub use error::{CultureError, FormatError};
pub use formatted_string::{FormattedString, FormattedStringBuilder, PlaceholderSpan};
pub use issues::{GlobalizationIssue, GlobalizationIssues, IssueReporter};
pub use registry::CultureRegistry;
pub use resolver::{Bcp47Resolver, LocaleResolver};
pub use translation::{MCString, TranslationQuality, TranslationService};
