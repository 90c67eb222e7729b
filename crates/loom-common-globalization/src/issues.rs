// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Best-effort observation channel for globalization anomalies.
//!
//! Producers (culture registration, translation resolution, translation
//! table loading) fire issues into an unbounded queue and never wait; a
//! single background task drains the queue, deduplicates per-resource
//! notices, retains identifier clashes for introspection, and fans out to
//! subscribers.
//!
//! Visibility is *eventual*: an issue triggered by a synchronous call is
//! not guaranteed to be observable when that call returns. Tests poll.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::culture::CultureId;

/// An observed globalization anomaly.
///
/// None of these are caller errors: execution has already continued with a
/// deterministic fallback by the time an issue is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GlobalizationIssue {
	/// Two culture names hashed to the same numeric identifier; the new
	/// culture was assigned the next free id. Always emitted.
	CultureIdentifierClash {
		/// Name of the culture that hit the clash.
		name: String,
		/// The id it finally received.
		id: CultureId,
		/// Names of the cultures occupying the ids that were skipped over.
		clashes: Vec<String>,
	},

	/// A translation template failed to parse and was excluded from the
	/// culture's table.
	TranslationFormatError {
		culture: String,
		resource_name: String,
		format: String,
		error: String,
	},

	/// A resource name appeared twice in one table load; the first entry
	/// won and this one was dropped.
	TranslationDuplicateResource {
		culture: String,
		resource_name: String,
		skipped: String,
	},

	/// A message was resolved without finding a translation good enough
	/// for its target culture. Deduplicated per (culture, resource).
	MissingTranslationResource {
		culture: String,
		resource_name: String,
		format: String,
	},

	/// A cached template references a different number of arguments than
	/// the message has placeholders; the template was skipped.
	/// Deduplicated per (culture, resource).
	FormatArgumentCountMismatch {
		culture: String,
		resource_name: String,
		expected: usize,
		actual: usize,
	},
}

impl GlobalizationIssue {
	/// Short stable discriminant, used in logs and dedup keys.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::CultureIdentifierClash { .. } => "culture_identifier_clash",
			Self::TranslationFormatError { .. } => "translation_format_error",
			Self::TranslationDuplicateResource { .. } => "translation_duplicate_resource",
			Self::MissingTranslationResource { .. } => "missing_translation_resource",
			Self::FormatArgumentCountMismatch { .. } => "format_argument_count_mismatch",
		}
	}

	/// Issues that should only be observed once per (culture, resource).
	fn dedup_key(&self) -> Option<(&'static str, String, String)> {
		match self {
			Self::MissingTranslationResource {
				culture,
				resource_name,
				..
			}
			| Self::FormatArgumentCountMismatch {
				culture,
				resource_name,
				..
			} => Some((self.kind(), culture.clone(), resource_name.clone())),
			_ => None,
		}
	}
}

/// Fire-and-forget producer handle.
///
/// Cheap to clone; reporting never blocks and never fails. When no
/// collector is listening (see [`IssueReporter::disabled`]) issues are
/// silently dropped.
#[derive(Debug, Clone)]
pub struct IssueReporter {
	tx: mpsc::UnboundedSender<GlobalizationIssue>,
}

impl IssueReporter {
	/// A reporter with no collector behind it. Every report is dropped.
	pub fn disabled() -> Self {
		let (tx, _rx) = mpsc::unbounded_channel();
		Self { tx }
	}

	/// Reports an issue. Never blocks, never fails.
	pub fn report(&self, issue: GlobalizationIssue) {
		debug!(kind = issue.kind(), "globalization issue reported");
		let _ = self.tx.send(issue);
	}
}

#[derive(Default)]
struct IssueState {
	identifier_clashes: Mutex<Vec<GlobalizationIssue>>,
	subscribers: Mutex<Vec<mpsc::UnboundedSender<GlobalizationIssue>>>,
}

/// The issue collector service.
///
/// Owns the consuming task. Must be created inside a Tokio runtime. The
/// task ends when every [`IssueReporter`] handle has been dropped.
pub struct GlobalizationIssues {
	reporter: IssueReporter,
	state: Arc<IssueState>,
}

impl GlobalizationIssues {
	pub fn new() -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		let state = Arc::new(IssueState::default());
		tokio::spawn(Self::consume(rx, Arc::clone(&state)));
		Self {
			reporter: IssueReporter { tx },
			state,
		}
	}

	/// A producer handle feeding this collector.
	pub fn reporter(&self) -> IssueReporter {
		self.reporter.clone()
	}

	/// Registers a subscriber receiving every issue that survives
	/// deduplication, in submission order.
	pub fn subscribe(&self) -> mpsc::UnboundedReceiver<GlobalizationIssue> {
		let (tx, rx) = mpsc::unbounded_channel();
		lock_unpoisoned(&self.state.subscribers).push(tx);
		rx
	}

	/// Identifier clashes observed so far. Eventually consistent with the
	/// registrations that triggered them.
	pub fn identifier_clashes(&self) -> Vec<GlobalizationIssue> {
		lock_unpoisoned(&self.state.identifier_clashes).clone()
	}

	async fn consume(
		mut rx: mpsc::UnboundedReceiver<GlobalizationIssue>,
		state: Arc<IssueState>,
	) {
		let mut seen: HashSet<(&'static str, String, String)> = HashSet::new();
		while let Some(issue) = rx.recv().await {
			if let Some(key) = issue.dedup_key() {
				if !seen.insert(key) {
					continue;
				}
			}

			match &issue {
				GlobalizationIssue::CultureIdentifierClash { name, id, clashes } => {
					warn!(culture = %name, id = %id, clashes = ?clashes, "culture identifier clash");
					lock_unpoisoned(&state.identifier_clashes).push(issue.clone());
				}
				GlobalizationIssue::TranslationFormatError {
					culture,
					resource_name,
					error,
					..
				} => {
					warn!(culture = %culture, resource = %resource_name, error = %error, "invalid translation template");
				}
				GlobalizationIssue::TranslationDuplicateResource {
					culture,
					resource_name,
					..
				} => {
					warn!(culture = %culture, resource = %resource_name, "duplicate translation resource, first entry kept");
				}
				GlobalizationIssue::MissingTranslationResource {
					culture,
					resource_name,
					..
				} => {
					info!(culture = %culture, resource = %resource_name, "translation missing");
				}
				GlobalizationIssue::FormatArgumentCountMismatch {
					culture,
					resource_name,
					expected,
					actual,
				} => {
					warn!(culture = %culture, resource = %resource_name, expected, actual, "translation argument count mismatch");
				}
			}

			lock_unpoisoned(&state.subscribers).retain(|tx| tx.send(issue.clone()).is_ok());
		}
	}
}

impl Default for GlobalizationIssues {
	fn default() -> Self {
		Self::new()
	}
}

/// A panicked producer cannot leave the lists inconsistent (push/retain
/// are atomic per entry), so a poisoned lock is recovered.
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	match mutex.lock() {
		Ok(guard) => guard,
		Err(poisoned) => poisoned.into_inner(),
	}
}
