use crate::documents::Document;
use crate::error::MatchError;
use crate::filter::Filter;
use serde_json::json;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Report documents that do not match instead
    pub invert: bool,
    /// Record match errors and treat the document as a non-match
    pub skip_errors: bool,
}

/// A document whose evaluation failed
#[derive(Debug)]
pub struct SkippedDocument {
    pub idx: usize,
    pub error: MatchError,
}

#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Positions of the reported documents in the input slice
    pub matches: Vec<usize>,
    pub skipped: Vec<SkippedDocument>,
}

/// Evaluate `filter` against every document.
///
/// Without `skip_errors` the first match error aborts the search. A document
/// that failed is never reported, inverted or not.
pub fn collect_match_indices(
    documents: &[Document],
    filter: &Filter,
    options: SearchOptions,
) -> Result<SearchOutcome, MatchError> {
    let mut outcome = SearchOutcome::default();

    for (idx, document) in documents.iter().enumerate() {
        match filter.matches(&document.value) {
            Ok(is_match) => {
                if is_match != options.invert {
                    outcome.matches.push(idx);
                }
            }
            Err(error) if options.skip_errors => {
                outcome.skipped.push(SkippedDocument { idx, error });
            }
            Err(error) => return Err(error),
        }
    }

    Ok(outcome)
}

pub fn format_search_text(documents: &[Document], outcome: &SearchOutcome) -> String {
    let mut out = String::new();
    for &idx in &outcome.matches {
        let document = &documents[idx];
        let _ = writeln!(
            out,
            "{}#{}: {}",
            document.source, document.index, document.value
        );
    }
    out
}

pub fn format_search_count_text(outcome: &SearchOutcome) -> String {
    format!("{}\n", outcome.matches.len())
}

pub fn format_search_json(
    filter: &Filter,
    documents: &[Document],
    outcome: &SearchOutcome,
    show_documents: bool,
    pretty: bool,
) -> String {
    let matches: Vec<_> = outcome
        .matches
        .iter()
        .map(|&idx| {
            let document = &documents[idx];
            if show_documents {
                json!({
                    "source": document.source,
                    "index": document.index,
                    "document": document.value,
                })
            } else {
                json!({
                    "source": document.source,
                    "index": document.index,
                })
            }
        })
        .collect();

    let errors: Vec<_> = outcome
        .skipped
        .iter()
        .map(|skipped| {
            let document = &documents[skipped.idx];
            json!({
                "source": document.source,
                "index": document.index,
                "operator": skipped.error.operator,
                "message": skipped.error.to_string(),
            })
        })
        .collect();

    let report = json!({
        "search": {
            "filter": filter.to_string(),
            "documents": documents.len(),
            "matched": outcome.matches.len(),
            "matches": matches,
            "errors": errors,
        }
    });

    let rendered = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    rendered.unwrap_or_else(|_| "{\"search\":{\"error\":\"failed to serialize search output\"}}".into())
}

pub fn format_search_count_json(outcome: &SearchOutcome, pretty: bool) -> String {
    let report = json!({
        "search": {
            "matched": outcome.matches.len(),
            "errors": outcome.skipped.len(),
        }
    });
    let rendered = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    rendered.unwrap_or_else(|_| {
        "{\"search\":{\"error\":\"failed to serialize search count output\"}}".into()
    })
}
