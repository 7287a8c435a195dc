//! Reply parsing against the fixed output grammar.
//!
//! Primary path: locate the `Diagnosis:` and `Specialists:` delimiters, take
//! the first sentence of the diagnosis segment, split the specialists segment
//! on commas, and keep only registry names. Fallback: scan the raw reply for
//! registry names as case-insensitive substrings, capped at two. Nothing valid
//! either way yields the registry's default specialist, so the result is never
//! empty.

use medgid_directory::registry;

use crate::TriageOutcome;

const DIAGNOSIS_TAG: &str = "Diagnosis:";
const SPECIALISTS_TAG: &str = "Specialists:";

/// Diagnosis used when the segment is missing or blank.
const UNKNOWN_DIAGNOSIS: &str = "unspecified condition";

/// Matches in the fallback substring scan.
const FALLBACK_SCAN_CAP: usize = 2;

/// Parses a model reply into a [`TriageOutcome`].
pub fn parse_reply(reply: &str) -> TriageOutcome {
    if let (Some(d_pos), Some(s_pos)) = (reply.find(DIAGNOSIS_TAG), reply.find(SPECIALISTS_TAG)) {
        if d_pos < s_pos {
            let diagnosis_segment = &reply[d_pos + DIAGNOSIS_TAG.len()..s_pos];
            let specialists_segment = &reply[s_pos + SPECIALISTS_TAG.len()..];

            let diagnosis = first_sentence(diagnosis_segment);
            let specialists = split_specialists(specialists_segment);
            if !specialists.is_empty() {
                return TriageOutcome {
                    diagnosis,
                    specialists,
                };
            }
            // Delimiters present but no valid name: fall through to the scan
            // with the already-extracted diagnosis.
            return TriageOutcome {
                diagnosis,
                specialists: scan_or_fallback(reply),
            };
        }
    }

    TriageOutcome {
        diagnosis: UNKNOWN_DIAGNOSIS.to_string(),
        specialists: scan_or_fallback(reply),
    }
}

/// First sentence of the segment, trimmed; blank → the unknown-diagnosis text.
fn first_sentence(segment: &str) -> String {
    let sentence = segment.split('.').next().unwrap_or("").trim();
    if sentence.is_empty() {
        UNKNOWN_DIAGNOSIS.to_string()
    } else {
        sentence.to_string()
    }
}

/// Comma-separated tokens filtered to registry display names, appearance order,
/// duplicates dropped.
fn split_specialists(segment: &str) -> Vec<String> {
    let mut names = Vec::new();
    for token in segment.split(',') {
        if let Some(spec) = registry::by_display_name_relaxed(token) {
            let name = spec.display_name.to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn scan_or_fallback(reply: &str) -> Vec<String> {
    let scanned: Vec<String> = registry::scan_names(reply, FALLBACK_SCAN_CAP)
        .into_iter()
        .map(|s| s.display_name.to_string())
        .collect();
    if scanned.is_empty() {
        vec![registry::fallback().display_name.to_string()]
    } else {
        scanned
    }
}
