//! Model reply validation.
//!
//! The model is untrusted. Its text is reduced to a JSON object, people are
//! accepted only from the allowed candidate set (deduplicated, capped at the
//! limit) and both lists are gap-filled from deterministic sources so the
//! caller always gets full-size results when the inputs allow it.

use std::collections::HashSet;

use serde_json::Value;

use crate::profile::field_text;
use crate::ranking::ScoredCandidate;

const LOCATION_SEPARATOR: &str = " — ";
const DETAIL_SEPARATOR: &str = " • ";

/// Reasons a reply cannot be used at all. All of them are retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    #[error("empty model response")]
    Empty,
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("malformed JSON in model output: {0}")]
    MalformedJson(String),
    #[error("model output is not a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposedPerson {
    pub uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProposedActivity {
    pub title: String,
    pub location: String,
    pub why_it_works: String,
    pub accessibility_notes: String,
}

/// A parsed reply, before any constraint is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub people: Vec<ProposedPerson>,
    pub activities: Vec<ProposedActivity>,
}

/// Locate the JSON object inside raw model text.
///
/// Text that is already wrapped in braces is returned as is; otherwise the
/// span from the first `{` to the last `}` is used.
pub fn extract_json_object(text: &str) -> Result<&str, ReplyError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ReplyError::Empty);
    }
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed);
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&trimmed[start..=end]),
        _ => Err(ReplyError::NoJsonObject),
    }
}

/// Parse raw model text into a [`ModelReply`].
///
/// Missing or non-array `recommendedPeople`/`activities` read as empty lists
/// and entries that are not objects are skipped; gap-filling covers the rest.
pub fn parse_reply(text: &str) -> Result<ModelReply, ReplyError> {
    let raw = extract_json_object(text)?;
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ReplyError::MalformedJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ReplyError::NotAnObject);
    }

    let people = object_entries(&value, "recommendedPeople")
        .map(|entry| ProposedPerson {
            uid: field_text(entry, "uid"),
        })
        .collect();

    let activities = object_entries(&value, "activities")
        .map(|entry| ProposedActivity {
            title: field_text(entry, "title"),
            location: field_text(entry, "location"),
            why_it_works: field_text(entry, "whyItWorks"),
            accessibility_notes: field_text(entry, "accessibilityNotes"),
        })
        .collect();

    Ok(ModelReply { people, activities })
}

fn object_entries<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|entry| entry.is_object())
}

/// Accept proposed uids in model order, then fill from the ranked slice.
///
/// A uid is accepted only when non-empty, allowed and not yet accepted. The
/// result never exceeds `limit`.
pub fn accept_people(
    proposed: &[ProposedPerson],
    allowed: &HashSet<&str>,
    ranked: &[ScoredCandidate],
    limit: usize,
) -> Vec<String> {
    let mut accepted: Vec<String> = Vec::with_capacity(limit);
    let mut seen: HashSet<&str> = HashSet::new();

    for person in proposed {
        if accepted.len() >= limit {
            break;
        }
        let uid = person.uid.as_str();
        if uid.is_empty() || !allowed.contains(uid) || !seen.insert(uid) {
            continue;
        }
        accepted.push(uid.to_string());
    }

    let from_model = accepted.len();
    for candidate in ranked {
        if accepted.len() >= limit {
            break;
        }
        let uid = candidate.uid();
        if uid.is_empty() || !allowed.contains(uid) || !seen.insert(uid) {
            continue;
        }
        accepted.push(uid.to_string());
    }

    if accepted.len() > from_model {
        tracing::debug!(
            from_model,
            gap_filled = accepted.len() - from_model,
            "model under-delivered people; filled from ranking"
        );
    }

    accepted
}

/// Render one activity as a display line. Entries without a title yield
/// `None`.
pub fn format_activity_line(activity: &ProposedActivity) -> Option<String> {
    if activity.title.is_empty() {
        return None;
    }

    let mut line = activity.title.clone();
    if !activity.location.is_empty() {
        line.push_str(LOCATION_SEPARATOR);
        line.push_str(&activity.location);
    }
    if !activity.why_it_works.is_empty() {
        line.push_str(DETAIL_SEPARATOR);
        line.push_str(&activity.why_it_works);
    }
    if !activity.accessibility_notes.is_empty() {
        line.push_str(DETAIL_SEPARATOR);
        line.push_str("Accessibility: ");
        line.push_str(&activity.accessibility_notes);
    }
    Some(line)
}

/// Format the model's activities and top up from `pool`, without duplicates
/// and never beyond `limit`.
pub fn activity_lines(activities: &[ProposedActivity], pool: &[String], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::with_capacity(limit);

    for line in activities.iter().filter_map(format_activity_line) {
        if lines.len() >= limit {
            break;
        }
        if !lines.contains(&line) {
            lines.push(line);
        }
    }

    let from_model = lines.len();
    for line in pool {
        if lines.len() >= limit {
            break;
        }
        if !lines.contains(line) {
            lines.push(line.clone());
        }
    }

    if lines.len() > from_model {
        tracing::debug!(
            from_model,
            gap_filled = lines.len() - from_model,
            "model under-delivered activities; filled from catalog"
        );
    }

    lines
}
