// Canonical column names for question-bank CSV files.
//
// Files arrive with inconsistent header casing, stray whitespace, a UTF-8
// BOM glued to the first column, and a couple of legacy spellings. Every
// downstream stage works on the canonical names only.

pub const FIELD_SUBJECT: &str = "subject";
pub const FIELD_CHAPTER: &str = "chapter";
pub const FIELD_QUESTION_TYPE: &str = "questiontype";
pub const FIELD_QUESTION: &str = "question";
pub const FIELD_ANSWER: &str = "answer";
pub const FIELD_EXPLANATION: &str = "explanation";

pub const OPTION_FIELDS: [&str; 6] = [
    "option_1", "option_2", "option_3", "option_4", "option_5", "option_6",
];

// NOTE:
// - Aliases are matched against the already-normalized header (BOM stripped,
//   trimmed, lowercased, whitespace runs -> single underscore).
// - Matching is exact; partial matches would silently swallow unknown columns.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("type", FIELD_QUESTION_TYPE),
    ("answers", FIELD_ANSWER),
    ("subject_id", FIELD_SUBJECT),
];

/// Canonicalize one raw header cell.
pub fn canonical_header(raw: &str) -> String {
    let normalized = normalize_header(raw);
    for (alias, canonical) in HEADER_ALIASES {
        if normalized == *alias {
            return (*canonical).to_string();
        }
    }
    normalized
}

/// Normalization without alias resolution. Row assembly compares this
/// against the canonical name to tell direct columns from legacy ones.
pub(super) fn normalize_header(raw: &str) -> String {
    let stripped = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    stripped
        .trim()
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}
