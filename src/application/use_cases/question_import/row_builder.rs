use std::collections::BTreeMap;

use super::types::RejectReason;
use crate::domain::csv::{
    CsvRow, FIELD_ANSWER, FIELD_CHAPTER, FIELD_EXPLANATION, FIELD_QUESTION, FIELD_QUESTION_TYPE,
    FIELD_SUBJECT, OPTION_FIELDS,
};
use crate::domain::quiz::{Answer, Question, QuestionType};

/// Subject id used when a row has no subject column: the file label up to the
/// first underscore, uppercased. "physics_2024_mid" labels rows as PHYSICS.
pub(super) fn fallback_subject(label: &str) -> String {
    label.split('_').next().unwrap_or(label).to_uppercase()
}

/// Gather option_1..option_6 into a sparse 0-based map. A blank option_2
/// leaves key 1 absent; later options keep their own keys and are never
/// shifted down to fill the gap.
pub(super) fn collect_options(row: &CsvRow) -> BTreeMap<u8, String> {
    let mut options = BTreeMap::new();
    for (index, field) in OPTION_FIELDS.iter().enumerate() {
        if let Some(value) = row.get(field) {
            let value = value.trim();
            if !value.is_empty() {
                options.insert(index as u8, value.to_string());
            }
        }
    }
    options
}

/// Turn the raw answer cell into the stored representation.
///
/// FIB keeps the raw trimmed text as a single-element list. Choice types
/// split on commas and convert each 1-based ordinal to a 0-based index; any
/// token that is not a base-10 integer rejects the whole row.
pub(super) fn encode_answer(
    question_type: QuestionType,
    raw: &str,
) -> std::result::Result<Answer, RejectReason> {
    if question_type == QuestionType::Fib {
        return Ok(Answer::Text(vec![raw.trim().to_string()]));
    }

    let mut choices = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        let ordinal: i64 = token
            .parse()
            .map_err(|_| RejectReason::UnparsableAnswer(token.to_string()))?;
        let index = ordinal
            .checked_sub(1)
            .ok_or_else(|| RejectReason::UnparsableAnswer(token.to_string()))?;
        choices.push(index);
    }
    Ok(Answer::Choices(choices))
}

/// Build one question from a normalized row, or say why it cannot be built.
/// `question_id` is the id the row will get if accepted; the caller only
/// advances its counter when this returns Ok.
pub(super) fn build_question(
    row: &CsvRow,
    label: &str,
    question_id: i64,
) -> std::result::Result<Question, RejectReason> {
    let subject = match field(row, FIELD_SUBJECT) {
        Some(value) => value.to_string(),
        None => fallback_subject(label),
    };
    let chapter = field(row, FIELD_CHAPTER);
    let question_text = field(row, FIELD_QUESTION);

    let mut missing = Vec::new();
    if subject.is_empty() {
        missing.push(FIELD_SUBJECT.to_string());
    }
    if chapter.is_none() {
        missing.push(FIELD_CHAPTER.to_string());
    }
    if question_text.is_none() {
        missing.push(FIELD_QUESTION.to_string());
    }
    if !missing.is_empty() {
        return Err(RejectReason::MissingFields(missing));
    }

    let question_type = match field(row, FIELD_QUESTION_TYPE) {
        Some(raw) => QuestionType::parse(raw)
            .ok_or_else(|| RejectReason::UnknownQuestionType(raw.to_string()))?,
        None => QuestionType::Mcq,
    };

    let options = collect_options(row);
    // A missing answer cell means "first option": the raw value defaults to
    // "1" before encoding, same as the questiontype default above.
    let answer = encode_answer(question_type, field(row, FIELD_ANSWER).unwrap_or("1"))?;

    Ok(Question {
        subject_id: subject,
        question_id,
        chapter: chapter.unwrap_or_default().to_string(),
        question_type,
        question_text: question_text.unwrap_or_default().to_string(),
        options,
        answer,
        explanation: field(row, FIELD_EXPLANATION).unwrap_or_default().to_string(),
    })
}

/// Trimmed, non-blank field lookup.
fn field<'a>(row: &'a CsvRow, canonical_name: &str) -> Option<&'a str> {
    row.get(canonical_name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
