//! The `Text` class.
//!
//! Positions and lengths count characters, not bytes, and positions start
//! at 1.

use crate::error::{RuntimeError, RuntimeResult};

pub fn append(text1: &str, text2: &str) -> String {
    let mut out = String::with_capacity(text1.len() + text2.len());
    out.push_str(text1);
    out.push_str(text2);
    out
}

pub fn get_length(text: &str) -> usize {
    text.chars().count()
}

pub fn is_sub_text(text: &str, sub_text: &str) -> bool {
    text.contains(sub_text)
}

pub fn ends_with(text: &str, sub_text: &str) -> bool {
    text.ends_with(sub_text)
}

pub fn starts_with(text: &str, sub_text: &str) -> bool {
    text.starts_with(sub_text)
}

/// `length` characters starting at the 1-based position `start`
pub fn get_sub_text(text: &str, start: i64, length: i64) -> RuntimeResult<String> {
    let total = get_length(text) as i64;
    let end = start.checked_sub(1).and_then(|skip| skip.checked_add(length));
    if start < 1 || length < 0 || end.is_none_or(|end| end > total) {
        return Err(RuntimeError::invalid_argument(format!(
            "sub text at {start} of length {length} is outside a text of length {total}"
        )));
    }
    Ok(text
        .chars()
        .skip((start - 1) as usize)
        .take(length as usize)
        .collect())
}

/// Everything from the 1-based position `start` onward
pub fn get_sub_text_to_end(text: &str, start: i64) -> RuntimeResult<String> {
    let total = get_length(text) as i64;
    if start < 1 || start > total + 1 {
        return Err(RuntimeError::invalid_argument(format!(
            "start {start} is outside a text of length {total}"
        )));
    }
    Ok(text.chars().skip((start - 1) as usize).collect())
}

/// 1-based character position of the first occurrence, or 0 when absent
pub fn get_index_of(text: &str, sub_text: &str) -> usize {
    match text.find(sub_text) {
        Some(byte_index) => text[..byte_index].chars().count() + 1,
        None => 0,
    }
}

pub fn convert_to_lower_case(text: &str) -> String {
    text.to_lowercase()
}

pub fn convert_to_upper_case(text: &str) -> String {
    text.to_uppercase()
}

/// The character whose Unicode code point is `code`
pub fn get_character(code: i64) -> RuntimeResult<String> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| RuntimeError::invalid_argument(format!("{code} is not a character code")))
}

/// Code point of the first character of `text`
pub fn get_character_code(text: &str) -> RuntimeResult<u32> {
    text.chars()
        .next()
        .map(u32::from)
        .ok_or_else(|| RuntimeError::invalid_argument("text is empty"))
}
