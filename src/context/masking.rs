//! Partial redaction of sensitive field values.
//!
//! Masking happens once, when a value enters a `ContextBag`. Handlers never
//! see the original.

/// Character substituted for hidden positions.
pub const MASK_CHAR: char = '*';

/// Trailing characters of a phone number left readable.
pub const PHONE_VISIBLE: usize = 4;

/// Replace all but the last `visible` characters with `mask`.
///
/// Inputs of `visible` characters or fewer are returned unchanged. Length is
/// counted in characters, so the output has exactly as many characters as
/// the input.
pub fn mask_tail(value: &str, visible: usize, mask: char) -> String {
    let len = value.chars().count();
    if len <= visible {
        return value.to_string();
    }

    let hidden = len - visible;
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { mask } else { c })
        .collect()
}

/// Mask a phone number, keeping its last four characters.
pub fn mask_phone(phone: &str) -> String {
    mask_tail(phone, PHONE_VISIBLE, MASK_CHAR)
}
