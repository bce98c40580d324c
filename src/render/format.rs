/// Header display text for organizations and programs.
pub(super) fn upper(text: &str) -> String {
    text.to_uppercase()
}

/// Title case: a cased letter following an uncased character is upper-cased,
/// the rest lowered. Uncased letters (CJK, digits) start a new word.
pub(super) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;
    for ch in text.chars() {
        if ch.is_lowercase() || ch.is_uppercase() {
            if prev_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(ch);
            prev_cased = false;
        }
    }
    out
}
