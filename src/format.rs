//! Text normalization for the signature block.
//!
//! Every function here is pure: raw field values in, display strings out.
//! None of them fail; partial or odd input degrades to a placeholder or an
//! empty string and the caller decides what to show.

/// Shown in place of the name while the field is empty.
pub const NAME_PLACEHOLDER: &str = "Nome Completo";

/// Connective particles dropped from display names.
const NAME_PARTICLES: [&str; 4] = ["da", "do", "das", "dos"];

/// Words kept lowercase by [`capitalize_words`] unless they open the string.
const MINOR_WORDS: [&str; 15] = [
    "e", "de", "do", "da", "dos", "das", "em", "no", "na", "nos", "nas", "com", "por", "a", "o",
];

/// Brazilian numbers carry at most 11 digits (DDD + 9-digit mobile).
const MAX_PHONE_DIGITS: usize = 11;

/// Format a full name for display.
///
/// Particles (`da`, `do`, `das`, `dos`) are dropped, every remaining token is
/// title-cased and, when more than two remain, interior tokens collapse to
/// their initial:
///
/// ```
/// use sigblock::format::format_display_name;
///
/// assert_eq!(format_display_name("maria da silva santos"), "Maria S. Santos");
/// assert_eq!(format_display_name("joão silva"), "João Silva");
/// assert_eq!(format_display_name("   "), "Nome Completo");
/// ```
pub fn format_display_name(raw: &str) -> String {
    let words: Vec<String> = raw
        .split_whitespace()
        .filter(|w| !NAME_PARTICLES.contains(&w.to_lowercase().as_str()))
        .map(title_case)
        .collect();

    match words.as_slice() {
        [] => NAME_PLACEHOLDER.to_string(),
        [first, middle @ .., last] if !middle.is_empty() => {
            let mut out = String::from(first.as_str());
            for w in middle {
                if let Some(c) = w.chars().next() {
                    out.push(' ');
                    out.push(c);
                    out.push('.');
                }
            }
            out.push(' ');
            out.push_str(last);
            out
        }
        _ => words.join(" "),
    }
}

/// Up to two uppercase initials taken from space-separated tokens.
///
/// Tokens are split on single spaces, so runs of spaces yield empty tokens
/// that contribute nothing. Empty input gives an empty string; callers supply
/// their own fallback glyph.
pub fn initials(raw: &str) -> String {
    raw.split(' ')
        .filter_map(|token| token.chars().next())
        .collect::<String>()
        .to_uppercase()
        .chars()
        .take(2)
        .collect()
}

/// Mask a Brazilian phone number.
///
/// Non-digits are stripped and the result is capped at 11 digits. Up to ten
/// digits format as a landline `(DD) DDDD-DDDD`, eleven as a mobile
/// `(DD) DDDDD-DDDD`. Partial input formats as far as it goes so the mask can
/// be applied on every keystroke, and reformatting a formatted value is a
/// no-op.
///
/// ```
/// use sigblock::format::format_phone;
///
/// assert_eq!(format_phone("11999998888"), "(11) 99999-8888");
/// assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
/// assert_eq!(format_phone("(11) 3333-4"), "(11) 3333-4");
/// ```
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_PHONE_DIGITS)
        .collect();

    // ASCII digits only, so byte slicing is on char boundaries.
    let len = digits.len();
    let local_split = if len > 10 { 7 } else { 6 };
    match len {
        0 => String::new(),
        1..=2 => format!("({}", digits),
        3..=6 => format!("({}) {}", &digits[..2], &digits[2..]),
        _ => format!(
            "({}) {}-{}",
            &digits[..2],
            &digits[2..local_split],
            &digits[local_split..]
        ),
    }
}

/// Capitalize a role or job title, keeping Portuguese minor words lowercase.
///
/// ```
/// use sigblock::format::capitalize_words;
///
/// assert_eq!(capitalize_words("secretaria de educação"), "Secretaria de Educação");
/// assert_eq!(capitalize_words("DE OLHO NA CIDADE"), "De Olho na Cidade");
/// ```
pub fn capitalize_words(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            if i > 0 && MINOR_WORDS.contains(&word) {
                word.to_string()
            } else {
                upper_first(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    upper_first(&word.to_lowercase())
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_placeholder_for_blank_input() {
        assert_eq!(format_display_name(""), "Nome Completo");
        assert_eq!(format_display_name(" \t "), "Nome Completo");
        assert_eq!(format_display_name("da dos"), "Nome Completo");
    }

    #[test]
    fn display_name_drops_particles_and_abbreviates() {
        assert_eq!(format_display_name("maria da silva santos"), "Maria S. Santos");
        assert_eq!(format_display_name("A B C D"), "A B. C. D");
        assert_eq!(
            format_display_name("  JOSÉ   DOS  santos   de OLIVEIRA "),
            "José S. D. Oliveira"
        );
    }

    #[test]
    fn display_name_keeps_two_tokens_whole() {
        assert_eq!(format_display_name("joão silva"), "João Silva");
        assert_eq!(format_display_name("ana DA costa"), "Ana Costa");
        assert_eq!(format_display_name("madonna"), "Madonna");
    }

    #[test]
    fn initials_take_two_uppercase_letters() {
        assert_eq!(initials("Ana Paula"), "AP");
        assert_eq!(initials("ana paula souza"), "AP");
        assert_eq!(initials("élida"), "É");
        assert_eq!(initials("a  b"), "AB");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn phone_formats_landline_and_mobile() {
        assert_eq!(format_phone("11999998888"), "(11) 99999-8888");
        assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
        assert_eq!(format_phone("+55 (21) 2688-1234"), "(55) 21268-8123");
        assert_eq!(format_phone("119999988887777"), "(11) 99999-8888");
    }

    #[test]
    fn phone_formats_partial_input() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("abc"), "");
        assert_eq!(format_phone("1"), "(1");
        assert_eq!(format_phone("11"), "(11");
        assert_eq!(format_phone("113"), "(11) 3");
        assert_eq!(format_phone("113333"), "(11) 3333");
        assert_eq!(format_phone("1133334"), "(11) 3333-4");
    }

    #[test]
    fn phone_is_idempotent() {
        let mut digits = String::new();
        for d in "119876543210".chars() {
            digits.push(d);
            let once = format_phone(&digits);
            assert_eq!(format_phone(&once), once, "input {}", digits);
        }
    }

    #[test]
    fn capitalize_keeps_minor_words_lowercase() {
        assert_eq!(capitalize_words("secretaria de educação"), "Secretaria de Educação");
        assert_eq!(capitalize_words("de olho"), "De Olho");
        assert_eq!(capitalize_words("  ASSESSOR   DA   COMUNICAÇÃO "), "Assessor da Comunicação");
        assert_eq!(capitalize_words("chefe e coordenador"), "Chefe e Coordenador");
        assert_eq!(capitalize_words(""), "");
    }
}
