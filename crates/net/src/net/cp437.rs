//! IBM code page 437 text with a UTF-8 escape.
//!
//! Legacy clients only understand CP437. Text that cannot be expressed in it
//! is sent as `0xFF` followed by the UTF-8 bytes of the original string.

/// Leading byte marking the remainder of a string as UTF-8.
pub const UTF8_SENTINEL: u8 = 0xFF;

const HIGH_HALF: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

pub fn byte_to_char(byte: u8) -> char {
    if byte < 0x80 {
        byte as char
    } else {
        HIGH_HALF[(byte - 0x80) as usize]
    }
}

pub fn char_to_byte(c: char) -> Option<u8> {
    if (c as u32) < 0x80 {
        return Some(c as u8);
    }
    HIGH_HALF
        .iter()
        .position(|&mapped| mapped == c)
        .map(|index| 0x80 + index as u8)
}

/// Encodes `text` for the wire.
///
/// With `unicode` set, any character outside CP437 switches the whole string
/// to the UTF-8 escape form. Without it those characters degrade to `?`.
pub fn encode(text: &str, unicode: bool) -> Vec<u8> {
    // NBSP shares its code point with the sentinel, so it counts as unmappable.
    let out: Vec<u8> = text
        .chars()
        .map(|c| char_to_byte(c).unwrap_or(UTF8_SENTINEL))
        .collect();

    if !out.contains(&UTF8_SENTINEL) {
        return out;
    }
    if unicode {
        let mut escaped = Vec::with_capacity(text.len() + 1);
        escaped.push(UTF8_SENTINEL);
        escaped.extend_from_slice(text.as_bytes());
        escaped
    } else {
        text.chars()
            .map(|c| match char_to_byte(c) {
                Some(byte) if byte != UTF8_SENTINEL => byte,
                _ => b'?',
            })
            .collect()
    }
}

pub fn decode(bytes: &[u8]) -> String {
    match bytes.split_first() {
        Some((&UTF8_SENTINEL, rest)) => String::from_utf8_lossy(rest).into_owned(),
        _ => bytes.iter().map(|&b| byte_to_char(b)).collect(),
    }
}
