use actions::KeyCode;

/// Key and shift state that types `c` on a US keyboard layout.
pub fn us_keystroke(c: char) -> Option<(KeyCode, bool)> {
    use KeyCode::*;

    if c.is_ascii_lowercase() {
        return letter(c).map(|k| (k, false));
    }
    if c.is_ascii_uppercase() {
        return letter(c.to_ascii_lowercase()).map(|k| (k, true));
    }

    let stroke = match c {
        '1' => (One, false),
        '2' => (Two, false),
        '3' => (Three, false),
        '4' => (Four, false),
        '5' => (Five, false),
        '6' => (Six, false),
        '7' => (Seven, false),
        '8' => (Eight, false),
        '9' => (Nine, false),
        '0' => (Zero, false),
        '!' => (One, true),
        '@' => (Two, true),
        '#' => (Three, true),
        '$' => (Four, true),
        '%' => (Five, true),
        '^' => (Six, true),
        '&' => (Seven, true),
        '*' => (Eight, true),
        '(' => (Nine, true),
        ')' => (Zero, true),
        '\n' => (Enter, false),
        '\t' => (Tab, false),
        '\u{8}' => (Backspace, false),
        '\u{1b}' => (Escape, false),
        ' ' => (Space, false),
        '-' => (Minus, false),
        '_' => (Minus, true),
        '=' => (Equals, false),
        '+' => (Equals, true),
        '[' => (LeftBracket, false),
        '{' => (LeftBracket, true),
        ']' => (RightBracket, false),
        '}' => (RightBracket, true),
        '\\' => (Backslash, false),
        '|' => (Backslash, true),
        ';' => (Semicolon, false),
        ':' => (Semicolon, true),
        '\'' => (Quote, false),
        '"' => (Quote, true),
        '`' => (GraveAccent, false),
        '~' => (GraveAccent, true),
        ',' => (Comma, false),
        '<' => (Comma, true),
        '.' => (Period, false),
        '>' => (Period, true),
        '/' => (ForwardSlash, false),
        '?' => (ForwardSlash, true),
        _ => return None,
    };
    Some(stroke)
}

fn letter(c: char) -> Option<KeyCode> {
    let offset = (c as u8).checked_sub(b'a')?;
    KeyCode::ALL
        .iter()
        .copied()
        .find(|k| k.usage() == KeyCode::A.usage() + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_case() {
        assert_eq!(us_keystroke('a'), Some((KeyCode::A, false)));
        assert_eq!(us_keystroke('Z'), Some((KeyCode::Z, true)));
    }

    #[test]
    fn shifted_symbols() {
        assert_eq!(us_keystroke('?'), Some((KeyCode::ForwardSlash, true)));
        assert_eq!(us_keystroke('"'), Some((KeyCode::Quote, true)));
        assert_eq!(us_keystroke('\n'), Some((KeyCode::Enter, false)));
    }

    #[test]
    fn non_ascii_is_untypeable() {
        assert_eq!(us_keystroke('é'), None);
        assert_eq!(us_keystroke('€'), None);
    }
}
