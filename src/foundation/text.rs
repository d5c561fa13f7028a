use crate::foundation::error::{ShoutError, ShoutResult};

/// Normalize user-supplied text before rendering.
///
/// `+` and `_` act as word separators (they are what URL paths carry in place of spaces).
/// Control characters are dropped, whitespace runs collapse to a single space and explicit
/// `\n` line breaks survive. The result may be empty; length is counted in characters after
/// cleaning.
pub fn clean_text(input: &str, max_len: usize) -> ShoutResult<String> {
    let mut lines = Vec::new();
    for raw_line in input.split('\n') {
        let mut line = String::with_capacity(raw_line.len());
        let mut pending_space = false;
        for c in raw_line.chars() {
            let c = if c == '+' || c == '_' { ' ' } else { c };
            if c.is_whitespace() {
                pending_space = !line.is_empty();
                continue;
            }
            if c.is_control() {
                continue;
            }
            if pending_space {
                line.push(' ');
                pending_space = false;
            }
            line.push(c);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }

    let out = lines.join("\n");
    let len = out.chars().count();
    if len > max_len {
        return Err(ShoutError::invalid_option(format!(
            "text must be at most {max_len} characters, got {len}"
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_become_spaces() {
        assert_eq!(clean_text("HELLO+WORLD", 100).unwrap(), "HELLO WORLD");
        assert_eq!(clean_text("HELLO_WORLD", 100).unwrap(), "HELLO WORLD");
    }

    #[test]
    fn whitespace_collapses_and_trims() {
        assert_eq!(clean_text("  a \t  b  ", 100).unwrap(), "a b");
        assert_eq!(clean_text("   ", 100).unwrap(), "");
    }

    #[test]
    fn control_chars_are_dropped() {
        assert_eq!(clean_text("a\x1b[31mb\x07", 100).unwrap(), "a[31mb");
    }

    #[test]
    fn newlines_are_kept_between_non_empty_lines() {
        assert_eq!(clean_text("one\n\n two \n", 100).unwrap(), "one\ntwo");
    }

    #[test]
    fn overlong_text_is_invalid() {
        assert!(clean_text("abcd", 4).is_ok());
        assert!(matches!(
            clean_text("abcde", 4),
            Err(ShoutError::InvalidOption(_))
        ));
    }
}
