//! Tokenizer for the configuration DSL.
//!
//! Splits raw config text into words and the three punctuation tokens `{`,
//! `}` and `;`. Whitespace separates tokens and is discarded, as are `#` and
//! `//` comments running to end of line. There is no quoting or escaping.
//! Tokenizing never fails; diagnostics happen in the parser, which is why
//! every token carries its source position.

/// One token of config text with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: usize,
    pub col: usize,
}

fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | b'\x0b' | b'\x0c')
}

fn is_punct(c: u8) -> bool {
    matches!(c, b'{' | b'}' | b';')
}

/// Splits `text` into tokens. Total: any finite input terminates, and input
/// consisting only of whitespace and comments yields an empty sequence.
pub fn tokenize(text: &str) -> Vec<Token> {
    let bytes = text.as_bytes();
    let n = bytes.len();
    let mut out = Vec::new();

    let mut i = 0;
    let mut line = 1;
    let mut col = 1;

    while i < n {
        let c = bytes[i];

        if is_space(c) {
            if c == b'\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
            i += 1;
            continue;
        }

        // Both comment styles run to end of line; the newline itself is
        // handled by the whitespace branch above.
        if c == b'#' || (c == b'/' && bytes.get(i + 1) == Some(&b'/')) {
            while i < n && bytes[i] != b'\n' {
                i += 1;
                col += 1;
            }
            continue;
        }

        // Punctuation is a token of its own even when glued to a word,
        // so `root;` lexes as `root` `;`.
        if is_punct(c) {
            out.push(Token {
                text: (c as char).to_string(),
                line,
                col,
            });
            i += 1;
            col += 1;
            continue;
        }

        // Word token: a maximal run of anything else.
        let start = i;
        let start_col = col;
        while i < n && !is_space(bytes[i]) && !is_punct(bytes[i]) && bytes[i] != b'#' {
            if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'/') {
                break;
            }
            i += 1;
            col += 1;
        }
        out.push(Token {
            text: String::from_utf8_lossy(&bytes[start..i]).into_owned(),
            line,
            col: start_col,
        });
    }

    out
}
