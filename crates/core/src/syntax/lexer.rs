use super::ast::{IntLiteral, IntSuffix, LongWidth};
use super::{SyntaxError, SyntaxResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Int(IntLiteral),
    /// Verbatim float spelling including any `f`/`l` suffix.
    Float(String),
    /// Verbatim character literal including quotes.
    Char(String),
    /// Verbatim string literal including quotes.
    Str(String),
    Punct(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Longest spellings first so `<<=` wins over `<<` and `<`.
const PUNCTUATORS: &[&str] = &[
    "<<=", ">>=", "...", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "+", "-", "*", "/", "%", "&", "|", "^", "~", "!",
    "<", ">", "=", "?", ":", ";", ",", ".", "(", ")", "{", "}", "[", "]",
];

/// Split a C body into tokens, dropping whitespace and comments.
pub fn tokenize(source: &str) -> SyntaxResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if source[pos..].starts_with("//") {
            pos = source[pos..].find('\n').map(|n| pos + n + 1).unwrap_or(bytes.len());
            continue;
        }

        if source[pos..].starts_with("/*") {
            let end = source[pos + 2..]
                .find("*/")
                .ok_or_else(|| SyntaxError::new("unterminated block comment", pos))?;
            pos += 2 + end + 2;
            continue;
        }

        if c == b'#' {
            return Err(SyntaxError::new("preprocessor directive inside body", pos));
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            let start = pos;
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(source[start..pos].to_string()),
                offset: start,
            });
            continue;
        }

        if c.is_ascii_digit()
            || (c == b'.' && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit()))
        {
            let (kind, end) = lex_number(source, pos)?;
            tokens.push(Token { kind, offset: pos });
            pos = end;
            continue;
        }

        if c == b'\'' || c == b'"' {
            let end = quoted_end(bytes, pos)?;
            let text = source[pos..end].to_string();
            let kind = if c == b'\'' { TokenKind::Char(text) } else { TokenKind::Str(text) };
            tokens.push(Token { kind, offset: pos });
            pos = end;
            continue;
        }

        match PUNCTUATORS.iter().find(|p| source[pos..].starts_with(**p)) {
            Some(p) => {
                tokens.push(Token { kind: TokenKind::Punct(p), offset: pos });
                pos += p.len();
            }
            None => {
                let ch = source[pos..].chars().next().unwrap_or('?');
                return Err(SyntaxError::new(format!("unexpected character '{ch}'"), pos));
            }
        }
    }

    Ok(tokens)
}

fn quoted_end(bytes: &[u8], start: usize) -> SyntaxResult<usize> {
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\n' => break,
            b if b == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(SyntaxError::new("unterminated literal", start))
}

fn lex_number(source: &str, start: usize) -> SyntaxResult<(TokenKind, usize)> {
    let bytes = source.as_bytes();
    let is_hex = source[start..].starts_with("0x") || source[start..].starts_with("0X");
    let mut pos = start;

    while pos < bytes.len() {
        let b = bytes[pos];
        let exponent = if is_hex { matches!(b, b'p' | b'P') } else { matches!(b, b'e' | b'E') };
        if exponent && matches!(bytes.get(pos + 1), Some(b'+') | Some(b'-')) {
            pos += 2;
        } else if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' {
            pos += 1;
        } else {
            break;
        }
    }

    let text = &source[start..pos];
    let lower = text.to_ascii_lowercase();
    let is_float = if is_hex {
        lower.contains('.') || lower.contains('p')
    } else {
        lower.contains('.') || lower.contains('e')
    };

    if is_float {
        return Ok((TokenKind::Float(text.to_string()), pos));
    }

    let digits_end = text.trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L')).len();
    let (digits, suffix_text) = text.split_at(digits_end);
    let suffix = parse_int_suffix(suffix_text)
        .ok_or_else(|| SyntaxError::new(format!("invalid integer suffix '{suffix_text}'"), start))?;

    let digit_ok = |c: char| if is_hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() };
    let body = if is_hex { &digits[2..] } else { digits };
    let bad_octal = !is_hex && body.starts_with('0') && body.contains(['8', '9']);
    if body.is_empty() || !body.chars().all(digit_ok) || bad_octal {
        return Err(SyntaxError::new(format!("malformed integer literal '{text}'"), start));
    }

    Ok((TokenKind::Int(IntLiteral { digits: digits.to_string(), suffix }), pos))
}

fn parse_int_suffix(text: &str) -> Option<IntSuffix> {
    let lower = text.to_ascii_lowercase();
    let unsigned = lower.contains('u');
    let rest: String = lower.chars().filter(|c| *c != 'u').collect();
    if lower.matches('u').count() > 1 {
        return None;
    }
    let long = match rest.as_str() {
        "" => LongWidth::None,
        "l" => LongWidth::Long,
        "ll" => LongWidth::LongLong,
        _ => return None,
    };
    // `lul` style splits are not valid C.
    if unsigned && !(lower.starts_with('u') || lower.ends_with('u')) {
        return None;
    }
    Some(IntSuffix { unsigned, long })
}
