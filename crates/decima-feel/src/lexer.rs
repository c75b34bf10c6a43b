//! Tokenizer for FEEL expression text

use crate::error::FeelError;

/// A lexical token. Keywords are not distinguished here; the parser matches
/// them by name so new keywords never break existing variable references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Name(String),
    /// Unparsed digits, converted to a decimal by the parser
    Number(String),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Dot,
    DotDot,
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

/// A token with the byte offset of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Tokenize expression text. The trailing `Eof` token carries the input
/// length so "unexpected end" errors point past the last character.
pub fn lex(source: &str) -> Result<Vec<Spanned>, FeelError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let position = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let token = match c {
            '(' => {
                i += 1;
                Token::LParen
            }
            ')' => {
                i += 1;
                Token::RParen
            }
            '[' => {
                i += 1;
                Token::LBracket
            }
            ']' => {
                i += 1;
                Token::RBracket
            }
            '{' => {
                i += 1;
                Token::LBrace
            }
            '}' => {
                i += 1;
                Token::RBrace
            }
            ':' => {
                i += 1;
                Token::Colon
            }
            ',' => {
                i += 1;
                Token::Comma
            }
            '+' => {
                i += 1;
                Token::Plus
            }
            '-' => {
                i += 1;
                Token::Minus
            }
            '*' => {
                i += 1;
                Token::Star
            }
            '/' => {
                i += 1;
                Token::Slash
            }
            '=' => {
                i += 1;
                Token::Eq
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    i += 2;
                    Token::Ne
                } else {
                    return Err(FeelError::syntax(position, "expected '=' after '!'"));
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    i += 2;
                    Token::Le
                } else {
                    i += 1;
                    Token::Lt
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    i += 2;
                    Token::Ge
                } else {
                    i += 1;
                    Token::Gt
                }
            }
            '.' => {
                if chars.get(i + 1) == Some(&'.') {
                    i += 2;
                    Token::DotDot
                } else {
                    i += 1;
                    Token::Dot
                }
            }
            '"' => {
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => {
                            return Err(FeelError::syntax(position, "unterminated string literal"))
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            i += 1;
                            match chars.get(i) {
                                Some('n') => text.push('\n'),
                                Some('t') => text.push('\t'),
                                Some('"') => text.push('"'),
                                Some('\\') => text.push('\\'),
                                Some(other) => {
                                    return Err(FeelError::syntax(
                                        i,
                                        format!("unknown escape '\\{other}'"),
                                    ))
                                }
                                None => {
                                    return Err(FeelError::syntax(
                                        position,
                                        "unterminated string literal",
                                    ))
                                }
                            }
                            i += 1;
                        }
                        Some(other) => {
                            text.push(*other);
                            i += 1;
                        }
                    }
                }
                Token::Str(text)
            }
            c if c.is_ascii_digit() => {
                let mut text = String::new();
                while let Some(d) = chars.get(i) {
                    if d.is_ascii_digit() {
                        text.push(*d);
                        i += 1;
                    } else {
                        break;
                    }
                }
                // a fraction, unless the dot starts a `..` range separator
                if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())
                {
                    text.push('.');
                    i += 1;
                    while let Some(d) = chars.get(i) {
                        if d.is_ascii_digit() {
                            text.push(*d);
                            i += 1;
                        } else {
                            break;
                        }
                    }
                }
                Token::Number(text)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut text = String::new();
                while let Some(n) = chars.get(i) {
                    if n.is_alphanumeric() || *n == '_' {
                        text.push(*n);
                        i += 1;
                    } else {
                        break;
                    }
                }
                Token::Name(text)
            }
            other => {
                return Err(FeelError::syntax(
                    position,
                    format!("unexpected character '{other}'"),
                ))
            }
        };
        tokens.push(Spanned { token, position });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        position: chars.len(),
    });
    Ok(tokens)
}
