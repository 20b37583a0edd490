//! Tokenizer for the expression grammar.

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Equals,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(value) => crate::format::format_number(*value),
            TokenKind::Ident(name) => name.clone(),
            TokenKind::Plus => "+".to_string(),
            TokenKind::Minus => "-".to_string(),
            TokenKind::Star => "*".to_string(),
            TokenKind::Slash => "/".to_string(),
            TokenKind::Caret => "^".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::Equals => "=".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub offset: usize,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch.is_ascii_digit() || ch == '.' {
            let mut literal = String::new();
            let mut seen_dot = false;
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() {
                    literal.push(c);
                } else if c == '.' && !seen_dot {
                    seen_dot = true;
                    literal.push(c);
                } else {
                    break;
                }
                chars.next();
            }
            if literal == "." {
                return Err(ParseError::UnexpectedChar { ch: '.', offset });
            }
            let value = literal
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber {
                    literal: literal.clone(),
                })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                offset,
            });
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let mut name = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                kind: TokenKind::Ident(name),
                offset,
            });
            continue;
        }

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '=' => TokenKind::Equals,
            other => return Err(ParseError::UnexpectedChar { ch: other, offset }),
        };
        chars.next();
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn numbers_accept_leading_and_trailing_dot() {
        assert_eq!(
            kinds(".5 + 5."),
            vec![
                TokenKind::Number(0.5),
                TokenKind::Plus,
                TokenKind::Number(5.0)
            ]
        );
    }

    #[test]
    fn second_dot_starts_a_new_number() {
        assert_eq!(
            kinds("1.2.3"),
            vec![TokenKind::Number(1.2), TokenKind::Number(0.3)]
        );
    }

    #[test]
    fn identifiers_may_contain_digits_and_underscores() {
        assert_eq!(
            kinds("side_1*2"),
            vec![
                TokenKind::Ident("side_1".to_string()),
                TokenKind::Star,
                TokenKind::Number(2.0)
            ]
        );
    }

    #[test]
    fn unknown_character_reports_offset() {
        let err = tokenize("2 $ 3").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedChar { ch: '$', offset: 2 });
    }
}
