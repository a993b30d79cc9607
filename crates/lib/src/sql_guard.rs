//! # Read-Only Statement Gate
//!
//! Generated SQL is only executed if it is a single read-only statement. The
//! check scans the text once, skipping string literals, quoted identifiers, and
//! comments, then applies three rules:
//!
//! 1. The first keyword is `SELECT` or `WITH`.
//! 2. Nothing but whitespace or comments follows the first top-level `;`.
//! 3. No data-modifying or administrative keyword appears as a bare word.
//!    `REPLACE` counts only as a statement verb; followed by `(` it is the
//!    scalar function.
//!
//! This is a conservative allowlist, not a full parser. It can reject valid
//! read-only SQL that uses one of the blocked words as a bare identifier.

/// Statement keywords a generated query may start with.
pub const READ_ONLY_KEYWORDS: &[&str] = &["SELECT", "WITH"];

/// Words that never appear in an accepted query outside literals and comments.
pub const BLOCKED_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "ATTACH", "DETACH", "PRAGMA",
    "VACUUM", "REINDEX", "TRUNCATE", "GRANT", "REVOKE",
];

/// Words blocked as statement verbs but allowed as function calls.
pub const BLOCKED_UNLESS_CALLED: &[&str] = &["REPLACE"];

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Semicolon,
    OpenParen,
    Other,
}

/// Splits `sql` into bare words, top-level semicolons, and everything else.
fn scan(sql: &str) -> Vec<Token> {
    let chars: Vec<char> = sql.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            '\'' | '"' | '`' => {
                // Doubled quotes escape themselves inside a quoted run.
                let quote = c;
                i += 1;
                loop {
                    match chars.get(i) {
                        None => break,
                        Some(&q) if q == quote && chars.get(i + 1) == Some(&quote) => i += 2,
                        Some(&q) if q == quote => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                tokens.push(Token::Other);
            }
            '[' => {
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                i += 1;
                tokens.push(Token::Other);
            }
            ';' => {
                tokens.push(Token::Semicolon);
                i += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen);
                i += 1;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(Token::Word(word.to_uppercase()));
            }
            _ => {
                tokens.push(Token::Other);
                i += 1;
            }
        }
    }
    tokens
}

/// Checks that `sql` is a single read-only statement.
///
/// Returns the reason for rejection on failure.
pub fn check_read_only(sql: &str) -> Result<(), String> {
    let tokens = scan(sql);

    let first = tokens.iter().find_map(|t| match t {
        Token::Word(w) => Some(w.as_str()),
        _ => None,
    });
    match first {
        None => return Err("query contains no statement".to_string()),
        Some(w) if !READ_ONLY_KEYWORDS.contains(&w) => {
            return Err(format!(
                "query must start with a read-only keyword ({}), found '{w}'",
                READ_ONLY_KEYWORDS.join(" or ")
            ))
        }
        Some(_) => {}
    }

    if let Some(pos) = tokens.iter().position(|t| *t == Token::Semicolon) {
        if tokens[pos + 1..].iter().any(|t| *t != Token::Semicolon) {
            return Err("query contains more than one statement".to_string());
        }
    }

    let blocked = tokens.iter().enumerate().find_map(|(i, t)| match t {
        Token::Word(w) if BLOCKED_KEYWORDS.contains(&w.as_str()) => Some(w),
        Token::Word(w)
            if BLOCKED_UNLESS_CALLED.contains(&w.as_str())
                && tokens.get(i + 1) != Some(&Token::OpenParen) =>
        {
            Some(w)
        }
        _ => None,
    });
    if let Some(word) = blocked {
        return Err(format!("query contains the non-read-only keyword '{word}'"));
    }

    Ok(())
}
