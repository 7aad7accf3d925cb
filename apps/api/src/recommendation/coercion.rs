//! Field Coercion: normalizes the multi-valued "test type" field.
//!
//! Catalog cells arrive as delimited text, list literals (`['A']`), quoted
//! scalars, or already-structured JSON arrays. `coerce_test_type` maps every
//! shape to a list of non-empty trimmed strings and never fails.
//!
//! Priority:
//! 1. JSON array → stringify and trim each element, drop empties.
//! 2. Anything that is not a non-blank string → empty list.
//! 3. Contains `,` `;` or `|` → split on the first of those (in that order)
//!    yielding at least one non-empty part.
//! 4. Parses as a literal → list elementwise as (1), scalar as a singleton.
//! 5. Otherwise the trimmed string as a singleton.

use serde_json::Value;

const DELIMITERS: [char; 3] = [',', ';', '|'];

pub fn coerce_test_type(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => clean(items.iter().map(value_text)),
        Value::String(s) => coerce_text(s),
        _ => Vec::new(),
    }
}

fn coerce_text(raw: &str) -> Vec<String> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return Vec::new();
    }

    for delimiter in DELIMITERS {
        if cleaned.contains(delimiter) {
            let parts = clean(cleaned.split(delimiter).map(String::from));
            if !parts.is_empty() {
                return parts;
            }
        }
    }

    match parse_literal(cleaned) {
        Some(Literal::Seq(items)) => clean(items.into_iter().map(|s| s.into_text())),
        Some(Literal::Scalar(scalar)) => clean(std::iter::once(scalar.into_text())),
        None => vec![cleaned.to_string()],
    }
}

fn clean(items: impl Iterator<Item = String>) -> Vec<String> {
    items
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Literal parsing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Only accepted inside a sequence; a bare `None` is not a usable value.
    None,
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => float_text(f),
            Scalar::Bool(true) => "True".to_string(),
            Scalar::Bool(false) => "False".to_string(),
            Scalar::None => "None".to_string(),
        }
    }
}

/// Shortest round-trip form with a fractional part or a signed two-digit
/// exponent: `3.0`, `100000.0`, `1e+16`, `1e-05`.
fn float_text(f: f64) -> String {
    let text = format!("{f:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

#[derive(Debug, PartialEq)]
enum Literal {
    Seq(Vec<Scalar>),
    Scalar(Scalar),
}

/// Parses a list/tuple of scalars or a single scalar. Nested sequences, a bare
/// `None`, and trailing garbage are rejected.
fn parse_literal(text: &str) -> Option<Literal> {
    let mut parser = LiteralParser {
        chars: text.chars().collect(),
        pos: 0,
    };
    let literal = parser.literal()?;
    parser.skip_ws();
    if parser.pos == parser.chars.len() {
        Some(literal)
    } else {
        None
    }
}

fn top_level_scalar(scalar: Scalar) -> Option<Literal> {
    match scalar {
        Scalar::None => None,
        other => Some(Literal::Scalar(other)),
    }
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn literal(&mut self) -> Option<Literal> {
        self.skip_ws();
        match self.peek()? {
            '[' => self.sequence(']').map(|(items, _)| Literal::Seq(items)),
            '(' => {
                // `(x)` is just x; `(x,)` and `()` are tuples.
                let (mut items, trailing_comma) = self.sequence(')')?;
                if items.len() == 1 && !trailing_comma {
                    items.pop().and_then(top_level_scalar)
                } else {
                    Some(Literal::Seq(items))
                }
            }
            _ => self.scalar().and_then(top_level_scalar),
        }
    }

    /// Parses `<open> scalar (, scalar)* ,? <close>`; returns items and whether
    /// the last item was followed by a comma.
    fn sequence(&mut self, close: char) -> Option<(Vec<Scalar>, bool)> {
        self.pos += 1;
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek()? == close {
                self.pos += 1;
                return Some((items, trailing_comma));
            }
            if !items.is_empty() && !trailing_comma {
                return None;
            }
            items.push(self.scalar()?);
            self.skip_ws();
            trailing_comma = self.peek() == Some(',');
            if trailing_comma {
                self.pos += 1;
            }
        }
    }

    fn scalar(&mut self) -> Option<Scalar> {
        self.skip_ws();
        match self.peek()? {
            quote @ ('\'' | '"') => self.quoted(quote).map(Scalar::Str),
            _ => self.bare(),
        }
    }

    fn quoted(&mut self, quote: char) -> Option<String> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let c = self.peek()?;
            self.pos += 1;
            match c {
                '\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    fn bare(&mut self) -> Option<Scalar> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'))
        {
            self.pos += 1;
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        let unsigned = token.trim_start_matches(['+', '-']);
        let is_integer = !unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit());
        match token.as_str() {
            "" => None,
            "True" => Some(Scalar::Bool(true)),
            "False" => Some(Scalar::Bool(false)),
            "None" => Some(Scalar::None),
            // Leading zeros are not integer literals; out-of-range integers keep their text.
            _ if is_integer && unsigned.len() > 1 && unsigned.starts_with('0') => None,
            _ if is_integer => token.parse::<i64>().ok().map(Scalar::Int),
            _ => {
                if token.chars().any(|c| c.is_ascii_digit())
                    && !token.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
                {
                    token.parse::<f64>().ok().map(Scalar::Float)
                } else {
                    None
                }
            }
        }
    }
}
