//! Tolerant HTML tokenizer.
//!
//! Produces a flat token stream from page or fragment markup. The tokenizer
//! never fails: malformed constructs degrade to text, and unterminated
//! comments or tags swallow the rest of the input.

/// A single attribute as written in a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Attribute value, `None` for boolean attributes such as `defer`.
    pub value: Option<String>,
}

impl Attribute {
    /// Create an attribute with a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into().to_ascii_lowercase(), value: Some(value.into()) }
    }
}

/// A markup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name attr="value">` or `<name />`.
    StartTag { name: String, attributes: Vec<Attribute>, self_closing: bool },
    /// `</name>`.
    EndTag { name: String },
    /// Character data, kept verbatim.
    Text(String),
    /// `<!-- ... -->` body.
    Comment(String),
    /// `<!DOCTYPE ...>` body without the leading `<!`.
    Doctype(String),
}

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Returns true if `tag` is a void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Tokenize `input` into a vector of tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer { input, pos: 0, tokens: Vec::new() };
    tokenizer.run();
    tokenizer.tokens
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn run(&mut self) {
        let mut text_start = self.pos;

        let input = self.input;
        while self.pos < input.len() {
            let rest = &input[self.pos..];
            if !rest.starts_with('<') {
                self.pos += rest.find('<').unwrap_or(rest.len());
                continue;
            }

            let markup_start = self.pos;
            let token = if rest.starts_with("<!--") {
                Some(self.comment())
            } else if rest.starts_with("<!") {
                Some(self.doctype())
            } else if rest.starts_with("</") && next_is_alpha(rest, 2) {
                Some(self.end_tag())
            } else if next_is_alpha(rest, 1) {
                Some(self.start_tag())
            } else {
                None
            };

            let Some(token) = token else {
                // A lone `<` is character data.
                self.pos += 1;
                continue;
            };

            self.flush_text(text_start, markup_start);
            let raw_text_end = match &token {
                Token::StartTag { name, self_closing: false, .. }
                    if RAW_TEXT_ELEMENTS.contains(&name.as_str()) =>
                {
                    Some(name.clone())
                }
                _ => None,
            };
            self.tokens.push(token);

            if let Some(name) = raw_text_end {
                self.raw_text(&name);
            }
            text_start = self.pos;
        }

        self.flush_text(text_start, self.input.len());
    }

    fn flush_text(&mut self, start: usize, end: usize) {
        if end > start {
            self.tokens.push(Token::Text(self.input[start..end].to_string()));
        }
    }

    fn comment(&mut self) -> Token {
        let body_start = self.pos + 4;
        match self.input[body_start..].find("-->") {
            Some(offset) => {
                self.pos = body_start + offset + 3;
                Token::Comment(self.input[body_start..body_start + offset].to_string())
            }
            None => {
                self.pos = self.input.len();
                Token::Comment(self.input[body_start..].to_string())
            }
        }
    }

    fn doctype(&mut self) -> Token {
        let body_start = self.pos + 2;
        let end = self.input[body_start..].find('>').map_or(self.input.len(), |o| body_start + o);
        self.pos = (end + 1).min(self.input.len());
        Token::Doctype(self.input[body_start..end].to_string())
    }

    fn end_tag(&mut self) -> Token {
        self.pos += 2;
        let name = self.read_name();
        let input = self.input;
        let rest = &input[self.pos..];
        self.pos += rest.find('>').map_or(rest.len(), |o| o + 1);
        Token::EndTag { name }
    }

    fn start_tag(&mut self) -> Token {
        self.pos += 1;
        let name = self.read_name();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let input = self.input;
            let rest = &input[self.pos..];
            if rest.is_empty() {
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            let attr_name = self.read_until(|c| c.is_whitespace() || matches!(c, '=' | '>' | '/'));
            if attr_name.is_empty() {
                // Stray character such as a lone `"`; skip it.
                self.pos += rest.chars().next().map_or(1, char::len_utf8);
                continue;
            }
            self.skip_whitespace();

            let value = if self.input[self.pos..].starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                Some(self.read_attribute_value())
            } else {
                None
            };
            attributes.push(Attribute { name: attr_name.to_ascii_lowercase(), value });
        }

        Token::StartTag { name, attributes, self_closing }
    }

    fn read_attribute_value(&mut self) -> String {
        let input = self.input;
        let rest = &input[self.pos..];
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &rest[1..];
                match body.find(quote) {
                    Some(end) => {
                        self.pos += end + 2;
                        body[..end].to_string()
                    }
                    None => {
                        self.pos = self.input.len();
                        body.to_string()
                    }
                }
            }
            _ => self.read_until(|c| c.is_whitespace() || c == '>').to_string(),
        }
    }

    fn raw_text(&mut self, name: &str) {
        let closing = format!("</{name}");
        let input = self.input;
        let rest = &input[self.pos..];
        let end = rest.to_ascii_lowercase().find(&closing).unwrap_or(rest.len());
        if end > 0 {
            self.tokens.push(Token::Text(rest[..end].to_string()));
        }
        self.pos += end;
    }

    fn read_name(&mut self) -> String {
        self.read_until(|c| c.is_whitespace() || matches!(c, '>' | '/')).to_ascii_lowercase()
    }

    fn read_until(&mut self, stop: impl Fn(char) -> bool) -> &'a str {
        let input = self.input;
        let rest = &input[self.pos..];
        let len = rest.find(stop).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        let input = self.input;
        let rest = &input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }
}

fn next_is_alpha(rest: &str, offset: usize) -> bool {
    rest.as_bytes().get(offset).is_some_and(u8::is_ascii_alphabetic)
}
