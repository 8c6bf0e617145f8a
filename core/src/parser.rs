//! Reader for the old-style ASCII property-list grammar used by
//! `project.pbxproj` files.
//!
//! Comments are discarded; the writer regenerates them from the object model.

use crate::error::PbxError;
use crate::error::Result;
use crate::value::Dict;
use crate::value::Value;

/// Deepest nesting of dictionaries and arrays accepted before giving up.
const MAX_DEPTH: usize = 128;

/// Parse a whole document. The top-level value must be a dictionary.
pub fn parse_plist(text: &str) -> Result<Dict> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    let root = match parser.peek() {
        Some('{') => parser.parse_dict()?,
        Some(c) => return Err(parser.error(format!("expected `{{` at top level, found `{c}`"))),
        None => return Err(parser.error("empty document")),
    };
    parser.skip_trivia()?;
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("trailing content starting with `{c}`")));
    }
    Ok(root)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> PbxError {
        PbxError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn expect(&mut self, wanted: char) -> Result<()> {
        self.skip_trivia()?;
        match self.peek() {
            Some(c) if c == wanted => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected `{wanted}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{wanted}`, found end of input"))),
        }
    }

    /// Skip whitespace, `/* block */` and `// line` comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(), self.peek_second()) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(PbxError::Parse {
                                    line,
                                    column,
                                    message: "unterminated comment".to_string(),
                                });
                            }
                        }
                    }
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => Ok(Value::Dict(self.parse_dict()?)),
            Some('(') => self.parse_array(),
            Some('<') => Err(self.error("binary data literals are not supported")),
            Some(_) => Ok(Value::String(self.parse_string()?)),
            None => Err(self.error("expected a value, found end of input")),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth == MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {MAX_DEPTH} levels")));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_dict(&mut self) -> Result<Dict> {
        self.expect('{')?;
        self.enter()?;
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                self.depth -= 1;
                return Ok(dict);
            }
            let (line, column) = (self.line, self.column);
            let key = self.parse_string()?;
            self.expect('=')?;
            let value = self.parse_value()?;
            self.expect(';')?;
            if dict.try_insert(key.as_str(), value).is_some() {
                return Err(PbxError::Parse {
                    line,
                    column,
                    message: format!("duplicate key `{key}`"),
                });
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.expect('(')?;
        self.enter()?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.bump();
                self.depth -= 1;
                return Ok(Value::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => {}
                Some(c) => return Err(self.error(format!("expected `,` or `)`, found `{c}`"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        self.skip_trivia()?;
        match self.peek() {
            Some('"') => self.parse_quoted(),
            Some(c) if is_unquoted_char(c) => Ok(self.parse_unquoted()),
            Some(c) => Err(self.error(format!("expected a string, found `{c}`"))),
            None => Err(self.error("expected a string, found end of input")),
        }
    }

    fn parse_unquoted(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let comment_start = c == '/' && matches!(self.peek_second(), Some('*') | Some('/'));
            if !is_unquoted_char(c) || comment_start {
                break;
            }
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn parse_quoted(&mut self) -> Result<String> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('U') => out.push(self.parse_unicode_escape()?),
                    Some(c) => out.push(c),
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(PbxError::Parse {
            line,
            column,
            message: "unterminated string".to_string(),
        })
    }

    fn parse_unicode_escape(&mut self) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid \\U escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error("invalid \\U escape"))
    }
}

fn is_unquoted_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | '(' | ')' | '=' | ';' | ',' | '"' | '<' | '>')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_structures_and_skips_comments() {
        let text = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	objects = {
		AAA /* A.swift */ = {isa = PBXFileReference; path = "A B.swift"; sourceTree = "<group>"; };
		BBB = {
			isa = PBXGroup;
			children = (
				AAA /* A.swift */,
			);
		};
	};
}
"#;
        let root = parse_plist(text).unwrap();
        assert_eq!(root.get_str("archiveVersion"), Some("1"));
        let objects = root.get_dict("objects").unwrap();
        let file = objects.get_dict("AAA").unwrap();
        assert_eq!(file.get_str("path"), Some("A B.swift"));
        assert_eq!(file.get_str("sourceTree"), Some("<group>"));
        let group = objects.get_dict("BBB").unwrap();
        assert_eq!(group.get_array("children").unwrap(), &[Value::from("AAA")]);
    }

    #[test]
    fn unquoted_paths_keep_slashes() {
        let root = parse_plist("{ path = Core/Services; }").unwrap();
        assert_eq!(root.get_str("path"), Some("Core/Services"));
    }

    #[test]
    fn quoted_escapes_are_decoded() {
        let root = parse_plist(r#"{ a = "say \"hi\"\n"; b = "\U00e9"; }"#).unwrap();
        assert_eq!(root.get_str("a"), Some("say \"hi\"\n"));
        assert_eq!(root.get_str("b"), Some("é"));
    }

    #[test]
    fn reports_position_of_errors() {
        let err = parse_plist("{\n  a = b\n}").unwrap_err();
        match err {
            PbxError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unterminated_comment() {
        assert!(matches!(
            parse_plist("{ /* open"),
            Err(PbxError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_keys_with_their_position() {
        let text = "{\n\tobjects = {\n\t\tAAA = {isa = PBXFileReference; path = One.swift; };\n\t\tAAA = {isa = PBXFileReference; path = Two.swift; };\n\t};\n}";
        match parse_plist(text).unwrap_err() {
            PbxError::Parse {
                line,
                column,
                message,
            } => {
                assert_eq!((line, column), (4, 3));
                assert_eq!(message, "duplicate key `AAA`");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn deep_nesting_is_a_parse_error() {
        let text = format!("{{ a = {}; }}", "(".repeat(100_000));
        let err = parse_plist(&text).unwrap_err();
        match err {
            PbxError::Parse { message, .. } => assert!(message.contains("nesting deeper")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let depth = MAX_DEPTH - 1;
        let text = format!("{{ a = {}{}; }}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_plist(&text).is_ok());
    }
}
