//! Selector parser
//!
//! Single-pass cursor over the selector text. Every failure reports the
//! byte offset where parsing stopped.

use tracing::trace;

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, Compound,
    NthExpression, PseudoClass, SelectorComponent, SelectorList, SelectorPart,
};
use crate::SelectorError;

/// Parse a selector list such as `div > a.link, [data-x]`
pub fn parse_selector(input: &str) -> Result<SelectorList, SelectorError> {
    let mut parser = Parser { input, pos: 0 };
    let list = parser.parse_list(false)?;
    trace!(selector = input, items = list.0.len(), "compiled selector");
    Ok(list)
}

type ParseResult<T> = Result<T, SelectorError>;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> SelectorError {
        SelectorError {
            selector: self.input.to_string(),
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skip whitespace; returns whether any was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn parse_list(&mut self, nested: bool) -> ParseResult<SelectorList> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None if items.is_empty() => return Err(self.error("empty selector")),
                None | Some(',') => return Err(self.error("empty selector list item")),
                Some(')') if nested => return Err(self.error("empty selector list item")),
                _ => {}
            }
            items.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                None if !nested => break,
                Some(')') if nested => break,
                None => return Err(self.error("unterminated '('")),
                Some(c) => return Err(self.error(format!("unexpected character '{c}'"))),
            }
        }
        Ok(SelectorList(items))
    }

    fn parse_combinator(&mut self) -> Option<Combinator> {
        let combinator = match self.peek()? {
            '>' => Combinator::Child,
            '+' => Combinator::NextSibling,
            '~' => Combinator::SubsequentSibling,
            _ => return None,
        };
        self.bump();
        Some(combinator)
    }

    /// Compound required after a combinator
    fn expect_compound(&mut self) -> ParseResult<Compound> {
        self.skip_whitespace();
        match self.peek() {
            Some('>' | '+' | '~') => return Err(self.error("doubled combinator")),
            None | Some(',' | ')') => return Err(self.error("dangling combinator")),
            _ => {}
        }
        match self.parse_compound()? {
            Some(compound) => Ok(compound),
            None => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(c) => self.error(format!("unexpected character '{c}'")),
            None => self.error("unexpected end of selector"),
        }
    }

    fn parse_complex(&mut self) -> ParseResult<ComplexSelector> {
        let mut parts = Vec::new();

        let leading = self.parse_combinator();
        let first = match leading {
            Some(_) => self.expect_compound()?,
            None => self.parse_compound()?.ok_or_else(|| self.unexpected())?,
        };
        parts.push(SelectorPart {
            combinator: leading.unwrap_or(Combinator::Descendant),
            compound: first,
        });

        loop {
            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',' | ')') => break,
                _ => {}
            }
            let combinator = match self.parse_combinator() {
                Some(combinator) => combinator,
                None if had_space => Combinator::Descendant,
                None => return Err(self.unexpected()),
            };
            let compound = match combinator {
                Combinator::Descendant => self.parse_compound()?.ok_or_else(|| self.unexpected())?,
                _ => self.expect_compound()?,
            };
            parts.push(SelectorPart { combinator, compound });
        }

        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> ParseResult<Option<Compound>> {
        let mut components = Vec::new();

        if self.eat('*') {
            components.push(SelectorComponent::Universal);
        } else if self.at_ident_start() {
            let name = self.parse_ident()?;
            components.push(SelectorComponent::Type(name.to_lowercase()));
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    if !self.at_ident_start() {
                        return Err(self.error("expected identifier after '#'"));
                    }
                    components.push(SelectorComponent::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.bump();
                    if !self.at_ident_start() {
                        return Err(self.error("expected identifier after '.'"));
                    }
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.bump();
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                Some(':') => {
                    self.bump();
                    if self.peek() == Some(':') {
                        return Err(self.error("pseudo-elements are not supported"));
                    }
                    components.push(SelectorComponent::PseudoClass(self.parse_pseudo_class()?));
                }
                _ => break,
            }
        }

        Ok((!components.is_empty()).then_some(Compound(components)))
    }

    fn at_ident_start(&self) -> bool {
        match self.peek() {
            Some('-') => self.peek_second().is_some_and(|c| is_ident_char(c) && !c.is_ascii_digit()),
            Some('\\') => true,
            Some(c) => c.is_alphabetic() || c == '_' || !c.is_ascii(),
            None => false,
        }
    }

    /// Identifier with backslash escapes resolved
    fn parse_ident(&mut self) -> ParseResult<String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                match self.bump() {
                    Some(escaped) => ident.push(escaped),
                    None => return Err(self.error("unterminated escape")),
                }
            } else if is_ident_char(c) {
                self.bump();
                ident.push(c);
            } else {
                break;
            }
        }
        Ok(ident)
    }

    /// Body of `[...]`, after the opening bracket
    fn parse_attribute(&mut self) -> ParseResult<AttributeSelector> {
        self.skip_whitespace();
        if !self.at_ident_start() {
            return Err(self.error("expected attribute name"));
        }
        let name = self.parse_ident()?.to_lowercase();
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(AttributeSelector { name, matcher: None, case_insensitive: false });
        }

        let op = match self.peek() {
            Some('=') => {
                self.bump();
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*' | '!')) if self.peek_second() == Some('=') => {
                self.bump();
                self.bump();
                c
            }
            None => return Err(self.error("unterminated attribute selector")),
            Some(_) => return Err(self.error("expected attribute operator")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.parse_string(quote)?
            }
            Some(_) => {
                let start = self.pos;
                while self.peek().is_some_and(|c| !c.is_whitespace() && c != ']') {
                    self.bump();
                }
                if self.pos == start {
                    return Err(self.error("expected attribute value"));
                }
                self.input[start..self.pos].to_string()
            }
            None => return Err(self.error("unterminated attribute selector")),
        };

        self.skip_whitespace();
        let mut case_insensitive = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.bump();
                case_insensitive = true;
            }
            Some('s' | 'S') => {
                self.bump();
            }
            _ => {}
        }
        self.skip_whitespace();
        if !self.eat(']') {
            return Err(match self.peek() {
                None => self.error("unterminated attribute selector"),
                Some(_) => self.error("expected ']'"),
            });
        }

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            '*' => AttributeMatcher::Substring(value),
            _ => AttributeMatcher::NotEqual(value),
        };
        Ok(AttributeSelector { name, matcher: Some(matcher), case_insensitive })
    }

    /// Quoted string body, after the opening quote
    fn parse_string(&mut self, quote: char) -> ParseResult<String> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// Raw argument text up to the matching `)`, which is consumed
    fn parse_raw_argument(&mut self) -> ParseResult<String> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated '('")),
                Some('(') => depth += 1,
                Some(')') if depth == 0 => break,
                Some(')') => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        let raw = self.input[start..self.pos].to_string();
        self.bump();
        Ok(raw)
    }

    fn expect_close_paren(&mut self) -> ParseResult<()> {
        self.skip_whitespace();
        if self.eat(')') {
            Ok(())
        } else if self.peek().is_none() {
            Err(self.error("unterminated '('"))
        } else {
            Err(self.unexpected())
        }
    }

    /// Pseudo-class after the `:`
    fn parse_pseudo_class(&mut self) -> ParseResult<PseudoClass> {
        let start = self.pos;
        if !self.at_ident_start() {
            return Err(self.error("expected pseudo-class name"));
        }
        let name = self.parse_ident()?.to_lowercase();

        if self.eat('(') {
            let pseudo = match name.as_str() {
                "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                    let arg_pos = self.pos;
                    let raw = self.parse_raw_argument()?;
                    let Some(expr) = NthExpression::parse(&raw) else {
                        self.pos = arg_pos;
                        return Err(self.error(format!("invalid An+B expression '{}'", raw.trim())));
                    };
                    match name.as_str() {
                        "nth-child" => PseudoClass::NthChild(expr),
                        "nth-last-child" => PseudoClass::NthLastChild(expr),
                        "nth-of-type" => PseudoClass::NthOfType(expr),
                        _ => PseudoClass::NthLastOfType(expr),
                    }
                }
                "contains" => {
                    self.skip_whitespace();
                    let text = match self.peek() {
                        Some(quote @ ('"' | '\'')) => {
                            self.bump();
                            let text = self.parse_string(quote)?;
                            self.expect_close_paren()?;
                            text
                        }
                        _ => self.parse_raw_argument()?.trim().to_string(),
                    };
                    PseudoClass::Contains(text)
                }
                "not" | "is" | "has" => {
                    let list = self.parse_list(true)?;
                    self.expect_close_paren()?;
                    match name.as_str() {
                        "not" => PseudoClass::Not(list),
                        "is" => PseudoClass::Is(list),
                        _ => PseudoClass::Has(list),
                    }
                }
                _ => {
                    self.pos = start;
                    return Err(self.error(format!("unknown pseudo-class ':{name}()'")));
                }
            };
            return Ok(pseudo);
        }

        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            "parent" => PseudoClass::Parent,
            "header" => PseudoClass::Header,
            "checked" => PseudoClass::Checked,
            "selected" => PseudoClass::Selected,
            "disabled" => PseudoClass::Disabled,
            "enabled" => PseudoClass::Enabled,
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type"
            | "contains" | "not" | "is" | "has" => {
                return Err(self.error(format!("missing argument for ':{name}'")));
            }
            _ => {
                self.pos = start;
                return Err(self.error(format!("unknown pseudo-class ':{name}'")));
            }
        };
        Ok(pseudo)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
