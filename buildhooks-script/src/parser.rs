//! Line-oriented parser for `.hooks` scripts.
//!
//! ```text
//! # comment
//! println "text"
//! fail "message"
//! on <phase> {          closure-style listener
//! action <phase> {      action-object listener
//! listener {            multi-phase listener object
//!   <phase> { ... }
//! }
//! ```
//!
//! One statement per physical line; lines are numbered from 1. Blocks may
//! only contain `println` / `fail`. Phase names are kept as written and
//! checked at registration time.

use std::rc::Rc;

use crate::error::ScriptError;

// ---------------------------------------------------------------------------
// AST
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Println(String),
    Fail(String),
}

/// An executable statement and the line it sits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: u32,
    pub command: Command,
}

/// A listener body, shared between the parsed script and its callbacks.
pub type Body = Rc<[Step]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub line: u32,
    pub phase: String,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Run(Step),
    On { line: u32, phase: String, body: Body },
    Action { line: u32, phase: String, body: Body },
    Listener { line: u32, methods: Vec<Method> },
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parses `text`; `script` names the file in error messages.
pub fn parse(script: &str, text: &str) -> Result<Vec<Statement>, ScriptError> {
    Parser::new(script, text).statements()
}

struct Parser<'a> {
    script: &'a str,
    lines: Vec<(u32, &'a str)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(script: &'a str, text: &'a str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i as u32 + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
            .collect();
        Self { script, lines, pos: 0 }
    }

    fn error(&self, line: u32, message: impl Into<String>) -> ScriptError {
        ScriptError::Parse { script: self.script.to_owned(), line, message: message.into() }
    }

    fn next(&mut self) -> Option<(u32, &'a str)> {
        let item = self.lines.get(self.pos).copied();
        self.pos += 1;
        item
    }

    fn statements(mut self) -> Result<Vec<Statement>, ScriptError> {
        let mut out = Vec::new();
        while let Some((line, text)) = self.next() {
            let (keyword, rest) = split_keyword(text);
            let stmt = match keyword {
                "on" => {
                    let phase = self.block_header(line, rest)?;
                    Statement::On { line, phase, body: self.body(line)? }
                }
                "action" => {
                    let phase = self.block_header(line, rest)?;
                    Statement::Action { line, phase, body: self.body(line)? }
                }
                "listener" => {
                    if rest != "{" {
                        return Err(self.error(line, "expected '{' after 'listener'"));
                    }
                    Statement::Listener { line, methods: self.methods(line)? }
                }
                "}" => return Err(self.error(line, "unexpected '}'")),
                _ => Statement::Run(self.step(line, text)?),
            };
            out.push(stmt);
        }
        Ok(out)
    }

    /// `<phase> {` → phase name.
    fn block_header(&self, line: u32, rest: &str) -> Result<String, ScriptError> {
        let Some(name) = rest.strip_suffix('{').map(str::trim) else {
            return Err(self.error(line, "expected '{' at end of line"));
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(self.error(line, "expected a single phase name before '{'"));
        }
        Ok(name.to_owned())
    }

    /// Steps up to the matching `}`.
    fn body(&mut self, opened_at: u32) -> Result<Body, ScriptError> {
        let mut steps = Vec::new();
        loop {
            let Some((line, text)) = self.next() else {
                return Err(self.error(opened_at, "unclosed block"));
            };
            if text == "}" {
                return Ok(steps.into());
            }
            steps.push(self.step(line, text)?);
        }
    }

    fn methods(&mut self, opened_at: u32) -> Result<Vec<Method>, ScriptError> {
        let mut methods = Vec::new();
        loop {
            let Some((line, text)) = self.next() else {
                return Err(self.error(opened_at, "unclosed listener"));
            };
            if text == "}" {
                return Ok(methods);
            }
            let phase = self.block_header(line, text)?;
            if methods.iter().any(|m: &Method| m.phase == phase) {
                return Err(self.error(line, format!("duplicate listener method '{phase}'")));
            }
            methods.push(Method { line, phase, body: self.body(line)? });
        }
    }

    fn step(&self, line: u32, text: &str) -> Result<Step, ScriptError> {
        let (keyword, rest) = split_keyword(text);
        let command = match keyword {
            "println" => Command::Println(self.string_literal(line, rest)?),
            "fail" => Command::Fail(self.string_literal(line, rest)?),
            "on" | "action" | "listener" => {
                return Err(self.error(line, "listeners can only be registered at the top level"))
            }
            other => return Err(self.error(line, format!("unknown statement '{other}'"))),
        };
        Ok(Step { line, command })
    }

    /// `"..."` with `\"`, `\\` and `\n` escapes.
    fn string_literal(&self, line: u32, text: &str) -> Result<String, ScriptError> {
        let inner = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .filter(|_| text.len() >= 2)
            .ok_or_else(|| self.error(line, "expected a double-quoted string"))?;

        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('n') => out.push('\n'),
                    _ => return Err(self.error(line, "invalid escape in string")),
                },
                '"' => return Err(self.error(line, "unescaped '\"' inside string")),
                c => out.push(c),
            }
        }
        Ok(out)
    }
}

fn split_keyword(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (text, ""),
    }
}
