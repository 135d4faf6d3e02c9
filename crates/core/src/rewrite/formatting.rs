//! Final layout pass over rendered text.
//!
//! One statement per line, block braces on their own lines (an opening brace
//! stays at the end of its header), four spaces per nesting level, no empty
//! lines. Braces that belong to an expression (`new T { ... }`) stay inline.
//! Whitespace in the input carries no information, so the pass is idempotent.

pub(crate) const PASS_NAME: &str = "formatting";

const INDENT: &str = "    ";

/// Re-layout rendered C# body text.
pub fn normalize_layout(text: &str) -> String {
    let mut layout = Layout::default();
    let chars: Vec<char> = text.chars().collect();
    let mut idx = 0;

    while idx < chars.len() {
        let c = chars[idx];
        match c {
            '"' | '\'' => {
                let end = literal_end(&chars, idx);
                layout.current.extend(&chars[idx..end]);
                idx = end;
                continue;
            }
            c if c.is_whitespace() => layout.space(),
            '(' => {
                layout.paren_depth += 1;
                layout.current.push(c);
            }
            ')' => {
                layout.paren_depth = layout.paren_depth.saturating_sub(1);
                layout.trim_space();
                layout.current.push(c);
            }
            '{' => layout.open_brace(),
            '}' => match layout.close_brace() {
                Closed::Inline => {}
                Closed::Block => {
                    if !continues_line(&chars[idx + 1..]) {
                        layout.flush();
                    }
                }
                Closed::DoBlock => {
                    let rest = &chars[idx + 1..];
                    if !continues_line(rest) && !starts_with_word(rest, "while") {
                        layout.flush();
                    }
                }
            },
            ';' => {
                layout.trim_space();
                layout.current.push(c);
                if layout.paren_depth == 0 && !layout.in_inline_braces() {
                    layout.flush();
                }
            }
            ',' => {
                layout.trim_space();
                layout.current.push(c);
            }
            _ => layout.current.push(c),
        }
        idx += 1;
    }
    layout.flush();

    layout
        .lines
        .iter()
        .map(|(depth, line)| format!("{}{}", INDENT.repeat(*depth), line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Default)]
struct Layout {
    lines: Vec<(usize, String)>,
    current: String,
    depth: usize,
    paren_depth: usize,
    braces: Vec<Brace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Brace {
    Block,
    /// Body of a `do` loop; its `while` stays on the closing line.
    DoBlock,
    /// Expression braces (`new T { ... }`).
    Inline,
}

/// What a `}` closed.
enum Closed {
    Block,
    DoBlock,
    Inline,
}

impl Layout {
    fn space(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
    }

    fn trim_space(&mut self) {
        while self.current.ends_with(' ') {
            self.current.pop();
        }
    }

    fn flush(&mut self) {
        let line = self.current.trim();
        if !line.is_empty() {
            self.lines.push((self.depth, line.to_string()));
        }
        self.current.clear();
    }

    fn in_inline_braces(&self) -> bool {
        self.braces.last() == Some(&Brace::Inline)
    }

    fn opens_block(&self) -> bool {
        if self.paren_depth > 0 || self.in_inline_braces() {
            return false;
        }
        let head = self.current.trim_end();
        head.is_empty()
            || head.ends_with(')')
            || head.ends_with('{')
            || head.ends_with('}')
            || head.ends_with(';')
            || ends_with_word(head, "else")
            || ends_with_word(head, "do")
    }

    fn open_brace(&mut self) {
        if self.opens_block() {
            let kind = if ends_with_word(self.current.trim_end(), "do") {
                Brace::DoBlock
            } else {
                Brace::Block
            };
            self.trim_space();
            if self.current.is_empty() {
                self.current.push('{');
            } else {
                self.current.push_str(" {");
            }
            self.flush();
            self.depth += 1;
            self.braces.push(kind);
        } else {
            self.current.push('{');
            self.braces.push(Brace::Inline);
        }
    }

    fn close_brace(&mut self) -> Closed {
        match self.braces.pop() {
            Some(Brace::Inline) => {
                self.trim_space();
                if !self.current.ends_with('{') {
                    self.current.push(' ');
                }
                self.current.push('}');
                Closed::Inline
            }
            other => {
                self.flush();
                self.depth = self.depth.saturating_sub(1);
                self.current.push('}');
                if other == Some(Brace::DoBlock) {
                    Closed::DoBlock
                } else {
                    Closed::Block
                }
            }
        }
    }
}

/// After a block's closing brace, keep `else` and trailing punctuation on the
/// same line.
fn continues_line(rest: &[char]) -> bool {
    let rest: String = rest.iter().skip_while(|c| c.is_whitespace()).take(5).collect();
    rest.starts_with(';')
        || rest.starts_with(',')
        || rest.starts_with(')')
        || (rest.starts_with("else")
            && !rest[4..].starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

fn starts_with_word(rest: &[char], word: &str) -> bool {
    let rest: String = rest.iter().skip_while(|c| c.is_whitespace()).take(word.len() + 1).collect();
    rest.strip_prefix(word)
        .is_some_and(|after| !after.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

fn ends_with_word(text: &str, word: &str) -> bool {
    text.strip_suffix(word).is_some_and(|before| {
        !before.ends_with(|c: char| c.is_alphanumeric() || c == '_')
    })
}

fn literal_end(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut idx = start + 1;
    while idx < chars.len() {
        match chars[idx] {
            '\\' => idx += 2,
            c if c == quote => return idx + 1,
            _ => idx += 1,
        }
    }
    chars.len()
}
