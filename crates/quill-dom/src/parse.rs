//! Tolerant HTML fragment parsing for pipeline output.
//!
//! This is not a general-purpose HTML parser. It handles the markup the
//! renderer and the diagram engines produce: elements with quoted attributes,
//! void elements, comments, and the five entities the pipeline's escaper
//! emits. Mismatched closing tags are recovered from by popping the open
//! stack, so author-supplied raw HTML cannot wedge the tree builder.

use crate::document::{Document, NodeId, is_void_element};

/// Parse an HTML fragment into detached nodes.
pub(crate) fn parse_fragment(doc: &mut Document, html: &str) -> Vec<NodeId> {
    let mut parser = Parser {
        doc,
        input: html.as_bytes(),
        pos: 0,
        roots: Vec::new(),
        stack: Vec::new(),
    };
    parser.run();
    parser.roots
}

struct Parser<'a, 'd> {
    doc: &'d mut Document,
    input: &'a [u8],
    pos: usize,
    roots: Vec<NodeId>,
    stack: Vec<(NodeId, String)>,
}

impl Parser<'_, '_> {
    fn run(&mut self) {
        let mut text_start = self.pos;
        while self.pos < self.input.len() {
            if self.input[self.pos] == b'<' {
                self.flush_text(text_start, self.pos);
                self.consume_markup();
                text_start = self.pos;
            } else {
                self.pos += 1;
            }
        }
        self.flush_text(text_start, self.pos);
    }

    fn flush_text(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let raw = std::str::from_utf8(&self.input[start..end]).unwrap_or_default();
        let text = unescape_text(raw);
        let node = self.doc.create_text(text);
        self.attach(node);
    }

    fn attach(&mut self, node: NodeId) {
        if let Some((parent, _)) = self.stack.last() {
            self.doc.append_child(*parent, node);
        } else {
            self.roots.push(node);
        }
    }

    fn rest(&self) -> &[u8] {
        &self.input[self.pos..]
    }

    fn consume_markup(&mut self) {
        if self.rest().starts_with(b"<!--") {
            self.pos += 4;
            while self.pos < self.input.len() && !self.rest().starts_with(b"-->") {
                self.pos += 1;
            }
            self.pos = (self.pos + 3).min(self.input.len());
        } else if self.rest().starts_with(b"</") {
            self.pos += 2;
            let name = self.consume_name();
            self.skip_to_gt();
            self.close_tag(&name);
        } else if self.rest().len() > 1 && is_name_start(self.input[self.pos + 1]) {
            self.pos += 1;
            self.consume_open_tag();
        } else {
            // Stray '<' in text; keep it literal.
            let node = self.doc.create_text("<");
            self.attach(node);
            self.pos += 1;
        }
    }

    fn consume_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.input.len() && is_name_char(self.input[self.pos]) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    fn skip_to_gt(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos] != b'>' {
            self.pos += 1;
        }
        self.pos = (self.pos + 1).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn consume_open_tag(&mut self) {
        let tag = self.consume_name();
        let node = self.doc.create_element(tag.clone());

        loop {
            self.skip_whitespace();
            match self.rest().first() {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    self.attach(node);
                    if !is_void_element(&tag) {
                        self.stack.push((node, tag));
                    }
                    return;
                }
                Some(b'/') => {
                    self.skip_to_gt();
                    self.attach(node);
                    return;
                }
                _ => {
                    let (name, value) = self.consume_attr();
                    if !name.is_empty() {
                        self.doc.set_attr(node, &name, &value);
                    }
                }
            }
        }
        // Truncated input: attach what we have.
        self.attach(node);
    }

    fn consume_attr(&mut self) -> (String, String) {
        let name = self.consume_name();
        if name.is_empty() {
            // Unparseable byte; skip it to guarantee progress.
            self.pos += 1;
            return (String::new(), String::new());
        }
        self.skip_whitespace();
        if self.rest().first() != Some(&b'=') {
            return (name, String::new());
        }
        self.pos += 1;
        self.skip_whitespace();
        let value = match self.rest().first() {
            Some(&quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.pos < self.input.len() && self.input[self.pos] != quote {
                    self.pos += 1;
                }
                let raw = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default();
                self.pos = (self.pos + 1).min(self.input.len());
                unescape_text(raw)
            }
            _ => {
                let start = self.pos;
                while self.pos < self.input.len()
                    && !self.input[self.pos].is_ascii_whitespace()
                    && self.input[self.pos] != b'>'
                {
                    self.pos += 1;
                }
                std::str::from_utf8(&self.input[start..self.pos])
                    .unwrap_or_default()
                    .to_owned()
            }
        };
        (name, value)
    }

    fn close_tag(&mut self, name: &str) {
        if let Some(depth) = self.stack.iter().rposition(|(_, tag)| tag == name) {
            let implicit = self.stack.len() - depth - 1;
            if implicit > 0 {
                tracing::debug!(tag = name, implicit, "Recovered from mismatched close tags");
            }
            self.stack.truncate(depth);
        } else {
            tracing::debug!(tag = name, "Dropping unmatched close tag");
        }
    }
}

fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic()
}

fn is_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte == b':'
}

/// Decode the entities the pipeline escaper produces.
pub(crate) fn unescape_text(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let replaced = [
            ("&amp;", "&"),
            ("&lt;", "<"),
            ("&gt;", ">"),
            ("&quot;", "\""),
            ("&#039;", "'"),
            ("&#39;", "'"),
        ]
        .iter()
        .find(|(entity, _)| rest.starts_with(entity));
        match replaced {
            Some((entity, ch)) => {
                out.push_str(ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape a text node for serialization (the five entities the pipeline
/// uses, matching the renderer's escaper so parse/serialize round-trips).
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for serialization.
pub(crate) fn escape_attr(value: &str) -> String {
    escape_text(value)
}
