//! reStructuredText facts
//!
//! Two constructs are recognised:
//!
//! - the first section title: a text line followed by an underline made of one repeated
//!   punctuation symbol, optionally preceded by a matching overline;
//! - field list items at the start of a line, `:name: body`.
//!
//! Which of them are read depends on the target schema: a node field of type
//! `RstTitleInfo` takes the title, node fields patched with `ReplaceText` take the field
//! list item of the same name. Anything else in the document is only carried as lines.

use crate::content::{split_lines, StructuredContent};
use crate::facts::field::RST_SYMBOLS;
use crate::facts::schema::{RST_SCRIPT, RST_TITLE};
use crate::facts::{FieldKind, InfoNode, NodeSchema, PatchRule};
use crate::registry::Format;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static FIELD_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^:(?P<name>[^:\s][^:]*):\s+(?P<body>\S.*)$").expect("valid field list regex")
});

/// Parse an RST document against `RstScriptInfo`
pub fn parse(source: &str) -> StructuredContent {
    let lines = split_lines(source);
    let info = extract(&lines, &RST_SCRIPT);
    StructuredContent::new(Format::Rst, lines, info)
}

/// Read the facts `schema` declares from `lines`
pub fn extract(lines: &[String], schema: &'static NodeSchema) -> InfoNode {
    let mut info = InfoNode::new(schema);
    for def in schema.fields {
        let FieldKind::Node(child) = def.kind else {
            continue;
        };
        let fact = if child.is(&RST_TITLE) {
            find_title(lines)
        } else if child.patch == PatchRule::ReplaceText {
            find_field(lines, def.name, child)
        } else {
            None
        };
        if let Some(fact) = fact {
            debug!(field = def.name, fact = ?fact, "rst fact");
            if let Err(err) = info.set_node(def.name, fact) {
                debug!(field = def.name, %err, "rst fact skipped");
            }
        }
    }
    info
}

/// A line made only of one repeated title symbol
fn adornment(line: &str) -> Option<(char, usize)> {
    let run = line.trim_end();
    let mut chars = run.chars();
    let symbol = chars.next()?;
    if !RST_SYMBOLS.contains(symbol) || !chars.all(|c| c == symbol) {
        return None;
    }
    Some((symbol, run.chars().count()))
}

fn find_title(lines: &[String]) -> Option<InfoNode> {
    for (lineno, line) in lines.iter().enumerate() {
        let text = line.trim();
        if text.is_empty() || adornment(line).is_some() {
            continue;
        }
        let Some((symbol, width)) = lines.get(lineno + 1).and_then(|l| adornment(l)) else {
            continue;
        };
        let has_overline = lineno
            .checked_sub(1)
            .and_then(|i| adornment(&lines[i]))
            .is_some_and(|(over, _)| over == symbol);
        // only overlined titles may be inset
        if line.starts_with(char::is_whitespace) && !has_overline {
            continue;
        }
        if width < 3 && width < text.chars().count() {
            continue;
        }
        let title = InfoNode::new(&RST_TITLE)
            .with("text", text)
            .and_then(|t| t.with("symbol", symbol.to_string()))
            .and_then(|t| t.with("has_overline", has_overline))
            .and_then(|t| t.with("lineno", lineno));
        match title {
            Ok(title) => return Some(title),
            Err(err) => debug!(lineno, %err, "title candidate skipped"),
        }
    }
    None
}

fn find_field(lines: &[String], name: &str, schema: &'static NodeSchema) -> Option<InfoNode> {
    lines.iter().enumerate().find_map(|(lineno, line)| {
        let caps = FIELD_ITEM.captures(line.trim_end_matches('\r'))?;
        if &caps["name"] != name {
            return None;
        }
        let body = caps["body"].trim_end();
        match InfoNode::new(schema)
            .with("text", body)
            .and_then(|f| f.with("lineno", lineno))
        {
            Ok(field) => Some(field),
            Err(err) => {
                debug!(lineno, %err, "field list item skipped");
                None
            }
        }
    })
}
