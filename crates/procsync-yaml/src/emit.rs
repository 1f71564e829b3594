//! Block-style YAML emitter that writes comment bundles back out.

use serde_yaml::Value;

use crate::comment::{CommentBundle, CommentPosition};
use crate::node::{CommentedMap, CommentedSeq, Node};

const INDENT: usize = 2;

/// Render `node` as block-style YAML, including attached comments.
pub fn emit(node: &Node) -> String {
    let mut lines = Vec::new();
    match node {
        Node::Map(map) => emit_map(map, 0, &mut lines),
        Node::Seq(seq) => emit_seq(seq, 0, &mut lines),
        Node::Scalar(value) => lines.push(scalar(value)),
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn comment_line(text: &str) -> String {
    let text = text.trim();
    if text.starts_with('#') {
        text.to_string()
    } else {
        format!("# {text}")
    }
}

fn push_block_comment(text: Option<&str>, pad: &str, lines: &mut Vec<String>) {
    if let Some(text) = text {
        for line in text.lines() {
            lines.push(format!("{pad}{}", comment_line(line)));
        }
    }
}

fn eol(bundle: Option<&CommentBundle>) -> String {
    bundle
        .and_then(|b| b.get(CommentPosition::EndOfLine))
        .map(|text| format!(" {}", comment_line(text)))
        .unwrap_or_default()
}

/// Single-line rendering of a scalar, quoted by serde_yaml where needed.
///
/// Strings carrying line breaks or non-printable characters never reach
/// serde_yaml, which would pick a block style for them.
fn scalar(value: &Value) -> String {
    if let Value::String(s) = value {
        if s.chars().any(|c| c == '\n' || needs_escape(c)) {
            return double_quoted(s);
        }
    }
    serde_yaml::to_string(value)
        .map(|s| s.trim_end_matches('\n').to_string())
        .unwrap_or_else(|_| "null".to_string())
}

/// Characters outside the YAML printable set, plus the ones a reader would
/// treat as line breaks. `\n` is left to the caller.
fn needs_escape(c: char) -> bool {
    let printable = matches!(
        c,
        '\t' | '\n'
            | '\u{20}'..='\u{7e}'
            | '\u{a0}'..='\u{d7ff}'
            | '\u{e000}'..='\u{fffd}'
            | '\u{10000}'..=char::MAX
    );
    !printable || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}')
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if needs_escape(c) => {
                let code = u32::from(c);
                if code <= 0xff {
                    out.push_str(&format!("\\x{code:02X}"));
                } else {
                    out.push_str(&format!("\\u{code:04X}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Header and body lines of a literal block for `s`, or `None` when the
/// text cannot survive a literal block unchanged.
///
/// Chomping follows the trailing newlines: none strips, one clips, more
/// keep. An indentation indicator is written when the first line is empty
/// or starts with whitespace, since a reader would otherwise infer the
/// block indentation from it.
fn literal_block(s: &str) -> Option<(String, Vec<&str>)> {
    if s.trim().is_empty() || s.chars().any(needs_escape) {
        return None;
    }
    let (chomp, body) = match s.strip_suffix('\n') {
        None => ("-", s),
        Some(rest) if rest.ends_with('\n') => ("+", rest),
        Some(rest) => ("", rest),
    };
    let lines: Vec<&str> = body.split('\n').collect();
    if lines
        .iter()
        .any(|line| !line.is_empty() && line.trim().is_empty())
    {
        return None;
    }
    let indicator = match lines.first() {
        Some(first) if first.is_empty() || first.starts_with([' ', '\t']) => INDENT.to_string(),
        _ => String::new(),
    };
    Some((format!("|{indicator}{chomp}"), lines))
}

/// Render `key: value` (or `key:` plus nested block) at `indent`.
fn emit_entry(
    prefix: &str,
    value: &Node,
    bundle: Option<&CommentBundle>,
    indent: usize,
    lines: &mut Vec<String>,
) {
    let trailing = eol(bundle);
    match value {
        Node::Scalar(Value::String(s)) if s.contains('\n') => match literal_block(s) {
            Some((header, body)) => {
                lines.push(format!("{prefix} {header}{trailing}"));
                let pad = " ".repeat(indent + INDENT);
                for line in body {
                    if line.is_empty() {
                        lines.push(String::new());
                    } else {
                        lines.push(format!("{pad}{line}"));
                    }
                }
            }
            None => lines.push(format!("{prefix} {}{trailing}", double_quoted(s))),
        },
        Node::Scalar(v) => lines.push(format!("{prefix} {}{trailing}", scalar(v))),
        Node::Map(map) if map.is_empty() => lines.push(format!("{prefix} {{}}{trailing}")),
        Node::Seq(seq) if seq.is_empty() => lines.push(format!("{prefix} []{trailing}")),
        Node::Map(map) => {
            lines.push(format!("{prefix}{trailing}"));
            emit_map(map, indent + INDENT, lines);
        }
        Node::Seq(seq) => {
            lines.push(format!("{prefix}{trailing}"));
            emit_seq(seq, indent + INDENT, lines);
        }
    }
}

fn emit_map(map: &CommentedMap, indent: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    for (key, value) in map.iter() {
        let bundle = map.comments().get(&key.to_string());
        push_block_comment(bundle.and_then(|b| b.get(CommentPosition::Before)), &pad, lines);
        let prefix = format!("{pad}{}:", scalar(&Value::String(key.to_string())));
        emit_entry(&prefix, value, bundle, indent, lines);
        push_block_comment(bundle.and_then(CommentBundle::after), &pad, lines);
    }
}

fn emit_seq(seq: &CommentedSeq, indent: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    for (index, item) in seq.iter().enumerate() {
        let bundle = seq.comments().get(&index);
        push_block_comment(bundle.and_then(|b| b.get(CommentPosition::Before)), &pad, lines);
        match item {
            Node::Map(map) if !map.is_empty() => {
                // Render the mapping one level deeper, then fold its first
                // line onto the dash. The item's trailing comment goes on the
                // first key line, after any comment block above that key.
                let mut nested = Vec::new();
                emit_map(map, indent + INDENT, &mut nested);
                let inner_pad = indent + INDENT;
                let key_line = nested
                    .iter()
                    .position(|line| !line.trim_start().starts_with('#'))
                    .unwrap_or(0);
                let trailing = eol(bundle);
                for (i, mut line) in nested.into_iter().enumerate() {
                    if i == key_line {
                        line.push_str(&trailing);
                    }
                    if i == 0 {
                        lines.push(format!("{pad}- {}", &line[inner_pad..]));
                    } else {
                        lines.push(line);
                    }
                }
            }
            other => emit_entry(&format!("{pad}-"), other, bundle, indent, lines),
        }
        push_block_comment(bundle.and_then(CommentBundle::after), &pad, lines);
    }
}
