//! Render a raw tree back to JSON text.
//!
//! Used when a migrated document is written back to its source file.

use std::fmt::Write;

use super::raw::{RawNode, RawValue};

const INDENT: &str = "  ";

impl RawNode {
    /// Render as pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> String {
        let mut out = String::new();
        write_node(&mut out, self, 0);
        out.push('\n');
        out
    }
}

fn write_node(out: &mut String, node: &RawNode, depth: usize) {
    match &node.value {
        RawValue::Null => out.push_str("null"),
        RawValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        RawValue::Number(n) => write_number(out, *n),
        RawValue::String(s) => write_string(out, s),
        RawValue::Sequence(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth + 1);
                write_node(out, item, depth + 1);
            }
            newline(out, depth);
            out.push(']');
        }
        RawValue::Map(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            for (i, (key, entry)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth + 1);
                write_string(out, key);
                out.push_str(": ");
                write_node(out, &entry.value, depth + 1);
            }
            newline(out, depth);
            out.push('}');
        }
    }
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_number(out: &mut String, n: f64) {
    if !n.is_finite() {
        out.push_str("null");
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        let _ = write!(out, "{}", n as i64);
    } else {
        let _ = write!(out, "{n}");
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
