use super::{graph::Graph, kinds, Object, ObjectId, Value};
use std::{
    collections::BTreeSet,
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to write replacement descriptor {path:?}: {cause}")]
    TempWriteFailed { path: PathBuf, cause: io::Error },
    #[error("Failed to move replacement descriptor into place at {path:?}: {cause}")]
    RenameFailed { path: PathBuf, cause: io::Error },
}

static HEADER: &str = "// !$*UTF8*$!";

// Values under these keys never get annotation comments, even when they
// happen to reference an object. Matches Xcode's own output.
static NO_COMMENT_KEYS: &[&str] = &["remoteGlobalIDString", "TestTargetID"];

// Kinds Xcode packs onto a single line each.
fn is_single_line(kind: &str) -> bool {
    matches!(kind, kinds::isa::BUILD_FILE | kinds::isa::FILE_REFERENCE)
}

/// Tokens survive unquoted only if entirely alphanumerics, `_`, `$`, `.`,
/// or `/`. Anything else (including the empty string) gets quoted.
fn needs_quoting(token: &str) -> bool {
    token.is_empty()
        || !token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'.' | b'/'))
}

fn escape(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn token(value: &str) -> String {
    if needs_quoting(value) {
        format!("\"{}\"", escape(value))
    } else {
        value.to_owned()
    }
}

fn annotated(graph: &Graph, value: &str, key: Option<&str>) -> String {
    let suppressed = key
        .map(|key| NO_COMMENT_KEYS.contains(&key))
        .unwrap_or(false);
    if !suppressed {
        if let Some(comment) = graph.comment_for(value) {
            return format!("{} /* {} */", token(value), comment);
        }
    }
    token(value)
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

fn render_value_inline(graph: &Graph, out: &mut String, value: &Value, key: Option<&str>) {
    match value {
        Value::String(s) => {
            let rendered = annotated(graph, s, key);
            out.push_str(&rendered);
        }
        Value::Array(values) => {
            out.push('(');
            for element in values {
                render_value_inline(graph, out, element, key);
                out.push_str(", ");
            }
            out.push(')');
        }
        Value::Dict(dict) => {
            out.push('{');
            for (key, value) in dict {
                out.push_str(&token(key));
                out.push_str(" = ");
                render_value_inline(graph, out, value, Some(key));
                out.push_str("; ");
            }
            out.push('}');
        }
    }
}

fn render_value_multiline(
    graph: &Graph,
    out: &mut String,
    value: &Value,
    key: Option<&str>,
    depth: usize,
) {
    match value {
        Value::String(s) => {
            let rendered = annotated(graph, s, key);
            out.push_str(&rendered);
        }
        Value::Array(values) => {
            out.push_str("(\n");
            for element in values {
                push_indent(out, depth + 1);
                render_value_multiline(graph, out, element, key, depth + 1);
                out.push_str(",\n");
            }
            push_indent(out, depth);
            out.push(')');
        }
        Value::Dict(dict) => {
            out.push_str("{\n");
            for (key, value) in dict {
                push_indent(out, depth + 1);
                out.push_str(&token(key));
                out.push_str(" = ");
                render_value_multiline(graph, out, value, Some(key), depth + 1);
                out.push_str(";\n");
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

// `isa` always leads; the rest keep their stored order.
fn ordered_entries(object: &Object) -> impl Iterator<Item = (&String, &Value)> {
    let isa = object.entries().filter(|(key, _)| key.as_str() == "isa");
    let rest = object.entries().filter(|(key, _)| key.as_str() != "isa");
    isa.chain(rest)
}

fn render_object(graph: &Graph, out: &mut String, id: &ObjectId, object: &Object) {
    push_indent(out, 2);
    let rendered_id = annotated(graph, id.as_str(), None);
    out.push_str(&rendered_id);
    out.push_str(" = ");
    if is_single_line(object.kind()) {
        out.push('{');
        for (key, value) in ordered_entries(object) {
            out.push_str(&token(key));
            out.push_str(" = ");
            render_value_inline(graph, out, value, Some(key));
            out.push_str("; ");
        }
        out.push('}');
    } else {
        out.push_str("{\n");
        for (key, value) in ordered_entries(object) {
            push_indent(out, 3);
            out.push_str(&token(key));
            out.push_str(" = ");
            render_value_multiline(graph, out, value, Some(key), 3);
            out.push_str(";\n");
        }
        push_indent(out, 2);
        out.push('}');
    }
    out.push_str(";\n");
}

impl Graph {
    /// Renders the descriptor the way Xcode writes it: tab indentation, the
    /// object table split into alphabetized `/* Begin ... section */` blocks,
    /// and annotation comments regenerated from current object state.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(HEADER);
        out.push_str("\n{\n");
        for (key, value) in &self.meta {
            push_indent(&mut out, 1);
            out.push_str(&token(key));
            out.push_str(" = ");
            render_value_multiline(self, &mut out, value, Some(key), 1);
            out.push_str(";\n");
        }
        out.push_str("\tobjects = {\n");
        let kinds_present: BTreeSet<&str> = self.objects.values().map(Object::kind).collect();
        for kind in kinds_present {
            out.push_str(&format!("\n/* Begin {} section */\n", kind));
            for (id, object) in self.objects() {
                if object.kind() == kind {
                    render_object(self, &mut out, id, object);
                }
            }
            out.push_str(&format!("/* End {} section */\n", kind));
        }
        out.push_str("\t};\n");
        push_indent(&mut out, 1);
        out.push_str("rootObject = ");
        let rendered_root = annotated(self, self.root_object.as_str(), Some("rootObject"));
        out.push_str(&rendered_root);
        out.push_str(";\n}\n");
        out
    }

    /// Writes the rendered descriptor to a sibling temp file, then renames it
    /// over `path`. The original file survives any failure untouched.
    pub fn write_to(&self, path: &Path) -> Result<(), WriteError> {
        let rendered = self.render();
        let mut tmp_name = path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("project.pbxproj"));
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(&tmp_name);
        fs::write(&tmp, rendered.as_bytes()).map_err(|cause| WriteError::TempWriteFailed {
            path: tmp.clone(),
            cause,
        })?;
        fs::rename(&tmp, path).map_err(|cause| {
            let _ = fs::remove_file(&tmp);
            WriteError::RenameFailed {
                path: path.to_owned(),
                cause,
            }
        })
    }
}
