//! canonical literal encoding
//!
//! Evaluated values are written back into templates as HCL source text. The
//! encoding is deterministic: object keys are sorted lexicographically at
//! every depth, strings are fully escaped (including the `${` and `%{`
//! template introducers, so encoded output always re-parses as the literal
//! it came from), numbers keep their display form.
use hcl::Value;

/// Encodes a value as canonical HCL source text
pub fn encode(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Encodes a string as a quoted, escaped HCL string literal
pub fn quote(string: &str) -> String {
    let mut out = String::new();
    write_string(&mut out, string);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(boolean) => out.push_str(if *boolean { "true" } else { "false" }),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(string) => write_string(out, string),
        Value::Array(array) => {
            out.push('[');
            for (index, item) in array.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(object) => {
            if object.is_empty() {
                out.push_str("{}");
                return;
            }

            let mut entries: Vec<_> = object.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            out.push_str("{ ");
            for (index, (key, item)) in entries.into_iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_key(out, key);
                out.push_str(" = ");
                write_value(out, item);
            }
            out.push_str(" }");
        }
    }
}

fn write_key(out: &mut String, key: &str) {
    if hcl::Identifier::new(key).is_ok() {
        out.push_str(key);
    } else {
        write_string(out, key);
    }
}

fn write_string(out: &mut String, string: &str) {
    out.push('"');

    let mut chars = string.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(ch);
                out.push(ch);
            }
            other => out.push(other),
        }
    }

    out.push('"');
}
