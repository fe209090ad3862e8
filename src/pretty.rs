//! Dumps serialisable structures as indented `name = value` lines.

use serde::Serialize;
use serde_yml::Value;

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(scalar).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", key(k), scalar(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, scalar(&tagged.value)),
    }
}

fn key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => scalar(other),
    }
}

fn render_at(out: &mut String, depth: usize, value: &Value) {
    let indent = "\t".repeat(depth);
    let Value::Mapping(fields) = value else {
        out.push_str(&format!("{indent}{}\n", scalar(value)));
        return;
    };
    for (name, field) in fields {
        if let Value::Mapping(_) = field {
            out.push_str(&format!("{indent}{} = \n", key(name)));
            render_at(out, depth + 1, field);
        } else {
            out.push_str(&format!("{indent}{} = {}\n", key(name), scalar(field)));
        }
    }
}

/// Renders `value` field by field, nested structures one tab deeper.
pub fn render<T: Serialize>(value: &T) -> Result<String, serde_yml::Error> {
    let value = serde_yml::to_value(value)?;
    let mut out = String::new();
    render_at(&mut out, 0, &value);
    Ok(out)
}

/// Prints `value` to stdout under a title line.
pub fn print_value<T: Serialize>(title: &str, value: &T) -> Result<(), serde_yml::Error> {
    let rendered = render(value)?;
    println!("*** {title} ***");
    print!("{rendered}");
    Ok(())
}
