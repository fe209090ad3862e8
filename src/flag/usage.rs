use super::value::Value;
use super::FlagDefinition;

/// Extracts the back-quoted placeholder from a help text.
///
/// Returns the placeholder (or the kind label when there is none) and the
/// help text with the quotes removed.
pub fn unquote_help(flag: &FlagDefinition) -> (String, String) {
    let help = flag.help();
    if let Some(open) = help.find('`') {
        if let Some(len) = help[open + 1..].find('`') {
            let name = &help[open + 1..open + 1 + len];
            let unquoted = format!("{}{}{}", &help[..open], name, &help[open + len + 2..]);
            return (name.to_string(), unquoted);
        }
    }
    (flag.kind().type_label().to_string(), help.to_string())
}

/// Renders the grouped usage text for `flags`, in the given order.
///
/// Every definition gets one paragraph listing all of its names. Later
/// definitions with byte-identical help text are folded into the same
/// paragraph, even if they are unrelated flags.
pub fn render(flags: &[FlagDefinition]) -> String {
    let mut visited = vec![false; flags.len()];
    let mut out = String::new();

    for (i, flag) in flags.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let mut line = format!("  -{}", flag.primary_name());
        for alias in &flag.names()[1..] {
            line.push_str(&format!(", --{alias}"));
        }
        for (j, other) in flags.iter().enumerate().skip(i + 1) {
            if !visited[j] && other.help() == flag.help() {
                for name in other.names() {
                    line.push_str(&format!(", --{name}"));
                }
                visited[j] = true;
            }
        }

        let (placeholder, help) = unquote_help(flag);
        if !placeholder.is_empty() {
            line.push(' ');
            line.push_str(&placeholder);
        }
        // "  -x": a lone one-character name keeps its help on the same line
        if line.chars().count() <= 4 {
            line.push('\t');
        } else {
            line.push_str("\n    \t");
        }
        line.push_str(&help.replace('\n', "\n    \t"));

        let default = flag.default_value();
        if !default.looks_zero() {
            let shown = match default {
                Value::String(s) => format!("{s:?}"),
                other => other.to_string(),
            };
            line.push_str(&format!(" (default {shown})"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
