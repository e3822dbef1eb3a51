//! Deterministic textual rendering of aggregator configurations.
//!
//! The output mirrors constructor syntax: `ClassName(name=value, ...)` with
//! options in declaration order and nested aggregators rendered recursively.
//! Long fragments are truncated around a middle ellipsis and the whole output
//! is capped, so rendering always succeeds regardless of option size.

use crate::introspect::{ParamValue, Params};
use crate::models::classifier_trait::Aggregator;

/// Column budget before a parameter list wraps onto a continuation line.
const LINE_WIDTH: usize = 75;
/// A `name=value` fragment longer than this gets middle-truncated...
const VALUE_CAP: usize = 500;
/// ...keeping this many leading characters...
const HEAD_KEEP: usize = 300;
/// ...and this many trailing characters around the ellipsis.
const TAIL_KEEP: usize = 100;
/// Upper bound on the whole rendered string.
const TOTAL_CAP: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReprMode {
    /// Render every declared option.
    Full,
    /// Omit options whose value equals the declared default.
    ChangedOnly,
}

#[derive(Clone, Copy)]
struct Caps {
    value: usize,
    head: usize,
    tail: usize,
}

/// Render an aggregator with all options shown.
pub fn format(agg: &dyn Aggregator) -> String {
    format_with(agg, ReprMode::Full)
}

/// Render an aggregator, optionally omitting default-valued options.
///
/// Always returns a string: if the output overruns the total budget the
/// per-value truncation limits are halved and rendering retried, with a hard
/// truncation as the final fallback.
pub fn format_with(agg: &dyn Aggregator, mode: ReprMode) -> String {
    let mut caps = Caps {
        value: VALUE_CAP,
        head: HEAD_KEEP,
        tail: TAIL_KEEP,
    };
    loop {
        let rendered = render(agg, mode, caps);
        if rendered.chars().count() <= TOTAL_CAP {
            return rendered;
        }
        if caps.head <= 16 {
            let kept: String = rendered.chars().take(TOTAL_CAP - 3).collect();
            return format!("{}...", kept);
        }
        caps = Caps {
            value: caps.value / 2,
            head: caps.head / 2,
            tail: caps.tail / 2,
        };
    }
}

fn render(agg: &dyn Aggregator, mode: ReprMode, caps: Caps) -> String {
    let class_name = agg.class_name();
    let defaults = agg.default_params();
    let mut pairs: Vec<(&str, String)> = Vec::new();
    for &name in agg.param_names() {
        let value = match agg.get_param(name) {
            Some(value) => value,
            None => continue,
        };
        if mode == ReprMode::ChangedOnly {
            let unchanged = defaults
                .iter()
                .any(|(default_name, default)| *default_name == name && *default == value);
            if unchanged {
                continue;
            }
        }
        pairs.push((name, value_repr(&value, mode, caps)));
    }
    format!(
        "{}({})",
        class_name,
        join_params(&pairs, class_name.chars().count(), caps)
    )
}

fn value_repr(value: &ParamValue, mode: ReprMode, caps: Caps) -> String {
    match value {
        ParamValue::None => "None".to_string(),
        ParamValue::Bool(b) => b.to_string(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Float(x) => float_repr(*x),
        ParamValue::Str(s) => format!("'{}'", s),
        ParamValue::List(items) => {
            let inner: Vec<String> = items
                .iter()
                .map(|item| value_repr(item, mode, caps))
                .collect();
            format!("[{}]", inner.join(", "))
        }
        ParamValue::Classifiers(pool) => {
            let names: Vec<&str> = pool.iter().map(|c| c.name()).collect();
            format!("[{}]", names.join(", "))
        }
        ParamValue::Aggregator(inner) => render(inner.as_ref(), mode, caps),
    }
}

/// Whole floats keep one decimal place so values read as floats.
fn float_repr(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{:.1}", x)
    } else {
        x.to_string()
    }
}

fn join_params(pairs: &[(&str, String)], offset: usize, caps: Caps) -> String {
    let line_sep = format!(",\n{}", " ".repeat(1 + offset / 2));
    let mut parts: Vec<String> = Vec::new();
    let mut line_len = offset;
    for (i, (name, vrepr)) in pairs.iter().enumerate() {
        let mut this_repr = format!("{}={}", name, vrepr);
        if this_repr.chars().count() > caps.value {
            this_repr = truncate_middle(&this_repr, caps.head, caps.tail);
        }
        if i > 0 {
            if line_len + this_repr.chars().count() >= LINE_WIDTH || this_repr.contains('\n') {
                parts.push(line_sep.clone());
                line_len = line_sep.chars().count();
            } else {
                parts.push(", ".to_string());
                line_len += 2;
            }
        }
        line_len += this_repr.chars().count();
        parts.push(this_repr);
    }
    let joined = parts.concat();
    joined
        .split('\n')
        .map(|line| line.trim_end_matches(' '))
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Keep the first `head` and last `tail` characters around an ellipsis.
fn truncate_middle(s: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= head + tail {
        return s.to_string();
    }
    let mut out = String::with_capacity(head + tail + 3);
    out.extend(&chars[..head]);
    out.push_str("...");
    out.extend(&chars[chars.len() - tail..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_repr() {
        assert_eq!(float_repr(0.1), "0.1");
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(-3.0), "-3.0");
        assert_eq!(float_repr(2.5), "2.5");
    }

    #[test]
    fn test_truncate_middle() {
        let long = "x".repeat(600);
        let truncated = truncate_middle(&long, 300, 100);
        assert_eq!(truncated.chars().count(), 403);
        assert!(truncated.contains("..."));

        let short = "short";
        assert_eq!(truncate_middle(short, 300, 100), "short");
    }

    #[test]
    fn test_join_wraps_long_parameter_lists() {
        let caps = Caps {
            value: VALUE_CAP,
            head: HEAD_KEEP,
            tail: TAIL_KEEP,
        };
        let pairs: Vec<(&str, String)> = vec![
            ("alpha", "'x'".repeat(20)),
            ("beta", "1".to_string()),
        ];
        let joined = join_params(&pairs, 4, caps);
        assert!(joined.contains('\n'));
        for line in joined.split('\n') {
            assert!(!line.ends_with(' '));
        }
    }
}
