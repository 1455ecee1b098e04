//! Plain-text markup helpers.
//!
//! Everything here is pure: fragments are strings, so a whole panel can be
//! generated away from the live document and swapped in at once.

use crate::fmt::fmt_number;

pub const CLASS_PREFIX: &str = "apg-gui";

/// Escape text content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// ` name="value"` with the value escaped.
pub fn attr(name: &str, value: &str) -> String {
    format!(" {name}=\"{}\"", escape(value))
}

pub fn num_attr(name: &str, value: f64) -> String {
    attr(name, &fmt_number(value))
}

pub fn class(suffix: &str) -> String {
    format!("{CLASS_PREFIX}-{suffix}")
}

/// Concatenate fragments with no wrapper.
pub fn join(fragments: &[String]) -> String {
    fragments.concat()
}

/// A labelled control row: `<div class="apg-gui-row apg-gui-{kind}">label + control</div>`.
pub fn row(kind: &str, for_id: &str, caption: &str, control: &str) -> String {
    let label = if caption.is_empty() {
        String::new()
    } else {
        format!("<label{}>{}</label>", attr("for", for_id), escape(caption))
    };
    format!(
        "<div{}>{label}{control}</div>",
        attr("class", &format!("{} {}", class("row"), class(kind)))
    )
}

pub fn wrap(tag: &str, id: &str, kind: &str, head: &str, fragments: &[String]) -> String {
    format!(
        "<{tag}{}{}>{head}{}</{tag}>",
        attr("id", id),
        attr("class", &class(kind)),
        join(fragments)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_metacharacters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn attributes_are_quoted_and_escaped() {
        assert_eq!(attr("title", "a\"b"), " title=\"a&quot;b\"");
        assert_eq!(num_attr("step", 0.5), " step=\"0.5\"");
        assert_eq!(num_attr("max", 10.0), " max=\"10\"");
    }

    #[test]
    fn row_omits_empty_label() {
        let r = row("range", "r1", "", "<input>");
        assert!(!r.contains("<label"));
        let r = row("range", "r1", "Speed", "<input>");
        assert!(r.contains("<label for=\"r1\">Speed</label>"));
        assert!(r.starts_with("<div class=\"apg-gui-row apg-gui-range\">"));
    }

    #[test]
    fn join_has_no_wrapper() {
        assert_eq!(join(&["<p>a</p>".into(), "<p>b</p>".into()]), "<p>a</p><p>b</p>");
        assert_eq!(join(&[]), "");
    }
}
