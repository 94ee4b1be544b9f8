//! Deterministic markdown-to-markup rendering.
//!
//! Math spans are lifted out before any substitution and restored
//! afterwards, so emphasis rules never touch notation. Delimiters survive
//! verbatim inside `math-display` / `math-inline` spans for the client's
//! math renderer.
//!
//! Text is not HTML-escaped.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Pre-wrapped math, escaped dollars, display math, and inline math, in
/// that priority order.
static PROTECTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?s)(?P<wrapped><span class="math-(?:display|inline)">.*?</span>)"#,
        r"|(?P<escaped>\\\$)",
        r"|(?P<display>\$\$.+?\$\$|\\\[.+?\\\])",
        r"|(?P<inline>\\\(.+?\\\)|\$[^\s$](?:[^$\n]*?[^\s$])?\$)",
    ))
    .unwrap()
});

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(#{1,6})[ \t]+([^\n]+?)[ \t]*$\n?").unwrap());

static BOLD_ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*([^\n]+?)\*\*\*").unwrap());

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^\n]+?)\*\*").unwrap());

static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").unwrap());

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x00(\d+)\x00").unwrap());

/// Render model markdown into display markup.
///
/// Order matters: headers, then bold italic, then bold, then italic (so
/// single asterisks inside `**...**` are never read as italic markers),
/// then line breaks. Italic markers touching a letter or digit on the
/// outside (`5*3*2`) are left as text.
pub fn render(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\0', "");

    let mut protected: Vec<String> = Vec::new();
    let body = PROTECTED_RE.replace_all(&normalized, |caps: &Captures| {
        let span = if let Some(m) = caps.name("display") {
            format!(r#"<span class="math-display">{}</span>"#, m.as_str())
        } else if let Some(m) = caps.name("inline") {
            format!(r#"<span class="math-inline">{}</span>"#, m.as_str())
        } else {
            caps[0].to_string()
        };
        protected.push(span);
        format!("\0{}\0", protected.len() - 1)
    });

    let body = HEADER_RE.replace_all(&body, |caps: &Captures| {
        let level = caps[1].len();
        format!("<h{level}>{}</h{level}>", &caps[2])
    });
    let body = BOLD_ITALIC_RE.replace_all(&body, "<strong><em>$1</em></strong>");
    let body = BOLD_RE.replace_all(&body, "<strong>$1</strong>");
    let body = ITALIC_RE.replace_all(&body, |caps: &Captures| {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        let before = body[..whole.start].chars().next_back();
        let after = body[whole.end..].chars().next();
        if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
            caps[0].to_string()
        } else {
            format!("<em>{}</em>", &caps[1])
        }
    });
    let body = body.replace('\n', "<br>");

    PLACEHOLDER_RE
        .replace_all(&body, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| protected.get(index))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_before_italic() {
        assert_eq!(
            render("**key** and *aside*"),
            "<strong>key</strong> and <em>aside</em>"
        );
        assert_eq!(
            render("**a *b* c**"),
            "<strong>a <em>b</em> c</strong>"
        );
    }

    #[test]
    fn test_bold_italic() {
        assert_eq!(render("***x***"), "<strong><em>x</em></strong>");
        assert_eq!(
            render("***Note:*** read *twice*"),
            "<strong><em>Note:</em></strong> read <em>twice</em>"
        );
    }

    #[test]
    fn test_headers_and_line_breaks() {
        assert_eq!(
            render("### Steps\nFirst line\nSecond line"),
            "<h3>Steps</h3>First line<br>Second line"
        );
        assert_eq!(render("# Title"), "<h1>Title</h1>");
        assert_eq!(render("#hashtag"), "#hashtag");
    }

    #[test]
    fn test_crlf_is_normalized() {
        assert_eq!(render("a\r\nb"), "a<br>b");
    }

    #[test]
    fn test_display_math_is_untouched() {
        let out = render(r"**Sum:** $$\frac{1}{2}*x*y + 2**3**$$");
        assert_eq!(
            out,
            r#"<strong>Sum:</strong> <span class="math-display">$$\frac{1}{2}*x*y + 2**3**$$</span>"#
        );
    }

    #[test]
    fn test_bracket_delimiters() {
        let out = render(r"Given \(a*b*c\) and \[x^2\]");
        assert_eq!(
            out,
            r#"Given <span class="math-inline">\(a*b*c\)</span> and <span class="math-display">\[x^2\]</span>"#
        );
    }

    #[test]
    fn test_inline_dollar_math() {
        let out = render("Let $a*b*c$ be *small*");
        assert_eq!(
            out,
            r#"Let <span class="math-inline">$a*b*c$</span> be <em>small</em>"#
        );
    }

    #[test]
    fn test_escaped_dollar_and_currency_are_not_math() {
        assert_eq!(render(r"costs \$5 and *cheap*"), r"costs \$5 and <em>cheap</em>");
        assert_eq!(render("between $5 and $6"), "between $5 and $6");
    }

    #[test]
    fn test_newlines_inside_display_math_survive() {
        let out = render("$$a\nb$$\nnext");
        assert_eq!(out, "<span class=\"math-display\">$$a\nb$$</span><br>next");
    }

    #[test]
    fn test_render_is_idempotent() {
        let inputs = [
            "plain text",
            "<strong>already</strong> marked<br>up",
            "### Header\n**bold** *it* $x*y$ and $$\\frac{1}{2}$$",
            "5 * 3 = 15 and 2 * 4 = 8",
            "***both*** and 5*3*2",
            "unbalanced **bold",
            "multi\n\nparagraph",
        ];
        for input in inputs {
            let once = render(input);
            assert_eq!(render(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_lone_asterisks_are_left_alone() {
        assert_eq!(render("5 * 3 = 15"), "5 * 3 = 15");
    }

    #[test]
    fn test_asterisks_between_digits_are_not_italic() {
        assert_eq!(render("5*3*2"), "5*3*2");
        assert_eq!(render("a*b* and *c*"), "a*b* and <em>c</em>");
        assert_eq!(render("(*aside*)"), "(<em>aside</em>)");
    }
}
