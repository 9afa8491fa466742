//! Indented line writer and literal formatting

const INDENT: &str = "  ";

/// Accumulates indented lines
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    pub fn new(depth: usize) -> Self {
        Self { out: String::new(), depth }
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `text` and indent what follows
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    /// Dedent and write `text`
    pub fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Dedent for `text`, then indent again; ends a multi-line open tag
    pub fn reopen(&mut self, text: impl AsRef<str>) {
        self.close(text);
        self.depth += 1;
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Shortest round-trip decimal; non-finite values and `-0` print as `0`
pub fn num(v: f64) -> String {
    if !v.is_finite() || v == 0.0 {
        return "0".to_string();
    }
    v.to_string()
}

/// Double-quoted string literal
pub fn string_literal(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Text that can sit inside a block comment
pub fn comment_text(s: &str) -> String {
    s.replace("*/", "*\\/").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.1), "0.1");
        assert_eq!(num(-0.0), "0");
        assert_eq!(num(f64::NAN), "0");
        assert_eq!(num(-2.5), "-2.5");
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_comment_text() {
        assert_eq!(comment_text("key */ light\nB"), "key *\\/ light B");
    }

    #[test]
    fn test_indentation() {
        let mut w = CodeWriter::new(1);
        w.open("<a>");
        w.line("<b />");
        w.close("</a>");
        assert_eq!(w.finish(), "  <a>\n    <b />\n  </a>\n");
    }
}
