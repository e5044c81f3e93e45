//! Indentation-aware source sink
//!
//! Callers hand over whole logical lines; indentation follows the braces.
//! A line ending in `{` or `(` opens a level, a line starting with `}` or `)`
//! closes one before it is written. `//` comment lines never change the level.

/// Line-oriented writer with brace-tracked indentation
#[derive(Debug, Clone)]
pub struct SourceWriter {
    buf: String,
    depth: usize,
}

impl SourceWriter {
    /// Writer whose lines start at `depth` tabs
    pub fn new(depth: usize) -> Self {
        Self {
            buf: String::new(),
            depth,
        }
    }

    /// Write one line
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref().trim();
        let comment = text.starts_with("//");

        if !comment && (text.starts_with('}') || text.starts_with(')')) {
            self.depth = self.depth.saturating_sub(1);
        }

        for _ in 0..self.depth {
            self.buf.push('\t');
        }
        self.buf.push_str(text);
        self.buf.push('\n');

        if !comment && (text.ends_with('{') || text.ends_with('(')) {
            self.depth += 1;
        }
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Append everything `other` wrote, keeping its indentation
    pub fn append(&mut self, other: SourceWriter) {
        self.buf.push_str(&other.buf);
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_tracking() {
        let mut w = SourceWriter::new(1);
        w.line("for _, b := range resp.GetBooks() {");
        w.line("fmt.Println(b)");
        w.line("}");
        w.blank();
        w.line("return nil");

        assert_eq!(
            w.finish(),
            "\tfor _, b := range resp.GetBooks() {\n\t\tfmt.Println(b)\n\t}\n\n\treturn nil\n"
        );
    }

    #[test]
    fn test_close_and_reopen() {
        let mut w = SourceWriter::new(0);
        w.line("if a {");
        w.line("} else {");
        w.line("x");
        w.line("}");
        assert_eq!(w.finish(), "if a {\n} else {\n\tx\n}\n");
    }

    #[test]
    fn test_composite_literal_closers() {
        let mut w = SourceWriter::new(0);
        w.line("req := &pb.Req{");
        w.line("A: &pb.A{");
        w.line("X: 1,");
        w.line("},");
        w.line("}");
        assert_eq!(w.finish(), "req := &pb.Req{\n\tA: &pb.A{\n\t\tX: 1,\n\t},\n}\n");
    }

    #[test]
    fn test_comments_keep_depth() {
        let mut w = SourceWriter::new(0);
        w.line("req := &pb.Req{");
        w.line("// Parent, e.g. shelves/{");
        w.line("Parent: \"p\",");
        w.line("// closes with }");
        w.line("}");
        w.line("return nil");
        assert_eq!(
            w.finish(),
            "req := &pb.Req{\n\t// Parent, e.g. shelves/{\n\tParent: \"p\",\n\t// closes with }\n}\nreturn nil\n"
        );
    }

    #[test]
    fn test_append() {
        let mut w = SourceWriter::new(1);
        w.line("x := 1");
        let mut inner = SourceWriter::new(1);
        inner.line("if x > 0 {");
        inner.line("return nil");
        inner.line("}");
        w.append(inner);
        w.line("return nil");
        assert_eq!(
            w.finish(),
            "\tx := 1\n\tif x > 0 {\n\t\treturn nil\n\t}\n\treturn nil\n"
        );
    }
}
