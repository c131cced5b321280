//! An indenting line buffer for generated source.

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub(crate) struct Source {
    text: String,
    depth: usize,
}

impl Source {
    /// Appends one line at the current depth.
    pub(crate) fn line(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.depth {
                self.text.push_str(INDENT);
            }
            self.text.push_str(line);
        }
        self.text.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.text.push('\n');
    }

    /// Appends a line that opens a block.
    pub(crate) fn open(&mut self, line: impl AsRef<str>) {
        self.line(line);
        self.depth += 1;
    }

    /// Appends a line that closes a block.
    pub(crate) fn close(&mut self, line: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(line);
    }

    /// Writes a module header: inner doc lines and the do-not-edit marker.
    pub(crate) fn header(&mut self, summary: &str) {
        self.line(format!("//! {summary}"));
        self.line("//!");
        self.line("//! Generated by graft. Do not edit.");
        self.blank();
    }

    pub(crate) fn finish(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_indent() {
        let mut src = Source::default();
        src.open("fn f() {");
        src.line("g();");
        src.blank();
        src.close("}");
        assert_eq!(src.finish(), "fn f() {\n    g();\n\n}\n");
    }
}
