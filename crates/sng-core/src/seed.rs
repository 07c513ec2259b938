//! Seed files: one database statement per line

use std::path::Path;

use crate::error::{Error, Result};

/// A statement taken from a seed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedStatement {
    /// 1-based line number in the source file
    pub line: usize,
    pub text: String,
}

/// The executable statements of a seed file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedScript {
    pub statements: Vec<SeedStatement>,
}

impl SeedScript {
    /// Parse seed file contents.
    ///
    /// Lines that are blank after trimming, or whose first character is
    /// `/`, are comments. Every other line is kept verbatim.
    pub fn parse(contents: &str) -> Self {
        let statements = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !is_comment(line))
            .map(|(idx, line)| SeedStatement {
                line: idx + 1,
                text: line.to_string(),
            })
            .collect();
        Self { statements }
    }

    /// Read and parse a seed file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::SeedIo {
            path: path.to_path_buf(),
            source,
        })?;
        let script = Self::parse(&contents);
        tracing::debug!(
            "Loaded {} statements from {}",
            script.statements.len(),
            path.display()
        );
        Ok(script)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeedStatement> {
        self.statements.iter()
    }
}

fn is_comment(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_comments_and_blanks_skipped() {
        let contents = "// users\n\nCREATE (n:User {id:1, name:'Jon'});\n   \n/ also a comment\n";
        let script = SeedScript::parse(contents);

        assert_eq!(script.len(), 1);
        assert_eq!(
            script.statements[0],
            SeedStatement {
                line: 3,
                text: "CREATE (n:User {id:1, name:'Jon'});".to_string(),
            }
        );
    }

    #[test]
    fn test_indented_slash_is_not_a_comment() {
        let script = SeedScript::parse("  // not at column zero");
        assert_eq!(script.len(), 1);
        assert_eq!(script.statements[0].text, "  // not at column zero");
    }

    #[test]
    fn test_crlf_lines() {
        let script = SeedScript::parse("CREATE (a:User {id:1, name:'A'});\r\n\r\n");
        assert_eq!(script.len(), 1);
        assert_eq!(script.statements[0].text, "CREATE (a:User {id:1, name:'A'});");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "// seed").unwrap();
        writeln!(file, "CREATE (n:User {{ id:0, name: 'Anna'}});").unwrap();
        writeln!(file, "CREATE (n:User {{ id:1, name: 'Lucy'}});").unwrap();

        let script = SeedScript::load(file.path()).unwrap();
        let lines: Vec<_> = script.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SeedScript::load("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, Error::SeedIo { .. }));
    }
}
