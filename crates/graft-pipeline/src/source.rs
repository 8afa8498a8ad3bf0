//! Record sources
//!
//! A source yields one JSON record per non-blank line. Files are streamed
//! line by line rather than read whole. Lines come back as raw bytes so a
//! line that is not valid UTF-8 fails on its own instead of ending the file.

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Where a batch of records comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A JSON Lines file
    File(PathBuf),
    /// Records held in memory, mainly for tests and piping
    Inline { name: String, text: String },
}

impl InputSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn inline(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Inline {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Name used in reports and logs
    pub fn name(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline { name, .. } => name.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Inline { .. } => None,
        }
    }

    pub(crate) async fn open(&self) -> std::io::Result<SourceLines> {
        match self {
            Self::File(path) => {
                let file = File::open(path).await?;
                Ok(SourceLines::File(BufReader::new(file)))
            }
            Self::Inline { text, .. } => Ok(SourceLines::Inline(
                text.lines().map(str::to_string).collect::<Vec<_>>().into_iter(),
            )),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Line reader over an opened source
pub(crate) enum SourceLines {
    File(BufReader<File>),
    Inline(std::vec::IntoIter<String>),
}

impl SourceLines {
    /// Next line without its `\n` or `\r\n` terminator
    pub(crate) async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        match self {
            Self::File(reader) => {
                let mut line = Vec::new();
                if reader.read_until(b'\n', &mut line).await? == 0 {
                    return Ok(None);
                }
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                Ok(Some(line))
            }
            Self::Inline(lines) => Ok(lines.next().map(String::into_bytes)),
        }
    }
}
