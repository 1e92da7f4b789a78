//! Turns raw execution output into numbered, classified display lines.

use serde::{Deserialize, Serialize};

/// How a line of output is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Output,
    Error,
}

/// One renderable line of execution output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    /// 1-based.
    pub line_number: usize,
    pub content: String,
    pub kind: OutputKind,
}

/// Splits `raw_output` on `\n` into numbered lines.
///
/// Empty lines are kept, including the trailing empty line produced by text
/// that ends with a line break. When `succeeded` is false every line is
/// [`OutputKind::Error`].
pub fn format_output(raw_output: &str, succeeded: bool) -> Vec<OutputLine> {
    let kind = if succeeded {
        OutputKind::Output
    } else {
        OutputKind::Error
    };

    raw_output
        .split('\n')
        .enumerate()
        .map(|(i, content)| OutputLine {
            line_number: i + 1,
            content: content.to_string(),
            kind,
        })
        .collect()
}
