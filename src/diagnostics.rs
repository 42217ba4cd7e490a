//! Positioned diagnostics for malformed documents.
//!
//! Every [`NodeKind::Error`](crate::syntax::NodeKind::Error) node in a syntax tree becomes
//! one [`Diagnostic`]. [`format`] renders them as the message carried by
//! [`Error::Parse`](crate::Error::Parse):
//!
//! ```text
//! Parse error:
//! Error at line 3, column 3:
//!     "b" 2,
//!     ^
//! ```

use crate::syntax::{Node, NodeKind, SyntaxTree};
use std::fmt;

/// One unparseable region, with 1-based line and column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    /// The full source line the region starts on, when it exists.
    pub source_line: Option<String>,
}

impl Diagnostic {
    fn at(node: Node<'_>, lines: &[&str]) -> Self {
        let point = node.start_point();
        Diagnostic {
            line: point.row + 1,
            column: point.column + 1,
            source_line: lines.get(point.row).map(|line| (*line).to_string()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error at line {}, column {}:", self.line, self.column)?;
        if let Some(line) = &self.source_line {
            let pointer = " ".repeat(self.column + 1);
            write!(f, "\n  {}\n{}^", line, pointer)?;
        }
        Ok(())
    }
}

/// Collects every error node of `tree`, depth first, in document order.
#[must_use]
pub fn find_errors<'a>(tree: &'a SyntaxTree<'_>) -> Vec<Node<'a>> {
    let mut errors = Vec::new();
    collect(tree.root_node(), &mut errors);
    errors
}

fn collect<'a>(node: Node<'a>, errors: &mut Vec<Node<'a>>) {
    if node.kind() == NodeKind::Error {
        errors.push(node);
    }
    for child in node.children() {
        collect(child, errors);
    }
}

/// Builds one diagnostic per error node.
#[must_use]
pub fn diagnose(errors: &[Node<'_>], source: &str) -> Vec<Diagnostic> {
    let lines: Vec<&str> = source.lines().collect();
    errors.iter().map(|&node| Diagnostic::at(node, &lines)).collect()
}

/// Renders error nodes as a user-presentable message.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::diagnostics::{find_errors, format};
/// use serde_ziggy::syntax::SyntaxTree;
///
/// let source = "[1, ?, 3]";
/// let tree = SyntaxTree::parse(source);
/// let message = format(&find_errors(&tree), source);
/// assert_eq!(message, "Parse error:\nError at line 1, column 5:\n  [1, ?, 3]\n      ^");
/// ```
#[must_use]
pub fn format(errors: &[Node<'_>], source: &str) -> String {
    render(&diagnose(errors, source))
}

pub(crate) fn render(diagnostics: &[Diagnostic]) -> String {
    let blocks: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    format!("Parse error:\n{}", blocks.join("\n"))
}
