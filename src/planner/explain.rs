//! Explain output
//!
//! One line per plan node, root first: `<depth> <kind> [<detail>]`. The
//! text is deterministic and stable across runs.

use std::fmt;

use serde::Serialize;

use super::plan::Plan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainLine {
    pub level: usize,
    pub kind: String,
    pub detail: String,
}

impl fmt::Display for ExplainLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{} {}", self.level, self.kind)
        } else {
            write!(f, "{} {} {}", self.level, self.kind, self.detail)
        }
    }
}

/// Explain plan output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainPlan {
    pub lines: Vec<ExplainLine>,
}

impl ExplainPlan {
    pub fn from_plan(plan: &Plan<'_>) -> Self {
        let lines = plan
            .root
            .walk()
            .into_iter()
            .map(|(level, node)| ExplainLine {
                level,
                kind: node.kind().to_string(),
                detail: node.detail(),
            })
            .collect();
        Self { lines }
    }

    /// Rendered lines, one per node.
    pub fn to_lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.to_string()).collect()
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}
