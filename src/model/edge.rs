//! Undirected topology edges (spec §3, §4.9).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub a: String,
    pub b: String,
    pub a_port: Option<String>,
    pub b_port: Option<String>,
}

impl Edge {
    pub fn new(a: impl Into<String>, b: impl Into<String>, a_port: Option<String>, b_port: Option<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            a_port,
            b_port,
        }
    }

    /// True when `other` is the same undirected edge, in either direction.
    pub fn matches_undirected(&self, other: &Edge) -> bool {
        (self.a == other.a && self.b == other.b && self.a_port == other.a_port && self.b_port == other.b_port)
            || (self.a == other.b
                && self.b == other.a
                && self.a_port == other.b_port
                && self.b_port == other.a_port)
    }
}
