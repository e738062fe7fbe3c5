//! Hierarchical model of nested suites and leaf test cases
//!
//! Suites are inserted by slash-separated path from a flat, unordered
//! stream of dry-run records. Each internal node carries the total spec
//! count of its subtree; each leaf is exactly one test case.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::debug;

/// Single test case reported by a dry run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecReport {
    /// Full test case text, including enclosing container names
    pub name: String,

    /// Labels attached to the test case
    #[serde(default)]
    pub labels: Vec<String>,

    /// Source location (`file:line`), if reported
    #[serde(default)]
    pub location: Option<String>,
}

impl SpecReport {
    /// Path segment used for the leaf holding this case
    fn label(&self) -> String {
        self.name.trim().replace('/', " ")
    }
}

/// Node payload: either a grouping node or one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Internal { children: Vec<SuiteTree> },
    Leaf { spec: SpecReport },
}

/// Suite tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteTree {
    /// Hierarchical identifier, always prefixed by the parent's path
    pub path: String,

    /// Last path segment
    pub name: String,

    /// Free text from the dry run
    pub description: String,

    /// Specs in this subtree (1 for a leaf)
    pub spec_count: u64,

    pub kind: NodeKind,
}

impl SuiteTree {
    /// Create an empty internal node at `path`
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            path,
            description: String::new(),
            spec_count: 0,
            kind: NodeKind::Internal {
                children: Vec::new(),
            },
        }
    }

    /// Child nodes (empty for a leaf)
    pub fn children(&self) -> &[SuiteTree] {
        match &self.kind {
            NodeKind::Internal { children } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    /// The test case held by a leaf
    pub fn spec(&self) -> Option<&SpecReport> {
        match &self.kind {
            NodeKind::Leaf { spec } => Some(spec),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Find the node at `path` in this subtree
    pub fn find(&self, path: &str) -> Option<&SuiteTree> {
        let rest = self.relative(path)?;
        let mut node = self;
        for segment in rest.split('/').filter(|s| !s.is_empty()) {
            node = node.children().iter().find(|c| c.name == segment)?;
        }
        Some(node)
    }

    /// Record a suite at `path` with `spec_count` specs
    ///
    /// Every node walked on the way down accumulates `spec_count`; the node
    /// at `path` takes `description` and `spec_count` and loses any previous
    /// subtree. Paths outside this node are ignored and yield `None`.
    pub fn insert(
        &mut self,
        path: &str,
        description: &str,
        spec_count: u64,
    ) -> Option<&mut SuiteTree> {
        let Some(rest) = self.relative(path) else {
            debug!("Ignoring suite {} outside of {}", path, self.path);
            return None;
        };
        let segments: Vec<String> = rest
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let mut node = self;
        for segment in &segments {
            node.spec_count += spec_count;
            node = node.child_or_insert(segment);
        }

        node.spec_count = spec_count;
        node.description = description.to_string();
        node.kind = NodeKind::Internal {
            children: Vec::new(),
        };
        Some(node)
    }

    /// Add one leaf per test case below this node
    ///
    /// Counts on this node are left as inserted; callers insert the suite
    /// with the number of cases first.
    pub fn insert_specs<I>(&mut self, specs: I)
    where
        I: IntoIterator<Item = SpecReport>,
    {
        let parent = self.path.clone();
        let children = self.children_mut();
        for spec in specs {
            let label = spec.label();
            children.push(SuiteTree {
                path: join_path(&parent, &label),
                name: label,
                description: spec.name.clone(),
                spec_count: 1,
                kind: NodeKind::Leaf { spec },
            });
        }
    }

    /// Recursively order children by spec count, then name ascending
    pub fn sort(&mut self, descending: bool) {
        if let NodeKind::Internal { children } = &mut self.kind {
            children.sort_by(|a, b| {
                let by_count = if descending {
                    b.spec_count.cmp(&a.spec_count)
                } else {
                    a.spec_count.cmp(&b.spec_count)
                };
                by_count.then_with(|| a.name.cmp(&b.name))
            });
            for child in children.iter_mut() {
                child.sort(descending);
            }
        }
    }

    /// Collapse single-child chains from the root down to the first branch
    ///
    /// The new root keeps its own path, so suites under the dropped ancestors
    /// can no longer be inserted through it. Apply once, right before
    /// rendering.
    pub fn trim_root(&mut self) {
        loop {
            let only_child = match &mut self.kind {
                NodeKind::Internal { children } if children.len() == 1 => children.remove(0),
                _ => return,
            };
            *self = only_child;
        }
    }

    /// Indented outline, one node per line
    pub fn render(&self, include_leaves: bool) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, include_leaves);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize, include_leaves: bool) {
        let name = if self.name.is_empty() {
            self.path.as_str()
        } else {
            self.name.as_str()
        };
        let _ = match self.spec() {
            Some(spec) => match &spec.location {
                Some(location) => {
                    writeln!(out, "{:indent$}- {} ({})", "", name, location, indent = depth * 2)
                }
                None => writeln!(out, "{:indent$}- {}", "", name, indent = depth * 2),
            },
            None if self.description.is_empty() => {
                writeln!(out, "{:indent$}{} [{}]", "", name, self.spec_count, indent = depth * 2)
            }
            None => writeln!(
                out,
                "{:indent$}{} [{}] {}",
                "",
                name,
                self.spec_count,
                self.description,
                indent = depth * 2
            ),
        };

        for child in self.children() {
            if child.is_leaf() && !include_leaves {
                continue;
            }
            child.render_into(out, depth + 1, include_leaves);
        }
    }

    /// Part of `path` below this node, if `path` is inside it
    fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        relative_path(&self.path, path)
    }

    fn child_or_insert(&mut self, segment: &str) -> &mut SuiteTree {
        let path = join_path(&self.path, segment);
        let children = self.children_mut();
        let index = match children.iter().position(|c| c.name == segment) {
            Some(index) => index,
            None => {
                children.push(SuiteTree::new(path));
                children.len() - 1
            }
        };
        &mut children[index]
    }

    /// Children of this node, turning a leaf into an empty group first
    fn children_mut(&mut self) -> &mut Vec<SuiteTree> {
        if self.is_leaf() {
            self.kind = NodeKind::Internal {
                children: Vec::new(),
            };
        }
        match &mut self.kind {
            NodeKind::Internal { children } => children,
            NodeKind::Leaf { .. } => unreachable!("leaf replaced above"),
        }
    }
}

/// Part of `path` below `base`, matching whole segments only
pub(crate) fn relative_path<'a>(base: &str, path: &'a str) -> Option<&'a str> {
    if path == base {
        return Some("");
    }
    let rest = path.strip_prefix(base)?;
    if base.ends_with('/') {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, segment)
    } else {
        format!("{}/{}", parent, segment)
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> SpecReport {
        SpecReport {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn names(tree: &SuiteTree) -> Vec<&str> {
        tree.children().iter().map(|c| c.name.as_str()).collect()
    }

    fn assert_aggregates(node: &SuiteTree) {
        if node.is_leaf() {
            assert_eq!(node.spec_count, 1, "leaf {}", node.path);
            return;
        }
        if !node.children().is_empty() {
            let sum: u64 = node.children().iter().map(|c| c.spec_count).sum();
            assert_eq!(node.spec_count, sum, "node {}", node.path);
        }
        node.children().iter().for_each(assert_aggregates);
    }

    #[test]
    fn insert_accumulates_and_overwrites() {
        let mut root = SuiteTree::new("/");
        root.insert("/tests/netA", "net suite", 5);
        root.insert("/tests/netB", "net2", 2);

        assert_eq!(root.spec_count, 7);
        let tests = root.find("/tests").unwrap();
        assert_eq!(tests.spec_count, 7);
        assert_eq!(tests.path, "/tests");

        let net_a = root.find("/tests/netA").unwrap();
        assert_eq!(net_a.spec_count, 5);
        assert_eq!(net_a.description, "net suite");
        assert_eq!(net_a.name, "netA");
        assert_eq!(root.find("/tests/netB").unwrap().spec_count, 2);
    }

    #[test]
    fn insert_outside_prefix_is_ignored() {
        let mut node = SuiteTree::new("/tests/net");
        let before = node.clone();

        node.insert("/other/suite", "x", 3);
        node.insert("/tests/network", "x", 3);

        assert_eq!(node, before);
    }

    #[test]
    fn reinsert_discards_subtree() {
        let mut root = SuiteTree::new("/");
        root.insert("/a/b", "b", 2);
        assert!(root.find("/a/b").is_some());

        root.insert("/a", "a", 9);

        let a = root.find("/a").unwrap();
        assert_eq!(a.spec_count, 9);
        assert!(a.children().is_empty());
        assert!(root.find("/a/b").is_none());
    }

    #[test]
    fn insert_at_own_path_overwrites() {
        let mut root = SuiteTree::new("/suite");
        root.insert("/suite", "whole suite", 4);

        assert_eq!(root.spec_count, 4);
        assert_eq!(root.description, "whole suite");
    }

    #[test]
    fn insert_specs_creates_leaves() {
        let mut root = SuiteTree::new("/");
        let suite = root.insert("/e2e/storage", "storage", 2).unwrap();
        suite.insert_specs(vec![
            SpecReport {
                name: "mounts a volume".to_string(),
                labels: vec!["slow".to_string()],
                location: Some("storage_test.go:42".to_string()),
            },
            spec("resizes a/b volume"),
        ]);

        let suite = root.find("/e2e/storage").unwrap();
        assert_eq!(suite.children().len(), 2);
        let leaf = &suite.children()[0];
        assert!(leaf.is_leaf());
        assert_eq!(leaf.spec_count, 1);
        assert_eq!(leaf.path, "/e2e/storage/mounts a volume");
        assert_eq!(leaf.spec().unwrap().labels, vec!["slow".to_string()]);
        assert_eq!(suite.children()[1].name, "resizes a b volume");
        assert_aggregates(&root);
    }

    #[test]
    fn aggregates_hold_for_built_tree() {
        let mut root = SuiteTree::new("/");
        let suites = [
            ("/e2e/net/dns", vec!["resolves", "caches"]),
            ("/e2e/net/lb", vec!["balances"]),
            ("/e2e/storage", vec!["mounts", "resizes", "snapshots"]),
            ("/unit", vec!["parses"]),
        ];

        for (path, cases) in &suites {
            if let Some(node) = root.insert(path, "", cases.len() as u64) {
                node.insert_specs(cases.iter().map(|c| spec(c)));
            }
        }

        assert_eq!(root.spec_count, 7);
        assert_eq!(root.find("/e2e").unwrap().spec_count, 6);
        assert_eq!(root.find("/e2e/net").unwrap().spec_count, 3);
        assert_aggregates(&root);
    }

    #[test]
    fn sort_descending_then_name() {
        let mut root = SuiteTree::new("/");
        root.insert("/b", "", 3);
        root.insert("/a", "", 1);
        root.insert("/c", "", 3);

        root.sort(true);
        assert_eq!(names(&root), vec!["b", "c", "a"]);

        root.sort(false);
        assert_eq!(names(&root), vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_is_recursive() {
        let mut root = SuiteTree::new("/");
        root.insert("/x/small", "", 1);
        root.insert("/x/big", "", 5);

        root.sort(true);

        assert_eq!(names(root.find("/x").unwrap()), vec!["big", "small"]);
    }

    #[test]
    fn trim_root_collapses_chain() {
        let mut root = SuiteTree::new("/");
        root.insert("/suiteA/leaf1", "", 1);
        root.insert("/suiteA/leaf2", "", 1);

        root.trim_root();
        assert_eq!(root.path, "/suiteA");
        assert_eq!(root.children().len(), 2);

        let trimmed = root.clone();
        root.trim_root();
        assert_eq!(root, trimmed);
    }

    #[test]
    fn trim_root_follows_long_chain() {
        let mut root = SuiteTree::new("/");
        root.insert("/a/b/c/d", "", 1);
        root.insert("/a/b/c/e", "", 1);

        root.trim_root();
        assert_eq!(root.path, "/a/b/c");

        // Suites under the dropped ancestors no longer reach the new root
        assert!(root.insert("/a/x", "", 1).is_none());
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.spec_count, 2);
    }

    #[test]
    fn render_outline() {
        let mut root = SuiteTree::new("/");
        if let Some(net) = root.insert("/net", "network", 1) {
            net.insert_specs([spec("pings")]);
        }

        let without = root.render(false);
        assert_eq!(without, "/ [1]\n  net [1] network\n");

        let with = root.render(true);
        assert!(with.contains("    - pings"));
    }

    #[test]
    fn serde_tags_node_kind() {
        let mut root = SuiteTree::new("/");
        root.insert_specs([spec("one")]);

        let json = serde_json::to_value(&root).unwrap();
        assert!(json["kind"]["internal"]["children"].is_array());
        assert_eq!(
            json["kind"]["internal"]["children"][0]["kind"]["leaf"]["spec"]["name"],
            "one"
        );
    }
}
