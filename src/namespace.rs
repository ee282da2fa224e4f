use crate::domain::NamespaceEntry;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(Vec<String>);

impl PathId {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn joined(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl fmt::Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined("/"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTreeNode {
    pub segment: String,
    pub children: Vec<NamespaceTreeNode>,
    pub entry: Option<NamespaceEntry>,
    // segment -> position in `children`
    index: HashMap<String, usize>,
}

impl NamespaceTreeNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            children: Vec::new(),
            entry: None,
            index: HashMap::new(),
        }
    }

    fn insert(&mut self, segments: &[String], entry: NamespaceEntry) {
        let mut node = self;
        for segment in segments {
            let existing = node.index.get(segment).copied();
            let idx = match existing {
                Some(idx) => idx,
                None => {
                    node.children.push(NamespaceTreeNode::new(segment));
                    let idx = node.children.len() - 1;
                    node.index.insert(segment.clone(), idx);
                    idx
                }
            };
            node = &mut node.children[idx];
        }
        // Last write wins on duplicate paths.
        node.entry = Some(entry);
    }
}

pub fn build(entries: &[NamespaceEntry], separator: &str) -> NamespaceTreeNode {
    let mut root = NamespaceTreeNode::new("");
    for entry in entries {
        let segments = split_segments(&entry.full_name, separator);
        root.insert(&segments, entry.clone());
    }
    root
}

fn split_segments(name: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return vec![name.to_string()];
    }
    name.split(separator).map(str::to_string).collect()
}

#[cfg(test)]
impl NamespaceTreeNode {
    fn child(&self, segment: &str) -> Option<&NamespaceTreeNode> {
        self.index.get(segment).map(|&idx| &self.children[idx])
    }

    fn find(&self, path: &PathId) -> Option<&NamespaceTreeNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    fn is_leaf(&self) -> bool {
        self.entry.is_some() && self.children.is_empty()
    }

    fn is_interior(&self) -> bool {
        !self.children.is_empty()
    }

    fn leaf_paths(&self, separator: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_entry_paths(&PathId::root(), separator, &mut out);
        out
    }

    fn collect_entry_paths(&self, path: &PathId, separator: &str, out: &mut Vec<String>) {
        if self.entry.is_some() {
            out.push(path.joined(separator));
        }
        for child in &self.children {
            child.collect_entry_paths(&path.child(&child.segment), separator, out);
        }
    }
}
