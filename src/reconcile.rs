use crate::namespace::{NamespaceTreeNode, PathId};
use std::collections::BTreeSet;

pub type ExpansionState = BTreeSet<PathId>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode<T> {
    Group {
        path: PathId,
        header: T,
        expanded: bool,
        children: Vec<ViewNode<T>>,
    },
    Row {
        path: PathId,
        content: T,
    },
}

impl<T> ViewNode<T> {
    pub fn path(&self) -> &PathId {
        match self {
            ViewNode::Group { path, .. } | ViewNode::Row { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow<'a, T> {
    pub path: &'a PathId,
    pub depth: usize,
    pub is_group: bool,
    pub expanded: bool,
    pub content: &'a T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeView<T> {
    roots: Vec<ViewNode<T>>,
}

impl<T> Default for TreeView<T> {
    fn default() -> Self {
        Self { roots: Vec::new() }
    }
}

impl<T> TreeView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded_paths(&self) -> ExpansionState {
        let mut out = ExpansionState::new();
        collect_expanded(&self.roots, &mut out);
        out
    }

    #[cfg(test)]
    pub fn is_expanded(&self, path: &PathId) -> bool {
        self.expanded_paths().contains(path)
    }

    pub fn toggle(&mut self, path: &PathId) -> bool {
        match find_node_mut(&mut self.roots, path) {
            Some(ViewNode::Group { expanded, .. }) => {
                *expanded = !*expanded;
                true
            }
            _ => false,
        }
    }

    pub fn expand(&mut self, path: &PathId) -> bool {
        self.set_expanded(path, true)
    }

    pub fn collapse(&mut self, path: &PathId) -> bool {
        self.set_expanded(path, false)
    }

    fn set_expanded(&mut self, path: &PathId, value: bool) -> bool {
        match find_node_mut(&mut self.roots, path) {
            Some(ViewNode::Group { expanded, .. }) if *expanded != value => {
                *expanded = value;
                true
            }
            _ => false,
        }
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow<'_, T>> {
        let mut out = Vec::new();
        push_visible(&self.roots, 0, &mut out);
        out
    }

    // Expansion is captured and the tree rebuilt in one synchronous pass.
    pub fn replace<F>(&mut self, tree: &NamespaceTreeNode, render: F) -> ExpansionState
    where
        F: FnMut(&NamespaceTreeNode, &PathId) -> T,
    {
        let previous = self.expanded_paths();
        reconcile(self, tree, &previous, render)
    }
}

/// Returns the subset of `previous` that still exists and was reopened.
pub fn reconcile<T, F>(
    view: &mut TreeView<T>,
    tree: &NamespaceTreeNode,
    previous: &ExpansionState,
    mut render: F,
) -> ExpansionState
where
    F: FnMut(&NamespaceTreeNode, &PathId) -> T,
{
    let root = PathId::root();
    let mut roots: Vec<ViewNode<T>> = tree
        .children
        .iter()
        .map(|child| render_node(child, root.child(&child.segment), &mut render))
        .collect();

    let mut realized = ExpansionState::new();
    for path in previous {
        if let Some(ViewNode::Group { expanded, .. }) = find_node_mut(&mut roots, path) {
            *expanded = true;
            realized.insert(path.clone());
        }
    }

    view.roots = roots;
    realized
}

fn render_node<T, F>(node: &NamespaceTreeNode, path: PathId, render: &mut F) -> ViewNode<T>
where
    F: FnMut(&NamespaceTreeNode, &PathId) -> T,
{
    let content = render(node, &path);
    if node.children.is_empty() {
        return ViewNode::Row { path, content };
    }

    let children = node
        .children
        .iter()
        .map(|child| render_node(child, path.child(&child.segment), render))
        .collect();
    ViewNode::Group {
        path,
        header: content,
        expanded: false,
        children,
    }
}

fn collect_expanded<T>(nodes: &[ViewNode<T>], out: &mut ExpansionState) {
    for node in nodes {
        if let ViewNode::Group {
            path,
            expanded,
            children,
            ..
        } = node
        {
            if *expanded {
                out.insert(path.clone());
            }
            collect_expanded(children, out);
        }
    }
}

fn push_visible<'a, T>(nodes: &'a [ViewNode<T>], depth: usize, out: &mut Vec<VisibleRow<'a, T>>) {
    for node in nodes {
        match node {
            ViewNode::Row { path, content } => out.push(VisibleRow {
                path,
                depth,
                is_group: false,
                expanded: false,
                content,
            }),
            ViewNode::Group {
                path,
                header,
                expanded,
                children,
            } => {
                out.push(VisibleRow {
                    path,
                    depth,
                    is_group: true,
                    expanded: *expanded,
                    content: header,
                });
                if *expanded {
                    push_visible(children, depth + 1, out);
                }
            }
        }
    }
}

fn find_node_mut<'a, T>(
    nodes: &'a mut [ViewNode<T>],
    path: &PathId,
) -> Option<&'a mut ViewNode<T>> {
    let (first, rest) = path.segments().split_first()?;
    let mut node = nodes
        .iter_mut()
        .find(|n| n.path().segments().last() == Some(first))?;
    for segment in rest {
        let ViewNode::Group { children, .. } = node else {
            return None;
        };
        node = children
            .iter_mut()
            .find(|n| n.path().segments().last() == Some(segment))?;
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NamespaceEntry, RefKind};
    use crate::namespace::build;
    use pretty_assertions::assert_eq;

    fn entries(names: &[&str]) -> Vec<NamespaceEntry> {
        names
            .iter()
            .map(|name| NamespaceEntry {
                full_name: name.to_string(),
                shorthand: name.to_string(),
                kind: RefKind::Local,
                is_head: *name == "main",
                ahead: 0,
                behind: 0,
            })
            .collect()
    }

    fn label(node: &NamespaceTreeNode, _path: &PathId) -> String {
        match &node.entry {
            Some(entry) if entry.is_head => format!("* {}", node.segment),
            _ => node.segment.clone(),
        }
    }

    fn path(segments: &[&str]) -> PathId {
        PathId::from_segments(segments.iter().copied())
    }

    fn visible_labels(view: &TreeView<String>) -> Vec<String> {
        view.visible_rows()
            .iter()
            .map(|row| format!("{}{}", "  ".repeat(row.depth), row.content))
            .collect()
    }

    #[test]
    fn groups_start_collapsed() {
        let tree = build(&entries(&["main", "feature/a", "feature/b"]), "/");
        let mut view = TreeView::new();
        let realized = view.replace(&tree, label);

        assert!(realized.is_empty());
        assert_eq!(visible_labels(&view), vec!["* main", "feature"]);
    }

    #[test]
    fn expansion_survives_snapshot_that_removes_a_sibling() {
        let first = build(&entries(&["main", "feature/a", "feature/b"]), "/");
        let mut view = TreeView::new();
        view.replace(&first, label);
        assert!(view.toggle(&path(&["feature"])));
        assert_eq!(
            visible_labels(&view),
            vec!["* main", "feature", "  a", "  b"]
        );

        let second = build(&entries(&["main", "feature/a"]), "/");
        let realized = view.replace(&second, label);

        assert!(realized.contains(&path(&["feature"])));
        assert!(view.is_expanded(&path(&["feature"])));
        assert_eq!(visible_labels(&view), vec!["* main", "feature", "  a"]);
    }

    #[test]
    fn vanished_paths_are_dropped_from_the_realized_set() {
        let first = build(&entries(&["release/v1/hotfix", "feature/a"]), "/");
        let mut view = TreeView::new();
        view.replace(&first, label);
        view.expand(&path(&["release"]));
        view.expand(&path(&["release", "v1"]));
        view.expand(&path(&["feature"]));

        let second = build(&entries(&["feature/a", "feature/c"]), "/");
        let realized = view.replace(&second, label);

        assert_eq!(realized, [path(&["feature"])].into_iter().collect());
        assert_eq!(view.expanded_paths(), realized);
    }

    #[test]
    fn reconcile_is_stable_for_an_unchanged_tree() {
        let tree = build(
            &entries(&["main", "feature/a", "feature/b", "release/v1/hotfix"]),
            "/",
        );
        let mut view = TreeView::new();
        let previous: ExpansionState = [path(&["release"]), path(&["release", "v1"]), path(&["gone"])]
            .into_iter()
            .collect();

        let first = reconcile(&mut view, &tree, &previous, label);
        let rows_after_first = visible_labels(&view);
        let second = reconcile(&mut view, &tree, &first, label);

        assert_eq!(first, second);
        assert_eq!(visible_labels(&view), rows_after_first);
        assert!(!first.contains(&path(&["gone"])));
    }

    #[test]
    fn previous_state_is_not_mutated() {
        let tree = build(&entries(&["feature/a"]), "/");
        let previous: ExpansionState = [path(&["feature"]), path(&["missing"])].into_iter().collect();
        let snapshot = previous.clone();
        let mut view = TreeView::new();
        reconcile(&mut view, &tree, &previous, label);
        assert_eq!(previous, snapshot);
    }

    #[test]
    fn leaves_cannot_be_toggled() {
        let tree = build(&entries(&["main", "feature/a"]), "/");
        let mut view = TreeView::new();
        view.replace(&tree, label);
        assert!(!view.toggle(&path(&["main"])));
        assert!(!view.toggle(&path(&["nope"])));
        assert!(view.expanded_paths().is_empty());
    }

    #[test]
    fn toggle_flips_only_the_target_group() {
        let tree = build(&entries(&["a/x", "b/y"]), "/");
        let mut view = TreeView::new();
        view.replace(&tree, label);
        view.toggle(&path(&["a"]));
        assert!(view.is_expanded(&path(&["a"])));
        assert!(!view.is_expanded(&path(&["b"])));
        view.toggle(&path(&["a"]));
        assert!(view.expanded_paths().is_empty());
    }

    #[test]
    fn renderer_sees_paths_in_depth_first_insertion_order() {
        let tree = build(&entries(&["b/one", "a", "b/two"]), "/");
        let mut seen = Vec::new();
        let mut view = TreeView::new();
        view.replace(&tree, |node, path: &PathId| {
            seen.push(path.joined("/"));
            node.segment.clone()
        });
        assert_eq!(seen, vec!["b", "b/one", "b/two", "a"]);
    }

    #[test]
    fn nested_group_stays_open_under_a_collapsed_parent() {
        let tree = build(&entries(&["release/v1/hotfix"]), "/");
        let mut view = TreeView::new();
        view.replace(&tree, label);
        view.expand(&path(&["release"]));
        view.expand(&path(&["release", "v1"]));
        view.collapse(&path(&["release"]));
        assert_eq!(visible_labels(&view), vec!["release"]);

        view.replace(&tree, label);
        view.expand(&path(&["release"]));
        assert_eq!(visible_labels(&view), vec!["release", "  v1", "    hotfix"]);
    }
}
