use std::cmp::Ordering;

/// Kind of a mirrored filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A file or directory in the mirrored tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    /// `None` for the root.
    pub parent: Option<NodeId>,
    /// `Some` only for directories; empty until the directory is fetched.
    pub children: Option<Vec<NodeId>>,
}

impl TreeNode {
    pub fn new(name: String, path: String, kind: NodeKind, parent: Option<NodeId>) -> Self {
        let children = match kind {
            NodeKind::Directory => Some(Vec::new()),
            NodeKind::File => None,
        };
        Self {
            name,
            path,
            kind,
            parent,
            children,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// One entry of a single-level directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
}

impl DirEntry {
    pub fn kind(&self) -> NodeKind {
        if self.is_directory {
            NodeKind::Directory
        } else {
            NodeKind::File
        }
    }
}

/// Child ordering: directories before files, then code-point order of the name.
///
/// Case-sensitive and locale-agnostic, so an unchanged directory always
/// lists in the same order.
pub fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_directory: bool) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            path: format!("/root/{name}"),
            is_directory,
        }
    }

    #[test]
    fn directories_sort_before_files_then_code_points() {
        let mut entries = vec![
            entry("b.md", false),
            entry("A", true),
            entry("a.md", false),
            entry("B", true),
        ];
        entries.sort_by(compare_entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "a.md", "b.md"]);
    }

    #[test]
    fn ordering_is_case_sensitive() {
        let mut entries = vec![entry("zeta", false), entry("Zeta", false), entry("alpha", false)];
        entries.sort_by(compare_entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "alpha", "zeta"]);
    }

    #[test]
    fn file_node_has_no_children() {
        let node = TreeNode::new("a.md".into(), "/root/a.md".into(), NodeKind::File, None);
        assert!(node.children.is_none());
        assert!(!node.is_dir());
    }

    #[test]
    fn directory_node_starts_unpopulated() {
        let node = TreeNode::new("docs".into(), "/root/docs".into(), NodeKind::Directory, None);
        assert_eq!(node.children.as_deref(), Some(&[][..]));
        assert!(node.is_dir());
    }
}
