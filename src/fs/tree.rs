use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::fs::node::{compare_entries, DirEntry, NodeId, NodeKind, TreeNode};
use crate::fs::path;

/// Expansion state of a directory path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandState {
    Collapsed,
    /// A listing has been requested and not yet applied.
    Expanding,
    Expanded,
}

/// A one-level listing the store is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub path: String,
    /// Root generation the request was issued under.
    pub generation: u64,
}

/// What `TreeStore::activate` did with the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A file became the selected path.
    Selected,
    /// An expanded directory (and everything expanded below it) collapsed.
    Collapsed,
    /// A collapsed directory is now expanding; the caller must run the fetch.
    Fetch(FetchRequest),
}

/// A disk mutation requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateFile { parent: String },
    CreateDirectory { parent: String },
    Rename { from: String, to: String },
    Delete { path: String, kind: NodeKind },
}

/// A validated mutation together with the directory to re-list afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationPlan {
    pub mutation: Mutation,
    pub refresh_dir: String,
    pub generation: u64,
}

/// Result of running a mutation plan against the gateways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Canonical path reported by the gateway (none for deletes).
    pub path: Option<String>,
    /// Fresh listing of the plan's refresh directory.
    pub listing: Vec<DirEntry>,
}

/// A flattened row of the visible tree, for rendering.
#[derive(Debug, Clone)]
pub struct FlatItem {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub is_expanded: bool,
    pub is_loading: bool,
    pub is_last_sibling: bool,
}

/// The mirrored tree plus the UI cursors that refer into it.
///
/// Nodes live in an arena indexed by [`NodeId`]; parents and children refer
/// to each other by id, so a directory refresh swaps one child list without
/// rebuilding any ancestor. Every public operation is path-based.
#[derive(Debug, Default)]
pub struct TreeStore {
    nodes: Vec<Option<TreeNode>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    expanded: HashSet<String>,
    /// Directories with an expansion fetch in flight.
    loading: HashSet<String>,
    /// Refresh directories with a mutation in flight.
    pending: HashSet<String>,
    selected: Option<String>,
    editing: Option<String>,
    /// Bumped by every `replace_root`; completions from an older root are
    /// ignored.
    generation: u64,
}

impl TreeStore {
    /// Create an empty store with no folder opened.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Tree access ─────────────────────────────────────────────────────────

    pub fn root(&self) -> Option<&TreeNode> {
        self.root.and_then(|id| self.node(id))
    }

    pub fn root_path(&self) -> Option<&str> {
        self.root().map(|node| node.path.as_str())
    }

    /// Whether a completion tagged with `generation` still belongs to the
    /// current root.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Children of the node at `path`, in display order.
    #[cfg(test)]
    pub fn children(&self, dir: &str) -> Result<Vec<&TreeNode>> {
        let node = self.resolve_node(dir)?;
        Ok(node
            .children
            .iter()
            .flatten()
            .filter_map(|id| self.node(*id))
            .collect())
    }

    /// Number of live nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Walk the fetched tree from the root, one segment at a time.
    ///
    /// Fails with `NotFound` when the path lies outside the root or any
    /// segment is missing from its parent's last listing. Never touches disk.
    pub fn resolve_node(&self, target: &str) -> Result<&TreeNode> {
        let id = self.resolve_id(target)?;
        self.node(id)
            .ok_or_else(|| AppError::NotFound(target.to_string()))
    }

    fn resolve_id(&self, target: &str) -> Result<NodeId> {
        let target = path::normalize(target);
        let not_found = || AppError::NotFound(target.clone());
        let root_id = self.root.ok_or_else(not_found)?;
        let root = self.node(root_id).ok_or_else(not_found)?;
        let relative = path::relative_to(&target, &root.path).ok_or_else(not_found)?;

        let mut current = root_id;
        for segment in path::split_segments(relative) {
            current = self.child_named(current, segment).ok_or_else(not_found)?;
        }
        Ok(current)
    }

    fn child_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)?
            .children
            .as_ref()?
            .iter()
            .copied()
            .find(|id| self.node(*id).is_some_and(|child| child.name == name))
    }

    /// Resolve `target` only if it is still a directory in the tree.
    fn resolve_dir(&self, target: &str) -> Option<NodeId> {
        let id = self.resolve_id(target).ok()?;
        self.node(id).filter(|node| node.is_dir()).map(|_| id)
    }

    // ── Arena bookkeeping ───────────────────────────────────────────────────

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = Some(node);
            id
        } else {
            self.nodes.push(Some(node));
            NodeId(self.nodes.len() - 1)
        }
    }

    fn release_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
                stack.extend(node.children.into_iter().flatten());
                self.free.push(id);
            }
        }
    }

    /// Replace the children of `dir` wholesale with a fresh listing.
    ///
    /// Grandchildren fetched earlier are discarded and expansions below `dir`
    /// are dropped, so the user re-expands after a refresh.
    fn apply_listing(&mut self, dir: NodeId, mut entries: Vec<DirEntry>) {
        let Some(dir_path) = self
            .node(dir)
            .filter(|node| node.is_dir())
            .map(|node| node.path.clone())
        else {
            return;
        };

        let old = self
            .node_mut(dir)
            .and_then(|node| node.children.take())
            .unwrap_or_default();
        for child in old {
            self.release_subtree(child);
        }

        entries.sort_by(compare_entries);
        entries.dedup_by(|a, b| a.name == b.name);

        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            let child_path = path::join(&dir_path, &entry.name);
            if path::normalize(&entry.path) != child_path {
                warn!(listed = %entry.path, joined = %child_path, "listing path differs from parent join");
            }
            let kind = entry.kind();
            children.push(self.alloc(TreeNode::new(entry.name, child_path, kind, Some(dir))));
        }
        let count = children.len();
        if let Some(node) = self.node_mut(dir) {
            node.children = Some(children);
        }

        self.expanded
            .retain(|p| p == &dir_path || !path::is_within(p, &dir_path));
        debug!(dir = %dir_path, count, "applied listing");
    }

    // ── Root ────────────────────────────────────────────────────────────────

    /// Install a new root from its listing, discarding the previous tree.
    ///
    /// Every cursor tied to the old root is reset; the new root starts
    /// expanded.
    pub fn replace_root(&mut self, root_path: &str, entries: Vec<DirEntry>) {
        let root_path = path::normalize(root_path);
        let name = match path::last_segment(&root_path) {
            "" => root_path.clone(),
            segment => segment.to_string(),
        };

        self.nodes.clear();
        self.free.clear();
        self.expanded.clear();
        self.loading.clear();
        self.pending.clear();
        self.selected = None;
        self.editing = None;
        self.generation = self.generation.wrapping_add(1);

        let id = self.alloc(TreeNode::new(
            name,
            root_path.clone(),
            NodeKind::Directory,
            None,
        ));
        self.root = Some(id);
        self.apply_listing(id, entries);
        self.expanded.insert(root_path.clone());
        info!(root = %root_path, nodes = self.len(), "opened folder");
    }

    // ── Expansion ───────────────────────────────────────────────────────────

    pub fn expand_state(&self, target: &str) -> ExpandState {
        let target = path::normalize(target);
        if self.loading.contains(&target) {
            ExpandState::Expanding
        } else if self.expanded.contains(&target) {
            ExpandState::Expanded
        } else {
            ExpandState::Collapsed
        }
    }

    #[cfg(test)]
    pub fn expanded_paths(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, target: &str) -> bool {
        self.expanded.contains(&path::normalize(target))
    }

    /// Click on a tree entry: select a file, or toggle a directory.
    pub fn activate(&mut self, target: &str) -> Result<Activation> {
        let node = self.resolve_node(target)?;
        let node_path = node.path.clone();
        let kind = node.kind;
        match kind {
            NodeKind::File => {
                self.selected = Some(node_path);
                Ok(Activation::Selected)
            }
            NodeKind::Directory => match self.expand_state(&node_path) {
                ExpandState::Expanded => {
                    self.collapse_below(&node_path);
                    Ok(Activation::Collapsed)
                }
                ExpandState::Expanding => Err(AppError::Busy(node_path)),
                ExpandState::Collapsed => {
                    self.loading.insert(node_path.clone());
                    Ok(Activation::Fetch(FetchRequest {
                        path: node_path,
                        generation: self.generation,
                    }))
                }
            },
        }
    }

    /// Collapse `target` and every expanded path below it.
    ///
    /// Returns `false` when `target` was not expanded.
    pub fn collapse(&mut self, target: &str) -> bool {
        if !self.is_expanded(target) {
            return false;
        }
        self.collapse_below(&path::normalize(target));
        true
    }

    fn collapse_below(&mut self, target: &str) {
        self.expanded.retain(|p| !path::is_within(p, target));
    }

    /// Apply the result of an expansion fetch.
    ///
    /// On failure the directory falls back to collapsed and the error is
    /// returned. A listing for a directory that has left the tree is dropped.
    pub fn complete_fetch(
        &mut self,
        request: &FetchRequest,
        result: Result<Vec<DirEntry>>,
    ) -> Result<()> {
        if !self.is_current(request.generation) {
            debug!(path = %request.path, "dropping listing from a previous root");
            return Ok(());
        }
        self.loading.remove(&request.path);
        let entries = result?;
        match self.resolve_dir(&request.path) {
            Some(id) => {
                self.apply_listing(id, entries);
                self.expanded.insert(request.path.clone());
            }
            None => warn!(path = %request.path, "dropping listing for a directory no longer in the tree"),
        }
        Ok(())
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    /// Plan creating a new file or directory inside `parent`.
    pub fn plan_create(&mut self, parent: &str, kind: NodeKind) -> Result<MutationPlan> {
        let dir = self.resolve_node(parent)?;
        if !dir.is_dir() {
            return Err(AppError::NotADirectory(dir.path.clone()));
        }
        let parent = dir.path.clone();
        let mutation = match kind {
            NodeKind::File => Mutation::CreateFile {
                parent: parent.clone(),
            },
            NodeKind::Directory => Mutation::CreateDirectory {
                parent: parent.clone(),
            },
        };
        self.reserve(MutationPlan {
            mutation,
            refresh_dir: parent,
            generation: self.generation,
        })
    }

    /// Plan renaming `from` to `to`; the parent of `to` gets refreshed.
    pub fn plan_rename(&mut self, from: &str, to: &str) -> Result<MutationPlan> {
        let node = self.resolve_node(from)?;
        if node.parent.is_none() {
            return Err(AppError::InvalidPath(
                "the opened folder cannot be renamed".into(),
            ));
        }
        let from = node.path.clone();
        let to = path::normalize(to);
        if path::last_segment(&to).is_empty() {
            return Err(AppError::InvalidPath(format!("{to} has no file name")));
        }
        if to != from && path::is_within(&to, &from) {
            return Err(AppError::InvalidPath(format!(
                "cannot move {from} into itself"
            )));
        }

        let refresh_dir = path::parent_directory_path(&to);
        let dir = self.resolve_node(&refresh_dir)?;
        if !dir.is_dir() {
            return Err(AppError::NotADirectory(dir.path.clone()));
        }
        let refresh_dir = dir.path.clone();
        self.reserve(MutationPlan {
            mutation: Mutation::Rename { from, to },
            refresh_dir,
            generation: self.generation,
        })
    }

    /// Plan deleting `target`; its parent gets refreshed.
    ///
    /// The file/directory decision comes from the node's own kind.
    pub fn plan_delete(&mut self, target: &str) -> Result<MutationPlan> {
        let node = self.resolve_node(target)?;
        let parent = node
            .parent
            .and_then(|id| self.node(id))
            .ok_or_else(|| AppError::InvalidPath("the opened folder cannot be deleted".into()))?;
        let plan = MutationPlan {
            mutation: Mutation::Delete {
                path: node.path.clone(),
                kind: node.kind,
            },
            refresh_dir: parent.path.clone(),
            generation: self.generation,
        };
        self.reserve(plan)
    }

    fn reserve(&mut self, plan: MutationPlan) -> Result<MutationPlan> {
        if !self.pending.insert(plan.refresh_dir.clone()) {
            return Err(AppError::Busy(plan.refresh_dir));
        }
        Ok(plan)
    }

    #[cfg(test)]
    pub fn is_pending(&self, dir: &str) -> bool {
        self.pending.contains(dir)
    }

    /// Apply a finished mutation: refresh its directory, then move cursors.
    ///
    /// A failed mutation only releases the pending mark; tree and cursors stay
    /// as they were. A plan from an older root, or one whose refresh
    /// directory has left the tree, changes nothing and yields `Ok(None)`.
    /// Otherwise returns the canonical path reported by the gateway.
    pub fn complete_mutation(
        &mut self,
        plan: &MutationPlan,
        result: Result<MutationOutcome>,
    ) -> Result<Option<String>> {
        if !self.is_current(plan.generation) {
            debug!(mutation = ?plan.mutation, "dropping completion from a previous root");
            return result.map(|_| None);
        }
        self.pending.remove(&plan.refresh_dir);
        let outcome = result?;
        let result_path = outcome.path.as_deref().map(path::normalize);

        let Some(id) = self.resolve_dir(&plan.refresh_dir) else {
            warn!(dir = %plan.refresh_dir, "refresh directory left the tree; dropping completion");
            return Ok(None);
        };
        self.apply_listing(id, outcome.listing);
        self.expanded.insert(plan.refresh_dir.clone());

        match &plan.mutation {
            Mutation::CreateFile { .. } | Mutation::CreateDirectory { .. } => {
                if let Some(created) = &result_path {
                    self.selected = Some(created.clone());
                }
            }
            Mutation::Rename { from, .. } => {
                self.editing = None;
                self.collapse_below(from);
                self.selected = result_path.clone();
            }
            Mutation::Delete { path: deleted, .. } => {
                self.collapse_below(deleted);
                if self
                    .selected
                    .as_deref()
                    .is_some_and(|s| path::is_within(s, deleted))
                {
                    self.selected = None;
                }
                if self
                    .editing
                    .as_deref()
                    .is_some_and(|e| path::is_within(e, deleted))
                {
                    self.editing = None;
                }
            }
        }
        debug!(mutation = ?plan.mutation, ?result_path, "mutation applied");
        Ok(result_path)
    }

    // ── Cursors ─────────────────────────────────────────────────────────────

    pub fn selected_path(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Make `target` the selected path. It must be present in the tree.
    #[cfg(test)]
    pub fn select(&mut self, target: &str) -> Result<()> {
        let node = self.resolve_node(target)?;
        self.selected = Some(node.path.clone());
        Ok(())
    }

    pub fn editing_path(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Put `target` into rename-edit mode.
    pub fn begin_rename(&mut self, target: &str) -> Result<()> {
        let node = self.resolve_node(target)?;
        if node.parent.is_none() {
            return Err(AppError::InvalidPath(
                "the opened folder cannot be renamed".into(),
            ));
        }
        self.editing = Some(node.path.clone());
        Ok(())
    }

    pub fn cancel_rename(&mut self) {
        self.editing = None;
    }

    // ── Rendering snapshot ──────────────────────────────────────────────────

    /// Rows of the visible tree: the root, then every child of an expanded
    /// directory, depth first.
    pub fn flatten(&self) -> Vec<FlatItem> {
        let mut items = Vec::new();
        if let Some(root) = self.root {
            self.flatten_node(root, 0, true, &mut items);
        }
        items
    }

    fn flatten_node(&self, id: NodeId, depth: usize, is_last: bool, items: &mut Vec<FlatItem>) {
        let Some(node) = self.node(id) else {
            return;
        };
        let is_expanded = node.is_dir() && self.expanded.contains(&node.path);
        items.push(FlatItem {
            name: node.name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            depth,
            is_expanded,
            is_loading: self.loading.contains(&node.path),
            is_last_sibling: is_last,
        });

        if is_expanded {
            if let Some(children) = &node.children {
                let count = children.len();
                for (i, child) in children.iter().enumerate() {
                    self.flatten_node(*child, depth + 1, i + 1 == count, items);
                }
            }
        }
    }
}
