use crate::models::Neuron;

/// Arena index of a rendered node.
///
/// Slot ids are synthetic: the logical neuron id is carried by the wrapped
/// [`Neuron`] and is used only for deduplication and new-record detection,
/// never for arena addressing. The same neuron id may therefore occur in
/// several slots at different depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

/// A rendered node: a neuron plus its ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub neuron: Neuron,
    children: Vec<SlotId>,
}

impl TreeNode {
    pub fn children(&self) -> &[SlotId] {
        &self.children
    }
}

/// The in-memory collection of rendered nodes for the current session.
///
/// Created empty, fully replaced by a reload, extended by polls, and dropped on
/// teardown. Orphaned slots left behind by a child replacement are reclaimed on
/// the next [`clear`](Forest::clear).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    slots: Vec<TreeNode>,
    roots: Vec<SlotId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.roots.clear();
    }

    fn insert(&mut self, neuron: Neuron) -> SlotId {
        let slot = SlotId(self.slots.len());
        self.slots.push(TreeNode {
            neuron,
            children: Vec::new(),
        });
        slot
    }

    /// Append a root node, preserving arrival order.
    pub fn push_root(&mut self, neuron: Neuron) -> SlotId {
        let slot = self.insert(neuron);
        self.roots.push(slot);
        slot
    }

    /// Append a child under `parent`, preserving arrival order.
    pub fn add_child(&mut self, parent: SlotId, neuron: Neuron) -> SlotId {
        let slot = self.insert(neuron);
        self.slots[parent.0].children.push(slot);
        slot
    }

    /// Detach all children of `parent` (their slots stay allocated until the
    /// next clear).
    pub fn clear_children(&mut self, parent: SlotId) {
        self.slots[parent.0].children.clear();
    }

    pub fn node(&self, slot: SlotId) -> &TreeNode {
        &self.slots[slot.0]
    }

    pub fn roots(&self) -> &[SlotId] {
        &self.roots
    }

    pub fn last_root(&self) -> Option<&TreeNode> {
        self.roots.last().map(|&slot| self.node(slot))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Whether a neuron id is already rendered among the roots.
    pub fn has_root_id(&self, id: &str) -> bool {
        self.roots.iter().any(|&slot| self.node(slot).neuron.id == id)
    }

    /// Depth-first pre-order visit over the whole forest.
    pub fn visit(&self, mut f: impl FnMut(&TreeNode)) {
        for &root in &self.roots {
            self.visit_from(root, &mut f);
        }
    }

    fn visit_from(&self, slot: SlotId, f: &mut impl FnMut(&TreeNode)) {
        let node = self.node(slot);
        f(node);
        for &child in &node.children {
            self.visit_from(child, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelativeType;

    fn neuron(id: &str) -> Neuron {
        Neuron {
            id: id.to_string(),
            tag: id.to_uppercase(),
            version: "1".to_string(),
            relative_type: RelativeType::NotSet,
            terminal: None,
        }
    }

    #[test]
    fn visit_is_depth_first_pre_order() {
        let mut forest = Forest::new();
        let a = forest.push_root(neuron("a"));
        let b = forest.add_child(a, neuron("b"));
        forest.add_child(b, neuron("c"));
        forest.add_child(a, neuron("d"));
        forest.push_root(neuron("e"));

        let mut order = Vec::new();
        forest.visit(|node| order.push(node.neuron.id.clone()));
        assert_eq!(order, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn clear_children_detaches_subtree() {
        let mut forest = Forest::new();
        let a = forest.push_root(neuron("a"));
        forest.add_child(a, neuron("b"));
        forest.clear_children(a);

        let mut order = Vec::new();
        forest.visit(|node| order.push(node.neuron.id.clone()));
        assert_eq!(order, ["a"]);
    }

    #[test]
    fn has_root_id_checks_roots_only() {
        let mut forest = Forest::new();
        let a = forest.push_root(neuron("a"));
        forest.add_child(a, neuron("b"));
        assert!(forest.has_root_id("a"));
        assert!(!forest.has_root_id("b"));
    }
}
