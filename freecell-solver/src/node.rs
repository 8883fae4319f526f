use freecell_common::action::Action;
use freecell_common::board::Board;

use std::cmp::Ordering;

/// One stored search node: the action that produced it and where it came from.
#[derive(Debug, Clone, Copy)]
pub struct ActionNode {
    pub parent: u32,
    pub action: Option<Action>,
}

/// Flat arena of search nodes. The root has no action.
#[derive(Debug)]
pub struct NodeStorage {
    nodes: Vec<ActionNode>,
}

impl NodeStorage {
    pub fn new() -> Self {
        Self {
            nodes: vec![ActionNode {
                parent: 0,
                action: None,
            }],
        }
    }

    pub fn root(&self) -> u32 {
        0
    }

    pub fn push(&mut self, parent: u32, action: Action) -> u32 {
        self.nodes.push(ActionNode {
            parent,
            action: Some(action),
        });
        (self.nodes.len() - 1) as u32
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Walks parents back to the root and returns the actions in play order.
    pub fn path(&self, index: u32) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut node = self.nodes[index as usize];
        while let Some(action) = node.action {
            actions.push(action);
            node = self.nodes[node.parent as usize];
        }
        actions.reverse();
        actions
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Estimate {
    pub current: u32,
    pub remaining: u32,
}

impl Estimate {
    #[inline]
    pub fn total(&self) -> u32 {
        self.current.saturating_add(self.remaining)
    }
}

/// A* frontier entry. `BinaryHeap` is a max-heap, so the ordering is reversed:
/// the lowest `f`, then the earliest insertion, pops first.
#[derive(Debug)]
pub struct OpenEntry {
    pub index: u32,
    pub estimate: Estimate,
    pub seq: u64,
    pub board: Board,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total()
            .cmp(&self.estimate.total())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

#[cfg(test)]
mod tests {
    use super::*;
    use freecell_common::action::{Move, Supermove};
    use std::collections::BinaryHeap;

    #[test]
    fn test_path() {
        let mut nodes = NodeStorage::new();
        let a = nodes.push(nodes.root(), Move::TableauToFreecell(0).into());
        let b = nodes.push(a, Move::TableauToFoundation(1).into());
        let _sibling = nodes.push(a, Move::TableauToFreecell(2).into());
        let c = nodes.push(
            b,
            Supermove {
                from: 3,
                to: 4,
                count: 2,
            }
            .into(),
        );
        assert_eq!(nodes.len(), 5);
        assert!(nodes.path(nodes.root()).is_empty());
        let path = nodes.path(c);
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], Action::Move(Move::TableauToFreecell(0)));
        assert!(path[2].is_supermove());
    }

    #[test]
    fn test_open_order() {
        let entry = |index, current, remaining, seq| OpenEntry {
            index,
            estimate: Estimate { current, remaining },
            seq,
            board: Board::new(),
        };
        let mut open = BinaryHeap::new();
        open.push(entry(0, 3, 4, 0));
        open.push(entry(1, 1, 5, 1));
        open.push(entry(2, 2, 4, 2));
        open.push(entry(3, 0, 9, 3));
        let order: Vec<u32> = std::iter::from_fn(|| open.pop().map(|e| e.index)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_total_saturates() {
        let estimate = Estimate {
            current: 7,
            remaining: u32::MAX,
        };
        assert_eq!(estimate.total(), u32::MAX);
    }
}
