//! The parse tree: an ordered tree of leaves (matched terminal lexemes) and
//! interiors (nonterminal definitions), with unlabeled intermediate nodes
//! hoisted away by the engine before they ever reach this type.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fully-built parse tree node.
///
/// Exactly one of leaf or interior, per spec: a leaf holds the literal
/// lexeme of a matched terminal; an interior refers to the nonterminal
/// definition that produced it. The engine never hands a caller the
/// transient "neither" accumulator used while building a `Seq`/`Alt` —
/// those are hoisted or discarded before a `TreeNode` is committed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TreeNode {
    /// A matched terminal's lexeme.
    Leaf(String),
    /// A nonterminal's match, named by the definition's display name.
    Interior {
        def: String,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    /// The lexeme, for a leaf; `None` for an interior.
    pub fn name(&self) -> Option<&str> {
        match self {
            TreeNode::Leaf(s) => Some(s),
            TreeNode::Interior { .. } => None,
        }
    }

    /// The producing definition's display name, for an interior; `None` for
    /// a leaf.
    pub fn def(&self) -> Option<&str> {
        match self {
            TreeNode::Leaf(_) => None,
            TreeNode::Interior { def, .. } => Some(def),
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Leaf(_) => &[],
            TreeNode::Interior { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }
}
