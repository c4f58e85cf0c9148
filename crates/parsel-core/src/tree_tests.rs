use crate::tree::TreeNode;

#[test]
fn leaf_exposes_its_lexeme_as_name() {
    let leaf = TreeNode::Leaf("42".to_string());
    assert_eq!(leaf.name(), Some("42"));
    assert_eq!(leaf.def(), None);
    assert!(leaf.children().is_empty());
    assert!(leaf.is_leaf());
}

#[test]
fn interior_exposes_its_def_name_and_children() {
    let tree = TreeNode::Interior {
        def: "expr".to_string(),
        children: vec![TreeNode::Leaf("1".to_string()), TreeNode::Leaf("+".to_string())],
    };
    assert_eq!(tree.name(), None);
    assert_eq!(tree.def(), Some("expr"));
    assert_eq!(tree.children().len(), 2);
    assert!(!tree.is_leaf());
}
