//! 元素树单元测试
//! 测试 parent/key 回填、key 链相等、兄弟查询

use crate::{ElementId, ElementKind, ElementTree, Properties};

/// 辅助函数：创建无属性的 view 元素
fn view(tree: &mut ElementTree, children: Vec<ElementId>) -> ElementId {
    tree.element(
        ElementKind::View("view".to_string()),
        Properties::new(),
        children,
    )
}

/// 辅助函数：创建带 key 的 view 元素
fn keyed_view(tree: &mut ElementTree, key: &str) -> ElementId {
    tree.element(
        ElementKind::View("view".to_string()),
        Properties::new().with_key(key),
        Vec::new(),
    )
}

/// 测试子元素 parent 与位置 key 回填
#[test]
fn test_parent_and_positional_key_backfill() {
    let mut tree = ElementTree::new();
    let a = view(&mut tree, vec![]);
    let b = view(&mut tree, vec![]);
    let c = view(&mut tree, vec![]);
    let parent = view(&mut tree, vec![a, b, c]);

    for (index, child) in [a, b, c].iter().enumerate() {
        assert_eq!(tree.parent(*child), Some(parent));
        assert_eq!(tree.key(*child), Some(index.to_string().as_str()));
    }
}

/// 测试显式 key 不被位置 key 覆盖
#[test]
fn test_explicit_key_wins_over_positional() {
    let mut tree = ElementTree::new();
    let a = keyed_view(&mut tree, "header");
    let b = view(&mut tree, vec![]);
    let _parent = view(&mut tree, vec![a, b]);

    assert_eq!(tree.key(a), Some("header"));
    assert_eq!(tree.key(b), Some("1"));
}

/// 同级重复 key 是树描述错误
#[test]
#[should_panic(expected = "重复 key")]
fn test_duplicate_sibling_keys_panic() {
    let mut tree = ElementTree::new();
    let a = keyed_view(&mut tree, "x");
    let b = keyed_view(&mut tree, "x");
    view(&mut tree, vec![a, b]);
}

/// key 链相等: 自反, 且沿父链结构化比较
#[test]
fn test_equality_by_key_chain() {
    let mut tree = ElementTree::new();
    let a = keyed_view(&mut tree, "x");
    let b = keyed_view(&mut tree, "y");
    let parent = view(&mut tree, vec![a, b]);

    // 自反
    assert!(tree.equal(a, a));
    assert!(tree.equal(parent, parent));

    // 同级不同 key 不相等
    assert!(!tree.equal(a, b));
}

/// 相同父链下同 key 元素两两相等 (传递性)
#[test]
fn test_equality_is_transitive() {
    let mut tree = ElementTree::new();
    let a = keyed_view(&mut tree, "x");
    let b = keyed_view(&mut tree, "x");
    let c = keyed_view(&mut tree, "x");
    // 三个无 key 的根互相相等, 子链随之相等
    view(&mut tree, vec![a]);
    view(&mut tree, vec![b]);
    view(&mut tree, vec![c]);

    assert!(tree.equal(a, b));
    assert!(tree.equal(b, c));
    assert!(tree.equal(a, c));
}

/// 同 key 但父链不同的元素不相等
#[test]
fn test_equality_distinguishes_parent_chains() {
    let mut tree = ElementTree::new();
    let a = keyed_view(&mut tree, "x");
    let b = keyed_view(&mut tree, "x");
    let p1 = tree.element(
        ElementKind::View("view".to_string()),
        Properties::new().with_key("left"),
        vec![a],
    );
    let p2 = tree.element(
        ElementKind::View("view".to_string()),
        Properties::new().with_key("right"),
        vec![b],
    );

    assert!(!tree.equal(p1, p2));
    assert!(!tree.equal(a, b));
}

/// 场景: [div(a), div(b), div(c)] 查询 b 的相邻关系
#[test]
fn test_adjacent_queries_scenario() {
    let mut tree = ElementTree::new();
    let a = keyed_view(&mut tree, "a");
    let b = keyed_view(&mut tree, "b");
    let c = keyed_view(&mut tree, "c");
    view(&mut tree, vec![a, b, c]);

    let direct = tree.direct_adjacent(b).unwrap();
    assert_eq!(tree.key(direct), Some("a"));

    let before = tree.indirect_adjacents(b);
    assert_eq!(before.len(), 1);
    assert_eq!(tree.key(before[0]), Some("a"));

    let after = tree.subsequent_adjacents(b);
    assert_eq!(after.len(), 1);
    assert_eq!(tree.key(after[0]), Some("c"));
}

/// 相邻查询对子列表构成正确划分
#[test]
fn test_adjacent_queries_partition_children() {
    let mut tree = ElementTree::new();
    let children: Vec<_> = (0..5).map(|_| view(&mut tree, vec![])).collect();
    view(&mut tree, children.clone());

    let n = children.len();
    for (i, child) in children.iter().enumerate() {
        let before = tree.indirect_adjacents(*child);
        let after = tree.subsequent_adjacents(*child);

        assert_eq!(before.len(), i);
        assert_eq!(after.len(), n - 1 - i);
        assert_eq!(tree.direct_adjacent(*child), before.last().copied());
    }
}

/// 根元素没有兄弟
#[test]
fn test_root_has_no_adjacents() {
    let mut tree = ElementTree::new();
    let root = view(&mut tree, vec![]);

    assert_eq!(tree.direct_adjacent(root), None);
    assert!(tree.indirect_adjacents(root).is_empty());
    assert!(tree.subsequent_adjacents(root).is_empty());
}

/// 测试构建: 未注册标签落成通用视图节点, 子树递归构建
#[test]
fn test_build_default_view_tree() {
    let mut tree = ElementTree::new();
    let child = tree.element(
        ElementKind::View("text".to_string()),
        Properties::new().with("content", crate::PropertyValue::String("hi".to_string())),
        Vec::new(),
    );
    let root = view(&mut tree, vec![child]);

    let node = tree.build(root, None, None);
    let view_node = node.as_view().unwrap();
    assert_eq!(view_node.tag, "view");
    assert_eq!(view_node.children.len(), 1);

    let text_node = view_node.children[0].as_view().unwrap();
    assert_eq!(text_node.tag, "text");
    assert_eq!(
        text_node.properties.get("content"),
        Some(&crate::PropertyValue::String("hi".to_string()))
    );
}

/// 受检节点访问在类型不符时报错
#[test]
fn test_checked_node_access() {
    let mut tree = ElementTree::new();
    let root = view(&mut tree, vec![]);
    let mut node = tree.build(root, None, None);

    assert!(node.as_view().is_ok());
    assert!(node.as_component_mut().is_err());
}
