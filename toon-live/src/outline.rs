//! Hierarchical outline derived from a parse result
//!
//! Building the outline is a pure function of the parse result: the same
//! input always produces the same tree, and nothing here mutates shared
//! state. Items are addressed by [`OutlinePath`], the child-index path from
//! the root, so views can hold stable references across rebuilds of
//! identical structure.

use toon::{ObjectNode, ParseResult, Value};

/// How an item is rendered: top-level entries are emphasized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualWeight {
    Bold,
    Normal,
}

/// Which icon an item gets: containers hold nested properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Container,
    Property,
}

/// One outline entry with its children
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineItem {
    pub text: String,
    pub depth: usize,
    pub start: usize,
    pub end: usize,
    pub weight: VisualWeight,
    pub icon: IconKind,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    /// Whether an offset falls on this item, inclusive of the position
    /// immediately after it
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Child-index path from the root to an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlinePath(pub Vec<usize>);

/// Build the outline for a parse result
pub fn build(result: &ParseResult) -> Vec<OutlineItem> {
    build_items(&result.root, 0)
}

fn build_items(object: &ObjectNode, depth: usize) -> Vec<OutlineItem> {
    object
        .properties
        .iter()
        .map(|property| {
            let (icon, children) = match &property.value {
                Value::Object(child) if !child.is_empty() => {
                    (IconKind::Container, build_items(child, depth + 1))
                }
                _ => (IconKind::Property, Vec::new()),
            };
            OutlineItem {
                text: property.key.clone(),
                depth,
                start: property.range.start,
                end: property.range.end,
                weight: if depth == 0 {
                    VisualWeight::Bold
                } else {
                    VisualWeight::Normal
                },
                icon,
                children,
            }
        })
        .collect()
}

/// Find the deepest item containing the offset.
///
/// Every sibling is visited; a later sibling that also contains the offset
/// replaces an earlier match, and a matching item's children are searched
/// for a still-deeper match. Returns `None` when no item contains the
/// offset.
pub fn find_deepest_containing(items: &[OutlineItem], offset: usize) -> Option<OutlinePath> {
    let mut found = None;
    find_into(items, offset, &mut Vec::new(), &mut found);
    found
}

fn find_into(
    items: &[OutlineItem],
    offset: usize,
    prefix: &mut Vec<usize>,
    found: &mut Option<OutlinePath>,
) {
    for (index, item) in items.iter().enumerate() {
        if item.contains(offset) {
            prefix.push(index);
            *found = Some(OutlinePath(prefix.clone()));
            find_into(&item.children, offset, prefix, found);
            prefix.pop();
        }
    }
}

/// Resolve a path back to its item, if the path is still valid
pub fn resolve<'a>(items: &'a [OutlineItem], path: &OutlinePath) -> Option<&'a OutlineItem> {
    let (&first, rest) = path.0.split_first()?;
    let mut item = items.get(first)?;
    for &index in rest {
        item = item.children.get(index)?;
    }
    Some(item)
}
