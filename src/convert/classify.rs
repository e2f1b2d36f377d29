use kuchiki::NodeRef;

use super::style::annotations_for;
use crate::types::{Annotations, Link};

/// One DOM node after classification. Classification is a pure function of
/// tag name plus inline-style probes; the only non-local fact is a list
/// item's dependence on its immediate parent's tag.
pub(crate) enum ParsedNode {
    /// Block that may carry nested children.
    Parent(ParentNode),
    /// Block that is always a leaf in the target schema.
    Leaf(LeafNode),
    /// `ol`/`ul` container; not a block itself, its items are reclassified
    /// individually.
    List(NodeRef),
    /// Inline styled span, possibly a link.
    Span(SpanNode),
    /// Raw text node content, not yet whitespace-normalized.
    Text(String),
    /// Explicit `<br>`.
    LineBreak,
    /// Dollar-delimited expression inside a `span`.
    InlineMath(String),
    /// `$$…$$` expression filling a `pre`.
    MathBlock(String),
}

pub(crate) struct ParentNode {
    pub kind: ParentKind,
    pub node: NodeRef,
    pub annotations: Annotations,
}

pub(crate) struct LeafNode {
    pub kind: LeafKind,
    pub node: NodeRef,
    pub annotations: Annotations,
}

pub(crate) struct SpanNode {
    pub node: NodeRef,
    pub annotations: Annotations,
    pub link: Option<Link>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParentKind {
    Paragraph,
    Quote,
    BulletedListItem,
    NumberedListItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LeafKind {
    Code,
    Heading1,
    Heading2,
    Heading3,
}

/// Classifies one DOM node. Comments, doctypes, and other non-content node
/// kinds yield `None`.
pub(crate) fn classify(node: &NodeRef) -> Option<ParsedNode> {
    if let Some(text) = node.as_text() {
        return Some(ParsedNode::Text(text.borrow().clone()));
    }
    let el = node.as_element()?;
    let annotations = annotations_for(el);
    let parent = |kind| {
        ParsedNode::Parent(ParentNode {
            kind,
            node: node.clone(),
            annotations,
        })
    };
    let leaf = |kind| {
        ParsedNode::Leaf(LeafNode {
            kind,
            node: node.clone(),
            annotations,
        })
    };
    let tag = el.name.local.to_lowercase();
    let parsed = match tag.as_str() {
        "a" => {
            let link = el
                .attributes
                .borrow()
                .get("href")
                .map(|href| Link { url: href.to_string() });
            ParsedNode::Span(SpanNode {
                node: node.clone(),
                annotations,
                link,
            })
        }
        "blockquote" => parent(ParentKind::Quote),
        "br" => ParsedNode::LineBreak,
        "div" | "p" | "body" => parent(ParentKind::Paragraph),
        "h1" => leaf(LeafKind::Heading1),
        "h2" => leaf(LeafKind::Heading2),
        // The target schema stops at three heading levels.
        "h3" | "h4" | "h5" | "h6" => leaf(LeafKind::Heading3),
        "li" => parent(list_item_kind(node)),
        "ol" | "ul" => ParsedNode::List(node.clone()),
        "pre" => match block_math(&node.text_contents()) {
            Some(expression) => ParsedNode::MathBlock(expression),
            None => leaf(LeafKind::Code),
        },
        "span" => match inline_math(&node.text_contents()) {
            Some(expression) => ParsedNode::InlineMath(expression),
            None => ParsedNode::Span(SpanNode {
                node: node.clone(),
                annotations,
                link: None,
            }),
        },
        _ => ParsedNode::Span(SpanNode {
            node: node.clone(),
            annotations,
            link: None,
        }),
    };
    Some(parsed)
}

/// A list item's kind comes from its enclosing list; an `li` outside any
/// list degrades to a paragraph rather than failing.
fn list_item_kind(node: &NodeRef) -> ParentKind {
    let parent_tag = node
        .parent()
        .and_then(|parent| parent.as_element().map(|el| el.name.local.to_lowercase()));
    match parent_tag.as_deref() {
        Some("ol") => ParentKind::NumberedListItem,
        Some("ul") => ParentKind::BulletedListItem,
        _ => ParentKind::Paragraph,
    }
}

fn block_math(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let inner = trimmed.strip_prefix("$$")?.strip_suffix("$$")?.trim();
    (!inner.is_empty()).then(|| inner.to_string())
}

fn inline_math(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if let Some(expression) = block_math(trimmed) {
        return Some(expression);
    }
    let inner = trimmed.strip_prefix('$')?.strip_suffix('$')?.trim();
    (!inner.is_empty()).then(|| inner.to_string())
}

impl ParentKind {
    pub fn is_list_item(self) -> bool {
        matches!(
            self,
            ParentKind::BulletedListItem | ParentKind::NumberedListItem
        )
    }
}
