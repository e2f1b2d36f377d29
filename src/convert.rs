use kuchiki::{traits::*, NodeRef};
use thiserror::Error;

use crate::types::{
    Annotations, Block, CodeBlock, Color, EquationContent, HeadingBlock, Link, RichText, TextBlock,
};

mod classify;
mod richtext;
mod style;

use classify::{classify, LeafKind, LeafNode, ParentKind, ParentNode, ParsedNode, SpanNode};
use richtext::{build_rich_text, RunOptions};

pub use richtext::TEXT_RUN_LIMIT;

/// Language marker attached to every converted code block.
const CODE_LANGUAGE: &str = "plain text";

/// The single fatal failure mode: no usable root content container. All
/// other malformed input degrades gracefully during conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("note markup contains no recognizable root container")]
    MissingRoot,
    #[error("root container does not resolve to a block with children")]
    MalformedRoot,
}

/// Converts a note's HTML into the target API's block tree.
///
/// Pure and synchronous: one HTML string in, one ordered block array out.
/// Repeated calls on the same input produce identical output.
pub fn convert_html_to_blocks(html: &str) -> Result<Vec<Block>, ConvertError> {
    let document = kuchiki::parse_html().one(html.to_string());
    let root = find_root(&document)?;
    let Some(ParsedNode::Parent(parent)) = classify(&root) else {
        return Err(ConvertError::MalformedRoot);
    };
    let body = convert_parent_block(&parent, &ConvertOptions::default());

    // Unwrap the synthetic top-level paragraph: its hoisted rich text, if
    // any, becomes a leading paragraph block and its children become the
    // top-level array.
    let mut blocks = Vec::new();
    if !body.rich_text.is_empty() {
        blocks.push(Block::Paragraph(TextBlock {
            rich_text: body.rich_text,
            ..TextBlock::default()
        }));
    }
    blocks.extend(body.children);
    Ok(blocks)
}

/// The canonical root is the editor's schema-versioned wrapper element. Old
/// notes without one fall back to the `<body>`, accepted only when it
/// directly holds block-shaped content.
fn find_root(document: &NodeRef) -> Result<NodeRef, ConvertError> {
    if let Ok(root) = document.select_first("[data-schema-version]") {
        return Ok(root.as_node().clone());
    }
    let body = document
        .select_first("body")
        .map_err(|()| ConvertError::MissingRoot)?;
    let body = body.as_node().clone();
    let recognizable = body.children().any(|child| {
        matches!(
            classify(&child),
            Some(ParsedNode::Parent(_)) | Some(ParsedNode::List(_))
        )
    });
    if recognizable {
        Ok(body)
    } else {
        Err(ConvertError::MissingRoot)
    }
}

/// Style facts threaded top-down through the recursion.
#[derive(Debug, Clone, Default)]
struct ConvertOptions {
    annotations: Annotations,
    link: Option<Link>,
    preserve_whitespace: bool,
}

impl ConvertOptions {
    fn run_options(&self) -> RunOptions<'_> {
        RunOptions {
            annotations: &self.annotations,
            link: self.link.as_ref(),
            preserve_whitespace: self.preserve_whitespace,
        }
    }
}

/// What converting one classified node yields: a finished block, a transient
/// flat run of sibling blocks (list containers only), or a rich-text
/// fragment for the enclosing block to absorb.
enum ContentResult {
    Block(Block),
    List(Vec<Block>),
    RichText(Vec<RichText>),
}

fn convert_node(node: ParsedNode, options: &ConvertOptions) -> ContentResult {
    match node {
        ParsedNode::Parent(parent) => {
            let body = convert_parent_block(&parent, options);
            ContentResult::Block(parent.kind.into_block(body))
        }
        ParsedNode::Leaf(leaf) => ContentResult::Block(convert_leaf_block(&leaf, options)),
        ParsedNode::List(list) => ContentResult::List(convert_list(&list, options)),
        ParsedNode::MathBlock(expression) => {
            ContentResult::Block(Block::Equation(EquationContent { expression }))
        }
        ParsedNode::InlineMath(expression) => {
            ContentResult::RichText(vec![RichText::Equation(EquationContent { expression })])
        }
        ParsedNode::Span(span) => ContentResult::RichText(convert_span(&span, options)),
        ParsedNode::Text(content) => {
            ContentResult::RichText(build_rich_text(&content, options.run_options()))
        }
        // An explicit break is a literal newline run, whitespace kept even in
        // collapsing context.
        ParsedNode::LineBreak => ContentResult::RichText(build_rich_text(
            "\n",
            RunOptions {
                annotations: &options.annotations,
                link: options.link.as_ref(),
                preserve_whitespace: true,
            },
        )),
    }
}

/// Converts a child-bearing block. Adjacent rich-text results concatenate
/// into segments; the segment before the first block child is hoisted into
/// the block's own rich text, later segments become synthetic paragraph
/// children, and list results splice their items in as direct siblings.
fn convert_parent_block(parent: &ParentNode, options: &ConvertOptions) -> TextBlock {
    let (color, own) = parent.annotations.split_color();
    let merged = ConvertOptions {
        annotations: options.annotations.merge(&own),
        link: options.link.clone(),
        preserve_whitespace: options.preserve_whitespace,
    };

    let mut rich_text = Vec::new();
    let mut children = Vec::new();
    let mut pending = Vec::new();
    let mut saw_block = false;

    for child in parent.node.children() {
        let Some(parsed) = classify(&child) else {
            continue;
        };
        match convert_node(parsed, &merged) {
            ContentResult::RichText(runs) => pending.extend(runs),
            ContentResult::Block(block) => {
                flush_segment(&mut pending, &mut rich_text, &mut children, saw_block);
                saw_block = true;
                children.push(block);
            }
            ContentResult::List(items) => {
                flush_segment(&mut pending, &mut rich_text, &mut children, saw_block);
                saw_block = true;
                children.extend(items);
            }
        }
    }
    flush_segment(&mut pending, &mut rich_text, &mut children, saw_block);

    TextBlock {
        rich_text,
        color,
        children,
    }
}

fn flush_segment(
    pending: &mut Vec<RichText>,
    rich_text: &mut Vec<RichText>,
    children: &mut Vec<Block>,
    saw_block: bool,
) {
    let trimmed = trim_rich_text(std::mem::take(pending));
    if trimmed.is_empty() {
        return;
    }
    if saw_block {
        children.push(Block::Paragraph(TextBlock {
            rich_text: trimmed,
            ..TextBlock::default()
        }));
    } else {
        *rich_text = trimmed;
    }
}

/// Code and heading blocks: concatenate rich text from all descendants,
/// descending through inline elements. Only code preserves whitespace.
fn convert_leaf_block(leaf: &LeafNode, options: &ConvertOptions) -> Block {
    let (color, own) = leaf.annotations.split_color();
    let merged = ConvertOptions {
        annotations: options.annotations.merge(&own),
        link: options.link.clone(),
        preserve_whitespace: options.preserve_whitespace || leaf.kind == LeafKind::Code,
    };
    let mut runs = Vec::new();
    for child in leaf.node.children() {
        let Some(parsed) = classify(&child) else {
            continue;
        };
        if let ContentResult::RichText(more) = convert_node(parsed, &merged) {
            runs.extend(more);
        }
    }
    match leaf.kind {
        LeafKind::Code => Block::Code(CodeBlock {
            rich_text: runs,
            language: CODE_LANGUAGE.to_string(),
        }),
        LeafKind::Heading1 => Block::Heading1(heading(runs, color)),
        LeafKind::Heading2 => Block::Heading2(heading(runs, color)),
        LeafKind::Heading3 => Block::Heading3(heading(runs, color)),
    }
}

fn heading(runs: Vec<RichText>, color: Option<Color>) -> HeadingBlock {
    HeadingBlock {
        rich_text: trim_rich_text(runs),
        color,
    }
}

/// Converts a list container into the flat array of its item blocks. The
/// container itself contributes no block; children that do not classify as
/// list items are malformed markup and skipped.
fn convert_list(list: &NodeRef, options: &ConvertOptions) -> Vec<Block> {
    let mut items = Vec::new();
    for child in list.children() {
        let Some(ParsedNode::Parent(item)) = classify(&child) else {
            continue;
        };
        if !item.kind.is_list_item() {
            continue;
        }
        let body = convert_parent_block(&item, options);
        items.push(item.kind.into_block(body));
    }
    items
}

/// Converts an inline span by merging its style facts into the inherited
/// options and concatenating the rich text of its children. Block-shaped
/// children of an inline element are malformed and dropped.
fn convert_span(span: &SpanNode, options: &ConvertOptions) -> Vec<RichText> {
    let merged = ConvertOptions {
        annotations: options.annotations.merge(&span.annotations),
        link: span.link.clone().or_else(|| options.link.clone()),
        preserve_whitespace: options.preserve_whitespace,
    };
    let mut runs = Vec::new();
    for child in span.node.children() {
        let Some(parsed) = classify(&child) else {
            continue;
        };
        if let ContentResult::RichText(more) = convert_node(parsed, &merged) {
            runs.extend(more);
        }
    }
    runs
}

/// Strips leading whitespace from the first text run and trailing from the
/// last, dropping runs emptied by trimming. Equation elements are opaque and
/// stop trimming from either end.
fn trim_rich_text(mut runs: Vec<RichText>) -> Vec<RichText> {
    while let Some(first) = runs.first_mut() {
        match first {
            RichText::Text(run) => {
                let trimmed = run.content.trim_start();
                if trimmed.len() != run.content.len() {
                    run.content = trimmed.to_string();
                }
                if run.content.is_empty() {
                    runs.remove(0);
                    continue;
                }
            }
            RichText::Equation(_) => {}
        }
        break;
    }
    while let Some(last) = runs.last_mut() {
        match last {
            RichText::Text(run) => {
                let trimmed = run.content.trim_end();
                if trimmed.len() != run.content.len() {
                    run.content = trimmed.to_string();
                }
                if run.content.is_empty() {
                    runs.pop();
                    continue;
                }
            }
            RichText::Equation(_) => {}
        }
        break;
    }
    runs
}

impl ParentKind {
    fn into_block(self, body: TextBlock) -> Block {
        match self {
            ParentKind::Paragraph => Block::Paragraph(body),
            ParentKind::Quote => Block::Quote(body),
            ParentKind::BulletedListItem => Block::BulletedListItem(body),
            ParentKind::NumberedListItem => Block::NumberedListItem(body),
        }
    }
}
