use serde::Serialize;

/// One node of the target content tree, shaped like the API's block-request
/// schema: externally tagged, so a paragraph serializes as
/// `{"paragraph": {"rich_text": [...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Paragraph(TextBlock),
    #[serde(rename = "heading_1")]
    Heading1(HeadingBlock),
    #[serde(rename = "heading_2")]
    Heading2(HeadingBlock),
    #[serde(rename = "heading_3")]
    Heading3(HeadingBlock),
    Quote(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    Code(CodeBlock),
    Equation(EquationContent),
}

/// Body of the four child-bearing block types (paragraph, quote, list items).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextBlock {
    pub rich_text: Vec<RichText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

/// Headings never carry children in the target schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadingBlock {
    pub rich_text: Vec<RichText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlock {
    pub rich_text: Vec<RichText>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquationContent {
    pub expression: String,
}

/// One element of a block's rich text: either an annotated text run or an
/// opaque inline equation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RichText {
    Text(TextRun),
    Equation(EquationContent),
}

/// A chunk of text with uniform annotations and link. Content is bounded to
/// [`crate::convert::TEXT_RUN_LIMIT`] code points; longer strings are split
/// into several runs sharing the same annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
}

/// Style flags attached to a run or extracted from a block element. An empty
/// set is never serialized; `false` flags and absent color are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Annotations {
    pub fn is_empty(&self) -> bool {
        *self == Annotations::default()
    }

    /// Combines an inherited annotation set with a nested element's own.
    /// Boolean flags accumulate; the innermost color wins.
    pub fn merge(&self, inner: &Annotations) -> Annotations {
        Annotations {
            bold: self.bold || inner.bold,
            italic: self.italic || inner.italic,
            underline: self.underline || inner.underline,
            strikethrough: self.strikethrough || inner.strikethrough,
            code: self.code || inner.code,
            color: inner.color.or(self.color),
        }
    }

    /// Moves the color out for block-level use, leaving the boolean flags to
    /// be inherited by child runs.
    pub fn split_color(&self) -> (Option<Color>, Annotations) {
        let mut rest = *self;
        rest.color = None;
        (self.color, rest)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Symbolic color drawn from two disjoint 8-entry palettes: foreground text
/// colors and background highlight colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Gray,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    GrayBackground,
    RedBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
