pub mod convert;
pub mod types;

pub use convert::{convert_html_to_blocks, ConvertError, TEXT_RUN_LIMIT};
pub use types::{Annotations, Block, Color, Link, RichText, TextRun};
