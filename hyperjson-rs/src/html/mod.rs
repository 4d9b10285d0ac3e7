//! Markup parsing and output.

mod parser;
mod printer;

pub use parser::{parse_str, HtmlParser, ParseOptions};
pub use printer::{escape_attribute, print_to_string, HtmlPrinter};
