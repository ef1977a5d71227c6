//! Message handling - turns console lines into messages

pub mod parser;

pub use parser::{InputParser, ParsedInput};
