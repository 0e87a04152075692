use super::*;
use doxa_config::CommentConfig;

mod code_block_tests;
mod config_tests;

fn parse(lines: &[&str]) -> ParsedComment {
    CommentParser::default().parse(lines)
}

fn parse_with(config: &CommentConfig, lines: &[&str]) -> ParsedComment {
    CommentParser::new(config).parse(lines)
}

fn paragraph(text: &str) -> DetailSegment {
    DetailSegment::Paragraph {
        text: text.to_string(),
    }
}

fn entry(subject: Option<&str>, text: &str) -> TaggedEntry {
    TaggedEntry {
        subject: subject.map(str::to_string),
        direction: None,
        text: text.to_string(),
    }
}
