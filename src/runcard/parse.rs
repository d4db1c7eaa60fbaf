// src/runcard/parse.rs

//! Minimal tokenizer for run-card text, mirroring how `pwhg_main` reads it:
//! everything after `!` is a comment, the first two whitespace-separated
//! tokens are the key and the value.

use std::collections::BTreeMap;

use anyhow::Context;
use regex::Regex;

use crate::errors::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCard {
    /// Key/value tokens in file order.
    pub pairs: Vec<(String, String)>,
}

impl ParsedCard {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn count(&self, key: &str) -> usize {
        self.pairs.iter().filter(|(k, _)| k == key).count()
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.pairs.iter().cloned().collect()
    }
}

pub fn parse_run_card(text: &str) -> Result<ParsedCard> {
    let line_re = Regex::new(r"^\s*(\S+)\s+(\S+)").context("compiling run-card line pattern")?;

    let mut pairs = Vec::new();
    for line in text.lines() {
        let content = match line.split_once('!') {
            Some((before, _comment)) => before,
            None => line,
        };
        if let Some(caps) = line_re.captures(content) {
            pairs.push((caps[1].to_string(), caps[2].to_string()));
        }
    }

    Ok(ParsedCard { pairs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let text = "numevts 5500 ! number of events\n\n! a comment line\n  ebeam1   4000.0   ! energy\nbare\n";
        let parsed = parse_run_card(text).unwrap();
        assert_eq!(
            parsed.pairs,
            vec![
                ("numevts".to_string(), "5500".to_string()),
                ("ebeam1".to_string(), "4000.0".to_string()),
            ]
        );
        assert_eq!(parsed.get("ebeam1"), Some("4000.0"));
        assert_eq!(parsed.count("numevts"), 1);
    }

    #[test]
    fn value_glued_to_comment_marker() {
        let parsed = parse_run_card("iseed 42! seed").unwrap();
        assert_eq!(parsed.get("iseed"), Some("42"));
    }
}
