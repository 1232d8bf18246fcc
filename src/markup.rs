//! Anchored regions inside the player page.
//!
//! The page is treated as opaque text with two named regions: the playlist
//! array literal and the "current / total" count expression. Only those two
//! regions are ever rewritten.

use crate::config::Config;
use regex::{NoExpand, Regex};
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("playlist array `const {0} = [ ... ];` not found")]
    PatternNotFound(String),
    #[error("invalid anchor pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Text of a page plus the compiled anchors for its two regions.
pub struct PlaylistDocument<'a> {
    text: &'a str,
    variable: String,
    count_target: String,
    entry_indent: String,
    closing_indent: String,
    array_re: Regex,
    count_re: Regex,
}

impl<'a> PlaylistDocument<'a> {
    pub fn new(text: &'a str, cfg: &Config) -> Result<Self, MarkupError> {
        // Lazy: stop at the first `];` after the opening bracket.
        let array_re = Regex::new(&format!(
            r"const {} = \[[\s\S]*?\];",
            regex::escape(&cfg.playlist_variable)
        ))?;
        let count_re = Regex::new(&format!(
            r"{} = `\$\{{index \+ 1\}} / \d+`;",
            regex::escape(&cfg.count_display_target)
        ))?;
        Ok(Self {
            text,
            variable: cfg.playlist_variable.clone(),
            count_target: cfg.count_display_target.clone(),
            entry_indent: cfg.entry_indent.clone(),
            closing_indent: cfg.closing_indent.clone(),
            array_re,
            count_re,
        })
    }

    /// Byte range of the first playlist array declaration.
    pub fn locate_playlist(&self) -> Option<Range<usize>> {
        self.array_re.find(self.text).map(|m| m.range())
    }

    /// Byte range of the first count display expression.
    pub fn locate_count(&self) -> Option<Range<usize>> {
        self.count_re.find(self.text).map(|m| m.range())
    }

    /// Text of the first playlist array declaration, if any.
    pub fn playlist_block(&self) -> Option<&'a str> {
        self.locate_playlist().map(|r| &self.text[r])
    }

    /// Render the replacement array declaration for `entries`.
    pub fn render_playlist(&self, entries: &[String]) -> String {
        let lines: Vec<String> = entries
            .iter()
            .map(|e| format!("{}'{}'", self.entry_indent, escape_js_single(e)))
            .collect();
        format!(
            "const {} = [\n{}\n{}];",
            self.variable,
            lines.join(",\n"),
            self.closing_indent
        )
    }

    pub fn render_count(&self, total: usize) -> String {
        format!("{} = `${{index + 1}} / {}`;", self.count_target, total)
    }

    /// Rewrite every playlist array and every count expression. Fails without
    /// producing text when no playlist array exists.
    pub fn replace(&self, entries: &[String]) -> Result<String, MarkupError> {
        if self.locate_playlist().is_none() {
            return Err(MarkupError::PatternNotFound(self.variable.clone()));
        }
        let block = self.render_playlist(entries);
        let count = self.render_count(entries.len());
        let with_array = self.array_re.replace_all(self.text, NoExpand(&block));
        let with_count = self.count_re.replace_all(&with_array, NoExpand(&count));
        Ok(with_count.into_owned())
    }
}

fn escape_js_single(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
