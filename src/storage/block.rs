//! Ledger block location
//!
//! Ledger blocks live inside fenced code regions tagged `macros`, with an
//! `id: <token>` first line. This module finds blocks in document text and
//! splices replacement content back in while preserving everything around
//! the block byte-for-byte.

use crate::ledger::line::strip_prefix_ci;

/// Fence info string marking a ledger block
pub const BLOCK_MARKER: &str = "macros";

/// Prefix of the block's identifying first line
pub const ID_PREFIX: &str = "id:";

/// Line coordinates of one ledger block within a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    pub id: String,
    /// Index of the `id:` line
    pub id_line: usize,
    /// First ledger content line
    pub content_start: usize,
    /// One past the last content line (the closing fence, or end of file)
    pub content_end: usize,
}

/// Find every ledger block in a document
pub fn find_blocks(text: &str) -> Vec<BlockSpan> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if !is_opening_fence(lines[i]) {
            i += 1;
            continue;
        }
        // Scan to the closing fence regardless of whether the block carries
        // a usable id line
        let body_start = i + 1;
        let mut end = lines.len();
        for (offset, line) in lines[body_start..].iter().enumerate() {
            if line.trim_start().starts_with("```") {
                end = body_start + offset;
                break;
            }
        }
        if let Some(id) = lines
            .get(body_start)
            .and_then(|l| strip_prefix_ci(l.trim(), ID_PREFIX))
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            blocks.push(BlockSpan {
                id: id.to_string(),
                id_line: body_start,
                content_start: body_start + 1,
                content_end: end,
            });
        }
        i = end + 1;
    }

    blocks
}

/// Find the block with the given id, if any
pub fn find_block(text: &str, id: &str) -> Option<BlockSpan> {
    find_blocks(text).into_iter().find(|b| b.id == id)
}

/// The ledger content lines of a block
pub fn content_lines<'a>(text: &'a str, span: &BlockSpan) -> Vec<&'a str> {
    let lines: Vec<&str> = text.lines().collect();
    lines[span.content_start..span.content_end.min(lines.len())].to_vec()
}

/// Replace a block's content, leaving the fences, the id line, and the rest
/// of the document untouched
pub fn replace_content(text: &str, span: &BlockSpan, new_content: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    out.extend_from_slice(&lines[..span.content_start]);
    if !new_content.is_empty() {
        out.extend(new_content.lines());
    }
    out.extend_from_slice(&lines[span.content_end.min(lines.len())..]);

    let mut result = out.join("\n");
    if text.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn is_opening_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix("```") {
        Some(info) => info.trim() == BLOCK_MARKER,
        None => false,
    }
}
