//! Batch separator splitting with offset and line bookkeeping.

/// Both newline conventions for a separator line holding only `GO`.
const SEPARATORS: [&str; 2] = ["\r\nGO\r\n", "\nGO\n"];

/// One separator-delimited fragment of a source file, parsed independently.
/// `offset` and `line_offset` are the byte and line totals of every prior
/// batch. The separator's own characters and line are attributed to neither
/// neighbor, so positions reported downstream drift by the separator width;
/// tests assert this behavior as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBatch {
    pub text: String,
    pub offset: usize,
    pub line_offset: usize,
}

pub fn split_batches(code: &str) -> Vec<SourceBatch> {
    let mut batches = Vec::new();
    let mut offset = 0usize;
    let mut line_offset = 0usize;

    for piece in split_on_separators(code) {
        batches.push(SourceBatch {
            text: piece.to_string(),
            offset,
            line_offset,
        });
        offset += piece.len();
        line_offset += piece.split('\n').count();
    }

    batches
}

fn split_on_separators(code: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = code;
    loop {
        match next_separator(rest) {
            Some((at, len)) => {
                pieces.push(&rest[..at]);
                rest = &rest[at + len..];
            }
            None => {
                pieces.push(rest);
                break;
            }
        }
    }
    pieces
}

/// Earliest separator occurrence wins; the two variants cannot start at the
/// same index.
fn next_separator(text: &str) -> Option<(usize, usize)> {
    SEPARATORS
        .iter()
        .filter_map(|sep| text.find(sep).map(|at| (at, sep.len())))
        .min_by_key(|&(at, _)| at)
}
