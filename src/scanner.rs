//! Annotation scanner: turns raw handler source into ordered
//! (annotation line, declaration line) pairs.
//!
//! The scanner keeps a single "open pair" cursor while walking the lines in
//! order. A line containing the [`ANNOTATION_MARKER`] starts a new pair; the
//! next line of any kind closes it. Scanning is purely lexical — no
//! JavaScript parsing happens here.

/// Token identifying a line as function metadata.
pub const ANNOTATION_MARKER: &str = "@lambda";

/// One closed (annotation, declaration) pair, a candidate for a function
/// descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationPair {
    /// The full annotation line, marker included.
    pub annotation: String,
    /// The line immediately following the annotation line.
    pub declaration: String,
    /// 1-based line number of the annotation line, for diagnostics.
    pub line: usize,
}

/// Result of scanning a handler source module.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Closed pairs in source order.
    pub pairs: Vec<AnnotationPair>,
    /// 1-based line numbers of annotation lines that never received a
    /// declaration line: either a back-to-back annotation or a trailing
    /// annotation at end of input. Reported, not fatal.
    pub dangling: Vec<usize>,
}

/// Scan source text into ordered annotation pairs.
///
/// Scanning identical text twice yields identical pair sequences and
/// ordering.
pub fn scan_source(text: &str) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    let mut open: Option<(usize, String)> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.contains(ANNOTATION_MARKER) {
            // A new annotation while one is still open means the previous
            // one never got its declaration line.
            if let Some((dropped, _)) = open.replace((line_no, line.to_string())) {
                outcome.dangling.push(dropped);
            }
        } else if let Some((anno_line, annotation)) = open.take() {
            outcome.pairs.push(AnnotationPair {
                annotation,
                declaration: line.to_string(),
                line: anno_line,
            });
        }
        // Any other line is not part of a pair and is dropped.
    }

    if let Some((trailing, _)) = open {
        outcome.dangling.push(trailing);
    }

    outcome
}
