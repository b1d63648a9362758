use crate::result::{RankedResult, RetrievalMethod};
use docsift_vector_gateway::ChunkMetadata;
use once_cell::sync::Lazy;
use regex_lite::Regex;

static HEADER_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"={80,}\s*Content Type: [^\n]*\s*Page Number: \d+\s*={80,}")
        .expect("valid header regex")
});
static PAGE_FOOTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Page \d+ of \d+").expect("valid footer regex"));
static IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Image: [^\n]+").expect("valid image regex"));
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"={40,}").expect("valid separator regex"));
static EXTRA_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// Strip extraction artifacts from chunk text.
///
/// Removes content-type/page-number header blocks, `Page X of Y` footers,
/// image reference lines, and lingering separator runs, then collapses 3+
/// consecutive newlines to exactly 2 and trims. Applying it twice yields the
/// same output as applying it once.
pub fn clean_text_content(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = HEADER_BLOCK.replace_all(text, "");
    let cleaned = PAGE_FOOTER.replace_all(&cleaned, "");
    let cleaned = IMAGE_REF.replace_all(&cleaned, "");
    let cleaned = SEPARATOR.replace_all(&cleaned, "");
    let cleaned = EXTRA_NEWLINES.replace_all(&cleaned, "\n\n");
    cleaned.trim().to_string()
}

fn page_label(metadata: &ChunkMetadata) -> Option<i64> {
    metadata.page_number.or(metadata.chunk_index)
}

/// Assemble one final result from a fused candidate and its chunk.
#[allow(clippy::too_many_arguments)]
pub(crate) fn assemble_result(
    id: &str,
    raw_text: &str,
    metadata: ChunkMetadata,
    distance: f64,
    keyword_score: f64,
    combined_score: f64,
    retrieval_method: RetrievalMethod,
    enable_contextual: bool,
) -> RankedResult {
    let mut text = clean_text_content(raw_text);
    if let Some(page) = page_label(&metadata) {
        text = format!("[Page {page}] {text}");
    }

    let filename = metadata
        .pdf_filename
        .clone()
        .unwrap_or_else(|| "Unknown".to_string());
    let context = if enable_contextual {
        metadata.context.clone().unwrap_or_default()
    } else {
        String::new()
    };

    RankedResult {
        text,
        distance,
        keyword_score,
        combined_score,
        id: id.to_string(),
        // Same value under both keys: `filename` for new callers,
        // `pdf_filename` for ones predating the rename.
        filename: filename.clone(),
        pdf_filename: filename,
        context,
        retrieval_method,
        metadata,
    }
}
