use text_splitter::TextSplitter;

use common::error::AppError;

/// Upper bound on chunk size, in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1000;

/// Splits text into chunks of at most `max_chars` characters, breaking at the
/// highest semantic boundary that fits: paragraph breaks first, then line
/// breaks, then sentences, then smaller units.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Result<Vec<String>, AppError> {
    if max_chars == 0 {
        return Err(AppError::Validation(
            "max_chunk_chars must be greater than zero".into(),
        ));
    }

    let splitter = TextSplitter::new(max_chars);
    Ok(splitter.chunks(text).map(str::to_owned).collect())
}
