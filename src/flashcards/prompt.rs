//! Prompt template for flashcard generation.

/// Build the generation prompt for `count` cards over `text`.
///
/// The wording asks for a bare array; models still fence it sometimes,
/// which [`super::normalizer`] undoes.
pub fn build_prompt(text: &str, count: u32) -> String {
    format!(
        "generate {count} flashcards for the following as an array of objects only, \
nothing else, just the array, using 'front': for the question and 'back': for the answer \
(no ```json``` fences): {text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_count_and_text() {
        let prompt = build_prompt("Cells divide by mitosis.", 7);
        assert!(prompt.starts_with("generate 7 flashcards"));
        assert!(prompt.ends_with(": Cells divide by mitosis."));
        assert!(prompt.contains("'front'"));
        assert!(prompt.contains("'back'"));
    }
}
