//! Parsing of the free-text tag inputs (filter box, tag editor, CLI args).

/// Split on whitespace, dropping repeats but keeping first-seen order.
pub fn parse_tag_list(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        if !tags.iter().any(|t| t == word) {
            tags.push(word.to_string());
        }
    }
    tags
}

/// Same as [`parse_tag_list`] over several arguments, so `tag a.pdf "x y" z`
/// yields `x`, `y`, `z`.
pub fn parse_tag_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let joined = args
        .iter()
        .map(|a| a.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    parse_tag_list(&joined)
}

pub fn format_tag_list(tags: &[String]) -> String {
    tags.join(" ")
}
