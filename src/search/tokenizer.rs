use std::collections::BTreeSet;

/// Split text into lowercase tokens on every non-alphanumeric character.
///
/// Indexing and querying both go through this function, so a query token
/// matches exactly the tokens produced from record text.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).map(str::to_lowercase)
}

/// Distinct tokens of `text`, in sorted order
pub fn unique_tokens(text: &str) -> BTreeSet<String> {
    tokenize(text).collect()
}
