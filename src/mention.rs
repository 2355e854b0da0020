//! Drug mention detection in article titles.

use crate::Drug;
use std::collections::HashSet;
use tracing::warn;

/// Returns every catalog drug whose canonical name is a whole token of `title`.
///
/// The title is split on whitespace; comparison is case-insensitive and a name
/// embedded in a longer word does not count. Matches follow catalog order. An
/// empty result is not an error: it is logged and the title simply links to
/// nothing.
///
/// # Examples
///
/// ```
/// use druglink::{extract_mentions, Drug};
///
/// let catalog = vec![Drug::new("S03AA", "TETRACYCLINE"), Drug::new("V03AB", "ETHANOL")];
///
/// let found = extract_mentions("Tetracycline And Ethanol Helps Symptoms", &catalog);
/// assert_eq!(found.len(), 2);
/// assert!(extract_mentions("Tetracyclines Cure Everything", &catalog).is_empty());
/// ```
pub fn extract_mentions<'a>(title: &str, catalog: &'a [Drug]) -> Vec<&'a Drug> {
    let tokens: HashSet<String> = title.split_whitespace().map(str::to_lowercase).collect();

    let mentioned: Vec<&Drug> = catalog
        .iter()
        .filter(|drug| !drug.name.is_empty() && tokens.contains(&drug.folded_name()))
        .collect();

    if mentioned.is_empty() {
        warn!(title, "No drug was mentioned in title");
    }
    mentioned
}
