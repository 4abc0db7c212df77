//! Address normalization and query-variant generation.
//!
//! [`normalize`] produces the canonical form every cascade starts from.
//! [`generate_variants`] derives the ordered strategy list from it:
//! `Direct`, `CityExtracted`, `Simplified`, `MainLocationOnly`. Stages whose
//! pattern does not apply are omitted instead of emitting an empty query.
//! [`generate_fuzzy_variants`] appends single-suffix-stripped guesses.

use std::collections::HashSet;
use std::sync::LazyLock;

use haulgeo_core::{AddressVariant, StrategyTag};
use regex::Regex;

/// Punctuation removed during normalization: commas, parentheses (ASCII and
/// full-width) and the enumeration comma.
const STRIPPED_PUNCTUATION: &[char] = &['，', ',', '（', '）', '(', ')', '、'];

/// Administrative suffix markers removed one at a time by fuzzy guessing,
/// in the order the guesses are tried.
const FUZZY_SUFFIX_MARKERS: &[&str] = &["省", "市", "区", "县", "镇", "街道", "路", "街"];

/// Colloquial proximity words that only blur a query.
const VAGUE_TERMS: &[&str] = &[
    "附近", "周围", "一带", "周边", "大概", "大约", "左右", "边上", "旁边", "区域", "地段",
];

/// City-extraction patterns in priority order. Each yields the span to remove
/// and, through the optional `city` group, the scope hint to send along.
static CITY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // autonomous region + city
        r"[^省市区]+?自治区(?P<city>[^省市区]+市)",
        // province + city
        r"(?:[^省]+省)?(?P<city>[^省市区]+市)",
        // municipality written without its 市 suffix
        r"^(?P<city>北京|上海|天津|重庆)",
        // special administrative region
        r"[^特别行政区]+特别行政区",
        // prefecture
        r"[^州]+州",
        // county
        r"[^县]+县",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid city pattern"))
    .collect()
});

/// Building, unit, floor and house-number sub-tokens.
static DETAIL_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"地下\d+层?|\d+(?:号|弄|幢|单元|室|层)|[A-Z]\d+").expect("valid detail pattern")
});

/// Contiguous province/city/district prefix.
static MAIN_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[^省市区县]+省|[^省市区县]+?自治区)?(?:[^省市区县]+市|[^省市州区县]+州)?(?:[^省市州区县]+[区县])?",
    )
    .expect("valid main-location pattern")
});

/// Canonical form of a raw address: whitespace and comma/parenthesis/
/// enumeration-mark punctuation removed. Idempotent.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !STRIPPED_PUNCTUATION.contains(c))
        .collect()
}

/// A city token found in an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCity {
    /// The matched span, removed from the address.
    pub token: String,
    /// What to send as the query scope.
    pub scope: String,
    /// The address with `token` removed.
    pub remainder: String,
}

/// Finds the first administrative-city token using the ordered regional
/// patterns. Returns `None` when no pattern matches.
#[must_use]
pub fn extract_city(canonical: &str) -> Option<ExtractedCity> {
    CITY_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(canonical)?;
        let whole = caps.get(0)?;
        let scope = caps
            .name("city")
            .map_or_else(|| whole.as_str(), |m| m.as_str())
            .to_owned();
        let mut remainder = String::with_capacity(canonical.len());
        remainder.push_str(&canonical[..whole.start()]);
        remainder.push_str(&canonical[whole.end()..]);
        Some(ExtractedCity {
            token: whole.as_str().to_owned(),
            scope,
            remainder,
        })
    })
}

/// Removes building/unit/floor/house-number tokens. Returns `None` when
/// nothing was removed or nothing would remain.
#[must_use]
pub fn simplify(canonical: &str) -> Option<String> {
    if !DETAIL_TOKENS.is_match(canonical) {
        return None;
    }
    let simplified = DETAIL_TOKENS.replace_all(canonical, "").into_owned();
    (!simplified.is_empty()).then_some(simplified)
}

/// Keeps only the leading province + city + district tokens.
#[must_use]
pub fn main_location(canonical: &str) -> Option<String> {
    let m = MAIN_LOCATION.find(canonical)?;
    (!m.as_str().is_empty()).then(|| m.as_str().to_owned())
}

/// Builds the ordered cascade for a canonical address.
///
/// Always starts with the `Direct` variant. Duplicate texts are dropped,
/// keeping the first (more specific) occurrence.
#[must_use]
pub fn generate_variants(canonical: &str, scope_city: Option<&str>) -> Vec<AddressVariant> {
    let scope = scope_city.map(str::to_owned);
    let mut variants = vec![AddressVariant {
        text: canonical.to_owned(),
        strategy: StrategyTag::Direct,
        scope: scope.clone(),
    }];

    if let Some(extracted) = extract_city(canonical) {
        if !extracted.remainder.is_empty() {
            variants.push(AddressVariant {
                text: extracted.remainder,
                strategy: StrategyTag::CityExtracted,
                scope: Some(extracted.scope),
            });
        }
    }

    if let Some(text) = simplify(canonical) {
        variants.push(AddressVariant {
            text,
            strategy: StrategyTag::Simplified,
            scope: scope.clone(),
        });
    }

    if let Some(text) = main_location(canonical) {
        variants.push(AddressVariant {
            text,
            strategy: StrategyTag::MainLocationOnly,
            scope,
        });
    }

    dedupe_variants(variants)
}

/// [`generate_variants`] followed by one guess per administrative suffix
/// marker with every occurrence of that marker removed.
#[must_use]
pub fn generate_fuzzy_variants(canonical: &str, scope_city: Option<&str>) -> Vec<AddressVariant> {
    let mut variants = generate_variants(canonical, scope_city);
    for marker in FUZZY_SUFFIX_MARKERS {
        let guess = canonical.replace(marker, "");
        if guess != canonical && !guess.is_empty() {
            variants.push(AddressVariant {
                text: guess,
                strategy: StrategyTag::SuffixStripped,
                scope: scope_city.map(str::to_owned),
            });
        }
    }
    dedupe_variants(variants)
}

/// Drops variants whose text already appeared earlier in the list.
#[must_use]
pub fn dedupe_variants(variants: Vec<AddressVariant>) -> Vec<AddressVariant> {
    let mut seen = HashSet::new();
    variants
        .into_iter()
        .filter(|v| seen.insert(v.text.clone()))
        .collect()
}

/// Returns `true` if the address contains a colloquial proximity word.
#[must_use]
pub fn is_vague_address(address: &str) -> bool {
    VAGUE_TERMS.iter().any(|term| address.contains(term))
}

/// Removes colloquial proximity words.
#[must_use]
pub fn clean_vague_terms(address: &str) -> String {
    VAGUE_TERMS
        .iter()
        .fold(address.to_owned(), |acc, term| acc.replace(term, ""))
        .trim()
        .to_owned()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
