//! Query rotation table
//!
//! The upstream API has no offset paging, so "page N" of a listing is faked by
//! sending a different search phrase. Each known region and category maps to
//! an ordered list of phrases; page N uses phrase `(N - 1) mod len`.

/// Phrase used for selectors missing from the table
pub const DEFAULT_QUERY: &str = "India";

const DEFAULT_VARIATIONS: &[&str] = &[DEFAULT_QUERY];

const INDIA_VARIATIONS: &[&str] = &[
    "India",
    "India news",
    "breaking India",
    "India today",
    "latest India",
    "India updates",
];

/// Returns the rotation phrases for a region code
pub fn region_variations(code: &str) -> &'static [&'static str] {
    match code {
        "all" | "in" => INDIA_VARIATIONS,
        "punjab" => &[
            "Punjab",
            "Punjab news",
            "Chandigarh",
            "Amritsar",
            "Ludhiana",
            "Jalandhar",
        ],
        "delhi" => &["Delhi", "Delhi news", "NCR", "New Delhi", "Gurgaon", "Noida"],
        "mumbai" => &[
            "Mumbai",
            "Mumbai news",
            "Maharashtra",
            "Bombay",
            "Pune",
            "Nashik",
        ],
        "kerala" => &[
            "Kerala",
            "Kerala news",
            "Thiruvananthapuram",
            "Kochi",
            "Kozhikode",
            "Thrissur",
        ],
        _ => DEFAULT_VARIATIONS,
    }
}

/// Returns the rotation phrases for a category slug
pub fn category_variations(slug: &str) -> &'static [&'static str] {
    match slug {
        "politics" => &[
            "politics India",
            "political news India",
            "India government",
            "Indian politics",
            "election India",
            "parliament India",
        ],
        "sports" => &[
            "sports India",
            "cricket India",
            "Indian sports news",
            "football India",
            "hockey India",
            "badminton India",
        ],
        "entertainment" => &[
            "entertainment India",
            "Bollywood",
            "Indian cinema",
            "Indian movies",
            "TV shows India",
            "music India",
        ],
        "business" => &[
            "business India",
            "Indian economy",
            "startup India",
            "Indian market",
            "finance India",
            "stock market India",
        ],
        "technology" => &[
            "technology India",
            "tech India",
            "Indian startups",
            "IT India",
            "AI India",
            "software India",
        ],
        "top-news" => &[
            "India news",
            "India latest",
            "breaking India",
            "Indian headlines",
            "trending India",
            "viral India",
        ],
        _ => DEFAULT_VARIATIONS,
    }
}

/// Picks the phrase for a 1-based page; pages below 1 count as page 1
pub fn rotate(variations: &[&'static str], page: u32) -> &'static str {
    if variations.is_empty() {
        return DEFAULT_QUERY;
    }
    let index = (page.max(1) - 1) as usize % variations.len();
    variations[index]
}

/// Search phrase for a region listing page
pub fn region_query(code: &str, page: u32) -> &'static str {
    rotate(region_variations(code), page)
}

/// Search phrase for a category listing page
pub fn category_query(slug: &str, page: u32) -> &'static str {
    rotate(category_variations(slug), page)
}
