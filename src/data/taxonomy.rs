//! Static region and category tables
//!
//! These are configuration data, not mutable domain objects. They are passed
//! to callers by reference instead of living in shared mutable state.

use super::{ApiResponse, Category, Origin, Region};

/// Code of the catch-all region
pub const ALL_REGIONS_CODE: &str = "all";

/// Static array of all selectable regions
pub static REGIONS: [Region; 6] = [
    Region {
        id: "1",
        name: "All Regions",
        code: ALL_REGIONS_CODE,
    },
    Region {
        id: "2",
        name: "India",
        code: "in",
    },
    Region {
        id: "3",
        name: "Punjab",
        code: "punjab",
    },
    Region {
        id: "4",
        name: "Delhi",
        code: "delhi",
    },
    Region {
        id: "5",
        name: "Mumbai",
        code: "mumbai",
    },
    Region {
        id: "6",
        name: "Kerala",
        code: "kerala",
    },
];

/// Static array of all news categories, in page order
pub static CATEGORIES: [Category; 7] = [
    Category {
        id: "1",
        name: "Latest News",
        slug: "home",
    },
    Category {
        id: "2",
        name: "Top News",
        slug: "top-news",
    },
    Category {
        id: "3",
        name: "Politics",
        slug: "politics",
    },
    Category {
        id: "4",
        name: "Sports",
        slug: "sports",
    },
    Category {
        id: "5",
        name: "Entertainment",
        slug: "entertainment",
    },
    Category {
        id: "6",
        name: "Business",
        slug: "business",
    },
    Category {
        id: "7",
        name: "Technology",
        slug: "technology",
    },
];

/// Returns a reference to all regions
pub fn all_regions() -> &'static [Region] {
    &REGIONS
}

/// Returns a reference to all categories
pub fn all_categories() -> &'static [Category] {
    &CATEGORIES
}

/// Get a region by its code (e.g. "punjab", "in")
pub fn get_region_by_code(code: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|region| region.code == code)
}

/// Get a category by its slug (e.g. "top-news")
pub fn get_category_by_slug(slug: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.slug == slug)
}

/// The region table wrapped in a response envelope
pub fn regions_response() -> ApiResponse<Vec<Region>> {
    ApiResponse::ok(REGIONS.to_vec(), "Regions fetched successfully", Origin::None)
}

/// The category table wrapped in a response envelope
pub fn categories_response() -> ApiResponse<Vec<Category>> {
    ApiResponse::ok(CATEGORIES.to_vec(), "Categories fetched successfully", Origin::None)
}
