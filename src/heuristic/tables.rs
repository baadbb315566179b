//! Classification and Extraction Tables
//!
//! Declaration order is significant throughout this module: every lookup is
//! first-match-wins, so earlier entries break ties.

use std::sync::LazyLock;

use regex::Regex;

/// Category keyword lists, tried in order. Matching is plain substring
/// containment over the lowercase corpus.
pub(crate) const CATEGORY_KEYWORDS: [(&str, &[&str]); 6] = [
    (
        "Food & Beverages",
        &[
            "oil", "spice", "tea", "coffee", "biscuit", "snack", "drink", "juice", "milk", "rice",
            "flour", "sugar", "salt", "masala", "dal", "lentil", "pasta", "noodles", "sauce",
            "ketchup", "pickle", "jam", "honey", "chocolate", "candy", "cake", "bread", "butter",
            "cheese", "yogurt", "ghee", "vinegar", "cooking", "edible",
        ],
    ),
    (
        "Personal Care",
        &[
            "soap",
            "shampoo",
            "cream",
            "lotion",
            "toothpaste",
            "deodorant",
            "perfume",
            "face wash",
            "body wash",
            "moisturizer",
            "sunscreen",
            "hair oil",
            "conditioner",
            "face cream",
            "body cream",
            "talcum",
            "powder",
            "gel",
            "scrub",
            "mask",
        ],
    ),
    (
        "Household",
        &[
            "detergent",
            "cleaner",
            "dishwash",
            "toilet",
            "bathroom",
            "kitchen",
            "cleaning",
            "liquid",
            "floor cleaner",
            "glass cleaner",
            "disinfectant",
            "bleach",
            "soap bar",
            "washing powder",
            "fabric softener",
            "air freshener",
            "insecticide",
            "mosquito",
        ],
    ),
    (
        "Health & Medicine",
        &[
            "tablet",
            "capsule",
            "syrup",
            "medicine",
            "vitamin",
            "supplement",
            "antibiotic",
            "painkiller",
            "cough",
            "cold",
            "fever",
            "antiseptic",
            "bandage",
            "ointment",
        ],
    ),
    (
        "Baby Care",
        &[
            "baby",
            "infant",
            "diaper",
            "formula",
            "powder",
            "baby oil",
            "baby soap",
            "baby shampoo",
            "baby lotion",
            "baby food",
            "wipes",
        ],
    ),
    (
        "Beauty",
        &[
            "lipstick",
            "makeup",
            "foundation",
            "mascara",
            "nail",
            "beauty",
            "kajal",
            "eyeliner",
            "compact",
            "rouge",
            "blush",
            "eyeshadow",
        ],
    ),
];

/// Subcategory by corpus substring, tried in order
pub(crate) const SUBCATEGORY_MAP: [(&str, &str); 25] = [
    ("cooking oil", "Cooking Oil"),
    ("edible oil", "Cooking Oil"),
    ("mustard oil", "Cooking Oil"),
    ("sunflower oil", "Cooking Oil"),
    ("coconut oil", "Cooking Oil"),
    ("olive oil", "Cooking Oil"),
    ("dishwash", "Cleaning Products"),
    ("dish wash", "Cleaning Products"),
    ("liquid", "Cleaning Products"),
    ("detergent", "Cleaning Products"),
    ("bar soap", "Bath & Body"),
    ("body soap", "Bath & Body"),
    ("toilet soap", "Bath & Body"),
    ("face wash", "Face Care"),
    ("face cream", "Face Care"),
    ("shampoo", "Hair Care"),
    ("hair oil", "Hair Care"),
    ("conditioner", "Hair Care"),
    ("toothpaste", "Oral Care"),
    ("mouthwash", "Oral Care"),
    ("spice", "Spices & Seasonings"),
    ("masala", "Spices & Seasonings"),
    ("tea", "Beverages"),
    ("coffee", "Beverages"),
    ("juice", "Beverages"),
];

/// Ordered quantity patterns with the canonical unit each one yields.
///
/// The multiplicative "N x M unit" form comes first so combo packs total
/// correctly before a plain-unit pattern can claim the inner amount. A
/// `None` unit marks the multiplicative form, whose unit is captured from
/// the text.
pub(crate) static QUANTITY_PATTERNS: LazyLock<Vec<(Regex, Option<&'static str>)>> =
    LazyLock::new(|| {
        vec![
            (
                Regex::new(r"(\d+)\s*x\s*(\d+(?:\.\d+)?)\s*(g|gm|ml|l|kg)").unwrap(),
                None,
            ),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*g\b").unwrap(), Some("g")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*gm\b").unwrap(), Some("g")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*gram\b").unwrap(), Some("g")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*kg\b").unwrap(), Some("kg")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*ml\b").unwrap(), Some("ml")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*l\b").unwrap(), Some("l")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*liter\b").unwrap(), Some("l")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*pc\b").unwrap(), Some("pc")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*piece\b").unwrap(), Some("pc")),
            (Regex::new(r"(\d+(?:\.\d+)?)\s*pack\b").unwrap(), Some("pack")),
        ]
    });

/// Bare digits-then-unit scan used when no ordered pattern matched
pub(crate) static GENERIC_WEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:g|gm|gram|ml|l|kg)").unwrap());

/// Units checked for literal adjacency in the generic scan, in order
pub(crate) const ADJACENT_UNITS: [&str; 4] = ["g", "ml", "kg", "l"];

/// Listing-style weight suffix, e.g. "500 Gm"
pub(crate) static GM_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*gm\b").unwrap());

/// Base feature phrases per category
pub(crate) const PERSONAL_CARE_FEATURES: [&str; 3] = [
    "Gentle formula",
    "Suitable for daily use",
    "Dermatologically tested",
];
pub(crate) const HOUSEHOLD_FEATURES: [&str; 3] =
    ["Effective cleaning", "Easy to use", "Value for money"];
pub(crate) const FOOD_FEATURES: [&str; 3] = ["Fresh quality", "Nutritious", "Ready to consume"];
pub(crate) const GENERIC_FEATURES: [&str; 3] = ["Quality product", "Trusted brand", "Good value"];
