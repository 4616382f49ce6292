//! Presentation metadata for transaction categories.

/// Icon and color used when rendering a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub key: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    /// Hex RGB color, `#rrggbb`.
    pub color: &'static str,
}

pub const FALLBACK_STYLE: CategoryStyle = CategoryStyle {
    key: "other",
    label: "Other",
    icon: "circle-help",
    color: "#9e9e9e",
};

pub const CATEGORY_STYLES: &[CategoryStyle] = &[
    CategoryStyle {
        key: "salary",
        label: "Salary",
        icon: "briefcase",
        color: "#2e7d32",
    },
    CategoryStyle {
        key: "rent",
        label: "Rent",
        icon: "home",
        color: "#6a1b9a",
    },
    CategoryStyle {
        key: "utilities",
        label: "Utilities",
        icon: "bolt",
        color: "#f9a825",
    },
    CategoryStyle {
        key: "groceries",
        label: "Groceries",
        icon: "shopping-cart",
        color: "#43a047",
    },
    CategoryStyle {
        key: "transport",
        label: "Transport",
        icon: "car",
        color: "#1e88e5",
    },
    CategoryStyle {
        key: "subscriptions",
        label: "Subscriptions",
        icon: "repeat",
        color: "#8e24aa",
    },
    CategoryStyle {
        key: "insurance",
        label: "Insurance",
        icon: "shield",
        color: "#00897b",
    },
    CategoryStyle {
        key: "debt",
        label: "Debt Repayment",
        icon: "credit-card",
        color: "#c62828",
    },
    CategoryStyle {
        key: "savings",
        label: "Savings",
        icon: "piggy-bank",
        color: "#3949ab",
    },
    CategoryStyle {
        key: "health",
        label: "Health",
        icon: "heart-pulse",
        color: "#d81b60",
    },
    CategoryStyle {
        key: "education",
        label: "Education",
        icon: "graduation-cap",
        color: "#5e35b1",
    },
    CategoryStyle {
        key: "entertainment",
        label: "Entertainment",
        icon: "film",
        color: "#fb8c00",
    },
    FALLBACK_STYLE,
];

/// Style for `key`, or [`FALLBACK_STYLE`] for unknown categories.
pub fn style_for(key: &str) -> &'static CategoryStyle {
    CATEGORY_STYLES
        .iter()
        .find(|style| style.key.eq_ignore_ascii_case(key.trim()))
        .unwrap_or(&FALLBACK_STYLE)
}

pub fn is_known_category(key: &str) -> bool {
    CATEGORY_STYLES
        .iter()
        .any(|style| style.key.eq_ignore_ascii_case(key.trim()))
}
