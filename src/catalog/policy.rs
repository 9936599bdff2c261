//! Per-category question policy
//!
//! Which attribute dimensions a category asks about, and in which order,
//! is declared here once. Handlers never compare category ids; they ask
//! the policy table. Every sequence starts with color, the only dimension
//! every sellable item carries.

/// One selectable product facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Color,
    Memory,
    ScreenSize,
    Connectivity,
    Ram,
}

/// Enumerated category behavior, stored in `categories.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// color → memory (iPhone-like)
    Phone,
    /// color → memory → connectivity (iPad-like)
    Tablet,
    /// color → screen size (Watch-like)
    Watch,
    /// color → memory → ram (MacBook-like)
    Laptop,
    /// color only (AirPods-like)
    Accessory,
}

impl CategoryKind {
    /// Parses the `categories.kind` column.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "phone" => Some(Self::Phone),
            "tablet" => Some(Self::Tablet),
            "watch" => Some(Self::Watch),
            "laptop" => Some(Self::Laptop),
            "accessory" => Some(Self::Accessory),
            _ => None,
        }
    }

    /// The full dimension sequence for this category, in question order.
    pub fn dimensions(self) -> &'static [Dimension] {
        use Dimension::*;
        match self {
            Self::Phone => &[Color, Memory],
            Self::Tablet => &[Color, Memory, Connectivity],
            Self::Watch => &[Color, ScreenSize],
            Self::Laptop => &[Color, Memory, Ram],
            Self::Accessory => &[Color],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Dimension::*;

    #[test]
    fn parse_accepts_known_kinds_only() {
        assert_eq!(CategoryKind::parse("phone"), Some(CategoryKind::Phone));
        assert_eq!(CategoryKind::parse("accessory"), Some(CategoryKind::Accessory));
        assert_eq!(CategoryKind::parse("fridge"), None);
        assert_eq!(CategoryKind::parse(""), None);
    }

    #[test]
    fn every_sequence_starts_with_color() {
        for kind in [
            CategoryKind::Phone,
            CategoryKind::Tablet,
            CategoryKind::Watch,
            CategoryKind::Laptop,
            CategoryKind::Accessory,
        ] {
            assert_eq!(kind.dimensions()[0], Color);
        }
    }

    #[test]
    fn sequences_match_the_storefront_policy() {
        assert_eq!(CategoryKind::Phone.dimensions(), &[Color, Memory]);
        assert_eq!(CategoryKind::Tablet.dimensions(), &[Color, Memory, Connectivity]);
        assert_eq!(CategoryKind::Watch.dimensions(), &[Color, ScreenSize]);
        assert_eq!(CategoryKind::Laptop.dimensions(), &[Color, Memory, Ram]);
        assert_eq!(CategoryKind::Accessory.dimensions(), &[Color]);
    }
}
