//! Callback data encoding
//!
//! Inline keyboard buttons carry a `prefix_id` string; this module is the
//! single place that builds and parses it. Unknown or malformed data parses
//! to `None` and the handler answers the callback without acting, so stale
//! buttons from old messages cannot crash anything.

use crate::catalog::Dimension;

/// Parsed callback button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    OpenCatalog,
    OpenBasket,
    IndividualRequest,
    Category(i64),
    Model(i64),
    Pick(Dimension, i64),
    AddToBasket(i64),
    RemoveFromBasket(i64),
    BackToCategories,
    BackToModels,
    /// Step back to re-ask the given dimension
    BackToDimension(Dimension),
    ClearBasket,
    Checkout,
}

fn dimension_prefix(dim: Dimension) -> &'static str {
    match dim {
        Dimension::Color => "color",
        Dimension::Memory => "memory",
        Dimension::ScreenSize => "screen_size",
        Dimension::Connectivity => "connection",
        Dimension::Ram => "ram",
    }
}

fn dimension_from_prefix(prefix: &str) -> Option<Dimension> {
    match prefix {
        "color" => Some(Dimension::Color),
        "memory" => Some(Dimension::Memory),
        "screen_size" => Some(Dimension::ScreenSize),
        "connection" => Some(Dimension::Connectivity),
        "ram" => Some(Dimension::Ram),
        _ => None,
    }
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            Self::OpenCatalog => "catalog".into(),
            Self::OpenBasket => "basket".into(),
            Self::IndividualRequest => "individual_request".into(),
            Self::Category(id) => format!("category_{}", id),
            Self::Model(id) => format!("model_{}", id),
            Self::Pick(dim, id) => format!("{}_{}", dimension_prefix(*dim), id),
            Self::AddToBasket(id) => format!("add_to_basket_{}", id),
            Self::RemoveFromBasket(id) => format!("remove_from_basket_{}", id),
            Self::BackToCategories => "back_to_categories".into(),
            Self::BackToModels => "back_to_models".into(),
            Self::BackToDimension(dim) => format!("back_to_{}", dimension_prefix(*dim)),
            Self::ClearBasket => "clear_basket".into(),
            Self::Checkout => "checkout".into(),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "catalog" => return Some(Self::OpenCatalog),
            "basket" => return Some(Self::OpenBasket),
            "individual_request" => return Some(Self::IndividualRequest),
            "back_to_categories" => return Some(Self::BackToCategories),
            "back_to_models" => return Some(Self::BackToModels),
            "clear_basket" => return Some(Self::ClearBasket),
            "checkout" => return Some(Self::Checkout),
            _ => {}
        }

        if let Some(rest) = data.strip_prefix("back_to_") {
            return dimension_from_prefix(rest).map(Self::BackToDimension);
        }

        // Longest prefixes first so "screen_size_" wins over hypothetical
        // shorter matches.
        let prefixed: &[(&str, fn(i64) -> Self)] = &[
            ("add_to_basket_", Self::AddToBasket),
            ("remove_from_basket_", Self::RemoveFromBasket),
            ("screen_size_", |id| Self::Pick(Dimension::ScreenSize, id)),
            ("connection_", |id| Self::Pick(Dimension::Connectivity, id)),
            ("category_", Self::Category),
            ("memory_", |id| Self::Pick(Dimension::Memory, id)),
            ("model_", Self::Model),
            ("color_", |id| Self::Pick(Dimension::Color, id)),
            ("ram_", |id| Self::Pick(Dimension::Ram, id)),
        ];

        for (prefix, build) in prefixed {
            if let Some(rest) = data.strip_prefix(prefix) {
                return rest.parse::<i64>().ok().map(build);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_action() {
        let actions = [
            CallbackAction::OpenCatalog,
            CallbackAction::OpenBasket,
            CallbackAction::IndividualRequest,
            CallbackAction::Category(3),
            CallbackAction::Model(17),
            CallbackAction::Pick(Dimension::Color, 5),
            CallbackAction::Pick(Dimension::ScreenSize, 8),
            CallbackAction::Pick(Dimension::Connectivity, 2),
            CallbackAction::AddToBasket(44),
            CallbackAction::RemoveFromBasket(44),
            CallbackAction::BackToCategories,
            CallbackAction::BackToModels,
            CallbackAction::BackToDimension(Dimension::Memory),
            CallbackAction::ClearBasket,
            CallbackAction::Checkout,
        ];
        for action in actions {
            assert_eq!(CallbackAction::parse(&action.encode()), Some(action));
        }
    }

    #[test]
    fn parse_uses_the_expected_wire_prefixes() {
        assert_eq!(CallbackAction::parse("category_1"), Some(CallbackAction::Category(1)));
        assert_eq!(
            CallbackAction::parse("screen_size_9"),
            Some(CallbackAction::Pick(Dimension::ScreenSize, 9))
        );
        assert_eq!(
            CallbackAction::parse("connection_2"),
            Some(CallbackAction::Pick(Dimension::Connectivity, 2))
        );
        assert_eq!(
            CallbackAction::parse("add_to_basket_12"),
            Some(CallbackAction::AddToBasket(12))
        );
    }

    #[test]
    fn malformed_data_parses_to_none() {
        assert_eq!(CallbackAction::parse(""), None);
        assert_eq!(CallbackAction::parse("category_"), None);
        assert_eq!(CallbackAction::parse("category_abc"), None);
        assert_eq!(CallbackAction::parse("back_to_nowhere"), None);
        assert_eq!(CallbackAction::parse("unknown_7"), None);
    }
}
