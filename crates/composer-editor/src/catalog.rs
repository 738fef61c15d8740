//! The component catalog — the external lookup table the core never
//! validates against.
//!
//! Per component type: palette label, default size, default props, and the
//! property schema the properties panel renders. Container membership for
//! drag-reparenting lives in the core (`composer_core::is_container_type`);
//! everything here is presentation-side policy.

use composer_core::model::{PropMap, PropValue, Size};

/// One palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteItem {
    pub kind: &'static str,
    pub label: &'static str,
}

/// The built-in palette, in display order.
pub const PALETTE: &[PaletteItem] = &[
    PaletteItem {
        kind: "Button",
        label: "Button",
    },
    PaletteItem {
        kind: "Card",
        label: "Card",
    },
    PaletteItem {
        kind: "Input",
        label: "Input",
    },
    PaletteItem {
        kind: "Text",
        label: "Text",
    },
    PaletteItem {
        kind: "Badge",
        label: "Badge",
    },
    PaletteItem {
        kind: "Avatar",
        label: "Avatar",
    },
    PaletteItem {
        kind: "Separator",
        label: "Separator",
    },
];

/// Default size for a freshly dropped component.
#[must_use]
pub fn default_size(kind: &str) -> Size {
    match kind {
        "Card" => Size::new(300.0, 200.0),
        "Input" => Size::new(200.0, 40.0),
        "Text" => Size::new(120.0, 24.0),
        "Badge" => Size::new(60.0, 24.0),
        "Avatar" => Size::new(40.0, 40.0),
        "Separator" => Size::new(200.0, 1.0),
        // Button and anything unknown
        _ => Size::new(100.0, 40.0),
    }
}

/// Default props for a freshly dropped component.
#[must_use]
pub fn default_props(kind: &str) -> PropMap {
    let mut props = PropMap::new();
    match kind {
        "Button" => {
            props.insert("label".into(), "Button".into());
            props.insert("variant".into(), "default".into());
            props.insert("size".into(), "default".into());
        }
        "Card" => {
            props.insert("title".into(), "Card Title".into());
            props.insert("description".into(), "Card description".into());
        }
        "Input" => {
            props.insert("placeholder".into(), "Enter text...".into());
        }
        "Text" => {
            props.insert("content".into(), "Text".into());
        }
        "Badge" => {
            props.insert("label".into(), "Badge".into());
            props.insert("variant".into(), "default".into());
        }
        "Avatar" => {
            props.insert("fallback".into(), "AB".into());
        }
        _ => {}
    }
    props
}

/// How the properties panel edits one prop.
#[derive(Debug, Clone, PartialEq)]
pub enum PropControl {
    Text,
    Number,
    Boolean,
    Select(&'static [&'static str]),
}

/// Schema for a single editable prop.
#[derive(Debug, Clone, PartialEq)]
pub struct PropSchema {
    pub key: &'static str,
    pub label: &'static str,
    pub control: PropControl,
    pub default: Option<PropValue>,
}

const BUTTON_VARIANTS: &[&str] = &[
    "default",
    "destructive",
    "outline",
    "secondary",
    "ghost",
    "link",
];
const BUTTON_SIZES: &[&str] = &["default", "sm", "lg", "icon"];
const BADGE_VARIANTS: &[&str] = &["default", "secondary", "destructive", "outline"];

/// Property schema for a component type. Unknown types have no editable
/// props beyond position and size.
#[must_use]
pub fn prop_schemas(kind: &str) -> Vec<PropSchema> {
    match kind {
        "Button" => vec![
            PropSchema {
                key: "label",
                label: "Label",
                control: PropControl::Text,
                default: Some("Button".into()),
            },
            PropSchema {
                key: "variant",
                label: "Variant",
                control: PropControl::Select(BUTTON_VARIANTS),
                default: Some("default".into()),
            },
            PropSchema {
                key: "size",
                label: "Size",
                control: PropControl::Select(BUTTON_SIZES),
                default: Some("default".into()),
            },
        ],
        "Card" => vec![
            PropSchema {
                key: "title",
                label: "Title",
                control: PropControl::Text,
                default: Some("Card Title".into()),
            },
            PropSchema {
                key: "description",
                label: "Description",
                control: PropControl::Text,
                default: Some("Card description".into()),
            },
        ],
        "Input" => vec![PropSchema {
            key: "placeholder",
            label: "Placeholder",
            control: PropControl::Text,
            default: Some("Enter text...".into()),
        }],
        "Text" => vec![PropSchema {
            key: "content",
            label: "Content",
            control: PropControl::Text,
            default: Some("Text".into()),
        }],
        "Badge" => vec![
            PropSchema {
                key: "label",
                label: "Label",
                control: PropControl::Text,
                default: Some("Badge".into()),
            },
            PropSchema {
                key: "variant",
                label: "Variant",
                control: PropControl::Select(BADGE_VARIANTS),
                default: Some("default".into()),
            },
        ],
        "Avatar" => vec![PropSchema {
            key: "fallback",
            label: "Fallback",
            control: PropControl::Text,
            default: Some("AB".into()),
        }],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_palette_entry() {
        for item in PALETTE {
            let size = default_size(item.kind);
            assert!(size.width > 0.0, "{} has no width", item.kind);
        }
    }

    #[test]
    fn schema_defaults_agree_with_default_props() {
        for item in PALETTE {
            let props = default_props(item.kind);
            for schema in prop_schemas(item.kind) {
                assert_eq!(
                    props.get(schema.key),
                    schema.default.as_ref(),
                    "{}:{} schema default drifted from default_props",
                    item.kind,
                    schema.key
                );
            }
        }
    }

    #[test]
    fn unknown_kind_falls_back() {
        assert_eq!(default_size("Widget"), Size::new(100.0, 40.0));
        assert!(default_props("Widget").is_empty());
        assert!(prop_schemas("Widget").is_empty());
    }
}
