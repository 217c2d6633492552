//! Built-in card definitions.
//!
//! `baseCard` is the card the viewer shows. The three stage cards and their
//! floating sub-cards are reserved for a multi-card layout and are not
//! rendered yet.

use glam::Vec3;

use crate::color::Color;
use crate::config::{CardConfig, CardOverrides};

/// Keys of the built-in cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardKey {
    Base,
    Idea,
    Prototype,
    Product,
}

impl CardKey {
    pub const ALL: [CardKey; 4] = [
        CardKey::Base,
        CardKey::Idea,
        CardKey::Prototype,
        CardKey::Product,
    ];

    /// The data key, e.g. `"ideaCard"`.
    pub fn as_str(self) -> &'static str {
        match self {
            CardKey::Base => "baseCard",
            CardKey::Idea => "ideaCard",
            CardKey::Prototype => "prototypeCard",
            CardKey::Product => "productCard",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// A small labelled card floating above a stage card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubCard {
    pub label: &'static str,
    pub position: Vec3,
}

impl SubCard {
    const fn new(label: &'static str, x: f32, y: f32, z: f32) -> Self {
        Self {
            label,
            position: Vec3::new(x, y, z),
        }
    }
}

const IDEA_SUB_CARDS: [SubCard; 3] = [
    SubCard::new("Research", -4.0, 1.0, 0.5),
    SubCard::new("Brainstorm", -4.0, 1.5, 0.8),
    SubCard::new("Validate", -4.0, 2.0, 1.1),
];

const PROTOTYPE_SUB_CARDS: [SubCard; 3] = [
    SubCard::new("Design", 0.0, 1.0, 0.5),
    SubCard::new("Build", 0.0, 1.5, 0.8),
    SubCard::new("Test", 0.0, 2.0, 1.1),
];

const PRODUCT_SUB_CARDS: [SubCard; 3] = [
    SubCard::new("Launch", 4.0, 1.0, 0.5),
    SubCard::new("Scale", 4.0, 1.5, 0.8),
    SubCard::new("Optimize", 4.0, 2.0, 1.1),
];

/// Lookup for the built-in cards.
pub struct CardCatalog;

impl CardCatalog {
    /// The authored overrides for `key`.
    pub fn overrides(key: CardKey) -> CardOverrides {
        match key {
            CardKey::Base => CardOverrides::new()
                .size(3.5, 2.5, 0.25)
                .radius(0.05)
                .color(Color::hex(0xefefef))
                .opacity(1.0)
                .transmission(0.9)
                .roughness(0.05)
                .metalness(0.1)
                .thickness(0.8)
                .ior(1.5)
                .clearcoat(1.0, 0.05)
                .position(0.0, 0.0, 0.0)
                .rotation(-43.0, 14.0, 33.0),
            CardKey::Idea => stage_card(0x60a5fa, -4.0, "Idea"),
            CardKey::Prototype => stage_card(0x34d399, 0.0, "Prototype"),
            CardKey::Product => stage_card(0xf472b6, 4.0, "Product"),
        }
    }

    pub fn get(key: CardKey) -> CardConfig {
        Self::overrides(key).resolve()
    }

    /// Looks a card up by its data key (`"baseCard"`, `"ideaCard"`, ...).
    pub fn by_key(key: &str) -> Option<CardConfig> {
        CardKey::from_key(key).map(Self::get)
    }

    pub fn base_card() -> CardConfig {
        Self::get(CardKey::Base)
    }

    /// Sub-cards of a stage card. The base card has none.
    pub fn sub_cards(key: CardKey) -> &'static [SubCard] {
        match key {
            CardKey::Base => &[],
            CardKey::Idea => &IDEA_SUB_CARDS,
            CardKey::Prototype => &PROTOTYPE_SUB_CARDS,
            CardKey::Product => &PRODUCT_SUB_CARDS,
        }
    }
}

fn stage_card(color: u32, x: f32, label: &str) -> CardOverrides {
    CardOverrides::new()
        .size(2.5, 3.5, 0.1)
        .radius(0.15)
        .color(Color::hex(color))
        .opacity(0.3)
        .transmission(0.9)
        .roughness(0.05)
        .metalness(0.02)
        .thickness(0.8)
        .ior(1.5)
        .clearcoat(1.0, 0.05)
        .position(x, 0.0, 0.0)
        .rotation(15.0, -25.0, 0.0)
        .label(label)
}
