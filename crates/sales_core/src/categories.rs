//! Genre, theme and price-bracket codes
//!
//! The raw dataset stores short abbreviations (`AA`, `SF`, ...) for genres and
//! themes and free-form bracket text for prices. The model works on small
//! integer codes, and the query layer talks in human-readable labels.
//!
//! Code spaces:
//! - themes occupy `0..=10`
//! - genres occupy `11..=17`
//! - "Party Games" exists on both axes (theme `10`, genre `17`)
//!
//! Every lookup scans the variant lists below, so the label, code and
//! abbreviation of a variant are defined in exactly one place.

use serde::Serialize;
use std::fmt;

use crate::errors::{CoreError, Result};

/// Game genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Genre {
    ActionAdventure,
    RolePlaying,
    Strategy,
    Simulation,
    SportsAndRacing,
    VisualNovels,
    PartyGames,
}

impl Genre {
    /// Every genre in code order
    pub const ALL: [Genre; 7] = [
        Genre::ActionAdventure,
        Genre::RolePlaying,
        Genre::Strategy,
        Genre::Simulation,
        Genre::SportsAndRacing,
        Genre::VisualNovels,
        Genre::PartyGames,
    ];

    /// Genres reported by a theme drill-down (codes `11..=16`)
    pub const CORE: [Genre; 6] = [
        Genre::ActionAdventure,
        Genre::RolePlaying,
        Genre::Strategy,
        Genre::Simulation,
        Genre::SportsAndRacing,
        Genre::VisualNovels,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Genre::ActionAdventure => 11,
            Genre::RolePlaying => 12,
            Genre::Strategy => 13,
            Genre::Simulation => 14,
            Genre::SportsAndRacing => 15,
            Genre::VisualNovels => 16,
            Genre::PartyGames => 17,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Genre::ActionAdventure => "Action-Adventure",
            Genre::RolePlaying => "Role-Playing",
            Genre::Strategy => "Strategy",
            Genre::Simulation => "Simulation",
            Genre::SportsAndRacing => "Sports and Racing",
            Genre::VisualNovels => "Visual Novels",
            Genre::PartyGames => "Party Games",
        }
    }

    /// Abbreviation used in the raw dataset
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Genre::ActionAdventure => "AA",
            Genre::RolePlaying => "RP",
            Genre::Strategy => "ST",
            Genre::Simulation => "SM",
            Genre::SportsAndRacing => "SR",
            Genre::VisualNovels => "VN",
            Genre::PartyGames => "PG",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.code() == code)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.label() == label)
    }

    pub fn from_abbreviation(abbreviation: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.abbreviation() == abbreviation)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Game theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Theme {
    Anime,
    Horror,
    Mystery,
    ScienceFiction,
    Fantasy,
    PostApocalyptic,
    History,
    Modern,
    War,
    Superhero,
    PartyGames,
}

impl Theme {
    /// Every theme in code order
    pub const ALL: [Theme; 11] = [
        Theme::Anime,
        Theme::Horror,
        Theme::Mystery,
        Theme::ScienceFiction,
        Theme::Fantasy,
        Theme::PostApocalyptic,
        Theme::History,
        Theme::Modern,
        Theme::War,
        Theme::Superhero,
        Theme::PartyGames,
    ];

    /// Themes reported by a genre drill-down (codes `0..=9`)
    pub const CORE: [Theme; 10] = [
        Theme::Anime,
        Theme::Horror,
        Theme::Mystery,
        Theme::ScienceFiction,
        Theme::Fantasy,
        Theme::PostApocalyptic,
        Theme::History,
        Theme::Modern,
        Theme::War,
        Theme::Superhero,
    ];

    pub const fn code(self) -> u8 {
        match self {
            Theme::Anime => 0,
            Theme::Horror => 1,
            Theme::Mystery => 2,
            Theme::ScienceFiction => 3,
            Theme::Fantasy => 4,
            Theme::PostApocalyptic => 5,
            Theme::History => 6,
            Theme::Modern => 7,
            Theme::War => 8,
            Theme::Superhero => 9,
            Theme::PartyGames => 10,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Theme::Anime => "Anime",
            Theme::Horror => "Horror",
            Theme::Mystery => "Mystery",
            Theme::ScienceFiction => "Science-fiction",
            Theme::Fantasy => "Fantasy",
            Theme::PostApocalyptic => "Post-apocalyptic",
            Theme::History => "History",
            Theme::Modern => "Modern",
            Theme::War => "War",
            Theme::Superhero => "Superhero",
            Theme::PartyGames => "Party Games",
        }
    }

    /// Abbreviation used in the raw dataset
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Theme::Anime => "AN",
            Theme::Horror => "HR",
            Theme::Mystery => "MY",
            Theme::ScienceFiction => "SF",
            Theme::Fantasy => "FN",
            Theme::PostApocalyptic => "PA",
            Theme::History => "HS",
            Theme::Modern => "MD",
            Theme::War => "WA",
            Theme::Superhero => "SH",
            Theme::PartyGames => "PG",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    pub fn from_abbreviation(abbreviation: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.abbreviation() == abbreviation)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Price bracket of a game at release
///
/// Only the encode direction exists: bracket text is turned into an ordinal
/// code while loading the dataset and is never shown back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriceBracket {
    Free,
    Under15,
    From15To25,
    From25To50,
    Standard,
    Over60,
}

impl PriceBracket {
    pub const ALL: [PriceBracket; 6] = [
        PriceBracket::Free,
        PriceBracket::Under15,
        PriceBracket::From15To25,
        PriceBracket::From25To50,
        PriceBracket::Standard,
        PriceBracket::Over60,
    ];

    pub const fn code(self) -> u8 {
        match self {
            PriceBracket::Free => 0,
            PriceBracket::Under15 => 1,
            PriceBracket::From15To25 => 2,
            PriceBracket::From25To50 => 3,
            PriceBracket::Standard => 4,
            PriceBracket::Over60 => 5,
        }
    }

    const fn raw_label(self) -> &'static str {
        match self {
            PriceBracket::Free => "free",
            PriceBracket::Under15 => "<$15",
            PriceBracket::From15To25 => "$15-25",
            PriceBracket::From25To50 => "$25-50",
            PriceBracket::Standard => "$59.99",
            PriceBracket::Over60 => ">$60",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn from_label(label: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.raw_label() == label)
            .ok_or_else(|| CoreError::UnknownPriceBracket(label.to_string()))
    }
}

/// Category axis used by drill-down queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    Genre,
    Theme,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Genre => f.write_str("genre"),
            Axis::Theme => f.write_str("theme"),
        }
    }
}

/// A genre or a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Genre(Genre),
    Theme(Theme),
}

impl Category {
    pub const fn code(self) -> u8 {
        match self {
            Category::Genre(g) => g.code(),
            Category::Theme(t) => t.code(),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Category::Genre(g) => g.label(),
            Category::Theme(t) => t.label(),
        }
    }

    pub const fn axis(self) -> Axis {
        match self {
            Category::Genre(_) => Axis::Genre,
            Category::Theme(_) => Axis::Theme,
        }
    }

    /// Resolve a label on one axis only
    pub fn on_axis(axis: Axis, label: &str) -> Option<Self> {
        match axis {
            Axis::Genre => Genre::from_label(label).map(Category::Genre),
            Axis::Theme => Theme::from_label(label).map(Category::Theme),
        }
    }
}

/// Map a human-readable genre or theme label to its code.
///
/// The genre axis is searched first, so "Party Games" encodes to `17`.
pub fn encode(label: &str) -> Result<u8> {
    Genre::from_label(label)
        .map(Genre::code)
        .or_else(|| Theme::from_label(label).map(Theme::code))
        .ok_or_else(|| CoreError::UnknownLabel(label.to_string()))
}

/// Map a genre or theme code back to its human-readable label.
///
/// Both `10` and `17` decode to "Party Games".
pub fn decode(code: u8) -> Result<&'static str> {
    Theme::from_code(code)
        .map(Theme::label)
        .or_else(|| Genre::from_code(code).map(Genre::label))
        .ok_or(CoreError::UnknownCode(code))
}
