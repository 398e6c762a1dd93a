//! Taxonomy decoding of filename stems
//!
//! A stem is a positional micro-grammar:
//!
//! ```text
//! <domain:1> <category:1> <payload> [z]
//! ```
//!
//! `d` is the only supported domain. The category code selects the payload
//! shape: numbered categories take a variable-length payload whose first run
//! of digits is the technique number; every other category reads exactly two
//! fixed-width fields. A trailing `z` on the stem is the reset marker; for a
//! fixed-width payload it may double as the second field (`ds1z`).

use std::fmt;

use crate::stem::drop_leading_marker;
use crate::{Error, Result};

/// Trailing character that asks for the variation list to be cleared
pub const RESET_MARKER: char = 'z';

/// Width of every non-numbered payload
const FIXED_PAYLOAD_WIDTH: usize = 2;

/// Top-level taxonomy namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    DanzanRyu,
}

impl Domain {
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'd' => Some(Domain::DanzanRyu),
            _ => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Domain::DanzanRyu => 'd',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Domain::DanzanRyu => "danzan_ryu",
        }
    }
}

/// How a category's payload is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Technique number (first run of digits)
    Numbered,
    /// Set digit + technique digit
    SetNumber,
    /// Weapon code + technique digit
    WeaponNumber,
    /// Drill code + technique digit
    DrillNumber,
    /// Entry direction code + technique digit
    EntryNumber,
    /// Ground flow digit + technique letter
    FlowLetter,
}

/// Technique family (scroll); one catalog table each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    BasicNage,
    Goshin,
    Shime,
    BasicStick,
    BasicKnife,
    BasicHandgun,
    Kdm,
    Oku,
    Shinin,
    AdvancedNage,
    AikijutsuNage,
    AdvancedWeapons,
    BasicYawara,
    AdvancedYawara,
    Exercises,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::BasicNage,
        Category::Goshin,
        Category::Shime,
        Category::BasicStick,
        Category::BasicKnife,
        Category::BasicHandgun,
        Category::Kdm,
        Category::Oku,
        Category::Shinin,
        Category::AdvancedNage,
        Category::AikijutsuNage,
        Category::AdvancedWeapons,
        Category::BasicYawara,
        Category::AdvancedYawara,
        Category::Exercises,
    ];

    pub fn from_code(code: char) -> Result<Self> {
        let category = match code {
            'n' => Category::BasicNage,
            'g' => Category::Goshin,
            's' => Category::Shime,
            't' => Category::BasicStick,
            'f' => Category::BasicKnife,
            'u' => Category::BasicHandgun,
            'k' => Category::Kdm,
            'o' => Category::Oku,
            'i' => Category::Shinin,
            'v' => Category::AdvancedNage,
            'j' => Category::AikijutsuNage,
            'a' => Category::AdvancedWeapons,
            'y' => Category::BasicYawara,
            'd' => Category::AdvancedYawara,
            'x' => Category::Exercises,
            other => return Err(Error::UnknownCategory(other)),
        };
        Ok(category)
    }

    pub fn code(self) -> char {
        match self {
            Category::BasicNage => 'n',
            Category::Goshin => 'g',
            Category::Shime => 's',
            Category::BasicStick => 't',
            Category::BasicKnife => 'f',
            Category::BasicHandgun => 'u',
            Category::Kdm => 'k',
            Category::Oku => 'o',
            Category::Shinin => 'i',
            Category::AdvancedNage => 'v',
            Category::AikijutsuNage => 'j',
            Category::AdvancedWeapons => 'a',
            Category::BasicYawara => 'y',
            Category::AdvancedYawara => 'd',
            Category::Exercises => 'x',
        }
    }

    /// Category name as known to the table directory
    pub fn name(self) -> &'static str {
        match self {
            Category::BasicNage => "basic_nage",
            Category::Goshin => "goshin",
            Category::Shime => "shime",
            Category::BasicStick => "basic_stick",
            Category::BasicKnife => "basic_knife",
            Category::BasicHandgun => "basic_handgun",
            Category::Kdm => "kdm",
            Category::Oku => "oku",
            Category::Shinin => "shinin",
            Category::AdvancedNage => "advanced_nage",
            Category::AikijutsuNage => "aikijutsu_nage",
            Category::AdvancedWeapons => "advanced_weapons",
            Category::BasicYawara => "basic_yawara",
            Category::AdvancedYawara => "advanced_yawara",
            Category::Exercises => "exercises",
        }
    }

    pub fn shape(self) -> PayloadShape {
        match self {
            Category::BasicNage
            | Category::Oku
            | Category::Shinin
            | Category::AdvancedNage
            | Category::AikijutsuNage
            | Category::BasicYawara
            | Category::AdvancedYawara
            | Category::Exercises => PayloadShape::Numbered,
            Category::BasicStick | Category::BasicKnife | Category::BasicHandgun => {
                PayloadShape::SetNumber
            }
            Category::AdvancedWeapons => PayloadShape::WeaponNumber,
            Category::Kdm => PayloadShape::DrillNumber,
            Category::Goshin => PayloadShape::EntryNumber,
            Category::Shime => PayloadShape::FlowLetter,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weapon qualifier of the advanced weapons scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weapon {
    Stick,
    Knife,
    Handgun,
    Rifle,
}

impl Weapon {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            't' => Some(Weapon::Stick),
            'f' => Some(Weapon::Knife),
            'u' => Some(Weapon::Handgun),
            'r' => Some(Weapon::Rifle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weapon::Stick => "stick",
            Weapon::Knife => "knife",
            Weapon::Handgun => "handgun",
            Weapon::Rifle => "rifle",
        }
    }
}

/// Drill qualifier of the kdm scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillType {
    Punch,
    Kick,
    KickDefense,
    PunchDefense,
}

impl DrillType {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'p' => Some(DrillType::Punch),
            'k' => Some(DrillType::Kick),
            'i' => Some(DrillType::KickDefense),
            'u' => Some(DrillType::PunchDefense),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DrillType::Punch => "punch",
            DrillType::Kick => "kick",
            DrillType::KickDefense => "kick_defense",
            DrillType::PunchDefense => "punch_defense",
        }
    }
}

/// Entry direction qualifier of the goshin scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inside,
    Outside,
}

impl Direction {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'i' => Some(Direction::Inside),
            'o' => Some(Direction::Outside),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Inside => "inside",
            Direction::Outside => "outside",
        }
    }
}

/// A stem split into its grammar fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemKey {
    pub domain: Domain,
    pub category: Category,
    /// Category-specific payload, reset marker removed
    pub payload: String,
    /// The stem carried the trailing reset marker
    pub reset: bool,
}

impl StemKey {
    pub fn parse(stem: &str) -> Result<Self> {
        let marker = stem.chars().next().ok_or_else(|| Error::TruncatedStem {
            stem: stem.to_string(),
            field: "domain marker",
        })?;
        let domain = Domain::from_marker(marker).ok_or_else(|| Error::UnsupportedDomain {
            stem: stem.to_string(),
            marker,
        })?;

        let rest = drop_leading_marker(stem);
        let code = rest.chars().next().ok_or_else(|| Error::TruncatedStem {
            stem: stem.to_string(),
            field: "category code",
        })?;
        let category = Category::from_code(code)?;

        let (payload, reset) = split_reset(category, drop_leading_marker(rest))?;
        if payload.is_empty() {
            return Err(Error::TruncatedStem {
                stem: stem.to_string(),
                field: "payload",
            });
        }

        Ok(Self {
            domain,
            category,
            payload: payload.to_string(),
            reset,
        })
    }

    /// Decode the payload into typed item fields
    pub fn item(&self) -> Result<ItemKey> {
        let category = self.category;
        let fail = |reason: &str| payload_error(category, &self.payload, reason);

        let shape = category.shape();
        if shape == PayloadShape::Numbered {
            let number: String = self
                .payload
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if number.is_empty() {
                return Err(fail("no technique number"));
            }
            return Ok(ItemKey::Number(number));
        }

        let mut chars = self.payload.chars();
        let (first, second) = match (chars.next(), chars.next()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(fail("expected two fields")),
        };

        match shape {
            PayloadShape::SetNumber => Ok(ItemKey::SetNumber {
                set: first,
                number: second,
            }),
            PayloadShape::WeaponNumber => Ok(ItemKey::WeaponNumber {
                weapon: Weapon::from_code(first)
                    .ok_or_else(|| fail(&format!("unknown weapon code {:?}", first)))?,
                number: second,
            }),
            PayloadShape::DrillNumber => Ok(ItemKey::DrillNumber {
                drill: DrillType::from_code(first)
                    .ok_or_else(|| fail(&format!("unknown drill code {:?}", first)))?,
                number: second,
            }),
            PayloadShape::EntryNumber => Ok(ItemKey::EntryNumber {
                direction: Direction::from_code(first)
                    .ok_or_else(|| fail(&format!("unknown entry direction {:?}", first)))?,
                number: second,
            }),
            PayloadShape::FlowLetter => Ok(ItemKey::FlowLetter {
                flow: first,
                letter: second,
            }),
            PayloadShape::Numbered => Err(fail("numbered payload has no fixed fields")),
        }
    }
}

/// Typed payload fields of an indexed stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKey {
    Number(String),
    SetNumber { set: char, number: char },
    WeaponNumber { weapon: Weapon, number: char },
    DrillNumber { drill: DrillType, number: char },
    EntryNumber { direction: Direction, number: char },
    FlowLetter { flow: char, letter: char },
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Number(n) => write!(f, "#{}", n),
            ItemKey::SetNumber { set, number } => write!(f, "set {} #{}", set, number),
            ItemKey::WeaponNumber { weapon, number } => write!(f, "{} #{}", weapon.as_str(), number),
            ItemKey::DrillNumber { drill, number } => write!(f, "{} #{}", drill.as_str(), number),
            ItemKey::EntryNumber { direction, number } => {
                write!(f, "{} #{}", direction.as_str(), number)
            }
            ItemKey::FlowLetter { flow, letter } => write!(f, "flow {} {}", flow, letter),
        }
    }
}

/// Separate the optional reset marker from a category's payload
fn split_reset(category: Category, payload: &str) -> Result<(&str, bool)> {
    if category.shape() == PayloadShape::Numbered {
        return Ok(match payload.strip_suffix(RESET_MARKER) {
            Some(rest) => (rest, true),
            None => (payload, false),
        });
    }

    let reset = payload.ends_with(RESET_MARKER);
    let width = payload.chars().count();
    if width <= FIXED_PAYLOAD_WIDTH {
        return Ok((payload, reset));
    }
    if width == FIXED_PAYLOAD_WIDTH + 1 && reset {
        return Ok((&payload[..payload.len() - RESET_MARKER.len_utf8()], true));
    }
    Err(payload_error(
        category,
        payload,
        "expected two characters and an optional reset marker",
    ))
}

fn payload_error(category: Category, payload: &str, reason: &str) -> Error {
    Error::UnsupportedPayload {
        category: category.name(),
        payload: payload.to_string(),
        reason: reason.to_string(),
    }
}
