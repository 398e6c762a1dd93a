//! Lookup predicates for catalog records
//!
//! Maps a decoded stem to the attribute-equality predicate that must match
//! exactly one record in the category's table. Which rule set applies is a
//! deployment setting ([`KeyScheme`]); the `named` scheme only has a rule for
//! numbered categories.

use vodcat_common::catalog::{attr, KeyScheme, Predicate};

use crate::taxonomy::{ItemKey, PayloadShape, StemKey};
use crate::{Error, Result};

/// Predicate locating the record for `key` under `scheme`
pub fn build_predicate(scheme: KeyScheme, key: &StemKey) -> Result<Predicate> {
    match scheme {
        KeyScheme::Indexed => Ok(indexed_predicate(&key.item()?)),
        KeyScheme::Named => match key.category.shape() {
            PayloadShape::Numbered => Ok(Predicate::eq(attr::NAME, key.payload.as_str())),
            PayloadShape::SetNumber
            | PayloadShape::WeaponNumber
            | PayloadShape::DrillNumber
            | PayloadShape::EntryNumber
            | PayloadShape::FlowLetter => Err(Error::NotImplementedCategory {
                category: key.category.name(),
                scheme: scheme.as_str(),
            }),
        },
    }
}

/// Predicate for a decoded indexed item
pub fn indexed_predicate(item: &ItemKey) -> Predicate {
    match item {
        ItemKey::Number(number) => Predicate::eq(attr::NUMBER, number.as_str()),
        ItemKey::SetNumber { set, number } => {
            Predicate::eq(attr::SET, set.to_string()).and(attr::NUMBER, number.to_string())
        }
        ItemKey::WeaponNumber { weapon, number } => {
            Predicate::eq(attr::WEAPON, weapon.as_str()).and(attr::NUMBER, number.to_string())
        }
        ItemKey::DrillNumber { drill, number } => {
            Predicate::eq(attr::DRILL_TYPE, drill.as_str()).and(attr::NUMBER, number.to_string())
        }
        ItemKey::EntryNumber { direction, number } => {
            Predicate::eq(attr::ENTER, direction.as_str()).and(attr::NUMBER, number.to_string())
        }
        ItemKey::FlowLetter { flow, letter } => Predicate::eq(attr::GROUND_FLOW_NUMBER, flow.to_string())
            .and(attr::LETTER, letter.to_string()),
    }
}
