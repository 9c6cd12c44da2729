//! Record types and their flat-string encoding.
//!
//! Each record is stored as one member of a string set, its fields joined
//! by a fixed delimiter (`"|||"` for kitchen items, `"||"` for history
//! entries). The format carries no escaping and no version tag; it is kept
//! byte-for-byte compatible with already-stored data.
//!
//! Known limitation: a field value containing the delimiter substring
//! corrupts its own record. Decoding treats any such member as malformed
//! and drops it; nothing is ever surfaced as an error from this layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Field delimiter for kitchen item records.
pub const ITEM_DELIMITER: &str = "|||";

/// Field delimiter for history entries.
pub const ENTRY_DELIMITER: &str = "||";

/// Category of a kitchen item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Ingredients,
    Tools,
    Cookware,
}

impl ItemCategory {
    /// All categories, in display order.
    pub const ALL: [ItemCategory; 3] = [
        ItemCategory::Ingredients,
        ItemCategory::Tools,
        ItemCategory::Cookware,
    ];

    /// The stored spelling of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Ingredients => "INGREDIENTS",
            ItemCategory::Tools => "TOOLS",
            ItemCategory::Cookware => "COOKWARE",
        }
    }

    /// Parse the stored spelling. Unknown names are `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "INGREDIENTS" => Some(ItemCategory::Ingredients),
            "TOOLS" => Some(ItemCategory::Tools),
            "COOKWARE" => Some(ItemCategory::Cookware),
            _ => None,
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kitchen inventory record.
///
/// `id` is the stable identity key; the store holds at most one record per
/// id. `quantity` stays string-typed - the storage layer does not enforce
/// numeric validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenItem {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub category: ItemCategory,
}

impl KitchenItem {
    /// Create a new item with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        category: ItemCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            quantity: quantity.into(),
            category,
        }
    }
}

/// One recipe-generation event.
///
/// The (name, date) pair is the only identity; two entries with identical
/// fields collapse under set semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    /// Minute-resolution timestamp, `yyyy-MM-dd HH:mm`. Lexicographic order
    /// on this string coincides with chronological order.
    pub date: String,
}

/// Encode a kitchen item as one set member.
pub fn encode_item(item: &KitchenItem) -> String {
    [
        item.id.as_str(),
        item.name.as_str(),
        item.quantity.as_str(),
        item.category.as_str(),
    ]
    .join(ITEM_DELIMITER)
}

/// Decode one stored member as a kitchen item.
///
/// Requires at least 4 segments and a known category name in the fourth;
/// extra segments are ignored. Returns `None` for anything else.
pub fn decode_item(raw: &str) -> Option<KitchenItem> {
    let parts: Vec<&str> = raw.split(ITEM_DELIMITER).collect();
    if parts.len() < 4 {
        return None;
    }
    let category = ItemCategory::from_name(parts[3])?;
    Some(KitchenItem {
        id: parts[0].to_string(),
        name: parts[1].to_string(),
        quantity: parts[2].to_string(),
        category,
    })
}

/// True when the member splits into enough segments to reveal the given
/// item id. Used by replace-by-id and delete-by-id filters; deliberately
/// does not require the category segment to parse, so a record with a
/// mangled category can still be replaced or deleted by id.
pub(crate) fn member_has_item_id(raw: &str, id: &str) -> bool {
    let parts: Vec<&str> = raw.split(ITEM_DELIMITER).collect();
    parts.len() >= 4 && parts[0] == id
}

/// Encode a history entry as one set member.
pub fn encode_entry(entry: &HistoryEntry) -> String {
    [entry.name.as_str(), entry.date.as_str()].join(ENTRY_DELIMITER)
}

/// Decode one stored member as a history entry.
///
/// Requires exactly 2 segments. Returns `None` for anything else.
pub fn decode_entry(raw: &str) -> Option<HistoryEntry> {
    let parts: Vec<&str> = raw.split(ENTRY_DELIMITER).collect();
    if parts.len() != 2 {
        return None;
    }
    Some(HistoryEntry {
        name: parts[0].to_string(),
        date: parts[1].to_string(),
    })
}

/// Result of decoding a whole stored set: the records that decoded, plus
/// how many members were dropped as malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Run a decode pass over every member of a set.
pub fn decode_members<T>(
    members: &BTreeSet<String>,
    decode: fn(&str) -> Option<T>,
) -> Decoded<T> {
    let mut records = Vec::with_capacity(members.len());
    let mut skipped = 0;
    for member in members {
        match decode(member) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    Decoded { records, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, quantity: &str, category: ItemCategory) -> KitchenItem {
        KitchenItem {
            id: id.to_string(),
            name: name.to_string(),
            quantity: quantity.to_string(),
            category,
        }
    }

    #[test]
    fn test_item_round_trip() {
        let original = item("id-1", "Flour", "2", ItemCategory::Ingredients);
        let decoded = decode_item(&encode_item(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_item_encoding_layout() {
        let encoded = encode_item(&item("id-1", "Whisk", "1", ItemCategory::Tools));
        assert_eq!(encoded, "id-1|||Whisk|||1|||TOOLS");
    }

    #[test]
    fn test_item_decode_too_few_segments() {
        assert!(decode_item("id-1|||Flour|||2").is_none());
        assert!(decode_item("").is_none());
        assert!(decode_item("garbage").is_none());
    }

    #[test]
    fn test_item_decode_unknown_category() {
        assert!(decode_item("id-1|||Flour|||2|||PANTRY").is_none());
        assert!(decode_item("id-1|||Flour|||2|||tools").is_none());
    }

    #[test]
    fn test_item_decode_ignores_extra_segments() {
        // A 5-segment member decodes only when segment 3 still names a
        // category; the tail is dropped.
        let decoded = decode_item("id-1|||Flour|||2|||COOKWARE|||tail").unwrap();
        assert_eq!(decoded.category, ItemCategory::Cookware);
        assert_eq!(decoded.quantity, "2");
    }

    #[test]
    fn test_delimiter_in_field_corrupts_record() {
        // The known limitation: no escaping. The shifted segments leave an
        // unknown category name, and the record fails to decode.
        let bad = item("id-1", "Salt|||Pepper", "1", ItemCategory::Ingredients);
        assert!(decode_item(&encode_item(&bad)).is_none());
    }

    #[test]
    fn test_member_has_item_id() {
        let encoded = encode_item(&item("id-1", "Flour", "2", ItemCategory::Ingredients));
        assert!(member_has_item_id(&encoded, "id-1"));
        assert!(!member_has_item_id(&encoded, "id-2"));
        // Category does not have to parse for the id to match
        assert!(member_has_item_id("id-1|||Flour|||2|||PANTRY", "id-1"));
        // Too-short members never match
        assert!(!member_has_item_id("id-1|||Flour", "id-1"));
    }

    #[test]
    fn test_entry_round_trip() {
        let original = HistoryEntry {
            name: "Recipe #42".to_string(),
            date: "2024-01-01 10:00".to_string(),
        };
        let decoded = decode_entry(&encode_entry(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_entry_encoding_layout() {
        let entry = HistoryEntry {
            name: "Recipe #42".to_string(),
            date: "2024-01-01 10:00".to_string(),
        };
        assert_eq!(encode_entry(&entry), "Recipe #42||2024-01-01 10:00");
    }

    #[test]
    fn test_entry_decode_requires_exactly_two_segments() {
        assert!(decode_entry("name only").is_none());
        assert!(decode_entry("a||b||c").is_none());
        assert!(decode_entry("Recipe||2024-01-01 10:00").is_some());
    }

    #[test]
    fn test_category_names() {
        for category in ItemCategory::ALL {
            assert_eq!(ItemCategory::from_name(category.as_str()), Some(category));
        }
        assert_eq!(ItemCategory::from_name("SPICES"), None);
    }

    #[test]
    fn test_new_item_ids_are_unique() {
        let a = KitchenItem::new("Flour", "2", ItemCategory::Ingredients);
        let b = KitchenItem::new("Flour", "2", ItemCategory::Ingredients);
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn test_decode_members_counts_skipped() {
        let members: BTreeSet<String> = [
            encode_item(&item("a", "Flour", "2", ItemCategory::Ingredients)),
            encode_item(&item("b", "Whisk", "1", ItemCategory::Tools)),
            "not a record".to_string(),
        ]
        .into_iter()
        .collect();

        let decoded = decode_members(&members, decode_item);
        assert_eq!(decoded.records.len(), 2);
        assert_eq!(decoded.skipped, 1);
    }
}
