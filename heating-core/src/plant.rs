//! Reference installation: four zones sharing one boiler.
//!
//! The catalog fixes each zone's position and tag so that the firmware board
//! wiring, the emulator, and status rendering agree on ordering.

use crate::channel::ChannelId;

/// Number of zones on the reference board.
pub const ZONE_COUNT: usize = 4;

/// One zone of the installation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ZoneLine {
    pub id: ChannelId,
    /// Single-character tag used in masks and logs.
    pub tag: char,
    pub name: &'static str,
}

impl ZoneLine {
    pub const fn new(
        index: u8,
        tag: char,
        name: &'static str,
    ) -> Self {
        Self {
            id: ChannelId::new(index),
            tag,
            name,
        }
    }
}

/// Compile-time catalog of every zone, in controller order.
pub const ALL_ZONES: [ZoneLine; ZONE_COUNT] = [
    ZoneLine::new(0, 'W', "hot-water"),
    ZoneLine::new(1, '1', "zone-1"),
    ZoneLine::new(2, '2', "zone-2"),
    ZoneLine::new(3, '3', "zone-3"),
];

/// Zone whose valve vents overrun heat when no zone was open at the end of demand.
pub const DEFAULT_OVERRUN_ZONE: ChannelId = ChannelId::new(3);

/// Retrieve zone metadata by identifier.
#[must_use]
pub fn zone_by_id(id: ChannelId) -> Option<&'static ZoneLine> {
    ALL_ZONES.get(id.index())
}

/// Tag character for a channel, falling back to `?` for unknown ids.
#[must_use]
pub fn tag_for(id: ChannelId) -> char {
    zone_by_id(id).map_or('?', |zone| zone.tag)
}

/// Parses a zone reference typed by an operator: its tag or its name.
#[must_use]
pub fn zone_by_tag(text: &str) -> Option<&'static ZoneLine> {
    ALL_ZONES.iter().find(|zone| {
        let mut chars = text.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.eq_ignore_ascii_case(&zone.tag))
            || zone.name.eq_ignore_ascii_case(text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_positions_match_ids() {
        for (position, zone) in ALL_ZONES.iter().enumerate() {
            assert_eq!(zone.id.index(), position);
        }
        assert!(zone_by_id(DEFAULT_OVERRUN_ZONE).is_some());
    }

    #[test]
    fn tags_resolve_case_insensitively() {
        assert_eq!(zone_by_tag("w").map(|zone| zone.id), Some(ChannelId::new(0)));
        assert_eq!(zone_by_tag("2").map(|zone| zone.id), Some(ChannelId::new(2)));
        assert_eq!(zone_by_tag("Zone-3").map(|zone| zone.id), Some(ChannelId::new(3)));
        assert_eq!(zone_by_tag("4"), None);
        assert_eq!(tag_for(ChannelId::new(9)), '?');
    }
}
