//! Entity kinds and their field allowlists.
//!
//! Every record the assistant can draft belongs to exactly one [`EntityKind`].
//! The kind decides which backend collection the record is written to, which
//! console view it shows up in afterwards, and - most importantly - which
//! fields are allowed to reach persistence at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DROP_FIELDS: &[&str] = &[
    "title",
    "description",
    "status",
    "egg_price",
    "bundle_price",
    "max_supply",
    "artist_id",
    "banner_path",
    "start_at",
    "end_at",
];

const STAMP_FIELDS: &[&str] = &[
    "id",
    "external_id",
    "name",
    "slug",
    "rarity",
    "status",
    "collection",
    "artist_id",
    "art_path",
    "price_eggs",
    "edition_count",
    "is_drop_only",
    "design_config",
];

const BROADCAST_FIELDS: &[&str] = &[
    "name",
    "subject",
    "channels",
    "audience_segment",
    "audience_size",
    "scheduled_at",
    "status",
    "stats",
];

const PROMO_FIELDS: &[&str] = &[
    "name",
    "code",
    "type",
    "status",
    "description",
    "value",
    "start_at",
    "end_at",
    "usage_count",
];

const MEMBER_FIELDS: &[&str] = &[
    "email",
    "full_name",
    "role",
    "tier",
    "egg_balance",
    "status",
    "id",
    "created_at",
    "last_seen",
];

/// The kind of record an AI-authored draft proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A limited-time stamp drop campaign.
    Drop,
    /// A broadcast message to an audience segment.
    Broadcast,
    /// A promo code campaign.
    Promo,
    /// A collectible stamp in the inventory.
    Stamp,
    /// A console member account.
    Member,
}

impl EntityKind {
    /// All kinds, in console navigation order.
    pub const ALL: [EntityKind; 5] = [
        Self::Drop,
        Self::Broadcast,
        Self::Promo,
        Self::Stamp,
        Self::Member,
    ];

    /// The lowercase tag used on the wire and in drafts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Broadcast => "broadcast",
            Self::Promo => "promo",
            Self::Stamp => "stamp",
            Self::Member => "member",
        }
    }

    /// Human-readable singular label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Drop => "Drop",
            Self::Broadcast => "Broadcast",
            Self::Promo => "Promo",
            Self::Stamp => "Stamp",
            Self::Member => "Member",
        }
    }

    /// Field names permitted to flow into persistence for this kind.
    ///
    /// The order is the order fields are presented in review forms.
    #[must_use]
    pub fn allowed_fields(self) -> &'static [&'static str] {
        match self {
            Self::Drop => DROP_FIELDS,
            Self::Broadcast => BROADCAST_FIELDS,
            Self::Promo => PROMO_FIELDS,
            Self::Stamp => STAMP_FIELDS,
            Self::Member => MEMBER_FIELDS,
        }
    }

    /// Whether `field` is on this kind's allowlist.
    #[must_use]
    pub fn allows(self, field: &str) -> bool {
        self.allowed_fields().contains(&field)
    }

    /// Backend collection (table) that records of this kind are created in.
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Drop => "drops",
            Self::Broadcast => "broadcasts",
            Self::Promo => "promos",
            Self::Stamp => "stamps",
            Self::Member => "members",
        }
    }

    /// Console view where a newly created record of this kind lives.
    #[must_use]
    pub fn destination(self) -> Destination {
        match self {
            Self::Drop => Destination::new("Drops", "/drops"),
            Self::Broadcast => Destination::new("Broadcasts", "/broadcasts"),
            Self::Promo => Destination::new("Promos", "/promos"),
            // Approved stamps land in the inventory review queue, not live.
            Self::Stamp => Destination::new("Inventory", "/inventory"),
            Self::Member => Destination::new("Members", "/members"),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known [`EntityKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| UnknownEntityKind(s.to_string()))
    }
}

/// Where in the console a saved record can be found.
///
/// Returned after a successful approval so the operator can be offered a
/// "configure it now" follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Destination {
    /// View name shown to the operator.
    pub label: &'static str,
    /// Console route of the view.
    pub route: &'static str,
}

impl Destination {
    const fn new(label: &'static str, route: &'static str) -> Self {
        Self { label, route }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.route)
    }
}
