//! Domain types for the NFT event mint service.
//!
//! Contains the identifier newtypes, the three top-level entities (`Event`,
//! `NftTemplate`, `MintRecord`), the embedded `Participant` record, and the
//! constrained metadata value union used for free-form criteria/metadata
//! blobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an NFT template
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(Uuid);

impl TemplateId {
    /// Creates a new random `TemplateId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TemplateId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a participant within an event roster
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Creates a new random `ParticipantId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ParticipantId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a mint record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new random `RecordId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RecordId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a user.
///
/// Users are managed by an external identity system; this service only
/// references them by id (event creators, roster entries, mint records).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// A constrained metadata value.
///
/// Free-form criteria/metadata blobs are represented as a mapping of string
/// to this union instead of arbitrary JSON: strings, numbers, booleans, and
/// nested mappings are accepted; arrays and nulls are rejected at the
/// boundary by deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Text value
    String(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Nested mapping
    Map(BTreeMap<String, MetadataValue>),
}

/// Opaque key/value metadata validated at the boundary.
pub type Metadata = BTreeMap<String, MetadataValue>;

// ============================================================================
// Participants
// ============================================================================

/// Per-participant mint status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    /// Not yet minted
    #[default]
    Pending,
    /// Successfully minted; `minted_at` is set
    Minted,
    /// A mint attempt failed
    Failed,
}

impl ParticipantStatus {
    /// Lowercase wire/storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Minted => "minted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A roster entry embedded in an [`Event`].
///
/// Participants have no identity or lifecycle outside their parent event.
/// At least one of `solana_address` / `email` is required at creation,
/// enforced by the add-participant handler.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Identity within the event roster
    pub id: ParticipantId,
    /// Optional reference to a known user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    /// Solana address the NFT is minted to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solana_address: Option<String>,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Mint status, mutated only by the mint workflow
    #[serde(default)]
    pub status: ParticipantStatus,
    /// Set only on the transition to `minted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minted_at: Option<DateTime<Utc>>,
}

impl Participant {
    /// Creates a new pending participant.
    #[must_use]
    pub fn new(user: Option<UserId>, solana_address: Option<String>, email: Option<String>) -> Self {
        Self {
            id: ParticipantId::new(),
            user,
            solana_address,
            email,
            status: ParticipantStatus::Pending,
            minted_at: None,
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Scheduling phase of an event relative to the current time.
///
/// Derived from the optional start/end dates when listing events; events
/// without the relevant date never match a phase filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPhase {
    /// `start_date` is in the future
    Upcoming,
    /// Between `start_date` and `end_date`
    Ongoing,
    /// `end_date` has passed
    Ended,
}

impl EventPhase {
    /// Lowercase wire name, as used in list query parameters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Ended => "ended",
        }
    }
}

/// An NFT drop event with its embedded participant roster.
///
/// The event exclusively owns its participants; the roster is loaded and
/// persisted as part of the event document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event id
    pub id: EventId,
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The NFT template minted for this event
    pub nft_template: TemplateId,
    /// Free-form eligibility criteria
    #[serde(default)]
    pub criteria: Metadata,
    /// Optional start timestamp; must precede `end_date` when both are set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// Optional end timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Creator reference, used by the creator-or-admin capability check
    pub created_by: UserId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Ordered participant roster
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Event {
    /// Creates a new event with an empty roster.
    #[must_use]
    pub fn new(
        name: String,
        description: Option<String>,
        nft_template: TemplateId,
        criteria: Metadata,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        created_by: UserId,
    ) -> Self {
        Self {
            id: EventId::new(),
            name,
            description,
            nft_template,
            criteria,
            start_date,
            end_date,
            created_by,
            created_at: Utc::now(),
            participants: Vec::new(),
        }
    }

    /// Looks up a participant in the roster.
    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Looks up a participant in the roster for mutation.
    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Scheduling phase at `now`, if the relevant dates are set.
    #[must_use]
    pub fn phase(&self, now: DateTime<Utc>) -> Option<EventPhase> {
        match (self.start_date, self.end_date) {
            (Some(start), _) if start > now => Some(EventPhase::Upcoming),
            (Some(start), Some(end)) if start <= now && end >= now => Some(EventPhase::Ongoing),
            (_, Some(end)) if end < now => Some(EventPhase::Ended),
            _ => None,
        }
    }
}

// ============================================================================
// NFT templates
// ============================================================================

/// A reusable NFT template referenced by events.
///
/// Deleting a template is not guarded against dangling event references;
/// resolving those is left to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTemplate {
    /// Template id
    pub id: TemplateId,
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image reference, joined with the public base URL for mint metadata
    pub image_url: String,
    /// Free-form NFT metadata
    #[serde(default)]
    pub metadata: Metadata,
    /// Creator reference
    pub creator: UserId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl NftTemplate {
    /// Creates a new template.
    #[must_use]
    pub fn new(
        name: String,
        description: Option<String>,
        image_url: String,
        metadata: Metadata,
        creator: UserId,
    ) -> Self {
        Self {
            id: TemplateId::new(),
            name,
            description,
            image_url,
            metadata,
            creator,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Mint records
// ============================================================================

/// Outcome status of a mint attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintStatus {
    /// Attempt submitted but not resolved
    Pending,
    /// Transaction confirmed
    Success,
    /// Transaction failed
    Failed,
}

impl MintStatus {
    /// Lowercase wire/storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for MintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown mint status: {other}")),
        }
    }
}

/// One entry in the append-only mint ledger.
///
/// Created once per mint attempt that reaches the gateway call; never
/// updated or deleted by this service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRecord {
    /// Record id
    pub id: RecordId,
    /// The user the NFT was minted for, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    /// The event the mint belongs to
    pub event: EventId,
    /// Attempt outcome
    pub status: MintStatus,
    /// Transaction hash returned by the gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MintRecord {
    /// Creates a new ledger entry.
    #[must_use]
    pub fn new(user: Option<UserId>, event: EventId, status: MintStatus, tx_hash: Option<String>) -> Self {
        Self {
            id: RecordId::new(),
            user,
            event,
            status,
            tx_hash,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Pagination envelope returned by list endpoints.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Pagination {
    /// 1-indexed page number
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Total matching items
    pub total: u64,
    /// Total page count
    pub pages: u64,
}

impl Pagination {
    /// Computes the page count from the total and page size.
    #[must_use]
    pub const fn new(page: u32, limit: u32, total: u64) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit as u64) };
        Self { page, limit, total, pages }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn metadata_accepts_scalars_and_nested_maps() {
        let raw = r#"{"tier": "gold", "max": 10, "open": true, "extra": {"note": "vip"}}"#;
        let parsed: Metadata = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed["tier"], MetadataValue::String("gold".to_string()));
        assert_eq!(parsed["max"], MetadataValue::Number(10.0));
        assert_eq!(parsed["open"], MetadataValue::Bool(true));
        assert!(matches!(parsed["extra"], MetadataValue::Map(_)));
    }

    #[test]
    fn metadata_rejects_arrays_and_nulls() {
        assert!(serde_json::from_str::<Metadata>(r#"{"tags": ["a", "b"]}"#).is_err());
        assert!(serde_json::from_str::<Metadata>(r#"{"note": null}"#).is_err());
    }

    #[test]
    fn participant_defaults_to_pending() {
        let p = Participant::new(None, Some("addr".to_string()), None);
        assert_eq!(p.status, ParticipantStatus::Pending);
        assert!(p.minted_at.is_none());
    }

    #[test]
    fn event_phase_transitions() {
        let now = Utc::now();
        let mut event = Event::new(
            "Launch".to_string(),
            None,
            TemplateId::new(),
            Metadata::new(),
            Some(now + chrono::Duration::hours(1)),
            Some(now + chrono::Duration::hours(2)),
            UserId::new(),
        );
        assert_eq!(event.phase(now), Some(EventPhase::Upcoming));

        event.start_date = Some(now - chrono::Duration::hours(1));
        assert_eq!(event.phase(now), Some(EventPhase::Ongoing));

        event.end_date = Some(now - chrono::Duration::minutes(1));
        assert_eq!(event.phase(now), Some(EventPhase::Ended));

        event.start_date = None;
        event.end_date = None;
        assert_eq!(event.phase(now), None);
    }

    #[test]
    fn mint_status_round_trips_through_str() {
        for status in [MintStatus::Pending, MintStatus::Success, MintStatus::Failed] {
            assert_eq!(status.as_str().parse::<MintStatus>(), Ok(status));
        }
        assert!("minted".parse::<MintStatus>().is_err());
    }

    #[test]
    fn pagination_rounds_up_page_count() {
        assert_eq!(Pagination::new(1, 10, 25).pages, 3);
        assert_eq!(Pagination::new(1, 10, 30).pages, 3);
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
    }
}
