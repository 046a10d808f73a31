//! Message types used by the relay core.
//!
//! These are **transport-agnostic** logical messages:
//! - [`InboundEvent`]: what a producer asked us to forward.
//! - [`OutboundEvent`]: what gets delivered to the recipient.
//!
//! Frame encoding lives in the `relay-protocol` crate; this module only
//! deals with already-parsed JSON values.

use serde::Deserialize;
use serde_json::Value;

use crate::error::RelayError;
use crate::event_kind::{InboundKind, OutboundKind};
use crate::session::SessionId;

/// Kind-specific inbound payload.
///
/// Sub-fields are opaque: the relay forwards them without looking inside.
/// An explicit JSON `null` counts as present.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// Total number of datasets the job will analyze.
    DatasetsCounted { count: Value },

    /// Result record for one analyzed dataset.
    DatasetAnalyzed { dataset: Value },

    /// The job started building its fact sheet.
    CreateFactSheet,

    /// The job started rendering map images.
    CreateMapImages,

    /// The job started producing the report.
    CreateReport,
}

/// A decoded producer event, addressed to one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub recipient: SessionId,
    pub payload: InboundPayload,
}

/// An event ready for delivery to `recipient`.
///
/// `payload == None` means nothing beyond the event name is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEvent {
    pub kind: OutboundKind,
    pub recipient: SessionId,
    pub payload: Option<Value>,
}

#[derive(Deserialize)]
struct DatasetsCountedData {
    recipient: SessionId,
    count: Value,
}

#[derive(Deserialize)]
struct DatasetAnalyzedData {
    recipient: SessionId,
    dataset: Value,
}

#[derive(Deserialize)]
struct RecipientOnlyData {
    recipient: SessionId,
}

impl InboundEvent {
    /// Decode the JSON data of an inbound event of the given kind.
    ///
    /// Requires an object with a non-empty string `recipient` plus the
    /// kind-specific field. Extra fields are ignored.
    pub fn decode(kind: InboundKind, data: Value) -> Result<Self, RelayError> {
        let event = kind.wire_name();

        if !data.is_object() {
            return Err(RelayError::malformed(
                event,
                format!("expected a JSON object, got {}", json_type_name(&data)),
            ));
        }

        let malformed = |e: serde_json::Error| RelayError::malformed(event, e.to_string());

        let (recipient, payload) = match kind {
            InboundKind::DatasetsCounted => {
                let d: DatasetsCountedData = serde_json::from_value(data).map_err(malformed)?;
                (d.recipient, InboundPayload::DatasetsCounted { count: d.count })
            }
            InboundKind::DatasetAnalyzed => {
                let d: DatasetAnalyzedData = serde_json::from_value(data).map_err(malformed)?;
                (d.recipient, InboundPayload::DatasetAnalyzed { dataset: d.dataset })
            }
            InboundKind::CreateFactSheet => {
                let d: RecipientOnlyData = serde_json::from_value(data).map_err(malformed)?;
                (d.recipient, InboundPayload::CreateFactSheet)
            }
            InboundKind::CreateMapImages => {
                let d: RecipientOnlyData = serde_json::from_value(data).map_err(malformed)?;
                (d.recipient, InboundPayload::CreateMapImages)
            }
            InboundKind::CreateReport => {
                let d: RecipientOnlyData = serde_json::from_value(data).map_err(malformed)?;
                (d.recipient, InboundPayload::CreateReport)
            }
        };

        if recipient.is_empty() {
            return Err(RelayError::malformed(event, "`recipient` is empty"));
        }

        Ok(InboundEvent { recipient, payload })
    }

    pub fn kind(&self) -> InboundKind {
        match self.payload {
            InboundPayload::DatasetsCounted { .. } => InboundKind::DatasetsCounted,
            InboundPayload::DatasetAnalyzed { .. } => InboundKind::DatasetAnalyzed,
            InboundPayload::CreateFactSheet => InboundKind::CreateFactSheet,
            InboundPayload::CreateMapImages => InboundKind::CreateMapImages,
            InboundPayload::CreateReport => InboundKind::CreateReport,
        }
    }

    /// Project into the outbound event: same recipient, renamed kind,
    /// payload reduced to the forwarded sub-field (or nothing).
    pub fn project(self) -> OutboundEvent {
        let kind = self.kind().outbound();
        let payload = match self.payload {
            InboundPayload::DatasetsCounted { count } => Some(count),
            InboundPayload::DatasetAnalyzed { dataset } => Some(dataset),
            InboundPayload::CreateFactSheet
            | InboundPayload::CreateMapImages
            | InboundPayload::CreateReport => None,
        };

        OutboundEvent {
            kind,
            recipient: self.recipient,
            payload,
        }
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
