//! Event kinds and the static routing table.
//!
//! Producers (analysis workers) emit one of five inbound kinds; each maps
//! to exactly one outbound kind that browser clients listen for:
//!
//! | inbound wire name       | outbound wire name  | payload forwarded |
//! |-------------------------|---------------------|-------------------|
//! | `datasets_counted_api`  | `datasets_counted`  | `count`           |
//! | `dataset_analyzed_api`  | `dataset_analyzed`  | `dataset`         |
//! | `create_fact_sheet_api` | `create_fact_sheet` | nothing           |
//! | `create_map_images_api` | `create_map_images` | nothing           |
//! | `create_report_api`     | `create_report`     | nothing           |
//!
//! Any other inbound name has no kind and is never routed.

use std::fmt;

/// Event kinds accepted from producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundKind {
    DatasetsCounted,
    DatasetAnalyzed,
    CreateFactSheet,
    CreateMapImages,
    CreateReport,
}

/// Event kinds delivered to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundKind {
    DatasetsCounted,
    DatasetAnalyzed,
    CreateFactSheet,
    CreateMapImages,
    CreateReport,
}

impl InboundKind {
    /// Every recognized inbound kind.
    pub const ALL: [InboundKind; 5] = [
        InboundKind::DatasetsCounted,
        InboundKind::DatasetAnalyzed,
        InboundKind::CreateFactSheet,
        InboundKind::CreateMapImages,
        InboundKind::CreateReport,
    ];

    /// Look up a kind by the event name producers put on the wire.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "datasets_counted_api" => Some(InboundKind::DatasetsCounted),
            "dataset_analyzed_api" => Some(InboundKind::DatasetAnalyzed),
            "create_fact_sheet_api" => Some(InboundKind::CreateFactSheet),
            "create_map_images_api" => Some(InboundKind::CreateMapImages),
            "create_report_api" => Some(InboundKind::CreateReport),
            _ => None,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            InboundKind::DatasetsCounted => "datasets_counted_api",
            InboundKind::DatasetAnalyzed => "dataset_analyzed_api",
            InboundKind::CreateFactSheet => "create_fact_sheet_api",
            InboundKind::CreateMapImages => "create_map_images_api",
            InboundKind::CreateReport => "create_report_api",
        }
    }

    /// The outbound kind this inbound kind is forwarded as.
    pub fn outbound(self) -> OutboundKind {
        match self {
            InboundKind::DatasetsCounted => OutboundKind::DatasetsCounted,
            InboundKind::DatasetAnalyzed => OutboundKind::DatasetAnalyzed,
            InboundKind::CreateFactSheet => OutboundKind::CreateFactSheet,
            InboundKind::CreateMapImages => OutboundKind::CreateMapImages,
            InboundKind::CreateReport => OutboundKind::CreateReport,
        }
    }
}

impl OutboundKind {
    pub fn wire_name(self) -> &'static str {
        match self {
            OutboundKind::DatasetsCounted => "datasets_counted",
            OutboundKind::DatasetAnalyzed => "dataset_analyzed",
            OutboundKind::CreateFactSheet => "create_fact_sheet",
            OutboundKind::CreateMapImages => "create_map_images",
            OutboundKind::CreateReport => "create_report",
        }
    }
}

impl fmt::Display for InboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl fmt::Display for OutboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
