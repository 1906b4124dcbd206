//! Event classification

use common::{NormalizedPayload, SourceSettings};

/// Whether an event warrants downstream action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Forward, enriching first when `enrich` is set
    Proceed { enrich: bool },
    /// Acknowledge receipt, do nothing else
    SkipWithAck { subtype: String },
}

/// Classify a payload against its source's allow-list.
///
/// Complete order results go through the enricher; incomplete ones go
/// straight to forwarding.
pub fn classify(payload: &NormalizedPayload, settings: &SourceSettings) -> Classification {
    let subtype = payload.subtype();

    if let Some(allowed) = &settings.allowed_subtypes {
        if !allowed.iter().any(|a| a.eq_ignore_ascii_case(subtype)) {
            return Classification::SkipWithAck {
                subtype: subtype.to_string(),
            };
        }
    }

    let enrich = matches!(payload, NormalizedPayload::OrderResult(result) if result.is_complete());
    Classification::Proceed { enrich }
}
