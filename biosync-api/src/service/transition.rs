//! Status/disposal transition rules
//!
//! The two cross-field rules live here and only here, shared by the nested
//! upsert path and the point-update path:
//! - writing a non-empty, non-"Disposed" status clears the disposal block
//! - writing any disposal field forces status to "Disposed"
//!
//! The last status-type operation wins; the pair is not re-validated as a
//! standing invariant.

use crate::payload::{DisposalStatusPayload, StatusPayload};
use biosync_common::db::models::{StatusBlock, STATUS_DISPOSED};

/// Replace the whole status sub-block from a nested-upsert payload.
///
/// Fields absent from the payload are reset, matching the full-replace
/// semantics of the nested path.
pub fn replace_status_block(block: &mut StatusBlock, payload: &StatusPayload) {
    block.status = payload.status.clone().unwrap_or_default();
    block.freeze_thaw_count = payload.freeze_thaw_count;
    block.location = payload.location.clone();
    block.quantity = payload.quantity;
    block.quantity_units = payload.quantity_units.clone();
    block.processing_complete_date = payload.processing_complete_date.clone();
    block.deviations = payload.deviations.clone();
    status_written(block);
}

/// Replace the whole disposal sub-block from a nested-upsert payload
pub fn replace_disposal_block(block: &mut StatusBlock, payload: &DisposalStatusPayload) {
    block.disposal_reason = payload.reason.clone().unwrap_or_default();
    block.disposal_date = payload
        .disposal_date
        .clone()
        .filter(|d| !d.trim().is_empty());
    disposal_written(block);
}

/// Partial status update: only supplied fields change.
///
/// An omitted or empty status string leaves the disposal block untouched.
pub fn apply_status_update(block: &mut StatusBlock, payload: &StatusPayload) {
    if let Some(status) = &payload.status {
        block.status = status.clone();
    }
    if let Some(count) = payload.freeze_thaw_count {
        block.freeze_thaw_count = Some(count);
    }
    if let Some(location) = &payload.location {
        block.location = Some(location.clone());
    }
    if let Some(quantity) = payload.quantity {
        block.quantity = Some(quantity);
    }
    if let Some(units) = &payload.quantity_units {
        block.quantity_units = Some(units.clone());
    }
    if let Some(date) = &payload.processing_complete_date {
        block.processing_complete_date = Some(date.clone());
    }
    if let Some(deviations) = &payload.deviations {
        block.deviations = Some(deviations.clone());
    }

    if payload.status.as_deref().is_some_and(|s| !s.is_empty()) {
        status_written(block);
    }
}

/// Partial disposal update: only supplied fields change
pub fn apply_disposal_update(block: &mut StatusBlock, payload: &DisposalStatusPayload) {
    if let Some(reason) = &payload.reason {
        block.disposal_reason = reason.clone();
    }
    if let Some(date) = &payload.disposal_date {
        block.disposal_date = if date.trim().is_empty() {
            None
        } else {
            Some(date.clone())
        };
    }
    disposal_written(block);
}

/// A status write with a non-empty, non-"Disposed" value clears disposal.
/// Writing exactly "Disposed" leaves existing disposal fields alone.
fn status_written(block: &mut StatusBlock) {
    if !block.status.is_empty() && block.status != STATUS_DISPOSED {
        block.disposal_reason.clear();
        block.disposal_date = None;
    }
}

/// Any non-empty disposal field after a disposal write forces "Disposed"
fn disposal_written(block: &mut StatusBlock) {
    if !block.disposal_reason.is_empty() || block.disposal_date.is_some() {
        block.status = STATUS_DISPOSED.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disposed_block() -> StatusBlock {
        StatusBlock {
            status: STATUS_DISPOSED.to_string(),
            disposal_reason: "mistake".to_string(),
            disposal_date: Some("2020-04-02".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_disposal_write_forces_disposed_status() {
        let mut block = StatusBlock {
            status: "In Circulation".to_string(),
            ..Default::default()
        };
        apply_disposal_update(
            &mut block,
            &DisposalStatusPayload {
                reason: Some("Consumed".to_string()),
                disposal_date: None,
            },
        );
        assert_eq!(block.status, STATUS_DISPOSED);
        assert_eq!(block.disposal_reason, "Consumed");
    }

    #[test]
    fn test_non_disposed_status_clears_disposal() {
        let mut block = disposed_block();
        apply_status_update(
            &mut block,
            &StatusPayload {
                status: Some("In Circulation".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(block.status, "In Circulation");
        assert_eq!(block.disposal_reason, "");
        assert_eq!(block.disposal_date, None);
    }

    #[test]
    fn test_disposed_status_leaves_disposal_untouched() {
        let mut block = disposed_block();
        apply_status_update(
            &mut block,
            &StatusPayload {
                status: Some(STATUS_DISPOSED.to_string()),
                ..Default::default()
            },
        );
        assert_eq!(block.disposal_reason, "mistake");
        assert_eq!(block.disposal_date.as_deref(), Some("2020-04-02"));
    }

    #[test]
    fn test_omitted_status_leaves_disposal_untouched() {
        let mut block = disposed_block();
        apply_status_update(
            &mut block,
            &StatusPayload {
                location: Some("Freezer 4".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(block.status, STATUS_DISPOSED);
        assert_eq!(block.disposal_reason, "mistake");
        assert_eq!(block.location.as_deref(), Some("Freezer 4"));
    }

    #[test]
    fn test_partial_update_only_touches_supplied_fields() {
        let mut block = StatusBlock {
            status: "In Circulation".to_string(),
            freeze_thaw_count: Some(2),
            location: Some("Freezer 1".to_string()),
            ..Default::default()
        };
        apply_status_update(
            &mut block,
            &StatusPayload {
                freeze_thaw_count: Some(3),
                ..Default::default()
            },
        );
        assert_eq!(block.freeze_thaw_count, Some(3));
        assert_eq!(block.status, "In Circulation");
        assert_eq!(block.location.as_deref(), Some("Freezer 1"));
    }

    #[test]
    fn test_replace_status_block_resets_omitted_fields() {
        let mut block = StatusBlock {
            status: "In Circulation".to_string(),
            freeze_thaw_count: Some(2),
            location: Some("Freezer 1".to_string()),
            ..Default::default()
        };
        replace_status_block(
            &mut block,
            &StatusPayload {
                status: Some("In Circulation".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(block.freeze_thaw_count, None);
        assert_eq!(block.location, None);
    }

    #[test]
    fn test_replace_status_block_clears_disposal() {
        let mut block = disposed_block();
        replace_status_block(
            &mut block,
            &StatusPayload {
                status: Some("In Circulation".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(block.status, "In Circulation");
        assert_eq!(block.disposal_reason, "");
        assert_eq!(block.disposal_date, None);
    }
}
