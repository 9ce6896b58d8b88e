//! Security context and visibility evaluation.
//!
//! Permission evaluation proper is an external capability; the object
//! layer only consumes this narrow contract: given a record and the
//! listing flags, is the record visible to the caller? Materialization
//! treats a negative answer as "filtered", never as an error.

use uuid::Uuid;

use crate::types::RawNode;

/// The caller's security context, consulted for every materialized
/// record.
pub trait SecurityContext: Send + Sync {
    /// Whether this context bypasses all visibility filtering.
    fn is_superuser(&self) -> bool {
        false
    }

    /// Visibility predicate for one record.
    ///
    /// `include_deleted_and_hidden` admits records flagged deleted or
    /// hidden; `public_only` restricts the result to records flagged
    /// visible to public users.
    fn is_visible(&self, record: &RawNode, include_deleted_and_hidden: bool, public_only: bool)
        -> bool;
}

/// Internal context used by maintenance operations; sees everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemContext;

impl SecurityContext for SystemContext {
    fn is_superuser(&self) -> bool {
        true
    }

    fn is_visible(&self, _record: &RawNode, _include_deleted_and_hidden: bool, _public_only: bool)
        -> bool {
        true
    }
}

/// An authenticated principal. Sees records that are not deleted or
/// hidden (unless asked to include them), honoring the public-only
/// restriction.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
}

impl Principal {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }
}

impl SecurityContext for Principal {
    fn is_visible(&self, record: &RawNode, include_deleted_and_hidden: bool, public_only: bool)
        -> bool {
        if public_only && !record.flags.visible_to_public {
            return false;
        }
        if !include_deleted_and_hidden && (record.flags.deleted || record.flags.hidden) {
            return false;
        }
        true
    }
}

/// An unauthenticated caller: only records visible to public users.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl SecurityContext for Anonymous {
    fn is_visible(&self, record: &RawNode, include_deleted_and_hidden: bool, _public_only: bool)
        -> bool {
        if !record.flags.visible_to_public {
            return false;
        }
        if !include_deleted_and_hidden && (record.flags.deleted || record.flags.hidden) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeKey, PropertyMap, RecordFlags};
    use chrono::Utc;

    fn record(flags: RecordFlags) -> RawNode {
        RawNode {
            key: NodeKey(1),
            uuid: Uuid::new_v4(),
            type_name: "Document".to_string(),
            flags,
            props: PropertyMap::new(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn principal_filters_hidden_and_deleted() {
        let ctx = Principal::new("alice");
        let visible = record(RecordFlags::default());
        let hidden = record(RecordFlags {
            hidden: true,
            ..Default::default()
        });
        let deleted = record(RecordFlags {
            deleted: true,
            ..Default::default()
        });

        assert!(ctx.is_visible(&visible, false, false));
        assert!(!ctx.is_visible(&hidden, false, false));
        assert!(!ctx.is_visible(&deleted, false, false));
        // Explicitly included.
        assert!(ctx.is_visible(&hidden, true, false));
        assert!(ctx.is_visible(&deleted, true, false));
    }

    #[test]
    fn public_only_requires_public_flag() {
        let ctx = Principal::new("alice");
        let private = record(RecordFlags::default());
        let public = record(RecordFlags {
            visible_to_public: true,
            ..Default::default()
        });

        assert!(!ctx.is_visible(&private, false, true));
        assert!(ctx.is_visible(&public, false, true));
    }

    #[test]
    fn anonymous_sees_only_public() {
        let ctx = Anonymous;
        let private = record(RecordFlags::default());
        let public = record(RecordFlags {
            visible_to_public: true,
            ..Default::default()
        });

        assert!(!ctx.is_visible(&private, false, false));
        assert!(ctx.is_visible(&public, false, false));
    }

    #[test]
    fn system_context_sees_everything() {
        let ctx = SystemContext;
        let deleted = record(RecordFlags {
            deleted: true,
            hidden: true,
            ..Default::default()
        });
        assert!(ctx.is_superuser());
        assert!(ctx.is_visible(&deleted, false, true));
    }
}
