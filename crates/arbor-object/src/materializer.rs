//! Entity materialization and paginated listing over index scans.
//!
//! Materialization turns raw store records into typed entities,
//! applying the caller's visibility filter. Per-record failures are
//! swallowed: an unknown type falls back to the generic entity, an
//! invisible record becomes `None`. Neither ever aborts a page.

use std::collections::VecDeque;
use std::sync::Arc;

use uuid::Uuid;

use arbor_core::security::SecurityContext;
use arbor_core::types::{props, relations, Direction, NodeKey, PropertyValue, RawNode};
use arbor_store::{GraphStore, RecordStream};

use crate::entity::Entity;
use crate::error::{ObjectError, Result};
use crate::registry::TypeRegistry;

/// One window of materialized entities.
#[derive(Debug)]
pub struct Page {
    pub items: Vec<Entity>,
    /// Advisory result count. Index scans may overcount, and the
    /// proximity expansion grows this as co-located entities are
    /// discovered; under concurrent mutation a listing may observe
    /// more or fewer items than reported here.
    pub total_estimate: usize,
    /// Whether at least one more visible item exists past this window.
    pub has_more: bool,
}

/// Materializes typed entities from raw graph records.
pub struct EntityMaterializer {
    registry: Arc<TypeRegistry>,
}

impl EntityMaterializer {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Materialize one record into a typed entity.
    ///
    /// The type is taken from `type_override` when given, else from
    /// the record's type attribute; unknown or empty names resolve to
    /// the generic fallback. Returns `None` when the record fails the
    /// visibility check; callers must treat that as "filtered", not
    /// as an error.
    pub fn materialize(
        &self,
        ctx: &dyn SecurityContext,
        record: RawNode,
        type_override: Option<&str>,
        include_deleted_and_hidden: bool,
        public_only: bool,
    ) -> Option<Entity> {
        let type_name = type_override.unwrap_or(&record.type_name).to_string();
        let descriptor = self.registry.resolve_or_generic(&type_name);
        let entity = descriptor.construct(record);

        if ctx.is_visible(entity.record(), include_deleted_and_hidden, public_only) {
            Some(entity)
        } else {
            None
        }
    }

    /// Materialize a page out of an index scan.
    ///
    /// `page` is 1-based; a negative page counts from the end, which
    /// forces an eager enumeration of the whole scan to obtain an
    /// exact count first. Expensive on large scans, by contract.
    /// `page_size` 0 means unlimited. With an `offset_cursor`, the
    /// window starts immediately after the entity with that uuid; a
    /// cursor that never shows up in the filtered scan fails with
    /// [`ObjectError::CursorNotFound`].
    #[allow(clippy::too_many_arguments)]
    pub async fn materialize_page(
        &self,
        ctx: &dyn SecurityContext,
        mut stream: Box<dyn RecordStream>,
        include_deleted_and_hidden: bool,
        public_only: bool,
        page_size: usize,
        page: i64,
        offset_cursor: Option<Uuid>,
    ) -> Result<Page> {
        let mut total = stream.advisory_size();

        if let Some(cursor) = offset_cursor {
            return self
                .page_after_cursor(
                    ctx,
                    stream,
                    include_deleted_and_hidden,
                    public_only,
                    page_size,
                    page,
                    cursor,
                    total,
                )
                .await;
        }

        // Without a cursor, a negative page needs the exact result
        // count before the window can be placed. This breaks lazy
        // loading on purpose.
        let mut prefetched: VecDeque<RawNode> = VecDeque::new();
        let offset = if page < 0 {
            while let Some(record) = stream.next().await? {
                prefetched.push_back(record);
            }
            total = prefetched.len();
            (total as i64 + page * page_size as i64).max(0) as usize
        } else {
            ((page.max(1) - 1) as usize) * page_size
        };

        let mut items = Vec::new();
        let mut position = 0usize;
        let mut has_more = false;

        loop {
            let record = match prefetched.pop_front() {
                Some(record) => Some(record),
                None => stream.next().await?,
            };
            let Some(record) = record else { break };
            let Some(entity) =
                self.materialize(ctx, record, None, include_deleted_and_hidden, public_only)
            else {
                continue;
            };

            position += 1;
            if position <= offset {
                continue;
            }
            // Stop as soon as the window is full; the scan is not
            // exhausted unnecessarily.
            if page_size > 0 && items.len() == page_size {
                has_more = true;
                break;
            }
            items.push(entity);
        }

        Ok(Page {
            items,
            total_estimate: total,
            has_more,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn page_after_cursor(
        &self,
        ctx: &dyn SecurityContext,
        mut stream: Box<dyn RecordStream>,
        include_deleted_and_hidden: bool,
        public_only: bool,
        page_size: usize,
        page: i64,
        cursor: Uuid,
        total: usize,
    ) -> Result<Page> {
        // Linear scan of the filtered, materialized results until the
        // cursor identity is found, buffering everything on the way.
        let mut buffered: Vec<Entity> = Vec::new();
        let mut cursor_index: Option<usize> = None;

        while let Some(record) = stream.next().await? {
            if let Some(entity) =
                self.materialize(ctx, record, None, include_deleted_and_hidden, public_only)
            {
                let is_cursor = entity.uuid() == cursor;
                buffered.push(entity);
                if is_cursor {
                    cursor_index = Some(buffered.len() - 1);
                    break;
                }
            }
        }

        let Some(cursor_index) = cursor_index else {
            return Err(ObjectError::CursorNotFound { cursor });
        };

        // The window starts right past the cursor; end-relative pages
        // shift it back from the cursor position.
        let offset = if page >= 0 {
            cursor_index + 1
        } else {
            (cursor_index as i64 + page * page_size as i64).max(0) as usize
        };

        let mut items = Vec::new();
        let mut position = 0usize;
        let mut has_more = false;

        // Emit from what was buffered while hunting for the cursor.
        for entity in buffered {
            position += 1;
            if position <= offset {
                continue;
            }
            if page_size > 0 && items.len() == page_size {
                return Ok(Page {
                    items,
                    total_estimate: total,
                    has_more: true,
                });
            }
            items.push(entity);
        }

        // The buffer was not enough: resume the underlying scan.
        while let Some(record) = stream.next().await? {
            let Some(entity) =
                self.materialize(ctx, record, None, include_deleted_and_hidden, public_only)
            else {
                continue;
            };
            position += 1;
            if position <= offset {
                continue;
            }
            if page_size > 0 && items.len() == page_size {
                has_more = true;
                break;
            }
            items.push(entity);
        }

        Ok(Page {
            items,
            total_estimate: total,
            has_more,
        })
    }

    /// Materialize a page out of a proximity-index scan.
    ///
    /// Each hit is resolved to its canonical backing record by the
    /// stored node key; a hit whose record is gone is logged and
    /// skipped, never aborting the page. The resolved anchor is then
    /// expanded one hop over incoming located-at edges, and the
    /// expanded entities, not the anchors, are what gets filtered
    /// and paged. The size estimate grows as expansions are
    /// discovered.
    #[allow(clippy::too_many_arguments)]
    pub async fn materialize_located_page(
        &self,
        ctx: &dyn SecurityContext,
        store: &dyn GraphStore,
        mut hits: Box<dyn RecordStream>,
        include_deleted_and_hidden: bool,
        public_only: bool,
        page_size: usize,
        page: i64,
    ) -> Result<Page> {
        let mut total = hits.advisory_size();

        let mut prefetched: VecDeque<RawNode> = VecDeque::new();
        let offset = if page < 0 {
            while let Some(hit) = hits.next().await? {
                prefetched.push_back(hit);
            }
            total = prefetched.len();
            (total as i64 + page * page_size as i64).max(0) as usize
        } else {
            ((page.max(1) - 1) as usize) * page_size
        };

        let mut items = Vec::new();
        let mut position = 0usize;
        let mut has_more = false;

        'hits: loop {
            let hit = match prefetched.pop_front() {
                Some(hit) => Some(hit),
                None => hits.next().await?,
            };
            let Some(hit) = hit else { break };

            let Some(backing_key) = hit.property(props::NODE_KEY).and_then(PropertyValue::as_i64)
            else {
                tracing::error!(uuid = %hit.uuid, "Proximity hit carries no backing node key");
                continue;
            };

            let backing = match store.get(NodeKey(backing_key as u64)).await {
                Ok(record) => record,
                Err(_) => {
                    // Should not happen, but the index can outlive its
                    // records.
                    tracing::error!(
                        node_key = backing_key,
                        "Proximity hit references a missing record"
                    );
                    continue;
                }
            };

            let Some(anchor) =
                self.materialize(ctx, backing, None, include_deleted_and_hidden, public_only)
            else {
                continue;
            };

            let edges = store
                .incident_edges(anchor.key(), relations::LOCATED_AT, Direction::Incoming)
                .await?;
            total += edges.len();

            for edge in edges {
                let Ok(record) = store.get(edge.source).await else {
                    continue;
                };
                let Some(entity) =
                    self.materialize(ctx, record, None, include_deleted_and_hidden, public_only)
                else {
                    continue;
                };
                position += 1;
                if position <= offset {
                    continue;
                }
                if page_size > 0 && items.len() == page_size {
                    has_more = true;
                    break 'hits;
                }
                items.push(entity);
            }
        }

        Ok(Page {
            items,
            total_estimate: total,
            has_more,
        })
    }
}
