use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::geo::GeoPoint;
use crate::domain::order::OrderStatus;
use super::value_objects::TrackingUpdate;

// ============================================================================
// Tracking Feed Reducer
// ============================================================================
//
// Folds batches of tracking updates for one order into:
// - the display list (timestamp descending, newest append first on ties)
// - current status (most recent update)
// - route (located updates, oldest first) and map center (newest located)
// - delivery estimate (newest of feed-provided and agent-derived)
//
// Pure state, no I/O. Batches may overlap; known ids are skipped.
//
// ============================================================================

#[derive(Debug, Clone)]
struct FeedEntry {
    seq: u64,
    update: TrackingUpdate,
}

/// Estimate computed locally from the courier's position
#[derive(Debug, Clone, Copy, PartialEq)]
struct RefinedEstimate {
    computed_at: DateTime<Utc>,
    estimated_delivery: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TrackingFeed {
    order_id: Uuid,
    entries: Vec<FeedEntry>,
    known: HashSet<Uuid>,
    next_seq: u64,
    refined: Option<RefinedEstimate>,
}

impl TrackingFeed {
    pub fn new(order_id: Uuid) -> Self {
        Self {
            order_id,
            entries: Vec::new(),
            known: HashSet::new(),
            next_seq: 0,
            refined: None,
        }
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    /// Merge a batch delivered newest first; returns how many updates were new
    pub fn merge<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = TrackingUpdate>,
    {
        let batch: Vec<TrackingUpdate> = batch.into_iter().collect();
        let mut added = 0;

        // oldest first, so the batch head gets the highest seq
        for update in batch.into_iter().rev() {
            if update.order_id != self.order_id {
                tracing::warn!(
                    order_id = %self.order_id,
                    foreign_order_id = %update.order_id,
                    update_id = %update.id,
                    "Ignoring tracking update for another order"
                );
                continue;
            }

            // append-only: a known id is never edited
            if !self.known.insert(update.id) {
                continue;
            }

            self.entries.push(FeedEntry { seq: self.next_seq, update });
            self.next_seq += 1;
            added += 1;
        }

        if added > 0 {
            self.entries.sort_by(|a, b| {
                b.update
                    .timestamp
                    .cmp(&a.update.timestamp)
                    .then_with(|| b.seq.cmp(&a.seq))
            });
            tracing::debug!(order_id = %self.order_id, added, total = self.entries.len(), "Tracking feed merged");
        }

        added
    }

    /// Display order: newest first
    pub fn updates(&self) -> impl Iterator<Item = &TrackingUpdate> + '_ {
        self.entries.iter().map(|entry| &entry.update)
    }

    pub fn latest(&self) -> Option<&TrackingUpdate> {
        self.updates().next()
    }

    pub fn current_status(&self) -> Option<OrderStatus> {
        self.latest().map(|update| update.status)
    }

    /// Every located point, oldest first
    pub fn route(&self) -> Vec<GeoPoint> {
        self.entries
            .iter()
            .rev()
            .filter_map(|entry| entry.update.location.as_ref().map(|l| l.point()))
            .collect()
    }

    pub fn map_center(&self) -> Option<GeoPoint> {
        self.updates()
            .find_map(|update| update.location.as_ref().map(|l| l.point()))
    }

    /// Record an estimate derived from the courier's live position
    pub fn refine_estimate(&mut self, estimated_delivery: DateTime<Utc>, computed_at: DateTime<Utc>) {
        self.refined = Some(RefinedEstimate { computed_at, estimated_delivery });
    }

    /// The fresher of the newest feed-provided estimate and the refined one
    pub fn estimated_delivery(&self) -> Option<DateTime<Utc>> {
        let from_feed = self
            .updates()
            .find_map(|update| update.estimated_delivery.map(|at| (update.timestamp, at)));

        match (from_feed, self.refined) {
            (Some((as_of, at)), Some(refined)) => {
                if refined.computed_at >= as_of {
                    Some(refined.estimated_delivery)
                } else {
                    Some(at)
                }
            }
            (Some((_, at)), None) => Some(at),
            (None, Some(refined)) => Some(refined.estimated_delivery),
            (None, None) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
