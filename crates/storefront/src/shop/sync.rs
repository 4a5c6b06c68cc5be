//! Per-product serialization of remote wishlist writes.
//!
//! Every product id gets its own lane: an unbounded FIFO queue drained by a
//! single worker task. Calls for the same product therefore reach the service
//! in the order the user made them, so the last remote write always matches
//! the last local intent. Calls for different products run concurrently.
//! Lanes are closed once everything queued has been reported, so only
//! products toggled since the last drain hold a worker.

use std::collections::HashMap;
use std::sync::Arc;

use lumina_core::{ProductId, UserId};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::gateway::{GatewayError, RemoteGateway, WishlistAction};

/// A remote wishlist write waiting in a lane.
#[derive(Debug)]
struct SyncJob {
    user_id: UserId,
    product_id: ProductId,
    action: WishlistAction,
}

/// The result of one remote wishlist write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub action: WishlistAction,
    pub result: Result<(), GatewayError>,
}

impl SyncOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Owner of the per-product lanes.
///
/// Must be used from within a Tokio runtime: lanes are spawned lazily on the
/// first write for a product. Dropping the sync lets queued writes finish in
/// the background without reporting.
pub struct WishlistSync<G> {
    gateway: Arc<G>,
    lanes: HashMap<ProductId, mpsc::UnboundedSender<SyncJob>>,
    outcome_tx: mpsc::UnboundedSender<SyncOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<SyncOutcome>,
    in_flight: usize,
    /// Outcomes collected by [`drain`](Self::drain) and not yet handed out.
    settled: Vec<SyncOutcome>,
}

impl<G: RemoteGateway> WishlistSync<G> {
    #[must_use]
    pub fn new(gateway: Arc<G>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            lanes: HashMap::new(),
            outcome_tx,
            outcome_rx,
            in_flight: 0,
            settled: Vec::new(),
        }
    }

    #[must_use]
    pub const fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Writes enqueued but not yet completed.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.in_flight
    }

    #[cfg(test)]
    fn lanes(&self) -> usize {
        self.lanes.len()
    }

    /// Queue a remote write behind any earlier writes for the same product.
    pub fn enqueue(&mut self, user_id: UserId, product_id: ProductId, action: WishlistAction) {
        let job = SyncJob {
            user_id,
            product_id,
            action,
        };

        let job = match self.lanes.get(&job.product_id) {
            Some(lane) => match lane.send(job) {
                Ok(()) => {
                    self.in_flight += 1;
                    return;
                }
                // Worker gone; fall through and open a fresh lane
                Err(mpsc::error::SendError(job)) => job,
            },
            None => job,
        };

        let product_id = job.product_id.clone();
        let lane = self.spawn_lane();
        if lane.send(job).is_ok() {
            self.in_flight += 1;
        }
        self.lanes.insert(product_id, lane);
    }

    fn spawn_lane(&self) -> mpsc::UnboundedSender<SyncJob> {
        let (tx, mut rx) = mpsc::unbounded_channel::<SyncJob>();
        let gateway = Arc::clone(&self.gateway);
        let outcomes = self.outcome_tx.clone();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let result = gateway
                    .toggle_wishlist(&job.user_id, &job.product_id, job.action)
                    .await
                    .into_status()
                    .map(|_| ());

                match &result {
                    Ok(()) => debug!(
                        product_id = %job.product_id,
                        action = ?job.action,
                        "Wishlist write confirmed"
                    ),
                    Err(e) => warn!(
                        product_id = %job.product_id,
                        action = ?job.action,
                        error = %e,
                        "Wishlist write failed; local state kept"
                    ),
                }

                let outcome = SyncOutcome {
                    user_id: job.user_id,
                    product_id: job.product_id,
                    action: job.action,
                    result,
                };
                if outcomes.send(outcome).is_err() {
                    break;
                }
            }
        });

        tx
    }

    /// Wait for every enqueued write to complete, keeping the outcomes for
    /// the next [`flush`](Self::flush). Idle lanes are closed afterwards.
    pub async fn drain(&mut self) {
        while self.in_flight > 0 {
            let Some(outcome) = self.outcome_rx.recv().await else {
                break;
            };
            self.in_flight -= 1;
            self.settled.push(outcome);
        }
        // Nothing is queued, so closing a lane cannot reorder writes
        self.lanes.clear();
    }

    /// Wait for every enqueued write to complete and return all outcomes not
    /// yet handed out, in completion order.
    pub async fn flush(&mut self) -> Vec<SyncOutcome> {
        self.drain().await;
        std::mem::take(&mut self.settled)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::FakeGateway;

    #[tokio::test]
    async fn test_same_product_writes_arrive_in_order() {
        // Adds are slower than removes, so an unserialized client would
        // deliver the remove first
        let gateway = Arc::new(
            FakeGateway::default().with_toggle_delay(WishlistAction::Add, Duration::from_millis(30)),
        );
        let mut sync = WishlistSync::new(Arc::clone(&gateway));
        let user = UserId::new("1");
        let product = ProductId::new("9");

        sync.enqueue(user.clone(), product.clone(), WishlistAction::Add);
        sync.enqueue(user.clone(), product.clone(), WishlistAction::Remove);
        sync.enqueue(user.clone(), product.clone(), WishlistAction::Add);
        assert_eq!(sync.pending(), 3);

        let outcomes = sync.flush().await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(sync.pending(), 0);

        let actions: Vec<_> = gateway.toggles().into_iter().map(|t| t.2).collect();
        assert_eq!(
            actions,
            vec![
                WishlistAction::Add,
                WishlistAction::Remove,
                WishlistAction::Add
            ]
        );
        assert!(gateway.remote_wishlist_ids(&user).contains(&product));
    }

    #[tokio::test]
    async fn test_failures_are_reported_not_retried() {
        let gateway = Arc::new(FakeGateway::default().failing_toggles());
        let mut sync = WishlistSync::new(Arc::clone(&gateway));

        sync.enqueue(UserId::new("1"), ProductId::new("2"), WishlistAction::Add);
        let outcomes = sync.flush().await;

        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].is_success());
        assert_eq!(gateway.toggles().len(), 1);
    }

    #[tokio::test]
    async fn test_drain_keeps_outcomes_and_closes_lanes() {
        let gateway = Arc::new(FakeGateway::default());
        let mut sync = WishlistSync::new(Arc::clone(&gateway));
        let user = UserId::new("1");

        sync.enqueue(user.clone(), ProductId::new("2"), WishlistAction::Add);
        sync.enqueue(user.clone(), ProductId::new("3"), WishlistAction::Add);
        assert_eq!(sync.lanes(), 2);

        sync.drain().await;
        assert_eq!(sync.pending(), 0);
        assert_eq!(sync.lanes(), 0);

        sync.enqueue(user, ProductId::new("2"), WishlistAction::Remove);
        assert_eq!(sync.lanes(), 1);

        let outcomes = sync.flush().await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(SyncOutcome::is_success));
        assert_eq!(sync.lanes(), 0);
        assert_eq!(gateway.remote_wishlist_ids(&UserId::new("1")), vec![ProductId::new("3")]);
    }
}
