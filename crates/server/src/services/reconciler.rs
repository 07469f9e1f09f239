//! Background reconciler for stale unpaid orders.
//!
//! The order-create and intent-create pair are independent failure
//! domains: a client can abandon checkout after the intent exists, or
//! confirm payment with Stripe and never call back. This task closes the
//! loop by periodically asking the gateway about every `pending_payment`
//! order older than the configured timeout, settling or voiding each one.

use std::time::Duration;

use chrono::Utc;

use crate::services::orders::OrderService;
use crate::state::AppState;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn the reconciler loop. Runs until the process shuts down.
pub fn spawn(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        // A missed tick (slow sweep) should not cause a burst.
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let cutoff = Utc::now()
                - chrono::Duration::seconds(
                    i64::try_from(state.config().void_pending_after_secs).unwrap_or(i64::MAX),
                );

            let service = OrderService::new(state.pool(), state.payments(), state.config().pricing);
            match service.sweep_stale(cutoff).await {
                Ok(outcome) if outcome.settled > 0 || outcome.voided > 0 => {
                    tracing::info!(
                        settled = outcome.settled,
                        voided = outcome.voided,
                        "reconciler sweep complete"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "reconciler sweep failed");
                }
            }
        }
    })
}
