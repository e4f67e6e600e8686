// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::constants::{GATEWAY_DISPATCH_MAX_ATTEMPTS, GATEWAY_DISPATCH_MAX_BACKOFF_SECS};
    use crate::credential_controller::{collect_batch, GatewayKey, PendingDeliveries};
    use crate::router::{GatewayRequestQueue, RequestQueue};
    use kube::runtime::reflector::ObjectRef;
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn request(name: &str, namespace: &str) -> ObjectRef<crate::gateway::Gateway> {
        ObjectRef::new(name).within(namespace)
    }

    fn key(name: &str, namespace: &str) -> GatewayKey {
        GatewayKey {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_batch_deduplicates_requests() {
        let (queue, mut receiver) = GatewayRequestQueue::new();
        queue.add(request("gw1", "ns1"));
        queue.add(request("gw2", "ns1"));
        queue.add(request("gw1", "ns1"));
        queue.add(request("gw1", "ns2"));

        let batch = collect_batch(&mut receiver, Duration::from_millis(10), BTreeSet::new())
            .await
            .unwrap();

        assert_eq!(batch.len(), 3);
        assert!(batch.contains(&key("gw1", "ns1")));
        assert!(batch.contains(&key("gw2", "ns1")));
        assert!(batch.contains(&key("gw1", "ns2")));
    }

    #[tokio::test]
    async fn test_batch_ends_when_queue_closes() {
        let (queue, mut receiver) = GatewayRequestQueue::new();
        queue.add(request("gw1", "ns1"));
        drop(queue);

        let batch = collect_batch(&mut receiver, Duration::from_secs(3600), BTreeSet::new())
            .await
            .unwrap();
        assert_eq!(batch.len(), 1);

        assert!(collect_batch(&mut receiver, Duration::from_millis(10), BTreeSet::new())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_requests_after_window_form_next_batch() {
        let (queue, mut receiver) = GatewayRequestQueue::new();
        queue.add(request("gw1", "ns1"));

        let first = collect_batch(&mut receiver, Duration::from_millis(5), BTreeSet::new())
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        queue.add(request("gw1", "ns1"));
        let second = collect_batch(&mut receiver, Duration::from_millis(5), BTreeSet::new())
            .await
            .unwrap();
        assert!(second.contains(&key("gw1", "ns1")));
    }

    #[tokio::test]
    async fn test_failed_delivery_joins_next_batch() {
        let (queue, mut receiver) = GatewayRequestQueue::new();
        queue.add(request("gw1", "ns1"));
        let first = collect_batch(&mut receiver, Duration::from_millis(5), BTreeSet::new())
            .await
            .unwrap();

        let mut pending = PendingDeliveries::default();
        for key in &first {
            assert!(pending.record_failure(key));
        }

        queue.add(request("gw2", "ns1"));
        let second = collect_batch(&mut receiver, Duration::from_millis(5), pending.keys())
            .await
            .unwrap();
        assert_eq!(second.len(), 2);
        assert!(second.contains(&key("gw1", "ns1")));
        assert!(second.contains(&key("gw2", "ns1")));
    }

    #[tokio::test]
    async fn test_retained_keys_do_not_wait_for_new_requests() {
        let (_queue, mut receiver) = GatewayRequestQueue::new();
        let retained = BTreeSet::from([key("gw1", "ns1")]);

        let batch = collect_batch(&mut receiver, Duration::from_millis(5), retained.clone())
            .await
            .unwrap();
        assert_eq!(batch, retained);
    }

    #[tokio::test]
    async fn test_retained_keys_survive_closed_queue() {
        let (queue, mut receiver) = GatewayRequestQueue::new();
        drop(queue);
        let retained = BTreeSet::from([key("gw1", "ns1")]);

        let batch = collect_batch(&mut receiver, Duration::from_millis(5), retained.clone()).await;
        assert_eq!(batch, Some(retained));
    }

    #[test]
    fn test_pending_deliveries_bounded_attempts() {
        let mut pending = PendingDeliveries::default();
        let gw = key("gw1", "ns1");

        for _ in 1..GATEWAY_DISPATCH_MAX_ATTEMPTS {
            assert!(pending.record_failure(&gw));
        }
        assert!(!pending.record_failure(&gw));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_pending_deliveries_success_clears_key() {
        let mut pending = PendingDeliveries::default();
        let gw = key("gw1", "ns1");
        pending.record_failure(&gw);

        pending.record_success(&gw);

        assert!(pending.is_empty());
        assert!(pending.keys().is_empty());
    }

    #[test]
    fn test_pending_deliveries_backoff_grows_and_caps() {
        let window = Duration::from_millis(500);
        let mut pending = PendingDeliveries::default();
        let gw = key("gw1", "ns1");

        assert_eq!(pending.backoff(window), window);
        pending.record_failure(&gw);
        assert_eq!(pending.backoff(window), Duration::from_secs(1));
        pending.record_failure(&gw);
        assert_eq!(pending.backoff(window), Duration::from_secs(2));

        assert_eq!(
            pending.backoff(Duration::from_secs(3600)),
            Duration::from_secs(GATEWAY_DISPATCH_MAX_BACKOFF_SECS)
        );
    }
}
