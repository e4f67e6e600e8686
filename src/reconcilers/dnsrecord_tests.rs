// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `dnsrecord.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{
        DNSRecord, DNSRecordSpec, DNSRecordStatus, Endpoint, ManagedZoneReference, RecordType,
    };
    use crate::errors::ValidationError;
    use crate::provider::{InMemoryZone, ManagedZone, Operation, ResolvedZone};
    use crate::reconcilers::dnsrecord::{
        previous_zone, publish_cycle, record_cycle_status, record_validation_failure,
        record_zone_not_found, ReconcileOutcome,
    };
    use crate::reconcilers::status::{find_condition, DNSRecordStatusUpdater};
    use std::sync::Arc;

    fn a_record(name: &str, target: &str) -> Endpoint {
        Endpoint::new(name, RecordType::A, vec![target.to_string()])
    }

    fn resolved(publisher: Arc<InMemoryZone>) -> ResolvedZone {
        resolved_named("example-com", publisher)
    }

    fn resolved_named(name: &str, publisher: Arc<InMemoryZone>) -> ResolvedZone {
        ResolvedZone {
            zone: ManagedZone {
                name: name.to_string(),
                namespace: None,
                domain_name: "example.com".to_string(),
            },
            publisher,
        }
    }

    fn record(endpoints: Vec<Endpoint>) -> DNSRecord {
        let mut record = DNSRecord::new(
            "web",
            DNSRecordSpec {
                managed_zone: Some(ManagedZoneReference {
                    name: "example-com".to_string(),
                }),
                endpoints,
            },
        );
        record.metadata.namespace = Some("default".to_string());
        record.metadata.generation = Some(2);
        record
    }

    #[tokio::test]
    async fn test_publish_cycle_creates_endpoints() {
        let publisher = Arc::new(InMemoryZone::new());
        let zone = resolved(publisher.clone());
        let desired = vec![a_record("a.example.com", "1.1.1.1")];

        let report = publish_cycle(&zone, &desired, &[]).await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.published, desired);
        assert_eq!(publisher.records().await, desired);
    }

    #[tokio::test]
    async fn test_empty_plan_makes_no_provider_call() {
        let publisher = Arc::new(InMemoryZone::new());
        publisher.set_unavailable(true).await;
        let zone = resolved(publisher);
        let desired = vec![a_record("a.example.com", "1.1.1.1")];

        let report = publish_cycle(&zone, &desired, &desired).await;

        assert!(report.results.is_empty());
        assert!(report.failure_summary().is_none());
        assert_eq!(report.published, desired);
    }

    #[tokio::test]
    async fn test_partial_failure_then_retry_only_failed() {
        let publisher = Arc::new(InMemoryZone::new());
        publisher.reject_set_id("b.example.com").await;
        let zone = resolved(publisher.clone());
        let desired = vec![
            a_record("a.example.com", "1.1.1.1"),
            a_record("b.example.com", "2.2.2.2"),
        ];

        let first = publish_cycle(&zone, &desired, &[]).await;
        assert_eq!(first.published, vec![desired[0].clone()]);
        assert_eq!(first.failed_count(), 1);

        let mut updater = DNSRecordStatusUpdater::new(&record(desired.clone()));
        assert_eq!(
            record_cycle_status(&mut updater, &first),
            ReconcileOutcome::PartiallyFailed
        );
        let failed = find_condition(&updater.status().conditions, "Failed").unwrap();
        assert_eq!(failed.status, "True");
        assert_eq!(failed.reason.as_deref(), Some("ProviderError"));

        publisher.clear_rejections().await;
        let second = publish_cycle(&zone, &desired, &first.published).await;
        let retried: Vec<Operation> = second
            .results
            .iter()
            .map(|result| result.operation.clone())
            .collect();
        assert_eq!(retried, vec![Operation::Create(desired[1].clone())]);
        assert_eq!(second.published, desired);
        assert_eq!(second.failed_count(), 0);
    }

    #[tokio::test]
    async fn test_teardown_cycle() {
        let publisher = Arc::new(InMemoryZone::new());
        let zone = resolved(publisher.clone());
        let published = vec![a_record("a.example.com", "1.1.1.1")];
        publish_cycle(&zone, &published, &[]).await;

        let report = publish_cycle(&zone, &[], &published).await;

        assert_eq!(
            report.changes.operations(),
            vec![Operation::Delete(published[0].clone())]
        );
        assert!(report.published.is_empty());
        assert!(publisher.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_zone_keeps_published_state() {
        let publisher = Arc::new(InMemoryZone::new());
        let zone = resolved(publisher.clone());
        let published = vec![a_record("a.example.com", "1.1.1.1")];
        publish_cycle(&zone, &published, &[]).await;

        publisher.set_unavailable(true).await;
        let desired = vec![a_record("a.example.com", "2.2.2.2")];
        let report = publish_cycle(&zone, &desired, &published).await;

        assert_eq!(report.published, published);
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_successful_cycle_sets_ready() {
        let publisher = Arc::new(InMemoryZone::new());
        let zone = resolved(publisher);
        let desired = vec![a_record("a.example.com", "1.1.1.1")];
        let report = publish_cycle(&zone, &desired, &[]).await;

        let mut updater = DNSRecordStatusUpdater::new(&record(desired.clone()));
        assert_eq!(
            record_cycle_status(&mut updater, &report),
            ReconcileOutcome::Published
        );

        let status = updater.status();
        assert_eq!(status.observed_generation, Some(2));
        assert_eq!(status.endpoints, desired);
        let ready = find_condition(&status.conditions, "Ready").unwrap();
        assert_eq!(ready.status, "True");
        assert_eq!(ready.observed_generation, Some(2));
        let failed = find_condition(&status.conditions, "Failed").unwrap();
        assert_eq!(failed.status, "False");
    }

    /// Status left by a successful cycle at generation 1.
    fn settled_record(endpoints: Vec<Endpoint>) -> DNSRecord {
        let mut settled = DNSRecordStatusUpdater::new(&record(endpoints.clone()));
        settled.set_condition("Ready", "True", "ProviderSuccess", "1 endpoint(s) published");
        settled.set_condition("Failed", "False", "NoFailures", "");
        settled.set_endpoints(endpoints.clone());
        settled.set_published_zone("example-com");

        let mut status = settled.status().clone();
        status.observed_generation = Some(1);

        let mut next = record(endpoints);
        next.status = Some(status);
        next
    }

    #[test]
    fn test_validation_failure_is_durable() {
        let published = vec![a_record("a.example.com", "1.1.1.1")];
        let mut updater = DNSRecordStatusUpdater::new(&settled_record(published.clone()));
        let error = ValidationError::DuplicateSetId {
            set_id: "a.example.com".to_string(),
        };

        let outcome = record_validation_failure(&mut updater, &error);

        assert_eq!(outcome, ReconcileOutcome::ValidationFailed);
        let status = updater.status();
        assert_eq!(status.observed_generation, Some(2));
        assert_eq!(status.endpoints, published);

        let ready = find_condition(&status.conditions, "Ready").unwrap();
        assert_eq!(ready.status, "False");
        assert_eq!(ready.reason.as_deref(), Some("ValidationFailed"));
        let failed = find_condition(&status.conditions, "Failed").unwrap();
        assert_eq!(failed.status, "True");
        assert_eq!(failed.reason.as_deref(), Some("ValidationFailed"));
        assert_eq!(failed.message.as_deref(), Some(error.to_string().as_str()));
    }

    #[test]
    fn test_zone_not_found_replaces_stale_failed_condition() {
        let published = vec![a_record("a.example.com", "1.1.1.1")];
        let mut updater = DNSRecordStatusUpdater::new(&settled_record(published.clone()));

        record_zone_not_found(&mut updater, "managed zone example-com not found");

        let status = updater.status();
        assert_eq!(status.observed_generation, Some(1));
        assert_eq!(status.endpoints, published);
        assert_eq!(status.conditions.len(), 2);

        let ready = find_condition(&status.conditions, "Ready").unwrap();
        assert_eq!(ready.status, "False");
        assert_eq!(ready.reason.as_deref(), Some("ZoneNotFound"));
        let failed = find_condition(&status.conditions, "Failed").unwrap();
        assert_eq!(failed.status, "True");
        assert_eq!(failed.reason.as_deref(), Some("ZoneNotFound"));
        assert!(updater.has_changes());
    }

    #[test]
    fn test_previous_zone_detection() {
        let mut status = DNSRecordStatus {
            endpoints: vec![a_record("a.example.com", "1.1.1.1")],
            published_zone: Some("old-zone".to_string()),
            ..Default::default()
        };
        assert_eq!(previous_zone(&status, "example-com"), Some("old-zone"));
        assert_eq!(previous_zone(&status, "old-zone"), None);

        status.published_zone = None;
        assert_eq!(previous_zone(&status, "example-com"), None);

        status.published_zone = Some("old-zone".to_string());
        status.endpoints.clear();
        assert_eq!(previous_zone(&status, "example-com"), None);
    }

    #[tokio::test]
    async fn test_zone_move_removes_old_records_before_creating_new() {
        let old_publisher = Arc::new(InMemoryZone::new());
        let new_publisher = Arc::new(InMemoryZone::new());
        let old_zone = resolved_named("old-zone", old_publisher.clone());
        let new_zone = resolved(new_publisher.clone());
        let desired = vec![a_record("a.example.com", "1.1.1.1")];

        let first = publish_cycle(&old_zone, &desired, &[]).await;
        assert_eq!(old_publisher.records().await, desired);

        let teardown = publish_cycle(&old_zone, &[], &first.published).await;
        assert!(teardown.failure_summary().is_none());
        assert!(old_publisher.records().await.is_empty());

        let moved = publish_cycle(&new_zone, &desired, &teardown.published).await;
        assert_eq!(
            moved.changes.operations(),
            vec![Operation::Create(desired[0].clone())]
        );
        assert_eq!(new_publisher.records().await, desired);
    }
}
