// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for the `DNSRecord` controller.
//!
//! These tests expect a cluster with the `DNSRecord` CRD installed and the controller
//! running with a managed zone named `example-com` for `example.com`.
//!
//! Run with: cargo test --test dnsrecord_integration -- --ignored

mod common;

use common::{
    cleanup_test_namespace, create_dns_record, create_test_namespace, get_kube_client_or_skip,
    wait_for_record,
};
use gateway_dns::crd::{DNSRecord, DNSRecordSpec, Endpoint, ManagedZoneReference, RecordType};
use gateway_dns::reconcilers::status::is_condition_true;
use gateway_dns::status_reasons::{CONDITION_TYPE_READY, REASON_VALIDATION_FAILED};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, DeleteParams};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(60);

fn zone_ref() -> Option<ManagedZoneReference> {
    Some(ManagedZoneReference {
        name: "example-com".to_string(),
    })
}

#[tokio::test]
#[ignore] // Run with: cargo test --test dnsrecord_integration -- --ignored
async fn test_dnsrecord_crd_installed() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };

    let crds: Api<CustomResourceDefinition> = Api::all(client);
    let crd = crds.get("dnsrecords.gatewaydns.io").await;
    assert!(crd.is_ok(), "DNSRecord CRD should be installed: {crd:?}");
}

#[tokio::test]
#[ignore]
async fn test_dnsrecord_publishes_and_tears_down() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };

    let namespace = "gateway-dns-it-publish";
    create_test_namespace(&client, namespace)
        .await
        .expect("namespace should be created");

    let spec = DNSRecordSpec {
        managed_zone: zone_ref(),
        endpoints: vec![
            Endpoint::new("api.example.com", RecordType::A, vec!["192.0.2.10".to_string()])
                .with_set_identifier("eu-west"),
            Endpoint::new("api.example.com", RecordType::A, vec!["192.0.2.20".to_string()])
                .with_set_identifier("us-east"),
        ],
    };
    create_dns_record(&client, namespace, "api", spec)
        .await
        .expect("record should be created");

    let ready = wait_for_record(&client, namespace, "api", TIMEOUT, |record| {
        record.status.as_ref().is_some_and(|status| {
            is_condition_true(&status.conditions, CONDITION_TYPE_READY) && status.endpoints.len() == 2
        })
    })
    .await;
    assert!(ready.is_some(), "record should become Ready with both endpoints published");

    let api: Api<DNSRecord> = Api::namespaced(client.clone(), namespace);
    api.delete("api", &DeleteParams::default())
        .await
        .expect("record should be deleted");

    let mut removed = false;
    for _ in 0..TIMEOUT.as_secs() {
        if api.get_opt("api").await.expect("get should succeed").is_none() {
            removed = true;
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    assert!(removed, "finalizer should release the record after teardown");

    let _ = cleanup_test_namespace(&client, namespace).await;
}

#[tokio::test]
#[ignore]
async fn test_dnsrecord_duplicate_set_id_fails_validation() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };

    let namespace = "gateway-dns-it-validation";
    create_test_namespace(&client, namespace)
        .await
        .expect("namespace should be created");

    let duplicate = Endpoint::new("www.example.com", RecordType::CNAME, vec!["lb.example.net".to_string()]);
    let spec = DNSRecordSpec {
        managed_zone: zone_ref(),
        endpoints: vec![duplicate.clone(), duplicate],
    };
    create_dns_record(&client, namespace, "www", spec)
        .await
        .expect("record should be created");

    let failed = wait_for_record(&client, namespace, "www", TIMEOUT, |record| {
        record.status.as_ref().is_some_and(|status| {
            status
                .conditions
                .iter()
                .any(|c| c.reason.as_deref() == Some(REASON_VALIDATION_FAILED))
        })
    })
    .await
    .expect("record should report a validation failure");

    let status = failed.status.expect("status should be set");
    assert!(!is_condition_true(&status.conditions, CONDITION_TYPE_READY));
    assert!(status.endpoints.is_empty());

    let _ = cleanup_test_namespace(&client, namespace).await;
}
