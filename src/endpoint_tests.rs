// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod tests {
    use crate::crd::{Endpoint, RecordType};

    fn a_record(name: &str, target: &str) -> Endpoint {
        Endpoint::new(name, RecordType::A, vec![target.to_string()])
    }

    #[test]
    fn test_set_id_concatenates_name_and_identifier() {
        let endpoint = a_record("api.example.com", "192.0.2.1");
        assert_eq!(endpoint.set_id(), "api.example.com");

        let weighted = endpoint.with_set_identifier("eu-west");
        assert_eq!(weighted.set_id(), "api.example.comeu-west");
    }

    #[test]
    fn test_set_provider_specific_appends_new_names_in_order() {
        let mut endpoint = a_record("api.example.com", "192.0.2.1");
        endpoint.set_provider_specific("aws/weight", "100");
        endpoint.set_provider_specific("aws/health-check-id", "abc");

        let names: Vec<&str> = endpoint
            .provider_specific
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["aws/weight", "aws/health-check-id"]);
    }

    #[test]
    fn test_set_provider_specific_updates_existing_in_place() {
        let mut endpoint = a_record("api.example.com", "192.0.2.1");
        endpoint.set_provider_specific("aws/weight", "100");
        endpoint.set_provider_specific("aws/region", "eu-west-1");
        endpoint.set_provider_specific("aws/weight", "50");

        assert_eq!(endpoint.provider_specific.len(), 2);
        let weight = endpoint.get_provider_specific("aws/weight").unwrap();
        assert_eq!(weight.value, "50");
        assert_eq!(endpoint.provider_specific.0[0].name, "aws/weight");
    }

    #[test]
    fn test_get_provider_specific_missing() {
        let endpoint = a_record("api.example.com", "192.0.2.1");
        assert!(endpoint.get_provider_specific("aws/weight").is_none());
    }

    #[test]
    fn test_provider_equal_ignores_labels() {
        let published = a_record("api.example.com", "192.0.2.1").with_label("owner", "gw-a");
        let desired = a_record("api.example.com", "192.0.2.1").with_label("owner", "gw-b");

        assert!(desired.provider_equal(&published));
        assert_ne!(desired, published);
    }

    #[test]
    fn test_provider_equal_target_order_significant() {
        let first = Endpoint::new(
            "api.example.com",
            RecordType::A,
            vec!["192.0.2.1".to_string(), "192.0.2.2".to_string()],
        );
        let second = Endpoint::new(
            "api.example.com",
            RecordType::A,
            vec!["192.0.2.2".to_string(), "192.0.2.1".to_string()],
        );

        assert!(!first.provider_equal(&second));
    }

    #[test]
    fn test_provider_equal_detects_ttl_and_provider_specific() {
        let base = a_record("api.example.com", "192.0.2.1");
        assert!(!base.provider_equal(&base.clone().with_ttl(60)));

        let mut tuned = base.clone();
        tuned.set_provider_specific("aws/weight", "10");
        assert!(!base.provider_equal(&tuned));
    }

    #[test]
    fn test_display_renders_zone_line() {
        let mut endpoint = Endpoint::new(
            "api.example.com",
            RecordType::CNAME,
            vec!["lb-1.example.net".to_string(), "lb-2.example.net".to_string()],
        )
        .with_ttl(300)
        .with_set_identifier("eu");
        endpoint.set_provider_specific("aws/weight", "100");

        assert_eq!(
            endpoint.to_string(),
            "api.example.com 300 IN CNAME eu [lb-1.example.net lb-2.example.net] [{aws/weight 100}]"
        );
    }

    #[test]
    fn test_display_without_type_or_provider_specific() {
        let endpoint = Endpoint {
            dns_name: "bare.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(endpoint.to_string(), "bare.example.com 0 IN  [] []");
    }
}
