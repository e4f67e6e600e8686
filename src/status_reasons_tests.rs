// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status_reasons` module

#[cfg(test)]
mod tests {
    use crate::status_reasons::*;

    #[test]
    fn test_condition_types() {
        assert_eq!(CONDITION_TYPE_READY, "Ready");
        assert_eq!(CONDITION_TYPE_FAILED, "Failed");
    }

    #[test]
    fn test_condition_status_mapping() {
        assert_eq!(condition_status(true), CONDITION_STATUS_TRUE);
        assert_eq!(condition_status(false), CONDITION_STATUS_FALSE);
    }

    #[test]
    fn test_reasons_are_camel_case() {
        let reasons = [
            REASON_PROVIDER_SUCCESS,
            REASON_PROVIDER_ERROR,
            REASON_VALIDATION_FAILED,
            REASON_ZONE_NOT_FOUND,
            REASON_DELETING,
            REASON_NO_FAILURES,
        ];

        for reason in reasons {
            assert!(
                reason.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
                "reason {reason} must start upper case"
            );
            assert!(
                reason.chars().all(|c| c.is_ascii_alphanumeric()),
                "reason {reason} must be alphanumeric"
            );
        }
    }
}
