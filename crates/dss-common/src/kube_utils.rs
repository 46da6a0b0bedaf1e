//! Kubernetes naming helpers shared by the composer and its front ends

/// API group for RBAC resources
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Prefix of the built-in group holding every service account in a namespace
pub const SERVICE_ACCOUNT_GROUP_PREFIX: &str = "system:serviceaccounts:";

/// Maximum length of a DNS-1123 label
pub const DNS_LABEL_MAX_LEN: usize = 63;

/// Name of the group containing all service accounts in `namespace`.
///
/// Kubernetes adds every service account to `system:serviceaccounts:<ns>`,
/// so binding a role to this group grants it to all workloads in the
/// namespace.
pub fn service_account_group(namespace: &str) -> String {
    format!("{SERVICE_ACCOUNT_GROUP_PREFIX}{namespace}")
}

/// Validate a DNS-1123 label such as a namespace name.
///
/// Rules:
/// - 1 to 63 characters
/// - lowercase alphanumerics and `-` only
/// - must start and end with an alphanumeric
pub fn validate_dns_label(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("name cannot be empty".to_string());
    }
    if s.len() > DNS_LABEL_MAX_LEN {
        return Err(format!(
            "name must be at most {} characters: {}",
            DNS_LABEL_MAX_LEN, s
        ));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "name must be lowercase alphanumeric with hyphens: {}",
            s
        ));
    }
    if s.starts_with('-') || s.ends_with('-') {
        return Err(format!("name cannot start or end with hyphen: {}", s));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_account_group_covers_whole_namespace() {
        assert_eq!(service_account_group("uss1"), "system:serviceaccounts:uss1");
    }

    #[test]
    fn accepts_typical_namespaces() {
        assert!(validate_dns_label("uss1").is_ok());
        assert!(validate_dns_label("dss-main").is_ok());
        assert!(validate_dns_label("1zone").is_ok());
        assert!(validate_dns_label(&"a".repeat(DNS_LABEL_MAX_LEN)).is_ok());
    }

    #[test]
    fn rejects_invalid_labels() {
        assert!(validate_dns_label("").is_err());
        assert!(validate_dns_label("Upper").is_err());
        assert!(validate_dns_label("under_score").is_err());
        assert!(validate_dns_label("-leading").is_err());
        assert!(validate_dns_label("trailing-").is_err());
        assert!(validate_dns_label("has.dot").is_err());

        let err = validate_dns_label(&"a".repeat(DNS_LABEL_MAX_LEN + 1)).unwrap_err();
        assert!(err.contains("at most 63"));
    }
}
