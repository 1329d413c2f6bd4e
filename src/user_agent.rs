//! Library identification for outbound requests

/// `<product>/<version>` tag identifying this library to the service
pub const LIBRARY_ID: &str = concat!("nosqlhaus/", env!("CARGO_PKG_VERSION"));

/// User agent to send, given the one the caller configured
///
/// The library identifier is prepended to a caller-supplied value unless it is
/// already present, and used alone when nothing was configured.
pub fn negotiate_user_agent(configured: Option<&str>) -> String {
    match configured.map(str::trim).filter(|ua| !ua.is_empty()) {
        None => LIBRARY_ID.to_string(),
        Some(existing) if existing.contains(LIBRARY_ID) => existing.to_string(),
        Some(existing) => format!("{} {}", LIBRARY_ID, existing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_id_shape() {
        let (product, version) = LIBRARY_ID.split_once('/').unwrap();
        assert_eq!(product, "nosqlhaus");
        assert!(!version.is_empty());
    }

    #[test]
    fn test_unset_user_agent_becomes_library_id() {
        assert_eq!(negotiate_user_agent(None), LIBRARY_ID);
        assert_eq!(negotiate_user_agent(Some("  ")), LIBRARY_ID);
    }

    #[test]
    fn test_library_id_is_prepended_once() {
        let negotiated = negotiate_user_agent(Some("billing/1.0"));
        assert_eq!(negotiated, format!("{} billing/1.0", LIBRARY_ID));

        // Negotiating again must not duplicate the identifier
        let again = negotiate_user_agent(Some(&negotiated));
        assert_eq!(again, negotiated);
        assert_eq!(again.matches(LIBRARY_ID).count(), 1);
    }

    #[test]
    fn test_existing_library_id_is_left_alone() {
        let configured = format!("billing/1.0 {}", LIBRARY_ID);
        assert_eq!(negotiate_user_agent(Some(&configured)), configured);
    }
}
