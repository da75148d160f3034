//! Markers the orchestrator reads out of ADT response bodies
//!
//! Bodies are not parsed as XML; only the lock handle and error severities
//! are needed to drive the state machine.

use once_cell::sync::Lazy;
use regex::Regex;

static LOCK_HANDLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<LOCK_HANDLE>\s*([^<\s]+)\s*</LOCK_HANDLE>")
        .expect("LOCK_HANDLE regex should compile - this is a bug")
});

/// `type="E"` with or without namespace prefix (`chkrun:type`, `msg type`).
static ERROR_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[\s:])type\s*=\s*["']E["']"#)
        .expect("ERROR_TYPE regex should compile - this is a bug")
});

static ERROR_SEVERITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<SEVERITY>\s*ERROR\s*</SEVERITY>|severity\s*=\s*["']ERROR["']"#)
        .expect("ERROR_SEVERITY regex should compile - this is a bug")
});

static SHORT_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)shortText\s*=\s*"([^"]*)"|<SHORT_TEXT>([^<]*)</SHORT_TEXT>|<txt>([^<]*)</txt>"#)
        .expect("SHORT_TEXT regex should compile - this is a bug")
});

/// Lock handle from a lock response.
pub fn lock_handle(body: &str) -> Option<String> {
    LOCK_HANDLE.captures(body).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

/// Whether a check or activation report contains an error message.
pub fn has_error_message(body: &str) -> bool {
    ERROR_TYPE.is_match(body)
}

/// Whether a validation response reports ERROR severity.
pub fn has_error_severity(body: &str) -> bool {
    ERROR_SEVERITY.is_match(body)
}

/// First human-readable message text in `body`.
pub fn first_message(body: &str) -> Option<String> {
    SHORT_TEXT
        .captures(body)
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use adtkit_common::testing::{adt_error_message, check_report, lock_response};

    use super::*;

    #[test]
    fn extracts_lock_handle() {
        assert_eq!(lock_handle(&lock_response("ABC123==")), Some("ABC123==".to_string()));
        assert_eq!(lock_handle("<DATA><LOCK_HANDLE></LOCK_HANDLE></DATA>"), None);
        assert_eq!(lock_handle("<DATA/>"), None);
    }

    #[test]
    fn detects_error_type_with_and_without_prefix() {
        assert!(has_error_message(&check_report(Some("E"))));
        assert!(!has_error_message(&check_report(Some("W"))));
        assert!(!has_error_message(&check_report(None)));
        assert!(has_error_message(r#"<msg objDescr="x" type="E"><shortText><txt>bad</txt></shortText></msg>"#));
        assert!(!has_error_message(r#"<adtcore:objectReference adtcore:subtype="E"/>"#));
    }

    #[test]
    fn detects_error_severity() {
        assert!(has_error_severity(&adt_error_message("ERROR", "Class exists")));
        assert!(!has_error_severity(&adt_error_message("OK", "")));
    }

    #[test]
    fn first_message_reads_any_supported_shape() {
        assert_eq!(first_message(&check_report(Some("E"))).as_deref(), Some("Syntax check message"));
        assert_eq!(
            first_message(&adt_error_message("ERROR", "Class exists")).as_deref(),
            Some("Class exists")
        );
        assert_eq!(first_message("<txt>Activation failed</txt>").as_deref(), Some("Activation failed"));
        assert_eq!(first_message("<empty/>"), None);
    }
}
