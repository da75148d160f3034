//! Test fixtures shared across crates

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Unsigned JWT whose `exp` claim is `exp` seconds after the epoch.
pub fn unsigned_jwt(subject: &str, exp: i64) -> String {
    encode(&format!(r#"{{"sub":"{subject}","exp":{exp}}}"#))
}

/// Unsigned JWT without an `exp` claim.
pub fn unsigned_jwt_without_exp(subject: &str) -> String {
    encode(&format!(r#"{{"sub":"{subject}"}}"#))
}

fn encode(payload: &str) -> String {
    format!(
        "{}.{}.unsigned",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

/// Lock response body carrying `handle`.
pub fn lock_response(handle: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <asx:abap xmlns:asx=\"http://www.sap.com/abapxml\" version=\"1.0\">\
         <asx:values><DATA><LOCK_HANDLE>{handle}</LOCK_HANDLE>\
         <CORRNR></CORRNR><IS_LOCAL>X</IS_LOCAL></DATA></asx:values></asx:abap>"
    )
}

/// Check run report; `message_type` is `E`, `W` or `I`, or `None` for a
/// clean report.
pub fn check_report(message_type: Option<&str>) -> String {
    let messages = message_type.map_or_else(String::new, |kind| {
        format!(
            "<chkrun:checkMessageList><chkrun:checkMessage chkrun:uri=\"#start=1,0\" \
             chkrun:type=\"{kind}\" chkrun:shortText=\"Syntax check message\"/>\
             </chkrun:checkMessageList>"
        )
    });
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <chkrun:checkRunReports xmlns:chkrun=\"http://www.sap.com/adt/checkrun\">\
         <chkrun:checkReport chkrun:reporter=\"abapCheckRun\" chkrun:status=\"processed\">\
         {messages}</chkrun:checkReport></chkrun:checkRunReports>"
    )
}

/// Validation response reporting `severity` (`OK` or `ERROR`).
pub fn adt_error_message(severity: &str, text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <asx:abap xmlns:asx=\"http://www.sap.com/abapxml\" version=\"1.0\">\
         <asx:values><DATA><SEVERITY>{severity}</SEVERITY><SHORT_TEXT>{text}</SHORT_TEXT>\
         </DATA></asx:values></asx:abap>"
    )
}
