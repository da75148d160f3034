//! Step sequences of the object orchestrator against a scripted connection

mod support;

use std::sync::Arc;
use std::time::Duration;

use adtkit_common::testing::{adt_error_message, check_report, init_test_tracing, lock_response};
use adtkit_common::time::MockClock;
use adtkit_core::adt::{AdtClass, AdtDomain, AdtProgram};
use adtkit_domain::{
    AdtError, AdtObjectErrorCode, CheckVersion, ClassConfig, ClientSettings, DomainConfig,
    HttpMethod, NetworkErrorCode, ObjectVersion, OperationOptions, OperationStep, ProgramConfig, ReadOptions,
};
use support::{http_error, ScriptedConnection};

fn class_config() -> ClassConfig {
    let mut config = ClassConfig::new("zcl_demo");
    config.package_name = Some("$tmp".into());
    config.description = Some("Demo class".into());
    config
}

fn class_object(connection: &ScriptedConnection) -> AdtClass {
    init_test_tracing();
    AdtClass::new(Arc::new(connection.clone()))
        .with_clock(Arc::new(MockClock::at_epoch_secs(1_700_000_000)))
}

fn source_options() -> OperationOptions {
    OperationOptions::default().source_code("CLASS zcl_demo DEFINITION. ENDCLASS.")
}

#[tokio::test]
async fn create_runs_full_sequence_in_order() {
    let connection = ScriptedConnection::new()
        .reply(200, &adt_error_message("OK", ""))
        .reply(201, "")
        .reply(200, &check_report(None))
        .reply(200, &lock_response("H1"))
        .reply(200, &check_report(Some("W")))
        .ok()
        .ok()
        .reply(200, &check_report(None))
        .ok();

    let state = class_object(&connection)
        .create(&class_config(), &source_options().activate_on_create())
        .await
        .expect("create succeeds");

    assert_eq!(
        state.step_sequence(),
        vec![
            OperationStep::Validate,
            OperationStep::Create,
            OperationStep::Check(CheckVersion::Active),
            OperationStep::Lock,
            OperationStep::Check(CheckVersion::Inactive),
            OperationStep::Update,
            OperationStep::Unlock,
            OperationStep::Check(CheckVersion::Active),
            OperationStep::Activate,
        ]
    );
    assert_eq!(state.lock_handle(), Some("H1"));
    assert!(!state.has_errors());

    let requests = connection.requests();
    let validate = &requests[0];
    assert_eq!(validate.url, "/sap/bc/adt/oo/validation/objectname");
    assert_eq!(validate.param_value("objtype"), Some("CLAS/OC"));
    assert_eq!(validate.param_value("objname"), Some("ZCL_DEMO"));
    assert_eq!(validate.param_value("packagename"), Some("$TMP"));

    let update = &requests[5];
    assert_eq!(update.method, HttpMethod::Put);
    assert_eq!(update.url, "/sap/bc/adt/oo/classes/zcl_demo/source/main");
    assert_eq!(update.param_value("lockHandle"), Some("H1"));

    let unlock = &requests[6];
    assert_eq!(unlock.param_value("_action"), Some("UNLOCK"));
    assert_eq!(unlock.param_value("lockHandle"), Some("H1"));
}

#[tokio::test]
async fn create_without_source_skips_locked_segment() {
    let connection = ScriptedConnection::new().reply(200, &adt_error_message("OK", "")).ok().ok();

    let state = class_object(&connection)
        .create(&class_config(), &OperationOptions::default())
        .await
        .expect("create succeeds");

    assert_eq!(
        state.step_sequence(),
        vec![
            OperationStep::Validate,
            OperationStep::Create,
            OperationStep::Check(CheckVersion::Active),
        ]
    );
    assert_eq!(connection.count_action("LOCK"), 0);
}

#[tokio::test]
async fn create_passes_transport_request() {
    let mut config = class_config();
    config.transport_request = Some("DEVK900001".into());
    let connection = ScriptedConnection::new();

    class_object(&connection)
        .create(&config, &OperationOptions::default())
        .await
        .expect("create succeeds");

    let create = &connection.requests()[1];
    assert_eq!(create.url, "/sap/bc/adt/oo/classes");
    assert_eq!(create.param_value("corrNr"), Some("DEVK900001"));
    assert!(create.data.as_deref().is_some_and(|body| body.contains(r#"adtcore:name="ZCL_DEMO""#)));
}

#[tokio::test]
async fn create_requires_package_and_description() {
    let connection = ScriptedConnection::new();
    let config = ClassConfig::new("zcl_demo");

    let err = class_object(&connection)
        .create(&config, &OperationOptions::default())
        .await
        .expect_err("missing fields");

    assert_eq!(err.code, AdtObjectErrorCode::ValidationFailed);
    assert!(matches!(err.source, AdtError::InvalidInput(_)));
    assert!(connection.requests().is_empty());
    assert_eq!(err.state.errors()[0].step, OperationStep::Validate);
}

#[tokio::test]
async fn validation_error_stops_before_create() {
    let connection = ScriptedConnection::new()
        .reply(200, &adt_error_message("ERROR", "Class ZCL_DEMO already exists"));

    let err = class_object(&connection)
        .create(&class_config(), &source_options().delete_on_failure())
        .await
        .expect_err("validation fails");

    assert_eq!(err.code, AdtObjectErrorCode::ValidationFailed);
    assert!(err.to_string().contains("already exists"));
    assert_eq!(connection.requests().len(), 1);
    assert_eq!(connection.count(HttpMethod::Post, "/sap/bc/adt/oo/classes"), 0);
}

#[tokio::test]
async fn create_failure_is_not_cleaned_up() {
    let connection = ScriptedConnection::new()
        .reply(200, &adt_error_message("OK", ""))
        .fail_status(500);

    let err = class_object(&connection)
        .create(&class_config(), &source_options().delete_on_failure())
        .await
        .expect_err("create fails");

    assert_eq!(err.code, AdtObjectErrorCode::CreateFailed);
    assert_eq!(err.source.status(), Some(500));
    assert_eq!(connection.count(HttpMethod::Post, "/deletion/delete"), 0);
}

#[tokio::test]
async fn update_failure_still_unlocks_once() {
    let connection = ScriptedConnection::new()
        .reply(200, &lock_response("H2"))
        .reply(200, &check_report(None))
        .fail_status(500)
        .ok();

    let err = class_object(&connection)
        .update(&class_config(), &source_options())
        .await
        .expect_err("update fails");

    assert_eq!(err.code, AdtObjectErrorCode::UpdateFailed);
    assert_eq!(connection.count_action("UNLOCK"), 1);
    assert_eq!(
        err.state.step_sequence(),
        vec![
            OperationStep::Lock,
            OperationStep::Check(CheckVersion::Inactive),
            OperationStep::Unlock
        ]
    );
    assert_eq!(err.state.errors()[0].step, OperationStep::Update);
}

#[tokio::test]
async fn unlock_failure_after_failed_update_keeps_update_error() {
    let connection = ScriptedConnection::new()
        .reply(200, &lock_response("H3"))
        .ok()
        .fail_status(500)
        .fail_status(403);

    let err = class_object(&connection)
        .update(&class_config(), &source_options())
        .await
        .expect_err("update fails");

    assert_eq!(err.code, AdtObjectErrorCode::UpdateFailed);
    assert_eq!(err.source.status(), Some(500));
    let failed_steps: Vec<_> = err.state.errors().iter().map(|e| e.step).collect();
    assert_eq!(failed_steps, vec![OperationStep::Update, OperationStep::Unlock]);
}

#[tokio::test]
async fn unlock_failure_alone_is_reported() {
    let connection =
        ScriptedConnection::new().reply(200, &lock_response("H4")).ok().ok().fail_status(500);

    let err = class_object(&connection)
        .update(&class_config(), &source_options())
        .await
        .expect_err("unlock fails");

    assert_eq!(err.code, AdtObjectErrorCode::UnlockFailed);
    assert_eq!(connection.count_action("UNLOCK"), 1);
}

#[tokio::test]
async fn inactive_check_error_unlocks_and_skips_update() {
    let connection = ScriptedConnection::new()
        .reply(200, &lock_response("H5"))
        .reply(200, &check_report(Some("E")))
        .ok();

    let err = class_object(&connection)
        .update(&class_config(), &source_options())
        .await
        .expect_err("check fails");

    assert_eq!(err.code, AdtObjectErrorCode::CheckFailed);
    assert!(err.to_string().contains("Syntax check message"));
    assert_eq!(connection.count(HttpMethod::Put, "/source/main"), 0);
    assert_eq!(connection.count_action("UNLOCK"), 1);
    let steps = err.state.step_sequence();
    assert!(steps.contains(&OperationStep::Unlock));
    assert!(!steps.contains(&OperationStep::Delete));
    assert_eq!(connection.count(HttpMethod::Post, "/deletion/"), 0);
}

#[tokio::test]
async fn lock_without_handle_fails_without_unlock() {
    let connection = ScriptedConnection::new().reply(200, "<asx:abap/>");

    let err = class_object(&connection)
        .update(&class_config(), &source_options())
        .await
        .expect_err("no handle");

    assert_eq!(err.code, AdtObjectErrorCode::LockFailed);
    assert_eq!(connection.count_action("UNLOCK"), 0);
}

#[tokio::test]
async fn update_without_payload_sends_nothing() {
    let connection = ScriptedConnection::new();

    let err = class_object(&connection)
        .update(&class_config(), &OperationOptions::default())
        .await
        .expect_err("nothing to send");

    assert_eq!(err.code, AdtObjectErrorCode::UpdateFailed);
    assert!(connection.requests().is_empty());
}

#[tokio::test]
async fn delete_on_failure_cleans_up_and_keeps_original_error() {
    let connection = ScriptedConnection::new()
        .reply(200, &adt_error_message("OK", ""))
        .ok()
        .ok()
        .reply(200, &lock_response("H6"))
        .ok()
        .fail_status(500)
        .ok()
        .fail_status(500);

    let err = class_object(&connection)
        .create(&class_config(), &source_options().delete_on_failure())
        .await
        .expect_err("update fails");

    assert_eq!(err.code, AdtObjectErrorCode::UpdateFailed);
    assert_eq!(err.source.status(), Some(500));
    assert_eq!(connection.count_action("UNLOCK"), 1);
    assert_eq!(connection.count(HttpMethod::Post, "/sap/bc/adt/deletion/delete"), 1);

    let failed_steps: Vec<_> = err.state.errors().iter().map(|e| e.step).collect();
    assert_eq!(failed_steps, vec![OperationStep::Update, OperationStep::Delete]);
}

#[tokio::test]
async fn update_activates_when_requested() {
    let connection = ScriptedConnection::new().reply(200, &lock_response("H7"));

    let state = class_object(&connection)
        .update(&class_config(), &source_options().activate_on_update())
        .await
        .expect("update succeeds");

    assert_eq!(state.step_sequence().last(), Some(&OperationStep::Activate));
    let activation = connection.requests().pop().expect("activation sent");
    assert_eq!(activation.url, "/sap/bc/adt/activation");
    assert_eq!(activation.param_value("method"), Some("activate"));
}

#[tokio::test]
async fn activation_error_is_activate_failed() {
    let connection = ScriptedConnection::new().reply(
        200,
        r#"<chkl:messages xmlns:chkl="http://www.sap.com/abapxml/checklist"><msg objDescr="Class ZCL_DEMO" type="E"><shortText><txt>Syntax error</txt></shortText></msg></chkl:messages>"#,
    );

    let err = class_object(&connection)
        .activate(&class_config())
        .await
        .expect_err("activation fails");

    assert_eq!(err.code, AdtObjectErrorCode::ActivateFailed);
    assert!(err.to_string().contains("Syntax error"));
}

#[tokio::test]
async fn delete_blocked_by_deletion_check() {
    let connection = ScriptedConnection::new().reply(200, &check_report(Some("E")));

    let err = class_object(&connection).delete(&class_config()).await.expect_err("blocked");

    assert_eq!(err.code, AdtObjectErrorCode::CheckFailed);
    assert_eq!(err.state.errors()[0].step, OperationStep::Check(CheckVersion::Deletion));
    assert_eq!(connection.count(HttpMethod::Post, "/sap/bc/adt/deletion/delete"), 0);
}

#[tokio::test]
async fn delete_sends_transport_number() {
    let mut config = class_config();
    config.transport_request = Some("DEVK900002".into());
    let connection = ScriptedConnection::new();

    let state = class_object(&connection).delete(&config).await.expect("deleted");

    assert_eq!(
        state.step_sequence(),
        vec![OperationStep::Check(CheckVersion::Deletion), OperationStep::Delete]
    );
    let delete = &connection.requests()[1];
    assert!(delete
        .data
        .as_deref()
        .is_some_and(|body| body.contains("<del:transportNumber>DEVK900002</del:transportNumber>")));
}

#[tokio::test]
async fn read_not_found_is_none() {
    let connection = ScriptedConnection::new().fail_status(404);

    let read = class_object(&connection)
        .read(&class_config(), None, ReadOptions::default())
        .await
        .expect("404 is not an error");

    assert!(read.is_none());
}

#[tokio::test]
async fn read_bad_request_is_not_ready() {
    let connection = ScriptedConnection::new().fail_status(400);

    let err = class_object(&connection)
        .read(&class_config(), Some(ObjectVersion::Inactive), ReadOptions::default())
        .await
        .expect_err("400");

    assert_eq!(err.code, AdtObjectErrorCode::ObjectNotReady);
    assert_eq!(connection.requests()[0].param_value("version"), Some("inactive"));
}

#[tokio::test]
async fn read_network_error_is_read_failed() {
    let connection = ScriptedConnection::new()
        .fail(AdtError::network(NetworkErrorCode::ConnectionRefused, "connect ECONNREFUSED"));

    let err = class_object(&connection)
        .read(&class_config(), None, ReadOptions::default())
        .await
        .expect_err("network");

    assert_eq!(err.code, AdtObjectErrorCode::ReadFailed);
    assert!(err.source.is_network());
}

#[tokio::test]
async fn long_polling_read_uses_long_timeout() {
    let connection = ScriptedConnection::new().reply(200, "REPORT zdemo.");
    let program = AdtProgram::new(Arc::new(connection.clone()))
        .with_request_timeout(Duration::from_millis(250))
        .with_long_poll_timeout(Duration::from_secs(90));
    let mut config = ProgramConfig::new("zdemo");
    config.package_name = Some("$TMP".into());

    let state = program
        .read(&config, None, ReadOptions::long_polling())
        .await
        .expect("read ok")
        .expect("found");

    let request = &connection.requests()[0];
    assert_eq!(request.url, "/sap/bc/adt/programs/programs/zdemo/source/main");
    assert_eq!(request.param_value("withLongPolling"), Some("true"));
    assert_eq!(request.timeout, Duration::from_secs(90));
    assert_eq!(state.response(OperationStep::Read).map(|r| r.data.as_str()), Some("REPORT zdemo."));

    program.read(&config, None, ReadOptions::default()).await.expect("read ok");
    let plain = &connection.requests()[1];
    assert_eq!(plain.param_value("withLongPolling"), None);
    assert_eq!(plain.timeout, Duration::from_millis(250));
}

#[tokio::test]
async fn settings_supply_both_timeouts() {
    let connection = ScriptedConnection::new();
    let settings = ClientSettings {
        request_timeout_ms: 1_500,
        long_poll_timeout_ms: 45_000,
        ..ClientSettings::default()
    };
    let program = AdtProgram::new(Arc::new(connection.clone())).with_settings(&settings);
    let config = ProgramConfig::new("zdemo");

    program.read(&config, None, ReadOptions::long_polling()).await.expect("long poll read");
    program.read(&config, None, ReadOptions::default()).await.expect("plain read");

    let requests = connection.requests();
    assert_eq!(requests[0].timeout, Duration::from_secs(45));
    assert_eq!(requests[1].timeout, Duration::from_millis(1_500));
}

#[tokio::test]
async fn read_metadata_and_transport_map_missing_object() {
    let connection = ScriptedConnection::new().fail_status(404).fail(http_error(404));
    let domain = AdtDomain::new(Arc::new(connection.clone()));
    let mut config = DomainConfig::new("zdo_demo");
    config.package_name = Some("ZPKG".into());

    let err = domain.read_metadata(&config, ReadOptions::default()).await.expect_err("404");
    assert_eq!(err.code, AdtObjectErrorCode::ObjectNotFound);

    let err = domain.read_transport(&config, ReadOptions::default()).await.expect_err("404");
    assert_eq!(err.code, AdtObjectErrorCode::ObjectNotFound);

    let transport = &connection.requests()[1];
    assert_eq!(transport.url, "/sap/bc/adt/cts/transportchecks");
    let body = transport.data.as_deref().unwrap_or_default();
    assert!(body.contains("<OBJECT>DOMA</OBJECT>"));
    assert!(body.contains("<DEVCLASS>ZPKG</DEVCLASS>"));
    assert!(body.contains("<OPERATION>I</OPERATION>"));
}

#[tokio::test]
async fn domain_update_sends_object_xml() {
    let connection = ScriptedConnection::new().reply(200, &lock_response("H8"));
    let domain = AdtDomain::new(Arc::new(connection.clone()));
    let mut config = DomainConfig::new("zdo_demo");
    config.package_name = Some("ZPKG".into());
    config.description = Some("Demo domain".into());

    domain.update(&config, &OperationOptions::default()).await.expect("update ok");

    let update = connection
        .requests()
        .into_iter()
        .find(|request| request.method == HttpMethod::Put)
        .expect("update sent");
    assert_eq!(update.url, "/sap/bc/adt/ddic/domains/zdo_demo");
    assert_eq!(
        update.headers.get("content-type"),
        Some("application/vnd.sap.adt.domains.v2+xml")
    );
}

#[tokio::test]
async fn error_timestamps_come_from_clock() {
    let connection = ScriptedConnection::new().fail_status(500);

    let err = class_object(&connection).activate(&class_config()).await.expect_err("fails");

    assert_eq!(err.state.errors()[0].timestamp.timestamp(), 1_700_000_000);
}
