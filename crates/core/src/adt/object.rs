//! Object lifecycle orchestrator
//!
//! Drives the remote step sequences of create, update and delete for one
//! object kind, using the connection as its only I/O dependency. Each step's
//! response is recorded in the [`OperationState`] before the next step
//! starts.
//!
//! Lock discipline: once a lock succeeded, unlock is attempted exactly once
//! before the call returns, whatever happened in between.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use adtkit_common::time::{Clock, SystemClock};
use adtkit_domain::constants::{
    ADT_ACTIVATION_PATH, ADT_CHECKRUNS_PATH, ADT_DELETION_CHECK_PATH, ADT_DELETION_DELETE_PATH,
    ADT_TRANSPORT_CHECKS_PATH, DEFAULT_LONG_POLL_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS,
    LONG_POLLING_PARAM,
};
use adtkit_domain::headers::{HEADER_ACCEPT, HEADER_CONTENT_TYPE};
use adtkit_domain::{
    AdtError, AdtObjectConfig, AdtObjectErrorCode, AdtRequest, AdtResponse, CheckVersion,
    ClientSettings, ObjectVersion, OperationError, OperationOptions, OperationState, OperationStep,
    ReadOptions,
};
use tracing::{debug, info, warn};

use super::kinds::{
    escape, ClassKind, DataElementKind, DomainKind, ObjectKind, ProgramKind, UpdatePayload,
};
use super::markers;
use crate::connection::AdtConnection;

const LOCK_ACCEPT: &str = concat!(
    "application/vnd.sap.as+xml;charset=UTF-8;dataname=com.sap.adt.lock.result;q=0.8, ",
    "application/vnd.sap.as+xml;charset=UTF-8;dataname=com.sap.adt.lock.result2;q=0.9",
);
const CHECK_CONTENT_TYPE: &str = "application/vnd.sap.adt.checkobjects+xml";
const CHECK_ACCEPT: &str = "application/vnd.sap.adt.checkmessages+xml";
const DELETION_CHECK_CONTENT_TYPE: &str = "application/vnd.sap.adt.deletion.check.request.v1+xml";
const DELETION_CONTENT_TYPE: &str = "application/vnd.sap.adt.deletion.request.v1+xml";
const TRANSPORT_CHECK_CONTENT_TYPE: &str =
    "application/vnd.sap.as+xml; charset=UTF-8; dataname=com.sap.adt.transport.service.checkData";
const VALIDATION_ACCEPT: &str = "application/vnd.sap.as+xml";
const XML: &str = "application/xml";

/// ABAP classes (`CLAS/OC`), source in `source/main`.
pub type AdtClass = AdtObject<ClassKind>;
/// ABAP programs (`PROG/P`), source in `source/main`.
pub type AdtProgram = AdtObject<ProgramKind>;
/// Dictionary domains (`DOMA/DD`), XML metadata.
pub type AdtDomain = AdtObject<DomainKind>;
/// Dictionary data elements (`DTEL/DE`), XML metadata.
pub type AdtDataElement = AdtObject<DataElementKind>;

/// Failure of a single step, before it is paired with the call's state.
#[derive(Debug)]
struct StepFailure {
    code: AdtObjectErrorCode,
    error: AdtError,
}

impl StepFailure {
    fn into_error(self, state: OperationState) -> OperationError {
        OperationError::new(self.code, self.error, state)
    }
}

type StepResult<T> = Result<T, StepFailure>;

/// High-level operations on one kind of ADT object.
pub struct AdtObject<K: ObjectKind> {
    connection: Arc<dyn AdtConnection>,
    clock: Arc<dyn Clock>,
    request_timeout: Duration,
    long_poll_timeout: Duration,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ObjectKind> Clone for AdtObject<K> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
            clock: Arc::clone(&self.clock),
            request_timeout: self.request_timeout,
            long_poll_timeout: self.long_poll_timeout,
            _kind: PhantomData,
        }
    }
}

impl<K: ObjectKind> AdtObject<K> {
    /// Orchestrator with the default request and long-poll timeouts.
    pub fn new(connection: Arc<dyn AdtConnection>) -> Self {
        Self {
            connection,
            clock: Arc::new(SystemClock),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            long_poll_timeout: Duration::from_millis(DEFAULT_LONG_POLL_TIMEOUT_MS),
            _kind: PhantomData,
        }
    }

    /// Clock used to timestamp recorded errors.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Take both timeouts from loaded client settings.
    #[must_use]
    pub fn with_settings(self, settings: &ClientSettings) -> Self {
        self.with_request_timeout(settings.request_timeout())
            .with_long_poll_timeout(settings.long_poll_timeout())
    }

    /// Timeout of reads without long polling and of single-step operations.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Timeout of reads with `with_long_polling`.
    #[must_use]
    pub fn with_long_poll_timeout(mut self, timeout: Duration) -> Self {
        self.long_poll_timeout = timeout;
        self
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Validate `config` on the server without creating anything.
    pub async fn validate(&self, config: &K::Config) -> Result<OperationState, OperationError> {
        let mut state = OperationState::new();
        match self.validate_step(&mut state, config, self.request_timeout).await {
            Ok(()) => Ok(state),
            Err(failure) => Err(failure.into_error(state)),
        }
    }

    /// validate → create → check(active) → lock → check(inactive) → update
    /// → unlock → check(active) → activate (if `activate_on_create`).
    ///
    /// Without a payload the lock..unlock segment and the check after it are
    /// skipped.
    pub async fn create(
        &self,
        config: &K::Config,
        options: &OperationOptions,
    ) -> Result<OperationState, OperationError> {
        let mut state = OperationState::new();
        let timeout = options.timeout;
        info!(kind = K::LABEL, name = config.name(), "creating object");

        if let Err(failure) = self.require_create_fields(&mut state, config) {
            return Err(failure.into_error(state));
        }
        if let Err(failure) = self.validate_step(&mut state, config, timeout).await {
            return Err(failure.into_error(state));
        }
        if let Err(failure) = self.create_step(&mut state, config, timeout).await {
            return Err(failure.into_error(state));
        }

        let outcome = self.complete_create(&mut state, config, options).await;
        self.finish(state, config, options, outcome).await
    }

    /// lock → check(inactive) → update → unlock → check(active) → activate
    /// (if `activate_on_update`).
    pub async fn update(
        &self,
        config: &K::Config,
        options: &OperationOptions,
    ) -> Result<OperationState, OperationError> {
        let mut state = OperationState::new();
        info!(kind = K::LABEL, name = config.name(), "updating object");

        let Some(payload) = K::update_payload(config, options) else {
            let failure = self.reject_input(
                &mut state,
                OperationStep::Update,
                AdtObjectErrorCode::UpdateFailed,
                format!("no content to update {} {}", K::LABEL, config.name()),
            );
            return Err(failure.into_error(state));
        };

        let outcome = self.complete_update(&mut state, config, options, &payload).await;
        self.finish(state, config, options, outcome).await
    }

    /// Deletion check, then delete if the check reports no blocking errors.
    pub async fn delete(&self, config: &K::Config) -> Result<OperationState, OperationError> {
        let mut state = OperationState::new();
        let timeout = self.request_timeout;
        info!(kind = K::LABEL, name = config.name(), "deleting object");

        if let Err(failure) =
            self.check_step(&mut state, config, CheckVersion::Deletion, timeout).await
        {
            return Err(failure.into_error(state));
        }
        match self.delete_step(&mut state, config, timeout).await {
            Ok(()) => Ok(state),
            Err(failure) => Err(failure.into_error(state)),
        }
    }

    /// Activate the object without locking it.
    pub async fn activate(&self, config: &K::Config) -> Result<OperationState, OperationError> {
        let mut state = OperationState::new();
        match self.activate_step(&mut state, config, self.request_timeout).await {
            Ok(()) => Ok(state),
            Err(failure) => Err(failure.into_error(state)),
        }
    }

    /// Check run against `version` (default: active).
    pub async fn check(
        &self,
        config: &K::Config,
        version: Option<CheckVersion>,
    ) -> Result<OperationState, OperationError> {
        let mut state = OperationState::new();
        let version = version.unwrap_or(CheckVersion::Active);
        match self.check_step(&mut state, config, version, self.request_timeout).await {
            Ok(()) => Ok(state),
            Err(failure) => Err(failure.into_error(state)),
        }
    }

    /// Source (source kinds) or object XML (XML kinds).
    ///
    /// `Ok(None)` when the object does not exist. A 400 means the object
    /// exists but cannot be read yet and surfaces as `ADT_OBJECT_NOT_READY`.
    pub async fn read(
        &self,
        config: &K::Config,
        version: Option<ObjectVersion>,
        options: ReadOptions,
    ) -> Result<Option<OperationState>, OperationError> {
        let mut state = OperationState::new();
        let mut request =
            AdtRequest::get(K::read_uri(config.name())).header(HEADER_ACCEPT, K::read_accept());
        if let Some(version) = version {
            request = request.param("version", version.as_str());
        }

        match self.send(&mut state, OperationStep::Read, self.read_options(request, options)).await
        {
            Ok(_) => Ok(Some(state)),
            Err(error) if error.status() == Some(404) => {
                debug!(kind = K::LABEL, name = config.name(), "object not found");
                Ok(None)
            }
            Err(error) => Err(Self::read_failure(error, state)),
        }
    }

    /// Object characteristics: package, responsible, description.
    pub async fn read_metadata(
        &self,
        config: &K::Config,
        options: ReadOptions,
    ) -> Result<OperationState, OperationError> {
        let mut state = OperationState::new();
        let request = AdtRequest::get(K::object_uri(config.name()))
            .header(HEADER_ACCEPT, K::CONTENT_TYPE);

        let request = self.read_options(request, options);
        match self.send(&mut state, OperationStep::ReadMetadata, request).await {
            Ok(_) => Ok(state),
            Err(error) => Err(Self::read_failure(error, state)),
        }
    }

    /// Transport request information for the object.
    pub async fn read_transport(
        &self,
        config: &K::Config,
        options: ReadOptions,
    ) -> Result<OperationState, OperationError> {
        let mut state = OperationState::new();
        let request = AdtRequest::post(ADT_TRANSPORT_CHECKS_PATH)
            .header(HEADER_CONTENT_TYPE, TRANSPORT_CHECK_CONTENT_TYPE)
            .header(HEADER_ACCEPT, TRANSPORT_CHECK_CONTENT_TYPE)
            .data(transport_check_body::<K>(config));

        let request = self.read_options(request, options);
        match self.send(&mut state, OperationStep::ReadTransport, request).await {
            Ok(_) => Ok(state),
            Err(error) => Err(Self::read_failure(error, state)),
        }
    }

    // ------------------------------------------------------------------
    // Sequences
    // ------------------------------------------------------------------

    async fn complete_create(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        options: &OperationOptions,
    ) -> StepResult<()> {
        let timeout = options.timeout;
        self.check_step(state, config, CheckVersion::Active, timeout).await?;

        match K::update_payload(config, options) {
            Some(payload) => {
                self.locked_update(state, config, &payload, timeout).await?;
                self.check_step(state, config, CheckVersion::Active, timeout).await?;
            }
            None => debug!(kind = K::LABEL, name = config.name(), "no payload, skipping update"),
        }

        if options.activate_on_create {
            self.activate_step(state, config, timeout).await?;
        }
        Ok(())
    }

    async fn complete_update(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        options: &OperationOptions,
        payload: &UpdatePayload,
    ) -> StepResult<()> {
        let timeout = options.timeout;
        self.locked_update(state, config, payload, timeout).await?;
        self.check_step(state, config, CheckVersion::Active, timeout).await?;
        if options.activate_on_update {
            self.activate_step(state, config, timeout).await?;
        }
        Ok(())
    }

    /// lock → check(inactive) → update → unlock.
    ///
    /// The unlock runs whenever the lock succeeded. Its own failure is only
    /// returned when nothing failed before it.
    async fn locked_update(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        payload: &UpdatePayload,
        timeout: Duration,
    ) -> StepResult<()> {
        let handle = self.lock_step(state, config, timeout).await?;

        let outcome = match self.check_step(state, config, CheckVersion::Inactive, timeout).await {
            Ok(()) => self.update_step(state, config, payload, &handle, timeout).await,
            Err(failure) => Err(failure),
        };
        let unlocked = self.unlock_step(state, config, &handle, timeout).await;

        outcome.and(unlocked)
    }

    /// Apply `delete_on_failure` and pair the outcome with the state.
    async fn finish(
        &self,
        mut state: OperationState,
        config: &K::Config,
        options: &OperationOptions,
        outcome: StepResult<()>,
    ) -> Result<OperationState, OperationError> {
        match outcome {
            Ok(()) => {
                info!(
                    kind = K::LABEL,
                    name = config.name(),
                    steps = state.steps().len(),
                    "operation completed"
                );
                Ok(state)
            }
            Err(failure) => {
                if options.delete_on_failure {
                    self.cleanup_delete(&mut state, config, options.timeout).await;
                }
                Err(failure.into_error(state))
            }
        }
    }

    /// Best-effort delete after a failed create or update. The result is
    /// recorded and otherwise ignored.
    async fn cleanup_delete(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        timeout: Duration,
    ) {
        warn!(kind = K::LABEL, name = config.name(), "deleting object after failed operation");
        if self.delete_step(state, config, timeout).await.is_err() {
            warn!(kind = K::LABEL, name = config.name(), "cleanup delete failed");
        }
    }

    // ------------------------------------------------------------------
    // Steps
    // ------------------------------------------------------------------

    fn require_create_fields(
        &self,
        state: &mut OperationState,
        config: &K::Config,
    ) -> StepResult<()> {
        let missing: Vec<&str> = [
            ("name", Some(config.name()).filter(|n| !n.trim().is_empty())),
            ("package", config.package_name()),
            ("description", config.description()),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            return Ok(());
        }
        Err(self.reject_input(
            state,
            OperationStep::Validate,
            AdtObjectErrorCode::ValidationFailed,
            format!("{} create requires {}", K::LABEL, missing.join(", ")),
        ))
    }

    async fn validate_step(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        timeout: Duration,
    ) -> StepResult<()> {
        let step = OperationStep::Validate;
        let code = AdtObjectErrorCode::ValidationFailed;
        if config.name().trim().is_empty() {
            return Err(self.reject_input(state, step, code, format!("{} name is empty", K::LABEL)));
        }

        let mut request = AdtRequest::post(K::VALIDATION_URI)
            .timeout(timeout)
            .header(HEADER_ACCEPT, VALIDATION_ACCEPT)
            .param("objtype", K::OBJECT_TYPE)
            .param("objname", config.name().to_uppercase());
        if let Some(package) = config.package_name() {
            request = request.param("packagename", package.to_uppercase());
        }
        if let Some(description) = config.description() {
            request = request.param("description", description);
        }

        let response = self.step(state, step, code, request).await?;
        if markers::has_error_severity(&response.data) {
            let message = markers::first_message(&response.data)
                .unwrap_or_else(|| format!("{} {} failed validation", K::LABEL, config.name()));
            return Err(self.reject(state, step, code, message));
        }
        Ok(())
    }

    async fn create_step(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        timeout: Duration,
    ) -> StepResult<()> {
        let mut request = AdtRequest::post(K::COLLECTION_URI)
            .timeout(timeout)
            .header(HEADER_CONTENT_TYPE, K::CONTENT_TYPE)
            .header(HEADER_ACCEPT, K::CONTENT_TYPE)
            .data(K::object_xml(config));
        if let Some(transport) = config.transport_request() {
            request = request.param("corrNr", transport);
        }
        self.step(state, OperationStep::Create, AdtObjectErrorCode::CreateFailed, request).await?;
        Ok(())
    }

    async fn check_step(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        version: CheckVersion,
        timeout: Duration,
    ) -> StepResult<()> {
        let step = OperationStep::Check(version);
        let code = AdtObjectErrorCode::CheckFailed;
        let uri = K::object_uri(config.name());

        let request = match version {
            CheckVersion::Deletion => AdtRequest::post(ADT_DELETION_CHECK_PATH)
                .header(HEADER_CONTENT_TYPE, DELETION_CHECK_CONTENT_TYPE)
                .header(HEADER_ACCEPT, XML)
                .data(format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><del:checkRequest xmlns:del="http://www.sap.com/adt/deletion" xmlns:adtcore="http://www.sap.com/adt/core"><del:object adtcore:uri="{}"/></del:checkRequest>"#,
                    escape(&uri)
                )),
            CheckVersion::Active | CheckVersion::Inactive => AdtRequest::post(ADT_CHECKRUNS_PATH)
                .param("reporters", "abapCheckRun")
                .header(HEADER_CONTENT_TYPE, CHECK_CONTENT_TYPE)
                .header(HEADER_ACCEPT, CHECK_ACCEPT)
                .data(format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><chkrun:checkObjectList xmlns:chkrun="http://www.sap.com/adt/checkrun" xmlns:adtcore="http://www.sap.com/adt/core"><chkrun:checkObject adtcore:uri="{}" chkrun:version="{}"/></chkrun:checkObjectList>"#,
                    escape(&uri),
                    version.as_str()
                )),
        };

        let response = self.step(state, step, code, request.timeout(timeout)).await?;
        if markers::has_error_message(&response.data) {
            let message = markers::first_message(&response.data)
                .unwrap_or_else(|| format!("{step} reported errors for {}", config.name()));
            return Err(self.reject(state, step, code, message));
        }
        Ok(())
    }

    async fn lock_step(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        timeout: Duration,
    ) -> StepResult<String> {
        let step = OperationStep::Lock;
        let code = AdtObjectErrorCode::LockFailed;
        let request = AdtRequest::post(K::object_uri(config.name()))
            .timeout(timeout)
            .param("_action", "LOCK")
            .param("accessMode", "MODIFY")
            .header(HEADER_ACCEPT, LOCK_ACCEPT);

        let response = self.step(state, step, code, request).await?;
        match markers::lock_handle(&response.data) {
            Some(handle) => {
                debug!(kind = K::LABEL, name = config.name(), "object locked");
                state.set_lock_handle(handle.clone());
                Ok(handle)
            }
            None => {
                let reason = "lock response carried no lock handle".to_string();
                Err(self.reject(state, step, code, reason))
            }
        }
    }

    async fn update_step(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        payload: &UpdatePayload,
        handle: &str,
        timeout: Duration,
    ) -> StepResult<()> {
        let mut request = AdtRequest::put(payload.uri.clone())
            .timeout(timeout)
            .param("lockHandle", handle)
            .header(HEADER_CONTENT_TYPE, payload.content_type)
            .data(payload.body.clone());
        if let Some(transport) = config.transport_request() {
            request = request.param("corrNr", transport);
        }
        self.step(state, OperationStep::Update, AdtObjectErrorCode::UpdateFailed, request).await?;
        Ok(())
    }

    async fn unlock_step(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        handle: &str,
        timeout: Duration,
    ) -> StepResult<()> {
        let request = AdtRequest::post(K::object_uri(config.name()))
            .timeout(timeout)
            .param("_action", "UNLOCK")
            .param("lockHandle", handle);
        self.step(state, OperationStep::Unlock, AdtObjectErrorCode::UnlockFailed, request).await?;
        debug!(kind = K::LABEL, name = config.name(), "object unlocked");
        Ok(())
    }

    async fn activate_step(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        timeout: Duration,
    ) -> StepResult<()> {
        let step = OperationStep::Activate;
        let code = AdtObjectErrorCode::ActivateFailed;
        let request = AdtRequest::post(ADT_ACTIVATION_PATH)
            .timeout(timeout)
            .param("method", "activate")
            .param("preauditRequested", "true")
            .header(HEADER_CONTENT_TYPE, XML)
            .header(HEADER_ACCEPT, XML)
            .data(format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><adtcore:objectReferences xmlns:adtcore="http://www.sap.com/adt/core"><adtcore:objectReference adtcore:uri="{}" adtcore:name="{}"/></adtcore:objectReferences>"#,
                escape(&K::object_uri(config.name())),
                escape(&config.name().to_uppercase())
            ));

        let response = self.step(state, step, code, request).await?;
        if markers::has_error_message(&response.data) {
            let message = markers::first_message(&response.data)
                .unwrap_or_else(|| format!("activation of {} reported errors", config.name()));
            return Err(self.reject(state, step, code, message));
        }
        Ok(())
    }

    async fn delete_step(
        &self,
        state: &mut OperationState,
        config: &K::Config,
        timeout: Duration,
    ) -> StepResult<()> {
        let step = OperationStep::Delete;
        let code = AdtObjectErrorCode::DeleteFailed;
        let transport = config.transport_request().map_or_else(String::new, |tr| {
            format!("<del:transportNumber>{}</del:transportNumber>", escape(tr))
        });
        let request = AdtRequest::post(ADT_DELETION_DELETE_PATH)
            .timeout(timeout)
            .header(HEADER_CONTENT_TYPE, DELETION_CONTENT_TYPE)
            .header(HEADER_ACCEPT, XML)
            .data(format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><del:deletionRequest xmlns:del="http://www.sap.com/adt/deletion" xmlns:adtcore="http://www.sap.com/adt/core"><del:object adtcore:uri="{}">{transport}</del:object></del:deletionRequest>"#,
                escape(&K::object_uri(config.name()))
            ));

        let response = self.step(state, step, code, request).await?;
        if markers::has_error_message(&response.data) {
            let message = markers::first_message(&response.data)
                .unwrap_or_else(|| format!("deletion of {} reported errors", config.name()));
            return Err(self.reject(state, step, code, message));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Send `request`, recording the response or the error under `step`.
    async fn send(
        &self,
        state: &mut OperationState,
        step: OperationStep,
        request: AdtRequest,
    ) -> Result<AdtResponse, AdtError> {
        debug!(
            kind = K::LABEL,
            %step,
            method = %request.method,
            url = %request.url,
            "sending step"
        );
        match self.connection.make_adt_request(request).await {
            Ok(response) => {
                state.record(step, response.clone());
                Ok(response)
            }
            Err(error) => {
                self.note_error(state, step, error.clone());
                Err(error)
            }
        }
    }

    async fn step(
        &self,
        state: &mut OperationState,
        step: OperationStep,
        code: AdtObjectErrorCode,
        request: AdtRequest,
    ) -> StepResult<AdtResponse> {
        self.send(state, step, request).await.map_err(|error| StepFailure { code, error })
    }

    /// A step whose response arrived but reported a failure.
    fn reject(
        &self,
        state: &mut OperationState,
        step: OperationStep,
        code: AdtObjectErrorCode,
        message: String,
    ) -> StepFailure {
        let error = AdtError::object(code, message);
        self.note_error(state, step, error.clone());
        StepFailure { code, error }
    }

    /// A step refused before any request was sent.
    fn reject_input(
        &self,
        state: &mut OperationState,
        step: OperationStep,
        code: AdtObjectErrorCode,
        message: String,
    ) -> StepFailure {
        let error = AdtError::InvalidInput(message);
        self.note_error(state, step, error.clone());
        StepFailure { code, error }
    }

    fn note_error(&self, state: &mut OperationState, step: OperationStep, error: AdtError) {
        warn!(kind = K::LABEL, %step, code = error.code(), %error, "step failed");
        state.record_error(step, error, self.clock.now_utc());
    }

    fn read_options(&self, request: AdtRequest, options: ReadOptions) -> AdtRequest {
        if options.with_long_polling {
            request.param(LONG_POLLING_PARAM, "true").timeout(self.long_poll_timeout)
        } else {
            request.timeout(self.request_timeout)
        }
    }

    fn read_failure(error: AdtError, state: OperationState) -> OperationError {
        let code = match error.status() {
            Some(404) => AdtObjectErrorCode::ObjectNotFound,
            Some(400) => AdtObjectErrorCode::ObjectNotReady,
            _ => AdtObjectErrorCode::ReadFailed,
        };
        OperationError::new(code, error, state)
    }
}

fn transport_check_body<K: ObjectKind>(config: &K::Config) -> String {
    let object = K::OBJECT_TYPE.split('/').next().unwrap_or(K::OBJECT_TYPE);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><asx:abap xmlns:asx="http://www.sap.com/abapxml" version="1.0"><asx:values><DATA><PGMID>R3TR</PGMID><OBJECT>{object}</OBJECT><OBJECTNAME>{name}</OBJECTNAME><DEVCLASS>{package}</DEVCLASS><OPERATION>I</OPERATION><URI>{uri}</URI></DATA></asx:values></asx:abap>"#,
        name = escape(&config.name().to_uppercase()),
        package = escape(&config.package_name().unwrap_or_default().to_uppercase()),
        uri = escape(&K::object_uri(config.name())),
    )
}
