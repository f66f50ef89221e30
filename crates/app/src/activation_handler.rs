//! Activation handler — brings an application to the foreground, launching
//! it first when it is not registered yet.
//!
//! A registered target is handed to the policy collaborator straight away.
//! A pending target makes the handler send launch signals through apps on the
//! same device, then park the request in the [`CorrelationTable`] until a
//! registration event or the deadline completes it.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use appwake_domain::activation::{ActivationRequest, ActivationResponse, ActivationState, ResultCode};
use appwake_domain::error::AppWakeError;
use appwake_domain::event::HmiEvent;
use appwake_domain::id::{AppId, CorrelationId};
use appwake_domain::registry::{LaunchPlan, Resolution};

use crate::correlation::{AwaitingLaunch, CorrelationTable};
use crate::ports::{ApplicationRegistry, HmiMessenger, PolicyHandler};

/// Decides and correlates activation requests.
pub struct ActivationHandler<R, P, M> {
    registry: R,
    policy: P,
    messenger: M,
    launch_wait: Duration,
    awaiting: Mutex<CorrelationTable>,
}

impl<R, P, M> ActivationHandler<R, P, M>
where
    R: ApplicationRegistry,
    P: PolicyHandler,
    M: HmiMessenger,
{
    /// Create a handler that waits `launch_wait` for a launched app to register.
    pub fn new(registry: R, policy: P, messenger: M, launch_wait: Duration) -> Self {
        Self {
            registry,
            policy,
            messenger,
            launch_wait,
            awaiting: Mutex::new(CorrelationTable::new()),
        }
    }

    /// Run the decision pass for one activation request.
    ///
    /// Returns the state the request is left in: terminal, or
    /// [`ActivationState::AwaitingLaunch`] with the number of signals sent.
    ///
    /// A request reusing the correlation id of one still awaiting launch is
    /// ignored: it gets no response of its own, nothing is sent on its behalf,
    /// and [`ActivationState::AwaitingLaunch`] with zero signals is returned.
    ///
    /// # Errors
    ///
    /// Returns an error when no registry snapshot could be taken. The request
    /// is then answered with [`ResultCode::NotFound`] and not subscribed.
    #[tracing::instrument(skip(self, request), fields(correlation_id = %request.correlation_id, target = request.target))]
    pub async fn activate(&self, request: ActivationRequest) -> Result<ActivationState, AppWakeError> {
        let correlation_id = request.correlation_id;
        if self.lock_awaiting().is_awaiting(correlation_id) {
            tracing::warn!("request with this correlation id is already awaiting launch");
            return Ok(ActivationState::AwaitingLaunch { signals_sent: 0 });
        }

        let snapshot = match self.registry.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.respond(correlation_id, ResultCode::NotFound).await;
                return Err(err);
            }
        };

        let target = match snapshot.resolve(&request) {
            Resolution::Registered(app) => {
                tracing::debug!(app_id = %app.app_id, "application is registered, activating");
                self.delegate(app.app_id, correlation_id).await;
                return Ok(ActivationState::ImmediateDone { app_id: app.app_id });
            }
            Resolution::NotFound => {
                tracing::warn!("application not found within regular or waiting apps");
                self.respond(correlation_id, ResultCode::NotFound).await;
                return Ok(ActivationState::failed(ResultCode::NotFound));
            }
            Resolution::Pending(app) => app,
        };

        let Some(plan) = snapshot.plan_launch(target) else {
            tracing::error!(
                device = %target.device,
                "no foreground or launch-capable application on the same device"
            );
            self.respond(correlation_id, ResultCode::NoAppsRegistered).await;
            return Ok(ActivationState::failed(ResultCode::NoAppsRegistered));
        };

        let now = Instant::now();
        self.lock_awaiting().subscribe(
            correlation_id,
            AwaitingLaunch {
                target: target.hmi_app_id,
                subscribed_at: now,
                deadline: now + self.launch_wait,
            },
        );

        match &plan {
            LaunchPlan::Foreground(signal) => {
                tracing::debug!(relay = %signal.app_id, "sending launch request to foreground application");
            }
            LaunchPlan::Broadcast(signals) => {
                tracing::debug!(
                    relays = signals.len(),
                    "no foreground application, sending launch request to all capable applications"
                );
            }
        }

        let signals = plan.into_signals();
        let signals_sent = signals.len();
        for signal in signals {
            let relay = signal.app_id;
            if let Err(err) = self.messenger.send_launch_app(signal).await {
                tracing::warn!(%err, %relay, "launch signal not delivered");
            }
        }

        Ok(ActivationState::AwaitingLaunch { signals_sent })
    }

    /// Handle an HMI notification.
    ///
    /// A registration whose HMI id resolves to a registered application
    /// completes every request still waiting: the id in the event is the one
    /// assigned at registration and cannot be compared with the id the
    /// requests were made with. Requests are therefore completed with the
    /// registered application even when they targeted a different app or
    /// device. Anything else is ignored.
    ///
    /// Returns each completed request with its [`ActivationState::Completed`]
    /// state.
    ///
    /// # Errors
    ///
    /// Returns an error when no registry snapshot could be taken; waiting
    /// requests stay subscribed.
    #[tracing::instrument(skip(self))]
    pub async fn on_event(
        &self,
        event: &HmiEvent,
    ) -> Result<Vec<(CorrelationId, ActivationState)>, AppWakeError> {
        let Some(registration) = event.as_registration() else {
            return Ok(Vec::new());
        };
        if self.lock_awaiting().is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = self.registry.snapshot().await?;
        let Some(app) = snapshot.application_by_hmi_app(registration.hmi_app_id) else {
            tracing::error!(hmi_app_id = %registration.hmi_app_id, "application not found by HMI app id");
            return Ok(Vec::new());
        };
        let app_id = app.app_id;

        let completed = self.lock_awaiting().unsubscribe_all();
        let mut activated = Vec::with_capacity(completed.len());
        for (correlation_id, entry) in completed {
            tracing::debug!(%correlation_id, target = %entry.target, %app_id, "launched application registered");
            self.delegate(app_id, correlation_id).await;
            activated.push((correlation_id, ActivationState::Completed { app_id }));
        }
        Ok(activated)
    }

    /// Time out one waiting request.
    ///
    /// Returns `false` if the request was not waiting any more.
    #[tracing::instrument(skip(self))]
    pub async fn on_timeout(&self, correlation_id: CorrelationId) -> bool {
        if self.lock_awaiting().unsubscribe(correlation_id).is_none() {
            return false;
        }
        tracing::debug!("launched application did not register in time");
        self.respond(correlation_id, ResultCode::NotRegistered).await;
        true
    }

    /// Time out every waiting request whose deadline has passed at `now`.
    pub async fn expire_overdue(&self, now: Instant) -> Vec<CorrelationId> {
        let expired = self.lock_awaiting().unsubscribe_expired(now);
        for correlation_id in &expired {
            tracing::debug!(%correlation_id, "launched application did not register in time");
            self.respond(*correlation_id, ResultCode::NotRegistered).await;
        }
        expired
    }

    /// Earliest deadline among waiting requests.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.lock_awaiting().next_deadline()
    }

    /// Number of requests waiting for a registration event.
    #[must_use]
    pub fn awaiting_count(&self) -> usize {
        self.lock_awaiting().len()
    }

    async fn delegate(&self, app_id: AppId, correlation_id: CorrelationId) {
        if let Err(err) = self.policy.on_activate_app(app_id, correlation_id).await {
            tracing::warn!(%err, %app_id, %correlation_id, "policy activation failed");
        }
    }

    async fn respond(&self, correlation_id: CorrelationId, result_code: ResultCode) {
        let response = ActivationResponse::new(correlation_id, result_code);
        if let Err(err) = self.messenger.send_response(response).await {
            tracing::warn!(%err, %correlation_id, %result_code, "activation response not delivered");
        }
    }

    fn lock_awaiting(&self) -> MutexGuard<'_, CorrelationTable> {
        self.awaiting.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use appwake_domain::application::{Application, ProtocolVersion};
    use appwake_domain::error::PortError;
    use appwake_domain::event::{LaunchSignal, RegistrationEvent};
    use appwake_domain::id::HmiAppId;
    use appwake_domain::registry::RegistrySnapshot;
    use std::future::Future;
    use std::sync::Arc;

    // ── In-memory registry ─────────────────────────────────────────

    #[derive(Default)]
    pub(crate) struct FakeRegistry {
        registered: Mutex<Vec<Application>>,
        pending: Mutex<Vec<Application>>,
    }

    impl FakeRegistry {
        pub(crate) fn with(registered: Vec<Application>, pending: Vec<Application>) -> Self {
            Self {
                registered: Mutex::new(registered),
                pending: Mutex::new(pending),
            }
        }

        /// Move a pending app to the registered set under a new id.
        pub(crate) fn register(&self, hmi_app_id: u32, app_id: u32) {
            let mut pending = self.pending.lock().unwrap();
            let index = pending
                .iter()
                .position(|app| app.hmi_app_id == HmiAppId::new(hmi_app_id))
                .unwrap();
            let mut app = pending.remove(index);
            app.app_id = AppId::new(app_id);
            app.is_registered = true;
            self.registered.lock().unwrap().push(app);
        }
    }

    impl ApplicationRegistry for FakeRegistry {
        fn snapshot(&self) -> impl Future<Output = Result<RegistrySnapshot, AppWakeError>> + Send {
            let snapshot = RegistrySnapshot::new(
                self.registered.lock().unwrap().clone(),
                self.pending.lock().unwrap().clone(),
            );
            async { Ok(snapshot) }
        }
    }

    pub(crate) struct BrokenRegistry;

    impl ApplicationRegistry for BrokenRegistry {
        fn snapshot(&self) -> impl Future<Output = Result<RegistrySnapshot, AppWakeError>> + Send {
            async { Err(PortError::new("registry", "offline").into()) }
        }
    }

    // ── Recording collaborators ────────────────────────────────────

    #[derive(Default)]
    pub(crate) struct Recorder {
        pub(crate) activations: Mutex<Vec<(AppId, CorrelationId)>>,
        pub(crate) launches: Mutex<Vec<LaunchSignal>>,
        pub(crate) responses: Mutex<Vec<ActivationResponse>>,
        fail_launches: bool,
    }

    impl Recorder {
        pub(crate) fn activations(&self) -> Vec<(AppId, CorrelationId)> {
            self.activations.lock().unwrap().clone()
        }

        pub(crate) fn launches(&self) -> Vec<LaunchSignal> {
            self.launches.lock().unwrap().clone()
        }

        pub(crate) fn responses(&self) -> Vec<ActivationResponse> {
            self.responses.lock().unwrap().clone()
        }
    }

    impl PolicyHandler for Recorder {
        fn on_activate_app(
            &self,
            app_id: AppId,
            correlation_id: CorrelationId,
        ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
            self.activations.lock().unwrap().push((app_id, correlation_id));
            async { Ok(()) }
        }
    }

    impl HmiMessenger for Recorder {
        fn send_launch_app(
            &self,
            signal: LaunchSignal,
        ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
            self.launches.lock().unwrap().push(signal);
            let result = if self.fail_launches {
                Err(PortError::new("transport", "device unreachable").into())
            } else {
                Ok(())
            };
            async { result }
        }

        fn send_response(
            &self,
            response: ActivationResponse,
        ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
            self.responses.lock().unwrap().push(response);
            async { Ok(()) }
        }
    }

    // ── Fixtures ───────────────────────────────────────────────────

    pub(crate) const WAIT: Duration = Duration::from_secs(5);

    pub(crate) type TestHandler = ActivationHandler<Arc<FakeRegistry>, Arc<Recorder>, Arc<Recorder>>;

    pub(crate) fn registered(app_id: u32, device: u64, version: ProtocolVersion, foreground: bool) -> Application {
        Application::builder()
            .app_id(app_id)
            .hmi_app_id(app_id + 1000)
            .device(device)
            .protocol_version(version)
            .registered(true)
            .foreground(foreground)
            .build()
            .unwrap()
    }

    pub(crate) fn pending(hmi_app_id: u32, device: u64) -> Application {
        Application::builder()
            .hmi_app_id(hmi_app_id)
            .device(device)
            .schema_url("radio://launch")
            .package_name("com.example.radio")
            .build()
            .unwrap()
    }

    pub(crate) fn make_handler(
        registered: Vec<Application>,
        pending: Vec<Application>,
    ) -> (TestHandler, Arc<FakeRegistry>, Arc<Recorder>) {
        let registry = Arc::new(FakeRegistry::with(registered, pending));
        let recorder = Arc::new(Recorder::default());
        let handler = ActivationHandler::new(registry.clone(), recorder.clone(), recorder.clone(), WAIT);
        (handler, registry, recorder)
    }

    fn request(correlation_id: u32, target: u32) -> ActivationRequest {
        ActivationRequest::new(CorrelationId::new(correlation_id), target)
    }

    pub(crate) fn registration(hmi_app_id: u32) -> HmiEvent {
        HmiEvent::AppRegistered(RegistrationEvent {
            hmi_app_id: HmiAppId::new(hmi_app_id),
        })
    }

    /// Device 1 has a foreground v4 app 3; app 9 waits to be registered on it.
    fn launch_scenario() -> (TestHandler, Arc<FakeRegistry>, Arc<Recorder>) {
        make_handler(
            vec![registered(3, 1, ProtocolVersion::V4, true)],
            vec![pending(9, 1)],
        )
    }

    // ── Decision pass ──────────────────────────────────────────────

    #[tokio::test]
    async fn should_activate_registered_target_immediately() {
        let (handler, _, recorder) = make_handler(vec![registered(7, 1, ProtocolVersion::V4, false)], vec![]);

        let state = handler.activate(request(11, 7)).await.unwrap();

        assert_eq!(state, ActivationState::ImmediateDone { app_id: AppId::new(7) });
        assert_eq!(recorder.activations(), vec![(AppId::new(7), CorrelationId::new(11))]);
        assert!(recorder.responses().is_empty());
        assert_eq!(handler.awaiting_count(), 0);
    }

    #[tokio::test]
    async fn should_not_consult_pending_registry_when_registered_id_matches() {
        let (handler, _, recorder) = make_handler(
            vec![
                registered(9, 1, ProtocolVersion::V4, false),
                registered(3, 2, ProtocolVersion::V4, true),
            ],
            vec![pending(9, 2)],
        );

        handler.activate(request(11, 9)).await.unwrap();

        assert_eq!(recorder.activations(), vec![(AppId::new(9), CorrelationId::new(11))]);
        assert!(recorder.launches().is_empty());
        assert_eq!(handler.awaiting_count(), 0);
    }

    #[tokio::test]
    async fn should_respond_not_found_when_target_is_unknown() {
        let (handler, _, recorder) = make_handler(vec![registered(7, 1, ProtocolVersion::V4, true)], vec![]);

        let state = handler.activate(request(11, 42)).await.unwrap();

        assert_eq!(state, ActivationState::failed(ResultCode::NotFound));
        assert_eq!(
            recorder.responses(),
            vec![ActivationResponse::new(CorrelationId::new(11), ResultCode::NotFound)]
        );
        assert!(recorder.activations().is_empty());
        assert_eq!(handler.awaiting_count(), 0);
    }

    #[tokio::test]
    async fn should_route_zero_target_into_not_found() {
        let (handler, _, recorder) = launch_scenario();

        let state = handler.activate(request(11, 0)).await.unwrap();

        assert_eq!(state, ActivationState::failed(ResultCode::NotFound));
        assert_eq!(recorder.responses().len(), 1);
    }

    #[tokio::test]
    async fn should_respond_no_apps_registered_without_subscribing() {
        let (handler, _, recorder) = make_handler(
            vec![
                registered(3, 1, ProtocolVersion::V3, true),
                registered(4, 2, ProtocolVersion::V4, true),
            ],
            vec![pending(9, 1)],
        );

        let state = handler.activate(request(11, 9)).await.unwrap();

        assert_eq!(state, ActivationState::failed(ResultCode::NoAppsRegistered));
        assert_eq!(
            recorder.responses(),
            vec![ActivationResponse::new(CorrelationId::new(11), ResultCode::NoAppsRegistered)]
        );
        assert!(recorder.launches().is_empty());
        assert_eq!(handler.awaiting_count(), 0);
        assert!(handler.next_deadline().is_none());
    }

    #[tokio::test]
    async fn should_signal_only_the_foreground_candidate() {
        let (handler, _, recorder) = make_handler(
            vec![
                registered(2, 1, ProtocolVersion::V4, false),
                registered(3, 1, ProtocolVersion::V4, true),
                registered(4, 1, ProtocolVersion::V5, false),
            ],
            vec![pending(9, 1)],
        );

        let state = handler.activate(request(11, 9)).await.unwrap();

        assert_eq!(state, ActivationState::AwaitingLaunch { signals_sent: 1 });
        let launches = recorder.launches();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].app_id, AppId::new(3));
        assert_eq!(launches[0].schema_url, "radio://launch");
        assert_eq!(launches[0].package_name, "com.example.radio");
        assert_eq!(handler.awaiting_count(), 1);
    }

    #[tokio::test]
    async fn should_broadcast_to_all_candidates_without_foreground() {
        let (handler, _, recorder) = make_handler(
            vec![
                registered(2, 1, ProtocolVersion::V4, false),
                registered(3, 1, ProtocolVersion::V4, false),
                registered(4, 1, ProtocolVersion::V5, false),
                registered(5, 2, ProtocolVersion::V4, true),
            ],
            vec![pending(9, 1)],
        );

        let state = handler.activate(request(11, 9)).await.unwrap();

        assert_eq!(state, ActivationState::AwaitingLaunch { signals_sent: 3 });
        let relays: Vec<_> = recorder.launches().iter().map(|s| s.app_id.get()).collect();
        assert_eq!(relays, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn should_keep_waiting_when_launch_signal_delivery_fails() {
        let registry = Arc::new(FakeRegistry::with(
            vec![registered(3, 1, ProtocolVersion::V4, true)],
            vec![pending(9, 1)],
        ));
        let recorder = Arc::new(Recorder {
            fail_launches: true,
            ..Recorder::default()
        });
        let handler = ActivationHandler::new(registry, recorder.clone(), recorder.clone(), WAIT);

        let state = handler.activate(request(11, 9)).await.unwrap();

        assert_eq!(state, ActivationState::AwaitingLaunch { signals_sent: 1 });
        assert!(recorder.responses().is_empty());
        assert_eq!(handler.awaiting_count(), 1);
    }

    #[tokio::test]
    async fn should_answer_not_found_when_registry_is_unavailable() {
        let recorder = Arc::new(Recorder::default());
        let handler = ActivationHandler::new(BrokenRegistry, recorder.clone(), recorder.clone(), WAIT);

        let result = handler.activate(request(11, 9)).await;

        assert!(matches!(result, Err(AppWakeError::Port(_))));
        assert_eq!(
            recorder.responses(),
            vec![ActivationResponse::new(CorrelationId::new(11), ResultCode::NotFound)]
        );
        assert!(recorder.activations().is_empty());
        assert!(recorder.launches().is_empty());
        assert_eq!(handler.awaiting_count(), 0);
    }

    #[tokio::test]
    async fn should_not_resubscribe_duplicate_correlation_id() {
        let (handler, _, recorder) = launch_scenario();

        handler.activate(request(11, 9)).await.unwrap();
        let state = handler.activate(request(11, 9)).await.unwrap();

        assert_eq!(state, ActivationState::AwaitingLaunch { signals_sent: 0 });
        assert_eq!(recorder.launches().len(), 1);
        assert_eq!(handler.awaiting_count(), 1);
    }

    #[tokio::test]
    async fn should_ignore_duplicate_correlation_id_when_it_targets_registered_app() {
        let (handler, registry, recorder) = launch_scenario();

        handler.activate(request(11, 9)).await.unwrap();
        let state = handler.activate(request(11, 3)).await.unwrap();

        assert_eq!(state, ActivationState::AwaitingLaunch { signals_sent: 0 });
        assert!(recorder.activations().is_empty());
        assert!(recorder.responses().is_empty());

        registry.register(9, 9);
        handler.on_event(&registration(9)).await.unwrap();
        assert_eq!(recorder.activations(), vec![(AppId::new(9), CorrelationId::new(11))]);
    }

    // ── Event / timeout correlation ────────────────────────────────

    #[tokio::test]
    async fn should_activate_launched_app_with_id_resolved_from_event() {
        let (handler, registry, recorder) = launch_scenario();
        handler.activate(request(11, 9)).await.unwrap();

        registry.register(9, 9);
        let activated = handler.on_event(&registration(9)).await.unwrap();

        assert_eq!(
            activated,
            vec![(CorrelationId::new(11), ActivationState::Completed { app_id: AppId::new(9) })]
        );
        assert_eq!(recorder.activations(), vec![(AppId::new(9), CorrelationId::new(11))]);
        assert!(recorder.responses().is_empty());
        assert_eq!(handler.awaiting_count(), 0);
    }

    #[tokio::test]
    async fn should_use_new_app_id_when_registration_changes_it() {
        let (handler, registry, recorder) = launch_scenario();
        handler.activate(request(11, 9)).await.unwrap();

        registry.register(9, 65);
        handler.on_event(&registration(9)).await.unwrap();

        assert_eq!(recorder.activations(), vec![(AppId::new(65), CorrelationId::new(11))]);
    }

    #[tokio::test]
    async fn should_complete_waiting_request_when_another_app_registers() {
        let (handler, registry, recorder) = make_handler(
            vec![
                registered(3, 1, ProtocolVersion::V4, true),
                registered(5, 2, ProtocolVersion::V4, true),
            ],
            vec![pending(9, 1), pending(10, 2)],
        );
        handler.activate(request(11, 9)).await.unwrap();

        registry.register(10, 40);
        let activated = handler.on_event(&registration(10)).await.unwrap();

        assert_eq!(
            activated,
            vec![(CorrelationId::new(11), ActivationState::Completed { app_id: AppId::new(40) })]
        );
        assert_eq!(recorder.activations(), vec![(AppId::new(40), CorrelationId::new(11))]);
        assert_eq!(handler.awaiting_count(), 0);
    }

    #[tokio::test]
    async fn should_ignore_event_that_resolves_to_no_application() {
        let (handler, _, recorder) = launch_scenario();
        handler.activate(request(11, 9)).await.unwrap();

        let activated = handler.on_event(&registration(77)).await.unwrap();

        assert!(activated.is_empty());
        assert!(recorder.activations().is_empty());
        assert_eq!(handler.awaiting_count(), 1);
    }

    #[tokio::test]
    async fn should_ignore_non_registration_events() {
        let (handler, registry, recorder) = launch_scenario();
        handler.activate(request(11, 9)).await.unwrap();
        registry.register(9, 9);

        let other = HmiEvent::Other {
            method: "BasicCommunication.OnAppUnregistered".to_string(),
        };
        assert!(handler.on_event(&other).await.unwrap().is_empty());
        assert_eq!(handler.awaiting_count(), 1);
        assert!(recorder.activations().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_late_event_after_timeout() {
        let (handler, registry, recorder) = launch_scenario();
        handler.activate(request(11, 9)).await.unwrap();

        assert!(handler.on_timeout(CorrelationId::new(11)).await);
        registry.register(9, 9);
        let activated = handler.on_event(&registration(9)).await.unwrap();

        assert!(activated.is_empty());
        assert!(recorder.activations().is_empty());
        assert_eq!(
            recorder.responses(),
            vec![ActivationResponse::new(CorrelationId::new(11), ResultCode::NotRegistered)]
        );
    }

    #[tokio::test]
    async fn should_ignore_timeout_after_event_completed_request() {
        let (handler, registry, recorder) = launch_scenario();
        handler.activate(request(11, 9)).await.unwrap();
        registry.register(9, 9);
        handler.on_event(&registration(9)).await.unwrap();

        assert!(!handler.on_timeout(CorrelationId::new(11)).await);
        assert!(recorder.responses().is_empty());
        assert_eq!(recorder.activations().len(), 1);
    }

    #[tokio::test]
    async fn should_not_repeat_activation_for_duplicate_event() {
        let (handler, registry, recorder) = launch_scenario();
        handler.activate(request(11, 9)).await.unwrap();
        registry.register(9, 9);

        handler.on_event(&registration(9)).await.unwrap();
        handler.on_event(&registration(9)).await.unwrap();

        assert_eq!(recorder.activations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_expire_only_requests_past_their_deadline() {
        let (handler, _, recorder) = make_handler(
            vec![registered(3, 1, ProtocolVersion::V4, true)],
            vec![pending(9, 1), pending(10, 1)],
        );
        handler.activate(request(11, 9)).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        handler.activate(request(12, 10)).await.unwrap();

        assert!(handler.expire_overdue(Instant::now()).await.is_empty());

        tokio::time::advance(Duration::from_secs(3)).await;
        let expired = handler.expire_overdue(Instant::now()).await;

        assert_eq!(expired, vec![CorrelationId::new(11)]);
        assert_eq!(
            recorder.responses(),
            vec![ActivationResponse::new(CorrelationId::new(11), ResultCode::NotRegistered)]
        );
        assert_eq!(handler.awaiting_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_start_deadline_at_subscription_time() {
        let (handler, _, _) = launch_scenario();
        let before = Instant::now();

        handler.activate(request(11, 9)).await.unwrap();

        assert_eq!(handler.next_deadline(), Some(before + WAIT));
    }
}
