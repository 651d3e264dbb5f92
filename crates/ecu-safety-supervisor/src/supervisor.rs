//! The supervisor context.
//!
//! One [`Supervisor`] owns the diagnostic state machine, the glitch filter,
//! the dispatch queue, the reset budget and the companion link. The state
//! is readable without locking; everything else sits behind one mutex that
//! is never held while a handler or a self-test runs.

use std::fmt;
use std::sync::Arc;

use ecu_safety_codes::{Classification, DeviceId, DiagErrorRecord, ErrorCode, Timestamp};
use ecu_safety_watchdog::{SoftwareCompanion, TriggerVerdict, TriggerWindow, WatchdogCompanion};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::config::{SafetyConfig, SafetyTiming};
use crate::dispatch::{Dispatch, DispatchQueue, ErrorHandler, NotifyHandler, OutputMask, Reaction};
use crate::error::{InitError, InitResult, TaskError, TaskResult};
use crate::glitch::{FilterOutcome, GlitchFilter};
use crate::reset_budget::{
    ResetBudgetManager, ResetDecision, RetainedState, RetainedStore, SharedRamStore,
};
use crate::self_test::SelfTest;
use crate::state::{DiagState, DiagStateMachine, WatchdogState};
use crate::status::{StatusReport, SupervisorMetrics};

/// Saturate a microsecond count into a record's faulty value.
fn saturate_us(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Diagnostic supervisor for the main CPU.
///
/// All methods take `&self`; share it between the application task, driver
/// callbacks and a status reader with an [`Arc`].
///
/// # Example
///
/// ```rust
/// use ecu_safety_supervisor::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let clock = ManualClock::new();
/// let supervisor = Supervisor::new(clock.clone(), SharedRamStore::new());
/// supervisor.init(Some(SafetyConfig::builder().reset_behavior(1).build()?))?;
///
/// for _ in 0..3 {
///     supervisor.task_begin()?;
///     supervisor.task_end()?;
///     clock.advance_ms(10);
/// }
/// assert_eq!(supervisor.diag_state(), DiagState::Main);
/// assert_eq!(supervisor.status().watchdog_state, WatchdogState::Active);
/// # Ok(())
/// # }
/// ```
pub struct Supervisor<C = MonotonicClock, W = SoftwareCompanion, S = SharedRamStore> {
    clock: C,
    diag: DiagStateMachine,
    core: Mutex<Core<W, S>>,
}

struct Core<W, S> {
    companion: W,
    /// `Some` in safety mode.
    config: Option<SafetyConfig>,
    window: Option<TriggerWindow>,
    glitch: GlitchFilter,
    budget: ResetBudgetManager<S>,
    dispatch: DispatchQueue,
    outputs: OutputMask,
    watchdog_state: WatchdogState,
    diag_error: Option<DiagErrorRecord>,
    watchdog_error: Option<DiagErrorRecord>,
    in_cycle: bool,
    reset_pending: bool,
    self_test: Option<Arc<dyn SelfTest>>,
    metrics: SupervisorMetrics,
}

/// A handler call staged outside the lock.
enum HandlerCall {
    Error(Option<Arc<dyn ErrorHandler>>, DiagErrorRecord),
    Notify(Option<Arc<dyn NotifyHandler>>, DiagErrorRecord),
}

impl<C: Clock, S: RetainedStore> Supervisor<C, SoftwareCompanion, S> {
    /// Supervisor with the software companion.
    #[must_use]
    pub fn new(clock: C, store: S) -> Self {
        Self::with_companion(clock, store, SoftwareCompanion::new())
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(MonotonicClock::new(), SharedRamStore::new())
    }
}

impl<C: Clock, W: WatchdogCompanion, S: RetainedStore> Supervisor<C, W, S> {
    /// Supervisor over an explicit companion implementation.
    #[must_use]
    pub fn with_companion(clock: C, store: S, companion: W) -> Self {
        let watchdog_state = companion.state();
        let timing = SafetyTiming::default();
        Self {
            clock,
            diag: DiagStateMachine::new(),
            core: Mutex::new(Core {
                companion,
                config: None,
                window: None,
                glitch: GlitchFilter::new(timing.glitch_filter_time_us()),
                budget: ResetBudgetManager::new(store),
                dispatch: DispatchQueue::new(),
                outputs: OutputMask::default(),
                watchdog_state,
                diag_error: None,
                watchdog_error: None,
                in_cycle: false,
                reset_pending: false,
                self_test: None,
                metrics: SupervisorMetrics::default(),
            }),
        }
    }

    /// Install the startup self-test run by `init` and `restart`.
    #[must_use]
    pub fn with_self_test(mut self, self_test: impl SelfTest + 'static) -> Self {
        self.core.get_mut().self_test = Some(Arc::new(self_test));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Core<W, S>> {
        self.core.lock()
    }

    /// Initialize the supervisor.
    ///
    /// `Some(config)` selects safety mode: the companion is activated with
    /// the configured trigger window and the reset budget applies. `None`
    /// selects non-safety mode: the companion stays in standby and the first
    /// fatal fault latches the safe state.
    ///
    /// # Errors
    ///
    /// - [`InitError::AlreadyInitialized`] on a second call
    /// - [`InitError::Config`] if validation fails; the state stays `Disabled`
    /// - [`InitError::PermanentSafeState`] if the retained latch is set
    /// - [`InitError::SelfTestFailed`] or [`InitError::Companion`] after
    ///   entering the safe state
    pub fn init(&self, config: Option<SafetyConfig>) -> InitResult<()> {
        let now = self.clock.now();
        {
            let mut core = self.lock();
            let state = self.diag.get();
            if state != DiagState::Disabled {
                return Err(InitError::AlreadyInitialized(state));
            }

            let window = config.as_ref().map(SafetyConfig::validate).transpose()?;

            let retained = core.budget.retained();
            if retained.permanent_safe {
                self.diag.force_safe();
                core.diag_error = retained.last_fatal;
                core.watchdog_error = Some(exhausted_record(retained.reset_count, now));
                error!(
                    reset_count = retained.reset_count,
                    "Permanent safe state latched, staying in safe state"
                );
                return Err(InitError::PermanentSafeState {
                    reset_count: retained.reset_count,
                });
            }

            let timing = config.as_ref().map_or_else(SafetyTiming::default, |c| *c.timing());
            core.glitch.set_glitch_time_us(timing.glitch_filter_time_us());
            core.budget
                .set_ceiling(if config.is_some() { timing.reset_behavior } else { 0 });
            core.config = config;
            core.window = window;

            self.diag.transition(DiagState::Init)?;
            info!(
                safety_mode = core.config.is_some(),
                glitch_filter_time_ms = timing.glitch_filter_time_ms,
                reset_behavior = core.budget.ceiling(),
                reset_count = retained.reset_count,
                "Supervisor initializing"
            );
        }
        self.start()
    }

    /// Shared `Init` to `Config` sequence of `init` and `restart`.
    fn start(&self) -> InitResult<()> {
        let self_test = {
            let mut core = self.lock();
            if let Some(window) = core.window
                && let Err(e) = core.companion.activate(window)
            {
                return self.fail_start(core, ErrorCode::WatchdogActivation, e);
            }
            core.self_test.clone()
        };

        if let Some(self_test) = self_test
            && let Err(failure) = self_test.run()
        {
            let class = ecu_safety_codes::classify(
                DeviceId::Core,
                failure.code.raw(),
                failure.faulty_value,
                self.clock.now(),
            );
            error!(
                code = %class.record.code,
                faulty_value = failure.faulty_value,
                "Startup self-test failed"
            );
            self.lock().handle_fatal(&self.diag, class.record);
            self.drain();
            return Err(InitError::SelfTestFailed(class.record.code));
        }

        {
            let mut core = self.lock();
            self.diag.transition(DiagState::Config)?;
            if core.window.is_some()
                && let Err(e) = core.companion.begin_diagnostic()
            {
                return self.fail_start(core, ErrorCode::WatchdogActivation, e);
            }
            let now = self.clock.now();
            core.refresh_watchdog(&self.diag, now);
            info!(
                watchdog_state = %core.watchdog_state,
                "Self-tests passed, entering configuration phase"
            );
        }
        self.drain();
        Ok(())
    }

    fn fail_start(
        &self,
        mut core: MutexGuard<'_, Core<W, S>>,
        code: ErrorCode,
        cause: ecu_safety_watchdog::CompanionError,
    ) -> InitResult<()> {
        error!(error = %cause, "Companion refused activation");
        let record = DiagErrorRecord::new(code, DeviceId::Watchdog, 0, self.clock.now());
        core.handle_fatal(&self.diag, record);
        drop(core);
        self.drain();
        Err(InitError::Companion(cause))
    }

    /// Re-run startup after a permitted watchdog reset.
    ///
    /// The companion is power cycled and the volatile state cleared; the
    /// retained reset counter carries over.
    ///
    /// # Errors
    ///
    /// - [`InitError::PermanentSafeState`] if the latch is set
    /// - [`InitError::ResetNotPermitted`] unless a fatal fault granted a reset
    /// - any startup error from [`Supervisor::init`]
    pub fn restart(&self) -> InitResult<()> {
        {
            let mut core = self.lock();
            let retained = core.budget.retained();
            if retained.permanent_safe {
                return Err(InitError::PermanentSafeState {
                    reset_count: retained.reset_count,
                });
            }
            let state = self.diag.get();
            if state != DiagState::Safe || !core.reset_pending {
                return Err(InitError::ResetNotPermitted(state));
            }

            core.reset_pending = false;
            core.companion.power_cycle();
            core.watchdog_state = core.companion.state();
            core.glitch.clear();
            core.dispatch.clear();
            core.outputs.clear();
            core.diag_error = None;
            core.watchdog_error = None;
            core.in_cycle = false;
            core.metrics.record_restart();

            self.diag.transition(DiagState::Init)?;
            info!(reset_count = retained.reset_count, "Watchdog reset, restarting");
        }
        self.start()
    }

    /// Open a task cycle.
    ///
    /// The first call after `init` completes the configuration phase. In
    /// safety mode every call triggers the companion.
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotInitialized`] before `init`
    /// - [`TaskError::SafeState`] in, or on entry to, the safe state
    /// - [`TaskError::CycleViolation`] on a nested call
    /// - [`TaskError::TriggerViolation`] if the trigger fell outside the window
    pub fn task_begin(&self) -> TaskResult<()> {
        let now = self.clock.now();
        let result = {
            let mut core = self.lock();
            match self.diag.get() {
                DiagState::Disabled => return Err(TaskError::NotInitialized),
                DiagState::Safe => return Err(TaskError::SafeState),
                DiagState::Init | DiagState::Config | DiagState::Main => {}
            }
            if core.in_cycle {
                error!("task_begin called inside an open task cycle");
                core.handle_fatal(&self.diag, cycle_violation(0, now));
                Err(TaskError::CycleViolation)
            } else {
                core.in_cycle = true;
                core.promote_expired(&self.diag, now);
                core.begin_cycle(&self.diag, now)
            }
        };
        self.drain();
        result
    }

    /// Close the task cycle opened by [`Supervisor::task_begin`].
    ///
    /// # Errors
    ///
    /// - [`TaskError::NotInitialized`] before `init`
    /// - [`TaskError::SafeState`] in the safe state
    /// - [`TaskError::CycleViolation`] without an open cycle
    pub fn task_end(&self) -> TaskResult<()> {
        let now = self.clock.now();
        let result = {
            let mut core = self.lock();
            let state = self.diag.get();
            if state == DiagState::Disabled {
                return Err(TaskError::NotInitialized);
            }
            if core.in_cycle {
                core.in_cycle = false;
                if state == DiagState::Safe {
                    Err(TaskError::SafeState)
                } else {
                    Ok(())
                }
            } else if state == DiagState::Safe {
                Err(TaskError::SafeState)
            } else {
                error!("task_end called without an open task cycle");
                core.handle_fatal(&self.diag, cycle_violation(1, now));
                Err(TaskError::CycleViolation)
            }
        };
        self.drain();
        result
    }

    /// Report a fault from a driver.
    ///
    /// Accepted in every state. The report is classified, debounced if
    /// temporary and handled; handlers run before this returns unless a
    /// handler is already running.
    ///
    /// A fatal fault before [`Supervisor::init`] enters the safe state and
    /// is kept as the last fatal record, but does not consume the reset
    /// budget or set the permanent-safe latch.
    pub fn report_fault(&self, device: DeviceId, raw_code: u8, faulty_value: u32) {
        let class = ecu_safety_codes::classify(device, raw_code, faulty_value, self.clock.now());
        self.report(class);
    }

    /// Report a fault naming the device by raw number.
    pub fn report_fault_raw(&self, device: u8, raw_code: u8, faulty_value: u32) {
        let class = ecu_safety_codes::classify_raw(device, raw_code, faulty_value, self.clock.now());
        self.report(class);
    }

    fn report(&self, class: Classification) {
        let now = class.record.first_seen;
        {
            let mut core = self.lock();
            core.metrics.record_report();
            core.observe(&self.diag, class, now);
            core.promote_expired(&self.diag, now);
        }
        self.drain();
    }

    /// Snapshot of the supervisor state.
    ///
    /// Also promotes expired temporary faults, checks the trigger deadline,
    /// reads the companion and cross-checks both state machines.
    pub fn status(&self) -> StatusReport {
        let now = self.clock.now();
        {
            let mut core = self.lock();
            core.promote_expired(&self.diag, now);
            if self.diag.get() != DiagState::Disabled {
                core.check_deadline(&self.diag, now);
                core.refresh_watchdog(&self.diag, now);
                core.cross_check(&self.diag, now);
            }
        }
        self.drain();
        let core = self.lock();
        StatusReport {
            diag_state: self.diag.get(),
            watchdog_state: core.watchdog_state,
            diag_error: core.diag_error,
            watchdog_error: core.watchdog_error,
            reset_count: core.budget.retained().reset_count,
        }
    }

    /// Returns true in the safe state. Lock-free.
    #[must_use]
    pub fn is_safe_state(&self) -> bool {
        self.diag.is_safe()
    }

    /// Current diagnostic state. Lock-free.
    #[must_use]
    pub fn diag_state(&self) -> DiagState {
        self.diag.get()
    }

    /// Returns true if `device` may drive its output.
    ///
    /// False for non-output devices, in the safe state, and for outputs
    /// disabled by an error handler reaction.
    #[must_use]
    pub fn is_output_enabled(&self, device: DeviceId) -> bool {
        device.is_output() && !self.diag.is_safe() && !self.lock().outputs.is_disabled(device)
    }

    /// Shutoff groups disabled by error handler reactions, one bit per group.
    #[must_use]
    pub fn disabled_shutoff_groups(&self) -> u8 {
        self.lock().outputs.shutoff_groups()
    }

    /// Trigger window in use, `None` in non-safety mode.
    #[must_use]
    pub fn trigger_window(&self) -> Option<TriggerWindow> {
        self.lock().window
    }

    /// Retained reset state.
    #[must_use]
    pub fn retained(&self) -> RetainedState {
        self.lock().budget.retained()
    }

    /// Supervisor counters.
    #[must_use]
    pub fn metrics(&self) -> SupervisorMetrics {
        self.lock().metrics
    }

    /// Run `f` against the companion.
    ///
    /// `f` runs under the supervisor lock and must not call back into the
    /// supervisor.
    pub fn inspect_companion<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        f(&self.lock().companion)
    }

    /// Run staged handler calls until the queue is empty.
    ///
    /// Returns at once if a handler is already running, further up the
    /// stack or on another thread; that invocation drains what is queued
    /// meanwhile.
    fn drain(&self) {
        loop {
            let call = {
                let mut core = self.lock();
                let Some(dispatch) = core.dispatch.begin() else {
                    return;
                };
                let handlers = core.config.as_ref();
                match dispatch {
                    Dispatch::Error(record) => {
                        HandlerCall::Error(handlers.and_then(|c| c.error_handler().cloned()), record)
                    }
                    Dispatch::Notify(record) => HandlerCall::Notify(
                        handlers.and_then(|c| c.notify_handler().cloned()),
                        record,
                    ),
                }
            };

            let diag = self.diag.get();
            let watchdog = self.lock().watchdog_state;
            let reaction = match call {
                HandlerCall::Error(handler, record) => {
                    let reaction = handler.map_or(Reaction::NO_ACTION, |h| {
                        h.on_error(diag, watchdog, &record)
                    });
                    Some((record, reaction))
                }
                HandlerCall::Notify(handler, record) => {
                    if let Some(h) = handler {
                        h.on_notify(diag, watchdog, &record);
                    }
                    None
                }
            };

            let now = self.clock.now();
            let mut core = self.lock();
            core.dispatch.finish();
            match reaction {
                Some((record, reaction)) => {
                    core.metrics.record_error_dispatch();
                    core.apply_reaction(&self.diag, record, reaction, now);
                }
                None => core.metrics.record_notify_dispatch(),
            }
        }
    }
}

impl<C, W, S> fmt::Debug for Supervisor<C, W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("diag_state", &self.diag.get())
            .finish_non_exhaustive()
    }
}

fn exhausted_record(reset_count: u8, now: Timestamp) -> DiagErrorRecord {
    DiagErrorRecord::new(
        ErrorCode::WatchdogResetBudgetExhausted,
        DeviceId::Watchdog,
        u32::from(reset_count),
        now,
    )
}

/// `faulty_value` is 0 for a nested begin, 1 for an unmatched end.
fn cycle_violation(faulty_value: u32, now: Timestamp) -> DiagErrorRecord {
    DiagErrorRecord::new(
        ErrorCode::TaskCycleViolation,
        DeviceId::Application,
        faulty_value,
        now,
    )
}

impl<W: WatchdogCompanion, S: RetainedStore> Core<W, S> {
    fn safety_mode(&self) -> bool {
        self.config.is_some()
    }

    fn observe(&mut self, diag: &DiagStateMachine, class: Classification, now: Timestamp) {
        match self.glitch.observe(class, now) {
            FilterOutcome::Immediate(record) => self.handle(diag, record),
            FilterOutcome::Promoted(record) => {
                self.metrics.record_promoted();
                self.handle(diag, record);
            }
            FilterOutcome::Discarded(_) => self.metrics.record_discarded(),
            FilterOutcome::Pending | FilterOutcome::Idle => {}
        }
    }

    fn promote_expired(&mut self, diag: &DiagStateMachine, now: Timestamp) {
        while let Some(record) = self.glitch.next_expired(now) {
            debug!(device = %record.device, code = %record.code, "Temporary fault promoted");
            self.metrics.record_promoted();
            self.handle(diag, record);
        }
    }

    fn handle(&mut self, diag: &DiagStateMachine, record: DiagErrorRecord) {
        if record.is_fatal() {
            self.handle_fatal(diag, record);
        } else {
            self.handle_non_fatal(diag, record);
        }
    }

    fn handle_non_fatal(&mut self, diag: &DiagStateMachine, record: DiagErrorRecord) {
        warn!(
            device = %record.device,
            code = %record.code,
            faulty_value = record.faulty_value,
            "Non-fatal fault"
        );
        if !diag.is_safe() {
            self.store_error(record);
        }
        self.enqueue(Dispatch::Error(record));
    }

    fn handle_fatal(&mut self, diag: &DiagStateMachine, record: DiagErrorRecord) {
        let record = if self.dispatch.is_handler_thread() {
            if !self.dispatch.claim_recursion() {
                self.metrics.record_fatal();
                debug!(code = %record.code, "Fatal fault inside handler already reported");
                return;
            }
            error!(
                device = %record.device,
                code = %record.code,
                "Fatal fault raised inside a handler"
            );
            DiagErrorRecord::new(
                ErrorCode::ErrorCallbackRecursion,
                DeviceId::Application,
                u32::from(record.code.raw()),
                record.first_seen,
            )
        } else {
            record
        };
        self.metrics.record_fatal();

        let Some(previous) = diag.force_safe() else {
            debug!(code = %record.code, "Fatal fault while already in safe state");
            return;
        };
        error!(
            device = %record.device,
            code = %record.code,
            faulty_value = record.faulty_value,
            from = %previous,
            "Fatal fault, entering safe state"
        );
        self.store_error(record);

        if let Err(e) = self.companion.trigger_safe_state() {
            debug!(error = %e, "Companion already in safe state");
        }
        if let Ok(state) = self.companion.query_state() {
            self.watchdog_state = state;
        }

        if previous == DiagState::Disabled {
            // No configuration yet: the reset budget is not consumed.
            self.budget.note_fatal(record);
            self.enqueue(Dispatch::Notify(record));
            return;
        }

        match self.budget.on_fatal(record) {
            ResetDecision::Permitted { reset_count } => {
                self.reset_pending = true;
                warn!(reset_count, "Watchdog reset permitted");
            }
            ResetDecision::Exhausted { reset_count } => {
                error!(reset_count, "Reset budget exhausted, latching permanent safe state");
                self.watchdog_error
                    .get_or_insert(exhausted_record(reset_count, record.first_seen));
            }
            ResetDecision::Latched => {
                error!("Permanent safe state already latched");
            }
        }

        self.enqueue(Dispatch::Notify(record));
    }

    fn store_error(&mut self, record: DiagErrorRecord) {
        if record.device == DeviceId::Watchdog {
            self.watchdog_error = Some(record);
        } else {
            self.diag_error = Some(record);
        }
    }

    fn enqueue(&mut self, dispatch: Dispatch) {
        if let Err(dropped) = self.dispatch.push(dispatch) {
            self.metrics.record_dropped();
            warn!(
                code = %dropped.record().code,
                device = %dropped.record().device,
                "Dispatch queue full, handler call dropped"
            );
        }
    }

    fn apply_reaction(
        &mut self,
        diag: &DiagStateMachine,
        record: DiagErrorRecord,
        reaction: Reaction,
        now: Timestamp,
    ) {
        let applied = reaction.normalized();
        if applied != reaction {
            warn!(
                reaction = reaction.bits(),
                "Invalid handler reaction, treating as safe state request"
            );
        }
        if applied.contains(Reaction::SAFE_STATE) {
            let request = DiagErrorRecord::new(
                ErrorCode::ApplicationSafeState,
                DeviceId::Application,
                u32::from(record.code.raw()),
                now,
            );
            self.handle_fatal(diag, request);
        } else if !applied.is_empty() {
            info!(
                device = %record.device,
                reaction = applied.bits(),
                "Outputs disabled by error handler"
            );
            self.outputs.apply(record.device, applied);
        }
    }

    fn begin_cycle(&mut self, diag: &DiagStateMachine, now: Timestamp) -> TaskResult<()> {
        if diag.get() == DiagState::Config {
            match diag.transition(DiagState::Main) {
                Ok(_) => info!("Configuration complete, entering main operation"),
                Err(e) => warn!(error = %e, "Main transition refused"),
            }
        }

        let mut result = Ok(());
        if self.safety_mode() && !diag.is_safe() {
            match self.companion.trigger(now) {
                Ok(TriggerVerdict::Opened) => {
                    info!(watchdog_state = %self.companion.state(), "Trigger window opened");
                }
                Ok(TriggerVerdict::Accepted { .. }) => self.metrics.record_trigger(),
                Ok(verdict) => {
                    let elapsed_us = verdict.elapsed_us().unwrap_or_default();
                    warn!(elapsed_us, ?verdict, "Watchdog trigger outside window");
                    let record = DiagErrorRecord::new(
                        ErrorCode::WatchdogTriggerFailure,
                        DeviceId::Watchdog,
                        saturate_us(elapsed_us),
                        now,
                    );
                    self.handle_fatal(diag, record);
                    result = Err(TaskError::TriggerViolation { elapsed_us });
                }
                Err(e) => {
                    warn!(error = %e, "Companion rejected trigger");
                    let record = DiagErrorRecord::new(
                        ErrorCode::WatchdogTriggerFailure,
                        DeviceId::Watchdog,
                        0,
                        now,
                    );
                    self.handle_fatal(diag, record);
                }
            }
        }

        self.refresh_watchdog(diag, now);
        self.cross_check(diag, now);

        match result {
            Ok(()) if diag.is_safe() => Err(TaskError::SafeState),
            other => other,
        }
    }

    fn check_deadline(&mut self, diag: &DiagStateMachine, now: Timestamp) {
        if !self.safety_mode() || diag.is_safe() {
            return;
        }
        if let Some(elapsed_us) = self.companion.check_deadline(now) {
            warn!(elapsed_us, "Watchdog trigger missed");
            let record = DiagErrorRecord::new(
                ErrorCode::WatchdogTriggerFailure,
                DeviceId::Watchdog,
                saturate_us(elapsed_us),
                now,
            );
            self.handle_fatal(diag, record);
        }
    }

    fn refresh_watchdog(&mut self, diag: &DiagStateMachine, now: Timestamp) {
        match self.companion.query_state() {
            Ok(state) => self.watchdog_state = state,
            Err(e) => {
                if self.watchdog_state != WatchdogState::Unknown {
                    warn!(error = %e, "Companion status unavailable");
                }
                self.watchdog_state = WatchdogState::Unknown;
                let record = DiagErrorRecord::new(
                    ErrorCode::WatchdogStatusUnavailable,
                    DeviceId::Watchdog,
                    0,
                    now,
                );
                self.handle_fatal(diag, record);
            }
        }
    }

    /// Compare the diagnostic state with the companion state.
    fn cross_check(&mut self, diag: &DiagStateMachine, now: Timestamp) {
        let state = diag.get();
        let watchdog = self.watchdog_state;
        if matches!(state, DiagState::Disabled | DiagState::Safe)
            || watchdog == WatchdogState::Unknown
        {
            return;
        }

        let code = if self.safety_mode() {
            match (state, watchdog) {
                (_, WatchdogState::Safe)
                | (DiagState::Main, WatchdogState::Standby | WatchdogState::Reset) => {
                    Some(ErrorCode::InvalidWatchdogState)
                }
                (DiagState::Init | DiagState::Config, WatchdogState::Active) => {
                    Some(ErrorCode::InvalidDiagState)
                }
                _ => None,
            }
        } else if watchdog != WatchdogState::Standby {
            Some(ErrorCode::InvalidWatchdogState)
        } else {
            None
        };

        if let Some(code) = code {
            error!(diag_state = %state, watchdog_state = %watchdog, "State cross-check failed");
            let value = (u32::from(state.to_raw()) << 8) | watchdog.to_raw();
            let record = DiagErrorRecord::new(code, DeviceId::Application, value, now);
            self.handle_fatal(diag, record);
        }
    }
}
