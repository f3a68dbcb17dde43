use tracing::trace;

#[derive(Debug, Clone)]
pub(super) struct State {
    /// Nested [`StateType`] to enforce all state transitions are done in this module.
    inner: StateType,
}

impl State {
    pub(super) fn disconnected() -> Self {
        Self {
            inner: StateType::Disconnected,
        }
    }

    pub(super) fn as_type(&self) -> StateType {
        self.inner
    }

    /// Moves to idle.
    ///
    /// Every state may return to idle: on connect, once a reply went out, once the active
    /// procedure completed, or when a peer termination aborts everything pending.
    pub(super) fn move_to_idle(&mut self) {
        self.set(StateType::Idle);
    }

    /// Moves to active after a remote procedure was admitted.
    ///
    /// Panics unless idle.
    pub(super) fn move_to_active(&mut self) {
        assert!(
            self.is_idle(),
            "invalid state transition {:?} -> active",
            self.inner
        );
        self.set(StateType::Active);
    }

    /// Moves to terminating after a peer termination was admitted.
    ///
    /// Panics unless idle.
    pub(super) fn move_to_terminating(&mut self) {
        assert!(
            self.is_idle(),
            "invalid state transition {:?} -> terminating",
            self.inner
        );
        self.set(StateType::Terminating);
    }

    /// Moves to rejecting while a reject cannot be sent yet.
    ///
    /// Panics unless idle or already rejecting.
    pub(super) fn move_to_rejecting(&mut self) {
        assert!(
            matches!(self.inner, StateType::Idle | StateType::Rejecting),
            "invalid state transition {:?} -> rejecting",
            self.inner
        );
        self.set(StateType::Rejecting);
    }

    /// Moves to unsupported while an unknown response cannot be sent yet.
    ///
    /// Panics unless idle or already unsupported.
    pub(super) fn move_to_unsupported(&mut self) {
        assert!(
            matches!(self.inner, StateType::Idle | StateType::Unsupported),
            "invalid state transition {:?} -> unsupported",
            self.inner
        );
        self.set(StateType::Unsupported);
    }

    pub(super) fn move_to_disconnected(&mut self) {
        self.set(StateType::Disconnected);
    }

    pub(super) fn is_idle(&self) -> bool {
        matches!(self.inner, StateType::Idle)
    }

    pub(super) fn is_disconnected(&self) -> bool {
        matches!(self.inner, StateType::Disconnected)
    }

    /// Whether an admitted procedure is being run
    pub(super) fn is_running(&self) -> bool {
        matches!(self.inner, StateType::Active | StateType::Terminating)
    }

    fn set(&mut self, to: StateType) {
        if self.inner != to {
            trace!(from = ?self.inner, ?to, "remote request state");
        }
        self.inner = to;
    }
}

/// State of the remote request engine of a connection
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StateType {
    /// The link is down; only a connect is acted upon
    Disconnected,
    /// Connected, with no remote procedure admitted
    Idle,
    /// Waiting to send LL_REJECT_EXT_IND for the head procedure
    Rejecting,
    /// Waiting to send LL_UNKNOWN_RSP for the head procedure
    Unsupported,
    /// Running an admitted remote procedure
    Active,
    /// Running a peer termination, which nothing can pre-empt
    Terminating,
}
