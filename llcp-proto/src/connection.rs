use std::{collections::VecDeque, sync::Arc};

use thiserror::Error;
use tracing::trace;

use crate::{
    remote::{Env, RemoteRequests},
    AcceptanceTable, ConfigError, ControlPdu, EngineConfig, ErrorCode, Handlers, Incompat,
    Opcode, ProcHandle, ProcedureContext, ProcedureKind, Role, StateType, Transmit,
};

/// Remote control procedure state of a single connection
///
/// Objects of this type are driven by the link layer: every received control PDU that may start
/// a procedure goes to [`Connection::handle_new_procedure`], PDUs and acknowledgements belonging
/// to a running procedure go to [`Connection::handle_rx`] and [`Connection::handle_tx_ack`], and
/// [`Connection::run`] is called whenever a blocked transmission may be able to proceed. The
/// only outcome reported back is a terminal [`Event`], retrieved with [`Connection::poll`].
///
/// The local request engine of the same connection talks to this one through
/// [`Connection::set_incompat`], [`Connection::collision`], [`Connection::pause_remote`] and
/// [`Connection::resume_remote`].
pub struct Connection<T>
where
    T: Transmit,
{
    config: Arc<EngineConfig>,
    role: Role,
    acceptance: AcceptanceTable,
    handlers: Handlers,
    transmit: T,
    remote: RemoteRequests,
    events: VecDeque<Event>,
}

impl<T> Connection<T>
where
    T: Transmit,
{
    /// Set up the engine for a new connection
    ///
    /// Fails if `role` is not supported by the configured features, or if an opcode can resolve
    /// to a procedure kind `handlers` has no handler for.
    pub fn new(
        config: Arc<EngineConfig>,
        role: Role,
        handlers: Handlers,
        transmit: T,
    ) -> Result<Self, ConfigError> {
        if !config.features.supports(role) {
            return Err(ConfigError::RoleNotSupported(role));
        }
        let acceptance = AcceptanceTable::new(&config.features);
        handlers.validate(acceptance.kinds())?;

        Ok(Self {
            remote: RemoteRequests::new(&config),
            config,
            role,
            acceptance,
            handlers,
            transmit,
            events: VecDeque::new(),
        })
    }

    /// Link established
    pub fn connect(&mut self) {
        let (remote, mut env) = self.split();
        remote.connect(&mut env);
    }

    /// Link lost
    ///
    /// Releases every pending remote procedure. Safe to call in any state, any number of times.
    pub fn disconnect(&mut self) {
        let (remote, mut env) = self.split();
        remote.disconnect(&mut env);
    }

    /// Give blocked replies and the active procedure a chance to make progress
    pub fn run(&mut self) {
        let (remote, mut env) = self.split();
        remote.run(&mut env);
    }

    /// The active remote procedure has finished
    pub fn complete(&mut self) {
        let (remote, mut env) = self.split();
        remote.complete(&mut env);
    }

    /// Retry a reply deferred for lack of a transmit buffer, as the arrival of `pdu` would
    ///
    /// `pdu` is neither queued nor delivered to a handler. Has no effect unless an
    /// LL_UNKNOWN_RSP or LL_REJECT_EXT_IND is waiting to be sent.
    pub fn prepare(&mut self, pdu: &ControlPdu) {
        let (remote, mut env) = self.split();
        remote.prepare(&mut env, pdu);
    }

    /// Handle a control PDU that starts a new remote procedure
    ///
    /// Looks up the procedure it starts, queues it, and if nothing else is in progress admits
    /// it and delivers the PDU to its handler.
    pub fn handle_new_procedure(&mut self, pdu: ControlPdu) {
        let kind = self.acceptance.lookup(pdu.opcode(), self.role);
        trace!(opcode = ?pdu.opcode(), ?kind, "new remote procedure");
        let (remote, mut env) = self.split();
        remote.new_procedure(&mut env, kind, pdu);
    }

    /// Deliver a control PDU belonging to the remote procedure `handle`
    ///
    /// Ignored unless `handle` is the admitted procedure at the head of the queue.
    pub fn handle_rx(&mut self, handle: ProcHandle, pdu: &ControlPdu) {
        let (remote, mut env) = self.split();
        remote.rx(&mut env, handle, pdu);
    }

    /// The peer acknowledged `pdu`, sent on behalf of the remote procedure `handle`
    pub fn handle_tx_ack(&mut self, handle: ProcHandle, pdu: &ControlPdu) {
        let (remote, mut env) = self.split();
        remote.tx_ack(&mut env, handle, pdu);
    }

    /// Return events for the link layer
    pub fn poll(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Record how the local engine's pending procedure relates to remote ones
    pub fn set_incompat(&mut self, incompat: Incompat) {
        self.remote.set_incompat(incompat);
    }

    /// The classification last recorded with [`Connection::set_incompat`]
    pub fn incompat(&self) -> Incompat {
        self.remote.incompat()
    }

    /// Whether the admitted remote procedure forces the local one to complete with an error
    pub fn collision(&self) -> bool {
        self.remote.collision()
    }

    /// Hold back transmissions of the remote procedure at the head of the queue
    pub fn pause_remote(&mut self) {
        self.remote.pause();
    }

    /// Undo [`Connection::pause_remote`]
    pub fn resume_remote(&mut self) {
        self.remote.resume();
    }

    /// Record the local command paused in favour of its peer-initiated counterpart
    ///
    /// Only tracked when constant tone extensions are enabled.
    pub fn set_paused_cmd(&mut self, cmd: Option<ProcedureKind>) {
        self.remote.set_paused_cmd(cmd);
    }

    /// The local command recorded with [`Connection::set_paused_cmd`]
    pub fn paused_cmd(&self) -> Option<ProcedureKind> {
        self.remote.paused_cmd()
    }

    /// The remote procedure at the head of the queue
    pub fn peek_remote(&self) -> Option<ProcHandle> {
        self.remote.peek()
    }

    /// Look up a queued remote procedure
    pub fn remote_procedure(&self, handle: ProcHandle) -> Option<&ProcedureContext> {
        self.remote.get(handle)
    }

    /// Queued remote procedures in processing order
    pub fn remote_procedures(&self) -> impl Iterator<Item = (ProcHandle, &ProcedureContext)> + '_ {
        self.remote.iter()
    }

    /// Number of queued remote procedures
    pub fn remote_queue_len(&self) -> usize {
        self.remote.len()
    }

    /// Current state of the remote request engine
    pub fn state(&self) -> StateType {
        self.remote.state()
    }

    /// Whether the engine considers the link down
    pub fn is_disconnected(&self) -> bool {
        self.state() == StateType::Disconnected
    }

    /// Whether the engine is connected with no remote procedure in progress
    pub fn is_idle(&self) -> bool {
        self.state() == StateType::Idle
    }

    /// Local role on this connection
    pub fn role(&self) -> Role {
        self.role
    }

    /// The configuration the connection was created with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The opcode lookup table in use
    pub fn acceptance(&self) -> &AcceptanceTable {
        &self.acceptance
    }

    /// The transmit path
    pub fn transmit(&self) -> &T {
        &self.transmit
    }

    /// Mutable access to the transmit path
    pub fn transmit_mut(&mut self) -> &mut T {
        &mut self.transmit
    }

    fn split(&mut self) -> (&mut RemoteRequests, Env<'_>) {
        let Self {
            role,
            handlers,
            transmit,
            remote,
            events,
            ..
        } = self;
        let env = Env {
            role: *role,
            handlers,
            tx: transmit,
            events,
        };
        (remote, env)
    }
}

/// Events of interest to the link layer owning a [`Connection`]
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// The connection must be dropped; every remote procedure has already been released
    Disconnected(ConnectionError),
}

/// Reasons the remote request engine gives up on a connection
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum ConnectionError {
    /// The peer started an instant-based procedure colliding with a local one in a way the
    /// protocol forbids
    #[error("peer violated the procedure collision rules with {opcode}")]
    ProtocolViolation {
        /// Opcode of the offending PDU
        opcode: Opcode,
    },
}

impl ConnectionError {
    /// HCI reason to report when terminating the link
    pub fn reason(&self) -> ErrorCode {
        match self {
            Self::ProtocolViolation { .. } => ErrorCode::LL_PDU_NOT_ALLOWED,
        }
    }
}
