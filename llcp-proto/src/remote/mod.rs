use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::{
    collision::{self, Admission},
    queue::ProcQueue,
    ConnectionError, ControlPdu, EngineConfig, ErrorCode, Event, Handlers, Incompat, Link,
    ProcHandle, ProcedureContext, ProcedureKind, Role, Step, Transmit,
};

mod state;
use state::State;
pub use state::StateType;

/// Parts of the connection the engine acts upon while handling an event
pub(crate) struct Env<'a> {
    pub(crate) role: Role,
    pub(crate) handlers: &'a mut Handlers,
    pub(crate) tx: &'a mut dyn Transmit,
    pub(crate) events: &'a mut VecDeque<Event>,
}

impl Env<'_> {
    fn link(&mut self) -> Link<'_> {
        Link::new(self.role, &mut *self.tx)
    }
}

#[derive(Debug, Copy, Clone)]
enum Input<'a> {
    /// A control PDU that may start a procedure was received
    Prepare(&'a ControlPdu),
    /// Periodic opportunity to make progress
    Run,
    /// The active procedure finished
    Complete,
    /// Link established
    Connect,
    /// Link lost
    Disconnect,
}

/// The replies the engine encodes itself
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Reply {
    Reject,
    UnknownRsp,
}

/// Remote request engine: admission, collision handling and teardown of the procedures the peer
/// starts on one connection
#[derive(Debug)]
pub(crate) struct RemoteRequests {
    state: State,
    queue: ProcQueue,
    /// Classification of the local engine's pending procedure, maintained by the local engine
    incompat: Incompat,
    /// Set while the admitted remote procedure forces the local one to complete with an error
    collision: bool,
    /// Local command paused for mutual exclusion with its peer-initiated counterpart
    paused_cmd: Option<ProcedureKind>,
    track_paused_cmd: bool,
}

impl RemoteRequests {
    pub(crate) fn new(config: &EngineConfig) -> Self {
        Self {
            state: State::disconnected(),
            queue: ProcQueue::new(config.max_pending_procedures),
            incompat: Incompat::NoCollision,
            collision: false,
            paused_cmd: None,
            track_paused_cmd: config.features.tracks_paused_cmd(),
        }
    }

    pub(crate) fn prepare(&mut self, env: &mut Env<'_>, pdu: &ControlPdu) {
        self.handle(env, Input::Prepare(pdu));
    }

    pub(crate) fn run(&mut self, env: &mut Env<'_>) {
        self.handle(env, Input::Run);
    }

    pub(crate) fn complete(&mut self, env: &mut Env<'_>) {
        self.handle(env, Input::Complete);
    }

    pub(crate) fn connect(&mut self, env: &mut Env<'_>) {
        self.handle(env, Input::Connect);
    }

    pub(crate) fn disconnect(&mut self, env: &mut Env<'_>) {
        self.handle(env, Input::Disconnect);
    }

    /// Queue a procedure the peer just started with `pdu` and, if nothing else is in progress,
    /// admit it and hand it the PDU
    pub(crate) fn new_procedure(
        &mut self,
        env: &mut Env<'_>,
        kind: ProcedureKind,
        pdu: ControlPdu,
    ) {
        if self.state.is_disconnected() {
            debug!(opcode = ?pdu.opcode(), "dropping control PDU on disconnected link");
            return;
        }

        if kind == ProcedureKind::Terminate {
            // Peer termination overrides everything pending
            self.abort();
        }

        let Some(handle) = self.queue.push(kind, pdu.clone()) else {
            warn!(opcode = ?pdu.opcode(), ?kind, "no free procedure context, dropping control PDU");
            return;
        };
        trace!(?kind, ?handle, pending = self.queue.len(), "remote procedure queued");

        if self.state.is_idle() {
            self.admit_backlog(env);
        } else {
            // A running procedure is not interrupted, but a deferred reply gets another try
            self.handle(env, Input::Prepare(&pdu));
        }
    }

    /// Deliver a received PDU to the procedure `handle`
    pub(crate) fn rx(&mut self, env: &mut Env<'_>, handle: ProcHandle, pdu: &ControlPdu) {
        self.dispatch_rx(env, handle, pdu);
        self.admit_backlog(env);
    }

    /// Deliver the acknowledgement of a PDU sent on behalf of `handle`
    pub(crate) fn tx_ack(&mut self, env: &mut Env<'_>, handle: ProcHandle, pdu: &ControlPdu) {
        if !self.is_running_head(handle) {
            debug!(?handle, "tx ack for procedure that is not running");
            return;
        }
        let Some(ctx) = self.queue.get_mut(handle) else {
            return;
        };
        let mut link = Link::new(env.role, &mut *env.tx);
        let step = env.handlers.tx_ack(&mut link, ctx, pdu);
        self.on_step(env, step);
        self.check_done();
        self.admit_backlog(env);
    }

    pub(crate) fn set_incompat(&mut self, incompat: Incompat) {
        self.incompat = incompat;
    }

    pub(crate) fn incompat(&self) -> Incompat {
        self.incompat
    }

    pub(crate) fn collision(&self) -> bool {
        self.collision
    }

    /// Hold back transmissions of the head procedure
    pub(crate) fn pause(&mut self) {
        if let Some(ctx) = self.queue.head_mut() {
            ctx.paused = true;
        }
    }

    pub(crate) fn resume(&mut self) {
        if let Some(ctx) = self.queue.head_mut() {
            ctx.paused = false;
        }
    }

    pub(crate) fn set_paused_cmd(&mut self, cmd: Option<ProcedureKind>) {
        if self.track_paused_cmd {
            self.paused_cmd = cmd;
        }
    }

    pub(crate) fn paused_cmd(&self) -> Option<ProcedureKind> {
        self.paused_cmd
    }

    pub(crate) fn peek(&self) -> Option<ProcHandle> {
        self.queue.peek()
    }

    pub(crate) fn get(&self, handle: ProcHandle) -> Option<&ProcedureContext> {
        self.queue.get(handle)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ProcHandle, &ProcedureContext)> + '_ {
        self.queue.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn state(&self) -> StateType {
        self.state.as_type()
    }

    /// Feed one event through the state machine, then release a finished head procedure and
    /// admit whatever is waiting
    fn handle(&mut self, env: &mut Env<'_>, input: Input<'_>) {
        self.execute(env, input);
        self.check_done();
        self.admit_backlog(env);
    }

    fn execute(&mut self, env: &mut Env<'_>, input: Input<'_>) {
        trace!(state = ?self.state.as_type(), ?input, "remote request event");
        match self.state.as_type() {
            StateType::Disconnected => match input {
                Input::Connect => self.state.move_to_idle(),
                // Nothing can be queued while disconnected; draining keeps this idempotent
                Input::Disconnect => self.act_disconnect(),
                Input::Prepare(_) | Input::Run | Input::Complete => {}
            },
            StateType::Idle => match input {
                Input::Prepare(pdu) => self.act_admit(env, pdu),
                Input::Disconnect => self.act_disconnect(),
                Input::Run | Input::Complete | Input::Connect => {}
            },
            StateType::Rejecting => match input {
                Input::Disconnect => self.act_disconnect(),
                _ => self.act_reply(env, Reply::Reject),
            },
            StateType::Unsupported => match input {
                Input::Disconnect => self.act_disconnect(),
                _ => self.act_reply(env, Reply::UnknownRsp),
            },
            StateType::Active | StateType::Terminating => match input {
                Input::Run => self.act_run(env),
                Input::Complete => {
                    self.act_complete();
                    self.state.move_to_idle();
                }
                Input::Disconnect => self.act_disconnect(),
                Input::Prepare(_) | Input::Connect => {}
            },
        }
    }

    /// Decide what to do with the procedure at the head of the queue, started by `pdu`
    fn act_admit(&mut self, env: &mut Env<'_>, pdu: &ControlPdu) {
        let Some(ctx) = self.queue.head_mut() else {
            return;
        };
        let opcode = pdu.opcode();
        match ctx.kind() {
            ProcedureKind::Terminate => {
                self.state.move_to_terminating();
                self.act_run(env);
            }
            ProcedureKind::Unknown => {
                debug!(?opcode, "unsupported control PDU");
                ctx.unknown_response_opcode = Some(opcode);
                self.act_reply(env, Reply::UnknownRsp);
            }
            kind => match collision::admit(kind, env.role, self.incompat) {
                Admission::Run { collision } => {
                    if let Some(collision) = collision {
                        self.collision = collision;
                    }
                    self.state.move_to_active();
                    self.act_run(env);
                }
                Admission::Reject => {
                    debug!(?opcode, ?kind, "rejecting colliding remote procedure");
                    ctx.reject_opcode = Some(opcode);
                    self.act_reply(env, Reply::Reject);
                }
                Admission::ProtocolViolation => self.act_protocol_violation(env, pdu),
            },
        }
    }

    fn act_run(&mut self, env: &mut Env<'_>) {
        let Some(ctx) = self.queue.head_mut() else {
            return;
        };
        let mut link = Link::new(env.role, &mut *env.tx);
        let step = env.handlers.run(&mut link, ctx);
        self.on_step(env, step);
    }

    /// Send `reply` for the head procedure, or wait in the matching state until it can be sent
    fn act_reply(&mut self, env: &mut Env<'_>, reply: Reply) {
        let Some(ctx) = self.queue.head_mut() else {
            self.state.move_to_idle();
            return;
        };
        let fallback = ctx.initiating_pdu().opcode();
        let pdu = match reply {
            Reply::Reject => ControlPdu::reject_ext_ind(
                ctx.reject_opcode.unwrap_or(fallback),
                ErrorCode::LL_PROCEDURE_COLLISION,
            ),
            Reply::UnknownRsp => {
                ControlPdu::unknown_rsp(ctx.unknown_response_opcode.unwrap_or(fallback))
            }
        };

        if env.link().send(ctx, &pdu) {
            trace!(opcode = ?pdu.opcode(), "reply sent");
            ctx.done = true;
            self.state.move_to_idle();
            return;
        }

        trace!(?reply, paused = ctx.is_paused(), "reply deferred");
        match reply {
            Reply::Reject => self.state.move_to_rejecting(),
            Reply::UnknownRsp => self.state.move_to_unsupported(),
        }
    }

    fn act_complete(&mut self) {
        self.collision = false;
        if let Some(ctx) = self.queue.head_mut() {
            ctx.done = true;
        }
    }

    fn act_disconnect(&mut self) {
        let released = self.queue.drain();
        if released > 0 {
            trace!(released, "remote procedures flushed");
        }
        self.collision = false;
        self.state.move_to_disconnected();
    }

    /// The peer started an instant-based procedure the protocol does not allow right now; the
    /// link has to go
    fn act_protocol_violation(&mut self, env: &mut Env<'_>, pdu: &ControlPdu) {
        let opcode = pdu.opcode();
        warn!(?opcode, "peer procedure collides in violation of the protocol");
        self.act_disconnect();
        let error = ConnectionError::ProtocolViolation { opcode };
        env.events.push_back(Event::Disconnected(error));
    }

    /// Flush everything pending ahead of a peer termination
    fn abort(&mut self) {
        let released = self.queue.drain();
        trace!(released, "remote procedures aborted");
        self.collision = false;
        self.state.move_to_idle();
    }

    fn on_step(&mut self, env: &mut Env<'_>, step: Step) {
        if step == Step::Complete {
            self.execute(env, Input::Complete);
        }
    }

    /// Only the admitted procedure at the head of the queue receives PDUs
    fn is_running_head(&self, handle: ProcHandle) -> bool {
        self.state.is_running() && self.queue.peek() == Some(handle)
    }

    fn check_done(&mut self) {
        if !self.queue.head().is_some_and(ProcedureContext::is_done) {
            return;
        }
        if let Some(ctx) = self.queue.dequeue() {
            trace!(kind = ?ctx.kind(), pending = self.queue.len(), "remote procedure released");
        }
    }

    fn dispatch_rx(&mut self, env: &mut Env<'_>, handle: ProcHandle, pdu: &ControlPdu) {
        if !self.is_running_head(handle) {
            debug!(?handle, opcode = ?pdu.opcode(), "PDU for procedure that is not running");
            return;
        }
        let Some(ctx) = self.queue.get_mut(handle) else {
            return;
        };
        let mut link = Link::new(env.role, &mut *env.tx);
        let step = env.handlers.rx(&mut link, ctx, pdu);
        self.on_step(env, step);
        self.check_done();
    }

    /// Admit queued procedures for as long as the engine is idle
    ///
    /// Each round either leaves idle or releases the head, so this terminates.
    fn admit_backlog(&mut self, env: &mut Env<'_>) {
        while self.state.is_idle() {
            let Some(handle) = self.queue.peek() else {
                break;
            };
            let Some(ctx) = self.queue.get(handle) else {
                break;
            };
            let pdu = ctx.initiating_pdu().clone();
            self.execute(env, Input::Prepare(&pdu));
            self.check_done();
            if self.is_running_head(handle) {
                self.dispatch_rx(env, handle, &pdu);
            }
        }
    }
}
