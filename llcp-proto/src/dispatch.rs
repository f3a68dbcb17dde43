use std::fmt;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::{ConfigError, ControlPdu, ProcedureContext, ProcedureKind, Role, Transmit};

/// Whether a procedure handler is finished with the procedure
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[must_use]
pub enum Step {
    /// The procedure needs further PDUs or `run` calls
    Pending,
    /// The procedure has finished and its context may be released
    Complete,
}

/// The slice of a connection a procedure handler may use
pub struct Link<'a> {
    role: Role,
    tx: &'a mut dyn Transmit,
}

impl<'a> Link<'a> {
    pub(crate) fn new(role: Role, tx: &'a mut dyn Transmit) -> Self {
        Self { role, tx }
    }

    /// Local role on this connection
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether a transmit buffer is available
    pub fn tx_alloc_peek(&self) -> bool {
        self.tx.tx_alloc_peek()
    }

    /// Allocate a transmit buffer
    pub fn tx_alloc(&mut self) -> Option<BytesMut> {
        self.tx.tx_alloc()
    }

    /// Queue an encoded PDU
    pub fn tx_enqueue(&mut self, pdu: Bytes) {
        self.tx.tx_enqueue(pdu)
    }

    /// Encode and queue `pdu` on behalf of `ctx`
    ///
    /// Returns false, leaving everything untouched, if the procedure is paused or no buffer is
    /// available.
    pub fn send(&mut self, ctx: &mut ProcedureContext, pdu: &ControlPdu) -> bool {
        if ctx.is_paused() || !self.tx.tx_alloc_peek() {
            return false;
        }
        let Some(mut buf) = self.tx.tx_alloc() else {
            return false;
        };
        pdu.encode(&mut buf);
        self.tx.tx_enqueue(buf.freeze());
        ctx.set_tx_opcode(pdu.opcode());
        true
    }
}

impl fmt::Debug for Link<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link").field("role", &self.role).finish()
    }
}

/// Per-procedure protocol logic driven by the remote request engine
///
/// Each callback returns [`Step::Complete`] once the procedure is finished, which completes it
/// in the engine and releases its context.
pub trait ProcedureHandler {
    /// A control PDU belonging to the procedure was received
    fn rx(&mut self, link: &mut Link<'_>, ctx: &mut ProcedureContext, pdu: &ControlPdu) -> Step;

    /// A PDU sent on behalf of the procedure was acknowledged by the peer
    ///
    /// Only forwarded for kinds that track acknowledgements, see
    /// [`HandlerGroup::forwards_tx_ack`].
    fn tx_ack(
        &mut self,
        link: &mut Link<'_>,
        ctx: &mut ProcedureContext,
        pdu: &ControlPdu,
    ) -> Step {
        let _ = (link, ctx, pdu);
        Step::Pending
    }

    /// The procedure may make progress
    fn run(&mut self, link: &mut Link<'_>, ctx: &mut ProcedureContext) -> Step;
}

/// Family of procedures sharing one [`ProcedureHandler`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum HandlerGroup {
    /// Simple request/response procedures: feature and version exchange, ping, minimum used
    /// channels, termination, data length update and CTE request
    Common,
    /// Encryption start and pause
    Encryption,
    /// PHY update
    PhyUpdate,
    /// Connection update and connection parameters request
    ConnectionUpdate,
    /// Channel map update
    ChannelMapUpdate,
}

impl HandlerGroup {
    const COUNT: usize = 5;

    /// Every group, in declaration order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Common,
        Self::Encryption,
        Self::PhyUpdate,
        Self::ConnectionUpdate,
        Self::ChannelMapUpdate,
    ];

    /// The group handling `kind`, or `None` for [`ProcedureKind::Unknown`]
    pub fn for_kind(kind: ProcedureKind) -> Option<Self> {
        use ProcedureKind::*;
        Some(match kind {
            Unknown => return None,
            FeatureExchange | MinUsedChannels | Ping | VersionExchange => Self::Common,
            Terminate | DataLengthUpdate | CteRequest => Self::Common,
            EncryptionStart | EncryptionPause => Self::Encryption,
            PhyUpdate => Self::PhyUpdate,
            ConnectionUpdate | ConnectionParamRequest => Self::ConnectionUpdate,
            ChannelMapUpdate => Self::ChannelMapUpdate,
        })
    }

    /// Whether transmit acknowledgements are forwarded for `kind`
    pub fn forwards_tx_ack(kind: ProcedureKind) -> bool {
        matches!(
            kind,
            ProcedureKind::DataLengthUpdate | ProcedureKind::PhyUpdate | ProcedureKind::CteRequest
        )
    }
}

/// Table of procedure handlers, one per [`HandlerGroup`]
#[derive(Default)]
pub struct Handlers {
    slots: [Option<Box<dyn ProcedureHandler>>; HandlerGroup::COUNT],
}

impl Handlers {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `group`, replacing any previous one
    pub fn insert(
        &mut self,
        group: HandlerGroup,
        handler: impl ProcedureHandler + 'static,
    ) -> &mut Self {
        self.slots[group as usize] = Some(Box::new(handler));
        self
    }

    /// Whether a handler is registered for `group`
    pub fn contains(&self, group: HandlerGroup) -> bool {
        self.slots[group as usize].is_some()
    }

    /// Check that every kind in `kinds` can be dispatched
    pub(crate) fn validate(
        &self,
        kinds: impl IntoIterator<Item = ProcedureKind>,
    ) -> Result<(), ConfigError> {
        for kind in kinds {
            match HandlerGroup::for_kind(kind) {
                Some(group) if self.contains(group) => {}
                _ => return Err(ConfigError::MissingHandler(kind)),
            }
        }
        Ok(())
    }

    pub(crate) fn rx(
        &mut self,
        link: &mut Link<'_>,
        ctx: &mut ProcedureContext,
        pdu: &ControlPdu,
    ) -> Step {
        let Some(handler) = self.handler_for(ctx.kind()) else {
            return Step::Pending;
        };
        trace!(kind = ?ctx.kind(), opcode = ?pdu.opcode(), "rx");
        handler.rx(link, ctx, pdu)
    }

    pub(crate) fn tx_ack(
        &mut self,
        link: &mut Link<'_>,
        ctx: &mut ProcedureContext,
        pdu: &ControlPdu,
    ) -> Step {
        if !HandlerGroup::forwards_tx_ack(ctx.kind()) {
            return Step::Pending;
        }
        let Some(handler) = self.handler_for(ctx.kind()) else {
            return Step::Pending;
        };
        trace!(kind = ?ctx.kind(), opcode = ?pdu.opcode(), "tx ack");
        handler.tx_ack(link, ctx, pdu)
    }

    pub(crate) fn run(&mut self, link: &mut Link<'_>, ctx: &mut ProcedureContext) -> Step {
        let Some(handler) = self.handler_for(ctx.kind()) else {
            return Step::Pending;
        };
        trace!(kind = ?ctx.kind(), "run");
        handler.run(link, ctx)
    }

    fn handler_for(
        &mut self,
        kind: ProcedureKind,
    ) -> Option<&mut (dyn ProcedureHandler + 'static)> {
        let group = HandlerGroup::for_kind(kind)?;
        let handler = self.slots[group as usize].as_deref_mut();
        // Connection::new refuses configurations where this could fail
        debug_assert!(handler.is_some(), "no handler registered for {kind:?}");
        handler
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for group in HandlerGroup::ALL {
            if self.contains(group) {
                set.entry(&group);
            }
        }
        set.finish()
    }
}
