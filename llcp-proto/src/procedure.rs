use std::fmt;

use crate::{ControlPdu, Opcode};

/// Kind of a remote-initiated control procedure
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ProcedureKind {
    /// The initiating opcode was not recognized or not valid for the local role
    Unknown,
    /// Feature exchange, started by either LL_FEATURE_REQ or LL_PERIPHERAL_FEATURE_REQ
    FeatureExchange,
    /// Minimum number of used channels indication
    MinUsedChannels,
    /// LE ping
    Ping,
    /// Version exchange
    VersionExchange,
    /// Encryption start
    EncryptionStart,
    /// Encryption pause
    EncryptionPause,
    /// PHY update
    PhyUpdate,
    /// Connection update, started by the central with LL_CONNECTION_UPDATE_IND
    ConnectionUpdate,
    /// Connection parameters request
    ConnectionParamRequest,
    /// Connection termination
    Terminate,
    /// Channel map update
    ChannelMapUpdate,
    /// Data length update
    DataLengthUpdate,
    /// Constant tone extension request
    CteRequest,
}

impl ProcedureKind {
    /// Every kind, in declaration order
    pub const ALL: [Self; 14] = [
        Self::Unknown,
        Self::FeatureExchange,
        Self::MinUsedChannels,
        Self::Ping,
        Self::VersionExchange,
        Self::EncryptionStart,
        Self::EncryptionPause,
        Self::PhyUpdate,
        Self::ConnectionUpdate,
        Self::ConnectionParamRequest,
        Self::Terminate,
        Self::ChannelMapUpdate,
        Self::DataLengthUpdate,
        Self::CteRequest,
    ];

    /// Whether the procedure commits its change on both sides at a negotiated instant
    ///
    /// Must agree with the local request engine's classification of the same kinds.
    pub fn with_instant(self) -> bool {
        use ProcedureKind::*;
        match self {
            PhyUpdate | ConnectionUpdate | ConnectionParamRequest | ChannelMapUpdate => true,
            Unknown | FeatureExchange | MinUsedChannels | Ping | VersionExchange => false,
            EncryptionStart | EncryptionPause | Terminate | DataLengthUpdate | CteRequest => false,
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ProcedureKind::*;
        f.pad(match *self {
            Unknown => "unknown procedure",
            FeatureExchange => "feature exchange",
            MinUsedChannels => "minimum used channels",
            Ping => "LE ping",
            VersionExchange => "version exchange",
            EncryptionStart => "encryption start",
            EncryptionPause => "encryption pause",
            PhyUpdate => "PHY update",
            ConnectionUpdate => "connection update",
            ConnectionParamRequest => "connection parameters request",
            Terminate => "termination",
            ChannelMapUpdate => "channel map update",
            DataLengthUpdate => "data length update",
            CteRequest => "CTE request",
        })
    }
}

/// Reference to a queued remote procedure
///
/// Only meaningful while the procedure is queued; slots are reused once a procedure has been
/// released.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProcHandle(pub(crate) usize);

/// State of one in-flight remote-initiated procedure
#[derive(Debug)]
pub struct ProcedureContext {
    kind: ProcedureKind,
    /// Set once the procedure has finished; the context is released right after
    pub(crate) done: bool,
    /// While set, nothing may be transmitted on behalf of this procedure
    pub(crate) paused: bool,
    /// Opcode echoed in LL_UNKNOWN_RSP
    pub(crate) unknown_response_opcode: Option<Opcode>,
    /// Opcode named in LL_REJECT_EXT_IND
    pub(crate) reject_opcode: Option<Opcode>,
    /// Opcode of the last PDU enqueued on behalf of this procedure
    pub(crate) tx_opcode: Option<Opcode>,
    /// The PDU that started the procedure
    pdu: ControlPdu,
}

impl ProcedureContext {
    pub(crate) fn new(kind: ProcedureKind, pdu: ControlPdu) -> Self {
        Self {
            kind,
            done: false,
            paused: false,
            unknown_response_opcode: None,
            reject_opcode: None,
            tx_opcode: None,
            pdu,
        }
    }

    /// Which procedure this is
    pub fn kind(&self) -> ProcedureKind {
        self.kind
    }

    /// Whether the procedure has finished and is about to be released
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether transmissions for this procedure are currently held back
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The opcode that will be echoed if the procedure is answered with LL_UNKNOWN_RSP
    pub fn unknown_response_opcode(&self) -> Option<Opcode> {
        self.unknown_response_opcode
    }

    /// The opcode that will be named if the procedure is rejected
    pub fn reject_opcode(&self) -> Option<Opcode> {
        self.reject_opcode
    }

    /// Opcode of the last PDU transmitted for this procedure
    pub fn tx_opcode(&self) -> Option<Opcode> {
        self.tx_opcode
    }

    /// Record the opcode of a PDU a handler enqueued for this procedure
    pub fn set_tx_opcode(&mut self, opcode: Opcode) {
        self.tx_opcode = Some(opcode);
    }

    /// The control PDU that started the procedure
    pub fn initiating_pdu(&self) -> &ControlPdu {
        &self.pdu
    }
}
