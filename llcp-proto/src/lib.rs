//! Remote-initiated side of the Bluetooth LE Link Layer Control Protocol
//!
//! llcp-proto contains a fully deterministic implementation of the logic deciding how a link
//! layer reacts when the *peer* starts a control procedure: admission of the procedure, collision
//! resolution against a procedure the local side already started, dispatch into the
//! per-procedure handlers, and teardown on link loss. It contains no radio code, no timers and no
//! buffer management of its own; those are supplied by the caller through [`Transmit`] and
//! [`ProcedureHandler`].
//!
//! The most important type is [`Connection`], which owns the remote request state machine for a
//! single link together with the handler table and the transmit path. The surrounding link layer
//! feeds it received control PDUs and lifecycle signals, and polls it for [`Event`]s.

#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![cfg_attr(test, allow(dead_code))]

use std::{fmt, ops};

#[cfg(feature = "arbitrary")]
use arbitrary::Arbitrary;

mod acceptance;
pub use crate::acceptance::{AcceptRoles, AcceptanceTable};

mod collision;
pub use crate::collision::{admit, Admission, Incompat};

mod config;
pub use crate::config::{ConfigError, EngineConfig, Features};

mod connection;
pub use crate::connection::{Connection, ConnectionError, Event};

mod dispatch;
pub use crate::dispatch::{HandlerGroup, Handlers, Link, ProcedureHandler, Step};

mod error_code;
pub use crate::error_code::ErrorCode;

mod opcode;
pub use crate::opcode::Opcode;

mod pdu;
pub use crate::pdu::{ControlPdu, PduError};

mod procedure;
pub use crate::procedure::{ProcHandle, ProcedureContext, ProcedureKind};

mod queue;

mod remote;
pub use crate::remote::StateType;

mod transmit;
pub use crate::transmit::Transmit;

#[cfg(test)]
mod tests;

/// The link role held by the local end of a connection
///
/// Discriminants match the HCI role encoding.
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Role {
    /// The initiator of the connection, owning the connection timing
    Central = 0,
    /// The advertiser that accepted the connection
    Peripheral = 1,
}

impl Role {
    #[inline]
    /// Shorthand for `self == Role::Central`
    pub fn is_central(self) -> bool {
        self == Self::Central
    }

    #[inline]
    /// Shorthand for `self == Role::Peripheral`
    pub fn is_peripheral(self) -> bool {
        self == Self::Peripheral
    }
}

impl ops::Not for Role {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::Central => Self::Peripheral,
            Self::Peripheral => Self::Central,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match *self {
            Self::Central => "central",
            Self::Peripheral => "peripheral",
        })
    }
}

/// Maximum length of an LL control PDU payload, opcode included
pub const MAX_CONTROL_PDU_LEN: usize = 27;
