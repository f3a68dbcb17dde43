#[cfg(feature = "arbitrary")]
use arbitrary::Arbitrary;

use crate::{ProcedureKind, Role};

/// How the local engine's pending procedure relates to one the peer may start
///
/// Written by the local request engine through [`Connection::set_incompat`].
///
/// [`Connection::set_incompat`]: crate::Connection::set_incompat
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Incompat {
    /// Nothing local conflicts with a remote procedure
    #[default]
    NoCollision,
    /// A conflicting local procedure exists and the protocol defines who yields
    Resolvable,
    /// A conflicting local procedure exists in a combination the protocol forbids
    ProtocolViolation,
}

/// Outcome of admitting a remote procedure
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Admission {
    /// Run the remote procedure
    Run {
        /// New value of the local-collision flag; `None` leaves it untouched
        collision: Option<bool>,
    },
    /// Answer with LL_REJECT_EXT_IND; the local procedure carries on
    Reject,
    /// The peer violated the protocol; the link must be dropped
    ProtocolViolation,
}

/// Decide how to react to a remote procedure of `kind`
///
/// `incompat` is the classification recorded by the local engine for its own pending
/// procedure. Only procedures with an instant can collide.
pub fn admit(kind: ProcedureKind, role: Role, incompat: Incompat) -> Admission {
    let with_instant = kind.with_instant();
    match (with_instant, incompat, role) {
        // Local incompatible procedure is kept pending while the remote one runs. This also
        // covers a central facing a resolvable collision with a procedure without instant.
        (false, _, _) | (_, Incompat::NoCollision, _) => Admission::Run {
            collision: Some(with_instant),
        },
        // Peripheral always yields; its local procedure completes with an error
        (true, Incompat::Resolvable, Role::Peripheral) => Admission::Run { collision: None },
        // Central keeps its own procedure and rejects the peer's
        (true, Incompat::Resolvable, Role::Central) => Admission::Reject,
        (true, Incompat::ProtocolViolation, _) => Admission::ProtocolViolation,
    }
}
