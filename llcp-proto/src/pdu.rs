use bytes::{Buf, BufMut, Bytes};
use thiserror::Error;

use crate::{ErrorCode, Opcode, MAX_CONTROL_PDU_LEN};

/// An LL control PDU payload: the opcode followed by its control data
///
/// Only the two replies the remote request engine produces itself are constructed here;
/// everything else is built by the per-procedure handlers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ControlPdu {
    opcode: Opcode,
    data: Bytes,
}

impl ControlPdu {
    /// Construct a PDU from its opcode and control data
    pub fn new(opcode: Opcode, data: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            data: data.into(),
        }
    }

    /// Parse the payload of a received LL control PDU
    pub fn decode(mut buf: Bytes) -> Result<Self, PduError> {
        if !buf.has_remaining() {
            return Err(PduError::Empty);
        }
        if buf.len() > MAX_CONTROL_PDU_LEN {
            return Err(PduError::TooLong(buf.len()));
        }
        let opcode = Opcode::from(buf.get_u8());
        Ok(Self { opcode, data: buf })
    }

    /// Serialize opcode and control data into `buf`
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.opcode.into());
        buf.put_slice(&self.data);
    }

    /// LL_REJECT_EXT_IND naming the rejected opcode and the reason
    pub(crate) fn reject_ext_ind(rejected: Opcode, reason: ErrorCode) -> Self {
        Self::new(
            Opcode::REJECT_EXT_IND,
            Bytes::copy_from_slice(&[rejected.into(), reason.into()]),
        )
    }

    /// LL_UNKNOWN_RSP echoing the opcode that was not understood
    pub(crate) fn unknown_rsp(unknown: Opcode) -> Self {
        Self::new(
            Opcode::UNKNOWN_RSP,
            Bytes::copy_from_slice(&[unknown.into()]),
        )
    }

    /// The PDU's opcode
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Control data following the opcode
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Encoded length, opcode included
    pub fn len(&self) -> usize {
        1 + self.data.len()
    }

    /// Always false; a control PDU carries at least its opcode
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Rejected opcode and reason, if this is a well-formed LL_REJECT_EXT_IND
    pub fn as_reject_ext_ind(&self) -> Option<(Opcode, ErrorCode)> {
        match (self.opcode, &self.data[..]) {
            (Opcode::REJECT_EXT_IND, &[opcode, reason]) => {
                Some((Opcode::from(opcode), ErrorCode::from(reason)))
            }
            _ => None,
        }
    }

    /// Unrecognized opcode, if this is a well-formed LL_UNKNOWN_RSP
    pub fn as_unknown_rsp(&self) -> Option<Opcode> {
        match (self.opcode, &self.data[..]) {
            (Opcode::UNKNOWN_RSP, &[opcode]) => Some(Opcode::from(opcode)),
            _ => None,
        }
    }
}

/// Reasons a received control PDU payload could not be parsed
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum PduError {
    /// The payload did not even contain an opcode
    #[error("empty control PDU")]
    Empty,
    /// The payload exceeds the maximum control PDU size
    #[error("control PDU of {0} bytes exceeds the maximum size")]
    TooLong(usize),
}
