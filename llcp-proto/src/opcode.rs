use std::fmt;

#[cfg(feature = "arbitrary")]
use arbitrary::Arbitrary;

/// Opcode of an LL control PDU
///
/// The numeric values are fixed by the Bluetooth Core Specification (Vol 6, Part B, 2.4.2) and
/// shared with every peer; they are not an implementation choice.
#[cfg_attr(feature = "arbitrary", derive(Arbitrary))]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Opcode(u8);

impl Opcode {
    /// Index of this opcode in tables keyed by opcode value
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this opcode is defined by the version of the protocol this crate implements
    pub fn is_known(self) -> bool {
        self.0 <= Self::CTE_RSP.0
    }
}

impl From<u8> for Opcode {
    fn from(x: u8) -> Self {
        Self(x)
    }
}

impl From<Opcode> for u8 {
    fn from(x: Opcode) -> Self {
        x.0
    }
}

macro_rules! opcodes {
    {$($name:ident($val:expr) $desc:expr;)*} => {
        impl Opcode {
            $(#[doc = $desc] pub const $name: Self = Self($val);)*
        }

        impl fmt::Debug for Opcode {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    $($val => f.write_str(stringify!($name)),)*
                    _ => write!(f, "Opcode({:#04x})", self.0),
                }
            }
        }

        impl fmt::Display for Opcode {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    $($val => write!(f, "LL_{}", stringify!($name)),)*
                    _ => write!(f, "unknown opcode {:#04x}", self.0),
                }
            }
        }
    }
}

opcodes! {
    CONNECTION_UPDATE_IND(0x00) "the central moves the connection to new parameters at an instant";
    CHANNEL_MAP_IND(0x01) "the central moves the connection to a new channel map at an instant";
    TERMINATE_IND(0x02) "the sender is terminating the connection";
    ENC_REQ(0x03) "the central starts the encryption start procedure";
    ENC_RSP(0x04) "the peripheral answers an LL_ENC_REQ";
    START_ENC_REQ(0x05) "the peripheral is ready to start encryption";
    START_ENC_RSP(0x06) "encryption has started";
    UNKNOWN_RSP(0x07) "the sender did not understand or does not support a control PDU";
    FEATURE_REQ(0x08) "the central requests the peer's supported features";
    FEATURE_RSP(0x09) "answer to a feature request";
    PAUSE_ENC_REQ(0x0A) "the central starts the encryption pause procedure";
    PAUSE_ENC_RSP(0x0B) "answer to an encryption pause request";
    VERSION_IND(0x0C) "the sender announces its link layer version";
    REJECT_IND(0x0D) "the sender rejects a control PDU";
    PERIPHERAL_FEATURE_REQ(0x0E) "the peripheral requests the central's supported features";
    CONNECTION_PARAM_REQ(0x0F) "the sender requests new connection parameters";
    CONNECTION_PARAM_RSP(0x10) "answer to a connection parameters request";
    REJECT_EXT_IND(0x11) "the sender rejects a control PDU, naming the rejected opcode";
    PING_REQ(0x12) "the sender requests a ping response";
    PING_RSP(0x13) "answer to a ping request";
    LENGTH_REQ(0x14) "the sender announces its data length limits and asks for the peer's";
    LENGTH_RSP(0x15) "answer to a data length request";
    PHY_REQ(0x16) "the sender requests a PHY change";
    PHY_RSP(0x17) "answer to a PHY request";
    PHY_UPDATE_IND(0x18) "the central moves the connection to new PHYs at an instant";
    MIN_USED_CHANNELS_IND(0x19) "the peripheral announces the minimum number of channels it needs";
    CTE_REQ(0x1A) "the sender requests a constant tone extension response";
    CTE_RSP(0x1B) "answer to a constant tone extension request";
}
