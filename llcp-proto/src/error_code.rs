use std::fmt;

/// HCI error code, as carried in LL_REJECT_EXT_IND and LL_TERMINATE_IND
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ErrorCode(u8);

impl From<u8> for ErrorCode {
    fn from(x: u8) -> Self {
        Self(x)
    }
}

impl From<ErrorCode> for u8 {
    fn from(x: ErrorCode) -> Self {
        x.0
    }
}

macro_rules! errors {
    {$($name:ident($val:expr) $desc:expr;)*} => {
        impl ErrorCode {
            $(#[doc = $desc] pub const $name: Self = Self($val);)*
        }

        impl fmt::Debug for ErrorCode {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.0 {
                    $($val => f.write_str(stringify!($name)),)*
                    _ => write!(f, "ErrorCode({:#04x})", self.0),
                }
            }
        }

        impl fmt::Display for ErrorCode {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let x = match self.0 {
                    $($val => $desc,)*
                    _ => "unknown error",
                };
                f.write_str(x)
            }
        }
    }
}

errors! {
    SUCCESS(0x00) "the operation succeeded";
    REMOTE_USER_TERMINATED(0x13) "the user on the remote device terminated the connection";
    UNSUPPORTED_REMOTE_FEATURE(0x1A) "the remote device does not support the requested feature";
    INVALID_LL_PARAMETERS(0x1E) "a link layer control PDU carried invalid parameters";
    UNSPECIFIED(0x1F) "no other error code applies";
    LL_RESPONSE_TIMEOUT(0x22) "a link layer control procedure timed out";
    LL_PROCEDURE_COLLISION(0x23) "the peer started a procedure colliding with one in progress";
    LL_PDU_NOT_ALLOWED(0x24) "a control PDU arrived that is not allowed in the current state";
    INSTANT_PASSED(0x28) "the instant of a procedure was already in the past";
    DIFFERENT_TRANSACTION_COLLISION(0x2A) "the peer started a different colliding procedure";
}
