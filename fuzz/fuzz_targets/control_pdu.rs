#![no_main]

use bytes::{Bytes, BytesMut};
use libfuzzer_sys::fuzz_target;

use proto::{ControlPdu, MAX_CONTROL_PDU_LEN};

fuzz_target!(|data: &[u8]| {
    let Ok(pdu) = ControlPdu::decode(Bytes::copy_from_slice(data)) else {
        assert!(data.is_empty() || data.len() > MAX_CONTROL_PDU_LEN);
        return;
    };
    let mut buf = BytesMut::new();
    pdu.encode(&mut buf);
    assert_eq!(&buf[..], data);
    if let Some((opcode, _)) = pdu.as_reject_ext_ind() {
        assert_eq!(data[1], u8::from(opcode));
    }
});
