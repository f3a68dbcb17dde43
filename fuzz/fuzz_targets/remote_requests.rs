#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use bytes::{Bytes, BytesMut};
use libfuzzer_sys::fuzz_target;

use proto::{
    Connection, ControlPdu, EngineConfig, HandlerGroup, Handlers, Incompat, Link, Opcode,
    ProcedureContext, ProcedureHandler, Role, Step, Transmit,
};

#[derive(Arbitrary, Debug)]
struct Params {
    role: Role,
    max_pending: u8,
    /// Whether each handler group finishes procedures on its own
    complete_on_rx: [bool; 5],
}

#[derive(Arbitrary, Debug)]
enum Operation {
    Receive(Opcode, Vec<u8>),
    Continue(Opcode),
    Ack(Opcode),
    Run,
    Complete,
    Connect,
    Disconnect,
    SetIncompat(Incompat),
    SetBuffers(Option<u8>),
    Pause,
    Resume,
}

#[derive(Default)]
struct Buffers(Option<u8>);

impl Transmit for Buffers {
    fn tx_alloc_peek(&self) -> bool {
        self.0 != Some(0)
    }

    fn tx_alloc(&mut self) -> Option<BytesMut> {
        if let Some(free) = &mut self.0 {
            *free = free.checked_sub(1)?;
        }
        Some(BytesMut::new())
    }

    fn tx_enqueue(&mut self, pdu: Bytes) {
        assert!(!pdu.is_empty());
    }
}

struct Handler {
    complete_on_rx: bool,
}

impl ProcedureHandler for Handler {
    fn rx(&mut self, link: &mut Link<'_>, ctx: &mut ProcedureContext, pdu: &ControlPdu) -> Step {
        let _ = link.send(ctx, pdu);
        if self.complete_on_rx {
            Step::Complete
        } else {
            Step::Pending
        }
    }

    fn run(&mut self, _: &mut Link<'_>, _: &mut ProcedureContext) -> Step {
        Step::Pending
    }
}

fuzz_target!(|input: (Params, Vec<Operation>)| {
    let (params, operations) = input;
    let mut config = EngineConfig::default();
    let max_pending = usize::from(params.max_pending) % EngineConfig::MAX_PENDING_PROCEDURES + 1;
    config.max_pending_procedures(max_pending).unwrap();

    let mut handlers = Handlers::new();
    for (group, complete_on_rx) in HandlerGroup::ALL.into_iter().zip(params.complete_on_rx) {
        handlers.insert(group, Handler { complete_on_rx });
    }
    let config = Arc::new(config);
    let Ok(mut conn) = Connection::new(config, params.role, handlers, Buffers::default()) else {
        unreachable!("every handler group is registered");
    };
    conn.connect();

    for operation in operations {
        match operation {
            Operation::Receive(opcode, data) => {
                conn.handle_new_procedure(ControlPdu::new(opcode, data));
            }
            Operation::Continue(opcode) => {
                if let Some(handle) = conn.peek_remote() {
                    conn.handle_rx(handle, &ControlPdu::new(opcode, Bytes::new()));
                }
            }
            Operation::Ack(opcode) => {
                if let Some(handle) = conn.peek_remote() {
                    conn.handle_tx_ack(handle, &ControlPdu::new(opcode, Bytes::new()));
                }
            }
            Operation::Run => conn.run(),
            Operation::Complete => conn.complete(),
            Operation::Connect => conn.connect(),
            Operation::Disconnect => conn.disconnect(),
            Operation::SetIncompat(incompat) => conn.set_incompat(incompat),
            Operation::SetBuffers(buffers) => conn.transmit_mut().0 = buffers,
            Operation::Pause => conn.pause_remote(),
            Operation::Resume => conn.resume_remote(),
        }
        assert!(conn.remote_queue_len() <= max_pending);
        if conn.is_idle() || conn.is_disconnected() {
            assert_eq!(conn.remote_queue_len(), 0);
        }
        while conn.poll().is_some() {}
    }

    conn.disconnect();
    assert!(conn.is_disconnected());
    assert_eq!(conn.remote_queue_len(), 0);
});
