use std::sync::Arc;

use assert_matches::assert_matches;
use bytes::Bytes;
use hex_literal::hex;

use super::*;
use util::*;


#[test]
fn starts_disconnected() {
    let _guard = subscribe();
    let mut conn = TestConnection::disconnected(EngineConfig::default(), Role::Peripheral);
    assert!(conn.is_disconnected());

    conn.receive(Opcode::VERSION_IND, &[0x0d, 0x59, 0x00, 0x01, 0x00]);
    assert_eq!(conn.remote_queue_len(), 0);
    assert!(conn.take_calls().is_empty());
    assert!(conn.take_sent().is_empty());

    conn.connect();
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn version_exchange() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Central);
    conn.behave(
        ProcedureKind::VersionExchange,
        Behaviour::RespondOnRx(Opcode::VERSION_IND),
    );

    conn.receive(Opcode::VERSION_IND, &[0x0d, 0x59, 0x00, 0x01, 0x00]);
    assert_eq!(
        conn.take_calls(),
        [
            Call::Run(ProcedureKind::VersionExchange),
            Call::Rx(ProcedureKind::VersionExchange, Opcode::VERSION_IND),
        ]
    );
    assert_eq!(conn.take_sent(), [hex!("0c")]);
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
    assert!(!conn.collision());
}

#[test]
fn response_waits_for_buffer() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.behave(
        ProcedureKind::FeatureExchange,
        Behaviour::RespondOnRx(Opcode::FEATURE_RSP),
    );
    conn.set_buffers(Some(0));

    conn.receive(Opcode::FEATURE_REQ, &[0xff; 8]);
    assert_eq!(conn.state(), StateType::Active);
    assert!(conn.take_sent().is_empty());

    conn.run();
    assert_eq!(conn.state(), StateType::Active);

    conn.set_buffers(None);
    conn.run();
    assert_eq!(conn.take_sent(), [hex!("09")]);
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn unknown_opcode() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.receive(Opcode::from(0x42), &[]);
    assert_eq!(conn.take_sent(), [hex!("07 42")]);
    assert!(conn.take_calls().is_empty());
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn response_opcode_is_unknown() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Central);
    conn.receive(Opcode::FEATURE_RSP, &[0; 8]);
    assert_eq!(conn.take_sent(), [hex!("07 09")]);
    assert!(conn.is_idle());
}

#[test]
fn opcode_not_valid_for_role() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Central);
    conn.receive(Opcode::CONNECTION_UPDATE_IND, &[0; 11]);
    assert_eq!(conn.take_sent(), [hex!("07 00")]);
    assert!(conn.take_calls().is_empty());

    let mut conn = TestConnection::new(Role::Peripheral);
    conn.receive(Opcode::MIN_USED_CHANNELS_IND, &[0x01, 0x02]);
    assert_eq!(conn.take_sent(), [hex!("07 19")]);
}

#[test]
fn disabled_feature_is_unknown() {
    let _guard = subscribe();
    let mut config = EngineConfig::default();
    config.features(Features {
        le_ping: false,
        ..Features::default()
    });
    let mut conn = TestConnection::with_config(config, Role::Peripheral);
    conn.receive(Opcode::PING_REQ, &[]);
    assert_eq!(conn.take_sent(), [hex!("07 12")]);
}

#[test]
fn deferred_unknown_response() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.set_buffers(Some(0));

    conn.receive(Opcode::from(0x42), &[]);
    assert_eq!(conn.state(), StateType::Unsupported);
    assert_eq!(conn.remote_queue_len(), 1);
    let handle = conn.peek_remote().unwrap();
    let ctx = conn.remote_procedure(handle).unwrap();
    assert_eq!(ctx.unknown_response_opcode(), Some(Opcode::from(0x42)));

    conn.run();
    conn.run();
    assert_eq!(conn.state(), StateType::Unsupported);
    assert!(conn.take_sent().is_empty());

    conn.set_buffers(Some(1));
    conn.run();
    assert_eq!(conn.take_sent(), [hex!("07 42")]);
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn failed_allocation_defers_reply() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.transmit_mut().alloc_fails = true;

    conn.receive(Opcode::from(0x30), &[]);
    assert_eq!(conn.state(), StateType::Unsupported);

    conn.transmit_mut().alloc_fails = false;
    conn.run();
    assert_eq!(conn.take_sent(), [hex!("07 30")]);
    assert!(conn.is_idle());
}

#[test]
fn paused_procedure_defers_reply() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.set_buffers(Some(0));
    conn.receive(Opcode::from(0x42), &[]);
    assert_eq!(conn.state(), StateType::Unsupported);

    conn.pause_remote();
    conn.set_buffers(None);
    conn.run();
    assert_eq!(conn.state(), StateType::Unsupported);
    assert!(conn.take_sent().is_empty());

    conn.resume_remote();
    conn.run();
    assert_eq!(conn.take_sent(), [hex!("07 42")]);
    assert!(conn.is_idle());
}

#[test]
fn backlog_waits_behind_deferred_reply() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.set_buffers(Some(0));
    conn.receive(Opcode::from(0x42), &[]);
    conn.receive(Opcode::PING_REQ, &[]);
    assert_eq!(conn.state(), StateType::Unsupported);
    assert_eq!(
        conn.queued_kinds(),
        [ProcedureKind::Unknown, ProcedureKind::Ping]
    );
    assert!(conn.take_calls().is_empty());

    conn.set_buffers(None);
    conn.run();
    assert_eq!(conn.take_sent(), [hex!("07 42")]);
    assert_eq!(conn.state(), StateType::Active);
    assert_eq!(conn.queued_kinds(), [ProcedureKind::Ping]);
    assert_eq!(
        conn.take_calls(),
        [
            Call::Run(ProcedureKind::Ping),
            Call::Rx(ProcedureKind::Ping, Opcode::PING_REQ),
        ]
    );
}

#[test]
fn central_rejects_colliding_instant_procedure() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Central);
    conn.set_incompat(Incompat::Resolvable);

    conn.receive(Opcode::PHY_REQ, &[0x01, 0x01]);
    assert_eq!(conn.take_sent(), [hex!("11 16 23")]);
    assert!(conn.take_calls().is_empty());
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
    assert!(!conn.collision());
    assert_eq!(conn.poll(), None);

    let reply = Bytes::copy_from_slice(&hex!("11 16 23"));
    let reply = ControlPdu::decode(reply).unwrap();
    assert_eq!(
        reply.as_reject_ext_ind(),
        Some((Opcode::PHY_REQ, ErrorCode::LL_PROCEDURE_COLLISION))
    );
}

#[test]
fn deferred_reject() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Central);
    conn.set_incompat(Incompat::Resolvable);
    conn.set_buffers(Some(0));

    conn.receive(Opcode::CONNECTION_PARAM_REQ, &[0; 23]);
    assert_eq!(conn.state(), StateType::Rejecting);
    let handle = conn.peek_remote().unwrap();
    assert_eq!(
        conn.remote_procedure(handle).unwrap().reject_opcode(),
        Some(Opcode::CONNECTION_PARAM_REQ)
    );

    conn.run();
    assert_eq!(conn.state(), StateType::Rejecting);

    conn.set_buffers(Some(1));
    conn.run();
    assert_eq!(conn.take_sent(), [hex!("11 0f 23")]);
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn prepare_retries_deferred_reply() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Central);
    let ping = ControlPdu::new(Opcode::PING_REQ, Bytes::new());

    // Nothing is waiting to be sent
    conn.prepare(&ping);
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
    assert!(conn.take_calls().is_empty());

    conn.set_incompat(Incompat::Resolvable);
    conn.set_buffers(Some(0));
    conn.receive(Opcode::PHY_REQ, &[0x01, 0x01]);
    assert_eq!(conn.state(), StateType::Rejecting);

    conn.set_buffers(None);
    conn.prepare(&ping);
    assert_eq!(conn.take_sent(), [hex!("11 16 23")]);
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
    assert!(conn.take_calls().is_empty());

    // A running procedure is left alone and `pdu` is not queued
    conn.receive(Opcode::PING_REQ, &[]);
    conn.take_calls();
    conn.prepare(&ping);
    assert_eq!(conn.state(), StateType::Active);
    assert_eq!(conn.queued_kinds(), [ProcedureKind::Ping]);
    assert!(conn.take_calls().is_empty());
    assert!(conn.take_sent().is_empty());
}

#[test]
fn peripheral_yields_to_colliding_instant_procedure() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.set_incompat(Incompat::Resolvable);

    conn.receive(Opcode::CONNECTION_PARAM_REQ, &[0; 23]);
    assert_eq!(conn.state(), StateType::Active);
    assert!(conn.take_sent().is_empty());
    assert!(!conn.collision());
    assert_eq!(
        conn.take_calls(),
        [
            Call::Run(ProcedureKind::ConnectionParamRequest),
            Call::Rx(
                ProcedureKind::ConnectionParamRequest,
                Opcode::CONNECTION_PARAM_REQ
            ),
        ]
    );
}

#[test]
fn instant_procedure_sets_collision() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);

    conn.receive(Opcode::PHY_REQ, &[0x01, 0x01]);
    assert_eq!(conn.state(), StateType::Active);
    assert!(conn.collision());

    conn.complete();
    assert!(!conn.collision());
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn plain_procedure_ignores_incompat() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Central);
    conn.set_incompat(Incompat::ProtocolViolation);

    conn.receive(Opcode::PING_REQ, &[]);
    assert_eq!(conn.state(), StateType::Active);
    assert!(!conn.collision());
    assert_eq!(conn.poll(), None);
}

#[test]
fn protocol_violation_disconnects() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.set_incompat(Incompat::ProtocolViolation);

    conn.receive(
        Opcode::CHANNEL_MAP_IND,
        &[0xff, 0xff, 0xff, 0xff, 0x1f, 0x10, 0x00],
    );
    assert!(conn.is_disconnected());
    assert_eq!(conn.remote_queue_len(), 0);
    assert!(conn.take_sent().is_empty());
    assert!(conn.take_calls().is_empty());

    let event = conn.poll();
    assert_matches!(
        event.clone(),
        Some(Event::Disconnected(ConnectionError::ProtocolViolation { opcode }))
            if opcode == Opcode::CHANNEL_MAP_IND
    );
    let Some(Event::Disconnected(err)) = event else {
        unreachable!();
    };
    assert_eq!(err.reason(), ErrorCode::LL_PDU_NOT_ALLOWED);
    assert_eq!(u8::from(err.reason()), 0x24);
    assert_eq!(conn.poll(), None);
}

#[test]
fn terminate_preempts_pending_procedures() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.receive(Opcode::PHY_REQ, &[0x01, 0x01]);
    conn.receive(Opcode::FEATURE_REQ, &[0; 8]);
    assert_eq!(
        conn.queued_kinds(),
        [ProcedureKind::PhyUpdate, ProcedureKind::FeatureExchange]
    );
    assert!(conn.collision());
    conn.take_calls();

    conn.receive(Opcode::TERMINATE_IND, &[0x13]);
    assert_eq!(conn.state(), StateType::Terminating);
    assert_eq!(conn.queued_kinds(), [ProcedureKind::Terminate]);
    assert!(!conn.collision());
    assert_eq!(
        conn.take_calls(),
        [
            Call::Run(ProcedureKind::Terminate),
            Call::Rx(ProcedureKind::Terminate, Opcode::TERMINATE_IND),
        ]
    );

    // Nothing gets past a termination in progress
    conn.receive(Opcode::VERSION_IND, &[0x0d, 0x59, 0x00, 0x01, 0x00]);
    assert_eq!(conn.state(), StateType::Terminating);
    assert_eq!(
        conn.queued_kinds(),
        [ProcedureKind::Terminate, ProcedureKind::VersionExchange]
    );

    conn.disconnect();
    assert!(conn.is_disconnected());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn backlog_is_admitted_in_order() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.receive(Opcode::PING_REQ, &[]);
    conn.receive(Opcode::VERSION_IND, &[0x0d, 0x59, 0x00, 0x01, 0x00]);
    conn.receive(
        Opcode::LENGTH_REQ,
        &[0xfb, 0x00, 0x48, 0x08, 0xfb, 0x00, 0x48, 0x08],
    );
    assert_eq!(
        conn.queued_kinds(),
        [
            ProcedureKind::Ping,
            ProcedureKind::VersionExchange,
            ProcedureKind::DataLengthUpdate,
        ]
    );
    assert_eq!(
        conn.take_calls(),
        [
            Call::Run(ProcedureKind::Ping),
            Call::Rx(ProcedureKind::Ping, Opcode::PING_REQ),
        ]
    );

    conn.complete();
    assert_eq!(conn.state(), StateType::Active);
    assert_eq!(
        conn.take_calls(),
        [
            Call::Run(ProcedureKind::VersionExchange),
            Call::Rx(ProcedureKind::VersionExchange, Opcode::VERSION_IND),
        ]
    );

    conn.complete();
    assert_eq!(
        conn.take_calls(),
        [
            Call::Run(ProcedureKind::DataLengthUpdate),
            Call::Rx(ProcedureKind::DataLengthUpdate, Opcode::LENGTH_REQ),
        ]
    );

    conn.complete();
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn handler_completion_admits_next() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.behave(ProcedureKind::Ping, Behaviour::CompleteOnRx);
    conn.receive(Opcode::VERSION_IND, &[0x0d, 0x59, 0x00, 0x01, 0x00]);
    conn.receive(Opcode::PING_REQ, &[]);
    conn.receive(Opcode::PING_REQ, &[]);
    conn.take_calls();

    conn.complete();
    assert_eq!(
        conn.take_calls(),
        [
            Call::Run(ProcedureKind::Ping),
            Call::Rx(ProcedureKind::Ping, Opcode::PING_REQ),
            Call::Run(ProcedureKind::Ping),
            Call::Rx(ProcedureKind::Ping, Opcode::PING_REQ),
        ]
    );
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn continuation_pdus() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.receive(Opcode::ENC_REQ, &[0; 22]);
    conn.receive(Opcode::PING_REQ, &[]);
    conn.take_calls();

    conn.receive_continuation(Opcode::START_ENC_RSP);
    let rx = Call::Rx(ProcedureKind::EncryptionStart, Opcode::START_ENC_RSP);
    assert_eq!(conn.take_calls(), [rx]);

    // Only the running head procedure receives PDUs
    let queued = conn.remote_procedures().nth(1).unwrap().0;
    conn.handle_rx(queued, &ControlPdu::new(Opcode::PING_REQ, Bytes::new()));
    assert!(conn.take_calls().is_empty());

    conn.run();
    assert_eq!(
        conn.take_calls(),
        [Call::Run(ProcedureKind::EncryptionStart)]
    );
}

#[test]
fn tx_ack_forwarding() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.behave(ProcedureKind::Ping, Behaviour::CompleteOnTxAck);
    conn.behave(ProcedureKind::DataLengthUpdate, Behaviour::CompleteOnTxAck);

    conn.receive(Opcode::PING_REQ, &[]);
    conn.take_calls();
    conn.ack(Opcode::PING_RSP);
    assert!(conn.take_calls().is_empty());
    assert_eq!(conn.state(), StateType::Active);

    conn.complete();
    conn.receive(
        Opcode::LENGTH_REQ,
        &[0xfb, 0x00, 0x48, 0x08, 0xfb, 0x00, 0x48, 0x08],
    );
    conn.take_calls();
    conn.ack(Opcode::LENGTH_RSP);
    let ack = Call::TxAck(ProcedureKind::DataLengthUpdate, Opcode::LENGTH_RSP);
    assert_eq!(conn.take_calls(), [ack]);
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn paused_handler_cannot_send() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.behave(
        ProcedureKind::DataLengthUpdate,
        Behaviour::RespondOnRx(Opcode::LENGTH_RSP),
    );
    conn.set_buffers(Some(0));
    conn.receive(
        Opcode::LENGTH_REQ,
        &[0xfb, 0x00, 0x48, 0x08, 0xfb, 0x00, 0x48, 0x08],
    );
    let handle = conn.peek_remote().unwrap();
    assert_eq!(conn.remote_procedure(handle).unwrap().tx_opcode(), None);

    conn.pause_remote();
    conn.set_buffers(None);
    conn.run();
    assert!(conn.remote_procedure(handle).unwrap().is_paused());
    assert!(conn.take_sent().is_empty());

    conn.resume_remote();
    conn.run();
    assert_eq!(conn.take_sent(), [hex!("15")]);
    assert!(conn.is_idle());
}

#[test]
fn disconnect_releases_everything() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.receive(Opcode::PHY_REQ, &[0x01, 0x01]);
    conn.receive(Opcode::PING_REQ, &[]);
    assert_eq!(conn.remote_queue_len(), 2);
    assert!(conn.collision());

    conn.disconnect();
    assert!(conn.is_disconnected());
    assert_eq!(conn.remote_queue_len(), 0);
    assert!(!conn.collision());
    assert_eq!(conn.peek_remote(), None);
    assert_eq!(conn.poll(), None);

    conn.disconnect();
    assert!(conn.is_disconnected());

    conn.receive(Opcode::PING_REQ, &[]);
    assert_eq!(conn.remote_queue_len(), 0);

    conn.connect();
    assert!(conn.is_idle());
    assert_eq!(conn.remote_queue_len(), 0);
}

#[test]
fn disconnect_while_reply_pending() {
    let _guard = subscribe();
    let mut conn = TestConnection::new(Role::Peripheral);
    conn.set_buffers(Some(0));
    conn.receive(Opcode::from(0x42), &[]);
    assert_eq!(conn.state(), StateType::Unsupported);

    conn.disconnect();
    assert!(conn.is_disconnected());
    assert_eq!(conn.remote_queue_len(), 0);

    conn.set_buffers(None);
    conn.run();
    conn.complete();
    assert!(conn.take_sent().is_empty());
    assert!(conn.is_disconnected());
}

#[test]
fn pool_exhaustion_drops_pdu() {
    let _guard = subscribe();
    let mut config = EngineConfig::default();
    config.max_pending_procedures(2).unwrap();
    let mut conn = TestConnection::with_config(config, Role::Peripheral);

    conn.receive(Opcode::PING_REQ, &[]);
    conn.receive(Opcode::VERSION_IND, &[0x0d, 0x59, 0x00, 0x01, 0x00]);
    conn.receive(Opcode::FEATURE_REQ, &[0; 8]);
    assert_eq!(
        conn.queued_kinds(),
        [ProcedureKind::Ping, ProcedureKind::VersionExchange]
    );

    // Termination always finds room
    conn.receive(Opcode::TERMINATE_IND, &[0x13]);
    assert_eq!(conn.queued_kinds(), [ProcedureKind::Terminate]);
}

#[test]
fn paused_cmd_requires_cte() {
    let mut conn = TestConnection::new(Role::Central);
    conn.set_paused_cmd(Some(ProcedureKind::CteRequest));
    assert_eq!(conn.paused_cmd(), None);

    let mut config = EngineConfig::default();
    config.features(Features {
        cte_request: true,
        ..Features::default()
    });
    let mut conn = TestConnection::with_config(config, Role::Central);
    conn.set_paused_cmd(Some(ProcedureKind::CteRequest));
    assert_eq!(conn.paused_cmd(), Some(ProcedureKind::CteRequest));
    conn.set_paused_cmd(None);
    assert_eq!(conn.paused_cmd(), None);
}

#[test]
fn cte_request() {
    let _guard = subscribe();
    let mut config = EngineConfig::default();
    config.features(Features {
        cte_response: true,
        ..Features::default()
    });
    let mut conn = TestConnection::with_config(config, Role::Central);
    conn.behave(ProcedureKind::CteRequest, Behaviour::CompleteOnTxAck);
    conn.receive(Opcode::CTE_REQ, &[0x14]);
    assert_eq!(conn.state(), StateType::Active);

    conn.ack(Opcode::CTE_RSP);
    assert!(conn.is_idle());

    let mut conn = TestConnection::new(Role::Central);
    conn.receive(Opcode::CTE_REQ, &[0x14]);
    assert_eq!(conn.take_sent(), [hex!("07 1a")]);
}

#[test]
fn missing_handler() {
    struct Noop;

    impl ProcedureHandler for Noop {
        fn rx(&mut self, _: &mut Link<'_>, _: &mut ProcedureContext, _: &ControlPdu) -> Step {
            Step::Pending
        }

        fn run(&mut self, _: &mut Link<'_>, _: &mut ProcedureContext) -> Step {
            Step::Pending
        }
    }

    let mut handlers = Handlers::new();
    handlers
        .insert(HandlerGroup::Common, Noop)
        .insert(HandlerGroup::Encryption, Noop)
        .insert(HandlerGroup::ConnectionUpdate, Noop)
        .insert(HandlerGroup::ChannelMapUpdate, Noop);
    let config = Arc::new(EngineConfig::default());
    let conn = Connection::new(config, Role::Peripheral, handlers, TestTransmit::default());
    assert_eq!(
        conn.err(),
        Some(ConfigError::MissingHandler(ProcedureKind::PhyUpdate))
    );

    // Without PHY update there is nothing to dispatch to the missing group
    let mut handlers = Handlers::new();
    handlers
        .insert(HandlerGroup::Common, Noop)
        .insert(HandlerGroup::Encryption, Noop)
        .insert(HandlerGroup::ConnectionUpdate, Noop)
        .insert(HandlerGroup::ChannelMapUpdate, Noop);
    let mut config = EngineConfig::default();
    config.features(Features {
        phy_update: false,
        ..Features::default()
    });
    let conn = Connection::new(
        Arc::new(config),
        Role::Peripheral,
        handlers,
        TestTransmit::default(),
    )
    .unwrap();
    assert!(conn.is_disconnected());
    assert_eq!(conn.role(), Role::Peripheral);
}

#[test]
fn role_not_supported() {
    let mut config = EngineConfig::default();
    config.features(Features {
        central: false,
        ..Features::default()
    });
    assert_eq!(
        Connection::new(
            Arc::new(config),
            Role::Central,
            Handlers::new(),
            TestTransmit::default()
        )
        .err(),
        Some(ConfigError::RoleNotSupported(Role::Central))
    );
}

#[test]
fn error_display() {
    let err = ConnectionError::ProtocolViolation {
        opcode: Opcode::PHY_REQ,
    };
    assert_eq!(
        err.to_string(),
        "peer violated the procedure collision rules with LL_PHY_REQ"
    );
    assert_eq!(
        ConfigError::RoleNotSupported(Role::Peripheral).to_string(),
        "peripheral role is not supported"
    );
}
