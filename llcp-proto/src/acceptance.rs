use crate::{Features, Opcode, ProcedureKind, Role};

/// Set of link roles in which an opcode may start a remote procedure
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct AcceptRoles(u8);

impl AcceptRoles {
    /// No role accepts the opcode
    pub const NONE: Self = Self(0);
    /// Only a central accepts the opcode
    pub const CENTRAL: Self = Self(1 << Role::Central as u8);
    /// Only a peripheral accepts the opcode
    pub const PERIPHERAL: Self = Self(1 << Role::Peripheral as u8);
    /// Both roles accept the opcode
    pub const BOTH: Self = Self(Self::CENTRAL.0 | Self::PERIPHERAL.0);

    /// Whether `role` is in the set
    pub fn contains(self, role: Role) -> bool {
        self.0 & (1 << role as u8) != 0
    }

    /// Roles supported by `features`
    pub fn supported(features: &Features) -> Self {
        let mut roles = Self::NONE;
        if features.central {
            roles.0 |= Self::CENTRAL.0;
        }
        if features.peripheral {
            roles.0 |= Self::PERIPHERAL.0;
        }
        roles
    }

    fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Entry {
    kind: ProcedureKind,
    accept: AcceptRoles,
}

impl Entry {
    const NONE: Self = Self::new(ProcedureKind::Unknown, AcceptRoles::NONE);

    const fn new(kind: ProcedureKind, accept: AcceptRoles) -> Self {
        Self { kind, accept }
    }
}

const TABLE_LEN: usize = Opcode::CTE_RSP.index() + 1;

/// Opcodes that can start a new remote procedure, indexed by opcode value
///
/// Responses never start a procedure and are listed with no accepting role.
const NEW_PROCEDURES: [Entry; TABLE_LEN] = {
    use ProcedureKind::*;
    let mut t = [Entry::NONE; TABLE_LEN];
    t[Opcode::CONNECTION_UPDATE_IND.index()] =
        Entry::new(ConnectionUpdate, AcceptRoles::PERIPHERAL);
    t[Opcode::CHANNEL_MAP_IND.index()] = Entry::new(ChannelMapUpdate, AcceptRoles::PERIPHERAL);
    t[Opcode::TERMINATE_IND.index()] = Entry::new(Terminate, AcceptRoles::BOTH);
    t[Opcode::ENC_REQ.index()] = Entry::new(EncryptionStart, AcceptRoles::PERIPHERAL);
    t[Opcode::FEATURE_REQ.index()] = Entry::new(FeatureExchange, AcceptRoles::PERIPHERAL);
    t[Opcode::PAUSE_ENC_REQ.index()] = Entry::new(EncryptionPause, AcceptRoles::PERIPHERAL);
    t[Opcode::VERSION_IND.index()] = Entry::new(VersionExchange, AcceptRoles::BOTH);
    t[Opcode::PERIPHERAL_FEATURE_REQ.index()] = Entry::new(FeatureExchange, AcceptRoles::CENTRAL);
    t[Opcode::CONNECTION_PARAM_REQ.index()] = Entry::new(ConnectionParamRequest, AcceptRoles::BOTH);
    t[Opcode::PING_REQ.index()] = Entry::new(Ping, AcceptRoles::BOTH);
    t[Opcode::LENGTH_REQ.index()] = Entry::new(DataLengthUpdate, AcceptRoles::BOTH);
    t[Opcode::PHY_REQ.index()] = Entry::new(PhyUpdate, AcceptRoles::BOTH);
    t[Opcode::MIN_USED_CHANNELS_IND.index()] = Entry::new(MinUsedChannels, AcceptRoles::CENTRAL);
    t[Opcode::CTE_REQ.index()] = Entry::new(CteRequest, AcceptRoles::BOTH);
    t
};

/// Maps the opcode of a received control PDU to the remote procedure it starts
///
/// Built from the static opcode table restricted to the enabled [`Features`]: entries whose
/// procedure is disabled, or whose accepting roles are not supported, resolve to
/// [`ProcedureKind::Unknown`].
#[derive(Debug, Clone)]
pub struct AcceptanceTable {
    entries: [Entry; TABLE_LEN],
}

impl AcceptanceTable {
    /// Table for a controller supporting `features`
    pub fn new(features: &Features) -> Self {
        let supported = AcceptRoles::supported(features);
        let mut entries = NEW_PROCEDURES;
        for (value, entry) in entries.iter_mut().enumerate() {
            let enabled = features.is_enabled(entry.kind)
                && (value != Opcode::PERIPHERAL_FEATURE_REQ.index()
                    || features.peripheral_feature_exchange);
            let accept = entry.accept.intersection(supported);
            *entry = if enabled && accept != AcceptRoles::NONE {
                Entry::new(entry.kind, accept)
            } else {
                Entry::NONE
            };
        }
        Self { entries }
    }

    /// The procedure started by `opcode` when received in `role`
    pub fn lookup(&self, opcode: Opcode, role: Role) -> ProcedureKind {
        match self.entries.get(opcode.index()) {
            Some(entry) if entry.accept.contains(role) => entry.kind,
            _ => ProcedureKind::Unknown,
        }
    }

    /// Roles in which `opcode` starts a procedure
    pub fn accepted_roles(&self, opcode: Opcode) -> AcceptRoles {
        self.entries
            .get(opcode.index())
            .map_or(AcceptRoles::NONE, |entry| entry.accept)
    }

    /// Every procedure kind some opcode may resolve to
    pub fn kinds(&self) -> impl Iterator<Item = ProcedureKind> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.accept != AcceptRoles::NONE)
            .map(|entry| entry.kind)
    }
}
