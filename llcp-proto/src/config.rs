use thiserror::Error;

use crate::{ProcedureKind, Role};

/// Optional link layer features compiled into the local controller
///
/// Feature exchange, version exchange and termination are mandatory and always enabled.
/// Procedures that only a central may start (connection update, channel map update, encryption)
/// are only accepted when the peripheral role is supported, and vice versa.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Features {
    /// The local controller can act as central
    pub central: bool,
    /// The local controller can act as peripheral
    pub peripheral: bool,
    /// LE ping
    pub le_ping: bool,
    /// Minimum number of used channels indication
    pub min_used_channels: bool,
    /// Link encryption
    pub encryption: bool,
    /// PHY update
    pub phy_update: bool,
    /// Connection parameters request
    pub conn_param_request: bool,
    /// Data length extension
    pub data_length: bool,
    /// Locally initiated CTE requests
    pub cte_request: bool,
    /// Responding to CTE requests from the peer
    pub cte_response: bool,
    /// Feature exchange started by the peripheral
    pub peripheral_feature_exchange: bool,
}

impl Features {
    /// Whether remote procedures of `kind` can be admitted at all
    pub fn is_enabled(&self, kind: ProcedureKind) -> bool {
        use ProcedureKind::*;
        match kind {
            Unknown => false,
            FeatureExchange | VersionExchange | Terminate => true,
            ConnectionUpdate | ChannelMapUpdate => self.peripheral,
            EncryptionStart | EncryptionPause => self.encryption && self.peripheral,
            MinUsedChannels => self.min_used_channels && self.central,
            Ping => self.le_ping,
            PhyUpdate => self.phy_update,
            ConnectionParamRequest => self.conn_param_request,
            DataLengthUpdate => self.data_length,
            CteRequest => self.cte_response,
        }
    }

    /// Whether `role` is supported
    pub fn supports(&self, role: Role) -> bool {
        match role {
            Role::Central => self.central,
            Role::Peripheral => self.peripheral,
        }
    }

    /// Whether a paused local CTE command has to be tracked
    pub(crate) fn tracks_paused_cmd(&self) -> bool {
        self.cte_request || self.cte_response
    }
}

impl Default for Features {
    fn default() -> Self {
        Self {
            central: true,
            peripheral: true,
            le_ping: true,
            min_used_channels: true,
            encryption: true,
            phy_update: true,
            conn_param_request: true,
            data_length: true,
            cte_request: false,
            cte_response: false,
            peripheral_feature_exchange: true,
        }
    }
}

/// Parameters governing the remote request engine of a connection
///
/// Default values enable every feature except constant tone extensions and allow four remote
/// procedures to be pending at once.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub(crate) features: Features,
    pub(crate) max_pending_procedures: usize,
}

impl EngineConfig {
    /// Upper bound for [`EngineConfig::max_pending_procedures`]
    pub const MAX_PENDING_PROCEDURES: usize = 32;

    /// Set of procedures and roles supported by the local controller
    pub fn features(&mut self, value: Features) -> &mut Self {
        self.features = value;
        self
    }

    /// Get the configured feature set
    pub fn get_features(&self) -> &Features {
        &self.features
    }

    /// Maximum number of remote procedures that may be pending on one connection
    ///
    /// Remote procedures arriving while this many are pending are dropped. Must be between 1
    /// and [`EngineConfig::MAX_PENDING_PROCEDURES`].
    pub fn max_pending_procedures(&mut self, value: usize) -> Result<&mut Self, ConfigError> {
        if !(1..=Self::MAX_PENDING_PROCEDURES).contains(&value) {
            return Err(ConfigError::OutOfBounds);
        }
        self.max_pending_procedures = value;
        Ok(self)
    }

    /// Get the maximum number of pending remote procedures
    pub fn get_max_pending_procedures(&self) -> usize {
        self.max_pending_procedures
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            features: Features::default(),
            max_pending_procedures: 4,
        }
    }
}

/// Errors in the configuration of a connection
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Value exceeds supported bounds
    #[error("value exceeds supported bounds")]
    OutOfBounds,
    /// An enabled procedure kind has no handler to dispatch to
    #[error("no handler registered for {0}")]
    MissingHandler(ProcedureKind),
    /// The connection role is not supported by the configured features
    #[error("{0} role is not supported")]
    RoleNotSupported(Role),
}
