use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::channel::{ChannelTransport, NullTransport};
use crate::ice::IceCreds;
use crate::{ConstructionError, PeerConnection};

/// Customized config for creating a [`PeerConnection`] instance.
///
/// ```
/// use jsep::{BundlePolicy, IceServer, PeerConfig};
///
/// let pc = PeerConfig::new()
///     .add_ice_server(IceServer::new("stun:stun.example.com:3478"))
///     .set_bundle_policy(BundlePolicy::MaxBundle)
///     .build()
///     .unwrap();
/// ```
///
/// Configs implement [`Clone`] to help create multiple `PeerConnection` instances.
/// They can also be read from JSON in the shape of a W3C `RTCConfiguration`,
/// i.e. `{"iceServers":[..],"bundlePolicy":"max-bundle","iceTransportPolicy":"all"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeerConfig {
    pub(crate) ice_servers: Vec<IceServer>,
    pub(crate) ice_candidate_pool_size: u8,
    pub(crate) bundle_policy: BundlePolicy,
    pub(crate) ice_transport_policy: IceCandidatePolicy,
    pub(crate) rtcp_mux_policy: RtcpMuxPolicy,
    #[serde(skip)]
    pub(crate) local_ice_credentials: Option<IceCreds>,
    pub(crate) sctp_port: u16,
    pub(crate) max_message_size: u32,
}

/// A STUN or TURN server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    /// One or more `stun:`, `stuns:`, `turn:` or `turns:` urls.
    pub urls: Vec<String>,
    /// Required for TURN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Required for TURN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// Which media to bundle on a single transport.
///
/// Only a single data channel m-line is ever produced, so this does not change
/// the generated SDP. It can however not be changed once set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundlePolicy {
    #[default]
    Balanced,
    MaxBundle,
    MaxCompat,
    MaxBundleAndRtcpMux,
}

/// Which ICE candidates are allowed.
///
/// Only [`IceCandidatePolicy::All`] is supported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IceCandidatePolicy {
    #[default]
    All,
    Public,
    Relay,
}

/// Whether RTCP must be muxed with RTP.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RtcpMuxPolicy {
    #[default]
    Require,
    Negotiate,
}

/// Problems with a [`PeerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The ICE candidate policy is not [`IceCandidatePolicy::All`].
    #[error("ICE candidate policy is not supported: {0}")]
    UnsupportedIceCandidatePolicy(IceCandidatePolicy),

    /// An [`IceServer`] without urls.
    #[error("ICE server without urls")]
    NoUrls,

    /// An url that isn't one of `stun:`, `stuns:`, `turn:` or `turns:`.
    #[error("Bad ICE server url: {0}")]
    InvalidUrl(String),

    /// A TURN url without username and credential.
    #[error("TURN server without username/credential: {0}")]
    MissingTurnCredentials(String),
}

impl PeerConfig {
    /// Creates a new default config.
    pub fn new() -> Self {
        PeerConfig::default()
    }

    /// The configured STUN/TURN servers.
    pub fn ice_servers(&self) -> &[IceServer] {
        &self.ice_servers
    }

    /// Add a STUN/TURN server.
    ///
    /// Servers are informational for this crate, they are validated but not contacted.
    pub fn add_ice_server(mut self, server: IceServer) -> Self {
        self.ice_servers.push(server);
        self
    }

    /// Size of the prefetched ICE candidate pool.
    pub fn ice_candidate_pool_size(&self) -> u8 {
        self.ice_candidate_pool_size
    }

    /// Set size of the prefetched ICE candidate pool.
    ///
    /// Defaults to 0.
    pub fn set_ice_candidate_pool_size(mut self, size: u8) -> Self {
        self.ice_candidate_pool_size = size;
        self
    }

    /// The bundle policy.
    pub fn bundle_policy(&self) -> BundlePolicy {
        self.bundle_policy
    }

    /// Set the bundle policy.
    ///
    /// Defaults to [`BundlePolicy::Balanced`].
    pub fn set_bundle_policy(mut self, policy: BundlePolicy) -> Self {
        self.bundle_policy = policy;
        self
    }

    /// The ICE candidate policy.
    pub fn ice_candidate_policy(&self) -> IceCandidatePolicy {
        self.ice_transport_policy
    }

    /// Set the ICE candidate policy.
    ///
    /// Anything but [`IceCandidatePolicy::All`] makes [`PeerConfig::build()`] fail.
    pub fn set_ice_candidate_policy(mut self, policy: IceCandidatePolicy) -> Self {
        self.ice_transport_policy = policy;
        self
    }

    /// The RTCP mux policy.
    pub fn rtcp_mux_policy(&self) -> RtcpMuxPolicy {
        self.rtcp_mux_policy
    }

    /// Set the RTCP mux policy.
    ///
    /// Defaults to [`RtcpMuxPolicy::Require`].
    pub fn set_rtcp_mux_policy(mut self, policy: RtcpMuxPolicy) -> Self {
        self.rtcp_mux_policy = policy;
        self
    }

    /// Get the local ICE credentials, if set.
    ///
    /// If not specified, local credentials will be randomly generated when
    /// building the [`PeerConnection`] instance.
    pub fn local_ice_credentials(&self) -> Option<&IceCreds> {
        self.local_ice_credentials.as_ref()
    }

    /// Explicitly sets local ICE credentials.
    pub fn set_local_ice_credentials(mut self, local_ice_credentials: IceCreds) -> Self {
        self.local_ice_credentials = Some(local_ice_credentials);
        self
    }

    /// The SCTP port announced in `a=sctp-port`.
    pub fn sctp_port(&self) -> u16 {
        self.sctp_port
    }

    /// Set the SCTP port announced in `a=sctp-port`.
    ///
    /// Defaults to 5000.
    pub fn set_sctp_port(mut self, port: u16) -> Self {
        self.sctp_port = port;
        self
    }

    /// The max message size announced in `a=max-message-size`.
    pub fn max_message_size(&self) -> u32 {
        self.max_message_size
    }

    /// Set the max message size announced in `a=max-message-size`.
    ///
    /// Defaults to 262144.
    pub fn set_max_message_size(mut self, size: u32) -> Self {
        self.max_message_size = size;
        self
    }

    /// Check the config can be used by a [`PeerConnection`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ice_transport_policy != IceCandidatePolicy::All {
            return Err(ConfigError::UnsupportedIceCandidatePolicy(
                self.ice_transport_policy,
            ));
        }

        for server in &self.ice_servers {
            server.validate()?;
        }

        Ok(())
    }

    /// Create a [`PeerConnection`] instance using this config.
    ///
    /// Data channels are handed to a [`NullTransport`].
    pub fn build(self) -> Result<PeerConnection, ConstructionError> {
        self.build_with_transport(NullTransport::default())
    }

    /// Create a [`PeerConnection`] instance that opens data channels in `transport`.
    pub fn build_with_transport(
        self,
        transport: impl ChannelTransport + Send + 'static,
    ) -> Result<PeerConnection, ConstructionError> {
        PeerConnection::new_from_config(self, Box::new(transport))
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![],
            ice_candidate_pool_size: 0,
            bundle_policy: BundlePolicy::default(),
            ice_transport_policy: IceCandidatePolicy::default(),
            rtcp_mux_policy: RtcpMuxPolicy::default(),
            local_ice_credentials: None,
            sctp_port: 5000,
            max_message_size: 262_144,
        }
    }
}

impl IceServer {
    /// A server without credentials, typically STUN.
    pub fn new(url: impl Into<String>) -> Self {
        IceServer {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    /// A server with credentials, typically TURN.
    pub fn with_credentials(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        IceServer {
            urls: vec![url.into()],
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.urls.is_empty() {
            return Err(ConfigError::NoUrls);
        }

        for url in &self.urls {
            let Some((scheme, rest)) = url.split_once(':') else {
                return Err(ConfigError::InvalidUrl(url.clone()));
            };

            if rest.is_empty() {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }

            match scheme {
                "stun" | "stuns" => {}
                "turn" | "turns" => {
                    if self.username.is_none() || self.credential.is_none() {
                        return Err(ConfigError::MissingTurnCredentials(url.clone()));
                    }
                }
                _ => return Err(ConfigError::InvalidUrl(url.clone())),
            }
        }

        Ok(())
    }
}

impl fmt::Display for BundlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            BundlePolicy::Balanced => "balanced",
            BundlePolicy::MaxBundle => "max-bundle",
            BundlePolicy::MaxCompat => "max-compat",
            BundlePolicy::MaxBundleAndRtcpMux => "max-bundle-and-rtcp-mux",
        };
        write!(f, "{x}")
    }
}

impl fmt::Display for IceCandidatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            IceCandidatePolicy::All => "all",
            IceCandidatePolicy::Public => "public",
            IceCandidatePolicy::Relay => "relay",
        };
        write!(f, "{x}")
    }
}
