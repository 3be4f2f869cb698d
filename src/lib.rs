//! SDP and JSEP offer/answer negotiation for WebRTC style peer connections.
//!
//! This crate has two halves:
//!
//! 1. [`sdp`] is a grammar exact parser and serializer of Session Description
//!    Protocol text (RFC 4566/8866).
//! 2. [`PeerConnection`] runs the JSEP (RFC 8829) signaling state machine on top of
//!    that, and keeps the registry of data channels.
//!
//! This is [Sans I/O][sansio]. A `PeerConnection` does no network talking
//! and has no internal threads or async tasks. Every operation happens in a call to the
//! public API, taking `&mut self`, which makes the operations on one connection strictly
//! sequential. Put the instance behind a `Mutex` or give it to a single task to share it.
//!
//! ICE gathering, DTLS and SCTP are left to other crates. Generated descriptions use
//! the placeholder transport address (`9` / `IN IP4 0.0.0.0`) and data channels are
//! handed to a [`ChannelTransport`][channel::ChannelTransport].
//!
//! # Usage
//!
//! ```
//! use jsep::{AnswerOptions, OfferOptions, PeerConfig, RtcSessionDescription, SignalingState};
//! use jsep::channel::{ChannelOwner, DataChannelInit};
//!
//! let mut alice = PeerConfig::new().build().unwrap();
//! let mut bob = PeerConfig::new().build().unwrap();
//!
//! let owner = ChannelOwner::new("app");
//! alice.create_data_channel(owner, "chat", DataChannelInit::default()).unwrap();
//!
//! let offer = alice.create_offer(OfferOptions::default()).unwrap();
//! alice.set_local_description(offer.clone()).unwrap();
//!
//! // Send the offer over some signaling channel, as JSON.
//! let json = serde_json::to_string(&offer).unwrap();
//! let offer: RtcSessionDescription = serde_json::from_str(&json).unwrap();
//!
//! bob.set_remote_description(offer).unwrap();
//! let answer = bob.create_answer(AnswerOptions::default()).unwrap();
//! bob.set_local_description(answer.clone()).unwrap();
//!
//! alice.set_remote_description(answer).unwrap();
//!
//! assert_eq!(alice.signaling_state(), SignalingState::Stable);
//! assert_eq!(bob.signaling_state(), SignalingState::Stable);
//! ```
//!
//! # Logging
//!
//! Logging goes through [`tracing`](https://docs.rs/tracing). Signaling state changes
//! and channel allocations are at `debug`, rejected input at `warn`.
//!
//! [sansio]: https://sans-io.readthedocs.io

#![forbid(unsafe_code)]
#![allow(clippy::new_without_default)]

#[macro_use]
extern crate tracing;

use std::fmt;

use thiserror::Error;

pub mod sdp;
use sdp::{SdpError, SdpParseError, SessionDescription};

mod config;
pub use config::{BundlePolicy, ConfigError, IceCandidatePolicy, IceServer, PeerConfig};
pub use config::RtcpMuxPolicy;

pub mod channel;
use channel::{ChannelId, ChannelOwner, ChannelRegistry, ChannelTransport};
use channel::{DataChannel, DataChannelInit};

pub mod change;
pub use change::{AnswerOptions, OfferOptions, RtcSessionDescription, SdpType};
use change::{answer_sdp, offer_sdp, with_origin, LocalParams};

mod signaling;
pub use signaling::SignalingState;
use signaling::Side;

mod ice;
pub use ice::IceCreds;

mod id;

/// Errors for the whole negotiation engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RtcError {
    /// SDP errors.
    #[error("{0}")]
    Sdp(#[from] SdpError),

    /// A request that is not allowed in the current state.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The connection could not be created.
    #[error("{0}")]
    Construction(#[from] ConstructionError),
}

impl RtcError {
    /// Whether the error means there is no usable connection.
    ///
    /// Everything but construction errors leave the connection as it was before the
    /// failing call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RtcError::Construction(_))
    }
}

impl From<SdpParseError> for RtcError {
    fn from(v: SdpParseError) -> Self {
        RtcError::Sdp(v.into())
    }
}

/// A request that violates a precondition. The connection remains usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The new configuration is not usable.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Legacy RTP data channels were requested.
    #[error("RTP data channels are not supported")]
    RtpDataChannels,

    /// The operation is not allowed in this signaling state.
    #[error("Can't {op} in state: {state}")]
    InvalidState {
        /// The attempted operation.
        op: &'static str,
        /// The state at the time.
        state: SignalingState,
    },

    /// Rollback is only allowed with a pending offer from the same side.
    #[error("Can't rollback in state: {0}")]
    RollbackNotAllowed(SignalingState),

    /// The connection is closed.
    #[error("Connection is closed")]
    Closed,

    /// Creating an answer without a remote offer.
    #[error("No remote offer to answer")]
    NoRemoteOffer,

    /// Both `max_retransmits` and `max_packet_life_time` are set.
    #[error("Data channel can't have both max retransmits and max packet lifetime")]
    ConflictingReliability,

    /// Data channel label longer than 65535 bytes.
    #[error("Data channel label is too long")]
    LabelTooLong,

    /// Data channel protocol longer than 65535 bytes.
    #[error("Data channel protocol is too long")]
    ProtocolTooLong,

    /// Every channel id is in use.
    #[error("No channel id available")]
    NoChannelIdAvailable,

    /// The bundle policy can't change once the connection is created.
    #[error("Bundle policy can't be changed")]
    BundlePolicyChanged,

    /// The RTCP mux policy can't change once the connection is created.
    #[error("RTCP mux policy can't be changed")]
    RtcpMuxPolicyChanged,
}

/// The configuration was refused when creating a [`PeerConnection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstructionError {
    /// The configuration is not usable.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// One end of an offer/answer negotiation.
///
/// Holds the signaling state, the local and remote descriptions and the data channels.
/// Created from a [`PeerConfig`].
///
/// Descriptions are never changed in place. Creating an offer or answer produces a
/// new [`SessionDescription`] which takes effect when it is passed to
/// [`PeerConnection::set_local_description()`].
pub struct PeerConnection {
    config: PeerConfig,
    state: SignalingState,
    session_id: u64,
    /// Used until a local description carries credentials.
    ice_creds: IceCreds,
    ice_restart_pending: bool,
    /// Last description handed out by create offer/answer. Its `sess-version`
    /// is the highest used so far.
    last_issued: Option<SessionDescription>,
    pending_local: Option<RtcSessionDescription>,
    current_local: Option<RtcSessionDescription>,
    pending_remote: Option<RtcSessionDescription>,
    current_remote: Option<RtcSessionDescription>,
    channels: ChannelRegistry,
    transport: Box<dyn ChannelTransport + Send>,
}

impl PeerConnection {
    /// Creates a config builder that configures a [`PeerConnection`].
    ///
    /// Same as [`PeerConfig::new()`].
    pub fn builder() -> PeerConfig {
        PeerConfig::new()
    }

    pub(crate) fn new_from_config(
        config: PeerConfig,
        transport: Box<dyn ChannelTransport + Send>,
    ) -> Result<Self, ConstructionError> {
        if let Err(e) = config.validate() {
            warn!("Refuse to create connection: {}", e);
            return Err(e.into());
        }

        let ice_creds = config
            .local_ice_credentials
            .clone()
            .unwrap_or_else(IceCreds::new);

        let session_id = id::session_id();
        debug!("New connection with session id: {}", session_id);

        Ok(PeerConnection {
            config,
            state: SignalingState::Stable,
            session_id,
            ice_creds,
            ice_restart_pending: false,
            last_issued: None,
            pending_local: None,
            current_local: None,
            pending_remote: None,
            current_remote: None,
            channels: ChannelRegistry::default(),
            transport,
        })
    }

    /// The current signaling state.
    pub fn signaling_state(&self) -> SignalingState {
        self.state
    }

    /// The configuration in use.
    pub fn config(&self) -> &PeerConfig {
        &self.config
    }

    /// Create an offer reflecting the current data channels.
    ///
    /// Allowed in [`SignalingState::Stable`] and [`SignalingState::HaveLocalOffer`].
    /// This does not change the signaling state, pass the result to
    /// [`PeerConnection::set_local_description()`] to apply it.
    ///
    /// The `sess-version` only increases, also across rollbacks. A description
    /// equal to the previously created one keeps its version.
    pub fn create_offer(
        &mut self,
        options: OfferOptions,
    ) -> Result<RtcSessionDescription, ValidationError> {
        if options.rtp_data_channels {
            warn!("Refuse offer with RTP data channels");
            return Err(ValidationError::RtpDataChannels);
        }

        match self.state {
            SignalingState::Stable | SignalingState::HaveLocalOffer => {}
            SignalingState::Closed => return Err(ValidationError::Closed),
            state => {
                return Err(ValidationError::InvalidState {
                    op: "create offer",
                    state,
                })
            }
        }

        let ice_creds = if options.ice_restart || self.ice_restart_pending {
            debug!("ICE restart in offer");
            IceCreds::new()
        } else {
            self.active_ice_creds()
        };

        let params = self.local_params(&ice_creds);
        let negotiated = self.current_local.as_ref().and_then(|d| d.sdp());
        let want_data = !self.channels.is_empty();

        let sdp = offer_sdp(&params, negotiated, want_data);
        let sdp = self.issue(sdp);

        Ok(RtcSessionDescription::Offer(sdp))
    }

    /// Create an answer to the remote offer.
    ///
    /// Allowed in [`SignalingState::HaveRemoteOffer`] and
    /// [`SignalingState::HaveLocalPranswer`]. Use
    /// [`RtcSessionDescription::into_pranswer()`] to apply it as a provisional answer.
    pub fn create_answer(
        &mut self,
        _options: AnswerOptions,
    ) -> Result<RtcSessionDescription, ValidationError> {
        if self.state == SignalingState::Closed {
            return Err(ValidationError::Closed);
        }

        if !self.state.has_remote_offer() {
            return Err(ValidationError::NoRemoteOffer);
        }

        let offer = self
            .pending_remote
            .as_ref()
            .and_then(|d| d.sdp())
            .ok_or(ValidationError::NoRemoteOffer)?;

        let remote_restart = {
            let now = offer.ice_creds();
            let before = self
                .current_remote
                .as_ref()
                .and_then(|d| d.sdp())
                .and_then(|d| d.ice_creds());
            before.is_some() && now != before
        };

        let ice_creds = if remote_restart || self.ice_restart_pending {
            debug!("ICE restart in answer");
            IceCreds::new()
        } else {
            self.active_ice_creds()
        };

        let params = self.local_params(&ice_creds);

        let sdp = answer_sdp(&params, offer);
        let sdp = self.issue(sdp);

        Ok(RtcSessionDescription::Answer(sdp))
    }

    /// Apply a local description.
    ///
    /// * offer: to [`SignalingState::HaveLocalOffer`]
    /// * answer: to [`SignalingState::Stable`]
    /// * pranswer: to [`SignalingState::HaveLocalPranswer`]
    /// * rollback: to [`SignalingState::Stable`], only from `HaveLocalOffer`
    ///
    /// On error nothing is changed.
    pub fn set_local_description(&mut self, desc: RtcSessionDescription) -> Result<(), RtcError> {
        let typ = desc.sdp_type();

        let next = self
            .state
            .apply(Side::Local, typ)
            .map_err(|e| self.rejected("local", e))?;

        if let Some(sdp) = desc.sdp() {
            sdp.assert_consistency()?;

            if matches!(typ, SdpType::Answer | SdpType::Pranswer) {
                let offer = self.pending_remote.as_ref().and_then(|d| d.sdp());
                check_answer(offer, sdp)?;
            }
        }

        match typ {
            SdpType::Offer => {
                self.ice_restart_pending = false;
                self.pending_local = Some(desc);
            }
            SdpType::Pranswer => {
                self.pending_local = Some(desc);
            }
            SdpType::Answer => {
                self.current_local = Some(desc);
                self.current_remote = self.pending_remote.take();
                self.pending_local = None;
            }
            SdpType::Rollback => {
                let rolled_back = self.pending_local.take();
                let creds = rolled_back.as_ref().and_then(|d| d.sdp()).and_then(|d| d.ice_creds());
                let active = self.active_ice_creds();
                if let Some((ufrag, pass)) = creds {
                    if ufrag != active.ufrag || pass != active.pass {
                        // Rolled back an ICE restart, it must be offered again.
                        self.ice_restart_pending = true;
                    }
                }
            }
        }

        self.set_state(next);

        Ok(())
    }

    /// Apply a remote description.
    ///
    /// * offer: to [`SignalingState::HaveRemoteOffer`]
    /// * answer: to [`SignalingState::Stable`]
    /// * pranswer: to [`SignalingState::HaveRemotePranswer`]
    /// * rollback: to [`SignalingState::Stable`], only from `HaveRemoteOffer`
    ///
    /// On error nothing is changed.
    pub fn set_remote_description(&mut self, desc: RtcSessionDescription) -> Result<(), RtcError> {
        let typ = desc.sdp_type();

        let next = self
            .state
            .apply(Side::Remote, typ)
            .map_err(|e| self.rejected("remote", e))?;

        if let Some(sdp) = desc.sdp() {
            if let Err(e) = sdp.assert_consistency() {
                warn!("Remote SDP rejected: {}", e);
                return Err(e.into());
            }

            if matches!(typ, SdpType::Answer | SdpType::Pranswer) {
                let offer = self.pending_local.as_ref().and_then(|d| d.sdp());
                if let Err(e) = check_answer(offer, sdp) {
                    warn!("Remote SDP rejected: {}", e);
                    return Err(e.into());
                }
            }
        }

        match typ {
            SdpType::Offer | SdpType::Pranswer => {
                self.pending_remote = Some(desc);
            }
            SdpType::Answer => {
                self.current_remote = Some(desc);
                self.current_local = self.pending_local.take();
                self.pending_remote = None;
            }
            SdpType::Rollback => {
                self.pending_remote = None;
            }
        }

        self.set_state(next);

        Ok(())
    }

    /// Parse and apply a remote description.
    ///
    /// Parse failures are returned as [`RtcError::Sdp`] and leave the state untouched.
    pub fn set_remote_description_sdp(&mut self, typ: SdpType, sdp: &str) -> Result<(), RtcError> {
        let desc = match RtcSessionDescription::from_sdp(typ, sdp) {
            Ok(v) => v,
            Err(SdpError::Parse(e)) => {
                warn!(
                    "Remote SDP rejected at line {}, column {}:\n{}",
                    e.line,
                    e.column,
                    e.trace()
                );
                return Err(SdpError::Parse(e).into());
            }
            Err(e) => {
                warn!("Remote SDP rejected: {}", e);
                return Err(e.into());
            }
        };

        self.set_remote_description(desc)
    }

    /// The local description in effect, pending or current.
    ///
    /// `None` before any local description is set, and once the connection is closed.
    pub fn local_description(&self) -> Option<&RtcSessionDescription> {
        self.pending_local.as_ref().or(self.current_local.as_ref())
    }

    /// The remote description in effect, pending or current.
    ///
    /// `None` before any remote description is set, and once the connection is closed.
    pub fn remote_description(&self) -> Option<&RtcSessionDescription> {
        self.pending_remote.as_ref().or(self.current_remote.as_ref())
    }

    /// The local offer or pranswer of an exchange in progress.
    pub fn pending_local_description(&self) -> Option<&RtcSessionDescription> {
        self.pending_local.as_ref()
    }

    /// The local description of the last completed exchange.
    pub fn current_local_description(&self) -> Option<&RtcSessionDescription> {
        self.current_local.as_ref()
    }

    /// The remote offer or pranswer of an exchange in progress.
    pub fn pending_remote_description(&self) -> Option<&RtcSessionDescription> {
        self.pending_remote.as_ref()
    }

    /// The remote description of the last completed exchange.
    pub fn current_remote_description(&self) -> Option<&RtcSessionDescription> {
        self.current_remote.as_ref()
    }

    /// Replace the configuration.
    ///
    /// Bundle and RTCP mux policies can't change. A change of ICE servers does not
    /// restart ICE by itself, the restart happens in the next
    /// [`PeerConnection::create_offer()`].
    pub fn set_configuration(&mut self, config: PeerConfig) -> Result<(), ValidationError> {
        if self.state == SignalingState::Closed {
            return Err(ValidationError::Closed);
        }

        if let Err(e) = config.validate() {
            warn!("Refuse configuration: {}", e);
            return Err(e.into());
        }

        if config.bundle_policy != self.config.bundle_policy {
            return Err(ValidationError::BundlePolicyChanged);
        }

        if config.rtcp_mux_policy != self.config.rtcp_mux_policy {
            return Err(ValidationError::RtcpMuxPolicyChanged);
        }

        if config.ice_servers != self.config.ice_servers {
            debug!("ICE servers changed, restart ICE in next offer");
            self.ice_restart_pending = true;
        }

        // Credentials are only read when the connection is created.
        let local_ice_credentials = self.config.local_ice_credentials.take();

        self.config = PeerConfig {
            local_ice_credentials,
            ..config
        };

        Ok(())
    }

    /// Create a data channel and register it.
    ///
    /// The id is [`DataChannelInit::id`] unless that is 0 or already taken, in which
    /// case the next free id is allocated. The channel is opened in the
    /// [`ChannelTransport`] before this returns.
    pub fn create_data_channel(
        &mut self,
        owner: ChannelOwner,
        label: &str,
        init: DataChannelInit,
    ) -> Result<DataChannel, ValidationError> {
        if self.state == SignalingState::Closed {
            return Err(ValidationError::Closed);
        }

        if let Err(e) = init.validate(label) {
            warn!("Refuse data channel {:?}: {}", label, e);
            return Err(e);
        }

        let id = self.channels.allocate(init.id)?;
        let config = init.resolve(id, label);

        let handle = self.transport.open(&owner, id, &config);

        let channel = DataChannel::new(id, owner, config, handle);
        self.channels.insert(channel.clone());

        Ok(channel)
    }

    /// Look up a registered data channel.
    pub fn channel(&self, id: ChannelId) -> Option<&DataChannel> {
        self.channels.get(id)
    }

    /// All registered data channels, in order of creation.
    pub fn channels(&self) -> impl Iterator<Item = &DataChannel> {
        self.channels.iter()
    }

    /// Whether a new offer/answer exchange is needed.
    ///
    /// That is when there are data channels, but no negotiated data channel m-line,
    /// or there is an ICE restart waiting to be offered.
    pub fn negotiation_needed(&self) -> bool {
        if self.state != SignalingState::Stable {
            return false;
        }

        let has_data = self
            .current_local
            .as_ref()
            .and_then(|d| d.sdp())
            .map(|d| d.media.iter().any(|m| m.is_data_channel() && !m.is_disabled()))
            .unwrap_or(false);

        self.ice_restart_pending || (!self.channels.is_empty() && !has_data)
    }

    /// Close the connection.
    ///
    /// All data channels are closed in the transport and removed, and all descriptions
    /// are dropped. This is terminal, every later operation fails with
    /// [`ValidationError::Closed`].
    pub fn close(&mut self) {
        if self.state == SignalingState::Closed {
            return;
        }

        for channel in self.channels.drain() {
            debug!("Close channel: {}", channel.id());
            self.transport.close(channel.handle());
        }

        self.pending_local = None;
        self.current_local = None;
        self.pending_remote = None;
        self.current_remote = None;

        self.set_state(SignalingState::Closed);
    }

    fn set_state(&mut self, next: SignalingState) {
        if self.state != next {
            debug!("Signaling state {} -> {}", self.state, next);
        }
        self.state = next;
    }

    /// Give the description its `o=` line and remember it as the last issued.
    fn issue(&mut self, sdp: SessionDescription) -> SessionDescription {
        let sdp = with_origin(sdp, self.last_issued.as_ref());
        self.last_issued = Some(sdp.clone());
        sdp
    }

    fn rejected(&self, side: &str, e: ValidationError) -> ValidationError {
        warn!("Refuse {} description in state {}: {}", side, self.state, e);
        e
    }

    fn local_sdp(&self) -> Option<&SessionDescription> {
        self.local_description().and_then(|d| d.sdp())
    }

    /// The ICE credentials of the local description, or the initial ones.
    fn active_ice_creds(&self) -> IceCreds {
        self.local_sdp()
            .and_then(|d| d.ice_creds())
            .map(|(ufrag, pass)| IceCreds {
                ufrag: ufrag.to_string(),
                pass: pass.to_string(),
            })
            .unwrap_or_else(|| self.ice_creds.clone())
    }

    fn local_params<'a>(&self, ice_creds: &'a IceCreds) -> LocalParams<'a> {
        LocalParams {
            session_id: self.session_id,
            ice_creds,
            sctp_port: self.config.sctp_port,
            max_message_size: self.config.max_message_size,
        }
    }
}

impl fmt::Debug for PeerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerConnection")
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .field("ice_restart_pending", &self.ice_restart_pending)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

/// An answer must have one m-line per offered m-line, with the same mids.
fn check_answer(
    offer: Option<&SessionDescription>,
    answer: &SessionDescription,
) -> Result<(), SdpError> {
    let Some(offer) = offer else {
        return Ok(());
    };

    if offer.media.len() != answer.media.len() {
        return Err(SdpError::Inconsistent(format!(
            "Answer has {} m-lines, offer has {}",
            answer.media.len(),
            offer.media.len()
        )));
    }

    for (o, a) in offer.media.iter().zip(answer.media.iter()) {
        if o.mid() != a.mid() {
            return Err(SdpError::Inconsistent(format!(
                "Answer mid {:?} does not match offer mid {:?}",
                a.mid(),
                o.mid()
            )));
        }
    }

    Ok(())
}
