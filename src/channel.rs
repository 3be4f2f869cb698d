//! Data channel related types.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Identifier of a data channel.
///
/// Either the id requested in [`DataChannelInit::id`], or one allocated by the
/// [`PeerConnection`][crate::PeerConnection].
// No From, ids are only created inside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId(u16);

impl Deref for ChannelId {
    type Target = u16;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a data channel belongs to.
///
/// The owner is handed to the [`ChannelTransport`] when the channel is opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelOwner(String);

impl ChannelOwner {
    pub fn new(name: impl Into<String>) -> Self {
        ChannelOwner(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settings for a new data channel, as in the W3C `RTCDataChannelInit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataChannelInit {
    /// Whether messages are delivered in order.
    ///
    /// Defaults to true.
    pub ordered: bool,

    /// Max time in milliseconds to try delivering a message.
    ///
    /// Can't be combined with `max_retransmits`.
    pub max_packet_life_time: Option<u16>,

    /// Max number of times to retransmit a message.
    ///
    /// Can't be combined with `max_packet_life_time`.
    pub max_retransmits: Option<u16>,

    /// Subprotocol name.
    pub protocol: String,

    /// Whether the channel is negotiated out-of-band by the application.
    pub negotiated: bool,

    /// Requested channel id. 0 means allocate one.
    pub id: u16,
}

impl Default for DataChannelInit {
    fn default() -> Self {
        DataChannelInit {
            ordered: true,
            max_packet_life_time: None,
            max_retransmits: None,
            protocol: String::new(),
            negotiated: false,
            id: 0,
        }
    }
}

impl DataChannelInit {
    pub(crate) fn validate(&self, label: &str) -> Result<(), ValidationError> {
        if self.max_packet_life_time.is_some() && self.max_retransmits.is_some() {
            return Err(ValidationError::ConflictingReliability);
        }

        // Both are sent as u16 length prefixed strings in DCEP.
        if label.len() > u16::MAX as usize {
            return Err(ValidationError::LabelTooLong);
        }
        if self.protocol.len() > u16::MAX as usize {
            return Err(ValidationError::ProtocolTooLong);
        }

        Ok(())
    }

    fn reliability(&self) -> Reliability {
        if let Some(lifetime) = self.max_packet_life_time {
            Reliability::MaxPacketLifetime { lifetime }
        } else if let Some(retransmits) = self.max_retransmits {
            Reliability::MaxRetransmits { retransmits }
        } else {
            Reliability::Reliable
        }
    }

    /// The channel config this init resolves to, once the id is known.
    pub(crate) fn resolve(&self, id: ChannelId, label: &str) -> ChannelConfig {
        ChannelConfig {
            label: label.to_string(),
            ordered: self.ordered,
            reliability: self.reliability(),
            negotiated: self.negotiated.then_some(*id),
            protocol: self.protocol.clone(),
        }
    }
}

/// (Low level) configuration for a data channel.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ChannelConfig {
    /// The label to use for the user to identify the channel.
    pub label: String,
    /// Whether channel is guaranteed ordered delivery of messages.
    pub ordered: bool,
    /// The reliability setting, which can allow to drop messages.
    pub reliability: Reliability,
    /// Whether channel is negotiated in-band (DCEP) or out-of-band.
    /// None means in-band negotiated. Some(id) means out-of-band.
    pub negotiated: Option<u16>,
    /// Protocol name.
    ///
    /// Defaults to ""
    pub protocol: String,
}

/// Reliability setting of a data channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reliability {
    /// Packets are delivered in order, with retransmits.
    #[default]
    Reliable,
    /// Packets delivered out of order with a max lifetime.
    MaxPacketLifetime {
        /// The lifetime of a packet in milliseconds.
        lifetime: u16,
    },
    /// Packets delivered out of order with a max number of retransmits.
    MaxRetransmits {
        /// Number of retransmits before giving up.
        retransmits: u16,
    },
}

/// Handle to a channel opened in a [`ChannelTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportHandle(pub u64);

/// The unit that delivers bytes for data channels.
///
/// This crate never sends data itself, it only tells the transport when a channel
/// is created and when the connection is torn down. Implementations must not block,
/// anything slow is to be reported back to the connection later.
pub trait ChannelTransport {
    /// Open a channel for `owner`, returning a handle to it.
    fn open(&mut self, owner: &ChannelOwner, id: ChannelId, config: &ChannelConfig)
        -> TransportHandle;

    /// Close a previously opened channel.
    fn close(&mut self, handle: TransportHandle);
}

/// Transport that opens nothing, but hands out unique handles.
#[derive(Debug, Default)]
pub struct NullTransport {
    next_handle: u64,
}

impl ChannelTransport for NullTransport {
    fn open(&mut self, _: &ChannelOwner, _: ChannelId, _: &ChannelConfig) -> TransportHandle {
        let handle = TransportHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn close(&mut self, _: TransportHandle) {}
}

/// A data channel as registered in a [`PeerConnection`][crate::PeerConnection].
///
/// Get this from [`PeerConnection::create_data_channel()`][crate::PeerConnection::create_data_channel()].
/// It is a snapshot, holding it does not keep the channel alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChannel {
    id: ChannelId,
    owner: ChannelOwner,
    config: ChannelConfig,
    handle: TransportHandle,
}

impl DataChannel {
    pub(crate) fn new(
        id: ChannelId,
        owner: ChannelOwner,
        config: ChannelConfig,
        handle: TransportHandle,
    ) -> Self {
        DataChannel {
            id,
            owner,
            config,
            handle,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    pub fn owner(&self) -> &ChannelOwner {
        &self.owner
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// The handle the [`ChannelTransport`] gave this channel.
    pub fn handle(&self) -> TransportHandle {
        self.handle
    }
}

#[derive(Debug)]
pub(crate) struct ChannelRegistry {
    channels: Vec<DataChannel>,
    next_channel_id: u16,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        ChannelRegistry {
            channels: vec![],
            next_channel_id: 1,
        }
    }
}

impl ChannelRegistry {
    /// Pick the id for a new channel.
    ///
    /// The requested id is used unless it is 0 or taken, in which case the next free
    /// id from the counter is allocated instead.
    pub fn allocate(&mut self, requested: u16) -> Result<ChannelId, ValidationError> {
        if requested != 0 && !self.contains(requested) {
            return Ok(ChannelId(requested));
        }

        let id = self.next_channel_id()?;

        if requested != 0 {
            warn!("Channel id {} is taken, using: {}", requested, id);
        }

        Ok(id)
    }

    pub fn insert(&mut self, channel: DataChannel) {
        debug!("Register channel {}: {:?}", channel.id, channel.config.label);
        self.channels.push(channel);
    }

    pub fn get(&self, id: ChannelId) -> Option<&DataChannel> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataChannel> {
        self.channels.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Remove all channels at once.
    pub fn drain(&mut self) -> Vec<DataChannel> {
        std::mem::take(&mut self.channels)
    }

    fn contains(&self, id: u16) -> bool {
        self.channels.iter().any(|c| *c.id == id)
    }

    /// Allocate next available `ChannelId`.
    fn next_channel_id(&mut self) -> Result<ChannelId, ValidationError> {
        loop {
            let id = self.next_channel_id;
            if id == 0 {
                // Wrapped, every id has been handed out once.
                return Err(ValidationError::NoChannelIdAvailable);
            }
            self.next_channel_id = id.wrapping_add(1);

            if !self.contains(id) {
                return Ok(ChannelId(id));
            }
        }
    }
}
