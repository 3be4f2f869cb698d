//! Descriptions exchanged during negotiation, and the options used to create them.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::sdp::{SdpError, SessionDescription};

mod sdp;
pub(crate) use sdp::{answer_sdp, offer_sdp, with_origin, LocalParams};

/// A description as passed to `set_local_description` or `set_remote_description`.
///
/// Serializes to the W3C JSON shape `{"type":"offer","sdp":"v=0\r\n..."}`.
///
/// ```
/// # use jsep::RtcSessionDescription;
/// let json = r#"{"type":"rollback"}"#;
/// let desc: RtcSessionDescription = serde_json::from_str(json).unwrap();
/// assert_eq!(desc, RtcSessionDescription::Rollback);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcSessionDescription {
    /// A new offer.
    Offer(SessionDescription),
    /// A provisional answer, the offer/answer exchange is not complete.
    Pranswer(SessionDescription),
    /// The final answer.
    Answer(SessionDescription),
    /// Cancel the offer in progress.
    Rollback,
}

/// The `type` of a [`RtcSessionDescription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

/// Options for `create_offer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferOptions {
    /// Generate new ICE credentials, restarting ICE.
    pub ice_restart: bool,

    /// Legacy RTP data channels. Not supported, setting this fails the offer.
    pub rtp_data_channels: bool,
}

/// Options for `create_answer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerOptions {}

impl RtcSessionDescription {
    /// Parse SDP text into a description of the given type.
    ///
    /// The text is ignored for [`SdpType::Rollback`].
    pub fn from_sdp(typ: SdpType, sdp: &str) -> Result<Self, SdpError> {
        if typ == SdpType::Rollback {
            return Ok(RtcSessionDescription::Rollback);
        }

        let sdp = SessionDescription::parse(sdp)?;

        Ok(Self::from_parts(typ, sdp))
    }

    fn from_parts(typ: SdpType, sdp: SessionDescription) -> Self {
        match typ {
            SdpType::Offer => RtcSessionDescription::Offer(sdp),
            SdpType::Pranswer => RtcSessionDescription::Pranswer(sdp),
            SdpType::Answer => RtcSessionDescription::Answer(sdp),
            SdpType::Rollback => RtcSessionDescription::Rollback,
        }
    }

    pub fn sdp_type(&self) -> SdpType {
        match self {
            RtcSessionDescription::Offer(_) => SdpType::Offer,
            RtcSessionDescription::Pranswer(_) => SdpType::Pranswer,
            RtcSessionDescription::Answer(_) => SdpType::Answer,
            RtcSessionDescription::Rollback => SdpType::Rollback,
        }
    }

    /// The session description, `None` for rollback.
    pub fn sdp(&self) -> Option<&SessionDescription> {
        match self {
            RtcSessionDescription::Offer(v)
            | RtcSessionDescription::Pranswer(v)
            | RtcSessionDescription::Answer(v) => Some(v),
            RtcSessionDescription::Rollback => None,
        }
    }

    /// Turn an answer into a provisional answer.
    ///
    /// Anything but an answer is returned as is.
    pub fn into_pranswer(self) -> Self {
        match self {
            RtcSessionDescription::Answer(v) => RtcSessionDescription::Pranswer(v),
            _ => self,
        }
    }
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            SdpType::Offer => "offer",
            SdpType::Pranswer => "pranswer",
            SdpType::Answer => "answer",
            SdpType::Rollback => "rollback",
        };
        write!(f, "{x}")
    }
}

impl Serialize for RtcSessionDescription {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.sdp().is_some() { 2 } else { 1 };
        let mut o = s.serialize_struct("RTCSessionDescription", len)?;
        o.serialize_field("type", &self.sdp_type())?;
        if let Some(sdp) = self.sdp() {
            o.serialize_field("sdp", &sdp.to_string())?;
        }
        o.end()
    }
}

impl<'de> Deserialize<'de> for RtcSessionDescription {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Json {
            #[serde(rename = "type")]
            typ: SdpType,
            #[serde(default)]
            sdp: Option<String>,
        }

        let json = Json::deserialize(d)?;

        match (json.typ, json.sdp) {
            (SdpType::Rollback, _) => Ok(RtcSessionDescription::Rollback),
            (typ, Some(sdp)) => RtcSessionDescription::from_sdp(typ, &sdp).map_err(de::Error::custom),
            (typ, None) => Err(de::Error::custom(format!("{typ} without sdp"))),
        }
    }
}
