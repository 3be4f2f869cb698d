use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use combine::stream::position;
use combine::EasyParser;

use super::parser::sdp_parser;
use super::{SdpError, SdpParseError};

/// A parsed session description.
///
/// Values are immutable snapshots. Changing a description means building a new one.
///
/// A value survives `parse(serialize(d)) == d` as long as it stays inside the SDP
/// domain:
///
/// * text fields contain no CR/LF. They may be empty.
/// * `session_name` and `origin.username` are never `Some("-")`, `-` is how `None`
///   is written and reads back as `None`.
/// * token fields (username, addresses, media formats) are non-empty and contain
///   no spaces.
/// * attribute names are non-empty and contain no `:`. A [`Attribute::Flag`] with
///   a `:` reads back as an [`Attribute::Value`].
/// * `timings` is non-empty and repeat times have at least one offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    /// `v=`
    pub version: Version,
    /// `o=`
    pub origin: Origin,
    /// `s=`. `None` is written as `s=-`.
    pub session_name: Option<String>,
    /// `i=`
    pub session_information: Option<String>,
    /// `u=`
    pub uri: Option<String>,
    /// `e=` lines in order.
    pub emails: Vec<String>,
    /// `p=` lines in order.
    pub phones: Vec<String>,
    /// `c=`
    pub connection: Option<Connection>,
    /// `b=` lines in order.
    pub bandwidths: Vec<Bandwidth>,
    /// `t=` lines, each with its following `r=` lines.
    pub timings: Vec<Timing>,
    /// `z=`
    pub time_zones: Vec<TimeZone>,
    /// `k=`
    pub encryption_key: Option<EncryptionKey>,
    /// Session level `a=` lines in order.
    pub attributes: Vec<Attribute>,
    /// The m-lines.
    pub media: Vec<MediaDescription>,
}

impl SessionDescription {
    /// Parse SDP text.
    pub fn parse(input: &str) -> Result<SessionDescription, SdpParseError> {
        trace!("Parse SDP ({} bytes)", input.len());

        sdp_parser()
            .easy_parse(position::Stream::new(input))
            .map(|(sdp, _)| sdp)
            .map_err(|e| SdpParseError::new(input, e))
    }

    /// First session level attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Test if there is a session level attribute with this name.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// The mids in `a=group:BUNDLE`, if there is such a group.
    pub fn bundle_group(&self) -> Option<Vec<&str>> {
        self.attributes.iter().find_map(|a| {
            let value = a.value_of("group")?;
            let mut parts = value.split(' ');
            if parts.next() != Some("BUNDLE") {
                return None;
            }
            Some(parts.filter(|p| !p.is_empty()).collect())
        })
    }

    /// ICE credentials, session level first, then the first m-line that has them.
    pub fn ice_creds(&self) -> Option<(&str, &str)> {
        let session = self
            .attribute("ice-ufrag")
            .and_then(Attribute::value)
            .zip(self.attribute("ice-pwd").and_then(Attribute::value));

        session.or_else(|| self.media.iter().find_map(|m| m.ice_creds()))
    }

    /// Find the m-line with this mid.
    pub fn media_by_mid(&self, mid: &str) -> Option<&MediaDescription> {
        self.media.iter().find(|m| m.mid() == Some(mid))
    }

    /// Check the description makes sense as a JSEP description.
    ///
    /// Every m-line must have a unique `a=mid` and every mid in `a=group:BUNDLE`
    /// must refer to an m-line.
    pub fn assert_consistency(&self) -> Result<(), SdpError> {
        match self.do_assert_consistency() {
            None => Ok(()),
            Some(error) => Err(SdpError::Inconsistent(error)),
        }
    }

    fn do_assert_consistency(&self) -> Option<String> {
        let mut seen: Vec<&str> = vec![];

        for (idx, m) in self.media.iter().enumerate() {
            let Some(mid) = m.mid() else {
                return Some(format!("m-line {idx} is missing a=mid"));
            };
            if seen.contains(&mid) {
                return Some(format!("Duplicate a=mid: {mid}"));
            }
            seen.push(mid);
        }

        if let Some(group) = self.bundle_group() {
            for mid in group {
                if !seen.contains(&mid) {
                    return Some(format!("a=group:BUNDLE refers to missing mid: {mid}"));
                }
            }
        }

        None
    }
}

impl FromStr for SessionDescription {
    type Err = SdpParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionDescription::parse(s)
    }
}

/// Protocol version from `v=`. Only version 0 exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    #[default]
    V0,
}

/// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// `None` is written as `-`.
    pub username: Option<String>,
    pub session_id: u64,
    pub session_version: u64,
    pub network_type: NetworkType,
    pub address_type: AddressType,
    pub unicast_address: String,
}

/// Network type. RFC 4566 only defines `IN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetworkType {
    #[default]
    Internet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressType {
    #[default]
    Ip4,
    Ip6,
}

/// `c=<nettype> <addrtype> <connection-address>`
///
/// For IP4 the address is followed by an optional `/<ttl>` and then an optional
/// `/<number of addresses>`. For IP6 there is no TTL, only the number of addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub network_type: NetworkType,
    pub address_type: AddressType,
    pub address: String,
    /// Multicast TTL, IP4 only.
    pub ttl: Option<u8>,
    /// Number of consecutive multicast addresses. For IP4 this requires `ttl`.
    pub count: Option<u32>,
}

impl Connection {
    /// `IN IP4 0.0.0.0`
    pub fn unspecified() -> Self {
        Connection {
            network_type: NetworkType::Internet,
            address_type: AddressType::Ip4,
            address: "0.0.0.0".into(),
            ttl: None,
            count: None,
        }
    }
}

/// `b=<bwtype>:<bandwidth>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bandwidth {
    pub typ: BandwidthType,
    /// Kilobits per second, except for `TIAS` which is bits per second.
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BandwidthType {
    /// `CT` conference total.
    ConferenceTotal,
    /// `AS` application specific.
    ApplicationSpecific,
    /// `RS` RTCP senders (RFC 3556).
    RtcpSenders,
    /// `RR` RTCP receivers (RFC 3556).
    RtcpReceivers,
    /// `TIAS` transport independent application specific (RFC 3890).
    Tias,
    /// `X-<name>`. Holds the name without the prefix.
    Experimental(String),
}

impl BandwidthType {
    pub(crate) fn from_token(s: &str) -> Option<Self> {
        use BandwidthType::*;
        Some(match s {
            "CT" => ConferenceTotal,
            "AS" => ApplicationSpecific,
            "RS" => RtcpSenders,
            "RR" => RtcpReceivers,
            "TIAS" => Tias,
            _ => {
                let name = s.strip_prefix("X-")?;
                if name.is_empty() {
                    return None;
                }
                Experimental(name.to_string())
            }
        })
    }
}

/// A `t=` line and the `r=` lines following it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    /// NTP start time. `None` is written as `0`, meaning unbounded.
    pub start: Option<NonZeroU64>,
    /// NTP stop time. `None` is written as `0`, meaning unbounded.
    pub stop: Option<NonZeroU64>,
    pub repeats: Vec<RepeatTime>,
}

impl Timing {
    /// `t=0 0`, the only timing used by WebRTC.
    pub fn unbounded() -> Self {
        Timing {
            start: None,
            stop: None,
            repeats: vec![],
        }
    }

    /// Start time where 0 means unbounded.
    pub fn start_secs(&self) -> u64 {
        self.start.map(NonZeroU64::get).unwrap_or(0)
    }

    /// Stop time where 0 means unbounded.
    pub fn stop_secs(&self) -> u64 {
        self.stop.map(NonZeroU64::get).unwrap_or(0)
    }
}

/// `r=<repeat interval> <active duration> <offsets from start-time>`
///
/// All values are normalized to seconds. The text form accepts `d`, `h`, `m`
/// and `s` unit suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatTime {
    pub interval: u64,
    pub duration: u64,
    /// At least one offset.
    pub offsets: Vec<u64>,
}

/// One `<adjustment time> <offset>` pair of a `z=` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZone {
    pub adjustment: u64,
    /// Signed offset in seconds.
    pub offset: i64,
}

/// `k=<method>` or `k=<method>:<encryption key>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptionKey {
    Prompt,
    Clear(String),
    Base64(String),
    Uri(String),
}

/// An `a=` line. Either `a=<name>` or `a=<name>:<value>`.
///
/// The name ends at the first `:`, the value may be empty and may contain `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    Flag(String),
    Value { name: String, value: String },
}

impl Attribute {
    /// Create a flag attribute.
    pub fn flag(name: impl Into<String>) -> Self {
        Attribute::Flag(name.into())
    }

    /// Create a name/value attribute.
    pub fn value_pair(name: impl Into<String>, value: impl ToString) -> Self {
        Attribute::Value {
            name: name.into(),
            value: value.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Attribute::Flag(name) => name,
            Attribute::Value { name, .. } => name,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Attribute::Flag(_) => None,
            Attribute::Value { value, .. } => Some(value),
        }
    }

    /// The value if this attribute has the given name.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        if self.name() == name {
            self.value()
        } else {
            None
        }
    }
}

/// An m-line with the lines belonging to it.
///
/// Nothing is inherited from the session level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescription {
    pub media_type: MediaType,
    pub port: u16,
    /// `<port>/<number of ports>`
    pub port_count: Option<u16>,
    pub protocol: Proto,
    pub formats: Vec<String>,
    /// `i=`
    pub title: Option<String>,
    /// `c=`
    pub connection: Option<Connection>,
    /// `b=` lines in order.
    pub bandwidths: Vec<Bandwidth>,
    /// `k=`
    pub encryption_key: Option<EncryptionKey>,
    /// Media level `a=` lines in order.
    pub attributes: Vec<Attribute>,
}

impl MediaDescription {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// `a=mid`
    pub fn mid(&self) -> Option<&str> {
        self.attribute("mid").and_then(Attribute::value)
    }

    /// `a=setup`
    pub fn setup(&self) -> Option<Setup> {
        self.attribute("setup")
            .and_then(Attribute::value)
            .and_then(Setup::from_line)
    }

    /// `a=sctp-port`
    pub fn sctp_port(&self) -> Option<u16> {
        self.attribute("sctp-port")
            .and_then(Attribute::value)
            .and_then(|v| v.parse().ok())
    }

    /// `a=max-message-size`
    pub fn max_message_size(&self) -> Option<u32> {
        self.attribute("max-message-size")
            .and_then(Attribute::value)
            .and_then(|v| v.parse().ok())
    }

    /// `a=fingerprint`, as `(hash function, fingerprint)`.
    pub fn fingerprint(&self) -> Option<(&str, &str)> {
        self.attribute("fingerprint")
            .and_then(Attribute::value)
            .and_then(|v| v.split_once(' '))
    }

    pub fn ice_creds(&self) -> Option<(&str, &str)> {
        let ufrag = self.attribute("ice-ufrag").and_then(Attribute::value)?;
        let pwd = self.attribute("ice-pwd").and_then(Attribute::value)?;
        Some((ufrag, pwd))
    }

    /// Port 0 means the m-line is rejected or disabled.
    pub fn is_disabled(&self) -> bool {
        self.port == 0
    }

    /// Test if this is an SCTP data channel m-line.
    pub fn is_data_channel(&self) -> bool {
        self.media_type == MediaType::Application && self.protocol.is_sctp()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaType {
    Audio,
    Video,
    Text,
    Application,
    Message,
    Unknown(String),
}

impl<'a> From<&'a str> for MediaType {
    fn from(v: &'a str) -> Self {
        match v {
            "audio" => MediaType::Audio,
            "video" => MediaType::Video,
            "text" => MediaType::Text,
            "application" => MediaType::Application,
            "message" => MediaType::Message,
            _ => MediaType::Unknown(v.to_string()),
        }
    }
}

/// Transport protocol of an m-line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Proto {
    /// `RTP/AVP`
    RtpAvp,
    /// `RTP/AVPF`
    RtpAvpf,
    /// `RTP/SAVP`
    RtpSavp,
    /// `RTP/SAVPF`
    RtpSavpf,
    /// `UDP/TLS/RTP/SAVP`
    UdpTlsRtpSavp,
    /// `UDP/TLS/RTP/SAVPF`
    UdpTlsRtpSavpf,
    /// `DTLS/SCTP`, the legacy data channel proto.
    DtlsSctp,
    /// `UDP/DTLS/SCTP`
    UdpDtlsSctp,
    /// `TCP/DTLS/SCTP`
    TcpDtlsSctp,
    /// `udp`
    Udp,
    Unknown(String),
}

impl Proto {
    pub fn is_sctp(&self) -> bool {
        matches!(
            self,
            Proto::DtlsSctp | Proto::UdpDtlsSctp | Proto::TcpDtlsSctp
        )
    }

    fn proto_line(&self) -> &str {
        use Proto::*;
        match self {
            RtpAvp => "RTP/AVP",
            RtpAvpf => "RTP/AVPF",
            RtpSavp => "RTP/SAVP",
            RtpSavpf => "RTP/SAVPF",
            UdpTlsRtpSavp => "UDP/TLS/RTP/SAVP",
            UdpTlsRtpSavpf => "UDP/TLS/RTP/SAVPF",
            DtlsSctp => "DTLS/SCTP",
            UdpDtlsSctp => "UDP/DTLS/SCTP",
            TcpDtlsSctp => "TCP/DTLS/SCTP",
            Udp => "udp",
            Unknown(v) => v,
        }
    }
}

impl<'a> From<&'a str> for Proto {
    fn from(v: &'a str) -> Self {
        use Proto::*;
        match v {
            "RTP/AVP" => RtpAvp,
            "RTP/AVPF" => RtpAvpf,
            "RTP/SAVP" => RtpSavp,
            "RTP/SAVPF" => RtpSavpf,
            "UDP/TLS/RTP/SAVP" => UdpTlsRtpSavp,
            "UDP/TLS/RTP/SAVPF" => UdpTlsRtpSavpf,
            "DTLS/SCTP" => DtlsSctp,
            "UDP/DTLS/SCTP" => UdpDtlsSctp,
            "TCP/DTLS/SCTP" => TcpDtlsSctp,
            "udp" => Udp,
            _ => Unknown(v.to_string()),
        }
    }
}

/// DTLS role from `a=setup` (RFC 4145).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setup {
    ActPass,
    Active,
    Passive,
}

impl Setup {
    pub fn from_line(v: &str) -> Option<Self> {
        match v {
            "actpass" => Some(Setup::ActPass),
            "active" => Some(Setup::Active),
            "passive" => Some(Setup::Passive),
            _ => None,
        }
    }

    pub fn setup_line(&self) -> &'static str {
        match self {
            Setup::ActPass => "actpass",
            Setup::Active => "active",
            Setup::Passive => "passive",
        }
    }

    /// The role an answerer takes given the role of the offer.
    pub fn invert(&self) -> Setup {
        match self {
            // RFC 8842: answerer picks active when offered actpass.
            Setup::ActPass => Setup::Active,
            Setup::Active => Setup::Passive,
            Setup::Passive => Setup::Active,
        }
    }
}

impl fmt::Display for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.setup_line())
    }
}

/// Writes times using the largest unit that divides the value, like `7d` or `90m`.
pub(crate) struct TypedTime(pub i64);

impl fmt::Display for TypedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: &[(i64, char)] = &[(86_400, 'd'), (3_600, 'h'), (60, 'm')];

        let v = self.0;
        if v != 0 {
            for (secs, unit) in UNITS {
                if v % secs == 0 {
                    return write!(f, "{}{}", v / secs, unit);
                }
            }
        }
        write!(f, "{v}")
    }
}

/// Unsigned seconds written like [`TypedTime`] where they fit.
struct Secs(u64);

impl fmt::Display for Secs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match i64::try_from(self.0) {
            Ok(v) => write!(f, "{}", TypedTime(v)),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={}\r\n", self.version)?;
        write!(f, "o={}\r\n", self.origin)?;
        write!(f, "s={}\r\n", self.session_name.as_deref().unwrap_or("-"))?;
        if let Some(v) = &self.session_information {
            write!(f, "i={v}\r\n")?;
        }
        if let Some(v) = &self.uri {
            write!(f, "u={v}\r\n")?;
        }
        for v in &self.emails {
            write!(f, "e={v}\r\n")?;
        }
        for v in &self.phones {
            write!(f, "p={v}\r\n")?;
        }
        if let Some(c) = &self.connection {
            write!(f, "c={c}\r\n")?;
        }
        for b in &self.bandwidths {
            write!(f, "b={b}\r\n")?;
        }
        for t in &self.timings {
            write!(f, "{t}")?;
        }
        if !self.time_zones.is_empty() {
            write!(f, "z=")?;
            for (idx, z) in self.time_zones.iter().enumerate() {
                if idx > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{} {}", z.adjustment, TypedTime(z.offset))?;
            }
            write!(f, "\r\n")?;
        }
        if let Some(k) = &self.encryption_key {
            write!(f, "k={k}\r\n")?;
        }
        for a in &self.attributes {
            write!(f, "{a}")?;
        }
        for m in &self.media {
            write!(f, "{m}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V0 => write!(f, "0"),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.username.as_deref().unwrap_or("-"),
            self.session_id,
            self.session_version,
            self.network_type,
            self.address_type,
            self.unicast_address
        )
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::Internet => write!(f, "IN"),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressType::Ip4 => write!(f, "IP4"),
            AddressType::Ip6 => write!(f, "IP6"),
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.network_type, self.address_type, self.address
        )?;
        if let Some(ttl) = self.ttl {
            write!(f, "/{ttl}")?;
        }
        if let Some(count) = self.count {
            write!(f, "/{count}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.typ, self.value)
    }
}

impl fmt::Display for BandwidthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BandwidthType::*;
        match self {
            ConferenceTotal => write!(f, "CT"),
            ApplicationSpecific => write!(f, "AS"),
            RtcpSenders => write!(f, "RS"),
            RtcpReceivers => write!(f, "RR"),
            Tias => write!(f, "TIAS"),
            Experimental(v) => write!(f, "X-{v}"),
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={} {}\r\n", self.start_secs(), self.stop_secs())?;
        for r in &self.repeats {
            write!(f, "r={r}\r\n")?;
        }
        Ok(())
    }
}

impl fmt::Display for RepeatTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", Secs(self.interval), Secs(self.duration))?;
        for o in &self.offsets {
            write!(f, " {}", Secs(*o))?;
        }
        Ok(())
    }
}

impl fmt::Display for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionKey::Prompt => write!(f, "prompt"),
            EncryptionKey::Clear(v) => write!(f, "clear:{v}"),
            EncryptionKey::Base64(v) => write!(f, "base64:{v}"),
            EncryptionKey::Uri(v) => write!(f, "uri:{v}"),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Flag(name) => write!(f, "a={name}\r\n"),
            Attribute::Value { name, value } => write!(f, "a={name}:{value}\r\n"),
        }
    }
}

impl fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m={} {}", self.media_type, self.port)?;
        if let Some(count) = self.port_count {
            write!(f, "/{count}")?;
        }
        write!(f, " {}", self.protocol)?;
        for fmt in &self.formats {
            write!(f, " {fmt}")?;
        }
        write!(f, "\r\n")?;
        if let Some(v) = &self.title {
            write!(f, "i={v}\r\n")?;
        }
        if let Some(c) = &self.connection {
            write!(f, "c={c}\r\n")?;
        }
        for b in &self.bandwidths {
            write!(f, "b={b}\r\n")?;
        }
        if let Some(k) = &self.encryption_key {
            write!(f, "k={k}\r\n")?;
        }
        for a in &self.attributes {
            write!(f, "{a}")?;
        }
        Ok(())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Audio => write!(f, "audio"),
            MediaType::Video => write!(f, "video"),
            MediaType::Text => write!(f, "text"),
            MediaType::Application => write!(f, "application"),
            MediaType::Message => write!(f, "message"),
            MediaType::Unknown(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.proto_line())
    }
}
