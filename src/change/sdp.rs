//! Building local offers and answers.

use crate::ice::IceCreds;
use crate::sdp::{AddressType, Attribute, Connection, MediaDescription, MediaType};
use crate::sdp::{NetworkType, Origin, Proto, SessionDescription, Setup, Timing, Version};

/// Everything local that goes into a generated description.
pub(crate) struct LocalParams<'a> {
    pub session_id: u64,
    pub ice_creds: &'a IceCreds,
    pub sctp_port: u16,
    pub max_message_size: u32,
}

/// Create an offer.
///
/// All m-lines of `previous` are kept in their order. The data channel m-line is
/// regenerated, rejected m-lines are carried over as is. When `want_data` is set and
/// there is no data channel m-line yet, one is appended with a new mid.
pub(crate) fn offer_sdp(
    params: &LocalParams,
    previous: Option<&SessionDescription>,
    want_data: bool,
) -> SessionDescription {
    let mut sdp = session(params);

    let mut has_data = false;

    for m in previous.iter().flat_map(|p| p.media.iter()) {
        if m.is_data_channel() && !m.is_disabled() && !has_data {
            let mid = m.mid().unwrap_or("0");
            sdp.media.push(data_media(params, mid, Setup::ActPass));
            has_data = true;
        } else {
            sdp.media.push(rejected_media(m));
        }
    }

    if want_data && !has_data {
        let mid = unused_mid(&sdp);
        debug!("Add data channel m-line with mid: {}", mid);
        sdp.media.push(data_media(params, &mid, Setup::ActPass));
    }

    add_bundle_group(&mut sdp);

    sdp
}

/// Create an answer to `offer`.
///
/// One m-line per offered m-line, in the same order. The first data channel
/// m-line is accepted, everything else is rejected with port 0.
pub(crate) fn answer_sdp(params: &LocalParams, offer: &SessionDescription) -> SessionDescription {
    let mut sdp = session(params);

    let mut has_data = false;

    for (idx, m) in offer.media.iter().enumerate() {
        let accept = m.is_data_channel() && !m.is_disabled() && !has_data;

        if accept {
            let index_mid = idx.to_string();
            let mid = m.mid().unwrap_or(&index_mid);
            let setup = m.setup().unwrap_or(Setup::ActPass).invert();
            sdp.media.push(data_media(params, mid, setup));
            has_data = true;
        } else {
            debug!("Reject m-line {}: {} {}", idx, m.media_type, m.protocol);
            sdp.media.push(rejected_media(m));
        }
    }

    if offer.bundle_group().is_some() {
        add_bundle_group(&mut sdp);
    }

    sdp
}

/// Set the `o=` line following the last description created by the connection.
///
/// The session id is kept for the lifetime of the connection. The version starts
/// at 1 and increases every time the content differs from `previous`. Since
/// `previous` is the last one handed out, not the one in effect, a version is
/// never reused after a rollback.
pub(crate) fn with_origin(
    mut sdp: SessionDescription,
    previous: Option<&SessionDescription>,
) -> SessionDescription {
    let Some(previous) = previous else {
        sdp.origin.session_version = 1;
        return sdp;
    };

    sdp.origin = previous.origin.clone();

    if sdp != *previous {
        sdp.origin.session_version = previous.origin.session_version.saturating_add(1);
        trace!("Bump sess-version to: {}", sdp.origin.session_version);
    }

    sdp
}

fn session(params: &LocalParams) -> SessionDescription {
    SessionDescription {
        version: Version::V0,
        origin: Origin {
            username: None,
            session_id: params.session_id,
            session_version: 1,
            network_type: NetworkType::Internet,
            address_type: AddressType::Ip4,
            unicast_address: "127.0.0.1".into(),
        },
        session_name: None,
        session_information: None,
        uri: None,
        emails: vec![],
        phones: vec![],
        connection: None,
        bandwidths: vec![],
        timings: vec![Timing::unbounded()],
        time_zones: vec![],
        encryption_key: None,
        attributes: vec![],
        media: vec![],
    }
}

// Until ICE is integrated, the transport address is the RFC 8840 placeholder:
// port 9 and c=IN IP4 0.0.0.0.
fn data_media(params: &LocalParams, mid: &str, setup: Setup) -> MediaDescription {
    MediaDescription {
        media_type: MediaType::Application,
        port: 9,
        port_count: None,
        protocol: Proto::UdpDtlsSctp,
        formats: vec!["webrtc-datachannel".into()],
        title: None,
        connection: Some(Connection::unspecified()),
        bandwidths: vec![],
        encryption_key: None,
        attributes: vec![
            Attribute::value_pair("ice-ufrag", &params.ice_creds.ufrag),
            Attribute::value_pair("ice-pwd", &params.ice_creds.pass),
            Attribute::value_pair("ice-options", "trickle"),
            Attribute::value_pair("setup", setup.setup_line()),
            Attribute::value_pair("mid", mid),
            Attribute::value_pair("sctp-port", params.sctp_port),
            Attribute::value_pair("max-message-size", params.max_message_size),
        ],
    }
}

fn rejected_media(m: &MediaDescription) -> MediaDescription {
    let mut attributes = vec![];
    if let Some(mid) = m.mid() {
        attributes.push(Attribute::value_pair("mid", mid));
    }

    MediaDescription {
        media_type: m.media_type.clone(),
        port: 0,
        port_count: None,
        protocol: m.protocol.clone(),
        formats: m.formats.clone(),
        title: None,
        connection: Some(Connection::unspecified()),
        bandwidths: vec![],
        encryption_key: None,
        attributes,
    }
}

fn add_bundle_group(sdp: &mut SessionDescription) {
    let mids: Vec<&str> = sdp
        .media
        .iter()
        .filter(|m| !m.is_disabled())
        .filter_map(|m| m.mid())
        .collect();

    if mids.is_empty() {
        return;
    }

    let group = format!("BUNDLE {}", mids.join(" "));
    sdp.attributes.push(Attribute::value_pair("group", group));
}

fn unused_mid(sdp: &SessionDescription) -> String {
    (0..)
        .map(|n: usize| n.to_string())
        .find(|mid| sdp.media_by_mid(mid).is_none())
        .unwrap_or_default()
}
