//! Parsing and writing SDP text.

use std::num::NonZeroU64;

use jsep::sdp::{self, AddressType, Attribute, Bandwidth, BandwidthType, Connection};
use jsep::sdp::{EncryptionKey, MediaDescription, MediaType, NetworkType, Origin, Proto};
use jsep::sdp::{RepeatTime, SessionDescription, Setup, TimeZone, Timing, Version};

mod common;
use common::init_log;

const RFC4566: &str = "v=0\r\n\
    o=jdoe 2890844526 2890842807 IN IP4 10.47.16.5\r\n\
    s=SDP Seminar\r\n\
    i=A Seminar on the session description protocol\r\n\
    u=http://www.example.com/seminars/sdp.pdf\r\n\
    e=j.doe@example.com (Jane Doe)\r\n\
    p=+4917624822132\r\n\
    c=IN IP4 224.2.17.12/127\r\n\
    b=AS:1024\r\n\
    t=2873397496 2873404696\r\n\
    r=604800 3600 0 90000m\r\n";

#[test]
fn parse_rfc4566_example() {
    init_log();

    let sdp = sdp::parse(RFC4566).unwrap();

    assert_eq!(sdp.version, Version::V0);
    assert_eq!(sdp.origin.username.as_deref(), Some("jdoe"));
    assert_eq!(sdp.origin.session_id, 2890844526);
    assert_eq!(sdp.origin.session_version, 2890842807);
    assert_eq!(sdp.origin.network_type, NetworkType::Internet);
    assert_eq!(sdp.origin.address_type, AddressType::Ip4);
    assert_eq!(sdp.origin.unicast_address, "10.47.16.5");

    assert_eq!(sdp.session_name.as_deref(), Some("SDP Seminar"));
    assert_eq!(
        sdp.session_information.as_deref(),
        Some("A Seminar on the session description protocol")
    );
    assert_eq!(
        sdp.uri.as_deref(),
        Some("http://www.example.com/seminars/sdp.pdf")
    );
    assert_eq!(sdp.emails, vec!["j.doe@example.com (Jane Doe)".to_string()]);
    assert_eq!(sdp.phones, vec!["+4917624822132".to_string()]);

    let c = sdp.connection.as_ref().unwrap();
    assert_eq!(c.address, "224.2.17.12");
    assert_eq!(c.ttl, Some(127));
    assert_eq!(c.count, None);

    assert_eq!(
        sdp.bandwidths,
        vec![Bandwidth {
            typ: BandwidthType::ApplicationSpecific,
            value: 1024
        }]
    );

    assert_eq!(sdp.timings.len(), 1);
    let t = &sdp.timings[0];
    assert_eq!(t.start_secs(), 2873397496);
    assert_eq!(t.stop_secs(), 2873404696);

    // 90000 minutes is 5,400,000 seconds.
    assert_eq!(
        t.repeats,
        vec![RepeatTime {
            interval: 604_800,
            duration: 3_600,
            offsets: vec![0, 5_400_000],
        }]
    );

    assert!(sdp.media.is_empty());
}

#[test]
fn write_rfc4566_example() {
    init_log();

    let sdp = sdp::parse(RFC4566).unwrap();
    let text = sdp::serialize(&sdp);

    // Typed times are written with the largest unit that divides them.
    assert!(text.ends_with("t=2873397496 2873404696\r\nr=7d 1h 0 1500h\r\n"));

    assert_eq!(sdp::parse(&text).unwrap(), sdp);
}

#[test]
fn out_of_order_fails() {
    init_log();

    let text = "v=0\r\n\
        s=SDP Seminar\r\n\
        o=jdoe 2890844526 2890842807 IN IP4 10.47.16.5\r\n\
        t=0 0\r\n";

    let err = sdp::parse(text).unwrap_err();

    assert_eq!(err.line, 2);
    assert_eq!(err.column, 1);
    assert_eq!(err.offset, 5);
    assert!(!err.trace.is_empty());
    assert!(err.to_string().starts_with("SDP parse error at line 2"));
}

#[test]
fn attribute_before_bandwidth_fails() {
    let text = "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        a=foo\r\n\
        b=AS:1\r\n\
        t=0 0\r\n";

    let err = sdp::parse(text).unwrap_err();
    assert_eq!(err.line, 4);
}

#[test]
fn missing_timing_fails() {
    let text = "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        a=foo\r\n";

    assert!(sdp::parse(text).is_err());
}

#[test]
fn session_line_after_media_fails() {
    let text = "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        t=0 0\r\n\
        m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n\
        a=mid:0\r\n\
        t=0 0\r\n";

    let err = sdp::parse(text).unwrap_err();
    assert_eq!(err.line, 7);
}

#[test]
fn bare_lf_is_accepted() {
    init_log();

    let crlf = sdp::parse(RFC4566).unwrap();
    let lf = sdp::parse(&RFC4566.replace("\r\n", "\n")).unwrap();

    assert_eq!(crlf, lf);
    assert!(sdp::serialize(&lf).contains("\r\n"));
    assert!(!sdp::serialize(&lf).replace("\r\n", "").contains('\n'));
}

#[test]
fn last_line_without_terminator() {
    let text = "v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0";
    let sdp = sdp::parse(text).unwrap();
    assert_eq!(sdp.timings, vec![Timing::unbounded()]);
}

#[test]
fn empty_line_fails() {
    let text = "v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\n\r\ns=-\r\nt=0 0\r\n";
    let err = sdp::parse(text).unwrap_err();
    assert_eq!(err.line, 3);
}

#[test]
fn trailing_garbage_fails() {
    let text = "v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\nhello\r\n";
    let err = sdp::parse(text).unwrap_err();
    assert_eq!(err.line, 5);
}

#[test]
fn numbers_out_of_range_fail() {
    init_log();

    let has = |err: &sdp::SdpParseError, text: &str| err.trace.iter().any(|t| t == text);

    let sess_id = "v=0\r\n\
        o=- 18446744073709551616 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        t=0 0\r\n";
    let err = sdp::parse(sess_id).unwrap_err();
    assert_eq!((err.line, err.column), (2, 5));
    assert!(has(&err, "sess-id"), "{:?}", err.trace);
    assert!(has(&err, "origin (o=) line"), "{:?}", err.trace);

    let port = "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        t=0 0\r\n\
        m=audio 70000 RTP/AVP 0\r\n";
    let err = sdp::parse(port).unwrap_err();
    assert_eq!((err.line, err.column), (5, 9));
    assert!(has(&err, "port"), "{:?}", err.trace);
    assert!(has(&err, "media (m=) line"), "{:?}", err.trace);

    let ttl = "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        c=IN IP4 224.2.17.12/300\r\n\
        t=0 0\r\n";
    let err = sdp::parse(ttl).unwrap_err();
    assert_eq!((err.line, err.column), (4, 22));
    assert!(has(&err, "ttl must be 0-255"), "{:?}", err.trace);
    assert!(has(&err, "connection (c=) line"), "{:?}", err.trace);
    assert!(err.to_string().contains("ttl must be 0-255"));
}

#[test]
fn bad_repeat_names_rule() {
    init_log();

    let text = "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        t=0 0\r\n\
        r=1x 1 0\r\n";
    let err = sdp::parse(text).unwrap_err();

    assert_eq!((err.line, err.column), (5, 4));
    assert!(
        err.trace.iter().any(|t| t == "repeat (r=) line"),
        "{:?}",
        err.trace
    );
    assert!(err
        .to_string()
        .starts_with("SDP parse error at line 5, column 4: "));
}

#[test]
fn bad_version_fails() {
    let err = sdp::parse("v=1\r\no=- 1 1 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n").unwrap_err();
    assert_eq!(err.line, 1);
}

#[test]
fn media_level_lines() {
    init_log();

    let text = "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        c=IN IP4 224.2.1.1/127/3\r\n\
        t=0 0\r\n\
        z=2882844526 -1h 2898848070 0\r\n\
        k=prompt\r\n\
        a=recvonly\r\n\
        m=audio 49170 RTP/AVP 0\r\n\
        i=Audio\r\n\
        c=IN IP6 FF15::101/3\r\n\
        b=CT:64\r\n\
        b=X-YZ:128\r\n\
        k=clear:secret\r\n\
        a=rtpmap:0 PCMU/8000\r\n\
        m=video 51372/2 RTP/AVP 99\r\n\
        a=rtpmap:99 h263-1998/90000\r\n";

    let sdp = sdp::parse(text).unwrap();

    let c = sdp.connection.as_ref().unwrap();
    assert_eq!((c.ttl, c.count), (Some(127), Some(3)));
    assert_eq!(
        sdp.time_zones,
        vec![
            TimeZone {
                adjustment: 2882844526,
                offset: -3600
            },
            TimeZone {
                adjustment: 2898848070,
                offset: 0
            }
        ]
    );
    assert_eq!(sdp.encryption_key, Some(EncryptionKey::Prompt));
    assert!(sdp.has_attribute("recvonly"));

    assert_eq!(sdp.media.len(), 2);

    let audio = &sdp.media[0];
    assert_eq!(audio.media_type, MediaType::Audio);
    assert_eq!(audio.title.as_deref(), Some("Audio"));
    let c = audio.connection.as_ref().unwrap();
    assert_eq!(c.address_type, AddressType::Ip6);
    assert_eq!((c.ttl, c.count), (None, Some(3)));
    assert_eq!(
        audio.bandwidths,
        vec![
            Bandwidth {
                typ: BandwidthType::ConferenceTotal,
                value: 64
            },
            Bandwidth {
                typ: BandwidthType::Experimental("YZ".into()),
                value: 128
            }
        ]
    );
    assert_eq!(
        audio.encryption_key,
        Some(EncryptionKey::Clear("secret".into()))
    );
    assert_eq!(
        audio.attribute("rtpmap").and_then(Attribute::value),
        Some("0 PCMU/8000")
    );

    // Media level inherits nothing from session level.
    let video = &sdp.media[1];
    assert_eq!(video.port, 51372);
    assert_eq!(video.port_count, Some(2));
    assert_eq!(video.connection, None);
    assert_eq!(video.encryption_key, None);

    assert_eq!(sdp::parse(&sdp::serialize(&sdp)).unwrap(), sdp);
}

#[test]
fn unknown_bandwidth_type_fails() {
    let text = "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        b=FOO:1\r\n\
        t=0 0\r\n";

    let err = sdp::parse(text).unwrap_err();
    assert_eq!(err.line, 4);
}

#[test]
fn parse_chrome_data_channel_offer() {
    init_log();

    let text = "v=0\r\n\
        o=- 6564425948916445306 2 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        t=0 0\r\n\
        a=group:BUNDLE 0\r\n\
        a=extmap-allow-mixed\r\n\
        a=msid-semantic: WMS\r\n\
        m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n\
        c=IN IP4 0.0.0.0\r\n\
        a=candidate:3499569006 1 udp 2122260223 192.168.1.10 52361 typ host generation 0 network-id 1\r\n\
        a=ice-ufrag:S5hk\r\n\
        a=ice-pwd:0zV/Yu3y8aDzbHgqWhnVQhqP\r\n\
        a=ice-options:trickle\r\n\
        a=fingerprint:sha-256 8C:71:B3:8D:A5:38:FD:8F:A4:2E:A2:65:6C:86:52:BC:E0:6E:94:F2:9F:7C:4D:B5:DF:AF:AA:6F:44:90:8D:F4\r\n\
        a=setup:actpass\r\n\
        a=mid:0\r\n\
        a=sctp-port:5000\r\n\
        a=max-message-size:262144\r\n";

    let sdp = sdp::parse(text).unwrap();

    assert_eq!(sdp.origin.session_id, 6564425948916445306);
    assert_eq!(sdp.origin.username, None);
    assert_eq!(sdp.session_name, None);
    assert_eq!(sdp.bundle_group(), Some(vec!["0"]));
    assert!(sdp.has_attribute("extmap-allow-mixed"));
    assert_eq!(
        sdp.attribute("msid-semantic").and_then(Attribute::value),
        Some(" WMS")
    );

    let m = &sdp.media[0];
    assert!(m.is_data_channel());
    assert_eq!(m.protocol, Proto::UdpDtlsSctp);
    assert_eq!(m.mid(), Some("0"));
    assert_eq!(m.setup(), Some(Setup::ActPass));
    assert_eq!(m.sctp_port(), Some(5000));
    assert_eq!(m.max_message_size(), Some(262144));
    assert_eq!(m.ice_creds(), Some(("S5hk", "0zV/Yu3y8aDzbHgqWhnVQhqP")));
    assert_eq!(m.fingerprint().map(|(hash, _)| hash), Some("sha-256"));
    assert_eq!(sdp.ice_creds(), Some(("S5hk", "0zV/Yu3y8aDzbHgqWhnVQhqP")));

    assert!(sdp.assert_consistency().is_ok());
}

#[test]
fn parse_legacy_firefox_data_channel_offer() {
    let text = "v=0\r\n\
        o=mozilla...THIS_IS_SDPARTA-99.0 4733712468217431460 0 IN IP4 0.0.0.0\r\n\
        s=-\r\n\
        t=0 0\r\n\
        a=fingerprint:sha-256 5B:D3:8E:66:0E:7D:D3:F3:8E:E6:80:28:19:FC:55:AD:58:5D:B9:3D:A8:DE:45:4A:E7:87:02:F6:2C:E5:E9:24\r\n\
        a=group:BUNDLE 0\r\n\
        a=ice-options:trickle\r\n\
        a=msid-semantic:WMS *\r\n\
        m=application 9 DTLS/SCTP 5000\r\n\
        c=IN IP4 0.0.0.0\r\n\
        a=sendrecv\r\n\
        a=ice-pwd:d4f6b8ac0b3d2d4e8e9c5f2c8d3c0b1a\r\n\
        a=ice-ufrag:2e5c1d3f\r\n\
        a=mid:0\r\n\
        a=sctpmap:5000 webrtc-datachannel 256\r\n\
        a=setup:actpass\r\n";

    let sdp = sdp::parse(text).unwrap();

    let m = &sdp.media[0];
    assert_eq!(m.protocol, Proto::DtlsSctp);
    assert!(m.is_data_channel());
    assert_eq!(m.formats, vec!["5000".to_string()]);
    assert_eq!(m.sctp_port(), None);
}

#[test]
fn model_round_trip() {
    init_log();

    let sdp = SessionDescription {
        version: Version::V0,
        origin: Origin {
            username: Some("alice".into()),
            session_id: u64::MAX,
            session_version: 0,
            network_type: NetworkType::Internet,
            address_type: AddressType::Ip6,
            unicast_address: "::1".into(),
        },
        session_name: Some("A session".into()),
        session_information: Some("About it".into()),
        uri: Some("https://example.com/".into()),
        emails: vec!["a@example.com".into(), "b@example.com".into()],
        phones: vec!["+1 555 0100".into()],
        connection: Some(Connection {
            network_type: NetworkType::Internet,
            address_type: AddressType::Ip4,
            address: "224.2.1.1".into(),
            ttl: Some(16),
            count: Some(2),
        }),
        bandwidths: vec![
            Bandwidth {
                typ: BandwidthType::Tias,
                value: 0,
            },
            Bandwidth {
                typ: BandwidthType::RtcpReceivers,
                value: u64::MAX,
            },
        ],
        timings: vec![
            Timing {
                start: NonZeroU64::new(3_034_423_619),
                stop: NonZeroU64::new(3_042_462_419),
                repeats: vec![RepeatTime {
                    interval: 86_400,
                    duration: 7_261,
                    offsets: vec![0, 90, u64::MAX],
                }],
            },
            Timing::unbounded(),
        ],
        time_zones: vec![TimeZone {
            adjustment: 3_034_423_619,
            offset: -90,
        }],
        encryption_key: Some(EncryptionKey::Base64("c2VjcmV0".into())),
        attributes: vec![
            Attribute::flag("recvonly"),
            Attribute::value_pair("tool", "jsep test"),
            Attribute::value_pair("empty", ""),
        ],
        media: vec![
            MediaDescription {
                media_type: MediaType::Video,
                port: 65535,
                port_count: Some(2),
                protocol: Proto::RtpSavpf,
                formats: vec!["96".into(), "97".into()],
                title: Some("Camera".into()),
                connection: Some(Connection::unspecified()),
                bandwidths: vec![Bandwidth {
                    typ: BandwidthType::Experimental("FOO".into()),
                    value: 1,
                }],
                encryption_key: Some(EncryptionKey::Uri("https://example.com/k".into())),
                attributes: vec![Attribute::value_pair("rtpmap", "96 VP8/90000")],
            },
            MediaDescription {
                media_type: MediaType::Text,
                port: 0,
                port_count: None,
                protocol: Proto::Udp,
                formats: vec![],
                title: None,
                connection: None,
                bandwidths: vec![],
                encryption_key: None,
                attributes: vec![],
            },
        ],
    };

    let text = sdp::serialize(&sdp);
    assert_eq!(sdp::parse(&text).unwrap(), sdp);
}

#[test]
fn edge_values_round_trip() {
    init_log();

    let base = sdp::parse(
        "v=0\r\n\
        o=- 1 1 IN IP4 127.0.0.1\r\n\
        s=-\r\n\
        t=0 0\r\n\
        m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n",
    )
    .unwrap();

    let edits: &[fn(&mut SessionDescription)] = &[
        |d| d.session_name = Some(String::new()),
        |d| d.session_name = Some("--".into()),
        |d| d.session_name = Some(" spaced out ".into()),
        |d| d.origin.username = Some("a-b".into()),
        |d| d.session_information = Some(String::new()),
        |d| d.uri = Some(String::new()),
        |d| d.emails = vec![String::new(), "a@example.com".into()],
        |d| d.phones = vec![String::new()],
        |d| d.encryption_key = Some(EncryptionKey::Clear(String::new())),
        |d| d.encryption_key = Some(EncryptionKey::Prompt),
        |d| d.attributes = vec![Attribute::value_pair("x", "")],
        |d| d.attributes = vec![Attribute::value_pair("x", "a:b")],
        |d| d.media[0].title = Some(String::new()),
        |d| d.media[0].encryption_key = Some(EncryptionKey::Base64(String::new())),
    ];

    for (idx, edit) in edits.iter().enumerate() {
        let mut sdp = base.clone();
        edit(&mut sdp);

        let text = sdp::serialize(&sdp);
        let back = sdp::parse(&text).unwrap_or_else(|e| panic!("edit {idx}: {e}\n{text}"));
        assert_eq!(back, sdp, "edit {idx}");
    }
}

#[test]
fn values_outside_domain_read_back_canonical() {
    init_log();

    let base = sdp::parse("v=0\r\no=alice 1 1 IN IP4 127.0.0.1\r\ns=x\r\nt=0 0\r\n").unwrap();

    // "-" is how None is written.
    let mut sdp = base.clone();
    sdp.session_name = Some("-".into());
    sdp.origin.username = Some("-".into());
    let back = sdp::parse(&sdp::serialize(&sdp)).unwrap();
    assert_eq!(back.session_name, None);
    assert_eq!(back.origin.username, None);

    // A flag name can't hold the name/value separator.
    let mut sdp = base;
    sdp.attributes = vec![Attribute::flag("a:b")];
    let back = sdp::parse(&sdp::serialize(&sdp)).unwrap();
    assert_eq!(back.attributes, vec![Attribute::value_pair("a", "b")]);
}
