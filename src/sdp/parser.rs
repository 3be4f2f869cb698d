use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use combine::error::*;
use combine::parser::char::*;
use combine::parser::combinator::*;
use combine::stream::StreamErrorFor;
use combine::*;
use combine::{ParseError, Parser, Stream};

use super::data::*;

/// Creates a parser of SDP
pub fn sdp_parser<Input>() -> impl Parser<Input, Output = SessionDescription>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        session_parser(),
        many::<Vec<_>, _, _>(media_parser()),
        eof().expected("m= line or end of input"),
    )
        .map(|(mut session, media, _)| {
            session.media = media;
            session
        })
}

// /////////////////////////////////////////////////// Session description

/// Everything before the first m= line, in the fixed RFC order:
///
/// `v o s i? u? e* p* c? b* (t r*)+ z? k? a*`
fn session_parser<Input>() -> impl Parser<Input, Output = SessionDescription>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        (
            version_line(),
            origin_line(),
            session_name_line(),
            optional(typed_line('i', "information (i=) line", any_value())),
            optional(typed_line('u', "uri (u=) line", any_value())),
            many::<Vec<_>, _, _>(typed_line('e', "email (e=) line", any_value())),
            many::<Vec<_>, _, _>(typed_line('p', "phone (p=) line", any_value())),
        ),
        (
            optional(connection_line()),
            many::<Vec<_>, _, _>(bandwidth_line()),
            many1::<Vec<_>, _, _>(timing_parser()).expected("timing (t=) line"),
            optional(zone_line()),
            optional(key_line()),
            many::<Vec<_>, _, _>(attribute_line()),
        ),
    )
        .map(
            |(
                (version, origin, session_name, session_information, uri, emails, phones),
                (connection, bandwidths, timings, time_zones, encryption_key, attributes),
            )| SessionDescription {
                version,
                origin,
                session_name,
                session_information,
                uri,
                emails,
                phones,
                connection,
                bandwidths,
                timings,
                time_zones: time_zones.unwrap_or_default(),
                encryption_key,
                attributes,
                media: vec![],
            },
        )
}

/// `v=0`
fn version_line<Input>() -> impl Parser<Input, Output = Version>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    typed_line('v', "version (v=) line", token('0').map(|_| Version::V0))
}

/// `o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`
fn origin_line<Input>() -> impl Parser<Input, Output = Origin>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // o=jdoe 2890844526 2890842807 IN IP4 10.47.16.5
    // o=- 6564425948916445306 2 IN IP4 127.0.0.1
    typed_line(
        'o',
        "origin (o=) line",
        (
            not_sp(),
            sp(),
            number::<u64, _>().message("sess-id"),
            sp(),
            number::<u64, _>().message("sess-version"),
            sp(),
            network_type(),
            sp(),
            address_type(),
            sp(),
            not_sp(),
        ),
    )
    .map(
        |(username, _, session_id, _, session_version, _, network_type, _, address_type, _, unicast_address)| {
            Origin {
                username: none_if_dash(username),
                session_id,
                session_version,
                network_type,
                address_type,
                unicast_address,
            }
        },
    )
}

/// `s=<session name>`, where `s=-` means no name.
fn session_name_line<Input>() -> impl Parser<Input, Output = Option<String>>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    typed_line('s', "session name (s=) line", any_value()).map(none_if_dash)
}

/// `c=<nettype> <addrtype> <connection-address>`
fn connection_line<Input>() -> impl Parser<Input, Output = Connection>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // c=IN IP4 0.0.0.0
    // c=IN IP4 224.2.17.12/127
    // c=IN IP4 224.2.1.1/127/3
    // c=IN IP6 FF15::101/3
    let address = || many1::<String, _, _>(satisfy(|c| c != '/' && c != ' ' && c != '\r' && c != '\n'));
    let ttl = || {
        optional((token('/'), number::<u8, _>().message("ttl must be 0-255")).map(|(_, n)| n))
    };
    let count = || optional((token('/'), number::<u32, _>()).map(|(_, n)| n));

    // The address type decides whether a ttl comes before the count.
    let address_part = move |address_type| match address_type {
        AddressType::Ip4 => (address(), ttl(), count()).left(),
        AddressType::Ip6 => (address(), count())
            .map(|(address, count)| (address, None, count))
            .right(),
    };

    typed_line(
        'c',
        "connection (c=) line",
        (
            network_type(),
            sp(),
            address_type().skip(sp()).then(move |address_type| {
                address_part(address_type).map(move |part| (address_type, part))
            }),
        ),
    )
    .map(
        |(network_type, _, (address_type, (address, ttl, count)))| Connection {
            network_type,
            address_type,
            address,
            ttl,
            count,
        },
    )
}

/// `b=<bwtype>:<bandwidth>`
fn bandwidth_line<Input>() -> impl Parser<Input, Output = Bandwidth>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // b=AS:1024
    // b=X-YZ:128
    let typ = many1::<String, _, _>(satisfy(|c| c != ':' && c != ' ' && c != '\r' && c != '\n'))
        .and_then(|s| {
            BandwidthType::from_token(&s).ok_or_else(|| {
                StreamErrorFor::<Input>::message_format(format!("unknown bandwidth type: {s}"))
            })
        });

    typed_line(
        'b',
        "bandwidth (b=) line",
        (typ, token(':'), number::<u64, _>()),
    )
    .map(|(typ, _, value)| Bandwidth { typ, value })
}

/// A `t=` line followed by its `r=` lines.
fn timing_parser<Input>() -> impl Parser<Input, Output = Timing>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // t=2873397496 2873404696
    // r=604800 3600 0 90000m
    let timing = typed_line(
        't',
        "timing (t=) line",
        (number::<u64, _>(), sp(), number::<u64, _>()),
    );

    (timing, many::<Vec<_>, _, _>(repeat_line())).map(|((start, _, stop), repeats)| Timing {
        start: NonZeroU64::new(start),
        stop: NonZeroU64::new(stop),
        repeats,
    })
}

/// `r=<repeat interval> <active duration> <offsets from start-time>`
fn repeat_line<Input>() -> impl Parser<Input, Output = RepeatTime>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    typed_line(
        'r',
        "repeat (r=) line",
        (
            typed_time(),
            sp(),
            typed_time(),
            many1::<Vec<_>, _, _>((sp(), typed_time()).map(|(_, t)| t)),
        ),
    )
    .map(|(interval, _, duration, offsets)| RepeatTime {
        interval,
        duration,
        offsets,
    })
}

/// `z=<adjustment time> <offset> <adjustment time> <offset> ...`
fn zone_line<Input>() -> impl Parser<Input, Output = Vec<TimeZone>>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // z=2882844526 -1h 2898848070 0
    let zone = (number::<u64, _>(), sp(), signed_typed_time())
        .map(|(adjustment, _, offset)| TimeZone { adjustment, offset });

    typed_line(
        'z',
        "time zone (z=) line",
        sep_by1::<Vec<_>, _, _, _>(zone, sp()),
    )
}

/// `k=<method>` or `k=<method>:<encryption key>`
fn key_line<Input>() -> impl Parser<Input, Output = EncryptionKey>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let method = many1::<String, _, _>(satisfy(|c| c != ':' && c != '\r' && c != '\n'));

    typed_line(
        'k',
        "encryption key (k=) line",
        (method, optional((token(':'), any_value()).map(|(_, v)| v))).and_then(
            |(method, key)| match (method.as_str(), key) {
                ("prompt", None) => Ok(EncryptionKey::Prompt),
                ("clear", Some(v)) => Ok(EncryptionKey::Clear(v)),
                ("base64", Some(v)) => Ok(EncryptionKey::Base64(v)),
                ("uri", Some(v)) => Ok(EncryptionKey::Uri(v)),
                (m, _) => Err(StreamErrorFor::<Input>::message_format(format!(
                    "bad encryption key method: {m}"
                ))),
            },
        ),
    )
}

/// `a=<attribute>` or `a=<attribute>:<value>`
fn attribute_line<Input>() -> impl Parser<Input, Output = Attribute>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // a=group:BUNDLE 0
    // a=msid-semantic: WMS
    // a=ice-lite
    let name = many1::<String, _, _>(satisfy(|c| c != ':' && c != '\r' && c != '\n'));
    let value = many::<String, _, _>(satisfy(|c| c != '\r' && c != '\n'));

    typed_line(
        'a',
        "attribute (a=) line",
        (name, optional((token(':'), value).map(|(_, v)| v))),
    )
    .map(|(name, value)| match value {
        None => Attribute::Flag(name),
        Some(value) => Attribute::Value { name, value },
    })
}

// /////////////////////////////////////////////////// Media description

/// A m= section with its lines, until next m= or EOF.
///
/// `m i? c? b* k? a*`
fn media_parser<Input>() -> impl Parser<Input, Output = MediaDescription>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        media_line(),
        optional(typed_line('i', "media title (i=) line", any_value())),
        optional(connection_line()),
        many::<Vec<_>, _, _>(bandwidth_line()),
        optional(key_line()),
        many::<Vec<_>, _, _>(attribute_line()),
    )
        .map(
            |((media_type, port, port_count, protocol, formats), title, connection, bandwidths, encryption_key, attributes)| {
                MediaDescription {
                    media_type,
                    port,
                    port_count,
                    protocol,
                    formats,
                    title,
                    connection,
                    bandwidths,
                    encryption_key,
                    attributes,
                }
            },
        )
}

/// The m= line
// m=audio 49170 RTP/AVP 0
// m=video 49170/2 RTP/AVP 31
// m=application 9 UDP/DTLS/SCTP webrtc-datachannel
// m=application 54055 DTLS/SCTP 5000
#[allow(clippy::type_complexity)]
fn media_line<Input>(
) -> impl Parser<Input, Output = (MediaType, u16, Option<u16>, Proto, Vec<String>)>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    typed_line(
        'm',
        "media (m=) line",
        (
            not_sp().map(|s| MediaType::from(s.as_str())),
            sp(),
            number::<u16, _>().message("port"),
            optional((token('/'), number::<u16, _>()).map(|(_, n)| n)),
            sp(),
            not_sp().map(|s| Proto::from(s.as_str())),
            many::<Vec<_>, _, _>((sp(), not_sp()).map(|(_, f)| f)),
        ),
    )
    .map(|(typ, _, port, port_count, _, proto, formats)| (typ, port, port_count, proto, formats))
}

// /////////////////////////////////////////////////// Generic things below

/// A specific line, tagged with the grammar rule name for error traces.
fn typed_line<Input, Pval, Out>(
    expected: char,
    rule: &'static str,
    val: Pval,
) -> impl Parser<Input, Output = Out>
where
    Input: Stream<Token = char>,
    Pval: Parser<Input, Output = Out>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    line(token(expected), val).message(rule)
}

/// A line with some parser for value and parser for type.
fn line<Input, Ptyp, Pval, Out>(typ: Ptyp, val: Pval) -> impl Parser<Input, Output = Out>
where
    Ptyp: Parser<Input, Output = char>,
    Pval: Parser<Input, Output = Out>,
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    // Only the type and '=' are backtracked. Past that, errors in the value are
    // reported where they happen.
    attempt((typ, token('='))).with(val).skip(line_end())
}

/// A single space separator.
fn sp<Input>() -> impl Parser<Input, Output = char>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    token(' ')
}

/// Not SP, \r or \n
fn not_sp<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1(satisfy(|c| c != ' ' && c != '\r' && c != '\n'))
}

/// Any value that isn't \r or \n, possibly empty.
fn any_value<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many::<String, _, _>(satisfy(|c| c != '\r' && c != '\n'))
}

/// Decimal digits parsed into `T`. Values out of range for `T` are errors.
fn number<T, Input>() -> impl Parser<Input, Output = T>
where
    T: FromStr,
    T::Err: fmt::Display,
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    many1::<String, _, _>(digit())
        .and_then(|s| s.parse::<T>().map_err(StreamErrorFor::<Input>::message_format))
}

/// `<integer>[d|h|m|s]` normalized to seconds.
fn typed_time<Input>() -> impl Parser<Input, Output = u64>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        many1::<String, _, _>(digit()),
        optional(one_of("dhms".chars())),
    )
        .and_then(|(num, unit)| -> Result<u64, StreamErrorFor<Input>> {
            let num: u64 = num
                .parse()
                .map_err(StreamErrorFor::<Input>::message_format)?;

            let factor = match unit {
                Some('d') => 86_400,
                Some('h') => 3_600,
                Some('m') => 60,
                _ => 1,
            };

            num.checked_mul(factor)
                .ok_or_else(|| StreamErrorFor::<Input>::message_format("typed time out of range"))
        })
}

/// `[-]<integer>[d|h|m|s]` normalized to seconds.
fn signed_typed_time<Input>() -> impl Parser<Input, Output = i64>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (optional(token('-')), typed_time()).and_then(
        |(neg, secs)| -> Result<i64, StreamErrorFor<Input>> {
            let secs = i64::try_from(secs)
                .map_err(|_| StreamErrorFor::<Input>::message_format("typed time out of range"))?;
            Ok(if neg.is_some() { -secs } else { secs })
        },
    )
}

fn network_type<Input>() -> impl Parser<Input, Output = NetworkType>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    string("IN").map(|_| NetworkType::Internet)
}

fn address_type<Input>() -> impl Parser<Input, Output = AddressType>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    choice((
        attempt(string("IP4")).map(|_| AddressType::Ip4),
        string("IP6").map(|_| AddressType::Ip6),
    ))
}

/// This line end handles \r\n, a bare \n or EOF.
fn line_end<Input>() -> impl Parser<Input, Output = ()>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    choice((crlf().map(|_| ()), newline().map(|_| ()), eof()))
}

fn none_if_dash(v: String) -> Option<String> {
    if v == "-" {
        None
    } else {
        Some(v)
    }
}
