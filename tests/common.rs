#![allow(unused)]
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, Once};

use jsep::channel::{ChannelConfig, ChannelId, ChannelOwner, ChannelTransport, TransportHandle};
use jsep::{AnswerOptions, OfferOptions, PeerConfig, PeerConnection, RtcError};
use tracing::info_span;
use tracing::Span;

/// Peer for test peers - Left or Right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peer {
    Left,
    Right,
}

impl Peer {
    /// Create a tracing span for this peer.
    pub fn span(&self) -> Span {
        match self {
            Peer::Left => info_span!("L"),
            Peer::Right => info_span!("R"),
        }
    }
}

pub struct TestPeer {
    pub span: Span,
    pub pc: PeerConnection,
}

impl TestPeer {
    pub fn new(peer: Peer) -> Self {
        Self::new_with_pc(peer.span(), PeerConfig::new().build().unwrap())
    }

    pub fn new_with_pc(span: Span, pc: PeerConnection) -> Self {
        TestPeer { span, pc }
    }
}

impl Deref for TestPeer {
    type Target = PeerConnection;

    fn deref(&self) -> &Self::Target {
        &self.pc
    }
}

impl DerefMut for TestPeer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pc
    }
}

/// Full offer/answer with `l` as offerer.
pub fn negotiate(l: &mut TestPeer, r: &mut TestPeer) -> Result<(), RtcError> {
    let offer = l
        .span
        .in_scope(|| l.pc.create_offer(OfferOptions::default()))?;
    l.span
        .in_scope(|| l.pc.set_local_description(offer.clone()))?;

    r.span.in_scope(|| r.pc.set_remote_description(offer))?;
    let answer = r
        .span
        .in_scope(|| r.pc.create_answer(AnswerOptions::default()))?;
    r.span
        .in_scope(|| r.pc.set_local_description(answer.clone()))?;

    l.span.in_scope(|| l.pc.set_remote_description(answer))?;

    Ok(())
}

/// What happened in a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open(ChannelOwner, ChannelId, ChannelConfig, TransportHandle),
    Close(TransportHandle),
}

/// Transport that records opens and closes.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    pub events: Arc<Mutex<Vec<TransportEvent>>>,
}

impl RecordingTransport {
    pub fn events(&self) -> Vec<TransportEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ChannelTransport for RecordingTransport {
    fn open(
        &mut self,
        owner: &ChannelOwner,
        id: ChannelId,
        config: &ChannelConfig,
    ) -> TransportHandle {
        let handle = TransportHandle(100 + *id as u64);
        self.events.lock().unwrap().push(TransportEvent::Open(
            owner.clone(),
            id,
            config.clone(),
            handle,
        ));
        handle
    }

    fn close(&mut self, handle: TransportHandle) {
        self.events
            .lock()
            .unwrap()
            .push(TransportEvent::Close(handle));
    }
}

pub fn init_log() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    static START: Once = Once::new();

    START.call_once(|| {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(env_filter)
            .init();
    });
}
