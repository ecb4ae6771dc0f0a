//! Loop-back transport from senders into the gateway's demultiplexer
//!
//! Senders and the audio engine emit RTP packets (and RTCP sender reports)
//! through an [`RtpTransport`]. The transport holds a weak reference to its
//! receiver so it never keeps the gateway alive.

use std::sync::Weak;

use bytes::Bytes;

use crate::media::MediaType;

/// Receiver of outbound RTP/RTCP packets
pub trait RtpReceiver: Send + Sync {
    fn receive_rtp_data(&self, data: Bytes, media: MediaType, stream_id: u32);
}

/// Transport bound to one media type
#[derive(Clone)]
pub struct RtpTransport {
    media: MediaType,
    stream_id: u32,
    receiver: Weak<dyn RtpReceiver>,
}

impl RtpTransport {
    /// Create a transport for `media` that feeds `receiver`
    pub fn new(media: MediaType, receiver: Weak<dyn RtpReceiver>) -> Self {
        Self {
            media,
            stream_id: 0,
            receiver,
        }
    }

    /// Create a transport with no receiver; every packet is discarded
    pub fn disconnected(media: MediaType) -> Self {
        let receiver: Weak<dyn RtpReceiver> = Weak::<Discard>::new();
        Self::new(media, receiver)
    }

    /// Tag packets with a stream id
    pub fn with_stream_id(mut self, stream_id: u32) -> Self {
        self.stream_id = stream_id;
        self
    }

    pub fn media_type(&self) -> MediaType {
        self.media
    }

    /// Send an RTP packet or RTCP sender report
    ///
    /// Returns the number of bytes handed to the receiver, 0 if it is gone.
    pub fn send_packet(&self, packet: Bytes) -> usize {
        match self.receiver.upgrade() {
            Some(receiver) => {
                let len = packet.len();
                receiver.receive_rtp_data(packet, self.media, self.stream_id);
                len
            }
            None => {
                tracing::trace!(media = %self.media, "Transport receiver dropped, discarding packet");
                0
            }
        }
    }

    /// Check if the receiver is still alive
    pub fn is_connected(&self) -> bool {
        self.receiver.strong_count() > 0
    }
}

struct Discard;

impl RtpReceiver for Discard {
    fn receive_rtp_data(&self, _data: Bytes, _media: MediaType, _stream_id: u32) {}
}

impl std::fmt::Debug for RtpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtpTransport")
            .field("media", &self.media)
            .field("stream_id", &self.stream_id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
