//! SSRC demultiplexing
//!
//! Outbound packets produced by the audio engine and the video senders come
//! back through [`InputGateway::receive_rtp_data`](crate::InputGateway) and
//! are delivered to every subscriber whose assigned SSRC matches. There is
//! no priority between subscribers: all matches receive the packet.

use bytes::Bytes;

use crate::media::rtp::{self, PacketKind, RtcpPacketType};
use crate::media::{MediaSink, MediaType};
use crate::registry::SubscriberRegistry;

/// Extract the SSRC a packet is routed by
///
/// Sender reports are routed by their sender SSRC, everything else by the
/// RTP header SSRC. Returns `None` if the packet is too short.
///
/// # Panics
///
/// Panics if the packet is a receiver report or an RTCP feedback packet.
/// Those belong on the feedback path and must never reach the media
/// demultiplexer.
pub fn routing_ssrc(packet: &[u8]) -> Option<u32> {
    let kind = PacketKind::classify(packet)?;
    assert!(
        !kind.is_feedback(),
        "feedback RTCP packet {kind:?} reached the media demultiplexer"
    );

    match kind {
        PacketKind::Rtcp(RtcpPacketType::SenderReport) => rtp::rtcp_sender_ssrc(packet),
        _ => rtp::rtp_ssrc(packet),
    }
}

/// Check if `sink` receives `media` on `ssrc`
pub fn sink_matches(sink: &dyn MediaSink, media: MediaType, ssrc: u32) -> bool {
    match media {
        MediaType::Audio => sink.audio_sink_ssrc() == ssrc,
        MediaType::Video => sink.video_sink_ssrc() == ssrc,
    }
}

/// Deliver `packet` to every registered subscriber matching its SSRC
///
/// Returns the number of deliveries made.
pub fn dispatch(registry: &SubscriberRegistry, packet: Bytes, media: MediaType) -> usize {
    let Some(ssrc) = routing_ssrc(&packet) else {
        tracing::trace!(len = packet.len(), "Packet too short to demultiplex");
        return 0;
    };

    let mut deliveries = 0;
    registry.for_each(|_, entry| {
        if !sink_matches(entry.sink.as_ref(), media, ssrc) {
            return;
        }
        match media {
            MediaType::Audio => entry.sink.deliver_audio_data(packet.clone()),
            MediaType::Video => entry.sink.deliver_video_data(packet.clone()),
        };
        deliveries += 1;
    });

    if deliveries == 0 {
        tracing::trace!(ssrc, media = %media, "No subscriber for SSRC, dropping packet");
    }

    deliveries
}
