//! Feedback routing
//!
//! Feedback is not inspected here. Every video output's sender and the audio
//! engine receive every buffer, and each drops what does not address the
//! SSRC it owns.

use bytes::Bytes;

use crate::engine::AudioEngine;
use crate::output::VideoOutputPool;

/// Fans feedback out to all active output paths
pub struct FeedbackRouter<'a> {
    outputs: &'a VideoOutputPool,
    audio: &'a dyn AudioEngine,
}

impl<'a> FeedbackRouter<'a> {
    pub fn new(outputs: &'a VideoOutputPool, audio: &'a dyn AudioEngine) -> Self {
        Self { outputs, audio }
    }

    /// Deliver `data` to every sender's feedback sink and to the audio engine
    ///
    /// Returns the number of recipients.
    pub fn route(&self, data: Bytes) -> usize {
        let mut recipients = 0;

        self.outputs.for_each_feedback_sink(|sink| {
            sink.deliver_feedback(data.clone());
            recipients += 1;
        });

        self.audio.deliver_feedback(data);
        recipients + 1
    }
}
