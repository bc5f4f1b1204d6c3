/// Transpose channel-major blocks into frame-major order.
///
/// `out[i * channels.len() + c] = channels[c][i]` for every frame `i < frames`.
/// `out` must hold at least `frames * channels.len()` samples.
pub fn interleave_into(channels: &[Vec<f32>], frames: usize, out: &mut [f32]) {
    let count = channels.len();
    for (c, channel) in channels.iter().enumerate() {
        for (i, &sample) in channel[..frames].iter().enumerate() {
            out[i * count + c] = sample;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo() {
        let channels = vec![vec![1.0, 2.0, 3.0], vec![-1.0, -2.0, -3.0]];
        let mut out = vec![0.0; 6];
        interleave_into(&channels, 3, &mut out);
        assert_eq!(out, vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }

    #[test]
    fn mono_is_passthrough() {
        let channels = vec![vec![0.1, 0.2, 0.3]];
        let mut out = vec![0.0; 3];
        interleave_into(&channels, 3, &mut out);
        assert_eq!(out, channels[0]);
    }

    #[test]
    fn frame_position_matches_channel_sample() {
        let channel_count = 5;
        let frames = 64;
        let channels: Vec<Vec<f32>> = (0..channel_count)
            .map(|c| (0..frames).map(|i| (c * 1000 + i) as f32).collect())
            .collect();

        let mut out = vec![0.0; frames * channel_count];
        interleave_into(&channels, frames, &mut out);

        for i in 0..frames {
            for c in 0..channel_count {
                assert_eq!(out[i * channel_count + c], channels[c][i]);
            }
        }
    }

    #[test]
    fn only_requested_frames_are_copied() {
        let channels = vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]];
        let mut out = vec![0.0; 4];
        interleave_into(&channels, 2, &mut out);
        assert_eq!(out, vec![1.0, 5.0, 2.0, 6.0]);
    }
}
