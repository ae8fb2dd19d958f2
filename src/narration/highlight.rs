use crate::text::PageToken;

/// Index of the token being spoken `elapsed` seconds into `duration`.
///
/// There is no word timing from the speech backend, so narration speed is
/// assumed proportional to clean characters: progress through the audio maps
/// to a character offset, and the offset to the token whose range
/// `[start, start + len)` contains it. Tokens without clean characters are
/// never highlighted.
///
/// Returns `None` when there is nothing to highlight or playback reached the
/// end.
pub fn highlight_for_elapsed(tokens: &[PageToken], elapsed: f64, duration: f64) -> Option<usize> {
    let total: usize = tokens.iter().map(PageToken::weight).sum();
    if total == 0 || duration.is_nan() || duration <= 0.0 {
        return None;
    }

    let progress = (elapsed / duration).clamp(0.0, 1.0);
    let target = (progress * total as f64).floor() as usize;

    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        let end = start + token.weight();
        if (start..end).contains(&target) {
            return Some(index);
        }
        start = end;
    }
    None
}
