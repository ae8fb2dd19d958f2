use serde::{Deserialize, Serialize};

use crate::NarrationError;

/// Narration lifecycle as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Waiting for generated speech.
    Loading,
    Playing,
    /// Generated narration ran to its end.
    Complete,
    /// Generated narration failed; the fallback voice took over.
    Error,
}

/// Inputs of the playback state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Narration was asked for.
    Request,
    /// Decoded audio started playing.
    Start,
    /// Decode, timeout or malformed reply.
    Fail,
    /// Playback reached the end of the buffer.
    Finish,
    /// Explicit stop, page change or teardown.
    Stop,
}

impl PlaybackState {
    /// The only way a state changes.
    ///
    /// A new request is accepted only from a resting state, so narration
    /// already loading or playing has to be stopped first.
    pub fn transition(self, event: PlaybackEvent) -> Result<PlaybackState, NarrationError> {
        use PlaybackEvent as E;
        use PlaybackState as S;

        match (self, event) {
            (_, E::Stop) => Ok(S::Idle),
            (S::Idle | S::Complete | S::Error, E::Request) => Ok(S::Loading),
            (S::Loading, E::Start) => Ok(S::Playing),
            (S::Loading, E::Fail) => Ok(S::Error),
            (S::Playing, E::Finish) => Ok(S::Complete),
            (from, event) => Err(NarrationError::IllegalTransition { from, event }),
        }
    }

    /// Loading or playing.
    pub fn is_busy(self) -> bool {
        matches!(self, PlaybackState::Loading | PlaybackState::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::PlaybackEvent::*;
    use super::PlaybackState::*;
    use super::*;

    #[test]
    fn walks_the_happy_path() {
        let state = Idle.transition(Request).unwrap();
        assert_eq!(state, Loading);
        let state = state.transition(Start).unwrap();
        assert_eq!(state, Playing);
        assert_eq!(state.transition(Finish).unwrap(), Complete);
    }

    #[test]
    fn failure_then_retry() {
        let failed = Loading.transition(Fail).unwrap();
        assert_eq!(failed, Error);
        assert_eq!(failed.transition(Request).unwrap(), Loading);
    }

    #[test]
    fn stop_always_rests() {
        for state in [Idle, Loading, Playing, Complete, Error] {
            assert_eq!(state.transition(Stop).unwrap(), Idle);
        }
    }

    #[test]
    fn busy_states_reject_new_requests() {
        for state in [Loading, Playing] {
            assert!(state.is_busy());
            assert!(matches!(
                state.transition(Request),
                Err(NarrationError::IllegalTransition { event: Request, .. })
            ));
        }
        assert!(Idle.transition(Finish).is_err());
        assert!(Playing.transition(Start).is_err());
        assert!(Complete.transition(Fail).is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Complete).unwrap(), "\"complete\"");
    }
}
