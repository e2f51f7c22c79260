use serde::Serialize;

/// Phase of a fetch cycle: `Idle -> Loading -> {Success, Error}`, re-entering
/// `Loading` on every refetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchPhase {
    Idle,
    Loading,
    Success,
    Error { message: String },
}

/// Data-fetching state. Data from the last success stays readable while a
/// new cycle is loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loadable<T> {
    pub phase: FetchPhase,
    pub data: Option<T>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            phase: FetchPhase::Idle,
            data: None,
        }
    }
}

impl<T> Loadable<T> {
    pub fn begin(&mut self) {
        self.phase = FetchPhase::Loading;
    }

    pub fn succeed(&mut self, data: T) {
        self.phase = FetchPhase::Success;
        self.data = Some(data);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = FetchPhase::Error {
            message: message.into(),
        };
    }

    /// Ends the cycle without recording anything; previous data stays.
    pub fn abandon(&mut self) {
        self.phase = if self.data.is_some() {
            FetchPhase::Success
        } else {
            FetchPhase::Idle
        };
    }

    /// Replaces data outside a fetch cycle (pushed updates).
    pub fn replace(&mut self, data: Option<T>) {
        self.data = data;
    }

    pub fn reset(&mut self) {
        self.phase = FetchPhase::Idle;
        self.data = None;
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            FetchPhase::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

/// Status of the last create/update/delete call. `not_found` is set only
/// when the error is a missing target row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MutationStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub not_found: bool,
}

impl MutationStatus {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.not_found = false;
    }

    pub fn finish(&mut self, error: Option<String>) {
        self.loading = false;
        self.error = error;
        self.not_found = false;
    }

    pub fn missing(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
        self.not_found = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_keeps_previous_data() {
        let mut state = Loadable::default();
        state.begin();
        state.succeed(vec![1, 2, 3]);
        state.begin();

        assert!(state.is_loading());
        assert_eq!(state.data(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn test_abandon_restores_settled_phase() {
        let mut state: Loadable<u8> = Loadable::default();
        state.begin();
        state.abandon();
        assert_eq!(state.phase, FetchPhase::Idle);

        state.begin();
        state.succeed(7);
        state.begin();
        state.abandon();
        assert_eq!(state.phase, FetchPhase::Success);
        assert_eq!(state.data(), Some(&7));
    }

    #[test]
    fn test_mutation_status_tracks_missing_rows() {
        let mut status = MutationStatus::default();
        status.begin();
        status.missing("Collection 42 not found");
        assert!(!status.loading);
        assert!(status.not_found);

        status.begin();
        assert!(!status.not_found);
        assert_eq!(status.error, None);
        status.finish(Some("Backend error: row not found in cache".to_string()));
        assert!(!status.not_found);
    }

    #[test]
    fn test_error_phase_serializes_with_message() {
        let mut state: Loadable<u8> = Loadable::default();
        state.fail("Profile not found");
        assert_eq!(state.error(), Some("Profile not found"));

        let json = serde_json::to_value(&state.phase).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Profile not found");
    }
}
