use crate::voices::VoiceRegistry;
use crate::{SynthesisBackend, SynthesisError};

/// Holds at most one live synthesis session, keyed by model identifier.
///
/// Requesting the cached model returns the cached session. Requesting any
/// other model drops it and constructs a new one.
pub struct SessionManager<B: SynthesisBackend> {
    backend: B,
    use_accelerator: bool,
    active: Option<(String, B::Session)>,
}

impl<B: SynthesisBackend> SessionManager<B> {
    pub fn new(backend: B, use_accelerator: bool) -> Self {
        Self {
            backend,
            use_accelerator,
            active: None,
        }
    }

    /// Session for `model`, constructing one if it is not cached.
    ///
    /// Returns `None` when the model is unusable or construction fails; the
    /// cache is then empty. A construction failure caused by an incompatible
    /// weights format marks the model unusable in `registry`.
    pub fn get_session(
        &mut self,
        model: &str,
        registry: &mut VoiceRegistry,
    ) -> Option<&mut B::Session> {
        if self.active_model() == Some(model) {
            return self.active.as_mut().map(|(_, session)| session);
        }

        self.active = None;

        if registry.is_unusable(model) {
            log::warn!("Skipping unusable model {model}");
            return None;
        }

        log::info!("Initializing synthesis session for {model}");
        match self.backend.construct(model, self.use_accelerator) {
            Ok(session) => {
                let (_, session) = self.active.insert((model.to_string(), session));
                Some(session)
            }
            Err(e) => {
                log::error!("Failed to initialize model {model}: {e}");
                if let SynthesisError::IncompatibleWeights { .. } = e {
                    registry.mark_unusable(model);
                }
                None
            }
        }
    }

    /// Drop the cached session so the next request constructs a fresh one.
    pub fn invalidate(&mut self) {
        if let Some((model, _)) = self.active.take() {
            log::debug!("Dropped synthesis session for {model}");
        }
    }

    pub fn active_model(&self) -> Option<&str> {
        self.active.as_ref().map(|(model, _)| model.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behavior, ScriptedBackend};

    #[test]
    fn reuses_session_for_same_model() {
        let backend = ScriptedBackend::new();
        let mut registry = VoiceRegistry::default();
        let mut manager = SessionManager::new(backend.clone(), false);

        assert!(manager.get_session("m1", &mut registry).is_some());
        assert!(manager.get_session("m1", &mut registry).is_some());
        assert_eq!(backend.constructions("m1"), 1);
        assert_eq!(manager.active_model(), Some("m1"));
    }

    #[test]
    fn switching_models_replaces_session() {
        let backend = ScriptedBackend::new();
        let mut registry = VoiceRegistry::default();
        let mut manager = SessionManager::new(backend.clone(), false);

        manager.get_session("m1", &mut registry);
        manager.get_session("m2", &mut registry);
        manager.get_session("m1", &mut registry);

        assert_eq!(backend.constructions("m1"), 2);
        assert_eq!(backend.constructions("m2"), 1);
        assert_eq!(manager.active_model(), Some("m1"));
    }

    #[test]
    fn incompatible_weights_blacklists_model() {
        let backend = ScriptedBackend::new().with("bad", Behavior::IncompatibleWeights);
        let mut registry = VoiceRegistry::default();
        let mut manager = SessionManager::new(backend.clone(), false);

        manager.get_session("good", &mut registry);
        assert!(manager.get_session("bad", &mut registry).is_none());
        assert!(registry.is_unusable("bad"));
        assert_eq!(manager.active_model(), None);

        // Unusable models are not constructed again.
        assert!(manager.get_session("bad", &mut registry).is_none());
        assert_eq!(backend.constructions("bad"), 1);
    }

    #[test]
    fn other_construction_failures_do_not_blacklist() {
        let backend = ScriptedBackend::new().with("flaky", Behavior::ConstructFails);
        let mut registry = VoiceRegistry::default();
        let mut manager = SessionManager::new(backend.clone(), false);

        assert!(manager.get_session("flaky", &mut registry).is_none());
        assert!(!registry.is_unusable("flaky"));
        assert!(manager.get_session("flaky", &mut registry).is_none());
        assert_eq!(backend.constructions("flaky"), 2);
    }

    #[test]
    fn invalidate_forces_reconstruction() {
        let backend = ScriptedBackend::new();
        let mut registry = VoiceRegistry::default();
        let mut manager = SessionManager::new(backend.clone(), true);

        manager.get_session("m1", &mut registry);
        manager.invalidate();
        assert_eq!(manager.active_model(), None);
        manager.get_session("m1", &mut registry);
        assert_eq!(backend.constructions("m1"), 2);
        assert!(backend.accelerated());
    }
}
