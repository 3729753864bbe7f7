use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative abort signal for a traversal.
///
/// The engine polls it at the top of every visit. Once stopped, every further
/// visit returns its input unchanged. Clones share the same flag, so a token can
/// be handed to another task and tripped from there.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        StopToken::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = StopToken::new();
        let other = token.clone();
        assert!(!token.is_stopped());
        other.stop();
        assert!(token.is_stopped());
    }
}
