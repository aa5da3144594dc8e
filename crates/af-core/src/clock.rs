use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Compteurs de frame partagés pour le reporting FPS/latence externe.
///
/// Le convertisseur écrit après chaque conversion réussie ; un thread
/// d'affichage peut lire sans verrou via un `Arc<FrameClock>`.
///
/// Champs atomiques : lecture sans verrou, `Send + Sync`.
///
/// # Example
/// ```
/// use af_core::clock::FrameClock;
/// let clock = FrameClock::new();
/// assert_eq!(clock.frame_id(), 0);
/// clock.tick();
/// assert_eq!(clock.frame_id(), 1);
/// assert!(clock.last_ms() > 0.0);
/// ```
#[derive(Debug, Default)]
pub struct FrameClock {
    /// Identifiant monotone de la dernière frame convertie.
    frame_id: AtomicU32,
    /// Horodatage de la dernière conversion (ms depuis l'epoch UNIX, bits f64).
    last_ms: AtomicU64,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marque une conversion terminée : incrémente l'id, horodate.
    #[inline]
    pub fn tick(&self) {
        self.frame_id.fetch_add(1, Ordering::Relaxed);
        self.last_ms.store(now_ms().to_bits(), Ordering::Relaxed);
    }

    #[inline]
    #[must_use]
    pub fn frame_id(&self) -> u32 {
        self.frame_id.load(Ordering::Relaxed)
    }

    /// Wall-clock de la dernière conversion en millisecondes, 0.0 si aucune.
    #[inline]
    #[must_use]
    pub fn last_ms(&self) -> f64 {
        f64::from_bits(self.last_ms.load(Ordering::Relaxed))
    }
}

/// Millisecondes écoulées depuis l'epoch UNIX.
#[must_use]
pub fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_basic_operations() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame_id(), 0);
        assert!(clock.last_ms().abs() < f64::EPSILON);

        clock.tick();
        let first = clock.last_ms();
        clock.tick();
        assert_eq!(clock.frame_id(), 2);
        assert!(clock.last_ms() >= first);
    }

    #[test]
    fn clock_wraps_instead_of_panicking() {
        let clock = FrameClock::new();
        clock.frame_id.store(u32::MAX, Ordering::Relaxed);
        clock.tick();
        assert_eq!(clock.frame_id(), 0);
    }
}
