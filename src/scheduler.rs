// ============================================================================
// Scheduler - Tâches différées, périodiques et debounce
// ============================================================================
// Remplace les timers implicites par des handles explicites et annulables
//
// CONCEPTS RUST :
// 1. tokio::spawn + JoinHandle : chaque timer est une tâche async
// 2. abort() : annulation à la prochaine suspension (.await)
// 3. Closures FnMut -> Future : la tâche périodique recrée une future à
//    chaque tick
//
// CONCEPT : Debounce
// - Chaque déclenchement annule la tâche en attente et en planifie une
//   nouvelle : seule la dernière action après une période calme s'exécute
// ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Handle d'une tâche planifiée
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Nom de la tâche (pour les logs)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Annule la tâche
    ///
    /// La future est abandonnée à sa prochaine suspension; les guards
    /// qu'elle possède sont droppés normalement.
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            debug!(task = self.name, "Cancelling task");
        }
        self.handle.abort();
    }

    /// true tant que la tâche n'est ni terminée ni annulée
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Lance une tâche immédiatement
pub fn spawn_task<F>(name: &'static str, future: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    TaskHandle {
        name,
        handle: tokio::spawn(future),
    }
}

/// Lance une tâche après un délai
///
/// L'échéance est fixée à l'appel, pas au premier poll de la tâche.
pub fn delayed<F>(name: &'static str, delay: Duration, future: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let deadline = Instant::now() + delay;
    spawn_task(name, async move {
        time::sleep_until(deadline).await;
        future.await;
    })
}

/// Lance une tâche périodique
///
/// Le premier appel a lieu après une période complète (pas immédiatement).
/// Un tick manqué pendant que `tick` s'exécute est décalé, pas rattrapé.
pub fn periodic<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let start = Instant::now() + period;
    spawn_task(name, async move {
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tick().await;
        }
    })
}

/// Regroupe des déclenchements rapprochés en une seule action
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<TaskHandle>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Annule l'action en attente et planifie `future` après le délai
    pub fn trigger<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(delayed("debounce", self.delay, future));
    }

    /// Annule l'action en attente, s'il y en a une
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }

    /// true si une action attend encore son délai ou s'exécute
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map(TaskHandle::is_active).unwrap_or(false)
    }
}

// ============================================================================
// Tests
// ============================================================================
// CONCEPT : Temps virtuel
// - start_paused = true : l'horloge tokio ne bouge que via advance()
//   ou quand toutes les tâches attendent un timer (auto-advance)
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_runs_after_delay() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _task = delayed("test", Duration::from_millis(500), async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        time::advance(Duration::from_millis(499)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        time::advance(Duration::from_millis(2)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = delayed("test", Duration::from_secs(1), async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        task.cancel();
        time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!task.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_ticks_until_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = periodic("tick", Duration::from_secs(1), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0, "no immediate tick");

        for _ in 0..3 {
            time::advance(Duration::from_secs(1)).await;
            settle().await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);

        task.cancel();
        time::advance(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_keeps_only_last_trigger() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        for query in ["b", "bi", "bit"] {
            let seen = seen.clone();
            debouncer.trigger(async move {
                seen.lock().unwrap().push(query);
            });
            time::advance(Duration::from_millis(200)).await;
            settle().await;
        }
        assert!(debouncer.is_pending());

        time::advance(Duration::from_millis(400)).await;
        settle().await;
        assert_eq!(*seen.lock().unwrap(), vec!["bit"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_cancel() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        let c = count.clone();
        debouncer.trigger(async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending());
    }
}
