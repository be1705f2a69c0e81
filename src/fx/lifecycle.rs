//! Start/stop lifecycle for resources acquired asynchronously
//!
//! `stopped → starting → running → stopped`. Every `start()` that actually
//! begins an acquisition gets a `StartTicket`; `stop()` invalidates all
//! outstanding tickets, so an acquisition that finishes after a stop hands
//! its resources back to the caller to drop instead of reviving the session.

/// Externally visible phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Stopped,
    Starting,
    Running,
}

/// Proof that the holder owns the in-flight acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTicket(u64);

/// What a `start()` call should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRequest {
    /// Begin acquiring; report back with the ticket
    Begin(StartTicket),
    /// Another call is acquiring; wait for it
    InFlight,
    /// Nothing to do
    AlreadyRunning,
}

#[derive(Debug)]
enum State<T> {
    Stopped,
    Starting(StartTicket),
    Running(StartTicket, T),
}

/// Lifecycle holder for resources of type `T`
#[derive(Debug)]
pub struct Lifecycle<T> {
    state: State<T>,
    generation: u64,
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Lifecycle<T> {
    pub fn new() -> Self {
        Self {
            state: State::Stopped,
            generation: 0,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self.state {
            State::Stopped => LifecyclePhase::Stopped,
            State::Starting(_) => LifecyclePhase::Starting,
            State::Running(..) => LifecyclePhase::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running(..))
    }

    /// Decide what a `start()` call does. Only the first call from
    /// `Stopped` gets a ticket.
    pub fn request_start(&mut self) -> StartRequest {
        match self.state {
            State::Running(..) => StartRequest::AlreadyRunning,
            State::Starting(_) => StartRequest::InFlight,
            State::Stopped => {
                self.generation += 1;
                let ticket = StartTicket(self.generation);
                self.state = State::Starting(ticket);
                StartRequest::Begin(ticket)
            }
        }
    }

    /// Whether `ticket` still owns the in-flight acquisition
    pub fn is_current(&self, ticket: StartTicket) -> bool {
        matches!(self.state, State::Starting(current) if current == ticket)
    }

    /// Install acquired resources. A stale ticket gets the resources back.
    pub fn complete_start(&mut self, ticket: StartTicket, resources: T) -> Result<(), T> {
        if !self.is_current(ticket) {
            return Err(resources);
        }
        self.state = State::Running(ticket, resources);
        Ok(())
    }

    /// Acquisition failed; fall back to `Stopped` if the ticket is current.
    /// Returns whether the state changed.
    pub fn fail_start(&mut self, ticket: StartTicket) -> bool {
        if self.is_current(ticket) {
            self.state = State::Stopped;
            true
        } else {
            false
        }
    }

    /// Stop from any phase. Returns the running resources, if any, for
    /// teardown.
    pub fn stop(&mut self) -> Option<T> {
        self.generation += 1;
        match std::mem::replace(&mut self.state, State::Stopped) {
            State::Running(_, res) => Some(res),
            State::Starting(_) | State::Stopped => None,
        }
    }

    pub fn running_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            State::Running(_, res) => Some(res),
            _ => None,
        }
    }

    /// Running resources, only if they were installed under `ticket`.
    /// Callbacks scheduled by an earlier run get `None`.
    pub fn running_for(&mut self, ticket: StartTicket) -> Option<&mut T> {
        match &mut self.state {
            State::Running(current, res) if *current == ticket => Some(res),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_is_memoized_while_starting() {
        let mut lc: Lifecycle<&str> = Lifecycle::new();
        let ticket = match lc.request_start() {
            StartRequest::Begin(t) => t,
            other => panic!("expected Begin, got {:?}", other),
        };
        assert_eq!(lc.phase(), LifecyclePhase::Starting);
        assert_eq!(lc.request_start(), StartRequest::InFlight);
        assert_eq!(lc.request_start(), StartRequest::InFlight);

        assert!(lc.complete_start(ticket, "ctx").is_ok());
        assert_eq!(lc.phase(), LifecyclePhase::Running);
        assert_eq!(lc.request_start(), StartRequest::AlreadyRunning);
    }

    #[test]
    fn test_stop_during_start_rejects_late_completion() {
        let mut lc: Lifecycle<String> = Lifecycle::new();
        let StartRequest::Begin(ticket) = lc.request_start() else {
            panic!("expected Begin");
        };
        assert!(lc.stop().is_none());
        assert_eq!(lc.phase(), LifecyclePhase::Stopped);

        let returned = lc.complete_start(ticket, "late".to_string());
        assert_eq!(returned.err().as_deref(), Some("late"));
        assert_eq!(lc.phase(), LifecyclePhase::Stopped);
    }

    #[test]
    fn test_stale_ticket_cannot_hijack_new_start() {
        let mut lc: Lifecycle<u32> = Lifecycle::new();
        let StartRequest::Begin(first) = lc.request_start() else {
            panic!("expected Begin");
        };
        lc.stop();
        let StartRequest::Begin(second) = lc.request_start() else {
            panic!("expected Begin");
        };
        assert_ne!(first, second);

        assert!(!lc.fail_start(first));
        assert_eq!(lc.phase(), LifecyclePhase::Starting);
        assert_eq!(lc.complete_start(first, 1).err(), Some(1));
        assert!(lc.complete_start(second, 2).is_ok());
        assert_eq!(lc.running_mut().copied(), Some(2));
    }

    #[test]
    fn test_failed_start_returns_to_stopped() {
        let mut lc: Lifecycle<u32> = Lifecycle::new();
        let StartRequest::Begin(ticket) = lc.request_start() else {
            panic!("expected Begin");
        };
        assert!(lc.fail_start(ticket));
        assert_eq!(lc.phase(), LifecyclePhase::Stopped);
        assert!(matches!(lc.request_start(), StartRequest::Begin(_)));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut lc: Lifecycle<u32> = Lifecycle::new();
        assert!(lc.stop().is_none());
        let StartRequest::Begin(ticket) = lc.request_start() else {
            panic!("expected Begin");
        };
        lc.complete_start(ticket, 7).ok();
        assert_eq!(lc.stop(), Some(7));
        assert!(lc.stop().is_none());
        assert!(lc.running_mut().is_none());
    }

    #[test]
    fn test_callbacks_from_previous_run_see_nothing() {
        let mut lc: Lifecycle<(u32, u32)> = Lifecycle::new();
        let StartRequest::Begin(first) = lc.request_start() else {
            panic!("expected Begin");
        };
        lc.complete_start(first, (800, 600)).ok();
        assert!(lc.running_for(first).is_some());

        lc.stop();
        assert!(lc.running_mut().is_none());
        assert!(lc.running_for(first).is_none());

        let StartRequest::Begin(second) = lc.request_start() else {
            panic!("expected Begin");
        };
        lc.complete_start(second, (800, 600)).ok();

        // A resize handler left over from the first run must not touch the new one
        if let Some(size) = lc.running_for(first) {
            *size = (1, 1);
        }
        assert_eq!(lc.running_for(second).copied(), Some((800, 600)));
    }
}
