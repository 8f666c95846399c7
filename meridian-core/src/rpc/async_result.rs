//! One-shot result slot shared between a caller and the mount worker
//!
//! The caller arms the slot before submitting a request and receives a
//! [`Ticket`]. The worker claims the ticket with [`AsyncResult::start`]
//! before running the request and completes it with [`AsyncResult::set`]
//! exactly once. A caller that gives up cancels its ticket; a request whose
//! ticket was cancelled, or superseded by a later arming, is never claimed,
//! so it cannot change the mount after its caller reported a failure.
//!
//! ```text
//!   arm ──► Pending ──start──► Running ──set──► Ready ──take──► Taken
//!              │
//!              └──cancel──► Cancelled
//! ```

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::WakerRegistration;

/// Identifies one arming of an [`AsyncResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ticket(u32);

/// Why a ticket could not be claimed or completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetError {
    /// The ticket was already claimed or completed
    AlreadySet,
    /// The slot has been re-armed since this ticket was issued
    Stale,
    /// The caller gave up on this ticket
    Cancelled,
}

/// Outcome of [`AsyncResult::cancel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cancel {
    /// The request will never run
    Cancelled,
    /// The worker already claimed the request; its result will arrive
    InFlight,
}

enum Slot<T> {
    Pending,
    Running,
    Ready(T),
    Taken,
    Cancelled,
}

struct State<T> {
    ticket: u32,
    slot: Slot<T>,
    waker: WakerRegistration,
}

/// One-shot result slot
pub struct AsyncResult<M: RawMutex, T> {
    state: Mutex<M, RefCell<State<T>>>,
}

impl<M: RawMutex, T> Default for AsyncResult<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, T> AsyncResult<M, T> {
    /// Create an unarmed slot
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                ticket: 0,
                slot: Slot::Taken,
                waker: WakerRegistration::new(),
            })),
        }
    }

    /// Prepare the slot for a new request
    ///
    /// Any value or ticket from a previous request is discarded.
    pub fn arm(&self) -> Ticket {
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            state.ticket = state.ticket.wrapping_add(1);
            state.slot = Slot::Pending;
            Ticket(state.ticket)
        })
    }

    /// Claim `ticket` for execution
    ///
    /// Succeeds only for the current, pending ticket. After this the caller
    /// can no longer cancel.
    pub fn start(&self, ticket: Ticket) -> Result<(), SetError> {
        self.state.lock(|cell| {
            let mut guard = cell.borrow_mut();
            let state = &mut *guard;
            if state.ticket != ticket.0 {
                return Err(SetError::Stale);
            }
            match state.slot {
                Slot::Pending => {
                    state.slot = Slot::Running;
                    Ok(())
                }
                Slot::Cancelled => Err(SetError::Cancelled),
                _ => Err(SetError::AlreadySet),
            }
        })
    }

    /// Store the result and wake the waiter
    pub fn set(&self, ticket: Ticket, value: T) -> Result<(), SetError> {
        self.state.lock(|cell| {
            let mut guard = cell.borrow_mut();
            let state = &mut *guard;
            if state.ticket != ticket.0 {
                return Err(SetError::Stale);
            }
            match state.slot {
                Slot::Pending | Slot::Running => {}
                Slot::Cancelled => return Err(SetError::Cancelled),
                _ => return Err(SetError::AlreadySet),
            }
            state.slot = Slot::Ready(value);
            state.waker.wake();
            Ok(())
        })
    }

    /// Give up on `ticket`
    ///
    /// A pending request is cancelled and will be skipped by the worker. A
    /// request that is running or already answered cannot be cancelled; its
    /// result must be collected with [`AsyncResult::wait`].
    pub fn cancel(&self, ticket: Ticket) -> Cancel {
        self.state.lock(|cell| {
            let mut guard = cell.borrow_mut();
            let state = &mut *guard;
            if state.ticket != ticket.0 {
                return Cancel::Cancelled;
            }
            match state.slot {
                Slot::Running | Slot::Ready(_) => Cancel::InFlight,
                Slot::Pending => {
                    state.slot = Slot::Cancelled;
                    Cancel::Cancelled
                }
                Slot::Taken | Slot::Cancelled => Cancel::Cancelled,
            }
        })
    }

    /// Check whether a value is waiting for `ticket`
    pub fn is_ready(&self, ticket: Ticket) -> bool {
        self.state.lock(|cell| {
            let state = cell.borrow();
            state.ticket == ticket.0 && matches!(state.slot, Slot::Ready(_))
        })
    }

    /// Take the value for `ticket` without waiting
    pub fn try_take(&self, ticket: Ticket) -> Option<T> {
        self.state.lock(|cell| Self::take(&mut cell.borrow_mut(), ticket))
    }

    /// Wait until the value for `ticket` is set, then take it
    ///
    /// Never completes for a stale or cancelled ticket; pair with a timeout.
    pub async fn wait(&self, ticket: Ticket) -> T {
        poll_fn(|cx| {
            self.state.lock(|cell| {
                let mut state = cell.borrow_mut();
                match Self::take(&mut state, ticket) {
                    Some(value) => Poll::Ready(value),
                    None => {
                        state.waker.register(cx.waker());
                        Poll::Pending
                    }
                }
            })
        })
        .await
    }

    fn take(state: &mut State<T>, ticket: Ticket) -> Option<T> {
        if state.ticket != ticket.0 || !matches!(state.slot, Slot::Ready(_)) {
            return None;
        }
        match core::mem::replace(&mut state.slot, Slot::Taken) {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_futures::yield_now;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    type TestSlot = AsyncResult<NoopRawMutex, u32>;

    #[test]
    fn test_set_then_wait() {
        let slot = TestSlot::new();
        let ticket = slot.arm();
        assert!(!slot.is_ready(ticket));

        assert_eq!(slot.set(ticket, 42), Ok(()));
        assert!(slot.is_ready(ticket));
        assert_eq!(block_on(slot.wait(ticket)), 42);
        assert!(!slot.is_ready(ticket));
    }

    #[test]
    fn test_wait_then_set() {
        let slot = TestSlot::new();
        let ticket = slot.arm();

        let (value, ()) = block_on(join(slot.wait(ticket), async {
            yield_now().await;
            slot.set(ticket, 7).unwrap();
        }));
        assert_eq!(value, 7);
    }

    #[test]
    fn test_second_set_rejected() {
        let slot = TestSlot::new();
        let ticket = slot.arm();
        assert_eq!(slot.set(ticket, 1), Ok(()));
        assert_eq!(slot.set(ticket, 2), Err(SetError::AlreadySet));
        assert_eq!(slot.try_take(ticket), Some(1));

        // Still one-shot after the value was taken
        assert_eq!(slot.set(ticket, 3), Err(SetError::AlreadySet));
    }

    #[test]
    fn test_stale_ticket_rejected() {
        let slot = TestSlot::new();
        let old = slot.arm();
        let new = slot.arm();

        assert_eq!(slot.set(old, 1), Err(SetError::Stale));
        assert!(!slot.is_ready(new));
        assert_eq!(slot.set(new, 2), Ok(()));
        assert_eq!(slot.try_take(old), None);
        assert_eq!(slot.try_take(new), Some(2));
    }

    #[test]
    fn test_unarmed_slot_rejects_set() {
        let slot = TestSlot::new();
        assert_eq!(slot.set(Ticket(0), 5), Err(SetError::AlreadySet));
    }

    #[test]
    fn test_start_claims_pending_ticket_once() {
        let slot = TestSlot::new();
        let ticket = slot.arm();
        assert_eq!(slot.start(ticket), Ok(()));
        assert_eq!(slot.start(ticket), Err(SetError::AlreadySet));
        assert_eq!(slot.set(ticket, 9), Ok(()));
        assert_eq!(slot.start(ticket), Err(SetError::AlreadySet));
        assert_eq!(slot.try_take(ticket), Some(9));
    }

    #[test]
    fn test_cancelled_ticket_cannot_start_or_set() {
        let slot = TestSlot::new();
        let ticket = slot.arm();
        assert_eq!(slot.cancel(ticket), Cancel::Cancelled);
        assert_eq!(slot.start(ticket), Err(SetError::Cancelled));
        assert_eq!(slot.set(ticket, 1), Err(SetError::Cancelled));
        assert!(!slot.is_ready(ticket));

        // Re-arming makes the slot usable again
        let next = slot.arm();
        assert_eq!(slot.start(ticket), Err(SetError::Stale));
        assert_eq!(slot.start(next), Ok(()));
    }

    #[test]
    fn test_cancel_after_start_is_in_flight() {
        let slot = TestSlot::new();
        let ticket = slot.arm();
        slot.start(ticket).unwrap();
        assert_eq!(slot.cancel(ticket), Cancel::InFlight);

        // The running request still completes and its value is delivered
        assert_eq!(slot.set(ticket, 4), Ok(()));
        assert_eq!(slot.cancel(ticket), Cancel::InFlight);
        assert_eq!(block_on(slot.wait(ticket)), 4);
    }

    #[test]
    fn test_cancel_stale_ticket() {
        let slot = TestSlot::new();
        let old = slot.arm();
        let new = slot.arm();
        assert_eq!(slot.cancel(old), Cancel::Cancelled);
        assert_eq!(slot.start(new), Ok(()));
    }

    #[test]
    fn test_rearm_discards_value() {
        let slot = TestSlot::new();
        let first = slot.arm();
        slot.set(first, 10).unwrap();

        let second = slot.arm();
        assert_eq!(slot.try_take(first), None);
        assert_eq!(slot.try_take(second), None);
    }
}
