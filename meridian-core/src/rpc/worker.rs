//! Mount worker
//!
//! Owns the mount and executes queued requests one at a time in FIFO order.
//! A request is executed only if its ticket can still be claimed; requests
//! whose caller timed out or moved on are dropped without touching the
//! mount. Every executed request has its slot set.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;

use super::async_result::SetError;
use super::request::{execute, MountQueue, MountRequest, MOUNT_QUEUE_DEPTH};
use crate::traits::MountControl;

/// Worker counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WorkerStats {
    /// Requests executed
    pub executed: u32,
    /// Requests dropped because their caller gave up
    pub discarded: u32,
}

/// Serial executor for mount requests
pub struct MountWorker<M: RawMutex + 'static, C: MountControl> {
    queue: Receiver<'static, M, MountRequest<M>, MOUNT_QUEUE_DEPTH>,
    mount: C,
    stats: WorkerStats,
}

impl<M: RawMutex + 'static, C: MountControl> MountWorker<M, C> {
    pub fn new(queue: &'static MountQueue<M>, mount: C) -> Self {
        Self {
            queue: queue.receiver(),
            mount,
            stats: WorkerStats::default(),
        }
    }

    /// Process requests forever
    pub async fn run(&mut self) {
        loop {
            let _ = self.process_next().await;
        }
    }

    /// Wait for the next request and execute it
    ///
    /// Returns why the request was dropped, if it was.
    pub async fn process_next(&mut self) -> Result<(), SetError> {
        let request = self.queue.receive().await;
        self.complete(request)
    }

    /// Execute the next request if one is queued
    pub fn try_process_next(&mut self) -> Option<Result<(), SetError>> {
        let request = self.queue.try_receive().ok()?;
        Some(self.complete(request))
    }

    pub fn mount(&self) -> &C {
        &self.mount
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats
    }

    fn complete(&mut self, request: MountRequest<M>) -> Result<(), SetError> {
        let claimed = request.reply.start(request.ticket).and_then(|()| {
            let reply = execute(&mut self.mount, request.command);
            self.stats.executed = self.stats.executed.wrapping_add(1);
            request.reply.set(request.ticket, reply)
        });

        if let Err(_error) = claimed {
            self.stats.discarded = self.stats.discarded.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("Dropped request {}: {}", request.command, _error);
        }
        claimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::async_result::Cancel;
    use crate::rpc::request::{MountCommand, MountReply, ReplySlot};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use heapless::Vec;
    use meridian_protocol::{
        DateValue, DecCoordinate, LatitudeCoordinate, LongitudeCoordinate, RaCoordinate, Sign,
        TimeValue,
    };

    type Cs = CriticalSectionRawMutex;

    /// Records the order in which calls arrive
    #[derive(Default)]
    struct Recorder {
        log: Vec<MountCommand, 8>,
    }

    impl MountControl for Recorder {
        fn initialize(&mut self) {
            self.log.push(MountCommand::Initialize).unwrap();
        }
        fn set_target_ra(&mut self, ra: RaCoordinate) -> bool {
            self.log.push(MountCommand::SetTargetRa(ra)).unwrap();
            true
        }
        fn set_target_dec(&mut self, dec: DecCoordinate) -> bool {
            self.log.push(MountCommand::SetTargetDec(dec)).unwrap();
            true
        }
        fn set_site_latitude(&mut self, _: LatitudeCoordinate) -> bool {
            false
        }
        fn set_site_longitude(&mut self, _: LongitudeCoordinate) -> bool {
            false
        }
        fn set_local_time(&mut self, _: TimeValue) -> bool {
            false
        }
        fn set_date(&mut self, _: DateValue) -> bool {
            false
        }
        fn slew_to_target(&mut self) -> bool {
            self.log.push(MountCommand::SlewToTarget).unwrap();
            true
        }
        fn sync_to_target(&mut self) -> bool {
            false
        }
        fn stop(&mut self) {
            self.log.push(MountCommand::Stop).unwrap();
        }
        fn current_ra(&self) -> RaCoordinate {
            RaCoordinate::default()
        }
        fn current_dec(&self) -> DecCoordinate {
            DecCoordinate::default()
        }
        fn target_ra(&self) -> RaCoordinate {
            RaCoordinate::default()
        }
        fn target_dec(&self) -> DecCoordinate {
            DecCoordinate::default()
        }
        fn site_latitude(&self) -> LatitudeCoordinate {
            LatitudeCoordinate::new(Sign::Positive, 0, 0).unwrap()
        }
        fn site_longitude(&self) -> LongitudeCoordinate {
            LongitudeCoordinate::new(0, 0).unwrap()
        }
        fn local_time(&self) -> TimeValue {
            TimeValue::default()
        }
        fn date(&self) -> DateValue {
            DateValue::default()
        }
    }

    #[test]
    fn test_requests_run_in_submission_order() {
        static QUEUE: MountQueue<Cs> = MountQueue::new();
        static FIRST: ReplySlot<Cs> = ReplySlot::new();
        static SECOND: ReplySlot<Cs> = ReplySlot::new();
        static THIRD: ReplySlot<Cs> = ReplySlot::new();

        let ra = RaCoordinate::new(1, 2, 3).unwrap();
        let submissions = [
            (MountCommand::Initialize, &FIRST),
            (MountCommand::SetTargetRa(ra), &SECOND),
            (MountCommand::SlewToTarget, &THIRD),
        ];
        let mut tickets = Vec::<_, 3>::new();
        for (command, slot) in submissions {
            let ticket = slot.arm();
            tickets.push(ticket).unwrap();
            QUEUE
                .try_send(MountRequest {
                    command,
                    ticket,
                    reply: slot,
                })
                .unwrap();
        }

        let mut worker = MountWorker::new(&QUEUE, Recorder::default());
        while let Some(result) = worker.try_process_next() {
            assert_eq!(result, Ok(()));
        }

        assert_eq!(
            worker.mount().log.as_slice(),
            &[
                MountCommand::Initialize,
                MountCommand::SetTargetRa(ra),
                MountCommand::SlewToTarget,
            ]
        );
        assert_eq!(FIRST.try_take(tickets[0]), Some(MountReply::Done));
        assert_eq!(SECOND.try_take(tickets[1]), Some(MountReply::Accepted(true)));
        assert_eq!(THIRD.try_take(tickets[2]), Some(MountReply::Accepted(true)));
        assert_eq!(worker.stats().executed, 3);
    }

    #[test]
    fn test_superseded_request_is_dropped() {
        static QUEUE: MountQueue<Cs> = MountQueue::new();
        static SLOT: ReplySlot<Cs> = ReplySlot::new();

        let abandoned = SLOT.arm();
        QUEUE
            .try_send(MountRequest {
                command: MountCommand::Stop,
                ticket: abandoned,
                reply: &SLOT,
            })
            .unwrap();

        // Caller moved on to a new request
        let current = SLOT.arm();

        let mut worker = MountWorker::new(&QUEUE, Recorder::default());
        assert_eq!(worker.try_process_next(), Some(Err(SetError::Stale)));
        assert!(worker.mount().log.is_empty());
        assert!(!SLOT.is_ready(current));
        assert_eq!(
            worker.stats(),
            WorkerStats {
                executed: 0,
                discarded: 1
            }
        );
    }

    #[test]
    fn test_cancelled_request_is_dropped() {
        static QUEUE: MountQueue<Cs> = MountQueue::new();
        static SLOT: ReplySlot<Cs> = ReplySlot::new();

        let ra = RaCoordinate::new(5, 35, 17).unwrap();
        let ticket = SLOT.arm();
        QUEUE
            .try_send(MountRequest {
                command: MountCommand::SetTargetRa(ra),
                ticket,
                reply: &SLOT,
            })
            .unwrap();
        assert_eq!(SLOT.cancel(ticket), Cancel::Cancelled);

        let mut worker = MountWorker::new(&QUEUE, Recorder::default());
        assert_eq!(worker.try_process_next(), Some(Err(SetError::Cancelled)));
        assert!(worker.mount().log.is_empty());
        assert_eq!(worker.stats().executed, 0);
        assert_eq!(worker.stats().discarded, 1);
    }

    #[test]
    fn test_empty_queue() {
        static QUEUE: MountQueue<Cs> = MountQueue::new();
        let mut worker = MountWorker::new(&QUEUE, Recorder::default());
        assert_eq!(worker.try_process_next(), None);
    }
}
