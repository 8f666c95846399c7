//! Caller side of the mount RPC channel
//!
//! [`MountClient`] turns each handler call into a request on the mount run
//! queue and waits for the worker's reply with a bounded timeout. It is the
//! [`CommandHandler`] the protocol session talks to.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embedded_hal_async::delay::DelayNs;

use meridian_protocol::{
    CommandHandler, DateValue, DecCoordinate, LatitudeCoordinate, LongitudeCoordinate,
    RaCoordinate, TimeValue,
};

use super::async_result::Cancel;
use super::request::{
    MountCommand, MountQueue, MountReply, MountRequest, ReplySlot, MOUNT_QUEUE_DEPTH,
};

/// Default time to wait for the worker
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;

/// Remote call failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RpcError {
    /// The run queue is full
    SubmissionFailed,
    /// The worker did not answer in time
    Timeout,
    /// The worker answered with the wrong kind of reply
    UnexpectedReply,
}

/// Handle for submitting mount commands
///
/// Each client needs its own reply slot; two clients sharing one slot would
/// invalidate each other's tickets.
pub struct MountClient<M: RawMutex + 'static, D> {
    queue: Sender<'static, M, MountRequest<M>, MOUNT_QUEUE_DEPTH>,
    reply: &'static ReplySlot<M>,
    delay: D,
    timeout_ms: u32,
}

impl<M: RawMutex + 'static, D: DelayNs> MountClient<M, D> {
    pub fn new(
        queue: &'static MountQueue<M>,
        reply: &'static ReplySlot<M>,
        delay: D,
        timeout_ms: u32,
    ) -> Self {
        Self {
            queue: queue.sender(),
            reply,
            delay,
            timeout_ms,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Submit a command and wait for its reply
    ///
    /// A full queue fails immediately. On timeout the request is cancelled
    /// and the worker drops it unexecuted. If the worker has already claimed
    /// it, the call keeps waiting so the reply matches what the mount did.
    pub async fn call(&mut self, command: MountCommand) -> Result<MountReply, RpcError> {
        let slot = self.reply;
        let ticket = slot.arm();

        self.queue
            .try_send(MountRequest {
                command,
                ticket,
                reply: slot,
            })
            .map_err(|_| RpcError::SubmissionFailed)?;

        match select(slot.wait(ticket), self.delay.delay_ms(self.timeout_ms)).await {
            Either::First(reply) => Ok(reply),
            Either::Second(()) => match slot.cancel(ticket) {
                Cancel::Cancelled => Err(RpcError::Timeout),
                Cancel::InFlight => Ok(slot.wait(ticket).await),
            },
        }
    }

    async fn accepted(&mut self, command: MountCommand) -> bool {
        match self.call(command).await {
            Ok(MountReply::Accepted(accepted)) => accepted,
            Ok(_) => report(command, RpcError::UnexpectedReply, false),
            Err(error) => report(command, error, false),
        }
    }

    async fn done(&mut self, command: MountCommand) {
        match self.call(command).await {
            Ok(MountReply::Done) => {}
            Ok(_) => report(command, RpcError::UnexpectedReply, ()),
            Err(error) => report(command, error, ()),
        }
    }

    async fn query<T>(
        &mut self,
        command: MountCommand,
        extract: impl FnOnce(MountReply) -> Option<T>,
    ) -> Option<T> {
        match self.call(command).await {
            Ok(reply) => match extract(reply) {
                Some(value) => Some(value),
                None => report(command, RpcError::UnexpectedReply, None),
            },
            Err(error) => report(command, error, None),
        }
    }
}

fn report<T>(_command: MountCommand, _error: RpcError, fallback: T) -> T {
    #[cfg(feature = "defmt")]
    defmt::error!("Mount call {} failed: {}", _command, _error);
    fallback
}

impl<M: RawMutex + 'static, D: DelayNs> CommandHandler for MountClient<M, D> {
    async fn initialize(&mut self) {
        self.done(MountCommand::Initialize).await
    }

    async fn set_target_right_ascension(&mut self, ra: RaCoordinate) -> bool {
        self.accepted(MountCommand::SetTargetRa(ra)).await
    }

    async fn set_target_declination(&mut self, dec: DecCoordinate) -> bool {
        self.accepted(MountCommand::SetTargetDec(dec)).await
    }

    async fn set_site_latitude(&mut self, latitude: LatitudeCoordinate) -> bool {
        self.accepted(MountCommand::SetLatitude(latitude)).await
    }

    async fn set_site_longitude(&mut self, longitude: LongitudeCoordinate) -> bool {
        self.accepted(MountCommand::SetLongitude(longitude)).await
    }

    async fn set_local_time(&mut self, time: TimeValue) -> bool {
        self.accepted(MountCommand::SetLocalTime(time)).await
    }

    async fn set_date(&mut self, date: DateValue) -> bool {
        self.accepted(MountCommand::SetDate(date)).await
    }

    async fn slew_to_target(&mut self) -> bool {
        self.accepted(MountCommand::SlewToTarget).await
    }

    async fn sync_to_target(&mut self) -> bool {
        self.accepted(MountCommand::SyncToTarget).await
    }

    async fn stop(&mut self) {
        self.done(MountCommand::Stop).await
    }

    async fn current_right_ascension(&mut self) -> Option<RaCoordinate> {
        self.query(MountCommand::GetCurrentRa, |reply| match reply {
            MountReply::Ra(ra) => Some(ra),
            _ => None,
        })
        .await
    }

    async fn current_declination(&mut self) -> Option<DecCoordinate> {
        self.query(MountCommand::GetCurrentDec, |reply| match reply {
            MountReply::Dec(dec) => Some(dec),
            _ => None,
        })
        .await
    }

    async fn target_right_ascension(&mut self) -> Option<RaCoordinate> {
        self.query(MountCommand::GetTargetRa, |reply| match reply {
            MountReply::Ra(ra) => Some(ra),
            _ => None,
        })
        .await
    }

    async fn target_declination(&mut self) -> Option<DecCoordinate> {
        self.query(MountCommand::GetTargetDec, |reply| match reply {
            MountReply::Dec(dec) => Some(dec),
            _ => None,
        })
        .await
    }

    async fn site_latitude(&mut self) -> Option<LatitudeCoordinate> {
        self.query(MountCommand::GetLatitude, |reply| match reply {
            MountReply::Latitude(latitude) => Some(latitude),
            _ => None,
        })
        .await
    }

    async fn site_longitude(&mut self) -> Option<LongitudeCoordinate> {
        self.query(MountCommand::GetLongitude, |reply| match reply {
            MountReply::Longitude(longitude) => Some(longitude),
            _ => None,
        })
        .await
    }

    async fn local_time(&mut self) -> Option<TimeValue> {
        self.query(MountCommand::GetLocalTime, |reply| match reply {
            MountReply::Time(time) => Some(time),
            _ => None,
        })
        .await
    }

    async fn date(&mut self) -> Option<DateValue> {
        self.query(MountCommand::GetDate, |reply| match reply {
            MountReply::Date(date) => Some(date),
            _ => None,
        })
        .await
    }
}
