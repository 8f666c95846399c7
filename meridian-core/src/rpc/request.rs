//! Work items submitted to the mount worker

use core::fmt;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

use meridian_protocol::{
    DateValue, DecCoordinate, LatitudeCoordinate, LongitudeCoordinate, RaCoordinate, TimeValue,
};

use super::async_result::{AsyncResult, Ticket};
use crate::traits::MountControl;

/// Maximum number of requests waiting for the worker
pub const MOUNT_QUEUE_DEPTH: usize = 4;

/// Operation to run on the mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MountCommand {
    Initialize,
    SetTargetRa(RaCoordinate),
    SetTargetDec(DecCoordinate),
    SetLatitude(LatitudeCoordinate),
    SetLongitude(LongitudeCoordinate),
    SetLocalTime(TimeValue),
    SetDate(DateValue),
    SlewToTarget,
    SyncToTarget,
    Stop,
    GetCurrentRa,
    GetCurrentDec,
    GetTargetRa,
    GetTargetDec,
    GetLatitude,
    GetLongitude,
    GetLocalTime,
    GetDate,
}

/// Result of a [`MountCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MountReply {
    /// Command without a result completed
    Done,
    /// Setter or motion command accepted or refused
    Accepted(bool),
    Ra(RaCoordinate),
    Dec(DecCoordinate),
    Latitude(LatitudeCoordinate),
    Longitude(LongitudeCoordinate),
    Time(TimeValue),
    Date(DateValue),
}

/// Slot a caller waits on for its [`MountReply`]
pub type ReplySlot<M> = AsyncResult<M, MountReply>;

/// A command plus where to deliver its reply
pub struct MountRequest<M: RawMutex + 'static> {
    pub command: MountCommand,
    pub ticket: Ticket,
    pub reply: &'static ReplySlot<M>,
}

impl<M: RawMutex + 'static> fmt::Debug for MountRequest<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountRequest")
            .field("command", &self.command)
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// FIFO run queue between callers and the mount worker
pub type MountQueue<M> = Channel<M, MountRequest<M>, MOUNT_QUEUE_DEPTH>;

/// Run one command against the mount
pub fn execute<C: MountControl>(mount: &mut C, command: MountCommand) -> MountReply {
    match command {
        MountCommand::Initialize => {
            mount.initialize();
            MountReply::Done
        }
        MountCommand::SetTargetRa(ra) => MountReply::Accepted(mount.set_target_ra(ra)),
        MountCommand::SetTargetDec(dec) => MountReply::Accepted(mount.set_target_dec(dec)),
        MountCommand::SetLatitude(latitude) => {
            MountReply::Accepted(mount.set_site_latitude(latitude))
        }
        MountCommand::SetLongitude(longitude) => {
            MountReply::Accepted(mount.set_site_longitude(longitude))
        }
        MountCommand::SetLocalTime(time) => MountReply::Accepted(mount.set_local_time(time)),
        MountCommand::SetDate(date) => MountReply::Accepted(mount.set_date(date)),
        MountCommand::SlewToTarget => MountReply::Accepted(mount.slew_to_target()),
        MountCommand::SyncToTarget => MountReply::Accepted(mount.sync_to_target()),
        MountCommand::Stop => {
            mount.stop();
            MountReply::Done
        }
        MountCommand::GetCurrentRa => MountReply::Ra(mount.current_ra()),
        MountCommand::GetCurrentDec => MountReply::Dec(mount.current_dec()),
        MountCommand::GetTargetRa => MountReply::Ra(mount.target_ra()),
        MountCommand::GetTargetDec => MountReply::Dec(mount.target_dec()),
        MountCommand::GetLatitude => MountReply::Latitude(mount.site_latitude()),
        MountCommand::GetLongitude => MountReply::Longitude(mount.site_longitude()),
        MountCommand::GetLocalTime => MountReply::Time(mount.local_time()),
        MountCommand::GetDate => MountReply::Date(mount.date()),
    }
}
