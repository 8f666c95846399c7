//! Mount control trait
//!
//! Implemented by whatever owns the mount state. Every call is made from the
//! mount worker, one at a time, in submission order.

use meridian_protocol::{
    DateValue, DecCoordinate, LatitudeCoordinate, LongitudeCoordinate, RaCoordinate, TimeValue,
};

/// Mount operations reachable from the serial protocol
///
/// Values passed to setters have already been range checked.
pub trait MountControl {
    /// Bring the mount into its operating state
    fn initialize(&mut self);

    /// Set the target right ascension
    fn set_target_ra(&mut self, ra: RaCoordinate) -> bool;

    /// Set the target declination
    fn set_target_dec(&mut self, dec: DecCoordinate) -> bool;

    fn set_site_latitude(&mut self, latitude: LatitudeCoordinate) -> bool;

    fn set_site_longitude(&mut self, longitude: LongitudeCoordinate) -> bool;

    fn set_local_time(&mut self, time: TimeValue) -> bool;

    fn set_date(&mut self, date: DateValue) -> bool;

    /// Move to the current target
    ///
    /// Returns false if the mount cannot slew right now.
    fn slew_to_target(&mut self) -> bool;

    /// Declare the current target to be the current position
    fn sync_to_target(&mut self) -> bool;

    /// Stop all motion, including tracking
    fn stop(&mut self);

    fn current_ra(&self) -> RaCoordinate;

    fn current_dec(&self) -> DecCoordinate;

    fn target_ra(&self) -> RaCoordinate;

    fn target_dec(&self) -> DecCoordinate;

    fn site_latitude(&self) -> LatitudeCoordinate;

    fn site_longitude(&self) -> LongitudeCoordinate;

    fn local_time(&self) -> TimeValue;

    fn date(&self) -> DateValue;
}
