//! Mount state
//!
//! Holds the pointing, target, site and clock state of the mount. Slews
//! complete immediately: there is no motion model, the current position
//! simply becomes the target.

use meridian_protocol::{
    DateValue, DecCoordinate, LatitudeCoordinate, LongitudeCoordinate, RaCoordinate, TimeValue,
};

use crate::traits::MountControl;

/// Mount state owned by the mount worker
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mount {
    initialized: bool,
    tracking: bool,
    current_ra: RaCoordinate,
    current_dec: DecCoordinate,
    target_ra: RaCoordinate,
    target_dec: DecCoordinate,
    latitude: LatitudeCoordinate,
    longitude: LongitudeCoordinate,
    local_time: TimeValue,
    date: DateValue,
}

impl Mount {
    /// Create a parked mount at the given site
    ///
    /// The mount starts pointing at the pole with the target equal to the
    /// current position.
    pub fn new(latitude: LatitudeCoordinate, longitude: LongitudeCoordinate) -> Self {
        let current_ra = RaCoordinate::default();
        let current_dec = DecCoordinate::default();
        Self {
            initialized: false,
            tracking: false,
            current_ra,
            current_dec,
            target_ra: current_ra,
            target_dec: current_dec,
            latitude,
            longitude,
            local_time: TimeValue::default(),
            date: DateValue::default(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }
}

impl MountControl for Mount {
    fn initialize(&mut self) {
        self.initialized = true;
        self.tracking = true;
    }

    fn set_target_ra(&mut self, ra: RaCoordinate) -> bool {
        self.target_ra = ra;
        true
    }

    fn set_target_dec(&mut self, dec: DecCoordinate) -> bool {
        self.target_dec = dec;
        true
    }

    fn set_site_latitude(&mut self, latitude: LatitudeCoordinate) -> bool {
        self.latitude = latitude;
        true
    }

    fn set_site_longitude(&mut self, longitude: LongitudeCoordinate) -> bool {
        self.longitude = longitude;
        true
    }

    fn set_local_time(&mut self, time: TimeValue) -> bool {
        self.local_time = time;
        true
    }

    fn set_date(&mut self, date: DateValue) -> bool {
        self.date = date;
        true
    }

    fn slew_to_target(&mut self) -> bool {
        if !self.initialized {
            return false;
        }
        self.current_ra = self.target_ra;
        self.current_dec = self.target_dec;
        self.tracking = true;
        true
    }

    fn sync_to_target(&mut self) -> bool {
        self.current_ra = self.target_ra;
        self.current_dec = self.target_dec;
        true
    }

    fn stop(&mut self) {
        self.tracking = false;
    }

    fn current_ra(&self) -> RaCoordinate {
        self.current_ra
    }

    fn current_dec(&self) -> DecCoordinate {
        self.current_dec
    }

    fn target_ra(&self) -> RaCoordinate {
        self.target_ra
    }

    fn target_dec(&self) -> DecCoordinate {
        self.target_dec
    }

    fn site_latitude(&self) -> LatitudeCoordinate {
        self.latitude
    }

    fn site_longitude(&self) -> LongitudeCoordinate {
        self.longitude
    }

    fn local_time(&self) -> TimeValue {
        self.local_time
    }

    fn date(&self) -> DateValue {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_protocol::Sign;

    fn mount() -> Mount {
        Mount::new(
            LatitudeCoordinate::new(Sign::Positive, 52, 30).unwrap(),
            LongitudeCoordinate::new(13, 24).unwrap(),
        )
    }

    #[test]
    fn test_initial_state() {
        let mount = mount();
        assert!(!mount.is_initialized());
        assert!(!mount.is_tracking());
        assert_eq!(mount.current_ra(), mount.target_ra());
        assert_eq!(mount.current_dec().degrees(), 90);
        assert_eq!(mount.site_latitude().degrees(), 52);
    }

    #[test]
    fn test_setters_before_initialize() {
        let mut mount = mount();
        let ra = RaCoordinate::new(5, 35, 17).unwrap();
        assert!(mount.set_target_ra(ra));
        assert_eq!(mount.target_ra(), ra);
        assert_eq!(mount.current_ra(), RaCoordinate::default());
    }

    #[test]
    fn test_slew_requires_initialize() {
        let mut mount = mount();
        let ra = RaCoordinate::new(5, 35, 17).unwrap();
        let dec = DecCoordinate::new(Sign::Negative, 5, 23, 28).unwrap();
        mount.set_target_ra(ra);
        mount.set_target_dec(dec);

        assert!(!mount.slew_to_target());
        assert_eq!(mount.current_ra(), RaCoordinate::default());

        mount.initialize();
        assert!(mount.slew_to_target());
        assert_eq!(mount.current_ra(), ra);
        assert_eq!(mount.current_dec(), dec);
        assert!(mount.is_tracking());
    }

    #[test]
    fn test_sync_without_initialize() {
        let mut mount = mount();
        let ra = RaCoordinate::new(12, 0, 0).unwrap();
        mount.set_target_ra(ra);
        assert!(mount.sync_to_target());
        assert_eq!(mount.current_ra(), ra);
        assert!(!mount.is_tracking());
    }

    #[test]
    fn test_stop_halts_tracking() {
        let mut mount = mount();
        mount.initialize();
        assert!(mount.is_tracking());
        mount.stop();
        assert!(!mount.is_tracking());
        assert!(mount.is_initialized());
    }
}
