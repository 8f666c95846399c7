//! Reply formatting
//!
//! Setters answer with a bare `1` or `0`. Everything else is terminated
//! with `#`.

use heapless::String;

use crate::coordinates::{
    write_date, write_dec, write_latitude, write_longitude, write_ra, write_time, DateValue,
    DecCoordinate, LatitudeCoordinate, LongitudeCoordinate, Precision, RaCoordinate, TimeValue,
};

/// Longest reply the dispatcher produces
pub const MAX_REPLY_LEN: usize = 32;

/// Reply buffer filled by the dispatcher
pub type Reply = String<MAX_REPLY_LEN>;

pub(crate) fn accepted(reply: &mut Reply, ok: bool) {
    let _ = reply.push(if ok { '1' } else { '0' });
}

pub(crate) fn text(reply: &mut Reply, message: &str) {
    let _ = reply.push_str(message);
}

fn terminate(reply: &mut Reply) {
    let _ = reply.push('#');
}

pub(crate) fn ra(reply: &mut Reply, value: &RaCoordinate, precision: Precision) {
    let _ = write_ra(reply, value, precision);
    terminate(reply);
}

pub(crate) fn dec(reply: &mut Reply, value: &DecCoordinate, precision: Precision) {
    let _ = write_dec(reply, value, precision);
    terminate(reply);
}

pub(crate) fn latitude(reply: &mut Reply, value: &LatitudeCoordinate) {
    let _ = write_latitude(reply, value);
    terminate(reply);
}

pub(crate) fn longitude(reply: &mut Reply, value: &LongitudeCoordinate) {
    let _ = write_longitude(reply, value);
    terminate(reply);
}

pub(crate) fn time(reply: &mut Reply, value: &TimeValue) {
    let _ = write_time(reply, value);
    terminate(reply);
}

pub(crate) fn date(reply: &mut Reply, value: &DateValue) {
    let _ = write_date(reply, value);
    terminate(reply);
}
