//! Coordinate, time and date values in LX200 text form
//!
//! Each value type has a checked constructor, a strict parser for the
//! fixed-width wire form and a writer for the reply form. Parsers check the
//! full shape first and report `InvalidFormat` for any mismatch, including
//! trailing characters; ranges are checked afterwards and reported as
//! `OutOfRange`.
//!
//! | Value     | High precision | Low precision |
//! |-----------|----------------|---------------|
//! | RA        | `HH:MM:SS`     | `HH:MM.T`     |
//! | Dec       | `sDD*MM:SS`    | `sDD*MM`      |
//! | Latitude  | `sDD*MM`       | same          |
//! | Longitude | `DDD*MM`       | same          |
//! | Time      | `HH:MM:SS`     | same          |
//! | Date      | `MM/DD/YY`     | same          |
//!
//! Dec also accepts `'` as the minutes/seconds separator and replies with it.

use core::fmt;

use crate::frame::ParseError;

/// Coordinate precision mode, toggled by `:U#`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Precision {
    #[default]
    High,
    Low,
}

impl Precision {
    pub fn toggled(self) -> Self {
        match self {
            Precision::High => Precision::Low,
            Precision::Low => Precision::High,
        }
    }
}

/// Sign of a declination or latitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

impl Sign {
    pub fn from_negative(negative: bool) -> Self {
        if negative {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }
}

/// Right ascension in hours, minutes and seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RaCoordinate {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl RaCoordinate {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self, ParseError> {
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self {
            hours: hours as u8,
            minutes: minutes as u8,
            seconds: seconds as u8,
        })
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }
}

/// Declination in signed degrees, arcminutes and arcseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecCoordinate {
    sign: Sign,
    degrees: u8,
    minutes: u8,
    seconds: u8,
}

impl Default for DecCoordinate {
    /// The celestial pole
    fn default() -> Self {
        Self {
            sign: Sign::Positive,
            degrees: 90,
            minutes: 0,
            seconds: 0,
        }
    }
}

impl DecCoordinate {
    pub fn new(sign: Sign, degrees: u32, minutes: u32, seconds: u32) -> Result<Self, ParseError> {
        if degrees > 90 || minutes >= 60 || seconds >= 60 {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self {
            sign,
            degrees: degrees as u8,
            minutes: minutes as u8,
            seconds: seconds as u8,
        })
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn degrees(&self) -> u8 {
        self.degrees
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }
}

/// Site latitude in signed degrees and arcminutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LatitudeCoordinate {
    sign: Sign,
    degrees: u8,
    minutes: u8,
}

impl LatitudeCoordinate {
    pub fn new(sign: Sign, degrees: u32, minutes: u32) -> Result<Self, ParseError> {
        if degrees > 90 || minutes >= 60 {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self {
            sign,
            degrees: degrees as u8,
            minutes: minutes as u8,
        })
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn degrees(&self) -> u8 {
        self.degrees
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }
}

/// Site longitude in degrees west and arcminutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LongitudeCoordinate {
    degrees: u16,
    minutes: u8,
}

impl LongitudeCoordinate {
    pub fn new(degrees: u32, minutes: u32) -> Result<Self, ParseError> {
        if degrees >= 360 || minutes >= 60 {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self {
            degrees: degrees as u16,
            minutes: minutes as u8,
        })
    }

    pub fn degrees(&self) -> u16 {
        self.degrees
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }
}

/// Local time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeValue {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl TimeValue {
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self, ParseError> {
        if hours >= 24 || minutes >= 60 || seconds >= 60 {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self {
            hours: hours as u8,
            minutes: minutes as u8,
            seconds: seconds as u8,
        })
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }
}

/// Calendar date with a two-digit year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateValue {
    month: u8,
    day: u8,
    year: u8,
}

impl Default for DateValue {
    fn default() -> Self {
        Self {
            month: 1,
            day: 1,
            year: 0,
        }
    }
}

impl DateValue {
    pub fn new(month: u32, day: u32, year: u32) -> Result<Self, ParseError> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) || year > 99 {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self {
            month: month as u8,
            day: day as u8,
            year: year as u8,
        })
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn year(&self) -> u8 {
        self.year
    }
}

/// Fixed-width field reader over an ASCII string
struct Fields<'a> {
    rest: &'a [u8],
}

impl<'a> Fields<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            rest: input.as_bytes(),
        }
    }

    /// Read exactly `count` decimal digits
    fn digits(&mut self, count: usize) -> Result<u32, ParseError> {
        if self.rest.len() < count {
            return Err(ParseError::InvalidFormat);
        }
        let (head, tail) = self.rest.split_at(count);
        let mut value = 0u32;
        for &byte in head {
            if !byte.is_ascii_digit() {
                return Err(ParseError::InvalidFormat);
            }
            value = value * 10 + u32::from(byte - b'0');
        }
        self.rest = tail;
        Ok(value)
    }

    fn one_of(&mut self, accepted: &[u8]) -> Result<u8, ParseError> {
        match self.rest.split_first() {
            Some((&byte, tail)) if accepted.contains(&byte) => {
                self.rest = tail;
                Ok(byte)
            }
            _ => Err(ParseError::InvalidFormat),
        }
    }

    fn literal(&mut self, expected: u8) -> Result<(), ParseError> {
        self.one_of(&[expected]).map(|_| ())
    }

    fn sign(&mut self) -> Result<Sign, ParseError> {
        self.one_of(b"+-").map(|byte| Sign::from_negative(byte == b'-'))
    }

    fn finish(self) -> Result<(), ParseError> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(ParseError::InvalidFormat)
        }
    }
}

/// Parse `HH:MM:SS` (high) or `HH:MM.T` (low, tenths of a minute)
pub fn parse_ra(input: &str, precision: Precision) -> Result<RaCoordinate, ParseError> {
    let mut fields = Fields::new(input);
    let hours = fields.digits(2)?;
    fields.literal(b':')?;
    let minutes = fields.digits(2)?;
    let seconds = match precision {
        Precision::High => {
            fields.literal(b':')?;
            fields.digits(2)?
        }
        Precision::Low => {
            fields.literal(b'.')?;
            fields.digits(1)? * 6
        }
    };
    fields.finish()?;
    RaCoordinate::new(hours, minutes, seconds)
}

/// Parse `sDD*MM:SS` / `sDD*MM'SS` (high) or `sDD*MM` (low)
pub fn parse_dec(input: &str, precision: Precision) -> Result<DecCoordinate, ParseError> {
    let mut fields = Fields::new(input);
    let sign = fields.sign()?;
    let degrees = fields.digits(2)?;
    fields.literal(b'*')?;
    let minutes = fields.digits(2)?;
    let seconds = match precision {
        Precision::High => {
            fields.one_of(b":'")?;
            fields.digits(2)?
        }
        Precision::Low => 0,
    };
    fields.finish()?;
    DecCoordinate::new(sign, degrees, minutes, seconds)
}

/// Parse `sDD*MM`
pub fn parse_latitude(input: &str) -> Result<LatitudeCoordinate, ParseError> {
    let mut fields = Fields::new(input);
    let sign = fields.sign()?;
    let degrees = fields.digits(2)?;
    fields.literal(b'*')?;
    let minutes = fields.digits(2)?;
    fields.finish()?;
    LatitudeCoordinate::new(sign, degrees, minutes)
}

/// Parse `DDD*MM`
pub fn parse_longitude(input: &str) -> Result<LongitudeCoordinate, ParseError> {
    let mut fields = Fields::new(input);
    let degrees = fields.digits(3)?;
    fields.literal(b'*')?;
    let minutes = fields.digits(2)?;
    fields.finish()?;
    LongitudeCoordinate::new(degrees, minutes)
}

/// Parse `HH:MM:SS`
pub fn parse_time(input: &str) -> Result<TimeValue, ParseError> {
    let mut fields = Fields::new(input);
    let hours = fields.digits(2)?;
    fields.literal(b':')?;
    let minutes = fields.digits(2)?;
    fields.literal(b':')?;
    let seconds = fields.digits(2)?;
    fields.finish()?;
    TimeValue::new(hours, minutes, seconds)
}

/// Parse `MM/DD/YY`
pub fn parse_date(input: &str) -> Result<DateValue, ParseError> {
    let mut fields = Fields::new(input);
    let month = fields.digits(2)?;
    fields.literal(b'/')?;
    let day = fields.digits(2)?;
    fields.literal(b'/')?;
    let year = fields.digits(2)?;
    fields.finish()?;
    DateValue::new(month, day, year)
}

/// Write RA in reply form (without the `#` terminator)
///
/// Low precision truncates seconds to whole tenths of a minute.
pub fn write_ra<W: fmt::Write>(out: &mut W, ra: &RaCoordinate, precision: Precision) -> fmt::Result {
    match precision {
        Precision::High => write!(out, "{:02}:{:02}:{:02}", ra.hours, ra.minutes, ra.seconds),
        Precision::Low => write!(out, "{:02}:{:02}.{}", ra.hours, ra.minutes, ra.seconds / 6),
    }
}

/// Write Dec in reply form (without the `#` terminator)
pub fn write_dec<W: fmt::Write>(out: &mut W, dec: &DecCoordinate, precision: Precision) -> fmt::Result {
    let sign = dec.sign.as_char();
    match precision {
        Precision::High => write!(
            out,
            "{}{:02}*{:02}'{:02}",
            sign, dec.degrees, dec.minutes, dec.seconds
        ),
        Precision::Low => write!(out, "{}{:02}*{:02}", sign, dec.degrees, dec.minutes),
    }
}

pub fn write_latitude<W: fmt::Write>(out: &mut W, latitude: &LatitudeCoordinate) -> fmt::Result {
    write!(
        out,
        "{}{:02}*{:02}",
        latitude.sign.as_char(),
        latitude.degrees,
        latitude.minutes
    )
}

pub fn write_longitude<W: fmt::Write>(out: &mut W, longitude: &LongitudeCoordinate) -> fmt::Result {
    write!(out, "{:03}*{:02}", longitude.degrees, longitude.minutes)
}

pub fn write_time<W: fmt::Write>(out: &mut W, time: &TimeValue) -> fmt::Result {
    write!(out, "{:02}:{:02}:{:02}", time.hours, time.minutes, time.seconds)
}

pub fn write_date<W: fmt::Write>(out: &mut W, date: &DateValue) -> fmt::Result {
    write!(out, "{:02}/{:02}/{:02}", date.month, date.day, date.year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;
    use proptest::prelude::*;

    fn ra_text(ra: &RaCoordinate, precision: Precision) -> String<16> {
        let mut out = String::new();
        write_ra(&mut out, ra, precision).unwrap();
        out
    }

    fn dec_text(dec: &DecCoordinate, precision: Precision) -> String<16> {
        let mut out = String::new();
        write_dec(&mut out, dec, precision).unwrap();
        out
    }

    #[test]
    fn test_parse_ra_high() {
        let ra = parse_ra("12:34:56", Precision::High).unwrap();
        assert_eq!((ra.hours(), ra.minutes(), ra.seconds()), (12, 34, 56));
        assert_eq!(parse_ra("00:00:00", Precision::High).unwrap(), RaCoordinate::default());
        assert!(parse_ra("23:59:59", Precision::High).is_ok());
    }

    #[test]
    fn test_parse_ra_low() {
        let ra = parse_ra("12:34.5", Precision::Low).unwrap();
        assert_eq!((ra.hours(), ra.minutes(), ra.seconds()), (12, 34, 30));
        assert_eq!(parse_ra("12:34:56", Precision::Low), Err(ParseError::InvalidFormat));
    }

    #[test]
    fn test_parse_ra_shape_errors() {
        assert_eq!(parse_ra("1234:56", Precision::High), Err(ParseError::InvalidFormat));
        assert_eq!(parse_ra("12:34", Precision::High), Err(ParseError::InvalidFormat));
        assert_eq!(parse_ra("12:34:5X", Precision::High), Err(ParseError::InvalidFormat));
        assert_eq!(parse_ra("1:34:56", Precision::High), Err(ParseError::InvalidFormat));
        assert_eq!(parse_ra("12:34:56#", Precision::High), Err(ParseError::InvalidFormat));
        assert_eq!(parse_ra("", Precision::High), Err(ParseError::InvalidFormat));
    }

    #[test]
    fn test_parse_ra_range_errors() {
        assert_eq!(parse_ra("24:00:00", Precision::High), Err(ParseError::OutOfRange));
        assert_eq!(parse_ra("12:60:00", Precision::High), Err(ParseError::OutOfRange));
        assert_eq!(parse_ra("12:00:60", Precision::High), Err(ParseError::OutOfRange));
        assert_eq!(parse_ra("12:34:60", Precision::High), Err(ParseError::OutOfRange));
        assert!(parse_ra("00:00:00", Precision::High).is_ok());
        assert!(parse_ra("23:59:59", Precision::High).is_ok());
    }

    #[test]
    fn test_parse_dec() {
        let dec = parse_dec("+45*30:15", Precision::High).unwrap();
        assert_eq!(dec.sign(), Sign::Positive);
        assert_eq!((dec.degrees(), dec.minutes(), dec.seconds()), (45, 30, 15));

        let dec = parse_dec("-12*34'56", Precision::High).unwrap();
        assert_eq!(dec.sign(), Sign::Negative);
        assert_eq!((dec.degrees(), dec.minutes(), dec.seconds()), (12, 34, 56));

        let dec = parse_dec("-05*07", Precision::Low).unwrap();
        assert_eq!((dec.degrees(), dec.minutes(), dec.seconds()), (5, 7, 0));
    }

    #[test]
    fn test_parse_dec_negative_zero_keeps_sign() {
        let dec = parse_dec("-00*30:00", Precision::High).unwrap();
        assert_eq!(dec.sign(), Sign::Negative);
        assert_eq!(dec.degrees(), 0);
        assert_eq!(dec_text(&dec, Precision::High).as_str(), "-00*30'00");
    }

    #[test]
    fn test_parse_dec_errors() {
        assert_eq!(parse_dec("45*30:15", Precision::High), Err(ParseError::InvalidFormat));
        assert_eq!(parse_dec("+45:30:15", Precision::High), Err(ParseError::InvalidFormat));
        assert_eq!(parse_dec("+45*30", Precision::High), Err(ParseError::InvalidFormat));
        assert_eq!(parse_dec("+45*30:15", Precision::Low), Err(ParseError::InvalidFormat));
        assert_eq!(parse_dec("+91*00:00", Precision::High), Err(ParseError::OutOfRange));
        assert_eq!(parse_dec("-91*00:00", Precision::High), Err(ParseError::OutOfRange));
        assert_eq!(parse_dec("-91*00", Precision::Low), Err(ParseError::OutOfRange));
        assert_eq!(parse_dec("+45*60:00", Precision::High), Err(ParseError::OutOfRange));
        assert!(parse_dec("-90*00:00", Precision::High).is_ok());
        assert!(parse_dec("+90*00:00", Precision::High).is_ok());
    }

    #[test]
    fn test_parse_latitude() {
        let lat = parse_latitude("+52*30").unwrap();
        assert_eq!((lat.sign(), lat.degrees(), lat.minutes()), (Sign::Positive, 52, 30));
        assert_eq!(parse_latitude("52*30"), Err(ParseError::InvalidFormat));
        assert_eq!(parse_latitude("-91*00"), Err(ParseError::OutOfRange));
    }

    #[test]
    fn test_parse_longitude() {
        let lon = parse_longitude("359*59").unwrap();
        assert_eq!((lon.degrees(), lon.minutes()), (359, 59));
        assert_eq!(parse_longitude("360*00"), Err(ParseError::OutOfRange));
        assert_eq!(parse_longitude("97*30"), Err(ParseError::InvalidFormat));
        assert_eq!(parse_longitude("+097*30"), Err(ParseError::InvalidFormat));
    }

    #[test]
    fn test_parse_time() {
        let time = parse_time("21:05:09").unwrap();
        assert_eq!((time.hours(), time.minutes(), time.seconds()), (21, 5, 9));
        assert_eq!(parse_time("24:00:00"), Err(ParseError::OutOfRange));
        assert_eq!(parse_time("21:05"), Err(ParseError::InvalidFormat));
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("03/14/24").unwrap();
        assert_eq!((date.month(), date.day(), date.year()), (3, 14, 24));
        assert_eq!(parse_date("13/01/24"), Err(ParseError::OutOfRange));
        assert_eq!(parse_date("00/01/24"), Err(ParseError::OutOfRange));
        assert_eq!(parse_date("01/00/24"), Err(ParseError::OutOfRange));
        assert_eq!(parse_date("01/32/24"), Err(ParseError::OutOfRange));
        assert_eq!(parse_date("1/1/24"), Err(ParseError::InvalidFormat));
    }

    #[test]
    fn test_write_forms() {
        let ra = RaCoordinate::new(5, 7, 9).unwrap();
        assert_eq!(ra_text(&ra, Precision::High).as_str(), "05:07:09");
        assert_eq!(ra_text(&ra, Precision::Low).as_str(), "05:07.1");

        let dec = DecCoordinate::new(Sign::Positive, 8, 0, 3).unwrap();
        assert_eq!(dec_text(&dec, Precision::High).as_str(), "+08*00'03");
        assert_eq!(dec_text(&dec, Precision::Low).as_str(), "+08*00");

        let mut out: String<16> = String::new();
        write_longitude(&mut out, &LongitudeCoordinate::new(7, 5).unwrap()).unwrap();
        assert_eq!(out.as_str(), "007*05");

        out.clear();
        write_date(&mut out, &DateValue::new(1, 2, 3).unwrap()).unwrap();
        assert_eq!(out.as_str(), "01/02/03");
    }

    #[test]
    fn test_precision_toggle() {
        assert_eq!(Precision::High.toggled(), Precision::Low);
        assert_eq!(Precision::Low.toggled(), Precision::High);
    }

    proptest! {
        #[test]
        fn prop_ra_high_round_trip(h in 0u32..24, m in 0u32..60, s in 0u32..60) {
            let ra = RaCoordinate::new(h, m, s).unwrap();
            let text = ra_text(&ra, Precision::High);
            prop_assert_eq!(parse_ra(&text, Precision::High).unwrap(), ra);
        }

        #[test]
        fn prop_ra_low_round_trip(h in 0u32..24, m in 0u32..60, t in 0u32..10) {
            let ra = RaCoordinate::new(h, m, t * 6).unwrap();
            let text = ra_text(&ra, Precision::Low);
            prop_assert_eq!(parse_ra(&text, Precision::Low).unwrap(), ra);
        }

        #[test]
        fn prop_dec_high_round_trip(negative in any::<bool>(), d in 0u32..=90, m in 0u32..60, s in 0u32..60) {
            let dec = DecCoordinate::new(Sign::from_negative(negative), d, m, s).unwrap();
            let text = dec_text(&dec, Precision::High);
            prop_assert_eq!(parse_dec(&text, Precision::High).unwrap(), dec);
        }

        #[test]
        fn prop_ra_parser_never_panics(input in "\\PC{0,12}") {
            let _ = parse_ra(&input, Precision::High);
            let _ = parse_ra(&input, Precision::Low);
            let _ = parse_dec(&input, Precision::High);
        }
    }
}
