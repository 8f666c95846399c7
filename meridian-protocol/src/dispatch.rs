//! Command decoding and dispatch
//!
//! Each supported command is described by a rule: a command name and a
//! parameter pattern from [`crate::grammar`]. Rules are tried in order and
//! the first full match wins. The matched captures are range checked and
//! turned into a typed [`Lx200Command`] before any handler is touched, so a
//! handler never sees an invalid value.

use core::future::Future;

use crate::command::ParsedCommand;
use crate::coordinates::{
    DateValue, DecCoordinate, LatitudeCoordinate, LongitudeCoordinate, Precision, RaCoordinate,
    Sign, TimeValue,
};
use crate::frame::ParseError;
use crate::grammar::Token::{Literal, SignedInt, UnsignedInt};
use crate::grammar::{eval, Capture, Pattern};
use crate::reply::{self, Reply};

/// Reply to a successful `:CM#`
pub const SYNC_REPLY: &str = "NONE#";

/// Reply to a rejected `:MS#`
pub const SLEW_REJECTED_REPLY: &str = "1Slew rejected#";

/// Receiver of decoded commands
///
/// Setters return whether the mount accepted the value. Getters return
/// `None` when the value could not be obtained, in which case no reply is
/// sent.
pub trait CommandHandler {
    fn initialize(&mut self) -> impl Future<Output = ()>;

    fn set_target_right_ascension(&mut self, ra: RaCoordinate) -> impl Future<Output = bool>;

    fn set_target_declination(&mut self, dec: DecCoordinate) -> impl Future<Output = bool>;

    fn set_site_latitude(&mut self, latitude: LatitudeCoordinate) -> impl Future<Output = bool>;

    fn set_site_longitude(&mut self, longitude: LongitudeCoordinate) -> impl Future<Output = bool>;

    fn set_local_time(&mut self, time: TimeValue) -> impl Future<Output = bool>;

    fn set_date(&mut self, date: DateValue) -> impl Future<Output = bool>;

    fn slew_to_target(&mut self) -> impl Future<Output = bool>;

    fn sync_to_target(&mut self) -> impl Future<Output = bool>;

    fn stop(&mut self) -> impl Future<Output = ()>;

    fn current_right_ascension(&mut self) -> impl Future<Output = Option<RaCoordinate>>;

    fn current_declination(&mut self) -> impl Future<Output = Option<DecCoordinate>>;

    fn target_right_ascension(&mut self) -> impl Future<Output = Option<RaCoordinate>>;

    fn target_declination(&mut self) -> impl Future<Output = Option<DecCoordinate>>;

    fn site_latitude(&mut self) -> impl Future<Output = Option<LatitudeCoordinate>>;

    fn site_longitude(&mut self) -> impl Future<Output = Option<LongitudeCoordinate>>;

    fn local_time(&mut self) -> impl Future<Output = Option<TimeValue>>;

    fn date(&mut self) -> impl Future<Output = Option<DateValue>>;
}

/// A fully validated command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lx200Command {
    /// `:I#`
    Initialize,
    /// `:SrHH:MM:SS#` or `:SrHH:MM.T#`
    SetTargetRa(RaCoordinate),
    /// `:SdsDD*MM:SS#` or `:SdsDD*MM#`
    SetTargetDec(DecCoordinate),
    /// `:StsDD*MM#`
    SetLatitude(LatitudeCoordinate),
    /// `:SgDDD*MM#`
    SetLongitude(LongitudeCoordinate),
    /// `:SLHH:MM:SS#`
    SetLocalTime(TimeValue),
    /// `:SCMM/DD/YY#`
    SetDate(DateValue),
    /// `:GR#`
    GetCurrentRa,
    /// `:GD#`
    GetCurrentDec,
    /// `:Gr#`
    GetTargetRa,
    /// `:Gd#`
    GetTargetDec,
    /// `:Gt#`
    GetLatitude,
    /// `:Gg#`
    GetLongitude,
    /// `:GL#`
    GetLocalTime,
    /// `:GC#`
    GetDate,
    /// `:MS#`
    SlewToTarget,
    /// `:CM#`
    SyncToTarget,
    /// `:Q#`
    Stop,
    /// `:U#`, owned by whoever owns the frame assembler
    TogglePrecision,
}

type Build = fn(&[Capture]) -> Result<Lx200Command, ParseError>;

struct Rule {
    name: &'static str,
    pattern: &'static Pattern,
    build: Build,
}

impl Rule {
    const fn new(name: &'static str, pattern: &'static Pattern, build: Build) -> Self {
        Self {
            name,
            pattern,
            build,
        }
    }
}

const NONE: &Pattern = &[];
const HMS: &Pattern = &[UnsignedInt, Literal(":"), UnsignedInt, Literal(":"), UnsignedInt];
const HM_TENTHS: &Pattern = &[UnsignedInt, Literal(":"), UnsignedInt, Literal("."), UnsignedInt];
const DMS_COLON: &Pattern = &[SignedInt, Literal("*"), UnsignedInt, Literal(":"), UnsignedInt];
const DMS_QUOTE: &Pattern = &[SignedInt, Literal("*"), UnsignedInt, Literal("'"), UnsignedInt];
const SIGNED_DM: &Pattern = &[SignedInt, Literal("*"), UnsignedInt];
const UNSIGNED_DM: &Pattern = &[UnsignedInt, Literal("*"), UnsignedInt];
const MDY: &Pattern = &[UnsignedInt, Literal("/"), UnsignedInt, Literal("/"), UnsignedInt];

static RULES: &[Rule] = &[
    Rule::new("I", NONE, |_| Ok(Lx200Command::Initialize)),
    Rule::new("Sr", HMS, target_ra_high),
    Rule::new("Sr", HM_TENTHS, target_ra_low),
    Rule::new("Sd", DMS_COLON, target_dec_high),
    Rule::new("Sd", DMS_QUOTE, target_dec_high),
    Rule::new("Sd", SIGNED_DM, target_dec_low),
    Rule::new("St", SIGNED_DM, site_latitude),
    Rule::new("Sg", UNSIGNED_DM, site_longitude),
    Rule::new("SL", HMS, local_time),
    Rule::new("SC", MDY, date),
    Rule::new("GR", NONE, |_| Ok(Lx200Command::GetCurrentRa)),
    Rule::new("GD", NONE, |_| Ok(Lx200Command::GetCurrentDec)),
    Rule::new("Gr", NONE, |_| Ok(Lx200Command::GetTargetRa)),
    Rule::new("Gd", NONE, |_| Ok(Lx200Command::GetTargetDec)),
    Rule::new("Gt", NONE, |_| Ok(Lx200Command::GetLatitude)),
    Rule::new("Gg", NONE, |_| Ok(Lx200Command::GetLongitude)),
    Rule::new("GL", NONE, |_| Ok(Lx200Command::GetLocalTime)),
    Rule::new("GC", NONE, |_| Ok(Lx200Command::GetDate)),
    Rule::new("MS", NONE, |_| Ok(Lx200Command::SlewToTarget)),
    Rule::new("CM", NONE, |_| Ok(Lx200Command::SyncToTarget)),
    Rule::new("Q", NONE, |_| Ok(Lx200Command::Stop)),
    Rule::new("U", NONE, |_| Ok(Lx200Command::TogglePrecision)),
];

fn unsigned<const N: usize>(captures: &[Capture]) -> Result<[u32; N], ParseError> {
    if captures.len() != N {
        return Err(ParseError::InvalidFormat);
    }
    let mut values = [0u32; N];
    for (value, capture) in values.iter_mut().zip(captures) {
        *value = capture.unsigned().ok_or(ParseError::InvalidFormat)?;
    }
    Ok(values)
}

/// Split `[signed, unsigned...]` captures
fn signed_then_unsigned<const N: usize>(
    captures: &[Capture],
) -> Result<(Sign, u32, [u32; N]), ParseError> {
    let (first, rest) = captures.split_first().ok_or(ParseError::InvalidFormat)?;
    let (negative, magnitude) = first.signed().ok_or(ParseError::InvalidFormat)?;
    Ok((Sign::from_negative(negative), magnitude, unsigned(rest)?))
}

fn target_ra_high(captures: &[Capture]) -> Result<Lx200Command, ParseError> {
    let [hours, minutes, seconds] = unsigned(captures)?;
    Ok(Lx200Command::SetTargetRa(RaCoordinate::new(hours, minutes, seconds)?))
}

fn target_ra_low(captures: &[Capture]) -> Result<Lx200Command, ParseError> {
    let [hours, minutes, tenths] = unsigned(captures)?;
    if tenths > 9 {
        return Err(ParseError::OutOfRange);
    }
    Ok(Lx200Command::SetTargetRa(RaCoordinate::new(hours, minutes, tenths * 6)?))
}

fn target_dec_high(captures: &[Capture]) -> Result<Lx200Command, ParseError> {
    let (sign, degrees, [minutes, seconds]) = signed_then_unsigned(captures)?;
    Ok(Lx200Command::SetTargetDec(DecCoordinate::new(sign, degrees, minutes, seconds)?))
}

fn target_dec_low(captures: &[Capture]) -> Result<Lx200Command, ParseError> {
    let (sign, degrees, [minutes]) = signed_then_unsigned(captures)?;
    Ok(Lx200Command::SetTargetDec(DecCoordinate::new(sign, degrees, minutes, 0)?))
}

fn site_latitude(captures: &[Capture]) -> Result<Lx200Command, ParseError> {
    let (sign, degrees, [minutes]) = signed_then_unsigned(captures)?;
    Ok(Lx200Command::SetLatitude(LatitudeCoordinate::new(sign, degrees, minutes)?))
}

fn site_longitude(captures: &[Capture]) -> Result<Lx200Command, ParseError> {
    let [degrees, minutes] = unsigned(captures)?;
    Ok(Lx200Command::SetLongitude(LongitudeCoordinate::new(degrees, minutes)?))
}

fn local_time(captures: &[Capture]) -> Result<Lx200Command, ParseError> {
    let [hours, minutes, seconds] = unsigned(captures)?;
    Ok(Lx200Command::SetLocalTime(TimeValue::new(hours, minutes, seconds)?))
}

fn date(captures: &[Capture]) -> Result<Lx200Command, ParseError> {
    let [month, day, year] = unsigned(captures)?;
    Ok(Lx200Command::SetDate(DateValue::new(month, day, year)?))
}

/// Decode a parsed frame into a validated command
///
/// Returns `InvalidFormat` when no rule matches and `OutOfRange` when a rule
/// matched but a value failed its range check.
pub fn decode(command: &ParsedCommand<'_>) -> Result<Lx200Command, ParseError> {
    for rule in RULES.iter().filter(|rule| rule.name == command.name) {
        let mut decoded = None;
        if eval(rule.pattern, command.parameters, |captures| {
            decoded = Some((rule.build)(captures))
        }) {
            return decoded.unwrap_or(Err(ParseError::InvalidFormat));
        }
    }
    Err(ParseError::InvalidFormat)
}

/// Run a decoded command against the handler and format its reply
///
/// [`Lx200Command::TogglePrecision`] is a no-op here.
pub async fn execute<H: CommandHandler>(
    command: Lx200Command,
    precision: Precision,
    handler: &mut H,
    reply: &mut Reply,
) {
    match command {
        Lx200Command::Initialize => handler.initialize().await,
        Lx200Command::SetTargetRa(ra) => {
            reply::accepted(reply, handler.set_target_right_ascension(ra).await)
        }
        Lx200Command::SetTargetDec(dec) => {
            reply::accepted(reply, handler.set_target_declination(dec).await)
        }
        Lx200Command::SetLatitude(latitude) => {
            reply::accepted(reply, handler.set_site_latitude(latitude).await)
        }
        Lx200Command::SetLongitude(longitude) => {
            reply::accepted(reply, handler.set_site_longitude(longitude).await)
        }
        Lx200Command::SetLocalTime(time) => {
            reply::accepted(reply, handler.set_local_time(time).await)
        }
        Lx200Command::SetDate(date) => reply::accepted(reply, handler.set_date(date).await),
        Lx200Command::GetCurrentRa => {
            if let Some(ra) = handler.current_right_ascension().await {
                reply::ra(reply, &ra, precision);
            }
        }
        Lx200Command::GetCurrentDec => {
            if let Some(dec) = handler.current_declination().await {
                reply::dec(reply, &dec, precision);
            }
        }
        Lx200Command::GetTargetRa => {
            if let Some(ra) = handler.target_right_ascension().await {
                reply::ra(reply, &ra, precision);
            }
        }
        Lx200Command::GetTargetDec => {
            if let Some(dec) = handler.target_declination().await {
                reply::dec(reply, &dec, precision);
            }
        }
        Lx200Command::GetLatitude => {
            if let Some(latitude) = handler.site_latitude().await {
                reply::latitude(reply, &latitude);
            }
        }
        Lx200Command::GetLongitude => {
            if let Some(longitude) = handler.site_longitude().await {
                reply::longitude(reply, &longitude);
            }
        }
        Lx200Command::GetLocalTime => {
            if let Some(time) = handler.local_time().await {
                reply::time(reply, &time);
            }
        }
        Lx200Command::GetDate => {
            if let Some(date) = handler.date().await {
                reply::date(reply, &date);
            }
        }
        Lx200Command::SlewToTarget => {
            if handler.slew_to_target().await {
                reply::text(reply, "0");
            } else {
                reply::text(reply, SLEW_REJECTED_REPLY);
            }
        }
        Lx200Command::SyncToTarget => {
            if handler.sync_to_target().await {
                reply::text(reply, SYNC_REPLY);
            }
        }
        Lx200Command::Stop => handler.stop().await,
        Lx200Command::TogglePrecision => {}
    }
}

/// Write the reply for a command that failed to decode
///
/// Setters answer `0`; other commands get no reply.
pub fn reject(command: &ParsedCommand<'_>, _error: ParseError, reply: &mut Reply) {
    if command.is_setter() {
        reply::accepted(reply, false);
    }
}

/// Decode a command and run it against the handler
///
/// Returns the decoded command so the caller can act on
/// [`Lx200Command::TogglePrecision`], which is not run here. A decode error
/// is logged and returned without touching the handler or the reply.
pub async fn handle_command<H: CommandHandler>(
    command: &ParsedCommand<'_>,
    handler: &mut H,
    reply: &mut Reply,
) -> Result<Lx200Command, ParseError> {
    match decode(command) {
        Ok(decoded) => {
            execute(decoded, command.precision, handler, reply).await;
            Ok(decoded)
        }
        Err(error) => {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Unknown command {=str} {=str}: {}",
                command.name,
                command.parameters,
                error
            );
            Err(error)
        }
    }
}

/// Decode and execute a command
///
/// Returns whether the handler ran. That is `false` when the command does
/// not match any rule, carries an out of range value, or is `:U#`, which
/// only the frame assembler's owner can act on.
pub async fn dispatch<H: CommandHandler>(
    command: &ParsedCommand<'_>,
    handler: &mut H,
    reply: &mut Reply,
) -> bool {
    matches!(
        handle_command(command, handler, reply).await,
        Ok(decoded) if decoded != Lx200Command::TogglePrecision
    )
}
