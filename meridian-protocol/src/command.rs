//! Command identification
//!
//! A frame body such as `Sr12:34:56` is split into a command name (`Sr`) and
//! its parameters (`12:34:56`), and tagged with the command family.

use crate::coordinates::Precision;

/// LX200 command families, keyed on the leading character(s) of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandFamily {
    Alignment,
    Backup,
    DateTime,
    Distance,
    Focus,
    GetInfo,
    Gps,
    Home,
    Initialize,
    Library,
    Movement,
    Precision,
    Quit,
    Rate,
    SetInfo,
    Tracking,
    User,
    Extended,
    Unknown,
}

impl CommandFamily {
    /// Identify the family of a frame body
    pub fn identify(body: &str) -> Self {
        let bytes = body.as_bytes();

        // Site, time and date accessors live under G/S but belong to DateTime
        if let [b'G' | b'S', second, ..] = bytes {
            let date_time = match bytes[0] {
                b'G' => matches!(second, b'C' | b'L' | b'a' | b'c'),
                _ => matches!(second, b'C' | b'L' | b'G' | b'H'),
            };
            if date_time {
                return CommandFamily::DateTime;
            }
        }

        // gT reads GPS time but is a plain info query
        if bytes.starts_with(b"gT") {
            return CommandFamily::GetInfo;
        }

        match bytes.first() {
            Some(b'A') => CommandFamily::Alignment,
            Some(b'B') => CommandFamily::Backup,
            Some(b'C') => CommandFamily::DateTime,
            Some(b'D') => CommandFamily::Distance,
            Some(b'F') => CommandFamily::Focus,
            Some(b'G') => CommandFamily::GetInfo,
            Some(b'g') => CommandFamily::Gps,
            Some(b'h' | b'H') => CommandFamily::Home,
            Some(b'I') => CommandFamily::Initialize,
            Some(b'L') => CommandFamily::Library,
            Some(b'M') => CommandFamily::Movement,
            Some(b'P') => CommandFamily::Precision,
            Some(b'Q') => CommandFamily::Quit,
            Some(b'R') => CommandFamily::Rate,
            Some(b'S') => CommandFamily::SetInfo,
            Some(b'T') => CommandFamily::Tracking,
            Some(b'U') => CommandFamily::User,
            Some(b'X') => CommandFamily::Extended,
            _ => CommandFamily::Unknown,
        }
    }

    /// Families whose commands carry parameters after a two-character name
    fn takes_parameters(body: &str) -> bool {
        matches!(
            body.as_bytes().first(),
            Some(b'S' | b'R' | b'T' | b'F' | b'B' | b'g' | b'L')
        )
    }
}

/// A completed frame, split into name and parameters
///
/// Borrows the assembler's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParsedCommand<'a> {
    pub family: CommandFamily,
    pub name: &'a str,
    pub parameters: &'a str,
    /// Precision mode in effect when the frame was assembled
    pub precision: Precision,
}

impl<'a> ParsedCommand<'a> {
    /// Split a frame body (without markers) into a command
    pub fn from_body(body: &'a str, precision: Precision) -> Self {
        let family = CommandFamily::identify(body);

        let (name, parameters) = if CommandFamily::takes_parameters(body) && body.len() > 2 {
            body.split_at(2)
        } else {
            (body, "")
        };

        Self {
            family,
            name,
            parameters,
            precision,
        }
    }

    /// Check whether this is a setter (replies `1`/`0`)
    pub fn is_setter(&self) -> bool {
        self.name.starts_with('S')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_by_first_character() {
        assert_eq!(CommandFamily::identify("I"), CommandFamily::Initialize);
        assert_eq!(CommandFamily::identify("GR"), CommandFamily::GetInfo);
        assert_eq!(CommandFamily::identify("Sr12:00:00"), CommandFamily::SetInfo);
        assert_eq!(CommandFamily::identify("MS"), CommandFamily::Movement);
        assert_eq!(CommandFamily::identify("Q"), CommandFamily::Quit);
        assert_eq!(CommandFamily::identify("hP"), CommandFamily::Home);
        assert_eq!(CommandFamily::identify("HP"), CommandFamily::Home);
        assert_eq!(CommandFamily::identify("gT"), CommandFamily::GetInfo);
        assert_eq!(CommandFamily::identify("g+"), CommandFamily::Gps);
        assert_eq!(CommandFamily::identify("XGR"), CommandFamily::Extended);
        assert_eq!(CommandFamily::identify("z"), CommandFamily::Unknown);
        assert_eq!(CommandFamily::identify(""), CommandFamily::Unknown);
    }

    #[test]
    fn test_date_time_family() {
        for body in ["GC", "GL", "Ga", "Gc", "SC03/14/24", "SL21:30:00", "SG-05", "SH1"] {
            assert_eq!(CommandFamily::identify(body), CommandFamily::DateTime, "{}", body);
        }
        assert_eq!(CommandFamily::identify("CM"), CommandFamily::DateTime);
        assert_eq!(CommandFamily::identify("Gt"), CommandFamily::GetInfo);
        assert_eq!(CommandFamily::identify("St+52*30"), CommandFamily::SetInfo);
    }

    #[test]
    fn test_parameter_split() {
        let cmd = ParsedCommand::from_body("Sd+45*30:15", Precision::High);
        assert_eq!(cmd.name, "Sd");
        assert_eq!(cmd.parameters, "+45*30:15");

        let cmd = ParsedCommand::from_body("Sd", Precision::High);
        assert_eq!(cmd.name, "Sd");
        assert_eq!(cmd.parameters, "");

        // G family never carries parameters
        let cmd = ParsedCommand::from_body("GR", Precision::High);
        assert_eq!(cmd.name, "GR");
        assert_eq!(cmd.parameters, "");

        let cmd = ParsedCommand::from_body("RS", Precision::Low);
        assert_eq!(cmd.name, "RS");
        assert_eq!(cmd.parameters, "");
        assert_eq!(cmd.precision, Precision::Low);
    }

    #[test]
    fn test_is_setter() {
        assert!(ParsedCommand::from_body("Sr12:00:00", Precision::High).is_setter());
        assert!(ParsedCommand::from_body("SC01/01/24", Precision::High).is_setter());
        assert!(!ParsedCommand::from_body("GR", Precision::High).is_setter());
    }
}
