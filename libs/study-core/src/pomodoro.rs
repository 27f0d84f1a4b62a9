//! Pomodoro timer settings and session cycling.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Kind of timed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Default for SessionType {
    fn default() -> Self {
        Self::Focus
    }
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::ShortBreak => "short_break",
            Self::LongBreak => "long_break",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "focus" => Ok(Self::Focus),
            "short_break" => Ok(Self::ShortBreak),
            "long_break" => Ok(Self::LongBreak),
            other => Err(ValidationError::UnknownSessionType(other.to_string())),
        }
    }

    pub fn is_focus(&self) -> bool {
        matches!(self, Self::Focus)
    }
}

/// Per-user timer configuration. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroSettings {
    pub focus_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub sessions_until_long_break: u32,
    pub auto_start_breaks: bool,
    pub auto_start_focus: bool,
    pub sound_enabled: bool,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            focus_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_until_long_break: 4,
            auto_start_breaks: false,
            auto_start_focus: false,
            sound_enabled: true,
        }
    }
}

impl PomodoroSettings {
    /// Reject zero-length sessions and a zero long-break cadence.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("focus_duration", self.focus_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
            ("sessions_until_long_break", self.sessions_until_long_break),
        ];
        for (field, value) in fields {
            if value < 1 {
                return Err(ValidationError::BelowMinimum {
                    field,
                    min: 1,
                    value: i64::from(value),
                });
            }
        }
        Ok(())
    }

    /// Length in minutes of a session of the given type.
    pub fn duration_of(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Focus => self.focus_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    /// Session that follows `finished`, given how many focus sessions have
    /// been completed including `finished` itself.
    pub fn next_session(&self, finished: SessionType, completed_focus: u32) -> SessionType {
        match finished {
            SessionType::Focus => {
                let cadence = self.sessions_until_long_break.max(1);
                if completed_focus % cadence == 0 {
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            SessionType::ShortBreak | SessionType::LongBreak => SessionType::Focus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let settings = PomodoroSettings::default();
        assert_eq!(settings.focus_duration, 25);
        assert_eq!(settings.short_break_duration, 5);
        assert_eq!(settings.long_break_duration, 15);
        assert_eq!(settings.sessions_until_long_break, 4);
        assert!(settings.sound_enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn long_break_every_fourth_focus() {
        let settings = PomodoroSettings::default();
        let breaks: Vec<_> = (1..=8)
            .map(|n| settings.next_session(SessionType::Focus, n))
            .collect();
        assert_eq!(
            breaks,
            vec![
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::LongBreak,
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::ShortBreak,
                SessionType::LongBreak,
            ]
        );
    }

    #[test]
    fn breaks_return_to_focus() {
        let settings = PomodoroSettings::default();
        assert_eq!(
            settings.next_session(SessionType::ShortBreak, 1),
            SessionType::Focus
        );
        assert_eq!(
            settings.next_session(SessionType::LongBreak, 4),
            SessionType::Focus
        );
    }

    #[test]
    fn zero_duration_rejected() {
        let settings = PomodoroSettings {
            short_break_duration: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ValidationError::BelowMinimum {
                field: "short_break_duration",
                min: 1,
                value: 0,
            })
        );
    }

    #[test]
    fn session_type_round_trips_through_str() {
        for t in [
            SessionType::Focus,
            SessionType::ShortBreak,
            SessionType::LongBreak,
        ] {
            assert_eq!(SessionType::parse(t.as_str()).unwrap(), t);
        }
        assert!(SessionType::parse("nap").is_err());
    }

    #[test]
    fn duration_by_type() {
        let settings = PomodoroSettings::default();
        assert_eq!(settings.duration_of(SessionType::LongBreak), 15);
    }
}
