use chrono::NaiveDate;

use super::RosterError;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Descriptive start/end window of a roster. Nothing is enforced from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Schedule {
    pub start_day: Option<NaiveDate>,
    pub start_hour: Option<u8>,
    pub end_day: Option<NaiveDate>,
    pub end_hour: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleField {
    StartDay,
    StartHour,
    EndDay,
    EndHour,
}

/// Which half of the window a schedule edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleEdge {
    Start,
    End,
}

impl ScheduleEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleEdge::Start => "start",
            ScheduleEdge::End => "end",
        }
    }

    pub fn day_field(self) -> ScheduleField {
        match self {
            ScheduleEdge::Start => ScheduleField::StartDay,
            ScheduleEdge::End => ScheduleField::EndDay,
        }
    }

    pub fn hour_field(self) -> ScheduleField {
        match self {
            ScheduleEdge::Start => ScheduleField::StartHour,
            ScheduleEdge::End => ScheduleField::EndHour,
        }
    }
}

impl std::str::FromStr for ScheduleEdge {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(ScheduleEdge::Start),
            "end" => Ok(ScheduleEdge::End),
            other => Err(RosterError::InvalidValue(format!(
                "unknown schedule edge `{other}`"
            ))),
        }
    }
}

impl Schedule {
    /// Validates every entry first and only then writes them, so a single bad value leaves the
    /// schedule untouched.
    pub fn apply<S: AsRef<str>>(&mut self, entries: &[(ScheduleField, S)]) -> Result<(), RosterError> {
        let mut next = *self;
        for (field, raw) in entries {
            next.set(*field, raw.as_ref())?;
        }
        *self = next;
        Ok(())
    }

    fn set(&mut self, field: ScheduleField, raw: &str) -> Result<(), RosterError> {
        match field {
            ScheduleField::StartDay => self.start_day = Some(parse_day(raw)?),
            ScheduleField::StartHour => self.start_hour = Some(parse_hour(raw)?),
            ScheduleField::EndDay => self.end_day = Some(parse_day(raw)?),
            ScheduleField::EndHour => self.end_hour = Some(parse_hour(raw)?),
        }
        Ok(())
    }

    /// Start of the window, only when both day and hour are known.
    pub fn start(&self) -> Option<(NaiveDate, u8)> {
        self.start_day.zip(self.start_hour)
    }

    pub fn end(&self) -> Option<(NaiveDate, u8)> {
        self.end_day.zip(self.end_hour)
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, RosterError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DAY_FORMAT).map_err(|_| {
        RosterError::InvalidValue(format!("`{raw}` is not a valid date (expected YYYY-MM-DD)"))
    })
}

fn parse_hour(raw: &str) -> Result<u8, RosterError> {
    let raw = raw.trim();
    match raw.parse::<u8>() {
        Ok(hour) if hour <= 23 => Ok(hour),
        _ => Err(RosterError::InvalidValue(format!(
            "`{raw}` is not a valid hour (expected 0-23)"
        ))),
    }
}
