use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone};

use crate::client::OjError;
use crate::models::oj::{
    GroupContent, GroupId, ModeChange, RegulationMode, Schedule, SetGroup, ThermostatId, ThermostatRecord,
};
use crate::session::Session;
use crate::temperature::Temperature;
use crate::timestamp::unless_unset;

/// Read-only view of one thermostat, temperatures already converted from the wire encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermostatSnapshot {
    pub id: ThermostatId,
    pub name: String,
    pub serial_number: String,
    pub room_temperature: Temperature,
    pub floor_temperature: Temperature,
    pub heating: bool,
    pub online: bool,
    pub open_window: bool,
    /// `None` when the thermostat reports a mode outside [`RegulationMode`].
    pub regulation_mode: Option<RegulationMode>,
    pub comfort_setpoint: Temperature,
    pub manual_mode_setpoint: Temperature,
    pub min_setpoint: Temperature,
    pub max_setpoint: Temperature,
}

impl From<&ThermostatRecord> for ThermostatSnapshot {
    fn from(t: &ThermostatRecord) -> Self {
        ThermostatSnapshot {
            id: t.id,
            name: t.thermostat_name.clone(),
            serial_number: t.serial_number.clone(),
            room_temperature: Temperature::from_wire(t.room_temperature),
            floor_temperature: Temperature::from_wire(t.floor_temperature),
            heating: t.heating,
            online: t.online,
            open_window: t.open_window,
            regulation_mode: RegulationMode::from_code(t.regulation_mode),
            comfort_setpoint: Temperature::from_wire(t.comfort_setpoint),
            manual_mode_setpoint: Temperature::from_wire(t.manual_mode_setpoint),
            min_setpoint: Temperature::from_wire(t.min_setpoint),
            max_setpoint: Temperature::from_wire(t.max_setpoint),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VacationWindow {
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
    pub temperature: Temperature,
}

/// A thermostat group as last fetched, plus the commands that change its regulation mode.
///
/// Commands do not touch the held snapshot; call [`Group::refresh`] (or list groups again)
/// to see what the server made of them.
#[derive(Debug, Clone)]
pub struct Group {
    session: Session,
    contents: GroupContent,
}

impl Group {
    pub(crate) fn new(session: Session, contents: GroupContent) -> Self {
        Group { session, contents }
    }

    pub fn id(&self) -> GroupId {
        self.contents.group_id
    }

    pub fn name(&self) -> &str {
        &self.contents.group_name
    }

    pub fn thermostats(&self) -> Vec<ThermostatSnapshot> {
        self.contents.thermostats.iter().map(ThermostatSnapshot::from).collect()
    }

    pub fn regulation_mode(&self) -> Option<RegulationMode> {
        RegulationMode::from_code(self.contents.regulation_mode)
    }

    pub fn comfort_setpoint(&self) -> Temperature {
        Temperature::from_wire(self.contents.comfort_setpoint)
    }

    pub fn manual_mode_setpoint(&self) -> Temperature {
        Temperature::from_wire(self.contents.manual_mode_setpoint)
    }

    pub fn comfort_end_time(&self) -> Option<NaiveDateTime> {
        unless_unset(self.contents.comfort_end_time)
    }

    pub fn boost_end_time(&self) -> Option<NaiveDateTime> {
        unless_unset(self.contents.boost_end_time)
    }

    pub fn vacation(&self) -> Option<VacationWindow> {
        if !self.contents.vacation_enabled {
            return None;
        }
        Some(VacationWindow {
            begin: unless_unset(self.contents.vacation_begin_day)?,
            end: unless_unset(self.contents.vacation_end_day)?,
            temperature: Temperature::from_wire(self.contents.vacation_temperature),
        })
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        self.contents.schedule.as_ref()
    }

    /// The raw record as returned by the server.
    pub fn snapshot(&self) -> &GroupContent {
        &self.contents
    }

    pub fn eco_mode(&self) -> Result<(), OjError> {
        self.update(ModeChange::Eco)
    }

    pub fn resume_schedule(&self) -> Result<(), OjError> {
        self.update(ModeChange::ResumeSchedule)
    }

    pub fn manual_mode(&self, target: Temperature) -> Result<(), OjError> {
        self.update(ModeChange::Manual {
            setpoint: checked(target)?,
        })
    }

    /// Hold `target` until `end_time`, then return to the previous mode.
    pub fn comfort_mode<Tz: TimeZone>(&self, target: Temperature, end_time: DateTime<Tz>) -> Result<(), OjError> {
        self.update(ModeChange::Comfort {
            setpoint: checked(target)?,
            end_time: end_time.fixed_offset(),
        })
    }

    /// Boost for one hour from now.
    pub fn boost_mode(&self) -> Result<(), OjError> {
        let end_time = Local::now() + TimeDelta::hours(1);
        self.update(ModeChange::Boost {
            end_time: end_time.fixed_offset(),
        })
    }

    /// Re-fetch group contents and replace the snapshot. On failure the old snapshot is kept.
    pub fn refresh(&mut self) -> Result<(), OjError> {
        let id = self.id();
        let fresh = self
            .session
            .group_contents()?
            .into_iter()
            .find(|g| g.group_id == id)
            .ok_or(OjError::GroupNotFound(id))?;
        self.contents = fresh;
        Ok(())
    }

    fn update(&self, change: ModeChange) -> Result<(), OjError> {
        self.session.update_group(SetGroup {
            group_id: self.id(),
            change,
        })
    }
}

fn checked(setpoint: Temperature) -> Result<Temperature, OjError> {
    match setpoint.to_wire() {
        Some(_) => Ok(setpoint),
        None => Err(OjError::InvalidSetpoint(setpoint)),
    }
}
