//! Wire models for the OJ Electronics cloud API (`/api` on the OWD5 app host).
//!
//! Notes
//! - Field names follow the vendor's PascalCase JSON.
//! - Temperatures are integer hundredths of a degree Celsius; conversion lives in `crate::temperature`.
//! - Timestamps are local date-times without offset; see `crate::timestamp::vendor_timestamp`.
//! - Regulation modes stay raw integers on inbound records so unexpected values from the server still decode.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Serialize};

use crate::temperature::Temperature;
use crate::timestamp::{format_rfc3339, vendor_timestamp};

// =====================
// Scalar ID newtype wrappers
// =====================

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThermostatId(pub i64);

impl core::fmt::Display for GroupId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =====================
// Regulation mode
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RegulationMode {
    // 1=SCHEDULE, 2=COMFORT, 3=MANUAL, 8=BOOST, 9=ECO
    Schedule,
    Comfort,
    Manual,
    Boost,
    Eco,
}

impl RegulationMode {
    pub fn code(self) -> i64 {
        match self {
            RegulationMode::Schedule => 1,
            RegulationMode::Comfort => 2,
            RegulationMode::Manual => 3,
            RegulationMode::Boost => 8,
            RegulationMode::Eco => 9,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(RegulationMode::Schedule),
            2 => Some(RegulationMode::Comfort),
            3 => Some(RegulationMode::Manual),
            8 => Some(RegulationMode::Boost),
            9 => Some(RegulationMode::Eco),
            _ => None,
        }
    }
}

impl serde::Serialize for RegulationMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.code())
    }
}

// =====================
// Sign in
// =====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignInRequest<'a> {
    #[serde(rename = "APIKEY")]
    pub api_key: &'a str,
    #[serde(rename = "ClientSWVersion")]
    pub client_sw_version: u32,
    pub customer_id: CustomerId,
    pub user_name: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct SignInResponse {
    pub session_id: String,
    pub error_code: i64,
}

/// Envelope shared by every response; checked before the full body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorStatus {
    pub error_code: i64,
}

// =====================
// Group contents
// =====================

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct GroupContentsResponse {
    #[serde(default)]
    pub group_contents: Option<Vec<GroupContent>>,
    pub error_code: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct GroupContent {
    pub action: i64,
    pub group_id: GroupId,
    pub group_name: String,
    pub thermostats: Vec<ThermostatRecord>,
    pub regulation_mode: i64,
    pub schedule: Option<Schedule>,
    pub comfort_setpoint: i64,
    #[serde(with = "vendor_timestamp")]
    pub comfort_end_time: Option<NaiveDateTime>,
    pub manual_mode_setpoint: i64,
    pub vacation_enabled: bool,
    #[serde(with = "vendor_timestamp")]
    pub vacation_begin_day: Option<NaiveDateTime>,
    #[serde(with = "vendor_timestamp")]
    pub vacation_end_day: Option<NaiveDateTime>,
    pub vacation_temperature: i64,
    pub last_primary_mode_is_auto: bool,
    #[serde(with = "vendor_timestamp")]
    pub boost_end_time: Option<NaiveDateTime>,
    pub frost_protection_temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ThermostatRecord {
    pub id: ThermostatId,
    pub action: i64,
    pub serial_number: String,
    pub group_name: String,
    pub group_id: GroupId,
    pub customer_id: CustomerId,
    #[serde(rename = "SWversion")]
    pub sw_version: String,
    pub online: bool,
    pub heating: bool,
    pub room_temperature: i64,
    pub floor_temperature: i64,
    pub regulation_mode: i64,
    pub schedule: Option<Schedule>,
    pub comfort_setpoint: i64,
    #[serde(with = "vendor_timestamp")]
    pub comfort_end_time: Option<NaiveDateTime>,
    pub manual_mode_setpoint: i64,
    pub vacation_enabled: bool,
    #[serde(with = "vendor_timestamp")]
    pub vacation_begin_day: Option<NaiveDateTime>,
    #[serde(with = "vendor_timestamp")]
    pub vacation_end_day: Option<NaiveDateTime>,
    pub vacation_temperature: i64,
    pub last_primary_mode_is_auto: bool,
    #[serde(with = "vendor_timestamp")]
    pub boost_end_time: Option<NaiveDateTime>,
    pub frost_protection_temperature: i64,
    pub error_code: i64,
    pub thermostat_name: String,
    pub open_window: bool,
    pub adaptive_mode: bool,
    pub daylight_saving: bool,
    pub sensor_appl: i64,
    pub min_setpoint: i64,
    pub max_setpoint: i64,
    pub time_zone: i64,
    pub daylight_saving_active: bool,
    pub floor_type: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct Schedule {
    pub days: Vec<ScheduleDay>,
    pub modified_due_to_verification: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScheduleDay {
    pub week_day_grp_no: i64,
    pub events: Vec<ScheduleEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScheduleEvent {
    pub schedule_type: i64,
    pub clock: String, // HH:MM:SS
    pub temperature: i64,
    pub active: bool,
    pub event_is_on_next_day: bool,
}

// =====================
// Group update
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct UpdateGroupRequest<'a> {
    #[serde(rename = "APIKEY")]
    pub api_key: &'a str,
    #[serde(rename = "SetGroup")]
    pub set_group: SetGroup,
}

/// One variant per mode-change operation; each carries only the fields its mode needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeChange {
    Eco,
    ResumeSchedule,
    Manual {
        setpoint: Temperature,
    },
    Comfort {
        setpoint: Temperature,
        end_time: DateTime<FixedOffset>,
    },
    Boost {
        end_time: DateTime<FixedOffset>,
    },
}

impl ModeChange {
    pub fn regulation_mode(&self) -> RegulationMode {
        match self {
            ModeChange::Eco => RegulationMode::Eco,
            ModeChange::ResumeSchedule => RegulationMode::Schedule,
            ModeChange::Manual { .. } => RegulationMode::Manual,
            ModeChange::Comfort { .. } => RegulationMode::Comfort,
            ModeChange::Boost { .. } => RegulationMode::Boost,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetGroup {
    pub group_id: GroupId,
    pub change: ModeChange,
}

impl serde::Serialize for SetGroup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let extra = match &self.change {
            ModeChange::Eco | ModeChange::ResumeSchedule => 0,
            ModeChange::Manual { .. } | ModeChange::Boost { .. } => 1,
            ModeChange::Comfort { .. } => 2,
        };
        let wire = |setpoint: &Temperature| {
            setpoint
                .to_wire()
                .ok_or_else(|| S::Error::custom(format!("setpoint {} °C has no wire encoding", setpoint.celsius())))
        };
        let mut s = serializer.serialize_struct("SetGroup", 2 + extra)?;
        s.serialize_field("GroupId", &self.group_id)?;
        s.serialize_field("RegulationMode", &self.change.regulation_mode())?;
        match &self.change {
            ModeChange::Eco | ModeChange::ResumeSchedule => {}
            ModeChange::Manual { setpoint } => {
                s.serialize_field("ManualModeSetpoint", &wire(setpoint)?)?;
            }
            ModeChange::Comfort { setpoint, end_time } => {
                s.serialize_field("ComfortSetpoint", &wire(setpoint)?)?;
                s.serialize_field("ComfortEndTime", &format_rfc3339(end_time))?;
            }
            ModeChange::Boost { end_time } => {
                s.serialize_field("BoostEndTime", &format_rfc3339(end_time))?;
            }
        }
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn regulation_mode_codes_are_the_wire_contract() {
        let modes = [
            (RegulationMode::Schedule, 1),
            (RegulationMode::Comfort, 2),
            (RegulationMode::Manual, 3),
            (RegulationMode::Boost, 8),
            (RegulationMode::Eco, 9),
        ];
        for (mode, code) in modes {
            assert_eq!(serde_json::to_value(mode).unwrap(), json!(code));
            assert_eq!(RegulationMode::from_code(code), Some(mode));
        }
        assert_eq!(RegulationMode::from_code(7), None);
    }

    #[test]
    fn sign_in_request_uses_vendor_field_names() {
        let req = SignInRequest {
            api_key: "key",
            client_sw_version: 1,
            customer_id: CustomerId(42),
            user_name: "user",
            password: "secret",
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "APIKEY": "key",
                "ClientSWVersion": 1,
                "CustomerId": 42,
                "UserName": "user",
                "Password": "secret",
            })
        );
    }

    #[test]
    fn set_group_carries_only_mode_specific_fields() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let end_time = offset.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();

        let eco = SetGroup {
            group_id: GroupId(7),
            change: ModeChange::Eco,
        };
        assert_eq!(serde_json::to_value(&eco).unwrap(), json!({"GroupId": 7, "RegulationMode": 9}));

        let comfort = SetGroup {
            group_id: GroupId(7),
            change: ModeChange::Comfort {
                setpoint: Temperature::of_celsius(22.5),
                end_time,
            },
        };
        assert_eq!(
            serde_json::to_value(&comfort).unwrap(),
            json!({
                "GroupId": 7,
                "RegulationMode": 2,
                "ComfortSetpoint": 2250,
                "ComfortEndTime": "2024-03-01T18:30:00+01:00",
            })
        );

        let boost = SetGroup {
            group_id: GroupId(7),
            change: ModeChange::Boost { end_time },
        };
        assert_eq!(
            serde_json::to_value(&boost).unwrap(),
            json!({"GroupId": 7, "RegulationMode": 8, "BoostEndTime": "2024-03-01T18:30:00+01:00"})
        );
    }

    #[test]
    fn set_group_refuses_non_finite_setpoint() {
        let manual = SetGroup {
            group_id: GroupId(7),
            change: ModeChange::Manual {
                setpoint: Temperature::of_celsius(f64::NAN),
            },
        };
        let err = serde_json::to_value(&manual).unwrap_err();
        assert!(err.to_string().contains("no wire encoding"), "{err}");
    }

    #[test]
    fn sign_in_response_requires_session_id() {
        assert!(serde_json::from_value::<SignInResponse>(json!({"ErrorCode": 0})).is_err());
    }

    #[test]
    fn group_content_tolerates_missing_and_sentinel_fields() {
        let group: GroupContent = serde_json::from_value(json!({
            "GroupId": 84140,
            "GroupName": "Kitchen",
            "RegulationMode": 6,
            "ComfortEndTime": "1900-01-01T00:00:00",
            "BoostEndTime": null,
        }))
        .unwrap();
        assert_eq!(group.group_id, GroupId(84140));
        assert_eq!(group.regulation_mode, 6);
        assert!(group.thermostats.is_empty());
        assert!(group.comfort_end_time.is_some());
        assert_eq!(group.boost_end_time, None);
    }
}
