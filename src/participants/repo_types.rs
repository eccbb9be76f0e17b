use serde::Serialize;
use sqlx::FromRow;
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Full `participants` row.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Participant {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(with = "iso_date")]
    pub dob: Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ParticipantSummary {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ParticipantDetails {
    pub firstname: String,
    pub lastname: String,
    #[serde(with = "iso_date")]
    pub dob: Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct WorkRecord {
    pub companyname: String,
    pub salary: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct HomeRecord {
    pub country: String,
    pub city: String,
}

/// Validated input for a create; all three rows are written together.
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub participant: Participant,
    pub work: WorkRecord,
    pub home: HomeRecord,
}

/// Validated input for an update of an existing participant.
#[derive(Debug, Clone)]
pub struct ParticipantUpdate {
    pub firstname: String,
    pub lastname: String,
    pub dob: Date,
    pub work: WorkRecord,
    pub home: HomeRecord,
}
