use serde::{Deserialize, Serialize};

use super::repo_types::{HomeRecord, NewParticipant, Participant, ParticipantUpdate, WorkRecord};
use super::validation::{is_valid_email, normalize_email, parse_dob, present};
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct WorkPayload {
    pub companyname: Option<String>,
    pub salary: Option<f64>,
    pub currency: Option<String>,
}

impl WorkPayload {
    fn into_record(self) -> Option<WorkRecord> {
        Some(WorkRecord {
            companyname: present(self.companyname)?,
            salary: self.salary?,
            currency: present(self.currency)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HomePayload {
    pub country: Option<String>,
    pub city: Option<String>,
}

impl HomePayload {
    fn into_record(self) -> Option<HomeRecord> {
        Some(HomeRecord {
            country: present(self.country)?,
            city: present(self.city)?,
        })
    }
}

/// Body of `POST /participants/add`.
#[derive(Debug, Default, Deserialize)]
pub struct AddParticipantRequest {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub dob: Option<String>,
    pub work: Option<WorkPayload>,
    pub home: Option<HomePayload>,
}

impl AddParticipantRequest {
    pub fn validate(self) -> Result<NewParticipant, ApiError> {
        let missing = || ApiError::BadRequest("Missing required participant data".into());

        let email = normalize_email(&present(self.email).ok_or_else(missing)?);
        let firstname = present(self.firstname).ok_or_else(missing)?;
        let lastname = present(self.lastname).ok_or_else(missing)?;
        let dob = present(self.dob).ok_or_else(missing)?;
        let work = self.work.and_then(WorkPayload::into_record).ok_or_else(missing)?;
        let home = self.home.and_then(HomePayload::into_record).ok_or_else(missing)?;

        if !is_valid_email(&email) {
            return Err(ApiError::BadRequest("Invalid email format".into()));
        }
        let dob = parse_dob(&dob)?;

        Ok(NewParticipant {
            participant: Participant {
                email,
                firstname,
                lastname,
                dob,
            },
            work,
            home,
        })
    }
}

/// Body of `PUT /participants/:email`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateParticipantRequest {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub dob: Option<String>,
    pub work: Option<WorkPayload>,
    pub home: Option<HomePayload>,
}

impl UpdateParticipantRequest {
    pub fn validate(self) -> Result<ParticipantUpdate, ApiError> {
        let missing = || ApiError::BadRequest("Missing required data for update".into());

        let firstname = present(self.firstname).ok_or_else(missing)?;
        let lastname = present(self.lastname).ok_or_else(missing)?;
        let dob = present(self.dob).ok_or_else(missing)?;
        let work = self.work.and_then(WorkPayload::into_record).ok_or_else(missing)?;
        let home = self.home.and_then(HomePayload::into_record).ok_or_else(missing)?;

        Ok(ParticipantUpdate {
            firstname,
            lastname,
            dob: parse_dob(&dob)?,
            work,
            home,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
