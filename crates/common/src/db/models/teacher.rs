//! Teacher accounts

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Stored teacher document, including the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub email: String,

    pub teacher_id: String,

    #[serde(default)]
    pub dob: Option<NaiveDate>,

    #[serde(default)]
    pub gender: String,

    #[serde(default)]
    pub experience: String,

    #[serde(default)]
    pub specialization: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub address: String,

    /// argon2 PHC string
    pub password: String,

    pub created_at: DateTime<Utc>,
}

/// Teacher as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub teacher_id: String,
    pub dob: Option<NaiveDate>,
    pub gender: String,
    pub experience: String,
    pub specialization: String,
    pub phone: String,
    pub address: String,
}

impl From<Teacher> for TeacherProfile {
    fn from(t: Teacher) -> Self {
        Self {
            id: t.id,
            name: t.name,
            email: t.email,
            teacher_id: t.teacher_id,
            dob: t.dob,
            gender: t.gender,
            experience: t.experience,
            specialization: t.specialization,
            phone: t.phone,
            address: t.address,
        }
    }
}

/// Profile fields a teacher may change.
///
/// `teacherId` and `password` are deliberately absent; unknown fields in the
/// request body are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_date", skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl TeacherUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.dob.is_none()
            && self.gender.is_none()
            && self.experience.is_none()
            && self.specialization.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }

    /// Apply the present fields to a stored teacher
    pub fn apply(&self, teacher: &mut Teacher) {
        if let Some(ref v) = self.name { teacher.name = v.clone(); }
        if let Some(ref v) = self.email { teacher.email = v.clone(); }
        if let Some(v) = self.dob { teacher.dob = Some(v); }
        if let Some(ref v) = self.gender { teacher.gender = v.clone(); }
        if let Some(ref v) = self.experience { teacher.experience = v.clone(); }
        if let Some(ref v) = self.specialization { teacher.specialization = v.clone(); }
        if let Some(ref v) = self.phone { teacher.phone = v.clone(); }
        if let Some(ref v) = self.address { teacher.address = v.clone(); }
    }
}
