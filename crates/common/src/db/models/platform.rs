//! External learning platforms with an availability window

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub start_time: String,

    #[serde(default)]
    pub end_time: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub status: String,

    /// Owning teacher; lowercase on the wire
    #[serde(default)]
    pub teacherid: String,
}

/// Body of create and update requests; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::optional_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacherid: Option<String>,
}

impl Platform {
    pub fn from_input(id: String, input: PlatformInput) -> Self {
        Self {
            id,
            name: input.name.unwrap_or_default(),
            link: input.link.unwrap_or_default(),
            start_date: input.start_date,
            end_date: input.end_date,
            start_time: input.start_time.unwrap_or_default(),
            end_time: input.end_time.unwrap_or_default(),
            image: input.image.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            teacherid: input.teacherid.unwrap_or_default(),
        }
    }

    /// Overwrite the fields present in `input`
    pub fn apply(&mut self, input: &PlatformInput) {
        if let Some(ref v) = input.name { self.name = v.clone(); }
        if let Some(ref v) = input.link { self.link = v.clone(); }
        if let Some(v) = input.start_date { self.start_date = Some(v); }
        if let Some(v) = input.end_date { self.end_date = Some(v); }
        if let Some(ref v) = input.start_time { self.start_time = v.clone(); }
        if let Some(ref v) = input.end_time { self.end_time = v.clone(); }
        if let Some(ref v) = input.image { self.image = v.clone(); }
        if let Some(ref v) = input.status { self.status = v.clone(); }
        if let Some(ref v) = input.teacherid { self.teacherid = v.clone(); }
    }
}
