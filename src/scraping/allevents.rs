use anyhow::Result;
use chrono::NaiveDate;

use super::ConcertSource;
use crate::models::Concert;

pub struct AllEvents;

impl ConcertSource for AllEvents {
    fn source_id(&self) -> &'static str {
        "allevents"
    }

    fn source_name(&self) -> &'static str {
        "allevents.in"
    }

    fn source_url(&self) -> &str {
        "https://allevents.in/hamburg/concerts"
    }

    fn fetch(&self, _within_days: u32, _today: NaiveDate) -> Result<Vec<Concert>> {
        Ok(Vec::new())
    }
}
