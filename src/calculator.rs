//! The three-step cost form: date, number of guests, object.
//!
//! Steps only advance when their input is present; the final step turns the
//! form into a [`CalculationRequest`] whose prompt is sent as a normal chat
//! message.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CalculatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BookingObject {
    SmallCabin,
    LargeCabin,
    Sauna,
    BanquetHall,
    Gazebo,
}

impl BookingObject {
    pub const ALL: [BookingObject; 5] = [
        BookingObject::SmallCabin,
        BookingObject::LargeCabin,
        BookingObject::Sauna,
        BookingObject::BanquetHall,
        BookingObject::Gazebo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BookingObject::SmallCabin => "Домик до 10 чел",
            BookingObject::LargeCabin => "Домик до 20 чел",
            BookingObject::Sauna => "Баня",
            BookingObject::BanquetHall => "Банкетный зал",
            BookingObject::Gazebo => "Беседка",
        }
    }
}

impl fmt::Display for BookingObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BookingObject {
    type Err = CalculatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingObject::ALL
            .into_iter()
            .find(|o| o.label() == s.trim())
            .ok_or_else(|| CalculatorError::UnknownObject(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationRequest {
    pub date: NaiveDate,
    pub guest_count: u32,
    pub object: BookingObject,
}

impl CalculationRequest {
    /// The chat message that asks for the quote.
    pub fn to_prompt(&self) -> String {
        format!(
            "Рассчитай стоимость: Объект: {}, Дата: {}, Количество человек: {}.",
            self.object,
            self.date.format("%Y-%m-%d"),
            self.guest_count
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcStep {
    Date,
    Guests,
    Object,
}

impl CalcStep {
    /// 1-based position, used for the progress bar.
    pub fn number(&self) -> u8 {
        match self {
            CalcStep::Date => 1,
            CalcStep::Guests => 2,
            CalcStep::Object => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalculatorForm {
    open: bool,
    step: CalcStep,
    date: Option<NaiveDate>,
    guests: u32,
    object: Option<BookingObject>,
}

impl Default for CalculatorForm {
    fn default() -> Self {
        Self {
            open: false,
            step: CalcStep::Date,
            date: None,
            guests: 1,
            object: None,
        }
    }
}

impl CalculatorForm {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> CalcStep {
        self.step
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn guests(&self) -> u32 {
        self.guests
    }

    pub fn object(&self) -> Option<BookingObject> {
        self.object
    }

    /// Shows the form at its first step. Values entered earlier are kept.
    pub fn open(&mut self) {
        self.open = true;
        self.step = CalcStep::Date;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
    }

    pub fn set_guests(&mut self, guests: u32) {
        self.guests = guests.max(1);
    }

    pub fn increment_guests(&mut self) {
        self.guests = self.guests.saturating_add(1);
    }

    pub fn decrement_guests(&mut self) {
        self.guests = self.guests.saturating_sub(1).max(1);
    }

    pub fn select_object(&mut self, object: BookingObject) {
        self.object = Some(object);
    }

    /// Whether the "next" / "submit" action of the current step is enabled.
    pub fn can_advance(&self) -> bool {
        match self.step {
            CalcStep::Date => self.date.is_some(),
            CalcStep::Guests => true,
            CalcStep::Object => self.object.is_some(),
        }
    }

    pub fn next(&mut self) -> Result<CalcStep, CalculatorError> {
        self.ensure_open()?;
        self.step = match self.step {
            CalcStep::Date if self.date.is_none() => return Err(CalculatorError::MissingDate),
            CalcStep::Date => CalcStep::Guests,
            CalcStep::Guests => CalcStep::Object,
            CalcStep::Object => return Err(CalculatorError::WrongStep),
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<CalcStep, CalculatorError> {
        self.ensure_open()?;
        self.step = match self.step {
            CalcStep::Date => CalcStep::Date,
            CalcStep::Guests => CalcStep::Date,
            CalcStep::Object => CalcStep::Guests,
        };
        Ok(self.step)
    }

    /// Builds the request from the last step. The form stays open; closing
    /// it is up to the caller.
    pub fn submit(&self) -> Result<CalculationRequest, CalculatorError> {
        self.ensure_open()?;
        if self.step != CalcStep::Object {
            return Err(CalculatorError::WrongStep);
        }
        let object = self.object.ok_or(CalculatorError::MissingObject)?;
        let date = self.date.ok_or(CalculatorError::MissingDate)?;
        Ok(CalculationRequest {
            date,
            guest_count: self.guests,
            object,
        })
    }

    fn ensure_open(&self) -> Result<(), CalculatorError> {
        if self.open {
            Ok(())
        } else {
            Err(CalculatorError::Closed)
        }
    }
}
