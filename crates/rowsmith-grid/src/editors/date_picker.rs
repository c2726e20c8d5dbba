//! Date and DateTime picker
//!
//! A calendar with three views: day grid, month list and a twelve-year page.
//! Clicking the header moves Day -> Month -> Year; picking a month returns to
//! the day grid and picking a year returns to the month list.
//!
//! A `Date` picker commits as soon as a day is picked. A `DateTime` picker
//! keeps the day and waits for [`DatePickerState::save`], which combines it
//! with the hour and minute columns into a local timestamp.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rowsmith_core::{CellValue, ColumnDefinition, parse_date, parse_datetime};

use super::EditOutcome;
use crate::EditorError;

/// The mode of the date picker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DatePickerMode {
    /// Date only (YYYY-MM-DD)
    #[default]
    Date,
    /// Date and time (YYYY-MM-DD HH:MM)
    DateTime,
}

/// Calendar view currently shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PickerView {
    #[default]
    Day,
    Month,
    Year,
}

/// Short month names
pub const MONTH_NAMES_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Short day names, Sunday first
pub const DAY_NAMES: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

const YEARS_PER_PAGE: i32 = 12;

/// State of an open date/datetime picker
#[derive(Debug, Clone)]
pub struct DatePickerState {
    mode: DatePickerMode,
    column: String,
    nullable: bool,
    original: CellValue,
    view: PickerView,
    view_year: i32,
    view_month: u32,
    selected: Option<NaiveDate>,
    hour: u32,
    minute: u32,
}

impl DatePickerState {
    pub fn new(mode: DatePickerMode, column: &ColumnDefinition, current: &CellValue) -> Self {
        Self::with_today(mode, column, current, Local::now().date_naive())
    }

    /// Open with an explicit "today", used for the initial view of an empty cell
    pub fn with_today(
        mode: DatePickerMode,
        column: &ColumnDefinition,
        current: &CellValue,
        today: NaiveDate,
    ) -> Self {
        let (selected, time) = initial_selection(current);
        let anchor = selected.unwrap_or(today);

        Self {
            mode,
            column: column.name.clone(),
            nullable: column.is_nullable,
            original: current.clone(),
            view: PickerView::Day,
            view_year: anchor.year(),
            view_month: anchor.month(),
            selected,
            hour: time.map(|t| t.hour()).unwrap_or(0),
            minute: time.map(|t| t.minute()).unwrap_or(0),
        }
    }

    pub fn mode(&self) -> DatePickerMode {
        self.mode
    }

    pub fn view(&self) -> PickerView {
        self.view
    }

    pub fn view_year(&self) -> i32 {
        self.view_year
    }

    pub fn view_month(&self) -> u32 {
        self.view_month
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn original(&self) -> &CellValue {
        &self.original
    }

    /// Header label for the current view, e.g. `Mar 2024`, `2024`, `2016 - 2027`
    pub fn header_label(&self) -> String {
        match self.view {
            PickerView::Day => format!(
                "{} {}",
                MONTH_NAMES_SHORT[(self.view_month - 1) as usize],
                self.view_year
            ),
            PickerView::Month => self.view_year.to_string(),
            PickerView::Year => {
                let page = self.year_page();
                format!("{} - {}", page[0], page[page.len() - 1])
            }
        }
    }

    /// Header click: Day -> Month -> Year. Stays on Year.
    pub fn click_header(&mut self) {
        self.view = match self.view {
            PickerView::Day => PickerView::Month,
            PickerView::Month | PickerView::Year => PickerView::Year,
        };
    }

    /// Pick a month (1-12) in the month view and return to the day grid
    pub fn select_month(&mut self, month: u32) -> Result<(), EditorError> {
        if !(1..=12).contains(&month) {
            return Err(EditorError::OutOfRange {
                field: "month",
                min: 1,
                max: 12,
            });
        }
        self.view_month = month;
        self.view = PickerView::Day;
        Ok(())
    }

    /// Pick a year in the year view and return to the month list
    pub fn select_year(&mut self, year: i32) {
        self.view_year = year;
        self.view = PickerView::Month;
    }

    pub fn prev_month(&mut self) {
        if self.view_month == 1 {
            self.view_month = 12;
            self.view_year -= 1;
        } else {
            self.view_month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.view_month == 12 {
            self.view_month = 1;
            self.view_year += 1;
        } else {
            self.view_month += 1;
        }
    }

    /// Previous page of the current view: month, year or twelve years
    pub fn prev_page(&mut self) {
        match self.view {
            PickerView::Day => self.prev_month(),
            PickerView::Month => self.view_year -= 1,
            PickerView::Year => self.view_year -= YEARS_PER_PAGE,
        }
    }

    pub fn next_page(&mut self) {
        match self.view {
            PickerView::Day => self.next_month(),
            PickerView::Month => self.view_year += 1,
            PickerView::Year => self.view_year += YEARS_PER_PAGE,
        }
    }

    /// The twelve years shown in the year view
    pub fn year_page(&self) -> Vec<i32> {
        let start = self.view_year - self.view_year.rem_euclid(YEARS_PER_PAGE);
        (start..start + YEARS_PER_PAGE).collect()
    }

    /// Visible month as Sunday-first weeks; `None` pads days outside the month
    pub fn weeks(&self) -> Vec<[Option<u32>; 7]> {
        let Some(first) = NaiveDate::from_ymd_opt(self.view_year, self.view_month, 1) else {
            return Vec::new();
        };
        let offset = first.weekday().num_days_from_sunday() as usize;
        let days = days_in_month(self.view_year, self.view_month);

        let mut weeks = Vec::new();
        let mut week = [None; 7];
        let mut slot = offset;
        for day in 1..=days {
            week[slot] = Some(day);
            slot += 1;
            if slot == 7 {
                weeks.push(week);
                week = [None; 7];
                slot = 0;
            }
        }
        if slot > 0 {
            weeks.push(week);
        }
        weeks
    }

    /// Pick a day of the viewed month.
    ///
    /// Commits immediately in `Date` mode; in `DateTime` mode the day is kept
    /// until [`save`](Self::save).
    pub fn select_day(&mut self, day: u32) -> Result<EditOutcome, EditorError> {
        let date = NaiveDate::from_ymd_opt(self.view_year, self.view_month, day).ok_or(
            EditorError::OutOfRange {
                field: "day",
                min: 1,
                max: days_in_month(self.view_year, self.view_month),
            },
        )?;
        self.selected = Some(date);

        match self.mode {
            DatePickerMode::Date => Ok(EditOutcome::Commit(CellValue::Date(date))),
            DatePickerMode::DateTime => Ok(EditOutcome::Pending),
        }
    }

    pub fn set_hour(&mut self, hour: u32) -> Result<(), EditorError> {
        if hour > 23 {
            return Err(EditorError::OutOfRange {
                field: "hour",
                min: 0,
                max: 23,
            });
        }
        self.hour = hour;
        Ok(())
    }

    pub fn set_minute(&mut self, minute: u32) -> Result<(), EditorError> {
        if minute > 59 {
            return Err(EditorError::OutOfRange {
                field: "minute",
                min: 0,
                max: 59,
            });
        }
        self.minute = minute;
        Ok(())
    }

    /// Scroll the hour column, wrapping around
    pub fn scroll_hour(&mut self, delta: i32) {
        self.hour = (self.hour as i32 + delta).rem_euclid(24) as u32;
    }

    /// Scroll the minute column, wrapping around
    pub fn scroll_minute(&mut self, delta: i32) {
        self.minute = (self.minute as i32 + delta).rem_euclid(60) as u32;
    }

    /// Combine the picked day with the hour and minute and commit
    pub fn save(&mut self) -> Result<EditOutcome, EditorError> {
        let date = self.selected.ok_or(EditorError::NoDateSelected)?;
        let value = match self.mode {
            DatePickerMode::Date => CellValue::Date(date),
            DatePickerMode::DateTime => {
                let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).ok_or(
                    EditorError::OutOfRange {
                        field: "hour",
                        min: 0,
                        max: 23,
                    },
                )?;
                CellValue::DateTime(date.and_time(time))
            }
        };
        Ok(EditOutcome::Commit(value))
    }

    /// Jump to the current local date and time
    pub fn set_now(&mut self) -> EditOutcome {
        self.set_now_at(Local::now().naive_local())
    }

    /// Jump to `now`. Commits in `Date` mode, waits for save in `DateTime` mode.
    pub fn set_now_at(&mut self, now: NaiveDateTime) -> EditOutcome {
        let date = now.date();
        self.selected = Some(date);
        self.view = PickerView::Day;
        self.view_year = date.year();
        self.view_month = date.month();
        self.hour = now.hour();
        self.minute = now.minute();

        match self.mode {
            DatePickerMode::Date => EditOutcome::Commit(CellValue::Date(date)),
            DatePickerMode::DateTime => EditOutcome::Pending,
        }
    }

    /// Commit NULL
    pub fn clear(&mut self) -> Result<EditOutcome, EditorError> {
        if !self.nullable {
            return Err(EditorError::NullNotAllowed(self.column.clone()));
        }
        Ok(EditOutcome::Commit(CellValue::Null))
    }

    /// Drop all picker state and restore the pre-edit value
    pub fn cancel(&mut self) -> EditOutcome {
        let (selected, time) = initial_selection(&self.original);
        self.selected = selected;
        self.hour = time.map(|t| t.hour()).unwrap_or(0);
        self.minute = time.map(|t| t.minute()).unwrap_or(0);
        self.view = PickerView::Day;
        if let Some(date) = selected {
            self.view_year = date.year();
            self.view_month = date.month();
        }
        EditOutcome::Cancel(self.original.clone())
    }
}

fn initial_selection(value: &CellValue) -> (Option<NaiveDate>, Option<NaiveTime>) {
    match value {
        CellValue::Date(d) => (Some(*d), None),
        CellValue::DateTime(dt) => (Some(dt.date()), Some(dt.time())),
        CellValue::String(s) => match parse_datetime(s) {
            Some(dt) => (Some(dt.date()), Some(dt.time())),
            None => (parse_date(s), None),
        },
        _ => (None, None),
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}
