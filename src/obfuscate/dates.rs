// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Date shuffler: every strict `YYYY-MM-DD` string in a tree is rendered
//! again in a randomly chosen alternate format.  Keys, ordering and all
//! other values come through untouched.

use super::words::FormatChooser;
use crate::error::Result;
use crate::tree::{Node, Scalar, Visitor, Walker};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static ISO_DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid regex")
});

/// A real calendar day, leap years included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn render(&self, format: DateFormat) -> String {
        self.0.format(format.pattern()).to_string()
    }
}

/// Parse exactly `YYYY-MM-DD`.  Anything else, including impossible days
/// such as `2024-02-30`, is simply not a date.
pub fn try_parse_date(text: &str) -> Option<CalendarDate> {
    let caps = ISO_DATE_REGEX.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate)
}

/// The alternate renderings a date may be rewritten into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `MM/DD/YYYY`
    MonthDayYear,
    /// `DD.MM.YYYY`
    DayMonthYearDotted,
    /// `YYYY/MM/DD`
    YearMonthDaySlashed,
    /// `DD-Mon-YYYY`
    DayMonthAbbrevYear,
}

impl DateFormat {
    pub const ALL: [DateFormat; 4] = [
        DateFormat::MonthDayYear,
        DateFormat::DayMonthYearDotted,
        DateFormat::YearMonthDaySlashed,
        DateFormat::DayMonthAbbrevYear,
    ];

    fn pattern(self) -> &'static str {
        match self {
            DateFormat::MonthDayYear => "%m/%d/%Y",
            DateFormat::DayMonthYearDotted => "%d.%m.%Y",
            DateFormat::YearMonthDaySlashed => "%Y/%m/%d",
            DateFormat::DayMonthAbbrevYear => "%d-%b-%Y",
        }
    }
}

struct DateRewriter<'a, C: ?Sized> {
    chooser: &'a mut C,
    rewritten: usize,
}

impl<C: FormatChooser + ?Sized> Visitor for DateRewriter<'_, C> {
    type Output = Node;

    fn on_mapping(&mut self, entries: Vec<(String, Node)>) -> Result<Node> {
        Ok(Node::Mapping(entries))
    }

    fn on_sequence(&mut self, items: Vec<Node>) -> Result<Node> {
        Ok(Node::Sequence(items))
    }

    fn on_scalar(&mut self, value: &Scalar) -> Result<Node> {
        let Some(date) = value.as_str().and_then(try_parse_date) else {
            return Ok(Node::Scalar(value.clone()));
        };
        let format = self.chooser.choose_format();
        self.rewritten += 1;
        Ok(Node::string(date.render(format)))
    }
}

/// Rewrite every date in `tree` using the default walker.
pub fn rewrite_dates<C>(tree: &Node, chooser: &mut C) -> Result<Node>
where
    C: FormatChooser + ?Sized,
{
    rewrite_dates_with(tree, chooser, &Walker::default())
}

pub fn rewrite_dates_with<C>(tree: &Node, chooser: &mut C, walker: &Walker) -> Result<Node>
where
    C: FormatChooser + ?Sized,
{
    let mut rewriter = DateRewriter {
        chooser,
        rewritten: 0,
    };
    let out = walker.walk(tree, &mut rewriter)?;
    trace!(rewritten = rewriter.rewritten, "date rewrite finished");
    Ok(out)
}
