//! Time poll value objects and winner resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{HangoutId, TimeOptionId, UserId};

/// Upper bound on distinct time options per poll.
pub const MAX_POLL_OPTIONS: usize = 5;

/// Validation failures for time windows and polls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollValidationError {
    #[error("time option must look like YYYY-MM-DD,HH:MM,HH:MM, got {0:?}")]
    Malformed(String),
    #[error("time option must start before it ends")]
    EmptyWindow,
    #[error("a poll needs at least one time option")]
    NoOptions,
    #[error("a poll accepts at most {max} distinct options, got {count}")]
    TooManyOptions { count: usize, max: usize },
    #[error("a ballot needs at least one option")]
    EmptyBallot,
}

/// Candidate meeting window on a single day.
///
/// # Examples
///
/// ```rust
/// use backend::domain::TimeWindow;
///
/// let window: TimeWindow = "2026-11-06,18:30,21:00".parse()?;
/// assert_eq!(window.to_string(), "2026-11-06,18:30,21:00");
/// assert!("2026-11-06,21:00,18:30".parse::<TimeWindow>().is_err());
/// Ok::<(), backend::domain::PollValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeWindow {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, PollValidationError> {
        if start >= end {
            return Err(PollValidationError::EmptyWindow);
        }
        Ok(Self { date, start, end })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{}",
            self.date.format("%Y-%m-%d"),
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

impl FromStr for TimeWindow {
    type Err = PollValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PollValidationError::Malformed(s.to_owned());
        let mut parts = s.split(',').map(str::trim);
        let (Some(date), Some(start), Some(end), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| malformed())?;
        let start = NaiveTime::parse_from_str(start, "%H:%M").map_err(|_| malformed())?;
        let end = NaiveTime::parse_from_str(end, "%H:%M").map_err(|_| malformed())?;
        Self::new(date, start, end)
    }
}

/// Validated set of time options for one hangout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    hangout_id: HangoutId,
    options: Vec<TimeWindow>,
}

impl PollDraft {
    /// Collapse duplicates (first occurrence wins) and enforce the option cap.
    pub fn new(hangout_id: HangoutId, windows: Vec<TimeWindow>) -> Result<Self, PollValidationError> {
        let mut options: Vec<TimeWindow> = Vec::with_capacity(windows.len());
        for window in windows {
            if !options.contains(&window) {
                options.push(window);
            }
        }

        if options.is_empty() {
            return Err(PollValidationError::NoOptions);
        }
        if options.len() > MAX_POLL_OPTIONS {
            return Err(PollValidationError::TooManyOptions {
                count: options.len(),
                max: MAX_POLL_OPTIONS,
            });
        }

        Ok(Self {
            hangout_id,
            options,
        })
    }

    pub fn hangout_id(&self) -> HangoutId {
        self.hangout_id
    }

    /// Options in submission order; storage assigns ids in this order.
    pub fn options(&self) -> &[TimeWindow] {
        &self.options
    }
}

/// Stored time option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOption {
    pub id: TimeOptionId,
    pub hangout_id: HangoutId,
    pub window: TimeWindow,
}

/// One participant's vote for one option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: UserId,
    pub option_id: TimeOptionId,
}

/// Non-empty, duplicate-free list of options a participant votes for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot(Vec<TimeOptionId>);

impl Ballot {
    pub fn new(options: Vec<TimeOptionId>) -> Result<Self, PollValidationError> {
        let unique: BTreeSet<TimeOptionId> = options.into_iter().collect();
        if unique.is_empty() {
            return Err(PollValidationError::EmptyBallot);
        }
        Ok(Self(unique.into_iter().collect()))
    }

    pub fn options(&self) -> &[TimeOptionId] {
        &self.0
    }
}

/// Distinct users who have cast at least one vote.
pub fn distinct_voters(votes: &[Vote]) -> BTreeSet<&UserId> {
    votes.iter().map(|vote| &vote.user_id).collect()
}

/// Winning option: most votes, ties to the lowest option id.
///
/// Duplicate `(user, option)` pairs count once. Returns `None` when there are
/// no options.
///
/// # Examples
///
/// ```rust
/// use backend::domain::{HangoutId, TimeOption, TimeOptionId, UserId, Vote, resolve_winner};
///
/// let hangout_id = HangoutId::new(1);
/// let window = "2026-11-06,18:30,21:00".parse()?;
/// let options = vec![
///     TimeOption { id: TimeOptionId::new(7), hangout_id, window },
///     TimeOption { id: TimeOptionId::new(3), hangout_id, window },
/// ];
/// let votes = vec![
///     Vote { user_id: UserId::random(), option_id: TimeOptionId::new(7) },
///     Vote { user_id: UserId::random(), option_id: TimeOptionId::new(3) },
/// ];
/// let winner = resolve_winner(&options, &votes).map(|option| option.id);
/// assert_eq!(winner, Some(TimeOptionId::new(3)));
/// Ok::<(), backend::domain::PollValidationError>(())
/// ```
pub fn resolve_winner<'a>(options: &'a [TimeOption], votes: &[Vote]) -> Option<&'a TimeOption> {
    let unique_votes: BTreeSet<(&UserId, TimeOptionId)> = votes
        .iter()
        .map(|vote| (&vote.user_id, vote.option_id))
        .collect();

    let mut tallies: BTreeMap<TimeOptionId, usize> = BTreeMap::new();
    for (_, option_id) in unique_votes {
        *tallies.entry(option_id).or_default() += 1;
    }

    options.iter().min_by(|a, b| {
        let a_votes = tallies.get(&a.id).copied().unwrap_or_default();
        let b_votes = tallies.get(&b.id).copied().unwrap_or_default();
        b_votes.cmp(&a_votes).then(a.id.cmp(&b.id))
    })
}
