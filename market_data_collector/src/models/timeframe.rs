use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TimeFrameError {
    #[error("Invalid amount for {unit:?}: {message}")]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl TimeFrameUnit {
    fn suffix(self) -> &'static str {
        match self {
            TimeFrameUnit::Minute => "Min",
            TimeFrameUnit::Hour => "Hour",
            TimeFrameUnit::Day => "Day",
            TimeFrameUnit::Week => "Week",
            TimeFrameUnit::Month => "Month",
        }
    }
}

/// Bar interval, written in Alpaca notation (`1Min`, `15Min`, `1Hour`, `1Day`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        Self::validate(amount, unit)?;
        Ok(Self { amount, unit })
    }

    pub fn one_minute() -> Self {
        Self {
            amount: 1,
            unit: TimeFrameUnit::Minute,
        }
    }

    fn validate(amount: u32, unit: TimeFrameUnit) -> Result<(), TimeFrameError> {
        match unit {
            TimeFrameUnit::Minute if !(1..=59).contains(&amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Minute units can only be used with amounts between 1-59.".into(),
                })
            }
            TimeFrameUnit::Hour if !(1..=23).contains(&amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Hour units can only be used with amounts 1-23".into(),
                })
            }
            TimeFrameUnit::Day | TimeFrameUnit::Week if amount != 1 => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Day and Week units can only be used with amount 1".into(),
                })
            }
            TimeFrameUnit::Month if ![1, 2, 3, 6, 12].contains(&amount) => {
                Err(TimeFrameError::InvalidAmount {
                    unit,
                    message: "Month units can only be used with amount 1, 2, 3, 6 and 12".into(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl Default for TimeFrame {
    fn default() -> Self {
        Self::one_minute()
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TimeFrameError::InvalidInput {
                message: format!("missing unit in timeframe '{s}'"),
            })?;
        let (digits, unit) = s.split_at(split);

        let amount = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|_| TimeFrameError::InvalidInput {
                message: format!("bad amount in timeframe '{s}'"),
            })?
        };

        // "M" stays case-sensitive so it can't be confused with minutes.
        let unit = match unit {
            "M" => TimeFrameUnit::Month,
            _ => match unit.to_lowercase().as_str() {
                "m" | "t" | "min" | "minute" => TimeFrameUnit::Minute,
                "h" | "hr" | "hour" => TimeFrameUnit::Hour,
                "d" | "day" => TimeFrameUnit::Day,
                "w" | "wk" | "week" => TimeFrameUnit::Week,
                "mo" | "month" => TimeFrameUnit::Month,
                _ => {
                    return Err(TimeFrameError::InvalidInput {
                        message: format!("Invalid timeframe unit: {unit}"),
                    });
                }
            },
        };

        TimeFrame::new(amount, unit)
    }
}
