use chrono::{Local, NaiveDateTime};

/// Source of the wall-clock time behind the `PvTime` and `PvDate` tokens.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn time_string(&self) -> String {
        self.now().format("%H:%M").to_string()
    }

    fn date_string(&self) -> String {
        self.now().format("%Y-%m-%d").to_string()
    }
}

/// Local time of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock_format() {
        let instant = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.time_string(), "09:05");
        assert_eq!(clock.date_string(), "2024-03-07");
    }
}
