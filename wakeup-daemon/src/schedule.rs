//! Minute-modulo due policy.

use chrono::{DateTime, TimeZone, Timelike};

use wakeup_core::{Document, PingInterval, Resource};

/// `true` when a resource with `effective` interval is due at `minute` of the
/// hour. Interval 1 is due on every tick.
pub fn is_due(effective: PingInterval, minute: u32) -> bool {
    let every = effective.minutes();
    every == 1 || minute % every == 0
}

/// Resources of `doc` due at `now`, in document order.
pub fn due_resources<'a, Tz: TimeZone>(doc: &'a Document, now: &DateTime<Tz>) -> Vec<&'a Resource> {
    let minute = now.minute();
    doc.resources
        .iter()
        .filter(|r| is_due(r.effective_interval(&doc.settings), minute))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wakeup_core::Settings;

    fn minutes(n: i64) -> PingInterval {
        PingInterval::new(n).unwrap()
    }

    fn doc_with(global: i64, overrides: &[Option<i64>]) -> Document {
        Document {
            resources: overrides
                .iter()
                .enumerate()
                .map(|(i, o)| {
                    let mut r = Resource::new(format!("https://r{i}.test"));
                    r.ping_interval = o.map(minutes);
                    r
                })
                .collect(),
            settings: Settings {
                ping_interval: minutes(global),
            },
        }
    }

    fn at_minute(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap()
    }

    #[test]
    fn global_five_is_due_on_multiples_only() {
        assert!(is_due(minutes(5), 10));
        assert!(!is_due(minutes(5), 12));
        assert!(is_due(minutes(5), 0));
    }

    #[test]
    fn interval_one_is_always_due() {
        for minute in [0, 1, 10, 12, 59] {
            assert!(is_due(minutes(1), minute));
        }
    }

    #[test]
    fn sixty_fires_once_per_hour() {
        assert!(is_due(minutes(60), 0));
        assert!((1..60).all(|m| !is_due(minutes(60), m)));
    }

    #[test]
    fn override_one_beats_global_five() {
        let doc = doc_with(5, &[None, Some(1)]);

        let due: Vec<_> = due_resources(&doc, &at_minute(10))
            .into_iter()
            .map(|r| r.url.as_str())
            .collect();
        assert_eq!(due, ["https://r0.test", "https://r1.test"]);

        let due: Vec<_> = due_resources(&doc, &at_minute(12))
            .into_iter()
            .map(|r| r.url.as_str())
            .collect();
        assert_eq!(due, ["https://r1.test"]);
    }

    #[test]
    fn cleared_override_follows_global() {
        let mut doc = doc_with(5, &[Some(1)]);
        assert_eq!(due_resources(&doc, &at_minute(12)).len(), 1);

        doc.resources[0].ping_interval = None;
        assert!(due_resources(&doc, &at_minute(12)).is_empty());
        assert_eq!(due_resources(&doc, &at_minute(15)).len(), 1);
    }
}
