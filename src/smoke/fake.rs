use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::models::{ColumnMetadata, FakeValue};

const WORDS: &[&str] = &[
    "alpha", "amber", "basin", "cedar", "delta", "ember", "fable", "grove", "harbor", "iris",
    "juniper", "kettle", "lumen", "maple", "north", "orbit", "pebble", "quartz", "river", "sable",
    "tundra", "umber", "violet", "willow", "yarrow", "zephyr",
];

const MAX_TEXT_LEN: usize = 20;

/// Broad value category of a declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeKind {
    Text { max_len: usize },
    Integer,
    Decimal,
    Date,
    DateTime,
    Boolean,
    Unknown,
}

impl FakeKind {
    pub fn from_declared(declared: &str) -> Self {
        let lower = declared.trim().to_ascii_lowercase();
        let (base, length) = match lower.split_once('(') {
            Some((base, rest)) => (
                base.trim(),
                rest.split([',', ')']).next().and_then(|n| n.trim().parse::<usize>().ok()),
            ),
            None => (lower.as_str(), None),
        };
        let first = base.split_whitespace().next().unwrap_or_default();

        if base.contains("timestamp") || base.contains("datetime") {
            FakeKind::DateTime
        } else if first == "date" {
            FakeKind::Date
        } else if first.starts_with("bool") || first == "bit" {
            FakeKind::Boolean
        } else if matches!(
            first,
            "int"
                | "integer"
                | "tinyint"
                | "smallint"
                | "mediumint"
                | "bigint"
                | "int2"
                | "int4"
                | "int8"
                | "serial"
                | "smallserial"
                | "bigserial"
        ) {
            FakeKind::Integer
        } else if ["decimal", "numeric", "float", "double", "real"]
            .iter()
            .any(|p| first.starts_with(p))
        {
            FakeKind::Decimal
        } else if base.contains("char") || base.contains("text") || first == "string" {
            FakeKind::Text {
                max_len: length.map_or(MAX_TEXT_LEN, |n| n.clamp(1, MAX_TEXT_LEN)),
            }
        } else {
            FakeKind::Unknown
        }
    }
}

/// Produces plausible values for a column from its declared type.
pub struct FakeDataGenerator {
    rng: StdRng,
}

impl FakeDataGenerator {
    /// A fixed seed makes every value reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn value_for(&mut self, column: &ColumnMetadata) -> FakeValue {
        match FakeKind::from_declared(&column.data_type) {
            FakeKind::Text { max_len } => FakeValue::Text(self.text(max_len)),
            FakeKind::Integer => FakeValue::Int(self.rng.gen_range(1..=100)),
            FakeKind::Decimal => {
                let cents: i64 = self.rng.gen_range(0..10_000_000);
                FakeValue::Float(cents as f64 / 100.0)
            }
            FakeKind::Date => FakeValue::Date(self.date()),
            FakeKind::DateTime => FakeValue::DateTime(self.datetime()),
            FakeKind::Boolean => FakeValue::Bool(self.rng.gen_bool(0.5)),
            FakeKind::Unknown if column.is_nullable => FakeValue::Null,
            FakeKind::Unknown => FakeValue::Text("UNKNOWN".to_string()),
        }
    }

    fn text(&mut self, max_len: usize) -> String {
        let mut out = String::new();
        loop {
            let Some(word) = WORDS.choose(&mut self.rng) else {
                break;
            };
            let needed = if out.is_empty() { word.len() } else { word.len() + 1 };
            if out.len() + needed > max_len {
                break;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
        if out.is_empty() {
            out = WORDS[0].chars().take(max_len).collect();
        }
        out
    }

    fn date(&mut self) -> NaiveDate {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN);
        start + Duration::days(self.rng.gen_range(0..365 * 30))
    }

    fn datetime(&mut self) -> NaiveDateTime {
        let seconds = self.rng.gen_range(0..86_400);
        self.date().and_time(NaiveTime::MIN) + Duration::seconds(seconds)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn column(data_type: &str, is_nullable: bool) -> ColumnMetadata {
        ColumnMetadata {
            name: "c".into(),
            data_type: data_type.into(),
            is_nullable,
            is_primary_key: false,
            default: None,
        }
    }

    #[rstest]
    #[case("varchar(255)", FakeKind::Text { max_len: 20 })]
    #[case("character varying", FakeKind::Text { max_len: 20 })]
    #[case("CHAR(4)", FakeKind::Text { max_len: 4 })]
    #[case("text", FakeKind::Text { max_len: 20 })]
    #[case("integer", FakeKind::Integer)]
    #[case("BIGINT", FakeKind::Integer)]
    #[case("tinyint(1)", FakeKind::Integer)]
    #[case("decimal(10,2)", FakeKind::Decimal)]
    #[case("double precision", FakeKind::Decimal)]
    #[case("numeric", FakeKind::Decimal)]
    #[case("real", FakeKind::Decimal)]
    #[case("date", FakeKind::Date)]
    #[case("datetime(6)", FakeKind::DateTime)]
    #[case("timestamp with time zone", FakeKind::DateTime)]
    #[case("boolean", FakeKind::Boolean)]
    #[case("bit", FakeKind::Boolean)]
    #[case("interval", FakeKind::Unknown)]
    #[case("point", FakeKind::Unknown)]
    #[case("blob", FakeKind::Unknown)]
    fn test_kind_from_declared(#[case] declared: &str, #[case] expected: FakeKind) {
        assert_eq!(FakeKind::from_declared(declared), expected);
    }

    #[test]
    fn test_values_match_column_kind() {
        let mut fake = FakeDataGenerator::new(Some(7));

        for _ in 0..50 {
            match fake.value_for(&column("varchar(255)", false)) {
                FakeValue::Text(s) => assert!(!s.is_empty() && s.len() <= 20),
                other => panic!("expected text, got {other:?}"),
            }
            match fake.value_for(&column("int", false)) {
                FakeValue::Int(i) => assert!((1..=100).contains(&i)),
                other => panic!("expected int, got {other:?}"),
            }
            match fake.value_for(&column("decimal(7,2)", false)) {
                FakeValue::Float(f) => {
                    assert!((0.0..100_000.0).contains(&f));
                    assert_eq!((f * 100.0).round() / 100.0, f);
                }
                other => panic!("expected float, got {other:?}"),
            }
        }

        assert!(matches!(fake.value_for(&column("date", false)), FakeValue::Date(_)));
        assert!(matches!(
            fake.value_for(&column("timestamp", false)),
            FakeValue::DateTime(_)
        ));
        assert!(matches!(fake.value_for(&column("boolean", false)), FakeValue::Bool(_)));
    }

    #[test]
    fn test_short_char_column_fits() {
        let mut fake = FakeDataGenerator::new(Some(1));
        for _ in 0..20 {
            match fake.value_for(&column("char(3)", false)) {
                FakeValue::Text(s) => assert!(!s.is_empty() && s.len() <= 3, "{s:?}"),
                other => panic!("expected text, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_type_depends_on_nullability() {
        let mut fake = FakeDataGenerator::new(Some(1));
        assert_eq!(fake.value_for(&column("blob", true)), FakeValue::Null);
        assert_eq!(
            fake.value_for(&column("blob", false)),
            FakeValue::Text("UNKNOWN".into())
        );
    }

    #[test]
    fn test_seed_is_reproducible() {
        let columns = [column("text", false), column("date", false), column("int", false)];
        let mut a = FakeDataGenerator::new(Some(42));
        let mut b = FakeDataGenerator::new(Some(42));

        for c in &columns {
            assert_eq!(a.value_for(c), b.value_for(c));
        }
    }
}
