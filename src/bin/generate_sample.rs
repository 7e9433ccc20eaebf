use std::sync::Arc;

use arrow::array::{Float64Builder, ListBuilder, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde_json::json;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn random_walk(start: f64, days: usize, rng: &mut SimpleRng) -> Vec<f64> {
    let mut price = start;
    (0..days)
        .map(|_| {
            price *= 1.0 + rng.gauss(0.0005, 0.012);
            price
        })
        .collect()
}

/// Centered moving average, used to seed the `avg` panel; the app recomputes
/// it from the window slider.
fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window / 2;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + window - half).min(n);
            let slice = &values[lo..hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let days = 252;
    let start = NaiveDate::from_ymd_opt(2017, 1, 2).expect("valid start date");
    let dates: Vec<String> = (0..days)
        .map(|i| (start + Duration::days(i as i64)).format("%Y-%m-%d").to_string())
        .collect();

    let tickers: [(&str, f64); 4] = [
        ("AAPL", 150.0),
        ("GOOG", 820.0),
        ("IBM", 160.0),
        ("MSFT", 64.0),
    ];
    let walks: Vec<(&str, Vec<f64>)> = tickers
        .iter()
        .map(|&(name, base)| (name, random_walk(base, days, &mut rng)))
        .collect();

    // ---- Parquet: one row per ticker (name, dates, values) ----

    let name_array = StringArray::from(walks.iter().map(|(n, _)| *n).collect::<Vec<_>>());

    let mut dates_builder = ListBuilder::new(StringBuilder::new());
    for _ in &walks {
        for d in &dates {
            dates_builder.values().append_value(d);
        }
        dates_builder.append(true);
    }
    let dates_array = dates_builder.finish();

    let mut values_builder = ListBuilder::new(Float64Builder::new());
    for (_, walk) in &walks {
        for &v in walk {
            values_builder.values().append_value(v);
        }
        values_builder.append(true);
    }
    let values_array = values_builder.finish();

    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new(
            "dates",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        ),
        Field::new(
            "values",
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        ),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(name_array),
            Arc::new(dates_array),
            Arc::new(values_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_stocks.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // ---- JSON: two named panels, records keyed by ticker ----

    let mut stocks = serde_json::Map::new();
    for (name, walk) in &walks {
        stocks.insert(
            name.to_string(),
            json!({ "date": dates.clone(), "adj_close": walk }),
        );
    }
    let aapl_avg = moving_average(&walks[0].1, 30);
    let root = json!({
        "stocks": stocks,
        "avg": { "AAPL_avg": { "date": dates, "adj_close": aapl_avg } }
    });

    let json_path = "sample_stocks.json";
    std::fs::write(json_path, serde_json::to_string_pretty(&root).expect("serializing sample"))
        .expect("Failed to write JSON sample");

    println!(
        "Wrote {} tickers ({days} days each) to {parquet_path} and {json_path}",
        walks.len()
    );
}
