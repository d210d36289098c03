use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, BooleanArray, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

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

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_f64() * items.len() as f64) as usize % items.len()]
    }

    /// `Some(v)` except for roughly `missing` of the calls.
    fn maybe<T>(&mut self, missing: f64, v: T) -> Option<T> {
        (self.next_f64() >= missing).then_some(v)
    }
}

const MODELS: &[(&str, i64)] = &[
    ("bmw x5", 14000),
    ("ford f-150", 16000),
    ("hyundai sonata", 7000),
    ("chrysler 200", 6000),
    ("toyota camry", 8500),
    ("honda pilot", 11000),
    ("kia sorento", 9000),
    ("chevrolet silverado 1500", 15000),
    ("subaru outback", 10000),
    ("jeep wrangler", 17000),
];
const CONDITIONS: &[&str] = &["new", "like new", "excellent", "good", "fair", "salvage"];
const FUELS: &[&str] = &["gas", "diesel", "hybrid", "electric", "other"];
const TRANSMISSIONS: &[&str] = &["automatic", "manual", "other"];
const TYPES: &[&str] = &["SUV", "pickup", "sedan", "truck", "coupe", "hatchback", "wagon"];
const COLORS: &[&str] = &["white", "black", "silver", "grey", "blue", "red", "green"];

/// Column-oriented synthetic listings.
#[derive(Default)]
struct Listings {
    price: Vec<i64>,
    model_year: Vec<Option<i64>>,
    model: Vec<String>,
    condition: Vec<String>,
    cylinders: Vec<Option<i64>>,
    fuel: Vec<String>,
    odometer: Vec<Option<i64>>,
    transmission: Vec<String>,
    vehicle_type: Vec<String>,
    paint_color: Vec<Option<String>>,
    is_4wd: Vec<Option<bool>>,
    date_posted: Vec<String>,
    days_listed: Vec<i64>,
}

impl Listings {
    fn generate(rows: usize, rng: &mut SimpleRng) -> Self {
        let mut out = Listings::default();
        for _ in 0..rows {
            let (model, base) = MODELS[rng.range(0, MODELS.len() as i64 - 1) as usize];
            let year = rng.range(1995, 2019);
            let age = 2019 - year;
            let miles = age * rng.range(8_000, 15_000);
            let price = (base - age * base / 25 + rng.range(-1500, 1500)).max(500);
            let cylinders = [4, 6, 8][rng.range(0, 2) as usize];

            out.price.push(price);
            out.model_year.push(rng.maybe(0.07, year));
            out.model.push(model.to_string());
            out.condition.push(rng.pick(CONDITIONS).to_string());
            out.cylinders.push(rng.maybe(0.10, cylinders));
            out.fuel.push(rng.pick(FUELS).to_string());
            out.odometer.push(rng.maybe(0.15, miles));
            out.transmission.push(rng.pick(TRANSMISSIONS).to_string());
            out.vehicle_type.push(rng.pick(TYPES).to_string());
            let color = rng.pick(COLORS).to_string();
            out.paint_color.push(rng.maybe(0.18, color));
            out.is_4wd.push(rng.maybe(0.5, true));
            out.date_posted.push(format!(
                "2018-{:02}-{:02}",
                rng.range(5, 12),
                rng.range(1, 28)
            ));
            out.days_listed.push(rng.range(0, 120));
        }
        out
    }

    fn to_batch(&self) -> Result<RecordBatch> {
        let text = |name: &str| Field::new(name, DataType::Utf8, true);
        let int = |name: &str| Field::new(name, DataType::Int64, true);

        let schema = Arc::new(Schema::new(vec![
            int("price"),
            int("model_year"),
            text("model"),
            text("condition"),
            int("cylinders"),
            text("fuel"),
            int("odometer"),
            text("transmission"),
            text("type"),
            text("paint_color"),
            Field::new("is_4wd", DataType::Boolean, true),
            text("date_posted"),
            int("days_listed"),
        ]));

        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(self.price.clone())),
            Arc::new(Int64Array::from(self.model_year.clone())),
            Arc::new(StringArray::from(self.model.clone())),
            Arc::new(StringArray::from(self.condition.clone())),
            Arc::new(Int64Array::from(self.cylinders.clone())),
            Arc::new(StringArray::from(self.fuel.clone())),
            Arc::new(Int64Array::from(self.odometer.clone())),
            Arc::new(StringArray::from(self.transmission.clone())),
            Arc::new(StringArray::from(self.vehicle_type.clone())),
            Arc::new(StringArray::from(self.paint_color.clone())),
            Arc::new(BooleanArray::from(self.is_4wd.clone())),
            Arc::new(StringArray::from(self.date_posted.clone())),
            Arc::new(Int64Array::from(self.days_listed.clone())),
        ];

        RecordBatch::try_new(schema, columns).context("building record batch")
    }
}

fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    let schema = batch.schema();
    writer.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;

    for row in 0..batch.num_rows() {
        let mut record = Vec::with_capacity(batch.num_columns());
        for col in batch.columns() {
            // Missing cells stay empty, as pandas writes them.
            let cell = if col.is_null(row) {
                String::new()
            } else {
                arrow::util::display::array_value_to_string(col, row)?
            };
            record.push(cell);
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "vehicles_us.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let batch = Listings::generate(2_000, &mut rng).to_batch()?;

    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "parquet" | "pq"));
    if is_parquet {
        write_parquet(&batch, path)?;
    } else {
        write_csv(&batch, path)?;
    }
    log::info!("wrote {} listings to {output}", batch.num_rows());

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!("Wrote {} listings to {output}", batch.num_rows());
    Ok(())
}
