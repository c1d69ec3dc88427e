use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use lcanalyzer::{calc_stats, load_dataset, normalize_lc, select_rows, split_by_band};

const BANDS: [&str; 6] = ["u", "g", "r", "i", "z", "y"];

/// SplitMix64 stream; enough for cadence jitter and photometric noise.
struct Jitter(u64);

impl Jitter {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        (z ^ (z >> 31)) as f64 / u64::MAX as f64
    }

    /// Gaussian noise in magnitudes (Box-Muller).
    fn photometric(&mut self, sigma: f64) -> f64 {
        let u1 = self.uniform().max(1e-15);
        let u2 = self.uniform();
        sigma * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// A periodic variable: mean magnitude per band, amplitude and period (days).
struct Variable {
    object_id: i64,
    base_mag: [f64; 6],
    amplitude: f64,
    period: f64,
}

/// Rows of one survey extract, column-major.
#[derive(Default)]
struct Observations {
    object_id: Vec<i64>,
    mjd: Vec<f64>,
    band: Vec<&'static str>,
    psf_mag: Vec<Option<f64>>,
}

fn simulate(objects: &[Variable], epochs: usize, rng: &mut Jitter) -> Observations {
    let mut obs = Observations::default();
    for obj in objects {
        let mut mjd = 60000.0;
        for epoch in 0..epochs {
            mjd += 1.0 + 3.0 * rng.uniform();
            let band_idx = epoch % BANDS.len();
            let phase = 2.0 * std::f64::consts::PI * mjd / obj.period;
            let mag = obj.base_mag[band_idx] + obj.amplitude * phase.sin() + rng.photometric(0.02);

            obs.object_id.push(obj.object_id);
            obs.mjd.push(mjd);
            obs.band.push(BANDS[band_idx]);
            // Roughly one dropout in twenty epochs.
            obs.psf_mag.push((rng.uniform() > 0.05).then_some(mag));
        }
    }
    obs
}

fn write_csv(path: &str, obs: &Observations) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record(["objectId", "mjd", "band", "psfMag"])?;
    for i in 0..obs.mjd.len() {
        let mag = obs.psf_mag[i].map(|m| format!("{m:.4}")).unwrap_or_default();
        writer.write_record([
            obs.object_id[i].to_string(),
            format!("{:.5}", obs.mjd[i]),
            obs.band[i].to_string(),
            mag,
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn to_batch(obs: &Observations) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("objectId", DataType::Int64, false),
        Field::new("mjd", DataType::Float64, false),
        Field::new("band", DataType::Utf8, false),
        Field::new("psfMag", DataType::Float64, true),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(obs.object_id.clone())),
            Arc::new(Float64Array::from(obs.mjd.clone())),
            Arc::new(StringArray::from(obs.band.clone())),
            Arc::new(Float64Array::from(obs.psf_mag.clone())),
        ],
    )
    .context("Failed to create RecordBatch")
}

fn write_parquet(path: &str, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).context("Failed to create output file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("Failed to create writer")?;
    writer.write(batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = Jitter(42);
    let objects = [
        Variable {
            object_id: 1_000_001,
            base_mag: [21.8, 20.9, 20.4, 20.2, 20.1, 20.0],
            amplitude: 0.4,
            period: 0.57,
        },
        Variable {
            object_id: 1_000_002,
            base_mag: [19.2, 18.6, 18.3, 18.2, 18.1, 18.1],
            amplitude: 0.15,
            period: 3.2,
        },
    ];
    let obs = simulate(&objects, 240, &mut rng);

    let csv_path = "sample_lightcurve.csv";
    let parquet_path = "sample_lightcurve.parquet";
    write_csv(csv_path, &obs)?;
    let batch = to_batch(&obs)?;
    write_parquet(parquet_path, &batch)?;

    log::info!(
        "Wrote {} observations of {} objects to {csv_path} and {parquet_path}",
        obs.mjd.len(),
        objects.len()
    );
    log::info!("First rows:\n{}", pretty_format_batches(&[batch.slice(0, 5)])?);

    // Read the file back through the library as a sanity check.
    let table = load_dataset(csv_path)?;
    let first = objects[0].object_id.to_string();
    let bands = split_by_band(&select_rows(&table, "objectId", &first)?, "band")?;
    let stats = calc_stats(&bands, BANDS, "psfMag")?;
    log::info!("psfMag per band for object {first}:\n{stats}");

    let g = bands.get("g").context("no g-band observations")?;
    let curve = normalize_lc(g, "psfMag")?;
    log::info!(
        "g band normalized over {} epochs, first five: {:?}",
        curve.len(),
        &curve[..curve.len().min(5)]
    );

    Ok(())
}
