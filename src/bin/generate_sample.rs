use std::path::PathBuf;

use anyhow::{Context, Result};

use ev_dashboard::data::model::columns;
use ev_dashboard::data::source::DEFAULT_DATA_PATH;

const DEFAULT_ROWS: usize = 5000;

/// (make, model, type, typical range in miles, base MSRP)
const VEHICLES: &[(&str, &str, &str, f64, f64)] = &[
    ("TESLA", "MODEL 3", "BEV", 270.0, 0.0),
    ("TESLA", "MODEL Y", "BEV", 290.0, 0.0),
    ("TESLA", "MODEL S", "BEV", 330.0, 69900.0),
    ("NISSAN", "LEAF", "BEV", 150.0, 0.0),
    ("CHEVROLET", "BOLT EV", "BEV", 240.0, 0.0),
    ("CHEVROLET", "VOLT", "PHEV", 53.0, 0.0),
    ("KIA", "NIRO", "BEV", 239.0, 0.0),
    ("BMW", "X5", "PHEV", 30.0, 59950.0),
    ("BMW", "I3", "BEV", 114.0, 44100.0),
    ("FORD", "FUSION", "PHEV", 26.0, 0.0),
    ("TOYOTA", "PRIUS PRIME", "PHEV", 25.0, 0.0),
    ("VOLVO", "XC90", "PHEV", 18.0, 52900.0),
    ("AUDI", "E-TRON", "BEV", 204.0, 0.0),
    ("JEEP", "WRANGLER", "PHEV", 21.0, 0.0),
];

/// (county, city, weight)
const CITIES: &[(&str, &str, u64)] = &[
    ("King", "Seattle", 30),
    ("King", "Bellevue", 12),
    ("King", "Redmond", 9),
    ("King", "Kent", 5),
    ("Snohomish", "Bothell", 7),
    ("Snohomish", "Everett", 5),
    ("Pierce", "Tacoma", 6),
    ("Clark", "Vancouver", 6),
    ("Thurston", "Olympia", 4),
    ("Kitsap", "Bremerton", 2),
];

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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn weighted<'a, T>(&mut self, items: &'a [T], weight: impl Fn(&T) -> u64) -> &'a T {
        let total: u64 = items.iter().map(&weight).sum();
        let mut pick = self.below(total.max(1));
        for item in items {
            let w = weight(item);
            if pick < w {
                return item;
            }
            pick -= w;
        }
        &items[items.len() - 1]
    }
}

fn ev_type_label(short: &str) -> &'static str {
    match short {
        "PHEV" => "Plug-in Hybrid Electric Vehicle (PHEV)",
        _ => "Battery Electric Vehicle (BEV)",
    }
}

/// Newer vehicles are more common, matching registration growth.
fn model_year(rng: &mut SimpleRng) -> u64 {
    let years: Vec<u64> = (2011..=2024).collect();
    *rng.weighted(&years, |&y| (y - 2010) * (y - 2010))
}

fn vin(rng: &mut SimpleRng) -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHJKLMNPRSTUVWXYZ";
    (0..10)
        .map(|_| ALPHABET[rng.below(ALPHABET.len() as u64) as usize] as char)
        .collect()
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let rows = match args.next() {
        Some(n) => n
            .parse::<usize>()
            .with_context(|| format!("row count must be a non-negative integer, got {n:?}"))?,
        None => DEFAULT_ROWS,
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    writer.write_record([
        "VIN (1-10)",
        "County",
        columns::CITY,
        columns::MODEL_YEAR,
        columns::MAKE,
        columns::MODEL,
        columns::EV_TYPE,
        columns::CAFV_ELIGIBILITY,
        columns::ELECTRIC_RANGE,
        columns::BASE_MSRP,
    ])?;

    let mut rng = SimpleRng::new(42);
    for _ in 0..rows {
        let &(county, city, _) = rng.weighted(CITIES, |c| c.2);
        let &(make, model, kind, range, msrp) = &VEHICLES[rng.below(VEHICLES.len() as u64) as usize];
        let year = model_year(&mut rng);

        // Recent registrations have not had their range researched yet.
        let unresearched = year >= 2021 && rng.next_f64() < 0.7;
        let range = if unresearched {
            0
        } else {
            (range * (0.85 + 0.3 * rng.next_f64())).round() as u64
        };
        let eligibility = if unresearched {
            "Eligibility unknown as battery range has not been researched"
        } else if kind == "PHEV" && range < 30 {
            "Not eligible due to low battery range"
        } else {
            "Clean Alternative Fuel Vehicle Eligible"
        };
        // A few rows leave the city blank, as the public extract does.
        let city = if rng.below(200) == 0 { "" } else { city };

        writer.write_record([
            vin(&mut rng),
            county.to_string(),
            city.to_string(),
            year.to_string(),
            make.to_string(),
            model.to_string(),
            ev_type_label(kind).to_string(),
            eligibility.to_string(),
            range.to_string(),
            format!("{msrp:.0}"),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {rows} vehicles to {}", output.display());
    Ok(())
}
