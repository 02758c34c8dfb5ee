use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

const HEADERS: [&str; 9] = [
    "Sl.No",
    "Site",
    "Date",
    "Region",
    "Cluster MANAGER (L1)",
    "Area MANAGER (L2)",
    "Area EXECUTIVE (L3)",
    "Status",
    "Uptime %",
];

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const CLUSTER_MANAGERS: [&str; 3] = ["Ravi Kumar", "Anita Rao", "Suresh Iyer"];
const AREA_MANAGERS: [&str; 4] = ["Meena Das", "Kiran Shah", "Arjun Nair", "Pooja Mehta"];
const AREA_EXECUTIVES: [&str; 5] = ["Arun", "Divya", "Farhan", "Lakshmi", "Vikram"];
const STATUSES: [&str; 3] = ["Up", "Down", "Maintenance"];

/// How a provider's export stores the `Date` column.
#[derive(Clone, Copy)]
enum DateStyle {
    /// Native spreadsheet date cells.
    Native,
    /// Text, `YYYY-MM-DD HH:MM:SS`.
    IsoText,
    /// Text, `DD/MM/YYYY`.
    DayFirstText,
}

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

fn write_provider(
    path: &Path,
    site_prefix: &str,
    rows: u32,
    style: DateStyle,
    rng: &mut SimpleRng,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let date_format = Format::new().set_num_format("dd-mm-yyyy");

    let sheet: &mut Worksheet = workbook.add_worksheet();
    for (col, name) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for i in 0..rows {
        let row = i + 1;
        let day = 1 + rng.below(28) as u8;
        let month = 1 + rng.below(3) as u8;
        let hour = rng.below(24) as u16;

        sheet.write_number(row, 0, row)?;
        sheet.write_string(row, 1, format!("{site_prefix}{:04}", rng.below(10_000)))?;
        match style {
            DateStyle::Native => {
                let date = ExcelDateTime::from_ymd(2024, month, day)?;
                sheet.write_datetime_with_format(row, 2, &date, &date_format)?;
            }
            DateStyle::IsoText => {
                sheet.write_string(row, 2, format!("2024-{month:02}-{day:02} {hour:02}:00:00"))?;
            }
            DateStyle::DayFirstText => {
                sheet.write_string(row, 2, format!("{day:02}/{month:02}/2024"))?;
            }
        }
        sheet.write_string(row, 3, rng.pick(&REGIONS))?;
        sheet.write_string(row, 4, rng.pick(&CLUSTER_MANAGERS))?;
        sheet.write_string(row, 5, rng.pick(&AREA_MANAGERS))?;
        sheet.write_string(row, 6, rng.pick(&AREA_EXECUTIVES))?;
        sheet.write_string(row, 7, rng.pick(&STATUSES))?;
        sheet.write_number(row, 8, 90.0 + rng.below(1000) as f64 / 100.0)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let providers = [
        ("bsnl.xlsx", "BS", 40, DateStyle::Native),
        ("airtel.xlsx", "AT", 35, DateStyle::IsoText),
        ("vi.xlsx", "VI", 25, DateStyle::DayFirstText),
    ];

    for (file, prefix, rows, style) in providers {
        let path = out_dir.join(file);
        write_provider(&path, prefix, rows, style, &mut rng)?;
        println!("Wrote {rows} site records to {}", path.display());
    }
    Ok(())
}
