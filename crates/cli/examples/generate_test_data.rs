use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/housefilter_sample".to_string());
    let dir = Path::new(&output_dir);
    fs::create_dir_all(dir)?;

    println!("🔧 Generating sample datasets in: {}\n", output_dir);

    println!("Adding regional sales listings...");
    let mut w = BufWriter::new(File::create(dir.join("India_House_Price.csv"))?);
    writeln!(w, "Price,number of bedrooms,number of bathrooms,living area,lot area,Lattitude,Longitude,Built Year")?;
    for i in 0..200u32 {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{}",
            2_000_000 + i * 25_000,
            1 + i % 6,
            1.0 + f64::from(i % 4) * 0.5,
            800 + i * 7,
            1_500 + i * 11,
            12.9 + f64::from(i % 50) * 0.01,
            77.5 + f64::from(i % 40) * 0.01,
            1960 + i % 60
        )?;
    }
    // Implausible rows the filter should drop
    writeln!(w, "1000,3,2,1200,2000,12.97,77.59,2001")?;
    writeln!(w, "3500000,0,2,1200,2000,12.97,77.59,2001")?;
    writeln!(w, "3500000,3,2,1200,2000,0,0,2001")?;
    writeln!(w, "3500000,3,2,1200,2000,12.97,77.59,2999")?;
    w.flush()?;

    println!("Adding county sales records...");
    let mut w = BufWriter::new(File::create(dir.join("kc_house_prices.csv"))?);
    writeln!(w, "id,price,bedrooms,bathrooms,sqft_living,sqft_lot,lat,long,yr_built,grade")?;
    for i in 0..300u32 {
        writeln!(
            w,
            "{},{},{},{},{},{},{},{},{},{}",
            7_129_300_520u64 + u64::from(i),
            250_000 + i * 3_000,
            2 + i % 4,
            1.0 + f64::from(i % 3) * 0.75,
            1_100 + i * 5,
            4_000 + i * 13,
            47.3 + f64::from(i % 60) * 0.01,
            -122.3 + f64::from(i % 80) * 0.01,
            1950 + i % 70,
            5 + i % 7
        )?;
    }
    writeln!(w, "1,5000,3,2,1500,5000,47.5,-122.2,1990,7")?;
    writeln!(w, "2,450000,3,2,1500,5000,90.0,-122.2,1990,7")?;
    writeln!(w, "3,450000,33,2,1500,5000,47.5,-122.2,1990,7")?;
    writeln!(w, "4,450000,3,2,1500,5000,47.5,-122.2,1990,14")?;
    writeln!(w, "5,,3,2,1500,5000,47.5,-122.2,1990,7")?;
    w.flush()?;

    println!("Adding index-by-year series...");
    let mut w = BufWriter::new(File::create(dir.join("Real_Year.csv"))?);
    writeln!(w, "date,price")?;
    for year in 1975..2024 {
        writeln!(w, "{}-01-01,{:.2}", year, f64::from(year % 13) - 4.5)?;
    }
    writeln!(w, "unknown,1.0")?;
    writeln!(w, "2024-01-01,350.0")?;
    w.flush()?;

    println!("Adding numeric price index...");
    let mut w = BufWriter::new(File::create(dir.join("price_index.csv"))?);
    writeln!(w, "region,q1,q2,q3,q4")?;
    for (i, region) in ["North", "South", "East", "West", "Central"].iter().enumerate() {
        let base = 100 + i as u32 * 20;
        writeln!(w, "{},{},{},{},{}", region, base, base + 3, base + 7, base + 12)?;
    }
    writeln!(w, "Outlier,5,120,130,140")?;
    writeln!(w, "Sparse,,,,")?;
    writeln!(w, ",,,,")?;
    w.flush()?;

    println!("Adding unclassified data with duplicates...");
    let mut w = BufWriter::new(File::create(dir.join("misc_listings.csv"))?);
    writeln!(w, "city,listings")?;
    for _ in 0..3 {
        writeln!(w, "Seattle,120")?;
    }
    writeln!(w, "Tacoma,45")?;
    writeln!(w, ",")?;
    w.flush()?;

    println!("Adding a malformed file...");
    fs::write(dir.join("broken.csv"), "a,b\n1,2,3\n")?;

    println!("\n✅ Sample datasets written.");
    println!("\nTry:");
    println!("  housefilter classify {} --infer-kinds", output_dir);
    println!("  housefilter run -i {} -o {}/filtered --infer-kinds", output_dir, output_dir);

    Ok(())
}
