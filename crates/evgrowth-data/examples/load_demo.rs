//! Load a sales file (or generated demo data) and summarise it.
//!
//! ```sh
//! cargo run -p evgrowth-data --example load_demo -- data/electric_vehicle_sales_by_state.csv
//! cargo run -p evgrowth-data --example load_demo
//! ```

use evgrowth_data::{DemoConfig, LoadOptions, global_cache};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = match std::env::args().nth(1) {
        Some(path) => LoadOptions::csv(path),
        None => {
            println!("No file given, using generated demo data");
            LoadOptions::demo(DemoConfig::default())
        }
    };

    let dataset = global_cache(options).get_or_load()?;

    println!("Records:    {}", dataset.len());
    println!("Basis:      {}", dataset.basis());
    println!("Entities:   {}", dataset.entities().len());
    let periods: Vec<String> = dataset.periods().iter().map(ToString::to_string).collect();
    println!("Periods:    {}", periods.join(", "));
    let categories: Vec<String> = dataset.categories().iter().map(ToString::to_string).collect();
    println!("Categories: {}", categories.join(", "));

    Ok(())
}
