// Example usage of the inverse table reader

use tracer_cal::{InverseTable, Result};
use tracing::{debug, info, Level};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    // Open an inverse table written by `calproc --invert`
    let table = InverseTable::open("data/invert-sn0-r1-cal.dat")?;

    info!(
        "Module {} resistor {}: {} rows",
        table.serial,
        table.resistor,
        table.len()
    );
    match (table.range_begin, table.range_end) {
        (Some(begin), Some(end)) => info!("Nominal range {}..={} ohms", begin, end),
        _ => info!("No nominal rows"),
    }

    if let Some(zero) = table.zero_ohms() {
        info!("Relay shorted: {:.3} ohms", zero.actual);
    }

    let worst = table
        .rows
        .iter()
        .skip(1)
        .max_by(|a, b| a.error.abs().total_cmp(&b.error.abs()));
    if let Some(row) = worst {
        info!("Worst row: {}", row);
    }

    for ohms in [0.4, 47.0, 100.5, 220.2, 1000.0] {
        match table.lookup(ohms) {
            Some(row) => info!("{:>7.1} ohms -> registers {:?}", ohms, row.registers),
            None => info!("{:>7.1} ohms -> not found", ohms),
        }
    }

    for row in &table.rows {
        debug!("  {}", row);
    }

    Ok(())
}
