use std::{
    error::Error,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use csv::Writer;

use crate::{flight::format_time, master::Solution, pairing::Pairing};

/// Writes `pairings.json`, `pairings.csv` and `solution.json` into `dir`.
pub fn export_plan(
    pairings: &[Pairing],
    solution: &Solution,
    dir: &Path,
) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    write_pairings_json(pairings, BufWriter::new(File::create(dir.join("pairings.json"))?))?;
    let mut pairing_writer = Writer::from_path(dir.join("pairings.csv"))?;
    export_pairings(pairings, &mut pairing_writer)?;
    write_solution_json(solution, BufWriter::new(File::create(dir.join("solution.json"))?))?;
    Ok(())
}

pub fn export_pairings<W: Write>(
    pairings: &[Pairing],
    writer: &mut Writer<W>,
) -> Result<(), Box<dyn Error>> {
    writer.write_record([
        "pairing_id",
        "flights",
        "start",
        "end",
        "duty_hours",
        "cost",
    ])?;
    for pairing in pairings {
        writer.write_record(&[
            pairing.pairing_id.clone(),
            pairing.flights.join("-"),
            format_time(&pairing.start),
            format_time(&pairing.end),
            format!("{:.4}", pairing.duty_hours),
            format!("{:.2}", pairing.cost),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_pairings_json<W: Write>(pairings: &[Pairing], writer: W) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer_pretty(writer, pairings)?;
    Ok(())
}

pub fn read_pairings_json<R: Read>(reader: R) -> Result<Vec<Pairing>, Box<dyn Error>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_pairings_file(path: &Path) -> Result<Vec<Pairing>, Box<dyn Error>> {
    read_pairings_json(BufReader::new(File::open(path)?))
}

pub fn write_solution_json<W: Write>(solution: &Solution, writer: W) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer_pretty(writer, solution)?;
    Ok(())
}
