use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::TimeDelta;
use crew_pairing::{
    crew::Crew,
    export::{export_pairings, export_plan, read_pairings_file, write_solution_json},
    flight::Flight,
    generator::{generate_crews, generate_flights, GeneratorConfig},
    ip::IpSolver,
    master,
    metrics::compute_metrics,
    pairing::hours_to_duration,
    plan,
    scenario::{CsvScenarioLoader, ScenarioConfig, ScenarioLoader, SqliteScenarioLoader},
    PlanOutcome,
};

const USAGE: &str = "Usage:
  crew_pairing generate <dir> [flights] [airports] [crews] [seed]
  crew_pairing run <dir> [max_legs] [max_duty_hours] [min_turn_minutes]
  crew_pairing solve <dir>
  crew_pairing sqlite <db> <scenario_id> <out_dir>";

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if let Err(error) = dispatch(&args) {
        println!("Error: {:#}", error);
        std::process::exit(1)
    }
}

fn dispatch(args: &[String]) -> Result<()> {
    match args.get(1).map(String::as_str) {
        Some("generate") if args.len() >= 3 => generate(&args[2], &args[3..]),
        Some("run") if args.len() >= 3 => run_csv(&args[2], &args[3..]),
        Some("solve") if args.len() >= 3 => solve_saved(&args[2]),
        Some("sqlite") if args.len() >= 5 => run_sqlite(&args[2], &args[3], &args[4]),
        _ => bail!("{}", USAGE),
    }
}

/// CP-SAT when built with the `cp-sat` feature, the bundled solver otherwise.
fn ip_solver() -> Box<dyn IpSolver> {
    #[cfg(feature = "cp-sat")]
    return Box::new(crew_pairing::cp_sat_solver::CpSatSolver::new());
    #[cfg(not(feature = "cp-sat"))]
    Box::new(crew_pairing::solver::BranchAndBoundSolver::new())
}

fn arg<T: std::str::FromStr>(args: &[String], i: usize, default: T) -> Result<T> {
    match args.get(i) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow!("could not parse argument {:?}", raw)),
        None => Ok(default),
    }
}

fn generate(dir: &str, args: &[String]) -> Result<()> {
    let defaults = GeneratorConfig::default();
    let config = GeneratorConfig::default()
        .with_num_flights(arg(args, 0, defaults.num_flights)?)
        .with_num_airports(arg(args, 1, defaults.num_airports)?)
        .with_num_crews(arg(args, 2, defaults.num_crews)?)
        .with_seed(arg(args, 3, defaults.seed)?);

    let loader = CsvScenarioLoader::new(dir);
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir))?;
    let mut writer = csv::Writer::from_path(loader.flights_path())?;
    for flight in generate_flights(&config) {
        writer.serialize(flight)?;
    }
    writer.flush()?;
    let mut writer = csv::Writer::from_path(loader.crews_path())?;
    for crew in generate_crews(&config) {
        writer.serialize(crew)?;
    }
    writer.flush()?;
    println!("Saved flights.csv and crews.csv to {}", dir);
    Ok(())
}

fn run_csv(dir: &str, args: &[String]) -> Result<()> {
    let loader = CsvScenarioLoader::new(dir);
    let flights = loader.read_flights().context("reading flights.csv")?;
    let crews = loader.read_crews().context("reading crews.csv")?;
    let mut config = loader.read_config()?;
    let max_duty_hours: f64 = arg(args, 1, config.pairing.max_duty_hours())?;
    let max_duty = hours_to_duration(max_duty_hours)
        .ok_or_else(|| anyhow!("max_duty_hours {} is out of range", max_duty_hours))?;
    let min_turn_minutes: i64 = arg(args, 2, config.pairing.min_turn.num_minutes())?;
    let min_turn = TimeDelta::try_minutes(min_turn_minutes)
        .ok_or_else(|| anyhow!("min_turn_minutes {} is out of range", min_turn_minutes))?;
    config.pairing = config
        .pairing
        .clone()
        .with_max_legs(arg(args, 0, config.pairing.max_legs)?)
        .with_max_duty(max_duty)
        .with_min_turn(min_turn);
    println!("Flights: {}, Crews: {}", flights.len(), crews.len());
    run(&flights, &crews, &config, Path::new(dir))
}

fn run_sqlite(db: &str, scenario: &str, out_dir: &str) -> Result<()> {
    let loader = SqliteScenarioLoader::new(db, scenario.to_owned())
        .with_context(|| format!("opening {}", db))?;
    let flights = loader.read_flights()?;
    let crews = loader.read_crews()?;
    let config = loader.read_config()?;
    println!("Scenario {}: {} flights, {} crews", scenario, flights.len(), crews.len());
    run(&flights, &crews, &config, Path::new(out_dir))
}

fn run(
    flights: &[Flight],
    crews: &[Crew],
    config: &ScenarioConfig,
    out_dir: &Path,
) -> Result<()> {
    let PlanOutcome {
        pairings,
        solution,
        metrics,
    } = plan(flights, crews, config, ip_solver().as_ref())?;
    println!("Generated {} pairings", pairings.len());
    println!(
        "Selected pairings: {} obj: {:.2}",
        solution.selected.len(),
        solution.obj
    );
    println!("{}", serde_json::to_string(&metrics)?);
    export_plan(&pairings, &solution, out_dir)
        .map_err(|e| anyhow!("writing results to {}: {}", out_dir.display(), e))?;
    Ok(())
}

/// Re-selects from a previously written `pairings.json`.
fn solve_saved(dir: &str) -> Result<()> {
    let dir = Path::new(dir);
    let pairings = read_pairings_file(&dir.join("pairings.json"))
        .map_err(|e| anyhow!("reading pairings.json: {}", e))?;
    let flights = CsvScenarioLoader::new(dir).read_flights()?;
    let config = ScenarioConfig::default();
    let solution = master::solve(&pairings, &flights, ip_solver().as_ref(), &config.solver)?;
    println!(
        "Selected pairings: {} obj: {:.2}",
        solution.selected.len(),
        solution.obj
    );
    println!("{}", serde_json::to_string(&compute_metrics(&solution))?);
    write_solution_json(&solution, BufWriter::new(File::create(dir.join("solution.json"))?))
        .map_err(|e| anyhow!("writing solution.json: {}", e))?;
    let mut writer = csv::Writer::from_path(dir.join("selected.csv"))?;
    export_pairings(&solution.selected, &mut writer)
        .map_err(|e| anyhow!("writing selected.csv: {}", e))?;
    Ok(())
}
