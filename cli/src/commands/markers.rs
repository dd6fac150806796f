use anyhow::{Context, Result};
use dri_map::providers::{FileDataProvider, FileGeoProvider};
use dri_map::{Command, MapSession};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::MarkersArgs) -> Result<()> {
    let geo = FileGeoProvider::new(&args.data);
    let data = FileDataProvider::new(&args.data);
    let mut session = MapSession::new(geo, data);

    if cli.verbose > 0 {
        eprintln!("[markers] loading data from {}", args.data.display());
    }
    session.start()?;

    if let Some(state) = &args.state {
        if cli.verbose > 0 {
            eprintln!("[markers] entering {state}");
        }
        session.apply(Command::SelectState(state.clone()))?;
    }

    let chart = session.chart().context("no chart after start")?;
    println!("{}", chart.title);
    println!("{}", chart.subtitle);

    for marker in session.current_markers() {
        println!(
            "{:?}\t{}\tlon={:.4}\tlat={:.4}",
            marker.kind,
            marker.name,
            marker.position.x(),
            marker.position.y()
        );
    }

    Ok(())
}
