use anyhow::{Result, bail};
use dri_map::panel::PanelContent;
use dri_map::providers::{FileDataProvider, FileGeoProvider};
use dri_map::{Command, MapSession};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::DistrictArgs) -> Result<()> {
    let geo = FileGeoProvider::new(&args.data);
    let data = FileDataProvider::new(&args.data);
    let mut session = MapSession::new(geo, data);

    if cli.verbose > 0 {
        eprintln!("[district] loading data from {}", args.data.display());
    }
    session.start()?;
    session.apply(Command::SelectState(args.state.clone()))?;
    session.apply(Command::SelectDistrict(args.district.clone()))?;

    let Some(PanelContent::District(panel)) = session.panel() else {
        bail!("no district panel for {:?}", args.district);
    };

    println!("{}", panel.title);
    for plant in &panel.plants {
        println!("\n{}", plant.name);
        for (key, value) in &plant.fields {
            println!("  {key}: {value}");
        }
    }
    if let Some(note) = &panel.plants_note {
        println!("{note}");
    }

    match &panel.biomass {
        Some(tables) => {
            print_table("Bioenergy Potential (GJ)", &tables.bioenergy_potential_gj);
            print_table("Gross Biomass (Kilo tonnes)", &tables.gross_biomass_kt);
            print_table("Surplus Biomass (Kilo tonnes)", &tables.surplus_biomass_kt);
        }
        None => {
            if let Some(note) = &panel.biomass_note {
                println!("\n{note}");
            }
        }
    }

    Ok(())
}

fn print_table(heading: &str, rows: &[(String, String)]) {
    println!("\n{heading}");
    for (key, value) in rows {
        println!("  {key}: {value}");
    }
}
