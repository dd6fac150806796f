use std::path::PathBuf;

/// Plant/biomass map inspector (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "dri-map", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print the marker set for the national view or a single state view
    Markers(MarkersArgs),

    /// Print the detail panel for a district
    District(DistrictArgs),
}

#[derive(clap::Args, Debug)]
pub struct MarkersArgs {
    /// Data directory (geojson/ plus plants.json, biomass.json, odisha_biomass.json)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub data: PathBuf,

    /// State to drill into; omit for the national view
    #[arg(short, long)]
    pub state: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DistrictArgs {
    /// Data directory (geojson/ plus plants.json, biomass.json, odisha_biomass.json)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub data: PathBuf,

    /// State the district belongs to
    #[arg(short, long)]
    pub state: String,

    /// District name (known spelling variants are accepted)
    pub district: String,
}
